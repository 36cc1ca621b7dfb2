//! Bearer token middleware.
//!
//! Validates the `Authorization: Bearer <token>` header when one is present and stores the claims in the request
//! extensions. Requests without the header pass through untouched, so that optional-auth routes see a guest and
//! protected routes can reject the request in [`super::AclMiddlewareFactory`]. A header carrying an invalid or expired
//! token is rejected here.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{
    auth::TokenVerifier,
    errors::{AuthError, ServerError},
};

/// Extracts the token from an `Authorization: Bearer` header. `None` if there is no such header.
pub fn bearer_token(headers: &HeaderMap) -> Option<Result<String, AuthError>> {
    let value = headers.get(AUTHORIZATION)?;
    let token = value
        .to_str()
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
        .and_then(|s| {
            let s = s.trim();
            match s.split_once(' ') {
                Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
                    Ok(token.trim().to_string())
                },
                _ => Err(AuthError::InvalidToken("expected 'Bearer <token>'".into())),
            }
        });
    Some(token)
}

pub struct JwtMiddlewareFactory {
    verifier: TokenVerifier,
}

impl JwtMiddlewareFactory {
    pub fn new(verifier: TokenVerifier) -> Self {
        JwtMiddlewareFactory { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService { verifier: self.verifier.clone(), service: Rc::new(service) }))
    }
}

pub struct JwtMiddlewareService<S> {
    verifier: TokenVerifier,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let claims = bearer_token(req.headers()).map(|token| token.and_then(|t| self.verifier.verify(t)));
        Box::pin(async move {
            match claims {
                None => trace!("🔐️ No bearer token on {}", req.path()),
                Some(Ok(claims)) => {
                    trace!("🔐️ Request to {} authenticated as user #{}", req.path(), claims.user_id);
                    req.extensions_mut().insert(claims);
                },
                Some(Err(e)) => {
                    info!("🔐️ Rejected bearer token on {}. {e}", req.path());
                    return Err(ServerError::AuthenticationError(e).into());
                },
            }
            service.call(req).await
        })
    }
}
