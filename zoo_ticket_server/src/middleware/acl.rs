//! Access control list middleware.
//!
//! It reads the JWT claims that [`super::JwtMiddlewareFactory`] placed in the request extensions and checks the user
//! type against the types allowed on the route. No claims means no token was presented (401); a token of the wrong
//! type is a 403.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{
    auth::{JwtClaims, UserType},
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    allowed_types: Vec<UserType>,
}

impl AclMiddlewareFactory {
    pub fn new(allowed_types: &[UserType]) -> Self {
        AclMiddlewareFactory { allowed_types: allowed_types.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AclMiddlewareService { allowed_types: self.allowed_types.clone(), service: Rc::new(service) }))
    }
}

pub struct AclMiddlewareService<S> {
    allowed_types: Vec<UserType>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
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
        let allowed_types = self.allowed_types.clone();
        Box::pin(async move {
            let user_type = req.extensions().get::<JwtClaims>().map(|c| c.user_type);
            match user_type {
                None => {
                    debug!("🔐️ No bearer token on request to protected route {}", req.path());
                    Err(ServerError::AuthenticationError(AuthError::MissingToken).into())
                },
                Some(t) if allowed_types.contains(&t) => service.call(req).await,
                Some(t) => {
                    warn!("🔐️ User type {t:?} is not allowed on {}", req.path());
                    Err(ServerError::AuthenticationError(AuthError::InsufficientPermissions(format!(
                        "{t:?} users may not access this resource"
                    )))
                    .into())
                },
            }
        })
    }
}
