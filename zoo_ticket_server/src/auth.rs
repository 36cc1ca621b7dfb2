//! Bearer token handling.
//!
//! Tokens are HS256 JWTs issued by the account service, which shares `JWT_SECRET` with this server. The claims that
//! matter here are the user id and the user type; see [`JwtClaims`].
use std::{
    fmt::Debug,
    future::{ready, Ready},
    sync::Arc,
};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::Duration;
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    Token,
    UntrustedToken,
};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    Customer,
    /// Any type this server does not know about. Never permitted on protected routes.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    #[default]
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtClaims {
    pub user_id: i64,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub token_type: TokenType,
}

impl JwtClaims {
    pub fn new(user_id: i64, user_type: UserType) -> Self {
        Self { user_id, user_type, role: None, token_type: TokenType::Access }
    }

    pub fn with_role<S: Into<String>>(mut self, role: S) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    pub fn is_customer(&self) -> bool {
        self.user_type == UserType::Customer
    }
}

/// Handlers can take `JwtClaims` (or `Option<JwtClaims>` on optional-auth routes) as an argument. The claims are put
/// into the request extensions by [`crate::middleware::JwtMiddlewareFactory`].
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned();
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}

fn signing_key(config: &AuthConfig) -> Arc<Hs256Key> {
    Arc::new(Hs256Key::new(config.jwt_secret.as_bytes()))
}

/// Checks bearer tokens and extracts their claims.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Arc<Hs256Key>,
}

impl Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenVerifier(HS256)")
    }
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: signing_key(config) }
    }

    pub fn verify<S: AsRef<str>>(&self, token: S) -> Result<JwtClaims, AuthError> {
        let untrusted_token =
            UntrustedToken::new(token.as_ref()).map_err(|e| AuthError::InvalidToken(format!("{e}")))?;
        let token: Token<JwtClaims> = Hs256
            .validator::<JwtClaims>(&self.key)
            .validate(&untrusted_token)
            .map_err(|e| AuthError::InvalidToken(format!("{e}")))?;
        token.claims().validate_expiration(&TimeOptions::default()).map_err(|e| AuthError::InvalidToken(format!("{e}")))?;
        let claims = token.claims().custom.clone();
        if claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidToken("refresh tokens cannot be used to access the API".into()));
        }
        trace!("🔐️ Token validated for user #{} ({:?})", claims.user_id, claims.user_type);
        Ok(claims)
    }
}

/// Issues access and refresh tokens with the configured lifetimes. The account service normally does this; the server
/// uses it for tooling and tests.
pub struct TokenIssuer {
    key: Arc<Hs256Key>,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            key: signing_key(config),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }

    pub fn issue_access_token(&self, claims: JwtClaims) -> Result<String, AuthError> {
        let claims = JwtClaims { token_type: TokenType::Access, ..claims };
        self.issue_token(&claims, self.access_token_ttl)
    }

    pub fn issue_refresh_token(&self, claims: JwtClaims) -> Result<String, AuthError> {
        let claims = JwtClaims { token_type: TokenType::Refresh, ..claims };
        self.issue_token(&claims, self.refresh_token_ttl)
    }

    /// Signs `claims` with an expiry of `duration` from now.
    pub fn issue_token(&self, claims: &JwtClaims, duration: Duration) -> Result<String, AuthError> {
        let header = Header::empty().with_token_type("JWT");
        let claims = Claims::new(claims.clone()).set_duration_and_issuance(&TimeOptions::default(), duration);
        Hs256.token(&header, &claims, &self.key).map_err(|e| AuthError::TokenCreation(format!("{e}")))
    }
}
