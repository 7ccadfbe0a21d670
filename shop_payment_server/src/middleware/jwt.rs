//! Bearer-token validation middleware.
//!
//! Wrap this around any scope that requires authentication. It expects an `Authorization: Bearer <jwt>` header,
//! validates the token against the configured HS256 secret, and stores the resulting [`JwtClaims`] in the request
//! extensions, where handlers pick them up via the [`JwtClaims`] extractor and
//! [`super::AclMiddlewareFactory`] checks roles. Requests without a valid token are rejected with 401.

use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::debug;

use crate::{
    auth::validate_token,
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub struct JwtMiddlewareFactory {
    auth: AuthConfig,
}

impl JwtMiddlewareFactory {
    pub fn new(auth: AuthConfig) -> Self {
        JwtMiddlewareFactory { auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtMiddlewareService { auth: self.auth.clone(), service: Rc::new(service) })
    }
}

pub struct JwtMiddlewareService<S> {
    auth: AuthConfig,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let auth = self.auth.clone();
        Box::pin(async move {
            let claims = bearer_token(&req).and_then(|token| {
                validate_token(&token, &auth).map_err(|e| {
                    debug!("💻️ Token validation failed: {e}");
                    e
                })
            });
            match claims {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    service.call(req).await
                },
                Err(e) => Err(ServerError::AuthenticationError(e).into()),
            }
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Result<String, AuthError> {
    let header = req.headers().get("Authorization").ok_or(AuthError::MissingToken)?;
    let value = header
        .to_str()
        .map_err(|e| AuthError::PoorlyFormattedToken(format!("Authorization header is not valid UTF-8: {e}")))?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a Bearer token".to_string()))
}
