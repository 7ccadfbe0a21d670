//! Access control middleware.
//!
//! Place this on any route that requires more than a valid login. It reads the [`JwtClaims`] that the JWT middleware
//! stored in the request extensions and checks them against the roles the route requires. Requests from users
//! without every required role are rejected with 403.

use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::warn;
use shop_payment_engine::db_types::Role;

use crate::{
    auth::JwtClaims,
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AclMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
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
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let claims = req.extensions().get::<JwtClaims>().cloned();
            let claims = match claims {
                Some(claims) => claims,
                None => {
                    warn!("💻️ No JWT claims found in request extensions. Is the JWT middleware installed?");
                    return Err(ServerError::AuthenticationError(AuthError::MissingToken).into());
                },
            };
            if required_roles.iter().all(|role| claims.has_role(*role)) {
                service.call(req).await
            } else {
                let msg = format!(
                    "User {} does not hold the required roles for this route",
                    claims.user_id()
                );
                Err(ServerError::AuthenticationError(AuthError::InsufficientPermissions(msg)).into())
            }
        })
    }
}
