use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use futures::future::{err, ok, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shop_payment_engine::db_types::{Role, Roles};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The verified claims of a bearer token. The [`crate::middleware::JwtMiddlewareFactory`] validates the token and
/// stores the claims in the request extensions; handlers receive them through the [`FromRequest`] impl below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The authenticated user's id.
    pub sub: i64,
    #[serde(default)]
    pub roles: Roles,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl JwtClaims {
    pub fn user_id(&self) -> i64 {
        self.sub
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<JwtClaims>() {
            Some(claims) => ok(claims.clone()),
            None => err(ServerError::AuthenticationError(AuthError::MissingToken)),
        }
    }
}

/// Validates an HS256 bearer token and returns its claims. Expiry is checked as part of validation.
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<JwtClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    let data =
        decode::<JwtClaims>(token, &key, &validation).map_err(|e| AuthError::ValidationError(e.to_string()))?;
    Ok(data.claims)
}

/// Issues signed access tokens. Token issuance belongs to the auth service; this exists so tests can mint tokens
/// that validate against a known secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { encoding_key }
    }

    pub fn issue_token(&self, user_id: i64, roles: Roles, valid_for: Duration) -> Result<String, AuthError> {
        let claims = JwtClaims { sub: user_id, roles, exp: (Utc::now() + valid_for).timestamp() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::ValidationError(e.to_string()))
    }
}
