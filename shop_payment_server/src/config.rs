use std::env;

use log::*;
use payos_tools::PayOsConfig;
use spg_common::Secret;

use crate::errors::ServerError;

const DEFAULT_SPG_HOST: &str = "127.0.0.1";
const DEFAULT_SPG_PORT: u16 = 8370;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Payment gateway credentials and endpoints, injected into the gateway client at startup. Request-handling code
    /// never reads gateway settings from the environment.
    pub payos: PayOsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPG_HOST.to_string(),
            port: DEFAULT_SPG_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            payos: PayOsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPG_HOST").ok().unwrap_or_else(|| DEFAULT_SPG_HOST.into());
        let port = env::var("SPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPG_PORT. {e} Using the default, {DEFAULT_SPG_PORT}, instead."
                    );
                    DEFAULT_SPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPG_PORT);
        let database_url = env::var("SPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SPG_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let payos = PayOsConfig::from_env_or_default();
        Self { host, port, database_url, auth, payos }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret that incoming bearer tokens are verified against. Token issuance is the auth service's job;
    /// this server only validates.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!("🪛️ Using the default JWT secret. No real token will validate against it.");
        Self { jwt_secret: Secret::new("unconfigured-jwt-secret".to_string()) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("SPG_JWT_SECRET")
            .map_err(|_| ServerError::ConfigurationError("SPG_JWT_SECRET is not set".to_string()))?;
        if secret.len() < 32 {
            warn!("🪛️ SPG_JWT_SECRET is shorter than 32 bytes. Consider using a longer secret.");
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}
