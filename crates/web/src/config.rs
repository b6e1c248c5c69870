//! Application configuration

use std::env;
use std::time::Duration;

use pressroom_shared::{MultiLevelHostPolicy, TenantResolver};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub public_url: String,

    // Tenancy
    pub main_domain: String, // e.g., "example.com" for *.example.com tenants
    pub reserved_subdomains: Vec<String>,
    pub multi_level_host_policy: MultiLevelHostPolicy,
    pub tenant_cookie_name: String,

    // Content backend
    pub backend_url: String,
    pub backend_timeout_ms: u64,
    pub article_page_kind: String,

    // Sessions
    pub session_jwt_secret: String,

    // Logging
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            // Tenancy
            main_domain: env::var("MAIN_DOMAIN")
                .unwrap_or_else(|_| "localhost".to_string())
                .trim()
                .to_lowercase(),
            reserved_subdomains: env::var("RESERVED_SUBDOMAINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            multi_level_host_policy: match env::var("MULTI_LEVEL_HOST_POLICY") {
                Ok(value) => value
                    .parse()
                    .map_err(|_| ConfigError::Invalid("MULTI_LEVEL_HOST_POLICY"))?,
                Err(_) => MultiLevelHostPolicy::default(),
            },
            tenant_cookie_name: env::var("TENANT_COOKIE_NAME")
                .unwrap_or_else(|_| "tenant".to_string()),

            // Content backend
            backend_url: env::var("BACKEND_URL")
                .map_err(|_| ConfigError::Missing("BACKEND_URL"))?,
            backend_timeout_ms: env::var("BACKEND_TIMEOUT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10000),
            article_page_kind: env::var("ARTICLE_PAGE_KIND")
                .unwrap_or_else(|_| "article".to_string()),

            // Sessions
            session_jwt_secret: {
                let secret = env::var("SESSION_JWT_SECRET")
                    .map_err(|_| ConfigError::Missing("SESSION_JWT_SECRET"))?;
                if secret.len() < 32 {
                    return Err(ConfigError::WeakSecret(
                        "SESSION_JWT_SECRET must be at least 32 characters",
                    ));
                }
                secret
            },

            // Logging
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Build the tenant resolver described by this configuration
    pub fn tenant_resolver(&self) -> TenantResolver {
        TenantResolver::new(&self.main_domain)
            .with_reserved(&self.reserved_subdomains)
            .with_policy(self.multi_level_host_policy)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
}
