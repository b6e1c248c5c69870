//! Shared application state

use std::sync::Arc;

use pressroom_shared::TenantResolver;

use crate::auth::SessionValidator;
use crate::backend::{BackendClient, BackendError};
use crate::config::Config;

/// State handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<TenantResolver>,
    pub backend: BackendClient,
    pub sessions: SessionValidator,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend_url, config.backend_timeout())?;
        let sessions = SessionValidator::new(&config.session_jwt_secret);

        Ok(Self {
            resolver: Arc::new(config.tenant_resolver()),
            config: Arc::new(config),
            backend,
            sessions,
        })
    }
}
