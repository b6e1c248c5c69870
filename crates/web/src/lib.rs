//! Pressroom web server
//!
//! Serves tenant blogs and the dashboard. Every request is attributed to a
//! tenant from its host; article pages are rendered with the tenant's inline
//! ads spliced into the content.

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod routes;
pub mod routing;
pub mod security;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
