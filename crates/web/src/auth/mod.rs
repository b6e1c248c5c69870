//! Session gating for the dashboard
//!
//! Sessions are issued elsewhere; this module only checks them.

pub mod middleware;
pub mod session;

pub use middleware::{require_api_session, require_session, SessionUser, SESSION_COOKIE};
pub use session::{SessionClaims, SessionError, SessionValidator};
