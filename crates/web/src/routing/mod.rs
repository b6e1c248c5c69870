//! Host-based tenant routing
//!
//! Every request passes through `tenant_middleware`, which resolves the
//! tenant from the host, makes it available to handlers and hands it to the
//! browser as a cookie. Handlers read it through `CurrentTenant`.

mod tenant;

pub use tenant::{request_host, tenant_cookie, tenant_middleware, CurrentTenant, FORWARDED_HOST};
