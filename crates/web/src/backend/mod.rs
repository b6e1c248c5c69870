//! Content backend access
//!
//! Thin client over the hosted REST backend that owns posts, tenants and ad
//! placement configuration. Responses are validated here before they reach
//! the rendering code.

mod client;
mod types;

pub use client::{BackendClient, BackendError, BackendResult};
pub use types::Post;
