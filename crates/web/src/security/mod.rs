//! Response hardening

pub mod headers;

pub use headers::security_headers_middleware;
