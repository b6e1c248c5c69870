//! Error types for Pressroom

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PressError {
    #[error("Validation error: {0}")]
    Validation(String),
}
