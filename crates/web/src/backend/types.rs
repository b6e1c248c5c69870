//! Backend payload types

use serde::{Deserialize, Serialize};

/// Published article as served by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub slug: String,
    pub title: String,
    /// Rendered article body (HTML)
    pub content: String,
}
