//! Common types used across Pressroom

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the default, non-tenant context
pub const MAIN_TENANT: &str = "main";

// =============================================================================
// ID Wrappers
// =============================================================================

/// Tenant identifier derived from the request host
///
/// Never persisted here; the canonical tenant record lives in the content backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The default tenant
    pub fn main() -> Self {
        Self(MAIN_TENANT.to_string())
    }

    pub fn is_main(&self) -> bool {
        self.0 == MAIN_TENANT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::main()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Where an ad is placed relative to the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementKind {
    /// Spliced into the article body
    Inline,
}

impl PlacementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementKind::Inline => "INLINE",
        }
    }
}

impl fmt::Display for PlacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
