//! Pressroom Shared Types and Utilities
//!
//! This crate contains the tenant resolver, the inline ad distributor and the
//! types shared between the web server and anything else rendering articles.

pub mod ads;
pub mod error;
pub mod markup;
pub mod tenant;
pub mod types;

pub use ads::{
    distribute_inline_ads, parse_directives_strict, plan_inline_ads, validate_directives,
    AdDirective, AdManager, AdScriptRegistry, DirectiveError, Placement, PlacementPlan,
    RawAdDirective, RenderedArticle,
};
pub use error::*;
pub use markup::escape_html;
pub use tenant::{MultiLevelHostPolicy, TenantResolver, RESERVED_SUBDOMAINS};
pub use types::*;
