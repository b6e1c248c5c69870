//! Inline ads
//!
//! - `directive`: validated directive records at the backend boundary
//! - `distributor`: word-offset based splicing of ads into article content
//! - `manager`: per-render ad lifecycle with its own script registry

mod directive;
mod distributor;
mod manager;

pub use directive::{
    parse_directives_strict, validate_directives, AdDirective, DirectiveError, RawAdDirective,
    DEFAULT_APPEARANCE,
};
pub use distributor::{distribute_inline_ads, plan_inline_ads, Placement, PlacementPlan};
pub use manager::{AdManager, AdScriptRegistry, RenderedArticle};
