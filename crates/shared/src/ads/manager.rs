//! Ad lifecycle management
//!
//! Every render context (one page render on the server, one page in a
//! browser) owns an `AdManager`. The manager tracks which external ad loader
//! scripts that context has already pulled in, so each loader is emitted once
//! no matter how many snippets reference it.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::directive::AdDirective;
use super::distributor::{place_inline_ads, Placement};

/// External ad scripts already loaded by one render context
#[derive(Debug, Clone, Default)]
pub struct AdScriptRegistry {
    loaded: HashSet<String>,
}

impl AdScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `src` as loaded. Returns true the first time it is seen.
    pub fn register(&mut self, src: &str) -> bool {
        self.loaded.insert(src.to_string())
    }

    pub fn contains(&self, src: &str) -> bool {
        self.loaded.contains(src)
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
    }
}

/// Result of rendering an article's inline ads
#[derive(Debug, Clone, Serialize)]
pub struct RenderedArticle {
    pub html: String,
    /// Loader scripts this context has not loaded yet, in placement order
    pub scripts: Vec<String>,
    pub placements: Vec<Placement>,
}

/// Owns the ad lifecycle for a single render context
#[derive(Debug, Default)]
pub struct AdManager {
    registry: AdScriptRegistry,
}

impl AdManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: AdScriptRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AdScriptRegistry {
        &self.registry
    }

    /// Distribute `directives` over `content` and collect the loader scripts
    /// the placed snippets still need
    pub fn render(&mut self, content: &str, directives: &[AdDirective]) -> RenderedArticle {
        let (html, placed) = place_inline_ads(content, directives);

        let mut scripts = Vec::new();
        for (_, directive) in &placed {
            for src in script_sources(&directive.code_snippet) {
                if self.registry.register(&src) {
                    scripts.push(src);
                }
            }
        }

        if !scripts.is_empty() {
            tracing::debug!(
                new_scripts = scripts.len(),
                loaded_scripts = self.registry.len(),
                "Registered ad loader scripts"
            );
        }

        RenderedArticle {
            html,
            scripts,
            placements: placed.into_iter().map(|(placement, _)| placement).collect(),
        }
    }

    /// Forget every loaded script, e.g. on a full page navigation
    pub fn reset(&mut self) {
        self.registry.clear();
    }
}

#[allow(clippy::expect_used)] // Pattern is a constant; failure is a programming error
fn script_src_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<script\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#)
            .expect("script src pattern is valid")
    })
}

/// External script URLs referenced by a snippet
fn script_sources(snippet: &str) -> Vec<String> {
    script_src_pattern()
        .captures_iter(snippet)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|src| !src.is_empty())
        .collect()
}
