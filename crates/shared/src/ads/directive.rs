//! Inline ad directives
//!
//! The content backend hands directives back as loosely typed JSON. They are
//! validated here, once, so the distributor only ever sees well-formed records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PressError;

/// Appearance used when the backend does not send one
pub const DEFAULT_APPEARANCE: &str = "default";

/// One candidate inline-ad insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDirective {
    pub id: String,
    /// Markup or script embedded verbatim
    pub code_snippet: String,
    /// Requested insertion point in words from the start of the content.
    /// Advisory only; values <= 0 are never placed.
    pub position_offset: i64,
    /// Presentation variant, passed through to the wrapper
    pub appearance: String,
}

impl AdDirective {
    pub fn new(id: impl Into<String>, code_snippet: impl Into<String>, position_offset: i64) -> Self {
        Self {
            id: id.into(),
            code_snippet: code_snippet.into(),
            position_offset,
            appearance: DEFAULT_APPEARANCE.to_string(),
        }
    }

    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = appearance.into();
        self
    }
}

/// Directive as received from the backend, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAdDirective {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub code_snippet: Option<Value>,
    #[serde(default)]
    pub position_offset: Option<Value>,
    #[serde(default)]
    pub appearance: Option<Value>,
}

/// Why a raw directive was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("directive has no id")]
    MissingId,

    #[error("directive {id} has no string code snippet")]
    MissingSnippet { id: String },

    #[error("directive {id} has no integer position offset")]
    InvalidPositionOffset { id: String },
}

impl TryFrom<RawAdDirective> for AdDirective {
    type Error = DirectiveError;

    fn try_from(raw: RawAdDirective) -> Result<Self, Self::Error> {
        let id = match raw.id {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(DirectiveError::MissingId),
        };

        let code_snippet = match raw.code_snippet {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            _ => return Err(DirectiveError::MissingSnippet { id }),
        };

        let position_offset = match raw.position_offset.as_ref().and_then(coerce_offset) {
            Some(offset) => offset,
            None => return Err(DirectiveError::InvalidPositionOffset { id }),
        };

        let appearance = match raw.appearance {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            _ => DEFAULT_APPEARANCE.to_string(),
        };

        Ok(AdDirective {
            id,
            code_snippet,
            position_offset,
            appearance,
        })
    }
}

/// Accepts integers, whole floats and numeric strings
fn coerce_offset(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Keep the directives that validate, logging the ones that don't
pub fn validate_directives(raws: Vec<RawAdDirective>) -> Vec<AdDirective> {
    raws.into_iter()
        .enumerate()
        .filter_map(|(position, raw)| match AdDirective::try_from(raw) {
            Ok(directive) => Some(directive),
            Err(e) => {
                tracing::warn!(position, error = %e, "Dropping malformed ad directive");
                None
            }
        })
        .collect()
}

/// Validate every directive, failing on the first malformed one
pub fn parse_directives_strict(raws: Vec<RawAdDirective>) -> Result<Vec<AdDirective>, PressError> {
    raws.into_iter()
        .enumerate()
        .map(|(position, raw)| {
            AdDirective::try_from(raw)
                .map_err(|e| PressError::Validation(format!("directive {}: {}", position, e)))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawAdDirective {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_well_formed_directive() {
        let directive = AdDirective::try_from(raw(json!({
            "id": "ad-1",
            "codeSnippet": "<script src=\"https://ads.example.net/a.js\"></script>",
            "positionOffset": 120,
            "appearance": "boxed"
        })))
        .unwrap();

        assert_eq!(directive.id, "ad-1");
        assert_eq!(directive.position_offset, 120);
        assert_eq!(directive.appearance, "boxed");
    }

    #[test]
    fn test_coerces_numeric_fields() {
        let directive = AdDirective::try_from(raw(json!({
            "id": 42,
            "codeSnippet": "<ins></ins>",
            "positionOffset": " 300 "
        })))
        .unwrap();

        assert_eq!(directive.id, "42");
        assert_eq!(directive.position_offset, 300);
        assert_eq!(directive.appearance, DEFAULT_APPEARANCE);

        let whole_float = AdDirective::try_from(raw(json!({
            "id": "f",
            "codeSnippet": "<ins></ins>",
            "positionOffset": 150.0
        })))
        .unwrap();
        assert_eq!(whole_float.position_offset, 150);
    }

    #[test]
    fn test_rejects_malformed_directives() {
        assert_eq!(
            AdDirective::try_from(raw(json!({"codeSnippet": "x", "positionOffset": 1}))),
            Err(DirectiveError::MissingId)
        );
        assert_eq!(
            AdDirective::try_from(raw(json!({"id": "a", "codeSnippet": 7, "positionOffset": 1}))),
            Err(DirectiveError::MissingSnippet { id: "a".into() })
        );
        assert_eq!(
            AdDirective::try_from(raw(json!({"id": "b", "codeSnippet": "x"}))),
            Err(DirectiveError::InvalidPositionOffset { id: "b".into() })
        );
        assert_eq!(
            AdDirective::try_from(raw(json!({"id": "c", "codeSnippet": "x", "positionOffset": 12.5}))),
            Err(DirectiveError::InvalidPositionOffset { id: "c".into() })
        );
    }

    #[test]
    fn test_non_positive_offsets_pass_validation() {
        // The distributor is the one that skips them
        let directive = AdDirective::try_from(raw(json!({
            "id": "zero",
            "codeSnippet": "x",
            "positionOffset": 0
        })))
        .unwrap();
        assert_eq!(directive.position_offset, 0);
    }

    #[test]
    fn test_validate_directives_drops_bad_entries() {
        let raws = vec![
            raw(json!({"id": "ok", "codeSnippet": "x", "positionOffset": 10})),
            raw(json!({"id": "bad"})),
            raw(json!({"id": "ok2", "codeSnippet": "y", "positionOffset": "20"})),
        ];

        let ids: Vec<String> = validate_directives(raws).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["ok", "ok2"]);
    }

    #[test]
    fn test_strict_parsing_reports_position() {
        let raws = vec![
            raw(json!({"id": "ok", "codeSnippet": "x", "positionOffset": 10})),
            raw(json!({"id": "bad", "codeSnippet": "x", "positionOffset": null})),
        ];

        match parse_directives_strict(raws) {
            Err(PressError::Validation(msg)) => assert!(msg.starts_with("directive 1:")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
