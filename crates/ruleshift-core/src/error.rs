//! Error types for query parsing, rendering, and translation.
//!
//! # Error Handling Strategy
//!
//! This crate uses two complementary error handling patterns:
//!
//! - [`TranslateError`]: Fatal errors that abort a translation unit (malformed
//!   input, unbalanced grouping, unknown platform). Returned as
//!   `Result<T, TranslateError>` and stop processing of the affected query.
//!
//! - [`Diagnostic`]: Non-fatal findings collected during rendering (unmapped
//!   fields, functions the target dialect cannot express). These accumulate in
//!   a vector and are returned alongside the translated text, so a best-effort
//!   translation still reaches the caller.
//!
//! Tokenizer and parser failures carry the offending query fragment so the
//! caller can point at the exact spot that defeated the translator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal error encountered while translating a query or rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// Malformed input the tokenizer could not consume. Carries the
    /// unconsumed remainder of the query.
    #[error("could not tokenize query fragment: {fragment}")]
    TokenizerGeneral { fragment: String },

    /// Unbalanced grouping in the token stream.
    #[error("query contains unbalanced parentheses")]
    QueryParentheses,

    /// Operator text not present in the dialect's operator map.
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Top-level source construct the parser cannot translate, such as a
    /// Sigma condition referencing a missing selection.
    #[error("unsupported root construct: {0}")]
    UnsupportedRoot(String),

    /// Registry miss: no platform registered under the requested identifier.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Sigma modifier chains may stack at most two modifiers.
    #[error("modifier chain too long: {0}")]
    ModifierChainTooLong(String),

    /// A rule document (YAML/JSON/.conf) that could not be loaded.
    #[error("invalid rule document: {0}")]
    RuleDocument(String),

    /// Strict mode was requested and rendering produced diagnostics.
    #[error("strict render failed: {0}")]
    StrictRender(String),
}

impl TranslateError {
    /// Builds a [`TranslateError::TokenizerGeneral`] from the unconsumed
    /// remainder of a query, truncating very long fragments.
    pub fn tokenizer(fragment: impl Into<String>) -> Self {
        let mut fragment: String = fragment.into();
        if fragment.len() > 256 {
            let cut = fragment
                .char_indices()
                .nth(256)
                .map(|(i, _)| i)
                .unwrap_or(fragment.len());
            fragment.truncate(cut);
        }
        Self::TokenizerGeneral { fragment }
    }
}

/// Machine-readable codes for [`Diagnostic`] values.
pub mod diagnostic_codes {
    pub const UNMAPPED_FIELD: &str = "UNMAPPED_FIELD";
    pub const UNMAPPED_FUNCTION: &str = "UNMAPPED_FUNCTION";
    pub const UNSUPPORTED_FUNCTION: &str = "UNSUPPORTED_FUNCTION";
    pub const UNSUPPORTED_OPERATOR: &str = "UNSUPPORTED_OPERATOR";
    pub const MITRE_FALLBACK: &str = "MITRE_FALLBACK";
    pub const IOC_LIMIT_REACHED: &str = "IOC_LIMIT_REACHED";
}

/// Severity of a non-fatal finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// A non-fatal finding attached to a rendered translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,

    /// Machine-readable code from [`diagnostic_codes`]
    pub code: String,

    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Info,
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_error_keeps_fragment() {
        let err = TranslateError::tokenizer("??? rest of query");
        assert_eq!(
            err.to_string(),
            "could not tokenize query fragment: ??? rest of query"
        );
    }

    #[test]
    fn tokenizer_error_truncates_long_fragment() {
        let err = TranslateError::tokenizer("x".repeat(1000));
        match err {
            TranslateError::TokenizerGeneral { fragment } => assert_eq!(fragment.len(), 256),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn diagnostic_constructors_set_severity() {
        let warn = Diagnostic::warning(diagnostic_codes::UNMAPPED_FIELD, "no mapping for EventID");
        assert_eq!(warn.severity, DiagnosticSeverity::Warning);
        let info = Diagnostic::info(diagnostic_codes::MITRE_FALLBACK, "using bundled catalog");
        assert_eq!(info.severity, DiagnosticSeverity::Info);
    }
}
