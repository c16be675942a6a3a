//! Parser capabilities shared by every source dialect.
//!
//! A platform parser runs three ordered phases with no backtracking:
//! strip the log-source expression, strip the pipeline/function tail,
//! tokenize the residual boolean expression. A final pass resolves source
//! mappings and populates every field's generic name map — including fields
//! that only appear inside aggregation functions.
//!
//! Rule dialects compose a rule-loader capability (JSON/YAML/`.conf`
//! extraction) with a query parser by delegation.

use regex::Regex;
use tracing::debug;

use crate::error::TranslateError;
use crate::ir::{ParsedFunctions, SiemContainer, Token};
use crate::managers::PlatformDetails;
use crate::mapping::{LogSources, PlatformMappings};
use crate::tokenizer::for_each_field_mut;

/// A source dialect parser: raw text in, translation unit out.
pub trait QueryParser: Send + Sync {
    fn details(&self) -> &PlatformDetails;

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError>;
}

/// Resolves the mapping subset for the extracted log sources and populates
/// `generic_names_map` on every field in the stream and the function tail.
/// Returns the matched mapping ids, most specific first.
pub fn resolve_source_mappings(
    tokens: &mut [Token],
    functions: &mut ParsedFunctions,
    mappings: &PlatformMappings,
    log_sources: &LogSources,
) -> Vec<String> {
    let suitable = mappings.suitable_source_mappings(log_sources);
    let default = mappings.default_mapping();
    for_each_field_mut(tokens, functions, |field| {
        field.set_generic_names_map(&suitable, default);
    });
    let ids: Vec<String> = suitable.iter().map(|m| m.source_id.clone()).collect();
    debug!(?ids, "resolved source mappings");
    ids
}

/// Extracts key/value log-source expressions (`source="x"`, `index=main`)
/// from a query, returning the collected log sources and the residual query
/// with the expressions and any dangling logical joiners removed.
pub fn extract_log_sources(query: &str, patterns: &[(&str, &Regex)]) -> (LogSources, String) {
    let mut log_sources = LogSources::new();
    let mut residual = query.to_string();
    for (key, regex) in patterns {
        let mut values = Vec::new();
        for caps in regex.captures_iter(&residual) {
            if let Some(value) = caps.name("value") {
                values.push(value.as_str().to_string());
            }
        }
        if !values.is_empty() {
            log_sources.insert(key.to_string(), values);
            residual = regex.replace_all(&residual, "").into_owned();
        }
    }
    (log_sources, tidy_residual(&residual))
}

/// Removes logical joiners left dangling after log-source extraction and
/// collapses runs of whitespace.
fn tidy_residual(residual: &str) -> String {
    use std::sync::OnceLock;
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static HEAD_JOINER: OnceLock<Regex> = OnceLock::new();
    static TAIL_JOINER: OnceLock<Regex> = OnceLock::new();
    static DOUBLED_AND: OnceLock<Regex> = OnceLock::new();
    static DOUBLED_OR: OnceLock<Regex> = OnceLock::new();

    let whitespace =
        WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
    let head =
        HEAD_JOINER.get_or_init(|| Regex::new(r"^(?i:and|or)\s+").expect("valid joiner pattern"));
    let tail =
        TAIL_JOINER.get_or_init(|| Regex::new(r"\s+(?i:and|or)$").expect("valid joiner pattern"));
    let doubled_and = DOUBLED_AND
        .get_or_init(|| Regex::new(r"(?i)\band\s+and\b").expect("valid joiner pattern"));
    let doubled_or =
        DOUBLED_OR.get_or_init(|| Regex::new(r"(?i)\bor\s+or\b").expect("valid joiner pattern"));

    let collapsed = whitespace.replace_all(residual.trim(), " ").into_owned();
    let step = head.replace(&collapsed, "").into_owned();
    let step = tail.replace(&step, "").into_owned();
    let step = doubled_and.replace_all(&step, "and").into_owned();
    doubled_or.replace_all(&step, "or").into_owned()
}

/// Splits a query on top-level `|`, respecting single- and double-quoted
/// sections. The first segment is the boolean expression; the remainder is
/// the function pipeline.
pub fn split_pipeline(query: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in query.chars() {
        match (ch, quote) {
            ('"' | '\'', None) => {
                quote = Some(ch);
                current.push(ch);
            }
            (ch, Some(open)) if ch == open => {
                quote = None;
                current.push(ch);
            }
            ('|', None) => {
                segments.push(current.trim().to_string());
                current = String::new();
            }
            (ch, _) => current.push(ch),
        }
    }
    segments.push(current.trim().to_string());
    segments
}

/// Rule-loader capability for JSON rule documents.
pub trait JsonRuleLoader {
    fn load_json_rule(&self, text: &str) -> Result<serde_json::Value, TranslateError> {
        serde_json::from_str(text).map_err(|err| TranslateError::RuleDocument(err.to_string()))
    }
}

/// Rule-loader capability for YAML rule documents.
pub trait YamlRuleLoader {
    fn load_yaml_rule(&self, text: &str) -> Result<serde_yaml::Value, TranslateError> {
        serde_yaml::from_str(text).map_err(|err| TranslateError::RuleDocument(err.to_string()))
    }
}

/// Rule-loader capability for `.conf` stanza documents (`key = value` lines).
pub trait ConfRuleLoader {
    fn conf_value(&self, text: &str, key: &str) -> Option<String> {
        let pattern = format!(r"(?m)^\s*{}\s*=\s*(?P<value>.+)$", regex::escape(key));
        let regex = Regex::new(&pattern).expect("valid conf key pattern");
        regex
            .captures(text)
            .and_then(|caps| caps.name("value"))
            .map(|m| m.as_str().trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{log_source, SourceMapping};

    #[test]
    fn log_source_extraction_strips_expression() {
        let source_regex =
            Regex::new(r#"source\s*=\s*"?(?P<value>[^\s"]+)"?\s*"#).unwrap();
        let (sources, residual) = extract_log_sources(
            r#"source="WinEventLog:Security" AND EventCode=4688"#,
            &[("source", &source_regex)],
        );
        assert_eq!(
            sources.get("source").map(Vec::as_slice),
            Some(&["WinEventLog:Security".to_string()][..])
        );
        assert_eq!(residual, "EventCode=4688");
    }

    #[test]
    fn residual_keeps_inner_joiners() {
        let index_regex = Regex::new(r#"index\s*=\s*(?P<value>[^\s]+)\s*"#).unwrap();
        let (_, residual) = extract_log_sources(
            "index=main a=1 AND b=2",
            &[("index", &index_regex)],
        );
        assert_eq!(residual, "a=1 AND b=2");
    }

    #[test]
    fn split_pipeline_respects_quotes() {
        let segments = split_pipeline(r#"a="x|y" | stats count by user"#);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], r#"a="x|y""#);
        assert_eq!(segments[1], "stats count by user");
    }

    #[test]
    fn split_pipeline_single_segment() {
        assert_eq!(split_pipeline("a=1"), vec!["a=1".to_string()]);
    }

    #[test]
    fn resolve_source_mappings_populates_fields() {
        use crate::ir::{FieldValue, Identifier, OperatorKind, Value};

        let mappings = PlatformMappings::new(vec![SourceMapping::new(
            "windows",
            &[("product", &["windows"])],
            &[("EventID", "EventCode")],
            None,
        )]);
        let mut tokens = vec![Token::FieldValue(FieldValue::new(
            "EventCode",
            Identifier::op(OperatorKind::Eq),
            Value::Num(4688),
        ))];
        let mut functions = ParsedFunctions::default();
        let ids = resolve_source_mappings(
            &mut tokens,
            &mut functions,
            &mappings,
            &log_source("product", "windows"),
        );
        assert_eq!(ids, vec!["windows".to_string(), "default".to_string()]);

        let fv = tokens[0].as_field_value().unwrap();
        assert_eq!(fv.field.generic_name("windows"), "EventID");
        assert!(fv.field.is_mapped_for("windows"));
    }

    struct ConfProbe;
    impl ConfRuleLoader for ConfProbe {}

    #[test]
    fn conf_loader_reads_stanza_values() {
        let text = "[alert]\nsearch = EventCode=1\ndescription = suspicious\n";
        let probe = ConfProbe;
        assert_eq!(probe.conf_value(text, "search").as_deref(), Some("EventCode=1"));
        assert_eq!(probe.conf_value(text, "missing"), None);
    }
}
