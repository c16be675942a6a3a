//! LogScale query and alert parsers.

use std::sync::OnceLock;

use super::consts::{logscale_alert_details, logscale_query_details};
use super::mapping::logscale_mappings;
use crate::error::TranslateError;
use crate::ir::{MetaInfoContainer, OperatorKind, SiemContainer};
use crate::managers::PlatformDetails;
use crate::mapping::LogSources;
use crate::parser::{resolve_source_mappings, split_pipeline, JsonRuleLoader, QueryParser};
use crate::tokenizer::{QueryTokenizer, TokenizerSettings};

pub fn logscale_tokenizer() -> &'static QueryTokenizer {
    static TOKENIZER: OnceLock<QueryTokenizer> = OnceLock::new();
    TOKENIZER.get_or_init(|| {
        QueryTokenizer::new(TokenizerSettings {
            field_pattern: r"(?P<field_name>[a-zA-Z0-9\._\-#@]+)",
            value_pattern: r#"(?:"(?P<d_q_value>[^"]*)"|/(?P<re_value>[^/]*)/|(?P<no_q_value>[^\s()|]+))"#,
            multi_value_pattern: None,
            keyword_pattern: Some(r#""?(?P<value>[^\s()|"]+)"?"#),
            single_value_operators: &[
                ("!=", OperatorKind::NotEq),
                (">=", OperatorKind::Gte),
                ("<=", OperatorKind::Lte),
                (">", OperatorKind::Gt),
                ("<", OperatorKind::Lt),
                ("=", OperatorKind::Eq),
            ],
            multi_value_operators: &[],
            multi_value_delimiter: ",",
            wildcard_symbol: Some('*'),
        })
    })
}

pub struct LogScaleParser {
    details: PlatformDetails,
}

impl Default for LogScaleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogScaleParser {
    pub fn new() -> Self {
        Self {
            details: logscale_query_details(),
        }
    }

    pub(crate) fn parse_logscale_query(
        &self,
        query: &str,
        meta_info: MetaInfoContainer,
    ) -> Result<SiemContainer, TranslateError> {
        let segments = split_pipeline(query);
        let mut functions = crate::ir::ParsedFunctions::default();
        for segment in &segments[1..] {
            let name = segment
                .split(['(', ' '])
                .next()
                .unwrap_or_default()
                .to_lowercase();
            if !name.is_empty() {
                functions.not_supported.push(name);
            }
        }

        let mut tokens = logscale_tokenizer().tokenize(&segments[0])?;
        let ids = resolve_source_mappings(
            &mut tokens,
            &mut functions,
            logscale_mappings(),
            &LogSources::new(),
        );
        Ok(SiemContainer::new(tokens, meta_info.with_source_mapping_ids(ids))
            .with_functions(functions))
    }
}

impl QueryParser for LogScaleParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.parse_logscale_query(text, MetaInfoContainer::default())
    }
}

/// Parses an alert JSON document (`name`, `description`, `query.queryString`).
pub struct LogScaleAlertParser {
    details: PlatformDetails,
    inner: LogScaleParser,
}

impl Default for LogScaleAlertParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRuleLoader for LogScaleAlertParser {}

impl LogScaleAlertParser {
    pub fn new() -> Self {
        Self {
            details: logscale_alert_details(),
            inner: LogScaleParser::new(),
        }
    }
}

impl QueryParser for LogScaleAlertParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        let rule = self.load_json_rule(text)?;
        let query = rule["query"]["queryString"]
            .as_str()
            .or_else(|| rule["queryString"].as_str())
            .ok_or_else(|| {
                TranslateError::RuleDocument("alert carries no `queryString` field".to_string())
            })?;

        let mut meta = MetaInfoContainer::default();
        if let Some(name) = rule["name"].as_str() {
            meta.title = name.to_string();
        }
        if let Some(description) = rule["description"].as_str() {
            meta.description = description.to_string();
        }
        self.inner.parse_logscale_query(query, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Value;

    #[test]
    fn parses_field_comparisons() {
        let container = LogScaleParser::new()
            .parse(r#"EventID=4688 CommandLine="*-enc*""#)
            .unwrap();
        assert_eq!(container.tokens.len(), 2);
        let second = container.tokens[1].as_field_value().unwrap();
        assert_eq!(second.operator_kind(), OperatorKind::Contains);
        assert_eq!(second.value, Value::Str("-enc".to_string()));
    }

    #[test]
    fn pipe_tail_collects_unsupported_functions() {
        let container = LogScaleParser::new()
            .parse("EventID=1 | groupBy(field=[User]) | tail(200)")
            .unwrap();
        assert_eq!(
            container.functions.not_supported,
            vec!["groupby".to_string(), "tail".to_string()]
        );
    }

    #[test]
    fn parses_alert_document() {
        let alert = serde_json::json!({
            "name": "Encoded PowerShell",
            "description": "Detects encoded commands",
            "query": { "queryString": "CommandLine=\"*-enc*\"", "start": "1h" }
        });
        let container = LogScaleAlertParser::new().parse(&alert.to_string()).unwrap();
        assert_eq!(container.meta_info.title, "Encoded PowerShell");
        assert_eq!(container.tokens.len(), 1);
    }
}
