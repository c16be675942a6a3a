//! The Lucene dialect family: tokenizer, parser, and renderer shared by
//! Elasticsearch, OpenSearch, and Graylog.

use std::sync::OnceLock;

use crate::error::{Diagnostic, TranslateError};
use crate::escape::{EscapeDetails, EscapeManager, ValueType};
use crate::ir::{Keyword, MetaInfoContainer, OperatorKind, SiemContainer, Value};
use crate::managers::PlatformDetails;
use crate::mapping::{LogSources, PlatformMappings};
use crate::parser::{resolve_source_mappings, QueryParser};
use crate::render::QueryRender;
use crate::tokenizer::{QueryTokenizer, TokenizerSettings};

pub fn lucene_tokenizer() -> &'static QueryTokenizer {
    static TOKENIZER: OnceLock<QueryTokenizer> = OnceLock::new();
    TOKENIZER.get_or_init(|| {
        QueryTokenizer::new(TokenizerSettings {
            field_pattern: r"(?P<field_name>[a-zA-Z0-9\._\-@]+)",
            value_pattern: r#"(?:"(?P<d_q_value>[^"]*)"|/(?P<re_value>[^/]*)/|(?P<no_q_value>[^\s()]+))"#,
            multi_value_pattern: Some(r"\((?P<value>[^)]+)\)"),
            keyword_pattern: Some(r#""(?P<value>[^"]+)"|(?P<value2>[^\s()]+)"#),
            single_value_operators: &[
                (":>=", OperatorKind::Gte),
                (":<=", OperatorKind::Lte),
                (":>", OperatorKind::Gt),
                (":<", OperatorKind::Lt),
                (":", OperatorKind::Eq),
            ],
            multi_value_operators: &[(":", OperatorKind::In)],
            multi_value_delimiter: "OR",
            wildcard_symbol: Some('*'),
        })
    })
}

/// Parser for Lucene query strings. The whole input is the boolean body:
/// the dialect has neither a log-source prefix nor a function pipeline.
pub struct LuceneParser {
    details: PlatformDetails,
    mappings: &'static PlatformMappings,
}

impl LuceneParser {
    pub fn new(details: PlatformDetails, mappings: &'static PlatformMappings) -> Self {
        Self { details, mappings }
    }

    pub(crate) fn parse_lucene_query(
        &self,
        query: &str,
        meta_info: MetaInfoContainer,
    ) -> Result<SiemContainer, TranslateError> {
        let mut tokens = lucene_tokenizer().tokenize(query)?;
        let mut functions = Default::default();
        let ids = resolve_source_mappings(
            &mut tokens,
            &mut functions,
            self.mappings,
            &LogSources::new(),
        );
        Ok(SiemContainer::new(tokens, meta_info.with_source_mapping_ids(ids))
            .with_functions(functions))
    }
}

impl QueryParser for LuceneParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.parse_lucene_query(text, MetaInfoContainer::default())
    }
}

/// Renderer for Lucene targets.
pub struct LuceneQueryRender {
    details: PlatformDetails,
    mappings: &'static PlatformMappings,
    escape: EscapeManager,
}

impl LuceneQueryRender {
    pub fn new(details: PlatformDetails, mappings: &'static PlatformMappings) -> Self {
        Self {
            details,
            mappings,
            escape: EscapeManager::new(vec![
                (
                    ValueType::Value,
                    EscapeDetails::new(r#"([+\-!(){}\[\]^"~?:\\/\s])"#),
                ),
                (
                    ValueType::RegexValue,
                    EscapeDetails::new(r"([/\\])"),
                ),
            ]),
        }
    }

    fn bare(&self, value: &Value) -> String {
        match value {
            Value::Num(num) => num.to_string(),
            scalar => self.escape.escape(&scalar.to_string(), ValueType::Value),
        }
    }
}

impl QueryRender for LuceneQueryRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &PlatformMappings {
        self.mappings
    }

    fn supports_in_operator(&self) -> bool {
        false
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: OperatorKind,
        value: &Value,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        let rendered = match operator {
            OperatorKind::Eq => format!("{target_field}:{}", self.bare(value)),
            OperatorKind::NotEq => format!("(NOT {target_field}:{})", self.bare(value)),
            OperatorKind::Gt => format!("{target_field}:>{}", self.bare(value)),
            OperatorKind::Gte => format!("{target_field}:>={}", self.bare(value)),
            OperatorKind::Lt => format!("{target_field}:<{}", self.bare(value)),
            OperatorKind::Lte => format!("{target_field}:<={}", self.bare(value)),
            OperatorKind::Contains => format!("{target_field}:*{}*", self.bare(value)),
            OperatorKind::StartsWith => format!("{target_field}:{}*", self.bare(value)),
            OperatorKind::EndsWith => format!("{target_field}:*{}", self.bare(value)),
            OperatorKind::Regex => format!(
                "{target_field}:/{}/",
                self.escape.escape(&value.to_string(), ValueType::RegexValue)
            ),
            // no native IN; the engine expands lists before reaching here
            OperatorKind::In => format!("{target_field}:{}", self.bare(value)),
            OperatorKind::Keyword => self.bare(value),
        };
        Ok(rendered)
    }

    fn keyword_render(
        &self,
        keyword: &Keyword,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        Ok(self.escape.escape(&keyword.value, ValueType::Value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Token;

    #[test]
    fn tokenizes_field_colon_value() {
        let tokens = lucene_tokenizer()
            .tokenize(r#"event.code:4688 AND process.name:"cmd.exe""#)
            .unwrap();
        assert_eq!(tokens.len(), 3);
        let first = tokens[0].as_field_value().unwrap();
        assert_eq!(first.field.source_name, "event.code");
        assert_eq!(first.value, Value::Num(4688));
    }

    #[test]
    fn tokenizes_grouped_or_list_as_multi_value() {
        let tokens = lucene_tokenizer()
            .tokenize("event.code:(4624 OR 4625)")
            .unwrap();
        let fv = tokens[0].as_field_value().unwrap();
        assert_eq!(fv.operator_kind(), OperatorKind::In);
        assert_eq!(
            fv.value,
            Value::List(vec![Value::Num(4624), Value::Num(4625)])
        );
    }

    #[test]
    fn tokenizes_range_operators() {
        let tokens = lucene_tokenizer().tokenize("event.severity:>=3").unwrap();
        let fv = tokens[0].as_field_value().unwrap();
        assert_eq!(fv.operator_kind(), OperatorKind::Gte);
    }

    #[test]
    fn tokenizes_wildcard_values() {
        let tokens = lucene_tokenizer()
            .tokenize("process.command_line:*powershell*")
            .unwrap();
        let fv = tokens[0].as_field_value().unwrap();
        assert_eq!(fv.operator_kind(), OperatorKind::Contains);
        assert_eq!(fv.value, Value::Str("powershell".to_string()));
    }

    #[test]
    fn tokenizes_regex_literal() {
        let tokens = lucene_tokenizer()
            .tokenize("process.name:/pow.+shell/")
            .unwrap();
        let fv = tokens[0].as_field_value().unwrap();
        assert_eq!(fv.operator_kind(), OperatorKind::Regex);
        assert_eq!(fv.value, Value::Str("pow.+shell".to_string()));
    }

    #[test]
    fn bare_terms_are_keywords() {
        let tokens = lucene_tokenizer().tokenize("mimikatz").unwrap();
        assert!(matches!(tokens[0], Token::Keyword(_)));
    }
}
