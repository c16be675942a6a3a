//! The SPL dialect family: tokenizer, parser, and renderer shared by Splunk
//! and CrowdStrike.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{diagnostic_codes, Diagnostic, TranslateError};
use crate::escape::{EscapeDetails, EscapeManager, ValueType};
use crate::ir::{
    Field, FuncArg, Function, MetaInfoContainer, OperatorKind, ParsedFunctions, SiemContainer,
    SortArg, SortOrder, Value,
};
use crate::managers::PlatformDetails;
use crate::mapping::PlatformMappings;
use crate::parser::{extract_log_sources, resolve_source_mappings, split_pipeline, QueryParser};
use crate::render::QueryRender;
use crate::tokenizer::{QueryTokenizer, TokenizerSettings};

pub fn spl_tokenizer() -> &'static QueryTokenizer {
    static TOKENIZER: OnceLock<QueryTokenizer> = OnceLock::new();
    TOKENIZER.get_or_init(|| {
        QueryTokenizer::new(TokenizerSettings {
            field_pattern: r"(?P<field_name>[a-zA-Z0-9\._\-{}]+)",
            value_pattern: r#"(?:"(?P<d_q_value>[^"]*)"|(?P<no_q_value>[^\s()]+))"#,
            multi_value_pattern: Some(r"\((?P<value>[^)]+)\)"),
            keyword_pattern: Some(r#""?(?P<value>[^\s()"]+)"?"#),
            single_value_operators: &[
                ("!=", OperatorKind::NotEq),
                (">=", OperatorKind::Gte),
                ("<=", OperatorKind::Lte),
                (">", OperatorKind::Gt),
                ("<", OperatorKind::Lt),
                ("=", OperatorKind::Eq),
            ],
            multi_value_operators: &[("in", OperatorKind::In)],
            multi_value_delimiter: ",",
            wildcard_symbol: Some('*'),
        })
    })
}

fn log_source_patterns() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |key: &str| {
            Regex::new(&format!(r#"(?i)\b{key}\s*=\s*"?(?P<value>[^\s"]+)"?\s*"#))
                .expect("valid log source pattern")
        };
        vec![
            ("sourcetype", compile("sourcetype")),
            ("source", compile("source")),
            ("index", compile("index")),
            ("eventtype", compile("eventtype")),
        ]
    })
}

/// Parses the pipe tail into the canonical function model. Unknown pipe
/// commands are collected, not fatal.
pub fn parse_spl_functions(segments: &[String]) -> ParsedFunctions {
    let mut parsed = ParsedFunctions::default();
    for segment in segments {
        let segment = segment.trim();
        let name = segment
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match name.as_str() {
            "stats" => parsed.functions.push(parse_stats(segment)),
            "table" | "fields" => parsed.functions.push(parse_table(segment)),
            "sort" => parsed.functions.push(parse_sort(segment)),
            "" => {}
            other => parsed.not_supported.push(other.to_string()),
        }
    }
    parsed
}

fn aggregation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?P<func>[a-zA-Z_]+)(?:\((?P<arg>[^)]*)\))?(?:\s+as\s+(?P<alias>\w+))?")
            .expect("valid aggregation pattern")
    })
}

fn parse_stats(segment: &str) -> Function {
    let body = segment.trim_start_matches("stats").trim();
    let (aggregations, by_part) = match split_by_clause(body) {
        Some((left, right)) => (left, Some(right)),
        None => (body.to_string(), None),
    };

    let mut function = Function::new("stats");
    for piece in aggregations.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if let Some(caps) = aggregation_pattern().captures(piece) {
            let mut agg = Function::new(caps["func"].to_lowercase());
            if let Some(arg) = caps.name("arg") {
                if !arg.as_str().trim().is_empty() {
                    agg.args
                        .push(FuncArg::Field(Field::new(arg.as_str().trim())));
                }
            }
            if let Some(alias) = caps.name("alias") {
                agg.alias = Some(alias.as_str().to_string());
            }
            function.args.push(FuncArg::Function(agg));
        }
    }
    if let Some(by_part) = by_part {
        function.by_clauses = by_part
            .split([',', ' '])
            .filter(|piece| !piece.trim().is_empty())
            .map(|piece| Field::new(piece.trim()))
            .collect();
    }
    function
}

fn split_by_clause(body: &str) -> Option<(String, String)> {
    let lowered = body.to_lowercase();
    lowered
        .find(" by ")
        .map(|pos| (body[..pos].to_string(), body[pos + 4..].to_string()))
}

fn parse_table(segment: &str) -> Function {
    let body = segment
        .trim_start_matches("table")
        .trim_start_matches("fields")
        .trim();
    let args = body
        .split([',', ' '])
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| FuncArg::Field(Field::new(piece.trim())))
        .collect();
    Function::new("table").with_args(args)
}

fn parse_sort(segment: &str) -> Function {
    let body = segment.trim_start_matches("sort").trim();
    let args = body
        .split([',', ' '])
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| {
            let piece = piece.trim();
            let (order, name) = match piece.strip_prefix('-') {
                Some(name) => (SortOrder::Desc, name),
                None => (SortOrder::Asc, piece.strip_prefix('+').unwrap_or(piece)),
            };
            FuncArg::Sort(SortArg::new(Field::new(name), order))
        })
        .collect();
    Function::new("sort").with_args(args)
}

/// Parser for SPL-family query text.
pub struct SplParser {
    details: PlatformDetails,
    mappings: &'static PlatformMappings,
}

impl SplParser {
    pub fn new(details: PlatformDetails, mappings: &'static PlatformMappings) -> Self {
        Self { details, mappings }
    }

    /// Shared with the alert parser, which supplies its own meta info.
    pub(crate) fn parse_spl_query(
        &self,
        query: &str,
        meta_info: MetaInfoContainer,
    ) -> Result<SiemContainer, TranslateError> {
        let segments = split_pipeline(query);
        let head = segments[0]
            .trim()
            .trim_start_matches("search ")
            .trim()
            .to_string();
        let mut functions = parse_spl_functions(&segments[1..]);

        let patterns: Vec<(&str, &Regex)> = log_source_patterns()
            .iter()
            .map(|(key, regex)| (*key, regex))
            .collect();
        let (log_sources, residual) = extract_log_sources(&head, &patterns);

        let mut tokens = spl_tokenizer().tokenize(&residual)?;
        let ids =
            resolve_source_mappings(&mut tokens, &mut functions, self.mappings, &log_sources);
        Ok(SiemContainer::new(tokens, meta_info.with_source_mapping_ids(ids))
            .with_functions(functions))
    }
}

impl QueryParser for SplParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.parse_spl_query(text, MetaInfoContainer::default())
    }
}

/// Renderer for SPL-family targets. Conjunction is implicit whitespace.
pub struct SplQueryRender {
    details: PlatformDetails,
    mappings: &'static PlatformMappings,
    escape: EscapeManager,
}

impl SplQueryRender {
    pub fn new(details: PlatformDetails, mappings: &'static PlatformMappings) -> Self {
        Self {
            details,
            mappings,
            escape: EscapeManager::new(vec![(ValueType::Value, EscapeDetails::new(r#"([\\"])"#))]),
        }
    }

    fn quoted(&self, value: &Value) -> String {
        match value {
            Value::Num(num) => num.to_string(),
            scalar => format!("\"{}\"", self.escape.escape(&scalar.to_string(), ValueType::Value)),
        }
    }

    fn wildcarded(&self, value: &Value, prefix: &str, suffix: &str) -> String {
        format!(
            "\"{}{}{}\"",
            prefix,
            self.escape.escape(&value.to_string(), ValueType::Value),
            suffix
        )
    }
}

impl QueryRender for SplQueryRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &PlatformMappings {
        self.mappings
    }

    fn and_token(&self) -> &'static str {
        ""
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: OperatorKind,
        value: &Value,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        let rendered = match operator {
            OperatorKind::Eq => format!("{target_field}={}", self.quoted(value)),
            OperatorKind::NotEq => format!("{target_field}!={}", self.quoted(value)),
            OperatorKind::Gt => format!("{target_field}>{value}"),
            OperatorKind::Gte => format!("{target_field}>={value}"),
            OperatorKind::Lt => format!("{target_field}<{value}"),
            OperatorKind::Lte => format!("{target_field}<={value}"),
            OperatorKind::Contains => {
                format!("{target_field}={}", self.wildcarded(value, "*", "*"))
            }
            OperatorKind::StartsWith => {
                format!("{target_field}={}", self.wildcarded(value, "", "*"))
            }
            OperatorKind::EndsWith => {
                format!("{target_field}={}", self.wildcarded(value, "*", ""))
            }
            OperatorKind::Regex => {
                diagnostics.push(Diagnostic::warning(
                    diagnostic_codes::UNSUPPORTED_OPERATOR,
                    format!(
                        "regular-expression match on `{target_field}` downgraded to a literal match"
                    ),
                ));
                format!("{target_field}={}", self.quoted(value))
            }
            OperatorKind::In => {
                let items: Vec<String> =
                    value.scalars().iter().map(|item| self.quoted(item)).collect();
                format!("{target_field} IN ({})", items.join(", "))
            }
            OperatorKind::Keyword => format!("\"{value}\""),
        };
        Ok(rendered)
    }

    fn render_functions(
        &self,
        functions: &ParsedFunctions,
        _mapping: &crate::mapping::SourceMapping,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        let mut tail = String::new();
        for function in &functions.functions {
            match function.name.as_str() {
                "stats" => tail.push_str(&render_stats(function)),
                "table" => tail.push_str(&render_table(function)),
                "sort" => tail.push_str(&render_sort(function)),
                other => diagnostics.push(Diagnostic::warning(
                    diagnostic_codes::UNSUPPORTED_FUNCTION,
                    format!("function `{other}` is not supported by {}", self.details.siem_type),
                )),
            }
        }
        for name in &functions.not_supported {
            diagnostics.push(Diagnostic::warning(
                diagnostic_codes::UNMAPPED_FUNCTION,
                format!("function `{name}` was not recognized in the source query"),
            ));
        }
        tail
    }
}

fn render_stats(function: &Function) -> String {
    let mut aggregations = Vec::new();
    for arg in &function.args {
        if let FuncArg::Function(agg) = arg {
            let mut piece = match agg.args.first() {
                Some(FuncArg::Field(field)) => format!("{}({})", agg.name, field.source_name),
                _ => agg.name.clone(),
            };
            if let Some(alias) = &agg.alias {
                piece.push_str(&format!(" as {alias}"));
            }
            aggregations.push(piece);
        }
    }
    let mut out = format!(" | stats {}", aggregations.join(", "));
    if !function.by_clauses.is_empty() {
        let fields: Vec<&str> = function
            .by_clauses
            .iter()
            .map(|field| field.source_name.as_str())
            .collect();
        out.push_str(&format!(" by {}", fields.join(", ")));
    }
    out
}

fn render_table(function: &Function) -> String {
    let fields: Vec<&str> = function
        .args
        .iter()
        .filter_map(|arg| match arg {
            FuncArg::Field(field) => Some(field.source_name.as_str()),
            _ => None,
        })
        .collect();
    format!(" | table {}", fields.join(", "))
}

fn render_sort(function: &Function) -> String {
    let keys: Vec<String> = function
        .args
        .iter()
        .filter_map(|arg| match arg {
            FuncArg::Sort(sort) => Some(match sort.order {
                SortOrder::Desc => format!("-{}", sort.field.source_name),
                SortOrder::Asc => sort.field.source_name.clone(),
            }),
            _ => None,
        })
        .collect();
    format!(" | sort {}", keys.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Token;

    #[test]
    fn parses_stats_with_by_clause() {
        let parsed = parse_spl_functions(&["stats count(EventCode) as total by user, host"
            .to_string()]);
        assert_eq!(parsed.functions.len(), 1);
        let stats = &parsed.functions[0];
        assert_eq!(stats.name, "stats");
        assert_eq!(stats.by_clauses.len(), 2);
        match &stats.args[0] {
            FuncArg::Function(agg) => {
                assert_eq!(agg.name, "count");
                assert_eq!(agg.alias.as_deref(), Some("total"));
            }
            other => panic!("unexpected arg: {other:?}"),
        }
    }

    #[test]
    fn unknown_pipe_commands_are_collected() {
        let parsed = parse_spl_functions(&["eval x=1".to_string(), "table user".to_string()]);
        assert_eq!(parsed.not_supported, vec!["eval".to_string()]);
        assert_eq!(parsed.functions.len(), 1);
    }

    #[test]
    fn sort_parses_direction() {
        let parsed = parse_spl_functions(&["sort -count, user".to_string()]);
        match &parsed.functions[0].args[0] {
            FuncArg::Sort(sort) => {
                assert_eq!(sort.order, SortOrder::Desc);
                assert_eq!(sort.field.source_name, "count");
            }
            other => panic!("unexpected arg: {other:?}"),
        }
    }

    #[test]
    fn stats_round_trips_through_render() {
        let parsed = parse_spl_functions(&["stats count by user".to_string()]);
        assert_eq!(render_stats(&parsed.functions[0]), " | stats count by user");
    }

    #[test]
    fn tokenizer_handles_spl_field_values() {
        let tokens = spl_tokenizer()
            .tokenize(r#"EventCode=4688 CommandLine="*powershell*""#)
            .unwrap();
        assert_eq!(tokens.len(), 2);
        let second = tokens[1].as_field_value().unwrap();
        assert_eq!(second.operator_kind(), OperatorKind::Contains);
    }

    #[test]
    fn tokenizer_accepts_keyword_only_query() {
        let tokens = spl_tokenizer().tokenize(r#""mimikatz""#).unwrap();
        assert!(matches!(tokens[0], Token::Keyword(_)));
    }
}
