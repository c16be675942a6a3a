//! The SQL dialect family: tokenizer, parser, and renderer shared by
//! QRadar AQL and Athena SQL.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{diagnostic_codes, Diagnostic, TranslateError};
use crate::escape::{EscapeDetails, EscapeManager, ValueType};
use crate::ir::{
    Field, FuncArg, Function, Keyword, MetaInfoContainer, OperatorKind, ParsedFunctions,
    SiemContainer, SortArg, SortOrder, Value,
};
use crate::managers::PlatformDetails;
use crate::mapping::{LogSources, PlatformMappings, SourceMapping};
use crate::parser::{resolve_source_mappings, QueryParser};
use crate::render::QueryRender;
use crate::tokenizer::{QueryTokenizer, TokenizerSettings};

pub fn sql_tokenizer() -> &'static QueryTokenizer {
    static TOKENIZER: OnceLock<QueryTokenizer> = OnceLock::new();
    TOKENIZER.get_or_init(|| {
        QueryTokenizer::new(TokenizerSettings {
            field_pattern: r#"(?P<field_name>"[^"]+"|[a-zA-Z0-9\._]+)"#,
            value_pattern: r"(?:'(?P<s_q_value>[^']*)'|(?P<no_q_value>[^\s(),]+))",
            multi_value_pattern: Some(r"\((?P<value>[^)]+)\)"),
            keyword_pattern: None,
            single_value_operators: &[
                ("!=", OperatorKind::NotEq),
                ("<>", OperatorKind::NotEq),
                (">=", OperatorKind::Gte),
                ("<=", OperatorKind::Lte),
                (">", OperatorKind::Gt),
                ("<", OperatorKind::Lt),
                ("=", OperatorKind::Eq),
                ("ilike", OperatorKind::Eq),
                ("like", OperatorKind::Eq),
                ("matches", OperatorKind::Regex),
            ],
            multi_value_operators: &[("in", OperatorKind::In)],
            multi_value_delimiter: ",",
            wildcard_symbol: Some('%'),
        })
    })
}

fn select_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?is)^\s*select\s+.+?\s+from\s+(?P<table>[\w\."]+)(?:\s+where\s+(?P<where>.+))?\s*$"#,
        )
        .expect("valid select pattern")
    })
}

fn group_by_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // applied after the order-by and trailer strips, so the clause runs to
    // the end of the text
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\s+group\s+by\s+(?P<fields>[\w\.,\s]+)$").expect("valid group by pattern")
    })
}

fn order_by_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\s+order\s+by\s+(?P<field>[\w\.]+)(?:\s+(?P<dir>asc|desc))?")
            .expect("valid order by pattern")
    })
}

fn tail_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\s+(?P<name>last|limit|start|stop)\s+[\w'\s]*$")
            .expect("valid tail pattern")
    })
}

/// Parser for SQL-family query text.
pub struct SqlParser {
    details: PlatformDetails,
    mappings: &'static PlatformMappings,
}

impl SqlParser {
    pub fn new(details: PlatformDetails, mappings: &'static PlatformMappings) -> Self {
        Self { details, mappings }
    }

    pub(crate) fn parse_sql_query(
        &self,
        query: &str,
        meta_info: MetaInfoContainer,
    ) -> Result<SiemContainer, TranslateError> {
        let mut log_sources = LogSources::new();
        let mut body = query.trim().to_string();

        if let Some(caps) = select_pattern().captures(query) {
            let table = caps["table"].trim_matches('"').to_string();
            log_sources.insert("table".to_string(), vec![table]);
            body = caps
                .name("where")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
        }

        let mut functions = ParsedFunctions::default();
        if let Some(caps) = tail_pattern().captures(&body) {
            functions
                .not_supported
                .push(caps["name"].to_lowercase());
            body = tail_pattern().replace(&body, "").into_owned();
        }
        if let Some(caps) = order_by_pattern().captures(&body) {
            let order = match caps.name("dir").map(|m| m.as_str().to_lowercase()) {
                Some(dir) if dir == "desc" => SortOrder::Desc,
                _ => SortOrder::Asc,
            };
            let sort = SortArg::new(Field::new(caps["field"].to_string()), order);
            functions
                .functions
                .push(Function::new("sort").with_args(vec![FuncArg::Sort(sort)]));
            body = order_by_pattern().replace(&body, "").into_owned();
        }
        if let Some(caps) = group_by_pattern().captures(&body) {
            let by_clauses = caps["fields"]
                .split(',')
                .filter(|piece| !piece.trim().is_empty())
                .map(|piece| Field::new(piece.trim()))
                .collect();
            functions
                .functions
                .push(Function::new("stats").with_by_clauses(by_clauses));
            body = group_by_pattern().replace(&body, "").into_owned();
        }

        let mut tokens = sql_tokenizer().tokenize(body.trim())?;
        let ids =
            resolve_source_mappings(&mut tokens, &mut functions, self.mappings, &log_sources);
        Ok(SiemContainer::new(tokens, meta_info.with_source_mapping_ids(ids))
            .with_functions(functions))
    }
}

impl QueryParser for SqlParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.parse_sql_query(text, MetaInfoContainer::default())
    }
}

/// How the dialect spells a regular-expression predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlRegexStyle {
    /// QRadar: `field MATCHES 'pattern'`
    Matches,
    /// Athena: `REGEXP_LIKE(field, 'pattern')`
    RegexpLike,
}

/// Renderer for SQL-family targets.
pub struct SqlQueryRender {
    details: PlatformDetails,
    mappings: &'static PlatformMappings,
    like_operator: &'static str,
    regex_style: SqlRegexStyle,
    escape: EscapeManager,
}

impl SqlQueryRender {
    pub fn new(
        details: PlatformDetails,
        mappings: &'static PlatformMappings,
        like_operator: &'static str,
        regex_style: SqlRegexStyle,
    ) -> Self {
        Self {
            details,
            mappings,
            like_operator,
            regex_style,
            // single quotes escape by doubling
            escape: EscapeManager::new(vec![(
                ValueType::Value,
                EscapeDetails::new("(')").with_escape_char("'"),
            )]),
        }
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Num(num) => num.to_string(),
            scalar => format!("'{}'", self.escape.escape(&scalar.to_string(), ValueType::Value)),
        }
    }

    fn like(&self, target_field: &str, value: &Value, prefix: &str, suffix: &str) -> String {
        format!(
            "{target_field} {} '{}{}{}'",
            self.like_operator,
            prefix,
            self.escape.escape(&value.to_string(), ValueType::Value),
            suffix
        )
    }

    fn quote_field(target_field: &str) -> String {
        if target_field.contains(' ') && !target_field.starts_with('"') {
            format!("\"{target_field}\"")
        } else {
            target_field.to_string()
        }
    }
}

impl QueryRender for SqlQueryRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &PlatformMappings {
        self.mappings
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: OperatorKind,
        value: &Value,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        let field = Self::quote_field(target_field);
        let rendered = match operator {
            OperatorKind::Eq => format!("{field}={}", self.literal(value)),
            OperatorKind::NotEq => format!("{field}<>{}", self.literal(value)),
            OperatorKind::Gt => format!("{field}>{value}"),
            OperatorKind::Gte => format!("{field}>={value}"),
            OperatorKind::Lt => format!("{field}<{value}"),
            OperatorKind::Lte => format!("{field}<={value}"),
            OperatorKind::Contains => self.like(&field, value, "%", "%"),
            OperatorKind::StartsWith => self.like(&field, value, "", "%"),
            OperatorKind::EndsWith => self.like(&field, value, "%", ""),
            OperatorKind::Regex => match self.regex_style {
                SqlRegexStyle::Matches => {
                    format!("{field} MATCHES {}", self.literal(value))
                }
                SqlRegexStyle::RegexpLike => {
                    format!("REGEXP_LIKE({field}, {})", self.literal(value))
                }
            },
            OperatorKind::In => {
                let items: Vec<String> =
                    value.scalars().iter().map(|item| self.literal(item)).collect();
                format!("{field} IN ({})", items.join(", "))
            }
            OperatorKind::Keyword => format!("UTF8(payload) {} '%{value}%'", self.like_operator),
        };
        Ok(rendered)
    }

    fn keyword_render(
        &self,
        keyword: &Keyword,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        Ok(format!(
            "UTF8(payload) {} '%{}%'",
            self.like_operator,
            self.escape.escape(&keyword.value, ValueType::Value)
        ))
    }

    fn render_functions(
        &self,
        functions: &ParsedFunctions,
        _mapping: &SourceMapping,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        let mut tail = String::new();
        for function in &functions.functions {
            match function.name.as_str() {
                "stats" if !function.by_clauses.is_empty() => {
                    let fields: Vec<&str> = function
                        .by_clauses
                        .iter()
                        .map(|field| field.source_name.as_str())
                        .collect();
                    tail.push_str(&format!(" GROUP BY {}", fields.join(", ")));
                }
                "sort" => {
                    if let Some(FuncArg::Sort(sort)) = function.args.first() {
                        let direction = match sort.order {
                            SortOrder::Desc => " DESC",
                            SortOrder::Asc => "",
                        };
                        tail.push_str(&format!(
                            " ORDER BY {}{direction}",
                            sort.field.source_name
                        ));
                    }
                }
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

    fn finalize_query(
        &self,
        log_source: Option<&str>,
        body: String,
        functions_tail: String,
    ) -> String {
        let table = log_source.unwrap_or("events");
        if body.is_empty() {
            format!("SELECT * FROM {table}{functions_tail}")
        } else {
            format!("SELECT * FROM {table} WHERE {body}{functions_tail}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_wrapper() {
        let parser = test_parser();
        let container = parser
            .parse("SELECT * FROM events WHERE username='admin'")
            .unwrap();
        assert_eq!(container.tokens.len(), 1);
        assert_eq!(
            container.meta_info.source_mapping_ids.last().map(String::as_str),
            Some("default")
        );
    }

    #[test]
    fn parses_bare_where_clause() {
        let parser = test_parser();
        let container = parser.parse("username='admin'").unwrap();
        let fv = container.tokens[0].as_field_value().unwrap();
        assert_eq!(fv.field.source_name, "username");
        assert_eq!(fv.value, Value::Str("admin".to_string()));
    }

    #[test]
    fn like_wildcards_normalize() {
        let tokens = sql_tokenizer()
            .tokenize("command ILIKE '%powershell%'")
            .unwrap();
        let fv = tokens[0].as_field_value().unwrap();
        assert_eq!(fv.operator_kind(), OperatorKind::Contains);
        assert_eq!(fv.value, Value::Str("powershell".to_string()));
    }

    #[test]
    fn group_by_becomes_stats_function() {
        let parser = test_parser();
        let container = parser
            .parse("SELECT * FROM events WHERE username='a' GROUP BY username")
            .unwrap();
        assert_eq!(container.functions.functions.len(), 1);
        assert_eq!(container.functions.functions[0].name, "stats");
    }

    #[test]
    fn quoted_custom_properties_parse_as_fields() {
        let tokens = sql_tokenizer()
            .tokenize(r#""File Hash"='abc'"#)
            .unwrap();
        let fv = tokens[0].as_field_value().unwrap();
        assert_eq!(fv.field.source_name, "\"File Hash\"");
    }

    fn test_parser() -> SqlParser {
        static MAPPINGS: OnceLock<PlatformMappings> = OnceLock::new();
        let mappings = MAPPINGS.get_or_init(|| PlatformMappings::new(Vec::new()));
        SqlParser::new(
            PlatformDetails::new("sql-test", "SQL", "SQL", "Query", "sql"),
            mappings,
        )
    }
}
