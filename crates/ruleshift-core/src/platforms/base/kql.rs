//! The KQL dialect family: tokenizer, parser, and renderer shared by
//! Microsoft Sentinel and Microsoft Defender.

use std::sync::OnceLock;

use crate::error::{diagnostic_codes, Diagnostic, TranslateError};
use crate::escape::{EscapeDetails, EscapeManager, ValueType};
use crate::ir::{
    Field, FuncArg, Function, Keyword, MetaInfoContainer, OperatorKind, ParsedFunctions,
    SiemContainer, SortArg, SortOrder, Value,
};
use crate::managers::PlatformDetails;
use crate::mapping::{LogSources, PlatformMappings, SourceMapping};
use crate::parser::{resolve_source_mappings, split_pipeline, QueryParser};
use crate::render::QueryRender;
use crate::tokenizer::{QueryTokenizer, TokenizerSettings};

pub fn kql_tokenizer() -> &'static QueryTokenizer {
    static TOKENIZER: OnceLock<QueryTokenizer> = OnceLock::new();
    TOKENIZER.get_or_init(|| {
        QueryTokenizer::new(TokenizerSettings {
            field_pattern: r"(?P<field_name>[a-zA-Z0-9_]+)",
            value_pattern: r#"(?:@?"(?P<d_q_value>[^"]*)"|'(?P<s_q_value>[^']*)'|(?P<no_q_value>[^\s(),]+))"#,
            multi_value_pattern: Some(r"\((?P<value>[^)]+)\)"),
            keyword_pattern: None,
            single_value_operators: &[
                ("==", OperatorKind::Eq),
                ("=~", OperatorKind::Eq),
                ("!=", OperatorKind::NotEq),
                ("!~", OperatorKind::NotEq),
                (">=", OperatorKind::Gte),
                ("<=", OperatorKind::Lte),
                (">", OperatorKind::Gt),
                ("<", OperatorKind::Lt),
                ("matches regex", OperatorKind::Regex),
                ("contains", OperatorKind::Contains),
                ("startswith", OperatorKind::StartsWith),
                ("endswith", OperatorKind::EndsWith),
                ("has", OperatorKind::Contains),
            ],
            multi_value_operators: &[("in~", OperatorKind::In), ("in", OperatorKind::In)],
            multi_value_delimiter: ",",
            wildcard_symbol: None,
        })
    })
}

/// Parses the pipe tail after the `where` segment into the canonical
/// function model.
pub fn parse_kql_functions(segments: &[String]) -> ParsedFunctions {
    let mut parsed = ParsedFunctions::default();
    for segment in segments {
        let segment = segment.trim();
        let lowered = segment.to_lowercase();
        if lowered.starts_with("summarize") {
            parsed.functions.push(parse_summarize(segment));
        } else if lowered.starts_with("project") {
            parsed.functions.push(parse_project(segment));
        } else if lowered.starts_with("sort by") || lowered.starts_with("order by") {
            parsed.functions.push(parse_order_by(segment));
        } else if !lowered.is_empty() {
            let name = lowered.split_whitespace().next().unwrap_or_default();
            parsed.not_supported.push(name.to_string());
        }
    }
    parsed
}

fn parse_summarize(segment: &str) -> Function {
    let body = segment["summarize".len()..].trim();
    let (aggregations, by_part) = match body.to_lowercase().find(" by ") {
        Some(pos) => (body[..pos].to_string(), Some(body[pos + 4..].to_string())),
        None => (body.to_string(), None),
    };

    let mut function = Function::new("stats");
    for piece in aggregations.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        // `total = count()` aliases through assignment.
        let (alias, call) = match piece.split_once('=') {
            Some((alias, call)) if !call.trim_start().starts_with('=') => {
                (Some(alias.trim().to_string()), call.trim())
            }
            _ => (None, piece),
        };
        let (name, arg) = match call.split_once('(') {
            Some((name, rest)) => (
                name.trim().to_lowercase(),
                rest.trim_end_matches(')').trim().to_string(),
            ),
            None => (call.trim().to_lowercase(), String::new()),
        };
        let mut agg = Function::new(name);
        if !arg.is_empty() {
            agg.args.push(FuncArg::Field(Field::new(arg)));
        }
        agg.alias = alias;
        function.args.push(FuncArg::Function(agg));
    }
    if let Some(by_part) = by_part {
        function.by_clauses = by_part
            .split(',')
            .filter(|piece| !piece.trim().is_empty())
            .map(|piece| Field::new(piece.trim()))
            .collect();
    }
    function
}

fn parse_project(segment: &str) -> Function {
    let body = segment["project".len()..].trim();
    let args = body
        .split(',')
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| FuncArg::Field(Field::new(piece.trim())))
        .collect();
    Function::new("table").with_args(args)
}

fn parse_order_by(segment: &str) -> Function {
    let body = segment
        .trim_start_matches("sort by")
        .trim_start_matches("order by")
        .trim();
    let args = body
        .split(',')
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| {
            let piece = piece.trim();
            let lowered = piece.to_lowercase();
            let (name, order) = if let Some(stripped) = lowered.strip_suffix(" desc") {
                (piece[..stripped.len()].trim(), SortOrder::Desc)
            } else if let Some(stripped) = lowered.strip_suffix(" asc") {
                (piece[..stripped.len()].trim(), SortOrder::Asc)
            } else {
                (piece, SortOrder::Asc)
            };
            FuncArg::Sort(SortArg::new(Field::new(name), order))
        })
        .collect();
    Function::new("sort").with_args(args)
}

/// Parser for KQL query text (`Table | where <expr> | ...`).
pub struct KqlParser {
    details: PlatformDetails,
    mappings: &'static PlatformMappings,
}

impl KqlParser {
    pub fn new(details: PlatformDetails, mappings: &'static PlatformMappings) -> Self {
        Self { details, mappings }
    }

    pub(crate) fn parse_kql_query(
        &self,
        query: &str,
        meta_info: MetaInfoContainer,
    ) -> Result<SiemContainer, TranslateError> {
        let segments = split_pipeline(query);

        let mut log_sources = LogSources::new();
        let mut body = None;
        let mut tail = Vec::new();
        for (index, segment) in segments.iter().enumerate() {
            let trimmed = segment.trim();
            if index == 0 {
                if !trimmed.is_empty() && !trimmed.contains(char::is_whitespace) {
                    log_sources.insert("table".to_string(), vec![trimmed.to_string()]);
                    continue;
                }
                // a bare boolean expression with no table prefix
                body = Some(trimmed.to_string());
                continue;
            }
            if body.is_none() {
                if let Some(rest) = trimmed
                    .strip_prefix("where ")
                    .or_else(|| trimmed.strip_prefix("WHERE "))
                {
                    body = Some(rest.trim().to_string());
                    continue;
                }
            }
            tail.push(trimmed.to_string());
        }

        let body = body.ok_or_else(|| {
            TranslateError::UnsupportedRoot("KQL query carries no `where` expression".to_string())
        })?;
        let mut functions = parse_kql_functions(&tail);
        let mut tokens = kql_tokenizer().tokenize(&body)?;
        let ids =
            resolve_source_mappings(&mut tokens, &mut functions, self.mappings, &log_sources);
        Ok(SiemContainer::new(tokens, meta_info.with_source_mapping_ids(ids))
            .with_functions(functions))
    }
}

impl QueryParser for KqlParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.parse_kql_query(text, MetaInfoContainer::default())
    }
}

/// Renderer for KQL targets. String comparisons use case-insensitive
/// operators and verbatim string literals.
pub struct KqlQueryRender {
    details: PlatformDetails,
    mappings: &'static PlatformMappings,
    escape: EscapeManager,
}

impl KqlQueryRender {
    pub fn new(details: PlatformDetails, mappings: &'static PlatformMappings) -> Self {
        Self {
            details,
            mappings,
            // verbatim string literals escape quotes by doubling
            escape: EscapeManager::new(vec![(
                ValueType::Value,
                EscapeDetails::new("(\")").with_escape_char("\""),
            )]),
        }
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Num(num) => num.to_string(),
            scalar => format!("@\"{}\"", self.escape.escape(&scalar.to_string(), ValueType::Value)),
        }
    }
}

impl QueryRender for KqlQueryRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &PlatformMappings {
        self.mappings
    }

    fn and_token(&self) -> &'static str {
        "and"
    }

    fn or_token(&self) -> &'static str {
        "or"
    }

    fn not_token(&self) -> &'static str {
        "not"
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: OperatorKind,
        value: &Value,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        let rendered = match operator {
            OperatorKind::Eq => match value {
                Value::Num(num) => format!("{target_field} == {num}"),
                scalar => format!("{target_field} =~ {}", self.literal(scalar)),
            },
            OperatorKind::NotEq => match value {
                Value::Num(num) => format!("{target_field} != {num}"),
                scalar => format!("{target_field} !~ {}", self.literal(scalar)),
            },
            OperatorKind::Gt => format!("{target_field} > {value}"),
            OperatorKind::Gte => format!("{target_field} >= {value}"),
            OperatorKind::Lt => format!("{target_field} < {value}"),
            OperatorKind::Lte => format!("{target_field} <= {value}"),
            OperatorKind::Contains => {
                format!("{target_field} contains {}", self.literal(value))
            }
            OperatorKind::StartsWith => {
                format!("{target_field} startswith {}", self.literal(value))
            }
            OperatorKind::EndsWith => {
                format!("{target_field} endswith {}", self.literal(value))
            }
            OperatorKind::Regex => {
                format!("{target_field} matches regex {}", self.literal(value))
            }
            OperatorKind::In => {
                let items: Vec<String> =
                    value.scalars().iter().map(|item| self.literal(item)).collect();
                format!("{target_field} in~ ({})", items.join(", "))
            }
            OperatorKind::Keyword => format!("* contains {}", self.literal(value)),
        };
        Ok(rendered)
    }

    fn keyword_render(
        &self,
        keyword: &Keyword,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        Ok(format!("* contains @\"{}\"", keyword.value))
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
                "stats" => tail.push_str(&render_summarize(function)),
                "table" => tail.push_str(&render_project(function)),
                "sort" => tail.push_str(&render_sort_by(function)),
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
        let table = log_source.unwrap_or("union *");
        format!("{table} | where {body}{functions_tail}")
    }
}

fn render_summarize(function: &Function) -> String {
    let mut aggregations = Vec::new();
    for arg in &function.args {
        if let FuncArg::Function(agg) = arg {
            let call = match agg.args.first() {
                Some(FuncArg::Field(field)) => format!("{}({})", agg.name, field.source_name),
                _ => format!("{}()", agg.name),
            };
            match &agg.alias {
                Some(alias) => aggregations.push(format!("{alias} = {call}")),
                None => aggregations.push(call),
            }
        }
    }
    let mut out = format!(" | summarize {}", aggregations.join(", "));
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

fn render_project(function: &Function) -> String {
    let fields: Vec<&str> = function
        .args
        .iter()
        .filter_map(|arg| match arg {
            FuncArg::Field(field) => Some(field.source_name.as_str()),
            _ => None,
        })
        .collect();
    format!(" | project {}", fields.join(", "))
}

fn render_sort_by(function: &Function) -> String {
    let keys: Vec<String> = function
        .args
        .iter()
        .filter_map(|arg| match arg {
            FuncArg::Sort(sort) => Some(match sort.order {
                SortOrder::Desc => format!("{} desc", sort.field.source_name),
                SortOrder::Asc => format!("{} asc", sort.field.source_name),
            }),
            _ => None,
        })
        .collect();
    format!(" | sort by {}", keys.join(", "))
}
