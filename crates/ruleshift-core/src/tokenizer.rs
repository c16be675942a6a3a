//! The config-driven query tokenizer.
//!
//! One engine serves every text dialect: a [`TokenizerSettings`] value names
//! the dialect's field/value/keyword patterns and operator tables, and
//! [`QueryTokenizer`] compiles them once at construction. The main loop
//! consumes the query from the head, trying parentheses, logical operators,
//! field comparisons, and bare keywords in that order.
//!
//! # Value group convention
//!
//! Value patterns communicate through named capture groups, tried in a fixed
//! priority order:
//!
//! - `num_value` — bare number, becomes [`Value::Num`]
//! - `d_q_value` — double-quoted content (quotes excluded)
//! - `s_q_value` — single-quoted content
//! - `re_value`  — regex literal content
//! - `no_q_value` — unquoted text, re-parsed as a number when digit-only
//! - `value`     — generic fallback

use regex::Regex;
use tracing::trace;

use crate::error::TranslateError;
use crate::ir::{
    Field, FieldValue, FuncArg, Identifier, Keyword, OperatorKind, ParsedFunctions, Token,
    TokenKind, Value,
};

/// Ordered operator table. Keys are lowercased at construction; insertion
/// order drives the generated alternation, so longer operators must precede
/// their prefixes (`>=` before `>`).
#[derive(Debug, Clone, Default)]
pub struct OperatorMap {
    entries: Vec<(String, OperatorKind)>,
}

impl OperatorMap {
    pub fn new(entries: &[(&str, OperatorKind)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(text, op)| (text.to_lowercase(), *op))
                .collect(),
        }
    }

    pub fn get(&self, text: &str) -> Option<OperatorKind> {
        let probe = text.to_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| *key == probe)
            .map(|(_, op)| *op)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn alternation(&self) -> String {
        self.entries
            .iter()
            .map(|(key, _)| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Dialect configuration consumed by [`QueryTokenizer::new`].
#[derive(Debug, Clone)]
pub struct TokenizerSettings {
    /// Must contain a `field_name` capture group.
    pub field_pattern: &'static str,
    /// Scalar value pattern following the value group convention.
    pub value_pattern: &'static str,
    /// List-valued pattern with a `value` group capturing the list body.
    pub multi_value_pattern: Option<&'static str>,
    /// Bare search term pattern with a `value` group.
    pub keyword_pattern: Option<&'static str>,
    pub single_value_operators: &'static [(&'static str, OperatorKind)],
    pub multi_value_operators: &'static [(&'static str, OperatorKind)],
    /// Separator between list elements, `,` for most dialects, `OR` for the
    /// Lucene family.
    pub multi_value_delimiter: &'static str,
    pub wildcard_symbol: Option<char>,
}

/// Compiled tokenizer for one dialect.
#[derive(Debug, Clone)]
pub struct QueryTokenizer {
    single_value_operators: OperatorMap,
    multi_value_operators: OperatorMap,
    multi_value_delimiter: &'static str,
    wildcard_symbol: Option<char>,
    field_regex: Regex,
    logical_regex: Regex,
    operator_regex: Regex,
    value_regex: Regex,
    multi_value_regex: Option<Regex>,
    keyword_regex: Option<Regex>,
    single_field_value_probe: Regex,
    multi_field_value_probe: Option<Regex>,
}

impl QueryTokenizer {
    /// Compiles a dialect config. Patterns are static per-dialect tables, so
    /// a pattern that fails to compile is a programming error.
    pub fn new(settings: TokenizerSettings) -> Self {
        let single_value_operators = OperatorMap::new(settings.single_value_operators);
        let multi_value_operators = OperatorMap::new(settings.multi_value_operators);

        let mut operator_alternation = single_value_operators.alternation();
        if !multi_value_operators.is_empty() {
            if !operator_alternation.is_empty() {
                operator_alternation.push('|');
            }
            operator_alternation.push_str(&multi_value_operators.alternation());
        }

        let compile = |pattern: &str| Regex::new(pattern).expect("valid tokenizer pattern");

        let field_regex = compile(&format!("^{}", settings.field_pattern));
        let logical_regex = compile(r"^(?i)(?P<logical_operator>and|or|not)\b");
        let operator_regex = compile(&format!(
            r"^\s*(?P<operator>(?i:{operator_alternation}))"
        ));
        let value_regex = compile(&format!(r"^\s*(?:{})", settings.value_pattern));
        let multi_value_regex = settings
            .multi_value_pattern
            .map(|pattern| compile(&format!(r"^\s*{pattern}")));
        let keyword_regex = settings
            .keyword_pattern
            .map(|pattern| compile(&format!("^{pattern}")));

        let single_field_value_probe = compile(&format!(
            r"^{}\s*(?i:{})\s*(?:{})",
            settings.field_pattern,
            single_value_operators.alternation(),
            settings.value_pattern,
        ));
        let multi_field_value_probe = match (
            settings.multi_value_pattern,
            multi_value_operators.is_empty(),
        ) {
            (Some(pattern), false) => Some(compile(&format!(
                r"^{}\s*(?i:{})\s*{}",
                settings.field_pattern,
                multi_value_operators.alternation(),
                pattern,
            ))),
            _ => None,
        };

        Self {
            single_value_operators,
            multi_value_operators,
            multi_value_delimiter: settings.multi_value_delimiter,
            wildcard_symbol: settings.wildcard_symbol,
            field_regex,
            logical_regex,
            operator_regex,
            value_regex,
            multi_value_regex,
            keyword_regex,
            single_field_value_probe,
            multi_field_value_probe,
        }
    }

    /// Maps operator text to its IR kind, consulting the single- then the
    /// multi-value table.
    pub fn map_operator(&self, text: &str) -> Result<OperatorKind, TranslateError> {
        self.single_value_operators
            .get(text)
            .or_else(|| self.multi_value_operators.get(text))
            .ok_or_else(|| TranslateError::UnsupportedOperator(text.to_string()))
    }

    /// Lexes a query into an ordered token stream and validates grouping.
    pub fn tokenize(&self, query: &str) -> Result<Vec<Token>, TranslateError> {
        let mut tokens = Vec::new();
        let mut rest = query.trim();
        while !rest.is_empty() {
            let (token, remainder) = self.next_token(rest)?;
            tokens.push(token);
            rest = remainder.trim_start();
        }
        validate_parentheses(&tokens)?;
        trace!(count = tokens.len(), "tokenized query");
        Ok(tokens)
    }

    fn next_token<'q>(&self, rest: &'q str) -> Result<(Token, &'q str), TranslateError> {
        if let Some(stripped) = rest.strip_prefix('(') {
            return Ok((Identifier::l_paren().into(), stripped));
        }
        if let Some(stripped) = rest.strip_prefix(')') {
            return Ok((Identifier::r_paren().into(), stripped));
        }
        if let Some(caps) = self.logical_regex.captures(rest) {
            let text = caps["logical_operator"].to_lowercase();
            let identifier = match text.as_str() {
                "and" => Identifier::and(),
                "or" => Identifier::or(),
                _ => Identifier::not(),
            };
            return Ok((identifier.into(), &rest[caps.get(0).unwrap().end()..]));
        }
        if self.matches_field_value(rest) {
            return self.search_field_value(rest);
        }
        if let Some(keyword_regex) = &self.keyword_regex {
            if let Some(caps) = keyword_regex.captures(rest) {
                let value = caps
                    .name("value")
                    .map(|m| m.as_str())
                    .unwrap_or_else(|| caps.get(0).map(|m| m.as_str()).unwrap_or_default());
                let end = caps.get(0).unwrap().end();
                return Ok((Keyword::new(value).into(), &rest[end..]));
            }
        }
        Err(TranslateError::tokenizer(rest))
    }

    fn matches_field_value(&self, rest: &str) -> bool {
        if self.single_field_value_probe.is_match(rest) {
            return true;
        }
        self.multi_field_value_probe
            .as_ref()
            .is_some_and(|probe| probe.is_match(rest))
    }

    fn search_field_value<'q>(&self, rest: &'q str) -> Result<(Token, &'q str), TranslateError> {
        let field_caps = self
            .field_regex
            .captures(rest)
            .ok_or_else(|| TranslateError::tokenizer(rest))?;
        let field_name = field_caps
            .name("field_name")
            .ok_or_else(|| TranslateError::tokenizer(rest))?
            .as_str()
            .to_string();
        let after_field = &rest[field_caps.get(0).unwrap().end()..];

        let operator_caps = self
            .operator_regex
            .captures(after_field)
            .ok_or_else(|| TranslateError::tokenizer(after_field))?;
        let operator_text = operator_caps["operator"].trim().to_lowercase();
        let after_operator = &after_field[operator_caps.get(0).unwrap().end()..];

        // An operator text may serve both classes (Lucene `:`). The list
        // shape decides: a matching multi-value body wins, anything else
        // falls through to the scalar pattern.
        let multi_match = self
            .multi_value_operators
            .get(&operator_text)
            .and_then(|operator| {
                let caps = self.multi_value_regex.as_ref()?.captures(after_operator)?;
                Some((operator, caps))
            });

        let (value, operator, after_value) = if let Some((operator, caps)) = multi_match {
            let list_body = caps
                .name("value")
                .ok_or_else(|| TranslateError::tokenizer(after_operator))?
                .as_str();
            let values = split_list_body(list_body, self.multi_value_delimiter)
                .into_iter()
                .map(|element| Value::scalar(clean_multi_value(&element)))
                .collect();
            (
                Value::List(values),
                operator,
                &after_operator[caps.get(0).unwrap().end()..],
            )
        } else if let Some(operator) = self.single_value_operators.get(&operator_text) {
            let caps = self
                .value_regex
                .captures(after_operator)
                .ok_or_else(|| TranslateError::tokenizer(after_operator))?;
            let (value, is_regex_literal) = extract_value(&caps);
            let operator = if is_regex_literal && operator == OperatorKind::Eq {
                OperatorKind::Regex
            } else {
                operator
            };
            (value, operator, &after_operator[caps.get(0).unwrap().end()..])
        } else if self.multi_value_operators.get(&operator_text).is_some() {
            return Err(TranslateError::tokenizer(after_operator));
        } else {
            return Err(TranslateError::UnsupportedOperator(operator_text));
        };

        let (value, operator) = self.process_value_wildcard_symbols(value, operator);
        let field_value = FieldValue::new(field_name, operator, value);
        Ok((field_value.into(), after_value))
    }

    /// Rewrites `(operator, value)` into a concrete operator token based on
    /// wildcard bookends, stripping them from the returned value.
    pub fn process_value_wildcard_symbols(
        &self,
        value: Value,
        operator: OperatorKind,
    ) -> (Value, Identifier) {
        match self.wildcard_symbol {
            Some(wildcard) => process_wildcards(value, operator, wildcard),
            None => (value, Identifier::op(operator)),
        }
    }
}

/// Wildcard normalization shared by the tokenizer engine and the Sigma
/// modifier layer: `*v*` becomes CONTAINS, `*v` ENDSWITH, `v*` STARTSWITH;
/// a REGEX not bracketed on both sides stays REGEX. Bookends are stripped
/// from the returned value either way.
pub fn process_wildcards(
    value: Value,
    operator: OperatorKind,
    wildcard: char,
) -> (Value, Identifier) {
    let probe = match &value {
        Value::Str(text) => Some(text.as_str()),
        Value::List(items) => items.first().and_then(|item| match item {
            Value::Str(text) => Some(text.as_str()),
            _ => None,
        }),
        Value::Num(_) => None,
    };

    let operator = match probe {
        None => operator,
        Some(text) => {
            let starts = text.starts_with(wildcard);
            let ends = text.ends_with(wildcard);
            if operator == OperatorKind::Regex && !(starts && ends) {
                OperatorKind::Regex
            } else if starts && ends {
                OperatorKind::Contains
            } else if starts {
                OperatorKind::EndsWith
            } else if ends {
                OperatorKind::StartsWith
            } else {
                operator
            }
        }
    };

    (
        strip_wildcard_bookends(value, wildcard),
        Identifier::op(operator),
    )
}

fn split_list_body(body: &str, delimiter: &str) -> Vec<String> {
    if delimiter.chars().all(|ch| ch.is_ascii_alphabetic()) {
        // Word delimiters (Lucene `OR`) split case-insensitively on the
        // surrounding whitespace.
        let lowered = format!(" {} ", delimiter.to_lowercase());
        let haystack = body.to_lowercase();
        let mut parts = Vec::new();
        let mut start = 0;
        while let Some(found) = haystack[start..].find(&lowered) {
            parts.push(body[start..start + found].to_string());
            start += found + lowered.len();
        }
        parts.push(body[start..].to_string());
        parts
    } else {
        body.split(delimiter).map(str::to_string).collect()
    }
}

fn strip_wildcard_bookends(value: Value, wildcard: char) -> Value {
    match value {
        Value::Str(text) => Value::Str(text.trim_matches(wildcard).to_string()),
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| strip_wildcard_bookends(item, wildcard))
                .collect(),
        ),
        numeric => numeric,
    }
}

fn clean_multi_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        });
    stripped.unwrap_or(trimmed).to_string()
}

/// Returns the extracted value and whether it came from a regex-literal
/// group (`field:/pattern/` dialects upgrade EQ to REGEX on that flag).
fn extract_value(caps: &regex::Captures<'_>) -> (Value, bool) {
    if let Some(num) = caps.name("num_value") {
        if let Ok(parsed) = num.as_str().parse::<i64>() {
            return (Value::Num(parsed), false);
        }
    }
    for group in ["d_q_value", "s_q_value"] {
        if let Some(matched) = caps.name(group) {
            return (Value::Str(matched.as_str().to_string()), false);
        }
    }
    if let Some(matched) = caps.name("re_value") {
        return (Value::Str(matched.as_str().to_string()), true);
    }
    if let Some(matched) = caps.name("no_q_value") {
        return (Value::scalar(matched.as_str()), false);
    }
    let fallback = caps
        .name("value")
        .map(|m| m.as_str())
        .unwrap_or_default();
    (Value::Str(fallback.to_string()), false)
}

/// Single-pass grouping validation: push on `(`, pop on `)`, fail on any
/// unopened `)` or on leftovers at end of stream.
pub fn validate_parentheses(tokens: &[Token]) -> Result<(), TranslateError> {
    let mut depth = 0usize;
    for token in tokens {
        match token {
            Token::Identifier(id) if id.kind == TokenKind::LParen => depth += 1,
            Token::Identifier(id) if id.kind == TokenKind::RParen => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(TranslateError::QueryParentheses)?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(TranslateError::QueryParentheses);
    }
    Ok(())
}

/// Recursively harvests every [`Field`] referenced by function arguments,
/// `by` clauses, and sort keys. The mapping layer relies on this to resolve
/// generic names for fields appearing only inside aggregations.
pub fn field_tokens_from_func_args(args: &[FuncArg]) -> Vec<&Field> {
    let mut result = Vec::new();
    for arg in args {
        match arg {
            FuncArg::Field(field) => result.push(field),
            FuncArg::FieldValue(fv) => result.push(&fv.field),
            FuncArg::Function(func) => {
                result.extend(field_tokens_from_func_args(&func.args));
                for field in &func.by_clauses {
                    result.push(field);
                }
            }
            FuncArg::Sort(sort) => result.push(&sort.field),
            FuncArg::Keyword(_) | FuncArg::Identifier(_) => {}
        }
    }
    result
}

/// Mutable visitor over every field in a token stream and its function tail.
/// Used by parsers to populate generic name maps in place.
pub fn for_each_field_mut(
    tokens: &mut [Token],
    functions: &mut ParsedFunctions,
    mut visit: impl FnMut(&mut Field),
) {
    for token in tokens.iter_mut() {
        if let Token::FieldValue(fv) = token {
            visit(&mut fv.field);
        }
    }
    for function in functions.functions.iter_mut() {
        visit_function_fields(function, &mut visit);
    }
}

fn visit_function_fields(function: &mut crate::ir::Function, visit: &mut impl FnMut(&mut Field)) {
    for arg in function.args.iter_mut() {
        match arg {
            FuncArg::Field(field) => visit(field),
            FuncArg::FieldValue(fv) => visit(&mut fv.field),
            FuncArg::Function(nested) => visit_function_fields(nested, visit),
            FuncArg::Sort(sort) => visit(&mut sort.field),
            FuncArg::Keyword(_) | FuncArg::Identifier(_) => {}
        }
    }
    for field in function.by_clauses.iter_mut() {
        visit(field);
    }
}
