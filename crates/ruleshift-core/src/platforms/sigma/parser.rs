//! The Sigma rule parser: YAML document to translation unit, including the
//! `condition` sub-language (selection references, `1 of`, `all of`).

use serde_yaml::Value as Yaml;
use tracing::debug;

use super::consts::sigma_rule_details;
use super::mapping::sigma_mappings;
use super::modifiers::ModifierEngine;
use crate::error::TranslateError;
use crate::ir::{Identifier, Keyword, MetaInfoContainer, SiemContainer, Token, TokenKind, Value};
use crate::managers::PlatformDetails;
use crate::mapping::LogSources;
use crate::mitre::MitreConfig;
use crate::parser::{resolve_source_mappings, QueryParser, YamlRuleLoader};

pub struct SigmaParser {
    details: PlatformDetails,
    modifiers: ModifierEngine,
}

impl Default for SigmaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl YamlRuleLoader for SigmaParser {}

impl SigmaParser {
    pub fn new() -> Self {
        Self {
            details: sigma_rule_details(),
            modifiers: ModifierEngine::new(),
        }
    }

    fn log_sources(rule: &Yaml) -> LogSources {
        let mut sources = LogSources::new();
        if let Some(logsource) = rule.get("logsource") {
            for key in ["product", "service", "category"] {
                if let Some(value) = logsource.get(key).and_then(Yaml::as_str) {
                    sources.insert(key.to_string(), vec![value.to_string()]);
                }
            }
        }
        sources
    }

    fn yaml_scalar(value: &Yaml) -> Value {
        match value {
            Yaml::Number(num) => num
                .as_i64()
                .map(Value::Num)
                .unwrap_or_else(|| Value::Str(num.to_string())),
            Yaml::Bool(flag) => Value::Str(flag.to_string()),
            Yaml::String(text) => Value::Str(text.clone()),
            Yaml::Null => Value::Str("null".to_string()),
            other => Value::Str(yaml_to_string(other)),
        }
    }

    fn yaml_value(value: &Yaml) -> Value {
        match value {
            Yaml::Sequence(items) => Value::List(items.iter().map(Self::yaml_scalar).collect()),
            scalar => Self::yaml_scalar(scalar),
        }
    }

    /// One detection entry (`field|mods: value`) to tokens.
    fn entry_tokens(&self, key: &str, value: &Yaml) -> Result<Vec<Token>, TranslateError> {
        let mut parts = key.split('|');
        let field_name = parts.next().unwrap_or(key).to_string();
        let modifiers: Vec<String> = parts.map(|part| part.to_lowercase()).collect();
        self.modifiers
            .generate(&field_name, &modifiers, Self::yaml_value(value))
    }

    /// One named selection to an atomic token stream (single token or a
    /// paren-wrapped group).
    fn selection_tokens(&self, selection: &Yaml) -> Result<Vec<Token>, TranslateError> {
        match selection {
            Yaml::Mapping(entries) => {
                let mut streams = Vec::new();
                for (key, value) in entries {
                    let key = key.as_str().ok_or_else(|| {
                        TranslateError::RuleDocument("selection keys must be strings".to_string())
                    })?;
                    streams.push(self.entry_tokens(key, value)?);
                }
                Ok(join_streams(streams, Identifier::and()))
            }
            Yaml::Sequence(items) => {
                let mut streams = Vec::new();
                for item in items {
                    match item {
                        Yaml::Mapping(_) => streams.push(self.selection_tokens(item)?),
                        scalar => streams.push(vec![Token::Keyword(Keyword::new(
                            Self::yaml_scalar(scalar).to_string(),
                        ))]),
                    }
                }
                Ok(join_streams(streams, Identifier::or()))
            }
            scalar => Ok(vec![Token::Keyword(Keyword::new(
                Self::yaml_scalar(scalar).to_string(),
            ))]),
        }
    }

    fn meta_info(rule: &Yaml) -> MetaInfoContainer {
        let mut meta = MetaInfoContainer::default();
        let text = |key: &str| rule.get(key).and_then(Yaml::as_str).map(str::to_string);

        if let Some(id) = text("id") {
            meta.id = id;
        }
        if let Some(title) = text("title") {
            meta.title = title;
        }
        if let Some(description) = text("description") {
            meta.description = description;
        }
        if let Some(author) = text("author") {
            meta.author = author;
        }
        if let Some(date) = rule.get("date") {
            let rendered = date
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| yaml_to_string(date));
            if !rendered.is_empty() {
                meta.date = rendered;
            }
        }
        if let Some(status) = text("status") {
            meta.status = status;
        }
        if let Some(level) = text("level") {
            meta.severity = crate::ir::Severity::parse_or_default(&level);
        }
        if let Some(references) = rule.get("references").and_then(Yaml::as_sequence) {
            meta.references = references
                .iter()
                .filter_map(Yaml::as_str)
                .map(str::to_string)
                .collect();
        }
        if let Some(falsepositives) = rule.get("falsepositives").and_then(Yaml::as_sequence) {
            meta.false_positives = falsepositives
                .iter()
                .filter_map(Yaml::as_str)
                .map(str::to_string)
                .collect();
        }
        if let Some(tags) = rule.get("tags").and_then(Yaml::as_sequence) {
            meta.tags = tags
                .iter()
                .filter_map(Yaml::as_str)
                .map(str::to_string)
                .collect();
            Self::resolve_mitre_tags(&mut meta);
        }
        meta
    }

    /// `attack.*` tags become the tactic -> techniques map, resolved through
    /// the process-wide catalog.
    fn resolve_mitre_tags(meta: &mut MetaInfoContainer) {
        let catalog = MitreConfig::global();
        for tag in &meta.tags {
            let Some(rest) = tag.strip_prefix("attack.") else {
                continue;
            };
            if let Some(technique) = catalog.get_technique(rest) {
                let id = technique.technique_id.to_lowercase();
                if technique.tactic.is_empty() {
                    meta.mitre_attack
                        .entry("unknown".to_string())
                        .or_default()
                        .push(id);
                } else {
                    for tactic in &technique.tactic {
                        let key = tactic.replace(' ', "_").to_lowercase();
                        let techniques = meta.mitre_attack.entry(key).or_default();
                        if !techniques.contains(&id) {
                            techniques.push(id.clone());
                        }
                    }
                }
            } else if let Some(tactic) = catalog.get_tactic(rest) {
                meta.mitre_attack
                    .entry(tactic.tactic.replace(' ', "_").to_lowercase())
                    .or_default();
            }
        }
    }
}

impl QueryParser for SigmaParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        let rule = self.load_yaml_rule(text)?;
        let log_sources = Self::log_sources(&rule);

        let detection = rule
            .get("detection")
            .and_then(Yaml::as_mapping)
            .ok_or_else(|| {
                TranslateError::RuleDocument("sigma rule carries no detection section".to_string())
            })?;

        let mut selections: Vec<(String, Vec<Token>)> = Vec::new();
        let mut condition = None;
        for (key, value) in detection {
            let key = key.as_str().ok_or_else(|| {
                TranslateError::RuleDocument("detection keys must be strings".to_string())
            })?;
            if key == "condition" {
                condition = value.as_str().map(str::to_string);
                continue;
            }
            selections.push((key.to_string(), self.selection_tokens(value)?));
        }

        let condition = match condition {
            Some(condition) => condition,
            None if selections.len() == 1 => selections[0].0.clone(),
            None => {
                return Err(TranslateError::UnsupportedRoot(
                    "sigma detection carries no condition".to_string(),
                ))
            }
        };
        debug!(%condition, selections = selections.len(), "compiling sigma condition");

        let mut tokens = compile_condition(&condition, &selections)?;
        tokens = strip_outer_parens(tokens);

        let mut functions = Default::default();
        let ids = resolve_source_mappings(
            &mut tokens,
            &mut functions,
            sigma_mappings(),
            &log_sources,
        );
        let meta = Self::meta_info(&rule).with_source_mapping_ids(ids);
        Ok(SiemContainer::new(tokens, meta).with_functions(functions))
    }
}

fn yaml_to_string(value: &Yaml) -> String {
    serde_yaml::to_string(value)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// Joins atomic streams with a logical operator; multi-member joins are
/// paren-wrapped so the result is atomic again.
fn join_streams(streams: Vec<Vec<Token>>, joiner: Identifier) -> Vec<Token> {
    let mut streams: Vec<Vec<Token>> = streams.into_iter().filter(|s| !s.is_empty()).collect();
    if streams.len() == 1 {
        return streams.pop().unwrap_or_default();
    }
    let mut tokens = vec![Token::Identifier(Identifier::l_paren())];
    for (index, stream) in streams.into_iter().enumerate() {
        if index > 0 {
            tokens.push(Token::Identifier(joiner));
        }
        tokens.extend(stream);
    }
    tokens.push(Token::Identifier(Identifier::r_paren()));
    tokens
}

/// Drops an outer paren pair that spans the whole stream.
fn strip_outer_parens(tokens: Vec<Token>) -> Vec<Token> {
    let mut tokens = tokens;
    loop {
        let spans_whole = tokens.len() >= 2
            && tokens[0].is_kind(TokenKind::LParen)
            && tokens[tokens.len() - 1].is_kind(TokenKind::RParen)
            && {
                let mut depth = 0usize;
                let mut whole = true;
                for (index, token) in tokens.iter().enumerate() {
                    if token.is_kind(TokenKind::LParen) {
                        depth += 1;
                    } else if token.is_kind(TokenKind::RParen) {
                        depth -= 1;
                        if depth == 0 && index != tokens.len() - 1 {
                            whole = false;
                            break;
                        }
                    }
                }
                whole && depth == 0
            };
        if !spans_whole {
            return tokens;
        }
        tokens = tokens[1..tokens.len() - 1].to_vec();
    }
}

// ---------------------------------------------------------------------------
// condition sub-language

#[derive(Debug, Clone, PartialEq)]
enum CondToken {
    And,
    Or,
    Not,
    LParen,
    RParen,
    OneOf,
    AllOf,
    Name(String),
}

fn lex_condition(condition: &str) -> Result<Vec<CondToken>, TranslateError> {
    if condition.contains('|') {
        return Err(TranslateError::UnsupportedRoot(
            "sigma condition aggregation expressions are not supported".to_string(),
        ));
    }
    let spaced = condition.replace('(', " ( ").replace(')', " ) ");
    let words: Vec<&str> = spaced.split_whitespace().collect();

    let mut tokens = Vec::new();
    let mut index = 0;
    while index < words.len() {
        let word = words[index];
        match word.to_lowercase().as_str() {
            "(" => tokens.push(CondToken::LParen),
            ")" => tokens.push(CondToken::RParen),
            "and" => tokens.push(CondToken::And),
            "or" => tokens.push(CondToken::Or),
            "not" => tokens.push(CondToken::Not),
            "1" | "all" if words.get(index + 1).map(|w| w.to_lowercase()) == Some("of".into()) => {
                tokens.push(if word == "1" {
                    CondToken::OneOf
                } else {
                    CondToken::AllOf
                });
                index += 1;
            }
            _ => tokens.push(CondToken::Name(word.to_string())),
        }
        index += 1;
    }
    Ok(tokens)
}

struct ConditionParser<'a> {
    tokens: Vec<CondToken>,
    position: usize,
    selections: &'a [(String, Vec<Token>)],
}

impl<'a> ConditionParser<'a> {
    fn peek(&self) -> Option<&CondToken> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<CondToken> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn parse_or(&mut self) -> Result<Vec<Token>, TranslateError> {
        let mut stream = self.parse_and()?;
        while self.peek() == Some(&CondToken::Or) {
            self.advance();
            stream.push(Token::Identifier(Identifier::or()));
            stream.extend(self.parse_and()?);
        }
        Ok(stream)
    }

    fn parse_and(&mut self) -> Result<Vec<Token>, TranslateError> {
        let mut stream = self.parse_not()?;
        while self.peek() == Some(&CondToken::And) {
            self.advance();
            stream.push(Token::Identifier(Identifier::and()));
            stream.extend(self.parse_not()?);
        }
        Ok(stream)
    }

    fn parse_not(&mut self) -> Result<Vec<Token>, TranslateError> {
        if self.peek() == Some(&CondToken::Not) {
            self.advance();
            let inner = self.parse_not()?;
            let mut stream = vec![Token::Identifier(Identifier::not())];
            stream.extend(wrap_if_compound(inner));
            return Ok(stream);
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Vec<Token>, TranslateError> {
        match self.advance() {
            Some(CondToken::LParen) => {
                let inner = self.parse_or()?;
                if self.advance() != Some(CondToken::RParen) {
                    return Err(TranslateError::QueryParentheses);
                }
                let mut stream = vec![Token::Identifier(Identifier::l_paren())];
                stream.extend(inner);
                stream.push(Token::Identifier(Identifier::r_paren()));
                Ok(stream)
            }
            Some(CondToken::OneOf) => self.parse_of(Identifier::or()),
            Some(CondToken::AllOf) => self.parse_of(Identifier::and()),
            Some(CondToken::Name(name)) => self
                .selections
                .iter()
                .find(|(selection, _)| *selection == name)
                .map(|(_, stream)| stream.clone())
                .ok_or_else(|| {
                    TranslateError::UnsupportedRoot(format!(
                        "condition references missing selection `{name}`"
                    ))
                }),
            other => Err(TranslateError::UnsupportedRoot(format!(
                "unexpected condition token: {other:?}"
            ))),
        }
    }

    fn parse_of(&mut self, joiner: Identifier) -> Result<Vec<Token>, TranslateError> {
        let pattern = match self.advance() {
            Some(CondToken::Name(pattern)) => pattern,
            other => {
                return Err(TranslateError::UnsupportedRoot(format!(
                    "`of` expects a selection pattern, got {other:?}"
                )))
            }
        };
        let matching: Vec<Vec<Token>> = if pattern == "them" {
            self.selections
                .iter()
                .map(|(_, stream)| stream.clone())
                .collect()
        } else {
            let prefix = pattern.trim_end_matches('*');
            self.selections
                .iter()
                .filter(|(name, _)| {
                    if pattern.ends_with('*') {
                        name.starts_with(prefix)
                    } else {
                        name == &pattern
                    }
                })
                .map(|(_, stream)| stream.clone())
                .collect()
        };
        if matching.is_empty() {
            return Err(TranslateError::UnsupportedRoot(format!(
                "condition pattern `{pattern}` matches no selection"
            )));
        }
        Ok(join_streams(matching, joiner))
    }
}

fn wrap_if_compound(tokens: Vec<Token>) -> Vec<Token> {
    if tokens.len() <= 1 || tokens[0].is_kind(TokenKind::LParen) {
        return tokens;
    }
    let mut wrapped = vec![Token::Identifier(Identifier::l_paren())];
    wrapped.extend(tokens);
    wrapped.push(Token::Identifier(Identifier::r_paren()));
    wrapped
}

fn compile_condition(
    condition: &str,
    selections: &[(String, Vec<Token>)],
) -> Result<Vec<Token>, TranslateError> {
    let tokens = lex_condition(condition)?;
    let mut parser = ConditionParser {
        tokens,
        position: 0,
        selections,
    };
    let stream = parser.parse_or()?;
    if parser.position != parser.tokens.len() {
        return Err(TranslateError::UnsupportedRoot(format!(
            "trailing content in condition `{condition}`"
        )));
    }
    crate::tokenizer::validate_parentheses(&stream)?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::OperatorKind;

    fn parse(rule: &str) -> SiemContainer {
        SigmaParser::new().parse(rule).unwrap()
    }

    #[test]
    fn parses_simple_rule() {
        let container = parse(
            "title: Process creation\n\
             logsource:\n  product: windows\n\
             detection:\n  selection:\n    EventID: 4688\n  condition: selection\n",
        );
        assert_eq!(container.tokens.len(), 1);
        let fv = container.tokens[0].as_field_value().unwrap();
        assert_eq!(fv.field.source_name, "EventID");
        assert_eq!(fv.value, Value::Num(4688));
        assert_eq!(
            container.meta_info.source_mapping_ids,
            vec!["windows".to_string(), "default".to_string()]
        );
    }

    #[test]
    fn contains_all_produces_conjunction() {
        let container = parse(
            "title: Encoded commands\n\
             logsource:\n  product: windows\n\
             detection:\n  selection:\n    CommandLine|contains|all:\n      - '-enc'\n      - 'powershell'\n  condition: selection\n",
        );
        // outer parens are stripped at top level
        let field_values: Vec<_> = container
            .tokens
            .iter()
            .filter_map(Token::as_field_value)
            .collect();
        assert_eq!(field_values.len(), 2);
        assert!(field_values
            .iter()
            .all(|fv| fv.operator_kind() == OperatorKind::Contains));
        assert!(container.tokens[1].is_kind(TokenKind::And));
    }

    #[test]
    fn condition_and_joins_selections() {
        let container = parse(
            "title: t\nlogsource:\n  product: windows\n\
             detection:\n  selection1:\n    EventID: 1\n  selection2:\n    User: admin\n  condition: selection1 and selection2\n",
        );
        assert_eq!(container.tokens.len(), 3);
        assert!(container.tokens[1].is_kind(TokenKind::And));
    }

    #[test]
    fn condition_not_wraps_selection() {
        let container = parse(
            "title: t\nlogsource:\n  product: windows\n\
             detection:\n  selection:\n    EventID: 1\n  filter:\n    User: system\n  condition: selection and not filter\n",
        );
        assert!(container
            .tokens
            .iter()
            .any(|t| t.is_kind(TokenKind::Not)));
    }

    #[test]
    fn one_of_pattern_expands_to_disjunction() {
        let container = parse(
            "title: t\nlogsource:\n  product: windows\n\
             detection:\n  selection_a:\n    EventID: 1\n  selection_b:\n    EventID: 2\n  condition: 1 of selection_*\n",
        );
        assert!(container.tokens[1].is_kind(TokenKind::Or));
    }

    #[test]
    fn all_of_them_expands_to_conjunction() {
        let container = parse(
            "title: t\nlogsource:\n  product: windows\n\
             detection:\n  a:\n    EventID: 1\n  b:\n    EventID: 2\n  condition: all of them\n",
        );
        assert!(container.tokens[1].is_kind(TokenKind::And));
    }

    #[test]
    fn keyword_list_selection() {
        let container = parse(
            "title: t\nlogsource:\n  product: windows\n\
             detection:\n  keywords:\n    - mimikatz\n    - bloodhound\n  condition: keywords\n",
        );
        let keywords: Vec<_> = container
            .tokens
            .iter()
            .filter(|t| matches!(t, Token::Keyword(_)))
            .collect();
        assert_eq!(keywords.len(), 2);
    }

    #[test]
    fn missing_selection_reference_is_unsupported_root() {
        let err = SigmaParser::new()
            .parse(
                "title: t\nlogsource:\n  product: windows\n\
                 detection:\n  selection:\n    EventID: 1\n  condition: other\n",
            )
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedRoot(_)));
    }

    #[test]
    fn aggregation_condition_is_unsupported_root() {
        let err = SigmaParser::new()
            .parse(
                "title: t\nlogsource:\n  product: windows\n\
                 detection:\n  selection:\n    EventID: 1\n  condition: selection | count() > 5\n",
            )
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedRoot(_)));
    }

    #[test]
    fn attack_tags_resolve_to_mitre_map() {
        let container = parse(
            "title: t\nlogsource:\n  product: windows\n\
             tags:\n  - attack.execution\n  - attack.t1059.003\n\
             detection:\n  selection:\n    EventID: 1\n  condition: selection\n",
        );
        let mitre = &container.meta_info.mitre_attack;
        assert!(mitre.contains_key("execution"));
        assert_eq!(mitre["execution"], vec!["t1059.003".to_string()]);
    }

    #[test]
    fn severity_defaults_to_low() {
        let container = parse(
            "title: t\nlogsource:\n  product: windows\n\
             detection:\n  selection:\n    EventID: 1\n  condition: selection\n",
        );
        assert_eq!(container.meta_info.severity, crate::ir::Severity::Low);
    }
}
