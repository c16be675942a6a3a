//! Chronicle UDM query and YARA-L rule parsers.

use regex::Regex;
use std::sync::OnceLock;

use super::consts::{chronicle_query_details, chronicle_rule_details};
use super::mapping::chronicle_mappings;
use crate::error::TranslateError;
use crate::ir::{MetaInfoContainer, OperatorKind, SiemContainer};
use crate::managers::PlatformDetails;
use crate::mapping::LogSources;
use crate::parser::{resolve_source_mappings, QueryParser};
use crate::tokenizer::{QueryTokenizer, TokenizerSettings};

pub fn chronicle_tokenizer() -> &'static QueryTokenizer {
    static TOKENIZER: OnceLock<QueryTokenizer> = OnceLock::new();
    TOKENIZER.get_or_init(|| {
        QueryTokenizer::new(TokenizerSettings {
            field_pattern: r"(?P<field_name>[a-zA-Z0-9\._]+)",
            value_pattern: r#"(?:"(?P<d_q_value>[^"]*)"|/(?P<re_value>[^/]*)/|(?P<no_q_value>[^\s()]+))"#,
            multi_value_pattern: None,
            keyword_pattern: None,
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
            wildcard_symbol: None,
        })
    })
}

fn nocase_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+nocase\b").expect("valid nocase pattern"))
}

fn event_variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$[a-zA-Z0-9_]*\.").expect("valid event variable pattern"))
}

pub struct ChronicleParser {
    details: PlatformDetails,
}

impl Default for ChronicleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ChronicleParser {
    pub fn new() -> Self {
        Self {
            details: chronicle_query_details(),
        }
    }

    pub(crate) fn parse_chronicle_query(
        &self,
        query: &str,
        meta_info: MetaInfoContainer,
    ) -> Result<SiemContainer, TranslateError> {
        let cleaned = nocase_pattern().replace_all(query, "").into_owned();
        let mut tokens = chronicle_tokenizer().tokenize(&cleaned)?;
        let mut functions = Default::default();
        let ids = resolve_source_mappings(
            &mut tokens,
            &mut functions,
            chronicle_mappings(),
            &LogSources::new(),
        );
        Ok(SiemContainer::new(tokens, meta_info.with_source_mapping_ids(ids))
            .with_functions(functions))
    }
}

impl QueryParser for ChronicleParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.parse_chronicle_query(text, MetaInfoContainer::default())
    }
}

/// Parses a YARA-L 2.0 rule document: meta entries, the events block with
/// event-variable prefixes stripped, and the rule name.
pub struct ChronicleRuleParser {
    details: PlatformDetails,
    inner: ChronicleParser,
}

impl Default for ChronicleRuleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ChronicleRuleParser {
    pub fn new() -> Self {
        Self {
            details: chronicle_rule_details(),
            inner: ChronicleParser::new(),
        }
    }
}

impl QueryParser for ChronicleRuleParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        static EVENTS: OnceLock<Regex> = OnceLock::new();
        static META_ENTRY: OnceLock<Regex> = OnceLock::new();
        static RULE_NAME: OnceLock<Regex> = OnceLock::new();
        let events = EVENTS.get_or_init(|| {
            Regex::new(r"(?s)events:\s*(?P<events>.+?)\s*(?:condition|match|outcome):")
                .expect("valid events pattern")
        });
        let meta_entry = META_ENTRY.get_or_init(|| {
            Regex::new(r#"(?m)^\s*(?P<key>\w+)\s*=\s*"(?P<value>[^"]*)"\s*$"#)
                .expect("valid meta pattern")
        });
        let rule_name = RULE_NAME.get_or_init(|| {
            Regex::new(r"(?m)^\s*rule\s+(?P<name>\w+)\s*\{").expect("valid rule name pattern")
        });

        let events_block = events
            .captures(text)
            .and_then(|caps| caps.name("events"))
            .ok_or_else(|| {
                TranslateError::RuleDocument("YARA-L rule carries no events section".to_string())
            })?
            .as_str();
        let query = event_variable_pattern()
            .replace_all(events_block, "")
            .into_owned();

        let mut meta = MetaInfoContainer::default();
        if let Some(caps) = rule_name.captures(text) {
            meta.title = caps["name"].replace('_', " ");
        }
        for caps in meta_entry.captures_iter(text) {
            let value = caps["value"].to_string();
            match &caps["key"] {
                "author" => meta.author = value,
                "description" => meta.description = value,
                "severity" => meta.severity = crate::ir::Severity::parse_or_default(&value),
                "reference" => meta.references.push(value),
                "license" => meta.license = value,
                _ => {}
            }
        }

        self.inner.parse_chronicle_query(&query, meta)
    }
}
