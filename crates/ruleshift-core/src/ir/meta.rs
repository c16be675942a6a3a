//! Rule-level metadata and the translation unit container.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{ParsedFunctions, Token};
use crate::mapping::DEFAULT_MAPPING_NAME;

/// Rule severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Informational,
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Informational => "informational",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(text)
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_lowercase().as_str() {
            "informational" => Ok(Self::Informational),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

impl Severity {
    /// Lenient variant of [`FromStr`]: unknown text maps to the default.
    pub fn parse_or_default(text: &str) -> Self {
        text.parse().unwrap_or_default()
    }
}

/// Rule-level metadata carried alongside the query IR.
///
/// Every field has a defined default: a fresh v4 UUID for `id`, today in
/// ISO-8601 for `date`, `low` severity, `DRL 1.1` license, `stable` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaInfoContainer {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: String,
    pub license: String,
    pub severity: Severity,
    pub references: Vec<String>,
    pub tags: Vec<String>,
    /// Tactic name -> technique ids, both resolved through the MITRE catalog.
    pub mitre_attack: BTreeMap<String, Vec<String>>,
    pub status: String,
    pub false_positives: Vec<String>,
    pub source_mapping_ids: Vec<String>,
}

impl Default for MetaInfoContainer {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            description: String::new(),
            author: String::new(),
            date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            license: "DRL 1.1".to_string(),
            severity: Severity::Low,
            references: Vec::new(),
            tags: Vec::new(),
            mitre_attack: BTreeMap::new(),
            status: "stable".to_string(),
            false_positives: Vec::new(),
            source_mapping_ids: vec![DEFAULT_MAPPING_NAME.to_string()],
        }
    }
}

impl MetaInfoContainer {
    pub fn with_source_mapping_ids(mut self, ids: Vec<String>) -> Self {
        if !ids.is_empty() {
            self.source_mapping_ids = ids;
        }
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The translation unit: IR token stream, rule metadata, and the parsed
/// function pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiemContainer {
    pub tokens: Vec<Token>,
    pub meta_info: MetaInfoContainer,
    pub functions: ParsedFunctions,
}

impl SiemContainer {
    pub fn new(tokens: Vec<Token>, meta_info: MetaInfoContainer) -> Self {
        Self {
            tokens,
            meta_info,
            functions: ParsedFunctions::default(),
        }
    }

    pub fn with_functions(mut self, functions: ParsedFunctions) -> Self {
        self.functions = functions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_round_trip() {
        for text in ["informational", "low", "medium", "high", "critical"] {
            let severity: Severity = text.parse().unwrap();
            assert_eq!(severity.to_string(), text);
        }
    }

    #[test]
    fn severity_unknown_defaults_to_low() {
        assert_eq!(Severity::parse_or_default("nonsense"), Severity::Low);
        assert!("nonsense".parse::<Severity>().is_err());
    }

    #[test]
    fn meta_info_defaults() {
        let meta = MetaInfoContainer::default();
        assert_eq!(meta.license, "DRL 1.1");
        assert_eq!(meta.severity, Severity::Low);
        assert_eq!(meta.status, "stable");
        assert_eq!(meta.source_mapping_ids, vec!["default".to_string()]);
        // id is a fresh v4 UUID
        assert_eq!(meta.id.len(), 36);
        // date is ISO-8601
        assert_eq!(meta.date.len(), 10);
        assert!(meta.date.chars().nth(4) == Some('-'));
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = MetaInfoContainer::default();
        let b = MetaInfoContainer::default();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn empty_mapping_ids_keep_default() {
        let meta = MetaInfoContainer::default().with_source_mapping_ids(Vec::new());
        assert_eq!(meta.source_mapping_ids, vec!["default".to_string()]);
    }
}
