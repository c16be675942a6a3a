//! Microsoft Sentinel and Defender parsers: KQL query text plus the
//! Sentinel scheduled-rule JSON document.

use super::consts::{
    microsoft_defender_details, microsoft_sentinel_details, microsoft_sentinel_rule_details,
};
use super::mapping::{defender_mappings, sentinel_mappings};
use crate::error::TranslateError;
use crate::ir::{MetaInfoContainer, SiemContainer};
use crate::managers::PlatformDetails;
use crate::parser::{JsonRuleLoader, QueryParser};
use crate::platforms::base::kql::KqlParser;

pub struct MicrosoftSentinelParser {
    inner: KqlParser,
}

impl Default for MicrosoftSentinelParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrosoftSentinelParser {
    pub fn new() -> Self {
        Self {
            inner: KqlParser::new(microsoft_sentinel_details(), sentinel_mappings()),
        }
    }
}

impl QueryParser for MicrosoftSentinelParser {
    fn details(&self) -> &PlatformDetails {
        self.inner.details()
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.inner.parse(text)
    }
}

/// Parses the scheduled-rule JSON document and delegates the embedded query
/// to the KQL parser.
pub struct MicrosoftSentinelRuleParser {
    details: PlatformDetails,
    inner: KqlParser,
}

impl Default for MicrosoftSentinelRuleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRuleLoader for MicrosoftSentinelRuleParser {}

impl MicrosoftSentinelRuleParser {
    pub fn new() -> Self {
        Self {
            details: microsoft_sentinel_rule_details(),
            inner: KqlParser::new(microsoft_sentinel_rule_details(), sentinel_mappings()),
        }
    }
}

impl QueryParser for MicrosoftSentinelRuleParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        let rule = self.load_json_rule(text)?;
        let query = rule["query"].as_str().ok_or_else(|| {
            TranslateError::RuleDocument("sentinel rule carries no `query` field".to_string())
        })?;

        let mut meta = MetaInfoContainer::default();
        if let Some(title) = rule["displayName"].as_str() {
            meta.title = title.to_string();
        }
        if let Some(description) = rule["description"].as_str() {
            meta.description = description.to_string();
        }
        if let Some(severity) = rule["severity"].as_str() {
            meta.severity = crate::ir::Severity::parse_or_default(severity);
        }
        if let Some(id) = rule["id"].as_str() {
            meta.id = id.to_string();
        }
        if let Some(tactics) = rule["tactics"].as_array() {
            for tactic in tactics.iter().filter_map(|t| t.as_str()) {
                meta.mitre_attack
                    .entry(tactic.replace(' ', "_").to_lowercase())
                    .or_default();
            }
        }
        if let Some(techniques) = rule["techniques"].as_array() {
            let ids: Vec<String> = techniques
                .iter()
                .filter_map(|t| t.as_str())
                .map(str::to_lowercase)
                .collect();
            if !ids.is_empty() {
                let keys: Vec<String> = meta.mitre_attack.keys().cloned().collect();
                if keys.is_empty() {
                    meta.mitre_attack.insert("unknown".to_string(), ids);
                } else {
                    for key in keys {
                        meta.mitre_attack.insert(key, ids.clone());
                    }
                }
            }
        }

        self.inner.parse_kql_query(query, meta)
    }
}

pub struct MicrosoftDefenderParser {
    inner: KqlParser,
}

impl Default for MicrosoftDefenderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrosoftDefenderParser {
    pub fn new() -> Self {
        Self {
            inner: KqlParser::new(microsoft_defender_details(), defender_mappings()),
        }
    }
}

impl QueryParser for MicrosoftDefenderParser {
    fn details(&self) -> &PlatformDetails {
        self.inner.details()
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.inner.parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::OperatorKind;

    #[test]
    fn parses_sentinel_query_with_table() {
        let container = MicrosoftSentinelParser::new()
            .parse("SecurityEvent | where EventID == 4688 and CommandLine contains \"-enc\"")
            .unwrap();
        assert_eq!(
            container.meta_info.source_mapping_ids.first().map(String::as_str),
            Some("windows_security")
        );
        let fv = container.tokens[0].as_field_value().unwrap();
        assert_eq!(fv.field.generic_name("windows_security"), "EventID");
    }

    #[test]
    fn parses_sentinel_rule_document() {
        let rule = serde_json::json!({
            "displayName": "Encoded PowerShell",
            "description": "Detects encoded commands",
            "severity": "High",
            "query": "SecurityEvent | where EventID == 4688",
            "tactics": ["Execution"],
            "techniques": ["T1059"]
        });
        let container = MicrosoftSentinelRuleParser::new()
            .parse(&rule.to_string())
            .unwrap();
        assert_eq!(container.meta_info.title, "Encoded PowerShell");
        assert_eq!(container.meta_info.severity, crate::ir::Severity::High);
        assert_eq!(
            container.meta_info.mitre_attack["execution"],
            vec!["t1059".to_string()]
        );
    }

    #[test]
    fn rule_without_query_is_rule_document_error() {
        let err = MicrosoftSentinelRuleParser::new()
            .parse(r#"{"displayName": "x"}"#)
            .unwrap_err();
        assert!(matches!(err, TranslateError::RuleDocument(_)));
    }

    #[test]
    fn parses_defender_operators() {
        let container = MicrosoftDefenderParser::new()
            .parse("DeviceProcessEvents | where ProcessCommandLine endswith \".ps1\"")
            .unwrap();
        let fv = container.tokens[0].as_field_value().unwrap();
        assert_eq!(fv.operator_kind(), OperatorKind::EndsWith);
        assert_eq!(fv.field.generic_name("windows_sysmon"), "CommandLine");
    }
}
