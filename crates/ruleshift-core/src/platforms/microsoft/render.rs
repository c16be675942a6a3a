//! Microsoft Sentinel and Defender renderers: KQL query text plus the
//! Sentinel scheduled-rule JSON document.

use serde_json::json;

use super::consts::{
    microsoft_defender_details, microsoft_sentinel_details, microsoft_sentinel_rule_details,
};
use super::mapping::{defender_mappings, sentinel_mappings};
use crate::error::TranslateError;
use crate::ir::SiemContainer;
use crate::managers::PlatformDetails;
use crate::platforms::base::kql::KqlQueryRender;
use crate::render::{QueryRender, RenderedOutput};

pub struct MicrosoftSentinelQueryRender {
    inner: KqlQueryRender,
}

impl Default for MicrosoftSentinelQueryRender {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrosoftSentinelQueryRender {
    pub fn new() -> Self {
        Self {
            inner: KqlQueryRender::new(microsoft_sentinel_details(), sentinel_mappings()),
        }
    }
}

impl QueryRender for MicrosoftSentinelQueryRender {
    fn details(&self) -> &PlatformDetails {
        self.inner.details()
    }

    fn mappings(&self) -> &crate::mapping::PlatformMappings {
        self.inner.mappings()
    }

    fn generate(&self, container: &SiemContainer) -> Result<RenderedOutput, TranslateError> {
        self.inner.generate(container)
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: crate::ir::OperatorKind,
        value: &crate::ir::Value,
        diagnostics: &mut Vec<crate::error::Diagnostic>,
    ) -> Result<String, TranslateError> {
        self.inner
            .field_value_render(target_field, operator, value, diagnostics)
    }
}

/// Wraps the Sentinel query render into a scheduled-rule JSON document.
pub struct MicrosoftSentinelRuleRender {
    details: PlatformDetails,
    query: KqlQueryRender,
}

impl Default for MicrosoftSentinelRuleRender {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrosoftSentinelRuleRender {
    pub fn new() -> Self {
        Self {
            details: microsoft_sentinel_rule_details(),
            query: KqlQueryRender::new(microsoft_sentinel_rule_details(), sentinel_mappings()),
        }
    }
}

impl QueryRender for MicrosoftSentinelRuleRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &crate::mapping::PlatformMappings {
        self.query.mappings()
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: crate::ir::OperatorKind,
        value: &crate::ir::Value,
        diagnostics: &mut Vec<crate::error::Diagnostic>,
    ) -> Result<String, TranslateError> {
        self.query
            .field_value_render(target_field, operator, value, diagnostics)
    }

    fn generate(&self, container: &SiemContainer) -> Result<RenderedOutput, TranslateError> {
        let rendered = self.query.generate(container)?;
        let meta = &container.meta_info;

        let tactics: Vec<String> = meta
            .mitre_attack
            .keys()
            .map(|tactic| {
                tactic
                    .split('_')
                    .map(|word| {
                        let mut chars = word.chars();
                        match chars.next() {
                            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                            None => String::new(),
                        }
                    })
                    .collect::<String>()
            })
            .collect();
        let techniques: Vec<String> = meta
            .mitre_attack
            .values()
            .flatten()
            .map(|technique| technique.to_uppercase())
            .collect();

        let rule = json!({
            "displayName": meta.title,
            "description": crate::render::rule_description_str(meta),
            "severity": capitalize(&meta.severity.to_string()),
            "enabled": true,
            "query": rendered.text,
            "queryFrequency": "PT30M",
            "queryPeriod": "PT30M",
            "triggerOperator": "GreaterThan",
            "triggerThreshold": 0,
            "suppressionDuration": "PT5H",
            "suppressionEnabled": false,
            "tactics": tactics,
            "techniques": techniques,
        });
        let text = serde_json::to_string_pretty(&rule)
            .map_err(|err| TranslateError::RuleDocument(err.to_string()))?;
        Ok(RenderedOutput {
            text,
            diagnostics: rendered.diagnostics,
        })
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub struct MicrosoftDefenderQueryRender {
    inner: KqlQueryRender,
}

impl Default for MicrosoftDefenderQueryRender {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrosoftDefenderQueryRender {
    pub fn new() -> Self {
        Self {
            inner: KqlQueryRender::new(microsoft_defender_details(), defender_mappings()),
        }
    }
}

impl QueryRender for MicrosoftDefenderQueryRender {
    fn details(&self) -> &PlatformDetails {
        self.inner.details()
    }

    fn mappings(&self) -> &crate::mapping::PlatformMappings {
        self.inner.mappings()
    }

    fn generate(&self, container: &SiemContainer) -> Result<RenderedOutput, TranslateError> {
        self.inner.generate(container)
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: crate::ir::OperatorKind,
        value: &crate::ir::Value,
        diagnostics: &mut Vec<crate::error::Diagnostic>,
    ) -> Result<String, TranslateError> {
        self.inner
            .field_value_render(target_field, operator, value, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FieldValue, Identifier, MetaInfoContainer, OperatorKind, Token, Value};

    fn windows_container(tokens: Vec<Token>) -> SiemContainer {
        let meta = MetaInfoContainer::default()
            .with_source_mapping_ids(vec!["windows".to_string(), "default".to_string()]);
        SiemContainer::new(tokens, meta)
    }

    fn mapped(source: &str, generic: &str, op: OperatorKind, value: Value) -> Token {
        let mut fv = FieldValue::new(source, Identifier::op(op), value);
        fv.field
            .generic_names_map
            .insert("windows".to_string(), generic.to_string());
        Token::FieldValue(fv)
    }

    #[test]
    fn renders_table_prefixed_query() {
        let container = windows_container(vec![mapped(
            "EventID",
            "EventID",
            OperatorKind::Eq,
            Value::Num(4688),
        )]);
        let output = MicrosoftSentinelQueryRender::new()
            .generate(&container)
            .unwrap();
        assert_eq!(output.text, "SecurityEvent | where EventID == 4688");
    }

    #[test]
    fn string_equality_uses_case_insensitive_operator() {
        let container = windows_container(vec![mapped(
            "CommandLine",
            "CommandLine",
            OperatorKind::Contains,
            Value::Str("-enc".to_string()),
        )]);
        let output = MicrosoftSentinelQueryRender::new()
            .generate(&container)
            .unwrap();
        assert_eq!(
            output.text,
            "SecurityEvent | where CommandLine contains @\"-enc\""
        );
    }

    #[test]
    fn rule_render_emits_json_document() {
        let mut meta = MetaInfoContainer::default();
        meta.title = "Encoded PowerShell".to_string();
        meta.severity = crate::ir::Severity::High;
        meta.mitre_attack
            .insert("execution".to_string(), vec!["t1059".to_string()]);
        let container = SiemContainer::new(
            vec![Token::FieldValue(FieldValue::new(
                "EventID",
                Identifier::op(OperatorKind::Eq),
                Value::Num(4688),
            ))],
            meta,
        );
        let output = MicrosoftSentinelRuleRender::new()
            .generate(&container)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        assert_eq!(parsed["displayName"], "Encoded PowerShell");
        assert_eq!(parsed["severity"], "High");
        assert_eq!(parsed["tactics"][0], "Execution");
        assert_eq!(parsed["techniques"][0], "T1059");
        assert!(parsed["query"].as_str().unwrap().contains("EventID == 4688"));
    }
}
