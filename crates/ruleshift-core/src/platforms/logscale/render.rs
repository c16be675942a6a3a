//! LogScale query and alert renderers.

use serde_json::json;

use super::consts::{logscale_alert_details, logscale_query_details};
use super::mapping::logscale_mappings;
use crate::error::{Diagnostic, TranslateError};
use crate::escape::{EscapeDetails, EscapeManager, ValueType};
use crate::ir::{Keyword, OperatorKind, SiemContainer, Value};
use crate::managers::PlatformDetails;
use crate::mapping::PlatformMappings;
use crate::render::{rule_description_str, QueryRender, RenderedOutput};

pub struct LogScaleQueryRender {
    details: PlatformDetails,
    escape: EscapeManager,
}

impl Default for LogScaleQueryRender {
    fn default() -> Self {
        Self::new()
    }
}

impl LogScaleQueryRender {
    pub fn new() -> Self {
        Self {
            details: logscale_query_details(),
            escape: EscapeManager::new(vec![(
                ValueType::Value,
                EscapeDetails::new(r#"([\\"])"#),
            )]),
        }
    }

    fn quoted(&self, value: &Value, prefix: &str, suffix: &str) -> String {
        match value {
            Value::Num(num) if prefix.is_empty() && suffix.is_empty() => num.to_string(),
            scalar => format!(
                "\"{prefix}{}{suffix}\"",
                self.escape.escape(&scalar.to_string(), ValueType::Value)
            ),
        }
    }
}

impl QueryRender for LogScaleQueryRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &PlatformMappings {
        logscale_mappings()
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
            OperatorKind::Eq => format!("{target_field}={}", self.quoted(value, "", "")),
            OperatorKind::NotEq => format!("{target_field}!={}", self.quoted(value, "", "")),
            OperatorKind::Gt => format!("{target_field}>{value}"),
            OperatorKind::Gte => format!("{target_field}>={value}"),
            OperatorKind::Lt => format!("{target_field}<{value}"),
            OperatorKind::Lte => format!("{target_field}<={value}"),
            OperatorKind::Contains => format!("{target_field}={}", self.quoted(value, "*", "*")),
            OperatorKind::StartsWith => format!("{target_field}={}", self.quoted(value, "", "*")),
            OperatorKind::EndsWith => format!("{target_field}={}", self.quoted(value, "*", "")),
            OperatorKind::Regex => format!("{target_field}=/{value}/"),
            // expanded by the engine before reaching here
            OperatorKind::In => format!("{target_field}={}", self.quoted(value, "", "")),
            OperatorKind::Keyword => format!("\"{value}\""),
        };
        Ok(rendered)
    }

    fn keyword_render(
        &self,
        keyword: &Keyword,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        Ok(format!(
            "\"{}\"",
            self.escape.escape(&keyword.value, ValueType::Value)
        ))
    }
}

/// Wraps the query render into an alert JSON document.
pub struct LogScaleAlertRender {
    details: PlatformDetails,
    query: LogScaleQueryRender,
}

impl Default for LogScaleAlertRender {
    fn default() -> Self {
        Self::new()
    }
}

impl LogScaleAlertRender {
    pub fn new() -> Self {
        Self {
            details: logscale_alert_details(),
            query: LogScaleQueryRender::new(),
        }
    }
}

impl QueryRender for LogScaleAlertRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &PlatformMappings {
        self.query.mappings()
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: OperatorKind,
        value: &Value,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        self.query
            .field_value_render(target_field, operator, value, diagnostics)
    }

    fn generate(&self, container: &SiemContainer) -> Result<RenderedOutput, TranslateError> {
        let rendered = self.query.generate(container)?;
        let meta = &container.meta_info;

        let alert = json!({
            "name": meta.title,
            "description": rule_description_str(meta),
            "query": { "queryString": rendered.text, "start": "1h", "isLive": true },
            "throttleTimeMillis": 60000,
            "enabled": true,
            "labels": meta.tags,
        });
        let text = serde_json::to_string_pretty(&alert)
            .map_err(|err| TranslateError::RuleDocument(err.to_string()))?;
        Ok(RenderedOutput {
            text,
            diagnostics: rendered.diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FieldValue, Identifier, MetaInfoContainer, Token};

    #[test]
    fn renders_contains_with_wildcards() {
        let container = SiemContainer::new(
            vec![Token::FieldValue(FieldValue::new(
                "CommandLine",
                Identifier::op(OperatorKind::Contains),
                Value::Str("-enc".to_string()),
            ))],
            MetaInfoContainer::default(),
        );
        let output = LogScaleQueryRender::new().generate(&container).unwrap();
        assert_eq!(output.text, r#"CommandLine="*-enc*""#);
    }

    #[test]
    fn alert_embeds_query_string() {
        let mut meta = MetaInfoContainer::default();
        meta.title = "Encoded PowerShell".to_string();
        let container = SiemContainer::new(
            vec![Token::FieldValue(FieldValue::new(
                "EventID",
                Identifier::op(OperatorKind::Eq),
                Value::Num(4688),
            ))],
            meta,
        );
        let output = LogScaleAlertRender::new().generate(&container).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        assert_eq!(parsed["query"]["queryString"], "EventID=4688");
        assert_eq!(parsed["name"], "Encoded PowerShell");
    }
}
