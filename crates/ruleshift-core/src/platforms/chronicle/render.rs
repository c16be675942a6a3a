//! Chronicle UDM query and YARA-L rule renderers.

use super::consts::{chronicle_query_details, chronicle_rule_details};
use super::mapping::chronicle_mappings;
use crate::error::{Diagnostic, TranslateError};
use crate::escape::{EscapeDetails, EscapeManager, ValueType};
use crate::ir::{Keyword, OperatorKind, SiemContainer, Value};
use crate::managers::PlatformDetails;
use crate::mapping::PlatformMappings;
use crate::render::{QueryRender, RenderedOutput};

fn chronicle_escape_manager() -> EscapeManager {
    EscapeManager::new(vec![
        (ValueType::Value, EscapeDetails::new(r#"([\\|"])"#)),
        (
            ValueType::RegexValue,
            EscapeDetails::new(r#"([\\|/(")\[\]{}.^$+<>!?])"#),
        ),
    ])
}

/// Renderer for UDM search text. `event_prefix` carries the YARA-L event
/// variable (`$e.`) when rendering inside a rule's events block.
pub struct ChronicleQueryRender {
    details: PlatformDetails,
    event_prefix: Option<&'static str>,
    escape: EscapeManager,
}

impl Default for ChronicleQueryRender {
    fn default() -> Self {
        Self::new()
    }
}

impl ChronicleQueryRender {
    pub fn new() -> Self {
        Self {
            details: chronicle_query_details(),
            event_prefix: None,
            escape: chronicle_escape_manager(),
        }
    }

    fn with_event_prefix(details: PlatformDetails, prefix: &'static str) -> Self {
        Self {
            details,
            event_prefix: Some(prefix),
            escape: chronicle_escape_manager(),
        }
    }

    fn regex_value(&self, value: &Value) -> String {
        self.escape
            .escape(&value.to_string(), ValueType::RegexValue)
    }
}

impl QueryRender for ChronicleQueryRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &PlatformMappings {
        chronicle_mappings()
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
        let field = match self.event_prefix {
            Some(prefix) => format!("{prefix}{target_field}"),
            None => target_field.to_string(),
        };
        let rendered = match operator {
            OperatorKind::Eq => match value {
                Value::Num(num) => format!("{field} = {num}"),
                scalar => format!(
                    "{field} = \"{}\" nocase",
                    self.escape.escape(&scalar.to_string(), ValueType::Value)
                ),
            },
            OperatorKind::NotEq => match value {
                Value::Num(num) => format!("{field} != {num}"),
                scalar => format!(
                    "{field} != \"{}\" nocase",
                    self.escape.escape(&scalar.to_string(), ValueType::Value)
                ),
            },
            OperatorKind::Gt => format!("{field} > {value}"),
            OperatorKind::Gte => format!("{field} >= {value}"),
            OperatorKind::Lt => format!("{field} < {value}"),
            OperatorKind::Lte => format!("{field} <= {value}"),
            OperatorKind::Contains => {
                format!("{field} = /.*{}.*/ nocase", self.regex_value(value))
            }
            OperatorKind::StartsWith => {
                format!("{field} = /{}.*/ nocase", self.regex_value(value))
            }
            OperatorKind::EndsWith => {
                format!("{field} = /.*{}/ nocase", self.regex_value(value))
            }
            OperatorKind::Regex => format!("{field} = /{value}/ nocase"),
            // expanded by the engine before reaching here
            OperatorKind::In => format!("{field} = \"{value}\" nocase"),
            OperatorKind::Keyword => format!("/{}/", self.regex_value(value)),
        };
        Ok(rendered)
    }

    fn keyword_render(
        &self,
        keyword: &Keyword,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        Ok(format!(
            "/.*{}.*/ nocase",
            self.escape.escape(&keyword.value, ValueType::RegexValue)
        ))
    }
}

/// Wraps the query render into a YARA-L 2.0 rule document.
pub struct ChronicleRuleRender {
    details: PlatformDetails,
    query: ChronicleQueryRender,
}

impl Default for ChronicleRuleRender {
    fn default() -> Self {
        Self::new()
    }
}

impl ChronicleRuleRender {
    pub fn new() -> Self {
        Self {
            details: chronicle_rule_details(),
            query: ChronicleQueryRender::with_event_prefix(chronicle_rule_details(), "$e."),
        }
    }
}

impl QueryRender for ChronicleRuleRender {
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

        let name = if meta.title.is_empty() {
            "converted_detection_rule".to_string()
        } else {
            meta.title
                .to_lowercase()
                .chars()
                .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
                .collect()
        };

        let mut mitre_lines = String::new();
        for (tactic, techniques) in &meta.mitre_attack {
            mitre_lines.push_str(&format!("    mitre_tactic = \"{tactic}\"\n"));
            for technique in techniques {
                mitre_lines.push_str(&format!(
                    "    mitre_technique = \"{}\"\n",
                    technique.to_uppercase()
                ));
            }
        }

        let text = format!(
            "rule {name} {{\n\
             \x20 meta:\n\
             \x20   author = \"{}\"\n\
             \x20   description = \"{}\"\n\
             \x20   rule_id = \"{}\"\n\
             \x20   license = \"{}\"\n\
             \x20   severity = \"{}\"\n\
             {mitre_lines}\
             \x20 events:\n\
             \x20   {}\n\n\
             \x20 condition:\n\
             \x20   $e\n\
             }}\n",
            meta.author,
            meta.description,
            meta.id,
            meta.license,
            meta.severity,
            rendered.text,
        );
        Ok(RenderedOutput {
            text,
            diagnostics: rendered.diagnostics,
        })
    }
}
