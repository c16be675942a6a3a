//! FortiSIEM rule renderer: an XML rule document with a single-event
//! pattern clause.

use super::consts::forti_siem_details;
use super::mapping::forti_siem_mappings;
use crate::error::{Diagnostic, TranslateError};
use crate::ir::{OperatorKind, SiemContainer, Value};
use crate::managers::PlatformDetails;
use crate::mapping::PlatformMappings;
use crate::render::{rule_description_str, QueryRender, RenderedOutput};

pub struct FortiSiemRuleRender {
    details: PlatformDetails,
}

impl Default for FortiSiemRuleRender {
    fn default() -> Self {
        Self::new()
    }
}

impl FortiSiemRuleRender {
    pub fn new() -> Self {
        Self {
            details: forti_siem_details(),
        }
    }

    fn literal(value: &Value) -> String {
        match value {
            Value::Num(num) => num.to_string(),
            scalar => format!("\"{}\"", xml_escape(&scalar.to_string())),
        }
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl QueryRender for FortiSiemRuleRender {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mappings(&self) -> &PlatformMappings {
        forti_siem_mappings()
    }

    fn and_token(&self) -> &'static str {
        "AND"
    }

    fn field_value_render(
        &self,
        target_field: &str,
        operator: OperatorKind,
        value: &Value,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        let rendered = match operator {
            OperatorKind::Eq => format!("{target_field} = {}", Self::literal(value)),
            OperatorKind::NotEq => format!("{target_field} != {}", Self::literal(value)),
            OperatorKind::Gt => format!("{target_field} &gt; {value}"),
            OperatorKind::Gte => format!("{target_field} &gt;= {value}"),
            OperatorKind::Lt => format!("{target_field} &lt; {value}"),
            OperatorKind::Lte => format!("{target_field} &lt;= {value}"),
            OperatorKind::Contains => format!("{target_field} CONTAIN {}", Self::literal(value)),
            OperatorKind::StartsWith => {
                format!("{target_field} REGEXP \"^{}\"", xml_escape(&value.to_string()))
            }
            OperatorKind::EndsWith => {
                format!("{target_field} REGEXP \"{}$\"", xml_escape(&value.to_string()))
            }
            OperatorKind::Regex => {
                format!("{target_field} REGEXP {}", Self::literal(value))
            }
            OperatorKind::In => {
                let items: Vec<String> =
                    value.scalars().iter().map(|item| Self::literal(item)).collect();
                format!("{target_field} IN ({})", items.join(", "))
            }
            OperatorKind::Keyword => format!("rawEventMsg CONTAIN {}", Self::literal(value)),
        };
        Ok(rendered)
    }

    fn keyword_render(
        &self,
        keyword: &crate::ir::Keyword,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, TranslateError> {
        Ok(format!(
            "rawEventMsg CONTAIN \"{}\"",
            xml_escape(&keyword.value)
        ))
    }

    fn generate(&self, container: &SiemContainer) -> Result<RenderedOutput, TranslateError> {
        let mut diagnostics = Vec::new();
        let mapping = self
            .mappings()
            .first_suitable(&container.meta_info.source_mapping_ids);
        let body = self.render_token_stream(&container.tokens, mapping, &mut diagnostics)?;
        let meta = &container.meta_info;

        let rule_name = if meta.title.is_empty() {
            "Converted detection rule"
        } else {
            meta.title.as_str()
        };
        let text = format!(
            "<Rule ruleId=\"{}\" group=\"Security\" severity=\"{}\">\n\
             \x20 <Name>{}</Name>\n\
             \x20 <Description>{}</Description>\n\
             \x20 <PatternClause window=\"300\">\n\
             \x20   <SubPattern name=\"eventFilter\">\n\
             \x20     <SingleEvtConstr>{}</SingleEvtConstr>\n\
             \x20   </SubPattern>\n\
             \x20 </PatternClause>\n\
             \x20 <TriggerEventDisplay>\n\
             \x20   <Fields>phRecvTime, rawEventMsg</Fields>\n\
             \x20 </TriggerEventDisplay>\n\
             </Rule>\n",
            xml_escape(&meta.id),
            severity_rank(meta.severity),
            xml_escape(rule_name),
            xml_escape(&rule_description_str(meta)),
            body,
        );
        Ok(RenderedOutput { text, diagnostics })
    }
}

fn severity_rank(severity: crate::ir::Severity) -> u8 {
    match severity {
        crate::ir::Severity::Informational => 3,
        crate::ir::Severity::Low => 5,
        crate::ir::Severity::Medium => 7,
        crate::ir::Severity::High => 9,
        crate::ir::Severity::Critical => 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FieldValue, Identifier, MetaInfoContainer, Token};

    #[test]
    fn renders_rule_document() {
        let mut meta = MetaInfoContainer::default();
        meta.title = "Suspicious process".to_string();
        meta.severity = crate::ir::Severity::High;
        let mut fv = FieldValue::new(
            "EventID",
            Identifier::op(OperatorKind::Eq),
            Value::Num(4688),
        );
        fv.field
            .generic_names_map
            .insert("windows".to_string(), "EventID".to_string());
        let container = SiemContainer::new(
            vec![Token::FieldValue(fv)],
            meta.with_source_mapping_ids(vec!["windows".to_string()]),
        );
        let output = FortiSiemRuleRender::new().generate(&container).unwrap();
        assert!(output.text.contains("<SingleEvtConstr>winEventId = 4688</SingleEvtConstr>"));
        assert!(output.text.contains("severity=\"9\""));
        assert!(output.text.contains("<Name>Suspicious process</Name>"));
    }
}
