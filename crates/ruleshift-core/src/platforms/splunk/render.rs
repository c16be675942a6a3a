//! Splunk SPL query and saved-search alert renderers.

use super::consts::{splunk_alert_details, splunk_query_details};
use super::mapping::splunk_mappings;
use crate::error::TranslateError;
use crate::ir::SiemContainer;
use crate::managers::PlatformDetails;
use crate::platforms::base::spl::SplQueryRender as SplRenderBase;
use crate::render::{rule_description_str, QueryRender, RenderedOutput};

pub struct SplunkQueryRender {
    inner: SplRenderBase,
}

impl Default for SplunkQueryRender {
    fn default() -> Self {
        Self::new()
    }
}

impl SplunkQueryRender {
    pub fn new() -> Self {
        Self {
            inner: SplRenderBase::new(splunk_query_details(), splunk_mappings()),
        }
    }
}

impl QueryRender for SplunkQueryRender {
    fn details(&self) -> &PlatformDetails {
        self.inner.details()
    }

    fn mappings(&self) -> &crate::mapping::PlatformMappings {
        self.inner.mappings()
    }

    fn and_token(&self) -> &'static str {
        self.inner.and_token()
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

    fn render_functions(
        &self,
        functions: &crate::ir::ParsedFunctions,
        mapping: &crate::mapping::SourceMapping,
        diagnostics: &mut Vec<crate::error::Diagnostic>,
    ) -> String {
        self.inner.render_functions(functions, mapping, diagnostics)
    }
}

/// Wraps the query render into a saved-search `.conf` stanza.
pub struct SplunkAlertRender {
    details: PlatformDetails,
    query: SplunkQueryRender,
}

impl Default for SplunkAlertRender {
    fn default() -> Self {
        Self::new()
    }
}

impl SplunkAlertRender {
    pub fn new() -> Self {
        Self {
            details: splunk_alert_details(),
            query: SplunkQueryRender::new(),
        }
    }
}

impl QueryRender for SplunkAlertRender {
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
        let title = if meta.title.is_empty() {
            "Detection rule"
        } else {
            meta.title.as_str()
        };
        let text = format!(
            "[{title}]\n\
             description = {}\n\
             search = {}\n\
             dispatch.earliest_time = -24h\n\
             dispatch.latest_time = now\n\
             counttype = number of events\n\
             quantity = 0\n\
             relation = greater than\n\
             disabled = 1\n",
            rule_description_str(meta),
            rendered.text,
        );
        Ok(RenderedOutput {
            text,
            diagnostics: rendered.diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FieldValue, Identifier, MetaInfoContainer, OperatorKind, Token, Value};

    fn container(tokens: Vec<Token>, mapping_ids: Vec<&str>) -> SiemContainer {
        let meta = MetaInfoContainer::default()
            .with_source_mapping_ids(mapping_ids.into_iter().map(String::from).collect());
        SiemContainer::new(tokens, meta)
    }

    fn event_id_4688() -> Token {
        Token::FieldValue(FieldValue::new(
            "EventID",
            Identifier::op(OperatorKind::Eq),
            Value::Num(4688),
        ))
    }

    #[test]
    fn renders_with_windows_log_source() {
        let mut container = container(vec![event_id_4688()], vec!["windows"]);
        // simulate the parse-side resolution: EventID is generic for windows
        if let Token::FieldValue(fv) = &mut container.tokens[0] {
            fv.field
                .generic_names_map
                .insert("windows".to_string(), "EventID".to_string());
        }
        let output = SplunkQueryRender::new().generate(&container).unwrap();
        assert_eq!(output.text, r#"source="WinEventLog:*" EventCode=4688"#);
    }

    #[test]
    fn conjunction_joins_with_whitespace() {
        let tokens = vec![
            Token::FieldValue(FieldValue::new(
                "CommandLine",
                Identifier::op(OperatorKind::Contains),
                Value::Str("-enc".to_string()),
            )),
            Token::Identifier(Identifier::and()),
            Token::FieldValue(FieldValue::new(
                "CommandLine",
                Identifier::op(OperatorKind::Contains),
                Value::Str("powershell".to_string()),
            )),
        ];
        let output = SplunkQueryRender::new()
            .generate(&container(tokens, vec!["default"]))
            .unwrap();
        assert_eq!(
            output.text,
            r#"CommandLine="*-enc*" CommandLine="*powershell*""#
        );
        // default mapping has no field table: unmapped diagnostics attach
        assert!(!output.diagnostics.is_empty());
    }

    #[test]
    fn alert_render_wraps_stanza() {
        let mut meta = MetaInfoContainer::default();
        meta.title = "Suspicious process".to_string();
        meta.description = "Detects encoded commands".to_string();
        let container = SiemContainer::new(vec![event_id_4688()], meta);
        let output = SplunkAlertRender::new().generate(&container).unwrap();
        assert!(output.text.starts_with("[Suspicious process]\n"));
        assert!(output.text.contains("search = EventID=4688"));
        assert!(output.text.contains("description = Detects encoded commands."));
    }
}
