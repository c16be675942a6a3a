//! Splunk SPL query and saved-search alert parsers.

use super::consts::{splunk_alert_details, splunk_query_details};
use super::mapping::splunk_mappings;
use crate::error::TranslateError;
use crate::ir::{MetaInfoContainer, SiemContainer};
use crate::managers::PlatformDetails;
use crate::parser::{ConfRuleLoader, QueryParser};
use crate::platforms::base::spl::SplParser;

pub struct SplunkParser {
    inner: SplParser,
}

impl Default for SplunkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SplunkParser {
    pub fn new() -> Self {
        Self {
            inner: SplParser::new(splunk_query_details(), splunk_mappings()),
        }
    }
}

impl QueryParser for SplunkParser {
    fn details(&self) -> &PlatformDetails {
        self.inner.details()
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.inner.parse(text)
    }
}

/// Parses a saved-search `.conf` stanza: the query lives under `search =`,
/// the description under `description =`.
pub struct SplunkAlertParser {
    details: PlatformDetails,
    inner: SplParser,
}

impl Default for SplunkAlertParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfRuleLoader for SplunkAlertParser {}

impl SplunkAlertParser {
    pub fn new() -> Self {
        Self {
            details: splunk_alert_details(),
            inner: SplParser::new(splunk_alert_details(), splunk_mappings()),
        }
    }
}

impl QueryParser for SplunkAlertParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        let query = self.conf_value(text, "search").ok_or_else(|| {
            TranslateError::RuleDocument("alert stanza carries no `search` entry".to_string())
        })?;

        let mut meta = MetaInfoContainer::default();
        if let Some(description) = self.conf_value(text, "description") {
            meta.description = description;
        }
        self.inner.parse_spl_query(&query, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{OperatorKind, Value};

    #[test]
    fn parses_query_with_log_source() {
        let container = SplunkParser::new()
            .parse(r#"source="WinEventLog:Security" EventCode=4688"#)
            .unwrap();
        assert_eq!(container.tokens.len(), 1);
        let fv = container.tokens[0].as_field_value().unwrap();
        assert_eq!(fv.field.source_name, "EventCode");
        assert_eq!(fv.field.generic_name("windows_security"), "EventID");
        assert_eq!(
            container.meta_info.source_mapping_ids.first().map(String::as_str),
            Some("windows_security")
        );
    }

    #[test]
    fn parses_pipe_functions() {
        let container = SplunkParser::new()
            .parse(r#"EventCode=4625 | stats count by user | sort -count"#)
            .unwrap();
        assert_eq!(container.functions.functions.len(), 2);
    }

    #[test]
    fn parses_alert_stanza() {
        let stanza = "[Suspicious process]\n\
                      description = Detects encoded powershell\n\
                      search = EventCode=4688 CommandLine=\"*-enc*\"\n\
                      dispatch.earliest_time = -24h\n";
        let container = SplunkAlertParser::new().parse(stanza).unwrap();
        assert_eq!(container.meta_info.description, "Detects encoded powershell");
        assert_eq!(container.tokens.len(), 2);
        let second = container.tokens[1].as_field_value().unwrap();
        assert_eq!(second.operator_kind(), OperatorKind::Contains);
        assert_eq!(second.value, Value::Str("-enc".to_string()));
    }

    #[test]
    fn alert_without_search_is_rule_document_error() {
        let err = SplunkAlertParser::new().parse("[x]\nquantity = 0\n").unwrap_err();
        assert!(matches!(err, TranslateError::RuleDocument(_)));
    }
}
