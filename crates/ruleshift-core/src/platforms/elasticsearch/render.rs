//! Elasticsearch-family renderers: Lucene query text plus the rule
//! documents that wrap it (detection rule, ElastAlert, Kibana saved
//! search, X-Pack Watcher).

use serde_json::json;

use super::consts::{
    elastalert_details, elasticsearch_query_details, elasticsearch_rule_details, kibana_details,
    xpack_watcher_details,
};
use super::mapping::elasticsearch_mappings;
use crate::error::TranslateError;
use crate::ir::{Severity, SiemContainer};
use crate::managers::PlatformDetails;
use crate::platforms::base::lucene::LuceneQueryRender;
use crate::render::{rule_description_str, QueryRender, RenderedOutput};

pub struct ElasticsearchQueryRender {
    inner: LuceneQueryRender,
}

impl Default for ElasticsearchQueryRender {
    fn default() -> Self {
        Self::new()
    }
}

impl ElasticsearchQueryRender {
    pub fn new() -> Self {
        Self {
            inner: LuceneQueryRender::new(elasticsearch_query_details(), elasticsearch_mappings()),
        }
    }
}

impl QueryRender for ElasticsearchQueryRender {
    fn details(&self) -> &PlatformDetails {
        self.inner.details()
    }

    fn mappings(&self) -> &crate::mapping::PlatformMappings {
        self.inner.mappings()
    }

    fn supports_in_operator(&self) -> bool {
        false
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

    fn keyword_render(
        &self,
        keyword: &crate::ir::Keyword,
        diagnostics: &mut Vec<crate::error::Diagnostic>,
    ) -> Result<String, TranslateError> {
        self.inner.keyword_render(keyword, diagnostics)
    }
}

fn risk_score(severity: Severity) -> u32 {
    match severity {
        Severity::Informational => 1,
        Severity::Low => 21,
        Severity::Medium => 47,
        Severity::High => 73,
        Severity::Critical => 99,
    }
}

/// Detection-rule JSON document around the rendered query.
pub struct ElasticsearchRuleRender {
    details: PlatformDetails,
    query: LuceneQueryRender,
}

impl Default for ElasticsearchRuleRender {
    fn default() -> Self {
        Self::new()
    }
}

impl ElasticsearchRuleRender {
    pub fn new() -> Self {
        Self {
            details: elasticsearch_rule_details(),
            query: LuceneQueryRender::new(elasticsearch_rule_details(), elasticsearch_mappings()),
        }
    }
}

impl QueryRender for ElasticsearchRuleRender {
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

        let threat: Vec<serde_json::Value> = meta
            .mitre_attack
            .iter()
            .map(|(tactic, techniques)| {
                json!({
                    "framework": "MITRE ATT&CK",
                    "tactic": { "name": tactic },
                    "technique": techniques
                        .iter()
                        .map(|technique| json!({ "id": technique.to_uppercase() }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        let rule = json!({
            "name": meta.title,
            "rule_id": meta.id,
            "description": rule_description_str(meta),
            "severity": meta.severity.to_string(),
            "risk_score": risk_score(meta.severity),
            "type": "query",
            "language": "lucene",
            "query": rendered.text,
            "index": ["winlogbeat-*", "logs-*"],
            "interval": "5m",
            "from": "now-360s",
            "to": "now",
            "enabled": true,
            "references": meta.references,
            "tags": meta.tags,
            "false_positives": meta.false_positives,
            "threat": threat,
            "author": [meta.author],
            "license": meta.license,
        });
        let text = serde_json::to_string_pretty(&rule)
            .map_err(|err| TranslateError::RuleDocument(err.to_string()))?;
        Ok(RenderedOutput {
            text,
            diagnostics: rendered.diagnostics,
        })
    }
}

/// ElastAlert YAML rule around the rendered query.
pub struct ElastAlertRuleRender {
    details: PlatformDetails,
    query: LuceneQueryRender,
}

impl Default for ElastAlertRuleRender {
    fn default() -> Self {
        Self::new()
    }
}

impl ElastAlertRuleRender {
    pub fn new() -> Self {
        Self {
            details: elastalert_details(),
            query: LuceneQueryRender::new(elastalert_details(), elasticsearch_mappings()),
        }
    }
}

impl QueryRender for ElastAlertRuleRender {
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
        let name = if meta.title.is_empty() {
            "Converted detection rule"
        } else {
            meta.title.as_str()
        };
        let text = format!(
            "name: {name}\n\
             description: {}\n\
             type: any\n\
             index: winlogbeat-*\n\
             filter:\n\
             - query:\n\
             \x20   query_string:\n\
             \x20     query: '{}'\n\
             alert:\n\
             - debug\n\
             priority: {}\n",
            rule_description_str(meta),
            rendered.text.replace('\'', "''"),
            risk_score(meta.severity) / 25 + 1,
        );
        Ok(RenderedOutput {
            text,
            diagnostics: rendered.diagnostics,
        })
    }
}

/// Kibana saved-search JSON around the rendered query. The embedded
/// `searchSourceJSON` is itself a JSON-encoded string, per the saved-object
/// format.
pub struct KibanaRuleRender {
    details: PlatformDetails,
    query: LuceneQueryRender,
}

impl Default for KibanaRuleRender {
    fn default() -> Self {
        Self::new()
    }
}

impl KibanaRuleRender {
    pub fn new() -> Self {
        Self {
            details: kibana_details(),
            query: LuceneQueryRender::new(kibana_details(), elasticsearch_mappings()),
        }
    }
}

impl QueryRender for KibanaRuleRender {
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

        let search_source = json!({
            "index": "winlogbeat-*",
            "filter": [],
            "highlight": {},
            "query": { "query_string": { "query": rendered.text, "analyze_wildcard": true } },
        });
        let search_source_text = serde_json::to_string(&search_source)
            .map_err(|err| TranslateError::RuleDocument(err.to_string()))?;

        let saved_search = json!({
            "_id": meta.id,
            "_type": "search",
            "_source": {
                "title": meta.title,
                "description": rule_description_str(meta),
                "hits": 0,
                "columns": ["_source"],
                "sort": ["@timestamp", "desc"],
                "version": 1,
                "kibanaSavedObjectMeta": { "searchSourceJSON": search_source_text },
            },
        });
        let text = serde_json::to_string_pretty(&saved_search)
            .map_err(|err| TranslateError::RuleDocument(err.to_string()))?;
        Ok(RenderedOutput {
            text,
            diagnostics: rendered.diagnostics,
        })
    }
}

/// X-Pack Watcher watch JSON around the rendered query.
pub struct XPackWatcherRuleRender {
    details: PlatformDetails,
    query: LuceneQueryRender,
}

impl Default for XPackWatcherRuleRender {
    fn default() -> Self {
        Self::new()
    }
}

impl XPackWatcherRuleRender {
    pub fn new() -> Self {
        Self {
            details: xpack_watcher_details(),
            query: LuceneQueryRender::new(xpack_watcher_details(), elasticsearch_mappings()),
        }
    }
}

impl QueryRender for XPackWatcherRuleRender {
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

        let watch = json!({
            "metadata": {
                "title": meta.title,
                "description": rule_description_str(meta),
                "tags": meta.tags,
            },
            "trigger": { "schedule": { "interval": "10m" } },
            "input": {
                "search": {
                    "request": {
                        "indices": ["winlogbeat-*"],
                        "body": {
                            "query": {
                                "bool": {
                                    "must": [
                                        { "query_string": { "query": rendered.text } }
                                    ]
                                }
                            },
                            "size": 10,
                        },
                    }
                }
            },
            "condition": {
                "compare": { "ctx.payload.hits.total": { "gt": 0 } }
            },
            "actions": {
                "send_email": {
                    "email": {
                        "subject": meta.title,
                        "to": "alert@example.com",
                        "body": "Watch triggered",
                    }
                }
            },
        });
        let text = serde_json::to_string_pretty(&watch)
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
    use crate::ir::{FieldValue, Identifier, MetaInfoContainer, OperatorKind, Token, Value};

    fn container() -> SiemContainer {
        let mut meta = MetaInfoContainer::default();
        meta.title = "Encoded PowerShell".to_string();
        meta.severity = Severity::High;
        let mut fv = FieldValue::new(
            "CommandLine",
            Identifier::op(OperatorKind::Contains),
            Value::Str("-enc".to_string()),
        );
        fv.field
            .generic_names_map
            .insert("windows".to_string(), "CommandLine".to_string());
        SiemContainer::new(
            vec![Token::FieldValue(fv)],
            meta.with_source_mapping_ids(vec!["windows".to_string()]),
        )
    }

    #[test]
    fn query_render_uses_ecs_fields() {
        let output = ElasticsearchQueryRender::new().generate(&container()).unwrap();
        assert_eq!(output.text, r"process.command_line:*\-enc*");
    }

    #[test]
    fn detection_rule_document_embeds_query() {
        let output = ElasticsearchRuleRender::new().generate(&container()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        assert_eq!(parsed["language"], "lucene");
        assert_eq!(parsed["severity"], "high");
        assert_eq!(parsed["risk_score"], 73);
        assert!(parsed["query"].as_str().unwrap().contains("process.command_line"));
    }

    #[test]
    fn kibana_search_source_is_encoded_json() {
        let output = KibanaRuleRender::new().generate(&container()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        let encoded = parsed["_source"]["kibanaSavedObjectMeta"]["searchSourceJSON"]
            .as_str()
            .unwrap();
        let inner: serde_json::Value = serde_json::from_str(encoded).unwrap();
        assert!(inner["query"]["query_string"]["query"]
            .as_str()
            .unwrap()
            .contains("process.command_line"));
    }

    #[test]
    fn watcher_wraps_query_string() {
        let output = XPackWatcherRuleRender::new().generate(&container()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        assert_eq!(
            parsed["condition"]["compare"]["ctx.payload.hits.total"]["gt"],
            0
        );
    }

    #[test]
    fn elastalert_renders_yaml_text() {
        let output = ElastAlertRuleRender::new().generate(&container()).unwrap();
        assert!(output.text.contains("name: Encoded PowerShell"));
        assert!(output.text.contains("type: any"));
        assert!(output.text.contains("query_string"));
    }
}
