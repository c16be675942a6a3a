//! OpenSearch monitor-rule renderer.

use serde_json::json;

use super::consts::opensearch_rule_details;
use super::mapping::opensearch_mappings;
use crate::error::TranslateError;
use crate::ir::SiemContainer;
use crate::managers::PlatformDetails;
use crate::platforms::base::lucene::LuceneQueryRender;
use crate::render::{rule_description_str, QueryRender, RenderedOutput};

pub struct OpenSearchRuleRender {
    details: PlatformDetails,
    query: LuceneQueryRender,
}

impl Default for OpenSearchRuleRender {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenSearchRuleRender {
    pub fn new() -> Self {
        Self {
            details: opensearch_rule_details(),
            query: LuceneQueryRender::new(opensearch_rule_details(), opensearch_mappings()),
        }
    }
}

impl QueryRender for OpenSearchRuleRender {
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

        let monitor = json!({
            "type": "monitor",
            "name": meta.title,
            "monitor_type": "query_level_monitor",
            "enabled": true,
            "schedule": { "period": { "interval": 5, "unit": "MINUTES" } },
            "inputs": [{
                "search": {
                    "indices": ["opensearch-security-logs-*"],
                    "query": {
                        "size": 1,
                        "query": {
                            "query_string": { "query": rendered.text }
                        }
                    }
                }
            }],
            "triggers": [{
                "name": meta.title,
                "severity": "1",
                "condition": {
                    "script": {
                        "source": "ctx.results[0].hits.total.value > 0",
                        "lang": "painless"
                    }
                },
                "actions": []
            }],
            "description": rule_description_str(meta),
        });
        let text = serde_json::to_string_pretty(&monitor)
            .map_err(|err| TranslateError::RuleDocument(err.to_string()))?;
        Ok(RenderedOutput {
            text,
            diagnostics: rendered.diagnostics,
        })
    }
}
