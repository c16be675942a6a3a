//! Elasticsearch Lucene query and detection-rule parsers.

use super::consts::{elasticsearch_query_details, elasticsearch_rule_details};
use super::mapping::elasticsearch_mappings;
use crate::error::TranslateError;
use crate::ir::{MetaInfoContainer, SiemContainer};
use crate::managers::PlatformDetails;
use crate::parser::{JsonRuleLoader, QueryParser};
use crate::platforms::base::lucene::LuceneParser;

pub struct ElasticsearchParser {
    inner: LuceneParser,
}

impl Default for ElasticsearchParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ElasticsearchParser {
    pub fn new() -> Self {
        Self {
            inner: LuceneParser::new(elasticsearch_query_details(), elasticsearch_mappings()),
        }
    }
}

impl QueryParser for ElasticsearchParser {
    fn details(&self) -> &PlatformDetails {
        self.inner.details()
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        self.inner.parse(text)
    }
}

/// Parses a detection-rule JSON document and delegates the embedded Lucene
/// query.
pub struct ElasticsearchRuleParser {
    details: PlatformDetails,
    inner: LuceneParser,
}

impl Default for ElasticsearchRuleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRuleLoader for ElasticsearchRuleParser {}

impl ElasticsearchRuleParser {
    pub fn new() -> Self {
        Self {
            details: elasticsearch_rule_details(),
            inner: LuceneParser::new(elasticsearch_rule_details(), elasticsearch_mappings()),
        }
    }
}

impl QueryParser for ElasticsearchRuleParser {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn parse(&self, text: &str) -> Result<SiemContainer, TranslateError> {
        let rule = self.load_json_rule(text)?;
        let query = rule["query"].as_str().ok_or_else(|| {
            TranslateError::RuleDocument("detection rule carries no `query` field".to_string())
        })?;

        let mut meta = MetaInfoContainer::default();
        if let Some(name) = rule["name"].as_str() {
            meta.title = name.to_string();
        }
        if let Some(description) = rule["description"].as_str() {
            meta.description = description.to_string();
        }
        if let Some(severity) = rule["severity"].as_str() {
            meta.severity = crate::ir::Severity::parse_or_default(severity);
        }
        if let Some(rule_id) = rule["rule_id"].as_str() {
            meta.id = rule_id.to_string();
        }
        if let Some(references) = rule["references"].as_array() {
            meta.references = references
                .iter()
                .filter_map(|r| r.as_str())
                .map(str::to_string)
                .collect();
        }
        if let Some(tags) = rule["tags"].as_array() {
            meta.tags = tags
                .iter()
                .filter_map(|t| t.as_str())
                .map(str::to_string)
                .collect();
        }

        self.inner.parse_lucene_query(query, meta)
    }
}
