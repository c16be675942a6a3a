//! Platform descriptors and the name-to-instance registries.
//!
//! Registries are built once at process boot by an explicit
//! [`crate::platforms::build_registry`] call and are immutable afterwards;
//! lookups never mutate, so a registry is safely shared across threads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cti::RenderCti;
use crate::error::TranslateError;
use crate::parser::QueryParser;
use crate::render::QueryRender;

/// Descriptor presented to front-ends when enumerating platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDetails {
    /// Registry key, e.g. `splunk-spl-query`.
    pub siem_type: String,
    pub name: String,
    pub group_name: String,
    pub platform_name: String,
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_platform_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_choice: Option<u32>,
}

impl PlatformDetails {
    pub fn new(
        siem_type: &str,
        name: &str,
        group_name: &str,
        platform_name: &str,
        group_id: &str,
    ) -> Self {
        Self {
            siem_type: siem_type.to_string(),
            name: name.to_string(),
            group_name: group_name.to_string(),
            platform_name: platform_name.to_string(),
            group_id: group_id.to_string(),
            alt_platform_name: None,
            first_choice: None,
        }
    }

    pub fn with_first_choice(mut self, first_choice: u32) -> Self {
        self.first_choice = Some(first_choice);
        self
    }
}

/// Immutable name-to-instance tables for parsers, renderers, and CTI
/// renderers.
#[derive(Default)]
pub struct PlatformRegistry {
    parsers: HashMap<String, Box<dyn QueryParser>>,
    renders: HashMap<String, Box<dyn QueryRender>>,
    cti_renders: HashMap<String, Box<dyn RenderCti>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_parser(&mut self, parser: Box<dyn QueryParser>) {
        self.parsers
            .insert(parser.details().siem_type.clone(), parser);
    }

    pub fn register_render(&mut self, render: Box<dyn QueryRender>) {
        self.renders
            .insert(render.details().siem_type.clone(), render);
    }

    pub fn register_cti_render(&mut self, render: Box<dyn RenderCti>) {
        self.cti_renders
            .insert(render.details().siem_type.clone(), render);
    }

    pub fn parser(&self, siem_type: &str) -> Result<&dyn QueryParser, TranslateError> {
        self.parsers
            .get(siem_type)
            .map(Box::as_ref)
            .ok_or_else(|| TranslateError::UnsupportedPlatform(siem_type.to_string()))
    }

    pub fn render(&self, siem_type: &str) -> Result<&dyn QueryRender, TranslateError> {
        self.renders
            .get(siem_type)
            .map(Box::as_ref)
            .ok_or_else(|| TranslateError::UnsupportedPlatform(siem_type.to_string()))
    }

    pub fn cti_render(&self, siem_type: &str) -> Result<&dyn RenderCti, TranslateError> {
        self.cti_renders
            .get(siem_type)
            .map(Box::as_ref)
            .ok_or_else(|| TranslateError::UnsupportedPlatform(siem_type.to_string()))
    }

    pub fn parser_details(&self) -> Vec<&PlatformDetails> {
        let mut details: Vec<&PlatformDetails> =
            self.parsers.values().map(|p| p.details()).collect();
        details.sort_by(|a, b| a.name.cmp(&b.name).then(a.siem_type.cmp(&b.siem_type)));
        details
    }

    pub fn render_details(&self) -> Vec<&PlatformDetails> {
        let mut details: Vec<&PlatformDetails> =
            self.renders.values().map(|r| r.details()).collect();
        details.sort_by(|a, b| a.name.cmp(&b.name).then(a.siem_type.cmp(&b.siem_type)));
        details
    }

    pub fn cti_render_details(&self) -> Vec<&PlatformDetails> {
        let mut details: Vec<&PlatformDetails> =
            self.cti_renders.values().map(|r| r.details()).collect();
        details.sort_by(|a, b| a.name.cmp(&b.name).then(a.siem_type.cmp(&b.siem_type)));
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_miss_is_unsupported_platform() {
        let registry = PlatformRegistry::new();
        let err = registry.parser("nope").err().unwrap();
        assert_eq!(err, TranslateError::UnsupportedPlatform("nope".to_string()));
    }

    #[test]
    fn platform_details_serializes_camel_case() {
        let details = PlatformDetails::new("splunk-spl-query", "Splunk", "Splunk", "Query", "splunk");
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["siemType"], "splunk-spl-query");
        assert!(json.get("altPlatformName").is_none());
    }
}
