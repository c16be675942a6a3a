//! Source mappings: binding dialect field names to the generic schema.
//!
//! Each platform ships a catalog of [`SourceMapping`] records keyed by a
//! log-source signature (product/service/category, index/sourcetype, table).
//! Parsers pick the subset whose signature matches the query's extracted log
//! sources; renderers resolve generic names back out through their own
//! platform's record with the same mapping id.

use std::collections::{BTreeMap, HashMap};

/// The mapping id shared by every platform's catch-all record.
pub const DEFAULT_MAPPING_NAME: &str = "default";

/// Log sources extracted from a query, e.g. `product -> [windows]` or
/// `index -> [main, wineventlog]`.
pub type LogSources = BTreeMap<String, Vec<String>>;

/// Convenience constructor for a single-valued log source map.
pub fn log_source(key: &str, value: &str) -> LogSources {
    let mut sources = LogSources::new();
    sources.insert(key.to_string(), vec![value.to_string()]);
    sources
}

/// One named table binding generic field names to a platform's field names
/// for a particular log source.
#[derive(Debug, Clone)]
pub struct SourceMapping {
    pub source_id: String,
    /// Signature entries that must all match the query's log sources.
    pub log_source_signature: BTreeMap<String, Vec<String>>,
    /// Rendered log-source filter prepended by renderers, e.g.
    /// `source="WinEventLog:*"`.
    pub default_log_source: Option<String>,
    fields: HashMap<String, String>,
    inverse: HashMap<String, String>,
}

impl SourceMapping {
    pub fn new(
        source_id: &str,
        signature: &[(&str, &[&str])],
        field_table: &[(&str, &str)],
        default_log_source: Option<&str>,
    ) -> Self {
        let mut fields = HashMap::new();
        let mut inverse = HashMap::new();
        for (generic, platform) in field_table {
            fields.insert(generic.to_string(), platform.to_string());
            inverse.insert(platform.to_lowercase(), generic.to_string());
        }
        Self {
            source_id: source_id.to_string(),
            log_source_signature: signature
                .iter()
                .map(|(key, values)| {
                    (
                        key.to_string(),
                        values.iter().map(|v| v.to_string()).collect(),
                    )
                })
                .collect(),
            default_log_source: default_log_source.map(str::to_string),
            fields,
            inverse,
        }
    }

    /// Platform field bound to `generic`, if any.
    pub fn platform_field(&self, generic: &str) -> Option<&str> {
        self.fields.get(generic).map(String::as_str)
    }

    /// Inverse lookup: generic field bound to a platform spelling.
    /// Case-insensitive on the platform side.
    pub fn generic_field(&self, platform: &str) -> Option<&str> {
        self.inverse.get(&platform.to_lowercase()).map(String::as_str)
    }

    /// Subset match: every signature entry must be present in the extracted
    /// log sources with at least one overlapping value (case-insensitive).
    pub fn matches(&self, log_sources: &LogSources) -> bool {
        if self.log_source_signature.is_empty() {
            return false;
        }
        self.log_source_signature.iter().all(|(key, wanted)| {
            log_sources.get(key).is_some_and(|present| {
                present.iter().any(|value| {
                    wanted
                        .iter()
                        .any(|candidate| candidate.eq_ignore_ascii_case(value))
                })
            })
        })
    }

    fn specificity(&self) -> usize {
        self.log_source_signature.len()
    }

    pub fn is_default(&self) -> bool {
        self.source_id == DEFAULT_MAPPING_NAME
    }
}

/// A platform's full catalog of source mappings.
#[derive(Debug, Clone)]
pub struct PlatformMappings {
    mappings: Vec<SourceMapping>,
}

impl PlatformMappings {
    /// Builds a catalog. A `default` record is appended when the caller did
    /// not provide one, so `default_mapping` always resolves.
    pub fn new(mut mappings: Vec<SourceMapping>) -> Self {
        if !mappings.iter().any(SourceMapping::is_default) {
            mappings.push(SourceMapping::new(DEFAULT_MAPPING_NAME, &[], &[], None));
        }
        Self { mappings }
    }

    pub fn default_mapping(&self) -> &SourceMapping {
        self.mappings
            .iter()
            .find(|m| m.is_default())
            .expect("default mapping always present")
    }

    pub fn source_mapping(&self, id: &str) -> Option<&SourceMapping> {
        self.mappings.iter().find(|m| m.source_id == id)
    }

    /// Mappings matching the extracted log sources, most specific first, with
    /// the `default` record always appended last.
    pub fn suitable_source_mappings(&self, log_sources: &LogSources) -> Vec<&SourceMapping> {
        let mut matched: Vec<&SourceMapping> = self
            .mappings
            .iter()
            .filter(|m| !m.is_default() && m.matches(log_sources))
            .collect();
        matched.sort_by(|a, b| b.specificity().cmp(&a.specificity()));
        matched.push(self.default_mapping());
        matched
    }

    /// Resolves a chain of mapping ids, skipping ids this platform does not
    /// carry.
    pub fn chained<'a>(
        &'a self,
        ids: &'a [String],
    ) -> impl Iterator<Item = &'a SourceMapping> + 'a {
        ids.iter().filter_map(|id| self.source_mapping(id))
    }

    /// The render-side choice: first resolvable id from the container's
    /// mapping chain, falling back to `default`.
    pub fn first_suitable<'a>(&'a self, ids: &'a [String]) -> &'a SourceMapping {
        self.chained(ids).next().unwrap_or(self.default_mapping())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PlatformMappings {
        PlatformMappings::new(vec![
            SourceMapping::new(
                "windows_security",
                &[("product", &["windows"]), ("service", &["security"])],
                &[("EventID", "EventCode")],
                Some(r#"source="WinEventLog:Security""#),
            ),
            SourceMapping::new(
                "windows",
                &[("product", &["windows"])],
                &[("EventID", "EventCode")],
                Some(r#"source="WinEventLog:*""#),
            ),
        ])
    }

    #[test]
    fn default_mapping_is_appended() {
        let catalog = catalog();
        assert!(catalog.source_mapping(DEFAULT_MAPPING_NAME).is_some());
    }

    #[test]
    fn subset_match_prefers_most_specific() {
        let catalog = catalog();
        let mut sources = log_source("product", "windows");
        sources.insert("service".to_string(), vec!["security".to_string()]);

        let suitable = catalog.suitable_source_mappings(&sources);
        let ids: Vec<&str> = suitable.iter().map(|m| m.source_id.as_str()).collect();
        assert_eq!(ids, vec!["windows_security", "windows", "default"]);
    }

    #[test]
    fn partial_signature_does_not_match() {
        let catalog = catalog();
        let sources = log_source("product", "linux");
        let suitable = catalog.suitable_source_mappings(&sources);
        let ids: Vec<&str> = suitable.iter().map(|m| m.source_id.as_str()).collect();
        assert_eq!(ids, vec!["default"]);
    }

    #[test]
    fn no_log_sources_yields_default_only() {
        let catalog = catalog();
        let suitable = catalog.suitable_source_mappings(&LogSources::new());
        assert_eq!(suitable.len(), 1);
        assert!(suitable[0].is_default());
    }

    #[test]
    fn signature_values_match_case_insensitively() {
        let catalog = catalog();
        let sources = log_source("product", "Windows");
        let suitable = catalog.suitable_source_mappings(&sources);
        assert_eq!(suitable[0].source_id, "windows");
    }

    #[test]
    fn inverse_lookup_is_case_insensitive() {
        let catalog = catalog();
        let mapping = catalog.source_mapping("windows").unwrap();
        assert_eq!(mapping.generic_field("eventcode"), Some("EventID"));
        assert_eq!(mapping.generic_field("EventCode"), Some("EventID"));
        assert_eq!(mapping.generic_field("nope"), None);
    }

    #[test]
    fn first_suitable_falls_back_to_default() {
        let catalog = catalog();
        let ids = vec!["missing".to_string(), "windows".to_string()];
        assert_eq!(catalog.first_suitable(&ids).source_id, "windows");
        assert!(catalog.first_suitable(&["gone".to_string()]).is_default());
    }
}
