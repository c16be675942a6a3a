//! Platform modules and the registry boot path.
//!
//! Platforms register through the explicit [`build_registry`] call in the
//! process boot path; there are no import-time side effects, and the
//! returned registry is immutable.

pub mod athena;
pub mod base;
pub mod chronicle;
pub mod crowdstrike;
pub mod elasticsearch;
pub mod forti_siem;
pub mod graylog;
pub mod logscale;
pub mod microsoft;
pub mod opensearch;
pub mod qradar;
pub mod sigma;
pub mod splunk;

use crate::managers::PlatformRegistry;

/// Builds the full platform registry: every parser, query/rule renderer,
/// and CTI renderer the crate ships.
pub fn build_registry() -> PlatformRegistry {
    let mut registry = PlatformRegistry::new();

    // parsers
    registry.register_parser(Box::new(sigma::SigmaParser::new()));
    registry.register_parser(Box::new(splunk::SplunkParser::new()));
    registry.register_parser(Box::new(splunk::SplunkAlertParser::new()));
    registry.register_parser(Box::new(crowdstrike::crowdstrike_parser()));
    registry.register_parser(Box::new(microsoft::MicrosoftSentinelParser::new()));
    registry.register_parser(Box::new(microsoft::MicrosoftSentinelRuleParser::new()));
    registry.register_parser(Box::new(microsoft::MicrosoftDefenderParser::new()));
    registry.register_parser(Box::new(qradar::qradar_parser()));
    registry.register_parser(Box::new(athena::athena_parser()));
    registry.register_parser(Box::new(chronicle::ChronicleParser::new()));
    registry.register_parser(Box::new(chronicle::ChronicleRuleParser::new()));
    registry.register_parser(Box::new(elasticsearch::ElasticsearchParser::new()));
    registry.register_parser(Box::new(elasticsearch::ElasticsearchRuleParser::new()));
    registry.register_parser(Box::new(opensearch::opensearch_parser()));
    registry.register_parser(Box::new(graylog::graylog_parser()));
    registry.register_parser(Box::new(logscale::LogScaleParser::new()));
    registry.register_parser(Box::new(logscale::LogScaleAlertParser::new()));

    // query and rule renderers
    registry.register_render(Box::new(sigma::SigmaRender::new()));
    registry.register_render(Box::new(splunk::SplunkQueryRender::new()));
    registry.register_render(Box::new(splunk::SplunkAlertRender::new()));
    registry.register_render(Box::new(crowdstrike::crowdstrike_query_render()));
    registry.register_render(Box::new(microsoft::MicrosoftSentinelQueryRender::new()));
    registry.register_render(Box::new(microsoft::MicrosoftSentinelRuleRender::new()));
    registry.register_render(Box::new(microsoft::MicrosoftDefenderQueryRender::new()));
    registry.register_render(Box::new(qradar::qradar_query_render()));
    registry.register_render(Box::new(athena::athena_query_render()));
    registry.register_render(Box::new(chronicle::ChronicleQueryRender::new()));
    registry.register_render(Box::new(chronicle::ChronicleRuleRender::new()));
    registry.register_render(Box::new(elasticsearch::ElasticsearchQueryRender::new()));
    registry.register_render(Box::new(elasticsearch::ElasticsearchRuleRender::new()));
    registry.register_render(Box::new(elasticsearch::ElastAlertRuleRender::new()));
    registry.register_render(Box::new(elasticsearch::KibanaRuleRender::new()));
    registry.register_render(Box::new(elasticsearch::XPackWatcherRuleRender::new()));
    registry.register_render(Box::new(opensearch::opensearch_query_render()));
    registry.register_render(Box::new(opensearch::OpenSearchRuleRender::new()));
    registry.register_render(Box::new(graylog::graylog_query_render()));
    registry.register_render(Box::new(logscale::LogScaleQueryRender::new()));
    registry.register_render(Box::new(logscale::LogScaleAlertRender::new()));
    registry.register_render(Box::new(forti_siem::FortiSiemRuleRender::new()));

    // CTI renderers
    registry.register_cti_render(Box::new(splunk::SplunkCti::new()));
    registry.register_cti_render(Box::new(microsoft::MicrosoftSentinelCti::new()));
    registry.register_cti_render(Box::new(microsoft::MicrosoftDefenderCti::new()));
    registry.register_cti_render(Box::new(qradar::QRadarCti::new()));
    registry.register_cti_render(Box::new(chronicle::ChronicleCti::new()));
    registry.register_cti_render(Box::new(crowdstrike::CrowdStrikeCti::new()));
    registry.register_cti_render(Box::new(elasticsearch::ElasticsearchCti::new()));
    registry.register_cti_render(Box::new(opensearch::OpenSearchCti::new()));
    registry.register_cti_render(Box::new(graylog::GraylogCti::new()));
    registry.register_cti_render(Box::new(logscale::LogScaleCti::new()));
    registry.register_cti_render(Box::new(athena::AthenaCti::new()));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_all_registered_platforms() {
        let registry = build_registry();
        for siem_type in [
            "sigma",
            "splunk-spl-query",
            "splunk-spl-rule",
            "sentinel-kql-query",
            "sentinel-kql-rule",
            "defender-kql-query",
            "qradar-aql-query",
            "athena-sql-query",
            "chronicle-yaral-query",
            "chronicle-yaral-rule",
            "crowdstrike-spl-query",
            "elastic-lucene-query",
            "elastic-lucene-rule",
            "opensearch-lucene-query",
            "graylog-lucene-query",
            "logscale-lql-query",
            "logscale-lql-alert",
        ] {
            assert!(registry.parser(siem_type).is_ok() || registry.render(siem_type).is_ok());
        }
        assert!(registry.render("elastalert-lucene-rule").is_ok());
        assert!(registry.render("kibana-saved-search").is_ok());
        assert!(registry.render("xpack-watcher-rule").is_ok());
        assert!(registry.render("fortisiem-rule").is_ok());
        assert!(registry.render("opensearch-monitor-rule").is_ok());
        assert!(registry.cti_render("splunk-spl-query").is_ok());
        assert!(registry.cti_render("qradar-aql-query").is_ok());
    }

    #[test]
    fn unknown_platform_is_a_registry_miss() {
        let registry = build_registry();
        assert!(registry.parser("arcsight").is_err());
    }

    #[test]
    fn platform_enumeration_is_sorted_and_nonempty() {
        let registry = build_registry();
        let details = registry.render_details();
        assert!(details.len() >= 20);
        let names: Vec<&str> = details.iter().map(|d| d.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
