//! End-to-end CTI conversion scenarios.

use ruleshift_core::cti::CTI_IOCS_PER_QUERY_LIMIT;
use ruleshift_core::{CtiConverter, IocParseOptions};

fn converter() -> CtiConverter {
    CtiConverter::new()
}

#[test]
fn text_to_splunk_hunting_query() {
    let options = IocParseOptions {
        include_source_ip: true,
        ..Default::default()
    };
    let result = converter().convert(
        "Observed beaconing from 8.8.8.8 to evil.example.com",
        "splunk-spl-query",
        &options,
    );
    assert!(result.status, "failed: {:?}", result.error);
    assert_eq!(
        result.queries,
        vec![r#"(src_ip="8.8.8.8" OR dest_ip="8.8.8.8") OR query="evil.example.com""#.to_string()]
    );
}

#[test]
fn chunking_splits_large_indicator_sets() {
    let text: Vec<String> = (0..30).map(|i| format!("host{i}.example.com")).collect();
    let result = converter().convert_chunked(
        &text.join(" "),
        "elastic-lucene-query",
        &IocParseOptions::default(),
        CTI_IOCS_PER_QUERY_LIMIT,
    );
    assert!(result.status);
    assert_eq!(result.queries.len(), 2);
    assert_eq!(result.queries[0].matches("destination.domain").count(), 25);
    assert_eq!(result.queries[1].matches("destination.domain").count(), 5);
}

#[test]
fn defanged_indicators_are_refanged() {
    let result = converter().convert(
        "callback to hxxp://bad[.]example[.]net/c2",
        "sentinel-kql-query",
        &IocParseOptions::default(),
    );
    assert!(result.status);
    assert_eq!(
        result.queries,
        vec![r#"union * | where RequestURL =~ @"http://bad.example.net/c2""#.to_string()]
    );
}

#[test]
fn hash_types_map_to_platform_fields() {
    let result = converter().convert(
        "d41d8cd98f00b204e9800998ecf8427e",
        "defender-kql-query",
        &IocParseOptions::default(),
    );
    assert!(result.status);
    assert_eq!(result.queries.len(), 1);
    assert!(result.queries[0].contains("MD5 =~ \"d41d8cd98f00b204e9800998ecf8427e\""));
}

#[test]
fn empty_text_produces_no_queries() {
    let result = converter().convert(
        "no indicators here",
        "splunk-spl-query",
        &IocParseOptions::default(),
    );
    assert!(result.status);
    assert!(result.queries.is_empty());
}

#[test]
fn cti_platform_enumeration() {
    let conv = converter();
    let details = conv.renders();
    assert!(details.len() >= 10);
    assert!(details.iter().any(|d| d.siem_type == "qradar-aql-query"));
}
