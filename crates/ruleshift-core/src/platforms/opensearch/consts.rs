use crate::managers::PlatformDetails;

pub fn opensearch_query_details() -> PlatformDetails {
    PlatformDetails::new(
        "opensearch-lucene-query",
        "OpenSearch",
        "OpenSearch",
        "Query",
        "opensearch",
    )
}

pub fn opensearch_rule_details() -> PlatformDetails {
    PlatformDetails::new(
        "opensearch-monitor-rule",
        "OpenSearch",
        "OpenSearch",
        "Monitor",
        "opensearch",
    )
}
