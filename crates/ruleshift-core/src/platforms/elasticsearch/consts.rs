use crate::managers::PlatformDetails;

pub fn elasticsearch_query_details() -> PlatformDetails {
    PlatformDetails::new(
        "elastic-lucene-query",
        "Elasticsearch",
        "Elastic Stack",
        "Query",
        "elastic",
    )
}

pub fn elasticsearch_rule_details() -> PlatformDetails {
    PlatformDetails::new(
        "elastic-lucene-rule",
        "Elasticsearch",
        "Elastic Stack",
        "Detection Rule",
        "elastic",
    )
}

pub fn elastalert_details() -> PlatformDetails {
    PlatformDetails::new(
        "elastalert-lucene-rule",
        "ElastAlert",
        "Elastic Stack",
        "Rule",
        "elastic",
    )
}

pub fn kibana_details() -> PlatformDetails {
    PlatformDetails::new(
        "kibana-saved-search",
        "Kibana",
        "Elastic Stack",
        "Saved Search",
        "elastic",
    )
}

pub fn xpack_watcher_details() -> PlatformDetails {
    PlatformDetails::new(
        "xpack-watcher-rule",
        "X-Pack Watcher",
        "Elastic Stack",
        "Rule",
        "elastic",
    )
}
