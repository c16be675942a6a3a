use crate::managers::PlatformDetails;

pub fn graylog_details() -> PlatformDetails {
    PlatformDetails::new(
        "graylog-lucene-query",
        "Graylog",
        "Graylog",
        "Query",
        "graylog",
    )
}
