use crate::managers::PlatformDetails;

pub fn splunk_query_details() -> PlatformDetails {
    PlatformDetails::new("splunk-spl-query", "Splunk", "Splunk", "Query", "splunk")
        .with_first_choice(1)
}

pub fn splunk_alert_details() -> PlatformDetails {
    PlatformDetails::new("splunk-spl-rule", "Splunk", "Splunk", "Alert", "splunk")
}

pub fn splunk_cti_details() -> PlatformDetails {
    PlatformDetails::new("splunk-spl-query", "Splunk", "Splunk", "Query", "splunk")
}
