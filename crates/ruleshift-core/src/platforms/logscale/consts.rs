use crate::managers::PlatformDetails;

pub fn logscale_query_details() -> PlatformDetails {
    PlatformDetails::new(
        "logscale-lql-query",
        "Falcon LogScale",
        "Falcon LogScale",
        "Query",
        "logscale",
    )
}

pub fn logscale_alert_details() -> PlatformDetails {
    PlatformDetails::new(
        "logscale-lql-alert",
        "Falcon LogScale",
        "Falcon LogScale",
        "Alert",
        "logscale",
    )
}
