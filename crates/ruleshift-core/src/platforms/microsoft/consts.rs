use crate::managers::PlatformDetails;

pub fn microsoft_sentinel_details() -> PlatformDetails {
    PlatformDetails::new(
        "sentinel-kql-query",
        "Microsoft Sentinel",
        "Microsoft",
        "Query",
        "sentinel",
    )
    .with_first_choice(1)
}

pub fn microsoft_sentinel_rule_details() -> PlatformDetails {
    PlatformDetails::new(
        "sentinel-kql-rule",
        "Microsoft Sentinel",
        "Microsoft",
        "Rule",
        "sentinel",
    )
}

pub fn microsoft_defender_details() -> PlatformDetails {
    PlatformDetails::new(
        "defender-kql-query",
        "Microsoft Defender",
        "Microsoft",
        "Query",
        "defender",
    )
}
