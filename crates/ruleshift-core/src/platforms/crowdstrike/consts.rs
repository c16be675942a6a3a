use crate::managers::PlatformDetails;

pub fn crowdstrike_details() -> PlatformDetails {
    PlatformDetails::new(
        "crowdstrike-spl-query",
        "CrowdStrike",
        "CrowdStrike",
        "Query",
        "crowdstrike",
    )
}
