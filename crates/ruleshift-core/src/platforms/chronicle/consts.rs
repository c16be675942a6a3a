use crate::managers::PlatformDetails;

pub fn chronicle_query_details() -> PlatformDetails {
    PlatformDetails::new(
        "chronicle-yaral-query",
        "Chronicle",
        "Chronicle",
        "Query",
        "chronicle",
    )
}

pub fn chronicle_rule_details() -> PlatformDetails {
    PlatformDetails::new(
        "chronicle-yaral-rule",
        "Chronicle",
        "Chronicle",
        "Rule",
        "chronicle",
    )
}
