use crate::managers::PlatformDetails;

pub fn forti_siem_details() -> PlatformDetails {
    PlatformDetails::new(
        "fortisiem-rule",
        "FortiSIEM",
        "Fortinet",
        "Rule",
        "fortisiem",
    )
}
