use crate::managers::PlatformDetails;

pub fn sigma_rule_details() -> PlatformDetails {
    PlatformDetails::new("sigma", "Sigma", "Sigma", "Rule", "sigma").with_first_choice(1)
}
