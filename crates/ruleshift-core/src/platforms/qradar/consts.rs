use crate::managers::PlatformDetails;

pub fn qradar_details() -> PlatformDetails {
    PlatformDetails::new("qradar-aql-query", "QRadar", "QRadar", "Query", "qradar")
}
