use crate::managers::PlatformDetails;

pub fn athena_details() -> PlatformDetails {
    PlatformDetails::new("athena-sql-query", "Athena", "Athena", "Query", "athena")
}
