//! QRadar: AQL queries and CTI hunting queries.

pub mod consts;
pub mod cti;
pub mod mapping;

pub use consts::qradar_details;
pub use cti::QRadarCti;
pub use mapping::qradar_mappings;

use crate::platforms::base::sql::{SqlParser, SqlQueryRender, SqlRegexStyle};

pub fn qradar_parser() -> SqlParser {
    SqlParser::new(qradar_details(), qradar_mappings())
}

pub fn qradar_query_render() -> SqlQueryRender {
    SqlQueryRender::new(
        qradar_details(),
        qradar_mappings(),
        "ILIKE",
        SqlRegexStyle::Matches,
    )
}
