//! CrowdStrike: Falcon event search (SPL family) and CTI hunting queries.

pub mod consts;
pub mod cti;
pub mod mapping;

pub use consts::crowdstrike_details;
pub use cti::CrowdStrikeCti;
pub use mapping::crowdstrike_mappings;

use crate::platforms::base::spl::{SplParser, SplQueryRender};

pub fn crowdstrike_parser() -> SplParser {
    SplParser::new(crowdstrike_details(), crowdstrike_mappings())
}

pub fn crowdstrike_query_render() -> SplQueryRender {
    SplQueryRender::new(crowdstrike_details(), crowdstrike_mappings())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::QueryParser;
    use crate::render::QueryRender;

    #[test]
    fn round_trips_process_query() {
        let container = crowdstrike_parser()
            .parse(r#"event_simpleName=ProcessRollup2 CommandLine="*-enc*""#)
            .unwrap();
        let output = crowdstrike_query_render().generate(&container).unwrap();
        assert!(output.text.contains(r#"CommandLine="*-enc*""#));
    }
}
