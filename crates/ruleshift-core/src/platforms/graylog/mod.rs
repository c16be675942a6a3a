//! Graylog: Lucene queries and CTI hunting queries.

pub mod consts;
pub mod cti;
pub mod mapping;

pub use consts::graylog_details;
pub use cti::GraylogCti;
pub use mapping::graylog_mappings;

use crate::platforms::base::lucene::{LuceneParser, LuceneQueryRender};

pub fn graylog_parser() -> LuceneParser {
    LuceneParser::new(graylog_details(), graylog_mappings())
}

pub fn graylog_query_render() -> LuceneQueryRender {
    LuceneQueryRender::new(graylog_details(), graylog_mappings())
}
