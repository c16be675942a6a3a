//! OpenSearch: Lucene queries, monitor rules, and CTI hunting queries.

pub mod consts;
pub mod cti;
pub mod mapping;
pub mod render;

pub use consts::{opensearch_query_details, opensearch_rule_details};
pub use cti::OpenSearchCti;
pub use mapping::opensearch_mappings;
pub use render::OpenSearchRuleRender;

use crate::platforms::base::lucene::{LuceneParser, LuceneQueryRender};

pub fn opensearch_parser() -> LuceneParser {
    LuceneParser::new(opensearch_query_details(), opensearch_mappings())
}

pub fn opensearch_query_render() -> LuceneQueryRender {
    LuceneQueryRender::new(opensearch_query_details(), opensearch_mappings())
}
