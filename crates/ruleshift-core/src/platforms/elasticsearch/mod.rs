//! Elasticsearch: Lucene queries, detection rules, ElastAlert, Kibana
//! saved searches, X-Pack Watcher watches, and CTI hunting queries.

pub mod consts;
pub mod cti;
pub mod mapping;
pub mod parser;
pub mod render;

pub use consts::{
    elastalert_details, elasticsearch_query_details, elasticsearch_rule_details, kibana_details,
    xpack_watcher_details,
};
pub use cti::ElasticsearchCti;
pub use mapping::elasticsearch_mappings;
pub use parser::{ElasticsearchParser, ElasticsearchRuleParser};
pub use render::{
    ElastAlertRuleRender, ElasticsearchQueryRender, ElasticsearchRuleRender, KibanaRuleRender,
    XPackWatcherRuleRender,
};
