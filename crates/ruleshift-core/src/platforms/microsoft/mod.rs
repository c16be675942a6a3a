//! Microsoft Sentinel and Microsoft Defender: KQL queries, scheduled-rule
//! JSON documents, and CTI hunting queries.

pub mod consts;
pub mod cti;
pub mod mapping;
pub mod parser;
pub mod render;

pub use consts::{
    microsoft_defender_details, microsoft_sentinel_details, microsoft_sentinel_rule_details,
};
pub use cti::{MicrosoftDefenderCti, MicrosoftSentinelCti};
pub use mapping::{defender_mappings, sentinel_mappings};
pub use parser::{MicrosoftDefenderParser, MicrosoftSentinelParser, MicrosoftSentinelRuleParser};
pub use render::{
    MicrosoftDefenderQueryRender, MicrosoftSentinelQueryRender, MicrosoftSentinelRuleRender,
};
