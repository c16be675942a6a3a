//! The CTI pipeline: free-form indicator text to platform hunting queries.
//!
//! Flow: [`CtiParser`] extracts and classifies IOCs, [`iocs_chunks`] maps
//! them through a platform's [`CtiMapping`] and slices the slot stream into
//! per-query chunks, and a platform [`RenderCti`] emits one OR-joined query
//! per chunk.

mod converter;
mod parser;
mod render;

pub use converter::{iocs_chunks, IocsChunkValue};
pub use parser::{generic_fields, CtiParser, HashType, IocParseOptions, IocParsingRule, IocType, ParsedIocs};
pub use render::{CtiMapping, RenderCti};

/// Hard cap on extracted IOCs per request.
pub const CTI_MIN_LIMIT_QUERY: usize = 10_000;

/// Default number of IOC slots per rendered query.
pub const CTI_IOCS_PER_QUERY_LIMIT: usize = 25;
