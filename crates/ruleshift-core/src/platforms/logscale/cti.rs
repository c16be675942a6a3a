//! LogScale CTI hunting-query renderer.

use std::sync::OnceLock;

use super::consts::logscale_query_details;
use crate::cti::{generic_fields, CtiMapping, RenderCti};
use crate::managers::PlatformDetails;

fn cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["src_ip"]),
            (generic_fields::DESTINATION_IP, &["dst_ip"]),
            (generic_fields::DOMAIN, &["dns_query"]),
            (generic_fields::URL, &["url"]),
            (generic_fields::HASH_MD5, &["hash_md5"]),
            (generic_fields::HASH_SHA1, &["hash_sha1"]),
            (generic_fields::HASH_SHA256, &["hash_sha256"]),
        ])
    })
}

pub struct LogScaleCti {
    details: PlatformDetails,
}

impl Default for LogScaleCti {
    fn default() -> Self {
        Self::new()
    }
}

impl LogScaleCti {
    pub fn new() -> Self {
        Self {
            details: logscale_query_details(),
        }
    }
}

impl RenderCti for LogScaleCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        format!("{field}=\"{value}\"")
    }

    fn or_joiner(&self) -> &'static str {
        " or "
    }
}
