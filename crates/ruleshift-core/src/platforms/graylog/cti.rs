//! Graylog CTI hunting-query renderer.

use std::sync::OnceLock;

use super::consts::graylog_details;
use crate::cti::{generic_fields, CtiMapping, RenderCti};
use crate::managers::PlatformDetails;

fn cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["source_ip"]),
            (generic_fields::DESTINATION_IP, &["destination_ip"]),
            (generic_fields::DOMAIN, &["dns_query"]),
            (generic_fields::URL, &["http_url"]),
            (generic_fields::HASH_MD5, &["file_hash_md5"]),
            (generic_fields::HASH_SHA1, &["file_hash_sha1"]),
            (generic_fields::HASH_SHA256, &["file_hash_sha256"]),
        ])
    })
}

pub struct GraylogCti {
    details: PlatformDetails,
}

impl Default for GraylogCti {
    fn default() -> Self {
        Self::new()
    }
}

impl GraylogCti {
    pub fn new() -> Self {
        Self {
            details: graylog_details(),
        }
    }
}

impl RenderCti for GraylogCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        format!("{field}:\"{value}\"")
    }
}
