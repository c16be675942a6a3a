//! Athena CTI hunting-query renderer.

use std::sync::OnceLock;

use super::consts::athena_details;
use crate::cti::{generic_fields, CtiMapping, RenderCti};
use crate::managers::PlatformDetails;

fn cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["src_ip"]),
            (generic_fields::DESTINATION_IP, &["dst_ip"]),
            (generic_fields::DOMAIN, &["domain_name"]),
            (generic_fields::URL, &["url"]),
            (generic_fields::HASH_MD5, &["md5_hash"]),
            (generic_fields::HASH_SHA1, &["sha1_hash"]),
            (generic_fields::HASH_SHA256, &["sha256_hash"]),
        ])
    })
}

pub struct AthenaCti {
    details: PlatformDetails,
}

impl Default for AthenaCti {
    fn default() -> Self {
        Self::new()
    }
}

impl AthenaCti {
    pub fn new() -> Self {
        Self {
            details: athena_details(),
        }
    }
}

impl RenderCti for AthenaCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        format!("{field}='{value}'")
    }

    fn wrap_query(&self, body: String) -> String {
        format!("SELECT * FROM logs WHERE {body}")
    }
}
