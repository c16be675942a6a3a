//! Chronicle CTI hunting-query renderer.

use std::sync::OnceLock;

use super::consts::chronicle_query_details;
use crate::cti::{generic_fields, CtiMapping, RenderCti};
use crate::managers::PlatformDetails;

fn cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["principal.ip"]),
            (generic_fields::DESTINATION_IP, &["target.ip"]),
            (generic_fields::DOMAIN, &["target.domain.name"]),
            (generic_fields::URL, &["target.url"]),
            (generic_fields::HASH_MD5, &["target.file.md5"]),
            (generic_fields::HASH_SHA1, &["target.file.sha1"]),
            (generic_fields::HASH_SHA256, &["target.file.sha256"]),
        ])
    })
}

pub struct ChronicleCti {
    details: PlatformDetails,
}

impl Default for ChronicleCti {
    fn default() -> Self {
        Self::new()
    }
}

impl ChronicleCti {
    pub fn new() -> Self {
        Self {
            details: chronicle_query_details(),
        }
    }
}

impl RenderCti for ChronicleCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        format!("{field} = \"{value}\"")
    }

    fn or_joiner(&self) -> &'static str {
        " or "
    }
}
