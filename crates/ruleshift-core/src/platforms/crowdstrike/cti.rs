//! CrowdStrike CTI hunting-query renderer.

use std::sync::OnceLock;

use super::consts::crowdstrike_details;
use crate::cti::{generic_fields, CtiMapping, RenderCti};
use crate::managers::PlatformDetails;

fn cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["LocalAddressIP4"]),
            (generic_fields::DESTINATION_IP, &["RemoteAddressIP4"]),
            (generic_fields::DOMAIN, &["DomainName"]),
            (generic_fields::URL, &["HttpUrl"]),
            (generic_fields::HASH_MD5, &["MD5HashData"]),
            (generic_fields::HASH_SHA1, &["SHA1HashData"]),
            (generic_fields::HASH_SHA256, &["SHA256HashData"]),
        ])
    })
}

pub struct CrowdStrikeCti {
    details: PlatformDetails,
}

impl Default for CrowdStrikeCti {
    fn default() -> Self {
        Self::new()
    }
}

impl CrowdStrikeCti {
    pub fn new() -> Self {
        Self {
            details: crowdstrike_details(),
        }
    }
}

impl RenderCti for CrowdStrikeCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        format!("{field}=\"{value}\"")
    }
}
