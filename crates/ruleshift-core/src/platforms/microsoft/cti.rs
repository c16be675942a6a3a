//! Microsoft Sentinel and Defender CTI hunting-query renderers.

use std::sync::OnceLock;

use super::consts::{microsoft_defender_details, microsoft_sentinel_details};
use crate::cti::{generic_fields, CtiMapping, RenderCti};
use crate::managers::PlatformDetails;

fn sentinel_cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["SourceIP"]),
            (generic_fields::DESTINATION_IP, &["DestinationIP"]),
            (generic_fields::DOMAIN, &["DestinationHostName"]),
            (generic_fields::URL, &["RequestURL"]),
            (generic_fields::HASH_MD5, &["FileHashValue"]),
            (generic_fields::HASH_SHA1, &["FileHashValue"]),
            (generic_fields::HASH_SHA256, &["FileHashValue"]),
            (generic_fields::HASH_SHA512, &["FileHashValue"]),
            (generic_fields::EMAIL, &["SenderMailFromAddress"]),
        ])
    })
}

pub struct MicrosoftSentinelCti {
    details: PlatformDetails,
}

impl Default for MicrosoftSentinelCti {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrosoftSentinelCti {
    pub fn new() -> Self {
        Self {
            details: microsoft_sentinel_details(),
        }
    }
}

impl RenderCti for MicrosoftSentinelCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        sentinel_cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        format!("{field} =~ @\"{value}\"")
    }

    fn or_joiner(&self) -> &'static str {
        " or "
    }

    fn wrap_query(&self, body: String) -> String {
        format!("union * | where {body}")
    }
}

fn defender_cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::DESTINATION_IP, &["RemoteIP"]),
            (generic_fields::DOMAIN, &["RemoteUrl"]),
            (generic_fields::URL, &["RemoteUrl"]),
            (generic_fields::HASH_MD5, &["MD5"]),
            (generic_fields::HASH_SHA1, &["SHA1"]),
            (generic_fields::HASH_SHA256, &["SHA256"]),
        ])
    })
}

pub struct MicrosoftDefenderCti {
    details: PlatformDetails,
}

impl Default for MicrosoftDefenderCti {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrosoftDefenderCti {
    pub fn new() -> Self {
        Self {
            details: microsoft_defender_details(),
        }
    }
}

impl RenderCti for MicrosoftDefenderCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        defender_cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        format!("{field} =~ \"{value}\"")
    }

    fn or_joiner(&self) -> &'static str {
        " or "
    }

    fn wrap_query(&self, body: String) -> String {
        format!("union DeviceNetworkEvents, DeviceFileEvents, DeviceProcessEvents | where {body}")
    }
}
