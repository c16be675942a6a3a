//! Elasticsearch CTI hunting-query renderer.

use std::sync::OnceLock;

use super::consts::elasticsearch_query_details;
use crate::cti::{generic_fields, CtiMapping, RenderCti};
use crate::managers::PlatformDetails;

pub(crate) fn ecs_cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["source.ip"]),
            (generic_fields::DESTINATION_IP, &["destination.ip"]),
            (generic_fields::DOMAIN, &["destination.domain"]),
            (generic_fields::URL, &["url.original"]),
            (generic_fields::HASH_MD5, &["file.hash.md5"]),
            (generic_fields::HASH_SHA1, &["file.hash.sha1"]),
            (generic_fields::HASH_SHA256, &["file.hash.sha256"]),
            (generic_fields::HASH_SHA512, &["file.hash.sha512"]),
            (generic_fields::EMAIL, &["source.user.email"]),
        ])
    })
}

pub struct ElasticsearchCti {
    details: PlatformDetails,
}

impl Default for ElasticsearchCti {
    fn default() -> Self {
        Self::new()
    }
}

impl ElasticsearchCti {
    pub fn new() -> Self {
        Self {
            details: elasticsearch_query_details(),
        }
    }
}

impl RenderCti for ElasticsearchCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        ecs_cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        format!("{field}:\"{value}\"")
    }
}
