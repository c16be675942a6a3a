//! Splunk CTI hunting-query renderer.

use std::sync::OnceLock;

use super::consts::splunk_cti_details;
use crate::cti::{generic_fields, CtiMapping, RenderCti};
use crate::managers::PlatformDetails;

fn cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["src_ip"]),
            (generic_fields::DESTINATION_IP, &["dest_ip"]),
            (generic_fields::DOMAIN, &["query"]),
            (generic_fields::URL, &["url"]),
            (generic_fields::HASH_MD5, &["file_hash"]),
            (generic_fields::HASH_SHA1, &["file_hash"]),
            (generic_fields::HASH_SHA256, &["file_hash"]),
            (generic_fields::HASH_SHA512, &["file_hash"]),
            (generic_fields::EMAIL, &["src_user"]),
        ])
    })
}

pub struct SplunkCti {
    details: PlatformDetails,
}

impl Default for SplunkCti {
    fn default() -> Self {
        Self::new()
    }
}

impl SplunkCti {
    pub fn new() -> Self {
        Self {
            details: splunk_cti_details(),
        }
    }
}

impl RenderCti for SplunkCti {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cti::{iocs_chunks, CtiParser, IocParseOptions};

    #[test]
    fn renders_ip_and_domain_chunk() {
        let options = IocParseOptions {
            include_source_ip: true,
            ..Default::default()
        };
        let parsed = CtiParser::new()
            .iocs_from_string("8.8.8.8 evil.example.com", &options)
            .unwrap();
        let render = SplunkCti::new();
        let chunks = iocs_chunks(&parsed, render.mapping(), 25);
        let queries = render.render(&chunks);
        assert_eq!(
            queries,
            vec![
                r#"(src_ip="8.8.8.8" OR dest_ip="8.8.8.8") OR query="evil.example.com""#
                    .to_string()
            ]
        );
    }
}
