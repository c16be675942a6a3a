//! QRadar CTI hunting-query renderer.

use std::sync::OnceLock;

use super::consts::qradar_details;
use crate::cti::{generic_fields, CtiMapping, RenderCti};
use crate::managers::PlatformDetails;

fn cti_mapping() -> &'static CtiMapping {
    static MAPPING: OnceLock<CtiMapping> = OnceLock::new();
    MAPPING.get_or_init(|| {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["sourceip"]),
            (generic_fields::DESTINATION_IP, &["destinationip"]),
            (generic_fields::DOMAIN, &["URL Host"]),
            (generic_fields::URL, &["URL"]),
            (generic_fields::HASH_MD5, &["MD5 Hash"]),
            (generic_fields::HASH_SHA1, &["SHA1 Hash"]),
            (generic_fields::HASH_SHA256, &["SHA256 Hash"]),
        ])
    })
}

pub struct QRadarCti {
    details: PlatformDetails,
}

impl Default for QRadarCti {
    fn default() -> Self {
        Self::new()
    }
}

impl QRadarCti {
    pub fn new() -> Self {
        Self {
            details: qradar_details(),
        }
    }
}

impl RenderCti for QRadarCti {
    fn details(&self) -> &PlatformDetails {
        &self.details
    }

    fn mapping(&self) -> &CtiMapping {
        cti_mapping()
    }

    fn field_value_template(&self, field: &str, value: &str) -> String {
        if field.contains(' ') {
            format!("\"{field}\"='{value}'")
        } else {
            format!("{field}='{value}'")
        }
    }

    fn wrap_query(&self, body: String) -> String {
        format!("SELECT UTF8(payload) FROM events WHERE {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cti::{iocs_chunks, CtiParser, IocParseOptions};

    #[test]
    fn wraps_select_and_quotes_custom_properties() {
        let parsed = CtiParser::new()
            .iocs_from_string(
                "d41d8cd98f00b204e9800998ecf8427e",
                &IocParseOptions::default(),
            )
            .unwrap();
        let render = QRadarCti::new();
        let chunks = iocs_chunks(&parsed, render.mapping(), 25);
        let queries = render.render(&chunks);
        assert_eq!(
            queries,
            vec![
                "SELECT UTF8(payload) FROM events WHERE \"MD5 Hash\"='d41d8cd98f00b204e9800998ecf8427e'"
                    .to_string()
            ]
        );
    }
}
