//! IOC slot construction and chunking.

use super::parser::{generic_fields, ParsedIocs};
use super::render::CtiMapping;

/// One IOC slot after field mapping: the generic field it came from, the
/// platform field it renders to, and the indicator value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IocsChunkValue {
    pub generic_field: String,
    pub platform_field: String,
    pub value: String,
}

impl IocsChunkValue {
    fn new(generic_field: &str, platform_field: &str, value: &str) -> Self {
        Self {
            generic_field: generic_field.to_string(),
            platform_field: platform_field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Maps parsed IOCs through a platform's CTI mapping and slices the slot
/// stream into chunks of at most `chunk_size`.
///
/// Slots are built value-major: every platform field for one indicator value
/// is adjacent in the stream, so renderers can parenthesize the group (an IP
/// expanding to both `src_ip` and `dest_ip`, say). Generic fields absent
/// from the platform mapping are dropped.
pub fn iocs_chunks(
    parsed: &ParsedIocs,
    mapping: &CtiMapping,
    chunk_size: usize,
) -> Vec<Vec<IocsChunkValue>> {
    let mut slots: Vec<IocsChunkValue> = Vec::new();

    let mut ip_fields: Vec<&str> = Vec::new();
    if parsed.include_source_ip {
        ip_fields.push(generic_fields::SOURCE_IP);
    }
    ip_fields.push(generic_fields::DESTINATION_IP);

    for value in &parsed.ip {
        for generic in &ip_fields {
            for platform in mapping.platform_fields(generic) {
                slots.push(IocsChunkValue::new(generic, platform, value));
            }
        }
    }

    let buckets: [(&str, &Vec<String>); 7] = [
        (generic_fields::DOMAIN, &parsed.domain),
        (generic_fields::URL, &parsed.url),
        (generic_fields::HASH_MD5, &parsed.md5),
        (generic_fields::HASH_SHA1, &parsed.sha1),
        (generic_fields::HASH_SHA256, &parsed.sha256),
        (generic_fields::HASH_SHA512, &parsed.sha512),
        (generic_fields::EMAIL, &parsed.email),
    ];
    for (generic, values) in buckets {
        for value in values {
            for platform in mapping.platform_fields(generic) {
                slots.push(IocsChunkValue::new(generic, platform, value));
            }
        }
    }

    if chunk_size == 0 {
        return if slots.is_empty() {
            Vec::new()
        } else {
            vec![slots]
        };
    }
    slots
        .chunks(chunk_size)
        .map(<[IocsChunkValue]>::to_vec)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splunk_like_mapping() -> CtiMapping {
        CtiMapping::new(&[
            (generic_fields::SOURCE_IP, &["src_ip"]),
            (generic_fields::DESTINATION_IP, &["dest_ip"]),
            (generic_fields::DOMAIN, &["query"]),
            (generic_fields::URL, &["url"]),
        ])
    }

    fn parsed() -> ParsedIocs {
        ParsedIocs {
            ip: vec!["8.8.8.8".to_string()],
            domain: vec!["evil.example.com".to_string()],
            include_source_ip: true,
            ..Default::default()
        }
    }

    #[test]
    fn ip_slots_stay_value_adjacent() {
        let chunks = iocs_chunks(&parsed(), &splunk_like_mapping(), 25);
        assert_eq!(chunks.len(), 1);
        let fields: Vec<&str> = chunks[0]
            .iter()
            .map(|slot| slot.platform_field.as_str())
            .collect();
        assert_eq!(fields, vec!["src_ip", "dest_ip", "query"]);
    }

    #[test]
    fn unmapped_generic_fields_are_dropped() {
        let mapping = CtiMapping::new(&[(generic_fields::DESTINATION_IP, &["dst"])]);
        let chunks = iocs_chunks(&parsed(), &mapping, 25);
        assert_eq!(chunks[0].len(), 1);
        assert_eq!(chunks[0][0].platform_field, "dst");
    }

    #[test]
    fn chunking_law_holds() {
        let mut parsed = ParsedIocs::default();
        parsed.domain = (0..10).map(|i| format!("host{i}.example.com")).collect();
        let mapping = CtiMapping::new(&[(generic_fields::DOMAIN, &["query"])]);

        let chunks = iocs_chunks(&parsed, &mapping, 3);
        assert!(chunks.iter().all(|chunk| chunk.len() <= 3));
        let flattened: Vec<String> = chunks
            .iter()
            .flatten()
            .map(|slot| slot.value.clone())
            .collect();
        assert_eq!(flattened, parsed.domain);
    }

    #[test]
    fn empty_input_produces_no_chunks() {
        let chunks = iocs_chunks(&ParsedIocs::default(), &splunk_like_mapping(), 25);
        assert!(chunks.is_empty());
    }
}
