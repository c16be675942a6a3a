//! IOC extraction from free-form threat-intelligence text.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

use super::CTI_MIN_LIMIT_QUERY;
use crate::error::TranslateError;

/// Generic field names the CTI mappings are keyed by.
pub mod generic_fields {
    pub const SOURCE_IP: &str = "SourceIP";
    pub const DESTINATION_IP: &str = "DestinationIP";
    pub const DOMAIN: &str = "Domain";
    pub const URL: &str = "URL";
    pub const HASH_MD5: &str = "HashMd5";
    pub const HASH_SHA1: &str = "HashSha1";
    pub const HASH_SHA256: &str = "HashSha256";
    pub const HASH_SHA512: &str = "HashSha512";
    pub const EMAIL: &str = "Emails";
}

/// Coarse IOC classes for include filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IocType {
    Ip,
    Domain,
    Url,
    Hash,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

/// A text-replacement rule applied before extraction, on top of the built-in
/// refang rules.
#[derive(Debug, Clone)]
pub struct IocParsingRule {
    pub pattern: String,
    pub replacement: String,
}

/// Options for one extraction run.
#[derive(Debug, Clone)]
pub struct IocParseOptions {
    /// Keep only these IOC classes. `None` keeps everything.
    pub include_ioc_types: Option<Vec<IocType>>,
    /// Keep only these hash kinds. `None` keeps everything.
    pub include_hash_types: Option<Vec<HashType>>,
    /// Deny-list: an IOC containing any of these substrings is dropped.
    pub exceptions: Vec<String>,
    pub parsing_rules: Vec<IocParsingRule>,
    /// Bucket IPs under `SourceIP` in addition to `DestinationIP`.
    pub include_source_ip: bool,
    /// Hard cap on the total number of extracted IOCs.
    pub limit: usize,
}

impl Default for IocParseOptions {
    fn default() -> Self {
        Self {
            include_ioc_types: None,
            include_hash_types: None,
            exceptions: Vec::new(),
            parsing_rules: Vec::new(),
            include_source_ip: false,
            limit: CTI_MIN_LIMIT_QUERY,
        }
    }
}

/// Typed IOC buckets, each deduplicated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedIocs {
    pub ip: Vec<String>,
    pub domain: Vec<String>,
    pub url: Vec<String>,
    pub md5: Vec<String>,
    pub sha1: Vec<String>,
    pub sha256: Vec<String>,
    pub sha512: Vec<String>,
    pub email: Vec<String>,
    pub include_source_ip: bool,
}

impl ParsedIocs {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.ip.len()
            + self.domain.len()
            + self.url.len()
            + self.md5.len()
            + self.sha1.len()
            + self.sha256.len()
            + self.sha512.len()
            + self.email.len()
    }
}

struct IocPatterns {
    url: Regex,
    email: Regex,
    ipv4: Regex,
    domain: Regex,
    md5: Regex,
    sha1: Regex,
    sha256: Regex,
    sha512: Regex,
}

fn patterns() -> &'static IocPatterns {
    static PATTERNS: OnceLock<IocPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| IocPatterns {
        url: Regex::new(r#"\bhttps?://[^\s'"<>\)\]]+"#).expect("valid url pattern"),
        email: Regex::new(r"\b[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}\b")
            .expect("valid email pattern"),
        ipv4: Regex::new(
            r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b",
        )
        .expect("valid ip pattern"),
        domain: Regex::new(r"\b(?:[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}\b")
            .expect("valid domain pattern"),
        md5: Regex::new(r"\b[a-fA-F0-9]{32}\b").expect("valid md5 pattern"),
        sha1: Regex::new(r"\b[a-fA-F0-9]{40}\b").expect("valid sha1 pattern"),
        sha256: Regex::new(r"\b[a-fA-F0-9]{64}\b").expect("valid sha256 pattern"),
        sha512: Regex::new(r"\b[a-fA-F0-9]{128}\b").expect("valid sha512 pattern"),
    })
}

/// Built-in defang reversal applied before extraction.
const REFANG_RULES: &[(&str, &str)] = &[
    ("[.]", "."),
    ("(.)", "."),
    ("{.}", "."),
    ("[:]", ":"),
    ("[@]", "@"),
    ("hxxps://", "https://"),
    ("hxxp://", "http://"),
    ("hXXps://", "https://"),
    ("hXXp://", "http://"),
];

/// Extracts IOCs from free text.
#[derive(Debug, Clone, Default)]
pub struct CtiParser;

impl CtiParser {
    pub fn new() -> Self {
        Self
    }

    /// Runs the full extraction pipeline: refang, regex-extract per class,
    /// dedupe preserving insertion order, apply filters, truncate at the
    /// limit.
    pub fn iocs_from_string(
        &self,
        text: &str,
        options: &IocParseOptions,
    ) -> Result<ParsedIocs, TranslateError> {
        let mut normalized = text.to_string();
        for (pattern, replacement) in REFANG_RULES {
            normalized = normalized.replace(pattern, replacement);
        }
        for rule in &options.parsing_rules {
            normalized = normalized.replace(&rule.pattern, &rule.replacement);
        }

        let patterns = patterns();
        let mut remaining = options.limit;

        let urls = self.extract(&patterns.url, &normalized, options, &mut remaining);
        let emails = self.extract(&patterns.email, &normalized, options, &mut remaining);
        let ips = self.extract(&patterns.ipv4, &normalized, options, &mut remaining);

        // Hostnames inside already-extracted URLs and e-mail addresses are
        // not standalone domain IOCs; dotted quads match the domain pattern
        // too and must lose to the IP class.
        let consumed: Vec<&String> = urls.iter().chain(emails.iter()).collect();
        let mut domains = Vec::new();
        let mut seen = HashSet::new();
        for m in patterns.domain.find_iter(&normalized) {
            let candidate = m.as_str().to_string();
            if patterns.ipv4.is_match(&candidate) {
                continue;
            }
            if consumed.iter().any(|ioc| ioc.contains(&candidate)) {
                continue;
            }
            if self.excluded(&candidate, options) || !seen.insert(candidate.clone()) {
                continue;
            }
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            domains.push(candidate);
        }

        let sha512 = self.extract(&patterns.sha512, &normalized, options, &mut remaining);
        let sha256 = self.extract(&patterns.sha256, &normalized, options, &mut remaining);
        let sha1 = self.extract(&patterns.sha1, &normalized, options, &mut remaining);
        // Shorter hex runs embedded in longer digests carry no boundary, so
        // the md5 pass only sees genuine 32-char tokens.
        let md5 = self.extract(&patterns.md5, &normalized, options, &mut remaining);

        let keep_type = |ioc_type: IocType| {
            options
                .include_ioc_types
                .as_ref()
                .map(|types| types.contains(&ioc_type))
                .unwrap_or(true)
        };
        let keep_hash = |hash_type: HashType| {
            keep_type(IocType::Hash)
                && options
                    .include_hash_types
                    .as_ref()
                    .map(|types| types.contains(&hash_type))
                    .unwrap_or(true)
        };

        let parsed = ParsedIocs {
            ip: if keep_type(IocType::Ip) { ips } else { Vec::new() },
            domain: if keep_type(IocType::Domain) {
                domains
            } else {
                Vec::new()
            },
            url: if keep_type(IocType::Url) { urls } else { Vec::new() },
            md5: if keep_hash(HashType::Md5) { md5 } else { Vec::new() },
            sha1: if keep_hash(HashType::Sha1) { sha1 } else { Vec::new() },
            sha256: if keep_hash(HashType::Sha256) {
                sha256
            } else {
                Vec::new()
            },
            sha512: if keep_hash(HashType::Sha512) {
                sha512
            } else {
                Vec::new()
            },
            email: if keep_type(IocType::Email) {
                emails
            } else {
                Vec::new()
            },
            include_source_ip: options.include_source_ip,
        };
        debug!(total = parsed.total(), "extracted IOCs");
        Ok(parsed)
    }

    fn extract(
        &self,
        pattern: &Regex,
        text: &str,
        options: &IocParseOptions,
        remaining: &mut usize,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for m in pattern.find_iter(text) {
            let value = m.as_str().to_string();
            if self.excluded(&value, options) || !seen.insert(value.clone()) {
                continue;
            }
            if *remaining == 0 {
                break;
            }
            *remaining -= 1;
            values.push(value);
        }
        values
    }

    fn excluded(&self, value: &str, options: &IocParseOptions) -> bool {
        options
            .exceptions
            .iter()
            .any(|exception| value.contains(exception))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedIocs {
        CtiParser::new()
            .iocs_from_string(text, &IocParseOptions::default())
            .unwrap()
    }

    #[test]
    fn extracts_and_classifies() {
        let parsed = parse(
            "Observed 8.8.8.8 contacting evil.example.com, payload at \
             http://bad.example.net/drop.exe, hash d41d8cd98f00b204e9800998ecf8427e",
        );
        assert_eq!(parsed.ip, vec!["8.8.8.8"]);
        assert_eq!(parsed.domain, vec!["evil.example.com"]);
        assert_eq!(parsed.url, vec!["http://bad.example.net/drop.exe"]);
        assert_eq!(parsed.md5, vec!["d41d8cd98f00b204e9800998ecf8427e"]);
    }

    #[test]
    fn refangs_defanged_indicators() {
        let parsed = parse("beacon to hxxp://evil[.]example[.]com/c2 and 10[.]0[.]0[.]1");
        assert_eq!(parsed.url, vec!["http://evil.example.com/c2"]);
        assert_eq!(parsed.ip, vec!["10.0.0.1"]);
    }

    #[test]
    fn url_hostnames_are_not_standalone_domains() {
        let parsed = parse("see http://evil.example.com/path");
        assert!(parsed.domain.is_empty());
        assert_eq!(parsed.url.len(), 1);
    }

    #[test]
    fn email_hostnames_are_not_standalone_domains() {
        let parsed = parse("mail from attacker@evil.example.com");
        assert_eq!(parsed.email, vec!["attacker@evil.example.com"]);
        assert!(parsed.domain.is_empty());
    }

    #[test]
    fn deduplicates_preserving_order() {
        let parsed = parse("1.2.3.4 then 5.6.7.8 then 1.2.3.4 again");
        assert_eq!(parsed.ip, vec!["1.2.3.4", "5.6.7.8"]);
    }

    #[test]
    fn hash_classes_do_not_overlap() {
        let sha256 = "a".repeat(64);
        let parsed = parse(&sha256);
        assert_eq!(parsed.sha256.len(), 1);
        assert!(parsed.md5.is_empty());
        assert!(parsed.sha1.is_empty());
    }

    #[test]
    fn exceptions_drop_matching_iocs() {
        let options = IocParseOptions {
            exceptions: vec!["example.com".to_string()],
            ..Default::default()
        };
        let parsed = CtiParser::new()
            .iocs_from_string("evil.example.com and bad.other.net", &options)
            .unwrap();
        assert_eq!(parsed.domain, vec!["bad.other.net"]);
    }

    #[test]
    fn include_filters_restrict_classes() {
        let options = IocParseOptions {
            include_ioc_types: Some(vec![IocType::Ip]),
            ..Default::default()
        };
        let parsed = CtiParser::new()
            .iocs_from_string("8.8.8.8 evil.example.com", &options)
            .unwrap();
        assert_eq!(parsed.ip, vec!["8.8.8.8"]);
        assert!(parsed.domain.is_empty());
    }

    #[test]
    fn limit_caps_total_extraction() {
        let options = IocParseOptions {
            limit: 2,
            ..Default::default()
        };
        let parsed = CtiParser::new()
            .iocs_from_string("1.1.1.1 2.2.2.2 3.3.3.3", &options)
            .unwrap();
        assert_eq!(parsed.total(), 2);
    }

    #[test]
    fn custom_parsing_rules_apply() {
        let options = IocParseOptions {
            parsing_rules: vec![IocParsingRule {
                pattern: " DOT ".to_string(),
                replacement: ".".to_string(),
            }],
            ..Default::default()
        };
        let parsed = CtiParser::new()
            .iocs_from_string("evil DOT example DOT com", &options)
            .unwrap();
        assert_eq!(parsed.domain, vec!["evil.example.com"]);
    }
}
