//! The CTI renderer capability.

use super::converter::IocsChunkValue;
use crate::managers::PlatformDetails;

/// Per-platform binding of generic IOC fields to platform search fields.
/// A generic field may map to several platform fields (an IP searched in
/// both source and destination columns).
#[derive(Debug, Clone, Default)]
pub struct CtiMapping {
    entries: Vec<(String, Vec<String>)>,
}

impl CtiMapping {
    pub fn new(entries: &[(&str, &[&str])]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(generic, platforms)| {
                    (
                        generic.to_string(),
                        platforms.iter().map(|p| p.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn platform_fields(&self, generic: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(key, _)| key == generic)
            .map(|(_, fields)| fields.as_slice())
            .unwrap_or(&[])
    }
}

/// A platform-specific CTI query renderer. One chunk of IOC slots becomes
/// one standalone query: an OR-joined disjunction of field/value equalities,
/// with multi-field groups for a single value parenthesized.
pub trait RenderCti: Send + Sync {
    fn details(&self) -> &PlatformDetails;

    fn mapping(&self) -> &CtiMapping;

    /// One field/value equality in the platform's syntax.
    fn field_value_template(&self, field: &str, value: &str) -> String;

    fn or_joiner(&self) -> &'static str {
        " OR "
    }

    /// Wraps a rendered disjunction into the final query (prefix/suffix for
    /// platforms whose hunting queries need scaffolding).
    fn wrap_query(&self, body: String) -> String {
        body
    }

    fn render_chunk(&self, chunk: &[IocsChunkValue]) -> String {
        let mut groups: Vec<String> = Vec::new();
        let mut index = 0;
        while index < chunk.len() {
            let start = index;
            let value = &chunk[index].value;
            let generic = &chunk[index].generic_field;
            while index < chunk.len()
                && chunk[index].value == *value
                && is_paired_generic(generic, &chunk[index].generic_field)
            {
                index += 1;
            }
            let members: Vec<String> = chunk[start..index]
                .iter()
                .map(|slot| self.field_value_template(&slot.platform_field, &slot.value))
                .collect();
            if members.len() == 1 {
                groups.push(members.into_iter().next().unwrap_or_default());
            } else {
                groups.push(format!("({})", members.join(self.or_joiner())));
            }
        }
        groups.join(self.or_joiner())
    }

    /// Renders every chunk into its own query string.
    fn render(&self, chunks: &[Vec<IocsChunkValue>]) -> Vec<String> {
        chunks
            .iter()
            .map(|chunk| self.wrap_query(self.render_chunk(chunk)))
            .collect()
    }
}

/// IP slots split across source/destination belong to one render group.
fn is_paired_generic(first: &str, second: &str) -> bool {
    use super::parser::generic_fields::{DESTINATION_IP, SOURCE_IP};
    if first == second {
        return true;
    }
    let ip = [SOURCE_IP, DESTINATION_IP];
    ip.contains(&first) && ip.contains(&second)
}
