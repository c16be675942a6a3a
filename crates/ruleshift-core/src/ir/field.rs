//! Fields, field comparisons, and bare keywords.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::{Identifier, OperatorKind};
use crate::mapping::SourceMapping;

/// A scalar or list value attached to a field comparison.
///
/// Invariant: multi-value operators (`IN`) carry [`Value::List`]; every other
/// operator carries a scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Num(i64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Parses digit-only text into a number, keeping everything else a string.
    pub fn scalar(text: impl Into<String>) -> Self {
        let text: String = text.into();
        match text.parse::<i64>() {
            Ok(num) if !text.is_empty() => Self::Num(num),
            _ => Self::Str(text),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The scalar elements of this value: the value itself, or the list
    /// contents for [`Value::List`].
    pub fn scalars(&self) -> Vec<&Value> {
        match self {
            Self::List(items) => items.iter().collect(),
            scalar => vec![scalar],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                f.write_str(&rendered.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Str(text.to_string())
    }
}

impl From<i64> for Value {
    fn from(num: i64) -> Self {
        Self::Num(num)
    }
}

/// A named reference to a data column.
///
/// `source_name` is the spelling from the source text. After parsing,
/// `generic_names_map` binds every candidate source-mapping id to the
/// normalized generic field name; mappings without a binding keep the source
/// spelling verbatim and are reported as unmapped at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub source_name: String,
    pub generic_names_map: HashMap<String, String>,
    pub alias: Option<String>,
    mapped_ids: HashSet<String>,
}

impl Field {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            generic_names_map: HashMap::new(),
            alias: None,
            mapped_ids: HashSet::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Populates `generic_names_map` for every candidate mapping. A mapping
    /// that cannot resolve the source name falls back to the default mapping,
    /// then to the verbatim source spelling.
    pub fn set_generic_names_map(&mut self, mappings: &[&SourceMapping], default: &SourceMapping) {
        for mapping in mappings {
            let resolved = mapping
                .generic_field(&self.source_name)
                .or_else(|| default.generic_field(&self.source_name));
            match resolved {
                Some(generic) => {
                    self.generic_names_map
                        .insert(mapping.source_id.to_string(), generic.to_string());
                    self.mapped_ids.insert(mapping.source_id.to_string());
                }
                None => {
                    self.generic_names_map
                        .insert(mapping.source_id.to_string(), self.source_name.clone());
                }
            }
        }
    }

    /// The generic name bound for `mapping_id`, falling back to the source
    /// spelling when the mapping layer never resolved this field.
    pub fn generic_name(&self, mapping_id: &str) -> &str {
        self.generic_names_map
            .get(mapping_id)
            .map(String::as_str)
            .unwrap_or(&self.source_name)
    }

    /// Whether `mapping_id` produced a real binding (as opposed to the
    /// verbatim fallback).
    pub fn is_mapped_for(&self, mapping_id: &str) -> bool {
        self.mapped_ids.contains(mapping_id)
    }
}

/// The `(field, operator, value)` triple at the heart of the IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub field: Field,
    pub operator: Identifier,
    pub value: Value,
}

impl FieldValue {
    pub fn new(source_name: impl Into<String>, operator: Identifier, value: Value) -> Self {
        Self {
            field: Field::new(source_name),
            operator,
            value,
        }
    }

    pub fn operator_kind(&self) -> OperatorKind {
        self.operator.operator().unwrap_or(OperatorKind::Eq)
    }
}

/// A bare search term with no field qualifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub value: String,
}

impl Keyword {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}
