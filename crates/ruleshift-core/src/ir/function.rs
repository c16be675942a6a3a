//! Pipeline functions attached to a translation unit.
//!
//! Functions model the pipe tail of a query (`| stats count by User`,
//! `| summarize count() by User`). Canonical function names follow the SPL
//! spelling; dialect parsers normalize into it and renderers map back out.

use serde::{Deserialize, Serialize};

use super::{Field, FieldValue, Identifier, Keyword};

/// Sort direction for a [`SortArg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortArg {
    pub field: Field,
    pub order: SortOrder,
}

impl SortArg {
    pub fn new(field: Field, order: SortOrder) -> Self {
        Self { field, order }
    }
}

/// One argument of a [`Function`]. Arguments may nest arbitrarily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FuncArg {
    Field(Field),
    FieldValue(FieldValue),
    Keyword(Keyword),
    Identifier(Identifier),
    Function(Function),
    Sort(SortArg),
}

/// A named operation applied to the result stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub args: Vec<FuncArg>,
    pub by_clauses: Vec<Field>,
    pub alias: Option<String>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            by_clauses: Vec::new(),
            alias: None,
        }
    }

    pub fn with_args(mut self, args: Vec<FuncArg>) -> Self {
        self.args = args;
        self
    }

    pub fn with_by_clauses(mut self, by_clauses: Vec<Field>) -> Self {
        self.by_clauses = by_clauses;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// The parsed pipe tail: supported functions in order, plus the names of
/// functions the source dialect used but the parser does not model. The
/// latter surface as render diagnostics, never as hard failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParsedFunctions {
    pub functions: Vec<Function>,
    pub not_supported: Vec<String>,
}

impl ParsedFunctions {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.not_supported.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_builder_chains() {
        let func = Function::new("stats")
            .with_args(vec![FuncArg::Function(Function::new("count"))])
            .with_by_clauses(vec![Field::new("User")])
            .with_alias("total");
        assert_eq!(func.name, "stats");
        assert_eq!(func.args.len(), 1);
        assert_eq!(func.by_clauses.len(), 1);
        assert_eq!(func.alias.as_deref(), Some("total"));
    }

    #[test]
    fn parsed_functions_empty_check() {
        assert!(ParsedFunctions::default().is_empty());
        let parsed = ParsedFunctions {
            functions: Vec::new(),
            not_supported: vec!["eval".into()],
        };
        assert!(!parsed.is_empty());
    }
}
