//! Structural tokens of the IR stream.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{FieldValue, Keyword};

/// Comparison operator attached to a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
    In,
    /// Bare search term with no field qualifier.
    Keyword,
}

impl OperatorKind {
    /// Multi-value operators carry a list value; all others carry a scalar.
    pub fn is_multi_value(&self) -> bool {
        matches!(self, Self::In)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Eq => "eq",
            Self::NotEq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Regex => "regex",
            Self::In => "in",
            Self::Keyword => "keyword",
        };
        f.write_str(text)
    }
}

/// Closed set of identifier token types: logical operators, grouping, and
/// comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    And,
    Or,
    Not,
    LParen,
    RParen,
    Op(OperatorKind),
}

/// A lexical atom with a type drawn from [`TokenKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub kind: TokenKind,
}

impl Identifier {
    pub fn new(kind: TokenKind) -> Self {
        Self { kind }
    }

    pub fn and() -> Self {
        Self::new(TokenKind::And)
    }

    pub fn or() -> Self {
        Self::new(TokenKind::Or)
    }

    pub fn not() -> Self {
        Self::new(TokenKind::Not)
    }

    pub fn l_paren() -> Self {
        Self::new(TokenKind::LParen)
    }

    pub fn r_paren() -> Self {
        Self::new(TokenKind::RParen)
    }

    pub fn op(operator: OperatorKind) -> Self {
        Self::new(TokenKind::Op(operator))
    }

    pub fn operator(&self) -> Option<OperatorKind> {
        match self.kind {
            TokenKind::Op(op) => Some(op),
            _ => None,
        }
    }
}

/// One element of the flat IR stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    FieldValue(FieldValue),
    Keyword(Keyword),
    Identifier(Identifier),
}

impl Token {
    pub fn as_field_value(&self) -> Option<&FieldValue> {
        match self {
            Self::FieldValue(fv) => Some(fv),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Identifier(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        matches!(self, Self::Identifier(id) if id.kind == kind)
    }
}

impl From<FieldValue> for Token {
    fn from(fv: FieldValue) -> Self {
        Self::FieldValue(fv)
    }
}

impl From<Keyword> for Token {
    fn from(kw: Keyword) -> Self {
        Self::Keyword(kw)
    }
}

impl From<Identifier> for Token {
    fn from(id: Identifier) -> Self {
        Self::Identifier(id)
    }
}
