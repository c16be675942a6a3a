//! The dialect-independent intermediate representation.
//!
//! Source dialects tokenize into a flat stream of [`Token`] values — field
//! comparisons, bare keywords, and structural identifiers (logical operators
//! and parentheses). The stream preserves source grouping, so renderers can
//! emit it in order without re-associating precedence.

mod field;
mod function;
mod meta;
mod token;

pub use field::{Field, FieldValue, Keyword, Value};
pub use function::{FuncArg, Function, ParsedFunctions, SortArg, SortOrder};
pub use meta::{MetaInfoContainer, Severity, SiemContainer};
pub use token::{Identifier, OperatorKind, Token, TokenKind};
