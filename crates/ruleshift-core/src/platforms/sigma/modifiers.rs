//! The Sigma modifier engine: field–modifier–value tuples to IR subtrees.

use crate::error::TranslateError;
use crate::ir::{FieldValue, Identifier, OperatorKind, Token, Value};
use crate::tokenizer::process_wildcards;

/// Sigma permits at most two stacked modifiers (`|contains|all`).
pub const MULTI_MODIFIER_LEN: usize = 2;

const WILDCARD: char = '*';

/// Rewrites one Sigma detection entry into IR tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifierEngine;

impl ModifierEngine {
    pub fn new() -> Self {
        Self
    }

    /// Entry point: `field|m1|m2: value` to a token subtree.
    pub fn generate(
        &self,
        field_name: &str,
        modifiers: &[String],
        value: Value,
    ) -> Result<Vec<Token>, TranslateError> {
        self.validate_modifiers(field_name, modifiers)?;
        match modifiers.len() {
            0 => Ok(self.equals(field_name, value)),
            1 => self.apply_modifier(field_name, &modifiers[0], value),
            _ => self.apply_multi_modifier(field_name, modifiers, value),
        }
    }

    fn validate_modifiers(
        &self,
        field_name: &str,
        modifiers: &[String],
    ) -> Result<(), TranslateError> {
        if modifiers.len() > MULTI_MODIFIER_LEN {
            return Err(TranslateError::ModifierChainTooLong(format!(
                "{field_name}|{}",
                modifiers.join("|")
            )));
        }
        Ok(())
    }

    fn map_modifier(&self, modifier: &str) -> Result<OperatorKind, TranslateError> {
        match modifier {
            "re" => Ok(OperatorKind::Regex),
            "contains" => Ok(OperatorKind::Contains),
            "startswith" => Ok(OperatorKind::StartsWith),
            "endswith" => Ok(OperatorKind::EndsWith),
            "gt" => Ok(OperatorKind::Gt),
            "gte" => Ok(OperatorKind::Gte),
            "lt" => Ok(OperatorKind::Lt),
            "lte" => Ok(OperatorKind::Lte),
            other => Err(TranslateError::UnsupportedOperator(format!(
                "sigma modifier `{other}`"
            ))),
        }
    }

    /// The modifier-free case: plain equality with wildcard normalization.
    fn equals(&self, field_name: &str, value: Value) -> Vec<Token> {
        let (value, operator) = process_wildcards(value, OperatorKind::Eq, WILDCARD);
        vec![Token::FieldValue(FieldValue {
            field: crate::ir::Field::new(field_name),
            operator,
            value,
        })]
    }

    fn apply_modifier(
        &self,
        field_name: &str,
        modifier: &str,
        value: Value,
    ) -> Result<Vec<Token>, TranslateError> {
        match modifier {
            "windash" => Ok(self.modifier_windash(field_name, OperatorKind::Eq, value)),
            "all" => Ok(self.modifier_all(field_name, OperatorKind::Eq, value)),
            other => {
                let operator = self.map_modifier(other)?;
                Ok(vec![Token::FieldValue(FieldValue::new(
                    field_name,
                    Identifier::op(operator),
                    value,
                ))])
            }
        }
    }

    /// Only two terminal modifiers are legal in a two-deep chain.
    fn apply_multi_modifier(
        &self,
        field_name: &str,
        modifiers: &[String],
        value: Value,
    ) -> Result<Vec<Token>, TranslateError> {
        match modifiers[1].as_str() {
            "all" => {
                let operator = self.map_modifier(&modifiers[0])?;
                Ok(self.modifier_all(field_name, operator, value))
            }
            "windash" => {
                let operator = self.map_modifier(&modifiers[0])?;
                Ok(self.modifier_windash(field_name, operator, value))
            }
            other => Err(TranslateError::UnsupportedOperator(format!(
                "sigma modifier `{other}` as chain terminal"
            ))),
        }
    }

    /// `|all`: AND-join the per-value comparisons, wrapped in parens.
    fn modifier_all(&self, field_name: &str, operator: OperatorKind, value: Value) -> Vec<Token> {
        let scalars: Vec<Value> = match value {
            Value::List(items) => items,
            scalar => vec![scalar],
        };
        if scalars.len() == 1 {
            let scalar = scalars.into_iter().next().unwrap_or(Value::Str(String::new()));
            return vec![Token::FieldValue(FieldValue::new(
                field_name,
                Identifier::op(operator),
                scalar,
            ))];
        }

        let mut tokens = vec![Token::Identifier(Identifier::l_paren())];
        for (index, scalar) in scalars.into_iter().enumerate() {
            if index > 0 {
                tokens.push(Token::Identifier(Identifier::and()));
            }
            tokens.push(Token::FieldValue(FieldValue::new(
                field_name,
                Identifier::op(operator),
                scalar,
            )));
        }
        tokens.push(Token::Identifier(Identifier::r_paren()));
        tokens
    }

    /// `|windash`: each value expands to both its `-` and `/` spellings,
    /// OR-joined.
    fn modifier_windash(
        &self,
        field_name: &str,
        operator: OperatorKind,
        value: Value,
    ) -> Vec<Token> {
        match value {
            Value::List(items) => {
                let mut tokens = vec![Token::Identifier(Identifier::l_paren())];
                for (index, item) in items.into_iter().enumerate() {
                    if index > 0 {
                        tokens.push(Token::Identifier(Identifier::or()));
                    }
                    tokens.extend(self.modifier_windash(field_name, operator, item));
                }
                tokens.push(Token::Identifier(Identifier::r_paren()));
                tokens
            }
            scalar => vec![Token::FieldValue(FieldValue::new(
                field_name,
                Identifier::op(operator),
                prepare_windash_value(scalar),
            ))],
        }
    }
}

/// A value starting with `-` or `/` yields both dash spellings; anything
/// else passes through unchanged.
fn prepare_windash_value(value: Value) -> Value {
    let Value::Str(text) = value else {
        return value;
    };
    if let Some(rest) = text.strip_prefix('/') {
        Value::List(vec![
            Value::Str(text.clone()),
            Value::Str(format!("-{rest}")),
        ])
    } else if let Some(rest) = text.strip_prefix('-') {
        Value::List(vec![
            Value::Str(text.clone()),
            Value::Str(format!("/{rest}")),
        ])
    } else {
        Value::Str(text)
    }
}
