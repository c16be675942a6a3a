//! Per-dialect character escaping for literal and regex-embedded values.

use regex::Regex;

/// Selects which escape rule applies to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Plain literal value.
    Value,
    /// Literal embedded inside a regular expression.
    RegexValue,
}

/// One escape rule: every character matched by `pattern` is prefixed with
/// `escape_char`.
#[derive(Debug, Clone)]
pub struct EscapeDetails {
    pattern: Regex,
    escape_char: String,
}

impl EscapeDetails {
    /// Builds a rule from a character-class pattern. Patterns are static
    /// per-dialect tables, so an invalid one is a programming error.
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid escape pattern"),
            escape_char: "\\".to_string(),
        }
    }

    pub fn with_escape_char(mut self, escape_char: impl Into<String>) -> Self {
        self.escape_char = escape_char.into();
        self
    }

    fn apply(&self, value: &str) -> String {
        self.pattern
            .replace_all(value, |caps: &regex::Captures<'_>| {
                format!("{}{}", self.escape_char, &caps[0])
            })
            .into_owned()
    }
}

/// Immutable per-dialect escape table.
#[derive(Debug, Clone, Default)]
pub struct EscapeManager {
    rules: Vec<(ValueType, EscapeDetails)>,
}

impl EscapeManager {
    pub fn new(rules: Vec<(ValueType, EscapeDetails)>) -> Self {
        Self { rules }
    }

    /// Escapes `value` under the rule registered for `value_type`. A value
    /// type with no rule returns the value unchanged.
    pub fn escape(&self, value: &str, value_type: ValueType) -> String {
        match self.rules.iter().find(|(vt, _)| *vt == value_type) {
            Some((_, details)) => details.apply(value),
            None => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn manager() -> EscapeManager {
        EscapeManager::new(vec![
            (ValueType::Value, EscapeDetails::new(r#"([\\|"])"#)),
            (
                ValueType::RegexValue,
                EscapeDetails::new(r#"([\\|/(")\[\]{}.^$+<>!?])"#),
            ),
        ])
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case(r#"has"quote"#, r#"has\"quote"#)]
    #[case(r"back\slash", r"back\\slash")]
    fn literal_escaping(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(manager().escape(input, ValueType::Value), expected);
    }

    #[test]
    fn regex_escaping_covers_metacharacters() {
        assert_eq!(
            manager().escape("a.b(c)", ValueType::RegexValue),
            r"a\.b\(c\)"
        );
    }

    #[test]
    fn missing_rule_returns_value_unchanged() {
        let empty = EscapeManager::default();
        assert_eq!(empty.escape(r#"a"b"#, ValueType::Value), r#"a"b"#);
    }

    #[test]
    fn custom_escape_char() {
        let manager = EscapeManager::new(vec![(
            ValueType::Value,
            EscapeDetails::new("(')").with_escape_char("'"),
        )]);
        assert_eq!(manager.escape("it's", ValueType::Value), "it''s");
    }
}
