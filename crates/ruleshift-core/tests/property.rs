//! Property-based checks over the quantified invariants.

use proptest::prelude::*;

use ruleshift_core::cti::{iocs_chunks, generic_fields, CtiMapping, ParsedIocs};
use ruleshift_core::ir::{OperatorKind, Token, TokenKind, Value};
use ruleshift_core::platforms::base::spl::spl_tokenizer;
use ruleshift_core::tokenizer::process_wildcards;

fn identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,8}".prop_filter("reserved word", |s| {
        !matches!(s.to_lowercase().as_str(), "and" | "or" | "not" | "in")
    })
}

/// A small well-formed SPL-like boolean expression.
fn expression(depth: u32) -> BoxedStrategy<String> {
    let leaf = (identifier(), 1u32..100_000).prop_map(|(field, num)| format!("{field}={num}"));
    leaf.prop_recursive(depth, 16, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a} AND {b})")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a} OR {b})")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("{a} AND NOT {b}")),
        ]
    })
    .boxed()
}

proptest! {
    #[test]
    fn parentheses_stay_balanced(query in expression(3)) {
        let tokens = spl_tokenizer().tokenize(&query).unwrap();
        let mut depth = 0i64;
        for token in &tokens {
            if token.is_kind(TokenKind::LParen) {
                depth += 1;
            } else if token.is_kind(TokenKind::RParen) {
                depth -= 1;
            }
            prop_assert!(depth >= 0, "prefix with more closers than openers");
        }
        prop_assert_eq!(depth, 0);
    }

    #[test]
    fn operator_closure(query in expression(2)) {
        let allowed = [
            OperatorKind::Eq,
            OperatorKind::NotEq,
            OperatorKind::Gt,
            OperatorKind::Gte,
            OperatorKind::Lt,
            OperatorKind::Lte,
            OperatorKind::Contains,
            OperatorKind::StartsWith,
            OperatorKind::EndsWith,
            OperatorKind::In,
        ];
        for token in spl_tokenizer().tokenize(&query).unwrap() {
            if let Token::FieldValue(fv) = token {
                prop_assert!(allowed.contains(&fv.operator_kind()));
            }
        }
    }

    #[test]
    fn wildcard_normalization_laws(body in "[a-zA-Z0-9]{1,12}") {
        let contains = process_wildcards(
            Value::Str(format!("*{body}*")),
            OperatorKind::Eq,
            '*',
        );
        prop_assert_eq!(contains.1.operator(), Some(OperatorKind::Contains));
        prop_assert_eq!(contains.0, Value::Str(body.clone()));

        let ends = process_wildcards(Value::Str(format!("*{body}")), OperatorKind::Eq, '*');
        prop_assert_eq!(ends.1.operator(), Some(OperatorKind::EndsWith));

        let starts = process_wildcards(Value::Str(format!("{body}*")), OperatorKind::Eq, '*');
        prop_assert_eq!(starts.1.operator(), Some(OperatorKind::StartsWith));

        let plain = process_wildcards(Value::Str(body.clone()), OperatorKind::Eq, '*');
        prop_assert_eq!(plain.1.operator(), Some(OperatorKind::Eq));
        prop_assert_eq!(plain.0, Value::Str(body));
    }

    #[test]
    fn cti_chunking_law(
        values in proptest::collection::vec("[a-z]{1,8}\\.example\\.com", 0..60),
        chunk_size in 1usize..10,
    ) {
        let mut deduped = Vec::new();
        for value in values {
            if !deduped.contains(&value) {
                deduped.push(value);
            }
        }
        let parsed = ParsedIocs {
            domain: deduped.clone(),
            ..Default::default()
        };
        let mapping = CtiMapping::new(&[(generic_fields::DOMAIN, &["query"])]);
        let chunks = iocs_chunks(&parsed, &mapping, chunk_size);

        prop_assert!(chunks.iter().all(|chunk| chunk.len() <= chunk_size));
        let flattened: Vec<String> = chunks
            .iter()
            .flatten()
            .map(|slot| slot.value.clone())
            .collect();
        prop_assert_eq!(flattened, deduped);
    }
}
