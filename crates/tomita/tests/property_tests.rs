//! Property tests for the arithmetic grammar: every well-formed input
//! parses to exactly one tree whose leaves reproduce the token stream.

use proptest::prelude::*;
use tomita::{Scanner, grammars};

fn arb_expr() -> impl Strategy<Value = String> {
    let leaf = (0u32..1000).prop_map(|n| n.to_string());
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")],
                inner.clone()
            )
                .prop_map(|(a, op, b)| format!("{a} {op} {b}")),
            inner.prop_map(|e| format!("( {e} )")),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arithmetic_inputs_parse_uniquely(input in arb_expr()) {
        let mut engine = grammars::math();
        let trees = engine.parse(&input).unwrap();
        // The layered E/T/F grammar is unambiguous.
        prop_assert_eq!(trees.len(), 1);
    }

    #[test]
    fn leaves_reproduce_the_token_stream(input in arb_expr()) {
        let expected: Vec<String> = Scanner::new()
            .tokenize(&input)
            .unwrap()
            .iter()
            .filter(|t| !t.is_end_marker())
            .map(|t| t.value.to_string())
            .collect();

        let mut engine = grammars::math();
        let trees = engine.parse(&input).unwrap();
        let leaves: Vec<String> = trees[0].leaves().iter().map(|l| (*l).to_string()).collect();
        prop_assert_eq!(leaves, expected);
    }

    #[test]
    fn render_round_trips_token_for_token(input in arb_expr()) {
        let mut engine = grammars::math();
        let trees = engine.parse(&input).unwrap();
        let rendered = trees[0].render();

        let original = Scanner::new().tokenize(&input).unwrap();
        let reparsed = Scanner::new().tokenize(&rendered).unwrap();
        let values = |tokens: &[tomita::Token]| -> Vec<String> {
            tokens
                .iter()
                .filter(|t| !t.is_end_marker())
                .map(|t| t.value.to_string())
                .collect()
        };
        prop_assert_eq!(values(&original), values(&reparsed));
    }
}
