//! Property tests for the text grammar.
//!
//! Literals, terms and category lists are generated at random and pushed
//! through the grammar and the category parser.

use occi_core::attribute::quote;
use occi_core::{AttributeValue, Category, Model};
use occi_parser::grammar::{grammar, literal, Literal};
use occi_parser::{ParserOptions, TextParser};
use proptest::prelude::*;

fn attribute_literal(value: &str) -> Literal {
    let line = format!("X-OCCI-Attribute: example.value={value}");
    let g = grammar(false).unwrap();
    let captures = g.attribute.captures(&line).unwrap();
    literal(&captures, &line).unwrap()
}

// ============================================================================
// Literals
// ============================================================================

proptest! {
    /// Integers without a decimal point parse as integers.
    #[test]
    fn prop_integers_parse_exactly(n: i64) {
        prop_assert_eq!(attribute_literal(&n.to_string()), Literal::Integer(n));
    }

    /// Rendered floats always parse back as the same float.
    #[test]
    fn prop_floats_parse_exactly(x in -1.0e9f64..1.0e9) {
        let rendered = AttributeValue::Float(x).to_string();
        prop_assert_eq!(attribute_literal(&rendered), Literal::Float(x));
    }

    /// Quoting then parsing yields the original string, line breaks included.
    #[test]
    fn prop_quoted_strings_round_trip(s in "(?s).{0,40}") {
        prop_assert_eq!(attribute_literal(&quote(&s)), Literal::String(s));
    }
}

// ============================================================================
// Terms
// ============================================================================

proptest! {
    /// Terms starting with a letter are accepted in both modes.
    #[test]
    fn prop_letter_terms_always_match(term in "[a-z][a-z0-9_-]{0,12}") {
        prop_assert!(grammar(true).unwrap().term.is_match(&term));
        prop_assert!(grammar(false).unwrap().term.is_match(&term));
    }

    /// Terms starting with a digit are lenient-only.
    #[test]
    fn prop_digit_terms_are_lenient_only(term in "[0-9][a-z0-9_-]{0,12}") {
        prop_assert!(!grammar(true).unwrap().term.is_match(&term));
        prop_assert!(grammar(false).unwrap().term.is_match(&term));
    }
}

// ============================================================================
// Category lists
// ============================================================================

proptest! {
    /// Parsed categories come back in input order.
    #[test]
    fn prop_categories_keep_input_order(
        terms in prop::collection::hash_set("[a-z][a-z0-9]{0,8}", 1..12)
    ) {
        let terms: Vec<String> = terms.into_iter().collect();
        let body = terms
            .iter()
            .map(|t| format!("Category: {t};scheme=\"http://example.org/occi#\";class=\"mixin\""))
            .collect::<Vec<_>>()
            .join("\n");
        let model = Model::bootstrap().unwrap();
        let options = ParserOptions::strict();
        let parsed = TextParser::new(&model, &options).unwrap().categories(&body).unwrap();
        let ids: Vec<String> = parsed.iter().map(Category::identifier).collect();
        let expected: Vec<String> = terms
            .iter()
            .map(|t| format!("http://example.org/occi#{t}"))
            .collect();
        prop_assert_eq!(ids, expected);
    }
}
