//! Property-based tests for the expression tokenizer

use proptest::prelude::*;
use std::collections::HashSet;

use lsys::{tokenize, TokenKind};

fn known() -> HashSet<String> {
    ["x", "y", "+", "-", "*", "sqrt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Expression-like text, including characters no identifier uses
fn expression_text() -> impl Strategy<Value = String> {
    "[a-z0-9_.+*/() ,<>=!-]{0,40}"
}

fn kinds_and_texts(input: &str) -> Vec<(TokenKind, String)> {
    tokenize(input, &known())
        .expect("every character is scannable")
        .into_iter()
        .map(|t| (t.kind, t.text))
        .collect()
}

proptest! {
    #[test]
    fn test_retokenizing_joined_tokens_is_stable(input in expression_text()) {
        let first = kinds_and_texts(&input);
        let joined = first
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let second = kinds_and_texts(&joined);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_spans_cover_token_text(input in expression_text()) {
        let tokens = tokenize(&input, &known()).expect("every character is scannable");
        for token in tokens {
            prop_assert!(!token.text.is_empty());
            prop_assert_eq!(&input[token.span.clone()], token.text.as_str());
        }
    }

    #[test]
    fn test_control_tokens_are_single_characters(input in expression_text()) {
        let tokens = tokenize(&input, &known()).expect("every character is scannable");
        for token in tokens.iter().filter(|t| t.kind == TokenKind::Control) {
            prop_assert!(matches!(token.text.as_str(), "(" | ")" | ","));
        }
    }

    #[test]
    fn test_whitespace_is_never_part_of_a_token(input in expression_text()) {
        let tokens = tokenize(&input, &known()).expect("every character is scannable");
        prop_assert!(tokens.iter().all(|t| !t.text.contains(' ')));
    }
}
