//! Property-based tests using QuickCheck

use quickcheck::{QuickCheck, TestResult};
use solrq_query::escape::escape_criteria_value;
use solrq_query::{Argument, Value};

mod test_support;
use test_support::{compiler, ctx, foo};

fn word_arguments(words: &[String]) -> Option<Vec<Argument>> {
    Some(
        words
            .iter()
            .map(|w| Argument::Value(Value::text(w.clone())))
            .collect(),
    )
}

/// Property: N non-null arguments render as exactly N comma-joined segments
#[test]
fn prop_argument_count_matches_segments() {
    fn prop(words: Vec<String>) -> TestResult {
        // Segments are only countable when arguments contain no separators.
        if words
            .iter()
            .any(|w| w.is_empty() || w.contains(',') || w.contains('(') || w.contains(')'))
        {
            return TestResult::discard();
        }

        let fragment = compiler()
            .create_function_fragment(&foo(word_arguments(&words)), 0, &ctx())
            .unwrap();
        let inner = fragment
            .strip_prefix("{!func}foo(")
            .and_then(|rest| rest.strip_suffix(')'));
        let Some(inner) = inner else {
            return TestResult::failed();
        };

        if words.is_empty() {
            return TestResult::from_bool(inner.is_empty());
        }
        let segments: Vec<&str> = inner.split(',').collect();
        TestResult::from_bool(segments.len() == words.len() && segments == words)
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<String>) -> TestResult);
}

/// Property: a null argument fails rendering regardless of its position
#[test]
fn prop_null_argument_fails_at_any_position() {
    fn prop(values: Vec<i64>, position: usize) -> bool {
        let mut arguments: Vec<Argument> = values.into_iter().map(Argument::from).collect();
        let index = position % (arguments.len() + 1);
        arguments.insert(index, Argument::Value(Value::Null));

        compiler()
            .create_function_fragment(&foo(Some(arguments)), 0, &ctx())
            .is_err()
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<i64>, usize) -> bool);
}

/// Property: only the outermost function carries the `{!func}` prefix
#[test]
fn prop_single_prefix_for_any_nesting() {
    fn prop(depth: u8) -> bool {
        let mut function = foo(Some(vec!["leaf".into()]));
        for _ in 0..(depth % 16) {
            function = foo(Some(vec![function.into()]));
        }
        let fragment = compiler()
            .create_function_fragment(&function, 0, &ctx())
            .unwrap();
        fragment.matches("{!func}").count() == 1 && fragment.starts_with("{!func}")
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(u8) -> bool);
}

/// Property: escaped values never expose an unescaped reserved character
#[test]
fn prop_escaped_value_has_no_bare_syntax() {
    fn prop(s: String) -> TestResult {
        if s.contains(' ') {
            return TestResult::discard();
        }
        let escaped = escape_criteria_value(&s);
        let mut chars = escaped.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                // escaped character, skip it
                if chars.next().is_none() {
                    return TestResult::failed();
                }
                continue;
            }
            if ":+-!()^[]\"{}~?|&;/".contains(c) || c.is_whitespace() {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(String) -> TestResult);
}
