// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for parsing and selection invariants.
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use quarry::{JsonPath, Settings};

// ============================================================================
// Test Strategies
// ============================================================================

/// Small JSON documents with a narrow key alphabet so names repeat.
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-c]{1,2}", inner), 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Text drawn mostly from path punctuation.
fn path_like_strategy() -> impl Strategy<Value = String> {
    "[$@.\\[\\]?()'*:,0-9a-c =<>!&|/~-]{0,32}"
}

fn bound_strategy() -> impl Strategy<Value = Option<i64>> {
    prop::option::of(-25i64..25)
}

fn step_strategy() -> impl Strategy<Value = Option<i64>> {
    prop::option::of(prop_oneof![-5i64..0, 1i64..6])
}

// ============================================================================
// Reference Models
// ============================================================================

fn count_nodes(value: &Value) -> usize {
    1 + match value {
        Value::Array(items) => items.iter().map(count_nodes).sum(),
        Value::Object(map) => map.values().map(count_nodes).sum(),
        _ => 0,
    }
}

fn collect_named<'a>(value: &'a Value, name: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_named(item, name, out);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                if key == name {
                    out.push(child);
                }
                collect_named(child, name, out);
            }
        }
        _ => {}
    }
}

fn slice_model(len: usize, start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Vec<i64> {
    let len = i64::try_from(len).unwrap();
    let step = step.unwrap_or(1);
    let norm = |v: i64| if v < 0 { v + len } else { v };
    let mut out = Vec::new();
    if step > 0 {
        let mut i = start.map_or(0, |s| norm(s).clamp(0, len));
        let stop = end.map_or(len, |e| norm(e).clamp(0, len));
        while i < stop {
            out.push(i);
            i += step;
        }
    } else {
        let mut i = start.map_or(len - 1, |s| norm(s).clamp(-1, len - 1));
        let stop = end.map_or(-1, |e| norm(e).clamp(-1, len - 1));
        while i > stop {
            out.push(i);
            i += step;
        }
    }
    out
}

fn slice_text(start: Option<i64>, end: Option<i64>, step: Option<i64>) -> String {
    let part = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
    match step {
        Some(step) => format!("[{}:{}:{step}]", part(start), part(end)),
        None => format!("[{}:{}]", part(start), part(end)),
    }
}

// ============================================================================
// Parser Properties
// ============================================================================

proptest! {
    /// Arbitrary text either parses or reports an error inside the input
    #[test]
    fn prop_parse_never_panics(text in any::<String>()) {
        if let Err(err) = JsonPath::parse(&text) {
            prop_assert!(err.position() <= text.len());
        }
    }

    /// Path-shaped text that parses can be evaluated without panicking
    #[test]
    fn prop_parsed_paths_evaluate(text in path_like_strategy(), doc in json_strategy()) {
        if let Ok(path) = JsonPath::parse(&text) {
            for settings in [Settings::default(), Settings::strict()] {
                let _ = path.select(&doc, &settings).take(10_000).count();
            }
        }
    }

    /// Parsing is deterministic
    #[test]
    fn prop_parse_deterministic(text in path_like_strategy()) {
        let first = JsonPath::parse(&text).map(|p| p.filters().to_vec());
        let second = JsonPath::parse(&text).map(|p| p.filters().to_vec());
        prop_assert_eq!(first, second);
    }
}

// ============================================================================
// Selection Properties
// ============================================================================

proptest! {
    /// `$..*` visits every node exactly once
    #[test]
    fn prop_wildcard_scan_visits_every_node(doc in json_strategy()) {
        let path = JsonPath::parse("$..*").unwrap();
        let nodes = path.select_all(&doc, &Settings::default()).unwrap();
        prop_assert_eq!(nodes.len(), count_nodes(&doc));
        prop_assert!(std::ptr::eq(nodes[0], &doc));
    }

    /// `$..a` yields every `a` property in pre-order
    #[test]
    fn prop_named_scan_matches_model(doc in json_strategy()) {
        let path = JsonPath::parse("$..a").unwrap();
        let nodes = path.select_all(&doc, &Settings::default()).unwrap();
        let mut expected = Vec::new();
        collect_named(&doc, "a", &mut expected);
        prop_assert_eq!(nodes.len(), expected.len());
        for (got, want) in nodes.iter().zip(&expected) {
            prop_assert!(std::ptr::eq(*got, *want));
        }
    }

    /// Selection is repeatable and leaves the document untouched
    #[test]
    fn prop_selection_is_pure(doc in json_strategy(), text in path_like_strategy()) {
        if let Ok(path) = JsonPath::parse(&text) {
            let before = doc.clone();
            let settings = Settings::default();
            let first: Vec<_> = path.select(&doc, &settings).take(10_000).filter_map(Result::ok).collect();
            let second: Vec<_> = path.select(&doc, &settings).take(10_000).filter_map(Result::ok).collect();
            prop_assert_eq!(first, second);
            prop_assert_eq!(&doc, &before);
        }
    }

    /// Slices agree with Python-style slicing
    #[test]
    fn prop_slice_matches_model(
        len in 0usize..20,
        start in bound_strategy(),
        end in bound_strategy(),
        step in step_strategy(),
    ) {
        let doc = Value::Array((0..len).map(|i| json!(i)).collect());
        let path = JsonPath::parse(&slice_text(start, end, step)).unwrap();
        let got: Vec<i64> = path
            .select_all(&doc, &Settings::default())
            .unwrap()
            .into_iter()
            .filter_map(Value::as_i64)
            .collect();
        prop_assert_eq!(got, slice_model(len, start, end, step));
    }

    /// A strict slice fails exactly when the lenient one is empty
    #[test]
    fn prop_strict_slice_errors_when_empty(
        len in 0usize..10,
        start in bound_strategy(),
        end in bound_strategy(),
    ) {
        let doc = Value::Array((0..len).map(|i| json!(i)).collect());
        let path = JsonPath::parse(&slice_text(start, end, None)).unwrap();
        let lenient = path.select_all(&doc, &Settings::default()).unwrap();
        let strict = path.select_all(&doc, &Settings::strict());
        prop_assert_eq!(lenient.is_empty(), strict.is_err());
    }

    /// `.*` on an object yields its values in declaration order
    #[test]
    fn prop_wildcard_matches_values(doc in json_strategy()) {
        if let Value::Object(map) = &doc {
            let path = JsonPath::parse("$.*").unwrap();
            let nodes = path.select_all(&doc, &Settings::default()).unwrap();
            let expected: Vec<&Value> = map.values().collect();
            prop_assert_eq!(nodes, expected);
        }
    }
}
