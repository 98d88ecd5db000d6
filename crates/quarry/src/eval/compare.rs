// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node comparison for predicate operators

use std::cmp::Ordering;
use std::time::Instant;

use regex::Regex;
use serde_json::{Number, Value};
use tracing::warn;

use crate::error::{Error, Result};
use crate::expression::{QueryOperator, RegexLiteral};
use crate::node::{NodeKind, parse_json_number};
use crate::settings::Settings;

/// Apply `op` to two resolved operand nodes.
///
/// Containers only satisfy `Exists` and `!=`. `regex` is the precompiled
/// right operand when it was written as a `/pattern/flags` literal.
pub(crate) fn match_tokens(
    op: QueryOperator,
    left: &Value,
    right: &Value,
    regex: Option<&RegexLiteral>,
    settings: &Settings,
) -> Result<bool> {
    if NodeKind::of(left).is_container() || NodeKind::of(right).is_container() {
        return Ok(matches!(op, QueryOperator::Exists | QueryOperator::NotEquals));
    }

    Ok(match op {
        QueryOperator::RegexEquals => return regex_equals(left, right, regex, settings),
        QueryOperator::Equals => loose_equals(left, right),
        QueryOperator::NotEquals => !loose_equals(left, right),
        QueryOperator::StrictEquals => strict_equals(left, right),
        QueryOperator::StrictNotEquals => !strict_equals(left, right),
        QueryOperator::GreaterThan => compare(left, right) == Ordering::Greater,
        QueryOperator::GreaterThanOrEquals => compare(left, right) != Ordering::Less,
        QueryOperator::LessThan => compare(left, right) == Ordering::Less,
        QueryOperator::LessThanOrEquals => compare(left, right) != Ordering::Greater,
        QueryOperator::Exists => true,
    })
}

/// `==`: numbers by value, strings coerced to numbers or booleans when the
/// other side is one.
fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Ordering::Equal,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            parse_json_number(s).is_some_and(|m| compare_numbers(n, &m) == Ordering::Equal)
        }
        (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
            s == if *b { "true" } else { "false" }
        }
        _ => false,
    }
}

/// `===`: same kind and same value.
fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Ordering::Equal,
        _ if NodeKind::of(left) != NodeKind::of(right) => false,
        _ => left == right,
    }
}

/// Ordering for `<`, `<=`, `>`, `>=`.
fn compare(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::Bool(_), Value::Bool(_)) | (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Number(n), Value::String(s)) => parse_json_number(s)
            .map_or_else(|| compare_text(left, right), |m| compare_numbers(n, &m)),
        (Value::String(s), Value::Number(n)) => parse_json_number(s)
            .map_or_else(|| compare_text(left, right), |m| compare_numbers(&m, n)),
        _ => compare_text(left, right),
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }
    let a = a.as_f64().unwrap_or(f64::NAN);
    let b = b.as_f64().unwrap_or(f64::NAN);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Mismatched kinds compare by compact JSON text.
fn compare_text(left: &Value, right: &Value) -> Ordering {
    left.to_string().cmp(&right.to_string())
}

fn regex_equals(
    left: &Value,
    right: &Value,
    literal: Option<&RegexLiteral>,
    settings: &Settings,
) -> Result<bool> {
    let (Value::String(input), Value::String(text)) = (left, right) else {
        return Ok(false);
    };

    let compiled;
    let regex = match literal {
        Some(literal) => literal,
        None => {
            compiled = RegexLiteral::parse(text).map_err(|reason| Error::InvalidRegex {
                text: text.clone(),
                reason,
            })?;
            &compiled
        }
    };

    timed_match(regex.regex(), regex.pattern(), input, settings)
}

/// Run one match, failing when it took longer than the configured limit.
fn timed_match(regex: &Regex, pattern: &str, input: &str, settings: &Settings) -> Result<bool> {
    let Some(limit) = settings.regex_match_timeout else {
        return Ok(regex.is_match(input));
    };

    let started = Instant::now();
    let matched = regex.is_match(input);
    let elapsed = started.elapsed();
    if elapsed > limit {
        warn!(
            pattern,
            input_len = input.len(),
            ?elapsed,
            ?limit,
            "regex match exceeded timeout"
        );
        return Err(Error::RegexTimeout {
            pattern: pattern.to_string(),
            timeout: limit,
        });
    }
    Ok(matched)
}
