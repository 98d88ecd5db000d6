// SPDX-License-Identifier: MIT OR Apache-2.0
//! Predicate expression model
//!
//! A `?( ... )` predicate parses into a [`QueryExpression`] tree. Leaves are
//! [`QueryExpression::Boolean`] comparisons between two [`Operand`]s; inner
//! nodes are `&&`/`||` composites. Evaluation lives in the `eval` module.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::filter::PathFilter;

/// Comparison operator of a boolean predicate term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryOperator {
    /// `==`, loose equality with numeric/string coercion
    Equals,
    /// `!=` or `<>`
    NotEquals,
    /// `===`, kind and value must match
    StrictEquals,
    /// `!==`
    StrictNotEquals,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEquals,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEquals,
    /// `=~`, left string matches a `/pattern/flags` right operand
    RegexEquals,
    /// Bare operand with no operator
    Exists,
}

impl QueryOperator {
    /// Operator token as written in a path. `Exists` has none.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::StrictEquals => "===",
            Self::StrictNotEquals => "!==",
            Self::LessThan => "<",
            Self::LessThanOrEquals => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEquals => ">=",
            Self::RegexEquals => "=~",
            Self::Exists => "",
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Operator joining the children of a composite expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogicalOperator {
    /// `&&`
    And,
    /// `||`
    Or,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operand {
    /// Sub-path evaluated against the current node, or against the root when
    /// it starts with [`PathFilter::Root`].
    Path(Vec<PathFilter>),
    /// Constant parsed from the path text.
    Literal(Value),
    /// `/pattern/flags` constant, compiled once when the path is parsed.
    Regex(RegexLiteral),
}

impl Operand {
    /// Constant node for literal operands, `None` for paths.
    #[must_use]
    pub const fn literal(&self) -> Option<&Value> {
        match self {
            Self::Path(_) => None,
            Self::Literal(value) => Some(value),
            Self::Regex(regex) => Some(regex.value()),
        }
    }
}

/// Predicate expression tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QueryExpression {
    /// `&&`/`||` over child expressions, evaluated left to right with
    /// short-circuiting.
    Composite {
        /// Joining operator
        op: LogicalOperator,
        /// Child expressions in source order
        expressions: Vec<QueryExpression>,
    },
    /// Comparison or existence test.
    Boolean {
        /// Comparison operator
        op: QueryOperator,
        /// Left operand
        left: Operand,
        /// Right operand, absent only for `Exists`
        right: Option<Operand>,
    },
}

impl QueryExpression {
    /// Operator at the top of this expression.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite { .. })
    }
}

/// A compiled `/pattern/flags` regex.
///
/// The literal is kept as the string node `/pattern/flags` so it can still be
/// compared with the other operators.
#[derive(Debug, Clone)]
pub struct RegexLiteral {
    text: Value,
    pattern: String,
    regex: Regex,
}

impl RegexLiteral {
    /// Split `/pattern/flags` on its last unescaped `/` and compile it.
    ///
    /// Flags: `i` case-insensitive, `m` multi-line, `s` dot matches newline,
    /// `x` ignore whitespace. Other flag letters are ignored.
    ///
    /// # Errors
    ///
    /// Returns a description when the text has no delimiters or the pattern
    /// does not compile.
    pub fn parse(text: &str) -> Result<Self, String> {
        let (pattern, flags) = split_delimited(text)
            .ok_or_else(|| "expected /pattern/flags".to_string())?;

        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                _ => continue,
            };
        }
        let regex = builder.build().map_err(|e| e.to_string())?;

        Ok(Self {
            text: Value::String(text.to_string()),
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The literal as a string node.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.text
    }

    /// Pattern between the delimiters.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The compiled regex.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for RegexLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Serialize for RegexLiteral {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.text.serialize(serializer)
    }
}

/// Returns `(pattern, flags)` for `/pattern/flags`.
fn split_delimited(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'/') {
        return None;
    }
    let close = memchr::memrchr_iter(b'/', &bytes[1..])
        .map(|i| i + 1)
        .find(|&i| !is_escaped(bytes, i))?;
    Some((&text[1..close], &text[close + 1..]))
}

/// Odd number of backslashes directly before `index`.
fn is_escaped(bytes: &[u8], index: usize) -> bool {
    bytes[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_literal_flags() {
        let regex = RegexLiteral::parse("/Foo.*d/i").unwrap();
        assert_eq!(regex.pattern(), "Foo.*d");
        assert!(regex.regex().is_match("FOOD"));
        assert_eq!(regex.value(), &Value::String("/Foo.*d/i".into()));

        let regex = RegexLiteral::parse("/foo.*d/").unwrap();
        assert!(!regex.regex().is_match("FOOD"));
        assert!(regex.regex().is_match("fooood and drink"));
    }

    #[test]
    fn test_regex_literal_last_delimiter() {
        let regex = RegexLiteral::parse("/// comment/").unwrap();
        assert_eq!(regex.pattern(), "// comment");
        assert!(regex.regex().is_match("// comment"));
        assert!(!regex.regex().is_match("/ comment"));

        let regex = RegexLiteral::parse("/<tag>.*</tag>/i").unwrap();
        assert!(regex.regex().is_match("<Tag>Test</Tag>"));
        assert!(!regex.regex().is_match("<tag>Test<tag>"));
    }

    #[test]
    fn test_regex_literal_escaped_delimiter() {
        let regex = RegexLiteral::parse(r"/a\/b/").unwrap();
        assert_eq!(regex.pattern(), r"a\/b");
        assert!(regex.regex().is_match("a/b"));

        // the trailing slash is escaped, so the pattern ends at the first one
        let regex = RegexLiteral::parse(r"/a/\/").unwrap();
        assert_eq!(regex.pattern(), "a");
    }

    #[test]
    fn test_regex_literal_rejects_bad_input() {
        assert!(RegexLiteral::parse("abc").is_err());
        assert!(RegexLiteral::parse("/").is_err());
        assert!(RegexLiteral::parse("/(unclosed/").is_err());
    }

    #[test]
    fn test_unknown_flags_ignored() {
        let regex = RegexLiteral::parse("/a+/gq").unwrap();
        assert!(regex.regex().is_match("caaat"));
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(QueryOperator::StrictNotEquals.to_string(), "!==");
        assert_eq!(QueryOperator::RegexEquals.symbol(), "=~");
        assert_eq!(QueryOperator::Exists.symbol(), "");
    }
}
