// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for path parsing and selection.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::node::NodeKind;

/// Result alias for selection operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What the parser was reading when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseContext {
    /// A dotted path segment.
    Path,
    /// The inside of a `[...]` indexer.
    Indexer,
    /// A `?(...)` predicate body.
    Query,
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => f.write_str("path"),
            Self::Indexer => f.write_str("path indexer"),
            Self::Query => f.write_str("path query"),
        }
    }
}

/// Malformed path text.
///
/// Parsing stops at the first error; no partial pipeline is produced.
/// Every variant carries the byte offset at which scanning stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character that cannot appear at this point.
    #[error("Unexpected character while parsing {context}: {character}")]
    UnexpectedCharacter {
        /// Where the character was found
        context: ParseContext,
        /// The offending character
        character: char,
        /// Byte offset of the character
        position: usize,
    },

    /// Anything other than `.`, `[` or whitespace directly after `]`.
    #[error("Unexpected character following indexer: {character}")]
    UnexpectedCharacterAfterIndexer {
        /// The offending character
        character: char,
        /// Byte offset of the character
        position: usize,
    },

    /// A trailing dot with no name after it.
    #[error("Unexpected end while parsing path.")]
    UnexpectedEnd {
        /// Byte offset where input ran out
        position: usize,
    },

    /// Input ended inside `[...]`.
    #[error("Path ended with open indexer.")]
    OpenIndexer {
        /// Byte offset where input ran out
        position: usize,
    },

    /// Input ended inside `?(...)`.
    #[error("Path ended with open query.")]
    OpenQuery {
        /// Byte offset where input ran out
        position: usize,
    },

    /// Input ended inside a quoted string.
    #[error("Path ended with an open string.")]
    OpenString {
        /// Byte offset where input ran out
        position: usize,
    },

    /// Input ended inside a `/regex/` literal.
    #[error("Path ended with an open regex.")]
    OpenRegex {
        /// Byte offset where input ran out
        position: usize,
    },

    /// An empty indexer such as `[]` or `[1,]`.
    #[error("Array index expected.")]
    IndexExpected {
        /// Byte offset of the closing character
        position: usize,
    },

    /// Indexer text that is not an integer.
    #[error("Invalid array index: {text}")]
    InvalidIndex {
        /// The text that failed to parse
        text: String,
        /// Byte offset of the text
        position: usize,
    },

    /// Backslash escape not recognised inside a quoted string.
    #[error("Unknown escape character: \\{character}")]
    UnknownEscape {
        /// The character after the backslash
        character: char,
        /// Byte offset of the character
        position: usize,
    },

    /// A comparison operator could not be read.
    #[error("Could not read query operator.")]
    UnknownOperator {
        /// Byte offset where an operator was expected
        position: usize,
    },

    /// Number literal inside a predicate that does not parse.
    #[error("Invalid number literal: {text}")]
    InvalidNumber {
        /// The literal text
        text: String,
        /// Byte offset of the literal
        position: usize,
    },

    /// Regex literal whose pattern does not compile.
    #[error("Invalid regex literal {text}: {reason}")]
    InvalidRegex {
        /// The literal text including slashes and flags
        text: String,
        /// Compiler diagnostic
        reason: String,
        /// Byte offset of the literal
        position: usize,
    },
}

impl ParseError {
    /// Byte offset in the path text where parsing stopped.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { position, .. }
            | Self::UnexpectedCharacterAfterIndexer { position, .. }
            | Self::UnexpectedEnd { position }
            | Self::OpenIndexer { position }
            | Self::OpenQuery { position }
            | Self::OpenString { position }
            | Self::OpenRegex { position }
            | Self::IndexExpected { position }
            | Self::InvalidIndex { position, .. }
            | Self::UnknownEscape { position, .. }
            | Self::UnknownOperator { position }
            | Self::InvalidNumber { position, .. }
            | Self::InvalidRegex { position, .. } => *position,
        }
    }

    /// Which part of the grammar was being parsed.
    #[must_use]
    pub const fn context(&self) -> ParseContext {
        match self {
            Self::UnexpectedCharacter { context, .. } => *context,
            Self::UnexpectedCharacterAfterIndexer { .. } | Self::UnexpectedEnd { .. } => {
                ParseContext::Path
            }
            Self::OpenIndexer { .. }
            | Self::IndexExpected { .. }
            | Self::InvalidIndex { .. }
            | Self::OpenString { .. }
            | Self::UnknownEscape { .. } => ParseContext::Indexer,
            Self::OpenQuery { .. }
            | Self::OpenRegex { .. }
            | Self::UnknownOperator { .. }
            | Self::InvalidNumber { .. }
            | Self::InvalidRegex { .. } => ParseContext::Query,
        }
    }
}

/// Errors raised while selecting nodes.
///
/// Every variant aborts the whole call. The "no match" variants are only
/// produced when [`Settings::error_when_no_match`](crate::Settings) is set;
/// `StepZero` and `RegexTimeout` are raised regardless.
#[derive(Debug, Error)]
pub enum Error {
    /// The path text did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// `select_one` matched more than one node.
    #[error("Path returned multiple tokens.")]
    MultipleResults,

    /// Named property missing from an object.
    #[error("Property '{name}' does not exist on object.")]
    PropertyNotFound {
        /// The requested property name
        name: String,
    },

    /// Property access on something that is not an object.
    #[error("Property '{}' not valid on {kind}.", or_star(.name.as_deref()))]
    PropertyNotValid {
        /// The requested name, `None` for the wildcard
        name: Option<String>,
        /// Kind of the node that was accessed
        kind: NodeKind,
    },

    /// Multi-name access on something that is not an object.
    #[error("Properties {} not valid on {kind}.", quoted_list(.names))]
    PropertiesNotValid {
        /// The requested names
        names: Vec<String>,
        /// Kind of the node that was accessed
        kind: NodeKind,
    },

    /// Array index past the end (or negative).
    #[error("Index {index} outside the bounds of array.")]
    IndexOutOfBounds {
        /// The requested index
        index: i64,
    },

    /// Index access on something that is not an array.
    #[error("Index {} not valid on {kind}.", index_or_star(.index.as_ref()))]
    IndexNotValid {
        /// The requested index, `None` for the wildcard
        index: Option<i64>,
        /// Kind of the node that was accessed
        kind: NodeKind,
    },

    /// Slice applied to something that is not an array.
    #[error("Array slice is not valid on {kind}.")]
    SliceNotValid {
        /// Kind of the node that was accessed
        kind: NodeKind,
    },

    /// Slice that selected nothing.
    #[error(
        "Array slice of {} to {} returned no results.",
        index_or_star(.start.as_ref()),
        index_or_star(.end.as_ref())
    )]
    NoResultsInSlice {
        /// Start as written in the path
        start: Option<i64>,
        /// End as written in the path
        end: Option<i64>,
    },

    /// Slice step of zero.
    #[error("Step cannot be zero.")]
    StepZero,

    /// A regex predicate ran past the configured timeout.
    #[error("Regex match timed out after {}ms: /{pattern}/", .timeout.as_millis())]
    RegexTimeout {
        /// The regex pattern, without delimiters or flags
        pattern: String,
        /// The configured limit
        timeout: Duration,
    },

    /// A regex read from the document did not compile.
    #[error("Invalid regex {text}: {reason}")]
    InvalidRegex {
        /// The regex text as found in the document
        text: String,
        /// Compiler diagnostic
        reason: String,
    },
}

fn or_star(value: Option<&str>) -> String {
    value.unwrap_or("*").to_string()
}

fn index_or_star(value: Option<&i64>) -> String {
    value.map_or_else(|| "*".to_string(), ToString::to_string)
}

fn quoted_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
