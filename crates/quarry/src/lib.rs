// SPDX-License-Identifier: MIT OR Apache-2.0
//! # quarry
//!
//! JSONPath-style queries over [`serde_json::Value`] documents.
//!
//! A path is parsed once into a [`JsonPath`] (an ordered list of
//! [`PathFilter`] steps) and can then be evaluated against any number of
//! documents. Evaluation is lazy: [`JsonPath::select`] returns an iterator
//! that walks only as much of the document as the caller consumes.
//!
//! - [`parser`] - path text to filter pipeline
//! - [`filter`] - the step model
//! - [`expression`] - `?( ... )` predicate model
//! - [`settings`] - selection options
//! - [`error`] - parse and selection errors
//!
//! ## Syntax
//!
//! | Form | Selects |
//! |------|---------|
//! | `$`, empty | the root |
//! | `.name`, `['name']` | a property |
//! | `['a','b']` | several properties |
//! | `.*`, `[*]` | every property value / element |
//! | `[0]`, `[1,3]` | elements by position |
//! | `[start:end:step]` | a slice |
//! | `..name`, `..*` | recursive descent |
//! | `[?(@.price < 10)]` | children matching a predicate |
//!
//! ## Example
//!
//! ```
//! use quarry::{SelectExt, Settings};
//! use serde_json::json;
//!
//! let doc = json!({"a": [{"id": 1}, {"id": 2}]});
//! let ids = doc.select_all("$.a[*].id", &Settings::default()).unwrap();
//! assert_eq!(ids, vec![&json!(1), &json!(2)]);
//! ```

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]

/// Parse and selection errors
pub mod error;
/// Predicate expression model
pub mod expression;
/// Path step model
pub mod filter;
/// Node kind classification
pub mod node;
/// Path text parser
pub mod parser;
/// Selection settings
pub mod settings;

mod eval;
mod path;

// Re-exports for convenience
pub use error::{Error, ParseContext, ParseError, Result};
pub use expression::{LogicalOperator, Operand, QueryExpression, QueryOperator, RegexLiteral};
pub use filter::{NameSet, PathFilter};
pub use node::NodeKind;
pub use path::{JsonPath, SelectExt, Selection, select_all, select_one};
pub use settings::Settings;
