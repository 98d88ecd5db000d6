// SPDX-License-Identifier: MIT OR Apache-2.0
//! # quarry-cli
//!
//! Command-line interface for quarry.
//!
//! ## Installation
//!
//! ```bash
//! cargo install quarry-cli
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Select every book title
//! quarry select '$.store.book[*].title' data.json
//!
//! # Read from stdin, fail on missing properties
//! cat data.json | quarry select -e '$.store.bicycle.color'
//!
//! # Exactly one result, compact
//! quarry select --one -c '$.expensive' data.json
//!
//! # Bound regex predicates
//! quarry select --regex-timeout-ms 50 '$..[?(@.name =~ /^A/i)]' data.json
//!
//! # Show the parsed pipeline
//! quarry explain '$..book[?(@.price < 10)]'
//!
//! # Validate path syntax
//! quarry check "$.a['b"
//! ```
//!
//! ## Subcommands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `select` | Print each matching node as JSON |
//! | `explain` | Print the filter pipeline as JSON |
//! | `check` | Report whether a path parses, pointing at the error |
//!
//! Logging goes to stderr. `RUST_LOG` overrides `-v`.
//!
//! For programmatic access use the [`quarry`](https://docs.rs/quarry) crate
//! directly.

#![doc(html_root_url = "https://docs.rs/quarry-cli/0.1.0")]
#![warn(missing_docs)]

/// Re-export of the query engine.
pub use quarry as engine;
