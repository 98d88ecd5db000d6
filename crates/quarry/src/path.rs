// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiled paths and selection entry points

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, ParseError, Result};
use crate::eval::{Nodes, evaluate};
use crate::filter::PathFilter;
use crate::parser;
use crate::settings::Settings;

/// A parsed path, reusable across documents and threads.
///
/// ```
/// use quarry::{JsonPath, Settings};
/// use serde_json::json;
///
/// let path = JsonPath::parse("$.store.book[?(@.price < 10)].title").unwrap();
/// let doc = json!({"store": {"book": [
///     {"title": "Sayings", "price": 8.95},
///     {"title": "Sword", "price": 12.99}
/// ]}});
///
/// let titles: Vec<_> = path
///     .select(&doc, &Settings::default())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(titles, vec![&json!("Sayings")]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonPath {
    text: String,
    filters: Vec<PathFilter>,
}

impl JsonPath {
    /// Compile path text.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first malformed construct.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let filters = parser::parse(text)?;
        debug!(path = text, steps = filters.len(), "parsed path");
        Ok(Self {
            text: text.to_string(),
            filters,
        })
    }

    /// The text this path was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The compiled filter pipeline.
    #[must_use]
    pub fn filters(&self) -> &[PathFilter] {
        &self.filters
    }

    /// Lazily select nodes from `root`.
    ///
    /// Nodes are produced on demand in document order for each step. The
    /// iterator yields at most one `Err` and then ends.
    #[must_use]
    pub fn select<'p, 'a: 'p>(&'p self, root: &'a Value, settings: &Settings) -> Selection<'p, 'a> {
        self.select_from(root, root, settings)
    }

    /// Select starting at `current` inside the document rooted at `root`.
    #[must_use]
    pub fn select_from<'p, 'a: 'p>(
        &'p self,
        root: &'a Value,
        current: &'a Value,
        settings: &Settings,
    ) -> Selection<'p, 'a> {
        trace!(
            path = %self.text,
            error_when_no_match = settings.error_when_no_match,
            "selecting"
        );
        Selection {
            nodes: evaluate(&self.filters, root, current, *settings),
            done: false,
        }
    }

    /// Select at most one node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MultipleResults`] when a second node is produced, or
    /// the first error the pipeline raises.
    pub fn select_one<'a>(&self, root: &'a Value, settings: &Settings) -> Result<Option<&'a Value>> {
        let mut selection = self.select(root, settings);
        let Some(first) = selection.next().transpose()? else {
            return Ok(None);
        };
        if selection.next().transpose()?.is_some() {
            return Err(Error::MultipleResults);
        }
        Ok(Some(first))
    }

    /// Select every node eagerly.
    ///
    /// # Errors
    ///
    /// Returns the first error the pipeline raises; no partial result.
    pub fn select_all<'a>(&self, root: &'a Value, settings: &Settings) -> Result<Vec<&'a Value>> {
        self.select(root, settings).collect()
    }
}

impl FromStr for JsonPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for JsonPath {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Lazy selection result.
///
/// Yields `Ok` nodes in order; the first `Err` is the last item.
pub struct Selection<'p, 'a> {
    nodes: Nodes<'p, 'a>,
    done: bool,
}

impl<'a> Iterator for Selection<'_, 'a> {
    type Item = Result<&'a Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.nodes.next();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl FusedIterator for Selection<'_, '_> {}

impl fmt::Debug for Selection<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection").field("done", &self.done).finish_non_exhaustive()
    }
}

/// Select the single node `path` matches in `document`.
///
/// # Errors
///
/// Parse errors, [`Error::MultipleResults`], and any selection error.
pub fn select_one<'a>(document: &'a Value, path: &str, settings: &Settings) -> Result<Option<&'a Value>> {
    JsonPath::parse(path)?.select_one(document, settings)
}

/// Select every node `path` matches in `document`.
///
/// Collects eagerly; for a lazy sequence parse once with [`JsonPath::parse`]
/// and iterate [`JsonPath::select`].
///
/// # Errors
///
/// Parse errors and any selection error.
pub fn select_all<'a>(document: &'a Value, path: &str, settings: &Settings) -> Result<Vec<&'a Value>> {
    JsonPath::parse(path)?.select_all(document, settings)
}

/// Path selection as methods on [`Value`].
pub trait SelectExt {
    /// See [`select_one`].
    ///
    /// # Errors
    ///
    /// Parse errors, [`Error::MultipleResults`], and any selection error.
    fn select_one(&self, path: &str, settings: &Settings) -> Result<Option<&Value>>;

    /// See [`select_all`].
    ///
    /// # Errors
    ///
    /// Parse errors and any selection error.
    fn select_all(&self, path: &str, settings: &Settings) -> Result<Vec<&Value>>;
}

impl SelectExt for Value {
    fn select_one(&self, path: &str, settings: &Settings) -> Result<Option<&Value>> {
        select_one(self, path, settings)
    }

    fn select_all(&self, path: &str, settings: &Settings) -> Result<Vec<&Value>> {
        select_all(self, path, settings)
    }
}
