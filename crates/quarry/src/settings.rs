// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection settings

use std::time::Duration;

/// Options applied to a selection call.
///
/// Settings are read-only during evaluation and passed by reference to every
/// step, including predicate sub-paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Raise an error instead of yielding nothing when a property, index or
    /// slice finds no match.
    pub error_when_no_match: bool,
    /// Upper bound on a single regex predicate match. `None` is unbounded.
    pub regex_match_timeout: Option<Duration>,
}

impl Settings {
    /// Default settings: lenient matching, no regex timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            error_when_no_match: false,
            regex_match_timeout: None,
        }
    }

    /// Set whether missing matches are errors.
    #[must_use]
    pub const fn with_error_when_no_match(mut self, error_when_no_match: bool) -> Self {
        self.error_when_no_match = error_when_no_match;
        self
    }

    /// Bound regex predicate matching.
    ///
    /// The limit is checked once a match returns, not enforced while it runs:
    /// a match that took longer fails with
    /// [`Error::RegexTimeout`](crate::Error::RegexTimeout) instead of
    /// yielding a result. Matching itself is linear in the input length.
    #[must_use]
    pub const fn with_regex_match_timeout(mut self, timeout: Duration) -> Self {
        self.regex_match_timeout = Some(timeout);
        self
    }

    /// Shorthand for `Settings::new().with_error_when_no_match(true)`.
    #[must_use]
    pub const fn strict() -> Self {
        Self::new().with_error_when_no_match(true)
    }
}
