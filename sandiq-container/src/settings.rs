//! Container settings.
//!
//! Plain data, deserializable with serde so an application can keep them
//! next to the rest of its configuration. Missing fields fall back to the
//! defaults.

use serde::{Deserialize, Serialize};

/// Tunables of a [`Container`](crate::container::Container).
///
/// # Examples
/// ```
/// use sandiq_container::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.max_depth, 256);
/// assert_eq!(settings.max_suggestions, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Longest resolution path before giving up with `DepthExceeded`.
    ///
    /// Cycles are caught separately; this only bounds recursion on very
    /// deep acyclic graphs.
    pub max_depth: usize,
    /// How many "did you mean" suggestions a `NotFound` error carries.
    pub max_suggestions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_suggestions: 3,
        }
    }
}
