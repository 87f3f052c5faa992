//! Cell-name grammar and the caller-supplied naming policy
//!
//! Two grammars are in play:
//! - a *variable* is a letter or underscore followed by letters, digits, or
//!   underscores (`x`, `_tmp`, `a1b2`);
//! - a *cell name* is one or more ASCII letters followed by one or more
//!   digits (`A15`, `a15`, `XY032`).
//!
//! Every name is passed through [`NamePolicy::normalize`] before it is
//! stored, looked up, or compared.

use crate::error::{Error, Result};
use lazy_regex::regex_is_match;
use std::fmt;
use std::sync::Arc;

/// Check whether `s` is a formula variable.
///
/// # Examples
/// ```
/// use cellsheet_core::is_variable;
///
/// assert!(is_variable("x"));
/// assert!(is_variable("_a1"));
/// assert!(!is_variable("1a"));
/// assert!(!is_variable("a b"));
/// ```
pub fn is_variable(s: &str) -> bool {
    regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_]*$", s)
}

/// Check whether `s` is a cell name (letters then digits).
///
/// # Examples
/// ```
/// use cellsheet_core::is_cell_name;
///
/// assert!(is_cell_name("A15"));
/// assert!(is_cell_name("xy032"));
/// assert!(!is_cell_name("Z"));
/// assert!(!is_cell_name("hello"));
/// assert!(!is_cell_name("A1B"));
/// ```
pub fn is_cell_name(s: &str) -> bool {
    regex_is_match!(r"^[A-Za-z]+[0-9]+$", s)
}

type Normalizer = dyn Fn(&str) -> String + Send + Sync;
type Validator = dyn Fn(&str) -> bool + Send + Sync;

/// Normalizer + validator pair supplied by the caller.
///
/// `normalize` canonicalizes a raw name; `is_valid` adds restrictions on the
/// *normalized* form beyond the built-in grammar. Both must be pure: a policy
/// is cloned into every formula built under it.
#[derive(Clone)]
pub struct NamePolicy {
    normalize: Arc<Normalizer>,
    is_valid: Arc<Validator>,
}

impl NamePolicy {
    /// Create a policy from a normalizer and a validator
    pub fn new<N, V>(normalize: N, is_valid: V) -> Self
    where
        N: Fn(&str) -> String + Send + Sync + 'static,
        V: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            normalize: Arc::new(normalize),
            is_valid: Arc::new(is_valid),
        }
    }

    /// Identity normalizer, accept-everything validator
    pub fn identity() -> Self {
        Self::new(|s| s.to_string(), |_| true)
    }

    /// Upper-case normalizer, accept-everything validator
    pub fn uppercase() -> Self {
        Self::new(|s| s.to_ascii_uppercase(), |_| true)
    }

    /// Canonicalize a raw name
    pub fn normalize(&self, name: &str) -> String {
        (self.normalize)(name)
    }

    /// Apply the caller's acceptance predicate to a normalized name
    pub fn is_valid(&self, normalized: &str) -> bool {
        (self.is_valid)(normalized)
    }

    /// Normalize and validate a cell name.
    ///
    /// Both the raw and normalized forms must match the cell-name grammar,
    /// and the normalized form must satisfy the validator. Returns the
    /// normalized name.
    pub fn cell_name(&self, raw: &str) -> Result<String> {
        if !is_cell_name(raw) {
            return Err(Error::invalid_name(raw));
        }
        let normalized = self.normalize(raw);
        if !is_cell_name(&normalized) || !self.is_valid(&normalized) {
            return Err(Error::invalid_name(raw));
        }
        Ok(normalized)
    }
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for NamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamePolicy").finish_non_exhaustive()
    }
}
