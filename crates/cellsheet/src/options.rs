//! Spreadsheet configuration

use cellsheet_core::NamePolicy;

/// Version tag used when none is given
pub const DEFAULT_VERSION: &str = "default";

/// Options for creating a [`Spreadsheet`](crate::Spreadsheet)
#[derive(Debug, Clone)]
pub struct SpreadsheetOptions {
    /// Normalizer and validator applied to every cell name and formula variable
    pub policy: NamePolicy,
    /// Version tag carried alongside the cells (recorded by persistence layers)
    pub version: String,
}

impl Default for SpreadsheetOptions {
    fn default() -> Self {
        Self {
            policy: NamePolicy::identity(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl SpreadsheetOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given naming policy
    pub fn with_policy(mut self, policy: NamePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use the given version tag
    pub fn with_version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = version.into();
        self
    }
}
