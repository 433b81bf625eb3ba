//! Options for parsing files and for building a [`crate::FilePair`].

/// Key prefix marking a key whose destination value is never localized.
pub const DEFAULT_NO_LOCALIZE_PREFIX: &str = "_nolocaliz";

/// Parse behavior options for [`crate::formats::properties::Format`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Fail on malformed `\uXXXX` escapes instead of keeping them literally.
    pub strict_escapes: bool,
}

impl ReadOptions {
    /// Creates default (lenient) read options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables/disables strict escape checking.
    pub fn with_strict_escapes(mut self, strict_escapes: bool) -> Self {
        self.strict_escapes = strict_escapes;
        self
    }
}

/// Options for a source/destination file pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairOptions {
    /// Keys starting with this prefix are read-only in the destination.
    pub no_localize_prefix: String,
    /// Options used when parsing either file.
    pub read: ReadOptions,
}

impl Default for PairOptions {
    fn default() -> Self {
        PairOptions {
            no_localize_prefix: DEFAULT_NO_LOCALIZE_PREFIX.to_string(),
            read: ReadOptions::default(),
        }
    }
}

impl PairOptions {
    /// Creates default pair options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the no-localize key prefix. An empty prefix disables the check.
    pub fn with_no_localize_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.no_localize_prefix = prefix.into();
        self
    }

    /// Sets the options used to parse both files.
    pub fn with_read_options(mut self, read: ReadOptions) -> Self {
        self.read = read;
        self
    }

    /// Returns true if `key` is marked as not-to-be-localized.
    pub fn is_no_localize(&self, key: &str) -> bool {
        !self.no_localize_prefix.is_empty() && key.starts_with(&self.no_localize_prefix)
    }
}
