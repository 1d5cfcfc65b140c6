//! Error types for rule loading and registry lookups.

use thiserror::Error;

/// Errors that can occur while loading rule sources or querying the registry.
///
/// All variants are fatal: warnings (a rule line with the wrong field count,
/// a malformed include target) are logged and skipped by the parser rather
/// than surfaced here. Load-time failures wrap the originating source
/// location and 1-based line number so a broken rule file can be fixed
/// without guesswork.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule source could not be resolved by the [`RuleResources`] provider.
    ///
    /// [`RuleResources`]: crate::parser::RuleResources
    #[error("unable to load resource: {0}")]
    Resource(String),

    /// A context expression was rejected by the fallback regex compiler.
    #[error("invalid context expression {expr:?}")]
    Context {
        /// The offending context expression, as written in the rule source.
        expr: String,
        /// The underlying regex compile error.
        #[source]
        source: Box<regex::Error>,
    },

    /// A phoneme expression contains `[` but does not end in `]`.
    #[error("phoneme expression contains a '[' but does not end in ']': {0:?}")]
    UnclosedLanguageList(String),

    /// A phoneme expression starts with `(` but does not end in `)`.
    #[error("phoneme expression starts with '(' so must end with ')': {0:?}")]
    UnclosedAlternation(String),

    /// A rule line failed to parse; wraps the cause with its position.
    #[error("problem parsing {location} line {line}")]
    Line {
        /// Source location of the offending line.
        location: String,
        /// 1-based line number within that source.
        line: usize,
        /// The underlying failure.
        #[source]
        source: Box<RuleError>,
    },

    /// A resource failed to load or parse during registry construction.
    #[error("problem processing {resource}")]
    Build {
        /// Name of the resource being processed.
        resource: String,
        /// The underlying failure.
        #[source]
        source: Box<RuleError>,
    },

    /// A registry lookup found no table for a supposedly-supported key.
    ///
    /// This is a configuration error, not a soft miss: the registry is built
    /// eagerly for a fixed set of combinations, so a missing key means the
    /// caller and the registry disagree about what is supported.
    #[error("no rules found for {domain}, {kind}, {lang}")]
    MissingRules {
        /// The domain requested.
        domain: String,
        /// The rule kind requested.
        kind: String,
        /// The language requested.
        lang: String,
    },
}

/// A specialized `Result` type for rule loading and lookup operations.
pub type Result<T> = std::result::Result<T, RuleError>;
