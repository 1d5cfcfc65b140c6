//! # phonemic
//!
//! Rule-based phonetic transformation engine for name matching.
//!
//! Given a textual name, this crate evaluates context-sensitive rewrite
//! rules that map substrings to one or more candidate phoneme renderings,
//! each constrained by the set of languages for which the mapping is valid.
//! It is the matching primitive underneath a larger phonetic-name-matching
//! pipeline: the surrounding engine walks a name left to right, asks each
//! [`Rule`](rule::Rule) whether it applies at the current position, and on
//! success reads the rule's [`PhonemeExpr`](phoneme::PhonemeExpr) to obtain
//! candidate phonemes.
//!
//! Rule sets are written in a small line-oriented text format (four
//! whitespace-separated, optionally quoted columns: pattern, left context,
//! right context, phoneme expression) with `//` comments, `/* ... */` block
//! comments and `#include` directives. Sources are resolved through the
//! [`RuleResources`](parser::RuleResources) trait, so the crate has no
//! opinion about where rule text lives.
//!
//! ## Example
//!
//! ```rust
//! use phonemic::prelude::*;
//!
//! let mut resources = InMemoryResources::new();
//! resources.insert("gen_rules_any", r#""ts" "" "$" "tS""#);
//!
//! let text = resources.read("gen_rules_any").unwrap();
//! let rules = parse_rules(&text, "gen_rules_any", &resources).unwrap();
//! assert!(rules[0].matches("kats", 2));
//! ```
//!
//! ## Concurrency
//!
//! Rule loading is a one-time eager build; afterwards every type in this
//! crate is immutable and may be read from any number of threads without
//! locking. [`GlobalRegistry`](registry::GlobalRegistry) provides the
//! one-time initialization guard for process-wide registries.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod languages;
pub mod parser;
pub mod pattern;
pub mod phoneme;
pub mod registry;
pub mod rule;

mod properties;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::error::{Result, RuleError};
    pub use crate::languages::LanguageSet;
    pub use crate::parser::{parse_rules, InMemoryResources, RuleResources};
    pub use crate::pattern::ContextMatcher;
    pub use crate::phoneme::{LazyText, Phoneme, PhonemeExpr};
    pub use crate::registry::{
        DomainConfig, GlobalRegistry, KindConfig, RegistryConfig, RuleRegistry, ANY_LANGUAGE,
        COMMON_LANGUAGE,
    };
    pub use crate::rule::{Provenance, Rule};
}
