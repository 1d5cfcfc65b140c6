//! The rule registry: a build-once index from (domain, rule kind, language)
//! to an ordered list of rules.
//!
//! The registry is built eagerly for a fixed set of combinations described
//! by a [`RegistryConfig`], then read-only. A lookup miss for a supported
//! combination is a configuration error, not a soft fallback: the
//! surrounding application should fail fast at startup rather than serve a
//! partially-loaded rule set.
//!
//! Domain and kind names are opaque to this crate; they come from the
//! surrounding engine's catalogs. Two language names are distinguished:
//! [`COMMON_LANGUAGE`] (a shared bucket loaded for every non-base kind) and
//! [`ANY_LANGUAGE`] (the bucket served when a lookup carries a language set
//! that does not name exactly one language).

use std::sync::OnceLock;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{Result, RuleError};
use crate::languages::LanguageSet;
use crate::parser::{parse_rules, RuleResources};
use crate::rule::Rule;

/// The bucket used when a language set does not name exactly one language.
pub const ANY_LANGUAGE: &str = "any";

/// The shared bucket loaded for every rule kind except base kinds.
pub const COMMON_LANGUAGE: &str = "common";

/// One domain and the languages it supports.
///
/// A domain that should serve lookups for non-singleton language sets must
/// list [`ANY_LANGUAGE`] among its languages; the registry does not invent
/// buckets.
#[derive(Debug, Clone)]
pub struct DomainConfig {
    /// Opaque domain name, e.g. a naming convention.
    pub name: String,
    /// Languages to load for this domain.
    pub languages: Vec<String>,
}

/// One rule kind.
#[derive(Debug, Clone)]
pub struct KindConfig {
    /// Opaque kind name, e.g. a rule category.
    pub name: String,
    /// Base kinds do not get a [`COMMON_LANGUAGE`] bucket.
    pub base: bool,
}

/// Describes the full set of rule tables to build.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// The domains to build tables for.
    pub domains: Vec<DomainConfig>,
    /// The rule kinds to build tables for, within each domain.
    pub kinds: Vec<KindConfig>,
}

/// Composes the resource name the registry asks a [`RuleResources`]
/// provider for.
pub fn resource_name(domain: &str, kind: &str, lang: &str) -> String {
    format!("{domain}_{kind}_{lang}")
}

type LanguageTable = FxHashMap<String, Vec<Rule>>;
type KindTable = FxHashMap<String, LanguageTable>;

/// Build-once, read-only index of rules.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    domains: FxHashMap<String, KindTable>,
}

impl RuleRegistry {
    /// Eagerly builds every table named by the configuration.
    ///
    /// For each domain × kind × language the resource
    /// `{domain}_{kind}_{lang}` is read and parsed; every non-base kind
    /// additionally loads the [`COMMON_LANGUAGE`] bucket.
    ///
    /// # Errors
    ///
    /// Any resource or parse failure aborts the build, wrapped with the
    /// name of the resource being processed.
    pub fn build(config: &RegistryConfig, resources: &dyn RuleResources) -> Result<RuleRegistry> {
        let mut domains: FxHashMap<String, KindTable> = FxHashMap::default();

        for domain in &config.domains {
            let mut kinds: KindTable = FxHashMap::default();

            for kind in &config.kinds {
                let mut languages: LanguageTable = FxHashMap::default();

                for lang in &domain.languages {
                    let rules = load(&domain.name, &kind.name, lang, resources)?;
                    languages.insert(lang.clone(), rules);
                }
                if !kind.base {
                    let rules = load(&domain.name, &kind.name, COMMON_LANGUAGE, resources)?;
                    languages.insert(COMMON_LANGUAGE.to_owned(), rules);
                }

                kinds.insert(kind.name.clone(), languages);
            }

            domains.insert(domain.name.clone(), kinds);
        }

        Ok(RuleRegistry { domains })
    }

    /// Gets the rules for a domain, kind and single language.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::MissingRules`] if no table exists for the key.
    pub fn rules(&self, domain: &str, kind: &str, lang: &str) -> Result<&[Rule]> {
        self.domains
            .get(domain)
            .and_then(|kinds| kinds.get(kind))
            .and_then(|languages| languages.get(lang))
            .map(Vec::as_slice)
            .ok_or_else(|| RuleError::MissingRules {
                domain: domain.to_owned(),
                kind: kind.to_owned(),
                lang: lang.to_owned(),
            })
    }

    /// Gets the rules for a domain, kind and language set.
    ///
    /// A restricted set naming exactly one language routes to that
    /// language's table; anything else routes to the [`ANY_LANGUAGE`]
    /// bucket.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::MissingRules`] if no table exists for the
    /// resolved key.
    pub fn rules_for_set(
        &self,
        domain: &str,
        kind: &str,
        langs: &LanguageSet,
    ) -> Result<&[Rule]> {
        match langs.any_member() {
            Some(lang) if langs.is_singleton() => self.rules(domain, kind, lang),
            _ => self.rules(domain, kind, ANY_LANGUAGE),
        }
    }
}

fn load(
    domain: &str,
    kind: &str,
    lang: &str,
    resources: &dyn RuleResources,
) -> Result<Vec<Rule>> {
    let name = resource_name(domain, kind, lang);
    let build_error = |source: RuleError| RuleError::Build {
        resource: name.clone(),
        source: Box::new(source),
    };
    let text = resources.read(&name).map_err(build_error)?;
    parse_rules(&text, &name, resources).map_err(build_error)
}

/// Process-wide one-time storage for a [`RuleRegistry`].
///
/// Registry construction happens once, before any lookups are served;
/// concurrent first use cannot race or double-build. Reads after
/// construction are lock-free.
///
/// ```rust
/// use phonemic::prelude::*;
///
/// static REGISTRY: GlobalRegistry = GlobalRegistry::new();
///
/// # fn config() -> RegistryConfig { RegistryConfig::default() }
/// # fn resources() -> InMemoryResources { InMemoryResources::new() }
/// let registry = REGISTRY
///     .get_or_build(|| RuleRegistry::build(&config(), &resources()))
///     .unwrap();
/// ```
pub struct GlobalRegistry {
    cell: OnceLock<RuleRegistry>,
    build: Mutex<()>,
}

impl GlobalRegistry {
    /// Creates an empty, unbuilt registry cell.
    pub const fn new() -> Self {
        GlobalRegistry {
            cell: OnceLock::new(),
            build: Mutex::new(()),
        }
    }

    /// Returns the registry, building it with `init` on first use.
    ///
    /// Exactly one caller runs `init`; others block until it finishes and
    /// then read the built registry without locking.
    ///
    /// # Errors
    ///
    /// Propagates whatever `init` returns; the cell stays empty on failure.
    pub fn get_or_build(
        &self,
        init: impl FnOnce() -> Result<RuleRegistry>,
    ) -> Result<&RuleRegistry> {
        if let Some(registry) = self.cell.get() {
            return Ok(registry);
        }
        let _guard = self.build.lock();
        if let Some(registry) = self.cell.get() {
            return Ok(registry);
        }
        let built = init()?;
        Ok(self.cell.get_or_init(|| built))
    }
}

impl Default for GlobalRegistry {
    fn default() -> Self {
        Self::new()
    }
}
