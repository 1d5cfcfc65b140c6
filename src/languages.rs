//! Language sets: the constraint attached to phonemes and rules.
//!
//! A [`LanguageSet`] describes which languages a phoneme or rule applies
//! to. The unconstrained default is [`LanguageSet::Any`]; a restricted set
//! narrows under intersection and may legitimately end up empty, meaning
//! "no language permits this" (the surrounding engine treats such phonemes
//! as dead ends rather than errors).

use std::collections::BTreeSet;
use std::fmt;

/// A set of language codes, or the absence of any constraint.
///
/// `Any` is the absorbing element under [`restrict_to`](Self::restrict_to):
/// intersecting it with anything returns the other operand. Restricted sets
/// intersect as ordinary sets. Intersection is commutative, associative and
/// idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSet {
    /// No constraint: valid for every language.
    Any,
    /// Valid only for the named languages. May be empty.
    Restricted(BTreeSet<String>),
}

impl LanguageSet {
    /// Builds a restricted set from language codes, collapsing duplicates.
    pub fn restricted<I, S>(langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        langs.into_iter().collect()
    }

    /// Intersects this set with another.
    pub fn restrict_to(&self, other: &LanguageSet) -> LanguageSet {
        match (self, other) {
            (LanguageSet::Any, _) => other.clone(),
            (_, LanguageSet::Any) => self.clone(),
            (LanguageSet::Restricted(a), LanguageSet::Restricted(b)) => {
                LanguageSet::Restricted(a.intersection(b).cloned().collect())
            }
        }
    }

    /// Returns true if this is a restricted set naming exactly one language.
    pub fn is_singleton(&self) -> bool {
        matches!(self, LanguageSet::Restricted(s) if s.len() == 1)
    }

    /// Returns true if this is a restricted set naming no languages at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, LanguageSet::Restricted(s) if s.is_empty())
    }

    /// Returns some member of a restricted set, or `None` for `Any` or an
    /// empty set. Deterministic: always the lexicographically first member.
    pub fn any_member(&self) -> Option<&str> {
        match self {
            LanguageSet::Any => None,
            LanguageSet::Restricted(s) => s.iter().next().map(String::as_str),
        }
    }

    /// Returns true if the given language is permitted by this set.
    pub fn contains(&self, lang: &str) -> bool {
        match self {
            LanguageSet::Any => true,
            LanguageSet::Restricted(s) => s.contains(lang),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for LanguageSet {
    fn from_iter<I: IntoIterator<Item = S>>(langs: I) -> Self {
        LanguageSet::Restricted(langs.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageSet::Any => write!(f, "ANY_LANGUAGE"),
            LanguageSet::Restricted(s) => {
                write!(f, "Languages(")?;
                for (i, lang) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{lang}")?;
                }
                write!(f, ")")
            }
        }
    }
}
