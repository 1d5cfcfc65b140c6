//! The phoneme algebra: lazy text, phonemes and phoneme expressions.
//!
//! Phoneme text is built incrementally through many small appends while the
//! surrounding engine walks a name, so flattening on every append would be
//! quadratic. [`LazyText`] instead builds an immutable concatenation tree
//! with memoized lengths and defers flattening to first read; the flattened
//! rendering is cached and never recomputed.
//!
//! A [`Phoneme`] pairs a text with the [`LanguageSet`] it is valid for. A
//! [`PhonemeExpr`] is either a single phoneme or an ordered list of
//! alternatives; alternation order is significant for downstream
//! determinism.

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, OnceLock};

use smallvec::SmallVec;

use crate::error::{Result, RuleError};
use crate::languages::LanguageSet;

/// Immutable, shareable text represented as a binary concatenation tree.
///
/// Cloning is cheap (`Arc` bump). The total length is memoized per node;
/// the flattened rendering is computed at most once per distinct tree, on
/// first read. The cache write is a single idempotent publish, so
/// concurrent first reads may both flatten but cannot disagree.
#[derive(Clone)]
pub struct LazyText {
    node: Arc<Node>,
}

enum Node {
    Leaf(Arc<str>),
    Concat {
        left: LazyText,
        right: LazyText,
        len: usize,
        rendered: OnceLock<Arc<str>>,
    },
}

impl LazyText {
    /// Wraps a text fragment as a leaf.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        LazyText {
            node: Arc::new(Node::Leaf(text.into())),
        }
    }

    /// Concatenates two texts without flattening either.
    pub fn concat(left: &LazyText, right: &LazyText) -> Self {
        LazyText {
            node: Arc::new(Node::Concat {
                left: left.clone(),
                right: right.clone(),
                len: left.len() + right.len(),
                rendered: OnceLock::new(),
            }),
        }
    }

    /// Total length in bytes of the flattened text.
    pub fn len(&self) -> usize {
        match &*self.node {
            Node::Leaf(s) => s.len(),
            Node::Concat { len, .. } => *len,
        }
    }

    /// Returns true if the flattened text is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens the tree, caching the rendering on first call.
    pub fn render(&self) -> Arc<str> {
        match &*self.node {
            Node::Leaf(s) => Arc::clone(s),
            Node::Concat { len, rendered, .. } => Arc::clone(rendered.get_or_init(|| {
                let mut out = String::with_capacity(*len);
                self.build_into(&mut out);
                Arc::from(out)
            })),
        }
    }

    fn build_into(&self, out: &mut String) {
        match &*self.node {
            Node::Leaf(s) => out.push_str(s),
            Node::Concat { left, right, .. } => {
                left.build_into(out);
                right.build_into(out);
            }
        }
    }
}

impl fmt::Debug for LazyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.render())
    }
}

impl fmt::Display for LazyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A candidate pronunciation fragment: text plus the languages it is valid
/// for.
#[derive(Debug, Clone)]
pub struct Phoneme {
    text: LazyText,
    languages: LanguageSet,
}

impl Phoneme {
    /// Creates a phoneme from a text fragment and a language set.
    pub fn new(text: impl Into<Arc<str>>, languages: LanguageSet) -> Self {
        Phoneme {
            text: LazyText::new(text),
            languages,
        }
    }

    /// The flattened phoneme text.
    pub fn text(&self) -> Arc<str> {
        self.text.render()
    }

    /// The languages this phoneme is valid for.
    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    /// Returns a new phoneme with the suffix appended and the same language
    /// set.
    pub fn append(&self, suffix: &str) -> Phoneme {
        Phoneme {
            text: LazyText::concat(&self.text, &LazyText::new(suffix)),
            languages: self.languages.clone(),
        }
    }

    /// Joins two phonemes: text is concatenated, language sets intersect.
    pub fn join(&self, right: &Phoneme) -> Phoneme {
        Phoneme {
            text: LazyText::concat(&self.text, &right.text),
            languages: self.languages.restrict_to(&right.languages),
        }
    }

    /// Lexicographic order over the flattened text; a strict prefix sorts
    /// before the longer text. Language sets do not participate.
    ///
    /// Used to produce deterministic, de-duplicatable output sequences.
    pub fn compare(&self, other: &Phoneme) -> Ordering {
        self.text().cmp(&other.text())
    }
}

impl PartialEq for Phoneme {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text() && self.languages == other.languages
    }
}

impl Eq for Phoneme {}

impl fmt::Display for Phoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())?;
        if let LanguageSet::Restricted(langs) = &self.languages {
            write!(f, "[")?;
            for (i, lang) in langs.iter().enumerate() {
                if i > 0 {
                    write!(f, "+")?;
                }
                write!(f, "{lang}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// An ordered, finite collection of candidate phonemes.
///
/// A closed union with exactly two variants; rules never produce any other
/// shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhonemeExpr {
    /// Exactly one phoneme.
    Single(Phoneme),
    /// Ordered alternatives, yielded in source order.
    Alternatives(SmallVec<[Phoneme; 4]>),
}

impl PhonemeExpr {
    /// Parses the phoneme column of a rule line.
    ///
    /// A parenthesized expression is an alternation: the body is split on
    /// `|`, each field parsed as a phoneme, and a leading or trailing `|`
    /// contributes one additional empty phoneme with the universal language
    /// set. Anything else is a single phoneme, optionally suffixed with a
    /// `[lang+lang+..]` language list.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnclosedAlternation`] or
    /// [`RuleError::UnclosedLanguageList`] on malformed input.
    pub fn parse(expr: &str) -> Result<PhonemeExpr> {
        if let Some(stripped) = expr.strip_prefix('(') {
            let Some(body) = stripped.strip_suffix(')') else {
                return Err(RuleError::UnclosedAlternation(expr.to_owned()));
            };

            let mut phonemes: SmallVec<[Phoneme; 4]> = SmallVec::new();
            for part in split_alternation(body) {
                phonemes.push(parse_phoneme(part)?);
            }
            if body.starts_with('|') || body.ends_with('|') {
                phonemes.push(Phoneme::new("", LanguageSet::Any));
            }

            Ok(PhonemeExpr::Alternatives(phonemes))
        } else {
            Ok(PhonemeExpr::Single(parse_phoneme(expr)?))
        }
    }

    /// The candidate phonemes, in source order.
    pub fn phonemes(&self) -> std::slice::Iter<'_, Phoneme> {
        match self {
            PhonemeExpr::Single(p) => std::slice::from_ref(p).iter(),
            PhonemeExpr::Alternatives(ps) => ps.iter(),
        }
    }
}

impl fmt::Display for PhonemeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhonemeExpr::Single(p) => write!(f, "{p}"),
            PhonemeExpr::Alternatives(ps) => {
                write!(f, "(")?;
                for (i, p) in ps.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Splits an alternation body on `|`, dropping trailing empty fields.
///
/// An empty body still yields one empty field. This mirrors the splitting
/// behavior the rule sources were written against; the extra empty
/// alternative for a leading/trailing `|` is handled by the caller.
fn split_alternation(body: &str) -> Vec<&str> {
    if body.is_empty() {
        return vec![""];
    }
    let mut parts: Vec<&str> = body.split('|').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// Parses one phoneme: text with an optional `[lang+lang+..]` suffix.
fn parse_phoneme(ph: &str) -> Result<Phoneme> {
    match ph.find('[') {
        Some(open) => {
            if !ph.ends_with(']') {
                return Err(RuleError::UnclosedLanguageList(ph.to_owned()));
            }
            let text = &ph[..open];
            let langs = &ph[open + 1..ph.len() - 1];
            Ok(Phoneme::new(
                text,
                LanguageSet::restricted(langs.split('+')),
            ))
        }
        None => Ok(Phoneme::new(ph, LanguageSet::Any)),
    }
}
