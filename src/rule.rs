//! Phoneme rules and the context-sensitive match decision.
//!
//! A rule has a literal pattern, a left context, a right context and a
//! phoneme expression. It matches at a position when the pattern matches
//! there exactly, the text before the pattern satisfies the left context
//! and the text after it satisfies the right context.
//!
//! Rules are typically produced by [`parse_rules`](crate::parser::parse_rules)
//! from rule-source text; in normal use there is no need to construct them
//! directly. Rules are immutable and thread-safe.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::pattern::ContextMatcher;
use crate::phoneme::PhonemeExpr;

/// Where a rule came from: source location string and 1-based line number.
///
/// Used only for diagnostic rendering, never for matching logic. Rules
/// constructed programmatically carry a placeholder location and line 0.
#[derive(Debug, Clone)]
pub struct Provenance {
    /// Source location, e.g. `"gen_rules_polish"` or
    /// `"gen_approx_polish->common"` for included sources.
    pub location: Arc<str>,
    /// 1-based line number within the source, or 0 for inline rules.
    pub line: usize,
}

/// A phoneme rule: literal pattern, compiled contexts and the phoneme
/// expression produced on a match.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    l_context: ContextMatcher,
    r_context: ContextMatcher,
    phoneme: PhonemeExpr,
    provenance: Provenance,
}

impl Rule {
    /// Creates a new rule, compiling both context expressions eagerly.
    ///
    /// The left context is compiled from `l_context + "$"` (anchored to the
    /// end of the text preceding the match position) and the right context
    /// from `"^" + r_context` (anchored to the start of the text following
    /// the match).
    ///
    /// # Errors
    ///
    /// Returns an error if either context expression fails to compile.
    pub fn new(
        pattern: impl Into<String>,
        l_context: &str,
        r_context: &str,
        phoneme: PhonemeExpr,
    ) -> Result<Rule> {
        Ok(Rule {
            pattern: pattern.into(),
            l_context: ContextMatcher::compile(&format!("{l_context}$"))?,
            r_context: ContextMatcher::compile(&format!("^{r_context}"))?,
            phoneme,
            provenance: Provenance {
                location: Arc::from("<inline>"),
                line: 0,
            },
        })
    }

    pub(crate) fn with_provenance(mut self, location: Arc<str>, line: usize) -> Rule {
        self.provenance = Provenance { location, line };
        self
    }

    /// The literal pattern that must match exactly.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The compiled left-context matcher.
    pub fn left_context(&self) -> &ContextMatcher {
        &self.l_context
    }

    /// The compiled right-context matcher.
    pub fn right_context(&self) -> &ContextMatcher {
        &self.r_context
    }

    /// The phoneme expression associated with a successful match.
    pub fn phoneme_expr(&self) -> &PhonemeExpr {
        &self.phoneme
    }

    /// Source location and line number, for diagnostics.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Decides if the pattern and both contexts match `input` at `position`.
    ///
    /// `position` is a byte offset into `input`. Returns `false` when the
    /// pattern cannot fit in the remaining input or when `position` does not
    /// fall on a character boundary. (Positions are unsigned, so the
    /// negative-position precondition of the original contract is
    /// unrepresentable here.)
    pub fn matches(&self, input: &str, position: usize) -> bool {
        let end = position + self.pattern.len();
        if end > input.len() {
            // not enough room for the pattern to match
            return false;
        }

        let Some(at) = input.get(position..end) else {
            return false;
        };

        let pattern_matches = at == self.pattern;
        let r_context_matches = self.r_context.matches(&input[end..]);
        let l_context_matches = self.l_context.matches(&input[..position]);

        pattern_matches && r_context_matches && l_context_matches
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule{{line={}, loc='{}'}}",
            self.provenance.line, self.provenance.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageSet;
    use crate::phoneme::Phoneme;

    fn rule(pattern: &str, l: &str, r: &str) -> Rule {
        let phoneme = PhonemeExpr::Single(Phoneme::new("x", LanguageSet::Any));
        Rule::new(pattern, l, r, phoneme).unwrap()
    }

    #[test]
    fn test_pattern_must_fit() {
        let r = rule("sch", "", "");
        assert!(r.matches("schmidt", 0));
        assert!(!r.matches("sc", 0));
        assert!(!r.matches("schmidt", 5));
        assert!(!r.matches("schmidt", 100));
    }

    #[test]
    fn test_pattern_exact_and_case_sensitive() {
        let r = rule("ts", "", "");
        assert!(r.matches("kats", 2));
        assert!(!r.matches("kaTs", 2));
        assert!(!r.matches("kat", 2));
    }

    #[test]
    fn test_right_context_end_anchor() {
        // pattern at end of input only
        let r = rule("ts", "", "$");
        assert!(r.matches("kats", 2));
        assert!(!r.matches("katsa", 2));
    }

    #[test]
    fn test_left_context_start_anchor() {
        let r = rule("ts", "^", "");
        assert!(r.matches("tsar", 0));
        assert!(!r.matches("atsar", 1));
    }

    #[test]
    fn test_character_class_contexts() {
        // only after a vowel, only before a consonant
        let r = rule("s", "[aeiou]", "[^aeiou]");
        assert!(r.matches("asti", 1));
        assert!(!r.matches("psti", 1));
        assert!(!r.matches("asia", 1));
    }

    #[test]
    fn test_empty_contexts_match_anything() {
        let r = rule("a", "", "");
        for (input, pos) in [("a", 0), ("ba", 1), ("ab", 0), ("bab", 1)] {
            assert!(r.matches(input, pos), "{input} at {pos}");
        }
    }

    #[test]
    fn test_position_off_char_boundary_is_no_match() {
        let r = rule("é", "", "");
        let input = "éa";
        assert!(r.matches(input, 0));
        // byte offset 1 is inside the two-byte 'é'
        assert!(!r.matches(input, 1));
    }

    #[test]
    fn test_empty_pattern_matches_everywhere() {
        let r = rule("", "", "");
        assert!(r.matches("abc", 0));
        assert!(r.matches("abc", 3));
        assert!(!r.matches("abc", 4));
    }

    #[test]
    fn test_display_shows_provenance() {
        let r = rule("a", "", "");
        assert_eq!(r.to_string(), "Rule{line=0, loc='<inline>'}");
        let r = r.with_provenance(Arc::from("gen_rules_polish"), 17);
        assert_eq!(r.to_string(), "Rule{line=17, loc='gen_rules_polish'}");
    }
}
