//! Context-pattern compilation.
//!
//! Rule contexts are written in a restricted regular-expression subset:
//! optional `^`/`$` anchors around either plain literal text or a single
//! bracketed character class (optionally negated with a leading `^` inside
//! the brackets). [`ContextMatcher::compile`] classifies an expression into
//! one of several allocation-free matchers, falling back to a general
//! [`regex`] engine for anything outside the subset.
//!
//! The classification is checked in a fixed priority order; several
//! conditions can be simultaneously true syntactically and the first
//! applicable specialization wins. An expression with a character class but
//! no anchors falls through to the general engine, as does an unanchored
//! literal. Matching uses search-anywhere semantics, not full-string
//! semantics: callers always hand the matcher the exact left or right
//! remainder slice, with the anchors already embedded by the rule
//! constructor.

use crate::error::{Result, RuleError};

/// A compiled context test: decides whether a text slice satisfies the
/// context expression it was compiled from.
///
/// Compilation happens eagerly when a [`Rule`](crate::rule::Rule) is
/// constructed, so malformed expressions surface at rule-load time, never
/// at match time.
#[derive(Debug, Clone)]
pub struct ContextMatcher {
    kind: MatcherKind,
}

#[derive(Debug, Clone)]
enum MatcherKind {
    /// `^$`: only the empty slice matches.
    Empty,
    /// `^text$`: the slice must equal the content exactly.
    Exact(String),
    /// A bare `^` or `$`: every slice matches.
    All,
    /// `^text`: the slice must start with the content.
    Prefix(String),
    /// `text$`: the slice must end with the content.
    Suffix(String),
    /// `^[..]$`: exactly one char, membership must equal `should_match`.
    OneChar { chars: String, should_match: bool },
    /// `^[..]`: first char membership must equal `should_match`.
    FirstChar { chars: String, should_match: bool },
    /// `[..]$`: last char membership must equal `should_match`.
    LastChar { chars: String, should_match: bool },
    /// Anything else: general regex, search-anywhere semantics.
    Fallback(regex::Regex),
}

impl ContextMatcher {
    /// Compiles a context expression, preferring direct string operations
    /// and falling back to a general regex in the worst case.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Context`] if the expression reaches the fallback
    /// path and is not valid regex syntax.
    pub fn compile(expr: &str) -> Result<ContextMatcher> {
        let anchored_start = expr.starts_with('^');
        let anchored_end = expr.ends_with('$');
        let content = &expr[usize::from(anchored_start)..expr.len() - usize::from(anchored_end)];

        if !content.contains('[') {
            if anchored_start && anchored_end {
                return Ok(if content.is_empty() {
                    Self::from_kind(MatcherKind::Empty)
                } else {
                    Self::from_kind(MatcherKind::Exact(content.to_owned()))
                });
            }
            if (anchored_start || anchored_end) && content.is_empty() {
                return Ok(Self::from_kind(MatcherKind::All));
            }
            if anchored_start {
                return Ok(Self::from_kind(MatcherKind::Prefix(content.to_owned())));
            }
            if anchored_end {
                return Ok(Self::from_kind(MatcherKind::Suffix(content.to_owned())));
            }
        } else if content.starts_with('[') && content.ends_with(']') {
            let box_content = &content[1..content.len() - 1];
            if !box_content.contains('[') {
                let negate = box_content.starts_with('^');
                let chars = if negate { &box_content[1..] } else { box_content };
                let chars = chars.to_owned();
                let should_match = !negate;

                if anchored_start && anchored_end {
                    return Ok(Self::from_kind(MatcherKind::OneChar {
                        chars,
                        should_match,
                    }));
                }
                if anchored_start {
                    return Ok(Self::from_kind(MatcherKind::FirstChar {
                        chars,
                        should_match,
                    }));
                }
                if anchored_end {
                    return Ok(Self::from_kind(MatcherKind::LastChar {
                        chars,
                        should_match,
                    }));
                }
            }
        }

        Self::fallback(expr)
    }

    /// Compiles the original, unmodified expression as a general regex.
    fn fallback(expr: &str) -> Result<ContextMatcher> {
        let re = regex::Regex::new(expr).map_err(|e| RuleError::Context {
            expr: expr.to_owned(),
            source: Box::new(e),
        })?;
        Ok(Self::from_kind(MatcherKind::Fallback(re)))
    }

    fn from_kind(kind: MatcherKind) -> ContextMatcher {
        ContextMatcher { kind }
    }

    /// Decides whether the given slice satisfies this context test.
    #[inline]
    pub fn matches(&self, input: &str) -> bool {
        match &self.kind {
            MatcherKind::Empty => input.is_empty(),
            MatcherKind::Exact(content) => input == content,
            MatcherKind::All => true,
            MatcherKind::Prefix(content) => input.starts_with(content),
            MatcherKind::Suffix(content) => input.ends_with(content),
            MatcherKind::OneChar {
                chars,
                should_match,
            } => {
                let mut it = input.chars();
                match (it.next(), it.next()) {
                    (Some(c), None) => chars.contains(c) == *should_match,
                    _ => false,
                }
            }
            MatcherKind::FirstChar {
                chars,
                should_match,
            } => match input.chars().next() {
                Some(c) => chars.contains(c) == *should_match,
                None => false,
            },
            MatcherKind::LastChar {
                chars,
                should_match,
            } => match input.chars().next_back() {
                Some(c) => chars.contains(c) == *should_match,
                None => false,
            },
            MatcherKind::Fallback(re) => re.is_match(input),
        }
    }

    /// True if compilation landed on the general regex engine.
    ///
    /// Exposed for tests that pin down which expressions specialize.
    #[cfg(test)]
    pub(crate) fn is_fallback(&self) -> bool {
        matches!(self.kind, MatcherKind::Fallback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(expr: &str) -> ContextMatcher {
        ContextMatcher::compile(expr).unwrap()
    }

    #[test]
    fn test_empty_only() {
        let m = compile("^$");
        assert!(m.matches(""));
        assert!(!m.matches("a"));
        assert!(!m.is_fallback());
    }

    #[test]
    fn test_exact() {
        let m = compile("^abc$");
        assert!(m.matches("abc"));
        assert!(!m.matches("abcd"));
        assert!(!m.matches("ab"));
        assert!(!m.is_fallback());
    }

    #[test]
    fn test_match_all_from_bare_anchor() {
        for expr in ["^", "$"] {
            let m = compile(expr);
            assert!(m.matches(""));
            assert!(m.matches("anything"));
            assert!(!m.is_fallback());
        }
    }

    #[test]
    fn test_prefix() {
        let m = compile("^ab");
        assert!(m.matches("ab"));
        assert!(m.matches("abc"));
        assert!(!m.matches("xab"));
        assert!(!m.is_fallback());
    }

    #[test]
    fn test_suffix() {
        let m = compile("ab$");
        assert!(m.matches("ab"));
        assert!(m.matches("xab"));
        assert!(!m.matches("abx"));
        assert!(!m.is_fallback());
    }

    #[test]
    fn test_one_char_class() {
        let m = compile("^[aeiou]$");
        assert!(m.matches("a"));
        assert!(!m.matches("b"));
        assert!(!m.matches("ae"));
        assert!(!m.matches(""));
        assert!(!m.is_fallback());
    }

    #[test]
    fn test_one_char_class_negated() {
        let m = compile("^[^aeiou]$");
        assert!(m.matches("b"));
        assert!(!m.matches("a"));
        assert!(!m.matches("bb"));
        assert!(!m.matches(""));
    }

    #[test]
    fn test_first_char_class() {
        let m = compile("^[aeiou]");
        assert!(m.matches("at"));
        assert!(m.matches("a"));
        assert!(!m.matches("ta"));
        assert!(!m.matches(""));
        assert!(!m.is_fallback());
    }

    #[test]
    fn test_last_char_class() {
        let m = compile("[aeiou]$");
        assert!(m.matches("ta"));
        assert!(m.matches("a"));
        assert!(!m.matches("at"));
        assert!(!m.matches(""));
        assert!(!m.is_fallback());
    }

    #[test]
    fn test_negated_first_char_class() {
        let m = compile("^[^aeiou]");
        assert!(m.matches("ta"));
        assert!(!m.matches("at"));
        assert!(!m.matches(""));
    }

    #[test]
    fn test_unanchored_literal_falls_back() {
        let m = compile("ab");
        assert!(m.is_fallback());
        // search-anywhere semantics
        assert!(m.matches("ab"));
        assert!(m.matches("xabx"));
        assert!(!m.matches("ba"));
    }

    #[test]
    fn test_unanchored_class_falls_back() {
        let m = compile("[aeiou]");
        assert!(m.is_fallback());
        assert!(m.matches("xax"));
        assert!(!m.matches("xyz"));
    }

    #[test]
    fn test_nested_class_falls_back() {
        // not in the subset; regex treats the inner '[' literally
        let m = compile("^[a[b]$");
        assert!(m.is_fallback());
    }

    #[test]
    fn test_alternation_falls_back() {
        let m = compile("^(van|de)$");
        assert!(m.is_fallback());
        assert!(m.matches("van"));
        assert!(m.matches("de"));
        assert!(!m.matches("von"));
    }

    #[test]
    fn test_invalid_fallback_syntax_is_compile_error() {
        let err = ContextMatcher::compile("^(unclosed$").unwrap_err();
        assert!(matches!(err, RuleError::Context { .. }));
    }

    #[test]
    fn test_empty_expression_falls_back_and_matches_everything() {
        let m = compile("");
        assert!(m.is_fallback());
        assert!(m.matches(""));
        assert!(m.matches("x"));
    }

    mod differential {
        //! The specialized matchers must agree with the general regex
        //! fallback on every input, for every expression in the supported
        //! subset.

        use super::*;
        use proptest::prelude::*;

        /// Expressions from the supported subset, built from regex-inert
        /// characters so the general engine interprets them literally.
        fn subset_expr() -> impl Strategy<Value = String> {
            let literal = "[a-z]{0,4}";
            let class = ("[\\^]{0,1}", "[a-z]{1,4}")
                .prop_map(|(neg, chars)| format!("[{neg}{chars}]"));
            let body = prop_oneof![literal.prop_map(String::from), class];
            ("[\\^]{0,1}", body, "[$]{0,1}")
                .prop_map(|(start, body, end)| format!("{start}{body}{end}"))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(2000))]

            #[test]
            fn prop_specialized_agrees_with_fallback(
                expr in subset_expr(),
                input in "[a-z]{0,8}"
            ) {
                let specialized = ContextMatcher::compile(&expr).unwrap();
                let general = regex::Regex::new(&expr).unwrap();
                prop_assert_eq!(
                    specialized.matches(&input),
                    general.is_match(&input),
                    "expr {:?} disagreed on input {:?}", expr, input
                );
            }
        }
    }
}
