//! Rule-source parsing.
//!
//! Rule sources are UTF-8, line-oriented text. Each rule line has four
//! whitespace-separated, optionally double-quoted fields: pattern, left
//! context, right context, phoneme expression. `//` starts a line comment;
//! a line starting with `/*` opens a block comment closed by a line ending
//! in `*/`; blank lines are skipped; `#include <name>` inlines another
//! named source.
//!
//! The error policy is deliberately uneven and load-bearing: a line with
//! the wrong field count or a malformed include target is a logged warning
//! and the line is skipped, while any failure constructing a context
//! matcher or phoneme expression aborts the whole parse with the source
//! location and line number. Two quirks of the comment handling are part
//! of the format contract and preserved as-is: the block-comment close is
//! only recognized when the raw line *ends* with `*/`, and reaching end of
//! input inside a block comment silently consumes the remainder.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::{Result, RuleError};
use crate::phoneme::PhonemeExpr;
use crate::rule::Rule;

const LINE_COMMENT: &str = "//";
const BLOCK_COMMENT_OPEN: &str = "/*";
const BLOCK_COMMENT_CLOSE: &str = "*/";
const HASH_INCLUDE: &str = "#include";
const DOUBLE_QUOTE: char = '"';

/// Resolves rule-source text by name.
///
/// The registry composes names as `{domain}_{kind}_{lang}`; `#include`
/// targets are passed through verbatim. Implementations decide where the
/// text actually lives (embedded strings, files, archives); this crate
/// performs no I/O of its own.
pub trait RuleResources {
    /// Returns the text of the named source.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Resource`] if the name cannot be resolved.
    fn read(&self, name: &str) -> Result<String>;
}

/// A map-backed [`RuleResources`] for embedders that preload rule text,
/// and for tests.
#[derive(Debug, Default)]
pub struct InMemoryResources {
    sources: FxHashMap<String, String>,
}

impl InMemoryResources {
    /// Creates an empty resource map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a named source.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(name.into(), text.into());
    }
}

impl RuleResources for InMemoryResources {
    fn read(&self, name: &str) -> Result<String> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| RuleError::Resource(name.to_owned()))
    }
}

/// Parses rule-source text into rules.
///
/// `location` names the source for diagnostics; rules parsed from an
/// included source carry the provenance `{location}->{target}`. Line
/// numbers in errors and provenance are 1-based and relative to the source
/// the line actually came from.
///
/// # Errors
///
/// Returns an error if an include target cannot be resolved, or if a rule
/// line's contexts or phoneme expression fail to parse; the latter are
/// wrapped in [`RuleError::Line`] with the originating location.
pub fn parse_rules(
    text: &str,
    location: &str,
    resources: &dyn RuleResources,
) -> Result<Vec<Rule>> {
    let location: Arc<str> = Arc::from(location);
    let mut rules = Vec::new();
    let mut in_block_comment = false;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;

        if in_block_comment {
            if raw_line.ends_with(BLOCK_COMMENT_CLOSE) {
                in_block_comment = false;
            }
            continue;
        }

        if raw_line.starts_with(BLOCK_COMMENT_OPEN) {
            in_block_comment = true;
            continue;
        }

        let line = match raw_line.find(LINE_COMMENT) {
            Some(i) => &raw_line[..i],
            None => raw_line,
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(HASH_INCLUDE) {
            let target = rest.trim();
            if target.contains(char::is_whitespace) {
                warn!(location = %location, line = line_number,
                      "malformed include statement: {raw_line}");
                continue;
            }
            let included = resources.read(target)?;
            let nested_location = format!("{location}->{target}");
            rules.extend(parse_rules(&included, &nested_location, resources)?);
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            warn!(location = %location, line = line_number,
                  "malformed rule statement split into {} parts: {raw_line}",
                  fields.len());
            continue;
        }

        let rule = parse_rule_line(&fields).map_err(|source| RuleError::Line {
            location: location.to_string(),
            line: line_number,
            source: Box::new(source),
        })?;
        rules.push(rule.with_provenance(Arc::clone(&location), line_number));
    }

    Ok(rules)
}

fn parse_rule_line(fields: &[&str]) -> Result<Rule> {
    let pattern = strip_quotes(fields[0]);
    let l_context = strip_quotes(fields[1]);
    let r_context = strip_quotes(fields[2]);
    let phoneme = PhonemeExpr::parse(strip_quotes(fields[3]))?;
    Rule::new(pattern, l_context, r_context, phoneme)
}

/// Strips one optional leading and one optional trailing double quote.
///
/// Quotes are not required, and mismatched quoting is tolerated by
/// stripping whichever side is present.
fn strip_quotes(field: &str) -> &str {
    let field = field.strip_prefix(DOUBLE_QUOTE).unwrap_or(field);
    field.strip_suffix(DOUBLE_QUOTE).unwrap_or(field)
}
