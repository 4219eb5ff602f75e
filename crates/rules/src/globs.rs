//! Multi-glob rule keys: parsing, canonical form and matching.
//!
//! A rule key holds one or more glob patterns joined by [`GLOB_SEPARATOR`].
//! Empty segments are dropped, so `"a |  | b"` style keys collapse to the
//! canonical `"a | b"`.

use std::path::MAIN_SEPARATOR;

use globset::{GlobBuilder, GlobMatcher};

use crate::error::{Result, RuleError};

/// Separator between patterns inside a rule key.
pub const GLOB_SEPARATOR: &str = " | ";

/// Prefix that negates a pattern.
const NEGATION: char = '!';

/// Split a rule key into its non-empty patterns, in key order.
pub fn parse_globs(key: &str) -> Vec<String> {
    key.split(GLOB_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join patterns back into a rule key.
pub fn stringify_globs<S: AsRef<str>>(patterns: &[S]) -> String {
    patterns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(GLOB_SEPARATOR)
}

/// Canonical form of a rule key, or `None` when it holds no pattern.
pub fn canonical_key(key: &str) -> Option<String> {
    let patterns = parse_globs(key);
    if patterns.is_empty() {
        None
    } else {
        Some(stringify_globs(&patterns))
    }
}

/// One compiled pattern of a [`MultiGlob`].
#[derive(Debug, Clone)]
struct CompiledGlob {
    negated: bool,
    matcher: GlobMatcher,
}

/// An ordered, compiled pattern sequence.
///
/// Patterns are evaluated left to right: a positive pattern that matches
/// marks the path as matched, a negated (`!`) pattern that matches clears
/// the mark. Evaluation starts unmatched, so a sequence holding only
/// negated patterns matches nothing.
#[derive(Debug, Clone)]
pub struct MultiGlob {
    globs: Vec<CompiledGlob>,
}

impl MultiGlob {
    /// Compile `patterns`. `*` and `?` never cross a `/`; `**` does.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut globs = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let (negated, body) = match pattern.strip_prefix(NEGATION) {
                Some(rest) => (true, rest),
                None => (false, pattern),
            };
            let glob = GlobBuilder::new(trim_trailing_slash(body))
                .literal_separator(true)
                .build()
                .map_err(|source| RuleError::InvalidGlob {
                    pattern: pattern.to_string(),
                    source,
                })?;
            globs.push(CompiledGlob {
                negated,
                matcher: glob.compile_matcher(),
            });
        }
        Ok(Self { globs })
    }

    /// Test an already normalized path.
    pub fn is_match(&self, path: &str) -> bool {
        let candidate = to_match_form(path);
        let candidate = trim_trailing_slash(&candidate);

        let mut matched = false;
        for glob in &self.globs {
            if glob.negated == matched && glob.matcher.is_match(candidate) {
                matched = !glob.negated;
            }
        }
        matched
    }

    /// Number of patterns in the sequence.
    pub fn len(&self) -> usize {
        self.globs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }
}

/// Globs always use `/`, whatever the platform separator is.
fn to_match_form(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    }
}

fn trim_trailing_slash(s: &str) -> &str {
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() && !s.is_empty() {
        "/"
    } else {
        trimmed
    }
}
