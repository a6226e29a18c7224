// WHY: Lexicon patterns are shared by every sentence of every document, so each
// pattern is compiled once per process and reused by all workers

use dashmap::DashMap;
use regex_automata::meta::Regex;
use regex_automata::util::syntax;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::{MarkupError, Result};

static GLOBAL_CACHE: OnceLock<RegexCache> = OnceLock::new();

/// Append-only cache of compiled lexicon patterns keyed by (literal, pattern)
#[derive(Debug, Default)]
pub struct RegexCache {
    compiled: DashMap<(String, String), Regex>,
}

impl RegexCache {
    /// Create an empty cache (tests and isolated tools; the pipeline uses `global`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by all markup graphs
    pub fn global() -> &'static RegexCache {
        GLOBAL_CACHE.get_or_init(RegexCache::new)
    }

    /// Return the compiled regex for `pattern`, compiling it case-insensitively on first use
    pub fn get_or_compile(&self, literal: &str, pattern: &str) -> Result<Regex> {
        let key = (literal.to_string(), pattern.to_string());
        if let Some(regex) = self.compiled.get(&key) {
            return Ok(regex.clone());
        }

        let regex = compile_case_insensitive(pattern)?;
        debug!(literal, pattern, "compiled lexicon pattern");

        // Concurrent first use may compile twice; the first insert wins and both are equivalent
        let entry = self.compiled.entry(key).or_insert(regex);
        Ok(entry.value().clone())
    }

    /// Number of distinct patterns compiled so far
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// Compile `pattern` with Unicode and case-insensitive matching
pub(crate) fn compile_case_insensitive(pattern: &str) -> Result<Regex> {
    Regex::builder()
        .syntax(syntax::Config::new().case_insensitive(true).unicode(true))
        .build(pattern)
        .map_err(|source| MarkupError::InvalidPattern {
            pattern: pattern.to_string(),
            source: Box::new(source),
        })
}
