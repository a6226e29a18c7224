// WHY: Annotations are immutable value records; the mutable scope of each one
// lives in the owning graph, keyed by TagId, so no two graphs alias a match

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::lexicon::{LexiconItem, Rule};

static NEXT_TAG_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a tagged match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TagId(u64);

impl TagId {
    /// Allocate a fresh id; ids are never reused within a process
    pub(crate) fn next() -> Self {
        TagId(NEXT_TAG_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Byte-offset interval `[start, end)` of a match in the clean text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Callers guarantee `start < end`; `MarkupGraph::add_annotation` checks it at the boundary
    pub(crate) fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end);
        Self { start, end }
    }

    /// Non-strict containment: identical spans encompass each other
    pub fn encompasses(&self, other: &Span) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Minimum gap between the two spans, measured end-to-start in either direction
    pub fn distance(&self, other: &Span) -> usize {
        self.end.abs_diff(other.start).min(self.start.abs_diff(other.end))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Closed interval within which a modifier's rule applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Scope {
    pub start: usize,
    pub end: usize,
}

impl Scope {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Inclusive at both ends
    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }

    /// True if `self` lies inside `outer`
    pub fn is_within(&self, outer: &Scope) -> bool {
        outer.start <= self.start && self.end <= outer.end
    }
}

/// Whether a match was marked as a finding or as context around findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Target,
    Modifier,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Target => "target",
            Mode::Modifier => "modifier",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexicon item matched at a span of a sentence's clean text
#[derive(Debug, Clone)]
pub struct Annotation {
    id: TagId,
    item: Arc<LexiconItem>,
    span: Span,
    found_text: String,
    mode: Mode,
    groups: BTreeMap<String, String>,
}

impl Annotation {
    pub(crate) fn new(item: Arc<LexiconItem>, span: Span, found_text: &str, mode: Mode) -> Self {
        Self {
            id: TagId::next(),
            item,
            span,
            found_text: found_text.to_lowercase(),
            mode,
            groups: BTreeMap::new(),
        }
    }

    /// Attach the named capture groups of the match
    pub(crate) fn with_groups(mut self, groups: BTreeMap<String, String>) -> Self {
        self.groups = groups;
        self
    }

    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn item(&self) -> &LexiconItem {
        &self.item
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Matched text, lower-cased
    pub fn found_text(&self) -> &str {
        &self.found_text
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Named capture groups that participated in the match, by name
    pub fn groups(&self) -> &BTreeMap<String, String> {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&str> {
        self.groups.get(name).map(String::as_str)
    }

    pub fn rule(&self) -> Rule {
        self.item.rule_kind()
    }

    pub fn is_a(&self, category: &str) -> bool {
        self.item.matches_category(category)
    }

    /// Full-text range narrowed by the item's own rule
    pub fn initial_scope(&self, bounds: Scope) -> Scope {
        match self.rule() {
            Rule::Forward => Scope::new(self.span.end, bounds.end),
            Rule::Backward => Scope::new(bounds.start, self.span.start),
            _ => bounds,
        }
    }

    /// Span containment against a different annotation; never true for `self`
    pub fn encompasses(&self, other: &Annotation) -> bool {
        self.id != other.id && self.span.encompasses(&other.span)
    }

    pub fn distance(&self, other: &Annotation) -> usize {
        self.span.distance(&other.span)
    }

    /// Ordering key used wherever output must be deterministic
    pub(crate) fn sort_key(&self) -> (Span, TagId) {
        (self.span, self.id)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<id> {} </id> <phrase> {} </phrase> <category> {} </category>",
            self.id,
            self.found_text,
            self.item.category_string()
        )
    }
}
