// WHY: One owned graph per sentence. Nodes are annotations, edges are
// modifier->target (and truncated->terminator) relationships. Pipeline stages
// (mark, prune, update_scopes, apply_modifiers) mutate it in place, in order.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use regex_automata::PatternID;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{MarkupError, Result};
use crate::lexicon::LexiconItem;
use crate::regex_cache::RegexCache;
use crate::text::clean_text;

pub mod annotation;
mod prune;
mod scope;
mod xml;

pub use annotation::{Annotation, Mode, Scope, Span, TagId};

/// Kind of relationship an edge records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Source modifier applies to the destination
    Modifies,
    /// Source modifier's scope was cut short by the destination terminator
    Terminates,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Modifies => "modifies",
            EdgeKind::Terminates => "terminates",
        }
    }
}

/// Directed annotation graph for a single sentence
#[derive(Debug, Clone, Default)]
pub struct MarkupGraph {
    raw_text: String,
    clean_text: Option<String>,
    bounds: Scope,
    graph: StableDiGraph<Annotation, EdgeKind>,
    index: HashMap<TagId, NodeIndex>,
    scopes: BTreeMap<TagId, Scope>,
    scope_updated: bool,
}

impl MarkupGraph {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    /// Replace the text and discard every annotation, edge and scope
    pub fn set_raw_text(&mut self, raw_text: impl Into<String>) {
        *self = Self::new(raw_text);
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Clean text, or "" before `clean` has run
    pub fn text(&self) -> &str {
        self.clean_text.as_deref().unwrap_or("")
    }

    /// Character offset of a byte offset into the clean text
    pub fn char_offset(&self, byte_offset: usize) -> usize {
        let text = self.text();
        match text.get(..byte_offset) {
            Some(prefix) => prefix.chars().count(),
            None => text.chars().count(),
        }
    }

    pub fn is_cleaned(&self) -> bool {
        self.clean_text.is_some()
    }

    /// Working scope bound `(0, len(clean_text))`
    pub fn bounds(&self) -> Scope {
        self.bounds
    }

    pub fn scope_updated(&self) -> bool {
        self.scope_updated
    }

    /// Derive the clean text from the raw text and reset the scope bound
    pub fn clean(&mut self, strip_non_alnum: bool, strip_digits: bool) {
        let cleaned = clean_text(&self.raw_text, strip_non_alnum, strip_digits);
        self.bounds = Scope::new(0, cleaned.len());
        debug!(len = cleaned.len(), "cleaned sentence text");
        self.clean_text = Some(cleaned);
    }

    /// Tag every non-overlapping match of each item's pattern; returns the number added.
    ///
    /// Named capture groups that took part in a match are kept on its annotation.
    pub fn mark_items<'a, I>(&mut self, items: I, mode: Mode) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Arc<LexiconItem>>,
    {
        if !self.is_cleaned() {
            self.clean(false, false);
        }

        let cache = RegexCache::global();
        let mut added = 0;
        for item in items {
            let regex = cache.get_or_compile(item.literal(), item.pattern())?;
            let names: Vec<String> = regex
                .group_info()
                .pattern_names(PatternID::ZERO)
                .flatten()
                .map(str::to_string)
                .collect();

            let text = self.text();
            let matches: Vec<(Span, BTreeMap<String, String>)> = regex
                .captures_iter(text)
                .filter_map(|caps| {
                    let m = caps.get_match().filter(|m| !m.is_empty())?;
                    let groups = names
                        .iter()
                        .filter_map(|name| {
                            let group = caps.get_group_by_name(name)?;
                            Some((name.clone(), text[group.start..group.end].to_string()))
                        })
                        .collect();
                    Some((Span::new(m.start(), m.end()), groups))
                })
                .collect();

            for (span, groups) in matches {
                let found = &self.text()[span.start..span.end];
                let annotation = Annotation::new(Arc::clone(item), span, found, mode).with_groups(groups);
                debug!(id = %annotation.id(), phrase = annotation.found_text(), %mode, "marked item");
                self.insert(annotation);
                added += 1;
            }
        }
        Ok(added)
    }

    /// Add a single annotation at an explicit span, validated against the clean text
    pub fn add_annotation(&mut self, item: Arc<LexiconItem>, start: usize, end: usize, mode: Mode) -> Result<TagId> {
        if !self.is_cleaned() {
            self.clean(false, false);
        }

        let len = self.text().len();
        let found = match self.text().get(start..end) {
            Some(found) if start < end => found.to_string(),
            _ => return Err(MarkupError::InvalidSpan { start, end, len }),
        };

        let annotation = Annotation::new(item, Span::new(start, end), &found, mode);
        let id = annotation.id();
        self.insert(annotation);
        Ok(id)
    }

    fn insert(&mut self, annotation: Annotation) {
        let id = annotation.id();
        let scope = annotation.initial_scope(self.bounds);
        let node = self.graph.add_node(annotation);
        self.index.insert(id, node);
        self.scopes.insert(id, scope);
    }

    /// Insert an annotation with an already computed scope (graph unions)
    fn insert_with_scope(&mut self, annotation: Annotation, scope: Scope) {
        let id = annotation.id();
        if self.index.contains_key(&id) {
            debug!(id = %id, "node already present, skipping");
            return;
        }
        let node = self.graph.add_node(annotation);
        self.index.insert(id, node);
        self.scopes.insert(id, scope);
    }

    pub(crate) fn remove_nodes(&mut self, ids: &[TagId]) {
        for id in ids {
            if let Some(node) = self.index.remove(id) {
                if let Some(annotation) = self.graph.remove_node(node) {
                    debug!(id = %id, phrase = annotation.found_text(), "removed node");
                }
                self.scopes.remove(id);
            }
        }
    }

    /// Add (or keep) a single edge between two existing nodes
    pub(crate) fn add_edge(&mut self, from: TagId, to: TagId, kind: EdgeKind) {
        if let (Some(&a), Some(&b)) = (self.index.get(&from), self.index.get(&to)) {
            self.graph.update_edge(a, b, kind);
        }
    }

    pub(crate) fn remove_edge(&mut self, from: TagId, to: TagId) {
        if let (Some(&a), Some(&b)) = (self.index.get(&from), self.index.get(&to)) {
            if let Some(edge) = self.graph.find_edge(a, b) {
                self.graph.remove_edge(edge);
            }
        }
    }

    pub(crate) fn set_scope(&mut self, id: TagId, scope: Scope) {
        self.scopes.insert(id, scope);
    }

    /// All annotations, ordered by span then id
    pub fn annotations(&self) -> Vec<&Annotation> {
        let mut nodes: Vec<&Annotation> = self.graph.node_indices().map(|n| &self.graph[n]).collect();
        nodes.sort_by_key(|a| a.sort_key());
        nodes
    }

    /// Annotations marked with `mode`, ordered by span then id
    pub fn nodes_with_category(&self, mode: Mode) -> Vec<&Annotation> {
        self.annotations().into_iter().filter(|a| a.mode() == mode).collect()
    }

    pub fn targets(&self) -> Vec<&Annotation> {
        self.nodes_with_category(Mode::Target)
    }

    pub fn modifiers(&self) -> Vec<&Annotation> {
        self.nodes_with_category(Mode::Modifier)
    }

    pub fn annotation(&self, id: TagId) -> Option<&Annotation> {
        self.index.get(&id).map(|&n| &self.graph[n])
    }

    pub fn scope(&self, id: TagId) -> Option<Scope> {
        self.scopes.get(&id).copied()
    }

    fn neighbors(&self, id: TagId, direction: Direction, kind: Option<EdgeKind>) -> Vec<&Annotation> {
        let Some(&node) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut result: Vec<&Annotation> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| kind.map_or(true, |k| *e.weight() == k))
            .map(|e| match direction {
                Direction::Incoming => &self.graph[e.source()],
                Direction::Outgoing => &self.graph[e.target()],
            })
            .collect();
        result.sort_by_key(|a| a.sort_key());
        result
    }

    /// Nodes with an edge into `id`, ordered by span
    pub fn predecessors(&self, id: TagId) -> Vec<&Annotation> {
        self.neighbors(id, Direction::Incoming, None)
    }

    /// Nodes `id` has an edge to, ordered by span
    pub fn successors(&self, id: TagId) -> Vec<&Annotation> {
        self.neighbors(id, Direction::Outgoing, None)
    }

    /// Modifiers that apply to `id` (terminate edges excluded)
    pub fn modified_by(&self, id: TagId) -> Vec<&Annotation> {
        self.neighbors(id, Direction::Incoming, Some(EdgeKind::Modifies))
    }

    /// True if a modifier of `category` applies to `id`
    pub fn is_modified_by(&self, id: TagId, category: &str) -> bool {
        self.modified_by(id).iter().any(|m| m.is_a(category))
    }

    /// True if a modifier of ANY of `categories` applies to `id`
    pub fn is_modified_by_any<I, S>(&self, id: TagId, categories: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let categories: Vec<S> = categories.into_iter().collect();
        self.modified_by(id)
            .iter()
            .any(|m| m.item().matches_any_category(categories.iter().map(|c| c.as_ref())))
    }

    /// Number of edges touching `id` in either direction
    pub fn degree(&self, id: TagId) -> usize {
        self.index
            .get(&id)
            .map(|&n| {
                self.graph.edges_directed(n, Direction::Incoming).count()
                    + self.graph.edges_directed(n, Direction::Outgoing).count()
            })
            .unwrap_or(0)
    }

    pub fn contains_edge(&self, from: TagId, to: TagId) -> bool {
        match (self.index.get(&from), self.index.get(&to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    pub fn edge_kind(&self, from: TagId, to: TagId) -> Option<EdgeKind> {
        let (&a, &b) = (self.index.get(&from)?, self.index.get(&to)?);
        self.graph.find_edge(a, b).map(|e| self.graph[e])
    }

    /// All edges as (source, destination, kind), ordered by source then destination span
    pub fn edges(&self) -> Vec<(TagId, TagId, EdgeKind)> {
        let mut edges: Vec<(&Annotation, &Annotation, EdgeKind)> = self
            .graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], *e.weight()))
            .collect();
        edges.sort_by_key(|(a, b, _)| (a.sort_key(), b.sort_key()));
        edges.into_iter().map(|(a, b, kind)| (a.id(), b.id(), kind)).collect()
    }

    /// Number of nodes of each mode, (targets, modifiers)
    pub fn mode_counts(&self) -> (usize, usize) {
        let targets = self.graph.node_indices().filter(|&n| self.graph[n].mode() == Mode::Target).count();
        (targets, self.node_count() - targets)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whitespace tokens between two nodes; positive when `a` precedes `b`
    pub fn token_distance(&self, a: TagId, b: TagId) -> Option<isize> {
        let (first, second) = (self.annotation(a)?, self.annotation(b)?);
        let (left, right, direction) = if first.sort_key() < second.sort_key() {
            (first, second, 1)
        } else {
            (second, first, -1)
        };

        let between = self.text().get(left.span().end..right.span().start).unwrap_or("");
        Some(between.split_whitespace().count() as isize * direction)
    }

    /// Add every node, scope and edge of `other` into `self`; ids already present are kept as is
    pub fn union(&mut self, other: &MarkupGraph) {
        for annotation in other.annotations() {
            let scope = other.scope(annotation.id()).unwrap_or(other.bounds);
            self.insert_with_scope(annotation.clone(), scope);
        }
        for (from, to, kind) in other.edges() {
            self.add_edge(from, to, kind);
        }
    }
}

impl fmt::Display for MarkupGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "_".repeat(42);
        writeln!(f, "{}", rule)?;
        writeln!(f, "rawText: {}", self.raw_text)?;
        writeln!(f, "cleanedText: {}", self.text())?;
        for target in self.targets() {
            writeln!(f, "{}", "*".repeat(32))?;
            writeln!(f, "TARGET: {}", target)?;
            for modifier in self.modified_by(target.id()) {
                writeln!(f, "----MODIFIED BY: {}", modifier)?;
                for second in self.predecessors(modifier.id()) {
                    writeln!(f, "--------MODIFIED BY: {}", second)?;
                }
            }
        }
        writeln!(f, "{}", rule)
    }
}
