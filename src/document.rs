// WHY: A report is an ordered set of sentence markups grouped into sections.
// Sentence numbers only grow, and the unioned document graph is rebuilt lazily.

use std::cell::OnceCell;
use tracing::debug;

use crate::error::{MarkupError, Result};
use crate::markup::MarkupGraph;
use crate::text::xml_scrub;

/// Label of the section every document starts with
pub const ROOT_SECTION: &str = "document";

#[derive(Debug, Clone)]
struct Section {
    label: String,
    parent: Option<usize>,
}

#[derive(Debug, Clone)]
struct SentenceEntry {
    section: usize,
    number: usize,
    markup: MarkupGraph,
}

/// Ordered collection of sentence markups with section provenance
#[derive(Debug, Clone)]
pub struct Document {
    sections: Vec<Section>,
    sentences: Vec<SentenceEntry>,
    root: usize,
    current_parent: usize,
    next_sentence: usize,
    document_graph: OnceCell<MarkupGraph>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            sections: vec![Section {
                label: ROOT_SECTION.to_string(),
                parent: None,
            }],
            sentences: Vec::new(),
            root: 0,
            current_parent: 0,
            next_sentence: 0,
            document_graph: OnceCell::new(),
        }
    }

    fn section_index(&self, label: &str) -> Result<usize> {
        self.sections
            .iter()
            .position(|s| s.label == label)
            .ok_or_else(|| MarkupError::UnknownSection {
                label: label.to_string(),
            })
    }

    /// Add a section under the current parent.
    ///
    /// `set_root` makes it the document root (no parent) and the current parent;
    /// `set_parent` makes it the parent for subsequent sections and markups.
    /// Re-inserting an existing label only updates the root and current parent.
    pub fn insert_section(&mut self, label: &str, set_parent: bool, set_root: bool) {
        let index = match self.section_index(label) {
            Ok(index) => index,
            Err(_) => {
                let parent = if set_root { None } else { Some(self.current_parent) };
                self.sections.push(Section {
                    label: label.to_string(),
                    parent,
                });
                debug!(label, "inserted section");
                self.sections.len() - 1
            }
        };

        if set_root {
            self.sections[index].parent = None;
            self.root = index;
        }
        if set_parent || set_root {
            self.current_parent = index;
        }
    }

    /// Make an existing section the parent of subsequent markups
    pub fn set_parent(&mut self, label: &str) -> Result<()> {
        self.current_parent = self.section_index(label)?;
        Ok(())
    }

    pub fn current_parent(&self) -> &str {
        &self.sections[self.current_parent].label
    }

    pub fn root(&self) -> &str {
        &self.sections[self.root].label
    }

    /// Parent label of `label`, `None` for a root
    pub fn section_parent(&self, label: &str) -> Result<Option<&str>> {
        let index = self.section_index(label)?;
        Ok(self.sections[index].parent.map(|p| self.sections[p].label.as_str()))
    }

    /// Section labels, root first, then in insertion order
    pub fn sections(&self) -> Vec<&str> {
        std::iter::once(self.root)
            .chain((0..self.sections.len()).filter(|&i| i != self.root))
            .map(|i| self.sections[i].label.as_str())
            .collect()
    }

    /// Attach `markup` to the current parent with the next sentence number
    pub fn add_markup(&mut self, markup: MarkupGraph) -> usize {
        let number = self.next_sentence;
        self.next_sentence += 1;
        self.sentences.push(SentenceEntry {
            section: self.current_parent,
            number,
            markup,
        });
        self.document_graph.take();
        number
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn retrieve_markup(&self, sentence_number: usize) -> Option<&MarkupGraph> {
        self.sentences
            .iter()
            .find(|s| s.number == sentence_number)
            .map(|s| &s.markup)
    }

    /// All markups as (sentence number, markup), in sentence order
    pub fn markups(&self) -> impl Iterator<Item = (usize, &MarkupGraph)> {
        self.sentences.iter().map(|s| (s.number, &s.markup))
    }

    /// Markups attached directly to `label`, in sentence order
    pub fn section_markups(&self, label: &str) -> Result<Vec<(usize, &MarkupGraph)>> {
        let index = self.section_index(label)?;
        let mut markups: Vec<(usize, &MarkupGraph)> = self
            .sentences
            .iter()
            .filter(|s| s.section == index)
            .map(|s| (s.number, &s.markup))
            .collect();
        markups.sort_by_key(|(number, _)| *number);
        Ok(markups)
    }

    /// Clean texts of the section's sentences joined by single spaces
    pub fn section_text(&self, label: &str) -> Result<String> {
        let texts: Vec<&str> = self
            .section_markups(label)?
            .into_iter()
            .map(|(_, markup)| markup.text())
            .collect();
        Ok(texts.join(" "))
    }

    /// Union of every sentence graph, in sentence order; empty for an empty document
    pub fn compute_document_graph(&self) -> MarkupGraph {
        let mut graph = MarkupGraph::default();
        if self.sentences.is_empty() {
            debug!("document has no sentences; returning empty graph");
            return graph;
        }

        for (_, markup) in self.markups() {
            graph.union(markup);
        }
        debug!(
            sentences = self.sentences.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "computed document graph"
        );
        graph
    }

    /// Cached document graph, recomputed after any `add_markup`
    pub fn document_graph(&self) -> &MarkupGraph {
        self.document_graph.get_or_init(|| self.compute_document_graph())
    }

    /// Reconstructed document text followed by per-section sentence blocks.
    ///
    /// Sentence offsets count characters of the reconstructed text.
    pub fn to_xml(&self) -> String {
        let sections = self.sections();

        let mut document_text = String::new();
        let mut offsets: Vec<(usize, usize)> = Vec::new();
        let mut char_len = 0;
        for label in &sections {
            for (number, markup) in self.section_markups(label).unwrap_or_default() {
                offsets.push((number, char_len));
                document_text.push_str(markup.text());
                document_text.push(' ');
                char_len += markup.text().chars().count() + 1;
            }
        }

        let mut xml = String::from("<ConTextDocument>\n");
        xml.push_str(&xml_scrub(&document_text));
        xml.push('\n');
        for label in &sections {
            xml.push_str(&format!("<section>\n<sectionLabel> {} </sectionLabel>\n", xml_scrub(label)));
            for (number, markup) in self.section_markups(label).unwrap_or_default() {
                let offset = offsets
                    .iter()
                    .find(|(n, _)| *n == number)
                    .map(|(_, offset)| *offset)
                    .unwrap_or(0);
                xml.push_str(&format!(
                    "<sentence>\n<sentenceNumber> {} </sentenceNumber>\n<sentenceOffset> {} </sentenceOffset>\n</sentence>\n",
                    number, offset
                ));
                xml.push_str(&markup.to_xml());
            }
            xml.push_str("</section>\n");
        }
        xml.push_str("</ConTextDocument>\n");
        xml
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
