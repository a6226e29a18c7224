// WHY: End-to-end pipeline: split a report into sentences, mark up each sentence
// through a fixed sequence of stages, then collect the markups into a Document.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::document::Document;
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::markup::{Annotation, MarkupGraph, Mode};
use crate::sentence_splitter::SentenceSplitter;

/// Options applied to every sentence markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Replace non-word characters with spaces before matching
    pub strip_non_alnum: bool,
    /// Remove digits before matching
    pub strip_digits: bool,
    /// Lower-case the raw sentence text
    pub lowercase: bool,
    /// Annotations of this category are dropped after overlap pruning
    pub exclusion_category: String,
    /// Drop modifiers that ended up with no relationships
    pub prune_inactive: bool,
    /// Keep only the closest target per modifier
    pub keep_closest: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            strip_non_alnum: false,
            strip_digits: false,
            lowercase: false,
            exclusion_category: "exclusion".to_string(),
            prune_inactive: true,
            keep_closest: false,
        }
    }
}

/// Marks up sentences and documents against a pair of lexicons
#[derive(Debug, Clone)]
pub struct Annotator {
    targets: Arc<Lexicon>,
    modifiers: Arc<Lexicon>,
    config: AnnotatorConfig,
    splitter: SentenceSplitter,
}

impl Annotator {
    pub fn new(targets: Lexicon, modifiers: Lexicon) -> Self {
        Self {
            targets: Arc::new(targets),
            modifiers: Arc::new(modifiers),
            config: AnnotatorConfig::default(),
            splitter: SentenceSplitter::new(),
        }
    }

    pub fn with_config(mut self, config: AnnotatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_splitter(mut self, splitter: SentenceSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn splitter(&self) -> &SentenceSplitter {
        &self.splitter
    }

    pub fn targets(&self) -> &Lexicon {
        &self.targets
    }

    pub fn modifiers(&self) -> &Lexicon {
        &self.modifiers
    }

    /// Run the full sentence pipeline and return the finished graph
    pub fn markup_sentence(&self, text: &str) -> Result<MarkupGraph> {
        let mut markup = MarkupGraph::default();
        if self.config.lowercase {
            markup.set_raw_text(text.to_lowercase());
        } else {
            markup.set_raw_text(text);
        }

        markup.clean(self.config.strip_non_alnum, self.config.strip_digits);
        markup.mark_items(self.modifiers.as_ref(), Mode::Modifier)?;
        markup.mark_items(self.targets.as_ref(), Mode::Target)?;
        markup.prune_overlapping();
        markup.drop_marks(&self.config.exclusion_category);
        markup.apply_modifiers();
        markup.prune_self_modifying();
        if self.config.prune_inactive {
            markup.drop_inactive_modifiers();
        }
        if self.config.keep_closest {
            markup.keep_closest_relationship();
        }

        debug!(
            nodes = markup.node_count(),
            edges = markup.edge_count(),
            "sentence markup complete"
        );
        Ok(markup)
    }

    /// Split `text` into sentences and mark each one up, in order, under the root section
    pub fn markup_document(&self, text: &str) -> Result<Document> {
        let mut document = Document::new();
        for sentence in self.splitter.split(text) {
            document.add_markup(self.markup_sentence(&sentence)?);
        }
        info!(sentences = document.sentence_count(), "document markup complete");
        Ok(document)
    }

    /// Flatten a document into per-sentence target findings
    pub fn summarize(&self, document: &Document) -> DocumentSummary {
        let mut sentences = Vec::new();
        for section in document.sections() {
            for (number, markup) in document.section_markups(section).unwrap_or_default() {
                sentences.push(SentenceSummary::from_markup(number, section, markup));
            }
        }
        sentences.sort_by_key(|s| s.number);

        let graph = document.document_graph();
        let (target_count, modifier_count) = graph.mode_counts();
        DocumentSummary {
            sentences,
            target_count,
            modifier_count,
            relationship_count: graph.edge_count(),
        }
    }
}

/// Serializable view of a marked-up document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub sentences: Vec<SentenceSummary>,
    pub target_count: usize,
    pub modifier_count: usize,
    pub relationship_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceSummary {
    pub number: usize,
    pub section: String,
    pub text: String,
    pub targets: Vec<TargetSummary>,
}

impl SentenceSummary {
    fn from_markup(number: usize, section: &str, markup: &MarkupGraph) -> Self {
        let targets = markup
            .targets()
            .into_iter()
            .map(|target| TargetSummary {
                phrase: target.found_text().to_string(),
                categories: target.item().categories().to_vec(),
                span: (markup.char_offset(target.span().start), markup.char_offset(target.span().end)),
                modifiers: markup
                    .modified_by(target.id())
                    .into_iter()
                    .map(ModifierSummary::from)
                    .collect(),
            })
            .collect();

        Self {
            number,
            section: section.to_string(),
            text: markup.text().to_string(),
            targets,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSummary {
    pub phrase: String,
    pub categories: Vec<String>,
    pub span: (usize, usize),
    pub modifiers: Vec<ModifierSummary>,
}

impl TargetSummary {
    /// True if any modifier of this target carries `category`
    pub fn is_modified_by(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        self.modifiers.iter().any(|m| m.categories.contains(&category))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierSummary {
    pub phrase: String,
    pub categories: Vec<String>,
    pub rule: String,
}

impl From<&Annotation> for ModifierSummary {
    fn from(modifier: &Annotation) -> Self {
        Self {
            phrase: modifier.found_text().to_string(),
            categories: modifier.item().categories().to_vec(),
            rule: modifier.rule().to_string(),
        }
    }
}
