pub mod annotator;
pub mod batch;
pub mod document;
pub mod error;
pub mod lexicon;
pub mod markup;
pub mod regex_cache;
pub mod sentence_splitter;
pub mod text;

// Re-export main types for convenient access
pub use annotator::{Annotator, AnnotatorConfig, DocumentSummary};
pub use document::Document;
pub use error::{MarkupError, Result};
pub use lexicon::{Lexicon, LexiconItem, Rule};
pub use markup::{Annotation, EdgeKind, MarkupGraph, Mode, Scope, Span, TagId};
pub use sentence_splitter::SentenceSplitter;

// Re-export batch processing types for the CLI and benchmarks
pub use batch::{process_report_files, process_reports, BatchConfig, ProcessedReport, Report, ReportStats};
