// WHY: Typed failures for the markup core; I/O layers wrap these in anyhow

use thiserror::Error;

/// Errors raised by the markup core at its API boundaries
#[derive(Error, Debug)]
pub enum MarkupError {
    /// Lexicon row is missing its literal or its category list
    #[error("malformed lexicon item: {reason}")]
    MalformedItem {
        /// What was missing or invalid
        reason: String,
    },

    /// Lexicon pattern does not compile
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern text as supplied (or derived from the literal)
        pattern: String,
        /// Underlying regex build failure
        #[source]
        source: Box<regex_automata::meta::BuildError>,
    },

    /// Span is empty, inverted, or outside the clean text
    #[error("invalid span ({start}, {end}) for text of length {len}")]
    InvalidSpan {
        /// Span start byte offset
        start: usize,
        /// Span end byte offset
        end: usize,
        /// Length of the clean text the span was checked against
        len: usize,
    },

    /// Section label used before it was inserted into the document
    #[error("unknown section '{label}'")]
    UnknownSection {
        /// The label that was looked up
        label: String,
    },
}

/// Result alias for markup core operations
pub type Result<T> = std::result::Result<T, MarkupError>;
