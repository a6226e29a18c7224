// WHY: Clinical reports are split on whitespace tokens ending in `.?!`, with an
// exception list for abbreviations such as "Dr." and "M.D." that must not split

use tracing::debug;

pub mod exceptions;

pub use exceptions::{ExceptionSet, DEFAULT_EXCEPTIONS};

/// Exception-aware sentence boundary detector
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    exceptions: ExceptionSet,
}

impl SentenceSplitter {
    /// Splitter with the default exceptions and their case variants
    pub fn new() -> Self {
        Self::with_defaults(true)
    }

    /// Splitter with the default exceptions, optionally adding case variants
    pub fn with_defaults(use_case_variants: bool) -> Self {
        Self {
            exceptions: ExceptionSet::with_defaults(use_case_variants),
        }
    }

    /// Splitter with no exceptions at all
    pub fn empty() -> Self {
        Self {
            exceptions: ExceptionSet::new(),
        }
    }

    pub fn exceptions(&self) -> &ExceptionSet {
        &self.exceptions
    }

    pub fn add_exceptions<I, S>(&mut self, terms: I, add_case_variants: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exceptions.add(terms, add_case_variants);
    }

    pub fn remove_exceptions<I, S>(&mut self, terms: I, remove_case_variants: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exceptions.remove(terms, remove_case_variants);
    }

    /// Split `text` into sentences of single-space-joined tokens.
    ///
    /// A token ending in `.`, `?` or `!` closes the sentence unless the whole token is an
    /// exception. Tokens left over without a terminator form a final sentence.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for token in text.split_whitespace() {
            current.push(token);
            if token.ends_with(['.', '?', '!']) && !self.exceptions.contains(token) {
                sentences.push(current.join(" "));
                current.clear();
            }
        }

        if !current.is_empty() {
            sentences.push(current.join(" "));
        }

        debug!("Split {} characters into {} sentences", text.len(), sentences.len());
        sentences
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split() {
        let splitter = SentenceSplitter::new();
        let sentences = splitter.split("No acute disease. Is there effusion? Yes!");
        assert_eq!(sentences, vec!["No acute disease.", "Is there effusion?", "Yes!"]);
    }

    #[test]
    fn test_exception_tokens_do_not_split() {
        let splitter = SentenceSplitter::new();
        let sentences = splitter.split("Seen by Dr. Smith, M.D. today. Follow up q. week.");
        assert_eq!(sentences, vec!["Seen by Dr. Smith, M.D. today.", "Follow up q. week."]);
    }

    #[test]
    fn test_trailing_number_terminates() {
        let splitter = SentenceSplitter::new();
        let text = "This is a sentence that does not end with a number. But this sentence ends with 1.";
        assert_eq!(splitter.split(text).len(), 2);

        let text = "This is a sentence that does not end with a number. But this sentence ends with 1. So this should be recognized as a third sentence.";
        assert_eq!(splitter.split(text).len(), 3);
    }

    #[test]
    fn test_decimal_number_does_not_split() {
        let splitter = SentenceSplitter::new();
        let text = "This is a sentence with a numeric value equal to 1.43 and should not be split into two parts.";
        assert_eq!(splitter.split(text), vec![text]);
    }

    #[test]
    fn test_unterminated_remainder_and_whitespace() {
        let splitter = SentenceSplitter::new();
        assert_eq!(splitter.split("Findings:\n\n  stable   nodule"), vec!["Findings: stable nodule"]);
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n").is_empty());
    }

    #[test]
    fn test_lone_period_is_exception_by_default() {
        let splitter = SentenceSplitter::new();
        assert_eq!(splitter.split("No effusion . No edema."), vec!["No effusion . No edema."]);

        let splitter = SentenceSplitter::empty();
        assert_eq!(splitter.split("No effusion . No edema."), vec!["No effusion .", "No edema."]);
    }

    #[test]
    fn test_split_is_restartable() {
        let splitter = SentenceSplitter::new();
        let text = "One. Two. Three";
        assert_eq!(splitter.split(text), splitter.split(text));
    }
}
