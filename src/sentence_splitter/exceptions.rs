// WHY: Tokens that end in sentence punctuation but do not end a sentence.
// Matching is exact on the whitespace token, so case variants are stored explicitly.

use std::collections::HashSet;

/// Default exception tokens common in clinical English
pub const DEFAULT_EXCEPTIONS: &[&str] = &[
    ".", "Dr.", "Mr.", "Mrs.", "Ms.", "M.D.", "Ph.D.", "D.M.D.", "R.N.", "B.A.", "A.B.",
    "B.S.", "M.S.", "q.", "viz.", "e.g.",
];

/// Exact-match set of non-terminating tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionSet {
    terms: HashSet<String>,
}

impl ExceptionSet {
    /// Empty set; every token ending in `.?!` terminates
    pub fn new() -> Self {
        Self::default()
    }

    /// Default exceptions, optionally with upper/lower case variants
    pub fn with_defaults(use_case_variants: bool) -> Self {
        let mut set = Self::new();
        set.add(DEFAULT_EXCEPTIONS.iter().copied(), use_case_variants);
        set
    }

    pub fn add<I, S>(&mut self, terms: I, add_case_variants: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref();
            if add_case_variants {
                self.terms.insert(term.to_lowercase());
                self.terms.insert(term.to_uppercase());
            }
            self.terms.insert(term.to_string());
        }
    }

    pub fn remove<I, S>(&mut self, terms: I, remove_case_variants: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref();
            self.terms.remove(term);
            if remove_case_variants {
                self.terms.remove(&term.to_lowercase());
                self.terms.remove(&term.to_uppercase());
            }
        }
    }

    /// Exact (case-sensitive) membership
    pub fn contains(&self, token: &str) -> bool {
        self.terms.contains(token)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_with_case_variants() {
        let set = ExceptionSet::with_defaults(true);
        for term in ["Dr.", "dr.", "DR.", "M.D.", "m.d.", "e.g.", "E.G.", "."] {
            assert!(set.contains(term), "missing {}", term);
        }
        assert!(!set.contains("Prof."));
    }

    #[test]
    fn test_defaults_without_case_variants() {
        let set = ExceptionSet::with_defaults(false);
        assert_eq!(set.len(), DEFAULT_EXCEPTIONS.len());
        assert!(set.contains("Dr."));
        assert!(!set.contains("dr."));
    }

    #[test]
    fn test_remove_with_case_variants() {
        let mut set = ExceptionSet::with_defaults(true);
        set.remove(["Ph.D."], true);
        assert!(!set.contains("Ph.D."));
        assert!(!set.contains("ph.d."));
        assert!(!set.contains("PH.D."));
    }
}
