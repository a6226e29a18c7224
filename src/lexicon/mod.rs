// WHY: Lexicon items are the immutable rules the markup engine matches against text.
// Rule strings are normalized into a closed enum once, at construction.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::error::{MarkupError, Result};
use crate::regex_cache::RegexCache;

pub mod loader;

/// Directional behaviour of a modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    /// No direction; the item never modifies anything
    None,
    /// Applies to text after the match
    Forward,
    /// Applies to text before the match
    Backward,
    /// Applies in both directions
    Bidirectional,
    /// Truncates the scope of other modifiers, never modifies targets
    Terminate,
}

impl Rule {
    /// Map a raw rule string by case-insensitive containment ("Forward,Other" is Forward)
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() {
            Rule::None
        } else if lowered.contains("terminate") {
            Rule::Terminate
        } else if lowered.contains("bidirectional") {
            Rule::Bidirectional
        } else if lowered.contains("forward") {
            Rule::Forward
        } else if lowered.contains("backward") {
            Rule::Backward
        } else {
            warn!(rule = raw, "unrecognized rule string, treating as no rule");
            Rule::None
        }
    }

    /// True for rules whose scope extends past the end of the match
    pub fn looks_forward(self) -> bool {
        matches!(self, Rule::Forward | Rule::Bidirectional)
    }

    /// True for rules whose scope extends before the start of the match
    pub fn looks_backward(self) -> bool {
        matches!(self, Rule::Backward | Rule::Bidirectional)
    }

    /// True when a modifier with this rule may link to targets
    pub fn modifies_targets(self) -> bool {
        !matches!(self, Rule::None | Rule::Terminate)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rule::None => "",
            Rule::Forward => "forward",
            Rule::Backward => "backward",
            Rule::Bidirectional => "bidirectional",
            Rule::Terminate => "terminate",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable lexicon rule: literal, categories, match pattern and direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconItem {
    literal: String,
    categories: Vec<String>,
    pattern: String,
    rule: Rule,
}

impl LexiconItem {
    /// Build an item from the four lexicon columns.
    ///
    /// An empty `regex` defaults to `\b<literal>\b`. The pattern is compiled (and cached)
    /// here so a bad pattern is rejected before any text is marked.
    pub fn create(literal: &str, category_csv: &str, regex: &str, rule: &str) -> Result<Self> {
        if literal.trim().is_empty() {
            return Err(MarkupError::MalformedItem {
                reason: "empty literal".to_string(),
            });
        }

        let mut categories: Vec<String> = Vec::new();
        for category in category_csv.split(',') {
            let category = category.trim().to_lowercase();
            if !category.is_empty() && !categories.contains(&category) {
                categories.push(category);
            }
        }
        if categories.is_empty() {
            return Err(MarkupError::MalformedItem {
                reason: format!("no category for literal '{}'", literal),
            });
        }

        let pattern = if regex.is_empty() {
            format!(r"\b{}\b", literal)
        } else {
            regex.to_string()
        };
        RegexCache::global().get_or_compile(literal, &pattern)?;

        Ok(Self {
            literal: literal.to_string(),
            categories,
            pattern,
            rule: Rule::parse(rule),
        })
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Lower-cased categories in lexicon order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Categories joined with '_' (display and XML form)
    pub fn category_string(&self) -> String {
        self.categories.join("_")
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn rule_kind(&self) -> Rule {
        self.rule
    }

    /// Case-insensitive membership test for a single category
    pub fn matches_category(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.categories.iter().any(|c| *c == query)
    }

    /// True if ANY of `queries` is one of this item's categories
    pub fn matches_any_category<I, S>(&self, queries: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        queries.into_iter().any(|q| self.matches_category(q.as_ref()))
    }

    /// True if the two items have at least one category in common
    pub fn shares_category(&self, other: &LexiconItem) -> bool {
        self.matches_any_category(&other.categories)
    }

    /// True if both items carry exactly the same category set
    pub fn same_categories(&self, other: &LexiconItem) -> bool {
        self.categories.len() == other.categories.len()
            && self.categories.iter().all(|c| other.categories.contains(c))
    }
}

impl fmt::Display for LexiconItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "literal<<{}>>; category<<{}>>; re<<{}>>; rule<<{}>>",
            self.literal,
            self.categories.join(", "),
            self.pattern,
            self.rule
        )
    }
}

/// Ordered, shareable collection of lexicon items
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    items: Vec<Arc<LexiconItem>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(literal, category_csv, regex, rule)` tuples, failing on the first bad row
    pub fn from_rows<'a, I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str, &'a str)>,
    {
        let mut lexicon = Self::new();
        for (literal, categories, regex, rule) in rows {
            lexicon.push(LexiconItem::create(literal, categories, regex, rule)?);
        }
        Ok(lexicon)
    }

    pub fn push(&mut self, item: LexiconItem) {
        self.items.push(Arc::new(item));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<LexiconItem>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Lexicon {
    type Item = &'a Arc<LexiconItem>;
    type IntoIter = std::slice::Iter<'a, Arc<LexiconItem>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<LexiconItem> for Lexicon {
    fn from_iter<T: IntoIterator<Item = LexiconItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pe_item() -> LexiconItem {
        LexiconItem::create(
            "pulmonary embolism",
            "PULMONARY_EMBOLISM",
            r"pulmonary\s(artery )?(embol[a-z]+)",
            "",
        )
        .unwrap()
    }

    fn negation_item() -> LexiconItem {
        LexiconItem::create("no gross evidence of", "PROBABLE_NEGATED_EXISTENCE", "", "forward").unwrap()
    }

    #[test]
    fn test_item_fields() {
        let item = negation_item();
        assert_eq!(item.literal(), "no gross evidence of");
        assert_eq!(item.categories(), ["probable_negated_existence"]);
        assert_eq!(item.rule_kind(), Rule::Forward);
        assert_eq!(item.pattern(), r"\bno gross evidence of\b");

        let item = pe_item();
        assert_eq!(item.pattern(), r"pulmonary\s(artery )?(embol[a-z]+)");
        assert_eq!(item.rule_kind(), Rule::None);
    }

    #[test]
    fn test_category_matching_is_case_insensitive() {
        let item = pe_item();
        assert!(item.matches_category("pulmonary_embolism"));
        assert!(item.matches_category("PULMONARY_EMBOLISM"));
        assert!(item.matches_category(" Pulmonary_Embolism "));
        assert!(!item.matches_category("pneumonia"));
    }

    #[test]
    fn test_any_category_uses_or_semantics() {
        let item = LexiconItem::create("history of", "historical, indication", "", "forward").unwrap();
        assert_eq!(item.categories(), ["historical", "indication"]);
        assert!(item.matches_any_category(["negated", "HISTORICAL"]));
        assert!(!item.matches_any_category(["negated", "probable"]));
        assert!(!item.matches_any_category(Vec::<String>::new()));
    }

    #[test]
    fn test_rule_parsing_by_containment() {
        assert_eq!(Rule::parse("Forward"), Rule::Forward);
        assert_eq!(Rule::parse("forward,something"), Rule::Forward);
        assert_eq!(Rule::parse("BACKWARD"), Rule::Backward);
        assert_eq!(Rule::parse("bidirectional"), Rule::Bidirectional);
        assert_eq!(Rule::parse("terminate"), Rule::Terminate);
        assert_eq!(Rule::parse(""), Rule::None);
        assert_eq!(Rule::parse("sideways"), Rule::None);
    }

    #[test]
    fn test_malformed_items_rejected() {
        assert!(matches!(
            LexiconItem::create("", "negated", "", "forward"),
            Err(MarkupError::MalformedItem { .. })
        ));
        assert!(matches!(
            LexiconItem::create("no", " , ", "", "forward"),
            Err(MarkupError::MalformedItem { .. })
        ));
        assert!(matches!(
            LexiconItem::create("bad", "x", "(oops", ""),
            Err(MarkupError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_shared_and_equal_categories() {
        let a = LexiconItem::create("no", "negated_existence,probable", "", "forward").unwrap();
        let b = LexiconItem::create("but", "probable", "", "terminate").unwrap();
        let c = LexiconItem::create("denies", "probable,negated_existence", "", "forward").unwrap();
        assert!(a.shares_category(&b));
        assert!(!a.same_categories(&b));
        assert!(a.same_categories(&c));
    }

    #[test]
    fn test_lexicon_from_rows() {
        let lexicon = Lexicon::from_rows([
            ("pneumonia", "PNEUMONIA", "", ""),
            ("no", "DEFINITE_NEGATED_EXISTENCE", "", "forward"),
        ])
        .unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.iter().nth(1).unwrap().rule_kind(), Rule::Forward);

        assert!(Lexicon::from_rows([("", "x", "", "")]).is_err());
    }
}
