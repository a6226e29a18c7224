// WHY: Lexicons ship as delimited text (tsv/csv with a header row); rows are
// validated here so the markup core only ever sees well-formed items

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

use super::{Lexicon, LexiconItem};

/// Parse delimited lexicon content: literal, categories, [regex], [rule].
///
/// Rows with fewer than two fields, or whose first field starts with `#`, are skipped.
/// Rows the core would reject (empty literal or category) are skipped with a warning.
pub fn parse_delimited(content: &str, delimiter: char, header_rows: usize) -> Result<Lexicon> {
    let mut lexicon = Lexicon::new();

    for (line_no, line) in content.lines().enumerate().skip(header_rows) {
        let line = line.trim_end_matches('\r');
        let fields = split_fields(line, delimiter);
        if fields.len() < 2 || fields[0].starts_with('#') {
            continue;
        }

        let literal = fields[0].trim();
        let categories = fields[1].as_str();
        let regex = fields.get(2).map(|r| r.trim()).unwrap_or("");
        let rule = fields.get(3).map(|r| r.trim()).unwrap_or("");

        if literal.is_empty() || categories.trim().is_empty() {
            warn!(line = line_no + 1, "skipping lexicon row without literal or category");
            continue;
        }

        let item = LexiconItem::create(literal, categories, regex, rule)
            .with_context(|| format!("Invalid lexicon row at line {}", line_no + 1))?;
        lexicon.push(item);
    }

    debug!("Parsed {} lexicon items", lexicon.len());
    Ok(lexicon)
}

/// Split one row on `delimiter`, honouring double-quoted fields.
///
/// A quote is only special at the start of a field; inside a quoted field `""` is a
/// literal quote and delimiters are kept.
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    let mut at_field_start = true;

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
        } else if ch == delimiter {
            fields.push(std::mem::take(&mut field));
            at_field_start = true;
            continue;
        } else if ch == '"' && at_field_start {
            in_quotes = true;
        } else {
            field.push(ch);
        }
        at_field_start = false;
    }

    fields.push(field);
    fields
}

/// Parse lexicon content without a header, choosing tab or comma as the delimiter
pub fn parse_auto(content: &str) -> Result<Lexicon> {
    let delimiter = if content.contains('\t') { '\t' } else { ',' };
    parse_delimited(content, delimiter, 0)
}

impl Lexicon {
    /// See [`parse_delimited`]
    pub fn from_delimited(content: &str, delimiter: char, header_rows: usize) -> Result<Self> {
        parse_delimited(content, delimiter, header_rows)
    }

    /// See [`parse_auto`]
    pub fn from_str_auto(content: &str) -> Result<Self> {
        parse_auto(content)
    }
}

/// Delimiter implied by a lexicon file's extension
fn delimiter_for(path: &Path) -> Result<char> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("tsv") => Ok('\t'),
        Some("csv") => Ok(','),
        _ => anyhow::bail!("Unsupported lexicon file type: {}", path.display()),
    }
}

/// Read a `.tsv` or `.csv` lexicon file with one header row
pub fn read_lexicon(path: impl AsRef<Path>) -> Result<Lexicon> {
    let path = path.as_ref();
    let delimiter = delimiter_for(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lexicon {}", path.display()))?;

    let lexicon = parse_delimited(&content, delimiter, 1)?;
    info!("Loaded {} lexicon items from {}", lexicon.len(), path.display());
    Ok(lexicon)
}

/// Async variant of [`read_lexicon`] for the CLI and batch drivers
pub async fn read_lexicon_async(path: impl AsRef<Path>) -> Result<Lexicon> {
    let path = path.as_ref();
    let delimiter = delimiter_for(path)?;
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read lexicon {}", path.display()))?;

    let lexicon = parse_delimited(&content, delimiter, 1)?;
    info!("Loaded {} lexicon items from {}", lexicon.len(), path.display());
    Ok(lexicon)
}
