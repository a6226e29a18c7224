// WHY: Standalone text scrubbing shared by sentence markup and XML serialization

/// Clean raw sentence text for matching.
///
/// Non-word characters become spaces (only with `strip_non_alnum`), whitespace runs
/// collapse to a single space, then digits are removed (only with `strip_digits`).
/// Leading and trailing whitespace is collapsed, not trimmed, so offsets stay predictable.
pub fn clean_text(raw: &str, strip_non_alnum: bool, strip_digits: bool) -> String {
    let mut result = String::with_capacity(raw.len());
    clean_text_into(raw, strip_non_alnum, strip_digits, &mut result);
    result
}

/// Clean into a supplied buffer to avoid allocation in batch loops
pub fn clean_text_into(raw: &str, strip_non_alnum: bool, strip_digits: bool, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(raw.len());

    let mut prev_was_space = false;
    for ch in raw.chars() {
        let ch = if strip_non_alnum && !is_word_char(ch) { ' ' } else { ch };

        if ch.is_whitespace() {
            if !prev_was_space {
                buffer.push(' ');
                prev_was_space = true;
            }
        } else {
            buffer.push(ch);
            prev_was_space = false;
        }
    }

    if strip_digits {
        buffer.retain(|c| !c.is_numeric());
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Escape `&` and `<` for embedding text in XML element content
pub fn xml_scrub(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(clean_text("no  acute\t\tdisease\r\n.", false, false), "no acute disease .");
        assert_eq!(clean_text("  padded  ", false, false), " padded ");
        assert_eq!(clean_text("", false, false), "");
    }

    #[test]
    fn test_strip_non_alnum() {
        let sentence = "IMPRESSION: 1. LIMITED STUDY DEMONSTRATING NO GROSS EVIDENCE OF SIGNIFICANT PULMONARY EMBOLISM.";
        let cleaned = clean_text(sentence, true, false);
        assert_eq!(cleaned.rfind('.'), None);
        assert!(cleaned.starts_with("IMPRESSION 1 LIMITED"));
        assert!(cleaned.ends_with("EMBOLISM "));
    }

    #[test]
    fn test_strip_non_alnum_preserves_unicode_letters() {
        let sentence = "kanso <Diagnosis>**diabetes**</Diagnosis> utesl\u{f6}t eller diabetes";
        let cleaned = clean_text(sentence, true, false);
        let char_index = cleaned.chars().position(|c| c == '\u{f6}');
        assert_eq!(char_index, Some(40));
    }

    #[test]
    fn test_strip_digits() {
        assert_eq!(clean_text("grade 3 lesion", false, true), "grade  lesion");
        assert_eq!(clean_text("T2 signal", false, true), "T signal");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let samples = [
            "  Mixed\t\n\twhitespace\r\n\there. ",
            "IMPRESSION: 1. NO PE!!",
            "Unicode\n\u{4e16}\u{754c}\r\nwith \u{e9}mojis \u{1f980}.",
        ];
        for sample in samples {
            for strip in [false, true] {
                let once = clean_text(sample, strip, false);
                assert_eq!(clean_text(&once, strip, false), once, "not idempotent for {:?}", sample);
            }
        }
    }

    #[test]
    fn test_clean_into_reuses_buffer() {
        let mut buffer = String::new();
        clean_text_into("one\n\ntwo", false, false, &mut buffer);
        assert_eq!(buffer, "one two");
        clean_text_into("three", false, false, &mut buffer);
        assert_eq!(buffer, "three");
    }

    #[test]
    fn test_xml_scrub() {
        assert_eq!(xml_scrub("a < b & c > d"), "a &lt; b &amp; c > d");
    }
}
