//! Deterministic cleanup of extracted PDF text

use once_cell::sync::Lazy;
use regex::Regex;

/// Lines holding only a page number, optionally as "Page N" or "Page N of M"
static PAGE_NUMBER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:page[ \t]*)?\d+(?:[ \t]*(?:of|/)[ \t]*\d+)?[ \t]*$")
        .expect("page number pattern is valid")
});
static HYPHEN_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\n").expect("hyphen pattern is valid"));
static WRAPPED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(\p{Ll})").expect("wrapped line pattern is valid"));
static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").expect("newline pattern is valid"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));

/// Text cleanup applied between extraction and unit segmentation
pub struct TextNormalizer;

impl TextNormalizer {
    /// Normalize extracted text.
    ///
    /// Passes run in order, each relying on the shape left by the previous one:
    /// 1. drop page-number lines
    /// 2. rejoin words hyphenated across a line break
    /// 3. rejoin lines wrapped mid-sentence (next line starts lowercase)
    /// 4. collapse newline runs
    /// 5. collapse whitespace runs to a single space
    /// 6. trim
    ///
    /// The sequence repeats until the text stops changing, since a later pass can expose a
    /// new page-number line (e.g. "2023-\n" becomes "2023"). Every pass either shortens the
    /// text or removes a newline, so this terminates.
    pub fn normalize(text: &str) -> String {
        let mut current = Self::apply_passes(text);
        loop {
            let next = Self::apply_passes(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn apply_passes(text: &str) -> String {
        let text = PAGE_NUMBER_LINE.replace_all(text, "");
        let text = HYPHEN_BREAK.replace_all(&text, "");
        let text = WRAPPED_LINE.replace_all(&text, " ${1}");
        let text = NEWLINE_RUN.replace_all(&text, "\n");
        let text = WHITESPACE_RUN.replace_all(&text, " ");
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleans_page_footer_and_hyphenation() {
        let raw = "Page 5\nThis is respira-\ntion and\nmore text.\n\n\nDone.";
        assert_eq!(
            TextNormalizer::normalize(raw),
            "This is respiration and more text.\nDone."
        );
    }

    #[test]
    fn test_removes_bare_page_numbers() {
        let raw = "Cell Biology\n12\nMitosis\n  13  \nMeiosis\nPage 3 of 10\n";
        assert_eq!(TextNormalizer::normalize(raw), "Cell Biology\nMitosis\nMeiosis");
    }

    #[test]
    fn test_keeps_numbers_inside_lines() {
        let raw = "UNIT 1\nChapter 2 covers 3 topics";
        assert_eq!(TextNormalizer::normalize(raw), "UNIT 1\nChapter 2 covers 3 topics");
    }

    #[test]
    fn test_uppercase_line_starts_are_not_merged() {
        let raw = "First sentence.\nSecond sentence.";
        assert_eq!(TextNormalizer::normalize(raw), raw);
    }

    #[test]
    fn test_collapses_spaces_and_tabs() {
        assert_eq!(TextNormalizer::normalize("  a \t  b   c  "), "a b c");
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert_eq!(TextNormalizer::normalize(""), "");
        assert_eq!(TextNormalizer::normalize(" \n\n 4 \n\t"), "");
    }

    #[test]
    fn test_number_line_left_by_hyphen_rejoin_is_dropped() {
        assert_eq!(
            TextNormalizer::normalize("Syllabus\n2023-\n\nOutline"),
            "Syllabus\nOutline"
        );
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Page 5\nThis is respira-\ntion and\nmore text.\n\n\nDone.",
            "UNIT I\nIntroduction to  thermo-\ndynamics\n\n1\nUNIT II\nEntropy and\nenthalpy.\n",
            "Syllabus\n\n\n   Unit-3: Optics \n lenses and mirrors\n",
            "already clean text",
            "Syllabus\n2023-\n\nOutline",
            "Outline\nPage\n \n3\nTopics",
        ];

        for sample in samples {
            let once = TextNormalizer::normalize(sample);
            let twice = TextNormalizer::normalize(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }
}
