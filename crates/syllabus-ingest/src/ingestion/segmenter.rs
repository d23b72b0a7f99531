//! Split normalized syllabus text into per-unit chunks

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::material::{UnitChunk, UNKNOWN_UNIT};

/// "UNIT" + optional separator + Arabic or Roman numeral, e.g. "UNIT 1", "Unit-IV", "unit: 3".
///
/// Arabic numerals may run straight into the following word ("UNIT 1Cells"), which is how
/// text runs of a single PDF text block come out of extraction. Roman numerals need a word
/// boundary so prose like "unit is" is not a heading.
static UNIT_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)unit[\s\-:]*(?:\d+|[ivx]+\b)").expect("unit heading pattern is valid")
});

/// Heading-based unit segmenter
pub struct UnitSegmenter;

impl UnitSegmenter {
    /// Split text at every unit heading.
    ///
    /// Each chunk runs from the end of its heading to the start of the next one.
    /// Text before the first heading is not part of any chunk. With no headings the
    /// whole text becomes a single chunk labelled "Unknown", so the result is never empty.
    pub fn segment(text: &str) -> Vec<UnitChunk> {
        let headings: Vec<_> = UNIT_HEADING.find_iter(text).collect();

        if headings.is_empty() {
            return vec![UnitChunk::new(UNKNOWN_UNIT, text.trim())];
        }

        let chunks: Vec<UnitChunk> = headings
            .iter()
            .enumerate()
            .map(|(i, heading)| {
                let end = headings
                    .get(i + 1)
                    .map(|next| next.start())
                    .unwrap_or(text.len());

                UnitChunk::new(heading.as_str().trim(), text[heading.end()..end].trim())
            })
            .collect();

        tracing::debug!(
            "Segmented {} units (first: {})",
            chunks.len(),
            chunks[0].unit
        );

        chunks
    }
}
