//! Syllabus ingestion: PDF text extraction, cleanup and unit segmentation

mod extractor;
mod normalizer;
mod pipeline;
mod segmenter;

pub use extractor::PdfTextExtractor;
pub use normalizer::TextNormalizer;
pub use pipeline::SyllabusPipeline;
pub use segmenter::UnitSegmenter;
