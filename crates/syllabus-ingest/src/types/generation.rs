//! Wire types for the question generation service

use serde::{Deserialize, Serialize};

use super::material::QuestionCounts;

/// One request per unit chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub subject: String,
    /// Full text of one unit
    #[serde(rename = "unitSyllabus")]
    pub unit_syllabus: String,
    #[serde(flatten)]
    pub counts: QuestionCounts,
}

impl GenerationRequest {
    pub fn new(subject: impl Into<String>, unit_syllabus: impl Into<String>, counts: QuestionCounts) -> Self {
        Self {
            subject: subject.into(),
            unit_syllabus: unit_syllabus.into(),
            counts,
        }
    }
}

/// Generated questions for one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    /// Question payload as returned by the service
    #[serde(default)]
    pub questions: serde_json::Value,
}
