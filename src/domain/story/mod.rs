pub mod artifact;
pub mod chunker;
pub mod error;
pub mod service;

pub use artifact::Artifact;
pub use chunker::{split_into_chunks, TextChunk, MAX_CHUNK_SIZE};
pub use error::StoryError;
pub use service::{NarrationResult, PipelineSettings, StoryService, StoryServiceApi, StoryStage};

use serde::{Deserialize, Serialize};

/// Payload of POST /webhook
///
/// `id` and `text` default to empty so that a missing field is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}
