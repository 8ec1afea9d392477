use crate::domain::audio::AudioError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("invalid voice selection: {0}")]
    InvalidVoiceSelection(String),
    #[error("synthesis failed for chunk {chunk_index}: {message}")]
    Synthesis { chunk_index: usize, message: String },
    #[error("audio assembly failed: {0}")]
    Assembly(String),
    /// `status` is `None` when the storage backend never answered
    #[error("upload failed: {message}")]
    Upload { status: Option<u16>, message: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AudioError> for StoryError {
    fn from(err: AudioError) -> Self {
        StoryError::Assembly(err.to_string())
    }
}

impl From<StoryError> for AppError {
    fn from(err: StoryError) -> Self {
        match err {
            StoryError::Validation(msg) => AppError::BadRequest(msg),
            StoryError::InvalidVoiceSelection(msg) => AppError::InvalidVoice(msg),
            StoryError::Synthesis { .. } => AppError::Synthesis(err.to_string()),
            StoryError::Assembly(msg) => AppError::Assembly(msg),
            StoryError::Upload { .. } => AppError::Upload(err.to_string()),
            StoryError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
