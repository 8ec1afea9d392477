use super::artifact::Artifact;
use super::chunker::{split_into_chunks, TextChunk};
use super::error::StoryError;
use super::StoryRequest;
use crate::domain::audio::{AssembledAudio, AudioAssembler, EncodedSegment};
use crate::domain::tts::VoiceSelector;
use crate::infrastructure::repositories::{StorageRepository, TtsRepository};
use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

const ARTIFACT_EXTENSION: &str = "mp3";

/// Where a narration request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStage {
    Received,
    Validated,
    Chunked,
    Synthesizing,
    Assembling,
    Uploading,
    Completed,
    Failed,
}

impl std::fmt::Display for StoryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoryStage::Received => "received",
            StoryStage::Validated => "validated",
            StoryStage::Chunked => "chunked",
            StoryStage::Synthesizing => "synthesizing",
            StoryStage::Assembling => "assembling",
            StoryStage::Uploading => "uploading",
            StoryStage::Completed => "completed",
            StoryStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub chunk_size: usize,
    pub synthesis_concurrency: usize,
    pub artifact_dir: PathBuf,
    pub keep_failed_uploads: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NarrationResult {
    pub id: String,
    pub key: String,
    pub chunk_count: usize,
    pub duration_secs: f64,
    pub audio_size_bytes: usize,
    pub remote_status: u16,
}

pub struct StoryService {
    tts_repo: Arc<dyn TtsRepository>,
    storage_repo: Arc<dyn StorageRepository>,
    voices: VoiceSelector,
    assembler: AudioAssembler,
    settings: PipelineSettings,
}

impl StoryService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        storage_repo: Arc<dyn StorageRepository>,
        voices: VoiceSelector,
        assembler: AudioAssembler,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            tts_repo,
            storage_repo,
            voices,
            assembler,
            settings,
        }
    }
}

#[async_trait]
pub trait StoryServiceApi: Send + Sync {
    /// Turn a story into one MP3 in remote storage
    ///
    /// This operation:
    /// - Validates the request and resolves the voice
    /// - Splits the text into chunks
    /// - Synthesizes every chunk (any failure aborts the request)
    /// - Assembles the chunk audio in order and writes a temporary artifact
    /// - Uploads the artifact as `<id>.mp3`
    async fn narrate(&self, request: StoryRequest) -> Result<NarrationResult, StoryError>;
}

#[async_trait]
impl StoryServiceApi for StoryService {
    async fn narrate(&self, request: StoryRequest) -> Result<NarrationResult, StoryError> {
        let started = Instant::now();
        let mut stage = StoryStage::Received;

        tracing::info!(
            story_id = %request.id,
            text_length = request.text.chars().count(),
            language = ?request.language,
            gender = ?request.gender,
            provider = self.tts_repo.provider(),
            "Story received"
        );

        let result = self.run(&request, &mut stage).await;

        match &result {
            Ok(done) => tracing::info!(
                story_id = %done.id,
                key = %done.key,
                stage = %StoryStage::Completed,
                chunk_count = done.chunk_count,
                duration_secs = done.duration_secs,
                audio_size_bytes = done.audio_size_bytes,
                latency_ms = started.elapsed().as_millis(),
                "Story narrated"
            ),
            Err(e) => tracing::warn!(
                story_id = %request.id,
                stage = %StoryStage::Failed,
                failed_at = %stage,
                error = %e,
                latency_ms = started.elapsed().as_millis(),
                "Story narration failed"
            ),
        }

        result
    }
}

impl StoryService {
    async fn run(
        &self,
        request: &StoryRequest,
        stage: &mut StoryStage,
    ) -> Result<NarrationResult, StoryError> {
        let voice = self.validate(request)?;
        self.advance(stage, StoryStage::Validated, &request.id);

        let chunks = split_into_chunks(&request.text, self.settings.chunk_size)?;
        self.advance(stage, StoryStage::Chunked, &request.id);
        tracing::debug!(
            story_id = %request.id,
            chunk_count = chunks.len(),
            chunk_size = self.settings.chunk_size,
            "Text split into chunks"
        );

        self.advance(stage, StoryStage::Synthesizing, &request.id);
        let segments = self.synthesize_chunks(&chunks, &voice).await?;

        self.advance(stage, StoryStage::Assembling, &request.id);
        let (assembled, artifact) = self.assemble(&request.id, segments).await?;

        self.advance(stage, StoryStage::Uploading, &request.id);
        let key = format!("{}.{}", request.id, ARTIFACT_EXTENSION);
        let remote_status = self.upload(artifact, &key).await?;

        *stage = StoryStage::Completed;

        Ok(NarrationResult {
            id: request.id.clone(),
            key,
            chunk_count: chunks.len(),
            duration_secs: assembled.duration_secs,
            audio_size_bytes: assembled.bytes.len(),
            remote_status,
        })
    }

    fn advance(&self, stage: &mut StoryStage, next: StoryStage, story_id: &str) {
        tracing::debug!(story_id, from = %stage, to = %next, "Stage transition");
        *stage = next;
    }

    fn validate(&self, request: &StoryRequest) -> Result<String, StoryError> {
        if request.id.trim().is_empty() {
            return Err(StoryError::Validation("missing id".to_string()));
        }
        if request
            .id
            .split(['/', '\\'])
            .any(|segment| matches!(segment, "" | "." | ".."))
        {
            return Err(StoryError::Validation(format!(
                "invalid id '{}': empty, '.' or '..' path segment",
                request.id
            )));
        }
        if request.text.is_empty() {
            return Err(StoryError::Validation("empty text".to_string()));
        }

        self.voices
            .resolve(request.language.as_deref(), request.gender.as_deref())
    }

    /// Chunks run through at most `synthesis_concurrency` provider calls at
    /// once; `buffered` hands results back in chunk order.
    async fn synthesize_chunks(
        &self,
        chunks: &[TextChunk],
        voice: &str,
    ) -> Result<Vec<EncodedSegment>, StoryError> {
        stream::iter(chunks.iter().cloned())
            .map(|chunk| async move { self.synthesize_chunk(&chunk, voice).await })
            .buffered(self.settings.synthesis_concurrency.max(1))
            .try_collect()
            .await
    }

    async fn synthesize_chunk(
        &self,
        chunk: &TextChunk,
        voice: &str,
    ) -> Result<EncodedSegment, StoryError> {
        let start_time = Instant::now();

        tracing::info!(
            chunk_index = chunk.index,
            chunk_length = chunk.char_count(),
            voice,
            "Synthesizing chunk"
        );

        let bytes = self
            .tts_repo
            .synthesize(&chunk.text, voice)
            .await
            .map_err(|message| StoryError::Synthesis {
                chunk_index: chunk.index,
                message,
            })?;

        if bytes.is_empty() {
            return Err(StoryError::Synthesis {
                chunk_index: chunk.index,
                message: "empty audio payload".to_string(),
            });
        }

        tracing::info!(
            provider = self.tts_repo.provider(),
            chunk_index = chunk.index,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = bytes.len(),
            "Chunk synthesized"
        );

        Ok(EncodedSegment {
            chunk_index: chunk.index,
            bytes,
        })
    }

    /// Decoding, resampling and encoding are CPU bound; they run on the
    /// blocking pool together with the artifact write.
    async fn assemble(
        &self,
        story_id: &str,
        segments: Vec<EncodedSegment>,
    ) -> Result<(AssembledAudio, Artifact), StoryError> {
        let assembler = self.assembler.clone();
        let dir = self.settings.artifact_dir.clone();
        let story_id = story_id.to_string();

        tokio::task::spawn_blocking(move || -> Result<(AssembledAudio, Artifact), StoryError> {
            let assembled = assembler.assemble(segments)?;
            let artifact = Artifact::create(&dir, &story_id, &assembled.bytes).map_err(|e| {
                StoryError::Other(anyhow::anyhow!(
                    "failed to write artifact to {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            Ok((assembled, artifact))
        })
        .await
        .map_err(|e| StoryError::Other(anyhow::anyhow!("assembly task failed: {}", e)))?
    }

    async fn upload(&self, artifact: Artifact, key: &str) -> Result<u16, StoryError> {
        let outcome = self.storage_repo.upload(artifact.path(), key).await;

        let error = match outcome {
            Ok(result) if result.success => return Ok(result.remote_status),
            Ok(result) => StoryError::Upload {
                status: Some(result.remote_status),
                message: format!(
                    "storage returned {}: {}",
                    result.remote_status, result.message
                ),
            },
            Err(e) => StoryError::Upload {
                status: None,
                message: e.to_string(),
            },
        };

        if self.settings.keep_failed_uploads {
            match artifact.retain() {
                Ok(path) => tracing::warn!(
                    key,
                    path = %path.display(),
                    "Upload failed, keeping local artifact"
                ),
                Err(e) => tracing::error!(key, error = %e, "Could not keep local artifact"),
            }
        }

        Err(error)
    }
}
