use super::tts_repository::TtsRepository;
use crate::domain::tts::{Gender, Language, VoiceEntry};
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// Neural voices only
const POLLY_VOICES: &[VoiceEntry] = &[
    (Language::Portuguese, Gender::Male, "Thiago"),
    (Language::Portuguese, Gender::Female, "Camila"),
    (Language::English, Gender::Male, "Matthew"),
    (Language::English, Gender::Female, "Joanna"),
];

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    fn provider(&self) -> &'static str {
        "polly"
    }

    fn voices(&self) -> &'static [VoiceEntry] {
        POLLY_VOICES
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, String> {
        let voice_id = VoiceId::from(voice);
        let engine = Engine::Neural;

        tracing::info!(
            voice = voice,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.chars().count(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice = voice,
                    engine = ?engine,
                    "AWS Polly synthesize_speech failed"
                );
                format!("AWS Polly error: {}", e)
            })?;

        // Polly streams the audio body; collect it fully before decoding
        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            format!("Failed to read audio stream: {}", e)
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        if audio_bytes.is_empty() {
            return Err("AWS Polly returned an empty audio stream".to_string());
        }

        tracing::debug!(
            audio_size = audio_bytes.len(),
            "Audio stream collected successfully"
        );

        Ok(audio_bytes)
    }
}
