use super::tts_repository::TtsRepository;
use crate::domain::tts::{Gender, Language, VoiceEntry};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

const OPENAI_VOICES: &[VoiceEntry] = &[
    (Language::Portuguese, Gender::Male, "onyx"),
    (Language::Portuguese, Gender::Female, "nova"),
    (Language::English, Gender::Male, "echo"),
    (Language::English, Gender::Female, "shimmer"),
];

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    pub fn from_credentials(api_key: &str, api_base: Option<&str>, model: String) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base {
            config = config.with_api_base(base);
        }
        Self::new(Arc::new(Client::with_config(config)), model)
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn parse_voice(voice: &str) -> Result<Voice, String> {
        match voice.to_lowercase().as_str() {
            "alloy" => Ok(Voice::Alloy),
            "echo" => Ok(Voice::Echo),
            "fable" => Ok(Voice::Fable),
            "onyx" => Ok(Voice::Onyx),
            "nova" => Ok(Voice::Nova),
            "shimmer" => Ok(Voice::Shimmer),
            other => Err(format!("unknown OpenAI voice '{}'", other)),
        }
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    fn provider(&self) -> &'static str {
        "openai"
    }

    fn voices(&self) -> &'static [VoiceEntry] {
        OPENAI_VOICES
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, String> {
        tracing::info!(
            model = %self.model,
            voice = voice,
            text_length = text.chars().count(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice: Self::parse_voice(voice)?,
            response_format: Some(SpeechResponseFormat::Mp3),
            speed: None,
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = voice,
                "OpenAI TTS API call failed"
            );
            format!("OpenAI TTS error: {}", e)
        })?;

        let audio_bytes = response.bytes.to_vec();
        if audio_bytes.is_empty() {
            return Err("OpenAI TTS returned an empty audio payload".to_string());
        }

        tracing::debug!(
            audio_size = audio_bytes.len(),
            "OpenAI TTS audio received successfully"
        );

        Ok(audio_bytes)
    }
}
