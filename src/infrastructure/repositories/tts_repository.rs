use crate::domain::tts::VoiceEntry;
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (OpenAI, AWS Polly, a local engine)
///
/// Implementations are responsible for:
/// - Calling the provider for exactly one chunk of text
/// - Publishing the provider-specific voice table
///
/// Splitting the story and merging the audio happen in the story service.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Short provider name used in logs
    fn provider(&self) -> &'static str;

    /// (language, gender) -> voice identifier rows this provider supports
    fn voices(&self) -> &'static [VoiceEntry];

    /// Synthesize one chunk of text with the given voice
    ///
    /// Returns the encoded audio (MP3 or WAV) exactly as the provider produced it
    ///
    /// # Errors
    /// Returns an error if the provider is unavailable, rejects the request
    /// or answers with an empty payload
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, String>;
}
