use super::tts_repository::TtsRepository;
use crate::domain::tts::{Gender, Language, VoiceEntry};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const ESPEAK_VOICES: &[VoiceEntry] = &[
    (Language::Portuguese, Gender::Male, "pt-br+m3"),
    (Language::Portuguese, Gender::Female, "pt-br+f3"),
    (Language::English, Gender::Male, "en-us+m3"),
    (Language::English, Gender::Female, "en-us+f3"),
];

/// Local engine implementation of TTS repository.
///
/// Runs an espeak-ng compatible binary (`<command> -v <voice> -w <out.wav> --stdin`)
/// with the chunk text on stdin and reads back the WAV it wrote.
pub struct LocalTtsRepository {
    command: String,
    work_dir: PathBuf,
}

impl LocalTtsRepository {
    pub fn new(command: String, work_dir: PathBuf) -> Self {
        Self { command, work_dir }
    }
}

#[async_trait]
impl TtsRepository for LocalTtsRepository {
    fn provider(&self) -> &'static str {
        "local"
    }

    fn voices(&self) -> &'static [VoiceEntry] {
        ESPEAK_VOICES
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, String> {
        // Unique per call, removed when `output` drops
        let output = tempfile::Builder::new()
            .prefix("chunk-")
            .suffix(".wav")
            .tempfile_in(&self.work_dir)
            .map_err(|e| format!("failed to create output file: {}", e))?
            .into_temp_path();

        tracing::info!(
            command = %self.command,
            voice = voice,
            text_length = text.chars().count(),
            output = %output.display(),
            "Running local TTS engine"
        );

        let mut child = Command::new(&self.command)
            .arg("-v")
            .arg(voice)
            .arg("-w")
            .arg(&*output)
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to start '{}': {}", self.command, e))?;

        // stdin is fed while stdout/stderr are drained, so an engine that
        // is chatty on stderr before reading its input cannot stall
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(text.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let (fed, result) = tokio::join!(feed, child.wait_with_output());
        let result =
            result.map_err(|e| format!("'{}' did not finish: {}", self.command, e))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::error!(
                status = ?result.status,
                stderr = %stderr.trim(),
                "Local TTS engine failed"
            );
            return Err(format!(
                "'{}' exited with {}: {}",
                self.command,
                result.status,
                stderr.trim()
            ));
        }

        // Engine exited cleanly but did not take all of the text
        if let Err(e) = fed {
            return Err(format!("failed to send text to '{}': {}", self.command, e));
        }

        let audio_bytes = tokio::fs::read(&output)
            .await
            .map_err(|e| format!("failed to read engine output: {}", e))?;
        if audio_bytes.is_empty() {
            return Err("local TTS engine produced an empty file".to_string());
        }

        tracing::debug!(
            audio_size = audio_bytes.len(),
            "Local TTS audio produced"
        );

        Ok(audio_bytes)
    }
}
