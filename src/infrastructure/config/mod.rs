use crate::domain::audio::encoder::is_supported_bitrate;
use crate::domain::story::chunker::MAX_CHUNK_SIZE;
use crate::domain::tts::{Gender, Language};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Synthesis backend
    pub tts_provider: TtsProvider,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub openai_api_base: Option<String>,
    pub tts_voice: Option<String>,
    pub aws_region: String,
    pub local_tts_command: String,
    // Bunny storage
    pub bunny_api_key: String,
    pub bunny_storage_zone: String,
    pub bunny_storage_region: Option<String>,
    pub bunny_storage_host: String,
    // Pipeline
    pub chunk_size: usize,
    pub default_language: Language,
    pub default_gender: Gender,
    pub synthesis_concurrency: usize,
    pub audio_normalize: bool,
    pub output_sample_rate: u32,
    pub output_channels: u16,
    pub output_bitrate_kbps: u32,
    pub artifact_dir: PathBuf,
    pub keep_failed_uploads: bool,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    OpenAi,
    Polly,
    Local,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &'static str, default: &str| {
            var(key).unwrap_or_else(|| default.to_string())
        };

        let tts_provider = match or_default("TTS_PROVIDER", "openai").to_lowercase().as_str() {
            "openai" => TtsProvider::OpenAi,
            "polly" => TtsProvider::Polly,
            "local" => TtsProvider::Local,
            other => {
                return Err(invalid(
                    "TTS_PROVIDER",
                    other,
                    "expected openai, polly or local",
                ))
            }
        };

        let openai_api_key = var("OPENAI_API_KEY");
        if tts_provider == TtsProvider::OpenAi && openai_api_key.is_none() {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }

        let config = Config {
            host: or_default("HOST", "0.0.0.0"),
            port: parse("PORT", &or_default("PORT", "8000"))?,
            environment: match or_default("ENVIRONMENT", "development").to_lowercase().as_str() {
                "development" => Environment::Development,
                "production" => Environment::Production,
                other => {
                    return Err(invalid(
                        "ENVIRONMENT",
                        other,
                        "expected development or production",
                    ))
                }
            },
            log_format: match or_default("LOG_FORMAT", "pretty").to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                other => return Err(invalid("LOG_FORMAT", other, "expected pretty or json")),
            },
            tts_provider,
            openai_api_key,
            openai_tts_model: or_default("OPENAI_TTS_MODEL", "tts-1"),
            openai_api_base: var("OPENAI_API_BASE"),
            tts_voice: var("TTS_VOICE"),
            aws_region: or_default("AWS_REGION", "eu-west-1"),
            local_tts_command: or_default("LOCAL_TTS_COMMAND", "espeak-ng"),
            bunny_api_key: required("BUNNY_API_KEY")?,
            bunny_storage_zone: or_default("BUNNY_STORAGE_ZONE", "contahistoria"),
            bunny_storage_region: var("BUNNY_STORAGE_REGION"),
            bunny_storage_host: or_default("BUNNY_STORAGE_HOST", "storage.bunnycdn.com"),
            chunk_size: parse("CHUNK_SIZE", &or_default("CHUNK_SIZE", &MAX_CHUNK_SIZE.to_string()))?,
            default_language: or_default("DEFAULT_LANGUAGE", "portuguese")
                .parse()
                .map_err(|e| invalid("DEFAULT_LANGUAGE", &or_default("DEFAULT_LANGUAGE", ""), e))?,
            default_gender: or_default("DEFAULT_GENDER", "female")
                .parse()
                .map_err(|e| invalid("DEFAULT_GENDER", &or_default("DEFAULT_GENDER", ""), e))?,
            synthesis_concurrency: parse(
                "SYNTHESIS_CONCURRENCY",
                &or_default("SYNTHESIS_CONCURRENCY", "1"),
            )?,
            audio_normalize: parse_bool("AUDIO_NORMALIZE", &or_default("AUDIO_NORMALIZE", "true"))?,
            output_sample_rate: parse(
                "OUTPUT_SAMPLE_RATE",
                &or_default("OUTPUT_SAMPLE_RATE", "24000"),
            )?,
            output_channels: parse("OUTPUT_CHANNELS", &or_default("OUTPUT_CHANNELS", "1"))?,
            output_bitrate_kbps: parse(
                "OUTPUT_BITRATE_KBPS",
                &or_default("OUTPUT_BITRATE_KBPS", "128"),
            )?,
            artifact_dir: var("ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            keep_failed_uploads: parse_bool(
                "KEEP_FAILED_UPLOADS",
                &or_default("KEEP_FAILED_UPLOADS", "true"),
            )?,
            request_timeout_secs: parse(
                "REQUEST_TIMEOUT_SECS",
                &or_default("REQUEST_TIMEOUT_SECS", "600"),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(invalid("CHUNK_SIZE", "0", "must be greater than zero"));
        }
        if self.synthesis_concurrency == 0 {
            return Err(invalid(
                "SYNTHESIS_CONCURRENCY",
                "0",
                "must be at least 1",
            ));
        }
        if self.output_channels != 1 && self.output_channels != 2 {
            return Err(invalid(
                "OUTPUT_CHANNELS",
                &self.output_channels.to_string(),
                "mp3 output supports 1 or 2 channels",
            ));
        }
        if !is_supported_bitrate(self.output_bitrate_kbps) {
            return Err(invalid(
                "OUTPUT_BITRATE_KBPS",
                &self.output_bitrate_kbps.to_string(),
                "unsupported mp3 bitrate",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("REQUEST_TIMEOUT_SECS", "0", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| invalid(key, value, e))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}
