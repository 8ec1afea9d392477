use crate::domain::story::StoryError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Story languages the narrator can voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Portuguese,
    English,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Portuguese, Language::English];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Portuguese => "portuguese",
            Language::English => "english",
        }
    }
}

impl FromStr for Language {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "portuguese" | "pt" | "pt-br" | "pt_br" => Ok(Language::Portuguese),
            "english" | "en" | "en-us" | "en_us" => Ok(Language::English),
            other => Err(StoryError::InvalidVoiceSelection(format!(
                "unsupported language '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "masculino" => Ok(Gender::Male),
            "female" | "f" | "feminino" => Ok(Gender::Female),
            other => Err(StoryError::InvalidVoiceSelection(format!(
                "unsupported gender '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of a provider's voice table
pub type VoiceEntry = (Language, Gender, &'static str);

/// Maps a (language, gender) pair to a provider voice identifier.
///
/// Lookups outside the table fail with `InvalidVoiceSelection`; there is no
/// silent fallback. Defaults only fill in fields the caller left out.
#[derive(Debug, Clone)]
pub struct VoiceSelector {
    voices: HashMap<(Language, Gender), String>,
    default_language: Language,
    default_gender: Gender,
}

impl VoiceSelector {
    pub fn new(table: &[VoiceEntry], default_language: Language, default_gender: Gender) -> Self {
        let voices = table
            .iter()
            .map(|(language, gender, voice)| ((*language, *gender), voice.to_string()))
            .collect();

        Self {
            voices,
            default_language,
            default_gender,
        }
    }

    /// Every supported pair resolves to the same voice
    pub fn single(voice: &str, default_language: Language, default_gender: Gender) -> Self {
        let voices = Language::ALL
            .iter()
            .flat_map(|language| Gender::ALL.iter().map(move |gender| (*language, *gender)))
            .map(|key| (key, voice.to_string()))
            .collect();

        Self {
            voices,
            default_language,
            default_gender,
        }
    }

    pub fn select(&self, language: Language, gender: Gender) -> Result<&str, StoryError> {
        self.voices
            .get(&(language, gender))
            .map(String::as_str)
            .ok_or_else(|| {
                StoryError::InvalidVoiceSelection(format!(
                    "no voice configured for {} {}",
                    language, gender
                ))
            })
    }

    /// Resolve the voice for optional request fields
    pub fn resolve(
        &self,
        language: Option<&str>,
        gender: Option<&str>,
    ) -> Result<String, StoryError> {
        let language = match language {
            Some(value) => value.parse()?,
            None => self.default_language,
        };
        let gender = match gender {
            Some(value) => value.parse()?,
            None => self.default_gender,
        };

        self.select(language, gender).map(str::to_string)
    }
}
