pub mod voice;

pub use voice::{Gender, Language, VoiceEntry, VoiceSelector};
