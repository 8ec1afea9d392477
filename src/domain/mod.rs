pub mod audio;
pub mod story;
pub mod tts;
