pub mod bunny_storage_repository;
pub mod local_tts_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod storage_repository;
pub mod tts_repository;

pub use bunny_storage_repository::BunnyStorageRepository;
pub use local_tts_repository::LocalTtsRepository;
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use storage_repository::{StorageError, StorageRepository, UploadResult};
pub use tts_repository::TtsRepository;
