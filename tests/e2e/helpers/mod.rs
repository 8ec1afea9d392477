use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tempfile::TempDir;
use tokio::net::TcpListener;

use story_narrator::controllers::webhook::WebhookController;
use story_narrator::domain::audio::{AudioAssembler, AudioFormat};
use story_narrator::domain::story::{PipelineSettings, StoryService};
use story_narrator::domain::tts::{Gender, Language, VoiceSelector};
use story_narrator::infrastructure::http::build_router;

pub mod api_client;

use api_client::TestClient;
use fakes::{FakeStorage, FakeTts, FAKE_VOICES};

/// Small enough that a short story spans several chunks
pub const TEST_CHUNK_SIZE: usize = 40;

pub const TEST_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub struct TestContext {
    pub client: TestClient,
    pub tts: Arc<FakeTts>,
    pub storage: Arc<FakeStorage>,
    pub artifact_dir: TempDir,
}

impl TestContext {
    /// Files currently left in the artifact directory
    pub fn artifacts(&self) -> Vec<std::path::PathBuf> {
        std::fs::read_dir(self.artifact_dir.path())
            .expect("Failed to read artifact dir")
            .map(|entry| entry.expect("Failed to read dir entry").path())
            .collect()
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let artifact_dir = tempfile::tempdir().expect("Failed to create artifact dir");
            let tts = Arc::new(FakeTts::new());
            let storage = Arc::new(FakeStorage::new());

            let story_service = Arc::new(StoryService::new(
                tts.clone(),
                storage.clone(),
                VoiceSelector::new(FAKE_VOICES, Language::Portuguese, Gender::Female),
                AudioAssembler::new(
                    AudioFormat {
                        sample_rate: 24_000,
                        channels: 1,
                    },
                    true,
                    64,
                ),
                PipelineSettings {
                    chunk_size: TEST_CHUNK_SIZE,
                    synthesis_concurrency: 2,
                    artifact_dir: artifact_dir.path().to_path_buf(),
                    keep_failed_uploads: true,
                },
            ));
            let app = build_router(
                Arc::new(WebhookController::new(story_service)),
                TEST_REQUEST_TIMEOUT,
            );

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            // Wait for server to be ready
            tokio::time::sleep(Duration::from_millis(100)).await;

            Self {
                client: TestClient::new(&base_url),
                tts,
                storage,
                artifact_dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Artifact dir is removed when the TempDir drops
        }
    }
}
