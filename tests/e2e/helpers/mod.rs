use axum::Router;
use narrator_backend::controllers::narration::NarrationController;
use narrator_backend::domain::assembly::{AudioAssembler, TargetFormat};
use narrator_backend::domain::narration::{
    service::NarrationSettings, NarrationFramer, NarrationService,
};
use narrator_backend::domain::shared::RetryPolicy;
use narrator_backend::domain::synthesis::SynthesisOrchestrator;
use narrator_backend::domain::upload::ResumableUploader;
use narrator_backend::infrastructure::http::create_router;
use narrator_backend::infrastructure::providers::{ProviderChain, SynthesisProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;
pub mod fakes;

use api_client::TestClient;
use fakes::{FakeSynthesisProvider, FakeUploadHost};

pub struct TestContext {
    pub client: TestClient,
    pub synthesis: Arc<FakeSynthesisProvider>,
    pub upload_host: Arc<FakeUploadHost>,
    pub work_dir: PathBuf,
    pub output_dir: PathBuf,
    _root: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let root = tempfile::tempdir().expect("Failed to create temp dir");
            let work_dir = root.path().join("work");
            let output_dir = root.path().join("output");

            let synthesis = Arc::new(FakeSynthesisProvider::default());
            let upload_host = Arc::new(FakeUploadHost::default());

            let app = create_app_with_fakes(
                synthesis.clone(),
                upload_host.clone(),
                work_dir.clone(),
                output_dir.clone(),
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
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            Self {
                client: TestClient::new(&base_url),
                synthesis,
                upload_host,
                work_dir,
                output_dir,
                _root: root,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Scratch directories are removed when the TempDir drops
        }
    }
}

fn create_app_with_fakes(
    synthesis: Arc<FakeSynthesisProvider>,
    upload_host: Arc<FakeUploadHost>,
    work_dir: PathBuf,
    output_dir: PathBuf,
) -> Router {
    let fast_retry = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5));

    let target = TargetFormat::default();
    let chain = ProviderChain::new(vec![synthesis as Arc<dyn SynthesisProvider>]).with_target(target);
    let orchestrator = Arc::new(SynthesisOrchestrator::new(Arc::new(chain), fast_retry, 2));
    let assembler = Arc::new(AudioAssembler::with_default_backends(target));
    let uploader = Arc::new(ResumableUploader::new(
        upload_host,
        64 * 1024,
        3,
        Duration::from_millis(1),
        Duration::from_millis(5),
    ));

    let settings = NarrationSettings {
        work_dir,
        output_dir,
        segment_max_chars: 400,
        default_intro: None,
        default_outro: None,
    };

    let narration_service = Arc::new(NarrationService::new(
        NarrationFramer::default(),
        orchestrator,
        assembler,
        Some(uploader),
        settings,
    ));

    create_router(Arc::new(NarrationController::new(narration_service)))
}
