use async_trait::async_trait;
use narrator_backend::domain::upload::UploadMetadata;
use narrator_backend::infrastructure::providers::{
    ChunkAck, ProviderError, SynthesisProvider, SynthesisRequest, UploadProvider,
    UploadSessionHandle,
};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Segments containing this marker are rejected with a permanent error
pub const FAIL_MARKER: &str = "REJECTED-BY-PROVIDER";

/// Segments containing this marker block until `release` is notified
pub const HOLD_MARKER: &str = "HOLD-SYNTHESIS";

pub const SAMPLE_RATE: u32 = 24_000;

/// 100ms of mono 16-bit silence at the default target rate
pub fn silent_wav() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for _ in 0..SAMPLE_RATE / 10 {
            writer.write_sample(0i16).expect("wav sample");
        }
        writer.finalize().expect("wav finalize");
    }
    cursor.into_inner()
}

/// Synthesis provider that answers every segment with a short silent WAV
#[derive(Default)]
pub struct FakeSynthesisProvider {
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
    pub started: Notify,
    pub release: Notify,
}

impl FakeSynthesisProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SynthesisProvider for FakeSynthesisProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn audio_extension(&self) -> &str {
        "wav"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(request.text.clone());

        if request.text.contains(FAIL_MARKER) {
            return Err(ProviderError::from_status(401, "invalid api key", None));
        }
        if request.text.contains(HOLD_MARKER) {
            self.started.notify_one();
            self.release.notified().await;
        }

        Ok(silent_wav())
    }
}

/// Upload host that stores every chunk in memory and rejects covers that do not exist
#[derive(Default)]
pub struct FakeUploadHost {
    received: Mutex<Vec<u8>>,
    sessions: AtomicUsize,
    chunk_calls: AtomicUsize,
    titles: Mutex<Vec<String>>,
}

impl FakeUploadHost {
    pub fn received_len(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn chunk_calls(&self) -> usize {
        self.chunk_calls.load(Ordering::SeqCst)
    }

    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadProvider for FakeUploadHost {
    async fn create_session(
        &self,
        metadata: &UploadMetadata,
        _file_size: u64,
    ) -> Result<UploadSessionHandle, ProviderError> {
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        self.titles.lock().unwrap().push(metadata.title.clone());
        self.received.lock().unwrap().clear();
        Ok(UploadSessionHandle {
            session_token: format!("session-{}", n),
            upload_endpoint: format!("http://upload.test/session-{}", n),
        })
    }

    async fn send_chunk(
        &self,
        session: &UploadSessionHandle,
        offset: u64,
        bytes: &[u8],
        total_size: u64,
    ) -> Result<ChunkAck, ProviderError> {
        self.chunk_calls.fetch_add(1, Ordering::SeqCst);
        let mut received = self.received.lock().unwrap();
        if offset as usize == received.len() {
            received.extend_from_slice(bytes);
        }

        let accepted_offset = received.len() as u64;
        let resource_id = (accepted_offset == total_size)
            .then(|| format!("resource-{}", session.session_token));

        Ok(ChunkAck {
            accepted_offset,
            resource_id,
        })
    }

    async fn attach_artifact(&self, resource_id: &str, artifact: &Path) -> Result<(), ProviderError> {
        if artifact.exists() {
            Ok(())
        } else {
            Err(ProviderError::fatal(format!(
                "cover {} missing for {}",
                artifact.display(),
                resource_id
            )))
        }
    }
}
