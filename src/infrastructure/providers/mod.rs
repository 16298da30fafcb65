pub mod openai_synthesis_provider;
pub mod polly_synthesis_provider;
pub mod provider_chain;
pub mod synthesis_provider;
pub mod upload_provider;
pub mod youtube_upload_provider;

pub use openai_synthesis_provider::OpenAiSynthesisProvider;
pub use polly_synthesis_provider::PollySynthesisProvider;
pub use provider_chain::ProviderChain;
pub use synthesis_provider::{ProviderError, SynthesisProvider, SynthesisRequest};
pub use upload_provider::{ChunkAck, UploadProvider, UploadSessionHandle};
pub use youtube_upload_provider::YouTubeUploadProvider;
