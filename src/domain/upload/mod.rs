pub mod error;
pub mod model;
pub mod session;
pub mod uploader;

pub use error::UploadError;
pub use model::{content_type_for, UploadMetadata, UploadOutcome};
pub use session::{FailureDecision, UploadSession, UploadStatus};
pub use uploader::ResumableUploader;
