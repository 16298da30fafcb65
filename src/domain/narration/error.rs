use crate::domain::assembly::AssemblyError;
use crate::domain::synthesis::SynthesisError;
use crate::domain::upload::UploadError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum NarrationServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("job already running: {0}")]
    Conflict(String),
    #[error("uploads are not configured")]
    UploadUnavailable,
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),
}

impl From<NarrationServiceError> for AppError {
    fn from(err: NarrationServiceError) -> Self {
        let message = err.to_string();
        match err {
            NarrationServiceError::Invalid(msg) => AppError::BadRequest(msg),
            NarrationServiceError::Conflict(msg) => AppError::Conflict(msg),
            NarrationServiceError::UploadUnavailable => AppError::ServiceUnavailable(message),
            NarrationServiceError::Synthesis(SynthesisError::Provider { .. }) => {
                AppError::ExternalService(message)
            }
            NarrationServiceError::Upload(UploadError::File { .. })
            | NarrationServiceError::Upload(UploadError::EmptyFile(_)) => {
                AppError::BadRequest(message)
            }
            NarrationServiceError::Upload(_) => AppError::ExternalService(message),
            NarrationServiceError::Synthesis(_) | NarrationServiceError::Assembly(_) => {
                AppError::Internal(message)
            }
        }
    }
}
