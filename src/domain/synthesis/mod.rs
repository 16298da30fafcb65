pub mod error;
pub mod job;
pub mod orchestrator;

pub use error::SynthesisError;
pub use job::{JobStatus, SynthesisJob};
pub use orchestrator::{SynthesisOrchestrator, SynthesisOutcome};
