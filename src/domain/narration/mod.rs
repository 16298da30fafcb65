pub mod cleaner;
pub mod dto;
pub mod error;
pub mod framer;
pub mod language;
pub mod model;
pub mod registry;
pub mod segmenter;
pub mod service;

pub use cleaner::clean_text;
pub use error::NarrationServiceError;
pub use framer::{FramingPatterns, FramingPosition, NarrationFramer, DEFAULT_DETECTION_WINDOW};
pub use language::{detect_language, LanguageCode};
pub use model::{NarrationText, Segment};
pub use registry::ActiveJobs;
pub use segmenter::TextSegmenter;
pub use service::{NarrationService, NarrationServiceApi};
