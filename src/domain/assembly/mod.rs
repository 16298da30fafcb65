pub mod assembler;
pub mod error;
pub mod model;

pub use assembler::AudioAssembler;
pub use error::AssemblyError;
pub use model::{AssembledTrack, AudioContainer, TargetFormat};
