pub mod concat_backend;
pub mod ffmpeg_concat;
pub mod wav_concat;
pub mod wav_conform;

pub use concat_backend::{ConcatBackend, ConcatError};
pub use ffmpeg_concat::FfmpegConcatBackend;
pub use wav_concat::{wav_duration, WavConcatBackend};
pub use wav_conform::conform_wav;
