pub mod assembly;
pub mod narration;
pub mod shared;
pub mod synthesis;
pub mod upload;
