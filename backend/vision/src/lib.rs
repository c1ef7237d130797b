//! Image-analysis providers implementing [`autoinspect_core::VisionAnalyzer`].

pub mod mime;
pub mod parse;
pub mod prompt;
pub mod providers;

pub use providers::mock::MockVisionProvider;
pub use providers::openai::OpenAiVisionProvider;
