pub mod extractor;
pub mod vision;

pub use extractor::extract;
pub use vision::{florence_text, FlorenceDescriber, OpenAiVisionDescriber};
