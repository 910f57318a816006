pub mod assembler;
pub mod pipeline;

pub use assembler::{assemble, summarize_features};
pub use pipeline::{ClassificationPipeline, StageTimeouts};
