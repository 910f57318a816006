//! Reasoning stage: the chat-completions client, reply repair, and the
//! deterministic fallback used whenever the model cannot be trusted.

pub mod fallback;
pub mod providers;
pub mod repair;

pub use fallback::{fallback_prediction, predict};
pub use providers::chat::ChatCompletionsReasoner;
pub use providers::mock::{MockDescriber, MockReasoner};
pub use repair::{extract_json_object, repair, resolve_non_answer};
