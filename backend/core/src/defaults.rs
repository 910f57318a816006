//! Built-in defaults shared by the service clients and the config layer.

/// Hugging Face inference endpoint for Florence-2.
pub const FLORENCE_API_URL: &str =
    "https://api-inference.huggingface.co/models/microsoft/Florence-2-large";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const VISION_MODEL: &str = "gpt-4o-mini";

/// NVIDIA integrate API.
pub const REASONING_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
pub const REASONING_MODEL: &str = "nvidia/llama-3.1-nemotron-nano-vl-8b-v1";
pub const TEMPERATURE: f32 = 0.4;
pub const MAX_TOKENS: u32 = 500;
pub const TOP_P: f32 = 0.9;

/// Upload cap (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Upper bound for each upstream call.
pub const STAGE_TIMEOUT_SECS: u64 = 30;
