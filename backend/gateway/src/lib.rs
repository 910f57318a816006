//! geoclass HTTP gateway
//!
//! Multipart upload endpoint for country classification, plus health and index routes.

pub mod classify_api;
pub mod error;
pub mod health_api;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, start_server, CredentialStatus, GatewayState};
