pub mod chat;
pub mod mock;
