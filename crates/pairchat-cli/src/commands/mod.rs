pub mod chat;
pub mod code;
