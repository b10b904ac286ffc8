//! HTTP route handlers.

pub mod analysis;
pub mod chat;
