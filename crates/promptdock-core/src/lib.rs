//! Core configuration and environment handling for PromptDock.
//!
//! This crate holds the process-wide settings that the relay, the model
//! factory, and the provider adapters read: API credentials, base URLs,
//! default provider/model selection, and the listen port. Settings are
//! built once at startup and shared read-only afterwards.

pub mod env;
pub mod settings;

pub use settings::{ProviderSettings, Settings, DEFAULT_PORT};
