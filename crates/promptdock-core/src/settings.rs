//! Process-wide settings for the chat relay and provider adapters.
//!
//! Settings are assembled once from the environment at startup and are
//! read-only afterwards; concurrent requests share them behind an `Arc`.

use crate::env;
use secrecy::SecretString;
use tracing::warn;

/// Default listen port for the gateway.
pub const DEFAULT_PORT: u16 = 3001;

/// Default provider name used when a request carries no selector.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Per-vendor connection settings.
#[derive(Clone)]
pub struct ProviderSettings {
    /// API key. Absent keys are a startup warning, not an error; calls
    /// against the provider fail lazily with an auth error.
    pub api_key: Option<SecretString>,

    /// API base URL override (e.g. for proxies or compatible APIs).
    pub api_base: Option<String>,

    /// Organization ID (OpenAI only).
    pub organization: Option<String>,

    /// Default model identifier for this vendor.
    pub default_model: Option<String>,
}

impl ProviderSettings {
    fn from_env(key_var: &str, base_var: &str, model_var: &str, org_var: Option<&str>) -> Self {
        let api_key = env::get_var(key_var).map(SecretString::new);
        if api_key.is_none() {
            warn!(
                "{} is not set; requests to this provider will fail at call time",
                key_var
            );
        }

        Self {
            api_key,
            api_base: env::get_var(base_var),
            organization: org_var.and_then(env::get_var),
            default_model: env::get_var(model_var),
        }
    }
}

/// All settings consumed by the relay layer.
#[derive(Clone)]
pub struct Settings {
    /// OpenAI connection settings.
    pub openai: ProviderSettings,

    /// Anthropic connection settings.
    pub anthropic: ProviderSettings,

    /// Default provider name (requests without a selector resolve here).
    pub default_provider: String,

    /// Gateway listen port.
    pub port: u16,
}

impl Settings {
    /// Build settings from the process environment.
    pub fn from_env() -> Self {
        Self {
            openai: ProviderSettings::from_env(
                "OPENAI_API_KEY",
                "OPENAI_API_BASE_URL",
                "OPENAI_DEFAULT_MODEL",
                Some("OPENAI_ORGANIZATION"),
            ),
            anthropic: ProviderSettings::from_env(
                "ANTHROPIC_API_KEY",
                "ANTHROPIC_API_BASE_URL",
                "ANTHROPIC_DEFAULT_MODEL",
                None,
            ),
            default_provider: env::get_var_or("DEFAULT_PROVIDER", DEFAULT_PROVIDER),
            port: env::get_u16("PORT").unwrap_or(DEFAULT_PORT),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai: ProviderSettings {
                api_key: None,
                api_base: None,
                organization: None,
                default_model: None,
            },
            anthropic: ProviderSettings {
                api_key: None,
                api_base: None,
                organization: None,
                default_model: None,
            },
            default_provider: DEFAULT_PROVIDER.to_string(),
            port: DEFAULT_PORT,
        }
    }
}
