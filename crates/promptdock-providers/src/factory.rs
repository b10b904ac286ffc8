//! Provider selection and construction.
//!
//! Resolution is availability-over-strictness: an unrecognized provider
//! name degrades to the configured default with a warning instead of
//! failing the request.

use crate::{anthropic, openai, AnthropicProvider, OpenAiProvider, Provider};
use promptdock_core::Settings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// The supported provider set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI (GPT models).
    OpenAi,
    /// Anthropic (Claude models).
    Anthropic,
}

impl ProviderKind {
    /// All supported kinds.
    pub const ALL: &'static [ProviderKind] = &[ProviderKind::OpenAi, ProviderKind::Anthropic];

    /// Parse a provider name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            _ => None,
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Human-readable name for UI display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    /// Models surfaced for this provider, as (id, display name) pairs.
    pub fn known_models(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::OpenAi => openai::KNOWN_MODELS,
            Self::Anthropic => anthropic::KNOWN_MODELS,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds provider adapters from process-wide settings.
pub struct ModelFactory {
    settings: Settings,
    default: ProviderKind,
}

impl ModelFactory {
    /// Create a factory.
    ///
    /// An unrecognized `default_provider` in the settings falls back to
    /// OpenAI with a warning.
    pub fn new(settings: Settings) -> Self {
        let default = ProviderKind::parse(&settings.default_provider).unwrap_or_else(|| {
            warn!(
                "Unknown default provider '{}', falling back to openai",
                settings.default_provider
            );
            ProviderKind::OpenAi
        });

        Self { settings, default }
    }

    /// The configured default provider kind.
    pub fn default_kind(&self) -> ProviderKind {
        self.default
    }

    /// Resolve a request's provider selector to a concrete kind.
    ///
    /// `None` and unrecognized names both resolve to the default; the
    /// latter logs a warning. Never an error.
    pub fn resolve(&self, name: Option<&str>) -> ProviderKind {
        match name {
            None => self.default,
            Some(name) => ProviderKind::parse(name).unwrap_or_else(|| {
                warn!(
                    "Unknown provider '{}', falling back to {}",
                    name, self.default
                );
                self.default
            }),
        }
    }

    /// Instantiate the adapter for a kind.
    pub fn create(&self, kind: ProviderKind) -> Arc<dyn Provider> {
        match kind {
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(&self.settings.openai)),
            ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(&self.settings.anthropic)),
        }
    }

    /// Resolve and instantiate in one step.
    pub fn create_by_name(&self, name: Option<&str>) -> Arc<dyn Provider> {
        self.create(self.resolve(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ModelFactory {
        ModelFactory::new(Settings::default())
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(ProviderKind::parse("OpenAI"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("OPENAI"), Some(ProviderKind::OpenAi));
        assert_eq!(
            ProviderKind::parse("Anthropic"),
            Some(ProviderKind::Anthropic)
        );
        assert_eq!(
            ProviderKind::parse("  anthropic  "),
            Some(ProviderKind::Anthropic)
        );
        assert_eq!(ProviderKind::parse("cohere"), None);
    }

    #[test]
    fn test_unknown_name_falls_back_to_default() {
        let factory = factory();
        assert_eq!(factory.resolve(Some("not-a-provider")), factory.default_kind());
        assert_eq!(factory.resolve(None), factory.default_kind());
    }

    #[test]
    fn test_create_returns_matching_adapter() {
        let factory = factory();

        let openai = factory.create_by_name(Some("OPENAI"));
        assert_eq!(openai.name(), "openai");

        let anthropic = factory.create_by_name(Some("anthropic"));
        assert_eq!(anthropic.name(), "anthropic");

        // Unknown names still return a callable adapter.
        let fallback = factory.create_by_name(Some("bogus"));
        assert_eq!(fallback.name(), factory.default_kind().as_str());
    }

    #[test]
    fn test_unknown_default_provider_in_settings() {
        let settings = Settings {
            default_provider: "mystery".to_string(),
            ..Settings::default()
        };
        let factory = ModelFactory::new(settings);
        assert_eq!(factory.default_kind(), ProviderKind::OpenAi);
    }

    #[test]
    fn test_known_models_nonempty() {
        for kind in ProviderKind::ALL {
            assert!(!kind.known_models().is_empty());
        }
    }
}
