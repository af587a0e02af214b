//! Provider wiring from configuration

use super::{AnthropicAdapter, GeminiAdapter, OpenAiAdapter, ProviderBuildError};
use crate::config::FileProvidersConfig;
use aeo_application::ProviderAdapter;
use aeo_domain::ProviderId;
use std::sync::Arc;
use tracing::{debug, warn};

/// Every backend this build knows how to talk to, in ask order
pub const KNOWN_PROVIDERS: [&str; 3] = ["openai", "anthropic", "gemini"];

/// Build the adapters for a check.
///
/// With `only` empty, every enabled provider with a resolvable key is built;
/// providers without a key are skipped with a warning. With `only` set, each
/// named provider must be known, enabled and keyed, otherwise the whole
/// build fails.
pub fn build_providers(
    config: &FileProvidersConfig,
    only: &[ProviderId],
) -> Result<Vec<Arc<dyn ProviderAdapter>>, ProviderBuildError> {
    for id in only {
        if !KNOWN_PROVIDERS.contains(&id.as_str()) {
            return Err(ProviderBuildError::Unknown(id.to_string()));
        }
    }

    let explicit = !only.is_empty();
    let mut providers: Vec<Arc<dyn ProviderAdapter>> = Vec::new();

    for name in KNOWN_PROVIDERS {
        if explicit && !only.iter().any(|id| id.as_str() == name) {
            continue;
        }
        match build_one(config, name) {
            Ok(provider) => {
                debug!("Provider {} ready", name);
                providers.push(provider);
            }
            Err(ProviderBuildError::Disabled(_)) if !explicit => {
                debug!("Provider {} disabled in config", name);
            }
            Err(ProviderBuildError::MissingApiKey { provider, env_var }) if !explicit => {
                warn!("Skipping provider {}: no API key in {}", provider, env_var);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(providers)
}

fn build_one(
    config: &FileProvidersConfig,
    name: &str,
) -> Result<Arc<dyn ProviderAdapter>, ProviderBuildError> {
    match name {
        "openai" => {
            let settings = &config.openai;
            if !settings.enabled {
                return Err(ProviderBuildError::Disabled(name.to_string()));
            }
            let key = settings
                .resolve_api_key()
                .ok_or_else(|| missing_key(name, &settings.api_key_env))?;
            Ok(Arc::new(OpenAiAdapter::new(settings, key)?))
        }
        "anthropic" => {
            let settings = &config.anthropic;
            if !settings.enabled {
                return Err(ProviderBuildError::Disabled(name.to_string()));
            }
            let key = settings
                .resolve_api_key()
                .ok_or_else(|| missing_key(name, &settings.api_key_env))?;
            Ok(Arc::new(AnthropicAdapter::new(settings, key)?))
        }
        "gemini" => {
            let settings = &config.gemini;
            if !settings.enabled {
                return Err(ProviderBuildError::Disabled(name.to_string()));
            }
            let key = settings
                .resolve_api_key()
                .ok_or_else(|| missing_key(name, &settings.api_key_env))?;
            Ok(Arc::new(GeminiAdapter::new(settings, key)?))
        }
        other => Err(ProviderBuildError::Unknown(other.to_string())),
    }
}

fn missing_key(provider: &str, env_var: &str) -> ProviderBuildError {
    ProviderBuildError::MissingApiKey {
        provider: provider.to_string(),
        env_var: env_var.to_string(),
    }
}
