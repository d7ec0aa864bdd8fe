// ZEN Configuration - Read once at process start
// Copyright (c) 2026 Xing_The_Creator | ZEN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::agent::composer::SessionComposer;
use crate::agent::provider::{
    self, ChatCompletionsProvider, GeminiProvider, GenerationProvider,
};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" | "ollama" => Ok(ProviderKind::OpenAi),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    fn key_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GOOGLE_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn default_url(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => provider::GEMINI_DEFAULT_URL,
            ProviderKind::OpenAi => provider::OPENAI_DEFAULT_URL,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => provider::GEMINI_DEFAULT_MODEL,
            ProviderKind::OpenAi => provider::OPENAI_DEFAULT_MODEL,
        }
    }
}

/// Immutable process configuration. Injected into the composer and server.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    /// `None` forces every request down the fallback path
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: Url,
    pub timeout: Duration,
    pub static_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let provider = match get("ZEN_PROVIDER") {
            Some(v) => ProviderKind::parse(&v)?,
            None => ProviderKind::Gemini,
        };

        let api_url = get("ZEN_API_URL").unwrap_or_else(|| provider.default_url().to_string());
        let api_url = Url::parse(&api_url).map_err(|source| ConfigError::InvalidUrl {
            var: "ZEN_API_URL",
            source,
        })?;

        let raw_timeout = get("ZEN_PROVIDER_TIMEOUT_SECS");
        let timeout_secs = match parse_number::<u64>(raw_timeout.clone(), "ZEN_PROVIDER_TIMEOUT_SECS")? {
            // a zero deadline would fail every provider call instantly
            Some(0) => {
                return Err(ConfigError::InvalidNumber {
                    var: "ZEN_PROVIDER_TIMEOUT_SECS",
                    value: raw_timeout.unwrap_or_default(),
                })
            }
            Some(secs) => secs,
            None => SessionComposer::DEFAULT_TIMEOUT.as_secs(),
        };

        Ok(Self {
            provider,
            api_key: get(provider.key_var()),
            model: get("ZEN_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            static_dir: PathBuf::from(get("ZEN_STATIC_DIR").unwrap_or_else(|| "static".to_string())),
            host: get("ZEN_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_number::<u16>(get("ZEN_PORT"), "ZEN_PORT")?.unwrap_or(8000),
        })
    }

    /// The configured backend, or `None` when its API key is absent.
    pub fn build_provider(&self) -> Result<Option<Arc<dyn GenerationProvider>>, ConfigError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!(
                "⚠️ {} not set. Every session will use the fallback payload.",
                self.provider.key_var()
            );
            return Ok(None);
        };

        let client = provider::http_client(self.timeout)?;
        let url = self.api_url.as_str();

        let backend: Arc<dyn GenerationProvider> = match self.provider {
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(client, url, &self.model, api_key)),
            ProviderKind::OpenAi => {
                Arc::new(ChatCompletionsProvider::new(client, url, &self.model, api_key))
            }
        };
        info!("🧠 Provider: {} ({} @ {})", backend.name(), self.model, url);
        Ok(Some(backend))
    }

    /// Socket address for `host`/`port`; IPv6 hosts like `::` are bare, no brackets.
    pub fn bind_addr(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = host
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host.to_string()))?;
        Ok(SocketAddr::new(ip, port))
    }

    pub fn composer(&self) -> Result<SessionComposer, ConfigError> {
        Ok(SessionComposer::new(self.build_provider()?, self.timeout))
    }
}

fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { var, value: v })
        })
        .transpose()
}
