// ZEN Session Composer - Theme -> Script + Sound Layers
// Copyright (c) 2026 Xing_The_Creator | ZEN
//
// Asks the generation provider for a session and normalizes whatever comes back.
// Any failure is absorbed into a deterministic, theme-templated fallback.

use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::agent::provider::GenerationProvider;
use crate::agent::sound_library::{self, SoundKey};
use crate::error::{ComposeError, ProviderError};
use crate::session::{AudioLayer, Palette, SessionResponse};

const DEFAULT_TITLE: &str = "Zen Peace";
const DEFAULT_SCRIPT: &str = "Close your eyes and breathe.";
const DEFAULT_LAYER_NAME: &str = "rain";
const DEFAULT_VOLUME: f64 = 0.5;
const DEFAULT_PRIMARY: &str = "#1a2a6c";
const DEFAULT_SECONDARY: &str = "#b21f1f";

const FALLBACK_PRIMARY: &str = "#2c3e50";
const FALLBACK_SECONDARY: &str = "#4ca1af";

pub struct SessionComposer {
    provider: Option<Arc<dyn GenerationProvider>>,
    timeout: Duration,
}

impl SessionComposer {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// `provider` is `None` when no credential is configured.
    pub fn new(provider: Option<Arc<dyn GenerationProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Composer that always serves the fallback payload.
    pub fn offline() -> Self {
        Self::new(None, Self::DEFAULT_TIMEOUT)
    }

    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.name())
    }

    /// Compose a session for `theme`. Never fails.
    pub async fn create_session(&self, theme: &str) -> SessionResponse {
        match self.try_compose(theme).await {
            Ok(session) => {
                info!(
                    "[COMPOSER] ✅ Session '{}' composed ({} layers)",
                    session.title,
                    session.layers.len()
                );
                session
            }
            Err(e) => {
                error!("[COMPOSER] {} (theme: '{}'). Serving fallback.", e, theme);
                fallback_session(theme)
            }
        }
    }

    /// Single provider round-trip with no fallback applied.
    pub async fn try_compose(&self, theme: &str) -> Result<SessionResponse, ComposeError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(ComposeError::MissingCredential)?;

        let prompt = build_prompt(theme);
        debug!("[COMPOSER] Prompting {} for theme '{}'", provider.name(), theme);

        let text = tokio::time::timeout(self.timeout, provider.generate(&prompt))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        parse_session(&text)
    }
}

pub fn build_prompt(theme: &str) -> String {
    format!(
        concat!(
            "Create a Zen ASMR session configuration for the theme: \"{theme}\".\n",
            "Return a JSON object with exactly these fields:\n",
            "- title: A calming title.\n",
            "- script: A 2-3 sentence relaxation message.\n",
            "- layers: An array of 2-3 objects with 'name' (must be from: {keys}) ",
            "and 'initialVolume' (0.1 to 0.8).\n",
            "- colors: An object with 'primary' and 'secondary' hex codes representing the mood.\n",
            "Return ONLY JSON."
        ),
        theme = theme,
        keys = sound_library::key_list()
    )
}

/// Remove a ```json opener and a ``` closer, each at most once.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

// Absent keys take defaults; an explicit `null` is malformed.
#[derive(Deserialize)]
struct RawSession {
    #[serde(default, deserialize_with = "present")]
    title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    script: Option<String>,
    #[serde(default, deserialize_with = "present")]
    layers: Option<Vec<RawLayer>>,
    #[serde(default, deserialize_with = "present")]
    colors: Option<RawPalette>,
}

// Unknown fields (including any `url`) are dropped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLayer {
    #[serde(default, deserialize_with = "present")]
    name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    initial_volume: Option<f64>,
}

#[derive(Deserialize)]
struct RawPalette {
    #[serde(default, deserialize_with = "present")]
    primary: Option<String>,
    #[serde(default, deserialize_with = "present")]
    secondary: Option<String>,
}

/// Only called for keys that exist, so `null` reaches `T` and is rejected.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Decode provider text into a session, filling defaults for absent fields.
pub fn parse_session(text: &str) -> Result<SessionResponse, ComposeError> {
    let raw: RawSession = serde_json::from_str(strip_code_fence(text))?;

    let layers = raw
        .layers
        .unwrap_or_default()
        .into_iter()
        .map(resolve_layer)
        .collect();

    let colors = match raw.colors {
        Some(p) => Palette {
            primary: p.primary.unwrap_or_else(|| DEFAULT_PRIMARY.to_string()),
            secondary: p.secondary.unwrap_or_else(|| DEFAULT_SECONDARY.to_string()),
        },
        None => Palette::new(DEFAULT_PRIMARY, DEFAULT_SECONDARY),
    };

    Ok(SessionResponse {
        title: raw.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        script: raw.script.unwrap_or_else(|| DEFAULT_SCRIPT.to_string()),
        layers,
        colors,
    })
}

fn resolve_layer(raw: RawLayer) -> AudioLayer {
    let key = raw
        .name
        .unwrap_or_else(|| DEFAULT_LAYER_NAME.to_string())
        .to_lowercase();

    if SoundKey::from_name(&key).is_none() {
        debug!("[COMPOSER] Unknown sound '{}', using rain", key);
    }

    AudioLayer {
        name: capitalize(&key),
        url: sound_library::resolve_url(&key).to_string(),
        initial_volume: raw.initial_volume.unwrap_or(DEFAULT_VOLUME),
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Deterministic payload used whenever the model path fails.
pub fn fallback_session(theme: &str) -> SessionResponse {
    SessionResponse {
        title: format!("Peaceful {}", theme),
        script: format!(
            "Let the gentle sounds of {} wash over you. Deep breath in, slow release.",
            theme
        ),
        layers: vec![
            AudioLayer::new("Soft Rain", SoundKey::Rain.url(), 0.4),
            AudioLayer::new("Nature Wind", SoundKey::Forest.url(), 0.2),
        ],
        colors: Palette::new(FALLBACK_PRIMARY, FALLBACK_SECONDARY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedProvider {
        reply: Result<String, u16>,
        calls: AtomicUsize,
    }

    impl CannedProvider {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn status(code: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(code),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GenerationProvider for CannedProvider {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(code) => Err(ProviderError::Status {
                    status: *code,
                    body: "boom".to_string(),
                }),
            }
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl GenerationProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("{}".to_string())
        }
    }

    fn composer_with(provider: Arc<dyn GenerationProvider>) -> SessionComposer {
        SessionComposer::new(Some(provider), SessionComposer::DEFAULT_TIMEOUT)
    }

    #[test]
    fn test_prompt_embeds_theme_and_keys() {
        let prompt = build_prompt("moonlit lake");
        assert!(prompt.contains("\"moonlit lake\""));
        assert!(prompt.contains("rain, forest, waves, fire, white-noise"));
        assert!(prompt.contains("0.1 to 0.8"));
        for field in ["title", "script", "layers", "colors"] {
            assert!(prompt.contains(field), "prompt missing {}", field);
        }
    }

    #[test]
    fn test_fallback_exact_payload() {
        let session = fallback_session("ocean");
        assert_eq!(session.title, "Peaceful ocean");
        assert_eq!(
            session.script,
            "Let the gentle sounds of ocean wash over you. Deep breath in, slow release."
        );
        assert_eq!(
            session.layers,
            vec![
                AudioLayer::new("Soft Rain", SoundKey::Rain.url(), 0.4),
                AudioLayer::new("Nature Wind", SoundKey::Forest.url(), 0.2),
            ]
        );
        assert_eq!(session.colors, Palette::new("#2c3e50", "#4ca1af"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```json{}"), "{}");
        assert_eq!(strip_code_fence("{}```"), "{}");
        // Only one fence is removed from each end
        assert_eq!(strip_code_fence("```json```json{}"), "```json{}");
    }

    #[test]
    fn test_parse_fenced_response() {
        let text = "```json\n{\"title\":\"T\",\"script\":\"S\",\"layers\":[],\"colors\":{\"primary\":\"#000\",\"secondary\":\"#fff\"}}\n```";
        let session = parse_session(text).unwrap();
        assert_eq!(session.title, "T");
        assert_eq!(session.script, "S");
        assert!(session.layers.is_empty());
        assert_eq!(session.colors, Palette::new("#000", "#fff"));
    }

    #[test]
    fn test_unknown_sound_uses_rain_url() {
        let text = r#"{"layers":[{"name":"thunder","initialVolume":0.3}]}"#;
        let session = parse_session(text).unwrap();
        assert_eq!(session.layers.len(), 1);
        assert_eq!(session.layers[0].name, "Thunder");
        assert_eq!(session.layers[0].url, SoundKey::Rain.url());
        assert_eq!(session.layers[0].initial_volume, 0.3);
    }

    #[test]
    fn test_model_url_is_ignored() {
        let text = r#"{"layers":[
            {"name":"WAVES","initialVolume":0.6,"url":"https://evil.example/a.mp3"},
            {"name":"white-noise","url":"javascript:alert(1)"}
        ]}"#;
        let session = parse_session(text).unwrap();
        assert_eq!(session.layers[0].name, "Waves");
        assert_eq!(session.layers[0].url, SoundKey::Waves.url());
        assert_eq!(session.layers[1].name, "White-noise");
        assert_eq!(session.layers[1].url, SoundKey::WhiteNoise.url());
        assert!(session
            .layers
            .iter()
            .all(|l| sound_library::is_library_url(&l.url)));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let session = parse_session(r#"{"layers":[{}]}"#).unwrap();
        assert_eq!(session.title, "Zen Peace");
        assert_eq!(session.script, "Close your eyes and breathe.");
        assert_eq!(session.colors, Palette::new("#1a2a6c", "#b21f1f"));
        assert_eq!(
            session.layers,
            vec![AudioLayer::new("Rain", SoundKey::Rain.url(), 0.5)]
        );

        let session = parse_session("{}").unwrap();
        assert!(session.layers.is_empty());
    }

    #[test]
    fn test_partial_palette_fills_missing_key() {
        let session = parse_session(r##"{"colors":{"primary":"#123456","accent":"#ffffff"}}"##).unwrap();
        assert_eq!(session.colors, Palette::new("#123456", "#b21f1f"));
    }

    #[test]
    fn test_volume_and_colors_pass_through() {
        let text = r#"{"layers":[{"name":"fire","initialVolume":1.7}],"colors":{"primary":"red","secondary":"not-a-hex"}}"#;
        let session = parse_session(text).unwrap();
        assert_eq!(session.layers[0].initial_volume, 1.7);
        assert_eq!(session.colors, Palette::new("red", "not-a-hex"));
    }

    #[test]
    fn test_malformed_responses() {
        for text in [
            "Sure! Here is your session.",
            "```\n{}\n```",
            "[1, 2, 3]",
            r#"{"layers": {"name": "rain"}}"#,
            r#"{"layers": [{"name": 42}]}"#,
            r#"{"layers": [{"initialVolume": "loud"}]}"#,
            r#"{"colors": {"primary": 1}}"#,
            r#"{"title": null}"#,
            r#"{"script": null}"#,
            r#"{"layers": null}"#,
            r#"{"colors": null}"#,
            r#"{"layers": [{"name": null, "initialVolume": 0.3}]}"#,
            r#"{"layers": [{"name": "rain", "initialVolume": null}]}"#,
            r##"{"colors": {"primary": "#000", "secondary": null}}"##,
        ] {
            let err = parse_session(text).unwrap_err();
            assert!(
                matches!(err, ComposeError::MalformedResponse(_)),
                "expected malformed for {:?}",
                text
            );
        }
    }

    #[tokio::test]
    async fn test_create_session_success_path() {
        let provider = CannedProvider::ok(
            r##"{"title":"Tidal Calm","script":"Breathe with the tide.","layers":[{"name":"waves","initialVolume":0.7},{"name":"rain","initialVolume":0.2}],"colors":{"primary":"#003366","secondary":"#66ccff"}}"##,
        );
        let composer = composer_with(provider.clone());
        let session = composer.create_session("ocean").await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.title, "Tidal Calm");
        assert_eq!(session.layers.len(), 2);
        assert_eq!(session.layers[0], AudioLayer::new("Waves", SoundKey::Waves.url(), 0.7));
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let provider = CannedProvider::status(503);
        let composer = composer_with(provider.clone());

        let err = composer.try_compose("ocean").await.unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Provider(ProviderError::Status { status: 503, .. })
        ));

        let session = composer.create_session("ocean").await;
        assert_eq!(session, fallback_session("ocean"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_null_layers_fall_back() {
        let composer = composer_with(CannedProvider::ok(r#"{"title":"Night","layers":null}"#));
        assert_eq!(composer.create_session("ocean").await, fallback_session("ocean"));
    }

    #[tokio::test]
    async fn test_malformed_text_falls_back() {
        let composer = composer_with(CannedProvider::ok("not json at all"));
        assert_eq!(composer.create_session("rain").await, fallback_session("rain"));
    }

    #[tokio::test]
    async fn test_no_credential_skips_provider() {
        let composer = SessionComposer::offline();
        assert_eq!(composer.provider_name(), None);

        let err = composer.try_compose("forest").await.unwrap_err();
        assert!(matches!(err, ComposeError::MissingCredential));
        assert_eq!(composer.create_session("forest").await, fallback_session("forest"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let composer = SessionComposer::new(Some(Arc::new(SlowProvider)), Duration::from_secs(15));

        let err = composer.try_compose("night").await.unwrap_err();
        assert!(matches!(err, ComposeError::Provider(ProviderError::Timeout(_))));
        assert_eq!(composer.create_session("night").await, fallback_session("night"));
    }
}
