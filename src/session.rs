// ZEN Session Model - Request/Response payloads
// Copyright (c) 2026 Xing_The_Creator | ZEN

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    pub theme: String,
}

/// One ambient track in a session.
///
/// `url` always comes from the sound library, never from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioLayer {
    pub name: String,
    pub url: String,
    pub initial_volume: f64,
}

impl AudioLayer {
    pub fn new(name: &str, url: &str, initial_volume: f64) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            initial_volume,
        }
    }
}

/// Two-colour mood palette. Hex values are not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
}

impl Palette {
    pub fn new(primary: &str, secondary: &str) -> Self {
        Self {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub title: String,
    pub script: String,
    pub layers: Vec<AudioLayer>,
    pub colors: Palette,
}
