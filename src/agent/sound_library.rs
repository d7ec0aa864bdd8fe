// ZEN Sound Library - Hosted ambient tracks
// Copyright (c) 2026 Xing_The_Creator | ZEN

/// Canonical sound keys the model is allowed to pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKey {
    Rain,
    Forest,
    Waves,
    Fire,
    WhiteNoise,
}

impl SoundKey {
    pub const ALL: [SoundKey; 5] = [
        SoundKey::Rain,
        SoundKey::Forest,
        SoundKey::Waves,
        SoundKey::Fire,
        SoundKey::WhiteNoise,
    ];

    /// Match a lower-cased key exactly.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == name)
    }

    pub fn key(&self) -> &'static str {
        match self {
            SoundKey::Rain => "rain",
            SoundKey::Forest => "forest",
            SoundKey::Waves => "waves",
            SoundKey::Fire => "fire",
            SoundKey::WhiteNoise => "white-noise",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            SoundKey::Rain => "https://upload.wikimedia.org/wikipedia/commons/5/5a/Rain_on_the_roof.mp3",
            SoundKey::Forest => "https://upload.wikimedia.org/wikipedia/commons/b/b0/Forest_ambience_with_birds.mp3",
            SoundKey::Waves => "https://upload.wikimedia.org/wikipedia/commons/0/0c/Ocean_waves_rolling_onto_the_shore.mp3",
            SoundKey::Fire => "https://upload.wikimedia.org/wikipedia/commons/1/1a/Fire_in_the_fireplace.mp3",
            SoundKey::WhiteNoise => "https://upload.wikimedia.org/wikipedia/commons/e/e5/White_noise.ogg",
        }
    }
}

/// Look up a track URL, defaulting to rain for anything unknown.
pub fn resolve_url(name: &str) -> &'static str {
    SoundKey::from_name(name).unwrap_or(SoundKey::Rain).url()
}

pub fn is_library_url(url: &str) -> bool {
    SoundKey::ALL.iter().any(|k| k.url() == url)
}

/// Comma-separated key list for prompts.
pub fn key_list() -> String {
    SoundKey::ALL
        .iter()
        .map(|k| k.key())
        .collect::<Vec<_>>()
        .join(", ")
}
