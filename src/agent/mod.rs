// ZEN Agent Modules
// Copyright (c) 2026 Xing_The_Creator | ZEN

pub mod composer;
pub mod provider;
pub mod sound_library;
