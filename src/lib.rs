// ZEN Core Library
// Copyright (c) 2026 Xing_The_Creator | ZEN

pub mod agent;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
