// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! Error type shared by the games, the round driver and the editor adapters.

use thiserror::Error;

/// Everything that can go wrong while talking to the editor or setting up a session.
#[derive(Debug, Error)]
pub enum GameError {
    /// An editor RPC call failed.
    #[error("{0}")]
    Editor(String),

    /// A strictly indexed buffer access fell outside the buffer.
    #[error("Index out of bounds: lines {start}..{end} in a buffer of {len} lines")]
    OutOfBounds { start: usize, end: usize, len: usize },

    /// The configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// Wrap any displayable editor failure.
    pub fn editor(err: impl std::fmt::Display) -> Self {
        Self::Editor(err.to_string())
    }
}

impl From<toml::de::Error> for GameError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
