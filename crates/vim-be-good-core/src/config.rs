// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! Plugin configuration.
//!
//! # Sources
//!
//! 1. Built-in defaults
//! 2. The TOML file named by `VIM_BE_GOOD_CONFIG`, if set
//! 3. `VIM_BE_GOOD_ROUNDS`, overriding `game.rounds`

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV: &str = "VIM_BE_GOOD_CONFIG";

/// Environment variable overriding the number of rounds.
pub const ROUNDS_ENV: &str = "VIM_BE_GOOD_ROUNDS";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub plugin: PluginOptions,
}

/// Shape of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Rounds per session.
    pub rounds: usize,
    /// First buffer line the game may write. Lines above it are left alone.
    pub first_line: usize,
    /// Lines rendered per round.
    pub line_length: usize,
    /// Pause between countdown messages, in milliseconds.
    pub countdown_interval_ms: u64,
    /// Fixed RNG seed, for reproducible rounds.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            first_line: 2,
            line_length: 20,
            countdown_interval_ms: 0,
            seed: None,
        }
    }
}

/// Options declared to the host when the plugin loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginOptions {
    /// Echo debug-channel messages into the editor.
    pub dev: bool,
    pub always_init: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            dev: true,
            always_init: true,
        }
    }
}

impl Config {
    /// Load the configuration from the environment.
    pub fn from_env() -> Result<Self, GameError> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                tracing::info!("Loading config from {}: {}", CONFIG_ENV, path);
                Self::from_file(&path)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(rounds) = std::env::var(ROUNDS_ENV) {
            config.game.rounds = rounds
                .trim()
                .parse()
                .map_err(|e| GameError::Config(format!("{}={}: {}", ROUNDS_ENV, rounds, e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.game.rounds == 0 {
            return Err(GameError::Config("game.rounds must be at least 1".to_string()));
        }
        // Both halves of the range must hold at least one line.
        if self.game.line_length < 2 {
            return Err(GameError::Config(
                "game.line_length must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
