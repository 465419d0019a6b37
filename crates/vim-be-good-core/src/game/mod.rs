// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! Games and the registry that looks them up by name.
//!
//! # Round lifecycle
//!
//! 1. `clear` resets the buffer to a blank canvas
//! 2. `run` draws the round into `state.line_range`
//! 3. `check_for_win` is asked after every buffer change until it says yes

mod delete;

pub use delete::{midpoint_random_point, DeleteGame, RoundPlan, MARKER};

use async_trait::async_trait;

use crate::config::GameConfig;
use crate::editor::Editor;
use crate::error::GameError;
use crate::state::GameState;

/// The capabilities every game provides.
#[async_trait]
pub trait Game: Send + Sync {
    /// Render one round.
    async fn run(&self, editor: &dyn Editor, state: &GameState) -> Result<(), GameError>;

    /// Reset the buffer before the next `run`.
    async fn clear(&self, editor: &dyn Editor, state: &GameState) -> Result<(), GameError>;

    /// Has the player finished the current round?
    async fn check_for_win(&self, editor: &dyn Editor, state: &GameState)
        -> Result<bool, GameError>;
}

/// Builds a game for a session.
pub type GameFactory = fn(&GameConfig) -> Box<dyn Game>;

/// Games selectable by the first command argument.
pub struct Registry {
    entries: Vec<(&'static str, GameFactory)>,
}

impl Registry {
    /// The games this plugin ships.
    pub fn builtin() -> Self {
        Self {
            entries: vec![("relative", delete_game as GameFactory)],
        }
    }

    /// Look up a game by name and build it.
    pub fn create(&self, name: &str, config: &GameConfig) -> Option<Box<dyn Game>> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, factory)| factory(config))
    }

    /// Names of every registered game, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    /// The message shown when no known game was asked for.
    pub fn usage(&self) -> String {
        format!(
            "VimBeGood: <gameName>  -- Available Games: {}\n",
            self.names().join(",")
        )
    }
}

fn delete_game(config: &GameConfig) -> Box<dyn Game> {
    Box::new(DeleteGame::new(config))
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
