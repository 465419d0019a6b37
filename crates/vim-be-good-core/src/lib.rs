// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! vim-be-good core - games and the round driver
//!
//! This crate provides:
//! - The `Editor` seam the games talk to (implemented over Neovim RPC by the plugin binary)
//! - The `Game` trait, the "relative" delete-line game and the name registry
//! - The round driver: timing, win detection and line-event coalescing
//! - The `VimBeGood2` command launcher and plugin configuration

pub mod config;
pub mod driver;
pub mod editor;
pub mod error;
pub mod game;
pub mod launch;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{Config, GameConfig, PluginOptions};
pub use driver::{CheckGuard, Outcome, RoundDriver, SessionSummary};
pub use editor::{Editor, LineEvent};
pub use error::GameError;
pub use game::{DeleteGame, Game, Registry};
pub use launch::{launch, Launch};
pub use state::{GameState, LineRange};
