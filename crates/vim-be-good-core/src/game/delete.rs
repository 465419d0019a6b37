// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! The "relative" game: a single marker line hidden among blank lines.
//!
//! The marker goes into one half of the play area and the cursor into the
//! other, so every round needs a relative jump before `dd`.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Game;
use crate::config::GameConfig;
use crate::editor::Editor;
use crate::error::GameError;
use crate::state::{GameState, LineRange};

/// The line the player has to delete.
pub const MARKER: &str = "                              DELETE ME";

/// Where a round puts the marker and the cursor (absolute, zero-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPlan {
    pub target: usize,
    pub cursor: usize,
}

/// Draw a line uniformly from `[range.start, midpoint)`, or from
/// `[midpoint, range.end)` when `high` is set.
pub fn midpoint_random_point<R: Rng + ?Sized>(
    rng: &mut R,
    range: &LineRange,
    midpoint: usize,
    high: bool,
) -> usize {
    debug_assert!(range.start < midpoint && midpoint < range.end);
    if high {
        rng.gen_range(midpoint..range.end)
    } else {
        rng.gen_range(range.start..midpoint)
    }
}

pub struct DeleteGame {
    rng: Mutex<StdRng>,
}

impl DeleteGame {
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Pick the marker and cursor lines for the next round.
    pub fn plan_round(&self, state: &GameState) -> RoundPlan {
        let range = state.line_range;
        let midpoint = range.start + state.line_length / 2;

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let high = rng.gen_bool(0.5);
        RoundPlan {
            target: midpoint_random_point(&mut *rng, &range, midpoint, high),
            cursor: midpoint_random_point(&mut *rng, &range, midpoint, !high),
        }
    }
}

#[async_trait]
impl Game for DeleteGame {
    async fn run(&self, editor: &dyn Editor, state: &GameState) -> Result<(), GameError> {
        let plan = self.plan_round(state);
        let range = state.line_range;

        let mut lines = vec![String::new(); state.line_length];
        lines[plan.target - range.start] = MARKER.to_string();

        tracing::debug!("Round plan: marker on {}, cursor on {}", plan.target, plan.cursor);

        // Ex line numbers are one-based.
        editor.command(&format!(":{}", plan.cursor + 1)).await?;
        editor.set_lines(range.start, range.end, true, lines).await
    }

    async fn clear(&self, editor: &dyn Editor, state: &GameState) -> Result<(), GameError> {
        let len = editor.line_count().await?;
        editor.remove_lines(0, len, true).await?;
        editor
            .insert_lines(0, vec![String::new(); state.line_range.end])
            .await
    }

    async fn check_for_win(
        &self,
        editor: &dyn Editor,
        state: &GameState,
    ) -> Result<bool, GameError> {
        let end = editor.line_count().await?;
        let lines = editor.get_lines(state.line_range.start, end, false).await?;
        Ok(lines.iter().all(|line| line.trim().is_empty()))
    }
}
