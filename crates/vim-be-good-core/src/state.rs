// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! Per-session game state.

use std::time::Duration;

use crate::config::GameConfig;

/// Half-open range of buffer lines a game may read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start..self.end).contains(&line)
    }
}

/// When a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ending {
    pub count: usize,
}

/// State of one session, owned by its round driver.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub line_length: usize,
    pub line_range: LineRange,
    /// Zero-based index of the round in progress. Never exceeds `ending.count`.
    pub current_count: usize,
    pub ending: Ending,
    /// Elapsed milliseconds, one entry per completed round.
    pub results: Vec<u64>,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            line_length: config.line_length,
            line_range: LineRange {
                start: config.first_line,
                end: config.first_line + config.line_length,
            },
            current_count: 0,
            ending: Ending {
                count: config.rounds,
            },
            results: Vec::new(),
        }
    }

    /// Close the current round with its elapsed time.
    pub fn record_round(&mut self, elapsed: Duration) {
        self.results.push(elapsed.as_millis() as u64);
        self.current_count = (self.current_count + 1).min(self.ending.count);
    }

    pub fn is_complete(&self) -> bool {
        self.current_count >= self.ending.count
    }

    /// Arithmetic mean of the recorded rounds, in milliseconds.
    pub fn average_ms(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.results.iter().sum::<u64>() as f64 / self.results.len() as f64
    }
}
