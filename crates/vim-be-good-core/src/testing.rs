// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! In-memory editor for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::editor::Editor;
use crate::error::GameError;

#[derive(Debug, Default)]
pub struct Recorded {
    pub lines: Vec<String>,
    pub commands: Vec<String>,
    pub out: Vec<String>,
    pub err: Vec<String>,
    pub subscribed: bool,
    pub writes: usize,
}

/// A buffer that behaves like a Neovim buffer: it always holds at least
/// one line, and strict indexing rejects ranges past the end.
pub struct FakeEditor {
    inner: Mutex<Recorded>,
    fail_reads: Mutex<usize>,
}

impl FakeEditor {
    pub fn new() -> Self {
        Self::with_lines(&[""])
    }

    pub fn with_lines(lines: &[&str]) -> Self {
        let mut lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            inner: Mutex::new(Recorded {
                lines,
                ..Recorded::default()
            }),
            fail_reads: Mutex::new(0),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().unwrap().lines.clone()
    }

    pub fn out(&self) -> Vec<String> {
        self.inner.lock().unwrap().out.clone()
    }

    pub fn err(&self) -> Vec<String> {
        self.inner.lock().unwrap().err.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.inner.lock().unwrap().commands.clone()
    }

    pub fn subscribed(&self) -> bool {
        self.inner.lock().unwrap().subscribed
    }

    pub fn writes(&self) -> usize {
        self.inner.lock().unwrap().writes
    }

    /// What the player does: wipe every non-blank line.
    pub fn blank_all(&self) {
        for line in self.inner.lock().unwrap().lines.iter_mut() {
            line.clear();
        }
    }

    /// Make the next `count` `get_lines` calls fail.
    pub fn fail_next_reads(&self, count: usize) {
        *self.fail_reads.lock().unwrap() = count;
    }
}

fn check_bounds(start: usize, end: usize, len: usize) -> Result<(), GameError> {
    if start > end || end > len {
        return Err(GameError::OutOfBounds { start, end, len });
    }
    Ok(())
}

#[async_trait]
impl Editor for FakeEditor {
    async fn line_count(&self) -> Result<usize, GameError> {
        Ok(self.inner.lock().unwrap().lines.len())
    }

    async fn get_lines(
        &self,
        start: usize,
        end: usize,
        strict: bool,
    ) -> Result<Vec<String>, GameError> {
        {
            let mut fail = self.fail_reads.lock().unwrap();
            if *fail > 0 {
                *fail -= 1;
                return Err(GameError::Editor("read failed".to_string()));
            }
        }
        let inner = self.inner.lock().unwrap();
        let len = inner.lines.len();
        if strict {
            check_bounds(start, end, len)?;
        }
        let end = end.min(len);
        let start = start.min(end);
        Ok(inner.lines[start..end].to_vec())
    }

    async fn set_lines(
        &self,
        start: usize,
        end: usize,
        strict: bool,
        lines: Vec<String>,
    ) -> Result<(), GameError> {
        let mut inner = self.inner.lock().unwrap();
        let len = inner.lines.len();
        if strict {
            check_bounds(start, end, len)?;
        }
        let end = end.min(len);
        let start = start.min(end);
        inner.lines.splice(start..end, lines);
        if inner.lines.is_empty() {
            inner.lines.push(String::new());
        }
        inner.writes += 1;
        Ok(())
    }

    async fn command(&self, command: &str) -> Result<(), GameError> {
        self.inner.lock().unwrap().commands.push(command.to_string());
        Ok(())
    }

    async fn out_write(&self, message: &str) -> Result<(), GameError> {
        self.inner.lock().unwrap().out.push(message.to_string());
        Ok(())
    }

    async fn err_writeln(&self, message: &str) -> Result<(), GameError> {
        self.inner.lock().unwrap().err.push(message.to_string());
        Ok(())
    }

    async fn subscribe(&self) -> Result<(), GameError> {
        self.inner.lock().unwrap().subscribed = true;
        Ok(())
    }

    async fn unsubscribe(&self) -> Result<(), GameError> {
        self.inner.lock().unwrap().subscribed = false;
        Ok(())
    }
}
