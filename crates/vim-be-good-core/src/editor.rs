// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! The editor seam.
//!
//! Games and the round driver only ever see the buffer through this trait.
//! The plugin binary implements it on top of Neovim's RPC API; tests use an
//! in-memory buffer.
//!
//! Indices are zero-based and ranges are end-exclusive, as in
//! `nvim_buf_get_lines`.

use async_trait::async_trait;

use crate::error::GameError;

/// A "lines changed" notification for the buffer a session is attached to.
///
/// The driver never looks inside: any notification means "the buffer may
/// have changed, check again".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineEvent {
    /// `b:changedtick` at the time of the change, when the editor sent one.
    pub tick: Option<u64>,
}

#[async_trait]
pub trait Editor: Send + Sync {
    /// Number of lines in the buffer.
    async fn line_count(&self) -> Result<usize, GameError>;

    /// Read lines `[start, end)`. With `strict` unset, out-of-range
    /// indices are clamped instead of failing.
    async fn get_lines(&self, start: usize, end: usize, strict: bool)
        -> Result<Vec<String>, GameError>;

    /// Replace lines `[start, end)` with `lines`.
    async fn set_lines(
        &self,
        start: usize,
        end: usize,
        strict: bool,
        lines: Vec<String>,
    ) -> Result<(), GameError>;

    async fn remove_lines(&self, start: usize, end: usize, strict: bool) -> Result<(), GameError> {
        self.set_lines(start, end, strict, Vec::new()).await
    }

    async fn insert_lines(&self, at: usize, lines: Vec<String>) -> Result<(), GameError> {
        self.set_lines(at, at, true, lines).await
    }

    /// Execute an Ex command, e.g. `:12`.
    async fn command(&self, command: &str) -> Result<(), GameError>;

    /// Write to the message area. Nothing is shown until a newline is written.
    async fn out_write(&self, message: &str) -> Result<(), GameError>;

    /// Write a line to the error channel.
    async fn err_writeln(&self, message: &str) -> Result<(), GameError>;

    /// Start delivering line-change notifications for the buffer.
    async fn subscribe(&self) -> Result<(), GameError>;

    /// Stop delivering line-change notifications.
    async fn unsubscribe(&self) -> Result<(), GameError>;
}
