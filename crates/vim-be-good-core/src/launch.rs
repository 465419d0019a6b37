// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! The body of the `VimBeGood2` command, up to the point a session starts.

use crate::config::GameConfig;
use crate::editor::Editor;
use crate::error::GameError;
use crate::game::{Game, Registry};

/// The error shown when the command is run in a buffer with content.
pub const NOT_EMPTY: &str = "Your file is not empty.";

/// What the command decided.
pub enum Launch {
    /// Start a session with this game.
    Ready(Box<dyn Game>),
    /// The user has been told why nothing started.
    Rejected,
}

impl std::fmt::Debug for Launch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Launch::Ready(_) => f.write_str("Ready"),
            Launch::Rejected => f.write_str("Rejected"),
        }
    }
}

/// Check the buffer is empty and resolve the requested game.
///
/// Never writes to the buffer. Rejections are reported to the user here.
pub async fn launch(
    editor: &dyn Editor,
    args: &[String],
    registry: &Registry,
    config: &GameConfig,
) -> Result<Launch, GameError> {
    let len = editor.line_count().await?;
    let lines = editor.get_lines(0, len, true).await?;

    if lines.iter().any(|line| !line.trim().is_empty()) {
        tracing::info!("Refusing to start: buffer has content");
        editor.err_writeln(NOT_EMPTY).await?;
        return Ok(Launch::Rejected);
    }

    let name = args.first().map(String::as_str).unwrap_or_default();
    match registry.create(name, config) {
        Some(game) => {
            tracing::info!("Starting game: {}", name);
            Ok(Launch::Ready(game))
        }
        None => {
            tracing::info!("Unknown game requested: {:?}", name);
            editor.out_write(&registry.usage()).await?;
            Ok(Launch::Rejected)
        }
    }
}
