//! `Editor` over Neovim's buffer API.

use async_trait::async_trait;
use futures::io::AsyncWrite;
use nvim_rs::{Buffer, Neovim};

use vim_be_good_core::{Editor, GameError};

use super::utils::{buffer_key, BufferKey};

/// The buffer a session plays in, plus the Neovim handle for commands and messages.
pub struct NvimEditor<W>
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    nvim: Neovim<W>,
    buffer: Buffer<W>,
}

impl<W> NvimEditor<W>
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    /// Bind to the current buffer.
    pub async fn current(nvim: Neovim<W>) -> Result<Self, GameError> {
        let buffer = nvim.get_current_buf().await.map_err(GameError::editor)?;
        Ok(Self { nvim, buffer })
    }

    /// Key used to route this buffer's line events.
    pub fn key(&self) -> Option<BufferKey> {
        buffer_key(self.buffer.get_value())
    }
}

fn index(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl<W> Editor for NvimEditor<W>
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    async fn line_count(&self) -> Result<usize, GameError> {
        let count = self.buffer.line_count().await.map_err(GameError::editor)?;
        usize::try_from(count).map_err(GameError::editor)
    }

    async fn get_lines(
        &self,
        start: usize,
        end: usize,
        strict: bool,
    ) -> Result<Vec<String>, GameError> {
        self.buffer
            .get_lines(index(start), index(end), strict)
            .await
            .map_err(GameError::editor)
    }

    async fn set_lines(
        &self,
        start: usize,
        end: usize,
        strict: bool,
        lines: Vec<String>,
    ) -> Result<(), GameError> {
        self.buffer
            .set_lines(index(start), index(end), strict, lines)
            .await
            .map_err(GameError::editor)
    }

    async fn command(&self, command: &str) -> Result<(), GameError> {
        self.nvim.command(command).await.map_err(GameError::editor)
    }

    async fn out_write(&self, message: &str) -> Result<(), GameError> {
        self.nvim.out_write(message).await.map_err(GameError::editor)
    }

    async fn err_writeln(&self, message: &str) -> Result<(), GameError> {
        self.nvim.err_writeln(message).await.map_err(GameError::editor)
    }

    async fn subscribe(&self) -> Result<(), GameError> {
        let attached = self
            .buffer
            .attach(false, Vec::new())
            .await
            .map_err(GameError::editor)?;
        if !attached {
            return Err(GameError::Editor("could not attach to buffer".to_string()));
        }
        Ok(())
    }

    async fn unsubscribe(&self) -> Result<(), GameError> {
        self.buffer.detach().await.map_err(GameError::editor)?;
        Ok(())
    }
}
