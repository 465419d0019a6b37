//! The remote plugin handler.
//!
//! # Plugin Lifecycle
//!
//! 1. Neovim starts our binary as an RPC job (see `plugin/vim-be-good.lua`)
//! 2. The host may ask for `specs` / `options`; we answer from the manifest
//! 3. `:VimBeGood2 relative` arrives as a notification and starts a session
//! 4. The session attaches to its buffer; `nvim_buf_lines_event`
//!    notifications are routed to it until it finishes or the buffer detaches

mod editor;
mod manifest;
mod utils;

pub use editor::NvimEditor;
pub use manifest::COMMAND;

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::io::AsyncWrite;
use nvim_rs::{Handler, Neovim, Value};
use tokio::sync::mpsc;

use vim_be_good_core::{
    launch, Config, GameError, GameState, Launch, LineEvent, Outcome, Registry, RoundDriver,
};

use utils::BufferKey;

/// A running session, as seen from the RPC side.
struct Session {
    id: u64,
    events: mpsc::UnboundedSender<LineEvent>,
}

/// The vim-be-good remote plugin.
///
/// This struct holds all the state shared between RPC callbacks:
/// - `config`: Loaded once at start-up
/// - `registry`: Games selectable by name
/// - `sessions`: Running sessions, keyed by the buffer they play in
pub struct PluginHandler<W> {
    config: Arc<Config>,
    registry: Arc<Registry>,

    /// Running sessions. Dropping an entry closes the session's event
    /// channel, which ends its driver.
    sessions: Arc<DashMap<BufferKey, Session>>,

    next_session: Arc<AtomicU64>,

    _writer: PhantomData<fn() -> W>,
}

impl<W> Clone for PluginHandler<W> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            registry: self.registry.clone(),
            sessions: self.sessions.clone(),
            next_session: self.next_session.clone(),
            _writer: PhantomData,
        }
    }
}

impl<W> PluginHandler<W>
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(Registry::builtin()),
            sessions: Arc::new(DashMap::new()),
            next_session: Arc::new(AtomicU64::new(0)),
            _writer: PhantomData,
        }
    }

    /// Run `:VimBeGood2 <args>`.
    async fn run_command(&self, args: Vec<String>, neovim: Neovim<W>) {
        tracing::info!("{} {:?}", COMMAND, args);

        if let Err(err) = self.start_session(&args, neovim.clone()).await {
            tracing::error!("{} failed: {}", COMMAND, err);
            let message = format!("Error#{} {}\n", args.join(","), err);
            if let Err(write_err) = neovim.out_write(&message).await {
                tracing::warn!("Could not report error: {}", write_err);
            }
        }
    }

    async fn start_session(&self, args: &[String], neovim: Neovim<W>) -> Result<(), GameError> {
        let editor = NvimEditor::current(neovim).await?;

        let game = match launch(&editor, args, &self.registry, &self.config.game).await? {
            Launch::Ready(game) => game,
            Launch::Rejected => return Ok(()),
        };

        let key = editor
            .key()
            .ok_or_else(|| GameError::Editor("current buffer has no handle".to_string()))?;

        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        if self
            .sessions
            .insert(key.clone(), Session { id, events: tx })
            .is_some()
        {
            tracing::warn!("Replacing a running session on the same buffer");
        }

        let sessions = self.sessions.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            let state = GameState::new(&config.game);
            let outcome = RoundDriver::new(&editor, game.as_ref(), state, &config)
                .run(rx)
                .await;

            sessions.remove_if(&key, |_, session| session.id == id);

            match outcome {
                Ok(Outcome::Finished(summary)) => {
                    tracing::info!("Session {} done: {:?}", id, summary.results)
                }
                Ok(Outcome::Abandoned) => tracing::info!("Session {} abandoned", id),
                Err(err) => tracing::warn!("Session {} failed: {}", id, err),
            }
        });

        Ok(())
    }

    fn route_line_event(&self, args: &[Value]) {
        let Some((key, event)) = utils::line_event(args) else {
            tracing::warn!("Malformed nvim_buf_lines_event: {:?}", args);
            return;
        };

        match self.sessions.get(&key) {
            Some(session) => {
                if session.events.send(event).is_err() {
                    tracing::debug!("Line event for a session that already ended");
                }
            }
            None => tracing::debug!("Line event for a buffer with no session"),
        }
    }

    fn drop_session(&self, args: &[Value]) {
        if let Some(key) = args.first().and_then(utils::buffer_key) {
            if let Some((_, session)) = self.sessions.remove(&key) {
                tracing::info!("Buffer detached, ending session {}", session.id);
            }
        }
    }
}

#[async_trait]
impl<W> Handler for PluginHandler<W>
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    type Writer = W;

    async fn handle_request(
        &self,
        name: String,
        _args: Vec<Value>,
        _neovim: Neovim<W>,
    ) -> Result<Value, Value> {
        tracing::debug!("Request: {}", name);
        match name.as_str() {
            "specs" => Ok(manifest::specs()),
            "options" => Ok(manifest::options(&self.config.plugin)),
            "poll" => Ok(Value::from("ok")),
            _ => Err(Value::from(format!("Unknown request: {}", name))),
        }
    }

    async fn handle_notify(&self, name: String, args: Vec<Value>, neovim: Neovim<W>) {
        match name.as_str() {
            COMMAND => {
                // The command talks to Neovim; never block the RPC loop on it.
                let handler = self.clone();
                let args = utils::command_args(&args);
                tokio::spawn(async move { handler.run_command(args, neovim).await });
            }
            "nvim_buf_lines_event" => self.route_line_event(&args),
            "nvim_buf_detach_event" => self.drop_session(&args),
            "nvim_buf_changedtick_event" => {}
            _ => tracing::warn!("Unhandled notification: {}", name),
        }
    }
}
