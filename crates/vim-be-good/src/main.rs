//! vim-be-good - a Neovim remote plugin
//!
//! # How this works
//!
//! 1. This binary is started by the editor with `jobstart(..., {rpc = true})`
//! 2. Communication happens over stdin/stdout using msgpack-rpc
//! 3. The editor sends the `VimBeGood2` command and buffer notifications
//! 4. We drive the game by reading and writing the current buffer
//!
//! # Why we use stderr for logging
//!
//! Since stdin/stdout carry the RPC stream, we CANNOT use println!() for
//! debugging. The `tracing` subscriber writes to stderr instead.

mod plugin;

use anyhow::Context;
use nvim_rs::create::tokio as create;
use tracing_subscriber::EnvFilter;

use vim_be_good_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug to see debug messages
    // Example: RUST_LOG=vim_be_good=debug,vim_be_good_core=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr) // IMPORTANT: write to stderr, not stdout
        .with_ansi(false)
        .init();

    let config = Config::from_env().context("loading configuration")?;

    tracing::info!(
        "Starting vim-be-good (dev: {}, alwaysInit: {}, rounds: {})",
        config.plugin.dev,
        config.plugin.always_init,
        config.game.rounds
    );

    let handler = plugin::PluginHandler::new(config);

    // Runs until Neovim closes the channel
    let (_nvim, io_handler) = create::new_parent(handler)
        .await
        .context("connecting to Neovim over stdio")?;

    match io_handler.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            // A closed reader is how a normal shutdown looks.
            if !err.is_reader_error() {
                tracing::error!("RPC loop failed: {}", err);
            }
        }
        Err(err) => tracing::error!("RPC loop panicked: {}", err),
    }

    tracing::info!("vim-be-good stopped");
    Ok(())
}
