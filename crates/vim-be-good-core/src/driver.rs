// This file is part of vim-be-good.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! The round driver.
//!
//! # Session lifecycle
//!
//! 1. Countdown on the debug channel, then "Game Started"
//! 2. `clear` + `run`, subscribe to line events, start the clock
//! 3. Every line event runs one win check; a win records the round and
//!    either renders the next one or reports the average and unsubscribes
//!
//! The driver is owned by a single task. Line events that arrive while a
//! check is awaiting the editor are not queued one by one: they are counted
//! and coalesced into a single replayed check once the current one is done.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use crate::config::Config;
use crate::editor::{Editor, LineEvent};
use crate::error::GameError;
use crate::game::Game;
use crate::state::GameState;

/// Keeps win checks from overlapping.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckGuard {
    in_flight: bool,
    missed: usize,
}

impl CheckGuard {
    /// Claim the guard. If a check is already in flight the event is
    /// counted as missed and `false` is returned.
    pub fn try_enter(&mut self) -> bool {
        if self.in_flight {
            self.missed += 1;
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Release the guard. Returns `true` when events were missed meanwhile
    /// and one replay is owed.
    pub fn release(&mut self) -> bool {
        self.in_flight = false;
        let replay = self.missed > 0;
        self.missed = 0;
        replay
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn missed(&self) -> usize {
        self.missed
    }
}

/// Scores of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub results: Vec<u64>,
    pub average_ms: f64,
    /// Rounds completed; equals `ending.count`.
    pub rounds: usize,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Finished(SessionSummary),
    /// The line event stream closed before the last round was won.
    Abandoned,
}

enum Verdict {
    Continue,
    Finished(SessionSummary),
}

pub struct RoundDriver<'a> {
    editor: &'a dyn Editor,
    game: &'a dyn Game,
    state: GameState,
    guard: CheckGuard,
    round_start: Instant,
    countdown_interval: Duration,
    echo_debug: bool,
}

impl<'a> RoundDriver<'a> {
    pub fn new(editor: &'a dyn Editor, game: &'a dyn Game, state: GameState, config: &Config) -> Self {
        Self {
            editor,
            game,
            state,
            guard: CheckGuard::default(),
            round_start: Instant::now(),
            countdown_interval: Duration::from_millis(config.game.countdown_interval_ms),
            echo_debug: config.plugin.dev,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Play the session to the end.
    ///
    /// A failure while starting is reported to the user and returned. After
    /// that, errors only ever cost a single win check.
    pub async fn run(mut self, mut events: UnboundedReceiver<LineEvent>) -> Result<Outcome, GameError> {
        if let Err(err) = self.start().await {
            tracing::error!("Session failed to start: {}", err);
            if let Err(write_err) = self.editor.out_write(&format!("Failure {}\n", err)).await {
                tracing::warn!("Could not report failure: {}", write_err);
            }
            return Err(err);
        }

        while let Some(event) = events.recv().await {
            if let Some(summary) = self.on_line_event(event, &mut events).await {
                tracing::info!(
                    "Session finished: {} rounds, average {}ms",
                    summary.rounds,
                    summary.average_ms
                );
                return Ok(Outcome::Finished(summary));
            }
        }

        tracing::info!(
            "Line events closed after {} of {} rounds",
            self.state.current_count,
            self.state.ending.count
        );
        Ok(Outcome::Abandoned)
    }

    async fn start(&mut self) -> Result<(), GameError> {
        for i in 0..3 {
            self.debug(&format!("Game is starting in {} ...", 3 - i)).await;
            if !self.countdown_interval.is_zero() {
                tokio::time::sleep(self.countdown_interval).await;
            }
        }

        self.status(&format!(
            "Game Started: {} / {}",
            self.state.current_count + 1,
            self.state.ending.count
        ))
        .await?;

        self.game.clear(self.editor, &self.state).await?;
        self.game.run(self.editor, &self.state).await?;
        self.editor.subscribe().await?;
        self.round_start = Instant::now();
        Ok(())
    }

    async fn on_line_event(
        &mut self,
        event: LineEvent,
        events: &mut UnboundedReceiver<LineEvent>,
    ) -> Option<SessionSummary> {
        if !self.guard.try_enter() {
            return None;
        }
        tracing::debug!("Line event, tick {:?}", event.tick);

        loop {
            let verdict = self.evaluate(Instant::now()).await;

            // Whatever arrived while the check was in flight.
            while events.try_recv().is_ok() {
                self.guard.try_enter();
            }

            if let Verdict::Finished(summary) = verdict {
                return Some(summary);
            }
            if !self.guard.release() {
                return None;
            }

            tracing::debug!("Replaying coalesced line events");
            self.guard.try_enter();
        }
    }

    async fn evaluate(&mut self, received: Instant) -> Verdict {
        match self.check_round(received).await {
            Ok(verdict) => verdict,
            Err(err) => {
                self.debug(&format!("onLineEvent#error {}", err)).await;
                Verdict::Continue
            }
        }
    }

    async fn check_round(&mut self, received: Instant) -> Result<Verdict, GameError> {
        if !self.game.check_for_win(self.editor, &self.state).await? {
            return Ok(Verdict::Continue);
        }

        let elapsed = received.saturating_duration_since(self.round_start);
        self.state.record_round(elapsed);
        tracing::info!(
            "Round {} / {} cleared in {}ms",
            self.state.current_count,
            self.state.ending.count,
            elapsed.as_millis()
        );

        if self.state.is_complete() {
            return Ok(Verdict::Finished(self.finish().await));
        }

        let round = format!("Round {} / {}", self.state.current_count, self.state.ending.count);
        if let Err(err) = self.status(&round).await {
            tracing::warn!("Could not report round: {}", err);
        }

        self.game.clear(self.editor, &self.state).await?;
        self.game.run(self.editor, &self.state).await?;
        self.round_start = Instant::now();
        Ok(Verdict::Continue)
    }

    /// Report the average and let go of the buffer. Reporting failures are
    /// logged; the session is over either way.
    async fn finish(&mut self) -> SessionSummary {
        let summary = SessionSummary {
            results: self.state.results.clone(),
            average_ms: self.state.average_ms(),
            rounds: self.state.current_count,
        };

        if let Err(err) = self.status(&format!("Average!: {}", summary.average_ms)).await {
            tracing::warn!("Could not report average: {}", err);
        }
        if let Err(err) = self.editor.unsubscribe().await {
            tracing::warn!("Could not detach from buffer: {}", err);
        }
        summary
    }

    async fn status(&self, message: &str) -> Result<(), GameError> {
        tracing::debug!("Status: {}", message);
        self.editor.out_write(&format!("{}\n", message)).await
    }

    async fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
        if !self.echo_debug {
            return;
        }
        if let Err(err) = self.editor.out_write(&format!("{}\n", message)).await {
            tracing::warn!("Could not write debug message: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{DeleteGame, MARKER};
    use crate::testing::FakeEditor;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    /// Never wins; counts how often it was asked.
    #[derive(Default)]
    struct CountingGame {
        checks: AtomicUsize,
    }

    #[async_trait]
    impl Game for CountingGame {
        async fn run(&self, _: &dyn Editor, _: &GameState) -> Result<(), GameError> {
            Ok(())
        }

        async fn clear(&self, _: &dyn Editor, _: &GameState) -> Result<(), GameError> {
            Ok(())
        }

        async fn check_for_win(&self, _: &dyn Editor, _: &GameState) -> Result<bool, GameError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    /// Fails to render.
    struct BrokenGame;

    #[async_trait]
    impl Game for BrokenGame {
        async fn run(&self, _: &dyn Editor, _: &GameState) -> Result<(), GameError> {
            Err(GameError::Editor("set_lines rejected".to_string()))
        }

        async fn clear(&self, _: &dyn Editor, _: &GameState) -> Result<(), GameError> {
            Ok(())
        }

        async fn check_for_win(&self, _: &dyn Editor, _: &GameState) -> Result<bool, GameError> {
            Ok(true)
        }
    }

    fn config(rounds: usize) -> Config {
        Config {
            game: GameConfig {
                rounds,
                seed: Some(11),
                ..GameConfig::default()
            },
            ..Config::default()
        }
    }

    fn has_marker(editor: &FakeEditor) -> bool {
        editor.lines().iter().any(|l| l == MARKER)
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    /// Spawn a delete-line session on a shared fake editor.
    fn spawn_session(
        editor: Arc<FakeEditor>,
        config: Config,
    ) -> (
        mpsc::UnboundedSender<LineEvent>,
        tokio::task::JoinHandle<Result<Outcome, GameError>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let game = DeleteGame::new(&config.game);
            let state = GameState::new(&config.game);
            RoundDriver::new(&*editor, &game, state, &config).run(rx).await
        });
        (tx, handle)
    }

    #[test]
    fn test_guard_counts_missed_events() {
        let mut guard = CheckGuard::default();
        assert!(guard.try_enter());
        assert!(guard.in_flight());
        assert!(!guard.try_enter());
        assert!(!guard.try_enter());
        assert_eq!(guard.missed(), 2);

        assert!(guard.release());
        assert!(!guard.in_flight());
        assert_eq!(guard.missed(), 0);
    }

    #[test]
    fn test_guard_release_without_misses() {
        let mut guard = CheckGuard::default();
        assert!(guard.try_enter());
        assert!(!guard.release());
        assert!(guard.try_enter());
    }

    #[tokio::test]
    async fn test_burst_is_checked_once_then_replayed_once() {
        let editor = FakeEditor::new();
        let game = CountingGame::default();
        let config = config(3);
        let (tx, rx) = mpsc::unbounded_channel();

        for _ in 0..5 {
            tx.send(LineEvent::default()).unwrap();
        }
        drop(tx);

        let outcome = RoundDriver::new(&editor, &game, GameState::new(&config.game), &config)
            .run(rx)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Abandoned);
        // One check for the first event, one replay for the four coalesced ones.
        assert_eq!(game.checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_event_is_not_replayed() {
        let editor = FakeEditor::new();
        let game = CountingGame::default();
        let config = config(3);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(LineEvent::default()).unwrap();
        drop(tx);

        RoundDriver::new(&editor, &game, GameState::new(&config.game), &config)
            .run(rx)
            .await
            .unwrap();

        assert_eq!(game.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_countdown_and_start_messages() {
        let editor = FakeEditor::new();
        let game = CountingGame::default();
        let config = config(4);
        let (tx, rx) = mpsc::unbounded_channel::<LineEvent>();
        drop(tx);

        RoundDriver::new(&editor, &game, GameState::new(&config.game), &config)
            .run(rx)
            .await
            .unwrap();

        assert_eq!(
            editor.out(),
            vec![
                "Game is starting in 3 ...\n".to_string(),
                "Game is starting in 2 ...\n".to_string(),
                "Game is starting in 1 ...\n".to_string(),
                "Game Started: 1 / 4\n".to_string(),
            ]
        );
        assert!(editor.subscribed());
    }

    #[tokio::test]
    async fn test_debug_echo_off() {
        let editor = FakeEditor::new();
        let game = CountingGame::default();
        let mut config = config(4);
        config.plugin.dev = false;
        let (tx, rx) = mpsc::unbounded_channel::<LineEvent>();
        drop(tx);

        RoundDriver::new(&editor, &game, GameState::new(&config.game), &config)
            .run(rx)
            .await
            .unwrap();

        assert_eq!(editor.out(), vec!["Game Started: 1 / 4\n".to_string()]);
    }

    #[tokio::test]
    async fn test_start_failure_is_reported() {
        let editor = FakeEditor::new();
        let config = config(2);
        let (_tx, rx) = mpsc::unbounded_channel();

        let result = RoundDriver::new(&editor, &BrokenGame, GameState::new(&config.game), &config)
            .run(rx)
            .await;

        assert!(result.is_err());
        assert!(editor
            .out()
            .iter()
            .any(|l| l == "Failure set_lines rejected\n"));
        assert!(!editor.subscribed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_round_session() {
        let editor = Arc::new(FakeEditor::new());
        let (tx, handle) = spawn_session(editor.clone(), config(1));

        settle().await;
        assert!(editor.subscribed());
        assert!(has_marker(&editor));

        tokio::time::advance(Duration::from_millis(250)).await;
        editor.blank_all();
        tx.send(LineEvent { tick: Some(7) }).unwrap();

        let Outcome::Finished(summary) = handle.await.unwrap().unwrap() else {
            panic!("session did not finish");
        };
        assert_eq!(summary.results, vec![250]);
        assert_eq!(summary.average_ms, 250.0);
        assert_eq!(summary.rounds, 1);
        assert!(editor.out().iter().any(|l| l == "Average!: 250\n"));
        assert!(!editor.subscribed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_round_session() {
        let editor = Arc::new(FakeEditor::new());
        let (tx, handle) = spawn_session(editor.clone(), config(3));
        settle().await;

        for ms in [250, 100, 400] {
            assert!(has_marker(&editor));

            // A change that leaves the marker in place is not a win.
            tx.send(LineEvent::default()).unwrap();
            settle().await;
            assert!(has_marker(&editor));

            tokio::time::advance(Duration::from_millis(ms)).await;
            editor.blank_all();
            tx.send(LineEvent::default()).unwrap();
            settle().await;
        }

        let Outcome::Finished(summary) = handle.await.unwrap().unwrap() else {
            panic!("session did not finish");
        };
        assert_eq!(summary.results, vec![250, 100, 400]);
        assert_eq!(summary.average_ms, 250.0);
        assert_eq!(summary.rounds, 3);

        let out = editor.out();
        assert!(out.iter().any(|l| l == "Round 1 / 3\n"));
        assert!(out.iter().any(|l| l == "Round 2 / 3\n"));
        assert!(out.iter().any(|l| l == "Average!: 250\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_error_is_not_fatal() {
        let editor = Arc::new(FakeEditor::new());
        let (tx, handle) = spawn_session(editor.clone(), config(1));
        settle().await;

        editor.blank_all();
        editor.fail_next_reads(1);
        tx.send(LineEvent::default()).unwrap();
        settle().await;

        assert!(editor
            .out()
            .iter()
            .any(|l| l.starts_with("onLineEvent#error")));
        assert!(!handle.is_finished());

        tx.send(LineEvent::default()).unwrap();
        let Outcome::Finished(summary) = handle.await.unwrap().unwrap() else {
            panic!("session did not finish");
        };
        assert_eq!(summary.results.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_stream_abandons() {
        let editor = Arc::new(FakeEditor::new());
        let (tx, handle) = spawn_session(editor.clone(), config(2));
        settle().await;

        drop(tx);
        assert_eq!(handle.await.unwrap().unwrap(), Outcome::Abandoned);
    }
}
