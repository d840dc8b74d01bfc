//! Periodic update checks on a background thread

use anyhow::{Context, Result};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::formatting::format_interval;
use crate::updates::{Connectivity, CycleOutcome, Notifier, UpdateBackend, UpdateChecker};

enum Command {
    Trigger,
    Stop,
}

/// Runs an update cycle at start, then every `interval` and on `trigger()`
pub struct UpdateScheduler {
    commands: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl UpdateScheduler {
    pub fn spawn<B, C, N>(checker: Arc<UpdateChecker<B, C, N>>, interval: Duration) -> Result<Self>
    where
        B: UpdateBackend + 'static,
        C: Connectivity + 'static,
        N: Notifier + 'static,
    {
        Self::spawn_with(interval, move || checker.run_cycle())
    }

    /// Same as [`spawn`](Self::spawn) with an arbitrary cycle function
    pub fn spawn_with<F>(interval: Duration, mut cycle: F) -> Result<Self>
    where
        F: FnMut() -> CycleOutcome + Send + 'static,
    {
        let (commands, rx) = channel();
        let handle = std::thread::Builder::new()
            .name("update-scheduler".to_string())
            .spawn(move || loop {
                let outcome = cycle();
                log::debug!("Update cycle finished: {}", outcome);

                match rx.recv_timeout(interval) {
                    Ok(Command::Trigger) | Err(RecvTimeoutError::Timeout) => {}
                    Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .context("Failed to spawn update scheduler")?;

        log::info!("Checking for updates every {}", format_interval(interval));
        Ok(Self {
            commands,
            handle: Some(handle),
        })
    }

    /// Requests an immediate cycle
    pub fn trigger(&self) {
        if self.commands.send(Command::Trigger).is_err() {
            log::warn!("Update scheduler is not running");
        }
    }

    /// Stops the thread and waits for the running cycle to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else { return };
        let _ = self.commands.send(Command::Stop);
        if handle.join().is_err() {
            log::error!("Update scheduler thread panicked");
        }
    }
}

impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
