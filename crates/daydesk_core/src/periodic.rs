//! Cancellable periodic background work.
//!
//! # Responsibility
//! - Run a callback on a fixed interval on a dedicated thread.
//! - Stop promptly on `cancel()` or drop; no interval outlives its owner.
//!
//! # Invariants
//! - After `cancel()` returns, the callback will not run again.
//! - Ticks never overlap: a slow callback delays the next tick.

use crossbeam::channel::{bounded, select, tick, Sender};
use log::{info, warn};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct PeriodicTask {
    name: &'static str,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Starts calling `on_tick` every `interval`; the first call happens
    /// one interval after spawn.
    pub fn spawn<F>(name: &'static str, interval: Duration, mut on_tick: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let ticker = tick(interval);

        let handle = thread::Builder::new()
            .name(format!("daydesk-{name}"))
            .spawn(move || loop {
                select! {
                    recv(ticker) -> _ => on_tick(),
                    recv(stop_rx) -> _ => break,
                }
            })?;

        info!(
            "event=periodic_start module=periodic status=ok task={name} interval_ms={}",
            interval.as_millis()
        );

        Ok(Self {
            name,
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stops the task and waits for an in-flight tick to finish.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the stop channel, which wakes `select!`.
        if self.stop.take().is_none() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(
                    "event=periodic_stop module=periodic status=error task={} error_code=tick_panicked",
                    self.name
                );
                return;
            }
        }
        info!(
            "event=periodic_stop module=periodic status=ok task={}",
            self.name
        );
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}
