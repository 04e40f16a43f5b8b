// Timer - recurring tick source owned by a running Clock
// One thread per timer; ticks are posted to the engine as commands

use crate::messaging::channels::CommandSender;
use crate::messaging::command::Command;
use crossbeam_channel::{Sender, bounded, select, tick};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Spawns timers that post into the engine's command channel
///
/// Clones share one generation counter, so no two timers spawned from the
/// same ticker ever carry the same generation.
#[derive(Clone)]
pub struct Ticker {
    command_tx: CommandSender,
    generations: Arc<AtomicU64>,
}

impl Ticker {
    pub fn new(command_tx: CommandSender) -> Self {
        Self {
            command_tx,
            generations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a recurring timer posting `Command::Tick` every `interval`
    ///
    /// The first tick is posted one full interval after the call.
    pub fn spawn(&self, track: usize, interval: Duration) -> io::Result<TimerHandle> {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let command_tx = self.command_tx.clone();

        let thread = thread::Builder::new()
            .name(format!("clock-{}", track))
            .spawn(move || {
                let ticks = tick(interval);
                loop {
                    select! {
                        recv(cancel_rx) -> _ => break,
                        recv(ticks) -> _ => {
                            if command_tx.send(Command::Tick { track, generation }).is_err() {
                                // Engine is gone
                                break;
                            }
                        }
                    }
                }
                log::trace!("clock {} timer (generation {}) stopped", track, generation);
            })?;

        Ok(TimerHandle {
            generation,
            cancel_tx: Some(cancel_tx),
            thread: Some(thread),
        })
    }
}

/// Owned handle to a running timer; dropping it cancels the timer
pub struct TimerHandle {
    generation: u64,
    cancel_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TimerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the timer and wait for its thread to exit
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Disconnecting the cancel channel wakes the select immediately
        self.cancel_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("timer thread (generation {}) panicked", self.generation);
            }
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::create_command_channel;

    #[test]
    fn test_timer_posts_ticks() {
        let (tx, rx) = create_command_channel();
        let ticker = Ticker::new(tx);
        let handle = ticker.spawn(3, Duration::from_millis(5)).unwrap();

        let cmd = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        match cmd {
            Command::Tick { track, generation } => {
                assert_eq!(track, 3);
                assert_eq!(generation, handle.generation());
            }
            _ => panic!("Expected Tick command"),
        }

        handle.cancel();
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let (tx, rx) = create_command_channel();
        let ticker = Ticker::new(tx);
        let handle = ticker.spawn(0, Duration::from_millis(2)).unwrap();

        handle.cancel();
        // Drain anything posted before cancellation
        while rx.try_recv().is_ok() {}

        thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_generations_unique_across_clones() {
        let (tx, _rx) = create_command_channel();
        let ticker = Ticker::new(tx);
        let other = ticker.clone();

        let a = ticker.spawn(0, Duration::from_secs(60)).unwrap();
        let b = other.spawn(0, Duration::from_secs(60)).unwrap();
        assert_ne!(a.generation(), b.generation());
    }

    #[test]
    fn test_drop_cancels_timer() {
        let (tx, rx) = create_command_channel();
        let ticker = Ticker::new(tx);
        {
            let _handle = ticker.spawn(0, Duration::from_millis(2)).unwrap();
        }
        while rx.try_recv().is_ok() {}

        thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());
    }
}
