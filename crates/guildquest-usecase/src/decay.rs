//! DecayTimer - The companion's clock
//!
//! While a session is active the companion gets hungrier and sadder on a
//! fixed period. The timer is a single tokio task: ticks never overlap,
//! missed ticks are skipped rather than replayed, and the task ends when
//! the timer is stopped or dropped.

use std::sync::Arc;
use std::time::Duration;

use guildquest_domain::{GuildEvent, GuildState, Guildmaster};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Handle to a running decay task
#[derive(Debug)]
pub struct DecayTimer {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl DecayTimer {
    /// Start decaying `state` every `period`, first tick one period from now
    pub fn spawn(state: Arc<Mutex<GuildState>>, period: Duration) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let guildmaster = Guildmaster::new();
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut state = state.lock().await;
                        if let GuildEvent::Decayed { hunger, happiness } = guildmaster.decay(&mut state) {
                            trace!(hunger, happiness, "companion decayed");
                        }
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("decay timer stopped");
        });

        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stop ticking and wait for the task to finish
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DecayTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.shutdown.send(true);
            handle.abort();
        }
    }
}
