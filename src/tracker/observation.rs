// src/tracker/observation.rs

//! Async shell around [`TrackerCore`].
//!
//! Each observation is one Tokio task that owns its interval timer and
//! performs at most one fetch at a time. The observer holds an
//! [`Observation`] handle to read the current state, receive events, and
//! cancel.
//!
//! Cancellation and terminal transitions are arbitrated on the same `watch`
//! cell: whichever reaches it first wins, so a cancelled observation never
//! delivers a terminal event and a finished one cannot be cancelled.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::BatchApi;
use crate::errors::{BatchrouteError, Result};
use crate::types::BatchId;

use super::core::TrackerCore;
use super::{ObservationState, PollOutcome, TerminalOutcome, TrackerEvent, TrackerOptions};

/// Starts observations of submitted batches against a [`BatchApi`].
pub struct JobStatusTracker<A: BatchApi + 'static> {
    api: Arc<A>,
    options: TrackerOptions,
}

impl<A: BatchApi + 'static> fmt::Debug for JobStatusTracker<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobStatusTracker")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<A: BatchApi + 'static> JobStatusTracker<A> {
    pub fn new(api: Arc<A>, options: TrackerOptions) -> Self {
        Self { api, options }
    }

    pub fn options(&self) -> &TrackerOptions {
        &self.options
    }

    /// Start polling `batch_id` every `poll_interval`.
    ///
    /// Must be called from within a Tokio runtime. Observations are fully
    /// independent; several batches can be tracked at once. A zero interval
    /// is a [`BatchrouteError::Precondition`] error.
    pub fn observe(&self, batch_id: BatchId, poll_interval: Duration) -> Result<Observation> {
        if poll_interval.is_zero() {
            return Err(BatchrouteError::Precondition(format!(
                "poll interval for batch {batch_id} must be non-zero"
            )));
        }

        let (state_tx, state_rx) = watch::channel(ObservationState::Polling);
        let state_tx = Arc::new(state_tx);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_observation(
            Arc::clone(&self.api),
            batch_id.clone(),
            poll_interval,
            self.options,
            Arc::clone(&state_tx),
            event_tx,
        ));

        Ok(Observation {
            batch_id,
            state_tx,
            state_rx,
            events: event_rx,
        })
    }
}

/// Handle to a running observation.
///
/// Dropping the handle cancels the observation.
pub struct Observation {
    batch_id: BatchId,
    state_tx: Arc<watch::Sender<ObservationState>>,
    state_rx: watch::Receiver<ObservationState>,
    events: mpsc::UnboundedReceiver<TrackerEvent>,
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observation")
            .field("batch_id", &self.batch_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Observation {
    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    pub fn state(&self) -> ObservationState {
        *self.state_rx.borrow()
    }

    /// Whether the observation is still polling.
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Stop observing. Returns `true` if this call cancelled a polling
    /// observation, `false` if it had already ended (a no-op).
    ///
    /// A fetch that is already in flight is allowed to finish; its result is
    /// discarded.
    pub fn cancel(&self) -> bool {
        let cancelled = self.state_tx.send_if_modified(|state| {
            if state.is_active() {
                *state = ObservationState::Cancelled;
                true
            } else {
                false
            }
        });

        if cancelled {
            info!(batch_id = %self.batch_id, "observation cancelled");
        }
        cancelled
    }

    /// Next delivered event.
    ///
    /// Returns `None` once the terminal event has been taken, or as soon as
    /// the observation is cancelled (events still buffered at that point are
    /// dropped).
    pub async fn next_event(&mut self) -> Option<TrackerEvent> {
        if self.state() == ObservationState::Cancelled {
            return None;
        }
        let event = self.events.recv().await?;
        if self.state() == ObservationState::Cancelled {
            return None;
        }
        Some(event)
    }

    /// Drain events until the terminal one and return it, or `None` if the
    /// observation was cancelled first.
    pub async fn wait_for_outcome(mut self) -> Option<TrackerEvent> {
        while let Some(event) = self.next_event().await {
            if event.is_terminal() {
                return Some(event);
            }
        }
        None
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_observation<A: BatchApi + 'static>(
    api: Arc<A>,
    batch_id: BatchId,
    poll_interval: Duration,
    options: TrackerOptions,
    state: Arc<watch::Sender<ObservationState>>,
    events: mpsc::UnboundedSender<TrackerEvent>,
) {
    let _settle = SettleOnExit {
        batch_id: batch_id.clone(),
        state: Arc::clone(&state),
        events: events.clone(),
    };
    let mut core = TrackerCore::new(batch_id.clone(), &options);
    let mut cancelled = state.subscribe();

    let first_tick = if options.fetch_immediately {
        Instant::now()
    } else {
        Instant::now() + poll_interval
    };
    // The timer lives exactly as long as this task. With `Delay`, a slow
    // fetch pushes the next tick back instead of bunching ticks up.
    let mut ticker = time::interval_at(first_tick, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(batch_id = %batch_id, interval_ms = poll_interval.as_millis() as u64, "observation started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = async { let _ = cancelled.wait_for(|s| !s.is_active()).await; } => {
                debug!(batch_id = %batch_id, "observation ended while waiting for next tick");
                break;
            }
        }

        // Single in-flight fetch: the next tick is only awaited after this
        // one resolves.
        let outcome = match api.fetch_batch(&batch_id).await {
            Ok(resource) => match resource.classify(&batch_id) {
                Ok(fetched) => PollOutcome::Fetched(fetched),
                Err(err) => PollOutcome::FetchFailed(err),
            },
            Err(err) => PollOutcome::FetchFailed(err),
        };

        let step = core.step(outcome);
        let keep_polling = step.keep_polling();

        if !deliver(&state, &events, step.event, step.next_state) {
            debug!(batch_id = %batch_id, poll = core.polls(), "discarding poll result after cancellation");
            break;
        }
        if !keep_polling {
            break;
        }
    }

    debug!(batch_id = %batch_id, polls = core.polls(), "observation task finished");
}

/// Ends an observation whose task stopped without reaching a terminal state
/// or being cancelled (a panicking backend, a runtime shutting down). The
/// observer then sees `Unreachable` instead of a handle stuck in `Polling`.
struct SettleOnExit {
    batch_id: BatchId,
    state: Arc<watch::Sender<ObservationState>>,
    events: mpsc::UnboundedSender<TrackerEvent>,
}

impl Drop for SettleOnExit {
    fn drop(&mut self) {
        if !self.state.borrow().is_active() {
            return;
        }
        warn!(batch_id = %self.batch_id, "observation task ended unexpectedly");
        deliver(
            &self.state,
            &self.events,
            TrackerEvent::Unreachable {
                consecutive_failures: 0,
                last_error: "observation task ended unexpectedly".to_string(),
            },
            ObservationState::Terminal(TerminalOutcome::Unreachable),
        );
    }
}

/// Move to `next` and hand `event` to the observer, unless the observation
/// was cancelled in the meantime. Returns whether the event was delivered.
fn deliver(
    state: &watch::Sender<ObservationState>,
    events: &mpsc::UnboundedSender<TrackerEvent>,
    event: TrackerEvent,
    next: ObservationState,
) -> bool {
    let mut accepted = false;
    state.send_if_modified(|current| {
        if !current.is_active() {
            return false;
        }
        accepted = true;
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });

    if accepted {
        // The receiver may already be gone; nothing left to notify then.
        let _ = events.send(event);
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deliver_refuses_after_cancel() {
        let (tx, _rx) = watch::channel(ObservationState::Cancelled);
        let (etx, mut erx) = mpsc::unbounded_channel();
        let ok = deliver(&tx, &etx, TrackerEvent::Optimizing { poll: 1 }, ObservationState::Polling);
        assert!(!ok);
        assert!(erx.try_recv().is_err());
    }

    #[test]
    fn terminal_delivery_wins_over_later_cancel() {
        let (tx, rx) = watch::channel(ObservationState::Polling);
        let (etx, mut erx) = mpsc::unbounded_channel();
        let next = ObservationState::Terminal(TerminalOutcome::Unreachable);
        let event = TrackerEvent::Unreachable {
            consecutive_failures: 1,
            last_error: "x".into(),
        };
        assert!(deliver(&tx, &etx, event.clone(), next));
        assert_eq!(*rx.borrow(), next);
        assert_eq!(erx.try_recv().unwrap(), event);

        // A later cancel is a no-op.
        let changed = tx.send_if_modified(|s| {
            if s.is_active() {
                *s = ObservationState::Cancelled;
                true
            } else {
                false
            }
        });
        assert!(!changed);
        assert_eq!(*rx.borrow(), next);
    }
}
