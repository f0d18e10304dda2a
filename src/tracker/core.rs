// src/tracker/core.rs

//! Pure tracker state machine.
//!
//! Consumes one [`PollOutcome`] per tick and decides which event to deliver
//! and whether to keep polling. No Tokio types, no IO, so every transition is
//! unit tested directly.

use tracing::{debug, info, warn};

use crate::api::Fetched;
use crate::types::{BatchId, BatchStatus};

use super::{ObservationState, PollOutcome, TerminalOutcome, TrackerEvent, TrackerOptions};

/// Decision returned by the core after a single poll.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerStep {
    /// Event to deliver to the observer.
    pub event: TrackerEvent,
    /// State the observation moves to.
    pub next_state: ObservationState,
}

impl TrackerStep {
    pub fn keep_polling(&self) -> bool {
        self.next_state.is_active()
    }
}

#[derive(Debug)]
pub struct TrackerCore {
    batch_id: BatchId,
    polls: u64,
    consecutive_failures: u32,
    max_consecutive_failures: Option<u32>,
}

impl TrackerCore {
    pub fn new(batch_id: BatchId, options: &TrackerOptions) -> Self {
        Self {
            batch_id,
            polls: 0,
            consecutive_failures: 0,
            max_consecutive_failures: options.max_consecutive_failures,
        }
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Apply the result of one poll.
    pub fn step(&mut self, outcome: PollOutcome) -> TrackerStep {
        self.polls += 1;
        let poll = self.polls;

        match outcome {
            PollOutcome::Fetched(Fetched::Known(batch)) => {
                self.consecutive_failures = 0;
                match batch.status {
                    BatchStatus::Optimizing => {
                        debug!(batch_id = %self.batch_id, poll, "batch still optimizing");
                        polling(TrackerEvent::Optimizing { poll })
                    }
                    BatchStatus::Ready => {
                        info!(
                            batch_id = %self.batch_id,
                            poll,
                            deliveries = batch.deliveries.len(),
                            "batch ready"
                        );
                        terminal(TerminalOutcome::Ready, TrackerEvent::Ready(batch))
                    }
                    BatchStatus::Failed => {
                        info!(batch_id = %self.batch_id, poll, "batch optimization failed");
                        terminal(TerminalOutcome::Failed, TrackerEvent::Failed(batch))
                    }
                }
            }
            PollOutcome::Fetched(Fetched::Unrecognized { status }) => {
                self.consecutive_failures = 0;
                warn!(
                    batch_id = %self.batch_id,
                    poll,
                    status = %status,
                    "server reported an unrecognized batch status; still polling"
                );
                polling(TrackerEvent::UnrecognizedStatus { poll, status })
            }
            PollOutcome::FetchFailed(err) => {
                self.consecutive_failures += 1;
                let consecutive_failures = self.consecutive_failures;
                let error = err.to_string();

                if self
                    .max_consecutive_failures
                    .is_some_and(|max| consecutive_failures > max)
                {
                    warn!(
                        batch_id = %self.batch_id,
                        poll,
                        consecutive_failures,
                        error = %error,
                        "giving up on batch: too many consecutive failed polls"
                    );
                    return terminal(
                        TerminalOutcome::Unreachable,
                        TrackerEvent::Unreachable {
                            consecutive_failures,
                            last_error: error,
                        },
                    );
                }

                warn!(
                    batch_id = %self.batch_id,
                    poll,
                    consecutive_failures,
                    error = %error,
                    "status poll failed; will retry on next tick"
                );
                polling(TrackerEvent::FetchFailed {
                    poll,
                    consecutive_failures,
                    error,
                })
            }
        }
    }
}

fn polling(event: TrackerEvent) -> TrackerStep {
    TrackerStep {
        event,
        next_state: ObservationState::Polling,
    }
}

fn terminal(outcome: TerminalOutcome, event: TrackerEvent) -> TrackerStep {
    TrackerStep {
        event,
        next_state: ObservationState::Terminal(outcome),
    }
}
