// src/tracker/mod.rs

//! Job status tracking for submitted batches.
//!
//! A submitted batch is optimized remotely; this module watches it move from
//! `optimizing` to `ready` or `failed` by polling at a fixed cadence.
//!
//! The pure state machine lives in [`core`]; the async shell that owns the
//! timer, performs fetches and handles cancellation is in [`observation`].

use crate::api::{ApiError, Fetched};
use crate::batch::DeliveryBatch;

/// How an observation ended on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalOutcome {
    /// The batch reached `ready`.
    Ready,
    /// The batch reached `failed`. A business outcome, not an error.
    Failed,
    /// Too many consecutive polls failed; the service is considered
    /// unreachable for this observation.
    Unreachable,
}

/// Lifecycle of a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationState {
    Polling,
    Terminal(TerminalOutcome),
    Cancelled,
}

impl ObservationState {
    /// Only `Polling` observations schedule further ticks.
    pub fn is_active(&self) -> bool {
        matches!(self, ObservationState::Polling)
    }
}

/// Status update delivered to the observer.
///
/// A stream of these is always some number of non-terminal events followed
/// by at most one terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// The batch is still being optimized.
    Optimizing { poll: u64 },

    /// The server answered with a status outside the known set. Polling
    /// continues, but this is reported distinctly from `Optimizing`.
    UnrecognizedStatus { poll: u64, status: String },

    /// A poll failed. Non-fatal; the reported batch status is unchanged.
    FetchFailed {
        poll: u64,
        consecutive_failures: u32,
        error: String,
    },

    Ready(DeliveryBatch),
    Failed(DeliveryBatch),
    Unreachable {
        consecutive_failures: u32,
        last_error: String,
    },
}

impl TrackerEvent {
    pub fn terminal_outcome(&self) -> Option<TerminalOutcome> {
        match self {
            TrackerEvent::Ready(_) => Some(TerminalOutcome::Ready),
            TrackerEvent::Failed(_) => Some(TerminalOutcome::Failed),
            TrackerEvent::Unreachable { .. } => Some(TerminalOutcome::Unreachable),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal_outcome().is_some()
    }
}

/// Result of one poll, as fed into the core.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Fetched(Fetched),
    FetchFailed(ApiError),
}

/// Knobs for every observation started by a tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerOptions {
    /// Consecutive failed polls tolerated; the next failure ends the
    /// observation as [`TerminalOutcome::Unreachable`]. `Some(0)` gives up on
    /// the first failure, `None` polls through failures indefinitely.
    pub max_consecutive_failures: Option<u32>,

    /// Fetch right away instead of waiting one interval for the first tick.
    pub fetch_immediately: bool,
}

pub mod core;
pub mod observation;

pub use self::core::{TrackerCore, TrackerStep};
pub use observation::{JobStatusTracker, Observation};
