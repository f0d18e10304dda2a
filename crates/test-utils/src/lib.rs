pub mod builders;
pub mod fake_api;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use batchroute::tracker::{Observation, TrackerEvent};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Generous timeout for tests on a paused clock, where the limit is virtual
/// time and only guards against an observation that never ends.
pub async fn within_virtual_hour<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(3600), f)
        .await
        .expect("Test did not finish within one virtual hour")
}

/// Drain an observation until it ends, returning every delivered event.
pub async fn collect_events(observation: &mut Observation) -> Vec<TrackerEvent> {
    let mut events = Vec::new();
    while let Some(event) = observation.next_event().await {
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}
