// src/lib.rs

pub mod api;
pub mod batch;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod render;
pub mod tracker;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

use crate::api::{ApiError, BatchApi, CreateBatchRequest, Fetched, HttpBatchApi};
use crate::batch::{BatchSubmitter, DeliveryBatch, load_draft};
use crate::cli::{CliArgs, Command, PollArgs};
use crate::config::{ConfigFile, load_or_default};
use crate::errors::BatchrouteError;
use crate::render::RouteProjector;
use crate::tracker::{JobStatusTracker, TrackerEvent, TrackerOptions};
use crate::types::{BatchId, BatchStatus};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the HTTP client
/// - submission, tracking and projection
/// - Ctrl-C handling while watching
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;

    match args.command {
        Command::Submit {
            draft,
            dry_run,
            watch,
            poll,
        } => {
            let draft = load_draft(&draft)?;

            if dry_run {
                let request = draft.validate()?;
                print_dry_run(&request)?;
                return Ok(());
            }

            let api = Arc::new(HttpBatchApi::new(&cfg.server)?);
            let batch_id = BatchSubmitter::new(Arc::clone(&api)).submit(&draft).await?;
            println!("{batch_id}");

            if watch {
                watch_batch(api, &cfg, batch_id, &poll).await?;
            }
            Ok(())
        }
        Command::Watch { batch_id, poll } => {
            let api = Arc::new(HttpBatchApi::new(&cfg.server)?);
            watch_batch(api, &cfg, BatchId::new(batch_id), &poll).await
        }
        Command::Show { batch_id } => {
            let api = HttpBatchApi::new(&cfg.server)?;
            show_batch(&api, &cfg, BatchId::new(batch_id)).await
        }
    }
}

/// Merge the `[polling]` section with CLI overrides.
fn tracker_settings(cfg: &ConfigFile, poll: &PollArgs) -> (TrackerOptions, Duration) {
    let options = TrackerOptions {
        max_consecutive_failures: poll
            .max_failures
            .or(cfg.polling.max_consecutive_failures),
        fetch_immediately: cfg.polling.fetch_immediately,
    };
    let interval = Duration::from_millis(poll.interval_ms.unwrap_or(cfg.polling.interval_ms));
    (options, interval)
}

async fn watch_batch<A: BatchApi + 'static>(
    api: Arc<A>,
    cfg: &ConfigFile,
    batch_id: BatchId,
    poll: &PollArgs,
) -> Result<()> {
    let (options, interval) = tracker_settings(cfg, poll);
    info!(%batch_id, interval_ms = interval.as_millis() as u64, max_failures = ?options.max_consecutive_failures, "watching batch");

    let tracker = JobStatusTracker::new(api, options);
    let mut observation = tracker.observe(batch_id.clone(), interval)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                }
                observation.cancel();
                bail!("watch of batch {batch_id} cancelled");
            }
            event = observation.next_event() => {
                let Some(event) = event else {
                    bail!("watch of batch {batch_id} cancelled");
                };
                print_event(&event);

                match event {
                    TrackerEvent::Ready(batch) => {
                        print_render_model(&batch, cfg)?;
                        return Ok(());
                    }
                    TrackerEvent::Failed(_) => {
                        bail!("optimization of batch {batch_id} failed");
                    }
                    TrackerEvent::Unreachable { consecutive_failures, last_error } => {
                        bail!(
                            "batch {batch_id} unreachable after {consecutive_failures} failed polls: {last_error}"
                        );
                    }
                    _ => {}
                }
            }
        }
    }
}

async fn show_batch<A: BatchApi>(api: &A, cfg: &ConfigFile, batch_id: BatchId) -> Result<()> {
    let resource = api
        .fetch_batch(&batch_id)
        .await
        .map_err(fetch_error)?;

    let fetched = resource.classify(&batch_id).map_err(fetch_error)?;

    match fetched {
        Fetched::Known(batch) => {
            println!(
                "batch {} ({}): {} deliveries, status {}",
                batch.id,
                batch.name,
                batch.deliveries.len(),
                batch.status
            );
            if batch.status == BatchStatus::Ready {
                print_render_model(&batch, cfg)?;
            }
            Ok(())
        }
        Fetched::Unrecognized { status } => Err(BatchrouteError::UnrecognizedStatus(status).into()),
    }
}

fn fetch_error(err: ApiError) -> BatchrouteError {
    BatchrouteError::Fetch {
        status: err.status_code(),
        detail: err.to_string(),
    }
}

fn print_event(event: &TrackerEvent) {
    match event {
        TrackerEvent::Optimizing { poll } => println!("poll {poll}: optimizing"),
        TrackerEvent::UnrecognizedStatus { poll, status } => {
            println!("poll {poll}: unrecognized status {status:?}")
        }
        TrackerEvent::FetchFailed {
            poll,
            consecutive_failures,
            error,
        } => println!("poll {poll}: fetch failed ({consecutive_failures} in a row): {error}"),
        TrackerEvent::Ready(batch) => println!(
            "ready: {} deliveries, {} placed",
            batch.deliveries.len(),
            batch.placed_deliveries().count()
        ),
        TrackerEvent::Failed(batch) => println!("failed: batch {} could not be optimized", batch.id),
        TrackerEvent::Unreachable {
            consecutive_failures,
            ..
        } => println!("unreachable: {consecutive_failures} consecutive failed polls"),
    }
}

fn print_render_model(batch: &DeliveryBatch, cfg: &ConfigFile) -> Result<()> {
    let projector = RouteProjector::new(cfg.map.clone().into());
    let model = projector.project(batch)?;
    println!("{}", serde_json::to_string_pretty(&model)?);
    Ok(())
}

/// Dry-run output: the validated request body, as it would be sent.
fn print_dry_run(request: &CreateBatchRequest) -> Result<()> {
    println!("batchroute dry-run");
    println!("{}", serde_json::to_string_pretty(request)?);
    debug!("dry-run complete (nothing sent)");
    Ok(())
}
