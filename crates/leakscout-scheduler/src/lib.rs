//! Periodic scan scheduling.
//!
//! Drives the top-level loop: one full dispatch cycle, then sleep, forever.
//! Cycles never overlap and no error from below stops the loop; a failing
//! rule load is logged and the scheduler simply waits for the next cycle.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use leakscout_core::SourceType;
use leakscout_scanner::{generate_batches, SearchDispatcher};
use sqlx::{Pool, Sqlite};
use std::time::Duration;

/// Run a single scan cycle: batch the rules and dispatch them.
///
/// A rule store failure skips the cycle; anything below the batcher handles
/// its own errors.
pub async fn run_once(
    dispatcher: &SearchDispatcher,
    pool: &Pool<Sqlite>,
    source_type: SourceType,
    batch_size: usize,
) {
    match generate_batches(pool, source_type, batch_size).await {
        Ok(batches) => {
            tracing::info!(
                "starting scan cycle for {} with {} batches",
                source_type,
                batches.len()
            );
            dispatcher.run_cycle(batches).await;
        }
        Err(e) => {
            tracing::error!("failed to load search rules, skipping cycle: {}", e);
        }
    }
}

/// Run scan cycles indefinitely, sleeping `interval` between them.
///
/// There is no shutdown hook; termination is the process supervisor's job.
pub async fn run_forever(
    dispatcher: SearchDispatcher,
    pool: Pool<Sqlite>,
    source_type: SourceType,
    batch_size: usize,
    interval: Duration,
) {
    loop {
        run_once(&dispatcher, &pool, source_type, batch_size).await;

        tracing::info!(
            "scan cycle for {} complete, sleeping {} seconds",
            source_type,
            interval.as_secs()
        );
        tokio::time::sleep(interval).await;
    }
}
