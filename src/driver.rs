//! # Fan-out Driver
//!
//! Spawns one task per location, then acts as the single collector: each
//! result is handed to the output sink as soon as its task finishes, so lines
//! from different locations never interleave. A task that panics is reported
//! as that location's failure; the others keep running.

use crate::client::ApiClient;
use crate::orchestrator::{self, Failure, OrchestrationResult, Outcome};
use crate::Location;
use chrono::NaiveDate;
use futures::stream::{FuturesUnordered, StreamExt};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, error};

/// Run `job` concurrently for every location and wait for all of them.
///
/// `sink` is called once per location in completion order. The returned
/// results are in the same order.
pub async fn fan_out<F, Fut, S>(
    locations: &[Arc<Location>],
    job: F,
    mut sink: S,
) -> Vec<OrchestrationResult>
where
    F: Fn(Arc<Location>) -> Fut,
    Fut: Future<Output = OrchestrationResult> + Send + 'static,
    S: FnMut(&OrchestrationResult),
{
    let mut pending: FuturesUnordered<_> = locations
        .iter()
        .map(|location| {
            let name = location.name.clone();
            let handle = tokio::spawn(job(Arc::clone(location)));
            async move {
                match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(location = %name, error = %e, "location task did not complete");
                        OrchestrationResult {
                            name,
                            outcome: Outcome::Failed(Failure::panicked(join_error_message(e))),
                        }
                    }
                }
            }
        })
        .collect();

    debug!(tasks = pending.len(), "spawned location tasks");

    let mut results = Vec::with_capacity(locations.len());
    while let Some(result) = pending.next().await {
        sink(&result);
        results.push(result);
    }
    results
}

/// Run the tide/forecast pipeline for every location.
pub async fn run<S>(
    client: Arc<ApiClient>,
    locations: &[Arc<Location>],
    date: NaiveDate,
    sink: S,
) -> Vec<OrchestrationResult>
where
    S: FnMut(&OrchestrationResult),
{
    fan_out(
        locations,
        move |location| {
            let client = Arc::clone(&client);
            async move { orchestrator::process_location(&client, &location, date).await }
        },
        sink,
    )
    .await
}

fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
