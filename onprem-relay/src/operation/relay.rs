/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Operation builders
pub mod builders;

mod input;
/// Input type for relaying the objects named by one trigger
pub use input::{RelayInput, RelayInputBuilder};

mod credentials;
mod fetch;
mod list_objects;
mod provision;
mod transfer;
mod trigger;

use std::sync::Arc;
use std::time::Instant;

use aws_smithy_types::error::display::DisplayErrorContext;
use tracing::Instrument;

use self::trigger::{ObjectStream, Trigger};
use crate::error::Error;
use crate::operation::RelayContext;
use crate::types::{BatchResult, DestinationTarget, JobResult, ObjectReference};

/// Operation struct for relaying a batch of objects to every destination
#[derive(Clone, Default, Debug)]
pub(crate) struct Relay;

impl Relay {
    /// Execute a single `Relay` invocation
    ///
    /// Objects are processed one at a time, in trigger order. Each fetched object is delivered
    /// to every destination in configured order. Only a credential failure aborts the batch;
    /// per-object failures are counted.
    pub(crate) async fn orchestrate(
        handle: Arc<crate::client::Handle>,
        input: RelayInput,
    ) -> Result<BatchResult, Error> {
        let invocation_id = input
            .invocation_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let span = tracing::info_span!("relay", invocation_id = %invocation_id);
        let ctx = RelayContext::new(handle);
        run(ctx, input).instrument(span).await
    }
}

async fn run(ctx: RelayContext, input: RelayInput) -> Result<BatchResult, Error> {
    let started = Instant::now();
    tracing::info!("processing event: {}", input.payload);
    let trigger = Trigger::from_payload(&input.payload);

    let targets = credentials::load(&ctx)
        .await
        .and_then(|credentials| credentials.targets(ctx.config().destinations()))
        .map_err(|err| {
            tracing::error!(
                "error getting on-premises credentials: {}",
                DisplayErrorContext(&err)
            );
            err
        })?;

    let mut objects = ObjectStream::new(&ctx, trigger);
    let mut total = 0u64;
    let mut successful = 0u64;
    while let Some(next) = objects.next().await {
        let reference = match next {
            Ok(reference) => reference,
            Err(err) => {
                tracing::error!("error listing objects: {}", DisplayErrorContext(&err));
                break;
            }
        };
        total += 1;
        let delivered = relay_object(&ctx, &targets, reference)
            .await
            .is_some_and(|result| result.success());
        if delivered {
            successful += 1;
        }
    }

    let batch = BatchResult::new(total, successful, started.elapsed());
    ctx.reporter().report_batch(&batch).await;
    tracing::info!(
        "batch complete: {} of {} files transferred in {:.3}s",
        batch.successful(),
        batch.total(),
        batch.duration().as_secs_f64()
    );
    Ok(batch)
}

/// Fetch one object and deliver it everywhere. Returns `None` when the object never made it
/// as far as delivery.
async fn relay_object(
    ctx: &RelayContext,
    targets: &[DestinationTarget],
    reference: ObjectReference,
) -> Option<JobResult> {
    let started = Instant::now();
    tracing::info!(
        "processing file {} from bucket {}",
        reference.key(),
        reference.bucket()
    );

    let Some(file_name) = reference.file_name().map(str::to_owned) else {
        tracing::error!("key {} does not name a file, skipping", reference.key());
        return None;
    };
    let key = reference.key().to_owned();
    let job = match fetch::fetch_object(ctx, reference, file_name).await {
        Ok(job) => job,
        Err(err) => {
            tracing::error!("error processing file {key}: {}", DisplayErrorContext(&err));
            return None;
        }
    };

    let mut destinations = Vec::with_capacity(targets.len());
    for target in targets {
        destinations.push(transfer::deliver(ctx, &job, target).await);
    }
    let result = JobResult::new(
        job.file_name.clone(),
        destinations,
        started.elapsed(),
        job.content_length,
    );
    ctx.reporter().report_object(&result).await;

    if result.success() {
        tracing::info!("successfully processed file {key} to all destinations");
    } else {
        tracing::error!(
            "failed to process file {key} to destinations: {}",
            result.failed_destinations().join(", ")
        );
    }
    Some(result)
}
