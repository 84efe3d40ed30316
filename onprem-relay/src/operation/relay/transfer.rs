/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use aws_smithy_types::error::display::DisplayErrorContext;
use bytes::Bytes;

use super::provision;
use crate::destination::SharedConnector;
use crate::error::Error;
use crate::operation::RelayContext;
use crate::path;
use crate::types::{DestinationResult, DestinationTarget, TransferJob};

/// Everything one blocking delivery needs, owned so it can move to the blocking pool.
#[derive(Debug)]
struct Delivery {
    connector: SharedConnector,
    target: DestinationTarget,
    content: Bytes,
    remote: PathBuf,
    timeout: Duration,
    scratch_dir: PathBuf,
}

/// Deliver one fetched object to one destination.
///
/// Never fails: any error is logged and reported as an unsuccessful [`DestinationResult`].
pub(crate) async fn deliver(
    ctx: &RelayContext,
    job: &TransferJob,
    target: &DestinationTarget,
) -> DestinationResult {
    let config = ctx.config();
    let remote = path::remote_path(
        config.remote_root(),
        config.time_source().now(),
        &job.file_name,
    );
    let delivery = Delivery {
        connector: config.connector().clone(),
        target: target.clone(),
        content: job.content.clone(),
        remote: remote.clone(),
        timeout: config.connect_timeout(),
        scratch_dir: config.scratch_dir().to_path_buf(),
    };

    let outcome = tokio::task::spawn_blocking(move || delivery.run())
        .await
        .map_err(Error::from)
        .and_then(|result| result);

    match outcome {
        Ok(bytes) => {
            tracing::info!(
                "successfully transferred file to on-premises {}: {} ({bytes} bytes)",
                target.label(),
                remote.display()
            );
            DestinationResult::new(target.label(), true)
        }
        Err(err) => {
            tracing::error!(
                "error transferring file to on-premises {}: {}",
                target.label(),
                DisplayErrorContext(&err)
            );
            DestinationResult::new(target.label(), false)
        }
    }
}

impl Delivery {
    fn run(self) -> Result<u64, Error> {
        // removed when dropped, on every path out of this function
        let mut staged = tempfile::Builder::new()
            .prefix("relay-")
            .tempfile_in(&self.scratch_dir)?;
        staged.write_all(&self.content)?;
        staged.flush()?;

        let mut session = self.connector.connect(&self.target, self.timeout)?;
        let uploaded = match self.remote.parent() {
            Some(parent) => provision::ensure_dir_chain(session.as_mut(), parent),
            None => Ok(()),
        }
        .and_then(|_| session.upload(staged.path(), &self.remote));

        match uploaded {
            Ok(bytes) => {
                session.close()?;
                Ok(bytes)
            }
            Err(err) => {
                if let Err(close_err) = session.close() {
                    tracing::debug!(
                        "closing session to {} failed: {}",
                        self.target.label(),
                        DisplayErrorContext(&close_err)
                    );
                }
                Err(err)
            }
        }
    }
}
