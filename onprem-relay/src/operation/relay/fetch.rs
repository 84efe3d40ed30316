/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use tracing::Instrument;

use crate::error::{self, Error};
use crate::operation::RelayContext;
use crate::types::{ObjectReference, TransferJob};

/// Read an object fully into memory.
///
/// The reported length is the service's `Content-Length`, falling back to the number of bytes
/// read.
pub(crate) async fn fetch_object(
    ctx: &RelayContext,
    reference: ObjectReference,
    file_name: String,
) -> Result<TransferJob, Error> {
    let output = ctx
        .s3_client()
        .get_object()
        .bucket(reference.bucket())
        .key(reference.key())
        .send()
        .instrument(tracing::debug_span!("send-get-object"))
        .await
        .map_err(|err| {
            if error::service_code(&err) == Some("NoSuchKey") {
                tracing::warn!(
                    "s3://{}/{} no longer exists",
                    reference.bucket(),
                    reference.key()
                );
            }
            error::fetch_failed(err)
        })?;

    let content_length = output
        .content_length
        .and_then(|len| u64::try_from(len).ok());
    let content = output
        .body
        .collect()
        .await
        .map_err(error::fetch_failed)?
        .into_bytes();
    let content_length = content_length.unwrap_or(content.len() as u64);

    Ok(TransferJob {
        reference,
        file_name,
        content,
        content_length,
    })
}
