/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::types::Object;
use tracing::Instrument;

use crate::error::{self, Error};
use crate::types::ObjectReference;

/// Stream of the objects stored under one prefix, following continuation tokens until the
/// listing is exhausted.
#[derive(Debug)]
pub(crate) struct ListObjectsStream {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
    state: State,
    current_page: std::vec::IntoIter<Object>,
}

#[derive(Debug, PartialEq)]
enum State {
    Paginating { next_token: Option<String> },
    Done,
}

impl State {
    fn next_state(self, output: &ListObjectsV2Output) -> State {
        let is_truncated =
            output.is_truncated().unwrap_or(false) && output.next_continuation_token().is_some();
        match self {
            State::Paginating { .. } if is_truncated => State::Paginating {
                next_token: output.next_continuation_token.to_owned(),
            },
            _ => State::Done,
        }
    }
}

impl ListObjectsStream {
    pub(crate) fn new(
        client: aws_sdk_s3::Client,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
            state: State::Paginating { next_token: None },
            current_page: Vec::new().into_iter(),
        }
    }

    /// Pull the next object, fetching the next page when the current one is drained.
    ///
    /// A listing failure is returned once, after which the stream is done.
    pub(crate) async fn next(&mut self) -> Option<Result<ObjectReference, Error>> {
        loop {
            for object in self.current_page.by_ref() {
                if let Some(key) = object.key {
                    let size = object.size.and_then(|size| u64::try_from(size).ok());
                    return Some(Ok(
                        ObjectReference::new(&self.bucket, key).with_size(size)
                    ));
                }
            }

            let next_token = match &self.state {
                State::Done => return None,
                State::Paginating { next_token } => next_token.clone(),
            };

            let result = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&self.prefix)
                .set_continuation_token(next_token)
                .send()
                .instrument(tracing::debug_span!("send-list-objects-v2"))
                .await;

            match result {
                Ok(mut output) => {
                    let prev_state = std::mem::replace(&mut self.state, State::Done);
                    self.state = prev_state.next_state(&output);
                    self.current_page = output.contents.take().unwrap_or_default().into_iter();
                }
                Err(err) => {
                    self.state = State::Done;
                    return Some(Err(error::listing_failed(err)));
                }
            }
        }
    }
}
