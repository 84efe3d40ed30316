/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use crate::metrics::MetricsReporter;

/// Types for the relay operation
pub mod relay;

/// Container for maintaining context required to carry out a single invocation.
#[derive(Debug)]
pub(crate) struct RelayContext {
    handle: Arc<crate::client::Handle>,
}

impl RelayContext {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self { handle }
    }

    pub(crate) fn config(&self) -> &crate::Config {
        &self.handle.config
    }

    /// The S3 client to use for SDK operations
    pub(crate) fn s3_client(&self) -> &aws_sdk_s3::Client {
        self.handle.config.s3_client()
    }

    pub(crate) fn secrets_client(&self) -> &aws_sdk_secretsmanager::Client {
        self.handle.config.secrets_client()
    }

    pub(crate) fn reporter(&self) -> &MetricsReporter {
        &self.handle.reporter
    }
}

impl Clone for RelayContext {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}
