/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use crate::metrics::MetricsReporter;
use crate::Config;

/// Relay client for one deployment (source bucket, secret, destinations).
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) handle: Arc<Handle>,
}

/// Whatever is needed to carry out operations, e.g. config, metrics reporter, etc
#[derive(Debug)]
pub(crate) struct Handle {
    pub(crate) config: crate::Config,
    pub(crate) reporter: MetricsReporter,
}

impl Client {
    /// Creates a new client from a relay config.
    pub fn new(config: Config) -> Client {
        let reporter = MetricsReporter::new(
            config.metrics_sink().clone(),
            config.metrics_namespace(),
        );
        let handle = Arc::new(Handle { config, reporter });
        Client { handle }
    }

    /// Returns the client's configuration
    pub fn config(&self) -> &Config {
        &self.handle.config
    }

    /// Relay every object named by one trigger payload.
    ///
    /// Constructs a fluent builder for the
    /// [`Relay`](crate::operation::relay::builders::RelayFluentBuilder) operation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use onprem_relay::error::Error;
    ///
    /// async fn on_sqs_batch(
    ///     client: &onprem_relay::Client,
    ///     event: serde_json::Value,
    ///     request_id: String,
    /// ) -> Result<(), Error> {
    ///     let batch = client
    ///         .relay()
    ///         .payload(event)
    ///         .invocation_id(request_id)
    ///         .send()
    ///         .await?;
    ///
    ///     if batch.successful() < batch.total() {
    ///         // some objects did not reach every destination
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn relay(&self) -> crate::operation::relay::builders::RelayFluentBuilder {
        crate::operation::relay::builders::RelayFluentBuilder::new(self.handle.clone())
    }
}
