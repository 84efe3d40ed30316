/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use aws_smithy_async::time::SharedTimeSource;

use crate::destination::sftp::SftpConnector;
use crate::destination::{DestinationAuth, SharedConnector};
use crate::error::{self, Error};
use crate::metrics::cloudwatch::CloudWatchSink;
use crate::metrics::SharedMetricsSink;
use crate::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DESTINATIONS, DEFAULT_METRICS_NAMESPACE,
    DEFAULT_REMOTE_ROOT,
};

pub(crate) mod loader;

/// Configuration for a [`Client`](crate::client::Client)
#[derive(Debug, Clone)]
pub struct Config {
    source_bucket: Option<String>,
    secret_id: String,
    destinations: Vec<String>,
    remote_root: String,
    connect_timeout: Duration,
    metrics_namespace: String,
    scratch_dir: PathBuf,
    time_source: SharedTimeSource,
    s3_client: aws_sdk_s3::Client,
    secrets_client: aws_sdk_secretsmanager::Client,
    metrics_sink: SharedMetricsSink,
    connector: SharedConnector,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The bucket listed by scheduled scans
    pub fn source_bucket(&self) -> Option<&str> {
        self.source_bucket.as_deref()
    }

    /// The Secrets Manager secret holding destination coordinates
    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    /// Destination labels, in delivery order
    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    /// Root directory on every destination
    pub fn remote_root(&self) -> &str {
        &self.remote_root
    }

    /// Timeout applied to each destination connection
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// CloudWatch namespace for all metrics
    pub fn metrics_namespace(&self) -> &str {
        &self.metrics_namespace
    }

    /// Directory holding the per-delivery temporary files
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Clock used for hour paths
    pub fn time_source(&self) -> &SharedTimeSource {
        &self.time_source
    }

    /// The Amazon S3 client instance used to list and fetch objects.
    pub fn s3_client(&self) -> &aws_sdk_s3::Client {
        &self.s3_client
    }

    /// The Secrets Manager client used to load destination coordinates.
    pub fn secrets_client(&self) -> &aws_sdk_secretsmanager::Client {
        &self.secrets_client
    }

    pub(crate) fn metrics_sink(&self) -> &SharedMetricsSink {
        &self.metrics_sink
    }

    pub(crate) fn connector(&self) -> &SharedConnector {
        &self.connector
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone, Default)]
pub struct Builder {
    source_bucket: Option<String>,
    secret_id: Option<String>,
    destinations: Option<Vec<String>>,
    remote_root: Option<String>,
    connect_timeout: Option<Duration>,
    metrics_namespace: Option<String>,
    scratch_dir: Option<PathBuf>,
    time_source: Option<SharedTimeSource>,
    destination_auth: Option<DestinationAuth>,
    s3_client: Option<aws_sdk_s3::Client>,
    secrets_client: Option<aws_sdk_secretsmanager::Client>,
    cloudwatch_client: Option<aws_sdk_cloudwatch::Client>,
    metrics_sink: Option<SharedMetricsSink>,
    connector: Option<SharedConnector>,
}

impl Builder {
    /// The bucket to list when the trigger is a scheduled scan.
    pub fn source_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.source_bucket = Some(bucket.into());
        self
    }

    /// The secret holding `<label>_host` / `<label>_port` for every destination. Required.
    pub fn secret_id(mut self, secret_id: impl Into<String>) -> Self {
        self.secret_id = Some(secret_id.into());
        self
    }

    /// Destination labels, in delivery order.
    ///
    /// Default is `op1`, `op2`.
    pub fn destinations<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.destinations = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Root directory on every destination.
    ///
    /// Default is `/From_AWS`.
    pub fn remote_root(mut self, root: impl Into<String>) -> Self {
        self.remote_root = Some(root.into());
        self
    }

    /// Timeout for each destination connection.
    ///
    /// Default is 30 seconds.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// CloudWatch namespace.
    ///
    /// Default is `MOD/FileTransfer`.
    pub fn metrics_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metrics_namespace = Some(namespace.into());
        self
    }

    /// Directory for the temporary file written per delivery.
    ///
    /// Default is [`std::env::temp_dir`].
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Clock used to compute hour paths. Default is the system clock.
    pub fn time_source(mut self, time_source: SharedTimeSource) -> Self {
        self.time_source = Some(time_source);
        self
    }

    /// How to log in to destinations.
    ///
    /// Required unless an explicit [`connector`](Self::connector) is set.
    pub fn destination_auth(mut self, auth: DestinationAuth) -> Self {
        self.destination_auth = Some(auth);
        self
    }

    /// Set an explicit S3 client to use.
    pub fn s3_client(mut self, client: aws_sdk_s3::Client) -> Self {
        self.s3_client = Some(client);
        self
    }

    /// Set an explicit Secrets Manager client to use.
    pub fn secrets_client(mut self, client: aws_sdk_secretsmanager::Client) -> Self {
        self.secrets_client = Some(client);
        self
    }

    /// Set the CloudWatch client backing the default metrics sink.
    pub fn cloudwatch_client(mut self, client: aws_sdk_cloudwatch::Client) -> Self {
        self.cloudwatch_client = Some(client);
        self
    }

    /// Replace the CloudWatch sink with another metrics backend.
    pub fn metrics_sink(mut self, sink: SharedMetricsSink) -> Self {
        self.metrics_sink = Some(sink);
        self
    }

    /// Replace the SFTP connector with another destination transport.
    pub fn connector(mut self, connector: SharedConnector) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Consumes the builder and constructs a [`Config`]
    pub fn build(self) -> Result<Config, Error> {
        let secret_id = self
            .secret_id
            .ok_or_else(|| error::invalid_input("a secret id is required"))?;

        let destinations = self.destinations.unwrap_or_else(|| {
            DEFAULT_DESTINATIONS
                .iter()
                .map(|label| label.to_string())
                .collect()
        });
        if destinations.is_empty() {
            return Err(error::invalid_input("at least one destination is required"));
        }

        let s3_client = self
            .s3_client
            .ok_or_else(|| error::invalid_input("an S3 client is required"))?;
        let secrets_client = self
            .secrets_client
            .ok_or_else(|| error::invalid_input("a Secrets Manager client is required"))?;

        let metrics_sink: SharedMetricsSink = match (self.metrics_sink, self.cloudwatch_client) {
            (Some(sink), _) => sink,
            (None, Some(client)) => Arc::new(CloudWatchSink::new(client)),
            (None, None) => {
                return Err(error::invalid_input(
                    "a CloudWatch client or metrics sink is required",
                ))
            }
        };

        let connector: SharedConnector = match (self.connector, self.destination_auth) {
            (Some(connector), _) => connector,
            (None, Some(auth)) => Arc::new(SftpConnector::new(auth)),
            (None, None) => {
                return Err(error::invalid_input(
                    "destination authentication must be configured explicitly",
                ))
            }
        };

        Ok(Config {
            source_bucket: self.source_bucket,
            secret_id,
            destinations,
            remote_root: self
                .remote_root
                .unwrap_or_else(|| DEFAULT_REMOTE_ROOT.to_owned()),
            connect_timeout: self
                .connect_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            metrics_namespace: self
                .metrics_namespace
                .unwrap_or_else(|| DEFAULT_METRICS_NAMESPACE.to_owned()),
            scratch_dir: self.scratch_dir.unwrap_or_else(std::env::temp_dir),
            time_source: self.time_source.unwrap_or_default(),
            s3_client,
            secrets_client,
            metrics_sink,
            connector,
        })
    }
}
