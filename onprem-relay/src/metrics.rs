/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use aws_smithy_types::error::display::DisplayErrorContext;

use crate::error::Error;
use crate::types::{BatchResult, JobResult};

/// CloudWatch implementation of [`MetricsSink`]
pub mod cloudwatch;

/// Dimension name attached to every per-object metric
pub const FILE_NAME_DIMENSION: &str = "FileName";

/// Unit of a [`MetricObservation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Elapsed time in seconds
    Seconds,
    /// Size in bytes
    Bytes,
    /// Plain count
    Count,
    /// Percentage (0 - 100)
    Percent,
}

/// A single named measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricObservation {
    name: &'static str,
    value: f64,
    unit: MetricUnit,
    dimension: Option<(&'static str, String)>,
}

impl MetricObservation {
    /// Create a new observation without dimensions
    pub fn new(name: &'static str, value: f64, unit: MetricUnit) -> Self {
        Self {
            name,
            value,
            unit,
            dimension: None,
        }
    }

    /// Attach a dimension
    pub fn with_dimension(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.dimension = Some((name, value.into()));
        self
    }

    /// The metric name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The observed value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The unit of [`value`](Self::value)
    pub fn unit(&self) -> MetricUnit {
        self.unit
    }

    /// The dimension (name, value), if any
    pub fn dimension(&self) -> Option<(&'static str, &str)> {
        self.dimension.as_ref().map(|(n, v)| (*n, v.as_str()))
    }
}

/// A backend that accepts metric observations.
#[async_trait]
pub trait MetricsSink: fmt::Debug + Send + Sync {
    /// Publish `observations` under `namespace`
    async fn publish(
        &self,
        namespace: &str,
        observations: Vec<MetricObservation>,
    ) -> Result<(), Error>;
}

/// A [`MetricsSink`] shared by the client
pub type SharedMetricsSink = Arc<dyn MetricsSink>;

/// Publishes per-object and per-batch metrics, swallowing failures.
#[derive(Debug, Clone)]
pub(crate) struct MetricsReporter {
    sink: SharedMetricsSink,
    namespace: String,
}

impl MetricsReporter {
    pub(crate) fn new(sink: SharedMetricsSink, namespace: impl Into<String>) -> Self {
        Self {
            sink,
            namespace: namespace.into(),
        }
    }

    pub(crate) async fn report_object(&self, result: &JobResult) {
        self.emit(object_metrics(result)).await
    }

    pub(crate) async fn report_batch(&self, result: &BatchResult) {
        self.emit(batch_metrics(result)).await
    }

    async fn emit(&self, observations: Vec<MetricObservation>) {
        if let Err(err) = self.sink.publish(&self.namespace, observations).await {
            tracing::error!("error sending metrics: {}", DisplayErrorContext(&err));
        }
    }
}

pub(crate) fn object_metrics(result: &JobResult) -> Vec<MetricObservation> {
    let name = result.object_name();
    let transferred = if result.success() { 1.0 } else { 0.0 };
    vec![
        MetricObservation::new(
            "ExecutionTime",
            result.duration().as_secs_f64(),
            MetricUnit::Seconds,
        )
        .with_dimension(FILE_NAME_DIMENSION, name),
        MetricObservation::new("FileSize", result.size() as f64, MetricUnit::Bytes)
            .with_dimension(FILE_NAME_DIMENSION, name),
        MetricObservation::new("TransferSuccess", transferred, MetricUnit::Count)
            .with_dimension(FILE_NAME_DIMENSION, name),
    ]
}

pub(crate) fn batch_metrics(result: &BatchResult) -> Vec<MetricObservation> {
    let mut metrics = vec![
        MetricObservation::new(
            "BatchExecutionTime",
            result.duration().as_secs_f64(),
            MetricUnit::Seconds,
        ),
        MetricObservation::new(
            "BatchFilesProcessed",
            result.total() as f64,
            MetricUnit::Count,
        ),
        MetricObservation::new(
            "BatchFilesSuccessful",
            result.successful() as f64,
            MetricUnit::Count,
        ),
    ];

    if let Some(rate) = result.success_rate() {
        metrics.push(MetricObservation::new(
            "BatchSuccessRate",
            rate,
            MetricUnit::Percent,
        ));
    }

    metrics
}
