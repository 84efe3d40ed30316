/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use async_trait::async_trait;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};

use super::{MetricObservation, MetricUnit, MetricsSink};
use crate::error::{metrics_failed, Error};

/// Publishes observations with CloudWatch `PutMetricData`.
#[derive(Debug, Clone)]
pub struct CloudWatchSink {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchSink {
    /// Create a sink backed by `client`
    pub fn new(client: aws_sdk_cloudwatch::Client) -> Self {
        Self { client }
    }
}

fn standard_unit(unit: MetricUnit) -> StandardUnit {
    match unit {
        MetricUnit::Seconds => StandardUnit::Seconds,
        MetricUnit::Bytes => StandardUnit::Bytes,
        MetricUnit::Count => StandardUnit::Count,
        MetricUnit::Percent => StandardUnit::Percent,
    }
}

fn datum(observation: &MetricObservation) -> MetricDatum {
    let dimension = observation
        .dimension()
        .map(|(name, value)| Dimension::builder().name(name).value(value).build());

    MetricDatum::builder()
        .metric_name(observation.name())
        .value(observation.value())
        .unit(standard_unit(observation.unit()))
        .set_dimensions(dimension.map(|d| vec![d]))
        .build()
}

#[async_trait]
impl MetricsSink for CloudWatchSink {
    async fn publish(
        &self,
        namespace: &str,
        observations: Vec<MetricObservation>,
    ) -> Result<(), Error> {
        let data: Vec<MetricDatum> = observations.iter().map(datum).collect();

        self.client
            .put_metric_data()
            .namespace(namespace)
            .set_metric_data(Some(data))
            .send()
            .await
            .map_err(metrics_failed)?;

        tracing::trace!("published {} metrics to {namespace}", observations.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_cloudwatch::operation::put_metric_data::{PutMetricDataError, PutMetricDataOutput};
    use aws_sdk_cloudwatch::types::error::InvalidParameterValueException;
    use aws_sdk_cloudwatch::types::StandardUnit;
    use aws_smithy_mocks::{mock, mock_client};

    use super::{datum, CloudWatchSink};
    use crate::error::ErrorKind;
    use crate::metrics::{MetricObservation, MetricUnit, MetricsSink};

    fn observations() -> Vec<MetricObservation> {
        vec![
            MetricObservation::new("FileSize", 120.0, MetricUnit::Bytes)
                .with_dimension("FileName", "report.csv"),
            MetricObservation::new("TransferSuccess", 1.0, MetricUnit::Count)
                .with_dimension("FileName", "report.csv"),
        ]
    }

    #[test]
    fn test_datum_carries_unit_and_dimension() {
        let data: Vec<_> = observations().iter().map(datum).collect();
        assert_eq!(Some("FileSize"), data[0].metric_name());
        assert_eq!(Some(120.0), data[0].value());
        assert_eq!(Some(&StandardUnit::Bytes), data[0].unit());
        let dimension = &data[0].dimensions()[0];
        assert_eq!(Some("FileName"), dimension.name());
        assert_eq!(Some("report.csv"), dimension.value());

        let bare = datum(&MetricObservation::new("SuccessRate", 50.0, MetricUnit::Percent));
        assert_eq!(Some(&StandardUnit::Percent), bare.unit());
        assert!(bare.dimensions().is_empty());
    }

    #[tokio::test]
    async fn test_publish_sends_namespace_and_data() {
        let put = mock!(aws_sdk_cloudwatch::Client::put_metric_data)
            .match_requests(|input| {
                input.namespace.as_deref() == Some("MOD/FileTransfer")
                    && input.metric_data.as_ref().map(Vec::len) == Some(2)
            })
            .then_output(|| PutMetricDataOutput::builder().build());
        let client = mock_client!(aws_sdk_cloudwatch, &[&put]);

        let sink = CloudWatchSink::new(client);
        sink.publish("MOD/FileTransfer", observations())
            .await
            .unwrap();
        assert_eq!(1, put.num_calls());
    }

    #[tokio::test]
    async fn test_publish_failure_is_metrics_error() {
        let put = mock!(aws_sdk_cloudwatch::Client::put_metric_data).then_error(|| {
            PutMetricDataError::InvalidParameterValueException(
                InvalidParameterValueException::builder()
                    .message("bad value")
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_cloudwatch, &[&put]);

        let err = CloudWatchSink::new(client)
            .publish("MOD/FileTransfer", observations())
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::MetricsEmitFailed, err.kind());
    }
}
