/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;

/// A reference to a single object in the source bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReference {
    bucket: String,
    key: String,
    size: Option<u64>,
}

impl ObjectReference {
    /// Create a new reference to `key` in `bucket`
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            size: None,
        }
    }

    /// Attach the object size reported by the trigger
    pub fn with_size(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    /// The bucket holding the object
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The (decoded) object key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The object size in bytes, if the trigger reported one
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// The last segment of the key, used as the file name at each destination.
    ///
    /// Returns `None` for keys that end with `/` (folder placeholders) and for keys whose last
    /// segment is `.` or `..`, which no destination can hold as a file.
    pub fn file_name(&self) -> Option<&str> {
        match self.key.rsplit('/').next() {
            Some("" | "." | "..") | None => None,
            Some(name) => Some(name),
        }
    }
}

/// An object fetched from the source bucket and ready to be delivered.
#[derive(Debug, Clone)]
pub(crate) struct TransferJob {
    pub(crate) reference: ObjectReference,
    /// Last path segment of the key, used as the remote file name
    pub(crate) file_name: String,
    pub(crate) content: Bytes,
    pub(crate) content_length: u64,
}

/// Connection coordinates of one on-premises destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTarget {
    label: String,
    host: String,
    port: u16,
}

impl DestinationTarget {
    /// Create a new destination target
    pub fn new(label: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            label: label.into(),
            host: host.into(),
            port,
        }
    }

    /// The destination label (e.g. `op1`)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The destination host name
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The destination port
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationResult {
    label: String,
    success: bool,
}

impl DestinationResult {
    pub(crate) fn new(label: impl Into<String>, success: bool) -> Self {
        Self {
            label: label.into(),
            success,
        }
    }

    /// The destination label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the object was delivered to this destination
    pub fn success(&self) -> bool {
        self.success
    }
}

/// Outcome of relaying one object to every configured destination.
#[derive(Debug, Clone)]
pub struct JobResult {
    object_name: String,
    destinations: Vec<DestinationResult>,
    duration: Duration,
    size: u64,
}

impl JobResult {
    pub(crate) fn new(
        object_name: impl Into<String>,
        destinations: Vec<DestinationResult>,
        duration: Duration,
        size: u64,
    ) -> Self {
        Self {
            object_name: object_name.into(),
            destinations,
            duration,
            size,
        }
    }

    /// The object's file name
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Per destination results, in delivery order
    pub fn destinations(&self) -> &[DestinationResult] {
        &self.destinations
    }

    /// True only if every destination succeeded
    pub fn success(&self) -> bool {
        self.destinations.iter().all(DestinationResult::success)
    }

    /// Labels of the destinations that did not receive the object
    pub fn failed_destinations(&self) -> Vec<&str> {
        self.destinations
            .iter()
            .filter(|d| !d.success())
            .map(DestinationResult::label)
            .collect()
    }

    /// Time spent fetching and delivering the object
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Object size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Outcome of a whole invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    total: u64,
    successful: u64,
    duration: Duration,
}

impl BatchResult {
    pub(crate) fn new(total: u64, successful: u64, duration: Duration) -> Self {
        Self {
            total,
            successful,
            duration,
        }
    }

    /// Number of objects the trigger named
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of objects delivered to every destination
    pub fn successful(&self) -> u64 {
        self.successful
    }

    /// Wall clock time of the invocation
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Percentage of successful objects, `None` for an empty batch
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.successful as f64 / self.total as f64 * 100.0)
    }

    /// Convert into the response returned to the invoker
    pub fn into_output(self) -> InvocationOutput {
        InvocationOutput {
            status_code: 200,
            body: InvocationBody {
                message: "Processing complete".to_owned(),
                total_files: self.total,
                successful_files: self.successful,
                processing_time_seconds: self.duration.as_secs_f64(),
            },
        }
    }
}

/// Response returned to the invoker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationOutput {
    /// Always 200; a fatal failure fails the invocation instead
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Batch summary
    pub body: InvocationBody,
}

/// Batch summary carried in [`InvocationOutput`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationBody {
    /// Human readable status
    pub message: String,
    /// Number of objects the trigger named
    pub total_files: u64,
    /// Number of objects delivered to every destination
    pub successful_files: u64,
    /// Wall clock time of the invocation
    pub processing_time_seconds: f64,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{BatchResult, DestinationResult, JobResult, ObjectReference};

    fn job(results: &[(&str, bool)]) -> JobResult {
        let destinations = results
            .iter()
            .map(|(label, ok)| DestinationResult::new(*label, *ok))
            .collect();
        JobResult::new("report.csv", destinations, Duration::from_millis(5), 120)
    }

    #[test]
    fn test_overall_success_is_and_of_destinations() {
        assert!(job(&[("op1", true), ("op2", true)]).success());
        assert!(!job(&[("op1", true), ("op2", false)]).success());
        assert!(!job(&[("op1", false), ("op2", true)]).success());
        assert!(!job(&[("op1", false), ("op2", false)]).success());
    }

    #[test]
    fn test_failed_destinations() {
        let result = job(&[("op1", true), ("op2", false)]);
        assert_eq!(vec!["op2"], result.failed_destinations());
        assert!(job(&[("op1", true), ("op2", true)])
            .failed_destinations()
            .is_empty());
    }

    #[test]
    fn test_success_rate_only_for_non_empty_batch() {
        let empty = BatchResult::new(0, 0, Duration::ZERO);
        assert_eq!(None, empty.success_rate());

        let batch = BatchResult::new(3, 2, Duration::ZERO);
        let rate = batch.success_rate().unwrap();
        assert!((rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            Some("report.csv"),
            ObjectReference::new("b", "2024/01/02/03/report.csv").file_name()
        );
        assert_eq!(Some("flat.txt"), ObjectReference::new("b", "flat.txt").file_name());
        assert_eq!(None, ObjectReference::new("b", "2024/01/").file_name());
        assert_eq!(None, ObjectReference::new("b", "incoming/..").file_name());
        assert_eq!(None, ObjectReference::new("b", "incoming/.").file_name());
        assert_eq!(None, ObjectReference::new("b", "..").file_name());
        assert_eq!(Some("..."), ObjectReference::new("b", "incoming/...").file_name());
    }

    #[test]
    fn test_output_shape() {
        let output = BatchResult::new(4, 3, Duration::from_millis(1500)).into_output();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(200, json["statusCode"]);
        assert_eq!("Processing complete", json["body"]["message"]);
        assert_eq!(4, json["body"]["total_files"]);
        assert_eq!(3, json["body"]["successful_files"]);
        assert_eq!(1.5, json["body"]["processing_time_seconds"]);
    }
}
