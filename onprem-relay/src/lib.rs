/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */
#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

//! Relay objects from Amazon S3 to two on-premises SFTP destinations.
//!
//! Every object named by a trigger is fetched once and delivered to each configured
//! destination independently. An object only counts as transferred when every destination
//! accepted it. Per-object and per-batch metrics are published to CloudWatch.
//!
//! # Examples
//!
//! Relay the objects named by an SQS batch of S3 notifications:
//!
//! ```no_run
//! # async fn example(payload: serde_json::Value) -> Result<(), onprem_relay::error::Error> {
//! let config = onprem_relay::from_env().load().await?;
//! let client = onprem_relay::Client::new(config);
//!
//! let batch = client.relay().payload(payload).send().await?;
//! println!("{} of {} objects delivered", batch.successful(), batch.total());
//! # Ok(())
//! # }
//! ```
//!
//! A payload without a top-level `Records` key triggers a scan of the source bucket under the
//! current UTC hour prefix (`YYYY/MM/DD/HH`).

/// Default destination labels, in delivery order
pub(crate) const DEFAULT_DESTINATIONS: &[&str] = &["op1", "op2"];

/// Default root directory on every destination
pub(crate) const DEFAULT_REMOTE_ROOT: &str = "/From_AWS";

/// Default CloudWatch namespace
pub(crate) const DEFAULT_METRICS_NAMESPACE: &str = "MOD/FileTransfer";

/// Default per-connection timeout in seconds
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Error types emitted by `onprem-relay`
pub mod error;

/// Common types used by `onprem-relay`
pub mod types;

/// Relay client
pub mod client;

/// Relay configuration
pub mod config;

/// Relay operations
pub mod operation;

/// Delivery endpoints and the SFTP implementation
pub mod destination;

/// Metric observations and sinks
pub mod metrics;

/// UTC hour paths
pub(crate) mod path;

#[cfg(test)]
pub(crate) mod test_util;

pub use self::client::Client;
use self::config::loader::ConfigLoader;
pub use self::config::Config;

/// Create a config loader
pub fn from_env() -> ConfigLoader {
    ConfigLoader::default()
}
