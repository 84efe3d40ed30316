/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::env;
use std::time::Duration;

use aws_types::SdkConfig;

use crate::config::Builder;
use crate::destination::DestinationAuth;
use crate::error::{self, Error};
use crate::Config;

const SOURCE_BUCKET_ENV: &str = "TRUSTED_BUCKET";
const SECRET_ID_ENV: &str = "ONPREM_SECRET_NAME";
const AUTH_MODE_ENV: &str = "ONPREM_AUTH_MODE";
const SFTP_USER_ENV: &str = "ONPREM_SFTP_USER";
const DESTINATIONS_ENV: &str = "ONPREM_DESTINATIONS";
const REMOTE_ROOT_ENV: &str = "ONPREM_REMOTE_ROOT";
const CONNECT_TIMEOUT_ENV: &str = "ONPREM_CONNECT_TIMEOUT_SECS";
const METRICS_NAMESPACE_ENV: &str = "METRICS_NAMESPACE";
const SCRATCH_DIR_ENV: &str = "RELAY_SCRATCH_DIR";

const NETWORK_TRUST: &str = "network-trust";
const DEFAULT_SFTP_USER: &str = "transfer";

/// Load relay [`Config`] from the environment.
///
/// Values set on the loader win over environment variables. AWS clients are built from
/// [`aws_config::from_env`].
#[derive(Default, Debug)]
pub struct ConfigLoader {
    source_bucket: Option<String>,
    secret_id: Option<String>,
    destination_auth: Option<DestinationAuth>,
    destinations: Option<Vec<String>>,
}

impl ConfigLoader {
    /// The bucket listed by scheduled scans. Falls back to `TRUSTED_BUCKET`.
    pub fn source_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.source_bucket = Some(bucket.into());
        self
    }

    /// The secret holding destination coordinates. Falls back to `ONPREM_SECRET_NAME`.
    pub fn secret_id(mut self, secret_id: impl Into<String>) -> Self {
        self.secret_id = Some(secret_id.into());
        self
    }

    /// How to log in to destinations. Falls back to `ONPREM_AUTH_MODE`.
    pub fn destination_auth(mut self, auth: DestinationAuth) -> Self {
        self.destination_auth = Some(auth);
        self
    }

    /// Destination labels in delivery order. Falls back to `ONPREM_DESTINATIONS`.
    pub fn destinations<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.destinations = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Load the default configuration
    ///
    /// If fields have been overridden during loader construction, the override values will be
    /// used. Otherwise, the environment is consulted, and finally the built in defaults.
    pub async fn load(self) -> Result<Config, Error> {
        let shared_config = aws_config::from_env().load().await;
        self.load_with(&shared_config)
    }

    /// Like [`load`](Self::load), but builds the AWS clients from an existing SDK config.
    pub fn load_with(self, shared_config: &SdkConfig) -> Result<Config, Error> {
        self.apply_env(Config::builder(), env_var)?
            .s3_client(aws_sdk_s3::Client::new(shared_config))
            .secrets_client(aws_sdk_secretsmanager::Client::new(shared_config))
            .cloudwatch_client(aws_sdk_cloudwatch::Client::new(shared_config))
            .build()
    }

    fn apply_env<F>(self, mut builder: Builder, lookup: F) -> Result<Builder, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bucket) = self.source_bucket.or_else(|| lookup(SOURCE_BUCKET_ENV)) {
            builder = builder.source_bucket(bucket);
        }
        if let Some(secret_id) = self.secret_id.or_else(|| lookup(SECRET_ID_ENV)) {
            builder = builder.secret_id(secret_id);
        }

        let auth = match self.destination_auth {
            Some(auth) => Some(auth),
            None => parse_auth(lookup(AUTH_MODE_ENV), lookup(SFTP_USER_ENV))?,
        };
        if let Some(auth) = auth {
            builder = builder.destination_auth(auth);
        }

        let destinations = self
            .destinations
            .or_else(|| lookup(DESTINATIONS_ENV).map(|labels| parse_labels(&labels)));
        if let Some(destinations) = destinations {
            builder = builder.destinations(destinations);
        }

        if let Some(root) = lookup(REMOTE_ROOT_ENV) {
            builder = builder.remote_root(root);
        }
        if let Some(secs) = lookup(CONNECT_TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                error::invalid_input(format!("{CONNECT_TIMEOUT_ENV} must be whole seconds"))
            })?;
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(namespace) = lookup(METRICS_NAMESPACE_ENV) {
            builder = builder.metrics_namespace(namespace);
        }
        if let Some(dir) = lookup(SCRATCH_DIR_ENV) {
            builder = builder.scratch_dir(dir);
        }

        Ok(builder)
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_auth(
    mode: Option<String>,
    username: Option<String>,
) -> Result<Option<DestinationAuth>, Error> {
    match mode.as_deref().map(str::trim) {
        None => Ok(None),
        Some(NETWORK_TRUST) => Ok(Some(DestinationAuth::NetworkTrust {
            username: username.unwrap_or_else(|| DEFAULT_SFTP_USER.to_owned()),
        })),
        Some(other) => Err(error::invalid_input(format!(
            "unsupported {AUTH_MODE_ENV} {other:?}, expected {NETWORK_TRUST:?}"
        ))),
    }
}

fn parse_labels(labels: &str) -> Vec<String> {
    labels
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_owned)
        .collect()
}
