/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use serde_json::{Map, Value};
use tracing::Instrument;

use crate::error::{self, Error};
use crate::operation::RelayContext;
use crate::types::DestinationTarget;

/// Destination coordinates read from the credential secret.
///
/// The secret is a flat JSON object with `<label>_host` and `<label>_port` entries for each
/// destination. Ports may be numbers or numeric strings.
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    entries: Map<String, Value>,
}

impl Credentials {
    pub(crate) fn parse(secret: &str) -> Result<Credentials, Error> {
        match serde_json::from_str::<Value>(secret) {
            Ok(Value::Object(entries)) => Ok(Credentials { entries }),
            Ok(_) => Err(error::credentials_unavailable(
                "secret is not a JSON object",
            )),
            // the parse error may quote the secret
            Err(_) => Err(error::credentials_unavailable("secret is not valid JSON")),
        }
    }

    /// Resolve one destination label.
    pub(crate) fn target(&self, label: &str) -> Result<DestinationTarget, Error> {
        let host_key = format!("{label}_host");
        let port_key = format!("{label}_port");

        let host = match self.entries.get(&host_key) {
            Some(Value::String(host)) if !host.trim().is_empty() => host.trim(),
            _ => {
                return Err(error::credentials_unavailable(format!(
                    "secret has no usable {host_key}"
                )))
            }
        };
        let port = match self.entries.get(&port_key) {
            Some(Value::Number(port)) => port.as_u64().and_then(|p| u16::try_from(p).ok()),
            Some(Value::String(port)) => port.trim().parse::<u16>().ok(),
            _ => None,
        }
        .filter(|port| *port != 0)
        .ok_or_else(|| error::credentials_unavailable(format!("secret has no usable {port_key}")))?;

        Ok(DestinationTarget::new(label, host, port))
    }

    /// Resolve every label, in order. The first unresolvable label fails the whole set.
    pub(crate) fn targets(&self, labels: &[String]) -> Result<Vec<DestinationTarget>, Error> {
        labels.iter().map(|label| self.target(label)).collect()
    }
}

/// Fetch and parse the credential secret.
pub(crate) async fn load(ctx: &RelayContext) -> Result<Credentials, Error> {
    let secret_id = ctx.config().secret_id();
    let output = ctx
        .secrets_client()
        .get_secret_value()
        .secret_id(secret_id)
        .send()
        .instrument(tracing::debug_span!("send-get-secret-value"))
        .await
        .map_err(error::credentials_unavailable)?;

    let secret = output.secret_string().ok_or_else(|| {
        error::credentials_unavailable(format!("secret {secret_id} has no string value"))
    })?;
    Credentials::parse(secret)
}
