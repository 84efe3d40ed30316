/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Lambda entry point: one invocation relays one trigger payload.

use lambda_runtime::{service_fn, LambdaEvent};
use onprem_relay::types::InvocationOutput;
use onprem_relay::Client;
use serde_json::Value;

async fn handler(
    client: &Client,
    event: LambdaEvent<Value>,
) -> Result<InvocationOutput, lambda_runtime::Error> {
    let (payload, context) = event.into_parts();
    let batch = client
        .relay()
        .payload(payload)
        .invocation_id(context.request_id)
        .send()
        .await?;
    Ok(batch.into_output())
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .without_time()
        .init();

    let config = onprem_relay::from_env().load().await?;
    let client = Client::new(config);

    lambda_runtime::run(service_fn(|event| handler(&client, event))).await
}
