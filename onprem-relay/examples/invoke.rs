/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use std::error::Error;
use std::path::PathBuf;
use std::time;

use aws_smithy_types::error::display::DisplayErrorContext;
use clap::Parser;
use onprem_relay::destination::DestinationAuth;
use serde_json::Value;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "invoke")]
#[command(about = "Runs one relay invocation locally against real AWS and SFTP endpoints.")]
pub struct Args {
    /// JSON trigger payload to relay. Without one, the current hour of the source bucket is scanned.
    #[arg(long)]
    event: Option<PathBuf>,

    /// Source bucket for scheduled scans (overrides TRUSTED_BUCKET)
    #[arg(long)]
    bucket: Option<String>,

    /// Secret holding destination coordinates (overrides ONPREM_SECRET_NAME)
    #[arg(long)]
    secret_id: Option<String>,

    /// Log in to destinations with the SSH `none` method as this user
    #[arg(long)]
    network_trust: Option<String>,

    /// Comma separated destination labels (overrides ONPREM_DESTINATIONS)
    #[arg(long, value_delimiter = ',')]
    destinations: Vec<String>,
}

async fn invoke(args: Args) -> Result<(), BoxError> {
    let payload: Value = match &args.event {
        Some(path) => serde_json::from_slice(&tokio::fs::read(path).await?)?,
        None => Value::Object(Default::default()),
    };

    let mut loader = onprem_relay::from_env();
    if let Some(bucket) = args.bucket {
        loader = loader.source_bucket(bucket);
    }
    if let Some(secret_id) = args.secret_id {
        loader = loader.secret_id(secret_id);
    }
    if let Some(username) = args.network_trust {
        loader = loader.destination_auth(DestinationAuth::NetworkTrust { username });
    }
    if !args.destinations.is_empty() {
        loader = loader.destinations(args.destinations);
    }
    let client = onprem_relay::Client::new(loader.load().await?);

    let start = time::Instant::now();
    let batch = client.relay().payload(payload).send().await?;
    let elapsed = start.elapsed();

    println!(
        "relayed {} of {} objects in {elapsed:?}",
        batch.successful(),
        batch.total()
    );
    println!("{}", serde_json::to_string_pretty(&batch.into_output())?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    if let Err(ref err) = invoke(args).await {
        tracing::error!("invocation failed: {}", DisplayErrorContext(err.as_ref()));
    }

    Ok(())
}
