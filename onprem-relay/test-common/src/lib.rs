/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use onprem_relay::destination::{Connector, RemoteSession};
use onprem_relay::error::{Error, ErrorKind};
use onprem_relay::metrics::{MetricObservation, MetricsSink};
use onprem_relay::types::DestinationTarget;
use serde_json::{json, Value};

/// Build an SQS batch payload with one message per `(bucket, key)`, each carrying a single
/// `ObjectCreated:Put` notification. Keys are used verbatim, so encode them if needed.
pub fn sqs_batch(objects: &[(&str, &str)]) -> Value {
    let messages: Vec<Value> = objects
        .iter()
        .enumerate()
        .map(|(i, (bucket, key))| {
            let notification = json!({
                "Records": [{
                    "eventVersion": "2.1",
                    "eventSource": "aws:s3",
                    "awsRegion": "us-east-1",
                    "eventTime": "2024-01-02T03:00:00.000Z",
                    "eventName": "ObjectCreated:Put",
                    "userIdentity": { "principalId": "AWS:AIDAEXAMPLE" },
                    "requestParameters": { "sourceIPAddress": "10.1.2.3" },
                    "responseElements": {},
                    "s3": {
                        "s3SchemaVersion": "1.0",
                        "bucket": {
                            "name": bucket,
                            "arn": format!("arn:aws:s3:::{bucket}")
                        },
                        "object": { "key": key }
                    }
                }]
            });
            json!({
                "messageId": format!("message-{i}"),
                "eventSource": "aws:sqs",
                "body": notification.to_string(),
            })
        })
        .collect();
    json!({ "Records": messages })
}

/// Credential secret for the default `op1`/`op2` destinations.
pub fn default_secret() -> String {
    json!({
        "op1_host": "10.0.0.1",
        "op1_port": "22",
        "op2_host": "10.0.0.2",
        "op2_port": "22",
    })
    .to_string()
}

#[derive(Debug, Default)]
struct Filesystems {
    dirs: BTreeSet<(String, PathBuf)>,
    files: BTreeMap<(String, PathBuf), Vec<u8>>,
    unreachable: BTreeSet<String>,
    connections: Vec<String>,
}

/// In-memory destinations, one filesystem per label.
#[derive(Debug, Clone, Default)]
pub struct FakeDestinations {
    inner: Arc<Mutex<Filesystems>>,
}

impl FakeDestinations {
    /// Empty destinations that accept every connection
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse connections to `label`
    pub fn unreachable(self, label: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .unreachable
            .insert(label.to_owned());
        self
    }

    /// Contents of `path` on destination `label`
    pub fn file(&self, label: &str, path: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .unwrap()
            .files
            .get(&(label.to_owned(), PathBuf::from(path)))
            .cloned()
    }

    /// Every file path stored on destination `label`
    pub fn files(&self, label: &str) -> Vec<PathBuf> {
        self.inner
            .lock()
            .unwrap()
            .files
            .keys()
            .filter(|(l, _)| l == label)
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// Labels in the order connections were attempted
    pub fn connections(&self) -> Vec<String> {
        self.inner.lock().unwrap().connections.clone()
    }
}

impl Connector for FakeDestinations {
    fn connect(
        &self,
        target: &DestinationTarget,
        _timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.connections.push(target.label().to_owned());
        if inner.unreachable.contains(target.label()) {
            return Err(Error::new(
                ErrorKind::DestinationConnect,
                format!("connection to {}:{} timed out", target.host(), target.port()),
            ));
        }
        Ok(Box::new(FakeSession {
            label: target.label().to_owned(),
            inner: self.inner.clone(),
        }))
    }
}

#[derive(Debug)]
struct FakeSession {
    label: String,
    inner: Arc<Mutex<Filesystems>>,
}

impl FakeSession {
    fn key(&self, path: &Path) -> (String, PathBuf) {
        (self.label.clone(), path.to_path_buf())
    }
}

impl RemoteSession for FakeSession {
    fn exists(&mut self, path: &Path) -> Result<bool, Error> {
        let inner = self.inner.lock().unwrap();
        Ok(path == Path::new("/") || inner.dirs.contains(&self.key(path)))
    }

    fn mkdir(&mut self, path: &Path) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        let parent_exists = match path.parent() {
            Some(parent) => parent == Path::new("/") || inner.dirs.contains(&self.key(parent)),
            None => false,
        };
        if !parent_exists || !inner.dirs.insert(self.key(path)) {
            return Err(Error::new(
                ErrorKind::DestinationIo,
                format!("mkdir {} failed", path.display()),
            ));
        }
        Ok(())
    }

    fn upload(&mut self, local: &Path, remote: &Path) -> Result<u64, Error> {
        let content = std::fs::read(local)?;
        let mut inner = self.inner.lock().unwrap();
        let parent_exists = remote
            .parent()
            .is_some_and(|parent| inner.dirs.contains(&self.key(parent)));
        if !parent_exists {
            return Err(Error::new(
                ErrorKind::DestinationIo,
                format!("no such directory for {}", remote.display()),
            ));
        }
        let len = content.len() as u64;
        inner.files.insert(self.key(remote), content);
        Ok(len)
    }

    fn close(self: Box<Self>) -> Result<(), Error> {
        Ok(())
    }
}

/// Metrics sink that keeps every published batch.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    published: Arc<Mutex<Vec<(String, Vec<MetricObservation>)>>>,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publish call, in order, as (namespace, observations)
    pub fn published(&self) -> Vec<(String, Vec<MetricObservation>)> {
        self.published.lock().unwrap().clone()
    }

    /// Every observation named `name`, across all publish calls
    pub fn observations(&self, name: &str) -> Vec<MetricObservation> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, observations)| observations.iter())
            .filter(|observation| observation.name() == name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn publish(
        &self,
        namespace: &str,
        observations: Vec<MetricObservation>,
    ) -> Result<(), Error> {
        self.published
            .lock()
            .unwrap()
            .push((namespace.to_owned(), observations));
        Ok(())
    }
}
