/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Helpers for unit tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, UNIX_EPOCH};

use aws_sdk_cloudwatch::operation::put_metric_data::PutMetricDataOutput;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueOutput;
use aws_smithy_async::time::{SharedTimeSource, StaticTimeSource};
use aws_smithy_mocks::{mock, mock_client};

use crate::destination::{Connector, RemoteSession};
use crate::error::{from_kind, Error, ErrorKind};
use crate::types::DestinationTarget;

/// 2024-01-02T03:00:00Z
pub(crate) const SCENARIO_EPOCH_SECS: u64 = 1_704_164_400;

pub(crate) fn clock_at(epoch_secs: u64) -> SharedTimeSource {
    SharedTimeSource::new(StaticTimeSource::new(
        UNIX_EPOCH + Duration::from_secs(epoch_secs),
    ))
}

// Clients whose single rule is never expected to be hit.

pub(crate) fn idle_s3_client() -> aws_sdk_s3::Client {
    let unused =
        mock!(aws_sdk_s3::Client::get_object).then_output(|| GetObjectOutput::builder().build());
    mock_client!(aws_sdk_s3, &[&unused])
}

pub(crate) fn idle_secrets_client() -> aws_sdk_secretsmanager::Client {
    let unused = mock!(aws_sdk_secretsmanager::Client::get_secret_value)
        .then_output(|| GetSecretValueOutput::builder().build());
    mock_client!(aws_sdk_secretsmanager, &[&unused])
}

pub(crate) fn idle_cloudwatch_client() -> aws_sdk_cloudwatch::Client {
    let unused = mock!(aws_sdk_cloudwatch::Client::put_metric_data)
        .then_output(|| PutMetricDataOutput::builder().build());
    mock_client!(aws_sdk_cloudwatch, &[&unused])
}

#[derive(Debug, Default)]
pub(crate) struct RemoteState {
    pub(crate) dirs: BTreeSet<PathBuf>,
    pub(crate) files: BTreeMap<PathBuf, Vec<u8>>,
    pub(crate) mkdir_calls: usize,
}

/// In-memory destination with a shared filesystem.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryRemote {
    pub(crate) state: Arc<Mutex<RemoteState>>,
    /// Labels that refuse connections
    pub(crate) unreachable: Vec<String>,
    /// Directories that appear (as if created by someone else) when we try to create them
    pub(crate) raced_dirs: Vec<PathBuf>,
}

impl MemoryRemote {
    pub(crate) fn with_dirs(dirs: &[&str]) -> Self {
        let remote = MemoryRemote::default();
        remote
            .state
            .lock()
            .unwrap()
            .dirs
            .extend(dirs.iter().map(PathBuf::from));
        remote
    }

    pub(crate) fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(Path::new(path)).cloned()
    }
}

impl Connector for MemoryRemote {
    fn connect(
        &self,
        target: &DestinationTarget,
        _timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, Error> {
        if self.unreachable.iter().any(|label| label == target.label()) {
            return Err(from_kind(ErrorKind::DestinationConnect)(format!(
                "{} timed out",
                target.host()
            )));
        }
        Ok(Box::new(self.clone()))
    }
}

impl RemoteSession for MemoryRemote {
    fn exists(&mut self, path: &Path) -> Result<bool, Error> {
        let state = self.state.lock().unwrap();
        Ok(path == Path::new("/") || state.dirs.contains(path) || state.files.contains_key(path))
    }

    fn mkdir(&mut self, path: &Path) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.mkdir_calls += 1;
        if self.raced_dirs.iter().any(|dir| dir == path) {
            state.dirs.insert(path.to_path_buf());
            return Err(from_kind(ErrorKind::DestinationIo)("file already exists"));
        }
        let parent_exists = path
            .parent()
            .map(|p| p == Path::new("/") || state.dirs.contains(p))
            .unwrap_or(false);
        if !parent_exists || state.dirs.contains(path) {
            return Err(from_kind(ErrorKind::DestinationIo)(format!(
                "mkdir {} failed",
                path.display()
            )));
        }
        state.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn upload(&mut self, local: &Path, remote: &Path) -> Result<u64, Error> {
        let content = std::fs::read(local)?;
        let mut state = self.state.lock().unwrap();
        let parent_exists = remote
            .parent()
            .map(|p| state.dirs.contains(p))
            .unwrap_or(false);
        if !parent_exists {
            return Err(from_kind(ErrorKind::DestinationIo)("no such directory"));
        }
        let len = content.len() as u64;
        state.files.insert(remote.to_path_buf(), content);
        Ok(len)
    }

    fn close(self: Box<Self>) -> Result<(), Error> {
        Ok(())
    }
}

/// A builder with every required field set: idle AWS clients, a pinned clock, and `remote`
/// as the connector for all destinations.
pub(crate) fn test_config(
    remote: MemoryRemote,
    scratch_dir: impl Into<PathBuf>,
) -> crate::config::Builder {
    crate::Config::builder()
        .secret_id("onprem-credentials")
        .source_bucket("trusted")
        .scratch_dir(scratch_dir)
        .time_source(clock_at(SCENARIO_EPOCH_SECS))
        .s3_client(idle_s3_client())
        .secrets_client(idle_secrets_client())
        .cloudwatch_client(idle_cloudwatch_client())
        .connector(Arc::new(remote))
}
