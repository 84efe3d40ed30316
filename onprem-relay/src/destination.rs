/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::types::DestinationTarget;

/// SFTP implementation of [`Connector`]
pub mod sftp;

/// How the relay identifies itself to a destination.
///
/// There is no default: the only supported mode trusts the network path and
/// sends no secret, so it has to be chosen explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DestinationAuth {
    /// Log in with the SSH `none` method as `username`.
    ///
    /// The destination must accept unauthenticated sessions from the relay's network. No
    /// password, key, or host key verification is involved.
    NetworkTrust {
        /// User name announced in the SSH handshake
        username: String,
    },
}

/// An open session to a destination.
///
/// All operations are blocking and run on Tokio's blocking pool.
pub trait RemoteSession: fmt::Debug {
    /// Returns `true` if `path` exists on the destination.
    fn exists(&mut self, path: &Path) -> Result<bool, Error>;

    /// Create a single directory. The parent must exist.
    fn mkdir(&mut self, path: &Path) -> Result<(), Error>;

    /// Copy the local file at `local` to `remote`, returning the number of bytes written.
    fn upload(&mut self, local: &Path, remote: &Path) -> Result<u64, Error>;

    /// Close the session.
    fn close(self: Box<Self>) -> Result<(), Error>;
}

/// Opens sessions to destinations.
pub trait Connector: fmt::Debug + Send + Sync {
    /// Connect to `target`, giving up after `timeout`.
    fn connect(
        &self,
        target: &DestinationTarget,
        timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, Error>;
}

/// A [`Connector`] shared between the client and blocking delivery tasks
pub type SharedConnector = Arc<dyn Connector>;
