/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use ssh2::{ErrorCode, Session, Sftp};

use super::{Connector, DestinationAuth, RemoteSession};
use crate::error::{from_kind, BoxError, Error, ErrorKind};
use crate::types::DestinationTarget;

/// `LIBSSH2_FX_NO_SUCH_FILE`
const SFTP_NO_SUCH_FILE: i32 = 2;

const DIR_MODE: i32 = 0o755;

/// Opens SFTP sessions over SSH.
#[derive(Debug, Clone)]
pub struct SftpConnector {
    auth: DestinationAuth,
}

impl SftpConnector {
    /// Create a connector that logs in using `auth`
    pub fn new(auth: DestinationAuth) -> Self {
        Self { auth }
    }
}

impl Connector for SftpConnector {
    fn connect(
        &self,
        target: &DestinationTarget,
        timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, Error> {
        let tcp = open_tcp(target, timeout)?;

        let mut session = Session::new().map_err(from_kind(ErrorKind::DestinationConnect))?;
        session.set_timeout(timeout.as_millis().try_into().unwrap_or(u32::MAX));
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(from_kind(ErrorKind::DestinationConnect))?;
        tracing::trace!("ssh handshake with {} complete", target.label());

        match &self.auth {
            DestinationAuth::NetworkTrust { username } => {
                network_trust_login(&session, username, target)?
            }
        }

        let sftp = session.sftp().map_err(from_kind(ErrorKind::DestinationIo))?;
        Ok(Box::new(SftpSession {
            label: target.label().to_owned(),
            session,
            sftp,
        }))
    }
}

fn open_tcp(target: &DestinationTarget, timeout: Duration) -> Result<TcpStream, Error> {
    let addrs = (target.host(), target.port())
        .to_socket_addrs()
        .map_err(from_kind(ErrorKind::DestinationConnect))?;

    let mut last_err: Option<io::Error> = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream
                    .set_read_timeout(Some(timeout))
                    .and_then(|_| stream.set_write_timeout(Some(timeout)))
                    .map_err(from_kind(ErrorKind::DestinationConnect))?;
                return Ok(stream);
            }
            Err(err) => {
                tracing::debug!("connecting to {} via {addr} failed: {err}", target.label());
                last_err = Some(err);
            }
        }
    }

    let source: BoxError = match last_err {
        Some(err) => err.into(),
        None => format!("{}:{} resolved to no addresses", target.host(), target.port()).into(),
    };
    Err(Error::new(ErrorKind::DestinationConnect, source))
}

/// Ask for the list of auth methods, which sends the SSH `none` request. A server that trusts
/// our network answers by completing authentication instead.
fn network_trust_login(
    session: &Session,
    username: &str,
    target: &DestinationTarget,
) -> Result<(), Error> {
    let offered = session
        .auth_methods(username)
        .map_err(from_kind(ErrorKind::DestinationAuth))?;

    if session.authenticated() {
        return Ok(());
    }

    Err(Error::new(
        ErrorKind::DestinationAuth,
        format!(
            "{} did not accept a network-trust login for {username:?} (offered: {offered})",
            target.label()
        ),
    ))
}

struct SftpSession {
    label: String,
    session: Session,
    sftp: Sftp,
}

impl fmt::Debug for SftpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SftpSession")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl RemoteSession for SftpSession {
    fn exists(&mut self, path: &Path) -> Result<bool, Error> {
        match self.sftp.stat(path) {
            Ok(_) => Ok(true),
            Err(err) if matches!(err.code(), ErrorCode::SFTP(SFTP_NO_SUCH_FILE)) => Ok(false),
            Err(err) => Err(Error::new(ErrorKind::DestinationIo, err)),
        }
    }

    fn mkdir(&mut self, path: &Path) -> Result<(), Error> {
        self.sftp
            .mkdir(path, DIR_MODE)
            .map_err(from_kind(ErrorKind::DestinationIo))
    }

    fn upload(&mut self, local: &Path, remote: &Path) -> Result<u64, Error> {
        let mut source = File::open(local)?;
        let mut dest = self
            .sftp
            .create(remote)
            .map_err(from_kind(ErrorKind::DestinationIo))?;
        let written =
            io::copy(&mut source, &mut dest).map_err(from_kind(ErrorKind::DestinationIo))?;
        dest.flush().map_err(from_kind(ErrorKind::DestinationIo))?;
        Ok(written)
    }

    fn close(self: Box<Self>) -> Result<(), Error> {
        let SftpSession {
            label,
            session,
            sftp,
        } = *self;
        drop(sftp);
        session
            .disconnect(None, "relay finished", None)
            .map_err(from_kind(ErrorKind::DestinationIo))?;
        tracing::trace!("closed session to {label}");
        Ok(())
    }
}
