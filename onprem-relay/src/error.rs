/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

use aws_sdk_s3::error::ProvideErrorMetadata;

/// Errors returned by this library
///
/// NOTE: Use [`aws_smithy_types::error::display::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

/// General categories of relay errors.
///
/// Only [`ErrorKind::CredentialsUnavailable`] and [`ErrorKind::InputInvalid`] ever escape a
/// relay operation. Every other kind is recorded as a failed object or a failed destination.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Configuration or payload validation issues
    InputInvalid,

    /// Destination coordinates could not be loaded from the secret store
    CredentialsUnavailable,

    /// Listing the source bucket failed
    ListingFailed,

    /// An object could not be read from the source bucket
    ObjectFetchFailed,

    /// The destination could not be reached (resolution, TCP, SSH handshake)
    DestinationConnect,

    /// The destination refused the session
    DestinationAuth,

    /// A remote filesystem operation failed (stat, mkdir, upload)
    DestinationIo,

    /// Metrics could not be published
    MetricsEmitFailed,

    /// Local I/O errors (scratch files)
    IOError,

    /// Some kind of internal runtime issue (e.g. blocking task failure)
    RuntimeError,
}

impl Error {
    /// Creates a new relay [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InputInvalid => write!(f, "invalid input"),
            ErrorKind::CredentialsUnavailable => write!(f, "destination credentials unavailable"),
            ErrorKind::ListingFailed => write!(f, "failed to list source objects"),
            ErrorKind::ObjectFetchFailed => write!(f, "failed to fetch object"),
            ErrorKind::DestinationConnect => write!(f, "failed to connect to destination"),
            ErrorKind::DestinationAuth => write!(f, "destination refused the session"),
            ErrorKind::DestinationIo => write!(f, "remote I/O error"),
            ErrorKind::MetricsEmitFailed => write!(f, "failed to publish metrics"),
            ErrorKind::IOError => write!(f, "I/O error"),
            ErrorKind::RuntimeError => write!(f, "runtime error"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::new(ErrorKind::RuntimeError, value)
    }
}

impl From<aws_smithy_types::error::operation::BuildError> for Error {
    fn from(value: aws_smithy_types::error::operation::BuildError) -> Self {
        Self::new(ErrorKind::InputInvalid, value)
    }
}

pub(crate) fn invalid_input<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, err)
}

pub(crate) fn credentials_unavailable<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::CredentialsUnavailable, err)
}

pub(crate) fn fetch_failed<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::ObjectFetchFailed, err)
}

pub(crate) fn listing_failed<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::ListingFailed, err)
}

pub(crate) fn metrics_failed<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::MetricsEmitFailed, err)
}

pub(crate) fn from_kind<E>(kind: ErrorKind) -> impl FnOnce(E) -> Error
where
    E: Into<BoxError>,
{
    |err| Error::new(kind, err)
}

/// Extract the service error code of an SDK error, if the service returned one.
pub(crate) fn service_code<E, R>(err: &aws_sdk_s3::error::SdkError<E, R>) -> Option<&str>
where
    E: ProvideErrorMetadata,
{
    err.code()
}
