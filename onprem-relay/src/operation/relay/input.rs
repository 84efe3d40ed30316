/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_smithy_types::error::operation::BuildError;
use serde_json::Value;

/// Input type for relaying the objects named by one trigger
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct RelayInput {
    /// The raw trigger payload: an SQS batch of S3 notifications, or anything else for a
    /// scheduled scan.
    pub payload: Value,

    /// Identifier attached to every log line of the invocation.
    pub invocation_id: Option<String>,
}

impl RelayInput {
    /// Creates a new builder-style object to manufacture [`RelayInput`](crate::operation::relay::RelayInput).
    pub fn builder() -> RelayInputBuilder {
        RelayInputBuilder::default()
    }

    /// The raw trigger payload
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Identifier attached to every log line of the invocation.
    pub fn invocation_id(&self) -> Option<&str> {
        self.invocation_id.as_deref()
    }
}

/// A builder for [`RelayInput`](crate::operation::relay::RelayInput).
#[non_exhaustive]
#[derive(Clone, Default, Debug)]
pub struct RelayInputBuilder {
    pub(crate) payload: Option<Value>,
    pub(crate) invocation_id: Option<String>,
}

impl RelayInputBuilder {
    /// Set the trigger payload.
    ///
    /// NOTE: A payload is required. Use an empty object to request a scheduled scan.
    pub fn payload(mut self, input: Value) -> Self {
        self.payload = Some(input);
        self
    }

    /// Set the trigger payload.
    ///
    /// NOTE: A payload is required. Use an empty object to request a scheduled scan.
    pub fn set_payload(mut self, input: Option<Value>) -> Self {
        self.payload = input;
        self
    }

    /// The trigger payload
    pub fn get_payload(&self) -> &Option<Value> {
        &self.payload
    }

    /// Set the identifier attached to every log line of the invocation.
    pub fn invocation_id(mut self, input: impl Into<String>) -> Self {
        self.invocation_id = Some(input.into());
        self
    }

    /// Set the identifier attached to every log line of the invocation.
    pub fn set_invocation_id(mut self, input: Option<String>) -> Self {
        self.invocation_id = input;
        self
    }

    /// The identifier attached to every log line of the invocation.
    pub fn get_invocation_id(&self) -> &Option<String> {
        &self.invocation_id
    }

    /// Consumes the builder and constructs a [`RelayInput`](crate::operation::relay::RelayInput).
    pub fn build(self) -> Result<RelayInput, BuildError> {
        let payload = self.payload.ok_or_else(|| {
            BuildError::missing_field("payload", "a trigger payload is required")
        })?;
        Ok(RelayInput {
            payload,
            invocation_id: self.invocation_id,
        })
    }
}
