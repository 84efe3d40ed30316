/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use serde_json::Value;

use crate::error::Error;
use crate::types::BatchResult;

use super::RelayInputBuilder;

/// Fluent builder for relaying the objects named by one trigger
#[derive(Debug)]
pub struct RelayFluentBuilder {
    handle: Arc<crate::client::Handle>,
    inner: RelayInputBuilder,
}

impl RelayFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            inner: ::std::default::Default::default(),
        }
    }

    /// Relay every object named by the trigger and wait for the batch to finish.
    pub async fn send(self) -> Result<BatchResult, Error> {
        let input = self.inner.build()?;
        crate::operation::relay::Relay::orchestrate(self.handle, input).await
    }

    /// Set the trigger payload.
    pub fn payload(mut self, input: Value) -> Self {
        self.inner = self.inner.payload(input);
        self
    }

    /// Set the trigger payload.
    pub fn set_payload(mut self, input: Option<Value>) -> Self {
        self.inner = self.inner.set_payload(input);
        self
    }

    /// The trigger payload
    pub fn get_payload(&self) -> &Option<Value> {
        self.inner.get_payload()
    }

    /// Set the identifier attached to every log line of the invocation.
    ///
    /// A random identifier is generated when none is set.
    pub fn invocation_id(mut self, input: impl Into<String>) -> Self {
        self.inner = self.inner.invocation_id(input);
        self
    }

    /// Set the identifier attached to every log line of the invocation.
    pub fn set_invocation_id(mut self, input: Option<String>) -> Self {
        self.inner = self.inner.set_invocation_id(input);
        self
    }

    /// The identifier attached to every log line of the invocation.
    pub fn get_invocation_id(&self) -> &Option<String> {
        self.inner.get_invocation_id()
    }
}

impl crate::operation::relay::RelayInputBuilder {
    /// Relay the objects named by this input using the given client.
    pub async fn send_with(self, client: &crate::Client) -> Result<BatchResult, Error> {
        let mut fluent_builder = client.relay();
        fluent_builder.inner = self;
        fluent_builder.send().await
    }
}
