/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::borrow::Cow;

use aws_lambda_events::event::s3::S3EventRecord;
use aws_lambda_events::event::sqs::SqsMessage;
use serde::Deserialize;
use serde_json::Value;

use super::list_objects::ListObjectsStream;
use crate::error::{self, Error};
use crate::operation::RelayContext;
use crate::path;
use crate::types::ObjectReference;

const RECORDS: &str = "Records";
const S3_EVENT_SOURCE: &str = "aws:s3";
const OBJECT_CREATED: &str = "ObjectCreated";

/// What started an invocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Trigger {
    /// An SQS batch of S3 notifications, already reduced to created objects
    Notifications(Vec<ObjectReference>),
    /// Anything else: list the source bucket under the current hour
    ScheduledScan,
}

impl Trigger {
    /// Classify a raw payload. Never fails: malformed parts of a notification batch are
    /// logged and skipped.
    pub(crate) fn from_payload(payload: &Value) -> Trigger {
        match payload.get(RECORDS) {
            Some(records) => Trigger::Notifications(created_objects(records)),
            None => Trigger::ScheduledScan,
        }
    }
}

fn created_objects(records: &Value) -> Vec<ObjectReference> {
    let Some(messages) = records.as_array() else {
        tracing::warn!("ignoring trigger whose Records is not a list");
        return Vec::new();
    };

    let mut objects = Vec::new();
    for (index, message) in messages.iter().enumerate() {
        let body = match SqsMessage::deserialize(message).ok().and_then(|m| m.body) {
            Some(body) => body,
            None => {
                tracing::warn!("skipping queue message {index}: no body");
                continue;
            }
        };
        let notification: Value = match serde_json::from_str(&body) {
            Ok(notification) => notification,
            Err(err) => {
                tracing::warn!("skipping queue message {index}: body is not JSON: {err}");
                continue;
            }
        };
        let Some(inner) = notification.get(RECORDS) else {
            // s3:TestEvent and friends
            tracing::debug!("queue message {index} carries no S3 records");
            continue;
        };
        let Some(inner) = inner.as_array() else {
            tracing::warn!("skipping queue message {index}: Records is not a list");
            continue;
        };

        for record in inner {
            let record = match S3EventRecord::deserialize(record) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!("skipping malformed S3 record in message {index}: {err}");
                    continue;
                }
            };
            if let Some(object) = created_object(record) {
                objects.push(object);
            }
        }
    }
    objects
}

fn created_object(record: S3EventRecord) -> Option<ObjectReference> {
    if record.event_source.as_deref() != Some(S3_EVENT_SOURCE) {
        return None;
    }
    let created = record
        .event_name
        .as_deref()
        .is_some_and(|name| name.starts_with(OBJECT_CREATED));
    if !created {
        return None;
    }
    let (Some(bucket), Some(key)) = (record.s3.bucket.name, record.s3.object.key) else {
        tracing::warn!("skipping created object without a bucket or key");
        return None;
    };
    let size = record.s3.object.size.and_then(|size| u64::try_from(size).ok());
    Some(ObjectReference::new(bucket, decode_key(&key).into_owned()).with_size(size))
}

/// Notification keys are form encoded: `+` is a space, everything else is percent encoded.
fn decode_key(raw: &str) -> Cow<'_, str> {
    let spaced = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    let decoded = match urlencoding::decode(&spaced) {
        Ok(Cow::Owned(decoded)) => Some(decoded),
        Ok(Cow::Borrowed(_)) => None,
        Err(err) => {
            tracing::warn!("key {raw:?} does not decode to UTF-8, using it as is: {err}");
            None
        }
    };
    match decoded {
        Some(decoded) => Cow::Owned(decoded),
        None => spaced,
    }
}

/// The objects one invocation will relay, in order.
#[derive(Debug)]
pub(crate) enum ObjectStream {
    Notifications(std::vec::IntoIter<ObjectReference>),
    Scan(Box<ListObjectsStream>),
    Unavailable(Option<Error>),
}

impl ObjectStream {
    pub(crate) fn new(ctx: &RelayContext, trigger: Trigger) -> ObjectStream {
        match trigger {
            Trigger::Notifications(objects) => ObjectStream::Notifications(objects.into_iter()),
            Trigger::ScheduledScan => {
                let config = ctx.config();
                let Some(bucket) = config.source_bucket() else {
                    return ObjectStream::Unavailable(Some(error::invalid_input(
                        "scheduled scan requested but no source bucket is configured",
                    )));
                };
                let prefix = path::hour_path(config.time_source().now());
                tracing::info!("scanning s3://{bucket}/{prefix}");
                ObjectStream::Scan(Box::new(ListObjectsStream::new(
                    ctx.s3_client().clone(),
                    bucket,
                    prefix,
                )))
            }
        }
    }

    pub(crate) async fn next(&mut self) -> Option<Result<ObjectReference, Error>> {
        match self {
            ObjectStream::Notifications(objects) => objects.next().map(Ok),
            ObjectStream::Scan(listing) => listing.next().await,
            ObjectStream::Unavailable(err) => err.take().map(Err),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{decode_key, Trigger};
    use crate::types::ObjectReference;

    fn s3_record(event_name: &str, bucket: &str, key: &str) -> Value {
        json!({
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-1",
            "eventTime": "2024-01-02T03:00:00.000Z",
            "eventName": event_name,
            "userIdentity": { "principalId": "AWS:AIDAEXAMPLE" },
            "requestParameters": { "sourceIPAddress": "10.1.2.3" },
            "responseElements": {
                "x-amz-request-id": "C3D13FE58DE4C810",
                "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S/JRWeUWerMUE5JgHvANOjpD"
            },
            "s3": {
                "s3SchemaVersion": "1.0",
                "configurationId": "relay-notifications",
                "bucket": {
                    "name": bucket,
                    "ownerIdentity": { "principalId": "A3NL1KOZZKExample" },
                    "arn": format!("arn:aws:s3:::{bucket}")
                },
                "object": {
                    "key": key,
                    "size": 120,
                    "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                    "sequencer": "0055AED6DCD90281E5"
                }
            }
        })
    }

    fn message(records: Vec<Value>) -> Value {
        json!({ "body": json!({ "Records": records }).to_string() })
    }

    #[test]
    fn test_payload_without_records_is_a_scan() {
        assert_eq!(Trigger::ScheduledScan, Trigger::from_payload(&json!({})));
        assert_eq!(
            Trigger::ScheduledScan,
            Trigger::from_payload(&json!({ "source": "aws.events" }))
        );
        assert_eq!(Trigger::ScheduledScan, Trigger::from_payload(&Value::Null));
    }

    #[test]
    fn test_created_objects_in_order() {
        let payload = json!({
            "Records": [
                message(vec![
                    s3_record("ObjectCreated:Put", "trusted", "2024/01/02/03/a.csv"),
                    s3_record("ObjectRemoved:Delete", "trusted", "2024/01/02/03/gone.csv"),
                ]),
                message(vec![s3_record(
                    "ObjectCreated:CompleteMultipartUpload",
                    "trusted",
                    "2024/01/02/03/b.csv"
                )]),
            ]
        });

        let Trigger::Notifications(objects) = Trigger::from_payload(&payload) else {
            panic!("expected notifications");
        };
        assert_eq!(
            vec![
                ObjectReference::new("trusted", "2024/01/02/03/a.csv").with_size(Some(120)),
                ObjectReference::new("trusted", "2024/01/02/03/b.csv").with_size(Some(120)),
            ],
            objects
        );
    }

    #[test]
    fn test_other_event_sources_are_ignored() {
        let mut record = s3_record("ObjectCreated:Put", "trusted", "a.csv");
        record["eventSource"] = json!("aws:sqs");
        let payload = json!({ "Records": [message(vec![record])] });
        assert_eq!(
            Trigger::Notifications(Vec::new()),
            Trigger::from_payload(&payload)
        );
    }

    #[test]
    fn test_malformed_messages_are_skipped() {
        let payload = json!({
            "Records": [
                { "messageId": "no-body" },
                { "body": "not json" },
                { "body": json!({ "Event": "s3:TestEvent" }).to_string() },
                { "body": json!({ "Records": "nope" }).to_string() },
                { "body": json!({ "Records": [{ "eventSource": "aws:s3" }] }).to_string() },
                message(vec![s3_record("ObjectCreated:Put", "trusted", "kept.csv")]),
            ]
        });

        let Trigger::Notifications(objects) = Trigger::from_payload(&payload) else {
            panic!("expected notifications");
        };
        assert_eq!(1, objects.len());
        assert_eq!("kept.csv", objects[0].key());
    }

    #[test]
    fn test_missing_key_or_negative_size() {
        let mut no_key = s3_record("ObjectCreated:Put", "trusted", "a.csv");
        no_key["s3"]["object"].as_object_mut().unwrap().remove("key");
        let mut negative = s3_record("ObjectCreated:Put", "trusted", "b.csv");
        negative["s3"]["object"]["size"] = json!(-1);
        let payload = json!({ "Records": [message(vec![no_key, negative])] });

        let Trigger::Notifications(objects) = Trigger::from_payload(&payload) else {
            panic!("expected notifications");
        };
        assert_eq!(vec![ObjectReference::new("trusted", "b.csv")], objects);
    }

    #[test]
    fn test_records_not_a_list() {
        assert_eq!(
            Trigger::Notifications(Vec::new()),
            Trigger::from_payload(&json!({ "Records": {} }))
        );
    }

    #[test]
    fn test_decode_key() {
        assert_eq!("2024/01/02/03/my report.csv", decode_key("2024/01/02/03/my+report.csv"));
        assert_eq!("a b+c.csv", decode_key("a%20b%2Bc.csv"));
        assert_eq!("plain.csv", decode_key("plain.csv"));
        assert_eq!("caf\u{e9}.csv", decode_key("caf%C3%A9.csv"));
    }
}
