use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub const DATA_MESSAGE_TYPE: &str = "DATA_MESSAGE";
pub const CONTROL_MESSAGE_TYPE: &str = "CONTROL_MESSAGE";

/// One subscription-filter delivery, as CloudWatch Logs writes it inside
/// `awslogs.data` once decompressed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub log_group: Option<String>,
    #[serde(default)]
    pub log_stream: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_filters: Option<Vec<String>>,
    #[serde(default)]
    pub log_events: Option<Vec<LogRecord>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LogBatch {
    pub fn data_message(
        log_group: impl Into<String>,
        log_stream: impl Into<String>,
        messages: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let log_events = messages
            .into_iter()
            .enumerate()
            .map(|(index, message)| LogRecord {
                id: Some(index.to_string()),
                timestamp: None,
                message: Some(message.into()),
            })
            .collect();

        Self {
            message_type: Some(DATA_MESSAGE_TYPE.to_string()),
            owner: None,
            log_group: Some(log_group.into()),
            log_stream: Some(log_stream.into()),
            subscription_filters: None,
            log_events: Some(log_events),
        }
    }

    /// Reachability checks sent when a subscription filter is created.
    /// A batch without `messageType` counts as data.
    pub fn is_control_message(&self) -> bool {
        self.message_type.as_deref() == Some(CONTROL_MESSAGE_TYPE)
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("event does not carry an awslogs.data string")]
    MissingData,
    #[error("awslogs.data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("awslogs.data is not a valid gzip stream: {0}")]
    Gzip(#[source] std::io::Error),
    #[error("decompressed log batch is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("decompressed log batch has the wrong structure: {0}")]
    Structure(&'static str),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize log batch: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to gzip log batch: {0}")]
    Gzip(#[from] std::io::Error),
}

/// Decodes `{"awslogs": {"data": base64(gzip(json))}}` into a [`LogBatch`].
pub fn decode_envelope(event: &Value) -> Result<LogBatch, DecodeError> {
    let data = event
        .get("awslogs")
        .and_then(|awslogs| awslogs.get("data"))
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingData)?;

    let compressed = STANDARD.decode(data)?;
    let decompressed = gunzip(&compressed).map_err(DecodeError::Gzip)?;
    let batch: Value = serde_json::from_slice(&decompressed)?;
    ensure_object_shape(&batch)?;
    Ok(serde_json::from_value(batch)?)
}

// Derived struct deserializers also accept positional arrays; only JSON
// objects are valid batches and log events.
fn ensure_object_shape(batch: &Value) -> Result<(), DecodeError> {
    let Some(fields) = batch.as_object() else {
        return Err(DecodeError::Structure("log batch must be a JSON object"));
    };
    if let Some(Value::Array(events)) = fields.get("logEvents") {
        if !events.iter().all(Value::is_object) {
            return Err(DecodeError::Structure(
                "every logEvents entry must be a JSON object",
            ));
        }
    }
    Ok(())
}

/// Inverse of [`decode_envelope`]; builds an invocation payload for a batch.
pub fn encode_envelope(batch: &LogBatch) -> Result<Value, EncodeError> {
    let body = serde_json::to_vec(batch)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&body)?;
    let compressed = encoder.finish()?;

    Ok(json!({
        "awslogs": {
            "data": STANDARD.encode(compressed),
        }
    }))
}

// Concatenated gzip members decode as one stream, matching `gzip -d`.
fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut decoder = MultiGzDecoder::new(bytes);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).expect("gzip write succeeds");
        encoder.finish().expect("gzip finish")
    }

    fn envelope_for(raw_json: &str) -> Value {
        json!({"awslogs": {"data": STANDARD.encode(gzip(raw_json.as_bytes()))}})
    }

    #[test]
    fn decodes_cloudwatch_subscription_payload() {
        let event = envelope_for(
            r#"{
                "messageType": "DATA_MESSAGE",
                "owner": "123456789012",
                "logGroup": "/aws/lambda/checkout",
                "logStream": "2026/10/19/[$LATEST]abc",
                "subscriptionFilters": ["errors"],
                "logEvents": [
                    {"id": "1", "timestamp": 1760000000000, "message": "boom"},
                    {"id": "2", "timestamp": 1760000000001, "message": "again", "extractedFields": {}}
                ]
            }"#,
        );

        let batch = decode_envelope(&event).expect("payload should decode");
        assert_eq!(batch.log_group.as_deref(), Some("/aws/lambda/checkout"));
        assert_eq!(batch.log_stream.as_deref(), Some("2026/10/19/[$LATEST]abc"));
        assert_eq!(batch.owner.as_deref(), Some("123456789012"));
        let events = batch.log_events.expect("events should be present");
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].message.as_deref(), Some("again"));
        assert_eq!(events[0].timestamp, Some(1_760_000_000_000));
        assert_eq!(batch.message_type.as_deref(), Some(DATA_MESSAGE_TYPE));
    }

    #[test]
    fn round_trip_recovers_group_stream_and_messages() {
        let batch = LogBatch::data_message(
            "/aws/lambda/my-func",
            "stream-1",
            ["first failure", "second failure"],
        );

        let event = encode_envelope(&batch).expect("batch should encode");
        let decoded = decode_envelope(&event).expect("envelope should decode");

        assert_eq!(decoded, batch);
    }

    #[test]
    fn rejects_event_without_awslogs_data() {
        for event in [
            json!({}),
            json!({"awslogs": {}}),
            json!({"awslogs": {"data": null}}),
            json!({"awslogs": {"data": 42}}),
            json!({"awslogs": null}),
        ] {
            let error = decode_envelope(&event).expect_err("missing data should fail");
            assert!(matches!(error, DecodeError::MissingData), "{event}");
        }
    }

    #[test]
    fn rejects_malformed_base64() {
        let event = json!({"awslogs": {"data": "%%% not base64 %%%"}});

        let error = decode_envelope(&event).expect_err("bad base64 should fail");
        assert!(matches!(error, DecodeError::Base64(_)));
    }

    #[test]
    fn rejects_payload_that_is_not_gzip() {
        let event = json!({"awslogs": {"data": STANDARD.encode(b"plain text, no gzip header")}});

        let error = decode_envelope(&event).expect_err("non-gzip payload should fail");
        assert!(matches!(error, DecodeError::Gzip(_)));
    }

    #[test]
    fn rejects_truncated_gzip_stream() {
        let compressed = gzip(br#"{"logGroup": "/aws/lambda/x", "logEvents": []}"#);
        let truncated = &compressed[..compressed.len() / 2];
        let event = json!({"awslogs": {"data": STANDARD.encode(truncated)}});

        let error = decode_envelope(&event).expect_err("truncated gzip should fail");
        assert!(matches!(error, DecodeError::Gzip(_) | DecodeError::Json(_)));
    }

    #[test]
    fn rejects_invalid_json_and_wrong_field_types() {
        for raw in [
            "{not json",
            r#"{"logGroup": 7, "logEvents": []}"#,
            r#"{"logGroup": "/aws/lambda/x", "logEvents": 5}"#,
        ] {
            let error = decode_envelope(&envelope_for(raw)).expect_err("bad batch should fail");
            assert!(matches!(error, DecodeError::Json(_)), "{raw}");
        }
    }

    #[test]
    fn rejects_array_shaped_batches_and_events() {
        for raw in [
            r#"["a", "b"]"#,
            r#"["CONTROL_MESSAGE"]"#,
            r#"["DATA_MESSAGE", "o", "/aws/lambda/x", "s", null, [["id", 1, "boom"]]]"#,
            r#"{"logGroup": "/aws/lambda/x", "logEvents": [["id", 1, "boom"]]}"#,
            r#"{"logGroup": "/aws/lambda/x", "logEvents": [{"message": "ok"}, "boom"]}"#,
            "42",
        ] {
            let error = decode_envelope(&envelope_for(raw)).expect_err("bad shape should fail");
            assert!(matches!(error, DecodeError::Structure(_)), "{raw}");
        }
    }

    #[test]
    fn keeps_null_or_missing_log_events_for_extraction() {
        let null_events = decode_envelope(&envelope_for(r#"{"logGroup": "g", "logEvents": null}"#))
            .expect("null events decode");
        assert!(null_events.log_events.is_none());

        let missing = decode_envelope(&envelope_for(r#"{"logGroup": "g"}"#))
            .expect("missing events decode");
        assert!(missing.log_events.is_none());
        assert!(missing.log_stream.is_none());
    }

    #[test]
    fn concatenated_gzip_members_decode_as_one_stream() {
        let mut compressed = gzip(br#"{"logGroup": "/aws/lambda/split", "#);
        compressed.extend(gzip(br#""logEvents": [{"message": "m"}]}"#));
        let event = json!({"awslogs": {"data": STANDARD.encode(compressed)}});

        let batch = decode_envelope(&event).expect("multi-member gzip should decode");
        assert_eq!(batch.log_group.as_deref(), Some("/aws/lambda/split"));
    }

    #[test]
    fn detects_control_messages() {
        let control = decode_envelope(&envelope_for(
            r#"{"messageType": "CONTROL_MESSAGE", "logGroup": "", "logStream": "", "logEvents": [{"id": "", "timestamp": 1, "message": "CWL CONTROL MESSAGE: Checking health of destination Firehose."}]}"#,
        ))
        .expect("control message decodes");
        assert!(control.is_control_message());

        let untyped = decode_envelope(&envelope_for(r#"{"logEvents": []}"#)).expect("decodes");
        assert!(!untyped.is_control_message());
    }
}
