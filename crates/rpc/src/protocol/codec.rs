//! Stateless translation between envelopes and wire text.

use crate::error::{ProtocolError, RpcError};
use crate::protocol::envelope::{Inbound, RequestEnvelope};
use serde_json::{Map, Value};

/// Encode a request envelope into a wire frame.
///
/// # Errors
///
/// Returns an error if serialization fails; this cannot happen for a
/// non-empty method and JSON-representable params.
pub fn encode_request(envelope: &RequestEnvelope) -> Result<String, ProtocolError> {
    serde_json::to_string(envelope).map_err(|e| ProtocolError::SerializationFailed(e.to_string()))
}

/// Classify an inbound text frame.
///
/// A frame with an integer `id` is a [`Inbound::Reply`] carrying either the
/// `result` or the `error`. A frame without one is a server push: its
/// `result` becomes [`Inbound::Push`], its `error` becomes
/// [`Inbound::PushError`].
///
/// # Errors
///
/// Returns an error for malformed JSON, a non-object top level, an envelope
/// with neither `result` nor `error`, or an `error` object missing
/// `code`/`message`.
pub fn classify(text: &str) -> Result<Inbound, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedFrame(e.to_string()))?;

    let Value::Object(mut frame) = value else {
        return Err(ProtocolError::InvalidEnvelope(
            "top-level value is not an object",
        ));
    };

    match frame.get("id").and_then(Value::as_u64) {
        Some(id) => {
            if let Some(result) = frame.remove("result") {
                Ok(Inbound::Reply {
                    id,
                    outcome: Ok(result),
                })
            } else if let Some(error) = frame.remove("error") {
                Ok(Inbound::Reply {
                    id,
                    outcome: Err(decode_error(error)?),
                })
            } else {
                Err(ProtocolError::InvalidEnvelope(
                    "response carries neither result nor error",
                ))
            }
        }
        None => {
            if let Some(result) = frame.remove("result") {
                Ok(Inbound::Push(result))
            } else if let Some(error) = frame.remove("error") {
                Ok(Inbound::PushError(decode_error(error)?))
            } else {
                Err(ProtocolError::InvalidEnvelope(
                    "push frame carries neither result nor error",
                ))
            }
        }
    }
}

fn decode_error(error: Value) -> Result<RpcError, ProtocolError> {
    let Value::Object(error) = error else {
        return Err(ProtocolError::InvalidEnvelope("error is not an object"));
    };
    let code = field_i64(&error, "code")
        .ok_or(ProtocolError::InvalidEnvelope("error object missing code"))?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::InvalidEnvelope(
            "error object missing message",
        ))?
        .to_string();
    Ok(RpcError { code, message })
}

fn field_i64(object: &Map<String, Value>, key: &str) -> Option<i64> {
    object.get(key).and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encoded_request_has_envelope_fields() {
        let envelope = RequestEnvelope::new("server.get", Some(json!({"server": "hub"})), 7);
        let text = encode_request(&envelope).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "server.get");
        assert_eq!(value["params"]["server"], "hub");
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn absent_params_are_omitted() {
        let envelope = RequestEnvelope::new("rpc.info", None, 1);
        let text = encode_request(&envelope).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert!(value.get("params").is_none());
    }

    #[test]
    fn classifies_result_reply() {
        let inbound = classify(r#"{"id":3,"result":{"name":"irc.example.test"}}"#).unwrap();
        match inbound {
            Inbound::Reply { id, outcome } => {
                assert_eq!(id, 3);
                assert_eq!(outcome.unwrap(), json!({"name": "irc.example.test"}));
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn classifies_error_reply() {
        let inbound = classify(r#"{"id":3,"error":{"code":401,"message":"Auth failed"}}"#).unwrap();
        match inbound {
            Inbound::Reply { id, outcome } => {
                assert_eq!(id, 3);
                let error = outcome.unwrap_err();
                assert_eq!(error.code, 401);
                assert_eq!(error.message, "Auth failed");
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn frame_without_id_is_a_push() {
        let inbound = classify(r#"{"result":{"msg":"log line"}}"#).unwrap();
        assert!(matches!(inbound, Inbound::Push(v) if v == json!({"msg": "log line"})));
    }

    #[test]
    fn push_error_is_classified() {
        let inbound = classify(r#"{"error":{"code":-32000,"message":"boom"}}"#).unwrap();
        assert!(matches!(inbound, Inbound::PushError(e) if e.code == -32000));
    }

    #[test]
    fn non_integer_id_is_a_push() {
        // Ids we did not issue (we only send integers) cannot correlate.
        let inbound = classify(r#"{"id":"abc","result":42}"#).unwrap();
        assert!(matches!(inbound, Inbound::Push(v) if v == json!(42)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            classify("{nope"),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn non_object_top_level_is_rejected() {
        assert!(matches!(
            classify("[1,2,3]"),
            Err(ProtocolError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn reply_with_neither_result_nor_error_is_rejected() {
        assert!(matches!(
            classify(r#"{"id":1,"jsonrpc":"2.0"}"#),
            Err(ProtocolError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn error_without_code_is_rejected() {
        assert!(matches!(
            classify(r#"{"id":1,"error":{"message":"no code"}}"#),
            Err(ProtocolError::InvalidEnvelope(_))
        ));
    }
}
