//! Response envelope decoding
//!
//! Every API response is wrapped as
//! `{ "error": <bool|int>, "error_message": <string>, "data": [...] }`.
//! Decoding happens in two passes: the envelope first, then `data` into
//! the caller's model type once the error flag is known to be clear.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// The `error` field is a boolean on most endpoints and a numeric code on
/// others
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
enum ErrorFlag {
    Bool(bool),
    Code(i64),
}

impl ErrorFlag {
    /// `None` when the flag is clear, otherwise the code (if numeric)
    fn failure(self) -> Option<Option<i64>> {
        match self {
            Self::Bool(false) | Self::Code(0) => None,
            Self::Bool(true) => Some(None),
            Self::Code(code) => Some(Some(code)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    error: ErrorFlag,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Decode a response body into the items of its `data` array
///
/// A missing or `null` data field decodes to an empty list.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>> {
    let envelope: RawEnvelope = serde_json::from_slice(body).map_err(Error::Decode)?;

    if let Some(code) = envelope.error.failure() {
        let message = envelope
            .error_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(Error::Api { message, code });
    }

    match envelope.data {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(data) => serde_json::from_value(data).map_err(Error::Decode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[test]
    fn test_decode_success() {
        let items: Vec<Item> = decode(br#"{"error": false, "data": [{"id": 1}]}"#).unwrap();
        assert_eq!(items, vec![Item { id: 1 }]);
    }

    #[test]
    fn test_decode_zero_code_is_success() {
        let items: Vec<Item> =
            decode(br#"{"error": 0, "error_message": "", "data": [{"id": 1}, {"id": 2}]}"#)
                .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_decode_numeric_error_keeps_code() {
        let err = decode::<Item>(br#"{"error": 1, "error_message": "bad key"}"#).unwrap_err();
        match err {
            Error::Api { message, code } => {
                assert_eq!(message, "bad key");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_boolean_error_has_no_code() {
        let err = decode::<Item>(br#"{"error": true, "error_message": "nope", "data": [{"id": 9}]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Api { code: None, .. }));
    }

    #[test]
    fn test_decode_missing_data_is_empty() {
        let items: Vec<Item> = decode(br#"{"error": false, "data": null}"#).unwrap();
        assert!(items.is_empty());

        let items: Vec<Item> = decode(br#"{"error": false}"#).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode::<Item>(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_missing_error_flag() {
        let err = decode::<Item>(br#"{"data": []}"#).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_wrong_data_shape() {
        let err = decode::<Item>(br#"{"error": false, "data": {"id": 1}}"#).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
