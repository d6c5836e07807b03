//! Wire codec: JSON value encoding/decoding and key percent-encoding.
//!
//! The store speaks text: values travel as JSON, keys travel
//! percent-encoded inside URL paths and query parameters, and `list`
//! responses come back as newline-separated percent-encoded keys.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Characters allowed unencoded in keys and prefixes.
/// Alphanumerics plus `- _ . ! ~ * ' ( )` pass through; everything else
/// (including `/`, `&`, `=`, spaces and non-ASCII) gets percent-encoded,
/// so a key is safe both as a URL path segment and as a query value.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a key or prefix for use in a URL.
pub(crate) fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

/// Percent-decode a key returned by `list`.
pub(crate) fn decode_component(text: &str) -> Result<String> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|e| Error::InvalidResponse(format!("key `{}` is not valid UTF-8: {}", text, e)))
}

/// The outcome of reading a key from the store.
///
/// Distinguishes "no value" from an actual value instead of overloading a
/// nullable return. Note that the store reports an absent key and a key
/// whose stored text is empty identically (empty body), so both surface
/// as [`StoredValue::Absent`] in non-raw mode.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// The key has no value (or its stored text is empty / JSON `null`)
    Absent,
    /// The decoded JSON value
    Value(Value),
    /// The literal wire text, returned by raw-mode reads only
    Raw(String),
}

impl StoredValue {
    /// Returns true if the read found no value.
    pub fn is_absent(&self) -> bool {
        matches!(self, StoredValue::Absent)
    }

    /// Returns the decoded JSON value, if this is a [`StoredValue::Value`].
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            StoredValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes self, returning the decoded JSON value if present.
    pub fn into_json(self) -> Option<Value> {
        match self {
            StoredValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the literal wire text, if this is a [`StoredValue::Raw`].
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            StoredValue::Raw(s) => Some(s),
            _ => None,
        }
    }
}

/// Serialize a value to its on-wire JSON text.
pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Error::Encode)
}

/// Decode wire text fetched for `key`.
///
/// Raw mode returns the text verbatim, empty string included. Otherwise
/// an empty body and a stored JSON `null` both normalize to
/// [`StoredValue::Absent`]; non-empty text that is not valid JSON fails
/// with [`Error::Decode`] naming the key.
pub(crate) fn decode(key: &str, text: &str, raw: bool) -> Result<StoredValue> {
    if raw {
        return Ok(StoredValue::Raw(text.to_string()));
    }
    if text.is_empty() {
        return Ok(StoredValue::Absent);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) => Ok(StoredValue::Absent),
        Ok(value) => Ok(StoredValue::Value(value)),
        Err(_) => Err(Error::Decode {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_nested_value() {
        let value = json!({
            "name": "nested",
            "count": 3,
            "ratio": 0.5,
            "flags": [true, false, null],
            "inner": { "list": [1, 2, 3], "text": "hello" }
        });
        let text = encode(&value).unwrap();
        let decoded = decode("k", &text, false).unwrap();
        assert_eq!(decoded, StoredValue::Value(value));
    }

    #[test]
    fn test_round_trip_scalars() {
        for value in [json!("text"), json!(42), json!(-1.25), json!(true), json!([])] {
            let text = encode(&value).unwrap();
            assert_eq!(decode("k", &text, false).unwrap(), StoredValue::Value(value));
        }
    }

    #[test]
    fn test_empty_text_is_absent() {
        assert_eq!(decode("k", "", false).unwrap(), StoredValue::Absent);
    }

    #[test]
    fn test_stored_null_is_absent() {
        assert_eq!(decode("k", "null", false).unwrap(), StoredValue::Absent);
    }

    #[test]
    fn test_invalid_json_names_the_key() {
        let err = decode("broken_key", "{not valid}", false).unwrap_err();
        assert_eq!(err.decode_key(), Some("broken_key"));
        let msg = err.to_string();
        assert!(msg.contains("broken_key"), "message: {}", msg);
        assert!(msg.contains("raw mode"), "message: {}", msg);
    }

    #[test]
    fn test_raw_mode_bypasses_decoding() {
        assert_eq!(
            decode("k", "{not valid}", true).unwrap(),
            StoredValue::Raw("{not valid}".to_string())
        );
        // Empty text stays empty text, not Absent
        assert_eq!(decode("k", "", true).unwrap(), StoredValue::Raw(String::new()));
    }

    #[test]
    fn test_encode_component_passthrough() {
        assert_eq!(encode_component("plain-key_1.2!"), "plain-key_1.2!");
    }

    #[test]
    fn test_encode_component_escapes_url_unsafe() {
        assert_eq!(encode_component("a/b"), "a%2Fb");
        assert_eq!(encode_component("a c"), "a%20c");
        assert_eq!(encode_component("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_component("über"), "%C3%BCber");
    }

    #[test]
    fn test_decode_component_round_trip() {
        for key in ["a/b", "a c", "a&b=c?d#e", "über", "100%"] {
            assert_eq!(decode_component(&encode_component(key)).unwrap(), key);
        }
    }

    #[test]
    fn test_decode_component_rejects_invalid_utf8() {
        let err = decode_component("%FF%FE").unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_stored_value_helpers() {
        assert!(StoredValue::Absent.is_absent());
        assert_eq!(StoredValue::Value(json!(1)).as_json(), Some(&json!(1)));
        assert_eq!(StoredValue::Value(json!(1)).into_json(), Some(json!(1)));
        assert_eq!(StoredValue::Raw("x".into()).as_raw(), Some("x"));
        assert_eq!(StoredValue::Absent.into_json(), None);
    }
}
