//! Session blob encoding
//!
//! Handlers only ever see the session payload as an opaque string. The
//! format is owned by this module:
//!
//! ```text
//! blob  := ""                       (empty session)
//!        | entry+
//! entry := <key-len> ":" <key> <value-len> ":" <value-json>
//! ```
//!
//! Lengths are decimal byte counts, keys are raw UTF-8, values are
//! `serde_json` text. Entries appear in key order.
//!
//! Decoding is strict: any malformed blob is an error, never an empty
//! session.

use crate::error::{Result, SessionError};
use crate::types::SessionData;

/// Encode session data into a blob (`""` for an empty map)
pub fn encode(data: &SessionData) -> Result<String> {
    let mut out = String::new();
    for (key, value) in data {
        let json = serde_json::to_string(value)?;
        out.push_str(&key.len().to_string());
        out.push(':');
        out.push_str(key);
        out.push_str(&json.len().to_string());
        out.push(':');
        out.push_str(&json);
    }
    Ok(out)
}

/// Decode a blob produced by [`encode`]
pub fn decode(raw: &str) -> Result<SessionData> {
    let mut data = SessionData::new();
    let mut pos = 0;

    while pos < raw.len() {
        let key = take_field(raw, &mut pos)?;
        let value_start = pos;
        let json = take_field(raw, &mut pos)?;
        let value = serde_json::from_str(json).map_err(|e| SessionError::Decode {
            offset: value_start,
            reason: format!("invalid value for key '{}': {}", key, e),
        })?;
        data.insert(key.to_string(), value);
    }

    Ok(data)
}

/// Read one `<len>:<bytes>` field starting at `pos`, advancing past it
fn take_field<'a>(raw: &'a str, pos: &mut usize) -> Result<&'a str> {
    let start = *pos;
    let rest = &raw[start..];

    let colon = rest.find(':').ok_or_else(|| SessionError::Decode {
        offset: start,
        reason: "missing length separator".to_string(),
    })?;

    let digits = &rest[..colon];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SessionError::Decode {
            offset: start,
            reason: format!("invalid length prefix '{}'", digits),
        });
    }
    let len: usize = digits.parse().map_err(|e| SessionError::Decode {
        offset: start,
        reason: format!("invalid length prefix '{}': {}", digits, e),
    })?;

    let body_start = start + colon + 1;
    let body_end = body_start
        .checked_add(len)
        .filter(|end| *end <= raw.len())
        .ok_or_else(|| SessionError::Decode {
            offset: body_start,
            reason: format!("field of {} bytes runs past end of blob", len),
        })?;

    let body = raw.get(body_start..body_end).ok_or_else(|| SessionError::Decode {
        offset: body_start,
        reason: "field does not end on a character boundary".to_string(),
    })?;

    *pos = body_end;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(entries: &[(&str, serde_json::Value)]) -> SessionData {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_data_encodes_to_empty_string() {
        assert_eq!(encode(&SessionData::new()).unwrap(), "");
    }

    #[test]
    fn test_empty_string_decodes_to_empty_data() {
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_encode_layout() {
        let encoded = encode(&data(&[("hello", json!("world"))])).unwrap();
        assert_eq!(encoded, "5:hello7:\"world\"");
    }

    #[test]
    fn test_entries_are_key_ordered() {
        let encoded = encode(&data(&[("b", json!(2)), ("a", json!(1))])).unwrap();
        assert_eq!(encoded, "1:a1:11:b1:2");
    }

    #[test]
    fn test_nested_and_unicode_values_survive() {
        let original = data(&[
            ("yes", json!([1, 2, 3])),
            ("user", json!({"name": "Zoë", "roles": ["admin"]})),
            ("ключ:1", json!(null)),
        ]);
        let decoded = decode(&encode(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_key_containing_digits_and_colons() {
        let original = data(&[("12:34", json!("x"))]);
        let decoded = decode(&encode(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_rejects_missing_separator() {
        let err = decode("garbage").unwrap_err();
        assert!(matches!(err, SessionError::Decode { offset: 0, .. }));
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        let err = decode("x:abc").unwrap_err();
        assert!(matches!(err, SessionError::Decode { offset: 0, .. }));
    }

    #[test]
    fn test_decode_rejects_truncated_blob() {
        let err = decode("5:hello7:\"wor").unwrap_err();
        assert!(matches!(err, SessionError::Decode { offset: 9, .. }));
    }

    #[test]
    fn test_decode_rejects_missing_value() {
        assert!(matches!(
            decode("5:hello"),
            Err(SessionError::Decode { offset: 7, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let err = decode("1:a3:{x}").unwrap_err();
        match err {
            SessionError::Decode { offset, reason } => {
                assert_eq!(offset, 3);
                assert!(reason.contains("'a'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_rejects_split_character() {
        // "é" is two bytes; a length of 1 would cut it in half
        assert!(matches!(
            decode("1:é1:1"),
            Err(SessionError::Decode { offset: 2, .. })
        ));
    }
}
