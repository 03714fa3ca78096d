//! NDJSON encoding for bulk create/delete bodies.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

/// Encodes items as newline-delimited JSON: one compact object per line,
/// each line terminated by `\n`.
pub fn encode<T: Serialize>(items: &[T]) -> Result<Bytes, ClientError> {
    let mut writer = BytesMut::with_capacity(items.len() * 128).writer();
    for item in items {
        serde_json::to_writer(&mut writer, item).map_err(|e| ClientError::Encode(e.to_string()))?;
        writer.get_mut().put_u8(b'\n');
    }
    Ok(writer.into_inner().freeze())
}

/// Decodes an NDJSON body into JSON values, skipping blank lines.
///
/// A malformed line yields [`ClientError::Decode`] naming its 1-based line number.
pub fn decode_lines(body: &[u8]) -> Result<Vec<Value>, ClientError> {
    body.split(|b| *b == b'\n')
        .enumerate()
        .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
        .map(|(n, line)| {
            serde_json::from_slice(line).map_err(|e| ClientError::Decode {
                path: format!("ndjson line {}", n + 1),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Body line of a bulk delete request.
#[derive(Debug, Serialize)]
pub(crate) struct DeleteRequest<'a> {
    pub id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_writes_one_line_per_item() {
        let body = encode(&[json!({"id": "a"}), json!({"id": "b", "n": 1})]).unwrap();
        assert_eq!(&body[..], b"{\"id\":\"a\"}\n{\"id\":\"b\",\"n\":1}\n");
    }

    #[test]
    fn encode_empty_slice_is_empty_body() {
        let body = encode::<Value>(&[]).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn decode_lines_skips_blank_lines() {
        let values = decode_lines(b"{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn decode_lines_reports_malformed_line_as_decode_error() {
        let err = decode_lines(b"{\"a\":1}\n\n{\"a\":\n").unwrap_err();
        match err {
            ClientError::Decode { path, .. } => assert_eq!(path, "ndjson line 3"),
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn nested_newlines_stay_escaped() {
        let body = encode(&[json!({"msg": "line1\nline2"})]).unwrap();
        assert_eq!(body.iter().filter(|b| **b == b'\n').count(), 1);
        let values = decode_lines(&body).unwrap();
        assert_eq!(values[0]["msg"], "line1\nline2");
    }
}
