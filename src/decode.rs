//! JSON decoding of response bodies.

use serde::de::DeserializeOwned;

use crate::error::{GitlabError, Result};

/// Decode a response body into `T`.
///
/// # Errors
///
/// Returns [`GitlabError::JsonFormat`] carrying the raw body text when the
/// body is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| GitlabError::JsonFormat {
        body: String::from_utf8_lossy(body).into_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Target {
        id: u64,
        name: String,
    }

    #[test]
    fn test_decode_struct() {
        let target: Target = decode(br#"{"id": 7, "name": "demo", "extra": true}"#).unwrap();
        assert_eq!(
            target,
            Target {
                id: 7,
                name: "demo".to_string()
            }
        );
    }

    #[test]
    fn test_decode_failure_carries_body() {
        let err = decode::<Target>(b"not json").unwrap_err();
        match &err {
            GitlabError::JsonFormat { body, .. } => assert_eq!(body, "not json"),
            other => panic!("expected JsonFormat, got {other:?}"),
        }
        assert!(err.to_string().contains("not json"));
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        let err = decode::<Target>(br#"[{"id": 1, "name": "x"}]"#).unwrap_err();
        assert!(matches!(err, GitlabError::JsonFormat { .. }));
    }
}
