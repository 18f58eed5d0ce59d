//! Base64 encoding (standard alphabet, padded).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::ToolError;

/// Encode text as base64.
#[must_use]
pub fn encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode base64 into UTF-8 text.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`ToolError::Base64`] for malformed input and [`ToolError::Utf8`]
/// when the decoded bytes are not text.
pub fn decode(encoded: &str) -> Result<String, ToolError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_value() {
        assert_eq!(encode("hello"), "aGVsbG8=");
        assert_eq!(encode(""), "");
    }

    #[test]
    fn test_decode_known_value() {
        assert_eq!(decode("aGVsbG8=").unwrap(), "hello");
        assert_eq!(decode("  aGVsbG8=\n").unwrap(), "hello");
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert!(matches!(decode("not base64!"), Err(ToolError::Base64(_))));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let encoded = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(decode(&encoded), Err(ToolError::Utf8(_))));
    }

    #[test]
    fn test_unicode_round_trip() {
        let text = "héllo wörld ✓";
        assert_eq!(decode(&encode(text)).unwrap(), text);
    }
}
