//! Opaque connection cursors: `base64("arrayconnection:<offset>")`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const PREFIX: &str = "arrayconnection:";

/// Encodes an offset into the related-record list.
pub(crate) fn offset_to_cursor(offset: usize) -> String {
    STANDARD.encode(format!("{PREFIX}{offset}"))
}

/// Decodes a cursor. Returns `None` for anything that is not a cursor.
pub(crate) fn cursor_to_offset(cursor: &str) -> Option<usize> {
    let bytes = STANDARD.decode(cursor).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    decoded.strip_prefix(PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_format() {
        assert_eq!(offset_to_cursor(0), "YXJyYXljb25uZWN0aW9uOjA=");
        assert_eq!(cursor_to_offset(&offset_to_cursor(17)), Some(17));
    }

    #[test]
    fn test_invalid_cursor() {
        assert_eq!(cursor_to_offset("garbage"), None);
        assert_eq!(cursor_to_offset(&STANDARD.encode("other:1")), None);
    }
}
