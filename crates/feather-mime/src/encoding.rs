//! Transfer and header encodings.
//!
//! Supports Base64, Quoted-Printable (RFC 2045) and RFC 2047 encoded words.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum encoded line length for Base64 and Quoted-Printable bodies.
pub const MAX_LINE_LENGTH: usize = 76;

/// Largest UTF-8 chunk per encoded word; 45 bytes become 60 Base64 characters,
/// keeping each `=?utf-8?B?...?=` word within 75 characters.
const ENCODED_WORD_CHUNK: usize = 45;

/// Encodes data as Base64 on a single line.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 split into CRLF-terminated lines of at most 76
/// characters, as required for message bodies.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2 + 2);
    // Base64 output is ASCII, so byte chunks are valid str boundaries.
    for line in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        out.extend(line.iter().map(|&b| char::from(b)));
        out.push_str("\r\n");
    }
    out
}

/// Encodes text using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks in the input (`\n` or `\r\n`) become hard CRLF breaks; long
/// lines get soft breaks so no output line exceeds 76 characters. Trailing
/// whitespace on a line is encoded.
#[must_use]
pub fn encode_quoted_printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 2);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("\r\n");
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        encode_qp_line(line.as_bytes(), &mut out);
    }
    out
}

fn encode_qp_line(line: &[u8], out: &mut String) {
    let mut width = 0;
    for (i, &byte) in line.iter().enumerate() {
        let last = i + 1 == line.len();
        let literal = matches!(byte, b'!'..=b'<' | b'>'..=b'~')
            || (matches!(byte, b' ' | b'\t') && !last);
        let len = if literal { 1 } else { 3 };
        // Leave room for the soft-break '=' unless this is the last token.
        let limit = if last {
            MAX_LINE_LENGTH
        } else {
            MAX_LINE_LENGTH - 1
        };

        if width + len > limit {
            out.push_str("=\r\n");
            width = 0;
        }
        if literal {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "={byte:02X}");
        }
        width += len;
    }
}

/// Encodes a header value as RFC 2047 `B` encoded words when it needs it.
///
/// Printable ASCII text that does not look like an encoded word is returned
/// unchanged. Otherwise the UTF-8 text is split on character boundaries into
/// encoded words of at most 75 characters, folded with CRLF + space.
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    if !needs_encoding(text) {
        return text.to_string();
    }

    let mut words = Vec::new();
    let mut start = 0;
    let mut end = 0;
    for (index, ch) in text.char_indices() {
        let next = index + ch.len_utf8();
        if next - start > ENCODED_WORD_CHUNK && end > start {
            words.push(encoded_word(&text[start..end]));
            start = end;
        }
        end = next;
    }
    if end > start {
        words.push(encoded_word(&text[start..end]));
    }

    words.join("\r\n ")
}

fn needs_encoding(text: &str) -> bool {
    text.contains("=?") || !text.bytes().all(|b| b == b' ' || b.is_ascii_graphic())
}

fn encoded_word(chunk: &str) -> String {
    format!("=?utf-8?B?{}?=", STANDARD.encode(chunk))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode_words(encoded: &str) -> String {
        let mut bytes = Vec::new();
        for word in encoded.split("\r\n ") {
            let inner = word
                .strip_prefix("=?utf-8?B?")
                .and_then(|w| w.strip_suffix("?="))
                .unwrap();
            bytes.extend(STANDARD.decode(inner).unwrap());
        }
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_base64() {
        assert_eq!(encode_base64(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn test_base64_wrapped_lines() {
        let encoded = encode_base64_wrapped(&[0u8; 100]);
        let lines: Vec<&str> = encoded.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 76);
        assert!(encoded.ends_with("\r\n"));
        assert_eq!(encode_base64_wrapped(b""), "");
    }

    #[test]
    fn test_quoted_printable_plain_ascii_untouched() {
        assert_eq!(encode_quoted_printable("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_quoted_printable_escapes() {
        assert_eq!(encode_quoted_printable("Héllo"), "H=C3=A9llo");
        assert_eq!(encode_quoted_printable("a=b"), "a=3Db");
        assert_eq!(encode_quoted_printable("trailing \nnext"), "trailing=20\r\nnext");
        assert_eq!(encode_quoted_printable("one\r\ntwo\n"), "one\r\ntwo\r\n");
    }

    #[test]
    fn test_quoted_printable_soft_breaks() {
        let encoded = encode_quoted_printable(&"a".repeat(100));
        assert_eq!(encoded, format!("{}=\r\n{}", "a".repeat(75), "a".repeat(25)));
    }

    #[test]
    fn test_quoted_printable_never_splits_escape() {
        let encoded = encode_quoted_printable(&"é".repeat(30));
        for line in encoded.split("\r\n") {
            assert!(line.len() <= MAX_LINE_LENGTH);
            let body = line.strip_suffix('=').unwrap_or(line);
            assert_eq!(body.len() % 3, 0, "escape split in {line:?}");
        }
    }

    #[test]
    fn test_rfc2047_ascii_passthrough() {
        assert_eq!(encode_rfc2047("Hello there"), "Hello there");
    }

    #[test]
    fn test_rfc2047_encodes_non_ascii() {
        let encoded = encode_rfc2047("Héllo");
        assert_eq!(encoded, "=?utf-8?B?SMOpbGxv?=");
    }

    #[test]
    fn test_rfc2047_encodes_lookalike_words() {
        assert!(encode_rfc2047("=?utf-8?B?AA==?=").starts_with("=?utf-8?B?"));
    }

    #[test]
    fn test_rfc2047_folds_long_text() {
        let subject = "Grüße aus Köln und überall sonst auf der ganzen weiten Welt";
        let encoded = encode_rfc2047(subject);
        assert!(encoded.contains("\r\n "));
        for word in encoded.split("\r\n ") {
            assert!(word.len() <= 75, "{word} is too long");
        }
        assert_eq!(decode_words(&encoded), subject);
    }

    proptest! {
        #[test]
        fn quoted_printable_lines_fit(text in "\\PC{0,300}") {
            let encoded = encode_quoted_printable(&text);
            for line in encoded.split("\r\n") {
                prop_assert!(line.len() <= MAX_LINE_LENGTH);
                prop_assert!(line.is_ascii());
            }
        }

        #[test]
        fn rfc2047_words_preserve_text(text in "\\PC{1,120}") {
            let encoded = encode_rfc2047(&text);
            if encoded != text {
                for word in encoded.split("\r\n ") {
                    prop_assert!(word.len() <= 75);
                }
                prop_assert_eq!(decode_words(&encoded), text);
            }
        }
    }
}
