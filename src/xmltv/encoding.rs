//! Transcoding of non-UTF-8 feeds
//!
//! A byte-order mark wins over the XML declaration. Feeds declaring an
//! ASCII-compatible encoding other than UTF-8 (ISO-8859-1, Windows-1252, ...)
//! are decoded to UTF-8 before sanitizing. Everything else passes through.

use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;

/// Longest XML declaration searched for an `encoding` pseudo-attribute
const MAX_DECLARATION_LEN: usize = 256;

/// Convert `input` to UTF-8, returning a warning when bytes could not be mapped
pub fn transcode_to_utf8(input: &[u8]) -> (Cow<'_, [u8]>, Option<String>) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(input) {
        if encoding == UTF_8 {
            return (Cow::Borrowed(input), None);
        }
        return decode(encoding, &input[bom_len..]);
    }

    match declared_encoding(input) {
        Some(encoding) if encoding != UTF_8 && encoding.is_ascii_compatible() => {
            decode(encoding, input)
        }
        _ => (Cow::Borrowed(input), None),
    }
}

fn decode(encoding: &'static Encoding, bytes: &[u8]) -> (Cow<'static, [u8]>, Option<String>) {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    let warning = had_errors.then(|| {
        format!(
            "input is not valid {}, invalid sequences replaced",
            encoding.name()
        )
    });
    (Cow::Owned(text.into_owned().into_bytes()), warning)
}

/// Encoding named by the `<?xml ... encoding="..."?>` declaration, if recognised
fn declared_encoding(input: &[u8]) -> Option<&'static Encoding> {
    let start = input.iter().position(|b| !b.is_ascii_whitespace())?;
    let declaration = input[start..].strip_prefix(b"<?xml")?;
    let end = declaration
        .iter()
        .take(MAX_DECLARATION_LEN)
        .position(|&b| b == b'>')?;
    let declaration = &declaration[..end];

    let key = declaration
        .windows(b"encoding".len())
        .position(|window| window == b"encoding")?;
    let value = trim_start(&declaration[key + b"encoding".len()..]);
    let value = trim_start(value.strip_prefix(b"=")?);
    let (&quote, value) = value.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let close = value.iter().position(|&b| b == quote)?;
    Encoding::for_label(&value[..close])
}

fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><tv/>"[..], Some("windows-1252"))]
    #[case(&b"<?xml version='1.0' encoding = 'windows-1251' ?><tv/>"[..], Some("windows-1251"))]
    #[case(&b"\n<?xml version=\"1.0\" encoding=\"utf-8\"?><tv/>"[..], Some("UTF-8"))]
    #[case(&b"<?xml version=\"1.0\"?><tv encoding=\"latin1\"/>"[..], None)]
    #[case(&b"<?xml version=\"1.0\" encoding=\"no-such-charset\"?>"[..], None)]
    #[case(&b"<tv/>"[..], None)]
    fn test_declared_encoding(#[case] input: &[u8], #[case] expected: Option<&str>) {
        assert_eq!(declared_encoding(input).map(Encoding::name), expected);
    }

    #[test]
    fn test_latin1_is_transcoded() {
        let (bytes, warning) =
            transcode_to_utf8(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><t>Caf\xe9</t>");
        assert!(warning.is_none());
        assert!(String::from_utf8(bytes.into_owned()).unwrap().ends_with("<t>Café</t>"));
    }

    #[test]
    fn test_utf16_bom_is_transcoded() {
        let mut input = vec![0xFF, 0xFE];
        for unit in "<t>é</t>".encode_utf16() {
            input.extend_from_slice(&unit.to_le_bytes());
        }
        let (bytes, warning) = transcode_to_utf8(&input);
        assert!(warning.is_none());
        assert_eq!(bytes.as_ref(), "<t>é</t>".as_bytes());
    }

    #[test]
    fn test_utf8_and_undeclared_input_is_borrowed() {
        let input = b"\xEF\xBB\xBF<t>\xFF</t>";
        assert!(matches!(transcode_to_utf8(input), (Cow::Borrowed(_), None)));

        let input = b"<?xml version=\"1.0\" encoding=\"UTF-16\"?><t/>";
        assert!(matches!(transcode_to_utf8(input), (Cow::Borrowed(_), None)));
    }
}
