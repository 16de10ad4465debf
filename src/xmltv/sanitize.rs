//! Byte-level clean-up applied before XML parsing, plus entity resolution
//!
//! XMLTV feeds in the wild carry raw control characters and unescaped
//! ampersands. Both are repaired here so the reader sees well-formed text.

const MAX_ENTITY_NAME_LEN: usize = 32;
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Regions copied through without ampersand repair
const PASSTHROUGH_REGIONS: [(&[u8], &[u8]); 2] = [(b"<![CDATA[", b"]]>"), (b"<!--", b"-->")];

/// Counts of repairs made by [`sanitize`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub control_chars: usize,
    pub bare_ampersands: usize,
    pub invalid_utf8: bool,
}

impl SanitizeReport {
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.control_chars > 0 {
            warnings.push(format!(
                "replaced {} illegal control character(s) with spaces",
                self.control_chars
            ));
        }
        if self.bare_ampersands > 0 {
            warnings.push(format!(
                "escaped {} bare ampersand(s)",
                self.bare_ampersands
            ));
        }
        if self.invalid_utf8 {
            warnings.push("input is not valid UTF-8, invalid sequences replaced".to_string());
        }
        warnings
    }
}

/// Replace illegal control characters with spaces and escape bare `&`
///
/// CDATA sections and comments only get the control character pass.
pub fn sanitize(input: &[u8]) -> (Vec<u8>, SanitizeReport) {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    let mut report = SanitizeReport {
        invalid_utf8: std::str::from_utf8(input).is_err(),
        ..SanitizeReport::default()
    };
    let mut output = Vec::with_capacity(input.len() + input.len() / 64);

    let mut i = 0;
    while i < input.len() {
        let byte = input[i];
        if byte == b'<' {
            if let Some(len) = passthrough_len(&input[i..]) {
                for &b in &input[i..i + len] {
                    output.push(clean_byte(b, &mut report));
                }
                i += len;
                continue;
            }
        }

        if byte == b'&' && !is_entity_start(&input[i..]) {
            output.extend_from_slice(b"&amp;");
            report.bare_ampersands += 1;
        } else {
            output.push(clean_byte(byte, &mut report));
        }
        i += 1;
    }

    (output, report)
}

fn clean_byte(byte: u8, report: &mut SanitizeReport) -> u8 {
    match byte {
        0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F => {
            report.control_chars += 1;
            b' '
        }
        _ => byte,
    }
}

/// Length of a CDATA section or comment starting at `rest`, through its terminator
fn passthrough_len(rest: &[u8]) -> Option<usize> {
    PASSTHROUGH_REGIONS.iter().find_map(|(open, close)| {
        if !rest.starts_with(open) {
            return None;
        }
        let body = &rest[open.len()..];
        let len = body
            .windows(close.len())
            .position(|window| window == *close)
            .map(|pos| open.len() + pos + close.len())
            .unwrap_or(rest.len());
        Some(len)
    })
}

/// Whether `bytes` (starting at `&`) begins a syntactically valid reference
fn is_entity_start(bytes: &[u8]) -> bool {
    let body = &bytes[1..];
    let Some(semi) = body
        .iter()
        .take(MAX_ENTITY_NAME_LEN + 1)
        .position(|&b| b == b';')
    else {
        return false;
    };

    match &body[..semi] {
        [b'#', b'x' | b'X', hex @ ..] => !hex.is_empty() && hex.iter().all(u8::is_ascii_hexdigit),
        [b'#', dec @ ..] => !dec.is_empty() && dec.iter().all(u8::is_ascii_digit),
        [first, rest @ ..] => {
            (first.is_ascii_alphabetic() || matches!(first, b'_' | b':'))
                && rest
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':'))
        }
        [] => false,
    }
}

/// Resolve a reference name (the part between `&` and `;`)
///
/// Handles the predefined XML entities and character references; anything
/// else yields `None`.
pub fn resolve_entity(name: &str) -> Option<String> {
    let resolved = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code).filter(|c| *c != '\0')?
        }
    };
    Some(resolved.to_string())
}

/// Unescape references in raw text; unresolvable ones are kept literally and counted
pub fn unescape_entities(raw: &str, unresolved: &mut usize) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut output = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        output.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match after.find(';') {
            Some(semi) if semi <= MAX_ENTITY_NAME_LEN => {
                let name = &after[..semi];
                match resolve_entity(name) {
                    Some(resolved) => output.push_str(&resolved),
                    None => {
                        *unresolved += 1;
                        output.push('&');
                        output.push_str(name);
                        output.push(';');
                    }
                }
                rest = &after[semi + 1..];
            }
            _ => {
                output.push('&');
                rest = after;
            }
        }
    }
    output.push_str(rest);
    output
}
