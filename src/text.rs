//! Text (JSON) scanning and escaping helpers shared by the text codecs.
//!
//! Like the binary readers, scanners take `&mut &[u8]` and leave the input
//! untouched when they fail.

use crate::error::DecodeError;

/// How escapes inside a quoted string map to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringMode {
    /// `\uXXXX` decodes to the Unicode scalar, UTF-8 encoded
    Utf8,
    /// `\uXXXX` must be at most `0xFF` and decodes to that single byte
    Bytes,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Skip leading JSON whitespace.
pub fn skip_whitespace(input: &mut &[u8]) {
    let skip = input.iter().take_while(|b| is_whitespace(**b)).count();
    *input = &input[skip..];
}

/// Peek at the next non-whitespace byte without consuming it.
pub fn peek(input: &[u8]) -> Option<u8> {
    input.iter().copied().find(|b| !is_whitespace(*b))
}

/// Consume whitespace then the expected byte.
pub fn expect(input: &mut &[u8], expected: u8) -> Result<(), DecodeError> {
    let mut rest = *input;
    skip_whitespace(&mut rest);
    match rest.first() {
        None => Err(DecodeError::ShortBuffer),
        Some(&b) if b == expected => {
            *input = &rest[1..];
            Ok(())
        }
        Some(&b) => Err(DecodeError::invalid(format!(
            "expected {:?}; found {:?}",
            expected as char, b as char
        ))),
    }
}

/// Consume whitespace then a literal keyword such as `null` or `true`.
pub fn expect_literal(input: &mut &[u8], literal: &str) -> Result<(), DecodeError> {
    let mut rest = *input;
    skip_whitespace(&mut rest);
    let literal = literal.as_bytes();
    if rest.len() < literal.len() {
        if literal.starts_with(rest) {
            return Err(DecodeError::ShortBuffer);
        }
        return Err(DecodeError::invalid(format!("expected: {}", String::from_utf8_lossy(literal))));
    }
    if &rest[..literal.len()] != literal {
        return Err(DecodeError::invalid(format!("expected: {}", String::from_utf8_lossy(literal))));
    }
    *input = &rest[literal.len()..];
    Ok(())
}

/// Consume whitespace then a numeric token, including `NaN` and the infinities.
pub fn read_number<'a>(input: &mut &'a [u8]) -> Result<&'a str, DecodeError> {
    let mut rest = *input;
    skip_whitespace(&mut rest);
    for token in ["NaN", "Infinity", "-Infinity"] {
        if rest.starts_with(token.as_bytes()) {
            *input = &rest[token.len()..];
            return Ok(token);
        }
    }
    let len = rest
        .iter()
        .take_while(|b| matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
        .count();
    if len == 0 {
        return match rest.first() {
            None => Err(DecodeError::ShortBuffer),
            Some(&b) => Err(DecodeError::invalid(format!("expected number; found {:?}", b as char))),
        };
    }
    // numeric characters are ASCII, so this cannot fail
    let token = std::str::from_utf8(&rest[..len]).map_err(|e| DecodeError::invalid(e.to_string()))?;
    *input = &rest[len..];
    Ok(token)
}

/// Parse the four hex digits that follow `\u`.
fn read_hex4(rest: &[u8]) -> Result<u32, DecodeError> {
    if rest.len() < 4 {
        return Err(DecodeError::ShortBuffer);
    }
    let mut code = 0u32;
    for &b in &rest[..4] {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            // the string closed before four digits were seen
            b'"' => return Err(DecodeError::ShortBuffer),
            _ => return Err(DecodeError::invalid(format!("invalid hex digit in escape: {:?}", b as char))),
        };
        code = code * 16 + u32::from(digit);
    }
    Ok(code)
}

/// Consume a quoted string, resolving escapes.
pub fn read_quoted(input: &mut &[u8], mode: StringMode) -> Result<Vec<u8>, DecodeError> {
    let mut rest = *input;
    skip_whitespace(&mut rest);
    match rest.first() {
        None => return Err(DecodeError::ShortBuffer),
        Some(b'"') => rest = &rest[1..],
        Some(&b) => return Err(DecodeError::invalid(format!("expected '\"'; found {:?}", b as char))),
    }

    let mut out = Vec::with_capacity(rest.len().min(64));
    loop {
        let (&b, tail) = rest.split_first().ok_or(DecodeError::ShortBuffer)?;
        rest = tail;
        match b {
            b'"' => break,
            b'\\' => {
                let (&esc, tail) = rest.split_first().ok_or(DecodeError::ShortBuffer)?;
                rest = tail;
                match esc {
                    b'"' | b'\\' | b'/' => out.push(esc),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'u' => {
                        let code = read_hex4(rest)?;
                        rest = &rest[4..];
                        match mode {
                            StringMode::Bytes => {
                                let byte = u8::try_from(code).map_err(|_| {
                                    DecodeError::invalid(format!("escape \\u{:04x} does not fit in a byte", code))
                                })?;
                                out.push(byte);
                            }
                            StringMode::Utf8 => {
                                let scalar = if (0xD800..0xDC00).contains(&code) {
                                    if rest.len() < 2 {
                                        return Err(DecodeError::ShortBuffer);
                                    }
                                    if &rest[..2] != b"\\u" {
                                        return Err(DecodeError::invalid("unpaired surrogate escape"));
                                    }
                                    let low = read_hex4(&rest[2..])?;
                                    if !(0xDC00..0xE000).contains(&low) {
                                        return Err(DecodeError::invalid("unpaired surrogate escape"));
                                    }
                                    rest = &rest[6..];
                                    0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00)
                                } else {
                                    code
                                };
                                let ch = char::from_u32(scalar)
                                    .ok_or_else(|| DecodeError::invalid("unpaired surrogate escape"))?;
                                let mut utf8 = [0u8; 4];
                                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                            }
                        }
                    }
                    other => {
                        return Err(DecodeError::invalid(format!("invalid escape: \\{}", other as char)));
                    }
                }
            }
            _ => out.push(b),
        }
    }
    *input = rest;
    Ok(out)
}

/// Consume a quoted string that must be valid UTF-8.
pub fn read_string(input: &mut &[u8]) -> Result<String, DecodeError> {
    let mut rest = *input;
    let bytes = read_quoted(&mut rest, StringMode::Utf8)?;
    let s = String::from_utf8(bytes).map_err(|e| DecodeError::invalid(format!("string: {}", e)))?;
    *input = rest;
    Ok(s)
}

/// Append `bytes` as a quoted JSON string.
pub fn write_quoted(buf: &mut Vec<u8>, bytes: &[u8], mode: StringMode) {
    buf.push(b'"');
    for &b in bytes {
        match b {
            b'"' | b'\\' | b'/' => buf.extend_from_slice(&[b'\\', b]),
            0x08 => buf.extend_from_slice(b"\\b"),
            0x0C => buf.extend_from_slice(b"\\f"),
            b'\n' => buf.extend_from_slice(b"\\n"),
            b'\r' => buf.extend_from_slice(b"\\r"),
            b'\t' => buf.extend_from_slice(b"\\t"),
            b if b < 0x20 || (mode == StringMode::Bytes && b >= 0x7F) => {
                buf.extend_from_slice(format!("\\u{:04x}", b).as_bytes());
            }
            b => buf.push(b),
        }
    }
    buf.push(b'"');
}

/// Append a float as a JSON number, or a bare `NaN`/`Infinity` token.
pub fn write_double(buf: &mut Vec<u8>, f: f64) {
    if f.is_nan() {
        buf.extend_from_slice(b"NaN");
    } else if f.is_infinite() {
        buf.extend_from_slice(if f > 0.0 { b"Infinity".as_slice() } else { b"-Infinity".as_slice() });
    } else {
        buf.extend_from_slice(f.to_string().as_bytes());
    }
}

pub fn write_float(buf: &mut Vec<u8>, f: f32) {
    if f.is_finite() {
        buf.extend_from_slice(f.to_string().as_bytes());
    } else {
        write_double(buf, f64::from(f));
    }
}
