//! Binary wire primitives: zigzag varints and little-endian floats.
//!
//! Readers take `&mut &[u8]` and only advance it on success, so a failed
//! read leaves the input where it was.

use crate::error::DecodeError;

/// Longest varint that can hold a 64-bit value
const MAX_VARINT_LEN: usize = 10;

/// Map a signed integer onto an unsigned one, small magnitudes first.
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Append `n` as a zigzag base-128 varint.
pub fn write_long(buf: &mut Vec<u8>, n: i64) {
    let mut value = zigzag_encode(n);
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Read a zigzag base-128 varint.
pub fn read_long(input: &mut &[u8]) -> Result<i64, DecodeError> {
    let mut result: u64 = 0;
    for (index, &byte) in input.iter().enumerate() {
        if index == MAX_VARINT_LEN {
            return Err(DecodeError::invalid("varint overflows 64 bits"));
        }
        let payload = u64::from(byte & 0x7F);
        if index == MAX_VARINT_LEN - 1 && payload > 1 {
            return Err(DecodeError::invalid("varint overflows 64 bits"));
        }
        result |= payload << (7 * index);
        if byte & 0x80 == 0 {
            *input = &input[index + 1..];
            return Ok(zigzag_decode(result));
        }
    }
    Err(DecodeError::ShortBuffer)
}

/// Read a zigzag varint and check it fits in 32 bits.
pub fn read_int(input: &mut &[u8]) -> Result<i32, DecodeError> {
    let mut rest = *input;
    let value = read_long(&mut rest)?;
    let value = i32::try_from(value).map_err(|_| DecodeError::invalid(format!("int: value out of range: {}", value)))?;
    *input = rest;
    Ok(value)
}

/// Take exactly `len` bytes.
pub fn read_exact<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8], DecodeError> {
    if len > input.len() {
        return Err(DecodeError::ShortBuffer);
    }
    let (head, tail) = input.split_at(len);
    *input = tail;
    Ok(head)
}

/// Read a non-negative zigzag length and check it against `limit`.
pub fn read_len(input: &mut &[u8], what: &str, limit: u64) -> Result<usize, DecodeError> {
    let mut rest = *input;
    let len = read_long(&mut rest)?;
    if len < 0 {
        return Err(DecodeError::invalid(format!("{}: negative length: {}", what, len)));
    }
    if len as u64 > limit {
        return Err(DecodeError::invalid(format!("{}: length {} exceeds limit {}", what, len, limit)));
    }
    let len = usize::try_from(len).map_err(|_| DecodeError::invalid(format!("{}: length {} too large", what, len)))?;
    *input = rest;
    Ok(len)
}

pub fn write_float(buf: &mut Vec<u8>, f: f32) {
    buf.extend_from_slice(&f.to_le_bytes());
}

pub fn write_double(buf: &mut Vec<u8>, f: f64) {
    buf.extend_from_slice(&f.to_le_bytes());
}

pub fn read_float(input: &mut &[u8]) -> Result<f32, DecodeError> {
    let bytes = read_exact(input, 4)?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    Ok(f32::from_le_bytes(raw))
}

pub fn read_double(input: &mut &[u8]) -> Result<f64, DecodeError> {
    let bytes = read_exact(input, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(f64::from_le_bytes(raw))
}
