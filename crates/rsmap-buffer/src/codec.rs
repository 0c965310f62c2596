//! Encoding/decoding traits and the shared wire primitives.
//!
//! Every fixed-layout record in the cache formats implements [`WireEncode`]
//! and [`WireDecode`]; the free functions below cover the two primitives that
//! are not plain integers: length-prefixed strings and the "nullable large
//! smart", a variable-width integer whose null marker doubles as a reserved
//! 16-bit value.

use bytes::{Buf, BufMut};

use crate::error::BufferError;

/// The reserved 16-bit value that marks a null smart.
pub const SMART_NULL: u16 = 32767;

/// Encode a value onto a buffer.
pub trait WireEncode {
    fn wire_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait WireDecode: Sized {
    fn wire_decode(buf: &mut impl Buf) -> Result<Self, BufferError>;
}

/// Fail with [`BufferError::BufferTooShort`] unless `needed` bytes remain.
pub fn ensure(buf: &impl Buf, needed: usize) -> Result<(), BufferError> {
    if buf.remaining() < needed {
        return Err(BufferError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

pub fn take_u8(buf: &mut impl Buf) -> Result<u8, BufferError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub fn take_u16(buf: &mut impl Buf) -> Result<u16, BufferError> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

pub fn take_i32(buf: &mut impl Buf) -> Result<i32, BufferError> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

pub fn take_u32(buf: &mut impl Buf) -> Result<u32, BufferError> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

/// Look at the next readable byte without consuming it.
pub fn peek_u8(buf: &impl Buf) -> Result<u8, BufferError> {
    ensure(buf, 1)?;
    Ok(buf.chunk()[0])
}

/// Write a string as a 1-byte length prefix followed by UTF-8 bytes.
pub fn put_string(buf: &mut impl BufMut, s: &str) -> Result<(), BufferError> {
    if s.len() > u8::MAX as usize {
        return Err(BufferError::StringTooLong(s.len()));
    }
    buf.put_u8(s.len() as u8);
    buf.put_slice(s.as_bytes());
    Ok(())
}

/// Read a string written by [`put_string`].
pub fn get_string(buf: &mut impl Buf) -> Result<String, BufferError> {
    let len = take_u8(buf)? as usize;
    ensure(buf, len)?;
    let data = buf.copy_to_bytes(len);
    String::from_utf8(data.to_vec()).map_err(|_| BufferError::InvalidUtf8)
}

/// Write a nullable large smart.
///
/// `None` is the reserved 16-bit marker; values below the marker are 16-bit;
/// everything else is 32-bit with the sign bit set so the decoder can tell
/// the widths apart from the leading byte.
pub fn put_smart_opt(buf: &mut impl BufMut, value: Option<i32>) -> Result<(), BufferError> {
    match value {
        None => buf.put_u16(SMART_NULL),
        Some(v) if v < 0 => return Err(BufferError::SmartOutOfRange(v)),
        Some(v) if v < SMART_NULL as i32 => buf.put_u16(v as u16),
        Some(v) => buf.put_u32(v as u32 | 0x8000_0000),
    }
    Ok(())
}

/// Read a nullable large smart written by [`put_smart_opt`].
///
/// A 16-bit value equal to the null marker decodes as `None`; a foreign
/// encoder that writes the literal value 32767 as 16 bits is therefore
/// indistinguishable from null. That collision is part of the format.
pub fn get_smart_opt(buf: &mut impl Buf) -> Result<Option<i32>, BufferError> {
    if peek_u8(buf)? & 0x80 != 0 {
        let value = take_u32(buf)? & 0x7FFF_FFFF;
        Ok(Some(value as i32))
    } else {
        let value = take_u16(buf)?;
        if value == SMART_NULL {
            Ok(None)
        } else {
            Ok(Some(value as i32))
        }
    }
}

/// Read a nullable large smart, mapping `None` to the `-1` sentinel.
pub fn get_smart_or_minus_one(buf: &mut impl Buf) -> Result<i32, BufferError> {
    Ok(get_smart_opt(buf)?.unwrap_or(-1))
}

/// Write an id that uses `-1` as its "absent" sentinel.
pub fn put_smart_sentinel(buf: &mut impl BufMut, value: i32) -> Result<(), BufferError> {
    put_smart_opt(buf, if value == -1 { None } else { Some(value) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn roundtrip_smart(value: Option<i32>) {
        let mut buf = BytesMut::new();
        put_smart_opt(&mut buf, value).unwrap();
        let decoded = get_smart_opt(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, value, "smart roundtrip failed for {value:?}");
    }

    #[test]
    fn smart_none() {
        roundtrip_smart(None);
    }

    #[test]
    fn smart_small_values() {
        roundtrip_smart(Some(0));
        roundtrip_smart(Some(1));
        roundtrip_smart(Some(255));
        roundtrip_smart(Some(32766));
    }

    #[test]
    fn smart_large_values() {
        // 32767 itself takes the 32-bit path and survives.
        roundtrip_smart(Some(32767));
        roundtrip_smart(Some(32768));
        roundtrip_smart(Some(1_000_000));
        roundtrip_smart(Some(i32::MAX));
    }

    #[test]
    fn smart_widths() {
        let mut buf = BytesMut::new();
        put_smart_opt(&mut buf, Some(100)).unwrap();
        assert_eq!(buf.len(), 2);

        let mut buf = BytesMut::new();
        put_smart_opt(&mut buf, Some(100_000)).unwrap();
        assert_eq!(buf.len(), 4);
        // The sign bit distinguishes the wide encoding.
        assert!(buf[0] & 0x80 != 0);

        let mut buf = BytesMut::new();
        put_smart_opt(&mut buf, None).unwrap();
        assert_eq!(&buf[..], &SMART_NULL.to_be_bytes());
    }

    #[test]
    fn smart_null_collision() {
        // A bare 16-bit 32767 decodes as None, by design.
        let raw = SMART_NULL.to_be_bytes();
        let decoded = get_smart_opt(&mut &raw[..]).unwrap();
        assert_eq!(decoded, None);
    }

    #[test]
    fn smart_rejects_negative() {
        let mut buf = BytesMut::new();
        assert!(put_smart_opt(&mut buf, Some(-5)).is_err());
    }

    #[test]
    fn smart_sentinel_maps_minus_one() {
        let mut buf = BytesMut::new();
        put_smart_sentinel(&mut buf, -1).unwrap();
        let decoded = get_smart_or_minus_one(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, -1);
    }

    #[test]
    fn string_roundtrip() {
        let mut buf = BytesMut::new();
        put_string(&mut buf, "lunar_isle").unwrap();
        let decoded = get_string(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, "lunar_isle");
    }

    #[test]
    fn string_empty() {
        let mut buf = BytesMut::new();
        put_string(&mut buf, "").unwrap();
        let decoded = get_string(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, "");
    }

    #[test]
    fn string_too_long() {
        let long = "x".repeat(300);
        let mut buf = BytesMut::new();
        assert!(put_string(&mut buf, &long).is_err());
    }

    #[test]
    fn string_truncated_buffer() {
        let mut buf = BytesMut::new();
        put_string(&mut buf, "morytania").unwrap();
        let truncated = buf.freeze().slice(..4);
        assert!(get_string(&mut truncated.clone()).is_err());
    }

    #[test]
    fn take_checked_reads() {
        let data = [0x01u8, 0x02];
        let mut buf = &data[..];
        assert_eq!(take_u16(&mut buf).unwrap(), 0x0102);
        assert!(take_u8(&mut buf).is_err());
    }
}
