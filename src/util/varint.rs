//! Variable-length integer encoding utilities.
//!
//! Seven payload bits per byte, low bits first, with the high bit marking a
//! continuation byte. Postings and term dictionaries use this for doc deltas,
//! frequencies and positions.

use std::io::{Read, Write};

use byteorder::ReadBytesExt;

use crate::error::{Result, StrataError};

/// Encode a u64 value using variable-length encoding.
pub fn encode_u64(value: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(10);
    let mut val = value;

    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;

        if val != 0 {
            byte |= 0x80;
        }

        bytes.push(byte);

        if val == 0 {
            break;
        }
    }

    bytes
}

/// Decode a u64 value from the front of `bytes`, returning the value and bytes consumed.
pub fn decode_u64(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if shift >= 64 {
            return Err(StrataError::corrupt("varint overflow"));
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            return Ok((result, i + 1));
        }

        shift += 7;
    }

    Err(StrataError::corrupt("incomplete varint"))
}

/// Write a variable-length encoded u32 to a writer.
pub fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<usize> {
    write_u64(writer, value as u64)
}

/// Read a variable-length encoded u32 from a reader.
pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let value = read_u64(reader)?;
    u32::try_from(value).map_err(|_| StrataError::corrupt(format!("varint {value} exceeds u32")))
}

/// Write a variable-length encoded u64 to a writer.
pub fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<usize> {
    let bytes = encode_u64(value);
    writer.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Read a variable-length encoded u64 from a reader.
pub fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0;

    loop {
        let byte = reader.read_u8()?;

        if shift >= 64 {
            return Err(StrataError::corrupt("varint overflow"));
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            return Ok(result);
        }

        shift += 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_small_values_take_one_byte() {
        assert_eq!(encode_u64(0), vec![0]);
        assert_eq!(encode_u64(127), vec![127]);
        assert_eq!(encode_u64(128), vec![0x80, 0x01]);
    }

    #[test]
    fn test_stream_roundtrip() {
        let mut buffer = Vec::new();
        write_u32(&mut buffer, 300).unwrap();
        write_u64(&mut buffer, u64::MAX).unwrap();

        let mut cursor = Cursor::new(buffer);
        assert_eq!(read_u32(&mut cursor).unwrap(), 300);
        assert_eq!(read_u64(&mut cursor).unwrap(), u64::MAX);
    }

    #[test]
    fn test_truncated_input_is_corrupt() {
        assert!(matches!(
            decode_u64(&[0x80, 0x80]),
            Err(StrataError::CorruptSegment(_))
        ));
        let (value, used) = decode_u64(&[0xAC, 0x02, 0xFF]).unwrap();
        assert_eq!((value, used), (300, 2));
    }

    #[test]
    fn test_u32_overflow_rejected() {
        let mut buffer = Vec::new();
        write_u64(&mut buffer, u32::MAX as u64 + 1).unwrap();
        assert!(read_u32(&mut Cursor::new(buffer)).is_err());
    }
}
