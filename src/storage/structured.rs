//! Structured binary I/O for index files.
//!
//! Every index file has the same envelope: a four byte magic, a format
//! version, the payload, and a little-endian CRC32 of everything before it.
//! [`StructWriter`] produces the envelope; [`StructReader`] verifies it up
//! front so that any torn or bit-flipped file surfaces as
//! [`StrataError::CorruptSegment`] before a single value is decoded.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, StrataError};
use crate::storage::StorageOutput;
use crate::util::varint::{encode_u64, read_u64};

/// A structured file writer for binary data.
pub struct StructWriter<W: StorageOutput> {
    writer: W,
    hasher: crc32fast::Hasher,
    position: u64,
}

impl<W: StorageOutput> StructWriter<W> {
    /// Create a new structured file writer.
    pub fn new(writer: W) -> Self {
        StructWriter {
            writer,
            hasher: crc32fast::Hasher::new(),
            position: 0,
        }
    }

    /// Create a writer and emit the file header.
    pub fn with_header(writer: W, magic: u32, version: u32) -> Result<Self> {
        let mut struct_writer = Self::new(writer);
        struct_writer.write_u32(magic)?;
        struct_writer.write_u32(version)?;
        Ok(struct_writer)
    }

    /// Write a u8 value.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_raw(&[value])
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    /// Write a u64 value (little-endian).
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    /// Write an i64 value (little-endian).
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_raw(&value.to_le_bytes())
    }

    /// Write a variable-length integer.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        self.write_raw(&encode_u64(value))
    }

    /// Write a string with length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Write raw bytes with length prefix.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.write_varint(value.len() as u64)?;
        self.write_raw(value)
    }

    /// Write raw bytes without length prefix.
    pub fn write_raw(&mut self, value: &[u8]) -> Result<()> {
        self.writer.write_all(value)?;
        self.hasher.update(value);
        self.position += value.len() as u64;
        Ok(())
    }

    /// Get current file position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Write the checksum footer, then flush and close the writer.
    pub fn close(mut self) -> Result<()> {
        let checksum = self.hasher.clone().finalize();
        self.writer.write_u32::<LittleEndian>(checksum)?;
        self.writer.flush_and_sync()?;
        self.writer.close()?;
        Ok(())
    }
}

/// A structured reader over a verified in-memory file image.
pub struct StructReader<'a> {
    name: String,
    cursor: Cursor<&'a [u8]>,
}

impl<'a> StructReader<'a> {
    /// Verify the checksum footer and header of `data`, positioning after the header.
    pub fn open(name: &str, data: &'a [u8], magic: u32, version: u32) -> Result<Self> {
        if data.len() < 12 {
            return Err(StrataError::corrupt(format!("{name}: file too short")));
        }

        let (body, footer) = data.split_at(data.len() - 4);
        let stored = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
        let actual = crc32fast::hash(body);
        if stored != actual {
            return Err(StrataError::corrupt(format!(
                "{name}: checksum mismatch (stored {stored:08x}, computed {actual:08x})"
            )));
        }

        let mut reader = StructReader {
            name: name.to_string(),
            cursor: Cursor::new(body),
        };

        let found_magic = reader.read_u32()?;
        if found_magic != magic {
            return Err(StrataError::corrupt(format!(
                "{name}: bad magic {found_magic:08x}, expected {magic:08x}"
            )));
        }
        let found_version = reader.read_u32()?;
        if found_version != version {
            return Err(StrataError::corrupt(format!(
                "{name}: unsupported version {found_version}"
            )));
        }

        Ok(reader)
    }

    fn corrupt(&self, e: std::io::Error) -> StrataError {
        StrataError::corrupt(format!(
            "{}: truncated at offset {}: {e}",
            self.name,
            self.cursor.position()
        ))
    }

    /// Read a u8 value.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(|e| self.corrupt(e))
    }

    /// Read a u32 value (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|e| self.corrupt(e))
    }

    /// Read a u64 value (little-endian).
    pub fn read_u64(&mut self) -> Result<u64> {
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(|e| self.corrupt(e))
    }

    /// Read an i64 value (little-endian).
    pub fn read_i64(&mut self) -> Result<i64> {
        self.cursor
            .read_i64::<LittleEndian>()
            .map_err(|e| self.corrupt(e))
    }

    /// Read a variable-length integer.
    pub fn read_varint(&mut self) -> Result<u64> {
        match read_u64(&mut self.cursor) {
            Ok(value) => Ok(value),
            Err(StrataError::Io(e)) => Err(self.corrupt(e)),
            Err(e) => Err(e),
        }
    }

    /// Read a variable-length integer that must fit a u32.
    pub fn read_varint_u32(&mut self) -> Result<u32> {
        let value = self.read_varint()?;
        u32::try_from(value)
            .map_err(|_| StrataError::corrupt(format!("{}: value {value} exceeds u32", self.name)))
    }

    /// Read a string with length prefix.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes)
            .map_err(|e| StrataError::corrupt(format!("{}: invalid UTF-8: {e}", self.name)))
    }

    /// Read raw bytes with length prefix.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let length = self.read_varint()? as usize;
        self.read_raw(length)
    }

    /// Read exactly `length` raw bytes.
    pub fn read_raw(&mut self, length: usize) -> Result<Vec<u8>> {
        if length > self.remaining() {
            return Err(StrataError::corrupt(format!(
                "{}: length {length} runs past end of file",
                self.name
            )));
        }
        let mut buffer = vec![0u8; length];
        self.cursor
            .read_exact(&mut buffer)
            .map_err(|e| self.corrupt(e))?;
        Ok(buffer)
    }

    /// Borrow a slice of the payload by absolute offset.
    pub fn slice(&self, offset: u64, length: u64) -> Result<&'a [u8]> {
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = offset as usize;
        let end = start.checked_add(length as usize).unwrap_or(usize::MAX);
        data.get(start..end).ok_or_else(|| {
            StrataError::corrupt(format!(
                "{}: range {start}..{end} outside payload of {} bytes",
                self.name,
                data.len()
            ))
        })
    }

    /// Current offset within the payload.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Bytes left before the checksum footer.
    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.cursor.position() as usize)
    }

    /// Whether all payload bytes were consumed.
    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }
}
