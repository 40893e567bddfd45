//! Structured binary I/O for index files.
//!
//! Every file written through [`StructWriter`] ends with a little-endian
//! CRC32 of all preceding bytes. [`read_verified`] loads a file and checks
//! that trailer before any of it is decoded; [`StructReader`] then walks the
//! verified body.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;

use crate::error::{PaperSiftError, Result};
use crate::storage::traits::{Storage, StorageError, StorageOutput};
use crate::util::varint::{decode_u64, encode_u64};

/// Size of the checksum trailer.
pub const CHECKSUM_LEN: usize = 4;

/// A structured file writer for binary data.
pub struct StructWriter<W: StorageOutput> {
    writer: W,
    hasher: Hasher,
    position: u64,
}

impl<W: StorageOutput> StructWriter<W> {
    /// Create a new structured file writer.
    pub fn new(writer: W) -> Self {
        StructWriter {
            writer,
            hasher: Hasher::new(),
            position: 0,
        }
    }

    /// Write a u8 value.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_u8(value)?;
        self.update(&[value]);
        Ok(())
    }

    /// Write a variable-length integer.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let encoded = encode_u64(value);
        self.writer.write_all(&encoded)?;
        self.update(&encoded);
        Ok(())
    }

    /// Write a string with length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.write_varint(bytes.len() as u64)?;
        self.writer.write_all(bytes)?;
        self.update(bytes);
        Ok(())
    }

    /// Write a delta-encoded ascending sequence of u32 values.
    pub fn write_delta_u32s(&mut self, values: &[u32]) -> Result<()> {
        self.write_varint(values.len() as u64)?;

        let mut previous = 0u32;
        for &value in values {
            self.write_varint(value.wrapping_sub(previous) as u64)?;
            previous = value;
        }

        Ok(())
    }

    /// Bytes written so far, excluding the checksum trailer.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.position += data.len() as u64;
    }

    /// Append the checksum, then flush, sync and close the output.
    pub fn close(mut self) -> Result<u32> {
        let checksum = self.hasher.clone().finalize();
        self.writer.write_u32::<LittleEndian>(checksum)?;
        self.writer.flush_and_sync()?;
        self.writer.close()?;
        Ok(checksum)
    }
}

/// Read a whole file and verify its checksum trailer, returning the body.
pub fn read_verified(storage: &dyn Storage, name: &str) -> Result<Vec<u8>> {
    let mut input = storage.open_input(name)?;
    let mut data = Vec::with_capacity(input.size()? as usize);
    input.read_to_end(&mut data)?;

    if data.len() < CHECKSUM_LEN {
        return Err(StorageError::Corrupt(format!("{name} is too short for a checksum")).into());
    }

    let body_len = data.len() - CHECKSUM_LEN;
    let stored = (&data[body_len..]).read_u32::<LittleEndian>()?;
    if crc32fast::hash(&data[..body_len]) != stored {
        return Err(StorageError::ChecksumMismatch(name.to_string()).into());
    }

    data.truncate(body_len);
    Ok(data)
}

/// A structured reader over an already verified buffer.
pub struct StructReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> StructReader<'a> {
    /// Create a reader over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        StructReader { data, position: 0 }
    }

    fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.data.len() - self.position < len {
            return Err(StorageError::Corrupt(format!(
                "unexpected end of data at offset {} (wanted {len} bytes)",
                self.position
            ))
            .into());
        }
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Read a u8 value.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a variable-length integer.
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, len) = decode_u64(self.remaining()).map_err(|_| {
            StorageError::Corrupt(format!("malformed varint at offset {}", self.position))
        })?;
        self.position += len;
        Ok(value)
    }

    /// Read a varint that must fit in a u32.
    pub fn read_varint_u32(&mut self) -> Result<u32> {
        let value = self.read_varint()?;
        u32::try_from(value).map_err(|_| {
            StorageError::Corrupt(format!("value {value} does not fit in u32")).into()
        })
    }

    /// Read a string with length prefix.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_varint()? as usize;
        let bytes = self.take(length)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| PaperSiftError::storage(format!("Invalid UTF-8: {e}")))
    }

    /// Read a delta-encoded ascending sequence of u32 values.
    pub fn read_delta_u32s(&mut self) -> Result<Vec<u32>> {
        let length = self.read_varint()? as usize;
        let mut values = Vec::with_capacity(length.min(self.data.len()));

        let mut previous = 0u32;
        for _ in 0..length {
            let value = previous.wrapping_add(self.read_varint_u32()?);
            values.push(value);
            previous = value;
        }

        Ok(values)
    }

    /// Move to an absolute offset.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(StorageError::Corrupt(format!(
                "offset {position} is past the end of data ({} bytes)",
                self.data.len()
            ))
            .into());
        }
        self.position = position;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn write_sample(storage: &MemoryStorage) {
        let output = storage.create_output("sample.bin").unwrap();
        let mut writer = StructWriter::new(output);
        writer.write_u8(7).unwrap();
        writer.write_varint(300).unwrap();
        writer.write_string("graph networks").unwrap();
        writer.write_delta_u32s(&[1, 4, 9, 16]).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_write_then_read() {
        let storage = MemoryStorage::new();
        write_sample(&storage);

        let body = read_verified(&storage, "sample.bin").unwrap();
        let mut reader = StructReader::new(&body);

        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.read_varint().unwrap(), 300);
        assert_eq!(reader.read_string().unwrap(), "graph networks");
        assert_eq!(reader.read_delta_u32s().unwrap(), vec![1, 4, 9, 16]);
        // The whole body has been consumed.
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let storage = MemoryStorage::new();
        write_sample(&storage);

        let mut bytes = storage.get_bytes("sample.bin").unwrap();
        bytes[3] ^= 0xFF;
        storage.put_bytes("sample.bin", bytes);

        let err = read_verified(&storage, "sample.bin").unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_truncated_file() {
        let storage = MemoryStorage::new();
        storage.put_bytes("short.bin", vec![1, 2]);
        assert!(read_verified(&storage, "short.bin").is_err());
    }

    #[test]
    fn test_truncated_varint_is_corrupt() {
        let data = [0x80u8, 0x80];
        let mut reader = StructReader::new(&data);
        let err = reader.read_varint().unwrap_err();
        assert!(err.to_string().contains("Corrupt file"));
    }

    #[test]
    fn test_reading_past_end_fails() {
        let data = [0x05u8, b'a', b'b'];
        let mut reader = StructReader::new(&data);
        assert!(reader.read_string().is_err());
    }
}
