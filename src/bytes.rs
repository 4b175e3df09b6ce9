//! Methods to convert containers to and from their binary layouts.
//!
//! A bitmap is 1024 consecutive little-endian `u64` words, 8192 bytes with no
//! header. A sparse container is its keys as consecutive little-endian `u16`s,
//! also without a header; its reader must be told how many keys to expect.
//!
//! On little-endian targets both layouts are the in-memory layout, and are
//! written and read directly through `bytemuck` casts.

use std::io::{Read, Write};

use crate::{Bitmap, Container, Error, Len, Result, Sparse};
use crate::{BITMAP_BYTES, BITMAP_WORDS, DEFAULT_MAX_SIZE, MAX_CAPACITY};

impl Bitmap {
    /// Writes all 1024 words.
    pub fn serialize<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        if cfg!(target_endian = "little") {
            writer.write_all(bytemuck::cast_slice(&self.words[..]))
        } else {
            for word in self.words.iter() {
                writer.write_all(&word.to_le_bytes())?;
            }
            Ok(())
        }
    }

    /// Overwrites `self` with exactly 8192 bytes read from `reader`, recounting the cardinality.
    ///
    /// Running out of input is an [`Error::Io`] of kind `UnexpectedEof`, after
    /// which the contents of `self` are unspecified.
    pub fn deserialize_into<R: Read>(&mut self, mut reader: R) -> Result<()> {
        self.cardinality = 0;
        reader.read_exact(bytemuck::cast_slice_mut(&mut self.words[..]))?;
        let mut cardinality = 0;
        for word in self.words.iter_mut() {
            *word = u64::from_le(*word);
            cardinality += word.count_ones() as usize;
        }
        self.cardinality = cardinality;
        Ok(())
    }

    /// Reads a bitmap of exactly 8192 bytes from `reader`.
    pub fn deserialize<R: Read>(reader: R) -> Result<Self> {
        let mut bitmap = Self::new();
        bitmap.deserialize_into(reader)?;
        Ok(bitmap)
    }

    /// Decodes a bitmap from a slice that must hold exactly 8192 bytes.
    ///
    /// The slice need not be aligned.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != BITMAP_BYTES {
            tracing::debug!(bytes = bytes.len(), "rejecting bitmap bytes of the wrong length");
            return Err(Error::InvalidArgument { found: bytes.len(), expected: BITMAP_BYTES });
        }
        let mut bitmap = Self::new();
        let mut cardinality = 0;
        for (word, chunk) in bitmap.words.iter_mut().zip(bytes.chunks_exact(8)) {
            *word = u64::from_le(bytemuck::pod_read_unaligned(chunk));
            cardinality += word.count_ones() as usize;
        }
        bitmap.cardinality = cardinality;
        Ok(bitmap)
    }

    /// The number of bytes `serialize` writes.
    #[inline(always)]
    pub fn serialized_size(&self) -> usize { BITMAP_WORDS * 8 }
}

impl Sparse {
    /// Writes each key as two little-endian bytes.
    pub fn serialize<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        if cfg!(target_endian = "little") {
            writer.write_all(bytemuck::cast_slice(self.keys()))
        } else {
            for key in self.keys() {
                writer.write_all(&key.to_le_bytes())?;
            }
            Ok(())
        }
    }

    /// Reads `cardinality` keys from `reader`, which must be strictly ascending.
    pub fn deserialize<R: Read>(mut reader: R, cardinality: usize) -> Result<Self> {
        if cardinality > MAX_CAPACITY {
            tracing::debug!(cardinality, "rejecting sparse cardinality beyond the universe");
            return Err(Error::InvalidArgument { found: cardinality, expected: MAX_CAPACITY });
        }
        let mut keys = vec![0u16; cardinality];
        reader.read_exact(bytemuck::cast_slice_mut(&mut keys[..]))?;
        for key in keys.iter_mut() {
            *key = u16::from_le(*key);
        }
        Self::try_from(keys)
    }

    /// The number of bytes `serialize` writes.
    #[inline(always)]
    pub fn serialized_size(&self) -> usize { 2 * self.len() }
}

impl Container {
    /// Writes the layout the cardinality implies, whatever the current representation.
    ///
    /// The cardinality is not written; readers learn it from the enclosing structure
    /// and pass it to [`Container::deserialize`], which picks the layout by the same rule.
    pub fn serialize<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        match self {
            Container::Dense(bitmap) if bitmap.len() <= DEFAULT_MAX_SIZE => {
                for key in bitmap.iter() {
                    writer.write_all(&key.to_le_bytes())?;
                }
                Ok(())
            }
            Container::Dense(bitmap) => bitmap.serialize(writer),
            Container::Sparse(sparse) if sparse.len() > DEFAULT_MAX_SIZE => sparse.to_bitmap().serialize(writer),
            Container::Sparse(sparse) => sparse.serialize(writer),
        }
    }

    /// Reads a container of `cardinality` keys, in the layout that cardinality implies.
    ///
    /// A bitmap whose set bits do not number `cardinality` is rejected.
    pub fn deserialize<R: Read>(reader: R, cardinality: usize) -> Result<Self> {
        if cardinality > DEFAULT_MAX_SIZE {
            let bitmap = Bitmap::deserialize(reader)?;
            if bitmap.len() != cardinality {
                tracing::debug!(found = bitmap.len(), expected = cardinality, "bitmap cardinality mismatch");
                return Err(Error::InvalidArgument { found: bitmap.len(), expected: cardinality });
            }
            Ok(Container::Dense(bitmap))
        } else {
            Ok(Container::Sparse(Sparse::deserialize(reader, cardinality)?))
        }
    }

    /// The number of bytes `serialize` writes.
    pub fn serialized_size(&self) -> usize {
        if self.len() > DEFAULT_MAX_SIZE { BITMAP_BYTES } else { 2 * self.len() }
    }
}
