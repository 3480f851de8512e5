//! # Fixed-Width Codec
//!
//! 32-byte big-endian word helpers used to build hash preimages and proof
//! bytes that the settlement contract can recompute.

use crate::entities::{Address, Hash, U256};
use crate::errors::DecodeError;

/// Encode a `U256` as a 32-byte big-endian word.
pub fn u256_to_be32(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// Decode a 32-byte big-endian word.
pub fn be32_to_u256(word: &[u8; 32]) -> U256 {
    U256::from_big_endian(word)
}

/// Left-pad an address to a 32-byte word.
pub fn address_to_word(address: &Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address);
    out
}

/// Take the low 20 bytes of a word as an address.
pub fn word_to_address(word: &[u8; 32]) -> Address {
    let mut out = [0u8; 20];
    out.copy_from_slice(&word[12..]);
    out
}

/// `0x`-prefixed lowercase hex of a hash.
pub fn hash_to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// `0x`-prefixed lowercase hex of an address.
pub fn address_to_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Sequential reader over a byte slice.
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Take the next `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::UnexpectedEof {
                offset: self.offset,
                needed: len,
            })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_word(&mut self) -> Result<[u8; 32], DecodeError> {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(self.take(32)?);
        Ok(buf)
    }

    pub fn read_u256(&mut self) -> Result<U256, DecodeError> {
        Ok(be32_to_u256(&self.read_word()?))
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Fail if any bytes are left unread.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(DecodeError::TrailingBytes { remaining }),
        }
    }
}
