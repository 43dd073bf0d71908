// vellum/content/src/encoding.rs
//
// Copyright © 2026 The Vellum Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Self-describing little-endian binary streams.
//!
//! History payloads and persisted components are encoded with these streams:
//! fixed-width scalars, length-delimited vectors, and a one-byte component id
//! prefix per component. Decoding is total: malformed input yields a
//! `DecodeError`, never a partial mutation.

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use vellum_geometry::vector::{vec2f, Vector2F};

/// An append-only binary stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedData {
    bytes: Vec<u8>,
}

impl EncodedData {
    #[inline]
    pub fn new() -> EncodedData {
        EncodedData::default()
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn uint8(&mut self, value: u8) -> &mut EncodedData {
        self.bytes.push(value);
        self
    }

    #[inline]
    pub fn boolean(&mut self, value: bool) -> &mut EncodedData {
        self.uint8(value as u8)
    }

    pub fn uint32(&mut self, value: u32) -> &mut EncodedData {
        let mut buffer = [0; 4];
        LittleEndian::write_u32(&mut buffer, value);
        self.bytes.extend_from_slice(&buffer);
        self
    }

    pub fn uint64(&mut self, value: u64) -> &mut EncodedData {
        let mut buffer = [0; 8];
        LittleEndian::write_u64(&mut buffer, value);
        self.bytes.extend_from_slice(&buffer);
        self
    }

    pub fn uint128(&mut self, value: u128) -> &mut EncodedData {
        let mut buffer = [0; 16];
        LittleEndian::write_u128(&mut buffer, value);
        self.bytes.extend_from_slice(&buffer);
        self
    }

    pub fn float(&mut self, value: f32) -> &mut EncodedData {
        let mut buffer = [0; 4];
        LittleEndian::write_f32(&mut buffer, value);
        self.bytes.extend_from_slice(&buffer);
        self
    }

    #[inline]
    pub fn vec2(&mut self, value: Vector2F) -> &mut EncodedData {
        self.float(value.x).float(value.y)
    }

    /// Writes a length-delimited byte vector.
    pub fn byte_vector(&mut self, values: &[u8]) -> &mut EncodedData {
        self.uint32(values.len() as u32);
        self.bytes.extend_from_slice(values);
        self
    }

    /// Writes a length-delimited point vector.
    pub fn vec2_vector(&mut self, values: &[Vector2F]) -> &mut EncodedData {
        self.uint32(values.len() as u32);
        for value in values {
            self.vec2(*value);
        }
        self
    }

    /// Writes a length-delimited UTF-8 string.
    pub fn string(&mut self, value: &str) -> &mut EncodedData {
        self.byte_vector(value.as_bytes())
    }

    /// Writes the one-byte component id prefix.
    #[inline]
    pub fn component_id(&mut self, id: u8) -> &mut EncodedData {
        self.uint8(id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    UnexpectedEof,
    InvalidValue,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DecodeError::UnexpectedEof => write!(f, "unexpected end of encoded data"),
            DecodeError::InvalidValue => write!(f, "invalid value in encoded data"),
        }
    }
}

/// A cursor over an `EncodedData` byte stream.
pub struct Decoder<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Decoder<'a> {
        Decoder { bytes, offset: 0 }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        if self.offset + count > self.bytes.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let slice = &self.bytes[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    pub fn uint8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn boolean(&mut self) -> Result<bool, DecodeError> {
        match self.uint8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DecodeError::InvalidValue),
        }
    }

    pub fn uint32(&mut self) -> Result<u32, DecodeError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn uint64(&mut self) -> Result<u64, DecodeError> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn uint128(&mut self) -> Result<u128, DecodeError> {
        Ok(LittleEndian::read_u128(self.take(16)?))
    }

    pub fn float(&mut self) -> Result<f32, DecodeError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn vec2(&mut self) -> Result<Vector2F, DecodeError> {
        let x = self.float()?;
        let y = self.float()?;
        Ok(vec2f(x, y))
    }

    pub fn byte_vector(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.uint32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn vec2_vector(&mut self) -> Result<Vec<Vector2F>, DecodeError> {
        let len = self.uint32()? as usize;
        // Bounds-check before allocating to reject nonsense lengths.
        if self.offset + len.saturating_mul(8) > self.bytes.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.vec2()?);
        }
        Ok(values)
    }

    pub fn string(&mut self) -> Result<String, DecodeError> {
        String::from_utf8(self.byte_vector()?).map_err(|_| DecodeError::InvalidValue)
    }

    #[inline]
    pub fn component_id(&mut self) -> Result<u8, DecodeError> {
        self.uint8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut data = EncodedData::new();
        data.uint8(7)
            .boolean(true)
            .uint32(123456)
            .float(2.5)
            .vec2(vec2f(1.0, -2.0))
            .string("fill");

        let mut decoder = Decoder::new(data.bytes());
        assert_eq!(decoder.uint8().unwrap(), 7);
        assert_eq!(decoder.boolean().unwrap(), true);
        assert_eq!(decoder.uint32().unwrap(), 123456);
        assert_eq!(decoder.float().unwrap(), 2.5);
        assert_eq!(decoder.vec2().unwrap(), vec2f(1.0, -2.0));
        assert_eq!(decoder.string().unwrap(), "fill");
        assert!(decoder.is_at_end());
    }

    #[test]
    fn test_truncated_input_is_rejected() {
        let mut data = EncodedData::new();
        data.uint32(10);
        let mut decoder = Decoder::new(data.bytes());
        assert_eq!(decoder.uint64(), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn test_oversized_vector_length_is_rejected() {
        let mut data = EncodedData::new();
        data.uint32(u32::max_value());
        let mut decoder = Decoder::new(data.bytes());
        assert_eq!(decoder.vec2_vector(), Err(DecodeError::UnexpectedEof));
    }
}
