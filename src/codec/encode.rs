//! Value encoding: `Value` → bytes.
//!
//! Fixed-width payloads are little-endian. Strings, byte blobs, lists and
//! dictionaries carry a varint size after the tag.

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use super::tag::Tag;
use super::varint::{encode_size, size_len};
use crate::error::Result;
use crate::types::{Dict, Value};

/// Encodes a `Value` into the buffer.
///
/// Recurses once per container level; there is no depth guard on this side
/// because the value tree already exists in memory.
pub fn encode_value(buf: &mut impl BufMut, value: &Value) {
    match value {
        Value::Null => encode_null(buf),
        Value::Int8(v) => encode_i8(buf, *v),
        Value::Int16(v) => encode_i16(buf, *v),
        Value::Int32(v) => encode_i32(buf, *v),
        Value::Int64(v) => encode_i64(buf, *v),
        Value::UInt8(v) => encode_u8(buf, *v),
        Value::UInt16(v) => encode_u16(buf, *v),
        Value::UInt32(v) => encode_u32(buf, *v),
        Value::UInt64(v) => encode_u64(buf, *v),
        Value::Float32(v) => encode_f32(buf, *v),
        Value::Float64(v) => encode_f64(buf, *v),
        Value::Bool(b) => encode_bool(buf, *b),
        Value::String(s) => encode_string(buf, s),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::List(items) => encode_list(buf, items),
        Value::Dict(dict) => encode_dict(buf, dict),
    }
}

/// Encodes a value into a fresh, exactly-sized buffer.
pub fn to_bytes(value: &Value) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_len(value));
    encode_value(&mut buf, value);
    buf.freeze()
}

/// Encodes a value and writes it to a blocking sink.
///
/// The value is staged in memory and handed to the sink in one `write_all`.
/// If the sink fails part way, the bytes already written stay written.
pub fn write_value<W: Write + ?Sized>(writer: &mut W, value: &Value) -> Result<()> {
    writer.write_all(&to_bytes(value))?;
    Ok(())
}

/// Number of bytes [`encode_value`] produces for `value`.
pub fn encoded_len(value: &Value) -> usize {
    let payload = match value {
        Value::String(s) => sized_len(s.len()) + s.len(),
        Value::Bytes(b) => sized_len(b.len()) + b.len(),
        Value::List(items) => sized_len(items.len()) + items.iter().map(encoded_len).sum::<usize>(),
        Value::Dict(dict) => {
            sized_len(dict.len())
                + dict
                    .iter()
                    .map(|(k, v)| encoded_len(k) + encoded_len(v))
                    .sum::<usize>()
        }
        scalar => scalar.tag().payload_width().unwrap_or(0),
    };
    1 + payload
}

// Lengths of in-memory collections never exceed `isize::MAX`.
fn len_as_size(len: usize) -> i64 {
    len as i64
}

fn sized_len(len: usize) -> usize {
    size_len(len_as_size(len))
}

pub fn encode_null(buf: &mut impl BufMut) {
    buf.put_u8(Tag::Null.as_u8());
}

pub fn encode_bool(buf: &mut impl BufMut, value: bool) {
    let tag = if value { Tag::True } else { Tag::False };
    buf.put_u8(tag.as_u8());
}

pub fn encode_i8(buf: &mut impl BufMut, value: i8) {
    buf.put_u8(Tag::Int8.as_u8());
    buf.put_i8(value);
}

pub fn encode_i16(buf: &mut impl BufMut, value: i16) {
    buf.put_u8(Tag::Int16.as_u8());
    buf.put_i16_le(value);
}

pub fn encode_i32(buf: &mut impl BufMut, value: i32) {
    buf.put_u8(Tag::Int32.as_u8());
    buf.put_i32_le(value);
}

pub fn encode_i64(buf: &mut impl BufMut, value: i64) {
    buf.put_u8(Tag::Int64.as_u8());
    buf.put_i64_le(value);
}

pub fn encode_u8(buf: &mut impl BufMut, value: u8) {
    buf.put_u8(Tag::UInt8.as_u8());
    buf.put_u8(value);
}

pub fn encode_u16(buf: &mut impl BufMut, value: u16) {
    buf.put_u8(Tag::UInt16.as_u8());
    buf.put_u16_le(value);
}

pub fn encode_u32(buf: &mut impl BufMut, value: u32) {
    buf.put_u8(Tag::UInt32.as_u8());
    buf.put_u32_le(value);
}

pub fn encode_u64(buf: &mut impl BufMut, value: u64) {
    buf.put_u8(Tag::UInt64.as_u8());
    buf.put_u64_le(value);
}

/// Writes the exact bit pattern, so NaN payloads survive.
pub fn encode_f32(buf: &mut impl BufMut, value: f32) {
    buf.put_u8(Tag::Float32.as_u8());
    buf.put_u32_le(value.to_bits());
}

pub fn encode_f64(buf: &mut impl BufMut, value: f64) {
    buf.put_u8(Tag::Float64.as_u8());
    buf.put_u64_le(value.to_bits());
}

/// Encodes a string (size = UTF-8 byte length, not char count).
pub fn encode_string(buf: &mut impl BufMut, value: &str) {
    buf.put_u8(Tag::String.as_u8());
    encode_size(buf, len_as_size(value.len()));
    buf.put_slice(value.as_bytes());
}

pub fn encode_bytes(buf: &mut impl BufMut, value: &[u8]) {
    buf.put_u8(Tag::Bytes.as_u8());
    encode_size(buf, len_as_size(value.len()));
    buf.put_slice(value);
}

pub fn encode_list(buf: &mut impl BufMut, items: &[Value]) {
    encode_list_header(buf, items.len());
    for item in items {
        encode_value(buf, item);
    }
}

/// Writes a list tag and element count.
///
/// Exactly `len` values must follow; use this to stream a list without
/// building it first.
pub fn encode_list_header(buf: &mut impl BufMut, len: usize) {
    buf.put_u8(Tag::List.as_u8());
    encode_size(buf, len_as_size(len));
}

pub fn encode_dict(buf: &mut impl BufMut, dict: &Dict) {
    encode_dict_header(buf, dict.len());
    for (key, value) in dict {
        encode_value(buf, key);
        encode_value(buf, value);
    }
}

/// Writes a dictionary tag and pair count.
///
/// Exactly `len` key/value pairs must follow, key first.
pub fn encode_dict_header(buf: &mut impl BufMut, len: usize) {
    buf.put_u8(Tag::Dict.as_u8());
    encode_size(buf, len_as_size(len));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_value(&mut buf, value);
        buf
    }

    #[test]
    fn tag_only_values() {
        assert_eq!(encode(&Value::Null), vec![0x00]);
        assert_eq!(encode(&Value::Bool(true)), vec![0x0B]);
        assert_eq!(encode(&Value::Bool(false)), vec![0x0C]);
    }

    #[test]
    fn integers_are_little_endian() {
        assert_eq!(encode(&Value::Int8(-1)), vec![0x01, 0xFF]);
        assert_eq!(encode(&Value::Int16(0x0102)), vec![0x02, 0x02, 0x01]);
        assert_eq!(
            encode(&Value::Int32(-2)),
            vec![0x03, 0xFE, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(
            encode(&Value::UInt32(u32::MAX)),
            vec![0x07, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        let mut expected = vec![0x08];
        expected.extend_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        assert_eq!(encode(&Value::UInt64(0x0102_0304_0506_0708)), expected);
    }

    #[test]
    fn floats_keep_bit_pattern() {
        let nan = f32::from_bits(0x7FC0_1234);
        let mut expected = vec![0x09];
        expected.extend_from_slice(&0x7FC0_1234u32.to_le_bytes());
        assert_eq!(encode(&Value::Float32(nan)), expected);

        let mut expected = vec![0x0A];
        expected.extend_from_slice(&1.5f64.to_le_bytes());
        assert_eq!(encode(&Value::Float64(1.5)), expected);
    }

    #[test]
    fn string_is_length_prefixed_utf8() {
        let bytes = encode(&Value::from("héllo"));
        assert_eq!(bytes[0], Tag::String.as_u8());
        assert_eq!(bytes[1], 0x06);
        assert_eq!(&bytes[2..], "héllo".as_bytes());
    }

    #[test]
    fn empty_containers() {
        assert_eq!(encode(&Value::from("")), vec![0x0D, 0x00]);
        assert_eq!(encode(&Value::Bytes(Vec::new())), vec![0x0E, 0x00]);
        assert_eq!(encode(&Value::List(Vec::new())), vec![0x10, 0x00]);
        assert_eq!(encode(&Value::Dict(Dict::new())), vec![0x0F, 0x00]);
    }

    #[test]
    fn long_blob_uses_multi_byte_size() {
        let bytes = encode(&Value::Bytes(vec![0xAB; 200]));
        assert_eq!(&bytes[..3], &[0x0E, 0xC8, 0x01]);
        assert_eq!(bytes.len(), 3 + 200);
    }

    #[test]
    fn dict_pairs_follow_insertion_order() {
        let mut dict = Dict::new();
        dict.insert(Value::UInt8(2), Value::Null);
        dict.insert(Value::UInt8(1), Value::Bool(true));
        assert_eq!(
            encode(&Value::Dict(dict)),
            vec![0x0F, 0x02, 0x05, 0x02, 0x00, 0x05, 0x01, 0x0B]
        );
    }

    #[test]
    fn streamed_list_matches_materialized_list() {
        let items = vec![Value::Int8(1), Value::from("a")];
        let mut streamed = Vec::new();
        encode_list_header(&mut streamed, items.len());
        for item in &items {
            encode_value(&mut streamed, item);
        }
        assert_eq!(streamed, encode(&Value::List(items)));
    }

    #[test]
    fn encoded_len_matches_output() {
        let value = Value::List(vec![
            Value::Null,
            Value::UInt64(1),
            Value::from("x".repeat(300)),
            Value::Dict(Dict::from([(Value::Int16(1), Value::Bytes(vec![0; 130]))])),
        ]);
        assert_eq!(encoded_len(&value), encode(&value).len());
        assert_eq!(to_bytes(&value).len(), encoded_len(&value));
    }

    #[test]
    fn write_value_to_sink() {
        let mut sink = Vec::new();
        write_value(&mut sink, &Value::Int8(5)).unwrap();
        assert_eq!(sink, vec![0x01, 0x05]);
    }
}
