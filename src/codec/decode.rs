//! Value decoding: bytes → `Value`.

use std::io::Read;

use bytes::Buf;

use super::limits::Limits;
use super::tag::Tag;
use super::varint::decode_size;
use crate::error::{AetherError, Result};
use crate::types::{Dict, FromValue, Value};

/// Upper bound on capacity reserved up front from a declared size.
///
/// Sizes come from the input, so larger payloads grow as bytes arrive instead
/// of trusting the prefix.
pub(crate) const MAX_PREALLOC: usize = 4096;

/// Reads one value from a blocking source.
///
/// On error the source has been partially consumed and must not be read
/// further.
pub fn read_value<R: Read + ?Sized>(reader: &mut R, limits: &Limits) -> Result<Value> {
    read_value_at(reader, limits, 0)
}

/// Reads one value and projects it into `T`.
///
/// The tag is checked before the payload is read, so a mismatch fails without
/// consuming anything past the tag byte.
pub fn read_as<T: FromValue, R: Read + ?Sized>(reader: &mut R, limits: &Limits) -> Result<T> {
    let tag = read_tag(reader)?;
    if !T::accepts(tag) {
        return Err(AetherError::TypeMismatch {
            expected: T::EXPECTED,
            found: tag,
        });
    }
    T::from_value(read_payload(reader, tag, limits, 0)?)
}

/// Reads and validates a single tag byte.
pub fn read_tag<R: Read + ?Sized>(reader: &mut R) -> Result<Tag> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Tag::try_from(byte[0])
}

/// Decodes a single `Value` from the buffer with default limits.
pub fn decode_value(buf: &mut impl Buf) -> Result<Value> {
    decode_value_with(buf, &Limits::default())
}

/// Decodes a single `Value` from the buffer.
pub fn decode_value_with(buf: &mut impl Buf, limits: &Limits) -> Result<Value> {
    read_value(&mut buf.reader(), limits)
}

/// Decodes a slice that holds exactly one encoded value.
///
/// Bytes left over after the value are a format error.
pub fn from_slice(data: &[u8]) -> Result<Value> {
    let mut cursor = data;
    let value = read_value(&mut cursor, &Limits::default())?;
    if !cursor.is_empty() {
        return Err(AetherError::Format(format!(
            "{} trailing bytes after value",
            cursor.len()
        )));
    }
    Ok(value)
}

fn read_value_at<R: Read + ?Sized>(reader: &mut R, limits: &Limits, depth: usize) -> Result<Value> {
    let tag = read_tag(reader)?;
    read_payload(reader, tag, limits, depth)
}

fn read_payload<R: Read + ?Sized>(
    reader: &mut R,
    tag: Tag,
    limits: &Limits,
    depth: usize,
) -> Result<Value> {
    if let Some(width) = tag.payload_width() {
        let mut scratch = [0u8; 8];
        let payload = &mut scratch[..width];
        reader.read_exact(payload)?;
        return scalar_from_le_bytes(tag, payload);
    }

    match tag {
        Tag::String => {
            let len = limits.check_size(decode_size(reader)?)?;
            string_from_utf8(read_blob(reader, len)?).map(Value::String)
        }
        Tag::Bytes => {
            let len = limits.check_size(decode_size(reader)?)?;
            Ok(Value::Bytes(read_blob(reader, len)?))
        }
        Tag::List => {
            let len = limits.check_size(decode_size(reader)?)?;
            let depth = limits.enter(depth)?;
            let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
            for _ in 0..len {
                items.push(read_value_at(reader, limits, depth)?);
            }
            Ok(Value::List(items))
        }
        Tag::Dict => {
            let len = limits.check_size(decode_size(reader)?)?;
            let depth = limits.enter(depth)?;
            let mut dict = Dict::with_capacity(len.min(MAX_PREALLOC));
            for _ in 0..len {
                let key = read_value_at(reader, limits, depth)?;
                let value = read_value_at(reader, limits, depth)?;
                // Duplicate keys: the last value wins, the first position stays.
                dict.insert(key, value);
            }
            Ok(Value::Dict(dict))
        }
        scalar => Err(not_sized(scalar)),
    }
}

/// Builds a fixed-width scalar from its little-endian payload.
///
/// `payload` must be exactly `tag.payload_width()` bytes.
pub(crate) fn scalar_from_le_bytes(tag: Tag, mut payload: &[u8]) -> Result<Value> {
    let value = match tag {
        Tag::Null => Value::Null,
        Tag::True => Value::Bool(true),
        Tag::False => Value::Bool(false),
        Tag::Int8 => Value::Int8(payload.get_i8()),
        Tag::Int16 => Value::Int16(payload.get_i16_le()),
        Tag::Int32 => Value::Int32(payload.get_i32_le()),
        Tag::Int64 => Value::Int64(payload.get_i64_le()),
        Tag::UInt8 => Value::UInt8(payload.get_u8()),
        Tag::UInt16 => Value::UInt16(payload.get_u16_le()),
        Tag::UInt32 => Value::UInt32(payload.get_u32_le()),
        Tag::UInt64 => Value::UInt64(payload.get_u64_le()),
        Tag::Float32 => Value::Float32(f32::from_bits(payload.get_u32_le())),
        Tag::Float64 => Value::Float64(f64::from_bits(payload.get_u64_le())),
        Tag::String | Tag::Bytes | Tag::Dict | Tag::List => return Err(not_sized(tag)),
    };
    Ok(value)
}

fn not_sized(tag: Tag) -> AetherError {
    AetherError::Format(format!("{tag} has a fixed-width payload, not a size"))
}

/// Reads exactly `len` bytes, growing the buffer as data arrives.
fn read_blob<R: Read + ?Sized>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(len.min(MAX_PREALLOC));
    reader.take(len as u64).read_to_end(&mut data)?;
    if data.len() < len {
        return Err(AetherError::UnexpectedEof);
    }
    Ok(data)
}

pub(crate) fn string_from_utf8(data: Vec<u8>) -> Result<String> {
    String::from_utf8(data).map_err(|e| AetherError::Format(format!("invalid UTF-8 string: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use bytes::BytesMut;

    /// Encode then decode a value and verify round-trip.
    fn round_trip(value: &Value) -> Value {
        let mut buf = BytesMut::new();
        encode::encode_value(&mut buf, value);
        let mut cursor = &buf[..];
        let decoded = decode_value(&mut cursor).expect("decode failed");
        assert!(cursor.is_empty(), "{} bytes left over", cursor.len());
        decoded
    }

    fn assert_round_trip(value: Value) {
        assert_eq!(round_trip(&value), value, "failed for {value}");
    }

    #[test]
    fn round_trip_tag_only() {
        assert_round_trip(Value::Null);
        assert_round_trip(Value::Bool(true));
        assert_round_trip(Value::Bool(false));
    }

    #[test]
    fn round_trip_integer_bounds() {
        for v in [0, -1, i8::MIN, i8::MAX] {
            assert_round_trip(Value::Int8(v));
        }
        for v in [0, -1, i16::MIN, i16::MAX] {
            assert_round_trip(Value::Int16(v));
        }
        for v in [0, -1, i32::MIN, i32::MAX] {
            assert_round_trip(Value::Int32(v));
        }
        for v in [0, -1, i64::MIN, i64::MAX] {
            assert_round_trip(Value::Int64(v));
        }
        for v in [0, u8::MAX] {
            assert_round_trip(Value::UInt8(v));
        }
        for v in [0, u16::MAX] {
            assert_round_trip(Value::UInt16(v));
        }
        for v in [0, u32::MAX] {
            assert_round_trip(Value::UInt32(v));
        }
        for v in [0, u64::MAX] {
            assert_round_trip(Value::UInt64(v));
        }
    }

    #[test]
    fn round_trip_float_specials_bitwise() {
        let nan32 = f32::from_bits(0x7FA0_0001);
        let nan64 = f64::from_bits(0xFFF8_0000_DEAD_BEEF);
        for v in [0.0, -0.0, 1.5, f32::MIN, f32::MAX, f32::INFINITY, f32::NEG_INFINITY, nan32] {
            match round_trip(&Value::Float32(v)) {
                Value::Float32(out) => assert_eq!(out.to_bits(), v.to_bits()),
                other => panic!("expected float32, got {other}"),
            }
        }
        for v in [0.0, -0.0, 1234.5678, f64::MIN, f64::MAX, f64::INFINITY, f64::NEG_INFINITY, nan64] {
            match round_trip(&Value::Float64(v)) {
                Value::Float64(out) => assert_eq!(out.to_bits(), v.to_bits()),
                other => panic!("expected float64, got {other}"),
            }
        }
    }

    #[test]
    fn round_trip_strings_and_bytes() {
        assert_round_trip(Value::String(String::new()));
        assert_round_trip(Value::from("hello"));
        assert_round_trip(Value::from("ünïcödé ✓ 🚀"));
        assert_round_trip(Value::from("a".repeat(20_000)));
        assert_round_trip(Value::Bytes(Vec::new()));
        assert_round_trip(Value::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]));
    }

    #[test]
    fn round_trip_containers() {
        assert_round_trip(Value::List(Vec::new()));
        assert_round_trip(Value::Dict(Dict::new()));
        assert_round_trip(Value::List(vec![
            Value::Int16(1),
            Value::from("two"),
            Value::Bool(true),
            Value::List(vec![Value::Null]),
        ]));
        assert_round_trip(Value::Dict(Dict::from([
            (Value::from("name"), Value::from("Alice")),
            (Value::UInt8(7), Value::Float64(30.5)),
            (
                Value::List(vec![Value::Int8(1)]),
                Value::Dict(Dict::from([(Value::Null, Value::Bytes(vec![1]))])),
            ),
        ])));
    }

    #[test]
    fn dict_preserves_wire_order() {
        let dict = Dict::from([
            (Value::from("z"), Value::Int8(1)),
            (Value::from("a"), Value::Int8(2)),
            (Value::from("m"), Value::Int8(3)),
        ]);
        let Value::Dict(decoded) = round_trip(&Value::Dict(dict)) else {
            panic!("expected dict");
        };
        let keys: Vec<_> = decoded.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn duplicate_dict_keys_last_value_wins() {
        // {"k": 1, "j": 2, "k": 3}
        let mut data = vec![0x0F, 0x03];
        data.extend_from_slice(&[0x0D, 0x01, b'k', 0x05, 0x01]);
        data.extend_from_slice(&[0x0D, 0x01, b'j', 0x05, 0x02]);
        data.extend_from_slice(&[0x0D, 0x01, b'k', 0x05, 0x03]);

        let Value::Dict(dict) = from_slice(&data).unwrap() else {
            panic!("expected dict");
        };
        assert_eq!(dict.len(), 2);
        assert_eq!(dict[&Value::from("k")], Value::UInt8(3));
        assert_eq!(dict.get_index(0).map(|(k, _)| k), Some(&Value::from("k")));
    }

    #[test]
    fn nested_lists_within_default_limit() {
        let mut value = Value::Int8(0);
        for _ in 0..200 {
            value = Value::List(vec![value]);
        }
        assert_round_trip(value);
    }

    #[test]
    fn depth_guard_rejects_deeper_input() {
        // Five nested single-element lists around a null.
        let mut data = Vec::new();
        for _ in 0..5 {
            data.extend_from_slice(&[0x10, 0x01]);
        }
        data.push(0x00);

        let ok = Limits::default().max_depth(5);
        assert!(read_value(&mut &data[..], &ok).is_ok());

        let tight = Limits::default().max_depth(4);
        let err = read_value(&mut &data[..], &tight).unwrap_err();
        assert!(matches!(err, AetherError::Format(_)), "{err}");
    }

    #[test]
    fn unknown_tag_is_format_error() {
        for byte in [17u8, 255] {
            let err = from_slice(&[byte]).unwrap_err();
            assert!(matches!(err, AetherError::Format(_)), "tag {byte}: {err}");
        }
    }

    #[test]
    fn empty_input_is_eof() {
        assert!(from_slice(&[]).unwrap_err().is_eof());
    }

    #[test]
    fn truncated_scalar_is_eof() {
        assert!(from_slice(&[0x04, 0x01, 0x02]).unwrap_err().is_eof());
    }

    #[test]
    fn string_longer_than_input_is_eof() {
        // Declares 10 bytes, supplies 3.
        let err = from_slice(&[0x0D, 0x0A, b'a', b'b', b'c']).unwrap_err();
        assert!(err.is_eof(), "{err}");
    }

    #[test]
    fn huge_declared_size_does_not_preallocate() {
        // Declares i64::MAX bytes, supplies none.
        let mut data = vec![0x0E];
        crate::codec::varint::encode_size(&mut data, i64::MAX);
        assert!(from_slice(&data).unwrap_err().is_eof());

        let mut data = vec![0x10];
        crate::codec::varint::encode_size(&mut data, i64::MAX);
        assert!(from_slice(&data).unwrap_err().is_eof());
    }

    #[test]
    fn negative_size_is_format_error() {
        let mut data = vec![0x0D];
        crate::codec::varint::encode_size(&mut data, -5);
        assert!(matches!(from_slice(&data), Err(AetherError::Format(_))));
    }

    #[test]
    fn size_limit_is_resource_exhausted() {
        let data = [0x0E, 0x05, 1, 2, 3, 4, 5];
        let limits = Limits::default().max_size(4);
        assert!(matches!(
            read_value(&mut &data[..], &limits),
            Err(AetherError::ResourceExhausted(_))
        ));
    }

    #[test]
    fn invalid_utf8_is_format_error() {
        let err = from_slice(&[0x0D, 0x02, 0xC3, 0x28]).unwrap_err();
        assert!(matches!(err, AetherError::Format(_)), "{err}");
    }

    #[test]
    fn malformed_size_varint_is_format_error() {
        let mut data = vec![0x0E];
        data.extend_from_slice(&[0xFF; 9]);
        data.push(0x7F);
        assert!(matches!(from_slice(&data), Err(AetherError::Format(_))));
    }

    #[test]
    fn trailing_bytes_rejected_by_from_slice() {
        let err = from_slice(&[0x00, 0x00]).unwrap_err();
        assert!(matches!(err, AetherError::Format(_)));
    }

    #[test]
    fn decode_value_leaves_following_values() {
        let data = [0x05, 0x01, 0x05, 0x02];
        let mut cursor = &data[..];
        assert_eq!(decode_value(&mut cursor).unwrap(), Value::UInt8(1));
        assert_eq!(decode_value(&mut cursor).unwrap(), Value::UInt8(2));
        assert!(cursor.is_empty());
    }

    #[test]
    fn typed_read_fails_fast_on_mismatch() {
        // A dict where a list was expected: only the tag is consumed.
        let data = [0x0F, 0x01, 0x00, 0x00];
        let mut cursor = &data[..];
        let err = read_as::<Vec<Value>, _>(&mut cursor, &Limits::default()).unwrap_err();
        assert!(matches!(
            err,
            AetherError::TypeMismatch {
                expected: Tag::List,
                found: Tag::Dict,
            }
        ));
        assert_eq!(cursor.len(), 3);
    }

    #[test]
    fn typed_read_of_homogeneous_list() {
        let value = Value::List(vec![Value::Int32(-1), Value::Int32(2)]);
        let bytes = encode::to_bytes(&value);
        let list: Vec<i32> = read_as(&mut &bytes[..], &Limits::default()).unwrap();
        assert_eq!(list, vec![-1, 2]);
    }
}
