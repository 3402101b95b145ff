//! Binary element decoding and encoding for external datasets.

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use crate::array::Values;
use crate::util::{ElementKind, Error, ExternalElementType, Result};

use ExternalElementType as T;

/// Decode packed elements of type `ty`.
pub fn decode(ty: ExternalElementType, bytes: &[u8]) -> Result<Values> {
    if bytes.len() % ty.num_bytes() != 0 {
        return Err(Error::shape(format!(
            "{} bytes is not a whole number of {} elements",
            bytes.len(),
            ty
        )));
    }
    if ty.is_big_endian() {
        decode_with::<BigEndian>(ty, bytes)
    } else {
        decode_with::<LittleEndian>(ty, bytes)
    }
}

fn ints<V: Into<i64>>(bytes: &[u8], width: usize, read: fn(&[u8]) -> V) -> Values {
    Values::Integer(bytes.chunks_exact(width).map(|c| read(c).into()).collect())
}

fn decode_with<B: ByteOrder>(ty: ExternalElementType, bytes: &[u8]) -> Result<Values> {
    let w = ty.num_bytes();
    Ok(match ty {
        T::Boolean => Values::Boolean(bytes.iter().map(|&b| b != 0).collect()),
        T::Int8 => Values::Integer(bytes.iter().map(|&b| b as i8 as i64).collect()),
        T::UInt8 => Values::Integer(bytes.iter().map(|&b| b as i64).collect()),
        T::Int16LE | T::Int16BE => ints(bytes, w, B::read_i16),
        T::UInt16LE | T::UInt16BE => ints(bytes, w, B::read_u16),
        T::Int32LE | T::Int32BE => ints(bytes, w, B::read_i32),
        T::UInt32LE | T::UInt32BE => ints(bytes, w, B::read_u32),
        T::Int64LE | T::Int64BE => ints(bytes, w, B::read_i64),
        T::UInt64LE | T::UInt64BE => Values::Integer(
            bytes
                .chunks_exact(w)
                .map(|c| {
                    let v = B::read_u64(c);
                    i64::try_from(v).map_err(|_| Error::type_mismatch("integer within i64", v))
                })
                .collect::<Result<_>>()?,
        ),
        T::Float32LE | T::Float32BE => {
            Values::Float(bytes.chunks_exact(w).map(|c| B::read_f32(c) as f64).collect())
        }
        T::Double64LE | T::Double64BE => {
            Values::Float(bytes.chunks_exact(w).map(B::read_f64).collect())
        }
    })
}

/// Encode `values` as packed elements of type `ty`.
///
/// Integers that do not fit the target width fail with a type mismatch.
pub fn encode(ty: ExternalElementType, values: &Values) -> Result<Vec<u8>> {
    if values.kind() != ty.kind() {
        return Err(Error::type_mismatch(ty.kind(), values.kind()));
    }
    let mut out = Vec::with_capacity(values.len() * ty.num_bytes());
    if ty.is_big_endian() {
        encode_with::<BigEndian>(ty, values, &mut out)?;
    } else {
        encode_with::<LittleEndian>(ty, values, &mut out)?;
    }
    Ok(out)
}

fn narrow<V: TryFrom<i64>>(ty: ExternalElementType, v: i64) -> Result<V> {
    V::try_from(v).map_err(|_| Error::type_mismatch(ty, v))
}

fn encode_with<B: ByteOrder>(ty: ExternalElementType, values: &Values, out: &mut Vec<u8>) -> Result<()> {
    match values {
        Values::Boolean(v) => out.extend(v.iter().map(|&b| b as u8)),
        Values::Float(v) => {
            for &x in v {
                match ty {
                    T::Float32LE | T::Float32BE => out.write_f32::<B>(x as f32)?,
                    _ => out.write_f64::<B>(x)?,
                }
            }
        }
        Values::Integer(v) => {
            for &x in v {
                match ty {
                    T::Int8 => out.write_i8(narrow(ty, x)?)?,
                    T::UInt8 => out.write_u8(narrow(ty, x)?)?,
                    T::Int16LE | T::Int16BE => out.write_i16::<B>(narrow(ty, x)?)?,
                    T::UInt16LE | T::UInt16BE => out.write_u16::<B>(narrow(ty, x)?)?,
                    T::Int32LE | T::Int32BE => out.write_i32::<B>(narrow(ty, x)?)?,
                    T::UInt32LE | T::UInt32BE => out.write_u32::<B>(narrow(ty, x)?)?,
                    T::UInt64LE | T::UInt64BE => out.write_u64::<B>(narrow(ty, x)?)?,
                    _ => out.write_i64::<B>(x)?,
                }
            }
        }
        Values::String(_) => {
            return Err(Error::type_mismatch("numeric or boolean values", ElementKind::String))
        }
    }
    Ok(())
}
