//! [`TypedArray`] — homogeneous numeric arrays with an explicit element kind.
//!
//! CBOR maps these to the RFC 8746 tags; every other format lowers them to a
//! plain array of numbers.

use crate::PackValue;

/// A homogeneous numeric array.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl TypedArray {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            TypedArray::I8(v) => v.len(),
            TypedArray::U8(v) => v.len(),
            TypedArray::I16(v) => v.len(),
            TypedArray::U16(v) => v.len(),
            TypedArray::I32(v) => v.len(),
            TypedArray::U32(v) => v.len(),
            TypedArray::I64(v) => v.len(),
            TypedArray::U64(v) => v.len(),
            TypedArray::F32(v) => v.len(),
            TypedArray::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes per element.
    pub fn elem_size(&self) -> usize {
        match self {
            TypedArray::I8(_) | TypedArray::U8(_) => 1,
            TypedArray::I16(_) | TypedArray::U16(_) => 2,
            TypedArray::I32(_) | TypedArray::U32(_) | TypedArray::F32(_) => 4,
            TypedArray::I64(_) | TypedArray::U64(_) | TypedArray::F64(_) => 8,
        }
    }

    /// Serializes the elements little-endian, in order.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * self.elem_size());
        match self {
            TypedArray::I8(v) => out.extend(v.iter().map(|&n| n as u8)),
            TypedArray::U8(v) => out.extend_from_slice(v),
            TypedArray::I16(v) => v.iter().for_each(|n| out.extend(n.to_le_bytes())),
            TypedArray::U16(v) => v.iter().for_each(|n| out.extend(n.to_le_bytes())),
            TypedArray::I32(v) => v.iter().for_each(|n| out.extend(n.to_le_bytes())),
            TypedArray::U32(v) => v.iter().for_each(|n| out.extend(n.to_le_bytes())),
            TypedArray::I64(v) => v.iter().for_each(|n| out.extend(n.to_le_bytes())),
            TypedArray::U64(v) => v.iter().for_each(|n| out.extend(n.to_le_bytes())),
            TypedArray::F32(v) => v.iter().for_each(|n| out.extend(n.to_le_bytes())),
            TypedArray::F64(v) => v.iter().for_each(|n| out.extend(n.to_le_bytes())),
        }
        out
    }

    /// Lowers the elements to plain [`PackValue`] numbers, for formats
    /// without a native typed-array representation.
    pub fn to_values(&self) -> Vec<PackValue> {
        match self {
            TypedArray::I8(v) => v.iter().map(|&n| PackValue::Integer(n as i64)).collect(),
            TypedArray::U8(v) => v.iter().map(|&n| PackValue::Integer(n as i64)).collect(),
            TypedArray::I16(v) => v.iter().map(|&n| PackValue::Integer(n as i64)).collect(),
            TypedArray::U16(v) => v.iter().map(|&n| PackValue::Integer(n as i64)).collect(),
            TypedArray::I32(v) => v.iter().map(|&n| PackValue::Integer(n as i64)).collect(),
            TypedArray::U32(v) => v.iter().map(|&n| PackValue::Integer(n as i64)).collect(),
            TypedArray::I64(v) => v.iter().map(|&n| PackValue::Integer(n)).collect(),
            TypedArray::U64(v) => v
                .iter()
                .map(|&n| {
                    if n <= i64::MAX as u64 {
                        PackValue::Integer(n as i64)
                    } else {
                        PackValue::UInteger(n)
                    }
                })
                .collect(),
            TypedArray::F32(v) => v.iter().map(|&n| PackValue::Float(n as f64)).collect(),
            TypedArray::F64(v) => v.iter().map(|&n| PackValue::Float(n)).collect(),
        }
    }
}

macro_rules! from_bytes {
    ($name:ident, $ty:ty, $from:ident) => {
        /// Reconstructs elements from raw bytes; the trailing partial element,
        /// if any, is dropped.
        pub fn $name(data: &[u8]) -> Vec<$ty> {
            data.chunks_exact(std::mem::size_of::<$ty>())
                .map(|c| <$ty>::$from(c.try_into().unwrap()))
                .collect()
        }
    };
}

/// Element readers used by the CBOR typed-array tag decoder.
pub mod elems {
    from_bytes!(i16_le, i16, from_le_bytes);
    from_bytes!(i16_be, i16, from_be_bytes);
    from_bytes!(u16_le, u16, from_le_bytes);
    from_bytes!(u16_be, u16, from_be_bytes);
    from_bytes!(i32_le, i32, from_le_bytes);
    from_bytes!(i32_be, i32, from_be_bytes);
    from_bytes!(u32_le, u32, from_le_bytes);
    from_bytes!(u32_be, u32, from_be_bytes);
    from_bytes!(i64_le, i64, from_le_bytes);
    from_bytes!(i64_be, i64, from_be_bytes);
    from_bytes!(u64_le, u64, from_le_bytes);
    from_bytes!(u64_be, u64, from_be_bytes);
    from_bytes!(f32_le, f32, from_le_bytes);
    from_bytes!(f32_be, f32, from_be_bytes);
    from_bytes!(f64_le, f64, from_le_bytes);
    from_bytes!(f64_be, f64, from_be_bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_serialization() {
        let arr = TypedArray::I16(vec![256, -1]);
        assert_eq!(arr.to_le_bytes(), [0x00, 0x01, 0xff, 0xff]);
    }

    #[test]
    fn element_readback() {
        assert_eq!(elems::i16_le(&[0x00, 0x01, 0xff, 0xff]), vec![256, -1]);
        assert_eq!(elems::i16_be(&[0x01, 0x00]), vec![256]);
    }

    #[test]
    fn lowers_to_plain_values() {
        let arr = TypedArray::U64(vec![1, u64::MAX]);
        assert_eq!(
            arr.to_values(),
            vec![PackValue::Integer(1), PackValue::UInteger(u64::MAX)]
        );
    }
}
