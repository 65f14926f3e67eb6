//! Little-endian byte serialization helpers.
//!
//! Every multi-byte field in the CAS and RIFF/WAVE formats this crate reads
//! and writes is little-endian, so this module provides exactly one
//! direction of conversion, plus a derive macro ([`msxtape_macros::ToBytes`])
//! for assembling fixed-layout wire structs field by field.

pub trait WriteBytesLe {
    fn write_le(&self, dst: &mut Vec<u8>);
}

macro_rules! impl_num_le {
    ($($t:ty),+) => { $(
        impl WriteBytesLe for $t {
            #[inline]
            fn write_le(&self, dst: &mut Vec<u8>) {
                dst.extend_from_slice(&self.to_le_bytes());
            }
        }
    )+ }
}

impl_num_le!(u8, i8, u16, i16, u32, i32, u64, i64);

impl<T: WriteBytesLe> WriteBytesLe for Vec<T> {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

impl<T: WriteBytesLe, const N: usize> WriteBytesLe for [T; N] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

#[macro_export]
macro_rules! join_bytes_le {
    ( $($value:expr),+ $(,)? ) => {{
        let mut vec = Vec::<u8>::new();
        $( $crate::byteorder::WriteBytesLe::write_le(&$value, &mut vec); )+
        vec
    }};
}

#[allow(unused_imports)]
pub use join_bytes_le;

#[cfg(test)]
mod tests {
    use super::*;
    use msxtape_macros::ToBytes;

    #[derive(ToBytes)]
    struct Mini {
        a: u16,
        b: u32,
        magic: [u8; 4],
    }

    #[test]
    fn to_bytes_field_order() {
        let s = Mini {
            a: 0x1234,
            b: 0xABCDEF01,
            magic: *b"TEST",
        };

        let vec = &mut Vec::new();
        s.write_le(vec);

        let expected = [0x34, 0x12, 0x01, 0xEF, 0xCD, 0xAB, b'T', b'E', b'S', b'T'];
        assert_eq!(&vec[..], &expected);
    }

    #[test]
    fn join_bytes_le_concatenates() {
        let bytes = join_bytes_le!(0x0102u16, 0x03u8);
        assert_eq!(bytes, vec![0x02, 0x01, 0x03]);
    }
}
