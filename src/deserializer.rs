use byteorder::{BigEndian, ByteOrder};

pub struct Deserializer;

impl Deserializer {
    /// Converts five bytes of a byte array to an unsigned long.
    /// The byte order is big-endian.
    pub fn get_five_bytes_long(buffer: &[u8], offset: usize) -> i64 {
        BigEndian::read_uint(&buffer[offset..offset + 5], 5) as i64
    }

    /// Converts four bytes of a byte array to a signed int.
    /// The byte order is big-endian.
    pub fn get_int(buffer: &[u8], offset: usize) -> i32 {
        BigEndian::read_i32(&buffer[offset..])
    }

    /// Converts eight bytes of a byte array to a signed long.
    /// The byte order is big-endian.
    pub fn get_long(buffer: &[u8], offset: usize) -> i64 {
        BigEndian::read_i64(&buffer[offset..])
    }

    /// Converts two bytes of a byte array to a signed int.
    /// The byte order is big-endian.
    pub fn get_short(buffer: &[u8], offset: usize) -> i16 {
        BigEndian::read_i16(&buffer[offset..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_bytes_long() {
        assert_eq!(Deserializer::get_five_bytes_long(&[0, 0, 0, 0, 0], 0), 0);
        assert_eq!(Deserializer::get_five_bytes_long(&[0, 0, 0, 0, 1], 0), 1);
        assert_eq!(
            Deserializer::get_five_bytes_long(&[0xff, 0xff, 0xff, 0xff, 0xff], 0),
            0xff_ffff_ffff
        );
    }

    #[test]
    fn fixed_width() {
        assert_eq!(Deserializer::get_int(&[0, 0, 0, 128], 0), 128);
        assert_eq!(Deserializer::get_short(&[0, 127], 0), 127);
        assert_eq!(Deserializer::get_long(&[0, 0, 0, 0, 0, 0, 1, 0], 0), 256);
    }
}
