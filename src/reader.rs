use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ByteOrder};

use crate::errors::{MapRenderError, Result};
use crate::types::Tag;

// Upper bound for a single buffered read, so that a corrupt length field
// cannot make us allocate the whole address space.
const MAXIMUM_BUFFER_SIZE: usize = 1024 * 1024 * 10;

/// Positioned view over a window of the map file.
///
/// All fixed-width reads are big-endian. Variable-length integers carry seven
/// payload bits per byte with the continuation bit in the MSB; the sign of a
/// signed variable-length integer sits in bit 6 of the terminating byte.
pub struct ReadBuffer<R: Read + Seek> {
    buffer_data: Vec<u8>,
    buffer_position: usize,
    input_channel: R,
    tag_ids: Vec<usize>,
}

impl<R: Read + Seek> ReadBuffer<R> {
    pub fn new(input_channel: R) -> Self {
        Self {
            buffer_data: Vec::new(),
            buffer_position: 0,
            input_channel,
            tag_ids: Vec::new(),
        }
    }

    fn require(&self, bytes: usize, what: &str) -> Result<()> {
        if self.buffer_position + bytes > self.buffer_data.len() {
            return Err(MapRenderError::malformed(format!(
                "read of {} crosses the buffered window at position {}",
                what, self.buffer_position
            )));
        }
        Ok(())
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.require(1, "byte")?;
        let byte = self.buffer_data[self.buffer_position];
        self.buffer_position += 1;
        Ok(byte)
    }

    pub fn read_short(&mut self) -> Result<i16> {
        self.require(2, "short")?;
        let value = BigEndian::read_i16(&self.buffer_data[self.buffer_position..]);
        self.buffer_position += 2;
        Ok(value)
    }

    pub fn read_int(&mut self) -> Result<i32> {
        self.require(4, "int")?;
        let value = BigEndian::read_i32(&self.buffer_data[self.buffer_position..]);
        self.buffer_position += 4;
        Ok(value)
    }

    pub fn read_long(&mut self) -> Result<i64> {
        self.require(8, "long")?;
        let value = BigEndian::read_i64(&self.buffer_data[self.buffer_position..]);
        self.buffer_position += 8;
        Ok(value)
    }

    pub fn read_float(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_int()? as u32))
    }

    /// Variable-length unsigned integer, little-endian among bytes.
    pub fn read_unsigned_int(&mut self) -> Result<u32> {
        let mut variable_byte_decode = 0u32;
        let mut variable_byte_shift = 0;

        loop {
            self.require(1, "unsigned int")?;
            if variable_byte_shift > 28 {
                return Err(MapRenderError::malformed("variable-length int too long"));
            }
            let byte = self.buffer_data[self.buffer_position];
            self.buffer_position += 1;
            if byte & 0x80 == 0 {
                return Ok(variable_byte_decode | ((byte as u32) << variable_byte_shift));
            }
            variable_byte_decode |= ((byte & 0x7f) as u32) << variable_byte_shift;
            variable_byte_shift += 7;
        }
    }

    /// Variable-length signed integer; bit 6 of the terminating byte is the
    /// sign.
    pub fn read_signed_int(&mut self) -> Result<i32> {
        let mut variable_byte_decode = 0i32;
        let mut variable_byte_shift = 0;

        loop {
            self.require(1, "signed int")?;
            if variable_byte_shift > 28 {
                return Err(MapRenderError::malformed("variable-length int too long"));
            }
            let byte = self.buffer_data[self.buffer_position];
            self.buffer_position += 1;
            if byte & 0x80 == 0 {
                let magnitude =
                    variable_byte_decode | (((byte & 0x3f) as i32) << variable_byte_shift);
                return Ok(if byte & 0x40 != 0 { -magnitude } else { magnitude });
            }
            variable_byte_decode |= ((byte & 0x7f) as i32) << variable_byte_shift;
            variable_byte_shift += 7;
        }
    }

    pub fn read_utf8_encoded_string(&mut self) -> Result<String> {
        let length = self.read_unsigned_int()? as usize;
        self.read_utf8_encoded_string_with_length(length)
    }

    pub fn read_utf8_encoded_string_with_length(&mut self, string_length: usize) -> Result<String> {
        if string_length == 0 || self.buffer_position + string_length > self.buffer_data.len() {
            return Err(MapRenderError::malformed(format!(
                "invalid string length: {}",
                string_length
            )));
        }
        self.buffer_position += string_length;
        let bytes =
            self.buffer_data[self.buffer_position - string_length..self.buffer_position].to_vec();
        Ok(String::from_utf8(bytes)?)
    }

    /// Resolves `number_of_tags` variable-length indices against `tags_array`.
    pub fn read_tags(&mut self, tags_array: &[Tag], number_of_tags: u8) -> Result<Vec<Tag>> {
        self.tag_ids.clear();
        let max_tag = tags_array.len();

        for _ in 0..number_of_tags {
            let tag_id = self.read_unsigned_int()? as usize;
            if tag_id >= max_tag {
                return Err(MapRenderError::malformed(format!(
                    "invalid tag ID: {}",
                    tag_id
                )));
            }
            self.tag_ids.push(tag_id);
        }

        Ok(self
            .tag_ids
            .iter()
            .map(|&tag_id| tags_array[tag_id].clone())
            .collect())
    }

    /// Fills the buffered window with `length` bytes from the current channel
    /// position. Returns `false` when the file is exhausted or the request
    /// exceeds the buffer cap.
    pub fn read_from_file(&mut self, length: usize) -> Result<bool> {
        if length > MAXIMUM_BUFFER_SIZE {
            return Ok(false);
        }

        self.buffer_data.resize(length, 0);
        self.buffer_position = 0;

        Ok(self
            .input_channel
            .read_exact(&mut self.buffer_data[..length])
            .is_ok())
    }

    pub fn read_from_file_at_offset(&mut self, offset: u64, length: usize) -> Result<bool> {
        if length > MAXIMUM_BUFFER_SIZE {
            return Ok(false);
        }

        self.buffer_data.resize(length, 0);
        self.buffer_position = 0;

        self.input_channel.seek(SeekFrom::Start(offset))?;
        Ok(self
            .input_channel
            .read_exact(&mut self.buffer_data[..length])
            .is_ok())
    }

    pub fn get_buffer_position(&self) -> usize {
        self.buffer_position
    }

    pub fn get_buffer_size(&self) -> usize {
        self.buffer_data.len()
    }

    pub fn set_buffer_position(&mut self, position: usize) {
        self.buffer_position = position;
    }

    pub fn skip_bytes(&mut self, bytes: usize) {
        self.buffer_position += bytes;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn buffer_over(bytes: &[u8]) -> ReadBuffer<Cursor<Vec<u8>>> {
        let mut read_buffer = ReadBuffer::new(Cursor::new(bytes.to_vec()));
        assert!(read_buffer.read_from_file(bytes.len()).unwrap());
        read_buffer
    }

    #[test]
    fn fixed_width_reads_are_big_endian() {
        let mut read_buffer = buffer_over(&[0x01, 0x02, 0x00, 0x00, 0x00, 0x2a]);
        assert_eq!(read_buffer.read_short().unwrap(), 0x0102);
        assert_eq!(read_buffer.read_int().unwrap(), 42);
    }

    #[test]
    fn variable_length_unsigned() {
        // 300 = 0b10101100 0b00000010
        let mut read_buffer = buffer_over(&[0xac, 0x02]);
        assert_eq!(read_buffer.read_unsigned_int().unwrap(), 300);
    }

    #[test]
    fn variable_length_signed_uses_bit_six_for_sign() {
        let mut read_buffer = buffer_over(&[0x05, 0x45]);
        assert_eq!(read_buffer.read_signed_int().unwrap(), 5);
        assert_eq!(read_buffer.read_signed_int().unwrap(), -5);
    }

    #[test]
    fn read_past_window_is_malformed() {
        let mut read_buffer = buffer_over(&[0x00]);
        assert!(matches!(
            read_buffer.read_int(),
            Err(MapRenderError::MalformedInput(_))
        ));
    }

    #[test]
    fn zero_length_string_is_malformed() {
        let mut read_buffer = buffer_over(&[0x00, 0x61]);
        assert!(read_buffer.read_utf8_encoded_string().is_err());
    }
}
