use byteorder::{BigEndian, ByteOrder};
use crate::error::DecodeError;

/// Cursor over a decompressed save, reading big-endian values.
pub struct ByteReader<'a> {
	data: &'a [u8],
	pos: usize
}

impl<'a> ByteReader<'a> {
	pub fn new(data: &'a [u8]) -> Self {
		ByteReader { data, pos: 0 }
	}

	pub fn remaining(&self) -> usize {
		self.data.len() - self.pos
	}

	/// Takes the next `len` bytes.
	pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
		if self.remaining() < len {
			return Err(DecodeError::UnexpectedEof { needed: len, remaining: self.remaining() });
		}

		let slice = &self.data[self.pos..self.pos + len];
		self.pos += len;

		Ok(slice)
	}

	/// Takes everything that has not been read yet.
	pub fn rest(&mut self) -> &'a [u8] {
		let slice = &self.data[self.pos..];
		self.pos = self.data.len();

		slice
	}

	pub fn u8(&mut self) -> Result<u8, DecodeError> {
		Ok(self.take(1)?[0])
	}

	pub fn u16(&mut self) -> Result<u16, DecodeError> {
		Ok(BigEndian::read_u16(self.take(2)?))
	}

	pub fn i32(&mut self) -> Result<i32, DecodeError> {
		Ok(BigEndian::read_i32(self.take(4)?))
	}

	/// Reads a string prefixed by its length in bytes as a u16.
	pub fn string(&mut self) -> Result<String, DecodeError> {
		let len = self.u16()? as usize;

		Ok(String::from_utf8_lossy(self.take(len)?).into_owned())
	}
}

#[cfg(test)]
mod test {
	use super::ByteReader;
	use crate::DecodeError;

	#[test]
	fn test_reads_in_order() {
		let mut reader = ByteReader::new(&[0x27, 0x1B, 0xB7, 0x88, 0x02, 0x00, 0x02, b'h', b'i', 0xFF]);

		assert_eq!(reader.i32().unwrap(), 0x271BB788);
		assert_eq!(reader.u8().unwrap(), 2);
		assert_eq!(reader.string().unwrap(), "hi");
		assert_eq!(reader.rest(), &[0xFF]);
		assert_eq!(reader.remaining(), 0);
	}

	#[test]
	fn test_eof() {
		let mut reader = ByteReader::new(&[0x00, 0x05, b'a']);

		match reader.string() {
			Err(DecodeError::UnexpectedEof { needed: 5, remaining: 1 }) => (),
			other => panic!("expected UnexpectedEof, got {:?}", other)
		}
	}
}
