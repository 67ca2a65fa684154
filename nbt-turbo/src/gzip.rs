use deflate::Compression;
use deflate::write::GzEncoder;
use crate::writer::Output;
use std::io::{self, Write};

/// Compresses NBT as it is written. Small writes are batched before they reach the encoder.
///
/// Write errors are held until [`GzipOutput::finish`], since [`Output`] cannot fail.
pub struct GzipOutput {
	buffer: Vec<u8>,
	writer: GzEncoder<Vec<u8>>,
	error: Option<io::Error>
}

impl GzipOutput {
	pub fn new() -> Self {
		Self::with_capacity(4096)
	}

	pub fn with_capacity(capacity: usize) -> Self {
		GzipOutput {
			buffer: Vec::with_capacity(256),
			writer: GzEncoder::new(Vec::with_capacity(capacity), Compression::Default),
			error: None
		}
	}

	fn write_through(&mut self, slice: &[u8]) {
		if self.error.is_some() {
			return;
		}

		if let Err(error) = self.writer.write_all(slice) {
			self.error = Some(error);
		}
	}

	fn flush(&mut self) {
		let buffer = std::mem::replace(&mut self.buffer, Vec::new());

		self.write_through(&buffer);

		self.buffer = buffer;
		self.buffer.clear();
	}

	fn maybe_flush(&mut self) {
		if self.buffer.len() > 255 {
			self.flush();
		}
	}

	/// Flushes the remaining bytes and returns the complete gzip stream.
	pub fn finish(mut self) -> io::Result<Vec<u8>> {
		self.flush();

		if let Some(error) = self.error {
			return Err(error);
		}

		self.writer.finish()
	}
}

impl Default for GzipOutput {
	fn default() -> Self {
		GzipOutput::new()
	}
}

impl Output for GzipOutput {
	fn push(&mut self, byte: u8) {
		self.buffer.push(byte);
		self.maybe_flush();
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		if slice.len() < 128 {
			self.buffer.extend_from_slice(slice);
			self.maybe_flush();
		} else {
			self.flush();
			self.write_through(slice);
		}
	}
}

#[cfg(test)]
mod test {
	use super::GzipOutput;
	use crate::writer::Output;

	#[test]
	fn test_gzip_header_and_trailer() {
		let mut output = GzipOutput::new();
		let payload: Vec<u8> = (0..1000u32).map(|value| (value % 7) as u8).collect();

		output.extend_from_slice(&payload[..10]);
		output.extend_from_slice(&payload[10..]);

		let compressed = output.finish().unwrap();
		let len = compressed.len();

		assert_eq!(&compressed[..2], &[0x1F, 0x8B]);

		let trailer = [compressed[len - 4], compressed[len - 3], compressed[len - 2], compressed[len - 1]];
		assert_eq!(u32::from_le_bytes(trailer), 1000);
	}
}
