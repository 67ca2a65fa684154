use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
	#[error("unexpected end of data: needed {needed} byte(s), {remaining} remaining")]
	UnexpectedEof { needed: usize, remaining: usize },

	#[error("not a valid pre-classic save: expected 4194304 bytes, got {0}")]
	InvalidPreClassicSize(usize),

	#[error("not a valid pre-classic save: block ID {id} at index {index} is greater than 49")]
	InvalidPreClassicBlockId { index: usize, id: u8 },

	#[error("not a supported classic format version: got {0}, expected 1 or 2")]
	UnsupportedVersion(u8),

	#[error("invalid world dimensions {width}x{length}x{height}")]
	InvalidDimensions { width: usize, length: usize, height: usize },

	#[error("block array has {actual} entries, but the dimensions require {expected}")]
	BlockArraySizeMismatch { expected: usize, actual: usize },

	#[error(transparent)]
	Parser(Box<dyn std::error::Error + Send + Sync>)
}
