use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("not a serialization stream: bad magic {0:#06x}")]
	BadMagic(u16),

	#[error("unsupported serialization stream version {0}")]
	UnsupportedVersion(u16),

	#[error("unexpected end of serialization stream")]
	UnexpectedEof,

	#[error("unknown type code {code:#04x} at offset {offset}")]
	UnknownTypeCode { code: u8, offset: u64 },

	#[error("reference to unknown handle {0:#x}")]
	DanglingReference(u32),

	#[error("negative length {0}")]
	NegativeLength(i64),

	#[error("expected {expected} at offset {offset}")]
	Unexpected { expected: &'static str, offset: u64 },

	#[error("unsupported stream content: {0}")]
	Unsupported(&'static str),

	#[error("object graph nested deeper than {0} levels")]
	TooDeep(usize)
}

// The parser only ever reads from an in-memory cursor, where the only possible failure is
// running out of bytes.
impl From<io::Error> for Error {
	fn from(_: io::Error) -> Self {
		Error::UnexpectedEof
	}
}
