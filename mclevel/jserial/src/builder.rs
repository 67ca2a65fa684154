//! Writes raw serialization streams by hand. Used to build fixtures for tests.
//!
//! Everything is written in call order, exactly like `ObjectOutputStream` lays it out, so the
//! caller is responsible for writing field values in class descriptor order.

use crate::parser::{tc, BASE_WIRE_HANDLE};
use crate::flags::SC_SERIALIZABLE;
use crate::{STREAM_MAGIC, STREAM_VERSION};

/// A field descriptor: type code, name, and JVM signature for object fields.
pub type Field<'a> = (u8, &'a str, Option<&'a str>);

pub struct StreamBuilder {
	out: Vec<u8>,
	next_handle: u32
}

impl StreamBuilder {
	pub fn new() -> Self {
		let mut out = Vec::new();

		out.extend_from_slice(&STREAM_MAGIC.to_be_bytes());
		out.extend_from_slice(&STREAM_VERSION.to_be_bytes());

		StreamBuilder { out, next_handle: BASE_WIRE_HANDLE }
	}

	pub fn finish(self) -> Vec<u8> {
		self.out
	}

	fn handle(&mut self) -> u32 {
		let handle = self.next_handle;
		self.next_handle += 1;

		handle
	}

	fn utf(&mut self, value: &str) {
		self.out.extend_from_slice(&(value.len() as u16).to_be_bytes());
		self.out.extend_from_slice(value.as_bytes());
	}

	/// Writes a new serializable class descriptor, returning its wire handle.
	pub fn class(&mut self, name: &str, fields: &[Field], super_class: Option<u32>) -> u32 {
		self.class_with_flags(name, SC_SERIALIZABLE, fields, super_class)
	}

	pub fn class_with_flags(&mut self, name: &str, flags: u8, fields: &[Field], super_class: Option<u32>) -> u32 {
		self.out.push(tc::CLASSDESC);
		self.utf(name);
		self.out.extend_from_slice(&0i64.to_be_bytes());

		let handle = self.handle();

		self.out.push(flags);
		self.out.extend_from_slice(&(fields.len() as i16).to_be_bytes());

		for &(type_code, name, signature) in fields {
			self.out.push(type_code);
			self.utf(name);

			if let Some(signature) = signature {
				self.string(signature);
			}
		}

		self.end_block_data();

		match super_class {
			Some(handle) => self.reference(handle),
			None => self.null()
		}

		handle
	}

	/// Starts an object of a previously written class. Field values follow.
	pub fn object(&mut self, class: u32) -> u32 {
		self.out.push(tc::OBJECT);
		self.reference(class);

		self.handle()
	}

	/// Starts an object whose class descriptor is written inline, the way `ObjectOutputStream`
	/// writes the first instance of every class. Returns the class and object handles.
	pub fn object_new_class(&mut self, name: &str, fields: &[Field], super_class: Option<u32>) -> (u32, u32) {
		self.out.push(tc::OBJECT);

		let class = self.class(name, fields, super_class);

		(class, self.handle())
	}

	pub fn string(&mut self, value: &str) -> u32 {
		self.out.push(tc::STRING);

		let handle = self.handle();
		self.utf(value);

		handle
	}

	fn array_header(&mut self, signature: &str, len: usize) -> u32 {
		self.out.push(tc::ARRAY);
		self.class(signature, &[], None);

		let handle = self.handle();
		self.out.extend_from_slice(&(len as i32).to_be_bytes());

		handle
	}

	pub fn byte_array(&mut self, values: &[u8]) -> u32 {
		let handle = self.array_header("[B", values.len());
		self.out.extend_from_slice(values);

		handle
	}

	pub fn int_array(&mut self, values: &[i32]) -> u32 {
		let handle = self.array_header("[I", values.len());

		for value in values {
			self.out.extend_from_slice(&value.to_be_bytes());
		}

		handle
	}

	/// Starts an object array of the given length. The elements follow.
	pub fn object_array(&mut self, len: usize) -> u32 {
		self.array_header("[Ljava.lang.Object;", len)
	}

	pub fn null(&mut self) {
		self.out.push(tc::NULL);
	}

	pub fn reference(&mut self, handle: u32) {
		self.out.push(tc::REFERENCE);
		self.out.extend_from_slice(&handle.to_be_bytes());
	}

	pub fn reset(&mut self) {
		self.out.push(tc::RESET);
		self.next_handle = BASE_WIRE_HANDLE;
	}

	pub fn block_data(&mut self, bytes: &[u8]) {
		self.out.push(tc::BLOCKDATA);
		self.out.push(bytes.len() as u8);
		self.out.extend_from_slice(bytes);
	}

	pub fn end_block_data(&mut self) {
		self.out.push(tc::ENDBLOCKDATA);
	}

	pub fn bool(&mut self, value: bool) {
		self.out.push(value as u8);
	}

	pub fn short(&mut self, value: i16) {
		self.out.extend_from_slice(&value.to_be_bytes());
	}

	pub fn int(&mut self, value: i32) {
		self.out.extend_from_slice(&value.to_be_bytes());
	}

	pub fn long(&mut self, value: i64) {
		self.out.extend_from_slice(&value.to_be_bytes());
	}

	pub fn float(&mut self, value: f32) {
		self.out.extend_from_slice(&value.to_bits().to_be_bytes());
	}
}

impl Default for StreamBuilder {
	fn default() -> Self {
		StreamBuilder::new()
	}
}
