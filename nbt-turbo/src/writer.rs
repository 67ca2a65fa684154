use crate::tag::{Compound, List, NamedCompound, Tag};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Kind {
	End,
	I8,
	I16,
	I32,
	I64,
	F32,
	F64,
	U8Array,
	String,
	List,
	Compound,
	U32Array,
	I64Array
}

/// Strings are prefixed by their length in bytes as a u16.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Cuts a string down to the longest prefix that fits in a tag, on a character boundary.
pub fn clamp_string(value: &str) -> &str {
	if value.len() <= MAX_STRING_LEN {
		return value;
	}

	let mut end = MAX_STRING_LEN;

	while !value.is_char_boundary(end) {
		end -= 1;
	}

	&value[..end]
}

pub trait Output {
	fn push(&mut self, value: u8);
	fn extend_from_slice(&mut self, slice: &[u8]);
}

impl<T> Output for &mut T where T: Output + ?Sized {
	fn push(&mut self, value: u8) {
		T::push(self, value)
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		T::extend_from_slice(self, slice);
	}
}

impl Output for Vec<u8> {
	fn push(&mut self, value: u8) {
		Vec::push(self, value)
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		Vec::extend_from_slice(self, slice)
	}
}

pub struct CompoundWriter<T: Output> {
	out: T
}

impl<T: Output> CompoundWriter<T> {
	/// Begins a new compound tag.
	pub fn start(name: &str, out: T) -> Self {
		let mut writer = CompoundWriter { out };

		writer.header(Kind::Compound, name);
		writer
	}

	pub fn write<F>(name: &str, out: T, filler: F) -> T where F: FnOnce(&mut CompoundWriter<T>) {
		let mut writer = CompoundWriter::start(name, out);

		filler(&mut writer);

		writer.end()
	}

	/// Writes a complete tree as the root compound.
	pub fn write_named(root: &NamedCompound, out: T) -> T {
		CompoundWriter::write(&root.name, out, |writer| {
			writer.entries(&root.compound);
		})
	}

	/// Ends the compound tag, returning the buffer.
	pub fn end(mut self) -> T {
		self.out.push(0);
		self.out
	}

	fn header(&mut self, kind: Kind, name: &str) {
		self.out.push(kind as u8);

		assert!(name.len() <= MAX_STRING_LEN, "Tag name too long: {} bytes", name.len());
		self.out.extend_from_slice(&u16::to_be_bytes(name.len() as u16));
		self.out.extend_from_slice(name.as_bytes());
	}

	pub fn bool(&mut self, name: &str, value: bool) -> &mut Self {
		self.i8(name, value as i8)
	}

	pub fn i8(&mut self, name: &str, value: i8) -> &mut Self {
		self.header(Kind::I8, name);
		self.out.push(value as u8);

		self
	}

	pub fn i16(&mut self, name: &str, value: i16) -> &mut Self {
		self.header(Kind::I16, name);
		self.out.extend_from_slice(&value.to_be_bytes());

		self
	}

	pub fn i32(&mut self, name: &str, value: i32) -> &mut Self {
		self.header(Kind::I32, name);
		self.out.extend_from_slice(&value.to_be_bytes());

		self
	}

	pub fn i64(&mut self, name: &str, value: i64) -> &mut Self {
		self.header(Kind::I64, name);
		self.out.extend_from_slice(&value.to_be_bytes());

		self
	}

	pub fn f32(&mut self, name: &str, value: f32) -> &mut Self {
		self.header(Kind::F32, name);
		self.out.extend_from_slice(&value.to_bits().to_be_bytes());

		self
	}

	pub fn f64(&mut self, name: &str, value: f64) -> &mut Self {
		self.header(Kind::F64, name);
		self.out.extend_from_slice(&value.to_bits().to_be_bytes());

		self
	}

	pub fn string(&mut self, name: &str, value: &str) -> &mut Self {
		self.header(Kind::String, name);
		string_payload(&mut self.out, value);

		self
	}

	pub fn u8_array(&mut self, name: &str, value: &[u8]) -> &mut Self {
		self.header(Kind::U8Array, name);
		array_length(&mut self.out, value.len());

		self.out.extend_from_slice(value);

		self
	}

	pub fn u32_array(&mut self, name: &str, value: &[u32]) -> &mut Self {
		self.header(Kind::U32Array, name);
		array_length(&mut self.out, value.len());

		for &entry in value {
			self.out.extend_from_slice(&entry.to_be_bytes());
		}

		self
	}

	pub fn compound<F>(&mut self, name: &str, filler: F) where F: FnOnce(&mut CompoundWriter<&mut T>) {
		let mut writer = CompoundWriter::start(name, &mut self.out);

		filler(&mut writer);

		writer.end();
	}

	/// Writes every entry of a compound tree into this compound, in insertion order.
	pub fn entries(&mut self, compound: &Compound) -> &mut Self {
		for (name, tag) in compound.iter() {
			self.tag(name, tag);
		}

		self
	}

	pub fn tag(&mut self, name: &str, tag: &Tag) -> &mut Self {
		match tag {
			Tag::I8(value) => self.i8(name, *value),
			Tag::I16(value) => self.i16(name, *value),
			Tag::I32(value) => self.i32(name, *value),
			Tag::I64(value) => self.i64(name, *value),
			Tag::F32(value) => self.f32(name, *value),
			Tag::F64(value) => self.f64(name, *value),
			Tag::U8Array(value) => self.u8_array(name, value),
			Tag::String(value) => self.string(name, value),
			Tag::U32Array(value) => self.u32_array(name, value),
			Tag::List(list) => self.list(name, list),
			Tag::Compound(compound) => {
				self.header(Kind::Compound, name);
				compound_payload(&mut self.out, compound);

				self
			}
		}
	}

	/// Writes a list. Empty lists are written as `End` with a length of 0, no matter the variant.
	pub fn list(&mut self, name: &str, list: &List) -> &mut Self {
		self.header(Kind::List, name);
		list_payload(&mut self.out, list);

		self
	}
}

// Nested trees go through a trait object, otherwise every level of nesting would instantiate
// another CompoundWriter<&mut &mut ... T>.

fn compound_payload(out: &mut dyn Output, compound: &Compound) {
	let mut writer = CompoundWriter { out };

	writer.entries(compound);
	writer.end();
}

fn string_payload(out: &mut dyn Output, value: &str) {
	assert!(value.len() <= MAX_STRING_LEN, "Tag string value too long: {} bytes", value.len());
	out.extend_from_slice(&u16::to_be_bytes(value.len() as u16));
	out.extend_from_slice(value.as_bytes());
}

fn array_length(out: &mut dyn Output, len: usize) {
	assert!(len <= std::i32::MAX as usize, "Array too long: {} (maximum length: {})", len, std::i32::MAX);

	out.extend_from_slice(&u32::to_be_bytes(len as u32));
}

fn list_payload(out: &mut dyn Output, list: &List) {
	out.push(list.element_kind() as u8);
	array_length(out, list.len());

	match list {
		List::End => (),
		List::I8(values) => for &value in values {
			out.push(value as u8);
		},
		List::I16(values) => for value in values {
			out.extend_from_slice(&value.to_be_bytes());
		},
		List::I32(values) => for value in values {
			out.extend_from_slice(&value.to_be_bytes());
		},
		List::I64(values) => for value in values {
			out.extend_from_slice(&value.to_be_bytes());
		},
		List::F32(values) => for value in values {
			out.extend_from_slice(&value.to_bits().to_be_bytes());
		},
		List::F64(values) => for value in values {
			out.extend_from_slice(&value.to_bits().to_be_bytes());
		},
		List::String(values) => for value in values {
			string_payload(out, value);
		},
		List::Compound(values) => for compound in values {
			compound_payload(out, compound);
		}
	}
}
