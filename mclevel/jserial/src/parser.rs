use std::io::Cursor;
use byteorder::{BigEndian, ReadBytesExt};
use log::debug;

use crate::error::Error;
use crate::flags::{SC_BLOCK_DATA, SC_EXTERNALIZABLE, SC_SERIALIZABLE, SC_WRITE_METHOD};
use crate::{Annotation, Array, ClassData, ClassDesc, Content, FieldDesc, Handle, Object, Stream, Value, STREAM_MAGIC, STREAM_VERSION};

pub(crate) const BASE_WIRE_HANDLE: u32 = 0x7E_0000;
const MAX_DEPTH: usize = 1024;

pub(crate) mod tc {
	pub const NULL: u8 = 0x70;
	pub const REFERENCE: u8 = 0x71;
	pub const CLASSDESC: u8 = 0x72;
	pub const OBJECT: u8 = 0x73;
	pub const STRING: u8 = 0x74;
	pub const ARRAY: u8 = 0x75;
	pub const CLASS: u8 = 0x76;
	pub const BLOCKDATA: u8 = 0x77;
	pub const ENDBLOCKDATA: u8 = 0x78;
	pub const RESET: u8 = 0x79;
	pub const BLOCKDATALONG: u8 = 0x7A;
	pub const EXCEPTION: u8 = 0x7B;
	pub const LONGSTRING: u8 = 0x7C;
	pub const PROXYCLASSDESC: u8 = 0x7D;
	pub const ENUM: u8 = 0x7E;
}

pub(crate) struct Parser<'a> {
	input: Cursor<&'a [u8]>,
	entries: Vec<Content>,
	/// Maps wire handles (minus the base) to arena entries. Cleared by `TC_RESET`.
	wire: Vec<usize>,
	depth: usize
}

impl<'a> Parser<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		Parser {
			input: Cursor::new(bytes),
			entries: Vec::new(),
			wire: Vec::new(),
			depth: 0
		}
	}

	pub fn parse(mut self) -> Result<Stream, Error> {
		let magic = self.input.read_u16::<BigEndian>()?;
		if magic != STREAM_MAGIC {
			return Err(Error::BadMagic(magic));
		}

		let version = self.input.read_u16::<BigEndian>()?;
		if version != STREAM_VERSION {
			return Err(Error::UnsupportedVersion(version));
		}

		let mut roots = Vec::new();

		while let Some(code) = self.peek() {
			match code {
				tc::BLOCKDATA | tc::BLOCKDATALONG => {
					self.block_data()?;
				},
				_ => roots.push(self.content()?)
			}
		}

		debug!("Parsed serialization stream: {} root value(s), {} entries", roots.len(), self.entries.len());

		Ok(Stream { entries: self.entries, roots })
	}

	fn offset(&self) -> u64 {
		self.input.position()
	}

	fn peek(&self) -> Option<u8> {
		let position = self.input.position() as usize;

		self.input.get_ref().get(position).copied()
	}

	fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
		let bytes: &'a [u8] = *self.input.get_ref();
		let start = self.input.position() as usize;

		let end = start.checked_add(len).ok_or(Error::UnexpectedEof)?;
		let slice = bytes.get(start..end).ok_or(Error::UnexpectedEof)?;

		self.input.set_position(end as u64);

		Ok(slice)
	}

	fn length(&mut self) -> Result<usize, Error> {
		let len = self.input.read_i32::<BigEndian>()?;

		if len < 0 {
			return Err(Error::NegativeLength(len as i64));
		}

		Ok(len as usize)
	}

	fn utf(&mut self) -> Result<String, Error> {
		let len = self.input.read_u16::<BigEndian>()? as usize;

		Ok(decode_modified_utf8(self.take(len)?))
	}

	fn long_utf(&mut self) -> Result<String, Error> {
		let len = self.input.read_i64::<BigEndian>()?;

		if len < 0 {
			return Err(Error::NegativeLength(len));
		}

		Ok(decode_modified_utf8(self.take(len as usize)?))
	}

	/// Reserves the next wire handle for an entry that is about to be read.
	fn new_handle(&mut self) -> Handle {
		let index = self.entries.len();

		self.entries.push(Content::Pending);
		self.wire.push(index);

		Handle(index)
	}

	fn fill(&mut self, handle: Handle, content: Content) {
		self.entries[handle.0] = content;
	}

	fn reference(&mut self) -> Result<Handle, Error> {
		let wire = self.input.read_u32::<BigEndian>()?;

		wire.checked_sub(BASE_WIRE_HANDLE)
			.and_then(|offset| self.wire.get(offset as usize))
			.map(|&index| Handle(index))
			.ok_or(Error::DanglingReference(wire))
	}

	fn block_data(&mut self) -> Result<Vec<u8>, Error> {
		let len = match self.input.read_u8()? {
			tc::BLOCKDATA => self.input.read_u8()? as usize,
			_ => self.length()?
		};

		Ok(self.take(len)?.to_vec())
	}

	/// Reads annotation contents up to and including the terminating `TC_ENDBLOCKDATA`.
	fn annotations(&mut self) -> Result<Vec<Annotation>, Error> {
		let mut annotations = Vec::new();

		loop {
			match self.peek() {
				Some(tc::ENDBLOCKDATA) => {
					self.input.set_position(self.input.position() + 1);

					return Ok(annotations);
				},
				Some(tc::BLOCKDATA) | Some(tc::BLOCKDATALONG) => annotations.push(Annotation::Block(self.block_data()?)),
				Some(_) => annotations.push(Annotation::Value(self.content()?)),
				None => return Err(Error::UnexpectedEof)
			}
		}
	}

	/// Reads one content element: an object, string, array, class, enum, class descriptor,
	/// null, or reference.
	fn content(&mut self) -> Result<Value, Error> {
		self.depth += 1;

		if self.depth > MAX_DEPTH {
			return Err(Error::TooDeep(MAX_DEPTH));
		}

		let value = self.content_inner();

		self.depth -= 1;

		value
	}

	fn content_inner(&mut self) -> Result<Value, Error> {
		let offset = self.offset();
		let code = self.input.read_u8()?;

		let handle = match code {
			tc::NULL => return Ok(Value::Null),
			tc::REFERENCE => self.reference()?,
			tc::OBJECT => self.object()?,
			tc::STRING => {
				let handle = self.new_handle();
				let string = self.utf()?;

				self.fill(handle, Content::String(string));
				handle
			},
			tc::LONGSTRING => {
				let handle = self.new_handle();
				let string = self.long_utf()?;

				self.fill(handle, Content::String(string));
				handle
			},
			tc::ARRAY => self.array()?,
			tc::CLASS => {
				let class = self.class_desc()?.ok_or(Error::Unexpected { expected: "class descriptor", offset })?;
				let handle = self.new_handle();

				self.fill(handle, Content::Class(class));
				handle
			},
			tc::ENUM => self.enumeration()?,
			tc::CLASSDESC => self.new_class_desc()?,
			tc::PROXYCLASSDESC => self.new_proxy_class_desc()?,
			tc::RESET => {
				self.wire.clear();

				return self.content_inner();
			},
			tc::EXCEPTION => return Err(Error::Unsupported("exception written in place of an object")),
			code => return Err(Error::UnknownTypeCode { code, offset })
		};

		Ok(Value::Ref(handle))
	}

	fn class_desc(&mut self) -> Result<Option<Handle>, Error> {
		let offset = self.offset();

		match self.input.read_u8()? {
			tc::NULL => Ok(None),
			tc::REFERENCE => self.reference().map(Some),
			tc::CLASSDESC => self.new_class_desc().map(Some),
			tc::PROXYCLASSDESC => self.new_proxy_class_desc().map(Some),
			tc::RESET => {
				self.wire.clear();

				self.class_desc()
			},
			code => Err(Error::UnknownTypeCode { code, offset })
		}
	}

	fn new_class_desc(&mut self) -> Result<Handle, Error> {
		let name = self.utf()?;
		let serial_version_uid = self.input.read_i64::<BigEndian>()?;
		let handle = self.new_handle();

		let flags = self.input.read_u8()?;
		let field_count = self.input.read_i16::<BigEndian>()?;

		if field_count < 0 {
			return Err(Error::NegativeLength(field_count as i64));
		}

		let mut fields = Vec::with_capacity(field_count as usize);

		for _ in 0..field_count {
			let type_code = self.input.read_u8()?;
			let name = self.utf()?;

			let class_name = match type_code {
				b'L' | b'[' => {
					let offset = self.offset();
					let value = self.content()?;

					let signature = value.as_handle()
						.and_then(|handle| match &self.entries[handle.0] {
							Content::String(signature) => Some(signature.clone()),
							_ => None
						})
						.ok_or(Error::Unexpected { expected: "field type signature", offset })?;

					Some(signature)
				},
				b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => None,
				code => return Err(Error::UnknownTypeCode { code, offset: self.offset() })
			};

			fields.push(FieldDesc { type_code, name, class_name });
		}

		let annotations = self.annotations()?;
		let super_class = self.class_desc()?;

		self.fill(handle, Content::ClassDesc(ClassDesc {
			name,
			serial_version_uid,
			flags,
			fields,
			annotations,
			super_class
		}));

		Ok(handle)
	}

	/// Proxy classes have no fields of their own, so they are recorded as an empty descriptor.
	fn new_proxy_class_desc(&mut self) -> Result<Handle, Error> {
		let handle = self.new_handle();
		let count = self.length()?;

		let mut interfaces = Vec::with_capacity(count.min(64));

		for _ in 0..count {
			interfaces.push(self.utf()?);
		}

		let annotations = self.annotations()?;
		let super_class = self.class_desc()?;

		self.fill(handle, Content::ClassDesc(ClassDesc {
			name: format!("$Proxy({})", interfaces.join(", ")),
			serial_version_uid: 0,
			flags: SC_SERIALIZABLE,
			fields: Vec::new(),
			annotations,
			super_class
		}));

		Ok(handle)
	}

	/// Lists the class hierarchy of a descriptor, topmost superclass first.
	fn hierarchy(&self, class: Handle) -> Result<Vec<Handle>, Error> {
		let mut chain = Vec::new();
		let mut current = Some(class);

		while let Some(handle) = current {
			if chain.contains(&handle) {
				return Err(Error::Unsupported("cyclic class hierarchy"));
			}

			chain.push(handle);

			current = match &self.entries[handle.0] {
				Content::ClassDesc(desc) => desc.super_class,
				_ => return Err(Error::Unsupported("class hierarchy still being read"))
			};
		}

		chain.reverse();

		Ok(chain)
	}

	fn object(&mut self) -> Result<Handle, Error> {
		let offset = self.offset();
		let class = self.class_desc()?.ok_or(Error::Unexpected { expected: "class descriptor", offset })?;
		let handle = self.new_handle();

		let mut data = Vec::new();

		for level in self.hierarchy(class)? {
			let (flags, fields) = match &self.entries[level.0] {
				Content::ClassDesc(desc) => (desc.flags, desc.fields.clone()),
				_ => unreachable!("hierarchy only contains class descriptors")
			};

			let mut values = Vec::with_capacity(fields.len());
			let mut annotations = Vec::new();

			if flags & SC_EXTERNALIZABLE != 0 {
				if flags & SC_BLOCK_DATA == 0 {
					return Err(Error::Unsupported("externalizable object written with protocol version 1"));
				}

				annotations = self.annotations()?;
			} else if flags & SC_SERIALIZABLE != 0 {
				for field in &fields {
					values.push((field.name.clone(), self.field_value(field.type_code)?));
				}

				if flags & SC_WRITE_METHOD != 0 {
					annotations = self.annotations()?;
				}
			}

			data.push(ClassData { class: level, values, annotations });
		}

		self.fill(handle, Content::Object(Object { class, data }));

		Ok(handle)
	}

	fn field_value(&mut self, type_code: u8) -> Result<Value, Error> {
		Ok(match type_code {
			b'B' => Value::Byte(self.input.read_i8()?),
			b'C' => Value::Char(self.input.read_u16::<BigEndian>()?),
			b'D' => Value::Double(self.input.read_f64::<BigEndian>()?),
			b'F' => Value::Float(self.input.read_f32::<BigEndian>()?),
			b'I' => Value::Int(self.input.read_i32::<BigEndian>()?),
			b'J' => Value::Long(self.input.read_i64::<BigEndian>()?),
			b'S' => Value::Short(self.input.read_i16::<BigEndian>()?),
			b'Z' => Value::Bool(self.input.read_u8()? != 0),
			_ => self.content()?
		})
	}

	fn array(&mut self) -> Result<Handle, Error> {
		let offset = self.offset();
		let class = self.class_desc()?.ok_or(Error::Unexpected { expected: "array class descriptor", offset })?;
		let handle = self.new_handle();
		let len = self.length()?;

		let element = match &self.entries[class.0] {
			Content::ClassDesc(desc) => desc.name.as_bytes().get(1).copied(),
			_ => None
		}.ok_or(Error::Unexpected { expected: "array class name", offset })?;

		// Never trust the declared length for preallocation, a corrupt stream would otherwise
		// request an enormous buffer before failing.
		let remaining = self.input.get_ref().len().saturating_sub(self.input.position() as usize);
		let capacity = len.min(remaining);

		let elements = match element {
			b'B' => Array::Byte(self.take(len)?.to_vec()),
			b'Z' => Array::Bool(self.take(len)?.iter().map(|&byte| byte != 0).collect()),
			b'C' => Array::Char(self.repeat(len, capacity / 2, |parser| parser.input.read_u16::<BigEndian>())?),
			b'S' => Array::Short(self.repeat(len, capacity / 2, |parser| parser.input.read_i16::<BigEndian>())?),
			b'I' => Array::Int(self.repeat(len, capacity / 4, |parser| parser.input.read_i32::<BigEndian>())?),
			b'F' => Array::Float(self.repeat(len, capacity / 4, |parser| parser.input.read_f32::<BigEndian>())?),
			b'J' => Array::Long(self.repeat(len, capacity / 8, |parser| parser.input.read_i64::<BigEndian>())?),
			b'D' => Array::Double(self.repeat(len, capacity / 8, |parser| parser.input.read_f64::<BigEndian>())?),
			b'L' | b'[' => {
				let mut values = Vec::with_capacity(capacity.min(4096));

				for _ in 0..len {
					values.push(self.content()?);
				}

				Array::Value(values)
			},
			code => return Err(Error::UnknownTypeCode { code, offset })
		};

		self.fill(handle, Content::Array { class, elements });

		Ok(handle)
	}

	fn repeat<T, E, F>(&mut self, len: usize, capacity: usize, mut read: F) -> Result<Vec<T>, Error>
		where F: FnMut(&mut Self) -> Result<T, E>, Error: From<E> {

		let mut values = Vec::with_capacity(capacity);

		for _ in 0..len {
			values.push(read(self)?);
		}

		Ok(values)
	}

	fn enumeration(&mut self) -> Result<Handle, Error> {
		let offset = self.offset();
		let class = self.class_desc()?.ok_or(Error::Unexpected { expected: "enum class descriptor", offset })?;
		let handle = self.new_handle();

		let offset = self.offset();
		let name = self.content()?;

		let constant = name.as_handle()
			.and_then(|name| match &self.entries[name.0] {
				Content::String(constant) => Some(constant.clone()),
				_ => None
			})
			.ok_or(Error::Unexpected { expected: "enum constant name", offset })?;

		self.fill(handle, Content::Enum { class, constant });

		Ok(handle)
	}
}

/// Decodes Java's modified UTF-8. The two-byte null and surrogate pairs are handled through
/// UTF-16 so that strings from any JVM round trip.
fn decode_modified_utf8(bytes: &[u8]) -> String {
	let mut units = Vec::with_capacity(bytes.len());
	let mut index = 0;

	while index < bytes.len() {
		let first = bytes[index] as u16;

		let (unit, width) = if first & 0x80 == 0 {
			(first, 1)
		} else if first & 0xE0 == 0xC0 && index + 1 < bytes.len() {
			(((first & 0x1F) << 6) | (bytes[index + 1] as u16 & 0x3F), 2)
		} else if first & 0xF0 == 0xE0 && index + 2 < bytes.len() {
			(((first & 0x0F) << 12) | ((bytes[index + 1] as u16 & 0x3F) << 6) | (bytes[index + 2] as u16 & 0x3F), 3)
		} else {
			(0xFFFD, 1)
		};

		units.push(unit);
		index += width;
	}

	String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod test {
	use crate::builder::StreamBuilder;
	use crate::{Array, Content, Error, Stream, Value};

	#[test]
	fn test_bad_magic() {
		match Stream::parse(&[0xCA, 0xFE, 0x00, 0x05]) {
			Err(Error::BadMagic(0xCAFE)) => (),
			other => panic!("expected BadMagic, got {:?}", other)
		}
	}

	#[test]
	fn test_truncated() {
		let mut builder = StreamBuilder::new();
		builder.string("hello");

		let mut bytes = builder.finish();
		bytes.truncate(bytes.len() - 2);

		match Stream::parse(&bytes) {
			Err(Error::UnexpectedEof) => (),
			other => panic!("expected UnexpectedEof, got {:?}", other)
		}
	}

	#[test]
	fn test_object_fields_and_references() {
		let mut builder = StreamBuilder::new();

		let base = builder.class("Base", &[(b'I', "width", None)], None);
		let derived = builder.class("Derived", &[(b'F', "x", None), (b'L', "name", Some("Ljava/lang/String;"))], Some(base));

		let object = builder.object(derived);
		builder.int(16);
		builder.float(2.5);
		let name = builder.string("level");

		builder.object(derived);
		builder.int(32);
		builder.float(-1.0);
		builder.reference(name);

		builder.reference(object);

		let stream = Stream::parse(&builder.finish()).unwrap();
		let roots = stream.roots();

		// two class descriptors, two objects, one trailing reference
		assert_eq!(roots.len(), 5);

		let first = stream.object(&roots[2]).unwrap();
		assert_eq!(stream.class_name(first), Some("Derived"));
		assert_eq!(first.field("width"), Some(&Value::Int(16)));
		assert_eq!(first.field("x"), Some(&Value::Float(2.5)));
		assert_eq!(stream.string(first.field("name").unwrap()), Some("level"));

		let second = stream.object(&roots[3]).unwrap();
		assert_eq!(second.field("width"), Some(&Value::Int(32)));
		assert_eq!(stream.string(second.field("name").unwrap()), Some("level"));

		assert_eq!(roots[4], roots[2]);
	}

	#[test]
	fn test_inline_class_descriptors() {
		let mut builder = StreamBuilder::new();

		let (class, _) = builder.object_new_class("Level", &[(b'I', "width", None), (b'L', "child", Some("LLevel;"))], None);
		builder.int(4);

		let (_, child) = builder.object_new_class("Child", &[(b'S', "depth", None)], None);
		builder.short(2);

		builder.object(class);
		builder.int(8);
		builder.reference(child);

		let stream = Stream::parse(&builder.finish()).unwrap();
		let roots = stream.roots();

		assert_eq!(roots.len(), 2);

		let first = stream.object(&roots[0]).unwrap();
		assert_eq!(stream.class_name(first), Some("Level"));
		assert_eq!(first.field("width"), Some(&Value::Int(4)));

		let nested = stream.object(first.field("child").unwrap()).unwrap();
		assert_eq!(stream.class_name(nested), Some("Child"));
		assert_eq!(nested.field("depth"), Some(&Value::Short(2)));

		let second = stream.object(&roots[1]).unwrap();
		assert_eq!(second.class, first.class);
		assert_eq!(second.field("width"), Some(&Value::Int(8)));
		assert_eq!(second.field("child"), first.field("child"));
	}

	#[test]
	fn test_primitive_and_object_arrays() {
		let mut builder = StreamBuilder::new();

		builder.byte_array(&[1, 2, 3]);
		builder.int_array(&[-1, 7]);
		builder.object_array(2);
		builder.string("a");
		builder.null();

		let stream = Stream::parse(&builder.finish()).unwrap();
		let roots = stream.roots();

		assert_eq!(stream.array(&roots[0]), Some(&Array::Byte(vec![1, 2, 3])));
		assert_eq!(stream.array(&roots[1]), Some(&Array::Int(vec![-1, 7])));

		match stream.array(&roots[2]) {
			Some(Array::Value(values)) => {
				assert_eq!(stream.string(&values[0]), Some("a"));
				assert_eq!(values[1], Value::Null);
			},
			other => panic!("expected an object array, got {:?}", other)
		}
	}

	#[test]
	fn test_write_method_annotations() {
		let mut builder = StreamBuilder::new();

		let list = builder.class_with_flags("java.util.ArrayList", 0x03, &[(b'I', "size", None)], None);

		builder.object(list);
		builder.int(1);
		builder.block_data(&[0, 0, 0, 1]);
		builder.string("element");
		builder.end_block_data();

		let stream = Stream::parse(&builder.finish()).unwrap();
		let object = stream.object(&stream.roots()[1]).unwrap();

		let children = stream.children(&stream.roots()[1]);

		assert_eq!(object.annotations().count(), 2);
		assert_eq!(children.len(), 2);
		assert_eq!(stream.string(children[1]), Some("element"));
	}

	#[test]
	fn test_reset_clears_wire_handles() {
		let mut builder = StreamBuilder::new();

		let string = builder.string("before");
		builder.reset();
		builder.reference(string);

		match Stream::parse(&builder.finish()) {
			Err(Error::DanglingReference(_)) => (),
			other => panic!("expected DanglingReference, got {:?}", other)
		}
	}

	#[test]
	fn test_modified_utf8_null() {
		assert_eq!(super::decode_modified_utf8(&[b'a', 0xC0, 0x80, b'b']), "a\u{0}b");
	}

	#[test]
	fn test_pending_never_escapes() {
		let mut builder = StreamBuilder::new();
		let class = builder.class("Node", &[(b'L', "next", Some("LNode;"))], None);

		let node = builder.object(class);
		builder.reference(node);

		let stream = Stream::parse(&builder.finish()).unwrap();
		let handle = stream.roots()[1].as_handle().unwrap();

		match stream.content(handle) {
			Some(Content::Object(object)) => assert_eq!(object.field("next"), Some(&stream.roots()[1])),
			other => panic!("expected an object, got {:?}", other)
		}
	}
}
