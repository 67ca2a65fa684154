//! Reader for the Java object serialization stream protocol (`java.io.ObjectOutputStream`).
//!
//! The whole stream is read into an arena of [`Content`] entries. Values that refer to other
//! entries carry a [`Handle`] into that arena, so shared and cyclic object graphs are preserved
//! without any reference counting.

extern crate byteorder;
extern crate log;
extern crate thiserror;

mod error;
mod parser;

#[cfg(any(test, feature = "builder"))]
pub mod builder;

pub use error::Error;

pub const STREAM_MAGIC: u16 = 0xACED;
pub const STREAM_VERSION: u16 = 5;

/// Class descriptor flags.
pub mod flags {
	pub const SC_WRITE_METHOD: u8 = 0x01;
	pub const SC_SERIALIZABLE: u8 = 0x02;
	pub const SC_EXTERNALIZABLE: u8 = 0x04;
	pub const SC_BLOCK_DATA: u8 = 0x08;
	pub const SC_ENUM: u8 = 0x10;
}

/// Index into the arena of a [`Stream`]. Unlike wire handles these survive `TC_RESET`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Handle(pub(crate) usize);

impl Handle {
	pub fn index(self) -> usize {
		self.0
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Byte(i8),
	Char(u16),
	Short(i16),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	Ref(Handle)
}

impl Value {
	/// Reads any integral value as an i32, widening or truncating like a Java cast.
	pub fn as_i32(&self) -> Option<i32> {
		match *self {
			Value::Byte(value) => Some(value as i32),
			Value::Char(value) => Some(value as i32),
			Value::Short(value) => Some(value as i32),
			Value::Int(value) => Some(value),
			Value::Long(value) => Some(value as i32),
			_ => None
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match *self {
			Value::Long(value) => Some(value),
			_ => self.as_i32().map(|value| value as i64)
		}
	}

	pub fn as_f32(&self) -> Option<f32> {
		match *self {
			Value::Float(value) => Some(value),
			Value::Double(value) => Some(value as f32),
			_ => self.as_i32().map(|value| value as f32)
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match *self {
			Value::Bool(value) => Some(value),
			_ => None
		}
	}

	pub fn as_handle(&self) -> Option<Handle> {
		match *self {
			Value::Ref(handle) => Some(handle),
			_ => None
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDesc {
	/// The primitive type code (`B`, `C`, `D`, `F`, `I`, `J`, `S`, `Z`) or `L` / `[` for objects.
	pub type_code: u8,
	pub name: String,
	/// JVM type signature of object fields, such as `Ljava/lang/String;`.
	pub class_name: Option<String>
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDesc {
	pub name: String,
	pub serial_version_uid: i64,
	pub flags: u8,
	pub fields: Vec<FieldDesc>,
	pub annotations: Vec<Annotation>,
	pub super_class: Option<Handle>
}

impl ClassDesc {
	pub fn has_flag(&self, flag: u8) -> bool {
		self.flags & flag != 0
	}
}

/// Extra data written by custom `writeObject` / `writeExternal` methods and class annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
	Block(Vec<u8>),
	Value(Value)
}

/// Field values contributed by one class in an object's hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassData {
	pub class: Handle,
	pub values: Vec<(String, Value)>,
	pub annotations: Vec<Annotation>
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
	pub class: Handle,
	/// Ordered from the topmost serializable superclass down to the object's own class.
	pub data: Vec<ClassData>
}

impl Object {
	/// Looks up a field by name. Fields declared by subclasses shadow those of superclasses.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.data.iter().rev()
			.flat_map(|data| data.values.iter())
			.find(|(field, _)| field == name)
			.map(|(_, value)| value)
	}

	pub fn annotations(&self) -> impl Iterator<Item=&Annotation> {
		self.data.iter().flat_map(|data| data.annotations.iter())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Array {
	Bool(Vec<bool>),
	Byte(Vec<u8>),
	Char(Vec<u16>),
	Short(Vec<i16>),
	Int(Vec<i32>),
	Long(Vec<i64>),
	Float(Vec<f32>),
	Double(Vec<f64>),
	Value(Vec<Value>)
}

impl Array {
	pub fn len(&self) -> usize {
		match self {
			Array::Bool(values) => values.len(),
			Array::Byte(values) => values.len(),
			Array::Char(values) => values.len(),
			Array::Short(values) => values.len(),
			Array::Int(values) => values.len(),
			Array::Long(values) => values.len(),
			Array::Float(values) => values.len(),
			Array::Double(values) => values.len(),
			Array::Value(values) => values.len()
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
	ClassDesc(ClassDesc),
	Object(Object),
	Array { class: Handle, elements: Array },
	String(String),
	Enum { class: Handle, constant: String },
	Class(Handle),
	/// Placeholder for an entry whose contents are still being read.
	Pending
}

/// A fully parsed serialization stream.
#[derive(Debug, Clone)]
pub struct Stream {
	entries: Vec<Content>,
	roots: Vec<Value>
}

impl Stream {
	pub fn parse(bytes: &[u8]) -> Result<Stream, Error> {
		parser::Parser::new(bytes).parse()
	}

	/// Top level values in the order they were written.
	pub fn roots(&self) -> &[Value] {
		&self.roots
	}

	pub fn content(&self, handle: Handle) -> Option<&Content> {
		self.entries.get(handle.0)
	}

	pub fn object(&self, value: &Value) -> Option<&Object> {
		match self.content(value.as_handle()?)? {
			Content::Object(object) => Some(object),
			_ => None
		}
	}

	pub fn string(&self, value: &Value) -> Option<&str> {
		match self.content(value.as_handle()?)? {
			Content::String(string) => Some(string),
			_ => None
		}
	}

	pub fn array(&self, value: &Value) -> Option<&Array> {
		match self.content(value.as_handle()?)? {
			Content::Array { elements, .. } => Some(elements),
			_ => None
		}
	}

	pub fn class_desc(&self, handle: Handle) -> Option<&ClassDesc> {
		match self.content(handle)? {
			Content::ClassDesc(desc) => Some(desc),
			_ => None
		}
	}

	pub fn class_name(&self, object: &Object) -> Option<&str> {
		self.class_desc(object.class).map(|desc| desc.name.as_str())
	}

	/// Every value directly referenced by the entry behind `value`: object fields and
	/// annotations, or the elements of an object array.
	pub fn children<'s>(&'s self, value: &Value) -> Vec<&'s Value> {
		let handle = match value.as_handle() {
			Some(handle) => handle,
			None => return Vec::new()
		};

		match self.content(handle) {
			Some(Content::Object(object)) => {
				let mut children = Vec::new();

				for data in &object.data {
					children.extend(data.values.iter().map(|(_, value)| value));
					children.extend(data.annotations.iter().filter_map(|annotation| match annotation {
						Annotation::Value(value) => Some(value),
						Annotation::Block(_) => None
					}));
				}

				children
			},
			Some(Content::Array { elements: Array::Value(values), .. }) => values.iter().collect(),
			_ => Vec::new()
		}
	}
}
