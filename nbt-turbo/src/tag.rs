use crate::writer::Kind;

/// A single NBT value. Names live in the enclosing [`Compound`].
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
	I8(i8),
	I16(i16),
	I32(i32),
	I64(i64),
	F32(f32),
	F64(f64),
	U8Array(Vec<u8>),
	String(String),
	List(List),
	Compound(Compound),
	U32Array(Vec<u32>)
}

impl Tag {
	pub fn kind(&self) -> Kind {
		match *self {
			Tag::I8(_) => Kind::I8,
			Tag::I16(_) => Kind::I16,
			Tag::I32(_) => Kind::I32,
			Tag::I64(_) => Kind::I64,
			Tag::F32(_) => Kind::F32,
			Tag::F64(_) => Kind::F64,
			Tag::U8Array(_) => Kind::U8Array,
			Tag::String(_) => Kind::String,
			Tag::List(_) => Kind::List,
			Tag::Compound(_) => Kind::Compound,
			Tag::U32Array(_) => Kind::U32Array
		}
	}

	pub fn as_compound(&self) -> Option<&Compound> {
		match self {
			Tag::Compound(compound) => Some(compound),
			_ => None
		}
	}

	pub fn as_list(&self) -> Option<&List> {
		match self {
			Tag::List(list) => Some(list),
			_ => None
		}
	}
}

macro_rules! tag_from {
	($($ty:ty => $variant:ident),*) => {
		$(
			impl From<$ty> for Tag {
				fn from(value: $ty) -> Self {
					Tag::$variant(value)
				}
			}
		)*
	};
}

tag_from! {
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	f32 => F32,
	f64 => F64,
	Vec<u8> => U8Array,
	String => String,
	List => List,
	Compound => Compound,
	Vec<u32> => U32Array
}

impl From<bool> for Tag {
	fn from(value: bool) -> Self {
		Tag::I8(value as i8)
	}
}

impl<'a> From<&'a str> for Tag {
	fn from(value: &'a str) -> Self {
		Tag::String(value.to_owned())
	}
}

/// A homogeneous list. The element kind is carried by the variant, so a list can never mix kinds.
///
/// Empty lists of any variant are written with an element kind of `End`, which is how the game
/// distinguishes an intentionally empty list from one with contents.
#[derive(Debug, Clone, PartialEq)]
pub enum List {
	End,
	I8(Vec<i8>),
	I16(Vec<i16>),
	I32(Vec<i32>),
	I64(Vec<i64>),
	F32(Vec<f32>),
	F64(Vec<f64>),
	String(Vec<String>),
	Compound(Vec<Compound>)
}

impl List {
	pub fn len(&self) -> usize {
		match self {
			List::End => 0,
			List::I8(values) => values.len(),
			List::I16(values) => values.len(),
			List::I32(values) => values.len(),
			List::I64(values) => values.len(),
			List::F32(values) => values.len(),
			List::F64(values) => values.len(),
			List::String(values) => values.len(),
			List::Compound(values) => values.len()
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The element kind as it appears on the wire.
	pub fn element_kind(&self) -> Kind {
		if self.is_empty() {
			return Kind::End;
		}

		match self {
			List::End => Kind::End,
			List::I8(_) => Kind::I8,
			List::I16(_) => Kind::I16,
			List::I32(_) => Kind::I32,
			List::I64(_) => Kind::I64,
			List::F32(_) => Kind::F32,
			List::F64(_) => Kind::F64,
			List::String(_) => Kind::String,
			List::Compound(_) => Kind::Compound
		}
	}
}

/// An ordered set of named tags. Insertion order is preserved when writing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
	entries: Vec<(String, Tag)>
}

impl Compound {
	pub fn new() -> Self {
		Compound::default()
	}

	/// Inserts a tag, replacing any existing tag with the same name in place.
	pub fn insert<T: Into<Tag>>(&mut self, name: &str, value: T) -> &mut Self {
		let value = value.into();

		match self.entries.iter_mut().find(|(existing, _)| existing == name) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((name.to_owned(), value))
		}

		self
	}

	pub fn get(&self, name: &str) -> Option<&Tag> {
		self.entries.iter().find(|(existing, _)| existing == name).map(|(_, tag)| tag)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item=(&str, &Tag)> {
		self.entries.iter().map(|(name, tag)| (name.as_str(), tag))
	}
}

/// The root of an NBT document: a compound with a name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedCompound {
	pub name: String,
	pub compound: Compound
}

impl NamedCompound {
	pub fn new(name: &str, compound: Compound) -> Self {
		NamedCompound { name: name.to_owned(), compound }
	}
}
