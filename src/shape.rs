//! Static descriptions of decodable types.
//!
//! A type opts into decoding by implementing [`Decode`], which names its
//! zero value and its [`Shape`]. Shapes are plain data: scalar shapes carry
//! a function storing a primitive into the target, composite shapes carry a
//! builder the [`Compiler`] invokes once per type.

use std::{any::TypeId, fmt, str::FromStr, sync::Arc};

use crate::{
    compile::{self, Compiler, Setter},
    error::{BoxError, Error},
};

mod std_impls;

/// A type that can be decoded from any [`Source`](crate::Source).
///
/// Usually derived with `#[derive(Decode)]`.
pub trait Decode: Sized + 'static {
    /// The value a target starts out as, and the value absent fields keep.
    fn zero() -> Self;

    /// The description the setter for this type is compiled from.
    fn shape() -> Shape<Self>;
}

/// Compiles the setter for a composite shape.
pub type Build<T> = fn(&mut Compiler<'_>) -> Result<Setter<T>, Error>;

/// The static shape of a decodable type.
pub enum Shape<T> {
    Bool(fn(&mut T, bool)),
    /// A signed integer of the given width. The value passed to the store
    /// function has been range-checked against the width.
    Signed(Width, fn(&mut T, i64)),
    /// An unsigned integer of the given width, range-checked like
    /// [`Shape::Signed`].
    Unsigned(Width, fn(&mut T, u64)),
    Float(Width, fn(&mut T, f64)),
    String(fn(&mut T, String)),
    /// A type parsed from text by its own parser. Takes priority over any
    /// structure the type has.
    Text(fn(&str) -> Result<T, BoxError>),
    /// An owning pointer, see [`Indirect`].
    Pointer(Build<T>),
    Struct(StructShape<T>),
    /// A growable sequence, see [`Growable`].
    Slice(Build<T>),
    /// A fixed-size array.
    Array(Build<T>),
    /// A map, see [`Keyed`].
    Map(Build<T>),
    /// A type that cannot be decoded. Compiling it fails.
    Unsupported,
}

impl<T: Decode> Shape<T> {
    /// The text-parse shape for types implementing [`FromStr`].
    pub fn text() -> Self
    where
        T: FromStr,
        T::Err: Into<BoxError>,
    {
        Shape::Text(|text| text.parse::<T>().map_err(Into::into))
    }

    /// The pointer shape for an [`Indirect`] type.
    pub fn indirect() -> Self
    where
        T: Indirect,
    {
        Shape::Pointer(compile::pointer::<T>)
    }

    /// The slice shape for a [`Growable`] type.
    pub fn growable() -> Self
    where
        T: Growable,
    {
        Shape::Slice(compile::slice::<T>)
    }

    /// The map shape for a [`Keyed`] type.
    pub fn keyed() -> Self
    where
        T: Keyed,
    {
        Shape::Map(compile::map::<T>)
    }
}

impl<T> Shape<T> {
    /// A short name of the shape's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Bool(_) => "bool",
            Shape::Signed(..) => "signed",
            Shape::Unsigned(..) => "unsigned",
            Shape::Float(..) => "float",
            Shape::String(_) => "string",
            Shape::Text(_) => "text",
            Shape::Pointer(_) => "pointer",
            Shape::Struct(_) => "struct",
            Shape::Slice(_) => "slice",
            Shape::Array(_) => "array",
            Shape::Map(_) => "map",
            Shape::Unsupported => "unsupported",
        }
    }
}

impl<T> fmt::Debug for Shape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Signed(width, _) | Shape::Unsigned(width, _) | Shape::Float(width, _) => {
                write!(f, "{}({width:?})", self.kind())
            }
            Shape::Struct(shape) => f
                .debug_list()
                .entries(shape.fields.iter().map(|field| field.name()))
                .finish(),
            _ => f.write_str(self.kind()),
        }
    }
}

/// The width of a numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// The width of `T`, by its size in memory.
    pub const fn of<T>() -> Self {
        match size_of::<T>() {
            1 => Width::W8,
            2 => Width::W16,
            4 => Width::W32,
            _ => Width::W64,
        }
    }

    pub(crate) const fn signed_bounds(self) -> (i64, i64) {
        match self {
            Width::W8 => (i8::MIN as i64, i8::MAX as i64),
            Width::W16 => (i16::MIN as i64, i16::MAX as i64),
            Width::W32 => (i32::MIN as i64, i32::MAX as i64),
            Width::W64 => (i64::MIN, i64::MAX),
        }
    }

    pub(crate) const fn unsigned_max(self) -> u64 {
        match self {
            Width::W8 => u8::MAX as u64,
            Width::W16 => u16::MAX as u64,
            Width::W32 => u32::MAX as u64,
            Width::W64 => u64::MAX,
        }
    }
}

/// The fields of a struct, in declaration order.
pub struct StructShape<T> {
    pub(crate) fields: Vec<Field<T>>,
}

impl<T: 'static> StructShape<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn field(mut self, field: Field<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// Re-root every field onto an outer struct holding this one.
    pub(crate) fn reroot<S: 'static>(self, outer: fn(&mut S) -> &mut T) -> StructShape<S> {
        let fields = self
            .fields
            .into_iter()
            .map(|field| Field {
                name: field.name,
                rename: field.rename,
                flatten: field.flatten,
                member: field.member.map(|inner| {
                    Arc::new(Nested { outer, inner }) as Arc<dyn Member<S>>
                }),
            })
            .collect();

        StructShape { fields }
    }
}

impl<T: 'static> Default for StructShape<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for StructShape<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

/// One declared struct field.
pub struct Field<T> {
    name: &'static str,
    rename: Option<&'static str>,
    flatten: bool,
    /// `None` if the field is skipped.
    pub(crate) member: Option<Arc<dyn Member<T>>>,
}

impl<T: 'static> Field<T> {
    /// A field named `name`, reached through `get`.
    pub fn new<F: Decode>(name: &'static str, get: fn(&mut T) -> &mut F) -> Self {
        Self {
            name,
            rename: None,
            flatten: false,
            member: Some(Arc::new(Access { get })),
        }
    }

    /// A field that never participates in decoding.
    pub fn skipped(name: &'static str) -> Self {
        Self {
            name,
            rename: None,
            flatten: false,
            member: None,
        }
    }

    /// Look the field up under `name` instead of its declared name.
    pub fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    /// Promote the fields of an embedded struct into this one.
    ///
    /// Ignored if the field is also renamed, or is not a struct.
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }
}

impl<T> Field<T> {
    /// The name the field is looked up under, before conflict resolution.
    pub fn name(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }

    pub fn is_renamed(&self) -> bool {
        self.rename.is_some()
    }

    pub fn is_flattened(&self) -> bool {
        self.flatten
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            rename: self.rename,
            flatten: self.flatten,
            member: self.member.clone(),
        }
    }
}

/// Typed access to a field's storage.
pub(crate) trait Member<T>: 'static {
    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<Setter<T>, Error>;

    /// The field type's struct shape re-rooted onto `T`, if it is a struct.
    fn flatten(&self) -> Option<StructShape<T>>;

    fn field_type(&self) -> TypeId;

    fn type_name(&self) -> &'static str;
}

struct Access<T, F> {
    get: fn(&mut T) -> &mut F,
}

impl<T: 'static, F: Decode> Member<T> for Access<T, F> {
    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<Setter<T>, Error> {
        let inner = compiler.setter_of::<F>()?;
        let get = self.get;
        Ok(compile::setter(move |source, target: &mut T| {
            inner(source, get(target))
        }))
    }

    fn flatten(&self) -> Option<StructShape<T>> {
        match F::shape() {
            Shape::Struct(shape) => Some(shape.reroot(self.get)),
            _ => None,
        }
    }

    fn field_type(&self) -> TypeId {
        TypeId::of::<F>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<F>()
    }
}

/// A member of an embedded struct, reached through the outer struct.
struct Nested<S, E> {
    outer: fn(&mut S) -> &mut E,
    inner: Arc<dyn Member<E>>,
}

impl<S: 'static, E: 'static> Member<S> for Nested<S, E> {
    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<Setter<S>, Error> {
        let inner = self.inner.compile(compiler)?;
        let outer = self.outer;
        Ok(compile::setter(move |source, target: &mut S| {
            inner(source, outer(target))
        }))
    }

    fn flatten(&self) -> Option<StructShape<S>> {
        self.inner
            .flatten()
            .map(|shape| shape.reroot(self.outer))
    }

    fn field_type(&self) -> TypeId {
        self.inner.field_type()
    }

    fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }
}

/// An owning pointer to one value, decoded as [`Shape::Pointer`].
///
/// The target is decoded into a fresh zero value and only attached once
/// that succeeded, so a pointer never refers to a value the source did not
/// supply.
pub trait Indirect: Decode {
    type Target: Decode;

    fn attach(&mut self, value: Self::Target);
}

/// A growable sequence, decoded as [`Shape::Slice`].
pub trait Growable: Decode {
    type Item: Decode;

    fn clear(&mut self);

    /// Append a zero item and return it.
    fn push_zero(&mut self) -> &mut Self::Item;
}

/// A map, decoded as [`Shape::Map`].
pub trait Keyed: Decode {
    type Key: Decode;
    type Value: Decode;

    fn insert(&mut self, key: Self::Key, value: Self::Value);
}
