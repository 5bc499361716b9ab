//! A type-directed decoder for structured data.
//!
//! Decant fills Rust values from any data source that can hand out scalars
//! and named or indexed children: query strings, route parameters, JSON trees
//! and little-endian binary streams all go through the same [`Source`]
//! abstraction. A type describes its [`Shape`] once, usually with
//! `#[derive(Decode)]`, and decant compiles a setter for it the first time it
//! is decoded. Setters are cached in a [`Registry`] and reused by every later
//! decode of the type, including decodes nested inside other types.
//!
//! ```ignore
//! use decant::{Decode, source::query::UrlEncoded};
//!
//! #[derive(Debug, Decode)]
//! struct Person {
//!     name: String,
//!     age: u8,
//!     tags: Vec<String>,
//! }
//!
//! let query = UrlEncoded::parse(b"name=Albert&age=21&tags=foo&tags=bar");
//! let person: Person = decant::decode_new(&query)?;
//! ```
//!
//! Most users need only [`decode`] or [`decode_new`]. Tests and applications
//! wanting an isolated cache can construct their own [`Registry`].
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable the `Decode` derive macro (default).
//! - `json`: enable the [`serde_json::Value`] source (default).
//! - `urlencoded`: enable the query string and path parameter sources
//!   (default).

pub mod compile;
pub mod error;
pub mod registry;
pub mod shape;
pub mod source;

pub use compile::{
    Compiler, Setter,
    fields::{FieldInfo, resolve_fields},
};
#[cfg(feature = "derive")]
pub use decant_derive::Decode;
pub use error::{BoxError, Capability, Error, ErrorKind, Segment, SourceError};
pub use registry::Registry;
pub use shape::{Build, Decode, Field, Growable, Indirect, Keyed, Shape, StructShape, Width};
pub use source::{Associative, Container, FixedWidth, Sequence, Source};

/// Decode `source` into an existing value, using the global [`Registry`].
///
/// On failure, fields decoded before the error keep their new values.
pub fn decode<T: Decode>(source: &dyn Source, target: &mut T) -> Result<(), Error> {
    Registry::global().decode(source, target)
}

/// Decode `source` into a new value, using the global [`Registry`].
pub fn decode_new<T: Decode>(source: &dyn Source) -> Result<T, Error> {
    Registry::global().decode_new(source)
}
