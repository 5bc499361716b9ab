//! Abstract data sources the decoder reads from.
//!
//! Every source implements [`Source`], the scalar capability. A node may
//! additionally expose any of the extended capabilities by returning itself
//! from the matching discovery method:
//!
//! - [`Container`]: named-child lookup, required by struct targets.
//! - [`Sequence`]: ordered iteration, required by slice and array targets.
//! - [`Associative`]: key/value iteration, required by map targets.
//! - [`FixedWidth`]: exact-width numeric reads. When present, integer and
//!   float targets read exactly as many bytes as their width, which keeps
//!   streaming binary sources aligned.
//!
//! The decoder only reads. A source owns its backing data and is never
//! mutated by decoding, though it may use interior mutability to advance a
//! cursor.

use std::borrow::Cow;

use crate::error::SourceError;

pub mod binary;
#[cfg(feature = "json")]
pub mod json;
#[cfg(feature = "urlencoded")]
pub mod path;
#[cfg(feature = "urlencoded")]
pub mod query;
pub mod string;

/// A child node borrowed from its parent.
pub type Node<'a> = Box<dyn Source + 'a>;

/// A lazy sequence of child nodes.
pub type Nodes<'a> = Box<dyn Iterator<Item = Node<'a>> + 'a>;

/// A lazy sequence of key/value node pairs.
pub type Pairs<'a> = Box<dyn Iterator<Item = (Node<'a>, Node<'a>)> + 'a>;

/// Read the current node as a scalar, and discover extended capabilities.
///
/// The default implementation of each scalar method reports
/// [`SourceError::InvalidType`], and each discovery method reports the
/// capability as absent. Scalar reads must never silently default.
pub trait Source {
    /// Read the node as a boolean.
    fn bool(&self) -> Result<bool, SourceError> {
        Err(SourceError::invalid_type("bool", self.describe()))
    }

    /// Read the node as a signed 64-bit integer.
    fn int(&self) -> Result<i64, SourceError> {
        Err(SourceError::invalid_type("int", self.describe()))
    }

    /// Read the node as a 64-bit float.
    fn float(&self) -> Result<f64, SourceError> {
        Err(SourceError::invalid_type("float", self.describe()))
    }

    /// Read the node as text.
    fn string(&self) -> Result<Cow<'_, str>, SourceError> {
        Err(SourceError::invalid_type("string", self.describe()))
    }

    /// A short description of the node, used in error messages.
    fn describe(&self) -> String {
        String::from("unsupported node")
    }

    fn container(&self) -> Option<&dyn Container> {
        None
    }

    fn sequence(&self) -> Option<&dyn Sequence> {
        None
    }

    fn associative(&self) -> Option<&dyn Associative> {
        None
    }

    fn fixed_width(&self) -> Option<&dyn FixedWidth> {
        None
    }
}

/// Look up children by name.
pub trait Container {
    /// Retrieve the child registered under `name`.
    ///
    /// Must return [`SourceError::NoValue`] when the container exists but
    /// lacks the child, so callers can tell "absent" from "broken".
    fn get(&self, name: &str) -> Result<Node<'_>, SourceError>;
}

/// Iterate over child nodes in order.
///
/// Whether a second call restarts the sequence is up to the source; the
/// decoder iterates once.
pub trait Sequence {
    fn iter(&self) -> Nodes<'_>;
}

/// Iterate over key/value pairs.
pub trait Associative {
    fn pairs(&self) -> Pairs<'_>;
}

/// Read numbers of an exact width.
#[allow(missing_docs)]
pub trait FixedWidth {
    fn i8(&self) -> Result<i8, SourceError>;
    fn i16(&self) -> Result<i16, SourceError>;
    fn i32(&self) -> Result<i32, SourceError>;
    fn i64(&self) -> Result<i64, SourceError>;

    fn u8(&self) -> Result<u8, SourceError>;
    fn u16(&self) -> Result<u16, SourceError>;
    fn u32(&self) -> Result<u32, SourceError>;
    fn u64(&self) -> Result<u64, SourceError>;

    fn f32(&self) -> Result<f32, SourceError>;
    fn f64(&self) -> Result<f64, SourceError>;
}

macro_rules! forward_source {
    ($($ty:ty),*) => {
        $(
            impl<S: Source + ?Sized> Source for $ty {
                fn bool(&self) -> Result<bool, SourceError> {
                    (**self).bool()
                }
                fn int(&self) -> Result<i64, SourceError> {
                    (**self).int()
                }
                fn float(&self) -> Result<f64, SourceError> {
                    (**self).float()
                }
                fn string(&self) -> Result<Cow<'_, str>, SourceError> {
                    (**self).string()
                }
                fn describe(&self) -> String {
                    (**self).describe()
                }
                fn container(&self) -> Option<&dyn Container> {
                    (**self).container()
                }
                fn sequence(&self) -> Option<&dyn Sequence> {
                    (**self).sequence()
                }
                fn associative(&self) -> Option<&dyn Associative> {
                    (**self).associative()
                }
                fn fixed_width(&self) -> Option<&dyn FixedWidth> {
                    (**self).fixed_width()
                }
            }
        )*
    };
}

forward_source!(&S, Box<S>);
