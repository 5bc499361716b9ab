//! Errors reported by sources and by the decoder.

use core::fmt;

use thiserror::Error;

/// A boxed error, as returned by custom text parsers and custom sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error reported by a [`Source`](crate::Source) while reading a node.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// A container exists, but holds no child under the requested name.
    ///
    /// Struct decoding treats this as "leave the field untouched".
    #[error("No value.")]
    NoValue,
    /// The node cannot be read as the requested kind.
    #[error("Expected {expected}, found {found}.")]
    InvalidType {
        expected: &'static str,
        found: String,
    },
    /// The node holds text that is not a number.
    #[error("Invalid number {input:?} ({source}).")]
    Number {
        input: String,
        #[source]
        source: BoxError,
    },
    /// The node holds a number that does not fit the requested width.
    #[error("Number {input} is out of range for {target}.")]
    OutOfRange { input: String, target: &'static str },
    /// An error from an underlying reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Bytes read as text were not valid UTF-8.
    #[error("Invalid UTF-8 ({0}).")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// Any other failure, such as an expired deadline.
    #[error("{0}")]
    Custom(String),
}

impl SourceError {
    /// Shorthand for [`SourceError::InvalidType`].
    pub fn invalid_type(expected: &'static str, found: impl Into<String>) -> Self {
        Self::InvalidType {
            expected,
            found: found.into(),
        }
    }

    /// Returns `true` for [`SourceError::NoValue`].
    pub fn is_no_value(&self) -> bool {
        matches!(self, Self::NoValue)
    }
}

/// A capability a source node may offer beyond scalar reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Named-child lookup.
    Container,
    /// Ordered iteration.
    Sequence,
    /// Key/value iteration.
    Associative,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Container => "container",
            Self::Sequence => "sequence",
            Self::Associative => "associative",
        })
    }
}

/// What went wrong while compiling or running a setter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The target type has a shape the decoder cannot fill.
    #[error("Type `{type_name}` is not supported.")]
    Unsupported { type_name: &'static str },
    /// The source node lacks a capability the target shape requires.
    #[error("Decoding `{type_name}` requires a {capability} source.")]
    Capability {
        capability: Capability,
        type_name: &'static str,
    },
    /// A scalar accessor failed.
    #[error("Get {expected} value: {source}")]
    Scalar {
        expected: &'static str,
        #[source]
        source: SourceError,
    },
    /// A container lookup failed for a reason other than an absent child.
    #[error("Lookup child: {source}")]
    Lookup {
        #[source]
        source: SourceError,
    },
    /// An integer does not fit the target type, or is negative for an
    /// unsigned one.
    #[error("Value {input} is out of range for `{type_name}`.")]
    Range { input: String, type_name: &'static str },
    /// A type's own text parser rejected its input.
    #[error("Could not parse `{type_name}` ({source}).")]
    Parse {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },
    /// A recursive setter ran before its type finished compiling.
    #[error("Setter for `{type_name}` is unresolved.")]
    Unresolved { type_name: &'static str },
}

/// One step of the path an error occurred at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A struct field, by resolved name.
    Field(&'static str),
    /// An element of a slice or array.
    Index(usize),
    /// The n-th entry of a map.
    Entry(usize),
}

/// An error compiling or running a setter, with the path it occurred at.
#[derive(Debug)]
pub struct Error {
    /// Innermost segment first; segments are pushed while unwinding.
    trail: Vec<Segment>,
    kind: ErrorKind,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            trail: Vec::new(),
            kind,
        }
    }

    pub(crate) fn unsupported<T>() -> Self {
        Self::new(ErrorKind::Unsupported {
            type_name: core::any::type_name::<T>(),
        })
    }

    pub(crate) fn capability<T>(capability: Capability) -> Self {
        Self::new(ErrorKind::Capability {
            capability,
            type_name: core::any::type_name::<T>(),
        })
    }

    pub(crate) fn scalar(expected: &'static str, source: SourceError) -> Self {
        Self::new(ErrorKind::Scalar { expected, source })
    }

    pub(crate) fn lookup(source: SourceError) -> Self {
        Self::new(ErrorKind::Lookup { source })
    }

    pub(crate) fn range<T>(input: impl ToString) -> Self {
        Self::new(ErrorKind::Range {
            input: input.to_string(),
            type_name: core::any::type_name::<T>(),
        })
    }

    pub(crate) fn at(mut self, segment: Segment) -> Self {
        self.trail.push(segment);
        self
    }

    /// The kind of failure.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The path from the decoded root to the failing node, outermost first.
    pub fn path(&self) -> impl Iterator<Item = &Segment> {
        self.trail.iter().rev()
    }

    /// Consume the error, returning its kind.
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(innermost) = self.trail.first() else {
            return write!(f, "{}", self.kind);
        };

        f.write_str(match innermost {
            Segment::Field(_) => "Field `",
            Segment::Index(_) => "Element `",
            Segment::Entry(_) => "Entry `",
        })?;

        for (i, segment) in self.path().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{name}")?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
                Segment::Entry(idx) => write!(f, "[#{idx}]")?,
            }
        }

        write!(f, "`: {}", self.kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}
