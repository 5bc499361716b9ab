//! Little-endian binary stream source.

use std::{
    borrow::Cow,
    cell::{Cell, RefCell},
    io::{self, Read},
};

use zerocopy::{
    FromBytes, IntoBytes,
    little_endian::{F32, F64, I16, I32, I64, U16, U32, U64},
};

use crate::{
    error::SourceError,
    source::{Container, FixedWidth, Node, Nodes, Sequence, Source},
};

/// A source reading fixed-width values from a little-endian byte stream.
///
/// The stream has no structure of its own: every child lookup returns the
/// same cursor, and iteration never ends, so the shape of the target type
/// alone determines what is read. Bound sequences with fixed-size arrays.
///
/// - Integers and floats are read at exactly the target's width.
/// - A boolean is one byte, true if non-zero.
/// - A string is an `i32` byte length followed by that many UTF-8 bytes.
///
/// Untyped `int` and `float` reads are not supported.
#[derive(Debug)]
pub struct BinarySource<R> {
    reader: RefCell<R>,
    position: Cell<usize>,
}

impl<R: Read> BinarySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: RefCell::new(reader),
            position: Cell::new(0),
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position.get()
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Read exactly `size_of::<T>()` bytes, advancing the cursor.
    fn take<T: FromBytes + IntoBytes>(&self) -> Result<T, SourceError> {
        let mut value = T::new_zeroed();
        self.fill(value.as_mut_bytes())?;
        Ok(value)
    }

    /// Fill `buf` completely. Bytes read before a failure still count as
    /// consumed.
    fn fill(&self, buf: &mut [u8]) -> Result<(), SourceError> {
        let mut reader = self.reader.borrow_mut();
        let mut filled = 0;

        while filled < buf.len() {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.advance(filled);
                    return Err(err.into());
                }
            }
        }

        self.advance(filled);
        if filled < buf.len() {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        Ok(())
    }

    fn advance(&self, len: usize) {
        self.position.set(self.position.get() + len);
    }
}

impl<R: Read> Source for BinarySource<R> {
    fn bool(&self) -> Result<bool, SourceError> {
        Ok(self.take::<u8>()? != 0)
    }

    fn string(&self) -> Result<Cow<'_, str>, SourceError> {
        let len = self.take::<I32>()?.get();
        let len = usize::try_from(len).map_err(|_| SourceError::OutOfRange {
            input: len.to_string(),
            target: "string length",
        })?;

        // Grows with the bytes actually present, not the claimed length.
        let mut buf = Vec::new();
        let read = (&mut *self.reader.borrow_mut())
            .take(len as u64)
            .read_to_end(&mut buf);
        self.advance(buf.len());
        read?;

        if buf.len() < len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        Ok(Cow::Owned(String::from_utf8(buf)?))
    }

    fn describe(&self) -> String {
        format!("binary stream at offset {}", self.position())
    }

    fn container(&self) -> Option<&dyn Container> {
        Some(self)
    }

    fn sequence(&self) -> Option<&dyn Sequence> {
        Some(self)
    }

    fn fixed_width(&self) -> Option<&dyn FixedWidth> {
        Some(self)
    }
}

impl<R: Read> Container for BinarySource<R> {
    fn get(&self, _name: &str) -> Result<Node<'_>, SourceError> {
        Ok(Box::new(self))
    }
}

impl<R: Read> Sequence for BinarySource<R> {
    fn iter(&self) -> Nodes<'_> {
        Box::new(std::iter::repeat_with(move || Box::new(self) as Node<'_>))
    }
}

impl<R: Read> FixedWidth for BinarySource<R> {
    fn i8(&self) -> Result<i8, SourceError> {
        self.take()
    }
    fn i16(&self) -> Result<i16, SourceError> {
        Ok(self.take::<I16>()?.get())
    }
    fn i32(&self) -> Result<i32, SourceError> {
        Ok(self.take::<I32>()?.get())
    }
    fn i64(&self) -> Result<i64, SourceError> {
        Ok(self.take::<I64>()?.get())
    }

    fn u8(&self) -> Result<u8, SourceError> {
        self.take()
    }
    fn u16(&self) -> Result<u16, SourceError> {
        Ok(self.take::<U16>()?.get())
    }
    fn u32(&self) -> Result<u32, SourceError> {
        Ok(self.take::<U32>()?.get())
    }
    fn u64(&self) -> Result<u64, SourceError> {
        Ok(self.take::<U64>()?.get())
    }

    fn f32(&self) -> Result<f32, SourceError> {
        Ok(self.take::<F32>()?.get())
    }
    fn f64(&self) -> Result<f64, SourceError> {
        Ok(self.take::<F64>()?.get())
    }
}
