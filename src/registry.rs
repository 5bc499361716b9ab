//! The process-lifetime setter cache.

use std::{
    any::{Any, TypeId, type_name},
    fmt,
    sync::LazyLock,
};

use dashmap::DashMap;
use tracing::trace;

use crate::{
    compile::{Compiler, Setter},
    error::Error,
    shape::Decode,
    source::Source,
};

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

type Setters = DashMap<TypeId, Box<dyn Any + Send + Sync>>;

/// Compiled setters, keyed by target type.
///
/// A setter is compiled the first time its type is decoded and kept for the
/// lifetime of the registry. The registry may be shared freely between
/// threads. Two threads compiling the same type at once both succeed, and
/// the last one stores its setter.
///
/// No lock is held while a setter runs, so sources may block. Setters stay
/// valid after the registry that compiled them is dropped.
#[derive(Default)]
pub struct Registry {
    setters: Setters,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used by [`decode`](crate::decode) and
    /// [`decode_new`](crate::decode_new).
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Get or compile the setter for `T`.
    pub fn setter_of<T: Decode>(&self) -> Result<Setter<T>, Error> {
        if let Some(setter) = self.cached::<T>() {
            trace!(type_name = type_name::<T>(), "setter cache hit");
            return Ok(setter);
        }

        let mut compiler = Compiler::new(self);
        let setter = compiler.setter_of::<T>()?;
        compiler.commit();

        Ok(setter)
    }

    /// Decode `source` into an existing value.
    ///
    /// On failure, fields decoded before the error keep their new values.
    pub fn decode<T: Decode>(&self, source: &dyn Source, target: &mut T) -> Result<(), Error> {
        let setter = self.setter_of::<T>()?;
        setter(source, target)
    }

    /// Decode `source` into a new value, starting from [`Decode::zero`].
    pub fn decode_new<T: Decode>(&self, source: &dyn Source) -> Result<T, Error> {
        let mut value = T::zero();
        self.decode(source, &mut value)?;
        Ok(value)
    }

    /// Number of cached setters.
    pub fn len(&self) -> usize {
        self.setters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }

    /// Clone the setter out, so no shard lock is held while it runs.
    pub(crate) fn cached<T: Decode>(&self) -> Option<Setter<T>> {
        let entry = self.setters.get(&TypeId::of::<T>())?;
        entry.value().downcast_ref::<Setter<T>>().cloned()
    }

    pub(crate) fn store(&self, id: TypeId, setter: Box<dyn Any + Send + Sync>) {
        self.setters.insert(id, setter);
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("setters", &self.setters.len())
            .finish()
    }
}
