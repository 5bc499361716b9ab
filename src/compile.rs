//! Compiling setters from shapes.

use std::{
    any::{Any, TypeId, type_name},
    collections::{HashMap, HashSet},
    sync::{Arc, OnceLock},
};

use tracing::{debug, trace};

use crate::{
    error::{Capability, Error, ErrorKind, Segment},
    registry::Registry,
    shape::{Decode, Growable, Indirect, Keyed, Shape, StructShape},
    source::Source,
};

pub mod fields;
mod scalar;

/// A compiled decode function for one target type.
///
/// Setters are cheap to clone and safe to share between threads.
pub type Setter<T> = Arc<dyn Fn(&dyn Source, &mut T) -> Result<(), Error> + Send + Sync>;

pub(crate) fn setter<T>(
    f: impl Fn(&dyn Source, &mut T) -> Result<(), Error> + Send + Sync + 'static,
) -> Setter<T> {
    Arc::new(f)
}

/// Where a recursive reference finds its setter once the type finished.
type Slot<T> = Arc<OnceLock<Setter<T>>>;

/// The state of one top-level compile.
///
/// Tracks the types currently being compiled so that recursive types
/// terminate, and holds finished setters until the whole compile succeeded.
/// Only then are they committed to the [`Registry`].
pub struct Compiler<'r> {
    registry: &'r Registry,
    pending: HashSet<TypeId>,
    slots: HashMap<TypeId, Box<dyn Any>>,
    finished: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl<'r> Compiler<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            pending: HashSet::new(),
            slots: HashMap::new(),
            finished: HashMap::new(),
        }
    }

    /// Get or compile the setter for `T`.
    ///
    /// If `T` is already being compiled further up, the returned setter
    /// forwards to the finished one once that compile completes. Calling it
    /// earlier fails with [`ErrorKind::Unresolved`].
    pub fn setter_of<T: Decode>(&mut self) -> Result<Setter<T>, Error> {
        let id = TypeId::of::<T>();

        if let Some(setter) = self.registry.cached::<T>() {
            trace!(type_name = type_name::<T>(), "setter cache hit");
            return Ok(setter);
        }

        if let Some(setter) = self.finished.get(&id) {
            if let Some(setter) = setter.downcast_ref::<Setter<T>>() {
                return Ok(setter.clone());
            }
        }

        if self.pending.contains(&id) {
            debug!(type_name = type_name::<T>(), "deferring recursive setter");
            return Ok(deferred(self.slot::<T>()));
        }

        self.pending.insert(id);
        let compiled = self.build::<T>();
        self.pending.remove(&id);

        let setter = compiled?;
        if let Some(slot) = self.slots.remove(&id) {
            if let Some(slot) = slot.downcast_ref::<Slot<T>>() {
                let _ = slot.set(setter.clone());
            }
        }
        self.finished.insert(id, Box::new(setter.clone()));

        Ok(setter)
    }

    fn slot<T: Decode>(&mut self) -> Slot<T> {
        let slot = self
            .slots
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Slot::<T>::default()));

        match slot.downcast_ref::<Slot<T>>() {
            Some(slot) => slot.clone(),
            None => Slot::default(),
        }
    }

    /// Store every setter compiled so far in the registry.
    pub(crate) fn commit(self) {
        for (id, setter) in self.finished {
            self.registry.store(id, setter);
        }
    }

    fn build<T: Decode>(&mut self) -> Result<Setter<T>, Error> {
        let shape = T::shape();
        let kind = shape.kind();

        let setter = match shape {
            Shape::Bool(set) => scalar::boolean(set),
            Shape::Signed(width, set) => scalar::signed(width, set),
            Shape::Unsigned(width, set) => scalar::unsigned(width, set),
            Shape::Float(width, set) => scalar::float(width, set),
            Shape::String(set) => scalar::string(set),
            Shape::Text(parse) => scalar::text(parse),
            Shape::Struct(shape) => self.structure(shape)?,
            Shape::Pointer(build)
            | Shape::Slice(build)
            | Shape::Array(build)
            | Shape::Map(build) => build(self)?,
            Shape::Unsupported => return Err(Error::unsupported::<T>()),
        };

        debug!(type_name = type_name::<T>(), shape = kind, "compiled setter");
        Ok(setter)
    }

    fn structure<T: Decode>(&mut self, shape: StructShape<T>) -> Result<Setter<T>, Error> {
        let fields = fields::resolve(shape)
            .into_iter()
            .map(|field| {
                let set = field
                    .member
                    .compile(self)
                    .map_err(|err| err.at(Segment::Field(field.name)))?;
                Ok((field.name, set))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(setter(move |source, target: &mut T| {
            let Some(container) = source.container() else {
                return Err(Error::capability::<T>(Capability::Container));
            };

            for &(name, ref set) in &fields {
                let child = match container.get(name) {
                    Ok(child) => child,
                    Err(err) if err.is_no_value() => continue,
                    Err(err) => return Err(Error::lookup(err).at(Segment::Field(name))),
                };

                set(&*child, target).map_err(|err| err.at(Segment::Field(name)))?;
            }

            Ok(())
        }))
    }
}

fn unresolved<T>() -> Error {
    Error::new(ErrorKind::Unresolved {
        type_name: type_name::<T>(),
    })
}

fn deferred<T: Decode>(slot: Slot<T>) -> Setter<T> {
    setter(move |source, target: &mut T| {
        let Some(resolved) = slot.get() else {
            debug!(type_name = type_name::<T>(), "recursive setter unresolved");
            return Err(unresolved::<T>());
        };

        resolved(source, target)
    })
}

pub(crate) fn pointer<P: Indirect>(compiler: &mut Compiler<'_>) -> Result<Setter<P>, Error> {
    let inner = compiler.setter_of::<P::Target>()?;

    Ok(setter(move |source, target: &mut P| {
        let mut value = P::Target::zero();
        inner(source, &mut value)?;
        target.attach(value);
        Ok(())
    }))
}

pub(crate) fn slice<G: Growable>(compiler: &mut Compiler<'_>) -> Result<Setter<G>, Error> {
    let element = compiler.setter_of::<G::Item>()?;

    Ok(setter(move |source, target: &mut G| {
        let Some(sequence) = source.sequence() else {
            return Err(Error::capability::<G>(Capability::Sequence));
        };

        target.clear();
        for (idx, node) in sequence.iter().enumerate() {
            element(&*node, target.push_zero()).map_err(|err| err.at(Segment::Index(idx)))?;
        }

        Ok(())
    }))
}

pub(crate) fn array<E: Decode, const N: usize>(
    compiler: &mut Compiler<'_>,
) -> Result<Setter<[E; N]>, Error> {
    let element = compiler.setter_of::<E>()?;

    Ok(setter(move |source, target: &mut [E; N]| {
        let Some(sequence) = source.sequence() else {
            return Err(Error::capability::<[E; N]>(Capability::Sequence));
        };

        // Slots come first so the source is never pulled past N.
        for (idx, (slot, node)) in target.iter_mut().zip(sequence.iter()).enumerate() {
            element(&*node, slot).map_err(|err| err.at(Segment::Index(idx)))?;
        }

        Ok(())
    }))
}

pub(crate) fn map<M: Keyed>(compiler: &mut Compiler<'_>) -> Result<Setter<M>, Error> {
    let key = compiler.setter_of::<M::Key>()?;
    let value = compiler.setter_of::<M::Value>()?;

    Ok(setter(move |source, target: &mut M| {
        let Some(associative) = source.associative() else {
            return Err(Error::capability::<M>(Capability::Associative));
        };

        *target = M::zero();
        for (idx, (key_node, value_node)) in associative.pairs().enumerate() {
            let mut k = M::Key::zero();
            key(&*key_node, &mut k).map_err(|err| err.at(Segment::Entry(idx)))?;

            let mut v = M::Value::zero();
            value(&*value_node, &mut v).map_err(|err| err.at(Segment::Entry(idx)))?;

            target.insert(k, v);
        }

        Ok(())
    }))
}
