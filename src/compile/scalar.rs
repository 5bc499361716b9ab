//! Setters for scalar shapes.

use std::any::type_name;

use super::{Setter, setter};
use crate::{
    error::{BoxError, Error, ErrorKind, SourceError},
    shape::Width,
    source::Source,
};

pub(super) fn boolean<T: 'static>(set: fn(&mut T, bool)) -> Setter<T> {
    setter(move |source, target: &mut T| {
        let value = source.bool().map_err(|err| Error::scalar("bool", err))?;
        set(target, value);
        Ok(())
    })
}

pub(super) fn signed<T: 'static>(width: Width, set: fn(&mut T, i64)) -> Setter<T> {
    let (min, max) = width.signed_bounds();

    setter(move |source, target: &mut T| {
        let value = read_signed(source, width).map_err(int_error::<T>)?;
        if value < min || value > max {
            return Err(Error::range::<T>(value));
        }

        set(target, value);
        Ok(())
    })
}

pub(super) fn unsigned<T: 'static>(width: Width, set: fn(&mut T, u64)) -> Setter<T> {
    let max = width.unsigned_max();

    setter(move |source, target: &mut T| {
        let value = match source.fixed_width() {
            Some(fixed) => match width {
                Width::W8 => fixed.u8().map(u64::from),
                Width::W16 => fixed.u16().map(u64::from),
                Width::W32 => fixed.u32().map(u64::from),
                Width::W64 => fixed.u64(),
            }
            .map_err(int_error::<T>)?,
            None => {
                let value = source.int().map_err(int_error::<T>)?;
                // Negative values never fit an unsigned target.
                match u64::try_from(value) {
                    Ok(unsigned) if unsigned <= max => unsigned,
                    _ => return Err(Error::range::<T>(value)),
                }
            }
        };

        set(target, value);
        Ok(())
    })
}

/// Out-of-range numbers are range errors, whichever read reported them.
fn int_error<T>(err: SourceError) -> Error {
    match err {
        SourceError::OutOfRange { input, .. } => Error::range::<T>(input),
        err => Error::scalar("int", err),
    }
}

fn read_signed(source: &dyn Source, width: Width) -> Result<i64, SourceError> {
    let Some(fixed) = source.fixed_width() else {
        return source.int();
    };

    match width {
        Width::W8 => fixed.i8().map(i64::from),
        Width::W16 => fixed.i16().map(i64::from),
        Width::W32 => fixed.i32().map(i64::from),
        Width::W64 => fixed.i64(),
    }
}

pub(super) fn float<T: 'static>(width: Width, set: fn(&mut T, f64)) -> Setter<T> {
    setter(move |source, target: &mut T| {
        let value = match (source.fixed_width(), width) {
            (Some(fixed), Width::W32) => fixed.f32().map(f64::from),
            (Some(fixed), _) => fixed.f64(),
            (None, _) => source.float(),
        }
        .map_err(|err| Error::scalar("float", err))?;

        set(target, value);
        Ok(())
    })
}

pub(super) fn string<T: 'static>(set: fn(&mut T, String)) -> Setter<T> {
    setter(move |source, target: &mut T| {
        let value = source.string().map_err(|err| Error::scalar("string", err))?;
        set(target, value.into_owned());
        Ok(())
    })
}

pub(super) fn text<T: 'static>(parse: fn(&str) -> Result<T, BoxError>) -> Setter<T> {
    setter(move |source, target: &mut T| {
        let text = source.string().map_err(|err| Error::scalar("string", err))?;
        *target = parse(&text).map_err(|source| {
            Error::new(ErrorKind::Parse {
                type_name: type_name::<T>(),
                source,
            })
        })?;
        Ok(())
    })
}
