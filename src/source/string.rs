//! A single text scalar.

use std::{borrow::Cow, str::FromStr};

use crate::{
    error::SourceError,
    source::{FixedWidth, Source},
};

/// A source holding one text value, such as a query parameter.
///
/// Booleans are `true` or `false` in any case. Numbers are parsed in base 10,
/// directly at the requested width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrValue<'a>(Cow<'a, str>);

impl<'a> StrValue<'a> {
    pub fn new(value: impl Into<Cow<'a, str>>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn number<T>(&self, target: &'static str) -> Result<T, SourceError>
    where
        T: FromStr<Err: std::error::Error + Send + Sync + 'static>,
    {
        let input = self.as_str();

        input.parse().map_err(|err| {
            // A well-formed integer that failed to parse did not fit.
            if input.parse::<i128>().is_ok() {
                SourceError::OutOfRange {
                    input: input.to_owned(),
                    target,
                }
            } else {
                SourceError::Number {
                    input: input.to_owned(),
                    source: Box::new(err),
                }
            }
        })
    }
}

impl Source for StrValue<'_> {
    fn bool(&self) -> Result<bool, SourceError> {
        if self.0.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if self.0.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(SourceError::invalid_type("bool", self.describe()))
        }
    }

    fn int(&self) -> Result<i64, SourceError> {
        self.number("i64")
    }

    fn float(&self) -> Result<f64, SourceError> {
        self.number("f64")
    }

    fn string(&self) -> Result<Cow<'_, str>, SourceError> {
        Ok(Cow::Borrowed(&self.0))
    }

    fn describe(&self) -> String {
        format!("text {:?}", self.0)
    }

    fn fixed_width(&self) -> Option<&dyn FixedWidth> {
        Some(self)
    }
}

macro_rules! parse_width {
    ($($name:ident: $ty:ty),*) => {
        $(
            fn $name(&self) -> Result<$ty, SourceError> {
                self.number(stringify!($ty))
            }
        )*
    };
}

impl FixedWidth for StrValue<'_> {
    parse_width!(
        i8: i8, i16: i16, i32: i32, i64: i64,
        u8: u8, u16: u16, u32: u32, u64: u64,
        f32: f32, f64: f64
    );
}

impl<'a> From<&'a str> for StrValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StrValue<'static> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
