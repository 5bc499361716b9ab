//! URL-encoded query string and form source.
//!
//! _Requires Cargo feature `urlencoded`._

use std::{borrow::Cow, collections::HashMap};

use crate::{
    error::SourceError,
    source::{Container, FixedWidth, Node, Nodes, Sequence, Source, string::StrValue},
};

/// A source over `application/x-www-form-urlencoded` pairs, such as a
/// request's query string or form body.
///
/// Looking up a key yields every value given for it, in order. A key
/// repeated with a `[]` suffix (`n[]=1&n[]=2`) is preferred over the plain
/// key, so a single `n[]=1` still decodes into a slice.
#[derive(Debug, Clone, Default)]
pub struct UrlEncoded {
    values: HashMap<String, Vec<String>>,
}

impl UrlEncoded {
    /// Parse URL-encoded pairs, e.g. the query string without its `?`.
    pub fn parse(input: &[u8]) -> Self {
        form_urlencoded::parse(input)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// All values given for `key`, or an empty slice.
    pub fn values(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UrlEncoded {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in iter {
            values.entry(key.into()).or_default().push(value.into());
        }
        Self { values }
    }
}

impl Source for UrlEncoded {
    fn describe(&self) -> String {
        String::from("url-encoded parameters")
    }

    fn container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Container for UrlEncoded {
    fn get(&self, name: &str) -> Result<Node<'_>, SourceError> {
        if let Some(values) = self.values.get(&format!("{name}[]")) {
            return Ok(Box::new(Params(values)));
        }

        match self.values.get(name) {
            Some(values) if !values.is_empty() => Ok(Box::new(Params(values))),
            _ => Err(SourceError::NoValue),
        }
    }
}

/// Every value given for one key.
///
/// Reads as a scalar only if exactly one value was given.
#[derive(Debug, Clone, Copy)]
struct Params<'a>(&'a [String]);

impl Params<'_> {
    fn single(&self, expected: &'static str) -> Result<StrValue<'_>, SourceError> {
        match self.0 {
            [value] => Ok(StrValue::new(value.as_str())),
            _ => Err(SourceError::invalid_type(expected, self.describe())),
        }
    }
}

impl Source for Params<'_> {
    fn bool(&self) -> Result<bool, SourceError> {
        self.single("bool")?.bool()
    }

    fn int(&self) -> Result<i64, SourceError> {
        self.single("int")?.int()
    }

    fn float(&self) -> Result<f64, SourceError> {
        self.single("float")?.float()
    }

    fn string(&self) -> Result<Cow<'_, str>, SourceError> {
        match self.0 {
            [value] => Ok(Cow::Borrowed(value)),
            _ => Err(SourceError::invalid_type("string", self.describe())),
        }
    }

    fn describe(&self) -> String {
        format!("{} parameter values", self.0.len())
    }

    fn sequence(&self) -> Option<&dyn Sequence> {
        Some(self)
    }

    fn fixed_width(&self) -> Option<&dyn FixedWidth> {
        Some(self)
    }
}

impl Sequence for Params<'_> {
    fn iter(&self) -> Nodes<'_> {
        Box::new(
            self.0
                .iter()
                .map(|value| Box::new(StrValue::new(value.as_str())) as Node<'_>),
        )
    }
}

macro_rules! single_width {
    ($($name:ident: $ty:ty),*) => {
        $(
            fn $name(&self) -> Result<$ty, SourceError> {
                self.single(stringify!($ty))?.$name()
            }
        )*
    };
}

impl FixedWidth for Params<'_> {
    single_width!(
        i8: i8, i16: i16, i32: i32, i64: i64,
        u8: u8, u16: u16, u32: u32, u64: u64,
        f32: f32, f64: f64
    );
}
