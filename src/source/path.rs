//! Route path parameter source.
//!
//! _Requires Cargo feature `urlencoded`._

use std::{borrow::Cow, collections::HashMap};

use percent_encoding::percent_decode_str;

use crate::{
    error::SourceError,
    source::{Container, Node, Source, string::StrValue},
};

/// A source over named route parameters, such as `id` in `/users/{id}`.
///
/// Values are stored as they appear in the URL and percent-decoded on
/// lookup. An empty value counts as absent.
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raw, percent-encoded parameter value.
    pub fn insert(&mut self, name: impl Into<String>, raw: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), raw.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl Source for PathParams {
    fn describe(&self) -> String {
        String::from("path parameters")
    }

    fn container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Container for PathParams {
    fn get(&self, name: &str) -> Result<Node<'_>, SourceError> {
        let raw = match self.values.get(name) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(SourceError::NoValue),
        };

        let decoded: Cow<'_, str> = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|err| SourceError::Custom(format!("percent-decode {raw:?}: {err}")))?;

        Ok(Box::new(StrValue::new(decoded)))
    }
}
