//! Dynamic JSON tree source.
//!
//! _Requires Cargo feature `json`._

use std::borrow::Cow;

use serde_json::Value;

use crate::{
    error::SourceError,
    source::{Associative, Container, Node, Nodes, Pairs, Sequence, Source, string::StrValue},
};

/// A source walking a free-form [`serde_json::Value`].
///
/// Objects are containers and associative, arrays are sequences. A `null`
/// object member counts as absent, so it leaves optional fields empty.
/// Numbers read as integers only when they are integral.
#[derive(Debug, Clone, Copy)]
pub struct JsonValue<'a>(pub &'a Value);

impl<'a> JsonValue<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Source for JsonValue<'_> {
    fn bool(&self) -> Result<bool, SourceError> {
        match self.0 {
            Value::Bool(value) => Ok(*value),
            Value::Number(number) => Ok(number.as_f64().is_some_and(|value| value != 0.0)),
            Value::String(text) => StrValue::new(text.as_str()).bool(),
            _ => Err(SourceError::invalid_type("bool", self.describe())),
        }
    }

    fn int(&self) -> Result<i64, SourceError> {
        match self.0 {
            Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    return Ok(value);
                }

                match number.as_f64() {
                    Some(value)
                        if value.fract() == 0.0
                            && value >= i64::MIN as f64
                            && value < i64::MAX as f64 =>
                    {
                        Ok(value as i64)
                    }
                    Some(value) if value.fract() == 0.0 => Err(SourceError::OutOfRange {
                        input: number.to_string(),
                        target: "i64",
                    }),
                    _ => Err(SourceError::invalid_type("int", number.to_string())),
                }
            }
            Value::String(text) => StrValue::new(text.as_str()).int(),
            _ => Err(SourceError::invalid_type("int", self.describe())),
        }
    }

    fn float(&self) -> Result<f64, SourceError> {
        match self.0 {
            Value::Number(number) => number
                .as_f64()
                .ok_or_else(|| SourceError::invalid_type("float", number.to_string())),
            Value::String(text) => StrValue::new(text.as_str()).float(),
            _ => Err(SourceError::invalid_type("float", self.describe())),
        }
    }

    fn string(&self) -> Result<Cow<'_, str>, SourceError> {
        match self.0 {
            Value::String(text) => Ok(Cow::Borrowed(text)),
            Value::Number(number) => Ok(Cow::Owned(number.to_string())),
            Value::Bool(value) => Ok(Cow::Owned(value.to_string())),
            _ => Err(SourceError::invalid_type("string", self.describe())),
        }
    }

    fn describe(&self) -> String {
        format!("json {}", kind_of(self.0))
    }

    fn container(&self) -> Option<&dyn Container> {
        self.0.is_object().then_some(self as &dyn Container)
    }

    fn sequence(&self) -> Option<&dyn Sequence> {
        self.0.is_array().then_some(self as &dyn Sequence)
    }

    fn associative(&self) -> Option<&dyn Associative> {
        self.0.is_object().then_some(self as &dyn Associative)
    }
}

impl Container for JsonValue<'_> {
    fn get(&self, name: &str) -> Result<Node<'_>, SourceError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Err(SourceError::NoValue),
            Some(child) => Ok(Box::new(JsonValue(child))),
        }
    }
}

impl Sequence for JsonValue<'_> {
    fn iter(&self) -> Nodes<'_> {
        let items = self.0.as_array().map_or(&[][..], Vec::as_slice);
        Box::new(items.iter().map(|item| Box::new(JsonValue(item)) as Node<'_>))
    }
}

impl Associative for JsonValue<'_> {
    fn pairs(&self) -> Pairs<'_> {
        let Some(object) = self.0.as_object() else {
            return Box::new(std::iter::empty());
        };

        Box::new(object.iter().map(|(key, value)| {
            let key: Node<'_> = Box::new(StrValue::new(key.as_str()));
            let value: Node<'_> = Box::new(JsonValue(value));
            (key, value)
        }))
    }
}
