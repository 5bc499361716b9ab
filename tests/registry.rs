#![cfg(all(feature = "derive", feature = "json"))]

use std::{borrow::Cow, cell::Cell, sync::Arc, thread};

use decant::{
    Container, Decode, ErrorKind, Registry, SourceError, source::Node, source::Source,
    source::json::JsonValue, source::string::StrValue,
};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Decode)]
struct Order {
    id: u64,
    items: Vec<Item>,
    note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Decode)]
struct Item {
    sku: String,
    quantity: u16,
}

#[test]
fn concurrent_decodes_share_one_registry() {
    let registry = Registry::new();
    let value = json!({
        "id": 7,
        "items": [
            { "sku": "a-1", "quantity": 2 },
            { "sku": "b-2", "quantity": 1 },
        ],
    });

    let (registry, value) = (&registry, &value);
    let orders: Vec<Order> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(move || registry.decode_new::<Order>(&JsonValue(value)).unwrap())
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert!(orders.iter().all(|order| *order == orders[0]));
    assert_eq!(orders[0].items[1].sku, "b-2");
    assert!(registry.setter_of::<Order>().is_ok());
    assert!(!registry.is_empty());
}

#[test]
fn setters_are_compiled_once() {
    let registry = Registry::new();
    assert!(registry.is_empty());

    let first = registry.setter_of::<Item>().unwrap();
    let len = registry.len();

    // Item, String and u16.
    assert_eq!(len, 3);

    let second = registry.setter_of::<Item>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    registry.setter_of::<Vec<Item>>().unwrap();
    assert_eq!(registry.len(), len + 1);
}

#[test]
fn registries_are_independent() {
    let left = Registry::new();
    let right = Registry::new();

    left.setter_of::<Order>().unwrap();
    assert!(!left.is_empty());
    assert!(right.is_empty());
}

#[test]
fn global_registry_decodes() {
    let value = json!({ "sku": "global", "quantity": 3 });
    let item: Item = decant::decode_new(&JsonValue(&value)).unwrap();
    assert_eq!(item.sku, "global");

    let mut item = item;
    decant::decode(&JsonValue(&json!({ "quantity": 4 })), &mut item).unwrap();
    assert_eq!(item.quantity, 4);
    assert_eq!(item.sku, "global");

    assert!(Registry::global().setter_of::<Item>().is_ok());
}

/// A source that fails once its budget of lookups is spent.
struct Budget<'a> {
    inner: JsonValue<'a>,
    remaining: &'a Cell<usize>,
}

impl Source for Budget<'_> {
    fn string(&self) -> Result<Cow<'_, str>, SourceError> {
        self.inner.string()
    }

    fn int(&self) -> Result<i64, SourceError> {
        self.inner.int()
    }

    fn container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Container for Budget<'_> {
    fn get(&self, name: &str) -> Result<Node<'_>, SourceError> {
        let Some(remaining) = self.remaining.get().checked_sub(1) else {
            return Err(SourceError::Custom(String::from("deadline exceeded")));
        };
        self.remaining.set(remaining);

        let inner = self.inner.0.get(name).ok_or(SourceError::NoValue)?;
        Ok(Box::new(Budget {
            inner: JsonValue(inner),
            remaining: self.remaining,
        }))
    }
}

#[test]
fn source_errors_abort_decode() {
    let value = json!({ "sku": "a", "quantity": 1 });
    let remaining = Cell::new(1);
    let source = Budget {
        inner: JsonValue(&value),
        remaining: &remaining,
    };

    let err = Registry::new().decode_new::<Item>(&source).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Lookup {
            source: SourceError::Custom(_)
        }
    ));
    assert_eq!(err.to_string(), "Field `quantity`: Lookup child: deadline exceeded");
}

#[test]
fn scalar_setter_applies_directly() {
    let setter = Registry::new().setter_of::<String>().unwrap();

    let mut name = String::new();
    setter(&StrValue::new("foobar"), &mut name).unwrap();
    assert_eq!(name, "foobar");
}
