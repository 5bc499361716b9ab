#![cfg(all(feature = "derive", feature = "json"))]

use std::{
    fmt::{Debug, Display},
    net::Ipv4Addr,
};

use bolero::generator::TypeGenerator;
use decant::{Decode, Registry, source::json::JsonValue, source::string::StrValue};
use serde_json::json;

fn text_round_trip<T>()
where
    T: Decode + TypeGenerator + Display + Debug + PartialEq,
{
    bolero::check!().with_type::<T>().for_each(|value: &T| {
        let text = value.to_string();
        let decoded: T = decant::decode_new(&StrValue::new(text.as_str())).unwrap();
        assert_eq!(&decoded, value);
    });
}

#[test]
fn prop_integers_round_trip_through_text() {
    text_round_trip::<i8>();
    text_round_trip::<i16>();
    text_round_trip::<i32>();
    text_round_trip::<i64>();
    text_round_trip::<isize>();
    text_round_trip::<u8>();
    text_round_trip::<u16>();
    text_round_trip::<u32>();
    text_round_trip::<u64>();
    text_round_trip::<usize>();
}

#[test]
fn prop_text_scalars_round_trip_through_text() {
    text_round_trip::<bool>();
    text_round_trip::<char>();
    text_round_trip::<String>();
}

#[test]
fn prop_floats_round_trip_through_text() {
    bolero::check!().with_type::<f64>().for_each(|value: &f64| {
        if value.is_nan() {
            return;
        }

        let decoded: f64 = decant::decode_new(&StrValue::new(value.to_string())).unwrap();
        assert_eq!(decoded, *value);
    });

    bolero::check!().with_type::<f32>().for_each(|value: &f32| {
        if value.is_nan() {
            return;
        }

        let decoded: f32 = decant::decode_new(&StrValue::new(value.to_string())).unwrap();
        assert_eq!(decoded, *value);
    });
}

#[test]
fn prop_addresses_round_trip_through_text() {
    bolero::check!().with_type::<u32>().for_each(|bits: &u32| {
        let address = Ipv4Addr::from(*bits);
        let decoded: Ipv4Addr =
            decant::decode_new(&StrValue::new(address.to_string())).unwrap();
        assert_eq!(decoded, address);
    });
}

#[derive(Debug, PartialEq, Decode)]
struct Entry {
    key: String,
    count: u16,
    labels: Vec<String>,
    parent: Option<Box<Entry>>,
}

#[test]
fn prop_decoding_is_deterministic() {
    bolero::check!()
        .with_type::<(String, u16, Vec<String>, Option<String>)>()
        .for_each(|(key, count, labels, parent)| {
            let mut value = json!({ "key": key, "count": count, "labels": labels });
            if let Some(parent) = parent {
                value["parent"] = json!({ "key": parent });
            }

            let registry = Registry::new();
            let first: Entry = registry.decode_new(&JsonValue(&value)).unwrap();
            let second: Entry = registry.decode_new(&JsonValue(&value)).unwrap();

            assert_eq!(first, second);
            assert_eq!(&first.key, key);
            assert_eq!(first.count, *count);
            assert_eq!(&first.labels, labels);
            assert_eq!(
                first.parent.map(|parent| parent.key),
                parent.clone()
            );
        });
}
