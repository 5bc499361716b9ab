use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use super::{Decode, Growable, Indirect, Keyed, Shape, Width};
use crate::compile;

impl Decode for bool {
    fn zero() -> Self {
        false
    }

    fn shape() -> Shape<Self> {
        Shape::Bool(|target, value| *target = value)
    }
}

macro_rules! signed {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                fn zero() -> Self {
                    0
                }

                fn shape() -> Shape<Self> {
                    // Range-checked against the width before the cast.
                    Shape::Signed(Width::of::<$ty>(), |target, value| *target = value as $ty)
                }
            }
        )*
    };
}

macro_rules! unsigned {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                fn zero() -> Self {
                    0
                }

                fn shape() -> Shape<Self> {
                    Shape::Unsigned(Width::of::<$ty>(), |target, value| *target = value as $ty)
                }
            }
        )*
    };
}

signed!(i8, i16, i32, i64, isize);
unsigned!(u8, u16, u32, u64, usize);

impl Decode for f32 {
    fn zero() -> Self {
        0.0
    }

    fn shape() -> Shape<Self> {
        Shape::Float(Width::W32, |target, value| *target = value as f32)
    }
}

impl Decode for f64 {
    fn zero() -> Self {
        0.0
    }

    fn shape() -> Shape<Self> {
        Shape::Float(Width::W64, |target, value| *target = value)
    }
}

impl Decode for String {
    fn zero() -> Self {
        String::new()
    }

    fn shape() -> Shape<Self> {
        Shape::String(|target, value| *target = value)
    }
}

macro_rules! text {
    ($($ty:ty => $zero:expr),* $(,)?) => {
        $(
            impl Decode for $ty {
                fn zero() -> Self {
                    $zero
                }

                fn shape() -> Shape<Self> {
                    Shape::text()
                }
            }
        )*
    };
}

text!(
    char => '\0',
    IpAddr => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
    Ipv4Addr => Ipv4Addr::UNSPECIFIED,
    Ipv6Addr => Ipv6Addr::UNSPECIFIED,
    SocketAddr => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
    PathBuf => PathBuf::new(),
);

impl<T: Decode> Decode for Option<T> {
    fn zero() -> Self {
        None
    }

    fn shape() -> Shape<Self> {
        Shape::indirect()
    }
}

impl<T: Decode> Indirect for Option<T> {
    type Target = T;

    fn attach(&mut self, value: T) {
        *self = Some(value);
    }
}

impl<T: Decode> Decode for Box<T> {
    fn zero() -> Self {
        Box::new(T::zero())
    }

    fn shape() -> Shape<Self> {
        Shape::indirect()
    }
}

impl<T: Decode> Indirect for Box<T> {
    type Target = T;

    fn attach(&mut self, value: T) {
        *self = Box::new(value);
    }
}

impl<T: Decode> Decode for Arc<T> {
    fn zero() -> Self {
        Arc::new(T::zero())
    }

    fn shape() -> Shape<Self> {
        Shape::indirect()
    }
}

impl<T: Decode> Indirect for Arc<T> {
    type Target = T;

    fn attach(&mut self, value: T) {
        *self = Arc::new(value);
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn zero() -> Self {
        Vec::new()
    }

    fn shape() -> Shape<Self> {
        Shape::growable()
    }
}

impl<T: Decode> Growable for Vec<T> {
    type Item = T;

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push_zero(&mut self) -> &mut T {
        let idx = self.len();
        self.push(T::zero());
        &mut self[idx]
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn zero() -> Self {
        std::array::from_fn(|_| T::zero())
    }

    fn shape() -> Shape<Self> {
        Shape::Array(compile::array::<T, N>)
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Eq + Hash,
    V: Decode,
    S: BuildHasher + Default + 'static,
{
    fn zero() -> Self {
        HashMap::default()
    }

    fn shape() -> Shape<Self> {
        Shape::keyed()
    }
}

impl<K, V, S> Keyed for HashMap<K, V, S>
where
    K: Decode + Eq + Hash,
    V: Decode,
    S: BuildHasher + Default + 'static,
{
    type Key = K;
    type Value = V;

    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn zero() -> Self {
        BTreeMap::new()
    }

    fn shape() -> Shape<Self> {
        Shape::keyed()
    }
}

impl<K: Decode + Ord, V: Decode> Keyed for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }
}
