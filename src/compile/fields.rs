//! Resolving the decoded fields of a struct.
//!
//! Fields of flattened structs are promoted into the outer struct. The walk
//! is breadth-first, one embedding level at a time, and every struct type is
//! expanded at most once. When several fields end up under the same name:
//!
//! 1. Only the shallowest of them are considered.
//! 2. A single remaining field wins.
//! 3. Otherwise the one explicitly renamed field wins, if there is exactly
//!    one. If there is none or several, the name is ambiguous and no field is
//!    decoded under it.
//!
//! Resolved fields are ordered by the first time their name was seen.

use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tracing::debug;

use crate::shape::{Decode, Member, Shape, StructShape};

/// A field that takes part in decoding, as resolved for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// The name the field is looked up under.
    pub name: &'static str,
    /// The name of the field's type.
    pub type_name: &'static str,
    /// Positions of the field in its declaring struct and every struct it
    /// is embedded through, outermost first.
    pub index: Vec<usize>,
}

/// The fields of `T` that take part in decoding, in decoding order.
///
/// Empty if `T` is not a struct.
pub fn resolve_fields<T: Decode>() -> Vec<FieldInfo> {
    let Shape::Struct(shape) = T::shape() else {
        return Vec::new();
    };

    resolve(shape)
        .into_iter()
        .map(|field| FieldInfo {
            name: field.name,
            type_name: field.member.type_name(),
            index: field.index,
        })
        .collect()
}

pub(crate) struct Resolved<T> {
    pub(crate) name: &'static str,
    pub(crate) index: Vec<usize>,
    pub(crate) member: Arc<dyn Member<T>>,
}

struct Candidate<T> {
    field: Resolved<T>,
    depth: usize,
    explicit: bool,
}

/// A struct whose fields are walked at the current level.
struct Level<T> {
    shape: StructShape<T>,
    type_id: TypeId,
    index: Vec<usize>,
}

pub(crate) fn resolve<T: Decode>(shape: StructShape<T>) -> Vec<Resolved<T>> {
    let mut candidates = Vec::new();
    let mut visited = HashSet::new();

    let mut next = vec![Level {
        shape,
        type_id: TypeId::of::<T>(),
        index: Vec::new(),
    }];
    let mut next_count = HashMap::from([(TypeId::of::<T>(), 1usize)]);

    let mut depth = 0;
    while !next.is_empty() {
        let current = std::mem::take(&mut next);
        let count = std::mem::take(&mut next_count);

        for level in current {
            if !visited.insert(level.type_id) {
                continue;
            }

            // Embedded more than once at the previous level.
            let repeated = count.get(&level.type_id).copied().unwrap_or(0) > 1;

            for (position, field) in level.shape.fields.iter().enumerate() {
                let Some(member) = &field.member else {
                    continue;
                };

                let mut index = level.index.clone();
                index.push(position);

                if field.is_flattened() && !field.is_renamed() {
                    if let Some(inner) = member.flatten() {
                        let type_id = member.field_type();
                        let seen = next_count.entry(type_id).or_insert(0);
                        *seen += 1;
                        if *seen == 1 {
                            next.push(Level {
                                shape: inner,
                                type_id,
                                index,
                            });
                        }
                        continue;
                    }
                }

                let copies = if repeated { 2 } else { 1 };
                for _ in 0..copies {
                    candidates.push(Candidate {
                        field: Resolved {
                            name: field.name(),
                            index: index.clone(),
                            member: member.clone(),
                        },
                        depth,
                        explicit: field.is_renamed(),
                    });
                }
            }
        }

        depth += 1;
    }

    dominant(candidates)
}

fn dominant<T>(candidates: Vec<Candidate<T>>) -> Vec<Resolved<T>> {
    let mut order = Vec::new();
    let mut groups: HashMap<&'static str, Vec<Candidate<T>>> = HashMap::new();

    for candidate in candidates {
        let name = candidate.field.name;
        groups
            .entry(name)
            .or_insert_with(|| {
                order.push(name);
                Vec::new()
            })
            .push(candidate);
    }

    let mut resolved = Vec::with_capacity(order.len());
    for name in order {
        let Some(group) = groups.remove(name) else {
            continue;
        };

        let Some(shallowest) = group.iter().map(|candidate| candidate.depth).min() else {
            continue;
        };
        let mut tied: Vec<_> = group
            .into_iter()
            .filter(|candidate| candidate.depth == shallowest)
            .collect();

        if tied.len() == 1 {
            resolved.extend(tied.pop().map(|candidate| candidate.field));
            continue;
        }

        let mut explicit = tied.into_iter().filter(|candidate| candidate.explicit);
        match (explicit.next(), explicit.next()) {
            (Some(winner), None) => resolved.push(winner.field),
            _ => debug!(name, depth = shallowest, "dropping ambiguous field name"),
        }
    }

    resolved
}
