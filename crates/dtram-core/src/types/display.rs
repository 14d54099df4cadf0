//! Rendering types for diagnostics and for code generators

use super::lattice::{Slot, TypeKind, TypeTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Display adapter returned by [`TypeTable::display`].
pub struct TypeDisplay<'a> {
    table: &'a TypeTable,
    slot: Slot,
}

impl TypeTable {
    pub fn display(&self, slot: Slot) -> TypeDisplay<'_> {
        TypeDisplay { table: self, slot }
    }

    /// Owned tree description of a slot, independent of this table.
    pub fn describe(&self, slot: Slot) -> TypeDescriptor {
        let Some(id) = slot else {
            return TypeDescriptor::Unknown;
        };
        let boxed = |s: Slot| Box::new(self.describe(s));
        match self.kind(id) {
            TypeKind::Primitive(name) => TypeDescriptor::Primitive { name: name.clone() },
            TypeKind::List(e) => TypeDescriptor::List { element: boxed(*e) },
            TypeKind::Tuple(c) => TypeDescriptor::Tuple {
                components: c.iter().map(|s| self.describe(*s)).collect(),
            },
            TypeKind::Pair(e) => TypeDescriptor::Pair { element: boxed(*e) },
            TypeKind::Map(k, v) => TypeDescriptor::Map {
                key: boxed(*k),
                value: boxed(*v),
            },
            TypeKind::Json(m) => TypeDescriptor::Json {
                members: m.iter().map(|(n, s)| (n.clone(), self.describe(*s))).collect(),
            },
        }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(id) = self.slot else {
            return write!(f, "?");
        };
        let show = |s: Slot| self.table.display(s);
        match self.table.kind(id) {
            TypeKind::Primitive(name) => write!(f, "{name}"),
            TypeKind::List(e) => write!(f, "List<{}>", show(*e)),
            TypeKind::Pair(e) => write!(f, "Pair<{}>", show(*e)),
            TypeKind::Map(k, v) => write!(f, "Map<{}, {}>", show(*k), show(*v)),
            TypeKind::Tuple(c) if c.is_empty() => write!(f, "Tuple"),
            TypeKind::Tuple(c) => {
                write!(f, "Tuple<")?;
                for (i, s) in c.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", show(*s))?;
                }
                write!(f, ">")
            }
            TypeKind::Json(m) => {
                write!(f, "Json{{")?;
                for (i, (name, s)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {}", show(*s))?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A self-contained description of a type, handed to code generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Unknown,
    Primitive { name: String },
    List { element: Box<TypeDescriptor> },
    Tuple { components: Vec<TypeDescriptor> },
    Pair { element: Box<TypeDescriptor> },
    Map { key: Box<TypeDescriptor>, value: Box<TypeDescriptor> },
    Json { members: BTreeMap<String, TypeDescriptor> },
}

impl TypeDescriptor {
    /// True if no unknown remains anywhere in the tree.
    pub fn is_complete(&self) -> bool {
        match self {
            TypeDescriptor::Unknown => false,
            TypeDescriptor::Primitive { .. } => true,
            TypeDescriptor::List { element } | TypeDescriptor::Pair { element } => element.is_complete(),
            TypeDescriptor::Tuple { components } => !components.is_empty() && components.iter().all(Self::is_complete),
            TypeDescriptor::Map { key, value } => key.is_complete() && value.is_complete(),
            TypeDescriptor::Json { members } => members.values().all(Self::is_complete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_display_composites() {
        let mut table = TypeTable::new();
        let (int, string) = (table.int(), table.string());
        let (list, tuple, map, json) = (table.list_top(), table.tuple_top(), table.map_top(), table.json_top());
        let ints = table.make_list(Some(int), list);
        let pair = table.make_tuple(smallvec![Some(int), None], tuple);
        let dict = table.make_map(Some(string), Some(ints), map);
        let record = table.make_json(
            BTreeMap::from([("name".to_string(), Some(string)), ("id".to_string(), Some(int))]),
            json,
        );

        insta::assert_snapshot!(table.display(Some(ints)).to_string(), @"List<Int>");
        insta::assert_snapshot!(table.display(Some(pair)).to_string(), @"Tuple<Int, ?>");
        insta::assert_snapshot!(table.display(Some(dict)).to_string(), @"Map<String, List<Int>>");
        insta::assert_snapshot!(table.display(Some(record)).to_string(), @"Json{id: Int, name: String}");
        assert_eq!(table.display(None).to_string(), "?");
        assert_eq!(table.display(Some(tuple)).to_string(), "Tuple");
    }

    #[test]
    fn test_describe_serializes_tagged() {
        let mut table = TypeTable::new();
        let top = table.list_top();
        let ints = table.make_list(Some(table.int()), top);
        let json = serde_json::to_value(table.describe(Some(ints))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "list", "element": {"kind": "primitive", "name": "Int"}})
        );
    }

    #[test]
    fn test_descriptor_completeness() {
        let mut table = TypeTable::new();
        let top = table.map_top();
        let half = table.make_map(Some(table.string()), None, top);
        let full = table.make_map(Some(table.string()), Some(table.int()), top);
        assert!(!table.describe(Some(half)).is_complete());
        assert!(table.describe(Some(full)).is_complete());
        assert!(!table.describe(None).is_complete());
    }
}
