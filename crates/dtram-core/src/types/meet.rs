//! Greatest lower bound of two slots
//!
//! Group members whose types are incomparable but share a kind are combined
//! componentwise, e.g. `Tuple<Int, ?>` and `Tuple<?, String>` meet at
//! `Tuple<Int, String>`, and `Json{a}` and `Json{b}` meet at `Json{a, b}`.
//! The result refines both inputs, so writing it never widens a slot.

use super::lattice::{Components, Slot, TypeId, TypeKind, TypeTable};
use std::cmp::Reverse;
use std::collections::BTreeMap;

impl TypeTable {
    /// Most general slot refining both `a` and `b`.
    ///
    /// Returns `None` when the two are incompatible (different kinds,
    /// different primitives, tuple arities that disagree after flattening
    /// and cannot be bridged by a trailing unknown).
    pub fn meet(&mut self, a: Slot, b: Slot) -> Option<Slot> {
        match (a, b) {
            (None, other) | (other, None) => Some(other),
            (Some(a), Some(b)) => self.meet_types(a, b).map(Some),
        }
    }

    fn meet_types(&mut self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if a == b {
            return Some(a);
        }
        if self.is_equivalent(a, b) {
            return Some(self.preferred(a, b));
        }
        if self.refines_type(a, b) {
            return Some(a);
        }
        if self.refines_type(b, a) {
            return Some(b);
        }

        match (self.kind(a).clone(), self.kind(b).clone()) {
            (TypeKind::List(x), TypeKind::List(y)) => {
                let element = self.meet(x, y)?;
                Some(self.make_list(element, a))
            }
            (TypeKind::Pair(x), TypeKind::Pair(y)) => {
                let element = self.meet(x, y)?;
                Some(self.make_pair(element, a))
            }
            (TypeKind::Map(k1, v1), TypeKind::Map(k2, v2)) => {
                let key = self.meet(k1, k2)?;
                let value = self.meet(v1, v2)?;
                Some(self.make_map(key, value, a))
            }
            (TypeKind::Tuple(x), TypeKind::Tuple(y)) => {
                if x.len() == y.len() {
                    if let Some(components) = self.meet_components(&x, &y) {
                        return Some(self.make_tuple(components, a));
                    }
                }
                let (x, y) = (self.flatten_tuple(a), self.flatten_tuple(b));
                let width = x.len().max(y.len());
                let x = self.spread_tail(x, width)?;
                let y = self.spread_tail(y, width)?;
                let components = self.meet_components(&x, &y)?;
                Some(self.make_tuple(components, a))
            }
            (TypeKind::Json(x), TypeKind::Json(mut y)) => {
                let mut members: BTreeMap<String, Slot> = BTreeMap::new();
                for (name, ty) in x {
                    let merged = match y.remove(&name) {
                        Some(other) => self.meet(ty, other)?,
                        None => ty,
                    };
                    members.insert(name, merged);
                }
                members.extend(y);
                Some(self.make_json(members, a))
            }
            _ => None,
        }
    }

    fn meet_components(&mut self, x: &[Slot], y: &[Slot]) -> Option<Components> {
        x.iter().zip(y).map(|(x, y)| self.meet(*x, *y)).collect()
    }

    /// Pick one of two mutually refining types independent of argument order
    /// and of the order in which the types were registered.
    ///
    /// The flatter tuple wins; ties go to the smaller rendering.
    fn preferred(&self, a: TypeId, b: TypeId) -> TypeId {
        let width = |id: TypeId| match self.kind(id) {
            TypeKind::Tuple(c) => c.len(),
            _ => 0,
        };
        let key = |id: TypeId| (Reverse(width(id)), self.display(Some(id)).to_string(), id);
        if key(a) <= key(b) {
            a
        } else {
            b
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_meet_with_unknown_is_identity() {
        let mut table = TypeTable::new();
        let int = table.int();
        assert_eq!(table.meet(None, Some(int)), Some(Some(int)));
        assert_eq!(table.meet(Some(int), None), Some(Some(int)));
        assert_eq!(table.meet(None, None), Some(None));
    }

    #[test]
    fn test_meet_of_distinct_primitives_is_incompatible() {
        let mut table = TypeTable::new();
        let (int, string) = (table.int(), table.string());
        assert_eq!(table.meet(Some(int), Some(string)), None);
    }

    #[test]
    fn test_meet_picks_more_specific() {
        let mut table = TypeTable::new();
        let top = table.list_top();
        let ints = table.make_list(Some(table.int()), top);
        assert_eq!(table.meet(Some(top), Some(ints)), Some(Some(ints)));
        assert_eq!(table.meet(Some(ints), Some(top)), Some(Some(ints)));
    }

    #[test]
    fn test_meet_combines_tuple_components() {
        let mut table = TypeTable::new();
        let (int, string) = (table.int(), table.string());
        let top = table.tuple_top();
        let left = table.make_tuple(smallvec![Some(int), None], top);
        let right = table.make_tuple(smallvec![None, Some(string)], top);
        let both = table.meet(Some(left), Some(right)).flatten();
        assert_eq!(both, table.lookup(&TypeKind::Tuple(smallvec![Some(int), Some(string)])));
        assert!(table.refines(both, Some(left)));
        assert!(table.refines(both, Some(right)));
    }

    #[test]
    fn test_meet_unions_json_members() {
        let mut table = TypeTable::new();
        let (int, string) = (table.int(), table.string());
        let top = table.json_top();
        let a = table.make_json(BTreeMap::from([("a".to_string(), Some(int))]), top);
        let b = table.make_json(BTreeMap::from([("b".to_string(), Some(string))]), top);
        let ab = table.meet(Some(a), Some(b)).flatten().expect("compatible records");
        match table.kind(ab) {
            TypeKind::Json(members) => assert_eq!(members.len(), 2),
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn test_meet_rejects_conflicting_json_member() {
        let mut table = TypeTable::new();
        let (int, string) = (table.int(), table.string());
        let top = table.json_top();
        let a = table.make_json(BTreeMap::from([("a".to_string(), Some(int)), ("x".to_string(), None)]), top);
        let b = table.make_json(BTreeMap::from([("a".to_string(), Some(string)), ("y".to_string(), None)]), top);
        assert_eq!(table.meet(Some(a), Some(b)), None);
    }

    #[test]
    fn test_meet_is_order_independent_for_equivalent_tuples() {
        let mut table = TypeTable::new();
        let (int, string, boolean) = (table.int(), table.string(), table.boolean());
        let top = table.tuple_top();
        let inner = table.make_tuple(smallvec![Some(string), Some(boolean)], top);
        let nested = table.make_tuple(smallvec![Some(int), Some(inner)], top);
        let flat = table.make_tuple(smallvec![Some(int), Some(string), Some(boolean)], top);
        assert_eq!(table.meet(Some(nested), Some(flat)), Some(Some(flat)));
        assert_eq!(table.meet(Some(flat), Some(nested)), Some(Some(flat)));
    }

    #[test]
    fn test_meet_spreads_a_trailing_unknown_over_a_longer_tuple() {
        let mut table = TypeTable::new();
        let (int, string, boolean) = (table.int(), table.string(), table.boolean());
        let top = table.tuple_top();
        let first = table.make_tuple(smallvec![Some(int), None], top);
        let rest = table.make_tuple(smallvec![None, Some(string), Some(boolean)], top);
        let flat = table.make_tuple(smallvec![Some(int), Some(string), Some(boolean)], top);

        assert_eq!(table.meet(Some(first), Some(flat)), Some(Some(flat)));
        assert_eq!(table.meet(Some(flat), Some(first)), Some(Some(flat)));
        assert_eq!(table.meet(Some(first), Some(rest)), Some(Some(flat)));

        let second = table.make_tuple(smallvec![None, Some(string)], top);
        assert_eq!(table.meet(Some(second), Some(flat)), None);
    }

    #[test]
    fn test_meet_of_equivalent_tuples_ignores_registration_order() {
        let mut table = TypeTable::new();
        let (int, string, boolean) = (table.int(), table.string(), table.boolean());
        let top = table.tuple_top();
        let ab = table.make_tuple(smallvec![Some(int), Some(string)], top);
        let bc = table.make_tuple(smallvec![Some(string), Some(boolean)], top);
        let left = table.make_tuple(smallvec![Some(ab), Some(boolean)], top);
        let right = table.make_tuple(smallvec![Some(int), Some(bc)], top);

        let expected = table.meet(Some(left), Some(right));
        assert_eq!(table.meet(Some(right), Some(left)), expected);
        assert_eq!(
            table.display(expected.flatten()).to_string(),
            "Tuple<Int, Tuple<String, Boolean>>"
        );
    }

    #[test]
    fn test_meet_of_different_kinds_is_incompatible() {
        let mut table = TypeTable::new();
        let (list, map) = (table.list_top(), table.map_top());
        assert_eq!(table.meet(Some(list), Some(map)), None);
    }
}
