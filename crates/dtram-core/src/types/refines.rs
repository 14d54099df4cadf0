//! The refinement relation ("is at least as specific as")
//!
//! `refines(candidate, reference)` holds when `candidate` may overwrite a slot
//! currently holding `reference`. The relation is reflexive but not an order:
//! nested tuples are compared after flattening, so `Tuple<A, Tuple<B, C>>` and
//! `Tuple<A, B, C>` refine each other. A trailing unknown component stands for
//! any tail, so both also refine `Tuple<A, ?>`.

use super::lattice::{Components, Slot, TypeId, TypeKind, TypeTable};
use smallvec::smallvec;

impl TypeTable {
    /// Check whether `candidate` is at least as specific as `reference`.
    ///
    /// An unknown reference is refined by anything; an unknown candidate
    /// refines only an unknown reference.
    pub fn refines(&self, candidate: Slot, reference: Slot) -> bool {
        match (candidate, reference) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(candidate), Some(reference)) => self.refines_type(candidate, reference),
        }
    }

    pub(crate) fn refines_type(&self, candidate: TypeId, reference: TypeId) -> bool {
        if candidate == reference || self.is_ancestor(reference, candidate) {
            return true;
        }
        match (self.kind(candidate), self.kind(reference)) {
            (TypeKind::List(c), TypeKind::List(r)) | (TypeKind::Pair(c), TypeKind::Pair(r)) => self.refines(*c, *r),
            (TypeKind::Map(ck, cv), TypeKind::Map(rk, rv)) => self.refines(*ck, *rk) && self.refines(*cv, *rv),
            (TypeKind::Tuple(_), TypeKind::Tuple(r)) if r.is_empty() => true,
            (TypeKind::Tuple(c), TypeKind::Tuple(r))
                if c.len() == r.len() && c.iter().zip(r.iter()).all(|(c, r)| self.refines(*c, *r)) =>
            {
                true
            }
            (TypeKind::Tuple(_), TypeKind::Tuple(_)) => {
                let c = self.flatten_tuple(candidate);
                let Some(r) = self.spread_tail(self.flatten_tuple(reference), c.len()) else {
                    return false;
                };
                c.iter().zip(r.iter()).all(|(c, r)| self.refines(*c, *r))
            }
            (TypeKind::Json(c), TypeKind::Json(r)) => r
                .iter()
                .all(|(name, r)| c.get(name).is_some_and(|c| self.refines(*c, *r))),
            _ => false,
        }
    }

    /// Components of a tuple with nested tuples unfolded in place.
    ///
    /// A nested abstract tuple (no known components) is kept as one opaque
    /// component. Non-tuple types flatten to an empty list.
    pub fn flatten_tuple(&self, id: TypeId) -> Components {
        let mut out = Components::new();
        if let TypeKind::Tuple(components) = self.kind(id) {
            for component in components {
                match component {
                    Some(inner) if matches!(self.kind(*inner), TypeKind::Tuple(c) if !c.is_empty()) => {
                        out.extend(self.flatten_tuple(*inner));
                    }
                    other => out.push(*other),
                }
            }
        }
        out
    }

    /// Stretch flattened components to `width`.
    ///
    /// Only a trailing unknown or abstract tuple can stretch: it is replaced
    /// by unknowns up to `width`. Returns `None` when the arities cannot be
    /// reconciled.
    pub(crate) fn spread_tail(&self, mut components: Components, width: usize) -> Option<Components> {
        if components.len() == width {
            return Some(components);
        }
        if components.len() > width {
            return None;
        }
        let absorbs = match components.last()? {
            None => true,
            Some(last) => matches!(self.kind(*last), TypeKind::Tuple(c) if c.is_empty()),
        };
        if !absorbs {
            return None;
        }
        components.pop();
        components.resize(width, None);
        Some(components)
    }

    /// Components of tuple `id` read at `width` positions.
    ///
    /// The flattened components fill the first `width - 1` positions one by
    /// one and the last position takes the rest, as a tuple when more than
    /// one component remains. Equivalent tuples therefore read the same.
    /// The abstract tuple reads as `width` unknowns.
    pub fn tuple_view(&mut self, id: TypeId, width: usize) -> Option<Components> {
        match self.kind(id) {
            TypeKind::Tuple(c) if c.is_empty() => return Some(smallvec![None; width]),
            TypeKind::Tuple(_) => {}
            _ => return None,
        }
        let flat = self.flatten_tuple(id);
        if width == 0 || flat.len() <= width {
            return self.spread_tail(flat, width);
        }
        let top = self.tuple_top();
        let rest = self.make_tuple(flat[width - 1..].iter().copied().collect(), top);
        let mut view: Components = flat[..width - 1].iter().copied().collect();
        view.push(Some(rest));
        Some(view)
    }

    /// True when both types refine each other without being the same type.
    pub fn is_equivalent(&self, a: TypeId, b: TypeId) -> bool {
        a != b && self.refines_type(a, b) && self.refines_type(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn json(table: &mut TypeTable, members: &[(&str, TypeId)]) -> TypeId {
        let members: BTreeMap<String, Slot> = members.iter().map(|(n, t)| (n.to_string(), Some(*t))).collect();
        let top = table.json_top();
        table.make_json(members, top)
    }

    #[test]
    fn test_unknown_reference_is_refined_by_anything() {
        let table = TypeTable::new();
        assert!(table.refines(Some(table.int()), None));
        assert!(table.refines(None, None));
        assert!(!table.refines(None, Some(table.int())));
    }

    #[test]
    fn test_primitives_only_refine_themselves() {
        let table = TypeTable::new();
        assert!(table.refines(Some(table.int()), Some(table.int())));
        assert!(!table.refines(Some(table.int()), Some(table.double())));
    }

    #[test]
    fn test_list_refines_top_but_not_reverse() {
        let mut table = TypeTable::new();
        let top = table.list_top();
        let ints = table.make_list(Some(table.int()), top);
        assert!(table.refines(Some(ints), Some(top)));
        assert!(!table.refines(Some(top), Some(ints)));
    }

    #[test]
    fn test_map_componentwise() {
        let mut table = TypeTable::new();
        let (int, string) = (table.int(), table.string());
        let top = table.map_top();
        let keyed = table.make_map(Some(string), None, top);
        let full = table.make_map(Some(string), Some(int), top);
        let wrong = table.make_map(Some(int), Some(int), top);
        assert!(table.refines(Some(full), Some(keyed)));
        assert!(!table.refines(Some(keyed), Some(full)));
        assert!(!table.refines(Some(wrong), Some(keyed)));
    }

    #[test]
    fn test_json_superset_rule() {
        let mut table = TypeTable::new();
        let (int, string, boolean) = (table.int(), table.string(), table.boolean());
        let a = json(&mut table, &[("a", int)]);
        let ab = json(&mut table, &[("a", int), ("b", string)]);
        let ac = json(&mut table, &[("a", int), ("c", boolean)]);

        assert!(table.refines(Some(ab), Some(a)));
        assert!(!table.refines(Some(a), Some(ab)));
        assert!(!table.refines(Some(ac), Some(ab)));
        assert!(!table.refines(Some(ab), Some(ac)));
        assert!(table.refines(Some(a), Some(table.json_top())));
    }

    #[test]
    fn test_json_shared_member_must_refine() {
        let mut table = TypeTable::new();
        let (int, string) = (table.int(), table.string());
        let a_int = json(&mut table, &[("a", int)]);
        let a_str_b = json(&mut table, &[("a", string), ("b", int)]);
        assert!(!table.refines(Some(a_str_b), Some(a_int)));
    }

    #[test]
    fn test_tuple_flattening_makes_nested_and_flat_equivalent() {
        let mut table = TypeTable::new();
        let (int, string, boolean) = (table.int(), table.string(), table.boolean());
        let top = table.tuple_top();
        let inner = table.make_tuple(smallvec![Some(string), Some(boolean)], top);
        let nested = table.make_tuple(smallvec![Some(int), Some(inner)], top);
        let flat = table.make_tuple(smallvec![Some(int), Some(string), Some(boolean)], top);

        assert_eq!(table.flatten_tuple(nested).as_slice(), &[Some(int), Some(string), Some(boolean)]);
        assert!(table.refines(Some(nested), Some(flat)));
        assert!(table.refines(Some(flat), Some(nested)));
        assert!(table.is_equivalent(nested, flat));
    }

    #[test]
    fn test_tuple_arity_mismatch_after_flattening_does_not_refine() {
        let mut table = TypeTable::new();
        let int = table.int();
        let top = table.tuple_top();
        let two = table.make_tuple(smallvec![Some(int), Some(int)], top);
        let three = table.make_tuple(smallvec![Some(int), Some(int), Some(int)], top);
        assert!(!table.refines(Some(two), Some(three)));
        assert!(!table.refines(Some(three), Some(two)));
        assert!(table.refines(Some(three), Some(top)));
        assert!(!table.refines(Some(top), Some(two)));
    }

    #[test]
    fn test_tuple_with_unknown_component_is_less_specific() {
        let mut table = TypeTable::new();
        let (int, string) = (table.int(), table.string());
        let top = table.tuple_top();
        let partial = table.make_tuple(smallvec![Some(int), None], top);
        let full = table.make_tuple(smallvec![Some(int), Some(string)], top);
        assert!(table.refines(Some(full), Some(partial)));
        assert!(!table.refines(Some(partial), Some(full)));
    }

    #[test]
    fn test_unknown_component_is_refined_by_a_tuple() {
        let mut table = TypeTable::new();
        let (int, string, boolean) = (table.int(), table.string(), table.boolean());
        let top = table.tuple_top();
        let partial = table.make_tuple(smallvec![Some(int), None], top);
        let inner = table.make_tuple(smallvec![Some(string), Some(boolean)], top);
        let nested = table.make_tuple(smallvec![Some(int), Some(inner)], top);
        let flat = table.make_tuple(smallvec![Some(int), Some(string), Some(boolean)], top);

        assert!(table.refines(Some(nested), Some(partial)));
        // the trailing unknown takes the flattened tail
        assert!(table.refines(Some(flat), Some(partial)));
        assert!(!table.refines(Some(partial), Some(flat)));
    }

    #[test]
    fn test_only_a_trailing_unknown_takes_a_tail() {
        let mut table = TypeTable::new();
        let (int, string, boolean) = (table.int(), table.string(), table.boolean());
        let top = table.tuple_top();
        let flat = table.make_tuple(smallvec![Some(int), Some(string), Some(boolean)], top);
        let leading = table.make_tuple(smallvec![None, Some(boolean)], top);
        let opaque_tail = table.make_tuple(smallvec![Some(int), Some(top)], top);
        let closed = table.make_tuple(smallvec![Some(int), Some(string)], top);

        assert!(!table.refines(Some(flat), Some(leading)));
        assert!(table.refines(Some(flat), Some(opaque_tail)));
        assert!(!table.refines(Some(flat), Some(closed)));
    }

    #[test]
    fn test_tuple_view_reads_equivalent_tuples_alike() {
        let mut table = TypeTable::new();
        let (int, string, boolean) = (table.int(), table.string(), table.boolean());
        let top = table.tuple_top();
        let inner = table.make_tuple(smallvec![Some(string), Some(boolean)], top);
        let nested = table.make_tuple(smallvec![Some(int), Some(inner)], top);
        let flat = table.make_tuple(smallvec![Some(int), Some(string), Some(boolean)], top);
        let partial = table.make_tuple(smallvec![Some(int), None], top);

        let pair = [Some(int), Some(inner)];
        assert_eq!(table.tuple_view(nested, 2).as_deref(), Some(&pair[..]));
        assert_eq!(table.tuple_view(flat, 2).as_deref(), Some(&pair[..]));
        assert_eq!(
            table.tuple_view(nested, 3).as_deref(),
            Some(&[Some(int), Some(string), Some(boolean)][..])
        );
        assert_eq!(table.tuple_view(partial, 3).as_deref(), Some(&[Some(int), None, None][..]));
        assert_eq!(table.tuple_view(top, 2).as_deref(), Some(&[None, None][..]));
        assert_eq!(table.tuple_view(flat, 4), None);
    }

    #[test]
    fn test_nested_abstract_tuple_is_not_unfolded() {
        let mut table = TypeTable::new();
        let int = table.int();
        let top = table.tuple_top();
        let opaque = table.make_tuple(smallvec![Some(int), Some(top)], top);
        assert_eq!(table.flatten_tuple(opaque).as_slice(), &[Some(int), Some(top)]);
    }

    #[test]
    fn test_different_kinds_never_refine() {
        let mut table = TypeTable::new();
        let int = table.int();
        let (list, pair) = (table.list_top(), table.pair_top());
        let ints = table.make_list(Some(int), list);
        let pairs = table.make_pair(Some(int), pair);
        assert!(!table.refines(Some(ints), Some(pairs)));
        assert!(!table.refines(Some(pairs), Some(list)));
    }
}
