//! Canonical registry of structural types
//!
//! Types live in a [`TypeTable`] and are referred to by [`TypeId`] handles.
//! The table keeps one instance per shape, so two handles are equal exactly
//! when the shapes are equal. Every type records its parents and children,
//! forming a multi-parent DAG:
//! - Primitives are singletons, optionally registered under a parent
//! - Each composite kind has an abstract top (`List<?>`, `Tuple`, `Pair<?>`,
//!   `Map<?, ?>`, `Json{}`) and any number of refined descendants
//! - Creating a refined type re-links its siblings so the DAG stays consistent

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Handle to a type registered in a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A type cell: `None` means the type is still unconstrained.
pub type Slot = Option<TypeId>;

/// Component list of a tuple type.
pub type Components = SmallVec<[Slot; 4]>;

/// The shape of a type. Equal shapes are interned to the same [`TypeId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(String),
    List(Slot),
    /// An empty component list is the abstract tuple top.
    Tuple(Components),
    Pair(Slot),
    Map(Slot, Slot),
    /// Open-ended record; members are kept sorted by name.
    Json(BTreeMap<String, Slot>),
}

impl TypeKind {
    pub fn is_same_kind(&self, other: &TypeKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Primitive types every table starts with.
pub const BUILTIN_PRIMITIVES: &[&str] = &["Int", "Long", "Float", "Double", "Boolean", "Char", "String", "Void"];

#[derive(Debug, Clone, Copy)]
struct Tops {
    list: TypeId,
    tuple: TypeId,
    pair: TypeId,
    map: TypeId,
    json: TypeId,
}

/// The type lattice of one architecture model.
#[derive(Debug, Clone)]
pub struct TypeTable {
    kinds: Vec<TypeKind>,
    parents: Vec<SmallVec<[TypeId; 2]>>,
    children: Vec<SmallVec<[TypeId; 4]>>,
    registry: HashMap<TypeKind, TypeId>,
    tops: Tops,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            kinds: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
            registry: HashMap::new(),
            tops: Tops {
                list: TypeId(0),
                tuple: TypeId(0),
                pair: TypeId(0),
                map: TypeId(0),
                json: TypeId(0),
            },
        };

        for name in BUILTIN_PRIMITIVES {
            table.insert_root(TypeKind::Primitive((*name).to_string()));
        }
        table.tops = Tops {
            list: table.insert_root(TypeKind::List(None)),
            tuple: table.insert_root(TypeKind::Tuple(SmallVec::new())),
            pair: table.insert_root(TypeKind::Pair(None)),
            map: table.insert_root(TypeKind::Map(None, None)),
            json: table.insert_root(TypeKind::Json(BTreeMap::new())),
        };
        table
    }

    /// Register the primitive-parametrized descendants of the abstract tops.
    ///
    /// Idempotent: the shapes are canonical, so a second call finds them all.
    pub fn register_builtins(&mut self) {
        let (int, string, double) = (self.int(), self.string(), self.double());
        let (list, pair, map) = (self.list_top(), self.pair_top(), self.map_top());

        self.make_list(Some(int), list);
        self.make_list(Some(string), list);
        self.make_pair(Some(int), pair);
        self.make_pair(Some(string), pair);
        self.make_pair(Some(double), pair);
        self.make_map(Some(string), None, map);
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.index()]
    }

    pub fn parents(&self, id: TypeId) -> &[TypeId] {
        &self.parents[id.index()]
    }

    pub fn children(&self, id: TypeId) -> &[TypeId] {
        &self.children[id.index()]
    }

    /// Look up a type by shape without creating it.
    pub fn lookup(&self, kind: &TypeKind) -> Option<TypeId> {
        self.registry.get(kind).copied()
    }

    pub fn primitive(&self, name: &str) -> Option<TypeId> {
        self.lookup(&TypeKind::Primitive(name.to_string()))
    }

    /// Register a primitive, optionally below an existing type.
    pub fn register_primitive(&mut self, name: &str, parent: Option<TypeId>) -> TypeId {
        let kind = TypeKind::Primitive(name.to_string());
        match parent {
            Some(parent) => self.intern(kind, parent),
            None => self.insert_root(kind),
        }
    }

    pub fn int(&self) -> TypeId {
        self.builtin("Int")
    }

    pub fn double(&self) -> TypeId {
        self.builtin("Double")
    }

    pub fn boolean(&self) -> TypeId {
        self.builtin("Boolean")
    }

    pub fn string(&self) -> TypeId {
        self.builtin("String")
    }

    fn builtin(&self, name: &str) -> TypeId {
        // Index matches the insertion order in `new`.
        let index = BUILTIN_PRIMITIVES.iter().position(|p| *p == name).unwrap_or(0);
        TypeId(index as u32)
    }

    pub fn list_top(&self) -> TypeId {
        self.tops.list
    }

    pub fn tuple_top(&self) -> TypeId {
        self.tops.tuple
    }

    pub fn pair_top(&self) -> TypeId {
        self.tops.pair
    }

    pub fn map_top(&self) -> TypeId {
        self.tops.map
    }

    pub fn json_top(&self) -> TypeId {
        self.tops.json
    }

    /// The abstract top of the kind of `id`, or `None` for primitives.
    pub fn top_of(&self, id: TypeId) -> Option<TypeId> {
        match self.kind(id) {
            TypeKind::Primitive(_) => None,
            TypeKind::List(_) => Some(self.tops.list),
            TypeKind::Tuple(_) => Some(self.tops.tuple),
            TypeKind::Pair(_) => Some(self.tops.pair),
            TypeKind::Map(_, _) => Some(self.tops.map),
            TypeKind::Json(_) => Some(self.tops.json),
        }
    }

    pub fn make_list(&mut self, element: Slot, parent: TypeId) -> TypeId {
        self.intern(TypeKind::List(element), parent)
    }

    pub fn make_tuple(&mut self, components: Components, parent: TypeId) -> TypeId {
        self.intern(TypeKind::Tuple(components), parent)
    }

    pub fn make_pair(&mut self, element: Slot, parent: TypeId) -> TypeId {
        self.intern(TypeKind::Pair(element), parent)
    }

    pub fn make_map(&mut self, key: Slot, value: Slot, parent: TypeId) -> TypeId {
        self.intern(TypeKind::Map(key, value), parent)
    }

    pub fn make_json(&mut self, members: BTreeMap<String, Slot>, parent: TypeId) -> TypeId {
        self.intern(TypeKind::Json(members), parent)
    }

    /// Nesting depth of a type: primitives and tops are 1.
    pub fn depth(&self, id: TypeId) -> usize {
        let slot_depth = |s: &Slot| s.map_or(0, |t| self.depth(t));
        let inner = match self.kind(id) {
            TypeKind::Primitive(_) => 0,
            TypeKind::List(e) | TypeKind::Pair(e) => slot_depth(e),
            TypeKind::Tuple(cs) => cs.iter().map(slot_depth).max().unwrap_or(0),
            TypeKind::Map(k, v) => slot_depth(k).max(slot_depth(v)),
            TypeKind::Json(members) => members.values().map(slot_depth).max().unwrap_or(0),
        };
        inner + 1
    }

    /// True if `ancestor` is reachable from `id` through parent edges.
    pub fn is_ancestor(&self, ancestor: TypeId, id: TypeId) -> bool {
        let mut stack: Vec<TypeId> = self.parents(id).to_vec();
        let mut seen = HashSet::new();
        while let Some(next) = stack.pop() {
            if next == ancestor {
                return true;
            }
            if seen.insert(next) {
                stack.extend_from_slice(self.parents(next));
            }
        }
        false
    }

    /// All types reachable from `id` through child edges, excluding `id`.
    pub fn descendants(&self, id: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut stack: Vec<TypeId> = self.children(id).to_vec();
        let mut seen = HashSet::new();
        while let Some(next) = stack.pop() {
            if seen.insert(next) {
                out.push(next);
                stack.extend_from_slice(self.children(next));
            }
        }
        out
    }

    fn insert_root(&mut self, kind: TypeKind) -> TypeId {
        if let Some(id) = self.lookup(&kind) {
            return id;
        }
        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind.clone());
        self.parents.push(SmallVec::new());
        self.children.push(SmallVec::new());
        self.registry.insert(kind, id);
        id
    }

    /// Return the canonical instance of `kind`, creating it below `parent`.
    fn intern(&mut self, kind: TypeKind, parent: TypeId) -> TypeId {
        if let Some(id) = self.lookup(&kind) {
            return id;
        }
        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind.clone());
        self.parents.push(smallvec![parent]);
        self.children.push(SmallVec::new());
        self.children[parent.index()].push(id);
        self.registry.insert(kind, id);
        self.relink(id, parent);
        tracing::trace!(ty = %self.display(Some(id)), "registered type");
        id
    }

    /// Place a freshly created type among the existing descendants of its parent.
    fn relink(&mut self, new: TypeId, parent: TypeId) {
        for existing in self.descendants(parent) {
            if existing == new {
                continue;
            }
            let below = self.refines_type(existing, new);
            let above = self.refines_type(new, existing);
            if below && !above {
                self.insert_between(existing, new, parent);
            } else if above && !below && !self.parents(new).contains(&existing) {
                self.add_edge(existing, new);
            }
        }
        self.prune_redundant_parents(new);
    }

    /// Make `new` a parent of `existing`, replacing `parent` when it is a direct parent.
    fn insert_between(&mut self, existing: TypeId, new: TypeId, parent: TypeId) {
        if self.parents(existing).contains(&new) {
            return;
        }
        if self.parents(existing).contains(&parent) {
            self.remove_edge(parent, existing);
            self.add_edge(new, existing);
        } else if !self.parents(existing).iter().any(|&p| self.refines_type(p, new)) {
            self.add_edge(new, existing);
        }
    }

    /// Drop parents of `id` that are already ancestors of another of its parents.
    fn prune_redundant_parents(&mut self, id: TypeId) {
        let parents = self.parents(id).to_vec();
        for &p in &parents {
            let redundant = parents.iter().any(|&q| q != p && self.is_ancestor(p, q));
            if redundant && self.parents(id).len() > 1 {
                self.remove_edge(p, id);
            }
        }
    }

    fn add_edge(&mut self, parent: TypeId, child: TypeId) {
        self.parents[child.index()].push(parent);
        self.children[parent.index()].push(child);
    }

    fn remove_edge(&mut self, parent: TypeId, child: TypeId) {
        self.parents[child.index()].retain(|p| *p != parent);
        self.children[parent.index()].retain(|c| *c != child);
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_list_is_canonical() {
        let mut table = TypeTable::new();
        let top = table.list_top();
        let a = table.make_list(Some(table.int()), top);
        let b = table.make_list(Some(table.int()), top);
        assert_eq!(a, b);
        assert_ne!(a, table.make_list(Some(table.string()), top));
    }

    #[test]
    fn test_builtins_are_idempotent() {
        let mut table = TypeTable::new();
        table.register_builtins();
        let size = table.len();
        table.register_builtins();
        assert_eq!(table.len(), size);
    }

    #[test]
    fn test_primitive_lookup() {
        let table = TypeTable::new();
        assert_eq!(table.primitive("Int"), Some(table.int()));
        assert_eq!(table.primitive("String"), Some(table.string()));
        assert_eq!(table.primitive("Decimal"), None);
        assert_eq!(table.top_of(table.int()), None);
    }

    #[test]
    fn test_new_type_is_inserted_between_parent_and_refinement() {
        let mut table = TypeTable::new();
        let int = table.int();
        let top = table.tuple_top();
        let full = table.make_tuple(smallvec![Some(int), Some(int)], top);
        assert_eq!(table.parents(full), &[top]);

        let partial = table.make_tuple(smallvec![Some(int), None], top);
        assert_eq!(table.parents(full), &[partial]);
        assert_eq!(table.parents(partial), &[top]);
        assert!(table.is_ancestor(top, full));
        assert!(!table.children(top).contains(&full));
    }

    #[test]
    fn test_new_type_adopts_existing_ancestor() {
        let mut table = TypeTable::new();
        let (int, string) = (table.int(), table.string());
        let top = table.json_top();
        let id_only = table.make_json(BTreeMap::from([("id".to_string(), Some(int))]), top);
        let both = table.make_json(
            BTreeMap::from([("id".to_string(), Some(int)), ("name".to_string(), Some(string))]),
            top,
        );
        assert_eq!(table.parents(both), &[id_only]);
        assert_eq!(table.descendants(top).len(), 2);
    }

    #[test]
    fn test_registered_primitive_parent() {
        let mut table = TypeTable::new();
        let number = table.register_primitive("Number", None);
        let natural = table.register_primitive("Natural", Some(number));
        assert!(table.is_ancestor(number, natural));
        assert!(!table.is_ancestor(natural, number));
    }
}
