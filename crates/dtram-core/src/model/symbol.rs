//! Function symbols and their operator roles

use crate::error::{ModelError, Result};
use crate::types::{Slot, TypeId, TypeKind, TypeTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Handle to a symbol in a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => n == count,
            Arity::Variadic => true,
        }
    }
}

/// Declared argument and result types; `None` entries are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub args: Vec<Slot>,
    pub result: Slot,
}

/// A position in a term: its result or one of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Result,
    Arg(usize),
}

impl Signature {
    pub fn new(args: Vec<Slot>, result: Slot) -> Self {
        Self { args, result }
    }

    /// Declared types by position, skipping unconstrained ones.
    pub fn declared(&self) -> impl Iterator<Item = (Position, TypeId)> + '_ {
        let result = self.result.map(|t| (Position::Result, t));
        let args = self
            .args
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.map(|t| (Position::Arg(i), t)));
        result.into_iter().chain(args)
    }

    /// Positions sharing one declared list type, for each list type that
    /// appears more than once.
    pub fn repeated_list_positions(&self, types: &TypeTable) -> Vec<Vec<Position>> {
        let mut by_type: Vec<(TypeId, Vec<Position>)> = Vec::new();
        for (position, ty) in self.declared() {
            if !matches!(types.kind(ty), TypeKind::List(_)) {
                continue;
            }
            match by_type.iter_mut().find(|(t, _)| *t == ty) {
                Some((_, positions)) => positions.push(position),
                None => by_type.push((ty, vec![position])),
            }
        }
        by_type
            .into_iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(_, positions)| positions)
            .collect()
    }
}

/// How the engine treats applications of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorRole {
    /// `cons(head, list)`
    Cons,
    /// `set(list, index, element)`
    Set,
    /// `head(list)`
    Head,
    /// `get(list, index)`
    Get,
    /// `tail(list)`
    Tail,
    /// `tuple(c0, c1, ...)`
    Tuple,
    Fst,
    Snd,
    /// `pair(left, right)`, both sides share one element type
    Pair,
    Left,
    Right,
    /// `lookup(map, key)`
    Lookup,
    /// `insert(map, key, value)`
    Insert,
    /// `addMember(json, "name", value)`
    AddMember,
    /// `dot(json, "name")`
    Dot,
    /// `dotParam(container, key)` on a list or map
    DotParam,
    /// `cond(test, then, else)`
    Cond,
    /// `+`, `-`, `*`, `/`
    Arithmetic,
    /// User and message symbols carry no structural meaning.
    Opaque,
}

/// Built-in symbols: name, role, arity.
const BUILTINS: &[(&str, OperatorRole, Arity)] = &[
    ("cons", OperatorRole::Cons, Arity::Fixed(2)),
    ("set", OperatorRole::Set, Arity::Fixed(3)),
    ("head", OperatorRole::Head, Arity::Fixed(1)),
    ("get", OperatorRole::Get, Arity::Fixed(2)),
    ("tail", OperatorRole::Tail, Arity::Fixed(1)),
    ("tuple", OperatorRole::Tuple, Arity::Variadic),
    ("fst", OperatorRole::Fst, Arity::Fixed(1)),
    ("snd", OperatorRole::Snd, Arity::Fixed(1)),
    ("pair", OperatorRole::Pair, Arity::Fixed(2)),
    ("left", OperatorRole::Left, Arity::Fixed(1)),
    ("right", OperatorRole::Right, Arity::Fixed(1)),
    ("lookup", OperatorRole::Lookup, Arity::Fixed(2)),
    ("insert", OperatorRole::Insert, Arity::Fixed(3)),
    ("addMember", OperatorRole::AddMember, Arity::Fixed(3)),
    ("dot", OperatorRole::Dot, Arity::Fixed(2)),
    ("dotParam", OperatorRole::DotParam, Arity::Fixed(2)),
    ("cond", OperatorRole::Cond, Arity::Fixed(3)),
    ("+", OperatorRole::Arithmetic, Arity::Fixed(2)),
    ("-", OperatorRole::Arithmetic, Arity::Fixed(2)),
    ("*", OperatorRole::Arithmetic, Arity::Fixed(2)),
    ("/", OperatorRole::Arithmetic, Arity::Fixed(2)),
    ("nil", OperatorRole::Opaque, Arity::Fixed(0)),
];

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub arity: Arity,
    pub signature: Option<Signature>,
    pub role: OperatorRole,
}

/// Symbols known to a model, addressable by name.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn with_builtins(types: &TypeTable) -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            by_name: HashMap::new(),
        };
        for (name, role, arity) in BUILTINS {
            let signature = match role {
                OperatorRole::Get => Some(Signature::new(vec![None, Some(types.int())], None)),
                OperatorRole::Set => Some(Signature::new(vec![None, Some(types.int()), None], None)),
                OperatorRole::Cond => Some(Signature::new(vec![Some(types.boolean()), None, None], None)),
                _ => None,
            };
            table.insert(Symbol {
                name: (*name).to_string(),
                arity: *arity,
                signature,
                role: *role,
            });
        }
        table
    }

    /// Declare a user or message symbol.
    pub fn declare(&mut self, name: &str, arity: Arity, signature: Option<Signature>) -> Result<SymbolId> {
        if self.by_name.contains_key(name) {
            return Err(ModelError::DuplicateSymbol(name.to_string()));
        }
        if let (Arity::Fixed(expected), Some(sig)) = (arity, &signature) {
            if sig.args.len() != expected {
                return Err(ModelError::SignatureArity {
                    symbol: name.to_string(),
                    expected,
                    found: sig.args.len(),
                });
            }
        }
        Ok(self.insert(Symbol {
            name: name.to_string(),
            arity,
            signature,
            role: OperatorRole::Opaque,
        }))
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn insert(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.by_name.insert(symbol.name.clone(), id);
        self.symbols.push(symbol);
        id
    }
}
