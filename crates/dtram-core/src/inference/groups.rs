//! Equivalence groups
//!
//! A group is a set of expression occurrences whose types constrain each
//! other. Scalar groups (resource, variable, message and the variable-like
//! pseudo-groups) make every member share one type; structural groups tie a
//! compound slot to the component slots of one operator occurrence.

use crate::model::{ExprId, ResourceId};
use crate::types::{Slot, TypeId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// The eight group families, each with its own work queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Resource,
    Variable,
    Message,
    List,
    Tuple,
    Pair,
    Map,
    Json,
}

impl Family {
    pub const ALL: [Family; 8] = [
        Family::Resource,
        Family::Variable,
        Family::Message,
        Family::List,
        Family::Tuple,
        Family::Pair,
        Family::Map,
        Family::Json,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) u32);

impl GroupId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) type Exprs = SmallVec<[ExprId; 2]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GroupKind {
    /// Every member (and the resource, if any) carries one shared type.
    Unify {
        members: IndexSet<ExprId>,
        resource: Option<ResourceId>,
    },
    /// Positions of one term narrowed toward its symbol's declared types.
    Signature { positions: SmallVec<[(ExprId, TypeId); 4]> },
    /// `lists` share one list type whose element type all `elements` share.
    List { lists: Exprs, elements: Exprs },
    /// `components` hold `(index, expr)`; `arity` is known for `tuple(...)`.
    Tuple {
        tuples: Exprs,
        components: SmallVec<[(usize, ExprId); 4]>,
        arity: Option<usize>,
    },
    Pair { pairs: Exprs, elements: Exprs },
    Map { maps: Exprs, keys: Exprs, values: Exprs },
    /// `json = addMember(prior, member, value)`
    AddMember {
        json: ExprId,
        prior: ExprId,
        member: String,
        value: ExprId,
    },
    /// `value = dot(json, member)`
    Dot { json: ExprId, member: String, value: ExprId },
    /// `value = dotParam(container, key)` on a list or a map
    DotParam { container: ExprId, key: ExprId, value: ExprId },
}

impl GroupKind {
    /// Every expression the group constrains.
    pub(crate) fn exprs(&self) -> Vec<ExprId> {
        match self {
            GroupKind::Unify { members, .. } => members.iter().copied().collect(),
            GroupKind::Signature { positions } => positions.iter().map(|(e, _)| *e).collect(),
            GroupKind::List { lists, elements } => lists.iter().chain(elements).copied().collect(),
            GroupKind::Tuple { tuples, components, .. } => tuples
                .iter()
                .copied()
                .chain(components.iter().map(|(_, e)| *e))
                .collect(),
            GroupKind::Pair { pairs, elements } => pairs.iter().chain(elements).copied().collect(),
            GroupKind::Map { maps, keys, values } => maps.iter().chain(keys).chain(values).copied().collect(),
            GroupKind::AddMember { json, prior, value, .. } => vec![*json, *prior, *value],
            GroupKind::Dot { json, value, .. } => vec![*json, *value],
            GroupKind::DotParam { container, key, value } => vec![*container, *key, *value],
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Group {
    pub(crate) family: Family,
    pub(crate) kind: GroupKind,
    /// Best type known so far for the group's compound (or shared) slot.
    pub(crate) ty: Slot,
}

/// Identity of a lazily created scalar group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum GroupKey {
    Resource(ResourceId),
    Variable { transition: usize, name: String },
    Message { channel: usize, position: Option<usize> },
}

impl GroupKey {
    pub(crate) fn family(&self) -> Family {
        match self {
            GroupKey::Resource(_) => Family::Resource,
            GroupKey::Variable { .. } => Family::Variable,
            GroupKey::Message { .. } => Family::Message,
        }
    }
}

/// All groups of one inference run, indexed by the expressions they touch.
#[derive(Debug, Default)]
pub(crate) struct GroupArena {
    groups: Vec<Group>,
    by_expr: HashMap<ExprId, SmallVec<[GroupId; 4]>>,
}

impl GroupArena {
    pub(crate) fn add(&mut self, family: Family, kind: GroupKind) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        for expr in kind.exprs() {
            let entry = self.by_expr.entry(expr).or_default();
            if !entry.contains(&id) {
                entry.push(id);
            }
        }
        self.groups.push(Group { family, kind, ty: None });
        id
    }

    pub(crate) fn get(&self, id: GroupId) -> &Group {
        &self.groups[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: GroupId) -> &mut Group {
        &mut self.groups[id.index()]
    }

    /// Groups constraining `expr`.
    pub(crate) fn containing(&self, expr: ExprId) -> &[GroupId] {
        self.by_expr.get(&expr).map(|g| g.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = GroupId> {
        (0..self.groups.len() as u32).map(GroupId)
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn count(&self, family: Family) -> usize {
        self.groups.iter().filter(|g| g.family == family).count()
    }

    pub(crate) fn resolved(&self) -> usize {
        self.groups.iter().filter(|g| g.ty.is_some()).count()
    }
}
