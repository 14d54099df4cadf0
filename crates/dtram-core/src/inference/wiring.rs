//! Operator roles wired to group slots
//!
//! One match arm per row of the role table: which child (or the term itself)
//! is the compound slot and which are the component slots.

use super::groups::{Family, GroupKind};
use crate::model::{ExprArena, ExprId, OperatorRole};
use indexmap::IndexSet;
use smallvec::smallvec;

/// Build the structural group for one occurrence of an operator.
///
/// Returns `None` for opaque symbols and for malformed occurrences (missing
/// children, a member key that is not a constant).
pub(crate) fn wire(
    role: OperatorRole,
    term: ExprId,
    children: &[ExprId],
    exprs: &ExprArena,
) -> Option<(Family, GroupKind)> {
    use OperatorRole as R;

    let arg = |i: usize| children.get(i).copied();
    let member_name = |e: ExprId| exprs.get(e).constant_text().map(str::to_string);

    let kind = match role {
        R::Cons => GroupKind::List {
            lists: smallvec![term, arg(1)?],
            elements: smallvec![arg(0)?],
        },
        R::Set => GroupKind::List {
            lists: smallvec![term, arg(0)?],
            elements: smallvec![arg(2)?],
        },
        R::Head | R::Get => GroupKind::List {
            lists: smallvec![arg(0)?],
            elements: smallvec![term],
        },
        R::Tail => GroupKind::List {
            lists: smallvec![term, arg(0)?],
            elements: smallvec![],
        },
        R::Tuple if children.is_empty() => return None,
        R::Tuple => GroupKind::Tuple {
            tuples: smallvec![term],
            components: children.iter().copied().enumerate().collect(),
            arity: Some(children.len()),
        },
        R::Fst | R::Snd => GroupKind::Tuple {
            tuples: smallvec![arg(0)?],
            components: smallvec![(usize::from(role == R::Snd), term)],
            arity: None,
        },
        R::Pair => GroupKind::Pair {
            pairs: smallvec![term],
            elements: smallvec![arg(0)?, arg(1)?],
        },
        R::Left | R::Right => GroupKind::Pair {
            pairs: smallvec![arg(0)?],
            elements: smallvec![term],
        },
        R::Lookup => GroupKind::Map {
            maps: smallvec![arg(0)?],
            keys: smallvec![arg(1)?],
            values: smallvec![term],
        },
        R::Insert => GroupKind::Map {
            maps: smallvec![term, arg(0)?],
            keys: smallvec![arg(1)?],
            values: smallvec![arg(2)?],
        },
        R::AddMember => GroupKind::AddMember {
            json: term,
            prior: arg(0)?,
            member: member_name(arg(1)?)?,
            value: arg(2)?,
        },
        R::Dot => GroupKind::Dot {
            json: arg(0)?,
            member: member_name(arg(1)?)?,
            value: term,
        },
        R::DotParam => GroupKind::DotParam {
            container: arg(0)?,
            key: arg(1)?,
            value: term,
        },
        R::Cond => GroupKind::Unify {
            members: IndexSet::from([term, arg(1)?, arg(2)?]),
            resource: None,
        },
        R::Arithmetic => GroupKind::Unify {
            members: IndexSet::from([term, arg(0)?, arg(1)?]),
            resource: None,
        },
        R::Opaque => return None,
    };

    let family = match &kind {
        GroupKind::List { .. } => Family::List,
        GroupKind::Tuple { .. } => Family::Tuple,
        GroupKind::Pair { .. } => Family::Pair,
        GroupKind::Map { .. } => Family::Map,
        GroupKind::AddMember { .. } | GroupKind::Dot { .. } | GroupKind::DotParam { .. } => Family::Json,
        GroupKind::Unify { .. } | GroupKind::Signature { .. } => Family::Variable,
    };
    Some((family, kind))
}
