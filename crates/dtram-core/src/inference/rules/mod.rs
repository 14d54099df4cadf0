//! Per-family derivation rules
//!
//! Deriving a group reads the current types of its members, computes the
//! most specific type consistent with all of them and writes it back to
//! every member slot. Each family has its own module:
//! - `unify`: resource, variable, message and variable-like groups
//! - `list`: list and pair groups (one homogeneous element type)
//! - `tuple`, `map`: tuple and map groups
//! - `json`: `addMember`, `dot` and `dotParam`

mod json;
mod list;
mod map;
mod tuple;
mod unify;

use super::context::InferenceContext;
use super::groups::{GroupId, GroupKind};
use crate::types::Slot;

/// Re-derive `group` from the current member types.
pub(crate) fn derive(ctx: &mut InferenceContext<'_>, group: GroupId) {
    let kind = ctx.groups.get(group).kind.clone();
    let ty: Slot = match &kind {
        GroupKind::Unify { members, resource } => unify::derive(ctx, group, members, *resource),
        GroupKind::Signature { positions } => unify::derive_signature(ctx, group, positions),
        GroupKind::List { lists, elements } => list::derive_list(ctx, group, lists, elements),
        GroupKind::Pair { pairs, elements } => list::derive_pair(ctx, group, pairs, elements),
        GroupKind::Tuple {
            tuples,
            components,
            arity,
        } => tuple::derive(ctx, group, tuples, components, *arity),
        GroupKind::Map { maps, keys, values } => map::derive(ctx, group, maps, keys, values),
        GroupKind::AddMember {
            json,
            prior,
            member,
            value,
        } => json::derive_add_member(ctx, group, *json, *prior, member, *value),
        GroupKind::Dot { json, member, value } => json::derive_dot(ctx, group, *json, member, *value),
        GroupKind::DotParam { container, key, value } => {
            json::derive_dot_param(ctx, group, *container, *key, *value)
        }
    };
    ctx.groups.get_mut(group).ty = ty;
}
