//! Record rules
//!
//! `addMember(prior, "m", v)` is `prior` with member `m` set to `v`;
//! `dot(r, "m")` reads member `m`. Records are open-ended, so every rule
//! only ever adds members or narrows member types.

use crate::inference::context::InferenceContext;
use crate::inference::groups::GroupId;
use crate::model::ExprId;
use crate::types::{Slot, TypeKind, TypeTable};
use std::collections::BTreeMap;

fn members_of(types: &TypeTable, slot: Slot) -> BTreeMap<String, Slot> {
    match slot.map(|id| types.kind(id)) {
        Some(TypeKind::Json(members)) => members.clone(),
        _ => BTreeMap::new(),
    }
}

fn is_record_or_unknown(types: &TypeTable, slot: Slot) -> bool {
    slot.map_or(true, |id| matches!(types.kind(id), TypeKind::Json(_)))
}

pub(super) fn derive_add_member(
    ctx: &mut InferenceContext<'_>,
    group: GroupId,
    json: ExprId,
    prior: ExprId,
    member: &str,
    value: ExprId,
) -> Slot {
    let top = ctx.model.types.json_top();
    let current = ctx.slot(json);
    let Some(Some(record)) = ctx.model.types.meet(current, Some(top)) else {
        return current;
    };

    // A prior that is not a record (e.g. `nil`) contributes no members.
    let prior_slot = ctx.slot(prior);
    let prior_is_record = is_record_or_unknown(&ctx.model.types, prior_slot);
    let mut members = members_of(&ctx.model.types, prior_slot);

    let existing = members_of(&ctx.model.types, Some(record)).get(member).copied().flatten();
    let value_slot = ctx.slot(value);
    let value_slot = ctx.meet_or_keep(value_slot, existing);
    members.insert(member.to_string(), value_slot);

    let candidate = ctx.model.types.make_json(members, top);
    let record = ctx.meet_or_keep(Some(record), Some(candidate));
    ctx.narrow(group, json, record);

    let mut members = members_of(&ctx.model.types, record);
    let member_type = members.remove(member).flatten();
    ctx.narrow(group, value, member_type);
    if prior_is_record {
        let rest = ctx.model.types.make_json(members, top);
        ctx.narrow(group, prior, Some(rest));
    }
    record
}

pub(super) fn derive_dot(
    ctx: &mut InferenceContext<'_>,
    group: GroupId,
    json: ExprId,
    member: &str,
    value: ExprId,
) -> Slot {
    let current = ctx.slot(json);
    if !is_record_or_unknown(&ctx.model.types, current) {
        return current;
    }
    let top = ctx.model.types.json_top();
    let record = ctx.meet_or_keep(current, Some(top));

    let existing = members_of(&ctx.model.types, record).get(member).copied().flatten();
    let value_slot = ctx.slot(value);
    let value_slot = ctx.meet_or_keep(value_slot, existing);
    let candidate = ctx
        .model
        .types
        .make_json(BTreeMap::from([(member.to_string(), value_slot)]), top);
    let record = ctx.meet_or_keep(record, Some(candidate));

    ctx.narrow(group, json, record);
    let member_type = members_of(&ctx.model.types, record).get(member).copied().flatten();
    ctx.narrow(group, value, member_type);
    record
}

/// `dotParam` on a list indexes by `Int`; on a map it reads a value.
/// An unknown container stays untouched.
pub(super) fn derive_dot_param(
    ctx: &mut InferenceContext<'_>,
    group: GroupId,
    container: ExprId,
    key: ExprId,
    value: ExprId,
) -> Slot {
    let current = ctx.slot(container);
    let Some(id) = current else {
        return None;
    };
    let (is_list, is_map) = match ctx.model.types.kind(id) {
        TypeKind::List(_) => (true, false),
        TypeKind::Map(_, _) => (false, true),
        _ => (false, false),
    };
    if is_list {
        let int = ctx.model.types.int();
        ctx.narrow(group, key, Some(int));
        super::list::derive_list(ctx, group, &[container], &[value])
    } else if is_map {
        super::map::derive(ctx, group, &[container], &[key], &[value])
    } else {
        current
    }
}
