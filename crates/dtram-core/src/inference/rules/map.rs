use crate::inference::context::InferenceContext;
use crate::inference::groups::GroupId;
use crate::model::ExprId;
use crate::types::{Slot, TypeKind, TypeTable};

fn entry_of(types: &TypeTable, slot: Slot) -> (Slot, Slot) {
    match slot.map(|id| types.kind(id)) {
        Some(TypeKind::Map(k, v)) => (*k, *v),
        _ => (None, None),
    }
}

/// `Map<K, V>` for the map slots, `K` for the keys and `V` for the values.
pub(super) fn derive(
    ctx: &mut InferenceContext<'_>,
    group: GroupId,
    maps: &[ExprId],
    keys: &[ExprId],
    values: &[ExprId],
) -> Slot {
    let top = ctx.model.types.map_top();
    let joined = ctx.meet_all(None, maps);
    let Some(Some(map)) = ctx.model.types.meet(joined, Some(top)) else {
        return joined;
    };

    let (key, value) = entry_of(&ctx.model.types, Some(map));
    let key = ctx.meet_all(key, keys);
    let value = ctx.meet_all(value, values);
    let candidate = ctx.model.types.make_map(key, value, map);
    let map = ctx.meet_or_keep(Some(map), Some(candidate));

    for &m in maps {
        ctx.narrow(group, m, map);
    }
    let (key, value) = entry_of(&ctx.model.types, map);
    for &k in keys {
        ctx.narrow(group, k, key);
    }
    for &v in values {
        ctx.narrow(group, v, value);
    }
    map
}
