use crate::inference::context::InferenceContext;
use crate::inference::groups::GroupId;
use crate::model::{ExprId, ResourceId};
use crate::types::{Slot, TypeId};
use indexmap::IndexSet;

/// All members (and the resource) take the meet of their types.
pub(super) fn derive(
    ctx: &mut InferenceContext<'_>,
    group: GroupId,
    members: &IndexSet<ExprId>,
    resource: Option<ResourceId>,
) -> Slot {
    let start = resource.and_then(|r| ctx.model.resource_type(r));
    let members: Vec<ExprId> = members.iter().copied().collect();
    let best = ctx.meet_all(start, &members);
    if best.is_none() {
        return None;
    }
    for &e in &members {
        ctx.narrow(group, e, best);
    }
    if let Some(r) = resource {
        ctx.narrow_resource(r, best);
    }
    best
}

/// Narrow each position toward its declared type.
pub(super) fn derive_signature(ctx: &mut InferenceContext<'_>, group: GroupId, positions: &[(ExprId, TypeId)]) -> Slot {
    for &(e, declared) in positions {
        ctx.narrow(group, e, Some(declared));
    }
    None
}
