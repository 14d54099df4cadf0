use crate::inference::context::InferenceContext;
use crate::inference::groups::GroupId;
use crate::model::ExprId;
use crate::types::Slot;

/// Tuple constructors and projections.
///
/// A constructor reads the tuple at its own arity. `fst`/`snd` read any tuple
/// as its first component and the rest, so a projection never fixes the
/// arity of its argument: `Tuple<A, ?>` is refined by every longer tuple
/// starting with `A`.
pub(super) fn derive(
    ctx: &mut InferenceContext<'_>,
    group: GroupId,
    tuples: &[ExprId],
    components: &[(usize, ExprId)],
    arity: Option<usize>,
) -> Slot {
    let top = ctx.model.types.tuple_top();
    let joined = ctx.meet_all(None, tuples);
    let Some(Some(tuple)) = ctx.model.types.meet(joined, Some(top)) else {
        return joined;
    };

    let width = arity.unwrap_or(2);
    let Some(mut slots) = ctx.model.types.tuple_view(tuple, width) else {
        return Some(tuple);
    };
    for &(i, e) in components {
        if i < width {
            let slot = ctx.slot(e);
            slots[i] = ctx.meet_or_keep(slots[i], slot);
        }
    }
    let candidate = ctx.model.types.make_tuple(slots, tuple);
    let tuple = ctx.meet_or_keep(Some(tuple), Some(candidate));

    for &t in tuples {
        ctx.narrow(group, t, tuple);
    }
    let slots = tuple.and_then(|id| ctx.model.types.tuple_view(id, width));
    if let Some(slots) = slots {
        for &(i, e) in components {
            if let Some(&slot) = slots.get(i) {
                ctx.narrow(group, e, slot);
            }
        }
    }
    tuple
}
