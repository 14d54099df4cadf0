use crate::inference::context::InferenceContext;
use crate::inference::groups::GroupId;
use crate::model::ExprId;
use crate::types::{Slot, TypeId, TypeKind, TypeTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    List,
    Pair,
}

impl Shape {
    fn top(self, types: &TypeTable) -> TypeId {
        match self {
            Shape::List => types.list_top(),
            Shape::Pair => types.pair_top(),
        }
    }

    fn make(self, types: &mut TypeTable, element: Slot, parent: TypeId) -> TypeId {
        match self {
            Shape::List => types.make_list(element, parent),
            Shape::Pair => types.make_pair(element, parent),
        }
    }
}

fn element_of(types: &TypeTable, slot: Slot) -> Slot {
    match slot.map(|id| types.kind(id)) {
        Some(TypeKind::List(e)) | Some(TypeKind::Pair(e)) => *e,
        _ => None,
    }
}

pub(super) fn derive_list(ctx: &mut InferenceContext<'_>, group: GroupId, lists: &[ExprId], elements: &[ExprId]) -> Slot {
    derive_container(ctx, group, Shape::List, lists, elements)
}

pub(super) fn derive_pair(ctx: &mut InferenceContext<'_>, group: GroupId, pairs: &[ExprId], elements: &[ExprId]) -> Slot {
    derive_container(ctx, group, Shape::Pair, pairs, elements)
}

/// Shared rule for containers with a single element type.
///
/// `List<E>` for the container slots, `E` for the element slots, where the
/// container is at least the abstract top of its shape.
fn derive_container(
    ctx: &mut InferenceContext<'_>,
    group: GroupId,
    shape: Shape,
    containers: &[ExprId],
    elements: &[ExprId],
) -> Slot {
    let top = shape.top(&ctx.model.types);
    let joined = ctx.meet_all(None, containers);
    let Some(Some(container)) = ctx.model.types.meet(joined, Some(top)) else {
        return joined;
    };

    let element = element_of(&ctx.model.types, Some(container));
    let element = ctx.meet_all(element, elements);
    let candidate = shape.make(&mut ctx.model.types, element, container);
    let container = ctx.meet_or_keep(Some(container), Some(candidate));

    for &c in containers {
        ctx.narrow(group, c, container);
    }
    let element = element_of(&ctx.model.types, container);
    for &e in elements {
        ctx.narrow(group, e, element);
    }
    container
}
