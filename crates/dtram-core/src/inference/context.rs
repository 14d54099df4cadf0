//! Mutable state of one inference run
//!
//! Every slot write in the engine goes through [`InferenceContext::narrow`]
//! or [`InferenceContext::narrow_resource`]: the new type is the meet of the
//! current and the proposed type, so a slot only ever becomes more specific.

use super::groups::{GroupArena, GroupId};
use super::queue::{DrainOrder, WorkQueues};
use crate::model::{ArchitectureModel, ExprId, ResourceId};
use crate::types::{Slot, TypeId};
use serde::Serialize;
use tracing::trace;

/// The cell a write went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteTarget {
    Expr(ExprId),
    Resource(ResourceId),
}

/// One recorded slot write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotWrite {
    pub target: WriteTarget,
    pub before: Slot,
    pub after: Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Seeding,
    Propagating,
}

pub(crate) struct InferenceContext<'m> {
    pub(crate) model: &'m mut ArchitectureModel,
    pub(crate) groups: GroupArena,
    pub(crate) queues: WorkQueues,
    pub(crate) phase: Phase,
    pub(crate) seeded_writes: usize,
    pub(crate) propagated_writes: usize,
    depth_limit: usize,
    trace: Option<Vec<SlotWrite>>,
}

impl<'m> InferenceContext<'m> {
    pub(crate) fn new(
        model: &'m mut ArchitectureModel,
        groups: GroupArena,
        order: DrainOrder,
        depth_limit: usize,
        record_writes: bool,
    ) -> Self {
        Self {
            model,
            groups,
            queues: WorkQueues::new(order),
            phase: Phase::Seeding,
            seeded_writes: 0,
            propagated_writes: 0,
            depth_limit,
            trace: record_writes.then(Vec::new),
        }
    }

    pub(crate) fn slot(&self, expr: ExprId) -> Slot {
        self.model.expr_type(expr)
    }

    /// Meet of `start` and the types of `exprs`.
    ///
    /// The result does not depend on the order of `exprs`. A type that has no
    /// meet with some other member type is left out, together with that
    /// other type; the rest are folded in rendering order.
    pub(crate) fn meet_all(&mut self, start: Slot, exprs: &[ExprId]) -> Slot {
        let mut known: Vec<TypeId> = start
            .into_iter()
            .chain(exprs.iter().filter_map(|&e| self.slot(e)))
            .collect();
        known.sort_unstable();
        known.dedup();

        let types = &mut self.model.types;
        let mut conflicting = vec![false; known.len()];
        for i in 0..known.len() {
            for j in i + 1..known.len() {
                if types.meet(Some(known[i]), Some(known[j])).is_none() {
                    conflicting[i] = true;
                    conflicting[j] = true;
                }
            }
        }
        let mut compatible: Vec<TypeId> = known
            .iter()
            .zip(&conflicting)
            .filter_map(|(&t, &c)| (!c).then_some(t))
            .collect();
        if compatible.len() < known.len() {
            trace!(left_out = known.len() - compatible.len(), "conflicting group members");
        }
        compatible.sort_by_cached_key(|&t| types.display(Some(t)).to_string());
        compatible
            .into_iter()
            .fold(None, |acc, t| types.meet(acc, Some(t)).unwrap_or(acc))
    }

    /// Meet `a` and `b`, keeping `a` when they are incompatible.
    pub(crate) fn meet_or_keep(&mut self, a: Slot, b: Slot) -> Slot {
        self.model.types.meet(a, b).unwrap_or(a)
    }

    /// Narrow an expression slot toward `proposed` on behalf of `group`.
    ///
    /// Returns the slot's type after the write attempt.
    pub(crate) fn narrow(&mut self, group: GroupId, expr: ExprId, proposed: Slot) -> Slot {
        let current = self.slot(expr);
        let Some(next) = self.accept(current, proposed) else {
            return current;
        };
        self.model.set_expr_type(expr, next);
        self.record(WriteTarget::Expr(expr), current, next);
        let family = self.groups.get(group).family;
        self.queues.push(family, group, expr);
        next
    }

    /// Narrow a resource's state type. Only its resource group reads it, so
    /// nothing is enqueued.
    pub(crate) fn narrow_resource(&mut self, resource: ResourceId, proposed: Slot) -> Slot {
        let current = self.model.resource_type(resource);
        let Some(next) = self.accept(current, proposed) else {
            return current;
        };
        self.model.set_resource_type(resource, next);
        self.record(WriteTarget::Resource(resource), current, next);
        next
    }

    /// The value to write, or `None` when the write would be a no-op, a
    /// conflict or too deeply nested.
    fn accept(&mut self, current: Slot, proposed: Slot) -> Option<Slot> {
        let next = match self.model.types.meet(current, proposed) {
            Some(next) => next,
            None => {
                trace!(
                    current = %self.model.types.display(current),
                    proposed = %self.model.types.display(proposed),
                    "skipping conflicting write"
                );
                return None;
            }
        };
        if next == current {
            return None;
        }
        if let Some(id) = next {
            if self.model.types.depth(id) > self.depth_limit {
                trace!(ty = %self.model.types.display(next), "skipping write past depth limit");
                return None;
            }
        }
        debug_assert!(
            self.model.types.refines(next, current),
            "write must refine the previous type"
        );
        Some(next)
    }

    fn record(&mut self, target: WriteTarget, before: Slot, after: Slot) {
        trace!(
            ?target,
            before = %self.model.types.display(before),
            after = %self.model.types.display(after),
            "narrowed slot"
        );
        match self.phase {
            Phase::Seeding => self.seeded_writes += 1,
            Phase::Propagating => self.propagated_writes += 1,
        }
        if let Some(trace) = &mut self.trace {
            trace.push(SlotWrite { target, before, after });
        }
    }

    pub(crate) fn take_trace(&mut self) -> Vec<SlotWrite> {
        self.trace.take().unwrap_or_default()
    }
}
