//! Worklist-based fixpoint solver over group families

use super::context::{InferenceContext, Phase};
use super::groups::GroupId;
use super::rules;
use crate::error::InferenceError;
use indexmap::IndexSet;
use tracing::{debug, trace};

/// Default bound on the number of dirty records drained per run.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Seeds every group once, then drains the work queues until quiescent.
pub(crate) struct FixpointSolver;

impl FixpointSolver {
    /// Derive every group in collection order.
    pub(crate) fn seed(ctx: &mut InferenceContext<'_>) {
        ctx.phase = Phase::Seeding;
        let ids: Vec<GroupId> = ctx.groups.ids().collect();
        for id in ids {
            rules::derive(ctx, id);
        }
        debug!(
            writes = ctx.seeded_writes,
            dirty = ctx.queues.len(),
            "seeded groups"
        );
    }

    /// Propagate changes until no group is dirty.
    ///
    /// Taking a dirty record re-derives every other group that contains one
    /// of the record's changed expressions. Returns the number of records
    /// drained.
    pub(crate) fn drain(ctx: &mut InferenceContext<'_>, step_limit: usize) -> Result<usize, InferenceError> {
        ctx.phase = Phase::Propagating;
        let mut steps = 0;

        while let Some(record) = ctx.queues.pop() {
            steps += 1;
            if steps > step_limit {
                return Err(InferenceError::StepLimitExceeded { limit: step_limit });
            }
            trace!(
                family = ?record.family,
                group = record.group.index(),
                changed = record.exprs.len(),
                "draining dirty group"
            );

            let mut affected: IndexSet<GroupId> = IndexSet::new();
            for &expr in &record.exprs {
                affected.extend(ctx.groups.containing(expr).iter().copied().filter(|g| *g != record.group));
            }
            for group in affected {
                rules::derive(ctx, group);
            }
        }

        debug!(steps, writes = ctx.propagated_writes, "reached fixpoint");
        Ok(steps)
    }
}
