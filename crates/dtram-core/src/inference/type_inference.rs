//! Type inference entry point
//!
//! Collects groups, seeds every group once and propagates until no group is
//! dirty. All inferred types are written back into the model in place.

use super::collector::collect;
use super::context::{InferenceContext, SlotWrite};
use super::groups::Family;
use super::queue::DrainOrder;
use super::solver::{FixpointSolver, DEFAULT_STEP_LIMIT};
use crate::error::InferenceError;
use crate::model::ArchitectureModel;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug_span, info};

/// Default bound on the nesting depth of inferred types.
pub const DEFAULT_DEPTH_LIMIT: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceConfig {
    pub drain_order: DrainOrder,
    pub step_limit: usize,
    /// Writes that would create a type nested deeper than this are skipped.
    pub depth_limit: usize,
    pub record_writes: bool,
    /// Narrow positions toward declared signature types.
    pub use_signatures: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            drain_order: DrainOrder::Fifo,
            step_limit: DEFAULT_STEP_LIMIT,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            record_writes: false,
            use_signatures: true,
        }
    }
}

/// Summary of one inference run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InferenceReport {
    /// Number of groups collected, by family.
    pub groups: BTreeMap<Family, usize>,
    /// Groups whose shared or compound type is known after the run.
    pub resolved_groups: usize,
    pub seeded_writes: usize,
    pub propagated_writes: usize,
    /// Dirty records drained.
    pub steps: usize,
    /// Expressions whose type is still unknown.
    pub unresolved_exprs: usize,
    /// Expressions whose type is known but still has unknown parts.
    pub partial_exprs: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub writes: Vec<SlotWrite>,
}

impl InferenceReport {
    pub fn total_writes(&self) -> usize {
        self.seeded_writes + self.propagated_writes
    }

    pub fn group_count(&self, family: Family) -> usize {
        self.groups.get(&family).copied().unwrap_or(0)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Structural type inferencer for architecture models.
#[derive(Debug, Clone, Default)]
pub struct TypeInferencer {
    config: InferenceConfig,
}

impl TypeInferencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn with_drain_order(mut self, order: DrainOrder) -> Self {
        self.config.drain_order = order;
        self
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.config.step_limit = limit;
        self
    }

    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.config.depth_limit = limit;
        self
    }

    /// Keep every slot write in the report.
    pub fn record_writes(mut self) -> Self {
        self.config.record_writes = true;
        self
    }

    /// Do not narrow toward declared signature types.
    pub fn ignore_signatures(mut self) -> Self {
        self.config.use_signatures = false;
        self
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infer the types of every expression and resource in `model`.
    ///
    /// Slots are only ever narrowed; on [`InferenceError::StepLimitExceeded`]
    /// the model keeps the refinements made so far.
    pub fn infer(&self, model: &mut ArchitectureModel) -> Result<InferenceReport, InferenceError> {
        let _span = debug_span!("infer", exprs = model.exprs.len()).entered();
        model.types.register_builtins();

        let groups = collect(model, self.config.use_signatures);
        let mut report = InferenceReport::default();
        for family in Family::ALL {
            report.groups.insert(family, groups.count(family));
        }

        let mut ctx = InferenceContext::new(
            model,
            groups,
            self.config.drain_order,
            self.config.depth_limit,
            self.config.record_writes,
        );
        FixpointSolver::seed(&mut ctx);
        report.steps = FixpointSolver::drain(&mut ctx, self.config.step_limit)?;
        report.seeded_writes = ctx.seeded_writes;
        report.propagated_writes = ctx.propagated_writes;
        report.resolved_groups = ctx.groups.resolved();
        report.writes = ctx.take_trace();
        drop(ctx);

        for e in model.exprs.ids() {
            if model.expr_type(e).is_none() {
                report.unresolved_exprs += 1;
            } else if !model.describe_expr(e).is_complete() {
                report.partial_exprs += 1;
            }
        }
        info!(
            groups = report.groups.values().sum::<usize>(),
            writes = report.total_writes(),
            steps = report.steps,
            unresolved = report.unresolved_exprs,
            partial = report.partial_exprs,
            "type inference finished"
        );
        Ok(report)
    }
}

/// Infer types with the default configuration.
pub fn infer(model: &mut ArchitectureModel) -> Result<InferenceReport, InferenceError> {
    TypeInferencer::new().infer(model)
}
