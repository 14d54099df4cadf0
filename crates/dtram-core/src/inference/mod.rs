//! Constraint propagation over equivalence groups
//!
//! Inference runs in three stages:
//! 1. `collector` walks the model and builds the groups
//! 2. every group is derived once, seeding the work queues with the
//!    expressions it changed
//! 3. the solver drains the queues, re-deriving the groups that share a
//!    changed expression, until nothing is dirty

mod collector;
mod context;
mod groups;
mod queue;
mod rules;
mod solver;
mod type_inference;
mod wiring;

pub use context::{SlotWrite, WriteTarget};
pub use groups::{Family, GroupId};
pub use queue::DrainOrder;
pub use solver::DEFAULT_STEP_LIMIT;
pub use type_inference::{infer, InferenceConfig, InferenceReport, TypeInferencer, DEFAULT_DEPTH_LIMIT};
