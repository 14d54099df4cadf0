//! # DTRAM Core
//!
//! Structural type inference for data-transfer resource architecture models.
//!
//! A model declares resources, channels and the state transitions each
//! channel performs on its resources. Many expressions in those transitions
//! carry no declared type; inference derives them from how they are used and
//! writes the results back into the model.
//!
//! ## Modules
//!
//! - **[`types`]** - Per-model type lattice: primitives, lists, tuples,
//!   pairs, maps and JSON records with refinement and meet
//! - **[`model`]** - Architecture model, expression arena and symbols
//! - **[`inference`]** - Group collection and fixpoint propagation
//!
//! ## Quick Start
//!
//! ```rust
//! use dtram_core::prelude::*;
//!
//! let mut model = ArchitectureModel::new();
//! let counter = model.add_resource("counter", None);
//! let value = model.variable("v", None);
//! let one = model.literal("1");
//! let next = model.term("+", [value, one]).unwrap();
//! let message = model.variable("increment", None);
//! model
//!     .add_channel(Channel::new("increment").with_member(
//!         counter,
//!         MemberRole::Output,
//!         StateTransition::new(value, message, Some(next)),
//!     ))
//!     .unwrap();
//!
//! dtram_core::infer(&mut model).unwrap();
//! assert_eq!(model.display_resource_type(counter), "Int");
//! ```

pub mod error;
pub mod inference;
pub mod model;
pub mod types;

pub use error::{InferenceError, ModelError};
pub use inference::{infer, InferenceReport, TypeInferencer};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{InferenceError, ModelError};
    pub use crate::inference::{
        DrainOrder, Family, InferenceConfig, InferenceReport, SlotWrite, TypeInferencer, WriteTarget,
    };
    pub use crate::model::{
        ArchitectureModel, Arity, Channel, MemberRole, Position, ResourceId, Signature, StateTransition,
    };
    pub use crate::types::{Slot, TypeDescriptor, TypeId, TypeKind, TypeTable};
}
