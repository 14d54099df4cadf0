//! Structural type lattice
//!
//! - [`TypeTable`]: canonical registry with parent/child links and factories
//! - `refines`: the narrowing relation used to guard every slot write
//! - `meet`: componentwise combination of incomparable types of one kind
//! - [`TypeDescriptor`]: serializable view for downstream consumers

mod display;
mod lattice;
mod meet;
mod refines;

pub use display::{TypeDescriptor, TypeDisplay};
pub use lattice::{Components, Slot, TypeId, TypeKind, TypeTable, BUILTIN_PRIMITIVES};
