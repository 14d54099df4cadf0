//! Resources, channels and state transitions

use super::expr::ExprId;
use serde::{Deserialize, Serialize};

use crate::types::Slot;

/// Handle to a resource path in a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub(crate) u32);

impl ResourceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named state cell with its currently known state type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    pub name: String,
    pub state_type: Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    Input,
    Output,
    Reference,
}

/// How a resource's value changes: `cur_state --message--> next_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub cur_state: ExprId,
    pub message: ExprId,
    pub next_state: Option<ExprId>,
}

impl StateTransition {
    pub fn new(cur_state: ExprId, message: ExprId, next_state: Option<ExprId>) -> Self {
        Self {
            cur_state,
            message,
            next_state,
        }
    }

    /// Expressions bound to the resource's state.
    pub fn state_exprs(&self) -> impl Iterator<Item = ExprId> {
        std::iter::once(self.cur_state).chain(self.next_state)
    }

    /// Root expressions of the transition in source order.
    pub fn roots(&self) -> impl Iterator<Item = ExprId> {
        [Some(self.cur_state), Some(self.message), self.next_state]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMember {
    pub resource: ResourceId,
    pub role: MemberRole,
    pub transition: StateTransition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    pub members: Vec<ChannelMember>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, resource: ResourceId, role: MemberRole, transition: StateTransition) -> Self {
        self.members.push(ChannelMember {
            resource,
            role,
            transition,
        });
        self
    }

    pub fn inputs(&self) -> impl Iterator<Item = &ChannelMember> {
        self.members.iter().filter(|m| m.role == MemberRole::Input)
    }
}
