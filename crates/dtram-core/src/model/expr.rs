//! Expression arena
//!
//! Expressions are owned by an [`ExprArena`] and addressed by [`ExprId`].
//! Inference only ever rewrites the type slot of a node.

use super::symbol::SymbolId;
use crate::types::Slot;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Handle to an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExprId(pub(crate) u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Variable {
        name: String,
        ty: Slot,
    },
    Constant {
        symbol: String,
        ty: Slot,
    },
    Term {
        symbol: SymbolId,
        children: SmallVec<[ExprId; 3]>,
        ty: Slot,
    },
}

impl Expr {
    pub fn ty(&self) -> Slot {
        match self {
            Expr::Variable { ty, .. } | Expr::Constant { ty, .. } | Expr::Term { ty, .. } => *ty,
        }
    }

    pub(crate) fn set_ty(&mut self, new: Slot) {
        match self {
            Expr::Variable { ty, .. } | Expr::Constant { ty, .. } | Expr::Term { ty, .. } => *ty = new,
        }
    }

    pub fn children(&self) -> &[ExprId] {
        match self {
            Expr::Term { children, .. } => children,
            _ => &[],
        }
    }

    /// Constant text with surrounding double quotes removed.
    pub fn constant_text(&self) -> Option<&str> {
        match self {
            Expr::Constant { symbol, .. } => Some(unquote(symbol)),
            _ => None,
        }
    }
}

pub(crate) fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

#[derive(Debug, Clone, Default)]
pub struct ExprArena {
    nodes: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.nodes[id.index()]
    }

    pub fn contains(&self, id: ExprId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ExprId> {
        (0..self.nodes.len() as u32).map(ExprId)
    }

    /// Pre-order walk of the tree rooted at `root`.
    pub fn walk(&self, root: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.get(id).children().iter().rev().copied());
        }
        out
    }
}
