//! Architecture model consumed and refined by inference
//!
//! The model is what the DSL parser hands over: resources with (possibly
//! unknown) state types, channels whose members bind a resource to a state
//! transition, and an arena of expressions with type slots. The builder
//! methods here are the only way to add to it; inference narrows slots in
//! place and never adds or removes nodes.

mod channel;
mod expr;
mod symbol;

pub use channel::{Channel, ChannelMember, MemberRole, ResourceId, ResourcePath, StateTransition};
pub use expr::{Expr, ExprArena, ExprId};
pub use symbol::{Arity, OperatorRole, Position, Signature, Symbol, SymbolId, SymbolTable};

use crate::error::{ModelError, Result};
use crate::types::{Slot, TypeDescriptor, TypeTable};

#[derive(Debug, Clone)]
pub struct ArchitectureModel {
    pub(crate) types: TypeTable,
    pub(crate) exprs: ExprArena,
    pub(crate) symbols: SymbolTable,
    pub(crate) resources: Vec<ResourcePath>,
    pub(crate) channels: Vec<Channel>,
    pub(crate) io_channels: Vec<Channel>,
}

impl ArchitectureModel {
    pub fn new() -> Self {
        let types = TypeTable::new();
        let symbols = SymbolTable::with_builtins(&types);
        Self {
            types,
            exprs: ExprArena::new(),
            symbols,
            resources: Vec::new(),
            channels: Vec::new(),
            io_channels: Vec::new(),
        }
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeTable {
        &mut self.types
    }

    pub fn exprs(&self) -> &ExprArena {
        &self.exprs
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn declare_symbol(&mut self, name: &str, arity: Arity, signature: Option<Signature>) -> Result<SymbolId> {
        self.symbols.declare(name, arity, signature)
    }

    pub fn add_resource(&mut self, name: impl Into<String>, state_type: Slot) -> ResourceId {
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(ResourcePath {
            name: name.into(),
            state_type,
        });
        id
    }

    pub fn resource(&self, id: ResourceId) -> &ResourcePath {
        &self.resources[id.index()]
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &ResourcePath)> {
        self.resources
            .iter()
            .enumerate()
            .map(|(i, r)| (ResourceId(i as u32), r))
    }

    pub fn resource_type(&self, id: ResourceId) -> Slot {
        self.resources[id.index()].state_type
    }

    pub(crate) fn set_resource_type(&mut self, id: ResourceId, ty: Slot) {
        self.resources[id.index()].state_type = ty;
    }

    pub fn variable(&mut self, name: impl Into<String>, ty: Slot) -> ExprId {
        self.exprs.push(Expr::Variable { name: name.into(), ty })
    }

    pub fn constant(&mut self, symbol: impl Into<String>, ty: Slot) -> ExprId {
        self.exprs.push(Expr::Constant {
            symbol: symbol.into(),
            ty,
        })
    }

    /// A constant typed from its literal text.
    ///
    /// Integers are `Int`, other numbers (`3.5`, `1e5`) `Double`,
    /// `true`/`false` `Boolean` and double-quoted text `String`; anything
    /// else stays untyped.
    pub fn literal(&mut self, text: &str) -> ExprId {
        let ty = if text.parse::<i64>().is_ok() {
            Some(self.types.int())
        } else if text.bytes().any(|b| b.is_ascii_digit()) && text.parse::<f64>().is_ok() {
            Some(self.types.double())
        } else if text == "true" || text == "false" {
            Some(self.types.boolean())
        } else if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            Some(self.types.string())
        } else {
            None
        };
        self.constant(text, ty)
    }

    /// Apply a symbol, looked up by name, to child expressions.
    pub fn term(&mut self, symbol: &str, children: impl IntoIterator<Item = ExprId>) -> Result<ExprId> {
        let id = self
            .symbols
            .lookup(symbol)
            .ok_or_else(|| ModelError::UnknownSymbol(symbol.to_string()))?;
        self.apply(id, children)
    }

    pub fn apply(&mut self, symbol: SymbolId, children: impl IntoIterator<Item = ExprId>) -> Result<ExprId> {
        let children: smallvec::SmallVec<[ExprId; 3]> = children.into_iter().collect();
        if let Some(missing) = children.iter().find(|c| !self.exprs.contains(**c)) {
            return Err(ModelError::UnknownExpression(missing.index()));
        }
        let declared = self.symbols.get(symbol);
        if !declared.arity.accepts(children.len()) {
            let expected = match declared.arity {
                Arity::Fixed(n) => n,
                Arity::Variadic => children.len(),
            };
            return Err(ModelError::ArityMismatch {
                symbol: declared.name.clone(),
                expected,
                found: children.len(),
            });
        }
        Ok(self.exprs.push(Expr::Term {
            symbol,
            children,
            ty: None,
        }))
    }

    /// Pin the type of an expression before inference, as a parser does for
    /// explicitly typed occurrences.
    pub fn annotate(&mut self, id: ExprId, ty: Slot) -> Result<()> {
        if !self.exprs.contains(id) {
            return Err(ModelError::UnknownExpression(id.index()));
        }
        self.exprs.get_mut(id).set_ty(ty);
        Ok(())
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        self.exprs.get(id)
    }

    pub fn expr_type(&self, id: ExprId) -> Slot {
        self.exprs.get(id).ty()
    }

    pub(crate) fn set_expr_type(&mut self, id: ExprId, ty: Slot) {
        self.exprs.get_mut(id).set_ty(ty);
    }

    pub fn add_channel(&mut self, channel: Channel) -> Result<()> {
        self.validate(&channel)?;
        self.channels.push(channel);
        Ok(())
    }

    /// Add a channel that exchanges data with the outside world.
    pub fn add_io_channel(&mut self, channel: Channel) -> Result<()> {
        self.validate(&channel)?;
        if channel.inputs().next().is_some() {
            return Err(ModelError::InputOnIoChannel { channel: channel.name });
        }
        self.io_channels.push(channel);
        Ok(())
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn io_channels(&self) -> &[Channel] {
        &self.io_channels
    }

    /// Ordinary channels followed by I/O channels.
    pub fn all_channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter().chain(self.io_channels.iter())
    }

    pub fn describe_expr(&self, id: ExprId) -> TypeDescriptor {
        self.types.describe(self.expr_type(id))
    }

    pub fn display_expr_type(&self, id: ExprId) -> String {
        self.types.display(self.expr_type(id)).to_string()
    }

    pub fn display_resource_type(&self, id: ResourceId) -> String {
        self.types.display(self.resource_type(id)).to_string()
    }

    fn validate(&self, channel: &Channel) -> Result<()> {
        for member in &channel.members {
            if member.resource.index() >= self.resources.len() {
                return Err(ModelError::UnknownResource(member.resource.index()));
            }
            if let Some(missing) = member.transition.roots().find(|e| !self.exprs.contains(*e)) {
                return Err(ModelError::UnknownExpression(missing.index()));
            }
        }
        Ok(())
    }
}

impl Default for ArchitectureModel {
    fn default() -> Self {
        Self::new()
    }
}
