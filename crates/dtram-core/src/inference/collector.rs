//! Group collection
//!
//! One pass over every channel member of the model:
//! - the current and next state expressions join their resource's group
//! - same-named variables within one state transition join a variable group
//! - messages of one channel join a message group, per argument position
//!   when the message is an application of a message symbol
//! - every operator occurrence gets its structural group
//! - terms of symbols with a signature get a signature group, plus a list
//!   group for each declared list type that occurs more than once
//!
//! Scalar groups are only materialised once they link two occurrences (or an
//! occurrence and a resource).

use super::groups::{Family, GroupArena, GroupKey, GroupKind};
use super::wiring::wire;
use crate::model::{ArchitectureModel, Expr, ExprId, OperatorRole, Position};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use std::collections::HashSet;
use tracing::debug;

pub(crate) fn collect(model: &ArchitectureModel, use_signatures: bool) -> GroupArena {
    let mut collector = Collector {
        model,
        use_signatures,
        pending: IndexMap::new(),
        structural: Vec::new(),
        visited: HashSet::new(),
    };
    collector.run();
    collector.finish()
}

struct Collector<'m> {
    model: &'m ArchitectureModel,
    use_signatures: bool,
    pending: IndexMap<GroupKey, IndexSet<ExprId>>,
    structural: Vec<(Family, GroupKind)>,
    visited: HashSet<ExprId>,
}

impl Collector<'_> {
    fn run(&mut self) {
        let model = self.model;
        let mut transition = 0;
        for (channel_index, channel) in model.all_channels().enumerate() {
            for member in &channel.members {
                let t = member.transition;

                let key = GroupKey::Resource(member.resource);
                self.pending.entry(key.clone()).or_default();
                for e in t.state_exprs() {
                    self.join(key.clone(), e);
                }

                self.collect_message(channel_index, t.message);

                for root in t.roots() {
                    for id in model.exprs.walk(root) {
                        match model.expr(id) {
                            Expr::Variable { name, .. } => self.join(
                                GroupKey::Variable {
                                    transition,
                                    name: name.clone(),
                                },
                                id,
                            ),
                            Expr::Term { .. } if self.visited.insert(id) => self.collect_term(id),
                            _ => {}
                        }
                    }
                }
                transition += 1;
            }
        }
    }

    fn join(&mut self, key: GroupKey, expr: ExprId) {
        self.pending.entry(key).or_default().insert(expr);
    }

    fn collect_message(&mut self, channel: usize, message: ExprId) {
        let model = self.model;
        let positional = match model.expr(message) {
            Expr::Term { symbol, children, .. }
                if !children.is_empty() && model.symbols.get(*symbol).role == OperatorRole::Opaque =>
            {
                Some(children.clone())
            }
            _ => None,
        };
        match positional {
            Some(children) => {
                for (i, child) in children.into_iter().enumerate() {
                    self.join(
                        GroupKey::Message {
                            channel,
                            position: Some(i),
                        },
                        child,
                    );
                }
            }
            None => self.join(
                GroupKey::Message {
                    channel,
                    position: None,
                },
                message,
            ),
        }
    }

    fn collect_term(&mut self, term: ExprId) {
        let model = self.model;
        let Expr::Term { symbol, children, .. } = model.expr(term) else {
            return;
        };
        let symbol = model.symbols.get(*symbol);

        if let Some(group) = wire(symbol.role, term, children, &model.exprs) {
            self.structural.push(group);
        }

        let Some(signature) = &symbol.signature else {
            return;
        };
        let at = |position: Position| match position {
            Position::Result => Some(term),
            Position::Arg(i) => children.get(i).copied(),
        };

        if self.use_signatures {
            let positions: SmallVec<[_; 4]> = signature
                .declared()
                .filter_map(|(position, ty)| at(position).map(|e| (e, ty)))
                .collect();
            if !positions.is_empty() {
                self.structural.push((Family::Variable, GroupKind::Signature { positions }));
            }
        }

        for positions in signature.repeated_list_positions(&model.types) {
            let members: IndexSet<ExprId> = positions.into_iter().filter_map(at).collect();
            if members.len() > 1 {
                self.structural.push((
                    Family::List,
                    GroupKind::Unify {
                        members,
                        resource: None,
                    },
                ));
            }
        }
    }

    fn finish(self) -> GroupArena {
        let mut arena = GroupArena::default();
        for (key, members) in self.pending {
            let resource = match key {
                GroupKey::Resource(r) => Some(r),
                _ => None,
            };
            if resource.is_none() && members.len() < 2 {
                continue;
            }
            arena.add(key.family(), GroupKind::Unify { members, resource });
        }
        for (family, kind) in self.structural {
            arena.add(family, kind);
        }
        debug!(groups = arena.len(), "collected groups");
        arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arity, Channel, MemberRole, ResourceId, Signature, StateTransition};

    #[test]
    fn test_same_named_variables_share_a_group() {
        let mut model = ArchitectureModel::new();
        let r = model.add_resource("r", None);
        let cur = model.variable("s", None);
        let msg = model.variable("s", None);
        let next = model.variable("s", None);
        model
            .add_channel(Channel::new("c").with_member(r, MemberRole::Output, StateTransition::new(cur, msg, Some(next))))
            .unwrap();

        let arena = collect(&model, true);
        assert_eq!(arena.count(Family::Resource), 1);
        assert_eq!(arena.count(Family::Variable), 1);
        // A lone message does not link anything.
        assert_eq!(arena.count(Family::Message), 0);
        assert_eq!(arena.containing(msg).len(), 1);
        assert_eq!(arena.containing(cur).len(), 2);
    }

    #[test]
    fn test_message_arguments_group_by_position() {
        let mut model = ArchitectureModel::new();
        let push = model.declare_symbol("push", Arity::Fixed(2), None).unwrap();
        let (a, b) = (model.add_resource("a", None), model.add_resource("b", None));

        let member = |model: &mut ArchitectureModel, resource: ResourceId| {
            let cur = model.variable("s", None);
            let x = model.variable("x", None);
            let y = model.variable("y", None);
            let msg = model.apply(push, [x, y]).unwrap();
            (resource, StateTransition::new(cur, msg, None), x, y)
        };
        let (ra, ta, xa, ya) = member(&mut model, a);
        let (rb, tb, xb, yb) = member(&mut model, b);
        model
            .add_channel(
                Channel::new("c")
                    .with_member(ra, MemberRole::Input, ta)
                    .with_member(rb, MemberRole::Output, tb),
            )
            .unwrap();

        let arena = collect(&model, true);
        assert_eq!(arena.count(Family::Message), 2);
        let first = arena.containing(xa).iter().find(|g| arena.get(**g).family == Family::Message);
        let second = arena.containing(xb).iter().find(|g| arena.get(**g).family == Family::Message);
        assert_eq!(first, second);
        assert_ne!(
            arena.containing(ya).iter().find(|g| arena.get(**g).family == Family::Message),
            first
        );
        assert_eq!(arena.containing(yb).len(), 1);
    }

    #[test]
    fn test_signature_groups() {
        let mut model = ArchitectureModel::new();
        let list = model.types().list_top();
        let int = model.types().int();
        let append = model
            .declare_symbol(
                "append",
                Arity::Fixed(2),
                Some(Signature::new(vec![Some(list), Some(int)], Some(list))),
            )
            .unwrap();
        let r = model.add_resource("r", None);
        let cur = model.variable("s", None);
        let x = model.variable("x", None);
        let next = model.apply(append, [cur, x]).unwrap();
        model
            .add_channel(Channel::new("c").with_member(r, MemberRole::Output, StateTransition::new(cur, x, Some(next))))
            .unwrap();

        let arena = collect(&model, true);
        // result and first argument share the declared list type
        assert_eq!(arena.count(Family::List), 1);
        assert!(arena.ids().any(|g| matches!(arena.get(g).kind, GroupKind::Signature { .. })));

        let arena = collect(&model, false);
        assert_eq!(arena.count(Family::List), 1);
        assert!(!arena.ids().any(|g| matches!(arena.get(g).kind, GroupKind::Signature { .. })));
    }
}
