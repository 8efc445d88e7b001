//! Capture analysis for the functions being rewritten.
//!
//! One record is kept per construct with its own receiver, plus one per async
//! arrow. Plain arrows share the record of their surroundings, so whatever they
//! capture is charged to the enclosing function.

use crate::syntax::{Node, NodeKind};

/// What a function-like uses from its lexical surroundings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ScopeRecord {
    pub is_async: bool,
    pub is_generator: bool,
    pub is_arrow: bool,
    pub references_this: bool,
    pub references_arguments: bool,
    pub references_super: bool,
    pub references_super_assignment: bool,
    /// Visiting the parameter list, which runs before the generator exists.
    pub in_params: bool,
}

impl ScopeRecord {
    pub fn for_node(node: &Node) -> Self {
        Self {
            is_async: node.flags.is_async,
            is_generator: node.flags.is_generator,
            is_arrow: node.is(NodeKind::ArrowFunctionExpression),
            ..Self::default()
        }
    }

    pub fn is_async_generator(&self) -> bool {
        self.is_async && self.is_generator
    }
}

/// Whether `node` gets its own record.
pub fn opens_scope(node: &Node) -> bool {
    node.kind.owns_receiver() || (node.is(NodeKind::ArrowFunctionExpression) && node.flags.is_async)
}

/// Stack of scope records. The program record is always at the bottom and is
/// never async.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    current: ScopeRecord,
    enclosing: Vec<ScopeRecord>,
    suspended: Vec<ScopeRecord>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &ScopeRecord {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.enclosing.len()
    }

    pub fn push(&mut self, record: ScopeRecord) {
        let parent = std::mem::replace(&mut self.current, record);
        self.enclosing.push(parent);
    }

    /// Pop the innermost record. An arrow's captures are carried over to the
    /// record that becomes current, since the arrow evaluates them there.
    pub fn pop(&mut self) -> ScopeRecord {
        let Some(parent) = self.enclosing.pop() else {
            return self.current;
        };
        let record = std::mem::replace(&mut self.current, parent);
        if record.is_arrow {
            self.current.references_this |= record.references_this;
            self.current.references_arguments |= record.references_arguments;
            self.current.references_super |= record.references_super;
            self.current.references_super_assignment |= record.references_super_assignment;
        }
        record
    }

    /// Step out of the innermost record while a part of its node that is
    /// evaluated outside it (a computed key, a decorator) is visited.
    pub fn suspend(&mut self) {
        if let Some(parent) = self.enclosing.pop() {
            let record = std::mem::replace(&mut self.current, parent);
            self.suspended.push(record);
        }
    }

    /// Undo the last [`suspend`](Self::suspend).
    pub fn resume(&mut self) {
        if let Some(record) = self.suspended.pop() {
            self.push(record);
        }
    }

    pub fn enter_params(&mut self) {
        self.current.in_params = true;
    }

    pub fn leave_params(&mut self) {
        self.current.in_params = false;
    }

    /// Whether `super` members are reached through the generator's accessors.
    pub fn rewrites_super(&self) -> bool {
        self.current.is_async && !self.current.in_params
    }

    pub fn mark_this(&mut self) {
        self.current.references_this = true;
    }

    pub fn mark_arguments(&mut self) {
        self.current.references_arguments = true;
    }

    pub fn mark_super(&mut self) {
        self.current.references_super = true;
    }

    pub fn mark_super_assignment(&mut self) {
        self.current.references_super_assignment = true;
    }
}
