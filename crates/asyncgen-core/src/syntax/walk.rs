//! Iterative depth-first traversal.
//!
//! Input programs can nest arbitrarily deep, so the walker keeps an explicit
//! frame stack instead of recursing. Frames are either a node or a node
//! sequence; both are stepped the same way.

use super::ast::{Child, Field, Node};

/// Returned by [`Visitor::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the children, then call `leave`.
    Continue,
    /// Do not descend. `leave` is not called for this node.
    Skip,
}

/// The slot a node was reached through: its parent and the parent's field.
pub type ParentSlot<'a> = Option<(&'a Node, Field)>;

/// Enter/leave callbacks driven by [`walk`]. The traversal state lives in `C`.
pub trait Visitor<C> {
    type Error;

    fn enter(&mut self, _ctx: &mut C, _node: &Node, _parent: ParentSlot<'_>) -> Result<Visit, Self::Error> {
        Ok(Visit::Continue)
    }

    fn leave(&mut self, _ctx: &mut C, _node: &Node, _parent: ParentSlot<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

enum Container<'a> {
    Node(&'a Node),
    Seq {
        owner: &'a Node,
        field: Field,
        items: &'a [Node],
    },
}

struct Frame<'a> {
    container: Container<'a>,
    parent: ParentSlot<'a>,
    index: usize,
}

enum Step<'a> {
    Enter(&'a Node, ParentSlot<'a>),
    Push(Frame<'a>),
    Pop,
    Next,
}

impl<'a> Frame<'a> {
    fn node(node: &'a Node, parent: ParentSlot<'a>) -> Self {
        Self {
            container: Container::Node(node),
            parent,
            index: 0,
        }
    }

    fn step(&mut self) -> Step<'a> {
        let index = self.index;
        self.index += 1;
        match self.container {
            Container::Node(node) => match node.fields.get(index) {
                None => Step::Pop,
                Some((field, Child::Node(child))) => Step::Enter(child, Some((node, *field))),
                Some((field, Child::Seq(items))) => Step::Push(Frame {
                    container: Container::Seq {
                        owner: node,
                        field: *field,
                        items,
                    },
                    parent: None,
                    index: 0,
                }),
                Some((_, Child::Leaf)) => Step::Next,
            },
            Container::Seq { owner, field, items } => match items.get(index) {
                None => Step::Pop,
                Some(child) => Step::Enter(child, Some((owner, field))),
            },
        }
    }
}

/// Walk `root` depth-first, calling `enter` before and `leave` after each
/// node's children.
pub fn walk<C, V>(root: &Node, ctx: &mut C, visitor: &mut V) -> Result<(), V::Error>
where
    V: Visitor<C>,
{
    let mut stack: Vec<Frame<'_>> = Vec::new();
    if visitor.enter(ctx, root, None)? == Visit::Continue {
        stack.push(Frame::node(root, None));
    }

    while let Some(frame) = stack.last_mut() {
        match frame.step() {
            Step::Enter(node, parent) => {
                if visitor.enter(ctx, node, parent)? == Visit::Continue {
                    stack.push(Frame::node(node, parent));
                }
            }
            Step::Push(seq) => stack.push(seq),
            Step::Next => {}
            Step::Pop => {
                if let Some(Frame {
                    container: Container::Node(node),
                    parent,
                    ..
                }) = stack.pop()
                {
                    visitor.leave(ctx, node, parent)?;
                }
            }
        }
    }
    Ok(())
}
