//! Closed syntax tree model.
//!
//! The parser adapter lowers its own tree into these nodes. Only the node
//! kinds the rewrite rules care about get their own tag; everything else
//! becomes a generic `Expression` or `Statement` node that still carries its
//! children so the walker sees every nested construct.

use super::span::Span;

/// Tag of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunctionExpression,
    ObjectMethod,
    ClassMethod,
    /// Class field, public or private. Its initializer runs with the instance as receiver.
    ClassProperty,
    StaticBlock,
    Class,
    AwaitExpression,
    YieldExpression,
    ThisExpression,
    Identifier,
    /// `super.x` or `super[x]`.
    SuperMember,
    AssignmentExpression,
    UpdateExpression,
    UnaryExpression,
    BinaryExpression,
    LogicalExpression,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    TaggedTemplate,
    ParenthesizedExpression,
    ForOfStatement,
    BlockStatement,
    VariableDeclaration,
    VariableDeclarator,
    LabeledStatement,
    PropertyKey,
    Pattern,
    Expression,
    Statement,
}

impl NodeKind {
    /// Functions, methods and arrows.
    pub const fn is_function_like(self) -> bool {
        matches!(
            self,
            Self::FunctionDeclaration
                | Self::FunctionExpression
                | Self::ArrowFunctionExpression
                | Self::ObjectMethod
                | Self::ClassMethod
        )
    }

    /// Kinds with their own receiver binding, so a scope record is pushed for them.
    pub const fn owns_receiver(self) -> bool {
        matches!(
            self,
            Self::FunctionDeclaration
                | Self::FunctionExpression
                | Self::ObjectMethod
                | Self::ClassMethod
                | Self::ClassProperty
                | Self::StaticBlock
        )
    }

    pub const fn is_method(self) -> bool {
        matches!(self, Self::ObjectMethod | Self::ClassMethod)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Program => "Program",
            Self::FunctionDeclaration => "FunctionDeclaration",
            Self::FunctionExpression => "FunctionExpression",
            Self::ArrowFunctionExpression => "ArrowFunctionExpression",
            Self::ObjectMethod => "ObjectMethod",
            Self::ClassMethod => "ClassMethod",
            Self::ClassProperty => "ClassProperty",
            Self::StaticBlock => "StaticBlock",
            Self::Class => "Class",
            Self::AwaitExpression => "AwaitExpression",
            Self::YieldExpression => "YieldExpression",
            Self::ThisExpression => "ThisExpression",
            Self::Identifier => "Identifier",
            Self::SuperMember => "SuperMember",
            Self::AssignmentExpression => "AssignmentExpression",
            Self::UpdateExpression => "UpdateExpression",
            Self::UnaryExpression => "UnaryExpression",
            Self::BinaryExpression => "BinaryExpression",
            Self::LogicalExpression => "LogicalExpression",
            Self::ConditionalExpression => "ConditionalExpression",
            Self::CallExpression => "CallExpression",
            Self::NewExpression => "NewExpression",
            Self::MemberExpression => "MemberExpression",
            Self::TaggedTemplate => "TaggedTemplate",
            Self::ParenthesizedExpression => "ParenthesizedExpression",
            Self::ForOfStatement => "ForOfStatement",
            Self::BlockStatement => "BlockStatement",
            Self::VariableDeclaration => "VariableDeclaration",
            Self::VariableDeclarator => "VariableDeclarator",
            Self::LabeledStatement => "LabeledStatement",
            Self::PropertyKey => "PropertyKey",
            Self::Pattern => "Pattern",
            Self::Expression => "Expression",
            Self::Statement => "Statement",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the slot a child occupies in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Body,
    Params,
    Id,
    Key,
    Value,
    Argument,
    Arguments,
    Callee,
    Object,
    Property,
    Test,
    Consequent,
    Alternate,
    Left,
    Right,
    Init,
    Declarations,
    Tag,
    Quasi,
    SuperClass,
    Decorators,
    Label,
    TypeArguments,
    Children,
}

/// Boolean attributes of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct NodeFlags {
    pub is_async: bool,
    pub is_generator: bool,
    pub is_static: bool,
    /// Member, super member or key written with brackets.
    pub computed: bool,
    /// `for await`.
    pub is_await: bool,
    /// Prefix form of an update expression.
    pub prefix: bool,
    /// `yield*`.
    pub delegate: bool,
    /// Call written `f?.()`.
    pub optional: bool,
}

/// A child slot: one node, an ordered sequence of nodes, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(Node),
    Seq(Vec<Node>),
    Leaf,
}

/// A syntax node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub flags: NodeFlags,
    /// Identifier name, or the property name of a non-computed member.
    pub name: Option<String>,
    /// Operator text for assignment, update, unary and binary nodes.
    pub operator: Option<&'static str>,
    pub fields: Vec<(Field, Child)>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            flags: NodeFlags::default(),
            name: None,
            operator: None,
            fields: Vec::new(),
        }
    }

    #[inline]
    pub const fn start(&self) -> u32 {
        self.span.start
    }

    #[inline]
    pub const fn end(&self) -> u32 {
        self.span.end
    }

    pub fn slot(&self, field: Field) -> Option<&Child> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, child)| child)
    }

    /// The single node stored under `field`.
    pub fn child(&self, field: Field) -> Option<&Node> {
        match self.slot(field) {
            Some(Child::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// The node sequence stored under `field`, empty when absent.
    pub fn children(&self, field: Field) -> &[Node] {
        match self.slot(field) {
            Some(Child::Seq(nodes)) => nodes,
            _ => &[],
        }
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    pub fn name_is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            total += 1;
            for (_, child) in &node.fields {
                match child {
                    Child::Node(n) => pending.push(n),
                    Child::Seq(nodes) => pending.extend(nodes.iter()),
                    Child::Leaf => {}
                }
            }
        }
        total
    }
}
