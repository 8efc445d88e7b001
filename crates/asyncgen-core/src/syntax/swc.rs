//! swc-backed [`SourceParser`].
//!
//! swc parses the text and its token-capturing input records every token the
//! parser consumed, so regex/division and template ambiguities come out
//! exactly as the parser resolved them. The swc tree is then lowered into
//! the closed node model by a visitor.

#![allow(clippy::default_trait_access)]

use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, Spanned};
use swc_ecma_ast::{
    ArrowExpr, AssignExpr, AssignTarget, AwaitExpr, BinExpr, BinaryOp, BlockStmt,
    BlockStmtOrExpr, CallExpr, Callee, Class, ClassMethod, ClassProp, CondExpr, Constructor, Decl,
    EsVersion, Expr, FnDecl, FnExpr, ForHead, ForOfStmt, Function, GetterProp, LabeledStmt,
    MemberExpr, MemberProp, MethodProp, NewExpr, OptChainBase, OptChainExpr, ParenExpr, PrivateMethod, PrivateProp, Prop,
    PropName, SetterProp, SimpleAssignTarget, StaticBlock, Stmt, SuperProp, SuperPropExpr,
    TaggedTpl, UnaryExpr, UpdateExpr, UpdateOp, VarDecl, VarDeclarator, YieldExpr,
};
use swc_ecma_parser::{lexer::Lexer, Capturing, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use super::ast::{Child, Field, Node, NodeKind};
use super::span::{LineIndex, Span};
use super::token::{Token, TokenStream};
use super::{ParseOptions, ParsedSource, SourceParser};
use crate::error::TransformError;

/// Parser backed by `swc_ecma_parser`.
///
/// `SwcParser` is `Send + Sync`; every call builds its own source map.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwcParser;

impl SwcParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn syntax(options: &ParseOptions) -> Syntax {
        if options.typescript {
            Syntax::Typescript(TsSyntax {
                tsx: options.jsx,
                decorators: true,
                ..Default::default()
            })
        } else {
            Syntax::Es(EsSyntax {
                jsx: options.jsx,
                decorators: true,
                allow_super_outside_method: true,
                allow_return_outside_function: true,
                ..Default::default()
            })
        }
    }
}

impl SourceParser for SwcParser {
    fn name(&self) -> &'static str {
        "swc"
    }

    fn parse<'s>(&self, source: &'s str, options: &ParseOptions) -> Result<ParsedSource<'s>, TransformError> {
        let lines = LineIndex::new(source);
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            Lrc::new(FileName::Custom("input.js".to_string())),
            source.to_string(),
        );
        let base = fm.start_pos.0;

        let lexer = Lexer::new(
            Self::syntax(options),
            EsVersion::EsNext,
            StringInput::from(&*fm),
            None,
        );
        let mut parser = Parser::new_from(Capturing::new(lexer));

        let result = parser.parse_program();
        let recovered = parser.take_errors();
        let program = result.map_err(|e| syntax_error(&e, base, &lines))?;
        if let Some(e) = recovered.first() {
            return Err(syntax_error(e, base, &lines));
        }

        let tokens = parser
            .input()
            .take()
            .into_iter()
            .map(|t| {
                Token::new(
                    t.span.lo.0.saturating_sub(base),
                    t.span.hi.0.saturating_sub(base),
                )
            })
            .collect();

        let mut builder = TreeBuilder::new(base);
        builder.push(
            Node::new(NodeKind::Program, Span::new(0, source.len() as u32)),
            |b| program.visit_children_with(b),
        );
        let program = builder
            .finish()
            .ok_or_else(|| TransformError::syntax("parser produced no program", 1, 1))?;

        Ok(ParsedSource {
            program,
            tokens: TokenStream::new(source, tokens),
            lines,
        })
    }
}

fn syntax_error(e: &swc_ecma_parser::error::Error, base: u32, lines: &LineIndex) -> TransformError {
    let offset = e.span().lo.0.saturating_sub(base);
    let (line, column) = lines.line_col(offset);
    TransformError::syntax(e.kind().msg(), line + 1, column + 1)
}

/// Lowers an swc tree into [`Node`]s.
///
/// Nodes under construction sit on `open`; finished nodes are collected into
/// the innermost slot on `slots` until their parent attaches them to a field.
/// Children that are not routed into a named field land in
/// [`Field::Children`].
struct TreeBuilder {
    base: u32,
    open: Vec<Node>,
    slots: Vec<Vec<Node>>,
}

impl TreeBuilder {
    fn new(base: u32) -> Self {
        Self {
            base,
            open: Vec::new(),
            slots: vec![Vec::new()],
        }
    }

    fn offset(&self, pos: BytePos) -> u32 {
        pos.0.saturating_sub(self.base)
    }

    fn span(&self, span: swc_common::Span) -> Span {
        Span::new(self.offset(span.lo), self.offset(span.hi))
    }

    fn push(&mut self, node: Node, children: impl FnOnce(&mut Self)) {
        self.open.push(node);
        let rest = self.collect(children);
        if let Some(mut node) = self.open.pop() {
            if !rest.is_empty() {
                node.fields.push((Field::Children, Child::Seq(rest)));
            }
            if let Some(slot) = self.slots.last_mut() {
                slot.push(node);
            }
        }
    }

    fn node(&mut self, kind: NodeKind, span: swc_common::Span, children: impl FnOnce(&mut Self)) {
        let node = Node::new(kind, self.span(span));
        self.push(node, children);
    }

    fn collect(&mut self, f: impl FnOnce(&mut Self)) -> Vec<Node> {
        self.slots.push(Vec::new());
        f(self);
        self.slots.pop().unwrap_or_default()
    }

    fn attach(&mut self, field: Field, child: Child) {
        if let Some(node) = self.open.last_mut() {
            node.fields.push((field, child));
        }
    }

    /// A field holding at most one node.
    fn field(&mut self, field: Field, f: impl FnOnce(&mut Self)) {
        let mut nodes = self.collect(f);
        let child = match nodes.len() {
            0 => Child::Leaf,
            1 => nodes.pop().map_or(Child::Leaf, Child::Node),
            _ => Child::Seq(nodes),
        };
        self.attach(field, child);
    }

    fn seq(&mut self, field: Field, f: impl FnOnce(&mut Self)) {
        let nodes = self.collect(f);
        self.attach(field, Child::Seq(nodes));
    }

    fn finish(mut self) -> Option<Node> {
        self.slots.pop()?.pop()
    }

    fn identifier(&mut self, span: swc_common::Span, name: &str) {
        let mut node = Node::new(NodeKind::Identifier, self.span(span));
        node.name = Some(name.to_string());
        self.push(node, |_| {});
    }

    fn function_node(&self, kind: NodeKind, span: Span, function: &Function) -> Node {
        let mut node = Node::new(kind, span);
        node.flags.is_async = function.is_async;
        node.flags.is_generator = function.is_generator;
        node
    }

    fn params_and_body(&mut self, function: &Function) {
        self.seq(Field::Params, |b| function.params.visit_with(b));
        self.field(Field::Body, |b| {
            if let Some(body) = &function.body {
                b.visit_block_stmt(body);
            }
        });
    }

    fn prop_name(&mut self, key: &PropName) {
        let mut node = Node::new(NodeKind::PropertyKey, self.span(key.span()));
        node.flags.computed = matches!(key, PropName::Computed(_));
        self.push(node, |b| key.visit_children_with(b));
    }

    fn private_key(&mut self, span: swc_common::Span) {
        self.node(NodeKind::PropertyKey, span, |_| {});
    }

    fn method(&mut self, node: Node, function: &Function, key: impl FnOnce(&mut Self)) {
        self.push(node, |b| {
            b.seq(Field::Decorators, |b| function.decorators.visit_with(b));
            b.field(Field::Key, key);
            b.params_and_body(function);
        });
    }
}

impl Visit for TreeBuilder {
    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::This(n) => self.node(NodeKind::ThisExpression, n.span, |_| {}),
            Expr::Ident(id) => self.identifier(id.span, &id.sym),
            Expr::Fn(n) => self.visit_fn_expr(n),
            Expr::Arrow(n) => self.visit_arrow_expr(n),
            Expr::Class(n) => self.visit_class_expr(n),
            Expr::Await(n) => self.visit_await_expr(n),
            Expr::Yield(n) => self.visit_yield_expr(n),
            Expr::SuperProp(n) => self.visit_super_prop_expr(n),
            Expr::Call(n) => self.visit_call_expr(n),
            Expr::OptChain(n) => self.visit_opt_chain_expr(n),
            Expr::New(n) => self.visit_new_expr(n),
            Expr::Assign(n) => self.visit_assign_expr(n),
            Expr::Update(n) => self.visit_update_expr(n),
            Expr::Unary(n) => self.visit_unary_expr(n),
            Expr::Bin(n) => self.visit_bin_expr(n),
            Expr::Cond(n) => self.visit_cond_expr(n),
            Expr::Member(n) => self.visit_member_expr(n),
            Expr::TaggedTpl(n) => self.visit_tagged_tpl(n),
            Expr::Paren(n) => self.visit_paren_expr(n),
            _ => self.node(NodeKind::Expression, expr.span(), |b| {
                expr.visit_children_with(b);
            }),
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(n) => self.visit_block_stmt(n),
            Stmt::ForOf(n) => self.visit_for_of_stmt(n),
            Stmt::Labeled(n) => self.visit_labeled_stmt(n),
            Stmt::Decl(Decl::Fn(n)) => self.visit_fn_decl(n),
            Stmt::Decl(Decl::Var(n)) => self.visit_var_decl(n),
            Stmt::Decl(Decl::Class(n)) => self.visit_class_decl(n),
            _ => self.node(NodeKind::Statement, stmt.span(), |b| {
                stmt.visit_children_with(b);
            }),
        }
    }

    fn visit_fn_decl(&mut self, n: &FnDecl) {
        let node = self.function_node(
            NodeKind::FunctionDeclaration,
            self.span(n.function.span),
            &n.function,
        );
        self.push(node, |b| {
            b.seq(Field::Decorators, |b| n.function.decorators.visit_with(b));
            b.params_and_body(&n.function);
        });
    }

    fn visit_fn_expr(&mut self, n: &FnExpr) {
        let node = self.function_node(
            NodeKind::FunctionExpression,
            self.span(n.function.span),
            &n.function,
        );
        self.push(node, |b| {
            b.seq(Field::Decorators, |b| n.function.decorators.visit_with(b));
            b.params_and_body(&n.function);
        });
    }

    fn visit_arrow_expr(&mut self, n: &ArrowExpr) {
        let mut node = Node::new(NodeKind::ArrowFunctionExpression, self.span(n.span));
        node.flags.is_async = n.is_async;
        node.flags.is_generator = n.is_generator;
        self.push(node, |b| {
            b.seq(Field::Params, |b| n.params.visit_with(b));
            b.field(Field::Body, |b| match &*n.body {
                BlockStmtOrExpr::BlockStmt(block) => b.visit_block_stmt(block),
                BlockStmtOrExpr::Expr(expr) => b.visit_expr(expr),
            });
        });
    }

    fn visit_class_method(&mut self, n: &ClassMethod) {
        let mut node = self.function_node(NodeKind::ClassMethod, self.span(n.span), &n.function);
        node.flags.is_static = n.is_static;
        self.method(node, &n.function, |b| b.prop_name(&n.key));
    }

    fn visit_private_method(&mut self, n: &PrivateMethod) {
        let mut node = self.function_node(NodeKind::ClassMethod, self.span(n.span), &n.function);
        node.flags.is_static = n.is_static;
        self.method(node, &n.function, |b| b.private_key(n.key.span()));
    }

    fn visit_constructor(&mut self, n: &Constructor) {
        let node = Node::new(NodeKind::ClassMethod, self.span(n.span));
        self.push(node, |b| {
            b.field(Field::Key, |b| b.prop_name(&n.key));
            b.seq(Field::Params, |b| n.params.visit_with(b));
            b.field(Field::Body, |b| {
                if let Some(body) = &n.body {
                    b.visit_block_stmt(body);
                }
            });
        });
    }

    fn visit_method_prop(&mut self, n: &MethodProp) {
        let lo = n.key.span().lo.min(n.function.span.lo);
        let span = Span::new(self.offset(lo), self.offset(n.function.span.hi));
        let node = self.function_node(NodeKind::ObjectMethod, span, &n.function);
        self.method(node, &n.function, |b| b.prop_name(&n.key));
    }

    fn visit_getter_prop(&mut self, n: &GetterProp) {
        self.node(NodeKind::ObjectMethod, n.span, |b| {
            b.field(Field::Key, |b| b.prop_name(&n.key));
            b.field(Field::Body, |b| {
                if let Some(body) = &n.body {
                    b.visit_block_stmt(body);
                }
            });
        });
    }

    fn visit_setter_prop(&mut self, n: &SetterProp) {
        self.node(NodeKind::ObjectMethod, n.span, |b| {
            b.field(Field::Key, |b| b.prop_name(&n.key));
            b.seq(Field::Params, |b| n.param.visit_with(b));
            b.field(Field::Body, |b| {
                if let Some(body) = &n.body {
                    b.visit_block_stmt(body);
                }
            });
        });
    }

    fn visit_class_prop(&mut self, n: &ClassProp) {
        let mut node = Node::new(NodeKind::ClassProperty, self.span(n.span));
        node.flags.is_static = n.is_static;
        self.push(node, |b| {
            b.seq(Field::Decorators, |b| n.decorators.visit_with(b));
            b.field(Field::Key, |b| b.prop_name(&n.key));
            b.field(Field::Value, |b| {
                if let Some(value) = &n.value {
                    b.visit_expr(value);
                }
            });
        });
    }

    fn visit_private_prop(&mut self, n: &PrivateProp) {
        let mut node = Node::new(NodeKind::ClassProperty, self.span(n.span));
        node.flags.is_static = n.is_static;
        self.push(node, |b| {
            b.seq(Field::Decorators, |b| n.decorators.visit_with(b));
            b.field(Field::Key, |b| b.private_key(n.key.span()));
            b.field(Field::Value, |b| {
                if let Some(value) = &n.value {
                    b.visit_expr(value);
                }
            });
        });
    }

    fn visit_static_block(&mut self, n: &StaticBlock) {
        self.node(NodeKind::StaticBlock, n.span, |b| {
            b.field(Field::Body, |b| b.visit_block_stmt(&n.body));
        });
    }

    fn visit_class(&mut self, n: &Class) {
        self.node(NodeKind::Class, n.span, |b| {
            b.seq(Field::Decorators, |b| n.decorators.visit_with(b));
            b.field(Field::SuperClass, |b| {
                if let Some(super_class) = &n.super_class {
                    b.visit_expr(super_class);
                }
            });
            b.seq(Field::Body, |b| n.body.visit_with(b));
        });
    }

    fn visit_await_expr(&mut self, n: &AwaitExpr) {
        self.node(NodeKind::AwaitExpression, n.span, |b| {
            b.field(Field::Argument, |b| b.visit_expr(&n.arg));
        });
    }

    fn visit_yield_expr(&mut self, n: &YieldExpr) {
        let mut node = Node::new(NodeKind::YieldExpression, self.span(n.span));
        node.flags.delegate = n.delegate;
        self.push(node, |b| {
            b.field(Field::Argument, |b| {
                if let Some(arg) = &n.arg {
                    b.visit_expr(arg);
                }
            });
        });
    }

    fn visit_super_prop_expr(&mut self, n: &SuperPropExpr) {
        let mut node = Node::new(NodeKind::SuperMember, self.span(n.span));
        match &n.prop {
            SuperProp::Ident(id) => {
                node.name = Some(id.sym.to_string());
                self.push(node, |_| {});
            }
            SuperProp::Computed(computed) => {
                node.flags.computed = true;
                self.push(node, |b| {
                    b.field(Field::Property, |b| b.visit_expr(&computed.expr));
                });
            }
        }
    }

    fn visit_call_expr(&mut self, n: &CallExpr) {
        self.node(NodeKind::CallExpression, n.span, |b| {
            b.field(Field::Callee, |b| match &n.callee {
                Callee::Expr(callee) => b.visit_expr(callee),
                other => b.node(NodeKind::Expression, other.span(), |_| {}),
            });
            if let Some(type_args) = &n.type_args {
                b.field(Field::TypeArguments, |b| {
                    b.node(NodeKind::Expression, type_args.span, |_| {});
                });
            }
            b.seq(Field::Arguments, |b| {
                for arg in &n.args {
                    b.visit_expr(&arg.expr);
                }
            });
        });
    }

    fn visit_opt_chain_expr(&mut self, n: &OptChainExpr) {
        match &*n.base {
            OptChainBase::Member(member) => self.visit_member_expr(member),
            OptChainBase::Call(call) => {
                let mut node = Node::new(NodeKind::CallExpression, self.span(n.span));
                node.flags.optional = n.optional;
                self.push(node, |b| {
                    b.field(Field::Callee, |b| b.visit_expr(&call.callee));
                    if let Some(type_args) = &call.type_args {
                        b.field(Field::TypeArguments, |b| {
                            b.node(NodeKind::Expression, type_args.span, |_| {});
                        });
                    }
                    b.seq(Field::Arguments, |b| {
                        for arg in &call.args {
                            b.visit_expr(&arg.expr);
                        }
                    });
                });
            }
        }
    }

    fn visit_new_expr(&mut self, n: &NewExpr) {
        self.node(NodeKind::NewExpression, n.span, |b| {
            b.field(Field::Callee, |b| b.visit_expr(&n.callee));
            b.seq(Field::Arguments, |b| {
                for arg in n.args.iter().flatten() {
                    b.visit_expr(&arg.expr);
                }
            });
        });
    }

    fn visit_assign_expr(&mut self, n: &AssignExpr) {
        let mut node = Node::new(NodeKind::AssignmentExpression, self.span(n.span));
        node.operator = Some(n.op.as_str());
        self.push(node, |b| {
            b.field(Field::Left, |b| match &n.left {
                AssignTarget::Simple(SimpleAssignTarget::SuperProp(target)) => {
                    b.visit_super_prop_expr(target);
                }
                AssignTarget::Simple(SimpleAssignTarget::Member(target)) => {
                    b.visit_member_expr(target);
                }
                target => b.node(NodeKind::Pattern, target.span(), |b| {
                    target.visit_children_with(b);
                }),
            });
            b.field(Field::Right, |b| b.visit_expr(&n.right));
        });
    }

    fn visit_update_expr(&mut self, n: &UpdateExpr) {
        let mut node = Node::new(NodeKind::UpdateExpression, self.span(n.span));
        node.operator = Some(match n.op {
            UpdateOp::PlusPlus => "++",
            UpdateOp::MinusMinus => "--",
        });
        node.flags.prefix = n.prefix;
        self.push(node, |b| {
            b.field(Field::Argument, |b| b.visit_expr(&n.arg));
        });
    }

    fn visit_unary_expr(&mut self, n: &UnaryExpr) {
        let mut node = Node::new(NodeKind::UnaryExpression, self.span(n.span));
        node.operator = Some(n.op.as_str());
        self.push(node, |b| {
            b.field(Field::Argument, |b| b.visit_expr(&n.arg));
        });
    }

    fn visit_bin_expr(&mut self, n: &BinExpr) {
        let kind = if matches!(
            n.op,
            BinaryOp::LogicalOr | BinaryOp::LogicalAnd | BinaryOp::NullishCoalescing
        ) {
            NodeKind::LogicalExpression
        } else {
            NodeKind::BinaryExpression
        };
        let mut node = Node::new(kind, self.span(n.span));
        node.operator = Some(n.op.as_str());
        self.push(node, |b| {
            b.field(Field::Left, |b| b.visit_expr(&n.left));
            b.field(Field::Right, |b| b.visit_expr(&n.right));
        });
    }

    fn visit_cond_expr(&mut self, n: &CondExpr) {
        self.node(NodeKind::ConditionalExpression, n.span, |b| {
            b.field(Field::Test, |b| b.visit_expr(&n.test));
            b.field(Field::Consequent, |b| b.visit_expr(&n.cons));
            b.field(Field::Alternate, |b| b.visit_expr(&n.alt));
        });
    }

    fn visit_member_expr(&mut self, n: &MemberExpr) {
        let mut node = Node::new(NodeKind::MemberExpression, self.span(n.span));
        node.flags.computed = matches!(n.prop, MemberProp::Computed(_));
        self.push(node, |b| {
            b.field(Field::Object, |b| b.visit_expr(&n.obj));
            if let MemberProp::Computed(computed) = &n.prop {
                b.field(Field::Property, |b| b.visit_expr(&computed.expr));
            }
        });
    }

    fn visit_tagged_tpl(&mut self, n: &TaggedTpl) {
        self.node(NodeKind::TaggedTemplate, n.span, |b| {
            b.field(Field::Tag, |b| b.visit_expr(&n.tag));
            b.seq(Field::Quasi, |b| n.tpl.visit_with(b));
        });
    }

    fn visit_paren_expr(&mut self, n: &ParenExpr) {
        self.node(NodeKind::ParenthesizedExpression, n.span, |b| {
            b.field(Field::Argument, |b| b.visit_expr(&n.expr));
        });
    }

    fn visit_for_of_stmt(&mut self, n: &ForOfStmt) {
        let mut node = Node::new(NodeKind::ForOfStatement, self.span(n.span));
        node.flags.is_await = n.is_await;
        self.push(node, |b| {
            b.field(Field::Left, |b| match &n.left {
                ForHead::VarDecl(decl) => b.visit_var_decl(decl),
                head => b.node(NodeKind::Pattern, head.span(), |b| {
                    head.visit_children_with(b);
                }),
            });
            b.field(Field::Right, |b| b.visit_expr(&n.right));
            b.field(Field::Body, |b| b.visit_stmt(&n.body));
        });
    }

    fn visit_var_decl(&mut self, n: &VarDecl) {
        self.node(NodeKind::VariableDeclaration, n.span, |b| {
            b.seq(Field::Declarations, |b| n.decls.visit_with(b));
        });
    }

    fn visit_var_declarator(&mut self, n: &VarDeclarator) {
        self.node(NodeKind::VariableDeclarator, n.span, |b| {
            b.field(Field::Id, |b| {
                b.node(NodeKind::Pattern, n.name.span(), |b| n.name.visit_with(b));
            });
            b.field(Field::Init, |b| {
                if let Some(init) = &n.init {
                    b.visit_expr(init);
                }
            });
        });
    }

    fn visit_labeled_stmt(&mut self, n: &LabeledStmt) {
        self.node(NodeKind::LabeledStatement, n.span, |b| {
            b.field(Field::Body, |b| b.visit_stmt(&n.body));
        });
    }

    fn visit_block_stmt(&mut self, n: &BlockStmt) {
        self.node(NodeKind::BlockStatement, n.span, |b| n.stmts.visit_with(b));
    }

    fn visit_prop(&mut self, prop: &Prop) {
        match prop {
            Prop::Shorthand(id) => self.identifier(id.span, &id.sym),
            other => other.visit_children_with(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedSource<'_> {
        SwcParser::new()
            .parse(source, &ParseOptions::default())
            .unwrap()
    }

    fn find<'a>(root: &'a Node, kind: NodeKind) -> Vec<&'a Node> {
        let mut found = Vec::new();
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            if node.kind == kind {
                found.push(node);
            }
            for (_, child) in node.fields.iter().rev() {
                match child {
                    Child::Node(n) => pending.push(n),
                    Child::Seq(nodes) => pending.extend(nodes.iter().rev()),
                    Child::Leaf => {}
                }
            }
        }
        found
    }

    #[test]
    fn test_parse_async_function() {
        let source = "async function f(a) { return await a.b }";
        let parsed = parse(source);
        assert_eq!(parsed.program.kind, NodeKind::Program);
        assert_eq!(parsed.program.end() as usize, source.len());

        let funcs = find(&parsed.program, NodeKind::FunctionDeclaration);
        assert_eq!(funcs.len(), 1);
        assert!(funcs[0].flags.is_async);
        assert!(!funcs[0].flags.is_generator);

        let body = funcs[0].child(Field::Body).unwrap();
        assert_eq!(body.kind, NodeKind::BlockStatement);
        assert_eq!(&source[body.start() as usize..body.end() as usize], "{ return await a.b }");

        let awaits = find(&parsed.program, NodeKind::AwaitExpression);
        assert_eq!(awaits.len(), 1);
        let arg = awaits[0].child(Field::Argument).unwrap();
        assert_eq!(arg.kind, NodeKind::MemberExpression);
        assert!(arg.child(Field::Object).unwrap().name_is("a"));
    }

    #[test]
    fn test_optional_call_lowered_as_call() {
        let source = "class A extends B { m() { super.f?.(1); a?.b } }";
        let parsed = parse(source);
        let calls = find(&parsed.program, NodeKind::CallExpression);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].flags.optional);
        assert_eq!(calls[0].child(Field::Callee).unwrap().kind, NodeKind::SuperMember);
        assert_eq!(calls[0].children(Field::Arguments).len(), 1);
        assert_eq!(find(&parsed.program, NodeKind::MemberExpression).len(), 1);
    }

    #[test]
    fn test_tokens_are_labelled_by_text() {
        let source = "const f = async (x) => x / 2 / 1;";
        let parsed = parse(source);
        let tokens = &parsed.tokens;
        assert_eq!(tokens.text(0), "const");
        assert_eq!(tokens.text(3), "async");
        let arrow = tokens.find_forward(0, "=>").unwrap();
        assert_eq!(tokens.text(arrow - 1), ")");
        // Division, not a regular expression.
        assert_eq!(tokens.text(arrow + 2), "/");
        assert_eq!(tokens.text(tokens.len() - 1), ";");
    }

    #[test]
    fn test_methods_and_keys() {
        let source = "class A extends B { static async *[k]() {} #p = this; get g() { return 1 } }";
        let parsed = parse(source);
        let methods = find(&parsed.program, NodeKind::ClassMethod);
        assert_eq!(methods.len(), 2);
        let gen = methods[0];
        assert!(gen.flags.is_async && gen.flags.is_generator && gen.flags.is_static);
        let key = gen.child(Field::Key).unwrap();
        assert!(key.flags.computed);
        assert_eq!(&source[key.start() as usize..key.end() as usize], "[k]");

        let props = find(&parsed.program, NodeKind::ClassProperty);
        assert_eq!(props.len(), 1);
        assert_eq!(
            props[0].child(Field::Value).unwrap().kind,
            NodeKind::ThisExpression
        );

        let class = find(&parsed.program, NodeKind::Class)[0];
        assert!(class.child(Field::SuperClass).unwrap().name_is("B"));
    }

    #[test]
    fn test_super_and_assignment_shapes() {
        let parsed = parse("({ async m() { super.x = super[y]; super.z++; delete super.w } })");
        let assign = find(&parsed.program, NodeKind::AssignmentExpression)[0];
        assert_eq!(assign.operator, Some("="));
        let left = assign.child(Field::Left).unwrap();
        assert_eq!(left.kind, NodeKind::SuperMember);
        assert!(left.name_is("x"));
        let right = assign.child(Field::Right).unwrap();
        assert!(right.flags.computed);
        assert!(right.child(Field::Property).unwrap().name_is("y"));

        let update = find(&parsed.program, NodeKind::UpdateExpression)[0];
        assert_eq!(update.operator, Some("++"));
        assert!(!update.flags.prefix);

        let unary = find(&parsed.program, NodeKind::UnaryExpression)[0];
        assert_eq!(unary.operator, Some("delete"));
        assert_eq!(find(&parsed.program, NodeKind::ObjectMethod).len(), 1);
    }

    #[test]
    fn test_for_await_shape() {
        let parsed = parse("async function f() { outer: for await (const x of xs) g(x); }");
        let label = find(&parsed.program, NodeKind::LabeledStatement)[0];
        let stmt = label.child(Field::Body).unwrap();
        assert_eq!(stmt.kind, NodeKind::ForOfStatement);
        assert!(stmt.flags.is_await);
        assert_eq!(stmt.child(Field::Left).unwrap().kind, NodeKind::VariableDeclaration);
        assert!(stmt.child(Field::Right).unwrap().name_is("xs"));
        assert_eq!(stmt.child(Field::Body).unwrap().kind, NodeKind::Statement);
    }

    #[test]
    fn test_syntax_error_position() {
        let err = SwcParser::new()
            .parse("let a = 1;\nlet = = 2;", &ParseOptions::default())
            .unwrap_err();
        match err {
            TransformError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_typescript_option() {
        let options = ParseOptions {
            jsx: false,
            typescript: true,
        };
        let parsed = SwcParser::new()
            .parse("async function f(a: number): Promise<void> { await a }", &options)
            .unwrap();
        assert_eq!(find(&parsed.program, NodeKind::AwaitExpression).len(), 1);
        assert!(SwcParser::new()
            .parse("let a: number = 1", &ParseOptions::default())
            .is_err());
    }
}
