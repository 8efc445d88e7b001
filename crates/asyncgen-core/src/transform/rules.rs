//! Rewrite rules.
//!
//! Capture flags are collected on the way down and every edit is issued on
//! the way up, so a function is wrapped only once everything inside it has
//! reported what it needs. Closing text inserted at one offset therefore
//! appears innermost first.

use tracing::trace;

use super::for_await;
use super::scope::{opens_scope, ScopeRecord};
use super::TransformContext;
use crate::error::TransformError;
use crate::syntax::{Field, Node, NodeKind, ParentSlot, Visit, Visitor};

/// The rule set driven by the walker.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsyncRewriter;

impl<'s> Visitor<TransformContext<'s>> for AsyncRewriter {
    type Error = TransformError;

    fn enter(
        &mut self,
        ctx: &mut TransformContext<'s>,
        node: &Node,
        parent: ParentSlot<'_>,
    ) -> Result<Visit, TransformError> {
        if ctx.source_map {
            ctx.edits.add_mapping(node.start());
            ctx.edits.add_mapping(node.end());
        }
        if evaluated_outside(parent) {
            ctx.scopes.suspend();
        } else if own_params(parent) {
            ctx.scopes.enter_params();
        }
        if opens_scope(node) {
            ctx.scopes.push(ScopeRecord::for_node(node));
        }
        match node.kind {
            NodeKind::ThisExpression => ctx.scopes.mark_this(),
            NodeKind::Identifier if node.name_is("arguments") => ctx.scopes.mark_arguments(),
            _ => {}
        }
        Ok(Visit::Continue)
    }

    fn leave(
        &mut self,
        ctx: &mut TransformContext<'s>,
        node: &Node,
        parent: ParentSlot<'_>,
    ) -> Result<(), TransformError> {
        let result = match node.kind {
            _ if opens_scope(node) => {
                let record = ctx.scopes.pop();
                if record.is_async && node.kind.is_function_like() {
                    rewrite_function(ctx, node, &record)
                } else {
                    Ok(())
                }
            }
            NodeKind::AwaitExpression => rewrite_await(ctx, node, parent),
            NodeKind::SuperMember => rewrite_super_member(ctx, node, parent),
            NodeKind::AssignmentExpression => rewrite_super_assignment(ctx, node),
            NodeKind::UpdateExpression => rewrite_super_update(ctx, node),
            NodeKind::ForOfStatement if node.flags.is_await => for_await::lower(ctx, node, parent),
            _ => Ok(()),
        };
        if evaluated_outside(parent) {
            ctx.scopes.resume();
        } else if own_params(parent) {
            ctx.scopes.leave_params();
        }
        result
    }
}

/// Computed keys and decorators run in the scope around their owner, and so
/// do the parameters of an arrow.
fn evaluated_outside(parent: ParentSlot<'_>) -> bool {
    match parent {
        Some((owner, Field::Key | Field::Decorators)) => opens_scope(owner),
        Some((owner, Field::Params)) => opens_scope(owner) && owner.is(NodeKind::ArrowFunctionExpression),
        _ => false,
    }
}

/// Parameters of a function with its own receiver: they see its `this` and
/// `super` but run before its body is wrapped.
fn own_params(parent: ParentSlot<'_>) -> bool {
    matches!(parent, Some((owner, Field::Params)) if owner.kind.owns_receiver())
}

/// Positions where a bare `yield` would bind differently than `await` did.
fn needs_parens(parent: ParentSlot<'_>) -> bool {
    let Some((owner, field)) = parent else {
        return false;
    };
    match owner.kind {
        NodeKind::BinaryExpression
        | NodeKind::LogicalExpression
        | NodeKind::UnaryExpression
        | NodeKind::UpdateExpression => true,
        NodeKind::ConditionalExpression => field == Field::Test,
        NodeKind::MemberExpression => field == Field::Object,
        NodeKind::CallExpression | NodeKind::NewExpression => field == Field::Callee,
        NodeKind::TaggedTemplate => field == Field::Tag,
        NodeKind::Class => field == Field::SuperClass,
        _ => false,
    }
}

fn rewrite_await(ctx: &mut TransformContext<'_>, node: &Node, parent: ParentSlot<'_>) -> Result<(), TransformError> {
    let scope = *ctx.scopes.current();
    if !scope.is_async {
        return Ok(());
    }
    let Some(argument) = node.child(Field::Argument) else {
        return Ok(());
    };
    if ctx.tokens.locate(node.start()).map_or(true, |i| !ctx.tokens.is(i, "await")) {
        return Err(TransformError::missing("await", node.start()));
    }

    let marker = scope.is_async_generator();
    let parens = needs_parens(parent);
    let newline = ctx.lines.crosses_line(node.start(), argument.start());
    let (open, close) = match (marker, parens, newline) {
        (true, false, _) => ("yield{__await:", "}"),
        (true, true, _) => ("(yield{__await:", "})"),
        (false, true, false) => ("(yield", ")"),
        (false, true, true) => ("(yield(", "))"),
        (false, false, true) => ("yield(", ")"),
        (false, false, false) => ("yield", ""),
    };
    ctx.edits.overwrite(node.start(), node.start() + 5, open);
    if !close.is_empty() {
        ctx.edits.insert_before(node.end(), close);
    }
    trace!(offset = node.start(), replacement = open, "await");
    Ok(())
}

/// Parameters of the injected generator and the arguments it is invoked
/// with, in matching order.
fn closure_bindings(record: &ScopeRecord, inherited_accessors: bool) -> (String, String) {
    let mut params = Vec::new();
    let mut args = Vec::new();
    if record.references_arguments {
        params.push("arguments");
        args.push("arguments");
    }
    if record.references_super {
        params.push("$uper");
        args.push(if inherited_accessors { "$uper" } else { "p=>super[p]" });
    }
    if record.references_super_assignment {
        params.push("$uperEq");
        args.push(if inherited_accessors {
            "$uperEq"
        } else {
            "(p,v)=>(super[p]=v)"
        });
    }
    (params.join(","), args.join(","))
}

fn rewrite_function(ctx: &mut TransformContext<'_>, node: &Node, record: &ScopeRecord) -> Result<(), TransformError> {
    let Some(body) = node.child(Field::Body) else {
        return Ok(());
    };

    // An async arrow directly inside another rewritten function finds the
    // accessors as parameters of that function's generator.
    let inherited = record.is_arrow && ctx.scopes.rewrites_super();
    let (params, args) = closure_bindings(record, inherited);
    let driver = if record.is_generator { "__asyncGen" } else { "__async" };
    let opener = format!("{driver}(function*({params}){{");
    let closer = match (record.references_this, args.is_empty()) {
        (true, true) => "}.call(this))".to_string(),
        (true, false) => format!("}}.call(this,{args}))"),
        (false, _) => format!("}}({args}))"),
    };

    if node.is(NodeKind::ArrowFunctionExpression) {
        strip_arrow_async(ctx, node)?;
        if body.is(NodeKind::BlockStatement) {
            ctx.edits.overwrite(body.start(), body.start() + 1, &opener);
            ctx.edits.overwrite(body.end() - 1, body.end(), &closer);
        } else {
            let arrow = ctx
                .tokens
                .find_backward(body.start(), "=>")
                .ok_or_else(|| TransformError::missing("=>", body.start()))?;
            let arrow_end = ctx.tokens.get(arrow).map_or(body.start(), |t| t.end());
            ctx.edits.insert_before(arrow_end, &opener);
            ctx.edits.insert_after(body.start(), "return ");
            ctx.edits.insert_before(body.end(), &closer);
        }
    } else {
        if node.kind.is_method() {
            strip_method_async(ctx, node)?;
        } else {
            strip_function_async(ctx, node)?;
        }
        ctx.edits.insert_before(body.start() + 1, &format!("return {opener}"));
        ctx.edits.insert_before(body.end() - 1, &closer);
    }

    if record.is_generator {
        ctx.usage.async_generator = true;
    } else {
        ctx.usage.async_fn = true;
    }
    ctx.rewritten += 1;
    trace!(
        kind = %node.kind,
        start = node.start(),
        generator = record.is_generator,
        this = record.references_this,
        "rewrote async function"
    );
    Ok(())
}

fn token_start(ctx: &TransformContext<'_>, index: usize, fallback: u32) -> u32 {
    ctx.tokens.get(index).map_or(fallback, |t| t.start())
}

/// `async function* f` becomes `function f`.
fn strip_function_async(ctx: &mut TransformContext<'_>, node: &Node) -> Result<(), TransformError> {
    let function = ctx
        .tokens
        .find_forward(node.start(), "function")
        .ok_or_else(|| TransformError::missing("function", node.start()))?;
    let keyword = function
        .checked_sub(1)
        .filter(|&i| ctx.tokens.is(i, "async"))
        .ok_or_else(|| TransformError::missing("async", node.start()))?;
    let start = token_start(ctx, keyword, node.start());
    let end = token_start(ctx, function, node.start());
    ctx.edits.remove(start, end);

    if node.flags.is_generator {
        let star = function + 1;
        if !ctx.tokens.is(star, "*") {
            return Err(TransformError::missing("*", end));
        }
        let (star_start, star_end) = ctx
            .tokens
            .get(star)
            .map_or((end, end), |t| (t.start(), t.end()));
        let bytes = ctx.source.as_bytes();
        let tight = |offset: Option<u32>| {
            offset
                .and_then(|o| bytes.get(o as usize))
                .is_some_and(|b| !b.is_ascii_whitespace())
        };
        let replacement = if tight(star_start.checked_sub(1)) && tight(Some(star_end)) {
            " "
        } else {
            ""
        };
        ctx.edits.overwrite(star_start, star_end, replacement);
    }
    Ok(())
}

/// `static async *[key]()` becomes `static [key]()`.
fn strip_method_async(ctx: &mut TransformContext<'_>, node: &Node) -> Result<(), TransformError> {
    let key = node
        .child(Field::Key)
        .ok_or_else(|| TransformError::missing("method key", node.start()))?;
    let key_token = ctx.tokens.first_at_or_after(key.start());
    let mut before = key_token.checked_sub(1);
    if node.flags.is_generator {
        before = before
            .filter(|&i| ctx.tokens.is(i, "*"))
            .and_then(|i| i.checked_sub(1));
    }
    let keyword = before
        .filter(|&i| ctx.tokens.is(i, "async"))
        .ok_or_else(|| TransformError::missing("async", key.start()))?;
    let start = token_start(ctx, keyword, key.start());
    ctx.edits.remove(start, token_start(ctx, key_token, key.start()));
    Ok(())
}

/// `async (a) => a` becomes `(a) => a`.
fn strip_arrow_async(ctx: &mut TransformContext<'_>, node: &Node) -> Result<(), TransformError> {
    let first = ctx.tokens.first_at_or_after(node.start());
    let keyword = [Some(first), first.checked_sub(1)]
        .into_iter()
        .flatten()
        .find(|&i| ctx.tokens.is(i, "async"))
        .ok_or_else(|| TransformError::missing("async", node.start()))?;
    let start = token_start(ctx, keyword, node.start());
    let end = token_start(ctx, keyword + 1, node.end());
    ctx.edits.remove(start, end);
    Ok(())
}

/// `"name"` for `super.name`.
fn key_literal(member: &Node) -> String {
    format!("\"{}\"", member.name.as_deref().unwrap_or_default())
}

fn rewrite_super_member(ctx: &mut TransformContext<'_>, node: &Node, parent: ParentSlot<'_>) -> Result<(), TransformError> {
    if !ctx.scopes.rewrites_super() {
        return Ok(());
    }
    // Write forms are rewritten together with their parent.
    match parent {
        Some((p, Field::Argument)) if p.is(NodeKind::UnaryExpression) && p.operator == Some("delete") => {
            return Ok(());
        }
        Some((p, Field::Left)) if p.is(NodeKind::AssignmentExpression) => return Ok(()),
        Some((p, Field::Argument)) if p.is(NodeKind::UpdateExpression) => return Ok(()),
        _ => {}
    }

    if node.flags.computed {
        let property = node
            .child(Field::Property)
            .ok_or_else(|| TransformError::missing("[", node.start()))?;
        ctx.edits.overwrite(node.start(), property.start(), "$uper(");
        ctx.edits.overwrite(property.end(), node.end(), ")");
    } else {
        let read = format!("$uper({})", key_literal(node));
        ctx.edits.overwrite(node.start(), node.end(), &read);
    }
    ctx.scopes.mark_super();

    match parent {
        Some((call, Field::Callee)) if call.is(NodeKind::CallExpression) => {
            bind_super_call(ctx, node, call)?;
        }
        Some((new, Field::Callee)) if new.is(NodeKind::NewExpression) => {
            ctx.edits.insert_after(node.start(), "(");
            ctx.edits.insert_before(node.end(), ")");
        }
        _ => {}
    }
    Ok(())
}

/// `$uper("m")(a)` becomes `$uper("m").call(this,a)`, and `?.(` becomes
/// `?.call(this`. Type arguments are dropped since `.call` takes none.
fn bind_super_call(ctx: &mut TransformContext<'_>, callee: &Node, call: &Node) -> Result<(), TransformError> {
    let mut after = callee.end();
    if let Some(type_args) = call.child(Field::TypeArguments) {
        ctx.edits.remove(type_args.start(), type_args.end());
        after = type_args.end();
    }
    let paren = ctx
        .tokens
        .find_forward(after, "(")
        .ok_or_else(|| TransformError::missing("(", after))?;
    let (start, end) = ctx
        .tokens
        .get(paren)
        .map_or((after, after + 1), |t| (t.start(), t.end()));
    let method = if call.flags.optional { "call(this" } else { ".call(this" };
    let separator = if call.children(Field::Arguments).is_empty() { "" } else { "," };
    ctx.edits.overwrite(start, end, &format!("{method}{separator}"));
    ctx.scopes.mark_this();
    Ok(())
}

fn unsupported(ctx: &TransformContext<'_>, construct: &'static str, offset: u32) -> TransformError {
    let (line, column) = ctx.lines.line_col(offset);
    TransformError::Unsupported {
        construct,
        line: line + 1,
        column: column + 1,
    }
}

fn super_target<'n>(ctx: &TransformContext<'_>, node: &'n Node, field: Field) -> Option<&'n Node> {
    if !ctx.scopes.rewrites_super() {
        return None;
    }
    node.child(field)
        .filter(|target| target.is(NodeKind::SuperMember))
}

fn rewrite_super_assignment(ctx: &mut TransformContext<'_>, node: &Node) -> Result<(), TransformError> {
    let Some(left) = super_target(ctx, node, Field::Left) else {
        return Ok(());
    };
    let Some(right) = node.child(Field::Right) else {
        return Ok(());
    };
    let op = node.operator.unwrap_or("=");

    if op == "=" {
        if left.flags.computed {
            let property = left
                .child(Field::Property)
                .ok_or_else(|| TransformError::missing("[", left.start()))?;
            ctx.edits.overwrite(left.start(), property.start(), "$uperEq(");
            ctx.edits.overwrite(property.end(), right.start(), ",");
        } else {
            let head = format!("$uperEq({},", key_literal(left));
            ctx.edits.overwrite(left.start(), right.start(), &head);
        }
        ctx.edits.insert_before(node.end(), ")");
        ctx.scopes.mark_super_assignment();
        return Ok(());
    }

    if left.flags.computed {
        return Err(unsupported(
            ctx,
            "compound assignment to computed super member",
            node.start(),
        ));
    }
    let key = key_literal(left);
    let binary = op.strip_suffix('=').unwrap_or(op);
    let head = if matches!(op, "||=" | "&&=" | "??=") {
        format!("($uper({key}){binary}$uperEq({key},")
    } else {
        format!("$uperEq({key},$uper({key}){binary}(")
    };
    ctx.edits.overwrite(left.start(), right.start(), &head);
    ctx.edits.insert_before(node.end(), "))");
    ctx.scopes.mark_super();
    ctx.scopes.mark_super_assignment();
    Ok(())
}

fn rewrite_super_update(ctx: &mut TransformContext<'_>, node: &Node) -> Result<(), TransformError> {
    let Some(target) = super_target(ctx, node, Field::Argument) else {
        return Ok(());
    };
    if target.flags.computed {
        return Err(unsupported(ctx, "update of computed super member", node.start()));
    }
    let key = key_literal(target);
    let (step, undo) = if node.operator == Some("--") {
        ("-1", "+1")
    } else {
        ("+1", "-1")
    };
    let assign = format!("$uperEq({key},+$uper({key}){step})");
    let text = if node.flags.prefix {
        assign
    } else {
        format!("({assign}{undo})")
    };
    ctx.edits.overwrite(node.start(), node.end(), &text);
    ctx.scopes.mark_super();
    ctx.scopes.mark_super_assignment();
    Ok(())
}
