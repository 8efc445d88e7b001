//! Lowering of `for await` loops.
//!
//! ```text
//! for await (const x of xs) body
//! ```
//!
//! becomes a plain `for` loop over the iterator returned by
//! `__asyncIterator(xs)`, with every `next()` result awaited and the loop
//! variable bound at the top of the body. A `try`/`finally` around the loop
//! calls the iterator's `return()` when the loop is left early.
//! `$dN` is set while no `return()` is owed, `$eN` holds an error thrown by
//! the loop, `$sN` is the current step and `$iN` the iterator.

use super::TransformContext;
use crate::error::TransformError;
use crate::syntax::{Field, Node, NodeKind, ParentSlot};

pub(super) fn lower(ctx: &mut TransformContext<'_>, node: &Node, parent: ParentSlot<'_>) -> Result<(), TransformError> {
    let scope = *ctx.scopes.current();
    if !scope.is_async {
        return Ok(());
    }
    let (Some(left), Some(right), Some(body)) = (
        node.child(Field::Left),
        node.child(Field::Right),
        node.child(Field::Body),
    ) else {
        return Ok(());
    };

    // A label must stay directly on the loop for `continue label` to work.
    let wrap_start = match parent {
        Some((label, Field::Body)) if label.is(NodeKind::LabeledStatement) => label.start(),
        _ => node.start(),
    };

    let keyword = ctx
        .tokens
        .find_forward(node.start(), "await")
        .ok_or_else(|| TransformError::missing("await", node.start()))?;
    let lparen = keyword + 1;
    if !ctx.tokens.is(lparen, "(") {
        return Err(TransformError::missing("(", node.start()));
    }
    let rparen = ctx
        .tokens
        .find_backward(body.start(), ")")
        .ok_or_else(|| TransformError::missing(")", body.start()))?;
    let (Some(keyword), Some(lparen), Some(rparen)) = (
        ctx.tokens.get(keyword).copied(),
        ctx.tokens.get(lparen).copied(),
        ctx.tokens.get(rparen).copied(),
    ) else {
        return Err(TransformError::missing("(", node.start()));
    };

    let n = ctx.next_temp();
    let awaited = |value: &str| {
        if scope.is_async_generator() {
            format!("yield{{__await:{value}}}")
        } else {
            format!("yield {value}")
        }
    };
    let step = awaited(&format!("$i{n}.next()"));
    let cleanup = awaited(&format!("$i{n}.return()"));

    let edits = &mut ctx.edits;
    edits.insert_after(wrap_start, "try{");
    edits.remove(keyword.start(), lparen.start());

    // The loop target moves to the top of the body, bound to the step value.
    let dest = if body.is(NodeKind::BlockStatement) {
        body.start() + 1
    } else {
        edits.insert_before(body.start(), "{");
        edits.insert_before(body.end(), "}");
        body.start()
    };
    if left.is(NodeKind::VariableDeclaration) {
        edits.insert_before(left.end(), &format!("=$s{n}.value;"));
    } else {
        edits.insert_after(left.start(), "(");
        edits.insert_before(left.end(), &format!("=$s{n}.value);"));
    }
    edits.move_range(left.start(), left.end(), dest);

    edits.overwrite(
        left.end(),
        right.start(),
        &format!("var $d{n}=1,$e{n},$s{n},$i{n}=__asyncIterator("),
    );
    edits.overwrite(
        right.end(),
        rparen.end(),
        &format!(");$d{n}=1,!($s{n}={step}).done&&!($d{n}=0);)"),
    );
    edits.insert_before(
        node.end(),
        &format!(
            "}}catch($x{n}){{$e{n}={{e:$x{n}}}}}finally{{try{{$d{n}||!$i{n}.return||({cleanup})}}catch($x{n}){{if(!$e{n})throw $x{n}}}if($e{n})throw $e{n}.e}}"
        ),
    );

    ctx.usage.for_await = true;
    tracing::trace!(start = node.start(), temp = n, "lowered for await");
    Ok(())
}
