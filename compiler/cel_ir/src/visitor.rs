//! Tree traversal helpers.
//!
//! Traversal is iterative so deeply nested expansions never recurse on the
//! native stack.

use smallvec::SmallVec;

use crate::{ExprArena, ExprId, ExprKind};

/// Direct children of `id`, in source order.
pub fn children(arena: &ExprArena, id: ExprId) -> SmallVec<[ExprId; 4]> {
    let mut out = SmallVec::new();
    match arena.kind(id) {
        ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::Error(_) => {}
        ExprKind::List(range) => out.extend_from_slice(arena.get_expr_list(*range)),
        ExprKind::Map(range) => {
            for entry in arena.get_map_entries(*range) {
                out.push(entry.key);
                out.push(entry.value);
            }
        }
        ExprKind::Struct { fields, .. } => {
            out.extend(arena.get_field_inits(*fields).iter().map(|f| f.value));
        }
        ExprKind::Select { operand, .. } => out.push(*operand),
        ExprKind::Call { target, args, .. } => {
            out.extend(*target);
            out.extend_from_slice(arena.get_expr_list(*args));
        }
        ExprKind::Comprehension(c) => out.extend([
            c.iter_range,
            c.accu_init,
            c.loop_condition,
            c.loop_step,
            c.result,
        ]),
    }
    out
}

/// Visit every node reachable from `root` in pre-order.
pub fn walk(arena: &ExprArena, root: ExprId, mut visit: impl FnMut(ExprId, &ExprKind)) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        visit(id, arena.kind(id));
        // Reverse so the leftmost child is visited first.
        stack.extend(children(arena, id).into_iter().rev());
    }
}

/// Every `Error` node reachable from `root`, in source order.
pub fn collect_errors(arena: &ExprArena, root: ExprId) -> Vec<(ExprId, String)> {
    let mut errors = Vec::new();
    walk(arena, root, |id, kind| {
        if let ExprKind::Error(message) = kind {
            errors.push((id, message.clone()));
        }
    });
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExprFactory, Span};
    use pretty_assertions::assert_eq;

    #[test]
    fn walk_is_preorder_left_to_right() {
        let mut arena = ExprArena::new();
        let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
        let a = f.new_ident("a");
        let b = f.new_ident("b");
        let c = f.new_ident("c");
        let call = f.new_member_call("f", a, [b, c]);

        let mut order = Vec::new();
        walk(&arena, call, |id, _| order.push(id));
        assert_eq!(order, vec![call, a, b, c]);
    }

    #[test]
    fn collects_nested_errors() {
        let mut arena = ExprArena::new();
        let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
        let first = f.report_call_error("first");
        let second = f.report_call_error("second");
        let inner = f.new_list([second]);
        let outer = f.new_global_call("g", [first, inner]);

        assert_eq!(
            collect_errors(&arena, outer),
            vec![(first, "first".to_owned()), (second, "second".to_owned())]
        );
    }
}
