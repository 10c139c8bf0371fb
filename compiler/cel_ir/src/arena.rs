//! Append-only storage for expression nodes.

use crate::{
    Expr, ExprId, ExprKind, ExprRange, FieldInit, FieldInitRange, MapEntry, MapEntryRange, Span,
};

/// Arena holding every node of one expression tree.
///
/// Nodes are addressed by `ExprId`; child lists live in side tables and are
/// addressed by ranges. Nothing is ever removed or overwritten, so ids stay
/// valid for the lifetime of the arena.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    expr_lists: Vec<ExprId>,
    map_entries: Vec<MapEntry>,
    field_inits: Vec<FieldInit>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and return its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX - 1` nodes.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let index = u32::try_from(self.exprs.len())
            .ok()
            .filter(|i| *i != u32::MAX)
            .unwrap_or_else(|| panic!("expression arena overflow"));
        self.exprs.push(expr);
        ExprId::new(index)
    }

    /// Convenience for `alloc_expr(Expr::new(kind, span))`.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.alloc_expr(Expr::new(kind, span))
    }

    #[inline]
    pub fn get_expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.get_expr(id).kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.get_expr(id).span
    }

    pub fn alloc_expr_list(&mut self, ids: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = self.expr_lists.len();
        self.expr_lists.extend(ids);
        let (start, len) = range_bounds(start, self.expr_lists.len());
        ExprRange::new(start, len)
    }

    #[inline]
    pub fn get_expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.as_range()]
    }

    pub fn alloc_map_entries(&mut self, entries: impl IntoIterator<Item = MapEntry>) -> MapEntryRange {
        let start = self.map_entries.len();
        self.map_entries.extend(entries);
        let (start, len) = range_bounds(start, self.map_entries.len());
        MapEntryRange::new(start, len)
    }

    #[inline]
    pub fn get_map_entries(&self, range: MapEntryRange) -> &[MapEntry] {
        &self.map_entries[range.as_range()]
    }

    pub fn alloc_field_inits(
        &mut self,
        fields: impl IntoIterator<Item = FieldInit>,
    ) -> FieldInitRange {
        let start = self.field_inits.len();
        self.field_inits.extend(fields);
        let (start, len) = range_bounds(start, self.field_inits.len());
        FieldInitRange::new(start, len)
    }

    #[inline]
    pub fn get_field_inits(&self, range: FieldInitRange) -> &[FieldInit] {
        &self.field_inits[range.as_range()]
    }

    /// Number of allocated nodes, reachable or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

fn range_bounds(start: usize, end: usize) -> (u32, u32) {
    let start_u32 = u32::try_from(start).unwrap_or_else(|_| panic!("side table overflow"));
    let len = u32::try_from(end - start).unwrap_or_else(|_| panic!("side table overflow"));
    (start_u32, len)
}
