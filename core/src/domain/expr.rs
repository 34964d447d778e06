//! Derived expressions over variables (`spec.md` §4.2, §9).
//!
//! An `IntExpr` is read-only data (`min`/`max`) until something needs to post
//! a constraint against it, at which point `var()` materializes (and caches)
//! a concrete [`IntVar`] with the same value set. Per the "deep inheritance"
//! redesign flag, this is a closed tagged enum plus a `Custom` escape hatch,
//! not a class hierarchy.

use hashbrown::HashMap;

use crate::create_ref_type;
use crate::domain::{IntCst, IntVar};
use crate::solver::Solver;

create_ref_type!(IntExprId);

/// A user-supplied expression kind the core has no built-in propagator for.
/// Only `min`/`max`/`var` need implementing; `var` is called at most once
/// per expression (the result is cached by [`Solver`]).
pub trait CustomExpr {
    fn min(&self, solver: &Solver) -> IntCst;
    fn max(&self, solver: &Solver) -> IntCst;
    fn materialize(&self, solver: &mut Solver) -> IntVar;
}

enum ExprKind {
    Var(IntVar),
    Const(IntCst),
    Sum(Vec<IntExprId>),
    /// `table[index]`, the classic `element` view.
    Element { index: IntExprId, table: Vec<IntCst> },
    Custom(Box<dyn CustomExpr>),
}

struct ExprData {
    kind: ExprKind,
    /// Memoized result of `var()`; `var()` is idempotent (`spec.md` §4.2).
    materialized: Option<IntVar>,
}

/// A structural key used to share expression nodes built from the same
/// operator and operands, so that e.g. two calls building `sum(a, b)`
/// return the same [`IntExprId`] (`spec.md` §3 "Expressions... cached per
/// expression tree to preserve sharing").
#[derive(PartialEq, Eq, Hash, Clone)]
enum ExprKey {
    Var(IntVar),
    Const(IntCst),
    Sum(Vec<IntExprId>),
    Element(IntExprId, Vec<IntCst>),
}

#[derive(Default)]
pub(crate) struct ExprStore {
    nodes: crate::collections::ref_store::RefVec<IntExprId, ExprData>,
    cache: HashMap<ExprKey, IntExprId>,
}

impl Solver {
    fn intern(&mut self, key: ExprKey, kind: ExprKind) -> IntExprId {
        if let Some(&id) = self.exprs.cache.get(&key) {
            return id;
        }
        let id = self.exprs.nodes.push(ExprData { kind, materialized: None });
        self.exprs.cache.insert(key, id);
        id
    }

    pub fn expr_from_var(&mut self, v: IntVar) -> IntExprId {
        self.intern(ExprKey::Var(v), ExprKind::Var(v))
    }

    pub fn expr_const(&mut self, c: IntCst) -> IntExprId {
        self.intern(ExprKey::Const(c), ExprKind::Const(c))
    }

    pub fn expr_sum(&mut self, terms: &[IntExprId]) -> IntExprId {
        let key = ExprKey::Sum(terms.to_vec());
        self.intern(key, ExprKind::Sum(terms.to_vec()))
    }

    pub fn expr_element(&mut self, index: IntExprId, table: &[IntCst]) -> IntExprId {
        let key = ExprKey::Element(index, table.to_vec());
        self.intern(key, ExprKind::Element { index, table: table.to_vec() })
    }

    pub fn expr_custom(&mut self, custom: impl CustomExpr + 'static) -> IntExprId {
        self.exprs.nodes.push(ExprData { kind: ExprKind::Custom(Box::new(custom)), materialized: None })
    }

    pub fn expr_min(&self, e: IntExprId) -> IntCst {
        match &self.exprs.nodes[e].kind {
            ExprKind::Var(v) => self.min(*v),
            ExprKind::Const(c) => *c,
            ExprKind::Sum(terms) => terms.iter().map(|&t| self.expr_min(t)).sum(),
            ExprKind::Element { index, table } => {
                let (lo, hi) = (self.expr_min(*index), self.expr_max(*index));
                (lo..=hi).filter_map(|i| table.get(i as usize).copied()).min().expect("element index range empty")
            }
            ExprKind::Custom(c) => c.min(self),
        }
    }

    pub fn expr_max(&self, e: IntExprId) -> IntCst {
        match &self.exprs.nodes[e].kind {
            ExprKind::Var(v) => self.max(*v),
            ExprKind::Const(c) => *c,
            ExprKind::Sum(terms) => terms.iter().map(|&t| self.expr_max(t)).sum(),
            ExprKind::Element { index, table } => {
                let (lo, hi) = (self.expr_min(*index), self.expr_max(*index));
                (lo..=hi).filter_map(|i| table.get(i as usize).copied()).max().expect("element index range empty")
            }
            ExprKind::Custom(c) => c.max(self),
        }
    }

    /// Returns (materializing on first call) the canonical `IntVar` backing
    /// `e`. Idempotent: later calls return the same variable.
    pub fn expr_var(&mut self, e: IntExprId) -> IntVar {
        if let Some(v) = self.exprs.nodes[e].materialized {
            return v;
        }
        let v = match std::mem::replace(&mut self.exprs.nodes[e].kind, ExprKind::Const(0)) {
            ExprKind::Var(v) => v,
            ExprKind::Const(c) => self.new_int_var(c, c),
            ExprKind::Sum(terms) => {
                let vars: Vec<IntVar> = terms.iter().map(|&t| self.expr_var(t)).collect();
                let (lo, hi) = (self.expr_min(e), self.expr_max(e));
                let result = self.new_int_var(lo, hi);
                self.post(crate::constraints::SumEquals::new(vars, result))
                    .expect("posting sum-materialization constraint cannot fail on fresh variables");
                result
            }
            ExprKind::Element { index, table } => {
                let index_var = self.expr_var(index);
                let (lo, hi) = (self.expr_min(e), self.expr_max(e));
                let result = self.new_int_var(lo, hi);
                self.post(crate::constraints::Element::new(index_var, table, result))
                    .expect("posting element-materialization constraint cannot fail on fresh variables");
                result
            }
            ExprKind::Custom(c) => {
                let v = c.materialize(self);
                self.exprs.nodes[e].kind = ExprKind::Custom(c);
                self.exprs.nodes[e].materialized = Some(v);
                return v;
            }
        };
        self.exprs.nodes[e].materialized = Some(v);
        v
    }
}
