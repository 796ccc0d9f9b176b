//! Subtyping, type equality, and specificity.
//!
//! `SubtypeChecker` borrows the type arena and answers the three relation
//! queries the rest of the runtime is built on:
//!
//! - `is_subtype_of` — the lattice order. Nominal types compare by name
//!   with invariant parameters, walking the supertype chain on mismatch;
//!   unions distribute; tuples compare element-wise with a trailing
//!   sequence absorbing the rest; function types are contravariant in the
//!   domain and covariant in the range.
//! - `types_equal` — mutual subtyping.
//! - `is_more_specific` — the partial order used to keep generic-function
//!   method tables sorted.

use crate::types::{Type, TypeId, TypeStore};

pub struct SubtypeChecker<'a> {
    types: &'a TypeStore,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(types: &'a TypeStore) -> Self {
        SubtypeChecker { types }
    }

    pub fn is_subtype_of(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        // Type constructors stand for their bodies.
        if let Type::Ctor(c) = self.types.get(a) {
            return self.is_subtype_of(c.body, b);
        }
        if let Type::Ctor(c) = self.types.get(b) {
            return self.is_subtype_of(a, c.body);
        }
        if b == TypeId::ANY {
            return true;
        }
        // Union on the left: every member must fit. The empty union is
        // Bottom, which fits vacuously.
        if let Type::Union(u) = self.types.get(a) {
            return u.members.iter().all(|&m| self.is_subtype_of(m, b));
        }
        // Union on the right: some member must absorb.
        if let Type::Union(u) = self.types.get(b) {
            return u.members.iter().any(|&m| self.is_subtype_of(a, m));
        }
        // A type variable is its upper bound for ordering purposes.
        if let Type::Var(v) = self.types.get(b) {
            return self.is_subtype_of(a, v.upper);
        }
        if let Type::Var(v) = self.types.get(a) {
            return self.is_subtype_of(v.upper, b);
        }
        match (self.types.get(a), self.types.get(b)) {
            (Type::Seq(x), Type::Seq(y)) => self.is_subtype_of(*x, *y),
            (Type::Tuple(xs), Type::Tuple(ys)) => self.tuple_subtype(xs, ys),
            (Type::Func(f), Type::Func(g)) => {
                self.is_subtype_of(g.domain, f.domain) && self.is_subtype_of(f.range, g.range)
            }
            (Type::Seq(_), _) | (_, Type::Seq(_)) => false,
            (Type::Tuple(_), _) | (_, Type::Tuple(_)) => false,
            (Type::Func(_), _) | (_, Type::Func(_)) => false,
            _ => self.nominal_subtype(a, b),
        }
    }

    pub fn types_equal(&self, a: TypeId, b: TypeId) -> bool {
        a == b || (self.is_subtype_of(a, b) && self.is_subtype_of(b, a))
    }

    /// Element-wise tuple comparison. A trailing `Seq` on the right absorbs
    /// any remaining elements on the left; a trailing `Seq` on the left is
    /// only absorbed by a trailing `Seq` on the right.
    pub fn tuple_subtype(&self, xs: &[TypeId], ys: &[TypeId]) -> bool {
        let mut i = 0;
        let mut j = 0;
        loop {
            let y_seq = j < ys.len() && self.types.is_seq(ys[j]);
            if i >= xs.len() {
                // Left exhausted: the right must be exhausted too, or end in
                // a sequence absorbing zero elements.
                return j >= ys.len() || (y_seq && j == ys.len() - 1);
            }
            if j >= ys.len() {
                return false;
            }
            let x_seq = self.types.is_seq(xs[i]);
            let xi = if x_seq {
                self.types.seq_inner(xs[i]).unwrap_or(xs[i])
            } else {
                xs[i]
            };
            let yj = if y_seq {
                self.types.seq_inner(ys[j]).unwrap_or(ys[j])
            } else {
                ys[j]
            };
            if !self.is_subtype_of(xi, yj) {
                return false;
            }
            if x_seq {
                // A left sequence covers the rest of the left side, so the
                // right sequence must be trailing and cover the rest too.
                return y_seq && i == xs.len() - 1 && j == ys.len() - 1;
            }
            i += 1;
            if !y_seq {
                j += 1;
            }
        }
    }

    fn nominal_subtype(&self, a: TypeId, b: TypeId) -> bool {
        let b_ty = self.types.get(b);
        let b_name = match b_ty.name() {
            Some(n) => n,
            None => return false,
        };
        let mut cur = a;
        loop {
            let cur_ty = self.types.get(cur);
            if cur_ty.name() == Some(b_name) {
                let ps = cur_ty.params();
                let qs = b_ty.params();
                if ps.len() != qs.len() {
                    return false;
                }
                return ps
                    .iter()
                    .zip(qs.iter())
                    .all(|(&p, &q)| self.param_match(p, q));
            }
            if cur == TypeId::ANY {
                return false;
            }
            cur = match cur_ty.super_ty() {
                Some(s) => s,
                None => return false,
            };
        }
    }

    /// Parameters compare invariantly, except that a type-variable
    /// parameter on the right matches anything within its bounds.
    fn param_match(&self, p: TypeId, q: TypeId) -> bool {
        if p == q {
            return true;
        }
        if let Type::Var(v) = self.types.get(q) {
            return self.is_subtype_of(p, v.upper) && self.is_subtype_of(v.lower, p);
        }
        self.types_equal(p, q)
    }

    // =========================================================================
    // Specificity
    // =========================================================================

    pub fn is_more_specific(&self, a: TypeId, b: TypeId) -> bool {
        if let (Type::Tuple(xs), Type::Tuple(ys)) = (self.types.get(a), self.types.get(b)) {
            return self.sig_more_specific(xs, ys);
        }
        let ab = self.is_subtype_of(a, b);
        let ba = self.is_subtype_of(b, a);
        ab && !ba
    }

    /// Specificity over tuple signatures. Strict subtyping decides when it
    /// can; otherwise a fixed-arity signature beats a variadic one, and an
    /// element-wise comparison breaks the remaining ties.
    pub fn sig_more_specific(&self, xs: &[TypeId], ys: &[TypeId]) -> bool {
        let ab = self.tuple_subtype(xs, ys);
        let ba = self.tuple_subtype(ys, xs);
        if ab && ba {
            return false; // equal signatures
        }
        if ab {
            return true;
        }
        if ba {
            return false;
        }
        let x_var = xs.last().is_some_and(|&t| self.types.is_seq(t));
        let y_var = ys.last().is_some_and(|&t| self.types.is_seq(t));
        if x_var != y_var {
            return !x_var; // fewer sequence absorptions wins
        }
        if xs.len() != ys.len() {
            return false;
        }
        let mut strict = false;
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            let xi = self.types.seq_inner(x).unwrap_or(x);
            let yi = self.types.seq_inner(y).unwrap_or(y);
            let xy = self.is_subtype_of(xi, yi);
            let yx = self.is_subtype_of(yi, xi);
            if xy && !yx {
                strict = true;
            } else if yx && !xy {
                return false;
            } else if !xy && !yx {
                return false;
            }
        }
        strict
    }

    /// Signature equality, used for method replacement.
    pub fn sig_equal(&self, xs: &[TypeId], ys: &[TypeId]) -> bool {
        xs.len() == ys.len()
            && xs
                .iter()
                .zip(ys.iter())
                .all(|(&x, &y)| self.types_equal(x, y))
    }
}
