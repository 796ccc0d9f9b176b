//! Conversion and numeric promotion.
//!
//! `convert` is type-driven: a value already of the target type passes
//! through, tuples convert structurally, and everything else goes through
//! the conversion method registered on the target bits or struct type.
//!
//! Promotion is covariant in parameters: `T{S}` promotes to `T{R}` when `S`
//! promotes to `R`, so the square
//!
//! ```text
//!       Int32 ---------------> Float64
//!         |                       |
//!         V                       V
//!   Complex{Int32} ------> Complex{Float64}
//! ```
//!
//! commutes once the top arrow is declared.

use smallvec::SmallVec;
use tracing::trace;

use crate::context::Runtime;
use crate::error::{RuntimeError, RuntimeResult};
use crate::subtype::SubtypeChecker;
use crate::types::{Type, TypeId};
use crate::value::Value;

impl Runtime {
    // =========================================================================
    // Conversion
    // =========================================================================

    pub fn convert(&mut self, x: &Value, to: TypeId) -> RuntimeResult<Value> {
        if let Value::Tuple(elements) = x {
            if to == TypeId::TUPLE {
                return Ok(x.clone());
            }
            let targets = match self.types.get(to) {
                Type::Tuple(targets) => Some(targets.clone()),
                _ => None,
            };
            if let Some(targets) = targets {
                let elements = elements.clone();
                return self.convert_tuple(&elements, &targets);
            }
        }
        let t = self.type_of(x);
        if self.is_subtype(t, to) {
            return Ok(x.clone());
        }
        let method = match self.types.get(to) {
            Type::Bits(b) => b.fconvert.clone(),
            Type::Struct(s) => s.fconvert.clone(),
            _ => return Err(RuntimeError::Conversion("invalid conversion".to_string())),
        };
        let method = match method {
            Some(m) => m,
            None => {
                return Err(RuntimeError::Conversion(format!(
                    "no conversion to {} defined",
                    self.type_name(to)
                )));
            }
        };
        trace!(to = %self.type_name(to), "convert via registered method");
        let out = self.apply(&method, std::slice::from_ref(x))?;
        let out_ty = self.type_of(&out);
        if !self.is_subtype(out_ty, to) {
            return Err(RuntimeError::Conversion(format!(
                "conversion to {} failed",
                self.type_name(to)
            )));
        }
        Ok(out)
    }

    /// Element-wise tuple conversion; a trailing `Seq` target absorbs the
    /// remaining elements.
    fn convert_tuple(&mut self, xs: &[Value], targets: &[TypeId]) -> RuntimeResult<Value> {
        let mut out = Vec::with_capacity(xs.len());
        let mut seq_elem: Option<TypeId> = None;
        for (i, x) in xs.iter().enumerate() {
            let target = match seq_elem {
                Some(t) => t,
                None => {
                    if i >= targets.len() {
                        return Err(RuntimeError::Conversion(
                            "invalid tuple conversion".to_string(),
                        ));
                    }
                    match self.types.seq_inner(targets[i]) {
                        Some(inner) => {
                            seq_elem = Some(inner);
                            inner
                        }
                        None => targets[i],
                    }
                }
            };
            out.push(self.convert(x, target)?);
        }
        Ok(Value::tuple(out))
    }

    // =========================================================================
    // Promotion
    // =========================================================================

    pub fn promote(&mut self, args: &[Value]) -> RuntimeResult<Value> {
        if args.is_empty() {
            return Ok(Value::unit());
        }
        if args.len() == 1 {
            return Ok(Value::tuple(vec![args[0].clone()]));
        }
        let mut argtypes: SmallVec<[TypeId; 8]> = SmallVec::new();
        for a in args {
            let t = self.type_of(a);
            if !self.types.is_nominal(t) {
                return Err(RuntimeError::Promotion(
                    "promotion not applicable to given types".to_string(),
                ));
            }
            argtypes.push(t);
        }
        let mut common = self
            .bigger_type(argtypes[0], argtypes[1])
            .ok_or_else(no_common_embedding)?;
        for &t in &argtypes[2..] {
            common = self.bigger_type(common, t).ok_or_else(no_common_embedding)?;
        }
        let mut out = Vec::with_capacity(args.len());
        for a in args {
            out.push(self.convert(a, common)?);
        }
        Ok(Value::tuple(out))
    }

    /// The least common embedding of two nominal types, or `None` when no
    /// side can embed the other.
    pub fn bigger_type(&self, t1: TypeId, t2: TypeId) -> Option<TypeId> {
        if self.types_equal(t1, t2) {
            return Some(t1);
        }
        // Bits types order by width alone; equal widths with different
        // identities have no common embedding.
        if let (Type::Bits(b1), Type::Bits(b2)) = (self.types.get(t1), self.types.get(t2)) {
            if b1.nbits > b2.nbits {
                return Some(t1);
            }
            if b2.nbits > b1.nbits {
                return Some(t2);
            }
            return None;
        }
        let checker = SubtypeChecker::new(&self.types);
        let mut a = t1;
        let mut b = t2;
        loop {
            if a == TypeId::ANY {
                if b != TypeId::ANY {
                    return Some(t1);
                }
                return None;
            }
            if b == TypeId::ANY {
                return Some(t2);
            }

            let a_ty = self.types.get(a);
            let b_ty = self.types.get(b);
            if a_ty.name().is_some() && a_ty.name() == b_ty.name() {
                // Same nominal head: pick the bigger parameter at every
                // position; all positions must agree on the winner.
                let ps = a_ty.params();
                let qs = b_ty.params();
                if ps.len() != qs.len() {
                    return None;
                }
                let mut winner: Option<TypeId> = None;
                for (&p, &q) in ps.iter().zip(qs.iter()) {
                    if checker.types_equal(p, q) {
                        continue;
                    }
                    if !self.types.is_nominal(p) || !self.types.is_nominal(q) {
                        return None;
                    }
                    if self.is_type_bigger(p, q) {
                        if winner == Some(t2) {
                            return None;
                        }
                        winner = Some(t1);
                    } else if self.is_type_bigger(q, p) {
                        if winner == Some(t1) {
                            return None;
                        }
                        winner = Some(t2);
                    } else {
                        return None;
                    }
                }
                return Some(winner.unwrap_or(t1));
            }

            if checker.is_more_specific(a, b) {
                return Some(t2);
            }
            if checker.is_more_specific(b, a) {
                return Some(t1);
            }
            a = self.types.get(a).super_ty()?;
            b = self.types.get(b).super_ty()?;
        }
    }

    fn is_type_bigger(&self, a: TypeId, b: TypeId) -> bool {
        self.bigger_type(a, b) == Some(a)
    }
}

fn no_common_embedding() -> RuntimeError {
    RuntimeError::Promotion("arguments have no common embedding type".to_string())
}
