//! Type-parameter substitution.

use rustc_hash::{FxHashMap, FxHashSet};

use rsig_ir::{MethodArm, Name, StringInterner, TypeExpr, TypeParam};

use crate::stack::ensure_sufficient_stack;

/// Maps type-parameter names to the arguments applied for them.
#[derive(Clone, Debug, Default)]
pub struct Subst {
    map: FxHashMap<Name, TypeExpr>,
}

impl Subst {
    /// Pair `params` with `args` positionally. Surplus on either side is
    /// ignored; arity is checked where the application is written.
    pub fn new(params: &[TypeParam], args: &[TypeExpr]) -> Self {
        Subst {
            map: params
                .iter()
                .zip(args)
                .filter(|(param, arg)| !matches!(arg, TypeExpr::Variable(n) if *n == param.name))
                .map(|(param, arg)| (param.name, arg.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn apply(&self, ty: &TypeExpr) -> TypeExpr {
        if self.is_empty() {
            return ty.clone();
        }
        ensure_sufficient_stack(|| match ty {
            TypeExpr::Variable(name) => self.map.get(name).cloned().unwrap_or_else(|| ty.clone()),
            _ => ty.map_children(&mut |child| self.apply(child)),
        })
    }

    pub fn apply_all(&self, tys: &[TypeExpr]) -> Vec<TypeExpr> {
        tys.iter().map(|ty| self.apply(ty)).collect()
    }

    /// Substitute inside a method arm.
    ///
    /// The arm's own type parameters shadow the ones being replaced. A
    /// method parameter whose name occurs free in a replacement is renamed
    /// first, so the replacement keeps referring to the outer variable.
    pub fn apply_arm(&self, arm: &MethodArm, interner: &StringInterner) -> MethodArm {
        let inner = Subst {
            map: self
                .map
                .iter()
                .filter(|(name, _)| !arm.binds(**name))
                .map(|(name, ty)| (*name, ty.clone()))
                .collect(),
        };
        if inner.is_empty() {
            return arm.clone();
        }

        let mut free = FxHashSet::default();
        for ty in inner.map.values() {
            free_variables(ty, &mut free);
        }
        if arm.type_params.iter().any(|p| free.contains(&p.name)) {
            let renamed = rename_params(arm, &free, inner.map.keys().copied(), interner);
            return renamed.map_types(&mut |ty| inner.apply(ty));
        }
        arm.map_types(&mut |ty| inner.apply(ty))
    }
}

/// Rename every method parameter of `arm` that appears in `captured` to a
/// name used nowhere in the arm, in `captured`, or in `reserved`.
fn rename_params(
    arm: &MethodArm,
    captured: &FxHashSet<Name>,
    reserved: impl IntoIterator<Item = Name>,
    interner: &StringInterner,
) -> MethodArm {
    let mut taken = captured.clone();
    taken.extend(reserved);
    taken.extend(arm.type_params.iter().map(|p| p.name));
    arm_variables(arm, &mut taken);

    let mut renames = FxHashMap::default();
    for param in arm.type_params.iter().filter(|p| captured.contains(&p.name)) {
        let base = interner.lookup(param.name);
        let mut suffix = 1u32;
        let fresh = loop {
            let candidate = interner.intern(&format!("{base}{suffix}"));
            if taken.insert(candidate) {
                break candidate;
            }
            suffix += 1;
        };
        renames.insert(param.name, fresh);
    }

    let rename = Subst {
        map: renames
            .iter()
            .map(|(old, fresh)| (*old, TypeExpr::variable(*fresh)))
            .collect(),
    };
    let mut renamed = arm.map_types(&mut |ty| rename.apply(ty));
    for param in &mut renamed.type_params {
        if let Some(fresh) = renames.get(&param.name) {
            param.name = *fresh;
        }
    }
    renamed
}

fn arm_variables(arm: &MethodArm, out: &mut FxHashSet<Name>) {
    let mut visit = |ty: &TypeExpr| free_variables(ty, out);
    for bound in arm.type_params.iter().filter_map(|p| p.upper_bound.as_ref()) {
        visit(bound);
    }
    arm.function.for_each_type(&mut visit);
    if let Some(block) = &arm.block {
        block.function.for_each_type(&mut visit);
        if let Some(self_type) = &block.self_type {
            visit(self_type);
        }
    }
}

/// Collect every type variable occurring in `ty`.
fn free_variables(ty: &TypeExpr, out: &mut FxHashSet<Name>) {
    ensure_sufficient_stack(|| {
        if let TypeExpr::Variable(name) = ty {
            out.insert(*name);
        }
        ty.for_each_child(&mut |child| free_variables(child, out));
    });
}

#[cfg(test)]
mod tests;
