//! Validation of a type's own declaration.
//!
//! Runs after the method table is built and checks what resolution and
//! folding do not:
//! - module self types exist and are applied with the right arity
//! - every type reference exists and is applied with the right arity
//! - type parameters appear only where their variance allows
//! - every method ended up with at least one arm
//!
//! # Variance positions
//!
//! Method parameters are contravariant and returns covariant. Inside a
//! block the polarity flips once more: block parameters are covariant and
//! the block's return contravariant. A `Proc` flips its parameters relative
//! to where it appears. A generic argument takes the outer polarity
//! composed with the variance of the parameter it is supplied for.
//! Attribute readers are covariant, writers contravariant, accessors and
//! instance variables invariant.

use rustc_hash::FxHashMap;

use rsig_ir::{
    AttributeKind, FunctionType, Location, Member, MethodArm, Name, TypeExpr, TypeName,
    TypeParam, Variance,
};

use crate::ancestors::check_arity;
use crate::definition::{Definition, DefinitionKind};
use crate::env::{DeclarationEntry, Environment};
use crate::error::{DefinitionError, OverloadReason, VarianceSite};
use crate::stack::ensure_sufficient_stack;

/// Validate `entry`, the declaration `definition` was built for.
pub(crate) fn validate(
    env: &Environment,
    entry: &DeclarationEntry,
    definition: &Definition,
) -> Result<(), DefinitionError> {
    check_self_types(env, entry)?;
    check_references(env, entry)?;
    if definition.kind != DefinitionKind::Singleton {
        check_variance(env, entry)?;
    }
    for method in definition.methods() {
        if method.arms.is_empty() {
            return Err(DefinitionError::InvalidOverload {
                type_name: method.defined_in.clone(),
                method: method.name,
                reason: OverloadReason::NoArms,
                location: method.location,
            });
        }
    }
    Ok(())
}

fn check_self_types(env: &Environment, entry: &DeclarationEntry) -> Result<(), DefinitionError> {
    for self_type in entry.self_types() {
        let Some(target) = env.lookup(&self_type.name) else {
            return Err(DefinitionError::UnresolvedSelfType {
                module: entry.name().clone(),
                self_type: self_type.name.clone(),
                location: self_type.location,
            });
        };
        check_arity(
            &self_type.name,
            target.type_params(),
            &self_type.args,
            self_type.location,
        )?;
    }
    Ok(())
}

/// Every type written anywhere in the declaration.
fn for_each_written_type<'e>(entry: &'e DeclarationEntry, f: &mut dyn FnMut(&'e TypeExpr)) {
    fn bounds<'e>(params: &'e [TypeParam], f: &mut dyn FnMut(&'e TypeExpr)) {
        params.iter().filter_map(|p| p.upper_bound.as_ref()).for_each(f);
    }

    bounds(entry.type_params(), &mut *f);
    if let Some(sup) = entry.super_class() {
        sup.args.iter().for_each(&mut *f);
    }
    for self_type in entry.self_types() {
        self_type.args.iter().for_each(&mut *f);
    }
    for member in entry.members() {
        match member {
            Member::Method(def) => {
                for arm in &def.arms {
                    bounds(&arm.type_params, &mut *f);
                    arm.function.for_each_type(&mut *f);
                    if let Some(block) = &arm.block {
                        block.function.for_each_type(&mut *f);
                        if let Some(self_type) = &block.self_type {
                            f(self_type);
                        }
                    }
                }
            }
            Member::Attribute(attr) => f(&attr.ty),
            Member::InstanceVariable(ivar) => f(&ivar.ty),
            Member::Include(mixin) | Member::Extend(mixin) | Member::Prepend(mixin) => {
                mixin.args.iter().for_each(&mut *f);
            }
            Member::Alias(_) => {}
        }
    }
}

fn check_references(env: &Environment, entry: &DeclarationEntry) -> Result<(), DefinitionError> {
    let mut result = Ok(());
    for_each_written_type(entry, &mut |ty| {
        if result.is_ok() {
            result = check_reference(env, ty);
        }
    });
    result
}

fn check_reference(env: &Environment, ty: &TypeExpr) -> Result<(), DefinitionError> {
    ensure_sufficient_stack(|| {
        match ty {
            TypeExpr::Named {
                name,
                args,
                location,
            } => {
                let Some(target) = env.lookup(name) else {
                    return Err(DefinitionError::UnresolvedType {
                        name: name.clone(),
                        location: *location,
                    });
                };
                check_arity(name, target.type_params(), args, *location)?;
            }
            TypeExpr::Singleton { name, location } if !env.contains(name) => {
                return Err(DefinitionError::UnresolvedType {
                    name: name.clone(),
                    location: *location,
                });
            }
            _ => {}
        }
        let mut result = Ok(());
        ty.for_each_child(&mut |child| {
            if result.is_ok() {
                result = check_reference(env, child);
            }
        });
        result
    })
}

fn check_variance(env: &Environment, entry: &DeclarationEntry) -> Result<(), DefinitionError> {
    let params: FxHashMap<Name, Variance> = entry
        .type_params()
        .iter()
        .filter(|p| !p.unchecked && p.variance != Variance::Invariant)
        .map(|p| (p.name, p.variance))
        .collect();
    if params.is_empty() {
        return Ok(());
    }

    let mut checker = VarianceChecker {
        env,
        type_name: entry.name(),
        params,
        shadowed: Vec::new(),
        site: VarianceSite::Superclass(entry.name().clone()),
        location: entry.location(),
    };

    if let Some(sup) = entry.super_class() {
        checker.enter(VarianceSite::Superclass(sup.name.clone()), sup.location);
        checker.check_args(&sup.name, &sup.args, Variance::Covariant)?;
    }

    for member in entry.members() {
        match member {
            Member::Method(def) if def.kind.on_instance() => {
                checker.enter(VarianceSite::Method(def.name), def.location);
                for arm in &def.arms {
                    checker.check_arm(arm)?;
                }
            }
            Member::Attribute(attr) if !attr.singleton => {
                checker.enter(VarianceSite::Attribute(attr.name), attr.location);
                let position = match attr.kind {
                    AttributeKind::Reader => Variance::Covariant,
                    AttributeKind::Writer => Variance::Contravariant,
                    AttributeKind::Accessor => Variance::Invariant,
                };
                checker.check(&attr.ty, position)?;
            }
            Member::InstanceVariable(ivar) if !ivar.singleton => {
                checker.enter(VarianceSite::InstanceVariable(ivar.name), ivar.location);
                checker.check(&ivar.ty, Variance::Invariant)?;
            }
            Member::Include(mixin) | Member::Prepend(mixin) => {
                checker.enter(VarianceSite::Mixin(mixin.name.clone()), mixin.location);
                checker.check_args(&mixin.name, &mixin.args, Variance::Covariant)?;
            }
            _ => {}
        }
    }
    Ok(())
}

struct VarianceChecker<'a> {
    env: &'a Environment,
    type_name: &'a TypeName,
    /// Checked parameters of the declaring type.
    params: FxHashMap<Name, Variance>,
    /// Method-level parameters currently in scope.
    shadowed: Vec<Name>,
    site: VarianceSite,
    location: Location,
}

impl VarianceChecker<'_> {
    fn enter(&mut self, site: VarianceSite, location: Location) {
        self.site = site;
        self.location = location;
    }

    fn check_arm(&mut self, arm: &MethodArm) -> Result<(), DefinitionError> {
        self.shadowed = arm.type_params.iter().map(|p| p.name).collect();
        let result = self.check_function(&arm.function, Variance::Covariant).and_then(|()| {
            arm.block.as_ref().map_or(Ok(()), |block| {
                self.check_function(&block.function, Variance::Contravariant)
            })
        });
        self.shadowed.clear();
        result
    }

    /// Parameters take the flipped polarity, the return the polarity itself.
    fn check_function(
        &self,
        function: &FunctionType,
        polarity: Variance,
    ) -> Result<(), DefinitionError> {
        for param in function.params() {
            self.check(&param.ty, polarity.flip())?;
        }
        self.check(&function.return_type, polarity)
    }

    fn check_args(
        &self,
        target: &TypeName,
        args: &[TypeExpr],
        polarity: Variance,
    ) -> Result<(), DefinitionError> {
        let params = self.env.lookup(target).map_or(&[][..], DeclarationEntry::type_params);
        for (i, arg) in args.iter().enumerate() {
            let declared = params.get(i).map_or(Variance::Invariant, |p| p.variance);
            self.check(arg, polarity.compose(declared))?;
        }
        Ok(())
    }

    fn check(&self, ty: &TypeExpr, position: Variance) -> Result<(), DefinitionError> {
        ensure_sufficient_stack(|| match ty {
            TypeExpr::Variable(name) => self.check_variable(*name, position),
            TypeExpr::Named { name, args, .. } => self.check_args(name, args, position),
            TypeExpr::Proc(function) => self.check_function(function, position),
            TypeExpr::Base(_) | TypeExpr::Singleton { .. } => Ok(()),
            TypeExpr::Optional(_)
            | TypeExpr::Union(_)
            | TypeExpr::Intersection(_)
            | TypeExpr::Tuple(_)
            | TypeExpr::Record(_) => {
                let mut result = Ok(());
                ty.for_each_child(&mut |child| {
                    if result.is_ok() {
                        result = self.check(child, position);
                    }
                });
                result
            }
        })
    }

    fn check_variable(&self, name: Name, position: Variance) -> Result<(), DefinitionError> {
        if self.shadowed.contains(&name) {
            return Ok(());
        }
        let Some(&variance) = self.params.get(&name) else {
            return Ok(());
        };
        if variance == position {
            return Ok(());
        }
        Err(DefinitionError::VarianceViolation {
            type_name: self.type_name.clone(),
            param: name,
            variance,
            position,
            member: self.site.clone(),
            location: self.location,
        })
    }
}

#[cfg(test)]
mod tests;
