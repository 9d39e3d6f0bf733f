//! Resolved definitions.
//!
//! A [`Definition`] is the flattened view of one type from one side: every
//! method it responds to with the arms that survive overriding, every
//! instance variable, and the ancestor list that produced them. All types
//! inside are already substituted into the requested type's own parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rsig_ir::{Location, MethodArm, MethodKind, Name, TypeExpr, TypeName, TypeParam, Visibility};

use crate::ancestors::Ancestors;

/// Which side of a type a definition describes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum DefinitionKind {
    /// Instances of a class or module.
    Instance,
    /// The class or module object itself.
    Singleton,
    /// An interface.
    Interface,
}

impl DefinitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DefinitionKind::Instance => "instance",
            DefinitionKind::Singleton => "singleton",
            DefinitionKind::Interface => "interface",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An overload arm together with the body that declared it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DefinedArm {
    pub arm: MethodArm,
    pub defined_in: TypeName,
}

/// A lower-precedence definition hidden by the surviving one.
///
/// Kept in precedence order so `super` calls can be resolved.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SuperMethod {
    pub defined_in: TypeName,
    pub visibility: Visibility,
    pub arms: Vec<DefinedArm>,
    pub location: Location,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DefinedMethod {
    pub name: Name,
    pub kind: MethodKind,
    pub visibility: Visibility,
    /// Surviving arms, in order.
    pub arms: Vec<DefinedArm>,
    /// Body of the winning definition.
    pub defined_in: TypeName,
    /// Set when the winning definition is an alias.
    pub alias_of: Option<Name>,
    pub location: Location,
    pub shadowed: Vec<SuperMethod>,
}

impl DefinedMethod {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Arm at `index`.
    pub fn arm(&self, index: usize) -> Option<&MethodArm> {
        self.arms.get(index).map(|a| &a.arm)
    }

    /// The immediate `super` target, if any.
    pub fn super_method(&self) -> Option<&SuperMethod> {
        self.shadowed.first()
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DefinedIvar {
    pub name: Name,
    pub ty: TypeExpr,
    pub defined_in: TypeName,
    pub location: Location,
}

/// The resolved view of one type from one side.
#[derive(Clone, Debug)]
pub struct Definition {
    pub type_name: TypeName,
    pub kind: DefinitionKind,
    /// Generic parameters of the requested type; empty for singletons.
    pub type_params: Vec<TypeParam>,
    /// Type of `self` inside this definition.
    pub self_type: TypeExpr,
    pub ancestors: Arc<Ancestors>,
    pub methods: BTreeMap<Name, DefinedMethod>,
    pub instance_variables: BTreeMap<Name, DefinedIvar>,
}

impl Definition {
    pub fn method(&self, name: Name) -> Option<&DefinedMethod> {
        self.methods.get(&name)
    }

    pub fn ivar(&self, name: Name) -> Option<&DefinedIvar> {
        self.instance_variables.get(&name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &DefinedMethod> {
        self.methods.values()
    }

    pub fn ancestors(&self) -> &Ancestors {
        &self.ancestors
    }

    pub fn is_instance(&self) -> bool {
        self.kind == DefinitionKind::Instance
    }

    pub fn is_singleton(&self) -> bool {
        self.kind == DefinitionKind::Singleton
    }

    pub fn is_interface(&self) -> bool {
        self.kind == DefinitionKind::Interface
    }
}

#[cfg(test)]
mod tests;
