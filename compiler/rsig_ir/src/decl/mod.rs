//! Type declarations.
//!
//! One `Declaration` is one syntactic `class`/`module`/`interface`/`type`
//! body. A type may be declared piecewise; merging the pieces is the
//! environment's job, not this module's.

use std::fmt;

use crate::{Location, Member, Name, TypeExpr, TypeName};

/// Declared variance of a type parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Variance {
    #[default]
    Invariant,
    /// `out T`: may only appear in output positions.
    Covariant,
    /// `in T`: may only appear in input positions.
    Contravariant,
}

impl Variance {
    /// The opposite polarity. Invariant stays invariant.
    #[must_use]
    pub fn flip(self) -> Variance {
        match self {
            Variance::Invariant => Variance::Invariant,
            Variance::Covariant => Variance::Contravariant,
            Variance::Contravariant => Variance::Covariant,
        }
    }

    /// Polarity of a position nested under a parameter of this variance.
    ///
    /// `self` is the outer position, `param` the variance of the type
    /// parameter the inner position is an argument for.
    #[must_use]
    pub fn compose(self, param: Variance) -> Variance {
        match param {
            Variance::Invariant => Variance::Invariant,
            Variance::Covariant => self,
            Variance::Contravariant => self.flip(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variance::Invariant => "invariant",
            Variance::Covariant => "covariant",
            Variance::Contravariant => "contravariant",
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generic type parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeParam {
    pub name: Name,
    pub variance: Variance,
    /// Skip variance enforcement for this parameter.
    pub unchecked: bool,
    pub upper_bound: Option<TypeExpr>,
    pub location: Location,
}

impl TypeParam {
    pub fn new(name: Name, variance: Variance, location: Location) -> Self {
        TypeParam {
            name,
            variance,
            unchecked: false,
            upper_bound: None,
            location,
        }
    }

    #[must_use]
    pub fn unchecked(mut self) -> Self {
        self.unchecked = true;
        self
    }
}

/// `< Super[Args]` on a class.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SuperClass {
    pub name: TypeName,
    pub args: Vec<TypeExpr>,
    pub location: Location,
}

/// `module M : Constraint[Args]`: a type every includer must conform to.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleSelfType {
    pub name: TypeName,
    pub args: Vec<TypeExpr>,
    pub location: Location,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub super_class: Option<SuperClass>,
    pub members: Vec<Member>,
    pub location: Location,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub self_types: Vec<ModuleSelfType>,
    pub members: Vec<Member>,
    pub location: Location,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct InterfaceDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub members: Vec<Member>,
    pub location: Location,
}

/// `type name[T] = ...`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeAliasDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub ty: TypeExpr,
    pub location: Location,
}

/// Which sort of declaration a name refers to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclarationKind {
    Class,
    Module,
    Interface,
    TypeAlias,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Module => "module",
            DeclarationKind::Interface => "interface",
            DeclarationKind::TypeAlias => "type alias",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A top-level declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Declaration {
    Class(ClassDecl),
    Module(ModuleDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
}

impl Declaration {
    pub fn name(&self) -> &TypeName {
        match self {
            Declaration::Class(d) => &d.name,
            Declaration::Module(d) => &d.name,
            Declaration::Interface(d) => &d.name,
            Declaration::TypeAlias(d) => &d.name,
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        match self {
            Declaration::Class(_) => DeclarationKind::Class,
            Declaration::Module(_) => DeclarationKind::Module,
            Declaration::Interface(_) => DeclarationKind::Interface,
            Declaration::TypeAlias(_) => DeclarationKind::TypeAlias,
        }
    }

    pub fn type_params(&self) -> &[TypeParam] {
        match self {
            Declaration::Class(d) => &d.type_params,
            Declaration::Module(d) => &d.type_params,
            Declaration::Interface(d) => &d.type_params,
            Declaration::TypeAlias(d) => &d.type_params,
        }
    }

    /// Body members; type aliases have none.
    pub fn members(&self) -> &[Member] {
        match self {
            Declaration::Class(d) => &d.members,
            Declaration::Module(d) => &d.members,
            Declaration::Interface(d) => &d.members,
            Declaration::TypeAlias(_) => &[],
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Declaration::Class(d) => d.location,
            Declaration::Module(d) => d.location,
            Declaration::Interface(d) => d.location,
            Declaration::TypeAlias(d) => d.location,
        }
    }
}
