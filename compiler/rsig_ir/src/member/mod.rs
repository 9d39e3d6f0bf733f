//! Declaration body members.

use std::fmt;

use crate::{Location, MethodArm, Name, TypeExpr, TypeName};

/// Which receiver a method is defined on.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum MethodKind {
    /// `def foo`
    Instance,
    /// `def self.foo`
    Singleton,
    /// `def self?.foo`: a module function, public on the singleton and
    /// private on instances.
    SingletonInstance,
}

impl MethodKind {
    #[inline]
    pub fn on_instance(self) -> bool {
        matches!(self, MethodKind::Instance | MethodKind::SingletonInstance)
    }

    #[inline]
    pub fn on_singleton(self) -> bool {
        matches!(self, MethodKind::Singleton | MethodKind::SingletonInstance)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MethodKind::Instance => "instance",
            MethodKind::Singleton => "singleton",
            MethodKind::SingletonInstance => "module function",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// `def name: arm | arm | ...`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodDefinition {
    pub name: Name,
    pub kind: MethodKind,
    pub visibility: Visibility,
    /// Overload arms in declaration order.
    pub arms: Vec<MethodArm>,
    /// `def name: arm | ...`: extend the next definition instead of replacing it.
    pub overloading: bool,
    pub location: Location,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeKind {
    Reader,
    Writer,
    Accessor,
}

impl AttributeKind {
    #[inline]
    pub fn has_reader(self) -> bool {
        matches!(self, AttributeKind::Reader | AttributeKind::Accessor)
    }

    #[inline]
    pub fn has_writer(self) -> bool {
        matches!(self, AttributeKind::Writer | AttributeKind::Accessor)
    }
}

/// Backing instance variable of an attribute.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum IvarName {
    /// `@name`
    #[default]
    Default,
    /// `attr_reader name (@other): T`
    Named(Name),
    /// `attr_reader name (): T`
    None,
}

/// `attr_reader` / `attr_writer` / `attr_accessor`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeAccessor {
    pub name: Name,
    pub kind: AttributeKind,
    pub ty: TypeExpr,
    pub singleton: bool,
    pub visibility: Visibility,
    pub ivar: IvarName,
    pub location: Location,
}

impl AttributeAccessor {
    /// Method kind of the synthesized reader and writer.
    pub fn method_kind(&self) -> MethodKind {
        if self.singleton {
            MethodKind::Singleton
        } else {
            MethodKind::Instance
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum MixinKind {
    Include,
    Extend,
    Prepend,
}

impl MixinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MixinKind::Include => "include",
            MixinKind::Extend => "extend",
            MixinKind::Prepend => "prepend",
        }
    }
}

impl fmt::Display for MixinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of an `include`, `extend` or `prepend`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Mixin {
    pub name: TypeName,
    pub args: Vec<TypeExpr>,
    pub location: Location,
}

/// `alias new_name old_name`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Alias {
    pub new_name: Name,
    pub old_name: Name,
    pub kind: MethodKind,
    pub location: Location,
}

/// `@name: T` or `self.@name: T`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceVariable {
    pub name: Name,
    pub ty: TypeExpr,
    /// Class-instance variable (lives on the singleton).
    pub singleton: bool,
    pub location: Location,
}

/// A declaration body member.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Member {
    Method(MethodDefinition),
    Attribute(AttributeAccessor),
    Include(Mixin),
    Extend(Mixin),
    Prepend(Mixin),
    Alias(Alias),
    InstanceVariable(InstanceVariable),
}

impl Member {
    pub fn location(&self) -> Location {
        match self {
            Member::Method(m) => m.location,
            Member::Attribute(a) => a.location,
            Member::Include(m) | Member::Extend(m) | Member::Prepend(m) => m.location,
            Member::Alias(a) => a.location,
            Member::InstanceVariable(v) => v.location,
        }
    }

    /// The mixin directive this member is, if any.
    pub fn as_mixin(&self) -> Option<(MixinKind, &Mixin)> {
        match self {
            Member::Include(m) => Some((MixinKind::Include, m)),
            Member::Extend(m) => Some((MixinKind::Extend, m)),
            Member::Prepend(m) => Some((MixinKind::Prepend, m)),
            _ => None,
        }
    }
}
