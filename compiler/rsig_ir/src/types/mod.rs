//! Type expressions and method signatures.
//!
//! `TypeExpr` captures type annotations as the parser produced them. Names
//! are already qualified; nothing here is resolved against an environment.
//!
//! # Design
//!
//! The escape-hatch `untyped` type is an explicit [`BaseType::Untyped`]
//! variant rather than an implicit fallback, so consumers can match
//! exhaustively.

use std::hash::{Hash, Hasher};

use crate::{Location, Name, TypeName, TypeParam};

/// Built-in types with no further structure.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseType {
    Bool,
    Void,
    Nil,
    /// Supertype of everything.
    Top,
    /// Subtype of everything.
    Bottom,
    /// `self`: the receiver's type.
    SelfType,
    /// `instance`: an instance of the receiver's class.
    Instance,
    /// `class`: the receiver's class object.
    Class,
    /// `untyped`: opts out of checking.
    Untyped,
}

/// A type expression.
///
/// Equality and hashing are structural: the locations carried by `Named`
/// and `Singleton` are ignored, so `Array[String]` written at two sites is
/// one type.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeExpr {
    Base(BaseType),

    /// Reference to a type parameter in scope.
    Variable(Name),

    /// Class instance, interface, or alias application: `Array[Integer]`.
    Named {
        name: TypeName,
        args: Vec<TypeExpr>,
        location: Location,
    },

    /// The class object of a type: `singleton(Foo)`.
    Singleton { name: TypeName, location: Location },

    /// `T?`
    Optional(Box<TypeExpr>),

    Union(Vec<TypeExpr>),

    Intersection(Vec<TypeExpr>),

    Tuple(Vec<TypeExpr>),

    /// `{ key: T, ... }`
    Record(Vec<(Name, TypeExpr)>),

    /// `^(A) -> R`
    Proc(Box<FunctionType>),
}

impl TypeExpr {
    #[inline]
    pub fn base(base: BaseType) -> Self {
        TypeExpr::Base(base)
    }

    #[inline]
    pub fn untyped() -> Self {
        TypeExpr::Base(BaseType::Untyped)
    }

    #[inline]
    pub fn void() -> Self {
        TypeExpr::Base(BaseType::Void)
    }

    #[inline]
    pub fn variable(name: Name) -> Self {
        TypeExpr::Variable(name)
    }

    #[inline]
    pub fn named(name: TypeName, args: Vec<TypeExpr>, location: Location) -> Self {
        TypeExpr::Named {
            name,
            args,
            location,
        }
    }

    #[inline]
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Optional(Box::new(inner))
    }

    #[inline]
    pub fn proc(function: FunctionType) -> Self {
        TypeExpr::Proc(Box::new(function))
    }

    /// Check if this is the `untyped` escape hatch.
    #[inline]
    pub fn is_untyped(&self) -> bool {
        matches!(self, TypeExpr::Base(BaseType::Untyped))
    }

    /// Visit the direct children of this type, not recursing further.
    ///
    /// For `Proc`, this visits every parameter type and the return type.
    pub fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a TypeExpr)) {
        match self {
            TypeExpr::Base(_) | TypeExpr::Variable(_) | TypeExpr::Singleton { .. } => {}
            TypeExpr::Named { args, .. } => args.iter().for_each(f),
            TypeExpr::Optional(inner) => f(&**inner),
            TypeExpr::Union(types) | TypeExpr::Intersection(types) | TypeExpr::Tuple(types) => {
                types.iter().for_each(f);
            }
            TypeExpr::Record(fields) => fields.iter().for_each(|(_, ty)| f(ty)),
            TypeExpr::Proc(function) => function.for_each_type(f),
        }
    }

    /// Rebuild this type by mapping every direct child through `f`.
    #[must_use]
    pub fn map_children(&self, f: &mut dyn FnMut(&TypeExpr) -> TypeExpr) -> TypeExpr {
        match self {
            TypeExpr::Base(_) | TypeExpr::Variable(_) | TypeExpr::Singleton { .. } => self.clone(),
            TypeExpr::Named {
                name,
                args,
                location,
            } => TypeExpr::Named {
                name: name.clone(),
                args: args.iter().map(&mut *f).collect(),
                location: *location,
            },
            TypeExpr::Optional(inner) => TypeExpr::Optional(Box::new(f(&**inner))),
            TypeExpr::Union(types) => TypeExpr::Union(types.iter().map(&mut *f).collect()),
            TypeExpr::Intersection(types) => {
                TypeExpr::Intersection(types.iter().map(&mut *f).collect())
            }
            TypeExpr::Tuple(types) => TypeExpr::Tuple(types.iter().map(&mut *f).collect()),
            TypeExpr::Record(fields) => {
                TypeExpr::Record(fields.iter().map(|(key, ty)| (*key, f(ty))).collect())
            }
            TypeExpr::Proc(function) => TypeExpr::Proc(Box::new(function.map_types(f))),
        }
    }
}

impl PartialEq for TypeExpr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeExpr::Base(a), TypeExpr::Base(b)) => a == b,
            (TypeExpr::Variable(a), TypeExpr::Variable(b)) => a == b,
            (
                TypeExpr::Named {
                    name: a, args: xs, ..
                },
                TypeExpr::Named {
                    name: b, args: ys, ..
                },
            ) => a == b && xs == ys,
            (TypeExpr::Singleton { name: a, .. }, TypeExpr::Singleton { name: b, .. }) => a == b,
            (TypeExpr::Optional(a), TypeExpr::Optional(b)) => a == b,
            (TypeExpr::Union(a), TypeExpr::Union(b))
            | (TypeExpr::Intersection(a), TypeExpr::Intersection(b))
            | (TypeExpr::Tuple(a), TypeExpr::Tuple(b)) => a == b,
            (TypeExpr::Record(a), TypeExpr::Record(b)) => a == b,
            (TypeExpr::Proc(a), TypeExpr::Proc(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypeExpr {}

impl Hash for TypeExpr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            TypeExpr::Base(base) => base.hash(state),
            TypeExpr::Variable(name) => name.hash(state),
            TypeExpr::Named { name, args, .. } => {
                name.hash(state);
                args.hash(state);
            }
            TypeExpr::Singleton { name, .. } => name.hash(state),
            TypeExpr::Optional(inner) => inner.hash(state),
            TypeExpr::Union(types) | TypeExpr::Intersection(types) | TypeExpr::Tuple(types) => {
                types.hash(state);
            }
            TypeExpr::Record(fields) => fields.hash(state),
            TypeExpr::Proc(function) => function.hash(state),
        }
    }
}

/// One parameter slot.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    /// Optional documentation name (`(Integer size)`).
    pub name: Option<Name>,
    pub ty: TypeExpr,
}

impl Param {
    #[inline]
    pub fn new(ty: TypeExpr) -> Self {
        Param { name: None, ty }
    }

    #[inline]
    pub fn named(name: Name, ty: TypeExpr) -> Self {
        Param {
            name: Some(name),
            ty,
        }
    }

    fn map_type(&self, f: &mut dyn FnMut(&TypeExpr) -> TypeExpr) -> Param {
        Param {
            name: self.name,
            ty: f(&self.ty),
        }
    }
}

/// A callable shape: positional and keyword slots plus a return type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionType {
    pub required_positionals: Vec<Param>,
    pub optional_positionals: Vec<Param>,
    pub rest_positional: Option<Param>,
    /// Required positionals after the rest slot.
    pub trailing_positionals: Vec<Param>,
    pub required_keywords: Vec<(Name, Param)>,
    pub optional_keywords: Vec<(Name, Param)>,
    pub rest_keywords: Option<Param>,
    pub return_type: TypeExpr,
}

impl FunctionType {
    /// A function with only required positionals.
    pub fn new(params: Vec<TypeExpr>, return_type: TypeExpr) -> Self {
        FunctionType {
            required_positionals: params.into_iter().map(Param::new).collect(),
            optional_positionals: Vec::new(),
            rest_positional: None,
            trailing_positionals: Vec::new(),
            required_keywords: Vec::new(),
            optional_keywords: Vec::new(),
            rest_keywords: None,
            return_type,
        }
    }

    /// Iterate every parameter slot in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.required_positionals
            .iter()
            .chain(&self.optional_positionals)
            .chain(&self.rest_positional)
            .chain(&self.trailing_positionals)
            .chain(self.required_keywords.iter().map(|(_, p)| p))
            .chain(self.optional_keywords.iter().map(|(_, p)| p))
            .chain(&self.rest_keywords)
    }

    /// Visit every parameter type, then the return type.
    pub fn for_each_type<'a>(&'a self, f: &mut dyn FnMut(&'a TypeExpr)) {
        for param in self.params() {
            f(&param.ty);
        }
        f(&self.return_type);
    }

    /// Rebuild with every parameter and return type mapped through `f`.
    #[must_use]
    pub fn map_types(&self, f: &mut dyn FnMut(&TypeExpr) -> TypeExpr) -> FunctionType {
        FunctionType {
            required_positionals: self
                .required_positionals
                .iter()
                .map(|p| p.map_type(f))
                .collect(),
            optional_positionals: self
                .optional_positionals
                .iter()
                .map(|p| p.map_type(f))
                .collect(),
            rest_positional: self.rest_positional.as_ref().map(|p| p.map_type(f)),
            trailing_positionals: self
                .trailing_positionals
                .iter()
                .map(|p| p.map_type(f))
                .collect(),
            required_keywords: self
                .required_keywords
                .iter()
                .map(|(k, p)| (*k, p.map_type(f)))
                .collect(),
            optional_keywords: self
                .optional_keywords
                .iter()
                .map(|(k, p)| (*k, p.map_type(f)))
                .collect(),
            rest_keywords: self.rest_keywords.as_ref().map(|p| p.map_type(f)),
            return_type: f(&self.return_type),
        }
    }
}

/// Block accepted by a method arm.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub required: bool,
    pub function: FunctionType,
    /// `self` inside the block, when rebound.
    pub self_type: Option<TypeExpr>,
}

/// One overload of a method.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodArm {
    /// Method-level generics; these shadow the enclosing type's parameters.
    pub type_params: Vec<TypeParam>,
    pub function: FunctionType,
    pub block: Option<Block>,
    pub location: Location,
}

impl MethodArm {
    pub fn new(function: FunctionType, location: Location) -> Self {
        MethodArm {
            type_params: Vec::new(),
            function,
            block: None,
            location,
        }
    }

    #[must_use]
    pub fn with_block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }

    #[must_use]
    pub fn with_type_params(mut self, type_params: Vec<TypeParam>) -> Self {
        self.type_params = type_params;
        self
    }

    /// Whether a method-level parameter named `name` shadows an outer one.
    pub fn binds(&self, name: Name) -> bool {
        self.type_params.iter().any(|p| p.name == name)
    }

    /// Rebuild with every type (parameter bounds, function, block, block
    /// self) mapped through `f`.
    #[must_use]
    pub fn map_types(&self, f: &mut dyn FnMut(&TypeExpr) -> TypeExpr) -> MethodArm {
        MethodArm {
            type_params: self
                .type_params
                .iter()
                .map(|param| TypeParam {
                    upper_bound: param.upper_bound.as_ref().map(&mut *f),
                    ..param.clone()
                })
                .collect(),
            function: self.function.map_types(f),
            block: self.block.as_ref().map(|block| Block {
                required: block.required,
                function: block.function.map_types(f),
                self_type: block.self_type.as_ref().map(&mut *f),
            }),
            location: self.location,
        }
    }
}

#[cfg(test)]
mod tests;
