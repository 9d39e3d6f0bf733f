//! rsig IR - declaration model for the type-definition builder.
//!
//! This crate holds the immutable, already-parsed input of the builder:
//! - Interned identifiers (`Name`) and the `StringInterner` that owns them
//! - Source locations (`Span`, `SourceId`, `Location`)
//! - Qualified type names (`TypeName`)
//! - Type expressions and method signatures (`TypeExpr`, `FunctionType`, `MethodArm`)
//! - Declarations and their members (`Declaration`, `Member`)
//! - `DeclBuilder`, a fluent way to construct declarations without a parser
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers are `Name(u32)`, compared in O(1)
//! - **Structural Identity**: every type derives `Clone, Eq, Hash, Debug`
//! - **No Parsing**: surface syntax is owned by an external collaborator

mod builder;
mod decl;
mod interner;
mod member;
mod name;
mod span;
mod type_name;
mod types;

pub use builder::{ClassBuilder, DeclBuilder, InterfaceBuilder, ModuleBuilder};
pub use decl::{
    ClassDecl, Declaration, DeclarationKind, InterfaceDecl, ModuleDecl, ModuleSelfType,
    SuperClass, TypeAliasDecl, TypeParam, Variance,
};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use member::{
    Alias, AttributeAccessor, AttributeKind, InstanceVariable, IvarName, Member,
    MethodDefinition, MethodKind, Mixin, MixinKind, Visibility,
};
pub use name::Name;
pub use span::{Location, SourceId, Span};
pub use type_name::{TypeName, TypeNameDisplay, TypeNameKind};
pub use types::{BaseType, Block, FunctionType, MethodArm, Param, TypeExpr};
