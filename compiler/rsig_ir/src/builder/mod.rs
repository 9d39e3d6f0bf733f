//! Fluent construction of declarations.
//!
//! The builder stands in for a parser: it interns names, qualifies type
//! paths and hands every declaration, member and type reference a distinct
//! [`Location`], so diagnostics raised against built declarations can be
//! told apart.
//!
//! ```ignore
//! let b = DeclBuilder::new(StringInterner::shared());
//! let decl = b
//!     .class("A")
//!     .include("M", vec![])
//!     .def("foo", vec![b.arm(vec![], b.named("String", vec![]))])
//!     .build();
//! ```

use std::cell::Cell;

use crate::{
    Alias, AttributeAccessor, AttributeKind, ClassDecl, Declaration, FunctionType, InterfaceDecl,
    InstanceVariable, IvarName, Location, Member, MethodArm, MethodDefinition, MethodKind, Mixin,
    ModuleDecl, ModuleSelfType, Name, SharedInterner, SourceId, Span, StringInterner, SuperClass,
    TypeAliasDecl, TypeExpr, TypeName, TypeParam, Variance, Visibility,
};

/// Entry point for building declarations against one interner.
pub struct DeclBuilder {
    interner: SharedInterner,
    source: SourceId,
    next_offset: Cell<u32>,
}

impl DeclBuilder {
    pub fn new(interner: SharedInterner) -> Self {
        DeclBuilder {
            interner,
            source: SourceId(0),
            next_offset: Cell::new(0),
        }
    }

    /// Attribute subsequent locations to `source`.
    #[must_use]
    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = source;
        self
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn shared_interner(&self) -> SharedInterner {
        SharedInterner::clone(&self.interner)
    }

    /// A fresh location, distinct from every other one this builder handed out.
    pub fn location(&self) -> Location {
        let start = self.next_offset.get();
        self.next_offset.set(start + 1);
        Location::new(self.source, Span::new(start, start + 1))
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn type_name(&self, path: &str) -> TypeName {
        TypeName::parse(&self.interner, path)
    }

    /// `Path[args]`
    pub fn named(&self, path: &str, args: Vec<TypeExpr>) -> TypeExpr {
        TypeExpr::named(self.type_name(path), args, self.location())
    }

    /// `singleton(Path)`
    pub fn singleton_of(&self, path: &str) -> TypeExpr {
        TypeExpr::Singleton {
            name: self.type_name(path),
            location: self.location(),
        }
    }

    /// A type-parameter reference.
    pub fn var(&self, name: &str) -> TypeExpr {
        TypeExpr::variable(self.name(name))
    }

    pub fn type_param(&self, name: &str, variance: Variance) -> TypeParam {
        TypeParam::new(self.name(name), variance, self.location())
    }

    /// `(params) -> ret`
    pub fn arm(&self, params: Vec<TypeExpr>, ret: TypeExpr) -> MethodArm {
        MethodArm::new(FunctionType::new(params, ret), self.location())
    }

    pub fn class(&self, path: &str) -> ClassBuilder<'_> {
        ClassBuilder {
            b: self,
            decl: ClassDecl {
                name: self.type_name(path),
                type_params: Vec::new(),
                super_class: None,
                members: Vec::new(),
                location: self.location(),
            },
        }
    }

    pub fn module(&self, path: &str) -> ModuleBuilder<'_> {
        ModuleBuilder {
            b: self,
            decl: ModuleDecl {
                name: self.type_name(path),
                type_params: Vec::new(),
                self_types: Vec::new(),
                members: Vec::new(),
                location: self.location(),
            },
        }
    }

    pub fn interface(&self, path: &str) -> InterfaceBuilder<'_> {
        InterfaceBuilder {
            b: self,
            decl: InterfaceDecl {
                name: self.type_name(path),
                type_params: Vec::new(),
                members: Vec::new(),
                location: self.location(),
            },
        }
    }

    /// `type path[params] = ty`
    pub fn type_alias(&self, path: &str, params: &[&str], ty: TypeExpr) -> Declaration {
        Declaration::TypeAlias(TypeAliasDecl {
            name: self.type_name(path),
            type_params: params
                .iter()
                .map(|p| self.type_param(p, Variance::Invariant))
                .collect(),
            ty,
            location: self.location(),
        })
    }

    fn mixin(&self, path: &str, args: Vec<TypeExpr>) -> Mixin {
        Mixin {
            name: self.type_name(path),
            args,
            location: self.location(),
        }
    }

    fn method(
        &self,
        name: &str,
        kind: MethodKind,
        visibility: Visibility,
        arms: Vec<MethodArm>,
        overloading: bool,
    ) -> Member {
        Member::Method(MethodDefinition {
            name: self.name(name),
            kind,
            visibility,
            arms,
            overloading,
            location: self.location(),
        })
    }

    fn attribute(&self, name: &str, kind: AttributeKind, ty: TypeExpr, singleton: bool) -> Member {
        Member::Attribute(AttributeAccessor {
            name: self.name(name),
            kind,
            ty,
            singleton,
            visibility: Visibility::Public,
            ivar: IvarName::Default,
            location: self.location(),
        })
    }
}

/// Member-adding methods shared by every body builder.
macro_rules! body_methods {
    ($($builder:ident),* $(,)?) => { $(
        impl $builder<'_> {
            /// Add a type parameter.
            #[must_use]
            pub fn param(mut self, name: &str, variance: Variance) -> Self {
                let param = self.b.type_param(name, variance);
                self.decl.type_params.push(param);
                self
            }

            /// Add a type parameter exempt from variance checks.
            #[must_use]
            pub fn param_unchecked(mut self, name: &str, variance: Variance) -> Self {
                let param = self.b.type_param(name, variance).unchecked();
                self.decl.type_params.push(param);
                self
            }

            #[must_use]
            pub fn member(mut self, member: Member) -> Self {
                self.decl.members.push(member);
                self
            }

            #[must_use]
            pub fn include(self, path: &str, args: Vec<TypeExpr>) -> Self {
                let mixin = self.b.mixin(path, args);
                self.member(Member::Include(mixin))
            }

            #[must_use]
            pub fn extend(self, path: &str, args: Vec<TypeExpr>) -> Self {
                let mixin = self.b.mixin(path, args);
                self.member(Member::Extend(mixin))
            }

            #[must_use]
            pub fn prepend(self, path: &str, args: Vec<TypeExpr>) -> Self {
                let mixin = self.b.mixin(path, args);
                self.member(Member::Prepend(mixin))
            }

            /// `def name: arms`
            #[must_use]
            pub fn def(self, name: &str, arms: Vec<MethodArm>) -> Self {
                let m = self.b.method(name, MethodKind::Instance, Visibility::Public, arms, false);
                self.member(m)
            }

            /// `private def name: arms`
            #[must_use]
            pub fn def_private(self, name: &str, arms: Vec<MethodArm>) -> Self {
                let m = self.b.method(name, MethodKind::Instance, Visibility::Private, arms, false);
                self.member(m)
            }

            /// `def self.name: arms`
            #[must_use]
            pub fn def_singleton(self, name: &str, arms: Vec<MethodArm>) -> Self {
                let m = self.b.method(name, MethodKind::Singleton, Visibility::Public, arms, false);
                self.member(m)
            }

            /// `def self?.name: arms`
            #[must_use]
            pub fn def_module_function(self, name: &str, arms: Vec<MethodArm>) -> Self {
                let m = self.b.method(
                    name,
                    MethodKind::SingletonInstance,
                    Visibility::Public,
                    arms,
                    false,
                );
                self.member(m)
            }

            /// `def name: arms | ...`
            #[must_use]
            pub fn def_overloading(self, name: &str, arms: Vec<MethodArm>) -> Self {
                let m = self.b.method(name, MethodKind::Instance, Visibility::Public, arms, true);
                self.member(m)
            }

            /// `alias new_name old_name`
            #[must_use]
            pub fn alias(self, new_name: &str, old_name: &str) -> Self {
                self.alias_of_kind(new_name, old_name, MethodKind::Instance)
            }

            /// `alias self.new_name self.old_name`
            #[must_use]
            pub fn alias_singleton(self, new_name: &str, old_name: &str) -> Self {
                self.alias_of_kind(new_name, old_name, MethodKind::Singleton)
            }

            fn alias_of_kind(self, new_name: &str, old_name: &str, kind: MethodKind) -> Self {
                let alias = Alias {
                    new_name: self.b.name(new_name),
                    old_name: self.b.name(old_name),
                    kind,
                    location: self.b.location(),
                };
                self.member(Member::Alias(alias))
            }

            #[must_use]
            pub fn attr_reader(self, name: &str, ty: TypeExpr) -> Self {
                let attr = self.b.attribute(name, AttributeKind::Reader, ty, false);
                self.member(attr)
            }

            #[must_use]
            pub fn attr_writer(self, name: &str, ty: TypeExpr) -> Self {
                let attr = self.b.attribute(name, AttributeKind::Writer, ty, false);
                self.member(attr)
            }

            #[must_use]
            pub fn attr_accessor(self, name: &str, ty: TypeExpr) -> Self {
                let attr = self.b.attribute(name, AttributeKind::Accessor, ty, false);
                self.member(attr)
            }

            /// `attr_reader self.name: ty`
            #[must_use]
            pub fn attr_singleton_reader(self, name: &str, ty: TypeExpr) -> Self {
                let attr = self.b.attribute(name, AttributeKind::Reader, ty, true);
                self.member(attr)
            }

            /// `@name: ty`
            #[must_use]
            pub fn ivar(self, name: &str, ty: TypeExpr) -> Self {
                let ivar = InstanceVariable {
                    name: self.b.name(name),
                    ty,
                    singleton: false,
                    location: self.b.location(),
                };
                self.member(Member::InstanceVariable(ivar))
            }

            /// `self.@name: ty`
            #[must_use]
            pub fn singleton_ivar(self, name: &str, ty: TypeExpr) -> Self {
                let ivar = InstanceVariable {
                    name: self.b.name(name),
                    ty,
                    singleton: true,
                    location: self.b.location(),
                };
                self.member(Member::InstanceVariable(ivar))
            }
        }
    )* };
}

body_methods!(ClassBuilder, ModuleBuilder, InterfaceBuilder);

pub struct ClassBuilder<'b> {
    b: &'b DeclBuilder,
    decl: ClassDecl,
}

impl ClassBuilder<'_> {
    /// `< Path[args]`
    #[must_use]
    pub fn superclass(mut self, path: &str, args: Vec<TypeExpr>) -> Self {
        self.decl.super_class = Some(SuperClass {
            name: self.b.type_name(path),
            args,
            location: self.b.location(),
        });
        self
    }

    pub fn build(self) -> Declaration {
        Declaration::Class(self.decl)
    }
}

pub struct ModuleBuilder<'b> {
    b: &'b DeclBuilder,
    decl: ModuleDecl,
}

impl ModuleBuilder<'_> {
    /// `: Path[args]`
    #[must_use]
    pub fn self_type(mut self, path: &str, args: Vec<TypeExpr>) -> Self {
        self.decl.self_types.push(ModuleSelfType {
            name: self.b.type_name(path),
            args,
            location: self.b.location(),
        });
        self
    }

    pub fn build(self) -> Declaration {
        Declaration::Module(self.decl)
    }
}

pub struct InterfaceBuilder<'b> {
    b: &'b DeclBuilder,
    decl: InterfaceDecl,
}

impl InterfaceBuilder<'_> {
    pub fn build(self) -> Declaration {
        Declaration::Interface(self.decl)
    }
}

#[cfg(test)]
mod tests;
