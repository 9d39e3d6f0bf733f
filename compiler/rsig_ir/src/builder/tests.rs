use super::*;
use crate::{DeclarationKind, MixinKind};
use pretty_assertions::assert_eq;

#[test]
fn locations_are_distinct() {
    let b = DeclBuilder::new(StringInterner::shared()).with_source(SourceId(3));
    let first = b.location();
    let second = b.location();
    assert_ne!(first, second);
    assert_eq!(first.source, SourceId(3));
}

#[test]
fn class_with_members() {
    let b = DeclBuilder::new(StringInterner::shared());
    let decl = b
        .class("::A")
        .param("T", Variance::Covariant)
        .superclass("Base", vec![b.var("T")])
        .include("M", vec![])
        .def("foo", vec![b.arm(vec![], b.named("String", vec![]))])
        .alias("bar", "foo")
        .attr_accessor("size", b.named("Integer", vec![]))
        .build();

    assert_eq!(decl.kind(), DeclarationKind::Class);
    assert_eq!(decl.name(), &b.type_name("A"));
    assert_eq!(decl.type_params().len(), 1);
    assert_eq!(decl.members().len(), 4);

    let Declaration::Class(class) = &decl else {
        panic!("expected a class");
    };
    let super_class = class
        .super_class
        .as_ref()
        .unwrap_or_else(|| panic!("superclass set"));
    assert_eq!(super_class.name, b.type_name("Base"));
    assert_eq!(super_class.args, vec![b.var("T")]);

    let (kind, mixin) = decl.members()[0]
        .as_mixin()
        .unwrap_or_else(|| panic!("first member is a mixin"));
    assert_eq!(kind, MixinKind::Include);
    assert_eq!(mixin.name, b.type_name("M"));
}

#[test]
fn method_flavours() {
    let b = DeclBuilder::new(StringInterner::shared());
    let decl = b
        .module("Kernel")
        .def_module_function("puts", vec![b.arm(vec![], TypeExpr::void())])
        .def_private("helper", vec![b.arm(vec![], TypeExpr::void())])
        .def_overloading("to_s", vec![b.arm(vec![], TypeExpr::void())])
        .self_type("BasicObject", vec![])
        .build();

    let kinds: Vec<_> = decl
        .members()
        .iter()
        .filter_map(|m| match m {
            Member::Method(def) => Some((def.kind, def.visibility, def.overloading)),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            (MethodKind::SingletonInstance, Visibility::Public, false),
            (MethodKind::Instance, Visibility::Private, false),
            (MethodKind::Instance, Visibility::Public, true),
        ]
    );

    let Declaration::Module(module) = &decl else {
        panic!("expected a module");
    };
    assert_eq!(module.self_types.len(), 1);
}

#[test]
fn interface_and_alias_kinds() {
    let b = DeclBuilder::new(StringInterner::shared());
    let iface = b.interface("_Each").param("A", Variance::Covariant).build();
    assert_eq!(iface.kind(), DeclarationKind::Interface);
    assert!(iface.name().is_interface());

    let alias = b.type_alias("json", &["T"], b.var("T"));
    assert_eq!(alias.kind(), DeclarationKind::TypeAlias);
    assert!(alias.name().is_alias());
    assert_eq!(alias.type_params().len(), 1);
}
