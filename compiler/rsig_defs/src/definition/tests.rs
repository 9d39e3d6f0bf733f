use super::*;
use pretty_assertions::assert_eq;
use rsig_ir::{DeclBuilder, StringInterner};

fn method(b: &DeclBuilder, shadowed: Vec<SuperMethod>) -> DefinedMethod {
    let owner = b.type_name("A");
    DefinedMethod {
        name: b.name("foo"),
        kind: MethodKind::Instance,
        visibility: Visibility::Private,
        arms: vec![DefinedArm {
            arm: b.arm(vec![], b.var("x")),
            defined_in: owner.clone(),
        }],
        defined_in: owner,
        alias_of: None,
        location: b.location(),
        shadowed,
    }
}

#[test]
fn kind_names() {
    assert_eq!(DefinitionKind::Instance.to_string(), "instance");
    assert_eq!(DefinitionKind::Singleton.as_str(), "singleton");
    assert_eq!(DefinitionKind::Interface.as_str(), "interface");
}

#[test]
fn super_method_is_nearest_shadowed() {
    let b = DeclBuilder::new(StringInterner::shared());
    let near = SuperMethod {
        defined_in: b.type_name("Base"),
        visibility: Visibility::Public,
        arms: Vec::new(),
        location: b.location(),
    };
    let far = SuperMethod {
        defined_in: b.type_name("Object"),
        ..near.clone()
    };

    let foo = method(&b, vec![near.clone(), far]);
    assert!(!foo.is_public());
    assert_eq!(foo.super_method(), Some(&near));
    assert_eq!(foo.arm(0).map(|a| &a.function.return_type), Some(&b.var("x")));
    assert_eq!(foo.arm(1), None);

    assert_eq!(method(&b, Vec::new()).super_method(), None);
}
