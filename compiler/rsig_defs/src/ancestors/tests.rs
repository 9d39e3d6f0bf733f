#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;
use rsig_ir::{Declaration, DeclBuilder, DeclarationKind, Name, StringInterner, Variance};

fn builder() -> DeclBuilder {
    DeclBuilder::new(StringInterner::shared())
}

fn env_of(b: &DeclBuilder, decls: Vec<Declaration>) -> Environment {
    Environment::from_declarations(b.shared_interner(), decls).unwrap()
}

fn roots(b: &DeclBuilder) -> AncestorRoots {
    AncestorRoots {
        implicit_superclass: Some(b.type_name("Object")),
        class_metaclass: Some(b.type_name("Class")),
        module_metaclass: Some(b.type_name("Module")),
    }
}

fn describe(env: &Environment, ancestors: &Ancestors) -> Vec<String> {
    ancestors
        .iter()
        .map(|e| e.ancestor.describe(env.interner()))
        .collect()
}

fn resolve(
    env: &Environment,
    roots: &AncestorRoots,
    name: &TypeName,
    kind: DefinitionKind,
) -> Result<Arc<Ancestors>, DefinitionError> {
    let cache = AncestorCache::default();
    AncestorResolver::new(env, roots, &cache, true).ancestors(name, kind)
}

#[test]
fn instance_order_prepends_self_includes_super() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.class("Object").build(),
            b.module("P").build(),
            b.module("I1").build(),
            b.module("I2").build(),
            b.class("Base").build(),
            b.class("A")
                .superclass("Base", vec![])
                .include("I1", vec![])
                .prepend("P", vec![])
                .include("I2", vec![])
                .build(),
        ],
    );

    let ancestors =
        resolve(&env, &roots(&b), &b.type_name("A"), DefinitionKind::Instance).unwrap();
    assert_eq!(
        describe(&env, &ancestors),
        vec!["::P", "::A", "::I2", "::I1", "::Base", "::Object"]
    );
    let origins: Vec<AncestorOrigin> = ancestors.iter().map(|e| e.origin).collect();
    assert_eq!(
        origins,
        vec![
            AncestorOrigin::Prepend,
            AncestorOrigin::Own,
            AncestorOrigin::Include,
            AncestorOrigin::Include,
            // Everything reached through the superclass is stamped with it.
            AncestorOrigin::Superclass,
            AncestorOrigin::Superclass,
        ]
    );
}

#[test]
fn mixins_bring_their_own_ancestors() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.module("Inner").build(),
            b.module("Outer").include("Inner", vec![]).build(),
            b.class("A").include("Outer", vec![]).build(),
        ],
    );
    let ancestors = resolve(
        &env,
        &AncestorRoots::default(),
        &b.type_name("A"),
        DefinitionKind::Instance,
    )
    .unwrap();
    assert_eq!(describe(&env, &ancestors), vec!["::A", "::Outer", "::Inner"]);
}

#[test]
fn generic_arguments_are_substituted() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.class("String").build(),
            b.module("Each").param("T", Variance::Invariant).build(),
            b.module("Enum")
                .param("E", Variance::Invariant)
                .include("Each", vec![b.var("E")])
                .build(),
            b.class("List").include("Enum", vec![b.named("String", vec![])]).build(),
        ],
    );
    let ancestors = resolve(
        &env,
        &AncestorRoots::default(),
        &b.type_name("List"),
        DefinitionKind::Instance,
    )
    .unwrap();

    let each = &ancestors.entries()[2];
    assert_eq!(each.ancestor.name(), &b.type_name("Each"));
    assert!(matches!(
        each.ancestor.args(),
        [TypeExpr::Named { name, .. }] if *name == b.type_name("String")
    ));
}

#[test]
fn include_arity_is_checked() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.class("String").build(),
            b.module("M")
                .param("K", Variance::Invariant)
                .param("V", Variance::Invariant)
                .build(),
            b.class("A").include("M", vec![b.named("String", vec![])]).build(),
        ],
    );
    let err = resolve(
        &env,
        &AncestorRoots::default(),
        &b.type_name("A"),
        DefinitionKind::Instance,
    )
    .unwrap_err();
    let DefinitionError::GenericArity {
        name, args, params, ..
    } = err
    else {
        panic!("expected an arity error");
    };
    assert_eq!(name, b.type_name("M"));
    assert_eq!(args, vec![b.named("String", vec![])]);
    let params: Vec<Name> = params.iter().map(|p| p.name).collect();
    assert_eq!(params, vec![b.name("K"), b.name("V")]);
}

#[test]
fn class_mixin_targets_skip_arity() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.class("String").build(),
            b.class("C").build(),
            b.class("A").include("C", vec![b.named("String", vec![])]).build(),
        ],
    );
    let ancestors = resolve(
        &env,
        &AncestorRoots::default(),
        &b.type_name("A"),
        DefinitionKind::Instance,
    )
    .unwrap();
    assert_eq!(describe(&env, &ancestors), vec!["::A", "::C[1]"]);
}

#[test]
fn singleton_chain_ends_in_metaclass() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.class("Object").build(),
            b.class("Module").build(),
            b.class("Class").superclass("Module", vec![]).build(),
            b.module("Ext").build(),
            b.class("Base").build(),
            b.class("A").superclass("Base", vec![]).extend("Ext", vec![]).build(),
        ],
    );
    let ancestors =
        resolve(&env, &roots(&b), &b.type_name("A"), DefinitionKind::Singleton).unwrap();
    assert_eq!(
        describe(&env, &ancestors),
        vec![
            "singleton(::A)",
            "::Ext",
            "singleton(::Base)",
            "singleton(::Object)",
            "::Class",
            "::Module",
            "::Object",
        ]
    );
}

#[test]
fn module_singleton_uses_module_metaclass() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.class("Object").build(),
            b.class("Module").build(),
            b.module("M").build(),
        ],
    );
    let ancestors =
        resolve(&env, &roots(&b), &b.type_name("M"), DefinitionKind::Singleton).unwrap();
    assert_eq!(
        describe(&env, &ancestors),
        vec!["singleton(::M)", "::Module", "::Object"]
    );
}

#[test]
fn implicit_root_skips_its_own_ancestors() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.class("BasicObject").build(),
            b.class("Object").superclass("BasicObject", vec![]).build(),
        ],
    );
    let roots = roots(&b);
    let basic = resolve(&env, &roots, &b.type_name("BasicObject"), DefinitionKind::Instance)
        .unwrap();
    assert_eq!(describe(&env, &basic), vec!["::BasicObject"]);

    let object = resolve(&env, &roots, &b.type_name("Object"), DefinitionKind::Instance).unwrap();
    assert_eq!(describe(&env, &object), vec!["::Object", "::BasicObject"]);
}

#[test]
fn superclass_cycle_returns_to_start() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.class("A").superclass("B", vec![]).build(),
            b.class("B").superclass("A", vec![]).build(),
        ],
    );
    let err = resolve(
        &env,
        &AncestorRoots::default(),
        &b.type_name("A"),
        DefinitionKind::Instance,
    )
    .unwrap_err();
    let DefinitionError::CyclicAncestry { cycle } = err else {
        panic!("expected a cycle");
    };
    let names: Vec<TypeName> = cycle.iter().map(|e| e.ancestor.name().clone()).collect();
    assert_eq!(
        names,
        vec![b.type_name("A"), b.type_name("B"), b.type_name("A")]
    );
}

#[test]
fn mixin_cycle_is_detected() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.module("M").include("N", vec![]).build(),
            b.module("N").include("M", vec![]).build(),
        ],
    );
    let err = resolve(
        &env,
        &AncestorRoots::default(),
        &b.type_name("M"),
        DefinitionKind::Instance,
    )
    .unwrap_err();
    assert_eq!(err.code(), rsig_diagnostic::ErrorCode::E2003);
}

#[test]
fn diamonds_are_kept() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.module("Shared").build(),
            b.module("Left").include("Shared", vec![]).build(),
            b.module("Right").include("Shared", vec![]).build(),
            b.class("A")
                .include("Left", vec![])
                .include("Right", vec![])
                .build(),
        ],
    );
    let ancestors = resolve(
        &env,
        &AncestorRoots::default(),
        &b.type_name("A"),
        DefinitionKind::Instance,
    )
    .unwrap();
    assert_eq!(
        describe(&env, &ancestors),
        vec!["::A", "::Right", "::Shared", "::Left", "::Shared"]
    );
}

#[test]
fn missing_and_misplaced_superclasses() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.module("M").build(),
            b.class("A").superclass("Missing", vec![]).build(),
            b.class("B").superclass("M", vec![]).build(),
        ],
    );
    let roots = AncestorRoots::default();
    assert!(matches!(
        resolve(&env, &roots, &b.type_name("A"), DefinitionKind::Instance),
        Err(DefinitionError::UnresolvedSuperclass { .. })
    ));
    assert!(matches!(
        resolve(&env, &roots, &b.type_name("B"), DefinitionKind::Instance),
        Err(DefinitionError::SuperclassKind {
            found: DeclarationKind::Module,
            ..
        })
    ));
}

#[test]
fn missing_mixin_targets() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.class("A").include("Missing", vec![]).build(),
            b.class("P").prepend("Lost", vec![]).build(),
            b.class("B").extend("Gone", vec![]).build(),
        ],
    );
    let roots = AncestorRoots::default();
    let mixin_location = |owner: &str| {
        env.lookup(&b.type_name(owner))
            .unwrap()
            .members()
            .iter()
            .find_map(Member::as_mixin)
            .map(|(_, mixin)| mixin.location)
            .unwrap()
    };

    assert_eq!(
        resolve(&env, &roots, &b.type_name("A"), DefinitionKind::Instance).unwrap_err(),
        DefinitionError::UnresolvedType {
            name: b.type_name("Missing"),
            location: mixin_location("A"),
        }
    );
    assert_eq!(
        resolve(&env, &roots, &b.type_name("P"), DefinitionKind::Instance).unwrap_err(),
        DefinitionError::UnresolvedType {
            name: b.type_name("Lost"),
            location: mixin_location("P"),
        }
    );

    // Extends only act on the singleton side.
    assert!(resolve(&env, &roots, &b.type_name("B"), DefinitionKind::Instance).is_ok());
    assert_eq!(
        resolve(&env, &roots, &b.type_name("B"), DefinitionKind::Singleton).unwrap_err(),
        DefinitionError::UnresolvedType {
            name: b.type_name("Gone"),
            location: mixin_location("B"),
        }
    );
}

#[test]
fn interface_ancestors() {
    let b = builder();
    let env = env_of(
        &b,
        vec![
            b.interface("_A").build(),
            b.interface("_B").build(),
            b.interface("_Both")
                .include("_A", vec![])
                .include("_B", vec![])
                .build(),
        ],
    );
    let ancestors = resolve(
        &env,
        &AncestorRoots::default(),
        &b.type_name("_Both"),
        DefinitionKind::Interface,
    )
    .unwrap();
    assert_eq!(describe(&env, &ancestors), vec!["::_Both", "::_B", "::_A"]);
    assert!(ancestors.iter().all(|e| e.ancestor.kind() == DefinitionKind::Interface));
}

#[test]
fn results_are_memoized() {
    let b = builder();
    let env = env_of(&b, vec![b.class("A").build()]);
    let roots = AncestorRoots::default();
    let cache = AncestorCache::default();
    let resolver = AncestorResolver::new(&env, &roots, &cache, true);

    let name = b.type_name("A");
    let first = resolver.ancestors(&name, DefinitionKind::Instance).unwrap();
    let second = resolver.ancestors(&name, DefinitionKind::Instance).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    let uncached = AncestorCache::default();
    let fresh = AncestorResolver::new(&env, &roots, &uncached, false)
        .ancestors(&name, DefinitionKind::Instance)
        .unwrap();
    assert_eq!(*fresh, *first);
    assert!(uncached.is_empty());
}
