#![allow(clippy::unwrap_used)]

use super::*;
use crate::builder::DefinitionBuilder;
use pretty_assertions::assert_eq;
use rsig_ir::{Block, ClassBuilder, Declaration, DeclBuilder, StringInterner};

fn builder() -> DeclBuilder {
    DeclBuilder::new(StringInterner::shared())
}

fn env_of(b: &DeclBuilder, decls: Vec<Declaration>) -> Environment {
    Environment::from_declarations(b.shared_interner(), decls).unwrap()
}

fn build(env: &Environment, name: &TypeName) -> Result<(), DefinitionError> {
    DefinitionBuilder::new(env).build_instance(name).map(|_| ())
}

/// `(declared, position)` of the reported violation, or `None` if `::A` builds.
fn violation(b: &DeclBuilder, decls: Vec<Declaration>) -> Option<(Variance, Variance)> {
    let env = env_of(b, decls);
    match build(&env, &b.type_name("A")) {
        Ok(()) => None,
        Err(DefinitionError::VarianceViolation {
            variance, position, ..
        }) => Some((variance, position)),
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

/// Generic helpers every variance test can refer to.
fn prelude(b: &DeclBuilder) -> Vec<Declaration> {
    vec![
        b.class("Array").param("E", Variance::Invariant).build(),
        b.class("Source").param("E", Variance::Covariant).build(),
        b.class("Sink").param("E", Variance::Contravariant).build(),
    ]
}

/// The prelude plus `class A[T]`, with members added by `f`.
fn class_with<'b>(
    b: &'b DeclBuilder,
    variance: Variance,
    f: impl FnOnce(ClassBuilder<'b>) -> ClassBuilder<'b>,
) -> Vec<Declaration> {
    let mut decls = prelude(b);
    decls.push(f(b.class("A").param("T", variance)).build());
    decls
}

#[test]
fn covariant_param_in_return_is_fine() {
    let b = builder();
    let decls = class_with(&b, Variance::Covariant, |c| {
        c.def("get", vec![b.arm(vec![], b.var("T"))])
    });
    assert_eq!(violation(&b, decls), None);
}

#[test]
fn covariant_param_in_argument_is_rejected() {
    let b = builder();
    let decls = class_with(&b, Variance::Covariant, |c| {
        c.def("push", vec![b.arm(vec![b.var("T")], TypeExpr::void())])
    });
    assert_eq!(
        violation(&b, decls),
        Some((Variance::Covariant, Variance::Contravariant))
    );
}

#[test]
fn contravariant_param_in_return_is_rejected() {
    let b = builder();
    let decls = class_with(&b, Variance::Contravariant, |c| {
        c.def("get", vec![b.arm(vec![], b.var("T"))])
    });
    assert_eq!(
        violation(&b, decls),
        Some((Variance::Contravariant, Variance::Covariant))
    );
}

#[test]
fn block_positions_flip() {
    let b = builder();
    let each = |ret: TypeExpr, param: TypeExpr| {
        b.arm(vec![], TypeExpr::void()).with_block(Block {
            required: true,
            function: FunctionType::new(vec![param], ret),
            self_type: None,
        })
    };

    // `each { |T| ... }` hands T out: fine for a covariant parameter.
    let ok = class_with(&b, Variance::Covariant, |c| {
        c.def("each", vec![each(TypeExpr::void(), b.var("T"))])
    });
    assert_eq!(violation(&b, ok), None);

    // A block returning T feeds T in.
    let bad = class_with(&b, Variance::Covariant, |c| {
        c.def("fill", vec![each(b.var("T"), TypeExpr::void())])
    });
    assert_eq!(
        violation(&b, bad),
        Some((Variance::Covariant, Variance::Contravariant))
    );
}

#[test]
fn proc_parameter_flips_back() {
    let b = builder();
    let callback = TypeExpr::proc(FunctionType::new(vec![b.var("T")], TypeExpr::void()));
    let decls = class_with(&b, Variance::Covariant, |c| {
        c.def("on", vec![b.arm(vec![callback], TypeExpr::void())])
    });
    assert_eq!(violation(&b, decls), None);
}

#[test]
fn generic_arguments_compose() {
    let b = builder();
    let source = class_with(&b, Variance::Covariant, |c| {
        c.def("out", vec![b.arm(vec![], b.named("Source", vec![b.var("T")]))])
    });
    assert_eq!(violation(&b, source), None);

    let sink = class_with(&b, Variance::Covariant, |c| {
        c.def("out", vec![b.arm(vec![], b.named("Sink", vec![b.var("T")]))])
    });
    assert_eq!(
        violation(&b, sink),
        Some((Variance::Covariant, Variance::Contravariant))
    );

    let array = class_with(&b, Variance::Covariant, |c| {
        c.def("out", vec![b.arm(vec![], b.named("Array", vec![b.var("T")]))])
    });
    assert_eq!(
        violation(&b, array),
        Some((Variance::Covariant, Variance::Invariant))
    );
}

#[test]
fn method_type_params_shadow() {
    let b = builder();
    let arm = b
        .arm(vec![b.var("T")], b.var("T"))
        .with_type_params(vec![b.type_param("T", Variance::Invariant)]);
    let decls = class_with(&b, Variance::Covariant, |c| c.def("id", vec![arm]));
    assert_eq!(violation(&b, decls), None);
}

#[test]
fn unchecked_params_are_skipped() {
    let b = builder();
    let mut decls = prelude(&b);
    decls.push(
        b.class("A")
            .param_unchecked("T", Variance::Covariant)
            .def("push", vec![b.arm(vec![b.var("T")], TypeExpr::void())])
            .build(),
    );
    assert_eq!(violation(&b, decls), None);
}

#[test]
fn attribute_positions() {
    let b = builder();
    let reader = class_with(&b, Variance::Covariant, |c| c.attr_reader("value", b.var("T")));
    assert_eq!(violation(&b, reader), None);

    let writer = class_with(&b, Variance::Covariant, |c| c.attr_writer("value", b.var("T")));
    assert_eq!(
        violation(&b, writer),
        Some((Variance::Covariant, Variance::Contravariant))
    );

    let accessor = class_with(&b, Variance::Contravariant, |c| {
        c.attr_accessor("value", b.var("T"))
    });
    assert_eq!(
        violation(&b, accessor),
        Some((Variance::Contravariant, Variance::Invariant))
    );
}

#[test]
fn superclass_arguments_are_positions() {
    let b = builder();
    let mut decls = prelude(&b);
    decls.push(
        b.class("A")
            .param("T", Variance::Contravariant)
            .superclass("Source", vec![b.var("T")])
            .build(),
    );
    let env = env_of(&b, decls);
    let err = build(&env, &b.type_name("A")).unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::VarianceViolation {
            member: VarianceSite::Superclass(ref name),
            ..
        } if *name == b.type_name("Source")
    ));
}

#[test]
fn singleton_side_ignores_variance() {
    let b = builder();
    let decls = class_with(&b, Variance::Covariant, |c| {
        c.def("push", vec![b.arm(vec![b.var("T")], TypeExpr::void())])
    });
    let env = env_of(&b, decls);
    let builder = DefinitionBuilder::new(&env);
    assert!(builder.build_singleton(&b.type_name("A")).is_ok());
    assert!(builder.build_instance(&b.type_name("A")).is_err());
}

#[test]
fn references_must_exist_with_arity() {
    let b = builder();
    let mut decls = prelude(&b);
    decls.push(
        b.class("A")
            .def("items", vec![b.arm(vec![], b.named("Array", vec![]))])
            .build(),
    );
    let env = env_of(&b, decls);
    assert!(matches!(
        build(&env, &b.type_name("A")),
        Err(DefinitionError::GenericArity {
            ref args,
            ref params,
            ..
        }) if args.is_empty() && params.len() == 1
    ));

    let decls = vec![b
        .class("A")
        .def("thing", vec![b.arm(vec![], b.named("Missing", vec![]))])
        .build()];
    let env = env_of(&b, decls);
    assert!(matches!(
        build(&env, &b.type_name("A")),
        Err(DefinitionError::UnresolvedType { ref name, .. }) if *name == b.type_name("Missing")
    ));

    let decls = vec![b
        .class("A")
        .ivar("@klass", b.singleton_of("Nowhere"))
        .build()];
    let env = env_of(&b, decls);
    assert!(matches!(
        build(&env, &b.type_name("A")),
        Err(DefinitionError::UnresolvedType { .. })
    ));
}

#[test]
fn self_types_must_resolve() {
    let b = builder();
    let env = env_of(&b, vec![b.module("M").self_type("Missing", vec![]).build()]);
    assert!(matches!(
        build(&env, &b.type_name("M")),
        Err(DefinitionError::UnresolvedSelfType { .. })
    ));

    let env = env_of(
        &b,
        vec![
            b.class("Array").param("E", Variance::Invariant).build(),
            b.module("M").self_type("Array", vec![]).build(),
        ],
    );
    assert!(matches!(
        build(&env, &b.type_name("M")),
        Err(DefinitionError::GenericArity { .. })
    ));
}

#[test]
fn methods_need_arms() {
    let b = builder();
    let env = env_of(&b, vec![b.class("A").def("empty", vec![]).build()]);
    assert!(matches!(
        build(&env, &b.type_name("A")),
        Err(DefinitionError::InvalidOverload {
            reason: OverloadReason::NoArms,
            ..
        })
    ));
}
