use super::*;
use pretty_assertions::assert_eq;
use rsig_ir::{DeclBuilder, StringInterner, Variance};

#[test]
fn replaces_parameters_everywhere() {
    let b = DeclBuilder::new(StringInterner::shared());
    let params = vec![b.type_param("T", Variance::Invariant)];
    let subst = Subst::new(&params, &[b.named("String", vec![])]);

    let ty = TypeExpr::Union(vec![
        b.var("T"),
        TypeExpr::optional(b.var("U")),
    ]);
    let TypeExpr::Union(parts) = subst.apply(&ty) else {
        panic!("union survives substitution");
    };
    assert!(matches!(&parts[0], TypeExpr::Named { name, .. } if *name == b.type_name("String")));
    assert_eq!(parts[1], TypeExpr::optional(b.var("U")));
}

#[test]
fn identity_application_is_empty() {
    let b = DeclBuilder::new(StringInterner::shared());
    let params = vec![b.type_param("T", Variance::Invariant)];
    let subst = Subst::new(&params, &[b.var("T")]);
    assert!(subst.is_empty());
}

#[test]
fn method_params_shadow() {
    let b = DeclBuilder::new(StringInterner::shared());
    let params = vec![b.type_param("T", Variance::Invariant)];
    let subst = Subst::new(&params, &[b.named("Integer", vec![])]);

    let arm = b
        .arm(vec![b.var("T")], b.var("T"))
        .with_type_params(vec![b.type_param("T", Variance::Invariant)]);
    let applied = subst.apply_arm(&arm, b.interner());
    assert_eq!(applied.function.return_type, b.var("T"));

    let open = b.arm(vec![b.var("T")], TypeExpr::void());
    let applied = subst.apply_arm(&open, b.interner());
    assert!(matches!(
        &applied.function.required_positionals[0].ty,
        TypeExpr::Named { .. }
    ));
}

#[test]
fn method_params_do_not_capture_arguments() {
    let b = DeclBuilder::new(StringInterner::shared());
    // `M[T]` applied as `M[U]` to `def foo[U]: (T) -> U`.
    let params = vec![b.type_param("T", Variance::Invariant)];
    let subst = Subst::new(&params, &[b.var("U")]);
    let arm = b
        .arm(vec![b.var("T")], b.var("U"))
        .with_type_params(vec![b.type_param("U", Variance::Invariant)]);

    let applied = subst.apply_arm(&arm, b.interner());
    assert_eq!(applied.type_params[0].name, b.name("U1"));
    assert_eq!(applied.function.required_positionals[0].ty, b.var("U"));
    assert_eq!(applied.function.return_type, b.var("U1"));
}

#[test]
fn renamed_params_avoid_every_visible_name() {
    let b = DeclBuilder::new(StringInterner::shared());
    // `U1` is already used by the arm and `U2` is still being substituted.
    let params = vec![
        b.type_param("T", Variance::Invariant),
        b.type_param("U2", Variance::Invariant),
    ];
    let subst = Subst::new(&params, &[b.var("U"), b.named("String", vec![])]);
    let mut bounded = b.type_param("U", Variance::Invariant);
    bounded.upper_bound = Some(b.named("Array", vec![b.var("U")]));
    let arm = b
        .arm(vec![b.var("T"), b.var("U1"), b.var("U2")], b.var("U"))
        .with_type_params(vec![bounded]);

    let applied = subst.apply_arm(&arm, b.interner());
    let fresh = b.name("U3");
    assert_eq!(applied.type_params[0].name, fresh);
    assert_eq!(
        applied.type_params[0].upper_bound,
        Some(b.named("Array", vec![TypeExpr::variable(fresh)]))
    );
    let params: Vec<TypeExpr> = applied
        .function
        .required_positionals
        .iter()
        .map(|p| p.ty.clone())
        .collect();
    assert_eq!(
        params,
        vec![b.var("U"), b.var("U1"), b.named("String", vec![])]
    );
    assert_eq!(applied.function.return_type, TypeExpr::variable(fresh));
}
