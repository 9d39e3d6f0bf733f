use super::*;
use crate::{StringInterner, Variance};
use pretty_assertions::assert_eq;

fn named(interner: &StringInterner, path: &str, args: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::named(TypeName::parse(interner, path), args, Location::DUMMY)
}

#[test]
fn untyped_is_explicit() {
    assert!(TypeExpr::untyped().is_untyped());
    assert!(!TypeExpr::void().is_untyped());
}

#[test]
fn children_of_named_are_args() {
    let interner = StringInterner::new();
    let t = TypeExpr::variable(interner.intern("T"));
    let ty = named(&interner, "Hash", vec![t.clone(), TypeExpr::untyped()]);

    let mut seen = Vec::new();
    ty.for_each_child(&mut |child| seen.push(child.clone()));
    assert_eq!(seen, vec![t, TypeExpr::untyped()]);
}

#[test]
fn proc_children_include_return() {
    let interner = StringInterner::new();
    let a = TypeExpr::variable(interner.intern("A"));
    let r = TypeExpr::variable(interner.intern("R"));
    let ty = TypeExpr::proc(FunctionType::new(vec![a.clone()], r.clone()));

    let mut seen = Vec::new();
    ty.for_each_child(&mut |child| seen.push(child.clone()));
    assert_eq!(seen, vec![a, r]);
}

#[test]
fn map_children_rebuilds_structure() {
    let interner = StringInterner::new();
    let t = interner.intern("T");
    let ty = TypeExpr::Union(vec![TypeExpr::variable(t), TypeExpr::base(BaseType::Nil)]);

    let mapped = ty.map_children(&mut |child| match child {
        TypeExpr::Variable(_) => TypeExpr::base(BaseType::Bool),
        other => other.clone(),
    });
    assert_eq!(
        mapped,
        TypeExpr::Union(vec![
            TypeExpr::base(BaseType::Bool),
            TypeExpr::base(BaseType::Nil)
        ])
    );
}

#[test]
fn params_iterate_in_slot_order() {
    let interner = StringInterner::new();
    let mut function = FunctionType::new(vec![TypeExpr::base(BaseType::Bool)], TypeExpr::void());
    function.rest_positional = Some(Param::new(TypeExpr::base(BaseType::Nil)));
    function
        .required_keywords
        .push((interner.intern("key"), Param::new(TypeExpr::untyped())));

    let tys: Vec<_> = function.params().map(|p| p.ty.clone()).collect();
    assert_eq!(
        tys,
        vec![
            TypeExpr::base(BaseType::Bool),
            TypeExpr::base(BaseType::Nil),
            TypeExpr::untyped()
        ]
    );
}

#[test]
fn method_params_shadow() {
    let interner = StringInterner::new();
    let t = interner.intern("T");
    let arm = MethodArm::new(
        FunctionType::new(vec![TypeExpr::variable(t)], TypeExpr::void()),
        Location::DUMMY,
    )
    .with_type_params(vec![TypeParam::new(t, Variance::Invariant, Location::DUMMY)]);

    assert!(arm.binds(t));
    assert!(!arm.binds(interner.intern("U")));
}

#[test]
fn arm_map_types_reaches_block() {
    let interner = StringInterner::new();
    let t = interner.intern("T");
    let arm = MethodArm::new(FunctionType::new(vec![], TypeExpr::void()), Location::DUMMY)
        .with_block(Block {
            required: true,
            function: FunctionType::new(vec![TypeExpr::variable(t)], TypeExpr::void()),
            self_type: None,
        });

    let mapped = arm.map_types(&mut |ty| match ty {
        TypeExpr::Variable(_) => TypeExpr::untyped(),
        other => other.clone(),
    });
    let block = mapped.block.unwrap_or_else(|| panic!("block survives mapping"));
    assert_eq!(block.function.required_positionals[0].ty, TypeExpr::untyped());
}

#[test]
fn arm_map_types_reaches_param_bounds() {
    let interner = StringInterner::new();
    let t = interner.intern("T");
    let mut param = TypeParam::new(interner.intern("U"), Variance::Invariant, Location::DUMMY);
    param.upper_bound = Some(TypeExpr::variable(t));
    let arm = MethodArm::new(FunctionType::new(vec![], TypeExpr::void()), Location::DUMMY)
        .with_type_params(vec![param]);

    let mapped = arm.map_types(&mut |ty| match ty {
        TypeExpr::Variable(_) => TypeExpr::untyped(),
        other => other.clone(),
    });
    assert_eq!(mapped.type_params[0].upper_bound, Some(TypeExpr::untyped()));
    assert_eq!(mapped.type_params[0].name, interner.intern("U"));
}

#[test]
fn equality_ignores_locations() {
    let interner = StringInterner::new();
    let here = Location::new(crate::SourceId(0), crate::Span::new(0, 1));
    let there = Location::new(crate::SourceId(1), crate::Span::new(7, 9));
    let string = TypeName::parse(&interner, "String");
    let array = TypeName::parse(&interner, "Array");

    let a = TypeExpr::named(array.clone(), vec![TypeExpr::named(string.clone(), vec![], here)], here);
    let b = TypeExpr::named(array, vec![TypeExpr::named(string.clone(), vec![], there)], there);
    assert_eq!(a, b);

    let mut seen = std::collections::HashSet::new();
    seen.insert(a);
    assert!(seen.contains(&b));

    let singleton = TypeExpr::Singleton {
        name: string.clone(),
        location: here,
    };
    assert_ne!(singleton, TypeExpr::named(string, vec![], here));
}
