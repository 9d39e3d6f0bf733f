//! Definition-building errors.
//!
//! Errors carry interned names, so the `Display` messages derived here are
//! kind-level only. [`DefinitionError::to_diagnostic`] renders the precise
//! text against the interner and attaches every location involved.

use rsig_diagnostic::{Diagnostic, ErrorCode};
use rsig_ir::{
    DeclarationKind, Location, MethodKind, MixinKind, Name, StringInterner, TypeExpr, TypeName,
    TypeParam, Variance,
};
use thiserror::Error;

use crate::ancestors::AncestorEntry;

/// Why two declarations of one name could not be merged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConflictReason {
    /// e.g. `class Foo` and `module Foo`.
    KindMismatch {
        first: DeclarationKind,
        second: DeclarationKind,
    },
    SuperclassMismatch,
    TypeParamsMismatch,
    /// Interfaces and type aliases cannot be reopened.
    Redeclared,
}

impl ConflictReason {
    fn describe(self) -> String {
        match self {
            ConflictReason::KindMismatch { first, second } => {
                format!("declared as a {first} and as a {second}")
            }
            ConflictReason::SuperclassMismatch => "superclasses differ".to_owned(),
            ConflictReason::TypeParamsMismatch => "type parameters differ".to_owned(),
            ConflictReason::Redeclared => "declared more than once".to_owned(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverloadReason {
    /// The merged method ended up with zero arms.
    NoArms,
    /// `def m: ... | ...` with no earlier definition of `m` to extend.
    NothingToOverload,
}

/// One `include`/`extend`/`prepend` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixinSite {
    pub kind: MixinKind,
    pub name: TypeName,
    pub location: Location,
}

/// One alias in a recursive alias chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasSite {
    /// Body that declares the alias.
    pub type_name: TypeName,
    pub new_name: Name,
    pub old_name: Name,
    pub location: Location,
}

/// Where a variance violation was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VarianceSite {
    Method(Name),
    Attribute(Name),
    InstanceVariable(Name),
    Superclass(TypeName),
    Mixin(TypeName),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("unresolved type reference")]
    UnresolvedType { name: TypeName, location: Location },

    #[error("unresolved superclass")]
    UnresolvedSuperclass {
        type_name: TypeName,
        super_name: TypeName,
        location: Location,
    },

    #[error("unresolved module self type")]
    UnresolvedSelfType {
        module: TypeName,
        self_type: TypeName,
        location: Location,
    },

    #[error("invalid {} target: {target_kind}", .mixin.kind)]
    MixinTargetKind {
        type_name: TypeName,
        mixin: MixinSite,
        target_kind: DeclarationKind,
    },

    #[error("superclass is a {found}, not a class")]
    SuperclassKind {
        type_name: TypeName,
        super_name: TypeName,
        found: DeclarationKind,
        location: Location,
    },

    #[error("cyclic ancestry ({} steps)", .cycle.len().saturating_sub(1))]
    CyclicAncestry { cycle: Vec<AncestorEntry> },

    #[error("duplicate {kind} method ({} definitions)", .locations.len())]
    DuplicateMethod {
        type_name: TypeName,
        method: Name,
        kind: MethodKind,
        locations: Vec<Location>,
    },

    #[error("{kind} method defined by {} interface mixins", .mixins.len())]
    DuplicateMixinMethod {
        type_name: TypeName,
        method: Name,
        kind: MethodKind,
        mixins: Vec<MixinSite>,
    },

    #[error("recursive alias ({} aliases)", .cycle.len())]
    RecursiveAlias {
        type_name: TypeName,
        cycle: Vec<AliasSite>,
    },

    #[error("alias of an unknown {kind} method")]
    UnknownAliasTarget {
        type_name: TypeName,
        new_name: Name,
        old_name: Name,
        kind: MethodKind,
        location: Location,
    },

    #[error("invalid overload: {reason:?}")]
    InvalidOverload {
        type_name: TypeName,
        method: Name,
        reason: OverloadReason,
        location: Location,
    },

    #[error("expected {} type arguments, found {}", .params.len(), .args.len())]
    GenericArity {
        name: TypeName,
        /// The arguments as written.
        args: Vec<TypeExpr>,
        /// The target's declared parameters.
        params: Vec<TypeParam>,
        location: Location,
    },

    #[error("{variance} type parameter used in {position} position")]
    VarianceViolation {
        type_name: TypeName,
        param: Name,
        variance: Variance,
        position: Variance,
        member: VarianceSite,
        location: Location,
    },

    #[error("conflicting declarations")]
    DuplicateDeclaration {
        name: TypeName,
        conflict: ConflictReason,
        locations: Vec<Location>,
    },
}

impl DefinitionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DefinitionError::DuplicateDeclaration { .. } => ErrorCode::E0001,
            DefinitionError::UnresolvedType { .. } => ErrorCode::E1001,
            DefinitionError::UnresolvedSuperclass { .. } => ErrorCode::E1002,
            DefinitionError::UnresolvedSelfType { .. } => ErrorCode::E1003,
            DefinitionError::MixinTargetKind { .. } => ErrorCode::E2001,
            DefinitionError::SuperclassKind { .. } => ErrorCode::E2002,
            DefinitionError::CyclicAncestry { .. } => ErrorCode::E2003,
            DefinitionError::DuplicateMethod { .. } => ErrorCode::E3001,
            DefinitionError::DuplicateMixinMethod { .. } => ErrorCode::E3002,
            DefinitionError::RecursiveAlias { .. } => ErrorCode::E3003,
            DefinitionError::UnknownAliasTarget { .. } => ErrorCode::E3004,
            DefinitionError::InvalidOverload { .. } => ErrorCode::E3005,
            DefinitionError::GenericArity { .. } => ErrorCode::E4001,
            DefinitionError::VarianceViolation { .. } => ErrorCode::E4002,
        }
    }

    /// Primary location of the error.
    pub fn location(&self) -> Location {
        match self {
            DefinitionError::UnresolvedType { location, .. }
            | DefinitionError::UnresolvedSuperclass { location, .. }
            | DefinitionError::UnresolvedSelfType { location, .. }
            | DefinitionError::SuperclassKind { location, .. }
            | DefinitionError::UnknownAliasTarget { location, .. }
            | DefinitionError::InvalidOverload { location, .. }
            | DefinitionError::GenericArity { location, .. }
            | DefinitionError::VarianceViolation { location, .. } => *location,
            DefinitionError::MixinTargetKind { mixin, .. } => mixin.location,
            DefinitionError::CyclicAncestry { cycle } => cycle_primary(cycle),
            DefinitionError::DuplicateMethod { locations, .. }
            | DefinitionError::DuplicateDeclaration { locations, .. } => {
                second_or_first(locations)
            }
            DefinitionError::DuplicateMixinMethod { mixins, .. } => {
                mixins.get(1).or(mixins.first()).map_or(Location::DUMMY, |m| m.location)
            }
            DefinitionError::RecursiveAlias { cycle, .. } => {
                cycle.first().map_or(Location::DUMMY, |a| a.location)
            }
        }
    }

    /// Convert to a diagnostic with names rendered through `interner`.
    #[cold]
    pub fn to_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        let ty = |name: &TypeName| name.display(interner).to_string();
        let id = |name: Name| interner.lookup(name);
        let diag = Diagnostic::error(self.code());

        match self {
            DefinitionError::UnresolvedType { name, location } => diag
                .with_message(format!("cannot find type `{}`", ty(name)))
                .with_label(*location, "not found in the environment"),

            DefinitionError::UnresolvedSuperclass {
                type_name,
                super_name,
                location,
            } => diag
                .with_message(format!(
                    "cannot find superclass `{}` of `{}`",
                    ty(super_name),
                    ty(type_name)
                ))
                .with_label(*location, "not found in the environment"),

            DefinitionError::UnresolvedSelfType {
                module,
                self_type,
                location,
            } => diag
                .with_message(format!(
                    "cannot find self type `{}` of module `{}`",
                    ty(self_type),
                    ty(module)
                ))
                .with_label(*location, "not found in the environment"),

            DefinitionError::MixinTargetKind {
                type_name,
                mixin,
                target_kind,
            } => {
                let note = match mixin.kind {
                    MixinKind::Prepend => "only modules can be prepended",
                    MixinKind::Include if type_name.is_interface() => {
                        "interfaces can only include interfaces"
                    }
                    MixinKind::Include | MixinKind::Extend => {
                        "only modules and interfaces can be mixed in"
                    }
                };
                diag.with_message(format!(
                    "cannot {} {} `{}` in `{}`",
                    mixin.kind,
                    target_kind,
                    ty(&mixin.name),
                    ty(type_name)
                ))
                .with_label(mixin.location, format!("`{}` is a {target_kind}", ty(&mixin.name)))
                .with_note(note)
            }

            DefinitionError::SuperclassKind {
                type_name,
                super_name,
                found,
                location,
            } => diag
                .with_message(format!(
                    "superclass `{}` of `{}` is a {found}, not a class",
                    ty(super_name),
                    ty(type_name)
                ))
                .with_label(*location, format!("this is a {found}")),

            DefinitionError::CyclicAncestry { cycle } => {
                let path: Vec<String> = cycle
                    .iter()
                    .map(|entry| entry.ancestor.describe(interner))
                    .collect();
                let mut diag = diag
                    .with_message(format!("cyclic ancestry: {}", path.join(" -> ")))
                    .with_label(cycle_primary(cycle), "cycle closes here");
                for entry in cycle.iter().skip(1).take(cycle.len().saturating_sub(2)) {
                    diag = diag.with_secondary_label(
                        entry.location,
                        format!("through `{}`", entry.ancestor.describe(interner)),
                    );
                }
                diag
            }

            DefinitionError::DuplicateMethod {
                type_name,
                method,
                kind,
                locations,
            } => {
                let mut diag = diag
                    .with_message(format!(
                        "duplicate {kind} method `{}` in `{}`",
                        id(*method),
                        ty(type_name)
                    ))
                    .with_label(second_or_first(locations), "defined again here");
                if let Some(first) = locations.first() {
                    diag = diag.with_secondary_label(*first, "first defined here");
                }
                for extra in locations.iter().skip(2) {
                    diag = diag.with_secondary_label(*extra, "also defined here");
                }
                diag.with_note("use `def m: ... | ...` to add overloads to an existing method")
            }

            DefinitionError::DuplicateMixinMethod {
                type_name,
                method,
                kind,
                mixins,
            } => {
                let names: Vec<String> = mixins.iter().map(|m| format!("`{}`", ty(&m.name))).collect();
                let mut diag = diag.with_message(format!(
                    "{kind} method `{}` of `{}` is provided by {}",
                    id(*method),
                    ty(type_name),
                    names.join(" and ")
                ));
                for (i, mixin) in mixins.iter().enumerate() {
                    let message = format!("`{}` provides `{}`", ty(&mixin.name), id(*method));
                    diag = if i == 1 {
                        diag.with_label(mixin.location, message)
                    } else {
                        diag.with_secondary_label(mixin.location, message)
                    };
                }
                diag.with_note(format!(
                    "define `{}` in `{}` to resolve the conflict",
                    id(*method),
                    ty(type_name)
                ))
            }

            DefinitionError::RecursiveAlias { type_name, cycle } => {
                let start = cycle.first().map_or("", |a| id(a.new_name));
                let mut diag = diag.with_message(format!(
                    "alias `{start}` in `{}` refers back to itself",
                    ty(type_name)
                ));
                for (i, site) in cycle.iter().enumerate() {
                    let message = format!("`{}` aliases `{}`", id(site.new_name), id(site.old_name));
                    diag = if i == 0 {
                        diag.with_label(site.location, message)
                    } else {
                        diag.with_secondary_label(site.location, message)
                    };
                }
                diag
            }

            DefinitionError::UnknownAliasTarget {
                type_name,
                new_name,
                old_name,
                kind,
                location,
            } => diag
                .with_message(format!(
                    "cannot alias `{}` to unknown {kind} method `{}` in `{}`",
                    id(*new_name),
                    id(*old_name),
                    ty(type_name)
                ))
                .with_label(*location, format!("`{}` is not defined", id(*old_name))),

            DefinitionError::InvalidOverload {
                type_name,
                method,
                reason,
                location,
            } => match reason {
                OverloadReason::NoArms => diag
                    .with_message(format!(
                        "method `{}` of `{}` has no overloads",
                        id(*method),
                        ty(type_name)
                    ))
                    .with_label(*location, "declared without a signature"),
                OverloadReason::NothingToOverload => diag
                    .with_message(format!(
                        "`{}` in `{}` has no definition to overload",
                        id(*method),
                        ty(type_name)
                    ))
                    .with_label(*location, "`...` extends nothing"),
            },

            DefinitionError::GenericArity {
                name,
                args,
                params,
                location,
            } => {
                let expected: Vec<&str> = params.iter().map(|p| id(p.name)).collect();
                let diag = diag
                    .with_message(format!(
                        "`{}` expects {} type argument{}, found {}",
                        ty(name),
                        params.len(),
                        if params.len() == 1 { "" } else { "s" },
                        args.len()
                    ))
                    .with_label(*location, format!("{} supplied", args.len()));
                if expected.is_empty() {
                    diag.with_note(format!("`{}` is not generic", ty(name)))
                } else {
                    diag.with_note(format!("expected `{}[{}]`", ty(name), expected.join(", ")))
                }
            }

            DefinitionError::VarianceViolation {
                type_name,
                param,
                variance,
                position,
                member,
                location,
            } => {
                let site = match member {
                    VarianceSite::Method(name) => format!("method `{}`", id(*name)),
                    VarianceSite::Attribute(name) => format!("attribute `{}`", id(*name)),
                    VarianceSite::InstanceVariable(name) => {
                        format!("instance variable `{}`", id(*name))
                    }
                    VarianceSite::Superclass(name) => format!("superclass `{}`", ty(name)),
                    VarianceSite::Mixin(name) => format!("mixin `{}`", ty(name)),
                };
                diag.with_message(format!(
                    "{variance} type parameter `{}` of `{}` used in {position} position",
                    id(*param),
                    ty(type_name)
                ))
                .with_label(*location, format!("in {site}"))
                .with_note("mark the parameter `unchecked` to opt out of variance checks")
            }

            DefinitionError::DuplicateDeclaration {
                name,
                conflict,
                locations,
            } => {
                let mut diag = diag
                    .with_message(format!(
                        "conflicting declarations of `{}`: {}",
                        ty(name),
                        conflict.describe()
                    ))
                    .with_label(second_or_first(locations), "conflicting declaration");
                for loc in locations.iter().filter(|&&l| l != second_or_first(locations)) {
                    diag = diag.with_secondary_label(*loc, "also declared here");
                }
                diag
            }
        }
    }
}

/// The repeated entry closing a cycle.
fn cycle_primary(cycle: &[AncestorEntry]) -> Location {
    cycle.last().map_or(Location::DUMMY, |entry| entry.location)
}

fn second_or_first(locations: &[Location]) -> Location {
    locations
        .get(1)
        .or(locations.first())
        .copied()
        .unwrap_or(Location::DUMMY)
}
