//! Ancestor resolution.
//!
//! Computes the linearized ancestor list of a type: the order in which
//! method lookup visits bodies, highest precedence first.
//!
//! # Ordering
//!
//! - Instance side of `T`: prepended modules (last declared first), `T`,
//!   included modules and interfaces (last declared first), then the
//!   superclass's instance ancestors.
//! - Singleton side: `singleton(T)`, extended modules (last declared first),
//!   the superclass's singleton ancestors, and at the root the metaclass.
//! - Interface: the interface, then included interfaces (last declared first).
//!
//! Every mixin contributes its own full list, with its type parameters
//! replaced by the arguments written at the mixin site. Diamonds are kept
//! as-is; the method builder skips entries it has already folded.
//!
//! Lists are computed with generic arguments left as the type's own
//! parameters, cached per (name, side), and specialized by substitution at
//! each use.

use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use rsig_ir::{Location, Member, Mixin, StringInterner, TypeExpr, TypeName, TypeParam};

use crate::definition::DefinitionKind;
use crate::env::{DeclarationEntry, Environment};
use crate::error::DefinitionError;
use crate::stack::ensure_sufficient_stack;
use crate::subst::Subst;

/// One ancestor, identified by name and applied arguments.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Ancestor {
    Instance { name: TypeName, args: Vec<TypeExpr> },
    Singleton { name: TypeName },
    Interface { name: TypeName, args: Vec<TypeExpr> },
}

impl Ancestor {
    pub fn name(&self) -> &TypeName {
        match self {
            Ancestor::Instance { name, .. }
            | Ancestor::Singleton { name }
            | Ancestor::Interface { name, .. } => name,
        }
    }

    pub fn args(&self) -> &[TypeExpr] {
        match self {
            Ancestor::Instance { args, .. } | Ancestor::Interface { args, .. } => args,
            Ancestor::Singleton { .. } => &[],
        }
    }

    /// The definition side this ancestor's members are read from.
    pub fn kind(&self) -> DefinitionKind {
        match self {
            Ancestor::Instance { .. } => DefinitionKind::Instance,
            Ancestor::Singleton { .. } => DefinitionKind::Singleton,
            Ancestor::Interface { .. } => DefinitionKind::Interface,
        }
    }

    /// `::Foo`, `singleton(::Foo)`, or `::_Each` with an argument count.
    pub fn describe(&self, interner: &StringInterner) -> String {
        let name = self.name().display(interner);
        match self {
            Ancestor::Singleton { .. } => format!("singleton({name})"),
            _ if self.args().is_empty() => name.to_string(),
            _ => format!("{name}[{}]", self.args().len()),
        }
    }

    #[must_use]
    pub(crate) fn substitute(&self, subst: &Subst) -> Ancestor {
        match self {
            Ancestor::Instance { name, args } => Ancestor::Instance {
                name: name.clone(),
                args: subst.apply_all(args),
            },
            Ancestor::Singleton { name } => Ancestor::Singleton { name: name.clone() },
            Ancestor::Interface { name, args } => Ancestor::Interface {
                name: name.clone(),
                args: subst.apply_all(args),
            },
        }
    }
}

/// How an ancestor entered the list.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AncestorOrigin {
    /// The type itself.
    Own,
    Superclass,
    Include,
    Prepend,
    Extend,
    /// Implicit superclass or metaclass.
    Implicit,
}

impl AncestorOrigin {
    /// Entered through an include, prepend or extend directive.
    pub fn is_mixin(self) -> bool {
        matches!(
            self,
            AncestorOrigin::Include | AncestorOrigin::Prepend | AncestorOrigin::Extend
        )
    }
}

/// An ancestor plus where it was referenced and why.
///
/// Identity for de-duplication is [`AncestorEntry::ancestor`] alone.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AncestorEntry {
    pub ancestor: Ancestor,
    pub location: Location,
    pub origin: AncestorOrigin,
}

impl AncestorEntry {
    pub fn new(ancestor: Ancestor, location: Location, origin: AncestorOrigin) -> Self {
        AncestorEntry {
            ancestor,
            location,
            origin,
        }
    }

    /// Same ancestor, ignoring location and origin.
    pub fn same_ancestor(&self, other: &AncestorEntry) -> bool {
        self.ancestor == other.ancestor
    }
}

/// Ordered ancestors of one type and side.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Ancestors {
    pub type_name: TypeName,
    pub kind: DefinitionKind,
    entries: Vec<AncestorEntry>,
}

impl Ancestors {
    pub fn entries(&self) -> &[AncestorEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AncestorEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, ancestor: &Ancestor) -> bool {
        self.entries.iter().any(|e| &e.ancestor == ancestor)
    }

    /// Index of the first occurrence of `ancestor`.
    pub fn position(&self, ancestor: &Ancestor) -> Option<usize> {
        self.entries.iter().position(|e| &e.ancestor == ancestor)
    }

    /// Ancestor names in order, duplicates included.
    pub fn names(&self) -> impl Iterator<Item = &TypeName> {
        self.entries.iter().map(|e| e.ancestor.name())
    }
}

/// Resolved root types consulted when a declaration leaves them implicit.
#[derive(Clone, Debug, Default)]
pub(crate) struct AncestorRoots {
    pub implicit_superclass: Option<TypeName>,
    pub class_metaclass: Option<TypeName>,
    pub module_metaclass: Option<TypeName>,
}

pub(crate) type AncestorCache =
    DashMap<(TypeName, DefinitionKind), Arc<Ancestors>, FxBuildHasher>;

/// A superclass reference after existence and kind checks.
struct SuperRef<'a> {
    name: TypeName,
    args: Vec<TypeExpr>,
    params: &'a [TypeParam],
    location: Location,
    origin: AncestorOrigin,
}

pub(crate) struct AncestorResolver<'a> {
    env: &'a Environment,
    roots: &'a AncestorRoots,
    cache: &'a AncestorCache,
    memoize: bool,
}

impl<'a> AncestorResolver<'a> {
    pub fn new(
        env: &'a Environment,
        roots: &'a AncestorRoots,
        cache: &'a AncestorCache,
        memoize: bool,
    ) -> Self {
        AncestorResolver {
            env,
            roots,
            cache,
            memoize,
        }
    }

    /// Ancestors of `name` from the `kind` side.
    ///
    /// Instance and singleton sides require a class or module; the
    /// interface side requires an interface.
    pub fn ancestors(
        &self,
        name: &TypeName,
        kind: DefinitionKind,
    ) -> Result<Arc<Ancestors>, DefinitionError> {
        let Some(entry) = self.env.lookup(name) else {
            return Err(DefinitionError::UnresolvedType {
                name: name.clone(),
                location: Location::DUMMY,
            });
        };
        let own = own_ancestor(entry, kind);
        let root = AncestorEntry::new(own, entry.location(), AncestorOrigin::Own);
        let mut building = Vec::new();
        self.resolve(name, kind, root, &mut building)
    }

    fn resolve(
        &self,
        name: &TypeName,
        kind: DefinitionKind,
        reference: AncestorEntry,
        building: &mut Vec<AncestorEntry>,
    ) -> Result<Arc<Ancestors>, DefinitionError> {
        let key = (name.clone(), kind);
        if self.memoize {
            if let Some(cached) = self.cache.get(&key) {
                return Ok(Arc::clone(cached.value()));
            }
        }

        if let Some(pos) = building
            .iter()
            .position(|e| e.ancestor.name() == name && e.ancestor.kind() == kind)
        {
            let mut cycle = building[pos..].to_vec();
            cycle.push(reference);
            return Err(DefinitionError::CyclicAncestry { cycle });
        }

        let Some(entry) = self.env.lookup(name) else {
            return Err(DefinitionError::UnresolvedType {
                name: name.clone(),
                location: reference.location,
            });
        };

        let location = reference.location;
        building.push(reference);
        let entries = ensure_sufficient_stack(|| match (kind, entry) {
            (
                DefinitionKind::Instance,
                DeclarationEntry::Class(_) | DeclarationEntry::Module(_),
            ) => self.instance_entries(entry, building),
            (
                DefinitionKind::Singleton,
                DeclarationEntry::Class(_) | DeclarationEntry::Module(_),
            ) => self.singleton_entries(entry, building),
            (DefinitionKind::Interface, DeclarationEntry::Interface(_)) => {
                self.interface_entries(entry, building)
            }
            _ => Err(DefinitionError::UnresolvedType {
                name: name.clone(),
                location,
            }),
        });
        building.pop();

        let ancestors = Arc::new(Ancestors {
            type_name: name.clone(),
            kind,
            entries: entries?,
        });
        tracing::trace!(
            type_name = %name.display(self.env.interner()),
            %kind,
            len = ancestors.len(),
            "ancestors resolved"
        );

        if !self.memoize {
            return Ok(ancestors);
        }
        Ok(Arc::clone(self.cache.entry(key).or_insert(ancestors).value()))
    }

    fn instance_entries(
        &self,
        entry: &DeclarationEntry,
        building: &mut Vec<AncestorEntry>,
    ) -> Result<Vec<AncestorEntry>, DefinitionError> {
        let mut entries = Vec::new();

        for mixin in mixins(entry, |m| matches!(m, Member::Prepend(_))).rev() {
            entries.extend(self.mixin_entries(mixin, AncestorOrigin::Prepend, building)?);
        }

        entries.push(AncestorEntry::new(
            own_ancestor(entry, DefinitionKind::Instance),
            entry.location(),
            AncestorOrigin::Own,
        ));

        for mixin in mixins(entry, |m| matches!(m, Member::Include(_))).rev() {
            entries.extend(self.mixin_entries(mixin, AncestorOrigin::Include, building)?);
        }

        if let Some(sup) = self.super_ref(entry)? {
            let reference = AncestorEntry::new(
                Ancestor::Instance {
                    name: sup.name.clone(),
                    args: sup.args.clone(),
                },
                sup.location,
                sup.origin,
            );
            let resolved = self.resolve(&sup.name, DefinitionKind::Instance, reference, building)?;
            let subst = Subst::new(sup.params, &sup.args);
            entries.extend(specialize(&resolved, &subst, sup.origin, sup.location));
        }
        Ok(entries)
    }

    fn singleton_entries(
        &self,
        entry: &DeclarationEntry,
        building: &mut Vec<AncestorEntry>,
    ) -> Result<Vec<AncestorEntry>, DefinitionError> {
        let mut entries = vec![AncestorEntry::new(
            own_ancestor(entry, DefinitionKind::Singleton),
            entry.location(),
            AncestorOrigin::Own,
        )];

        for mixin in mixins(entry, |m| matches!(m, Member::Extend(_))).rev() {
            entries.extend(self.mixin_entries(mixin, AncestorOrigin::Extend, building)?);
        }

        if let Some(sup) = self.super_ref(entry)? {
            let reference = AncestorEntry::new(
                Ancestor::Singleton {
                    name: sup.name.clone(),
                },
                sup.location,
                sup.origin,
            );
            let resolved =
                self.resolve(&sup.name, DefinitionKind::Singleton, reference, building)?;
            entries.extend(specialize(&resolved, &Subst::default(), sup.origin, sup.location));
            return Ok(entries);
        }

        // Root of the singleton chain: the class object is an instance of
        // the metaclass.
        let metaclass = if entry.is_class() {
            self.roots.class_metaclass.as_ref()
        } else {
            self.roots.module_metaclass.as_ref()
        };
        if let Some(meta) = metaclass.filter(|meta| {
            self.env
                .lookup(meta)
                .is_some_and(|e| e.is_class() || e.is_module())
        }) {
            let reference = AncestorEntry::new(
                Ancestor::Instance {
                    name: meta.clone(),
                    args: Vec::new(),
                },
                entry.location(),
                AncestorOrigin::Implicit,
            );
            let resolved = self.resolve(meta, DefinitionKind::Instance, reference, building)?;
            entries.extend(specialize(
                &resolved,
                &Subst::default(),
                AncestorOrigin::Implicit,
                entry.location(),
            ));
        }
        Ok(entries)
    }

    fn interface_entries(
        &self,
        entry: &DeclarationEntry,
        building: &mut Vec<AncestorEntry>,
    ) -> Result<Vec<AncestorEntry>, DefinitionError> {
        let mut entries = vec![AncestorEntry::new(
            own_ancestor(entry, DefinitionKind::Interface),
            entry.location(),
            AncestorOrigin::Own,
        )];
        for mixin in mixins(entry, |m| matches!(m, Member::Include(_))).rev() {
            entries.extend(self.mixin_entries(mixin, AncestorOrigin::Include, building)?);
        }
        Ok(entries)
    }

    /// Entries contributed by one mixin directive.
    ///
    /// Modules and interfaces contribute their full lists. Classes and type
    /// aliases are not valid mixin targets; they are recorded as a bare
    /// entry, without an arity check, so the method builder can report the
    /// directive.
    fn mixin_entries(
        &self,
        mixin: &Mixin,
        origin: AncestorOrigin,
        building: &mut Vec<AncestorEntry>,
    ) -> Result<Vec<AncestorEntry>, DefinitionError> {
        let Some(target) = self.env.lookup(&mixin.name) else {
            return Err(DefinitionError::UnresolvedType {
                name: mixin.name.clone(),
                location: mixin.location,
            });
        };
        let (kind, ancestor) = match target {
            DeclarationEntry::Module(_) => (
                DefinitionKind::Instance,
                Ancestor::Instance {
                    name: mixin.name.clone(),
                    args: mixin.args.clone(),
                },
            ),
            DeclarationEntry::Interface(_) => (
                DefinitionKind::Interface,
                Ancestor::Interface {
                    name: mixin.name.clone(),
                    args: mixin.args.clone(),
                },
            ),
            DeclarationEntry::Class(_) | DeclarationEntry::TypeAlias(_) => {
                let bare = Ancestor::Instance {
                    name: mixin.name.clone(),
                    args: mixin.args.clone(),
                };
                return Ok(vec![AncestorEntry::new(bare, mixin.location, origin)]);
            }
        };
        check_arity(&mixin.name, target.type_params(), &mixin.args, mixin.location)?;

        let reference = AncestorEntry::new(ancestor, mixin.location, origin);
        let resolved = self.resolve(&mixin.name, kind, reference, building)?;
        let subst = Subst::new(target.type_params(), &mixin.args);
        Ok(specialize(&resolved, &subst, origin, mixin.location))
    }

    /// The declared superclass, or the implicit one, of a class.
    fn super_ref(
        &self,
        entry: &DeclarationEntry,
    ) -> Result<Option<SuperRef<'a>>, DefinitionError> {
        let DeclarationEntry::Class(class) = entry else {
            return Ok(None);
        };

        if let Some(sup) = &class.super_class {
            let Some(target) = self.env.lookup(&sup.name) else {
                return Err(DefinitionError::UnresolvedSuperclass {
                    type_name: class.name.clone(),
                    super_name: sup.name.clone(),
                    location: sup.location,
                });
            };
            if !target.is_class() {
                return Err(DefinitionError::SuperclassKind {
                    type_name: class.name.clone(),
                    super_name: sup.name.clone(),
                    found: target.kind(),
                    location: sup.location,
                });
            }
            check_arity(&sup.name, target.type_params(), &sup.args, sup.location)?;
            return Ok(Some(SuperRef {
                name: sup.name.clone(),
                args: sup.args.clone(),
                params: target.type_params(),
                location: sup.location,
                origin: AncestorOrigin::Superclass,
            }));
        }

        let Some(root) = &self.roots.implicit_superclass else {
            return Ok(None);
        };
        if root == &class.name || self.is_superclass_of(&class.name, root) {
            return Ok(None);
        }
        match self.env.lookup(root) {
            Some(target) if target.is_class() => {
                check_arity(root, target.type_params(), &[], entry.location())?;
                Ok(Some(SuperRef {
                    name: root.clone(),
                    args: Vec::new(),
                    params: target.type_params(),
                    location: entry.location(),
                    origin: AncestorOrigin::Implicit,
                }))
            }
            _ => Ok(None),
        }
    }
}

impl AncestorResolver<'_> {
    /// Whether `ancestor` appears in the declared superclass chain of `name`.
    ///
    /// Keeps a root class such as `BasicObject` from inheriting the implicit
    /// superclass that itself inherits from it.
    fn is_superclass_of(&self, ancestor: &TypeName, name: &TypeName) -> bool {
        let mut current = name;
        // A chain longer than the environment is cyclic; resolution reports it.
        for _ in 0..self.env.len() {
            let Some(sup) = self.env.lookup(current).and_then(DeclarationEntry::super_class) else {
                return false;
            };
            if &sup.name == ancestor {
                return true;
            }
            current = &sup.name;
        }
        false
    }
}

/// The entry a type contributes for itself, with its parameters as arguments.
fn own_ancestor(entry: &DeclarationEntry, kind: DefinitionKind) -> Ancestor {
    let name = entry.name().clone();
    let args = entry
        .type_params()
        .iter()
        .map(|p| TypeExpr::variable(p.name))
        .collect();
    match kind {
        DefinitionKind::Instance if entry.is_interface() => Ancestor::Interface { name, args },
        DefinitionKind::Instance => Ancestor::Instance { name, args },
        DefinitionKind::Singleton => Ancestor::Singleton { name },
        DefinitionKind::Interface => Ancestor::Interface { name, args },
    }
}

fn mixins<'e>(
    entry: &'e DeclarationEntry,
    pick: impl Fn(&Member) -> bool + 'e,
) -> impl DoubleEndedIterator<Item = &'e Mixin> + 'e {
    entry
        .members()
        .iter()
        .filter(move |m| pick(m))
        .filter_map(|m| m.as_mixin().map(|(_, mixin)| mixin))
}

/// Copy a generic list into a use site: substitute arguments, stamp the
/// origin, and point the list's own entry at the referencing location.
fn specialize(
    resolved: &Ancestors,
    subst: &Subst,
    origin: AncestorOrigin,
    site: Location,
) -> Vec<AncestorEntry> {
    resolved
        .iter()
        .map(|e| AncestorEntry {
            ancestor: e.ancestor.substitute(subst),
            location: if e.origin == AncestorOrigin::Own {
                site
            } else {
                e.location
            },
            origin,
        })
        .collect()
}

pub(crate) fn check_arity(
    name: &TypeName,
    params: &[TypeParam],
    args: &[TypeExpr],
    location: Location,
) -> Result<(), DefinitionError> {
    if params.len() == args.len() {
        return Ok(());
    }
    Err(DefinitionError::GenericArity {
        name: name.clone(),
        args: args.to_vec(),
        params: params.to_vec(),
        location,
    })
}

#[cfg(test)]
mod tests;
