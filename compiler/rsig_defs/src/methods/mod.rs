//! Method table building.
//!
//! Folds a resolved ancestor list into one table of methods and instance
//! variables. Each distinct ancestor becomes a *layer*: the members of its
//! body that live on the ancestor's side, with the body's type parameters
//! replaced by the arguments the ancestor was applied with.
//!
//! Layers are visited in precedence order. The first layer defining a name
//! wins; every later definition of the name is kept as a shadowed
//! [`SuperMethod`].
//!
//! # Checks
//!
//! While collecting layers, each body is checked for:
//! - mixin directives whose target has the wrong kind
//! - two non-overloading definitions of one name
//! - one name provided by two interface mixins, taken from different
//!   declaring interfaces, and not defined by the body itself

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use rsig_ir::{
    Alias, AttributeAccessor, DeclarationKind, FunctionType, IvarName, Location, Member,
    MethodArm, MethodDefinition, MethodKind, Mixin, MixinKind, Name, StringInterner, TypeName,
    Visibility,
};

use crate::ancestors::{Ancestor, AncestorEntry, AncestorResolver, Ancestors};
use crate::definition::{DefinedArm, DefinedIvar, DefinedMethod, DefinitionKind, SuperMethod};
use crate::env::{DeclarationEntry, Environment};
use crate::error::{AliasSite, DefinitionError, MixinSite, OverloadReason};
use crate::subst::Subst;

/// Methods and instance variables of one definition.
#[derive(Debug, Default)]
pub(crate) struct MethodTable {
    pub methods: BTreeMap<Name, DefinedMethod>,
    pub instance_variables: BTreeMap<Name, DefinedIvar>,
}

/// Build the table for `ancestors`.
pub(crate) fn build_table(
    env: &Environment,
    resolver: &AncestorResolver<'_>,
    ancestors: &Ancestors,
) -> Result<MethodTable, DefinitionError> {
    let interner = env.interner();
    let mut seen = FxHashSet::default();
    let mut layers = Vec::new();

    for entry in ancestors.iter() {
        if !seen.insert(&entry.ancestor) {
            continue;
        }
        if misplaced_mixin(env, entry) {
            // Reported by the body holding the directive.
            continue;
        }
        let layer = Layer::collect(env, entry)?;
        layer.check_mixins(env)?;
        layer.check_duplicates()?;
        layer.check_interface_mixins(env, resolver)?;
        tracing::trace!(
            ancestor = %entry.ancestor.describe(interner),
            names = layer.order.len(),
            "folded ancestor"
        );
        layers.push(layer);
    }

    let method_kind = match ancestors.kind {
        DefinitionKind::Singleton => MethodKind::Singleton,
        DefinitionKind::Instance | DefinitionKind::Interface => MethodKind::Instance,
    };

    let mut table = MethodTable::default();
    let mut lookup = Lookup {
        layers: &layers,
        memo: FxHashMap::default(),
    };

    for (i, layer) in layers.iter().enumerate() {
        for &name in &layer.order {
            let Some(resolved) = lookup.resolve(i, name, &mut Vec::new())? else {
                continue;
            };
            match table.methods.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(DefinedMethod {
                        name,
                        kind: method_kind,
                        visibility: resolved.visibility,
                        arms: resolved.arms,
                        defined_in: resolved.defined_in,
                        alias_of: resolved.alias_of,
                        location: resolved.location,
                        shadowed: Vec::new(),
                    });
                }
                Entry::Occupied(mut slot) => slot.get_mut().shadowed.push(SuperMethod {
                    defined_in: resolved.defined_in,
                    visibility: resolved.visibility,
                    arms: resolved.arms,
                    location: resolved.location,
                }),
            }
        }
        layer.collect_ivars(&mut table.instance_variables);
    }

    Ok(table)
}

/// A class or type alias reached through a mixin directive. Such an entry
/// contributes nothing; the directive itself is rejected by
/// [`Layer::check_mixins`].
fn misplaced_mixin(env: &Environment, entry: &AncestorEntry) -> bool {
    entry.origin.is_mixin()
        && env
            .lookup(entry.ancestor.name())
            .is_some_and(|decl| !(decl.is_module() || decl.is_interface()))
}

/// A member that defines a method name on a layer's side.
#[derive(Copy, Clone)]
enum OwnDef<'e> {
    Method {
        def: &'e MethodDefinition,
        visibility: Visibility,
    },
    Reader(&'e AttributeAccessor),
    Writer(&'e AttributeAccessor),
    Alias(&'e Alias),
}

impl OwnDef<'_> {
    fn location(&self) -> Location {
        match self {
            OwnDef::Method { def, .. } => def.location,
            OwnDef::Reader(attr) | OwnDef::Writer(attr) => attr.location,
            OwnDef::Alias(alias) => alias.location,
        }
    }

    fn is_overloading(&self) -> bool {
        matches!(self, OwnDef::Method { def, .. } if def.overloading)
    }
}

struct Layer<'e> {
    decl: &'e DeclarationEntry,
    interner: &'e StringInterner,
    side: DefinitionKind,
    subst: Subst,
    defs: FxHashMap<Name, Vec<OwnDef<'e>>>,
    /// Defined names, in order of first definition.
    order: Vec<Name>,
}

impl<'e> Layer<'e> {
    fn collect(env: &'e Environment, entry: &AncestorEntry) -> Result<Self, DefinitionError> {
        let name = entry.ancestor.name();
        let Some(decl) = env.lookup(name) else {
            return Err(DefinitionError::UnresolvedType {
                name: name.clone(),
                location: entry.location,
            });
        };
        let side = entry.ancestor.kind();
        let interner = env.interner();
        let mut layer = Layer {
            decl,
            interner,
            side,
            subst: Subst::new(decl.type_params(), entry.ancestor.args()),
            defs: FxHashMap::default(),
            order: Vec::new(),
        };

        let singleton = side == DefinitionKind::Singleton;
        let on_side = |kind: MethodKind| {
            if singleton {
                kind.on_singleton()
            } else {
                kind.on_instance()
            }
        };

        for member in decl.members() {
            match member {
                Member::Method(def) if on_side(def.kind) => {
                    let visibility = if !singleton && def.kind == MethodKind::SingletonInstance {
                        Visibility::Private
                    } else {
                        def.visibility
                    };
                    layer.push(def.name, OwnDef::Method { def, visibility });
                }
                Member::Attribute(attr) if attr.singleton == singleton => {
                    if attr.kind.has_reader() {
                        layer.push(attr.name, OwnDef::Reader(attr));
                    }
                    if attr.kind.has_writer() {
                        layer.push(writer_name(interner, attr.name), OwnDef::Writer(attr));
                    }
                }
                Member::Alias(alias) if on_side(alias.kind) => {
                    layer.push(alias.new_name, OwnDef::Alias(alias));
                }
                _ => {}
            }
        }
        Ok(layer)
    }

    fn push(&mut self, name: Name, def: OwnDef<'e>) {
        let defs = self.defs.entry(name).or_default();
        if defs.is_empty() {
            self.order.push(name);
        }
        defs.push(def);
    }

    fn owner(&self) -> &'e TypeName {
        self.decl.name()
    }

    fn method_kind(&self) -> MethodKind {
        if self.side == DefinitionKind::Singleton {
            MethodKind::Singleton
        } else {
            MethodKind::Instance
        }
    }

    /// The mixin directives that act on this layer's side.
    fn side_mixins(&self) -> impl Iterator<Item = (MixinKind, &'e Mixin)> {
        let side = self.side;
        let decl: &'e DeclarationEntry = self.decl;
        decl.members()
            .iter()
            .filter_map(Member::as_mixin)
            .filter(move |(kind, _)| match side {
                DefinitionKind::Singleton => *kind == MixinKind::Extend,
                DefinitionKind::Instance => *kind != MixinKind::Extend,
                DefinitionKind::Interface => *kind == MixinKind::Include,
            })
    }

    /// Include/Extend take modules or interfaces, Prepend takes modules,
    /// and interfaces only include interfaces.
    fn check_mixins(&self, env: &Environment) -> Result<(), DefinitionError> {
        for (kind, mixin) in self.side_mixins() {
            let Some(target) = env.lookup(&mixin.name) else {
                return Err(DefinitionError::UnresolvedType {
                    name: mixin.name.clone(),
                    location: mixin.location,
                });
            };
            let target_kind = target.kind();
            let allowed = if self.decl.is_interface() {
                target_kind == DeclarationKind::Interface
            } else {
                match kind {
                    MixinKind::Include | MixinKind::Extend => matches!(
                        target_kind,
                        DeclarationKind::Module | DeclarationKind::Interface
                    ),
                    MixinKind::Prepend => target_kind == DeclarationKind::Module,
                }
            };
            if !allowed {
                return Err(DefinitionError::MixinTargetKind {
                    type_name: self.owner().clone(),
                    mixin: MixinSite {
                        kind,
                        name: mixin.name.clone(),
                        location: mixin.location,
                    },
                    target_kind,
                });
            }
        }
        Ok(())
    }

    fn check_duplicates(&self) -> Result<(), DefinitionError> {
        for name in &self.order {
            let Some(defs) = self.defs.get(name) else {
                continue;
            };
            let locations: Vec<Location> = defs
                .iter()
                .filter(|d| !d.is_overloading())
                .map(OwnDef::location)
                .collect();
            if locations.len() > 1 {
                return Err(DefinitionError::DuplicateMethod {
                    type_name: self.owner().clone(),
                    method: *name,
                    kind: self.method_kind(),
                    locations,
                });
            }
        }
        Ok(())
    }

    /// Two interface mixins of this body may not both provide a method the
    /// body leaves undefined, unless both take it from the same declaring
    /// interface.
    fn check_interface_mixins(
        &self,
        env: &Environment,
        resolver: &AncestorResolver<'_>,
    ) -> Result<(), DefinitionError> {
        let mut providers: FxHashMap<Name, Vec<(Ancestor, MixinSite)>> = FxHashMap::default();
        let mut order = Vec::new();
        let mut counted: Vec<&TypeName> = Vec::new();

        for (kind, mixin) in self.side_mixins() {
            if kind == MixinKind::Prepend || counted.contains(&&mixin.name) {
                continue;
            }
            let Some(target) = env.lookup(&mixin.name).filter(|t| t.is_interface()) else {
                continue;
            };
            counted.push(&mixin.name);

            // Each name maps to the nearest ancestor of the mixin declaring it.
            let ancestors = resolver.ancestors(&mixin.name, DefinitionKind::Interface)?;
            let subst = Subst::new(target.type_params(), &mixin.args);
            let mut provided: FxHashMap<Name, Ancestor> = FxHashMap::default();
            for entry in ancestors.iter() {
                let layer = Layer::collect(env, entry)?;
                for name in layer.order {
                    provided
                        .entry(name)
                        .or_insert_with(|| entry.ancestor.substitute(&subst));
                }
            }
            let mut provided: Vec<(Name, Ancestor)> = provided.into_iter().collect();
            provided.sort_unstable_by_key(|(name, _)| *name);

            for (name, declared_in) in provided {
                let sites = providers.entry(name).or_default();
                if sites.is_empty() {
                    order.push(name);
                }
                sites.push((
                    declared_in,
                    MixinSite {
                        kind,
                        name: mixin.name.clone(),
                        location: mixin.location,
                    },
                ));
            }
        }

        for name in order {
            if self.defs.contains_key(&name) {
                continue;
            }
            let Some(sites) = providers.remove(&name) else {
                continue;
            };
            let distinct = sites
                .first()
                .is_some_and(|(first, _)| sites.iter().any(|(other, _)| other != first));
            if distinct {
                return Err(DefinitionError::DuplicateMixinMethod {
                    type_name: self.owner().clone(),
                    method: name,
                    kind: self.method_kind(),
                    mixins: sites.into_iter().map(|(_, site)| site).collect(),
                });
            }
        }
        Ok(())
    }

    /// Instance variables on this layer's side, first definition wins.
    fn collect_ivars(&self, ivars: &mut BTreeMap<Name, DefinedIvar>) {
        let interner = self.interner;
        let singleton = self.side == DefinitionKind::Singleton;
        for member in self.decl.members() {
            let (name, ty, location) = match member {
                Member::InstanceVariable(ivar) if ivar.singleton == singleton => {
                    (ivar.name, &ivar.ty, ivar.location)
                }
                Member::Attribute(attr) if attr.singleton == singleton => {
                    let name = match attr.ivar {
                        IvarName::Default => {
                            interner.intern(&format!("@{}", interner.lookup(attr.name)))
                        }
                        IvarName::Named(name) => name,
                        IvarName::None => continue,
                    };
                    (name, &attr.ty, attr.location)
                }
                _ => continue,
            };
            ivars.entry(name).or_insert_with(|| DefinedIvar {
                name,
                ty: self.subst.apply(ty),
                defined_in: self.owner().clone(),
                location,
            });
        }
    }

    fn arms(&self, arms: &[MethodArm]) -> Vec<DefinedArm> {
        arms.iter()
            .map(|arm| DefinedArm {
                arm: self.subst.apply_arm(arm, self.interner),
                defined_in: self.owner().clone(),
            })
            .collect()
    }
}

fn writer_name(interner: &StringInterner, name: Name) -> Name {
    interner.intern(&format!("{}=", interner.lookup(name)))
}

/// A method as seen from one layer, after overloads and aliases.
#[derive(Clone)]
struct Resolved {
    visibility: Visibility,
    arms: Vec<DefinedArm>,
    defined_in: TypeName,
    alias_of: Option<Name>,
    location: Location,
}

/// Memoized per-layer method resolution.
struct Lookup<'l, 'e> {
    layers: &'l [Layer<'e>],
    memo: FxHashMap<(usize, Name), Resolved>,
}

/// Aliases being expanded, innermost last.
type AliasStack = Vec<(usize, Name, AliasSite)>;

impl Lookup<'_, '_> {
    /// The method `name` as defined by layer `i`, or `None` if that layer
    /// does not define it.
    fn resolve(
        &mut self,
        i: usize,
        name: Name,
        aliases: &mut AliasStack,
    ) -> Result<Option<Resolved>, DefinitionError> {
        if let Some(done) = self.memo.get(&(i, name)) {
            return Ok(Some(done.clone()));
        }
        let layers = self.layers;
        let layer = &layers[i];
        let Some(defs) = layer.defs.get(&name) else {
            return Ok(None);
        };

        let overloads: Vec<&MethodDefinition> = defs
            .iter()
            .filter_map(|d| match d {
                OwnDef::Method { def, .. } if def.overloading => Some(*def),
                _ => None,
            })
            .collect();

        let base = match defs.iter().find(|d| !d.is_overloading()) {
            Some(OwnDef::Method { def, visibility }) => Resolved {
                visibility: *visibility,
                arms: layer.arms(&def.arms),
                defined_in: layer.owner().clone(),
                alias_of: None,
                location: def.location,
            },
            Some(OwnDef::Reader(attr)) => {
                let arm = MethodArm::new(FunctionType::new(vec![], attr.ty.clone()), attr.location);
                Resolved {
                    visibility: attr.visibility,
                    arms: layer.arms(&[arm]),
                    defined_in: layer.owner().clone(),
                    alias_of: None,
                    location: attr.location,
                }
            }
            Some(OwnDef::Writer(attr)) => {
                let function = FunctionType::new(vec![attr.ty.clone()], attr.ty.clone());
                Resolved {
                    visibility: attr.visibility,
                    arms: layer.arms(&[MethodArm::new(function, attr.location)]),
                    defined_in: layer.owner().clone(),
                    alias_of: None,
                    location: attr.location,
                }
            }
            Some(OwnDef::Alias(alias)) => self.expand_alias(i, name, alias, aliases)?,
            None => {
                let location = overloads.first().map_or(Location::DUMMY, |d| d.location);
                let Some(next) = self.lookup_from(i + 1, name, aliases)? else {
                    return Err(DefinitionError::InvalidOverload {
                        type_name: layer.owner().clone(),
                        method: name,
                        reason: OverloadReason::NothingToOverload,
                        location,
                    });
                };
                Resolved {
                    defined_in: layer.owner().clone(),
                    alias_of: None,
                    location,
                    ..next
                }
            }
        };

        let resolved = if overloads.is_empty() {
            base
        } else {
            // Later overloads take precedence over earlier ones, and all of
            // them over the definition they extend.
            let mut arms: Vec<DefinedArm> = overloads
                .iter()
                .rev()
                .flat_map(|def| layer.arms(&def.arms))
                .collect();
            arms.extend(base.arms);
            Resolved { arms, ..base }
        };

        self.memo.insert((i, name), resolved.clone());
        Ok(Some(resolved))
    }

    /// Search layers `start..` for `name`.
    fn lookup_from(
        &mut self,
        start: usize,
        name: Name,
        aliases: &mut AliasStack,
    ) -> Result<Option<Resolved>, DefinitionError> {
        for j in start..self.layers.len() {
            if let Some(found) = self.resolve(j, name, aliases)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// The target of `alias` is looked up from the alias's own layer down.
    fn expand_alias(
        &mut self,
        i: usize,
        name: Name,
        alias: &Alias,
        aliases: &mut AliasStack,
    ) -> Result<Resolved, DefinitionError> {
        let layers = self.layers;
        let owner = layers[i].owner();
        if let Some(pos) = aliases.iter().position(|(j, n, _)| *j == i && *n == name) {
            return Err(DefinitionError::RecursiveAlias {
                type_name: owner.clone(),
                cycle: aliases[pos..].iter().map(|(_, _, site)| site.clone()).collect(),
            });
        }

        aliases.push((
            i,
            name,
            AliasSite {
                type_name: owner.clone(),
                new_name: alias.new_name,
                old_name: alias.old_name,
                location: alias.location,
            },
        ));
        let target = self.lookup_from(i, alias.old_name, aliases);
        aliases.pop();

        let Some(target) = target? else {
            return Err(DefinitionError::UnknownAliasTarget {
                type_name: owner.clone(),
                new_name: alias.new_name,
                old_name: alias.old_name,
                kind: alias.kind,
                location: alias.location,
            });
        };
        Ok(Resolved {
            visibility: target.visibility,
            arms: target.arms,
            defined_in: owner.clone(),
            alias_of: Some(alias.old_name),
            location: alias.location,
        })
    }
}
