//! The environment: every known type declaration, merged by name.
//!
//! Classes and modules may be declared piecewise; [`EnvironmentBuilder::add`]
//! folds the pieces into one [`DeclarationEntry`] per name. Once built the
//! environment is immutable and may be shared across threads.

use std::collections::BTreeMap;

use rsig_ir::{
    ClassDecl, Declaration, DeclarationKind, InterfaceDecl, Location, Member, ModuleDecl,
    ModuleSelfType, SharedInterner, StringInterner, SuperClass, TypeAliasDecl, TypeName,
    TypeParam,
};

use crate::error::{ConflictReason, DefinitionError};

/// A class, merged over every partial declaration.
#[derive(Clone, Debug)]
pub struct ClassEntry {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub super_class: Option<SuperClass>,
    /// Members of all partials, in insertion order.
    pub members: Vec<Member>,
    /// One location per partial declaration.
    pub locations: Vec<Location>,
}

/// A module, merged over every partial declaration.
#[derive(Clone, Debug)]
pub struct ModuleEntry {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub self_types: Vec<ModuleSelfType>,
    pub members: Vec<Member>,
    pub locations: Vec<Location>,
}

#[derive(Clone, Debug)]
pub enum DeclarationEntry {
    Class(ClassEntry),
    Module(ModuleEntry),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
}

impl DeclarationEntry {
    pub fn name(&self) -> &TypeName {
        match self {
            DeclarationEntry::Class(e) => &e.name,
            DeclarationEntry::Module(e) => &e.name,
            DeclarationEntry::Interface(d) => &d.name,
            DeclarationEntry::TypeAlias(d) => &d.name,
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        match self {
            DeclarationEntry::Class(_) => DeclarationKind::Class,
            DeclarationEntry::Module(_) => DeclarationKind::Module,
            DeclarationEntry::Interface(_) => DeclarationKind::Interface,
            DeclarationEntry::TypeAlias(_) => DeclarationKind::TypeAlias,
        }
    }

    pub fn type_params(&self) -> &[TypeParam] {
        match self {
            DeclarationEntry::Class(e) => &e.type_params,
            DeclarationEntry::Module(e) => &e.type_params,
            DeclarationEntry::Interface(d) => &d.type_params,
            DeclarationEntry::TypeAlias(d) => &d.type_params,
        }
    }

    pub fn members(&self) -> &[Member] {
        match self {
            DeclarationEntry::Class(e) => &e.members,
            DeclarationEntry::Module(e) => &e.members,
            DeclarationEntry::Interface(d) => &d.members,
            DeclarationEntry::TypeAlias(_) => &[],
        }
    }

    pub fn super_class(&self) -> Option<&SuperClass> {
        match self {
            DeclarationEntry::Class(e) => e.super_class.as_ref(),
            _ => None,
        }
    }

    pub fn self_types(&self) -> &[ModuleSelfType] {
        match self {
            DeclarationEntry::Module(e) => &e.self_types,
            _ => &[],
        }
    }

    /// Locations of every partial declaration.
    pub fn locations(&self) -> &[Location] {
        match self {
            DeclarationEntry::Class(e) => &e.locations,
            DeclarationEntry::Module(e) => &e.locations,
            DeclarationEntry::Interface(d) => std::slice::from_ref(&d.location),
            DeclarationEntry::TypeAlias(d) => std::slice::from_ref(&d.location),
        }
    }

    /// Location of the first partial declaration.
    pub fn location(&self) -> Location {
        self.locations().first().copied().unwrap_or(Location::DUMMY)
    }

    pub fn is_class(&self) -> bool {
        matches!(self, DeclarationEntry::Class(_))
    }

    pub fn is_module(&self) -> bool {
        matches!(self, DeclarationEntry::Module(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, DeclarationEntry::Interface(_))
    }
}

/// Accumulates declarations, merging partials of the same name.
pub struct EnvironmentBuilder {
    interner: SharedInterner,
    entries: BTreeMap<TypeName, DeclarationEntry>,
}

impl EnvironmentBuilder {
    pub fn new(interner: SharedInterner) -> Self {
        EnvironmentBuilder {
            interner,
            entries: BTreeMap::new(),
        }
    }

    /// Add one declaration.
    ///
    /// # Errors
    ///
    /// `DuplicateDeclaration` when `decl` cannot be merged with an earlier
    /// declaration of the same name. The environment is left unchanged.
    pub fn add(&mut self, decl: Declaration) -> Result<(), DefinitionError> {
        let name = decl.name().clone();
        let Some(existing) = self.entries.get_mut(&name) else {
            self.entries.insert(name, entry_of(decl));
            return Ok(());
        };

        let conflict = |conflict: ConflictReason, earlier: &[Location], new: Location| {
            let mut locations = earlier.to_vec();
            locations.push(new);
            DefinitionError::DuplicateDeclaration {
                name: name.clone(),
                conflict,
                locations,
            }
        };

        match (existing, decl) {
            (DeclarationEntry::Class(entry), Declaration::Class(decl)) => {
                let super_class = match (&entry.super_class, decl.super_class) {
                    (Some(a), Some(b)) if a.name != b.name || a.args != b.args => {
                        return Err(conflict(
                            ConflictReason::SuperclassMismatch,
                            &entry.locations,
                            decl.location,
                        ));
                    }
                    (Some(a), _) => Some(a.clone()),
                    (None, b) => b,
                };
                let Some(type_params) = merge_params(&entry.type_params, decl.type_params) else {
                    return Err(conflict(
                        ConflictReason::TypeParamsMismatch,
                        &entry.locations,
                        decl.location,
                    ));
                };
                entry.super_class = super_class;
                entry.type_params = type_params;
                entry.members.extend(decl.members);
                entry.locations.push(decl.location);
                Ok(())
            }
            (DeclarationEntry::Module(entry), Declaration::Module(decl)) => {
                let Some(type_params) = merge_params(&entry.type_params, decl.type_params) else {
                    return Err(conflict(
                        ConflictReason::TypeParamsMismatch,
                        &entry.locations,
                        decl.location,
                    ));
                };
                entry.type_params = type_params;
                entry.self_types.extend(decl.self_types);
                entry.members.extend(decl.members);
                entry.locations.push(decl.location);
                Ok(())
            }
            (existing, decl) => {
                let reason = if existing.kind() == decl.kind() {
                    ConflictReason::Redeclared
                } else {
                    ConflictReason::KindMismatch {
                        first: existing.kind(),
                        second: decl.kind(),
                    }
                };
                Err(conflict(reason, existing.locations(), decl.location()))
            }
        }
    }

    /// Add every declaration, stopping at the first conflict.
    pub fn extend(
        &mut self,
        decls: impl IntoIterator<Item = Declaration>,
    ) -> Result<(), DefinitionError> {
        for decl in decls {
            self.add(decl)?;
        }
        Ok(())
    }

    pub fn build(self) -> Environment {
        tracing::debug!(types = self.entries.len(), "environment built");
        Environment {
            interner: self.interner,
            entries: self.entries,
        }
    }
}

/// An empty list adopts the other; two non-empty lists must agree.
fn merge_params(existing: &[TypeParam], new: Vec<TypeParam>) -> Option<Vec<TypeParam>> {
    if new.is_empty() {
        return Some(existing.to_vec());
    }
    if existing.is_empty() {
        return Some(new);
    }
    let same = existing.len() == new.len()
        && existing
            .iter()
            .zip(&new)
            .all(|(a, b)| a.name == b.name && a.variance == b.variance && a.unchecked == b.unchecked);
    same.then(|| existing.to_vec())
}

fn entry_of(decl: Declaration) -> DeclarationEntry {
    match decl {
        Declaration::Class(ClassDecl {
            name,
            type_params,
            super_class,
            members,
            location,
        }) => DeclarationEntry::Class(ClassEntry {
            name,
            type_params,
            super_class,
            members,
            locations: vec![location],
        }),
        Declaration::Module(ModuleDecl {
            name,
            type_params,
            self_types,
            members,
            location,
        }) => DeclarationEntry::Module(ModuleEntry {
            name,
            type_params,
            self_types,
            members,
            locations: vec![location],
        }),
        Declaration::Interface(decl) => DeclarationEntry::Interface(decl),
        Declaration::TypeAlias(decl) => DeclarationEntry::TypeAlias(decl),
    }
}

/// Frozen set of declarations, keyed by name.
pub struct Environment {
    interner: SharedInterner,
    entries: BTreeMap<TypeName, DeclarationEntry>,
}

impl Environment {
    pub fn builder(interner: SharedInterner) -> EnvironmentBuilder {
        EnvironmentBuilder::new(interner)
    }

    /// Build an environment from declarations in one go.
    pub fn from_declarations(
        interner: SharedInterner,
        decls: impl IntoIterator<Item = Declaration>,
    ) -> Result<Self, DefinitionError> {
        let mut builder = EnvironmentBuilder::new(interner);
        builder.extend(decls)?;
        Ok(builder.build())
    }

    pub fn lookup(&self, name: &TypeName) -> Option<&DeclarationEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.entries.contains_key(name)
    }

    /// Every declared name, in a stable order.
    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("types", &self.entries.len())
            .finish_non_exhaustive()
    }
}
