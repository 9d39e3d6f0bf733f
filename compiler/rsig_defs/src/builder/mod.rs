//! The definition builder: resolve, build, validate.
//!
//! [`DefinitionBuilder`] borrows a frozen [`Environment`] and answers
//! requests for one type from one side. Every request runs the same
//! pipeline:
//!
//! 1. Resolve the ancestor list
//! 2. Fold it into a method table
//! 3. Validate the type's own declaration
//!
//! Any failure aborts the request; no partial definition is produced.
//! Results are memoized per (type, side) unless [`BuilderOptions::memoize`]
//! is off. The cache is insert-once, so concurrent builders of the same key
//! all observe the first stored definition.

use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;
use rustc_hash::FxBuildHasher;

use rsig_ir::{Location, TypeExpr, TypeName};

use crate::ancestors::{AncestorCache, AncestorResolver, AncestorRoots, Ancestors};
use crate::definition::{Definition, DefinitionKind};
use crate::env::{DeclarationEntry, Environment};
use crate::error::DefinitionError;
use crate::methods::build_table;
use crate::validate::validate;

type DefinitionCache = DashMap<(TypeName, DefinitionKind), Arc<Definition>, FxBuildHasher>;

/// Root types and caching behaviour of a [`DefinitionBuilder`].
///
/// Root types are given as paths and only take effect when the environment
/// declares them.
#[derive(Clone, Debug)]
pub struct BuilderOptions {
    /// Superclass of a class that declares none. Default `::Object`.
    pub implicit_superclass: Option<String>,
    /// Whose instance ancestors end the singleton chain of a class.
    /// Default `::Class`.
    pub class_metaclass: Option<String>,
    /// Same, for modules. Default `::Module`.
    pub module_metaclass: Option<String>,
    pub memoize: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        BuilderOptions {
            implicit_superclass: Some("::Object".to_string()),
            class_metaclass: Some("::Class".to_string()),
            module_metaclass: Some("::Module".to_string()),
            memoize: true,
        }
    }
}

impl BuilderOptions {
    #[must_use]
    pub fn implicit_superclass(mut self, path: Option<&str>) -> Self {
        self.implicit_superclass = path.map(str::to_string);
        self
    }

    #[must_use]
    pub fn class_metaclass(mut self, path: Option<&str>) -> Self {
        self.class_metaclass = path.map(str::to_string);
        self
    }

    #[must_use]
    pub fn module_metaclass(mut self, path: Option<&str>) -> Self {
        self.module_metaclass = path.map(str::to_string);
        self
    }

    #[must_use]
    pub fn memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }
}

/// Builds [`Definition`]s on demand from a frozen environment.
///
/// `Sync`: one builder may serve many threads.
pub struct DefinitionBuilder<'env> {
    env: &'env Environment,
    roots: AncestorRoots,
    memoize: bool,
    ancestor_cache: AncestorCache,
    definitions: DefinitionCache,
}

impl<'env> DefinitionBuilder<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self::with_options(env, BuilderOptions::default())
    }

    pub fn with_options(env: &'env Environment, options: BuilderOptions) -> Self {
        let interner = env.interner();
        let root = |path: Option<String>| path.map(|p| TypeName::parse(interner, &p));
        DefinitionBuilder {
            env,
            roots: AncestorRoots {
                implicit_superclass: root(options.implicit_superclass),
                class_metaclass: root(options.class_metaclass),
                module_metaclass: root(options.module_metaclass),
            },
            memoize: options.memoize,
            ancestor_cache: AncestorCache::default(),
            definitions: DefinitionCache::default(),
        }
    }

    pub fn environment(&self) -> &'env Environment {
        self.env
    }

    fn resolver(&self) -> AncestorResolver<'_> {
        AncestorResolver::new(self.env, &self.roots, &self.ancestor_cache, self.memoize)
    }

    /// Check that `name` has a `kind` side.
    ///
    /// The instance side of an interface is its interface side. Interfaces
    /// have no singleton side; classes and modules have no interface side;
    /// type aliases have neither.
    fn side(
        &self,
        name: &TypeName,
        kind: DefinitionKind,
    ) -> Result<(&'env DeclarationEntry, DefinitionKind), DefinitionError> {
        let unresolved = || DefinitionError::UnresolvedType {
            name: name.clone(),
            location: Location::DUMMY,
        };
        let entry = self.env.lookup(name).ok_or_else(unresolved)?;
        let kind = match (entry, kind) {
            (DeclarationEntry::Interface(_), DefinitionKind::Instance | DefinitionKind::Interface) => {
                DefinitionKind::Interface
            }
            (
                DeclarationEntry::Class(_) | DeclarationEntry::Module(_),
                DefinitionKind::Instance | DefinitionKind::Singleton,
            ) => kind,
            _ => return Err(unresolved()),
        };
        Ok((entry, kind))
    }

    /// Ancestors of `name` from the `kind` side.
    ///
    /// # Errors
    ///
    /// Resolution errors only; members are not folded or validated.
    pub fn ancestors(
        &self,
        name: &TypeName,
        kind: DefinitionKind,
    ) -> Result<Arc<Ancestors>, DefinitionError> {
        let (_, kind) = self.side(name, kind)?;
        self.resolver().ancestors(name, kind)
    }

    pub fn instance_ancestors(&self, name: &TypeName) -> Result<Arc<Ancestors>, DefinitionError> {
        self.ancestors(name, DefinitionKind::Instance)
    }

    pub fn singleton_ancestors(&self, name: &TypeName) -> Result<Arc<Ancestors>, DefinitionError> {
        self.ancestors(name, DefinitionKind::Singleton)
    }

    pub fn interface_ancestors(&self, name: &TypeName) -> Result<Arc<Ancestors>, DefinitionError> {
        self.ancestors(name, DefinitionKind::Interface)
    }

    pub fn build_instance(&self, name: &TypeName) -> Result<Arc<Definition>, DefinitionError> {
        self.build(name, DefinitionKind::Instance)
    }

    pub fn build_singleton(&self, name: &TypeName) -> Result<Arc<Definition>, DefinitionError> {
        self.build(name, DefinitionKind::Singleton)
    }

    pub fn build_interface(&self, name: &TypeName) -> Result<Arc<Definition>, DefinitionError> {
        self.build(name, DefinitionKind::Interface)
    }

    /// Build the `kind` side of `name`.
    ///
    /// # Errors
    ///
    /// The first error of resolution, folding or validation.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(type_name = %name.display(self.env.interner()), %kind)
    )]
    pub fn build(
        &self,
        name: &TypeName,
        kind: DefinitionKind,
    ) -> Result<Arc<Definition>, DefinitionError> {
        let (entry, kind) = self.side(name, kind)?;
        let key = (name.clone(), kind);
        if self.memoize {
            if let Some(cached) = self.definitions.get(&key) {
                tracing::debug!("definition cache hit");
                return Ok(Arc::clone(cached.value()));
            }
        }

        let resolver = self.resolver();
        let ancestors = resolver.ancestors(name, kind)?;
        let table = build_table(self.env, &resolver, &ancestors)?;

        let (type_params, self_type) = match kind {
            DefinitionKind::Singleton => (
                Vec::new(),
                TypeExpr::Singleton {
                    name: name.clone(),
                    location: entry.location(),
                },
            ),
            DefinitionKind::Instance | DefinitionKind::Interface => (
                entry.type_params().to_vec(),
                TypeExpr::named(
                    name.clone(),
                    entry
                        .type_params()
                        .iter()
                        .map(|p| TypeExpr::variable(p.name))
                        .collect(),
                    entry.location(),
                ),
            ),
        };

        let definition = Definition {
            type_name: name.clone(),
            kind,
            type_params,
            self_type,
            ancestors,
            methods: table.methods,
            instance_variables: table.instance_variables,
        };
        validate(self.env, entry, &definition)?;

        tracing::debug!(
            ancestors = definition.ancestors.len(),
            methods = definition.methods.len(),
            ivars = definition.instance_variables.len(),
            "definition built"
        );

        let definition = Arc::new(definition);
        if !self.memoize {
            return Ok(definition);
        }
        Ok(Arc::clone(
            self.definitions.entry(key).or_insert(definition).value(),
        ))
    }

    /// Build the instance side of every name in parallel.
    ///
    /// Results are returned in input order.
    pub fn build_all(&self, names: &[TypeName]) -> Vec<Result<Arc<Definition>, DefinitionError>> {
        tracing::debug!(count = names.len(), "building in parallel");
        names.par_iter().map(|name| self.build_instance(name)).collect()
    }
}

impl std::fmt::Debug for DefinitionBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionBuilder")
            .field("env", self.env)
            .field("memoize", &self.memoize)
            .field("cached", &self.definitions.len())
            .finish_non_exhaustive()
    }
}
