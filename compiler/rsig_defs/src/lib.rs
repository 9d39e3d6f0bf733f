//! rsig definitions - ancestor resolution and method-table building.
//!
//! Given an [`Environment`] of parsed declarations, a [`DefinitionBuilder`]
//! computes for any class, module or interface:
//! - its ordered ancestor list, per side ([`Ancestors`])
//! - the flattened table of methods and instance variables ([`Definition`])
//!
//! # Pipeline
//!
//! ```text
//! Environment ──► AncestorResolver ──► method table ──► validate ──► Definition
//! ```
//!
//! Every stage reports the first problem as a [`DefinitionError`]; nothing
//! is recovered and no partial definition escapes. Errors convert to
//! [`rsig_diagnostic::Diagnostic`] for presentation.
//!
//! # Tracing
//!
//! Set `RUST_LOG=rsig_defs=debug` (or `trace` for per-ancestor events) and
//! call [`init_tracing`].

mod ancestors;
mod builder;
mod definition;
mod env;
mod error;
mod methods;
mod stack;
mod subst;
mod validate;

use std::sync::Once;

pub use ancestors::{Ancestor, AncestorEntry, AncestorOrigin, Ancestors};
pub use builder::{BuilderOptions, DefinitionBuilder};
pub use definition::{
    DefinedArm, DefinedIvar, DefinedMethod, Definition, DefinitionKind, SuperMethod,
};
pub use env::{ClassEntry, DeclarationEntry, Environment, EnvironmentBuilder, ModuleEntry};
pub use error::{
    AliasSite, ConflictReason, DefinitionError, MixinSite, OverloadReason, VarianceSite,
};
pub use subst::Subst;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=rsig_defs=debug` or `RUST_LOG=rsig_defs=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
