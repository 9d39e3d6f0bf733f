//! Qualified type names.
//!
//! A [`TypeName`] is an absolute path (`::Foo::Bar`) plus a discriminant
//! telling which namespace the name lives in. Classes and modules share the
//! constant namespace, so one `Class` kind covers both; which of the two a
//! name denotes is decided by its declaration, not its spelling.

use std::fmt;

use crate::{Name, StringInterner};

/// Which namespace a type name lives in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeNameKind {
    /// Class or module (`Foo`).
    Class,
    /// Interface (`_Foo`).
    Interface,
    /// Type alias (`foo`).
    Alias,
}

impl TypeNameKind {
    /// Classify a short name by its spelling.
    pub fn of(short: &str) -> Self {
        match short.chars().next() {
            Some('_') => TypeNameKind::Interface,
            Some(c) if c.is_lowercase() => TypeNameKind::Alias,
            _ => TypeNameKind::Class,
        }
    }
}

/// Absolute, qualified type name.
///
/// Equality and hashing are structural over namespace, short name and kind.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeName {
    namespace: Vec<Name>,
    name: Name,
    kind: TypeNameKind,
}

impl TypeName {
    /// Create a type name from already-interned parts.
    pub fn new(namespace: Vec<Name>, name: Name, kind: TypeNameKind) -> Self {
        TypeName {
            namespace,
            name,
            kind,
        }
    }

    /// Parse a `::`-separated path, interning every segment.
    ///
    /// A leading `::` is optional; every name is absolute. The kind is taken
    /// from the spelling of the last segment.
    pub fn parse(interner: &StringInterner, path: &str) -> Self {
        let path = path.strip_prefix("::").unwrap_or(path);
        let mut segments: Vec<&str> = path.split("::").collect();
        let short = segments.pop().unwrap_or_default();
        TypeName {
            namespace: segments.iter().map(|s| interner.intern(s)).collect(),
            name: interner.intern(short),
            kind: TypeNameKind::of(short),
        }
    }

    /// Short (last) segment.
    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    /// Enclosing namespace segments, outermost first.
    #[inline]
    pub fn namespace(&self) -> &[Name] {
        &self.namespace
    }

    #[inline]
    pub fn kind(&self) -> TypeNameKind {
        self.kind
    }

    #[inline]
    pub fn is_class(&self) -> bool {
        self.kind == TypeNameKind::Class
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeNameKind::Interface
    }

    #[inline]
    pub fn is_alias(&self) -> bool {
        self.kind == TypeNameKind::Alias
    }

    /// Render with an interner: `::Foo::Bar`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> TypeNameDisplay<'a> {
        TypeNameDisplay {
            name: self,
            interner,
        }
    }
}

/// `Display` adapter returned by [`TypeName::display`].
pub struct TypeNameDisplay<'a> {
    name: &'a TypeName,
    interner: &'a StringInterner,
}

impl fmt::Display for TypeNameDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.name.namespace {
            write!(f, "::{}", self.interner.lookup(*segment))?;
        }
        write!(f, "::{}", self.interner.lookup(self.name.name))
    }
}
