//! Type table of a program.
//!
//! Expression and name nodes refer to types through the `type` attribute,
//! which holds either a basic type tag (`Freal`, `Fint`, ...) or the id of an
//! entry in this table. The table is append-only: entries are never removed
//! or replaced once registered.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Intrinsic Fortran type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicKind {
    #[serde(rename = "Fint")]
    Integer,
    #[serde(rename = "Freal")]
    Real,
    #[serde(rename = "Fcomplex")]
    Complex,
    #[serde(rename = "Flogical")]
    Logical,
    #[serde(rename = "Fcharacter")]
    Character,
    #[serde(rename = "Fvoid")]
    Void,
}

impl BasicKind {
    /// Tag used in `type` attributes.
    pub fn tag(self) -> &'static str {
        match self {
            BasicKind::Integer => "Fint",
            BasicKind::Real => "Freal",
            BasicKind::Complex => "Fcomplex",
            BasicKind::Logical => "Flogical",
            BasicKind::Character => "Fcharacter",
            BasicKind::Void => "Fvoid",
        }
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Identifier of a type table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A function type: only the return kind is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionType {
    pub return_type: BasicKind,
}

/// Type table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeEntry {
    /// Basic type with optional array shape, e.g. `real, dimension(n)`
    Basic {
        base: BasicKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rank: Option<u8>,
    },
    Function(FunctionType),
}

/// Ordered, append-only type table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTable {
    entries: IndexMap<TypeId, TypeEntry>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &TypeId) -> Option<&TypeEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &TypeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeId, &TypeEntry)> {
        self.entries.iter()
    }

    /// Register an entry under an id chosen by the front end.
    ///
    /// Returns `false` and leaves the table unchanged if the id is taken.
    pub fn insert(&mut self, id: TypeId, entry: TypeEntry) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, entry);
        true
    }

    /// Register a new function type and return its freshly minted id.
    ///
    /// Ids have the form `F<hex>` with the serial chosen past every id
    /// already in the table, so a loaded table never collides.
    pub fn add_function_type(&mut self, return_type: BasicKind) -> TypeId {
        let mut serial = self.entries.len();
        let id = loop {
            let candidate = TypeId(format!("F{serial:08x}"));
            if !self.entries.contains_key(&candidate) {
                break candidate;
            }
            serial += 1;
        };
        self.entries
            .insert(id.clone(), TypeEntry::Function(FunctionType { return_type }));
        id
    }
}
