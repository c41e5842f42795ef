#![deny(missing_docs)]

//! # Schema Registry
//!
//! The single namespace of named schema definitions, merged from every
//! document of a bundle, plus multi-hop reference resolution over it.

use crate::error::{AppError, AppResult};
use crate::oas::schema::{Definition, PrimitiveKind, SchemaRef};
use derive_more::Display;
use indexmap::IndexMap;

/// A definition together with the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// The parsed definition.
    pub definition: Definition,
    /// URI of the declaring document.
    pub origin: String,
}

/// Terminal shape of a resolved [`SchemaRef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A named definition (object, enum or composition).
    Named(String),
    /// A structural primitive.
    Primitive(PrimitiveKind),
    /// An array of a resolved shape.
    ArrayOf(Box<Resolved>),
}

/// Why a reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ResolveError {
    /// No definition carries the name.
    #[display("no schema definition named '{_0}'")]
    Missing(String),
    /// Alias chain loops back on itself.
    #[display("reference cycle {}", _0.join(" -> "))]
    Cycle(Vec<String>),
    /// Pointer does not address a schema definition.
    #[display("'{_0}' does not point at a schema definition")]
    Unresolved(String),
}

impl ResolveError {
    /// The reference that failed, as written or as named.
    pub fn reference(&self) -> &str {
        match self {
            Self::Missing(name) => name,
            Self::Cycle(chain) => chain.first().map(String::as_str).unwrap_or_default(),
            Self::Unresolved(pointer) => pointer,
        }
    }
}

/// Insertion-ordered map from definition name to definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    entries: IndexMap<String, RegistryEntry>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, failing if the name is already taken.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        definition: Definition,
        origin: impl Into<String>,
    ) -> AppResult<()> {
        let name = name.into();
        let origin = origin.into();
        if let Some(existing) = self.entries.get(&name) {
            return Err(AppError::DuplicateDefinition {
                name,
                first: existing.origin.clone(),
                second: origin,
            });
        }
        self.entries.insert(name, RegistryEntry { definition, origin });
        Ok(())
    }

    /// Looks up a definition by name.
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.entries.get(name).map(|e| &e.definition)
    }

    /// Looks up the full entry, origin included.
    pub fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Definition names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no definitions are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a use site to its terminal shape, following alias chains of
    /// any length.
    pub fn resolve(&self, schema: &SchemaRef) -> Result<Resolved, ResolveError> {
        let mut chain = Vec::new();
        self.resolve_in(schema, &mut chain)
    }

    fn resolve_in(
        &self,
        schema: &SchemaRef,
        chain: &mut Vec<String>,
    ) -> Result<Resolved, ResolveError> {
        match schema {
            SchemaRef::Primitive(kind) => Ok(Resolved::Primitive(*kind)),
            SchemaRef::ArrayOf(inner) => {
                Ok(Resolved::ArrayOf(Box::new(self.resolve_in(inner, chain)?)))
            }
            SchemaRef::Unresolved(pointer) => Err(ResolveError::Unresolved(pointer.clone())),
            SchemaRef::ObjectRef(name) => {
                if chain.contains(name) {
                    let mut cycle = chain.clone();
                    cycle.push(name.clone());
                    return Err(ResolveError::Cycle(cycle));
                }
                let definition = self
                    .get(name)
                    .ok_or_else(|| ResolveError::Missing(name.clone()))?;
                match definition {
                    Definition::Alias(target) => {
                        chain.push(name.clone());
                        let resolved = self.resolve_in(target, chain);
                        chain.pop();
                        resolved
                    }
                    _ => Ok(Resolved::Named(name.clone())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::schema::IntWidth;
    use indexmap::IndexMap;

    fn object() -> Definition {
        Definition::Object {
            fields: IndexMap::new(),
        }
    }

    #[test]
    fn test_duplicate_names_rejected_with_origins() {
        let mut registry = SchemaRegistry::new();
        registry.insert("Team", object(), "root.yaml").unwrap();
        let err = registry.insert("Team", object(), "team.yaml").unwrap_err();
        match err {
            AppError::DuplicateDefinition {
                name,
                first,
                second,
            } => {
                assert_eq!(name, "Team");
                assert_eq!(first, "root.yaml");
                assert_eq!(second, "team.yaml");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_multi_hop_alias_converges_on_name() {
        let mut registry = SchemaRegistry::new();
        registry.insert("Team", object(), "a").unwrap();
        registry
            .insert("TeamAlias", Definition::Alias(SchemaRef::named("Team")), "a")
            .unwrap();
        registry
            .insert("TeamAlias2", Definition::Alias(SchemaRef::named("TeamAlias")), "a")
            .unwrap();

        let single = registry.resolve(&SchemaRef::named("Team")).unwrap();
        let multi = registry.resolve(&SchemaRef::named("TeamAlias2")).unwrap();
        assert_eq!(single, Resolved::Named("Team".into()));
        assert_eq!(multi, single);
    }

    #[test]
    fn test_alias_to_primitive_and_array() {
        let mut registry = SchemaRegistry::new();
        let int = SchemaRef::Primitive(PrimitiveKind::Integer(IntWidth::I64));
        registry.insert("Count", Definition::Alias(int), "a").unwrap();
        registry.insert("Team", object(), "a").unwrap();
        registry
            .insert(
                "Teams",
                Definition::Alias(SchemaRef::ArrayOf(Box::new(SchemaRef::named("Team")))),
                "a",
            )
            .unwrap();

        assert_eq!(
            registry.resolve(&SchemaRef::named("Count")).unwrap(),
            Resolved::Primitive(PrimitiveKind::Integer(IntWidth::I64))
        );
        assert_eq!(
            registry.resolve(&SchemaRef::named("Teams")).unwrap(),
            Resolved::ArrayOf(Box::new(Resolved::Named("Team".into())))
        );
    }

    #[test]
    fn test_missing_and_cycle_errors() {
        let mut registry = SchemaRegistry::new();
        registry
            .insert("A", Definition::Alias(SchemaRef::named("B")), "a")
            .unwrap();
        registry
            .insert("B", Definition::Alias(SchemaRef::named("A")), "a")
            .unwrap();

        let missing = registry.resolve(&SchemaRef::named("Nope")).unwrap_err();
        assert_eq!(missing, ResolveError::Missing("Nope".into()));
        assert_eq!(missing.reference(), "Nope");

        let cycle = registry.resolve(&SchemaRef::named("A")).unwrap_err();
        assert_eq!(cycle.to_string(), "reference cycle A -> B -> A");
    }
}
