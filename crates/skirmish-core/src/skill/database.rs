//! Read-only skill definition lookup.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::DatabaseError;

use super::definition::{SkillDefinition, SkillId};
use super::factory::validate_skill_data;

/// Source of skill definitions.
pub trait SkillDatabase: fmt::Debug {
    /// Looks up a definition by id.
    fn skill_by_id(&self, id: &SkillId) -> Option<Arc<SkillDefinition>>;
}

/// Definitions held in memory, validated on insert.
///
/// ```
/// use skirmish_core::skill::{InMemorySkillDatabase, SkillDatabase, SkillId};
///
/// let db = InMemorySkillDatabase::from_json(r#"[
///     { "id": "slash", "name": "Slash", "effects": [{ "kind": "Damage", "value": 8.0 }] }
/// ]"#).unwrap();
///
/// assert!(db.skill_by_id(&SkillId::new("slash")).is_some());
/// assert!(db.skill_by_id(&SkillId::new("nope")).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySkillDatabase {
    skills: BTreeMap<SkillId, Arc<SkillDefinition>>,
}

impl InMemorySkillDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a database from definitions.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid or duplicate definition.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = SkillDefinition>,
    ) -> Result<Self, DatabaseError> {
        let mut db = Self::new();
        for definition in definitions {
            db.insert(definition)?;
        }
        Ok(db)
    }

    /// Parses a JSON array of definitions.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or any definition [`from_definitions`]
    /// rejects.
    ///
    /// [`from_definitions`]: Self::from_definitions
    pub fn from_json(json: &str) -> Result<Self, DatabaseError> {
        let definitions: Vec<SkillDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(definitions)
    }

    /// Adds one definition and returns the shared handle.
    ///
    /// # Errors
    ///
    /// Fails if the definition is invalid or its id is taken.
    pub fn insert(&mut self, definition: SkillDefinition) -> Result<Arc<SkillDefinition>, DatabaseError> {
        validate_skill_data(&definition)?;
        if self.skills.contains_key(&definition.id) {
            return Err(DatabaseError::Duplicate(definition.id));
        }
        let shared = Arc::new(definition);
        self.skills.insert(shared.id.clone(), Arc::clone(&shared));
        Ok(shared)
    }

    /// Ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &SkillId> + '_ {
        self.skills.keys()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Returns true if there are no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl SkillDatabase for InMemorySkillDatabase {
    fn skill_by_id(&self, id: &SkillId) -> Option<Arc<SkillDefinition>> {
        self.skills.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkillDataError;
    use crate::skill::EffectSpec;

    fn slash() -> SkillDefinition {
        SkillDefinition::new("slash", "Slash").with_effect(EffectSpec::damage(5.0))
    }

    #[test]
    fn lookup_returns_shared_definition() {
        let db = InMemorySkillDatabase::from_definitions([slash()]).unwrap();
        let a = db.skill_by_id(&SkillId::new("slash")).unwrap();
        let b = db.skill_by_id(&SkillId::new("slash")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = InMemorySkillDatabase::from_definitions([slash(), slash()]).unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate(id) if id.as_str() == "slash"));
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        let err =
            InMemorySkillDatabase::from_definitions([SkillDefinition::new("x", "X")]).unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Invalid(SkillDataError::NoEffects(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            InMemorySkillDatabase::from_json("[{"),
            Err(DatabaseError::Parse(_))
        ));
    }

    #[test]
    fn ids_are_sorted() {
        let db = InMemorySkillDatabase::from_definitions([
            SkillDefinition::new("b", "B").with_effect(EffectSpec::heal(1.0)),
            SkillDefinition::new("a", "A").with_effect(EffectSpec::heal(1.0)),
        ])
        .unwrap();
        let ids: Vec<&str> = db.ids().map(SkillId::as_str).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
