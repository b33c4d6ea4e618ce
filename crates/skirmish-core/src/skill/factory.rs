//! Instance allocation and definition validation.
//!
//! Each registry owns a [`SkillFactory`]. The default [`PooledSkillFactory`]
//! recycles released instances through an [`InstancePool`] so that a long
//! battle does not keep allocating.

use std::fmt;
use std::sync::Arc;

use crate::error::SkillDataError;

use super::definition::{EffectKind, SkillDefinition};
use super::instance::SkillInstance;

/// Produces and recycles runtime instances.
pub trait SkillFactory: fmt::Debug {
    /// Hands out a blank instance for `definition`, or `None` if it cannot.
    fn create_skill(&mut self, definition: &Arc<SkillDefinition>) -> Option<SkillInstance>;

    /// Takes back a finished instance.
    fn return_to_pool(&mut self, instance: SkillInstance);

    /// Structural validation of a definition.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    fn validate(&self, definition: &SkillDefinition) -> Result<(), SkillDataError> {
        validate_skill_data(definition)
    }
}

/// Checks a definition for structural problems.
///
/// # Errors
///
/// Returns the first [`SkillDataError`] found, checking the definition
/// fields before each effect spec in order.
pub fn validate_skill_data(definition: &SkillDefinition) -> Result<(), SkillDataError> {
    let skill = &definition.id;
    if skill.is_empty() {
        return Err(SkillDataError::EmptyId);
    }
    if definition.name.trim().is_empty() {
        return Err(SkillDataError::EmptyName(skill.clone()));
    }
    if definition.effects.is_empty() {
        return Err(SkillDataError::NoEffects(skill.clone()));
    }

    for (index, spec) in definition.effects.iter().enumerate() {
        if !(0.0..=1.0).contains(&spec.chance) {
            return Err(SkillDataError::InvalidChance {
                skill: skill.clone(),
                index,
                chance: spec.chance,
            });
        }
        let timed = matches!(
            spec.kind,
            EffectKind::StatusEffect
                | EffectKind::Buff
                | EffectKind::Debuff
                | EffectKind::Shield
                | EffectKind::Reflect
        );
        if timed && spec.duration <= 0 {
            return Err(SkillDataError::MissingDuration {
                skill: skill.clone(),
                index,
                duration: spec.duration,
            });
        }
        if spec.kind == EffectKind::StatusEffect && spec.status.is_none() {
            return Err(SkillDataError::MissingStatus {
                skill: skill.clone(),
                index,
            });
        }
        if matches!(spec.kind, EffectKind::Buff | EffectKind::Debuff) && spec.stat.is_none() {
            return Err(SkillDataError::MissingStat {
                skill: skill.clone(),
                index,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Instance Pool
// =============================================================================

/// Free list of reset instances.
#[derive(Debug, Clone)]
pub struct InstancePool {
    free: Vec<SkillInstance>,
    capacity: usize,
    allocated: usize,
}

impl InstancePool {
    /// Creates a pool that keeps at most `capacity` idle instances.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
            allocated: 0,
        }
    }

    /// Takes an idle instance or allocates a new one.
    pub fn acquire(&mut self) -> SkillInstance {
        self.free.pop().unwrap_or_else(|| {
            self.allocated += 1;
            SkillInstance::blank()
        })
    }

    /// Resets and keeps `instance` unless the pool is full.
    pub fn release(&mut self, mut instance: SkillInstance) {
        if self.free.len() < self.capacity {
            instance.reset();
            self.free.push(instance);
        }
    }

    /// Idle instances ready for reuse.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Instances ever allocated by this pool.
    #[must_use]
    pub const fn allocated(&self) -> usize {
        self.allocated
    }

    /// Maximum idle instances kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Default factory backed by an [`InstancePool`].
///
/// ```
/// use std::sync::Arc;
/// use skirmish_core::skill::{EffectSpec, PooledSkillFactory, SkillDefinition, SkillFactory};
///
/// let mut factory = PooledSkillFactory::new();
/// let def = Arc::new(SkillDefinition::new("slash", "Slash").with_effect(EffectSpec::damage(5.0)));
///
/// let instance = factory.create_skill(&def).unwrap();
/// factory.return_to_pool(instance);
/// assert_eq!(factory.pool().available(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PooledSkillFactory {
    pool: InstancePool,
}

impl PooledSkillFactory {
    /// Idle instances kept per factory unless configured otherwise.
    pub const DEFAULT_CAPACITY: usize = 32;

    /// Creates a factory with the default pool capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a factory keeping at most `capacity` idle instances.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: InstancePool::with_capacity(capacity),
        }
    }

    /// The backing pool.
    #[must_use]
    pub const fn pool(&self) -> &InstancePool {
        &self.pool
    }
}

impl Default for PooledSkillFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillFactory for PooledSkillFactory {
    fn create_skill(&mut self, definition: &Arc<SkillDefinition>) -> Option<SkillInstance> {
        if definition.effects.is_empty() {
            return None;
        }
        Some(self.pool.acquire())
    }

    fn return_to_pool(&mut self, instance: SkillInstance) {
        self.pool.release(instance);
    }
}
