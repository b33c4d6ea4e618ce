//! Per-actor skill cooldowns.

use std::collections::BTreeMap;

use super::definition::{SkillDefinition, SkillId};

/// Turns left before each skill can be used again.
///
/// Only skills with a running cooldown are stored; everything else is usable.
///
/// ```
/// use skirmish_core::skill::{CooldownTracker, EffectSpec, SkillDefinition};
///
/// let fireball = SkillDefinition::new("fireball", "Fireball")
///     .with_effect(EffectSpec::damage(20.0))
///     .with_cooldown(2);
///
/// let mut cooldowns = CooldownTracker::new();
/// cooldowns.use_skill(&fireball);
/// assert!(!cooldowns.can_use_skill(&fireball.id));
///
/// cooldowns.advance_turn();
/// cooldowns.advance_turn();
/// assert!(cooldowns.can_use_skill(&fireball.id));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CooldownTracker {
    remaining: BTreeMap<SkillId, u32>,
}

impl CooldownTracker {
    /// Creates a tracker with nothing on cooldown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `skill` has no running cooldown.
    #[must_use]
    pub fn can_use_skill(&self, skill: &SkillId) -> bool {
        self.remaining_cooldown(skill) == 0
    }

    /// Starts the cooldown of `definition` at its declared length.
    pub fn use_skill(&mut self, definition: &SkillDefinition) {
        if definition.cooldown == 0 {
            self.remaining.remove(&definition.id);
        } else {
            self.remaining
                .insert(definition.id.clone(), definition.cooldown);
        }
    }

    /// Turns left for `skill`, 0 if usable.
    #[must_use]
    pub fn remaining_cooldown(&self, skill: &SkillId) -> u32 {
        self.remaining.get(skill).copied().unwrap_or(0)
    }

    /// Pushes every running cooldown back by `amount` turns.
    pub fn increase_cooldowns(&mut self, amount: u32) {
        for turns in self.remaining.values_mut() {
            *turns = turns.saturating_add(amount);
        }
    }

    /// Makes every skill usable.
    pub fn reset_all_cooldowns(&mut self) {
        self.remaining.clear();
    }

    /// Counts every running cooldown down by one turn.
    pub fn advance_turn(&mut self) {
        self.remaining.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
    }

    /// Number of skills currently cooling down.
    #[must_use]
    pub fn running(&self) -> usize {
        self.remaining.len()
    }
}
