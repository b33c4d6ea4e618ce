//! State components carried by every combat actor.
//!
//! Components are plain data. They are mutated only by the
//! [`CombatResolver`](crate::resolver::CombatResolver) (health, shield, stats,
//! reflect ratio) and by the forced-target module (the `TAUNTED` flag).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Status flags raised and lowered as side effects of skill effects.
    ///
    /// Flags are a coarse, cheap-to-query mirror of conditions that other
    /// systems consult without walking the skill registry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u32 {
        /// The actor is being taunted and must attack its taunter.
        const TAUNTED = 1 << 0;
        /// The actor cannot use skills (silence, skill disruption).
        const CANNOT_USE_SKILL = 1 << 1;
        /// The actor's health reached zero.
        const DEFEATED = 1 << 2;
    }
}

/// Stat selector used by buff and debuff effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatKind {
    /// Added to outgoing damage.
    Attack,
    /// Mitigates incoming damage.
    Defense,
    /// Determines turn order.
    Speed,
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "Attack"),
            Self::Defense => write!(f, "Defense"),
            Self::Speed => write!(f, "Speed"),
        }
    }
}

/// Offensive and defensive stats of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Flat bonus added to skill damage.
    pub attack: f32,
    /// Damage mitigation; damage is scaled by `100 / (100 + defense)`.
    pub defense: f32,
    /// Higher speed acts earlier in a round.
    pub speed: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            attack: 10.0,
            defense: 0.0,
            speed: 10.0,
        }
    }
}

impl Stats {
    /// Creates a stat block.
    #[must_use]
    pub const fn new(attack: f32, defense: f32, speed: f32) -> Self {
        Self {
            attack,
            defense,
            speed,
        }
    }

    /// Returns the value of a single stat.
    #[must_use]
    pub const fn get(&self, kind: StatKind) -> f32 {
        match kind {
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
        }
    }

    /// Adds `delta` to a single stat.
    pub fn add(&mut self, kind: StatKind, delta: f32) {
        match kind {
            StatKind::Attack => self.attack += delta,
            StatKind::Defense => self.defense += delta,
            StatKind::Speed => self.speed += delta,
        }
    }
}

/// Result of applying damage to a [`CombatState`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageResult {
    /// Portion soaked by the shield.
    pub absorbed: f32,
    /// Portion subtracted from health.
    pub dealt: f32,
    /// True if this hit brought health to zero.
    pub defeated: bool,
}

/// Health, shield and status flags of an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Current health.
    pub hp: f32,
    /// Maximum health.
    pub max_hp: f32,
    /// Damage absorption pool, consumed before health.
    pub shield: f32,
    /// Fraction of incoming damage reflected back at the attacker.
    pub reflect_ratio: f32,
    /// Status flags.
    pub status_flags: StatusFlags,
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl CombatState {
    /// Creates a full-health state.
    #[must_use]
    pub fn new(max_hp: f32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            shield: 0.0,
            reflect_ratio: 0.0,
            status_flags: StatusFlags::empty(),
        }
    }

    /// Returns true while health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0 && !self.status_flags.contains(StatusFlags::DEFEATED)
    }

    /// Applies damage, consuming the shield first.
    ///
    /// Damage to an already defeated actor is ignored.
    pub fn apply_damage(&mut self, amount: f32) -> DamageResult {
        if !self.is_alive() || amount <= 0.0 {
            return DamageResult::default();
        }

        let absorbed = amount.min(self.shield);
        self.shield -= absorbed;
        let dealt = (amount - absorbed).min(self.hp);
        self.hp -= dealt;

        let defeated = self.hp <= 0.0;
        if defeated {
            self.hp = 0.0;
            self.status_flags.insert(StatusFlags::DEFEATED);
        }

        DamageResult {
            absorbed,
            dealt,
            defeated,
        }
    }

    /// Heals up to max health and returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    /// Health as a fraction of max health.
    #[must_use]
    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            self.hp / self.max_hp
        }
    }
}
