//! Combat actors and their sub-modules.
//!
//! This module provides the core actor types for the battle simulation:
//! - [`ActorId`]: Unique identifier for actors
//! - [`Team`]: Which side of the battle an actor fights on
//! - [`ActorSpec`]: Serializable description used to spawn an actor
//! - [`Actor`]: The complete actor container
//!
//! # Composition
//!
//! An [`Actor`] owns its behavior modules explicitly:
//! - a [`SkillRegistry`] holding every effect currently applied to it
//! - a [`ForcedTarget`] relation (taunts and must-attack overrides)
//! - a [`CooldownTracker`] gating its own skill usage
//!
//! Modules never reach into each other; the [`Battle`](crate::battle::Battle)
//! driver passes whatever cross-actor state they need as arguments.

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{CombatState, DamageResult, StatKind, Stats, StatusFlags};

use crate::skill::{CooldownTracker, SkillRegistry};
use crate::targeting::ForcedTarget;

/// Unique identifier for an actor.
///
/// Actor IDs are assigned monotonically by the [`Arena`](crate::arena::Arena)
/// and are never reused within a battle. Ordering follows the numeric value,
/// which keeps every iteration over actors deterministic.
///
/// # Example
///
/// ```
/// use skirmish_core::actor::ActorId;
///
/// let id1 = ActorId::new(1);
/// let id2 = ActorId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates a new `ActorId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<ActorId> for u64 {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

/// Side of the battle an actor fights on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// The player's party.
    Party,
    /// The monster group.
    Monsters,
}

impl Team {
    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Party => Self::Monsters,
            Self::Monsters => Self::Party,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Party => write!(f, "Party"),
            Self::Monsters => write!(f, "Monsters"),
        }
    }
}

/// Serializable description of an actor to spawn.
///
/// ```
/// use skirmish_core::actor::{ActorSpec, Team};
///
/// let spec: ActorSpec = serde_json::from_str(
///     r#"{ "name": "Slime", "team": "Monsters", "max_hp": 40.0 }"#,
/// ).unwrap();
/// assert_eq!(spec.team, Team::Monsters);
/// assert_eq!(spec.stats.attack, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    /// Display name.
    pub name: String,
    /// Side of the battle.
    pub team: Team,
    /// Maximum (and starting) health.
    pub max_hp: f32,
    /// Base stats.
    #[serde(default)]
    pub stats: Stats,
}

impl ActorSpec {
    /// Creates a spec with default stats.
    #[must_use]
    pub fn new(name: impl Into<String>, team: Team, max_hp: f32) -> Self {
        Self {
            name: name.into(),
            team,
            max_hp,
            stats: Stats::default(),
        }
    }

    /// Replaces the base stats (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }
}

/// A combatant in the battle.
///
/// # Invariants
///
/// - The `ActorId` is unique within an arena
/// - The skill registry's owner is this actor's id
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    team: Team,
    name: String,
    stats: Stats,
    combat: CombatState,
    skills: SkillRegistry,
    forced_target: ForcedTarget,
    cooldowns: CooldownTracker,
}

impl Actor {
    /// Creates an actor from a spec and a registry bound to `id`.
    #[must_use]
    pub fn new(id: ActorId, spec: ActorSpec, skills: SkillRegistry) -> Self {
        debug_assert_eq!(skills.owner(), id, "registry bound to a different actor");
        Self {
            id,
            team: spec.team,
            name: spec.name,
            stats: spec.stats,
            combat: CombatState::new(spec.max_hp),
            skills,
            forced_target: ForcedTarget::new(id),
            cooldowns: CooldownTracker::new(),
        }
    }

    /// Returns the actor's unique identifier.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Returns the actor's team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true while the actor can still fight.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.combat.is_alive()
    }

    /// Current stats including buff and debuff adjustments.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Mutable stats.
    pub fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    /// Health, shield and status flags.
    #[must_use]
    pub const fn combat(&self) -> &CombatState {
        &self.combat
    }

    /// Mutable health, shield and status flags.
    pub fn combat_mut(&mut self) -> &mut CombatState {
        &mut self.combat
    }

    /// Effects currently applied to this actor.
    #[must_use]
    pub const fn skills(&self) -> &SkillRegistry {
        &self.skills
    }

    /// Mutable access to the effect registry.
    pub fn skills_mut(&mut self) -> &mut SkillRegistry {
        &mut self.skills
    }

    /// The forced-target relation.
    #[must_use]
    pub const fn forced_target(&self) -> &ForcedTarget {
        &self.forced_target
    }

    /// Borrows the forced-target relation together with the status flags it
    /// raises and lowers.
    pub fn forced_target_mut(&mut self) -> (&mut ForcedTarget, &mut StatusFlags) {
        (&mut self.forced_target, &mut self.combat.status_flags)
    }

    /// Skill cooldowns.
    #[must_use]
    pub const fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Mutable skill cooldowns.
    pub fn cooldowns_mut(&mut self) -> &mut CooldownTracker {
        &mut self.cooldowns
    }

    /// True if a status effect prevents this actor from acting at all.
    #[must_use]
    pub fn is_incapacitated(&self) -> bool {
        self.skills.is_incapacitated()
    }

    /// True if the actor may not use skills this turn.
    #[must_use]
    pub fn cannot_use_skill(&self) -> bool {
        self.skills.cannot_use_skill()
            || self
                .combat
                .status_flags
                .contains(StatusFlags::CANNOT_USE_SKILL)
    }
}
