//! Proposed state changes emitted by skill effect hooks.
//!
//! Effect hooks run while the affected actor's registry is borrowed out of the
//! arena, so they never mutate actors themselves. Instead each hook pushes
//! [`Modifier`] values describing what should happen, and the
//! [`CombatResolver`](crate::resolver::CombatResolver) applies them afterwards
//! in emission order.
//!
//! # Example
//!
//! ```
//! use skirmish_core::modifier::{DamageKind, Modifier};
//! use skirmish_core::actor::ActorId;
//!
//! let hit = Modifier::ApplyDamage {
//!     source: ActorId::new(1),
//!     target: ActorId::new(2),
//!     amount: 12.0,
//!     kind: DamageKind::Normal,
//! };
//! assert_eq!(hit.target(), ActorId::new(2));
//! ```

use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, StatKind, StatusFlags};

/// How a damage modifier was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageKind {
    /// Scaled by attack and defense; may be reflected.
    Normal,
    /// Ignores stats; may be reflected.
    Fixed,
    /// Bounced back by a reflect effect; never reflected again.
    Reflected,
}

/// A proposed change to one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    /// Deal damage (shield first, then health).
    ApplyDamage {
        /// Attacker, used for reflection.
        source: ActorId,
        /// Victim.
        target: ActorId,
        /// Damage before shields.
        amount: f32,
        /// Origin of the damage.
        kind: DamageKind,
    },

    /// Deal damage and heal the source for a fraction of what got through.
    LifeSteal {
        /// Attacker, healed afterwards.
        source: ActorId,
        /// Victim.
        target: ActorId,
        /// Damage before shields.
        amount: f32,
        /// Fraction of dealt damage returned to the source.
        ratio: f32,
    },

    /// Restore health, capped at max.
    ApplyHealing {
        /// Actor to heal.
        target: ActorId,
        /// Amount to restore.
        amount: f32,
    },

    /// Add to the shield pool.
    AddShield {
        /// Shielded actor.
        target: ActorId,
        /// Amount added.
        amount: f32,
    },

    /// Remove up to `amount` from the shield pool.
    RemoveShield {
        /// Shielded actor.
        target: ActorId,
        /// Upper bound on what is removed.
        amount: f32,
    },

    /// Add `delta` to one stat.
    ModifyStat {
        /// Affected actor.
        target: ActorId,
        /// Which stat.
        stat: StatKind,
        /// Signed change.
        delta: f32,
    },

    /// Raise or lower a status flag.
    SetStatusFlag {
        /// Affected actor.
        target: ActorId,
        /// Flag bits.
        flag: StatusFlags,
        /// Raise when true.
        value: bool,
    },

    /// Add `delta` to the reflect ratio.
    AdjustReflect {
        /// Affected actor.
        target: ActorId,
        /// Signed change.
        delta: f32,
    },

    /// Push every running cooldown of the actor back.
    IncreaseCooldowns {
        /// Affected actor.
        target: ActorId,
        /// Turns added.
        turns: u32,
    },

    /// Force `owner` to attack `target`.
    SetForcedTarget {
        /// Actor whose targeting is overridden.
        owner: ActorId,
        /// Actor that must be attacked.
        target: ActorId,
        /// Countdown in turns; 0 means indefinite.
        turns: u32,
        /// Record `target` as taunter.
        taunt: bool,
    },

    /// Drop the forced target of `owner`.
    ClearForcedTarget {
        /// Actor whose override is dropped.
        owner: ActorId,
        /// Only clear while the forced target is this actor.
        if_target: Option<ActorId>,
    },
}

impl Modifier {
    /// The actor whose state this modifier changes first.
    #[must_use]
    pub const fn target(&self) -> ActorId {
        match self {
            Self::ApplyDamage { target, .. }
            | Self::LifeSteal { target, .. }
            | Self::ApplyHealing { target, .. }
            | Self::AddShield { target, .. }
            | Self::RemoveShield { target, .. }
            | Self::ModifyStat { target, .. }
            | Self::SetStatusFlag { target, .. }
            | Self::AdjustReflect { target, .. }
            | Self::IncreaseCooldowns { target, .. } => *target,
            Self::SetForcedTarget { owner, .. } | Self::ClearForcedTarget { owner, .. } => *owner,
        }
    }

    /// Returns true for modifiers that can reduce health.
    #[must_use]
    pub const fn is_damage(&self) -> bool {
        matches!(self, Self::ApplyDamage { .. } | Self::LifeSteal { .. })
    }
}
