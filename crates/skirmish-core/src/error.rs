//! Error types for the combat engine.
//!
//! Errors are grouped by the layer that raises them:
//! - [`SkillDataError`]: a skill definition failed structural validation
//! - [`ApplyError`]: applying a skill to an actor was rejected
//! - [`TransitionError`]: an illegal battle phase change was requested
//! - [`ActionError`]: a command could not be executed
//! - [`DatabaseError`] / [`ConfigError`]: loading external data failed
//!
//! Every rejection leaves state untouched. Callers decide whether to log,
//! retry, or ignore.

use thiserror::Error;

use crate::actor::ActorId;
use crate::skill::{SkillId, StatusType};
use crate::state_machine::BattleState;

/// Structural problem with a skill definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkillDataError {
    /// The definition id is empty.
    #[error("skill id is empty")]
    EmptyId,

    /// The display name is empty.
    #[error("skill {0} has an empty name")]
    EmptyName(SkillId),

    /// The definition declares no effects.
    #[error("skill {0} declares no effects")]
    NoEffects(SkillId),

    /// A persistent effect has no duration.
    #[error("skill {skill}: effect {index} is persistent but has duration {duration}")]
    MissingDuration {
        /// Offending skill.
        skill: SkillId,
        /// Index into the effect list.
        index: usize,
        /// Declared duration.
        duration: i32,
    },

    /// A landing chance outside `[0, 1]`.
    #[error("skill {skill}: effect {index} has chance {chance} outside [0, 1]")]
    InvalidChance {
        /// Offending skill.
        skill: SkillId,
        /// Index into the effect list.
        index: usize,
        /// Declared chance.
        chance: f32,
    },

    /// A status effect without a status tag.
    #[error("skill {skill}: status effect {index} has no status type")]
    MissingStatus {
        /// Offending skill.
        skill: SkillId,
        /// Index into the effect list.
        index: usize,
    },

    /// A buff or debuff without a stat selector.
    #[error("skill {skill}: stat effect {index} has no stat")]
    MissingStat {
        /// Offending skill.
        skill: SkillId,
        /// Index into the effect list.
        index: usize,
    },
}

/// Why a target refused an incoming skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// An active immunity blocked an incoming ailment.
    Immune(StatusType),
    /// The curse hook blocked the skill.
    Cursed,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immune(status) => write!(f, "immune to {status}"),
            Self::Cursed => write!(f, "cursed"),
        }
    }
}

/// A rejected skill application.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplyError {
    /// Source or target does not exist.
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    /// The definition failed validation.
    #[error("invalid skill definition: {0}")]
    InvalidDefinition(#[from] SkillDataError),

    /// The target is already defeated.
    #[error("target {0} is defeated")]
    TargetDefeated(ActorId),

    /// The target blocked the skill.
    #[error("blocked: {0}")]
    Blocked(BlockReason),

    /// The instance did not meet its start condition (missed chance roll,
    /// target already shielded).
    #[error("start condition failed for skill {0}")]
    StartConditionFailed(SkillId),

    /// The factory could not produce an instance.
    #[error("factory could not create an instance of skill {0}")]
    FactoryExhausted(SkillId),
}

/// An illegal phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// `to` is not reachable from `from`.
    #[error("transition {from:?} -> {to:?} is not allowed")]
    NotAllowed {
        /// Current phase.
        from: BattleState,
        /// Requested phase.
        to: BattleState,
    },
}

/// A command that could not be executed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// The skill is still cooling down.
    #[error("skill {skill} is on cooldown for {remaining} more turns")]
    OnCooldown {
        /// Requested skill.
        skill: SkillId,
        /// Turns left.
        remaining: u32,
    },

    /// The actor cannot act at all.
    #[error("actor {0} is incapacitated")]
    Incapacitated(ActorId),

    /// The actor may not use skills.
    #[error("actor {0} cannot use skills")]
    SkillSealed(ActorId),

    /// No valid target remains.
    #[error("no valid target for skill {0}")]
    NoTarget(SkillId),

    /// The skill is not in the database.
    #[error("unknown skill {0}")]
    UnknownSkill(SkillId),

    /// No actor with that id.
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    /// The operation is not valid in the current phase.
    #[error("operation not valid in phase {0:?}")]
    WrongPhase(BattleState),

    /// No actor is left to take a turn.
    #[error("no actor can take a turn")]
    NoActor,

    /// The underlying phase change was rejected.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Failure loading a skill database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Malformed JSON.
    #[error("failed to parse skill data: {0}")]
    Parse(#[from] serde_json::Error),

    /// A definition failed validation.
    #[error("invalid skill: {0}")]
    Invalid(#[from] SkillDataError),

    /// Two definitions share an id.
    #[error("duplicate skill id {0}")]
    Duplicate(SkillId),
}

/// Failure loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_error_wraps_data_error() {
        let err: ApplyError = SkillDataError::EmptyId.into();
        assert_eq!(err, ApplyError::InvalidDefinition(SkillDataError::EmptyId));
        assert_eq!(err.to_string(), "invalid skill definition: skill id is empty");
    }

    #[test]
    fn transition_error_message() {
        let err = TransitionError::NotAllowed {
            from: BattleState::TurnStart,
            to: BattleState::CommandSelect,
        };
        assert_eq!(
            err.to_string(),
            "transition TurnStart -> CommandSelect is not allowed"
        );
    }

    #[test]
    fn action_error_is_transparent_over_transition() {
        let inner = TransitionError::NotAllowed {
            from: BattleState::None,
            to: BattleState::BattleEnd,
        };
        let err: ActionError = inner.into();
        assert_eq!(err.to_string(), inner.to_string());
    }

    #[test]
    fn block_reason_display() {
        assert_eq!(
            ApplyError::Blocked(BlockReason::Immune(StatusType::Stun)).to_string(),
            "blocked: immune to Stun"
        );
    }
}
