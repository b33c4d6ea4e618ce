//! # Skirmish Core
//!
//! Turn-based combat core for Skirmish.
//!
//! This crate provides the deterministic battle engine: skill effects with
//! stacking, refresh and dispel rules, forced targets and taunts, cooldowns,
//! and the battle phase state machine.
//!
//! ## Architecture
//!
//! - **Actors**: combatants with stats, health, shield and status flags;
//!   each owns a skill registry, a forced-target relation and cooldowns
//! - **Skills**: immutable definitions, pooled runtime instances and the
//!   per-actor registry that runs their lifecycle
//! - **Resolver**: skill hooks emit modifiers; the combat resolver applies
//!   them to the arena
//! - **Battle**: the driver owning the arena, phases, events and RNG
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::actor::{ActorSpec, Team};
//! use skirmish_core::battle::Battle;
//! use skirmish_core::config::EngineConfig;
//! use skirmish_core::skill::{EffectSpec, InMemorySkillDatabase, SkillDefinition, SkillId};
//! use skirmish_core::state_machine::{BattleState, Command};
//!
//! let db = InMemorySkillDatabase::from_json(
//!     r#"[{ "id": "slash", "name": "Slash", "effects": [{ "kind": "Damage", "value": 12.0 }] }]"#,
//! )
//! .unwrap();
//!
//! let mut battle = Battle::new(EngineConfig::default().with_seed(42), Box::new(db)).unwrap();
//! let hero = battle.spawn(ActorSpec::new("Hero", Team::Party, 100.0));
//! let slime = battle.spawn(ActorSpec::new("Slime", Team::Monsters, 50.0));
//!
//! battle.start().unwrap();
//! let acted = battle
//!     .run_turn(|_, _| Command::UseSkill { skill: SkillId::new("slash"), target: Some(slime) })
//!     .unwrap();
//!
//! assert_eq!(acted, Some(hero));
//! assert_eq!(battle.state(), BattleState::TurnEnd);
//! assert!(battle.actor(slime).unwrap().combat().hp < 50.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod actor;
pub mod arena;
pub mod battle;
pub mod cancel;
pub mod config;
pub mod error;
pub mod event;
pub mod modifier;
pub mod presentation;
pub mod resolver;
pub mod skill;
pub mod state_machine;
pub mod targeting;

pub use actor::{Actor, ActorId, ActorSpec, Team};
pub use arena::Arena;
pub use battle::{Battle, BattleOutcome};
pub use config::EngineConfig;
pub use event::{BattleEvent, EventBus};
pub use skill::{SkillDefinition, SkillId, SkillRegistry};
pub use state_machine::{BattleState, BattleStateMachine, Command};

#[cfg(test)]
mod tests;
