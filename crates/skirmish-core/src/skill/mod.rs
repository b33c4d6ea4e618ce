//! Skills: definitions, runtime instances and the per-actor registry.
//!
//! # Architecture
//!
//! - [`SkillDefinition`] / [`EffectSpec`]: immutable templates, usually
//!   loaded through a [`SkillDatabase`]
//! - [`SkillFactory`]: validates definitions and hands out pooled
//!   [`SkillInstance`]s
//! - [`SkillRegistry`]: owns the instances applied to one actor and runs
//!   their lifecycle
//! - [`CooldownTracker`]: gates when an actor may use a skill again
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use skirmish_core::actor::{ActorSpec, Team};
//! use skirmish_core::arena::Arena;
//! use skirmish_core::event::BattleEvent;
//! use skirmish_core::presentation::NullEffectPlayer;
//! use skirmish_core::skill::{EffectSpec, RegistryContext, SkillDefinition, StatusType};
//!
//! let mut arena = Arena::new(5);
//! let hero = arena.spawn(ActorSpec::new("Hero", Team::Party, 100.0));
//! let slime = arena.spawn(ActorSpec::new("Slime", Team::Monsters, 40.0));
//!
//! let stun = Arc::new(
//!     SkillDefinition::new("stun", "Stun").with_effect(EffectSpec::status(StatusType::Stun, 2)),
//! );
//!
//! let views = arena.views();
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let mut events: Vec<BattleEvent> = Vec::new();
//! let mut player = NullEffectPlayer;
//! let mut modifiers = Vec::new();
//! let mut ctx = RegistryContext {
//!     views: &views,
//!     rng: &mut rng,
//!     events: &mut events,
//!     player: &mut player,
//!     modifiers: &mut modifiers,
//! };
//!
//! let registry = arena.get_mut(slime).unwrap().skills_mut();
//! registry.apply(&stun, hero, &mut ctx).unwrap();
//! assert!(registry.is_incapacitated());
//! ```

mod cooldown;
mod database;
mod definition;
mod dispel;
mod factory;
mod instance;
mod registry;

pub use cooldown::CooldownTracker;
pub use database::{InMemorySkillDatabase, SkillDatabase};
pub use definition::{
    EffectGroup, EffectKind, EffectSpec, SkillCategory, SkillDefinition, SkillId, StatusType,
    TargetScope,
};
pub use dispel::{order_for_dispel, DispelCandidate, DispelPriority};
pub use factory::{validate_skill_data, InstancePool, PooledSkillFactory, SkillFactory};
pub use instance::{mitigated_damage, EffectContext, InstanceId, InstanceState, SkillInstance};
pub use registry::{ApplyOutcome, RegistryContext, SkillRegistry};
