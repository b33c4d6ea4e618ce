//! Test helper functions for setting up battles and skills.
//!
//! This module provides the shared skill catalog and factory functions that
//! make writing battle tests more ergonomic and consistent.

use std::sync::Arc;

use crate::actor::{ActorId, ActorSpec, StatKind, Stats, Team};
use crate::battle::Battle;
use crate::config::EngineConfig;
use crate::event::BattleEvent;
use crate::skill::{
    EffectSpec, InMemorySkillDatabase, SkillDefinition, SkillId, StatusType, TargetScope,
};
use crate::state_machine::Command;

// =============================================================================
// Logging
// =============================================================================

/// Routes `tracing` output through the test harness. Safe to call from every
/// test; only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Skill Catalog
// =============================================================================

/// Every skill the shared database knows.
pub fn catalog() -> Vec<SkillDefinition> {
    vec![
        SkillDefinition::new("strike", "Strike").with_effect(EffectSpec::fixed_damage(10.0)),
        SkillDefinition::new("slash", "Slash").with_effect(EffectSpec::damage(12.0)),
        SkillDefinition::new("provoke", "Provoke")
            .with_effect(EffectSpec::status(StatusType::Taunt, 2)),
        SkillDefinition::new("stun", "Stun").with_effect(EffectSpec::status(StatusType::Stun, 2)),
        SkillDefinition::new("silence", "Silence")
            .with_effect(EffectSpec::status(StatusType::Silence, 2)),
        SkillDefinition::new("poison", "Poison")
            .with_effect(
                EffectSpec::status(StatusType::Poison, 3)
                    .with_value(5.0)
                    .with_max_stack(3),
            )
            .stackable(true),
        SkillDefinition::new("weaken", "Weaken")
            .with_effect(EffectSpec::debuff(StatKind::Defense, 2.0, 3)),
        SkillDefinition::new("sunder", "Sunder")
            .with_effect(EffectSpec::debuff(StatKind::Attack, 4.0, 5)),
        SkillDefinition::new("guard", "Guard")
            .with_effect(EffectSpec::shield(20.0, 3))
            .with_scope(TargetScope::Caster),
        SkillDefinition::new("rally", "Rally")
            .with_effect(EffectSpec::buff(StatKind::Attack, 5.0, 2))
            .with_scope(TargetScope::AllAllies),
        SkillDefinition::new("mend", "Mend")
            .with_effect(EffectSpec::heal(15.0))
            .with_scope(TargetScope::SingleAlly),
    ]
}

/// Database over [`catalog`].
pub fn standard_database() -> InMemorySkillDatabase {
    InMemorySkillDatabase::from_definitions(catalog()).expect("catalog is valid")
}

// =============================================================================
// Battle Setup
// =============================================================================

/// Empty battle over the standard database.
pub fn new_battle(seed: u64) -> Battle {
    init_tracing();
    Battle::new(EngineConfig::default().with_seed(seed), Box::new(standard_database()))
        .expect("default config is valid")
}

/// Spawns an actor with explicit health and speed.
pub fn spawn(battle: &mut Battle, name: &str, team: Team, hp: f32, speed: f32) -> ActorId {
    battle.spawn(ActorSpec::new(name, team, hp).with_stats(Stats::new(10.0, 0.0, speed)))
}

/// One hero against one slime; the hero is faster.
pub fn duel(seed: u64) -> (Battle, ActorId, ActorId) {
    let mut battle = new_battle(seed);
    let hero = spawn(&mut battle, "Hero", Team::Party, 100.0, 20.0);
    let slime = spawn(&mut battle, "Slime", Team::Monsters, 60.0, 5.0);
    (battle, hero, slime)
}

/// Looks up a catalog skill.
pub fn skill(battle: &Battle, id: &str) -> Arc<SkillDefinition> {
    battle
        .skill(&SkillId::new(id))
        .unwrap_or_else(|| panic!("no skill {id}"))
}

/// `UseSkill` command with no preferred target.
pub fn use_skill(id: &str) -> Command {
    Command::UseSkill {
        skill: SkillId::new(id),
        target: None,
    }
}

/// `UseSkill` command aimed at `target`.
pub fn use_skill_on(id: &str, target: ActorId) -> Command {
    Command::UseSkill {
        skill: SkillId::new(id),
        target: Some(target),
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Current health of an actor.
pub fn get_hp(battle: &Battle, id: ActorId) -> f32 {
    battle.actor(id).expect("actor exists").combat().hp
}

/// Number of recorded events matching `pred`.
pub fn count_events(battle: &Battle, pred: impl Fn(&BattleEvent) -> bool) -> usize {
    battle.events().iter().filter(|e| pred(e)).count()
}
