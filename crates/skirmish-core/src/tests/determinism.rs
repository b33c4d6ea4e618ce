//! Determinism verification tests.
//!
//! These tests verify that a battle produces identical results when:
//! - Started with the same seed
//! - Given identical commands
//!
//! This is critical for:
//! - Replay systems
//! - Networked multiplayer
//! - Debug reproducibility

use crate::actor::{ActorId, StatKind, Team};
use crate::battle::Battle;
use crate::config::EngineConfig;
use crate::event::BattleEvent;
use crate::skill::{
    DispelPriority, EffectSpec, InMemorySkillDatabase, SkillDefinition, SkillId, StatusType,
};

use super::helpers::{init_tracing, spawn, use_skill};

/// Skills whose outcome depends on the battle RNG.
fn chancy_database() -> InMemorySkillDatabase {
    InMemorySkillDatabase::from_definitions([
        SkillDefinition::new("daze", "Daze")
            .with_effect(EffectSpec::status(StatusType::Stun, 1).with_chance(0.5)),
        SkillDefinition::new("jab", "Jab").with_effect(EffectSpec::fixed_damage(4.0)),
        SkillDefinition::new("hex", "Hex")
            .with_effect(EffectSpec::debuff(StatKind::Attack, 1.0, 4).with_chance(0.7))
            .stackable(true),
        SkillDefinition::new("curse", "Curse")
            .with_effect(EffectSpec::debuff(StatKind::Defense, 1.0, 4))
            .stackable(true),
    ])
    .unwrap()
}

fn seeded_battle(seed: u64) -> (Battle, Vec<ActorId>) {
    init_tracing();
    let mut battle = Battle::new(
        EngineConfig::default().with_seed(seed),
        Box::new(chancy_database()),
    )
    .unwrap();
    let ids = vec![
        spawn(&mut battle, "Knight", Team::Party, 80.0, 20.0),
        spawn(&mut battle, "Mage", Team::Party, 50.0, 12.0),
        spawn(&mut battle, "Orc", Team::Monsters, 90.0, 15.0),
        spawn(&mut battle, "Imp", Team::Monsters, 40.0, 8.0),
    ];
    (battle, ids)
}

/// Runs up to `turns` turns, cycling skills by turn number.
fn play(seed: u64, turns: usize) -> Vec<BattleEvent> {
    let (mut battle, _) = seeded_battle(seed);
    battle.start().unwrap();
    for _ in 0..turns {
        let step = battle.run_turn(|b, _| match b.machine().context().turn_number % 3 {
            0 => use_skill("daze"),
            1 => use_skill("hex"),
            _ => use_skill("jab"),
        });
        if step.unwrap().is_none() {
            break;
        }
    }
    battle.take_events()
}

#[test]
fn same_seed_same_event_log() {
    let first = play(1234, 40);
    let second = play(1234, 40);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn random_dispel_is_reproducible() {
    let dispelled = |seed: u64| {
        let (mut battle, ids) = seeded_battle(seed);
        let curse = battle.skill(&SkillId::new("curse")).unwrap();
        for _ in 0..5 {
            battle.apply_skill(&curse, ids[0], ids[2]).unwrap();
        }
        battle.tick_frame(0.0);
        battle.take_events();

        assert_eq!(battle.remove_debuffs(ids[2], 2, DispelPriority::Random), 2);
        battle.take_events()
    };

    assert_eq!(dispelled(77), dispelled(77));
}

#[test]
fn reset_restores_seeded_rng() {
    let (mut battle, _) = seeded_battle(9);
    battle.start().unwrap();
    for _ in 0..10 {
        battle.run_turn(|_, _| use_skill("daze")).unwrap();
    }
    let first = battle.take_events();

    battle.reset();
    spawn(&mut battle, "Knight", Team::Party, 80.0, 20.0);
    spawn(&mut battle, "Mage", Team::Party, 50.0, 12.0);
    spawn(&mut battle, "Orc", Team::Monsters, 90.0, 15.0);
    spawn(&mut battle, "Imp", Team::Monsters, 40.0, 8.0);
    battle.start().unwrap();
    for _ in 0..10 {
        battle.run_turn(|_, _| use_skill("daze")).unwrap();
    }

    assert_eq!(battle.take_events(), first);
}
