//! End-to-end tests of the battle driver.
//!
//! These tests drive whole turns through [`Battle`] and verify that skill
//! application, modifier resolution, forced targets and the phase machine
//! work together.

use std::cell::RefCell;
use std::rc::Rc;

use crate::actor::{ActorId, StatusFlags, Team};
use crate::battle::{Battle, BattleOutcome};
use crate::error::ActionError;
use crate::event::{BattleEvent, RemovalReason};
use crate::skill::StatusType;
use crate::state_machine::{BattleState, Command};

use super::helpers::{
    count_events, duel, get_hp, new_battle, skill, spawn, use_skill, use_skill_on,
};

fn skip(_: &Battle, _: ActorId) -> Command {
    Command::Skip
}

// =============================================================================
// Forced Targets
// =============================================================================

#[test]
fn taunt_redirects_single_target_attack_then_expires() {
    let mut battle = new_battle(3);
    let knight = spawn(&mut battle, "Knight", Team::Party, 100.0, 20.0);
    let mage = spawn(&mut battle, "Mage", Team::Party, 70.0, 15.0);
    let orc = spawn(&mut battle, "Orc", Team::Monsters, 500.0, 10.0);
    battle.start().unwrap();

    assert_eq!(
        battle.run_turn(|_, _| use_skill_on("provoke", orc)).unwrap(),
        Some(knight)
    );
    let orc_actor = battle.actor(orc).unwrap();
    assert_eq!(orc_actor.forced_target().target(), Some(knight));
    assert!(orc_actor.combat().status_flags.contains(StatusFlags::TAUNTED));

    assert_eq!(battle.run_turn(skip).unwrap(), Some(mage));
    assert_eq!(
        battle.run_turn(|_, _| use_skill_on("strike", mage)).unwrap(),
        Some(orc)
    );
    assert_eq!(get_hp(&battle, knight), 90.0);
    assert_eq!(get_hp(&battle, mage), 70.0);
    assert_eq!(battle.actor(orc).unwrap().forced_target().remain_turns(), 1);

    for _ in 0..3 {
        battle.run_turn(skip).unwrap();
    }

    let orc_actor = battle.actor(orc).unwrap();
    assert!(!orc_actor.forced_target().is_set());
    assert!(!orc_actor.skills().has_status(StatusType::Taunt));
    assert!(!orc_actor.combat().status_flags.contains(StatusFlags::TAUNTED));
    assert_eq!(
        count_events(&battle, |e| matches!(e, BattleEvent::ForcedTargetCleared { .. })),
        1
    );
}

#[test]
fn forced_target_death_falls_back_to_aggro() {
    let mut battle = new_battle(3);
    let knight = spawn(&mut battle, "Knight", Team::Party, 100.0, 20.0);
    let mage = spawn(&mut battle, "Mage", Team::Party, 70.0, 15.0);
    let orc = spawn(&mut battle, "Orc", Team::Monsters, 500.0, 10.0);
    battle.start().unwrap();

    battle.run_turn(|_, _| use_skill_on("provoke", orc)).unwrap();
    battle.actor_mut(knight).unwrap().combat_mut().apply_damage(1_000.0);
    battle.run_turn(skip).unwrap();

    assert_eq!(battle.run_turn(|_, _| use_skill("strike")).unwrap(), Some(orc));
    assert_eq!(get_hp(&battle, mage), 60.0);
    assert!(!battle.actor(orc).unwrap().forced_target().is_set());
}

// =============================================================================
// Effects Over Turns
// =============================================================================

#[test]
fn poison_ticks_on_victim_turn_until_defeat() {
    let mut battle = new_battle(5);
    let hero = spawn(&mut battle, "Hero", Team::Party, 100.0, 20.0);
    let slime = spawn(&mut battle, "Slime", Team::Monsters, 12.0, 5.0);
    let poison = skill(&battle, "poison");
    battle.start().unwrap();
    battle.apply_skill(&poison, hero, slime).unwrap();

    battle.run_turn(skip).unwrap();
    battle.run_turn(skip).unwrap();
    assert_eq!(get_hp(&battle, slime), 7.0);

    battle.run_turn(skip).unwrap();
    battle.run_turn(skip).unwrap();
    assert_eq!(get_hp(&battle, slime), 2.0);

    battle.run_turn(skip).unwrap();
    battle.run_turn(skip).unwrap();
    assert_eq!(get_hp(&battle, slime), 0.0);

    assert_eq!(battle.run_turn(skip).unwrap(), None);
    assert_eq!(battle.state(), BattleState::BattleResult);
    assert_eq!(battle.finish().unwrap(), BattleOutcome::Victory);
    assert_eq!(
        count_events(&battle, |e| *e == BattleEvent::ActorDefeated { actor: slime }),
        1
    );
}

#[test]
fn defeat_clears_remaining_effects() {
    let (mut battle, hero, slime) = duel(5);
    let stun = skill(&battle, "stun");
    let strike = skill(&battle, "strike");

    battle.apply_skill(&stun, hero, slime).unwrap();
    for _ in 0..6 {
        battle.apply_skill(&strike, hero, slime).unwrap();
    }

    let registry = battle.actor(slime).unwrap().skills();
    assert_eq!(registry.active_count(), 0);
    assert!(!battle.actor(slime).unwrap().is_alive());
    assert_eq!(
        count_events(&battle, |e| matches!(
            e,
            BattleEvent::SkillRemoved { reason: RemovalReason::Cleared, .. }
        )),
        1
    );
}

#[test]
fn silenced_actor_cannot_use_skills() {
    let (mut battle, hero, slime) = duel(5);
    let silence = skill(&battle, "silence");
    battle.start().unwrap();
    battle.apply_skill(&silence, hero, slime).unwrap();
    battle.run_turn(skip).unwrap();

    assert_eq!(battle.begin_turn().unwrap(), Some(slime));
    battle.move_actor().unwrap();
    assert_eq!(
        battle.select_command(use_skill("strike")).unwrap(),
        use_skill("strike")
    );
    assert_eq!(battle.execute_action(), Err(ActionError::SkillSealed(slime)));
    battle.return_actor().unwrap();
    battle.end_turn().unwrap();

    assert_eq!(get_hp(&battle, hero), 100.0);
    assert!(battle.actor(slime).unwrap().skills().has_status(StatusType::Silence));
}

#[test]
fn shield_absorbs_before_health() {
    let (mut battle, hero, _) = duel(5);
    battle.start().unwrap();

    battle.run_turn(|_, _| use_skill("guard")).unwrap();
    assert_eq!(battle.actor(hero).unwrap().combat().shield, 20.0);

    battle.run_turn(|_, _| use_skill("strike")).unwrap();
    let combat = battle.actor(hero).unwrap().combat();
    assert_eq!(combat.hp, 100.0);
    assert_eq!(combat.shield, 10.0);
    assert!(battle.events().iter().any(|e| matches!(
        e,
        BattleEvent::DamageTaken { target, absorbed, dealt, .. }
            if *target == hero && *absorbed == 10.0 && *dealt == 0.0
    )));
}

#[test]
fn mend_heals_chosen_ally() {
    let mut battle = new_battle(5);
    let knight = spawn(&mut battle, "Knight", Team::Party, 100.0, 20.0);
    let mage = spawn(&mut battle, "Mage", Team::Party, 70.0, 15.0);
    spawn(&mut battle, "Slime", Team::Monsters, 60.0, 5.0);
    battle.actor_mut(mage).unwrap().combat_mut().apply_damage(30.0);
    battle.start().unwrap();

    assert_eq!(
        battle.run_turn(|_, _| use_skill_on("mend", mage)).unwrap(),
        Some(knight)
    );
    assert_eq!(get_hp(&battle, mage), 55.0);
    assert!(battle
        .events()
        .contains(&BattleEvent::Healed { target: mage, amount: 15.0 }));
}

#[test]
fn rally_buffs_every_ally() {
    let mut battle = new_battle(5);
    let knight = spawn(&mut battle, "Knight", Team::Party, 100.0, 20.0);
    let mage = spawn(&mut battle, "Mage", Team::Party, 70.0, 15.0);
    let slime = spawn(&mut battle, "Slime", Team::Monsters, 60.0, 5.0);
    battle.start().unwrap();

    battle.run_turn(|_, _| use_skill("rally")).unwrap();

    for id in [knight, mage] {
        let actor = battle.actor(id).unwrap();
        assert_eq!(actor.stats().attack, 15.0);
        assert_eq!(actor.skills().active_count(), 1);
    }
    assert_eq!(battle.actor(slime).unwrap().stats().attack, 10.0);
}

// =============================================================================
// Whole Battles
// =============================================================================

#[test]
fn full_battle_reaches_victory() {
    let mut battle = new_battle(9);
    spawn(&mut battle, "Knight", Team::Party, 100.0, 20.0);
    spawn(&mut battle, "Mage", Team::Party, 70.0, 15.0);
    spawn(&mut battle, "Slime A", Team::Monsters, 60.0, 10.0);
    spawn(&mut battle, "Slime B", Team::Monsters, 60.0, 5.0);
    battle.start().unwrap();

    let mut turns = 0;
    while battle
        .run_turn(|b, actor| match b.actor(actor).map(|a| a.team()) {
            Some(Team::Party) => use_skill("slash"),
            _ => use_skill("strike"),
        })
        .unwrap()
        .is_some()
    {
        turns += 1;
        assert!(turns < 100, "battle did not finish");
    }

    assert_eq!(battle.finish().unwrap(), BattleOutcome::Victory);
    assert_eq!(
        count_events(&battle, |e| matches!(e, BattleEvent::ActorDefeated { .. })),
        2
    );
    assert_eq!(
        battle.events().last(),
        Some(&BattleEvent::StateChanged {
            from: BattleState::BattleResult,
            to: BattleState::BattleEnd,
        })
    );
}

#[test]
fn subscribers_see_events_until_unsubscribed() {
    let (mut battle, _, _) = duel(2);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = battle
        .events_mut()
        .subscribe(Box::new(move |event| sink.borrow_mut().push(event.clone())));

    battle.start().unwrap();
    assert_eq!(seen.borrow().len(), 2);

    assert!(battle.events_mut().unsubscribe(id));
    battle.run_turn(skip).unwrap();
    assert_eq!(seen.borrow().len(), 2);
    assert!(battle.events().len() > 2);
}
