//! Combat resolver: turns proposed modifiers into actor mutations.
//!
//! The `CombatResolver` handles:
//! - damage (shield first, reflection, defeat detection)
//! - healing and life steal
//! - shield, stat, status flag and reflect adjustments
//! - cooldown disruption
//! - forced-target set and clear requests
//!
//! # Processing Order
//!
//! Modifiers are applied in emission order. Reflected damage is applied
//! immediately after the hit that caused it, before the next modifier.
//!
//! # Destruction Handling
//!
//! When an actor's health reaches zero the `DEFEATED` flag is raised and an
//! [`BattleEvent::ActorDefeated`] fires. The actor stays in the arena; the
//! caller gets the list of newly defeated actors back and decides what to
//! clean up.

use std::collections::VecDeque;
use tracing::trace;

use crate::actor::ActorId;
use crate::arena::Arena;
use crate::event::{BattleEvent, EventSink};
use crate::modifier::{DamageKind, Modifier};

/// Applies [`Modifier`]s to the arena.
///
/// # Example
///
/// ```
/// use skirmish_core::actor::{ActorSpec, Team};
/// use skirmish_core::arena::Arena;
/// use skirmish_core::event::BattleEvent;
/// use skirmish_core::modifier::{DamageKind, Modifier};
/// use skirmish_core::resolver::CombatResolver;
///
/// let mut arena = Arena::new(5);
/// let hero = arena.spawn(ActorSpec::new("Hero", Team::Party, 100.0));
/// let slime = arena.spawn(ActorSpec::new("Slime", Team::Monsters, 10.0));
///
/// let mut events: Vec<BattleEvent> = Vec::new();
/// let defeated = CombatResolver::new().resolve(
///     &[Modifier::ApplyDamage { source: hero, target: slime, amount: 15.0, kind: DamageKind::Normal }],
///     &mut arena,
///     &mut events,
/// );
/// assert_eq!(defeated, vec![slime]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies `modifiers` in order and returns the actors defeated by them.
    ///
    /// Modifiers naming unknown actors are skipped.
    pub fn resolve(
        &self,
        modifiers: &[Modifier],
        arena: &mut Arena,
        events: &mut dyn EventSink,
    ) -> Vec<ActorId> {
        let mut defeated = Vec::new();
        let mut queue: VecDeque<Modifier> = modifiers.iter().cloned().collect();

        while let Some(modifier) = queue.pop_front() {
            trace!(?modifier, "resolve");
            match modifier {
                Modifier::ApplyDamage {
                    source,
                    target,
                    amount,
                    kind,
                } => {
                    if let Some(reflected) =
                        Self::apply_damage(arena, source, target, amount, kind, events, &mut defeated)
                    {
                        queue.push_front(reflected);
                    }
                }
                Modifier::LifeSteal {
                    source,
                    target,
                    amount,
                    ratio,
                } => {
                    let landed = Self::landed_damage(arena, target, amount);
                    if let Some(reflected) = Self::apply_damage(
                        arena,
                        source,
                        target,
                        amount,
                        DamageKind::Normal,
                        events,
                        &mut defeated,
                    ) {
                        queue.push_front(reflected);
                    }
                    queue.push_front(Modifier::ApplyHealing {
                        target: source,
                        amount: landed * ratio,
                    });
                }
                Modifier::ApplyHealing { target, amount } => {
                    if let Some(actor) = arena.get_mut(target) {
                        let restored = actor.combat_mut().heal(amount);
                        if restored > 0.0 {
                            events.emit(BattleEvent::Healed {
                                target,
                                amount: restored,
                            });
                        }
                    }
                }
                Modifier::AddShield { target, amount } => {
                    if let Some(actor) = arena.get_mut(target) {
                        actor.combat_mut().shield += amount.max(0.0);
                    }
                }
                Modifier::RemoveShield { target, amount } => {
                    if let Some(actor) = arena.get_mut(target) {
                        let combat = actor.combat_mut();
                        combat.shield = (combat.shield - amount.max(0.0)).max(0.0);
                    }
                }
                Modifier::ModifyStat {
                    target,
                    stat,
                    delta,
                } => {
                    if let Some(actor) = arena.get_mut(target) {
                        actor.stats_mut().add(stat, delta);
                    }
                }
                Modifier::SetStatusFlag {
                    target,
                    flag,
                    value,
                } => {
                    if let Some(actor) = arena.get_mut(target) {
                        actor.combat_mut().status_flags.set(flag, value);
                    }
                }
                Modifier::AdjustReflect { target, delta } => {
                    if let Some(actor) = arena.get_mut(target) {
                        let combat = actor.combat_mut();
                        combat.reflect_ratio = (combat.reflect_ratio + delta).max(0.0);
                    }
                }
                Modifier::IncreaseCooldowns { target, turns } => {
                    if let Some(actor) = arena.get_mut(target) {
                        actor.cooldowns_mut().increase_cooldowns(turns);
                    }
                }
                Modifier::SetForcedTarget {
                    owner,
                    target,
                    turns,
                    taunt,
                } => {
                    let views = arena.views();
                    if let Some(actor) = arena.get_mut(owner) {
                        let (forced, flags) = actor.forced_target_mut();
                        forced.set_forced_target(target, turns, taunt, &views, flags, events);
                    }
                }
                Modifier::ClearForcedTarget { owner, if_target } => {
                    if let Some(actor) = arena.get_mut(owner) {
                        let (forced, flags) = actor.forced_target_mut();
                        let matches = match if_target {
                            Some(t) => forced.target() == Some(t) || forced.taunter() == Some(t),
                            None => true,
                        };
                        if matches {
                            forced.clear_forced_target(flags, events);
                        }
                    }
                }
            }
        }
        defeated
    }

    /// Damage that would land (shield plus health) without applying it.
    fn landed_damage(arena: &Arena, target: ActorId, amount: f32) -> f32 {
        arena.get(target).map_or(0.0, |actor| {
            let combat = actor.combat();
            if combat.is_alive() {
                amount.max(0.0).min(combat.shield + combat.hp)
            } else {
                0.0
            }
        })
    }

    /// Applies one hit and returns the reflected counter-hit, if any.
    fn apply_damage(
        arena: &mut Arena,
        source: ActorId,
        target: ActorId,
        amount: f32,
        kind: DamageKind,
        events: &mut dyn EventSink,
        defeated: &mut Vec<ActorId>,
    ) -> Option<Modifier> {
        let actor = arena.get_mut(target)?;
        let reflect_ratio = actor.combat().reflect_ratio;
        let result = actor.combat_mut().apply_damage(amount);
        if result.absorbed <= 0.0 && result.dealt <= 0.0 {
            return None;
        }

        events.emit(BattleEvent::DamageTaken {
            target,
            source,
            absorbed: result.absorbed,
            dealt: result.dealt,
        });
        if result.defeated {
            events.emit(BattleEvent::ActorDefeated { actor: target });
            defeated.push(target);
        }

        let landed = result.absorbed + result.dealt;
        (kind != DamageKind::Reflected && reflect_ratio > 0.0 && source != target).then(|| {
            Modifier::ApplyDamage {
                source: target,
                target: source,
                amount: landed * reflect_ratio,
                kind: DamageKind::Reflected,
            }
        })
    }
}
