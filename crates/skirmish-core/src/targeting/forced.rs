//! Forced targets and taunts.
//!
//! Each actor carries one [`ForcedTarget`] relation. While it holds, the
//! actor's single-target skills go to the forced target no matter what the
//! player or the aggro resolver would pick. A taunt additionally records the
//! taunter and raises the owner's `TAUNTED` flag.
//!
//! The relation ends when its countdown runs out, when the forced target or
//! the taunter dies (checked at turn end), or when it is cleared explicitly.
//! Every clear fires exactly one [`BattleEvent::ForcedTargetCleared`].

use tracing::{debug, warn};

use crate::actor::{ActorId, StatusFlags};
use crate::arena::{Liveness, Views};
use crate::event::{BattleEvent, EventSink};

use super::aggro::AggroResolver;

/// One actor's forced-target relation.
///
/// # Example
///
/// ```
/// use skirmish_core::actor::{ActorSpec, StatusFlags, Team};
/// use skirmish_core::arena::Arena;
/// use skirmish_core::event::BattleEvent;
/// use skirmish_core::targeting::ForcedTarget;
///
/// let mut arena = Arena::new(5);
/// let knight = arena.spawn(ActorSpec::new("Knight", Team::Party, 100.0));
/// let orc = arena.spawn(ActorSpec::new("Orc", Team::Monsters, 80.0));
///
/// let mut forced = ForcedTarget::new(orc);
/// let mut flags = StatusFlags::empty();
/// let mut events: Vec<BattleEvent> = Vec::new();
///
/// assert!(forced.set_forced_target(knight, 2, true, &arena, &mut flags, &mut events));
/// assert_eq!(forced.current_target(orc, &arena), knight);
/// assert!(flags.contains(StatusFlags::TAUNTED));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedTarget {
    owner: ActorId,
    target: Option<ActorId>,
    remain_turns: u32,
    active: bool,
    taunter: Option<ActorId>,
}

impl ForcedTarget {
    /// Creates an empty relation for `owner`.
    #[must_use]
    pub const fn new(owner: ActorId) -> Self {
        Self {
            owner,
            target: None,
            remain_turns: 0,
            active: false,
            taunter: None,
        }
    }

    /// Forces the owner onto `target` for `remain_turns` turns (0 means
    /// until cleared).
    ///
    /// Returns false, changing nothing, for the owner itself or a target that
    /// is unknown or dead. A different existing forced target is cleared
    /// first.
    pub fn set_forced_target(
        &mut self,
        target: ActorId,
        remain_turns: u32,
        is_taunt: bool,
        alive: &impl Liveness,
        flags: &mut StatusFlags,
        events: &mut dyn EventSink,
    ) -> bool {
        if target == self.owner {
            warn!(actor = %self.owner, "forced target cannot be the owner");
            return false;
        }
        if !alive.is_alive(target) {
            warn!(actor = %self.owner, target = %target, "forced target is not a living actor");
            return false;
        }
        if self.active && self.target != Some(target) {
            self.clear_forced_target(flags, events);
        }

        self.target = Some(target);
        self.remain_turns = remain_turns;
        self.active = true;
        if is_taunt {
            self.taunter = Some(target);
            flags.insert(StatusFlags::TAUNTED);
        } else {
            // A plain force replaces a taunt on the same target.
            self.taunter = None;
            flags.remove(StatusFlags::TAUNTED);
        }

        debug!(actor = %self.owner, target = %target, remain_turns, taunt = is_taunt, "forced target set");
        events.emit(BattleEvent::ForcedTargetSet {
            owner: self.owner,
            target,
            remain_turns,
            taunt: is_taunt,
        });
        true
    }

    /// Drops the relation. Returns false if nothing was set.
    pub fn clear_forced_target(
        &mut self,
        flags: &mut StatusFlags,
        events: &mut dyn EventSink,
    ) -> bool {
        if !self.active && self.taunter.is_none() {
            return false;
        }
        self.target = None;
        self.remain_turns = 0;
        self.active = false;
        self.taunter = None;
        flags.remove(StatusFlags::TAUNTED);

        debug!(actor = %self.owner, "forced target cleared");
        events.emit(BattleEvent::ForcedTargetCleared { owner: self.owner });
        true
    }

    /// True while a forced target is set and alive.
    #[must_use]
    pub fn has_forced_target(&self, alive: &impl Liveness) -> bool {
        self.active && self.target.is_some_and(|t| alive.is_alive(t))
    }

    /// The target the owner must attack instead of `default`.
    ///
    /// The forced target wins; failing that a living taunter; failing that
    /// `default`.
    #[must_use]
    pub fn current_target(&self, default: ActorId, alive: &impl Liveness) -> ActorId {
        if self.has_forced_target(alive) {
            if let Some(target) = self.target {
                return target;
            }
        }
        match self.taunter {
            Some(taunter) if alive.is_alive(taunter) => taunter,
            _ => default,
        }
    }

    /// Picks a target among `candidates`.
    ///
    /// The forced target is returned when it is a living candidate. A forced
    /// target that is dead or not a candidate is cleared, and selection falls
    /// through to `aggro`, then to the first living candidate.
    pub fn select_target(
        &mut self,
        candidates: &[ActorId],
        views: &Views,
        aggro: &dyn AggroResolver,
        flags: &mut StatusFlags,
        events: &mut dyn EventSink,
    ) -> Option<ActorId> {
        if self.active {
            match self.target {
                Some(target) if views.is_alive(target) && candidates.contains(&target) => {
                    return Some(target);
                }
                _ => {
                    self.clear_forced_target(flags, events);
                }
            }
        }
        aggro
            .select(self.owner, candidates, views)
            .filter(|id| candidates.contains(id))
            .or_else(|| candidates.iter().copied().find(|id| views.is_alive(*id)))
    }

    /// Turn-end bookkeeping. Returns true if the relation was cleared.
    pub fn on_turn_end_check(
        &mut self,
        alive: &impl Liveness,
        flags: &mut StatusFlags,
        events: &mut dyn EventSink,
    ) -> bool {
        if let Some(taunter) = self.taunter {
            if !alive.is_alive(taunter) {
                debug!(actor = %self.owner, taunter = %taunter, "taunter gone");
                return self.clear_forced_target(flags, events);
            }
        }
        if !self.active {
            return false;
        }
        if let Some(target) = self.target {
            if !alive.is_alive(target) {
                debug!(actor = %self.owner, target = %target, "forced target gone");
                return self.clear_forced_target(flags, events);
            }
        }
        if self.remain_turns > 0 {
            self.remain_turns -= 1;
            if self.remain_turns == 0 {
                return self.clear_forced_target(flags, events);
            }
        }
        false
    }

    /// Adds `turns` to a running countdown. Indefinite or absent relations
    /// are left alone.
    pub fn extend_forced_target_turns(&mut self, turns: u32) -> bool {
        if !self.active || self.remain_turns == 0 {
            return false;
        }
        self.remain_turns = self.remain_turns.saturating_add(turns);
        true
    }

    /// Actor this relation belongs to.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Forced target, regardless of liveness.
    #[must_use]
    pub const fn target(&self) -> Option<ActorId> {
        self.target
    }

    /// Turns left; 0 while indefinite or unset.
    #[must_use]
    pub const fn remain_turns(&self) -> u32 {
        self.remain_turns
    }

    /// Actor that taunted the owner, if any.
    #[must_use]
    pub const fn taunter(&self) -> Option<ActorId> {
        self.taunter
    }

    /// True while a relation is set, even if its target died.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.active
    }
}
