//! Default target choice when nothing forces one.

use std::fmt;

use crate::actor::ActorId;
use crate::arena::{Liveness, Views};

/// Picks a target among candidates.
pub trait AggroResolver: fmt::Debug {
    /// Chooses one of `candidates` for `attacker`, or `None` if none is
    /// acceptable.
    fn select(&self, attacker: ActorId, candidates: &[ActorId], views: &Views) -> Option<ActorId>;
}

/// First living candidate in the given order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLivingAggro;

impl AggroResolver for FirstLivingAggro {
    fn select(&self, _attacker: ActorId, candidates: &[ActorId], views: &Views) -> Option<ActorId> {
        candidates.iter().copied().find(|id| views.is_alive(*id))
    }
}

/// Living candidate with the least health; ties go to the lower id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestHealthAggro;

impl AggroResolver for LowestHealthAggro {
    fn select(&self, _attacker: ActorId, candidates: &[ActorId], views: &Views) -> Option<ActorId> {
        candidates
            .iter()
            .filter_map(|id| views.get(*id))
            .filter(|v| v.alive)
            .min_by(|a, b| a.hp.total_cmp(&b.hp).then(a.id.cmp(&b.id)))
            .map(|v| v.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorSpec, Team};
    use crate::arena::Arena;

    fn arena_with_slimes(hp: &[f32]) -> (Arena, Vec<ActorId>) {
        let mut arena = Arena::new(5);
        let ids = hp
            .iter()
            .map(|max| arena.spawn(ActorSpec::new("Slime", Team::Monsters, *max)))
            .collect();
        (arena, ids)
    }

    #[test]
    fn first_living_skips_dead() {
        let (mut arena, ids) = arena_with_slimes(&[10.0, 20.0]);
        arena.get_mut(ids[0]).unwrap().combat_mut().apply_damage(50.0);

        let pick = FirstLivingAggro.select(ActorId::new(99), &ids, &arena.views());
        assert_eq!(pick, Some(ids[1]));
    }

    #[test]
    fn lowest_health_prefers_weakest_then_lowest_id() {
        let (arena, ids) = arena_with_slimes(&[30.0, 10.0, 10.0]);
        let pick = LowestHealthAggro.select(ActorId::new(99), &ids, &arena.views());
        assert_eq!(pick, Some(ids[1]));
    }

    #[test]
    fn no_living_candidate() {
        let (mut arena, ids) = arena_with_slimes(&[10.0]);
        arena.get_mut(ids[0]).unwrap().combat_mut().apply_damage(50.0);
        assert_eq!(
            LowestHealthAggro.select(ActorId::new(99), &ids, &arena.views()),
            None
        );
    }
}
