//! Arena module for the battle simulation.
//!
//! The Arena is the container for all actors in a battle. It provides:
//! - Actor storage with deterministic iteration order (`BTreeMap`)
//! - Actor lifecycle management (spawn/despawn)
//! - Liveness queries used by target selection and the forced-target module
//! - Read-only [`Views`] snapshots consumed by skill effect hooks
//!
//! # Snapshots
//!
//! Effect hooks and forced-target checks run while one actor is mutably
//! borrowed out of the arena, so they cannot look at other actors directly.
//! Instead the caller takes a [`Views`] snapshot first:
//!
//! ```
//! use skirmish_core::arena::{Arena, Liveness};
//! use skirmish_core::actor::{ActorSpec, Team};
//!
//! let mut arena = Arena::new(5);
//! let hero = arena.spawn(ActorSpec::new("Hero", Team::Party, 100.0));
//! let slime = arena.spawn(ActorSpec::new("Slime", Team::Monsters, 30.0));
//!
//! let views = arena.views();
//! assert!(views.is_alive(slime));
//! assert_eq!(views.get(hero).unwrap().hp, 100.0);
//! ```

use std::collections::BTreeMap;

use crate::actor::{Actor, ActorId, ActorSpec, Stats, StatusFlags, Team};
use crate::skill::{PooledSkillFactory, SkillRegistry};

// =============================================================================
// Liveness
// =============================================================================

/// Answers whether an actor exists and is still alive.
///
/// A reference to an unknown actor is treated the same as a dead one.
pub trait Liveness {
    /// Returns true if `id` refers to a living actor.
    fn is_alive(&self, id: ActorId) -> bool;
}

// =============================================================================
// Views
// =============================================================================

/// Read-only copy of the parts of an actor that effect hooks consult.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorView {
    /// Actor id.
    pub id: ActorId,
    /// Team.
    pub team: Team,
    /// Current stats.
    pub stats: Stats,
    /// Current health.
    pub hp: f32,
    /// Maximum health.
    pub max_hp: f32,
    /// Current shield.
    pub shield: f32,
    /// Status flags.
    pub flags: StatusFlags,
    /// Whether the actor is alive.
    pub alive: bool,
}

impl ActorView {
    fn of(actor: &Actor) -> Self {
        let combat = actor.combat();
        Self {
            id: actor.id(),
            team: actor.team(),
            stats: *actor.stats(),
            hp: combat.hp,
            max_hp: combat.max_hp,
            shield: combat.shield,
            flags: combat.status_flags,
            alive: actor.is_alive(),
        }
    }
}

/// Snapshot of every actor in the arena, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Views {
    views: BTreeMap<ActorId, ActorView>,
}

impl Views {
    /// Returns the view of one actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&ActorView> {
        self.views.get(&id)
    }

    /// Iterates views in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorView> + '_ {
        self.views.values()
    }

    /// Inserts or replaces a view. Mostly useful for building test fixtures.
    pub fn insert(&mut self, view: ActorView) {
        self.views.insert(view.id, view);
    }

    /// Number of actors in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns true if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl Liveness for Views {
    fn is_alive(&self, id: ActorId) -> bool {
        self.views.get(&id).is_some_and(|v| v.alive)
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Battle arena containing all actors.
///
/// The Arena uses a `BTreeMap` so iterating actors always produces the same
/// sequence. Actor IDs are assigned monotonically and never reused.
///
/// # Example
///
/// ```
/// use skirmish_core::arena::Arena;
/// use skirmish_core::actor::{ActorSpec, Team};
///
/// let mut arena = Arena::new(5);
/// let a = arena.spawn(ActorSpec::new("Hero", Team::Party, 100.0));
/// let b = arena.spawn(ActorSpec::new("Mage", Team::Party, 60.0));
///
/// let ids: Vec<_> = arena.actor_ids_sorted().collect();
/// assert_eq!(ids, vec![a, b]);
/// ```
#[derive(Debug)]
pub struct Arena {
    /// Monotonically increasing actor ID counter.
    next_id: u64,
    /// Actor storage with deterministic iteration order.
    actors: BTreeMap<ActorId, Actor>,
    /// Stack cap handed to every new actor's registry.
    default_max_stack: u32,
    /// Pool capacity handed to every new actor's factory.
    pool_capacity: usize,
}

impl Arena {
    /// Creates a new empty arena whose actors use `default_max_stack` when a
    /// stackable effect declares no cap.
    #[must_use]
    pub fn new(default_max_stack: u32) -> Self {
        Self::with_pool_capacity(default_max_stack, PooledSkillFactory::DEFAULT_CAPACITY)
    }

    /// Creates an arena with an explicit per-actor instance pool capacity.
    #[must_use]
    pub fn with_pool_capacity(default_max_stack: u32, pool_capacity: usize) -> Self {
        Self {
            next_id: 0,
            actors: BTreeMap::new(),
            default_max_stack,
            pool_capacity,
        }
    }

    /// Spawns a new actor and returns its id.
    ///
    /// The actor gets its own skill registry backed by a pooled factory.
    pub fn spawn(&mut self, spec: ActorSpec) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;

        let factory = PooledSkillFactory::with_capacity(self.pool_capacity);
        let registry = SkillRegistry::new(id, Box::new(factory), self.default_max_stack);
        self.actors.insert(id, Actor::new(id, spec, registry));
        id
    }

    /// Removes an actor from the arena.
    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    /// Returns a reference to an actor by ID.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Returns a mutable reference to an actor by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Returns an iterator over actor IDs in sorted order.
    pub fn actor_ids_sorted(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    /// Returns an iterator over actors in sorted order.
    pub fn actors_sorted(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.values()
    }

    /// Returns an iterator over mutable actors in sorted order.
    pub fn actors_sorted_mut(&mut self) -> impl Iterator<Item = &mut Actor> + '_ {
        self.actors.values_mut()
    }

    /// Living members of `team`, in id order.
    #[must_use]
    pub fn living(&self, team: Team) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|a| a.team() == team && a.is_alive())
            .map(Actor::id)
            .collect()
    }

    /// True if every member of `team` is defeated (or the team is empty).
    #[must_use]
    pub fn team_defeated(&self, team: Team) -> bool {
        !self
            .actors
            .values()
            .any(|a| a.team() == team && a.is_alive())
    }

    /// Takes a read-only snapshot of every actor.
    #[must_use]
    pub fn views(&self) -> Views {
        Views {
            views: self
                .actors
                .iter()
                .map(|(id, actor)| (*id, ActorView::of(actor)))
                .collect(),
        }
    }

    /// Returns the number of actors in the arena.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Returns true if the arena has no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl Liveness for Arena {
    fn is_alive(&self, id: ActorId) -> bool {
        self.actors.get(&id).is_some_and(Actor::is_alive)
    }
}

// =============================================================================
// Tests
// =============================================================================
