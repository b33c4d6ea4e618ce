//! Battle events and the event bus.
//!
//! Components report what happened through an [`EventSink`]. The battle owns
//! an [`EventBus`] which records every event for later draining and forwards
//! it synchronously to subscribers.
//!
//! # Usage
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use skirmish_core::event::{BattleEvent, EventBus, EventSink};
//! use skirmish_core::state_machine::BattleState;
//!
//! let mut bus = EventBus::new();
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! let sub = bus.subscribe(Box::new(move |_| counter.set(counter.get() + 1)));
//!
//! bus.emit(BattleEvent::StateChanged {
//!     from: BattleState::None,
//!     to: BattleState::Initialize,
//! });
//! assert_eq!(seen.get(), 1);
//! assert_eq!(bus.take_events().len(), 1);
//!
//! assert!(bus.unsubscribe(sub));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::actor::ActorId;
use crate::skill::{InstanceId, SkillId};
use crate::state_machine::BattleState;

// =============================================================================
// Events
// =============================================================================

/// Why an instance left a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Its end condition held during a per-turn update.
    Expired,
    /// Evicted to make room under the stack cap.
    Evicted,
    /// Removed by a dispel.
    Dispelled,
    /// The registry was cleared.
    Cleared,
}

/// Something observable that happened during a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    /// `owner` must now attack `target`.
    ForcedTargetSet {
        /// Actor whose targeting is overridden.
        owner: ActorId,
        /// Forced target.
        target: ActorId,
        /// Countdown; 0 means indefinite.
        remain_turns: u32,
        /// Whether the target taunted the owner.
        taunt: bool,
    },

    /// `owner` is free to choose targets again.
    ForcedTargetCleared {
        /// Actor whose override ended.
        owner: ActorId,
    },

    /// The battle entered a new phase.
    StateChanged {
        /// Previous phase.
        from: BattleState,
        /// New phase.
        to: BattleState,
    },

    /// A new turn began.
    TurnChanged {
        /// 1-based turn number.
        turn: u32,
        /// Acting actor.
        actor: ActorId,
    },

    /// A skill landed on an actor.
    SkillApplied {
        /// Affected actor.
        owner: ActorId,
        /// Caster.
        source: ActorId,
        /// Skill.
        skill: SkillId,
        /// Instance created for it.
        instance: InstanceId,
    },

    /// A non-stackable skill was reapplied and its duration refreshed.
    SkillRefreshed {
        /// Affected actor.
        owner: ActorId,
        /// Skill.
        skill: SkillId,
        /// Instance that was refreshed.
        instance: InstanceId,
        /// New remaining turns.
        remain_turns: i32,
    },

    /// An instance left an actor's registry.
    SkillRemoved {
        /// Affected actor.
        owner: ActorId,
        /// Skill.
        skill: SkillId,
        /// Removed instance.
        instance: InstanceId,
        /// Cause.
        reason: RemovalReason,
    },

    /// Damage reached an actor.
    DamageTaken {
        /// Victim.
        target: ActorId,
        /// Attacker.
        source: ActorId,
        /// Soaked by the shield.
        absorbed: f32,
        /// Subtracted from health.
        dealt: f32,
    },

    /// An actor regained health.
    Healed {
        /// Healed actor.
        target: ActorId,
        /// Amount actually restored.
        amount: f32,
    },

    /// An actor's health reached zero.
    ActorDefeated {
        /// Defeated actor.
        actor: ActorId,
    },
}

// =============================================================================
// Sinks
// =============================================================================

/// Destination for emitted events.
pub trait EventSink {
    /// Delivers one event.
    fn emit(&mut self, event: BattleEvent);
}

impl EventSink for Vec<BattleEvent> {
    fn emit(&mut self, event: BattleEvent) {
        self.push(event);
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Subscriber callback.
pub type Subscriber = Box<dyn FnMut(&BattleEvent)>;

/// Records events and forwards them to subscribers in subscription order.
#[derive(Default)]
pub struct EventBus {
    log: Vec<BattleEvent>,
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
    next_subscription: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("log", &self.log)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked for every subsequent event.
    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.insert(id, subscriber);
        id
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Drains and returns every recorded event, oldest first.
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.log)
    }

    /// Recorded events not yet drained.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        &self.log
    }

    /// Returns the number of events currently in the log.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.log.len()
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Clears all events from the log without returning them.
    pub fn clear(&mut self) {
        self.log.clear();
    }
}

impl EventSink for EventBus {
    fn emit(&mut self, event: BattleEvent) {
        for subscriber in self.subscribers.values_mut() {
            subscriber(&event);
        }
        self.log.push(event);
    }
}
