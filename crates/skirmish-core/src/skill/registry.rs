//! Per-actor store of applied skill effects.
//!
//! The [`SkillRegistry`] owns every runtime instance attached to one actor.
//! Live instances sit in an id-keyed map and are indexed three ways:
//!
//! - by skill id (overlap resolution, `instances_of`)
//! - by status type (incapacitation, immunity, status dispels)
//! - by effect group (buff/debuff dispels)
//!
//! An instance appears in an index only when its classification is non-empty,
//! and [`remove`](SkillRegistry::remove) clears it from every index before the
//! instance goes back to the factory's pool.
//!
//! # Application
//!
//! [`apply`](SkillRegistry::apply) validates, checks blocking, creates and
//! starts an instance, resolves overlap with instances of the same skill, and
//! then either finishes it on the spot (one-shot skills), registers it (status
//! effects) or parks it in the pending queue until the next
//! [`drain_pending`](SkillRegistry::drain_pending).
//!
//! Every hook writes [`Modifier`]s into the caller's buffer; nothing here
//! touches health or stats directly.

use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

use crate::actor::{ActorId, StatusFlags};
use crate::arena::Views;
use crate::error::{ApplyError, BlockReason};
use crate::event::{BattleEvent, EventSink, RemovalReason};
use crate::modifier::Modifier;
use crate::presentation::EffectPlayer;

use super::definition::{EffectGroup, EffectKind, SkillDefinition, SkillId, StatusType};
use super::dispel::{order_for_dispel, DispelCandidate, DispelPriority};
use super::factory::SkillFactory;
use super::instance::{EffectContext, InstanceId, SkillInstance};

// =============================================================================
// Context
// =============================================================================

/// Everything a registry operation needs from the rest of the battle.
pub struct RegistryContext<'a> {
    /// Snapshot of every actor taken before the operation.
    pub views: &'a Views,
    /// Battle RNG for chance rolls and random dispels.
    pub rng: &'a mut ChaCha8Rng,
    /// Event destination.
    pub events: &'a mut dyn EventSink,
    /// Presentation hook.
    pub player: &'a mut dyn EffectPlayer,
    /// Proposed changes for the combat resolver.
    pub modifiers: &'a mut Vec<Modifier>,
}

impl RegistryContext<'_> {
    fn effects(&mut self) -> EffectContext<'_> {
        EffectContext {
            views: self.views,
            out: &mut *self.modifiers,
        }
    }
}

/// What a successful [`SkillRegistry::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// One-shot skill; it ran start and end and left nothing behind.
    Resolved,
    /// Registered into the indices immediately.
    Registered(InstanceId),
    /// Started and queued until the next drain.
    Queued(InstanceId),
    /// An existing non-stackable instance had its duration refreshed.
    Refreshed(InstanceId),
}

impl ApplyOutcome {
    /// The instance that now represents the application, if any.
    #[must_use]
    pub const fn instance(self) -> Option<InstanceId> {
        match self {
            Self::Resolved => None,
            Self::Registered(id) | Self::Queued(id) | Self::Refreshed(id) => Some(id),
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Every effect currently applied to one actor.
#[derive(Debug)]
pub struct SkillRegistry {
    owner: ActorId,
    active: BTreeMap<InstanceId, SkillInstance>,
    by_skill: BTreeMap<SkillId, Vec<InstanceId>>,
    by_status: BTreeMap<StatusType, Vec<InstanceId>>,
    by_group: BTreeMap<EffectGroup, Vec<InstanceId>>,
    pending: VecDeque<SkillInstance>,
    factory: Box<dyn SkillFactory>,
    next_instance_id: u64,
    default_max_stack: u32,
}

impl SkillRegistry {
    /// Creates an empty registry for `owner`.
    ///
    /// `default_max_stack` caps stackable skills that declare no cap.
    #[must_use]
    pub fn new(owner: ActorId, factory: Box<dyn SkillFactory>, default_max_stack: u32) -> Self {
        Self {
            owner,
            active: BTreeMap::new(),
            by_skill: BTreeMap::new(),
            by_status: BTreeMap::new(),
            by_group: BTreeMap::new(),
            pending: VecDeque::new(),
            factory,
            next_instance_id: 0,
            default_max_stack: default_max_stack.max(1),
        }
    }

    /// The actor this registry belongs to.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    // -------------------------------------------------------------------------
    // Application
    // -------------------------------------------------------------------------

    /// Applies `definition`, cast by `source`, to the owner.
    ///
    /// # Errors
    ///
    /// - [`ApplyError::UnknownActor`] if source or owner is missing
    /// - [`ApplyError::TargetDefeated`] if the owner is dead
    /// - [`ApplyError::InvalidDefinition`] if validation fails
    /// - [`ApplyError::Blocked`] on immunity or curse
    /// - [`ApplyError::FactoryExhausted`] if no instance could be created
    /// - [`ApplyError::StartConditionFailed`] if the instance did not start
    ///
    /// No state changes on error.
    pub fn apply(
        &mut self,
        definition: &Arc<SkillDefinition>,
        source: ActorId,
        ctx: &mut RegistryContext<'_>,
    ) -> Result<ApplyOutcome, ApplyError> {
        let owner = self.owner;
        let skill = &definition.id;

        if ctx.views.get(source).is_none() {
            warn!(actor = %owner, source = %source, skill = %skill, "apply from unknown source");
            return Err(ApplyError::UnknownActor(source));
        }
        let Some(target) = ctx.views.get(owner) else {
            warn!(actor = %owner, skill = %skill, "apply to unknown target");
            return Err(ApplyError::UnknownActor(owner));
        };
        if !target.alive {
            debug!(actor = %owner, skill = %skill, "apply to defeated target");
            return Err(ApplyError::TargetDefeated(owner));
        }
        if let Err(err) = self.factory.validate(definition) {
            warn!(actor = %owner, skill = %skill, error = %err, "invalid skill definition");
            return Err(err.into());
        }
        if let Some(reason) = self.blocked_by(definition) {
            debug!(actor = %owner, skill = %skill, %reason, "skill blocked");
            return Err(ApplyError::Blocked(reason));
        }

        let Some(mut instance) = self.factory.create_skill(definition) else {
            error!(actor = %owner, skill = %skill, "factory produced no instance");
            return Err(ApplyError::FactoryExhausted(skill.clone()));
        };
        let id = InstanceId::new(self.next_instance_id);
        self.next_instance_id += 1;
        instance.initialize(id, source, owner, Arc::clone(definition));

        if !instance.check_start_condition(ctx.views, &mut *ctx.rng) {
            debug!(actor = %owner, skill = %skill, "start condition failed");
            self.factory.return_to_pool(instance);
            return Err(ApplyError::StartConditionFailed(skill.clone()));
        }

        if !instance.is_one_shot() {
            let existing = self.existing_of(skill);
            if !existing.is_empty() {
                if !instance.is_stackable() {
                    return Ok(self.refresh_existing(existing[0], instance, ctx));
                }
                let cap = match instance.max_stack() {
                    n if n > 0 => n.unsigned_abs(),
                    _ => self.default_max_stack,
                };
                if existing.len() >= cap as usize {
                    if let Some(victim) = self.eviction_victim(&existing) {
                        debug!(actor = %owner, skill = %skill, instance = %victim, cap, "stack full, evicting");
                        self.remove(victim, RemovalReason::Evicted, ctx);
                    }
                }
            }
        }

        if let Some(key) = definition.effect_key.as_deref() {
            ctx.player.play_effect(key, owner);
        }
        instance.on_start(&mut ctx.effects());
        ctx.events.emit(BattleEvent::SkillApplied {
            owner,
            source,
            skill: skill.clone(),
            instance: id,
        });

        if instance.is_one_shot() {
            instance.on_end(&mut ctx.effects());
            self.factory.return_to_pool(instance);
            trace!(actor = %owner, skill = %skill, "one-shot resolved");
            Ok(ApplyOutcome::Resolved)
        } else if instance.status_type().is_some() {
            self.register(instance);
            trace!(actor = %owner, skill = %skill, instance = %id, "registered");
            Ok(ApplyOutcome::Registered(id))
        } else {
            self.pending.push_back(instance);
            trace!(actor = %owner, skill = %skill, instance = %id, "queued");
            Ok(ApplyOutcome::Queued(id))
        }
    }

    /// Moves every pending instance into the indices, oldest first.
    pub fn drain_pending(&mut self) -> usize {
        let mut drained = 0;
        while let Some(instance) = self.pending.pop_front() {
            self.register(instance);
            drained += 1;
        }
        drained
    }

    /// Runs the per-turn hooks of every registered instance and removes
    /// those whose end condition holds. Returns the number removed.
    pub fn update_turn(&mut self, ctx: &mut RegistryContext<'_>) -> usize {
        let snapshot: Vec<InstanceId> = self.active.keys().copied().collect();
        let mut ended = Vec::new();

        for id in snapshot {
            if let Some(instance) = self.active.get_mut(&id) {
                instance.on_turn_update(&mut ctx.effects());
                if instance.check_end_condition(ctx.views) {
                    ended.push(id);
                }
            }
        }

        for id in &ended {
            self.remove(*id, RemovalReason::Expired, ctx);
        }
        ended.len()
    }

    /// Ends and releases one instance, registered or pending.
    ///
    /// Returns false if no such instance exists.
    pub fn remove(
        &mut self,
        id: InstanceId,
        reason: RemovalReason,
        ctx: &mut RegistryContext<'_>,
    ) -> bool {
        let mut instance = if let Some(instance) = self.active.remove(&id) {
            self.unindex(&instance);
            instance
        } else if let Some(pos) = self.pending.iter().position(|p| p.id() == id) {
            match self.pending.remove(pos) {
                Some(instance) => instance,
                None => return false,
            }
        } else {
            return false;
        };

        let held_lock = instance.locks_skills();
        instance.on_end(&mut ctx.effects());
        if held_lock && self.any_skill_lock() {
            ctx.modifiers.push(Modifier::SetStatusFlag {
                target: self.owner,
                flag: StatusFlags::CANNOT_USE_SKILL,
                value: true,
            });
        }

        if let Some(skill) = instance.skill_id() {
            debug!(actor = %self.owner, skill = %skill, instance = %id, ?reason, "skill removed");
            ctx.events.emit(BattleEvent::SkillRemoved {
                owner: self.owner,
                skill: skill.clone(),
                instance: id,
                reason,
            });
        }
        self.factory.return_to_pool(instance);
        true
    }

    /// Removes everything. Returns the number of instances removed.
    pub fn clear(&mut self, ctx: &mut RegistryContext<'_>) -> usize {
        let ids: Vec<InstanceId> = self
            .active
            .keys()
            .copied()
            .chain(self.pending.iter().map(SkillInstance::id))
            .collect();
        ids.into_iter()
            .filter(|id| self.remove(*id, RemovalReason::Cleared, ctx))
            .count()
    }

    // -------------------------------------------------------------------------
    // Dispels
    // -------------------------------------------------------------------------

    /// Removes up to `count` Debuff-group instances.
    pub fn remove_debuffs(
        &mut self,
        count: usize,
        priority: DispelPriority,
        ctx: &mut RegistryContext<'_>,
    ) -> usize {
        let ids = self.by_group.get(&EffectGroup::Debuff).cloned().unwrap_or_default();
        self.dispel(ids, count, priority, ctx)
    }

    /// Removes up to `count` Buff-group instances.
    pub fn remove_buffs(
        &mut self,
        count: usize,
        priority: DispelPriority,
        ctx: &mut RegistryContext<'_>,
    ) -> usize {
        let ids = self.by_group.get(&EffectGroup::Buff).cloned().unwrap_or_default();
        self.dispel(ids, count, priority, ctx)
    }

    /// Removes up to `count` ailment status effects.
    pub fn remove_status_effects(
        &mut self,
        count: usize,
        priority: DispelPriority,
        ctx: &mut RegistryContext<'_>,
    ) -> usize {
        let ids = self
            .by_status
            .iter()
            .filter(|(status, _)| status.is_ailment())
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        self.dispel(ids, count, priority, ctx)
    }

    fn dispel(
        &mut self,
        ids: Vec<InstanceId>,
        count: usize,
        priority: DispelPriority,
        ctx: &mut RegistryContext<'_>,
    ) -> usize {
        let candidates = ids
            .into_iter()
            .filter_map(|id| self.active.get(&id))
            .map(|instance| DispelCandidate {
                id: instance.id(),
                remain_turns: instance.remain_turns(),
                magnitude: instance.magnitude(),
            })
            .collect();
        let order = order_for_dispel(candidates, priority, &mut *ctx.rng);

        let removed = order
            .into_iter()
            .take(count)
            .filter(|id| self.remove(*id, RemovalReason::Dispelled, ctx))
            .count();
        debug!(actor = %self.owner, ?priority, requested = count, removed, "dispel");
        removed
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// True if an instance with `status` is registered.
    #[must_use]
    pub fn has_status(&self, status: StatusType) -> bool {
        self.status_count(status) > 0
    }

    /// Number of registered instances with `status`.
    #[must_use]
    pub fn status_count(&self, status: StatusType) -> usize {
        self.by_status.get(&status).map_or(0, Vec::len)
    }

    /// Oldest registered instance with `status`.
    #[must_use]
    pub fn first_with_status(&self, status: StatusType) -> Option<&SkillInstance> {
        self.by_status
            .get(&status)
            .and_then(|ids| ids.first())
            .and_then(|id| self.active.get(id))
    }

    /// Registered instances in `group`, oldest first.
    #[must_use]
    pub fn effects_in_group(&self, group: EffectGroup) -> Vec<&SkillInstance> {
        self.lookup(self.by_group.get(&group))
    }

    /// Registered instances of `skill`, oldest first.
    #[must_use]
    pub fn instances_of(&self, skill: &SkillId) -> Vec<&SkillInstance> {
        self.lookup(self.by_skill.get(skill))
    }

    /// Oldest registered instance of `skill`.
    #[must_use]
    pub fn first_of(&self, skill: &SkillId) -> Option<&SkillInstance> {
        self.by_skill
            .get(skill)
            .and_then(|ids| ids.first())
            .and_then(|id| self.active.get(id))
    }

    /// Stunned, asleep or frozen.
    #[must_use]
    pub fn is_incapacitated(&self) -> bool {
        StatusType::ALL
            .iter()
            .any(|s| s.is_incapacitating() && self.has_status(*s))
    }

    /// Incapacitated or silenced.
    #[must_use]
    pub fn cannot_use_skill(&self) -> bool {
        self.is_incapacitated() || self.has_status(StatusType::Silence)
    }

    /// Always false; use [`effects_in_group`](Self::effects_in_group) for
    /// group membership.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn has_buff(&self) -> bool {
        false
    }

    /// Always false; use [`effects_in_group`](Self::effects_in_group) for
    /// group membership.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn has_debuff(&self) -> bool {
        false
    }

    /// True while an Immunity effect is registered.
    #[must_use]
    pub fn is_immune(&self) -> bool {
        self.has_status(StatusType::Immunity)
    }

    /// Registered instance by id.
    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&SkillInstance> {
        self.active.get(&id)
    }

    /// Mutable registered instance by id, for duration control.
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut SkillInstance> {
        self.active.get_mut(&id)
    }

    /// Registered instances in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillInstance> + '_ {
        self.active.values()
    }

    /// Number of registered instances.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of started instances waiting for the next drain.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn blocked_by(&self, definition: &SkillDefinition) -> Option<BlockReason> {
        if let Some(spec) = definition.first_effect() {
            if spec.kind == EffectKind::StatusEffect {
                if let Some(status) = spec.status.filter(|s| s.is_ailment()) {
                    if self.is_immune() {
                        return Some(BlockReason::Immune(status));
                    }
                }
            }
        }
        if self.is_cursed(definition) {
            return Some(BlockReason::Cursed);
        }
        None
    }

    /// Curse hook. No curse mechanic exists yet, so nothing is ever cursed.
    #[allow(clippy::unused_self)]
    const fn is_cursed(&self, _definition: &SkillDefinition) -> bool {
        false
    }

    /// Registered and pending instances of `skill`, oldest first.
    fn existing_of(&self, skill: &SkillId) -> Vec<InstanceId> {
        let mut ids: Vec<InstanceId> = self.by_skill.get(skill).cloned().unwrap_or_default();
        ids.extend(
            self.pending
                .iter()
                .filter(|p| p.skill_id() == Some(skill))
                .map(SkillInstance::id),
        );
        ids.sort();
        ids
    }

    fn instance(&self, id: InstanceId) -> Option<&SkillInstance> {
        self.active
            .get(&id)
            .or_else(|| self.pending.iter().find(|p| p.id() == id))
    }

    fn instance_mut(&mut self, id: InstanceId) -> Option<&mut SkillInstance> {
        match self.active.get_mut(&id) {
            Some(instance) => Some(instance),
            None => self.pending.iter_mut().find(|p| p.id() == id),
        }
    }

    /// Fewest remaining turns, then oldest.
    fn eviction_victim(&self, ids: &[InstanceId]) -> Option<InstanceId> {
        ids.iter()
            .filter_map(|id| self.instance(*id))
            .min_by_key(|i| (i.remain_turns(), i.id()))
            .map(SkillInstance::id)
    }

    fn refresh_existing(
        &mut self,
        existing: InstanceId,
        incoming: SkillInstance,
        ctx: &mut RegistryContext<'_>,
    ) -> ApplyOutcome {
        let turns = incoming.remain_turns();
        self.factory.return_to_pool(incoming);

        let owner = self.owner;
        if let Some(instance) = self.instance_mut(existing) {
            instance.set_remain_turn(turns);
            instance.on_refresh(&mut ctx.effects());
            if let Some(skill) = instance.skill_id() {
                debug!(actor = %owner, skill = %skill, instance = %existing, turns, "refreshed");
                ctx.events.emit(BattleEvent::SkillRefreshed {
                    owner,
                    skill: skill.clone(),
                    instance: existing,
                    remain_turns: turns,
                });
            }
        }
        ApplyOutcome::Refreshed(existing)
    }

    fn any_skill_lock(&self) -> bool {
        self.active
            .values()
            .chain(self.pending.iter())
            .any(SkillInstance::locks_skills)
    }

    fn register(&mut self, instance: SkillInstance) {
        let id = instance.id();
        if let Some(skill) = instance.skill_id() {
            self.by_skill.entry(skill.clone()).or_default().push(id);
        }
        if let Some(status) = instance.status_type() {
            self.by_status.entry(status).or_default().push(id);
        }
        if instance.effect_group() != EffectGroup::None {
            self.by_group
                .entry(instance.effect_group())
                .or_default()
                .push(id);
        }
        self.active.insert(id, instance);
    }

    fn unindex(&mut self, instance: &SkillInstance) {
        let id = instance.id();
        if let Some(skill) = instance.skill_id() {
            remove_from_index(&mut self.by_skill, skill, id);
        }
        if let Some(status) = instance.status_type() {
            remove_from_index(&mut self.by_status, &status, id);
        }
        remove_from_index(&mut self.by_group, &instance.effect_group(), id);
    }

    fn lookup(&self, ids: Option<&Vec<InstanceId>>) -> Vec<&SkillInstance> {
        ids.map(|ids| ids.iter().filter_map(|id| self.active.get(id)).collect())
            .unwrap_or_default()
    }
}

fn remove_from_index<K: Ord>(index: &mut BTreeMap<K, Vec<InstanceId>>, key: &K, id: InstanceId) {
    if let Some(ids) = index.get_mut(key) {
        ids.retain(|i| *i != id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{StatKind, Stats, Team};
    use crate::arena::ActorView;
    use crate::presentation::RecordingEffectPlayer;
    use crate::skill::{EffectSpec, PooledSkillFactory};
    use rand::SeedableRng;

    const CASTER: ActorId = ActorId::new(0);
    const OWNER: ActorId = ActorId::new(1);

    /// Registry under test plus everything a context borrows.
    struct Fixture {
        registry: SkillRegistry,
        views: Views,
        rng: ChaCha8Rng,
        events: Vec<BattleEvent>,
        player: RecordingEffectPlayer,
        modifiers: Vec<Modifier>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut views = Views::default();
            for (id, team) in [(CASTER, Team::Party), (OWNER, Team::Monsters)] {
                views.insert(ActorView {
                    id,
                    team,
                    stats: Stats::default(),
                    hp: 100.0,
                    max_hp: 100.0,
                    shield: 0.0,
                    flags: StatusFlags::empty(),
                    alive: true,
                });
            }
            Self {
                registry: SkillRegistry::new(OWNER, Box::new(PooledSkillFactory::new()), 5),
                views,
                rng: ChaCha8Rng::seed_from_u64(7),
                events: Vec::new(),
                player: RecordingEffectPlayer::new(),
                modifiers: Vec::new(),
            }
        }

        fn apply(&mut self, definition: &Arc<SkillDefinition>) -> Result<ApplyOutcome, ApplyError> {
            let mut ctx = RegistryContext {
                views: &self.views,
                rng: &mut self.rng,
                events: &mut self.events,
                player: &mut self.player,
                modifiers: &mut self.modifiers,
            };
            self.registry.apply(definition, CASTER, &mut ctx)
        }

        fn update(&mut self) -> usize {
            let mut ctx = RegistryContext {
                views: &self.views,
                rng: &mut self.rng,
                events: &mut self.events,
                player: &mut self.player,
                modifiers: &mut self.modifiers,
            };
            self.registry.update_turn(&mut ctx)
        }

        fn with_ctx<T>(&mut self, f: impl FnOnce(&mut SkillRegistry, &mut RegistryContext<'_>) -> T) -> T {
            let mut ctx = RegistryContext {
                views: &self.views,
                rng: &mut self.rng,
                events: &mut self.events,
                player: &mut self.player,
                modifiers: &mut self.modifiers,
            };
            f(&mut self.registry, &mut ctx)
        }
    }

    fn status(id: &str, status: StatusType, duration: i32) -> Arc<SkillDefinition> {
        Arc::new(SkillDefinition::new(id, id).with_effect(EffectSpec::status(status, duration)))
    }

    fn debuff(id: &str, duration: i32) -> Arc<SkillDefinition> {
        Arc::new(
            SkillDefinition::new(id, id)
                .with_effect(EffectSpec::debuff(StatKind::Defense, 2.0, duration)),
        )
    }

    fn buff(id: &str, duration: i32) -> Arc<SkillDefinition> {
        Arc::new(
            SkillDefinition::new(id, id)
                .with_effect(EffectSpec::buff(StatKind::Attack, 2.0, duration)),
        )
    }

    mod apply_tests {
        use super::*;

        #[test]
        fn status_effect_registers_immediately() {
            let mut fx = Fixture::new();
            let outcome = fx.apply(&status("stun", StatusType::Stun, 2)).unwrap();

            assert!(matches!(outcome, ApplyOutcome::Registered(_)));
            assert!(fx.registry.has_status(StatusType::Stun));
            assert!(fx.registry.is_incapacitated());
            assert!(fx.registry.cannot_use_skill());
            assert_eq!(fx.registry.pending_count(), 0);
        }

        #[test]
        fn other_persistent_effects_wait_for_drain() {
            let mut fx = Fixture::new();
            let outcome = fx.apply(&buff("rage", 2)).unwrap();

            assert!(matches!(outcome, ApplyOutcome::Queued(_)));
            assert_eq!(fx.registry.active_count(), 0);
            assert!(fx.registry.effects_in_group(EffectGroup::Buff).is_empty());

            assert_eq!(fx.registry.drain_pending(), 1);
            assert_eq!(fx.registry.effects_in_group(EffectGroup::Buff).len(), 1);
        }

        #[test]
        fn one_shot_leaves_nothing_behind() {
            let mut fx = Fixture::new();
            let slash = Arc::new(
                SkillDefinition::new("slash", "Slash")
                    .with_effect(EffectSpec::damage(5.0))
                    .with_effect_key("fx_slash"),
            );
            let outcome = fx.apply(&slash).unwrap();

            assert_eq!(outcome, ApplyOutcome::Resolved);
            assert_eq!(fx.registry.active_count(), 0);
            assert_eq!(fx.registry.pending_count(), 0);
            assert_eq!(fx.modifiers.len(), 1);
            assert_eq!(fx.player.played(), &[("fx_slash".to_string(), OWNER)]);
            assert!(matches!(fx.events[0], BattleEvent::SkillApplied { .. }));
        }

        #[test]
        fn unknown_source_is_rejected() {
            let mut fx = Fixture::new();
            let stun = status("stun", StatusType::Stun, 1);
            let mut ctx = RegistryContext {
                views: &fx.views,
                rng: &mut fx.rng,
                events: &mut fx.events,
                player: &mut fx.player,
                modifiers: &mut fx.modifiers,
            };
            let err = fx.registry.apply(&stun, ActorId::new(99), &mut ctx).unwrap_err();
            assert_eq!(err, ApplyError::UnknownActor(ActorId::new(99)));
            assert_eq!(fx.registry.active_count(), 0);
        }

        #[test]
        fn defeated_target_is_rejected() {
            let mut fx = Fixture::new();
            let mut dead = *fx.views.get(OWNER).unwrap();
            dead.alive = false;
            fx.views.insert(dead);

            let err = fx.apply(&status("stun", StatusType::Stun, 1)).unwrap_err();
            assert_eq!(err, ApplyError::TargetDefeated(OWNER));
        }

        #[test]
        fn invalid_definition_is_rejected_without_events() {
            let mut fx = Fixture::new();
            let broken = Arc::new(SkillDefinition::new("broken", "Broken"));
            let err = fx.apply(&broken).unwrap_err();
            assert!(matches!(err, ApplyError::InvalidDefinition(_)));
            assert!(fx.events.is_empty());
        }

        #[test]
        fn immunity_blocks_ailments_only() {
            let mut fx = Fixture::new();
            fx.apply(&status("ward", StatusType::Immunity, 3)).unwrap();

            let err = fx.apply(&status("venom", StatusType::Poison, 3)).unwrap_err();
            assert_eq!(err, ApplyError::Blocked(BlockReason::Immune(StatusType::Poison)));
            assert!(fx.apply(&buff("rage", 2)).is_ok());
        }

        #[test]
        fn missed_chance_roll_pools_instance_back() {
            let mut fx = Fixture::new();
            let never = Arc::new(
                SkillDefinition::new("sleep", "Sleep")
                    .with_effect(EffectSpec::status(StatusType::Sleep, 1).with_chance(0.0)),
            );
            let err = fx.apply(&never).unwrap_err();
            assert!(matches!(err, ApplyError::StartConditionFailed(_)));
            assert_eq!(fx.registry.active_count(), 0);
        }

        #[test]
        fn factory_failure_is_reported() {
            #[derive(Debug)]
            struct EmptyFactory;
            impl SkillFactory for EmptyFactory {
                fn create_skill(&mut self, _: &Arc<SkillDefinition>) -> Option<SkillInstance> {
                    None
                }
                fn return_to_pool(&mut self, _: SkillInstance) {}
            }

            let mut fx = Fixture::new();
            fx.registry = SkillRegistry::new(OWNER, Box::new(EmptyFactory), 5);
            let err = fx.apply(&status("stun", StatusType::Stun, 1)).unwrap_err();
            assert!(matches!(err, ApplyError::FactoryExhausted(_)));
        }
    }

    mod overlap_tests {
        use super::*;

        #[test]
        fn non_stackable_refreshes_existing() {
            let mut fx = Fixture::new();
            let first = fx.apply(&status("stun", StatusType::Stun, 3)).unwrap();
            fx.update();
            let second = fx.apply(&status("stun", StatusType::Stun, 2)).unwrap();

            let id = first.instance().unwrap();
            assert_eq!(second, ApplyOutcome::Refreshed(id));
            assert_eq!(fx.registry.status_count(StatusType::Stun), 1);
            assert_eq!(fx.registry.get(id).unwrap().remain_turns(), 2);
        }

        #[test]
        fn non_stackable_sees_pending_instances() {
            let mut fx = Fixture::new();
            let rage = buff("rage", 3);
            let first = fx.apply(&rage).unwrap();
            let second = fx.apply(&rage).unwrap();

            assert_eq!(second, ApplyOutcome::Refreshed(first.instance().unwrap()));
            assert_eq!(fx.registry.drain_pending(), 1);
        }

        #[test]
        fn stack_cap_evicts_lowest_remaining() {
            let mut fx = Fixture::new();
            let bleed = |turns| {
                Arc::new(
                    SkillDefinition::new("bleed", "Bleed")
                        .with_effect(
                            EffectSpec::status(StatusType::Bleed, turns)
                                .with_value(1.0)
                                .with_max_stack(2),
                        )
                        .stackable(true),
                )
            };
            let long = fx.apply(&bleed(5)).unwrap().instance().unwrap();
            let short = fx.apply(&bleed(1)).unwrap().instance().unwrap();
            let newest = fx.apply(&bleed(3)).unwrap().instance().unwrap();

            let remaining: Vec<InstanceId> = fx
                .registry
                .instances_of(&SkillId::new("bleed"))
                .iter()
                .map(|i| i.id())
                .collect();
            assert_eq!(remaining, vec![long, newest]);
            assert!(fx.registry.get(short).is_none());
            assert!(fx.events.iter().any(|e| matches!(
                e,
                BattleEvent::SkillRemoved { instance, reason: RemovalReason::Evicted, .. } if *instance == short
            )));
        }

        #[test]
        fn unspecified_cap_uses_default() {
            let mut fx = Fixture::new();
            let burn = Arc::new(
                SkillDefinition::new("burn", "Burn")
                    .with_effect(EffectSpec::status(StatusType::Burn, 2).with_value(1.0))
                    .stackable(true),
            );
            for _ in 0..8 {
                fx.apply(&burn).unwrap();
            }
            assert_eq!(fx.registry.status_count(StatusType::Burn), 5);
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn update_turn_expires_instances() {
            let mut fx = Fixture::new();
            fx.apply(&status("stun", StatusType::Stun, 1)).unwrap();
            fx.apply(&status("silence", StatusType::Silence, 2)).unwrap();

            assert_eq!(fx.update(), 1);
            assert!(!fx.registry.is_incapacitated());
            assert!(fx.registry.cannot_use_skill());

            assert_eq!(fx.update(), 1);
            assert_eq!(fx.registry.active_count(), 0);
        }

        #[test]
        fn removal_clears_every_index() {
            let mut fx = Fixture::new();
            let id = fx
                .apply(&status("stun", StatusType::Stun, 3))
                .unwrap()
                .instance()
                .unwrap();

            assert!(fx.with_ctx(|r, ctx| r.remove(id, RemovalReason::Dispelled, ctx)));
            assert!(!fx.with_ctx(|r, ctx| r.remove(id, RemovalReason::Dispelled, ctx)));
            assert!(!fx.registry.has_status(StatusType::Stun));
            assert!(fx.registry.first_of(&SkillId::new("stun")).is_none());
            assert!(fx.registry.get(id).is_none());
        }

        #[test]
        fn overlapping_silences_keep_the_lock() {
            let mut fx = Fixture::new();
            fx.apply(&status("silence_a", StatusType::Silence, 1)).unwrap();
            fx.apply(&status("silence_b", StatusType::Silence, 3)).unwrap();
            fx.modifiers.clear();

            fx.update();

            let last_flag = fx.modifiers.iter().rev().find_map(|m| match m {
                Modifier::SetStatusFlag { value, .. } => Some(*value),
                _ => None,
            });
            assert_eq!(last_flag, Some(true));
        }

        #[test]
        fn clear_removes_registered_and_pending() {
            let mut fx = Fixture::new();
            fx.apply(&status("stun", StatusType::Stun, 3)).unwrap();
            fx.apply(&buff("rage", 3)).unwrap();

            assert_eq!(fx.with_ctx(|r, ctx| r.clear(ctx)), 2);
            assert_eq!(fx.registry.active_count(), 0);
            assert_eq!(fx.registry.pending_count(), 0);
        }

        #[test]
        fn group_queries_stay_false() {
            let mut fx = Fixture::new();
            fx.apply(&buff("rage", 3)).unwrap();
            fx.registry.drain_pending();
            assert!(!fx.registry.has_buff());
            assert!(!fx.registry.has_debuff());
        }
    }

    mod dispel_tests {
        use super::*;

        #[test]
        fn remove_debuffs_leaves_buffs_and_ailments() {
            let mut fx = Fixture::new();
            fx.apply(&debuff("sunder", 3)).unwrap();
            fx.apply(&debuff("weaken", 5)).unwrap();
            fx.apply(&buff("rage", 3)).unwrap();
            fx.apply(&status("venom", StatusType::Poison, 3)).unwrap();
            fx.registry.drain_pending();

            let removed =
                fx.with_ctx(|r, ctx| r.remove_debuffs(10, DispelPriority::Random, ctx));

            assert_eq!(removed, 2);
            assert_eq!(fx.registry.effects_in_group(EffectGroup::Buff).len(), 1);
            assert!(fx.registry.has_status(StatusType::Poison));
        }

        #[test]
        fn remove_status_effects_skips_immunity() {
            let mut fx = Fixture::new();
            fx.apply(&status("stun", StatusType::Stun, 2)).unwrap();
            fx.apply(&status("ward", StatusType::Immunity, 2)).unwrap();

            let removed =
                fx.with_ctx(|r, ctx| r.remove_status_effects(5, DispelPriority::Oldest, ctx));

            assert_eq!(removed, 1);
            assert!(fx.registry.is_immune());
            assert!(!fx.registry.has_status(StatusType::Stun));
        }

        #[test]
        fn remove_buffs_strongest_first() {
            let mut fx = Fixture::new();
            let weak = Arc::new(
                SkillDefinition::new("weak", "Weak")
                    .with_effect(EffectSpec::buff(StatKind::Attack, 1.0, 3)),
            );
            let strong = Arc::new(
                SkillDefinition::new("strong", "Strong")
                    .with_effect(EffectSpec::buff(StatKind::Attack, 9.0, 3)),
            );
            fx.apply(&weak).unwrap();
            fx.apply(&strong).unwrap();
            fx.registry.drain_pending();

            fx.with_ctx(|r, ctx| r.remove_buffs(1, DispelPriority::Strongest, ctx));

            assert!(fx.registry.first_of(&SkillId::new("weak")).is_some());
            assert!(fx.registry.first_of(&SkillId::new("strong")).is_none());
        }
    }
}
