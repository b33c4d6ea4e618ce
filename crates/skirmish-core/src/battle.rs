//! Battle driver tying actors, skills and phases together.
//!
//! A [`Battle`] owns every piece of battle state and walks it through the
//! phase cycle:
//!
//! 1. **TURN START**: pick the next living actor, tick its cooldowns
//! 2. **MOVE / COMMAND**: the actor steps forward and a command is chosen
//!    (incapacitated actors are forced to skip)
//! 3. **EXECUTE**: resolve targets, apply the skill, resolve modifiers
//! 4. **RETURN / TURN END**: tick the actor's effects and forced target
//!
//! Skill hooks only propose [`Modifier`]s; the driver hands them to the
//! [`CombatResolver`] after each registry operation and cleans up any actor
//! the resolver reports as defeated.
//!
//! # Determinism
//!
//! - Actors live in a `BTreeMap` and act in (speed desc, id asc) order
//! - Every random roll comes from one `ChaCha8Rng` seeded from the config
//!
//! # Example
//!
//! ```
//! use skirmish_core::actor::{ActorSpec, Team};
//! use skirmish_core::battle::{Battle, BattleOutcome};
//! use skirmish_core::config::EngineConfig;
//! use skirmish_core::skill::{EffectSpec, InMemorySkillDatabase, SkillDefinition, SkillId};
//! use skirmish_core::state_machine::Command;
//!
//! let db = InMemorySkillDatabase::from_definitions([
//!     SkillDefinition::new("smite", "Smite").with_effect(EffectSpec::fixed_damage(50.0)),
//! ])
//! .unwrap();
//!
//! let mut battle = Battle::new(EngineConfig::default(), Box::new(db)).unwrap();
//! battle.spawn(ActorSpec::new("Hero", Team::Party, 100.0));
//! battle.spawn(ActorSpec::new("Slime", Team::Monsters, 40.0));
//! battle.start().unwrap();
//!
//! while battle.run_turn(|_, _| Command::UseSkill { skill: SkillId::new("smite"), target: None }).unwrap().is_some() {}
//! battle.finish().unwrap();
//!
//! assert_eq!(battle.outcome(), BattleOutcome::Victory);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::actor::{Actor, ActorId, ActorSpec, Team};
use crate::arena::Arena;
use crate::cancel::{PresentationWait, WaitStatus};
use crate::config::EngineConfig;
use crate::error::{ActionError, ApplyError, ConfigError};
use crate::event::{BattleEvent, EventBus, EventSink};
use crate::modifier::Modifier;
use crate::presentation::{EffectPlayer, NullEffectPlayer};
use crate::resolver::CombatResolver;
use crate::skill::{
    ApplyOutcome, DispelPriority, RegistryContext, SkillDatabase, SkillDefinition, SkillId,
    SkillRegistry, TargetScope,
};
use crate::state_machine::{BattleState, BattleStateMachine, Command};
use crate::targeting::{AggroResolver, LowestHealthAggro};

/// Per-target results of one action.
pub type ActionResults = Vec<(ActorId, Result<ApplyOutcome, ApplyError>)>;

// =============================================================================
// Outcome
// =============================================================================

/// Which side, if any, has won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    /// Every monster is defeated.
    Victory,
    /// Every party member is defeated.
    Defeat,
    /// Both sides still stand.
    Ongoing,
}

// =============================================================================
// Turn Order
// =============================================================================

/// Round-based acting order: speed descending, then id ascending.
///
/// A round is computed from the living actors when the previous one runs out.
/// Actors defeated mid-round are skipped when their slot comes up.
#[derive(Debug, Clone, Default)]
pub struct TurnOrder {
    queue: VecDeque<ActorId>,
    round: u32,
}

impl TurnOrder {
    /// Creates an empty order; the first call to [`next`](Self::next) builds
    /// round 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next living actor to act, or `None` if nobody is alive.
    pub fn next(&mut self, arena: &Arena) -> Option<ActorId> {
        for _ in 0..2 {
            while let Some(id) = self.queue.pop_front() {
                if arena.get(id).is_some_and(Actor::is_alive) {
                    return Some(id);
                }
            }
            self.rebuild(arena);
        }
        None
    }

    /// Actors still waiting to act this round.
    #[must_use]
    pub fn remaining(&self) -> Vec<ActorId> {
        self.queue.iter().copied().collect()
    }

    /// Rounds started so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Forgets the current round.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.round = 0;
    }

    fn rebuild(&mut self, arena: &Arena) {
        let mut living: Vec<&Actor> = arena.actors_sorted().filter(|a| a.is_alive()).collect();
        if living.is_empty() {
            return;
        }
        living.sort_by(|a, b| {
            b.stats()
                .speed
                .total_cmp(&a.stats().speed)
                .then(a.id().cmp(&b.id()))
        });
        self.queue = living.into_iter().map(Actor::id).collect();
        self.round += 1;
        debug!(round = self.round, actors = self.queue.len(), "new round");
    }
}

// =============================================================================
// Battle
// =============================================================================

/// One battle: arena, phases, events and collaborators.
pub struct Battle {
    arena: Arena,
    machine: BattleStateMachine,
    events: EventBus,
    database: Box<dyn SkillDatabase>,
    config: EngineConfig,
    rng: ChaCha8Rng,
    player: Box<dyn EffectPlayer>,
    aggro: Box<dyn AggroResolver>,
    resolver: CombatResolver,
    turn_order: TurnOrder,
    wait: Option<PresentationWait>,
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("arena", &self.arena)
            .field("machine", &self.machine)
            .field("events", &self.events)
            .field("database", &self.database)
            .field("config", &self.config)
            .field("aggro", &self.aggro)
            .field("turn_order", &self.turn_order)
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

impl Battle {
    /// Creates an empty battle.
    ///
    /// Uses [`NullEffectPlayer`] and [`LowestHealthAggro`] until replaced.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if the configuration fails validation.
    pub fn new(config: EngineConfig, database: Box<dyn SkillDatabase>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            arena: Arena::with_pool_capacity(config.default_max_stack, config.pool_capacity),
            machine: BattleStateMachine::new(),
            events: EventBus::new(),
            database,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            player: Box::new(NullEffectPlayer),
            aggro: Box::new(LowestHealthAggro),
            resolver: CombatResolver::new(),
            turn_order: TurnOrder::new(),
            wait: None,
        })
    }

    /// Replaces the presentation hook (builder pattern).
    #[must_use]
    pub fn with_effect_player(mut self, player: Box<dyn EffectPlayer>) -> Self {
        self.player = player;
        self
    }

    /// Replaces the default target picker (builder pattern).
    #[must_use]
    pub fn with_aggro(mut self, aggro: Box<dyn AggroResolver>) -> Self {
        self.aggro = aggro;
        self
    }

    /// Adds an actor. Actors spawned mid-battle join at the next round.
    pub fn spawn(&mut self, spec: ActorSpec) -> ActorId {
        let id = self.arena.spawn(spec);
        debug!(actor = %id, "actor spawned");
        id
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Actor by id.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.arena.get(id)
    }

    /// Mutable actor by id.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.arena.get_mut(id)
    }

    /// The arena.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The phase machine.
    #[must_use]
    pub const fn machine(&self) -> &BattleStateMachine {
        &self.machine
    }

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> BattleState {
        self.machine.current_state()
    }

    /// Actor whose turn it is.
    #[must_use]
    pub const fn current_actor(&self) -> Option<ActorId> {
        self.machine.context().current_actor
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Looks up a skill definition.
    #[must_use]
    pub fn skill(&self, id: &SkillId) -> Option<Arc<SkillDefinition>> {
        self.database.skill_by_id(id)
    }

    /// The event bus, for subscribing.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        self.events.events()
    }

    /// Drains recorded events.
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        self.events.take_events()
    }

    /// Acting order for the rest of the round.
    #[must_use]
    pub const fn turn_order(&self) -> &TurnOrder {
        &self.turn_order
    }

    // -------------------------------------------------------------------------
    // Skill application
    // -------------------------------------------------------------------------

    /// Applies `definition`, cast by `source`, to `target`, then resolves the
    /// proposed modifiers.
    ///
    /// # Errors
    ///
    /// Whatever [`SkillRegistry::apply`] rejects with, or
    /// [`ApplyError::UnknownActor`] if `target` is not in the arena.
    pub fn apply_skill(
        &mut self,
        definition: &Arc<SkillDefinition>,
        source: ActorId,
        target: ActorId,
    ) -> Result<ApplyOutcome, ApplyError> {
        self.with_registry(target, |registry, ctx| registry.apply(definition, source, ctx))
            .unwrap_or_else(|| {
                warn!(actor = %target, skill = %definition.id, "apply to unknown target");
                Err(ApplyError::UnknownActor(target))
            })
    }

    /// Applies `definition` to each target independently.
    ///
    /// One failure does not stop the rest; every target gets its own result.
    pub fn apply_skill_to_group(
        &mut self,
        definition: &Arc<SkillDefinition>,
        source: ActorId,
        targets: &[ActorId],
    ) -> ActionResults {
        targets
            .iter()
            .map(|target| (*target, self.apply_skill(definition, source, *target)))
            .collect()
    }

    /// Dispels up to `count` debuffs from `actor`.
    pub fn remove_debuffs(&mut self, actor: ActorId, count: usize, priority: DispelPriority) -> usize {
        self.with_registry(actor, |registry, ctx| registry.remove_debuffs(count, priority, ctx))
            .unwrap_or(0)
    }

    /// Dispels up to `count` buffs from `actor`.
    pub fn remove_buffs(&mut self, actor: ActorId, count: usize, priority: DispelPriority) -> usize {
        self.with_registry(actor, |registry, ctx| registry.remove_buffs(count, priority, ctx))
            .unwrap_or(0)
    }

    /// Dispels up to `count` ailments from `actor`.
    pub fn remove_status_effects(
        &mut self,
        actor: ActorId,
        count: usize,
        priority: DispelPriority,
    ) -> usize {
        self.with_registry(actor, |registry, ctx| {
            registry.remove_status_effects(count, priority, ctx)
        })
        .unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Phases
    // -------------------------------------------------------------------------

    /// Moves from `None` through `Initialize` to `BattleStart`.
    ///
    /// # Errors
    ///
    /// [`ActionError::Transition`] if the battle already started.
    pub fn start(&mut self) -> Result<(), ActionError> {
        self.machine
            .transition_to(BattleState::Initialize, &mut self.events)?;
        self.turn_order.clear();
        self.machine
            .transition_to(BattleState::BattleStart, &mut self.events)?;
        info!(
            actors = self.arena.actor_count(),
            seed = self.config.seed,
            "battle started"
        );
        Ok(())
    }

    /// Starts the next turn.
    ///
    /// Returns the acting actor, or `None` once a side has won; in that case
    /// the machine has moved to `BattleResult`.
    ///
    /// # Errors
    ///
    /// [`ActionError::WrongPhase`] outside `BattleStart` / `TurnEnd`.
    pub fn begin_turn(&mut self) -> Result<Option<ActorId>, ActionError> {
        let state = self.state();
        if !matches!(state, BattleState::BattleStart | BattleState::TurnEnd) {
            return Err(ActionError::WrongPhase(state));
        }

        let outcome = self.outcome();
        if outcome != BattleOutcome::Ongoing {
            self.machine
                .transition_to(BattleState::BattleResult, &mut self.events)?;
            info!(?outcome, "battle decided");
            return Ok(None);
        }

        let actor = self.turn_order.next(&self.arena).ok_or(ActionError::NoActor)?;
        self.machine
            .transition_to(BattleState::TurnStart, &mut self.events)?;
        self.machine.set_turn_info(actor);
        if let Some(a) = self.arena.get_mut(actor) {
            a.cooldowns_mut().advance_turn();
        }

        let turn = self.machine.context().turn_number;
        debug!(actor = %actor, turn, "turn started");
        self.events.emit(BattleEvent::TurnChanged { turn, actor });
        Ok(Some(actor))
    }

    /// The acting actor steps forward.
    ///
    /// # Errors
    ///
    /// [`ActionError::Transition`] outside `TurnStart`.
    pub fn move_actor(&mut self) -> Result<(), ActionError> {
        self.machine
            .transition_to(BattleState::CharacterMove, &mut self.events)?;
        self.arm_wait();
        Ok(())
    }

    /// Records the acting actor's command.
    ///
    /// An incapacitated actor's command is replaced with [`Command::Skip`];
    /// the command actually recorded is returned.
    ///
    /// # Errors
    ///
    /// [`ActionError::NoActor`] without an acting actor, or
    /// [`ActionError::Transition`] outside `CharacterMove`.
    pub fn select_command(&mut self, command: Command) -> Result<Command, ActionError> {
        let actor = self.current_actor().ok_or(ActionError::NoActor)?;
        self.machine
            .transition_to(BattleState::CommandSelect, &mut self.events)?;

        let incapacitated = self.arena.get(actor).is_some_and(Actor::is_incapacitated);
        let command = if incapacitated {
            debug!(actor = %actor, "incapacitated, skipping");
            Command::Skip
        } else {
            command
        };
        self.machine.set_command(command.clone());
        Ok(command)
    }

    /// Executes the recorded command.
    ///
    /// A `Skip` (or missing) command does nothing and stays in
    /// `CommandSelect`; follow with [`return_actor`](Self::return_actor).
    /// Cooldown is consumed only if at least one application succeeded.
    ///
    /// # Errors
    ///
    /// Checked before anything changes:
    /// - [`ActionError::WrongPhase`] outside `CommandSelect`
    /// - [`ActionError::UnknownSkill`], [`ActionError::Incapacitated`],
    ///   [`ActionError::SkillSealed`], [`ActionError::OnCooldown`]
    /// - [`ActionError::NoTarget`] if the scope has no living target
    pub fn execute_action(&mut self) -> Result<ActionResults, ActionError> {
        let state = self.state();
        if state != BattleState::CommandSelect {
            return Err(ActionError::WrongPhase(state));
        }
        let actor = self.current_actor().ok_or(ActionError::NoActor)?;
        let Some(Command::UseSkill { skill, target }) = self.machine.context().command.clone()
        else {
            return Ok(Vec::new());
        };

        let definition = self.database.skill_by_id(&skill).ok_or_else(|| {
            warn!(actor = %actor, skill = %skill, "unknown skill");
            ActionError::UnknownSkill(skill.clone())
        })?;
        let caster = self.arena.get(actor).ok_or(ActionError::UnknownActor(actor))?;
        if caster.is_incapacitated() {
            return Err(ActionError::Incapacitated(actor));
        }
        if caster.cannot_use_skill() {
            debug!(actor = %actor, skill = %skill, "skills sealed");
            return Err(ActionError::SkillSealed(actor));
        }
        if !caster.cooldowns().can_use_skill(&skill) {
            let remaining = caster.cooldowns().remaining_cooldown(&skill);
            debug!(actor = %actor, skill = %skill, remaining, "skill on cooldown");
            return Err(ActionError::OnCooldown { skill, remaining });
        }

        let targets = self.resolve_targets(actor, &definition, target)?;
        self.machine
            .transition_to(BattleState::ActionExecute, &mut self.events)?;
        self.machine.set_target(targets.first().copied());

        let results = self.apply_skill_to_group(&definition, actor, &targets);
        if results.iter().any(|(_, r)| r.is_ok()) {
            if let Some(a) = self.arena.get_mut(actor) {
                a.cooldowns_mut().use_skill(&definition);
            }
        }
        debug!(actor = %actor, skill = %skill, targets = targets.len(), "action executed");
        Ok(results)
    }

    /// The acting actor steps back.
    ///
    /// # Errors
    ///
    /// [`ActionError::Transition`] outside `CommandSelect` / `ActionExecute`.
    pub fn return_actor(&mut self) -> Result<(), ActionError> {
        self.machine
            .transition_to(BattleState::CharacterReturn, &mut self.events)?;
        self.arm_wait();
        Ok(())
    }

    /// Closes the turn: ticks the acting actor's effects, resolves what they
    /// propose, then runs its forced-target countdown and liveness check.
    ///
    /// # Errors
    ///
    /// [`ActionError::NoActor`] without an acting actor, or
    /// [`ActionError::Transition`] outside `CharacterReturn`.
    pub fn end_turn(&mut self) -> Result<(), ActionError> {
        let actor = self.current_actor().ok_or(ActionError::NoActor)?;
        self.machine
            .transition_to(BattleState::TurnEnd, &mut self.events)?;

        let expired = self
            .with_registry(actor, |registry, ctx| registry.update_turn(ctx))
            .unwrap_or(0);

        let views = self.arena.views();
        if let Some(a) = self.arena.get_mut(actor) {
            let (forced, flags) = a.forced_target_mut();
            forced.on_turn_end_check(&views, flags, &mut self.events);
        }
        debug!(actor = %actor, expired, "turn ended");
        Ok(())
    }

    /// Moves from `BattleResult` to `BattleEnd` and reports the result.
    ///
    /// # Errors
    ///
    /// [`ActionError::Transition`] outside `BattleResult`.
    pub fn finish(&mut self) -> Result<BattleOutcome, ActionError> {
        self.machine
            .transition_to(BattleState::BattleEnd, &mut self.events)?;
        self.wait = None;
        let outcome = self.outcome();
        info!(?outcome, turns = self.machine.context().turn_number, "battle finished");
        Ok(outcome)
    }

    /// Runs one whole turn, asking `chooser` for the command.
    ///
    /// A rejected action is logged and the turn still completes. Returns
    /// `None` once a side has won.
    ///
    /// # Errors
    ///
    /// Phase errors from any step.
    pub fn run_turn(
        &mut self,
        chooser: impl FnOnce(&Self, ActorId) -> Command,
    ) -> Result<Option<ActorId>, ActionError> {
        let Some(actor) = self.begin_turn()? else {
            return Ok(None);
        };
        self.move_actor()?;
        let command = chooser(self, actor);
        self.select_command(command)?;
        if let Err(err) = self.execute_action() {
            warn!(actor = %actor, error = %err, "action rejected");
        }
        self.tick_frame(0.0);
        self.return_actor()?;
        self.end_turn()?;
        Ok(Some(actor))
    }

    /// Per-frame update: registers pending instances and advances the
    /// presentation wait.
    ///
    /// Returns `Finished` when no wait is outstanding. A `Cancelled` wait is
    /// dropped; the caller abandons whatever it was waiting for.
    pub fn tick_frame(&mut self, dt: f32) -> WaitStatus {
        for actor in self.arena.actors_sorted_mut() {
            actor.skills_mut().drain_pending();
        }

        let Some(wait) = self.wait.as_mut() else {
            return WaitStatus::Finished;
        };
        let status = wait.tick(dt);
        if status != WaitStatus::Pending {
            self.wait = None;
        }
        status
    }

    /// Which side has won, if any.
    #[must_use]
    pub fn outcome(&self) -> BattleOutcome {
        if self.arena.team_defeated(Team::Party) {
            BattleOutcome::Defeat
        } else if self.arena.team_defeated(Team::Monsters) {
            BattleOutcome::Victory
        } else {
            BattleOutcome::Ongoing
        }
    }

    /// Tears the battle down for reuse.
    ///
    /// Actors and events are dropped, the RNG is reseeded and the machine
    /// returns to `None`. An outstanding presentation wait reports
    /// `Cancelled` on the next [`tick_frame`](Self::tick_frame).
    pub fn reset(&mut self) {
        self.machine.reset();
        self.arena = Arena::with_pool_capacity(self.config.default_max_stack, self.config.pool_capacity);
        self.events.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.turn_order.clear();
        info!("battle reset");
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Runs `f` against `actor`'s registry, then resolves the modifiers it
    /// proposed. `None` if the actor does not exist.
    fn with_registry<T>(
        &mut self,
        actor: ActorId,
        f: impl FnOnce(&mut SkillRegistry, &mut RegistryContext<'_>) -> T,
    ) -> Option<T> {
        let views = self.arena.views();
        let mut modifiers = Vec::new();
        let result = {
            let registry = self.arena.get_mut(actor)?.skills_mut();
            let mut ctx = RegistryContext {
                views: &views,
                rng: &mut self.rng,
                events: &mut self.events,
                player: self.player.as_mut(),
                modifiers: &mut modifiers,
            };
            f(registry, &mut ctx)
        };
        self.resolve(&modifiers);
        Some(result)
    }

    fn resolve(&mut self, modifiers: &[Modifier]) {
        if modifiers.is_empty() {
            return;
        }
        let defeated = self
            .resolver
            .resolve(modifiers, &mut self.arena, &mut self.events);
        for actor in defeated {
            self.on_defeated(actor);
        }
    }

    /// Strips a defeated actor of its effects and forced target.
    fn on_defeated(&mut self, actor: ActorId) {
        info!(actor = %actor, "actor defeated");
        self.with_registry(actor, |registry, ctx| registry.clear(ctx));
        if let Some(a) = self.arena.get_mut(actor) {
            let (forced, flags) = a.forced_target_mut();
            forced.clear_forced_target(flags, &mut self.events);
        }
    }

    fn arm_wait(&mut self) {
        self.wait = Some(PresentationWait::new(
            self.config.presentation_wait_secs,
            self.machine.cancellation_token(),
        ));
    }

    /// Targets for `definition` cast by `actor`, honoring forced targets for
    /// single-enemy skills.
    fn resolve_targets(
        &mut self,
        actor: ActorId,
        definition: &SkillDefinition,
        preferred: Option<ActorId>,
    ) -> Result<Vec<ActorId>, ActionError> {
        let team = self
            .arena
            .get(actor)
            .map(Actor::team)
            .ok_or(ActionError::UnknownActor(actor))?;
        let no_target = || {
            debug!(actor = %actor, skill = %definition.id, "no living target");
            ActionError::NoTarget(definition.id.clone())
        };

        let targets = match definition.scope {
            TargetScope::Caster => vec![actor],
            TargetScope::AllAllies => self.arena.living(team),
            TargetScope::AllEnemies => self.arena.living(team.opponent()),
            TargetScope::SingleAlly => {
                let allies = self.arena.living(team);
                preferred
                    .filter(|p| allies.contains(p))
                    .or_else(|| allies.first().copied())
                    .into_iter()
                    .collect()
            }
            TargetScope::SingleEnemy => {
                let candidates = self.arena.living(team.opponent());
                if candidates.is_empty() {
                    return Err(no_target());
                }
                let views = self.arena.views();
                let aggro = self.aggro.as_ref();
                let events = &mut self.events;
                let Some(caster) = self.arena.get_mut(actor) else {
                    return Err(ActionError::UnknownActor(actor));
                };
                let (forced, flags) = caster.forced_target_mut();
                let pick = match preferred.filter(|p| candidates.contains(p)) {
                    Some(p) => Some(forced.current_target(p, &views)),
                    None => forced.select_target(&candidates, &views, aggro, flags, events),
                };
                pick.into_iter().collect()
            }
        };

        if targets.is_empty() {
            return Err(no_target());
        }
        Ok(targets)
    }
}
