//! Runtime skill instances.
//!
//! A [`SkillInstance`] is one live application of a [`SkillDefinition`] to a
//! (source, owner) pair. Instances are handed out blank by a
//! [`SkillFactory`](super::SkillFactory), bound with
//! [`initialize`](SkillInstance::initialize), and driven through their hooks by
//! the owning [`SkillRegistry`](super::SkillRegistry):
//!
//! ```text
//! initialize -> check_start_condition -> on_start            (Pending -> Active)
//!            -> { on_turn_update -> check_end_condition }*
//!            -> on_end                                       (Active -> Ended)
//! ```
//!
//! Hooks never touch actors. They read a [`Views`] snapshot and push
//! [`Modifier`]s into the [`EffectContext`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::actor::{ActorId, StatusFlags};
use crate::arena::{Liveness, Views};
use crate::modifier::{DamageKind, Modifier};

use super::definition::{EffectGroup, EffectKind, EffectSpec, SkillDefinition, SkillId, StatusType};

// =============================================================================
// Instance Id
// =============================================================================

/// Identifier of a runtime instance, unique within a registry and never
/// reused. Lower ids were applied earlier.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Context
// =============================================================================

/// Lifecycle state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceState {
    /// Created, not yet started.
    #[default]
    Pending,
    /// Start hook ran.
    Active,
    /// End hook ran.
    Ended,
}

/// What effect hooks may see and where they write.
#[derive(Debug)]
pub struct EffectContext<'a> {
    /// Snapshot of every actor taken before the hook ran.
    pub views: &'a Views,
    /// Proposed changes, applied later by the combat resolver.
    pub out: &'a mut Vec<Modifier>,
}

/// Damage after attack scaling and defense mitigation.
///
/// ```
/// use skirmish_core::skill::mitigated_damage;
///
/// assert_eq!(mitigated_damage(10.0, 10.0, 0.0), 20.0);
/// assert_eq!(mitigated_damage(10.0, 10.0, 100.0), 10.0);
/// ```
#[must_use]
pub fn mitigated_damage(value: f32, attack: f32, defense: f32) -> f32 {
    let raw = (value + attack).max(0.0);
    raw * 100.0 / (100.0 + defense.max(0.0))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_turns(value: f32) -> u32 {
    value.max(0.0).round() as u32
}

#[allow(clippy::cast_sign_loss)]
fn turns_left(remain: i32) -> u32 {
    remain.max(0) as u32
}

// =============================================================================
// Skill Instance
// =============================================================================

/// A live application of a skill definition.
///
/// # Invariants
///
/// - `status_type` is set only for StatusEffect instances
/// - `remain_turns <= 0` means the end condition holds
/// - once `Ended`, no hook emits anything
#[derive(Debug, Clone, Default)]
pub struct SkillInstance {
    id: InstanceId,
    owner: ActorId,
    source: ActorId,
    definition: Option<Arc<SkillDefinition>>,
    remain_turns: i32,
    stackable: bool,
    effect_index: usize,
    status_type: Option<StatusType>,
    group: EffectGroup,
    one_shot: bool,
    force_ended: bool,
    state: InstanceState,
    applied_shield: f32,
}

impl SkillInstance {
    /// Creates an unbound instance.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// Returns the instance to its unbound state so it can be pooled.
    pub fn reset(&mut self) {
        *self = Self::blank();
    }

    /// Binds the instance to a definition and a (source, owner) pair and
    /// derives its classification from the governing effect spec.
    pub fn initialize(
        &mut self,
        id: InstanceId,
        source: ActorId,
        owner: ActorId,
        definition: Arc<SkillDefinition>,
    ) {
        let index = definition.primary_index().unwrap_or(0);
        let one_shot = definition.is_one_shot();
        let spec = definition.effects.get(index);

        self.id = id;
        self.source = source;
        self.owner = owner;
        self.effect_index = index;
        self.one_shot = one_shot;
        self.stackable = definition.stackable;
        self.remain_turns = match spec {
            Some(spec) if !one_shot => spec.duration,
            _ => 0,
        };
        self.status_type = spec.filter(|_| !one_shot).and_then(EffectSpec::status_type);
        self.group = spec
            .filter(|_| !one_shot)
            .map_or(EffectGroup::None, EffectSpec::effect_group);
        self.force_ended = false;
        self.applied_shield = 0.0;
        self.state = InstanceState::Pending;
        self.definition = Some(definition);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Instance id.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Actor the instance is attached to.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Actor that applied the skill.
    #[must_use]
    pub const fn source(&self) -> ActorId {
        self.source
    }

    /// Bound definition, `None` while blank.
    #[must_use]
    pub fn definition(&self) -> Option<&Arc<SkillDefinition>> {
        self.definition.as_ref()
    }

    /// Id of the bound definition.
    #[must_use]
    pub fn skill_id(&self) -> Option<&SkillId> {
        self.definition.as_ref().map(|d| &d.id)
    }

    /// The governing effect spec.
    #[must_use]
    pub fn spec(&self) -> Option<&EffectSpec> {
        self.definition
            .as_ref()
            .and_then(|d| d.effects.get(self.effect_index))
    }

    /// Turns left before the end condition holds.
    #[must_use]
    pub const fn remain_turns(&self) -> i32 {
        self.remain_turns
    }

    /// Whether reapplication stacks instead of refreshing.
    #[must_use]
    pub const fn is_stackable(&self) -> bool {
        self.stackable
    }

    /// Status tag, present only for status effects.
    #[must_use]
    pub const fn status_type(&self) -> Option<StatusType> {
        self.status_type
    }

    /// Dispel group.
    #[must_use]
    pub const fn effect_group(&self) -> EffectGroup {
        self.group
    }

    /// True when the definition leaves nothing behind.
    #[must_use]
    pub const fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> InstanceState {
        self.state
    }

    /// Declared stack cap; `<= 0` means the registry default.
    #[must_use]
    pub fn max_stack(&self) -> i32 {
        self.spec().map_or(0, |s| s.max_stack)
    }

    /// Strength used by `Strongest` / `Weakest` dispels: the value, or the
    /// ratio for reflect effects.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.spec().map_or(0.0, |s| match s.kind {
            EffectKind::Reflect => s.ratio,
            _ => s.value,
        })
    }

    /// True while the instance holds the owner's `CANNOT_USE_SKILL` flag.
    #[must_use]
    pub fn locks_skills(&self) -> bool {
        self.state == InstanceState::Active
            && (self.status_type == Some(StatusType::Silence)
                || self
                    .spec()
                    .is_some_and(|s| s.kind == EffectKind::SkillDisrupt && !self.one_shot))
    }

    // -------------------------------------------------------------------------
    // Duration control
    // -------------------------------------------------------------------------

    /// Restores the remaining turns to the declared duration.
    pub fn refresh_duration(&mut self) {
        if let Some(duration) = self.spec().map(|s| s.duration) {
            self.remain_turns = duration;
        }
    }

    /// Adds `turns` to the remaining turns.
    pub fn extend_duration(&mut self, turns: i32) {
        self.remain_turns = self.remain_turns.saturating_add(turns);
    }

    /// Overwrites the remaining turns.
    pub fn set_remain_turn(&mut self, turns: i32) {
        self.remain_turns = turns;
    }

    /// Makes the next end-condition check succeed.
    pub fn force_end(&mut self) {
        self.force_ended = true;
    }

    // -------------------------------------------------------------------------
    // Hooks
    // -------------------------------------------------------------------------

    /// Rolls the landing chance and checks target-side preconditions.
    pub fn check_start_condition<R: Rng>(&self, views: &Views, rng: &mut R) -> bool {
        let Some(spec) = self.spec() else {
            return false;
        };
        let Some(target) = views.get(self.owner).filter(|v| v.alive) else {
            return false;
        };
        if spec.kind == EffectKind::Shield && !self.one_shot && target.shield > 0.0 {
            return false;
        }
        if spec.chance < 1.0 && rng.gen::<f32>() >= spec.chance {
            return false;
        }
        true
    }

    /// Fires every instant effect and starts the governing persistent one.
    pub fn on_start(&mut self, ctx: &mut EffectContext<'_>) {
        if self.state != InstanceState::Pending {
            return;
        }
        self.state = InstanceState::Active;

        let Some(definition) = self.definition.clone() else {
            return;
        };
        for spec in definition.effects.iter().filter(|s| !s.is_persistent()) {
            self.apply_instant(spec, ctx);
        }
        if !self.one_shot {
            if let Some(spec) = definition.effects.get(self.effect_index) {
                self.start_persistent(spec, ctx);
            }
        }
    }

    /// Re-announces the relation a taunt holds after its duration was
    /// refreshed.
    pub fn on_refresh(&mut self, ctx: &mut EffectContext<'_>) {
        if self.state == InstanceState::Active && self.status_type == Some(StatusType::Taunt) {
            ctx.out.push(Modifier::SetForcedTarget {
                owner: self.owner,
                target: self.source,
                turns: turns_left(self.remain_turns),
                taunt: true,
            });
        }
    }

    /// Ticks damage-over-time and counts down one turn.
    pub fn on_turn_update(&mut self, ctx: &mut EffectContext<'_>) {
        if self.state != InstanceState::Active {
            return;
        }
        if let (Some(status), Some(spec)) = (self.status_type, self.spec()) {
            if status.deals_damage_over_time() && spec.value > 0.0 {
                ctx.out.push(Modifier::ApplyDamage {
                    source: self.source,
                    target: self.owner,
                    amount: spec.value,
                    kind: DamageKind::Fixed,
                });
            }
        }
        self.remain_turns -= 1;
    }

    /// True once the instance should be removed.
    pub fn check_end_condition(&self, views: &Views) -> bool {
        if self.force_ended || self.remain_turns <= 0 || !views.is_alive(self.owner) {
            return true;
        }
        self.state == InstanceState::Active
            && self.spec().is_some_and(|s| s.kind == EffectKind::Shield)
            && views.get(self.owner).is_some_and(|v| v.shield <= 0.0)
    }

    /// Undoes whatever the start hook put in place.
    pub fn on_end(&mut self, ctx: &mut EffectContext<'_>) {
        let was_active = self.state == InstanceState::Active;
        self.state = InstanceState::Ended;
        if !was_active || self.one_shot {
            return;
        }
        let Some(definition) = self.definition.clone() else {
            return;
        };
        if let Some(spec) = definition.effects.get(self.effect_index) {
            self.end_persistent(spec, ctx);
        }
    }

    // -------------------------------------------------------------------------
    // Effect behavior
    // -------------------------------------------------------------------------

    fn apply_instant(&self, spec: &EffectSpec, ctx: &mut EffectContext<'_>) {
        let attack = ctx.views.get(self.source).map_or(0.0, |v| v.stats.attack);
        let defense = ctx.views.get(self.owner).map_or(0.0, |v| v.stats.defense);

        match spec.kind {
            EffectKind::Damage => ctx.out.push(Modifier::ApplyDamage {
                source: self.source,
                target: self.owner,
                amount: mitigated_damage(spec.value, attack, defense),
                kind: DamageKind::Normal,
            }),
            EffectKind::FixedDamage => ctx.out.push(Modifier::ApplyDamage {
                source: self.source,
                target: self.owner,
                amount: spec.value,
                kind: DamageKind::Fixed,
            }),
            EffectKind::Heal => ctx.out.push(Modifier::ApplyHealing {
                target: self.owner,
                amount: spec.value,
            }),
            EffectKind::LifeSteal => ctx.out.push(Modifier::LifeSteal {
                source: self.source,
                target: self.owner,
                amount: mitigated_damage(spec.value, attack, defense),
                ratio: spec.ratio,
            }),
            EffectKind::SkillDisrupt => ctx.out.push(Modifier::IncreaseCooldowns {
                target: self.owner,
                turns: as_turns(spec.value),
            }),
            EffectKind::StatusEffect
            | EffectKind::Buff
            | EffectKind::Debuff
            | EffectKind::Shield
            | EffectKind::Reflect => {}
        }
    }

    fn start_persistent(&mut self, spec: &EffectSpec, ctx: &mut EffectContext<'_>) {
        let owner = self.owner;
        match spec.kind {
            EffectKind::StatusEffect => match self.status_type {
                Some(StatusType::Taunt) => ctx.out.push(Modifier::SetForcedTarget {
                    owner,
                    target: self.source,
                    turns: turns_left(self.remain_turns),
                    taunt: true,
                }),
                Some(StatusType::Silence) => ctx.out.push(Modifier::SetStatusFlag {
                    target: owner,
                    flag: StatusFlags::CANNOT_USE_SKILL,
                    value: true,
                }),
                _ => {}
            },
            EffectKind::Buff | EffectKind::Debuff => {
                if let Some(stat) = spec.stat {
                    let delta = if spec.kind == EffectKind::Buff {
                        spec.value
                    } else {
                        -spec.value
                    };
                    ctx.out.push(Modifier::ModifyStat {
                        target: owner,
                        stat,
                        delta,
                    });
                }
            }
            EffectKind::Shield => {
                self.applied_shield = spec.value;
                ctx.out.push(Modifier::AddShield {
                    target: owner,
                    amount: spec.value,
                });
            }
            EffectKind::Reflect => ctx.out.push(Modifier::AdjustReflect {
                target: owner,
                delta: spec.ratio,
            }),
            EffectKind::SkillDisrupt => {
                ctx.out.push(Modifier::IncreaseCooldowns {
                    target: owner,
                    turns: as_turns(spec.value),
                });
                ctx.out.push(Modifier::SetStatusFlag {
                    target: owner,
                    flag: StatusFlags::CANNOT_USE_SKILL,
                    value: true,
                });
            }
            EffectKind::Damage | EffectKind::Heal | EffectKind::LifeSteal | EffectKind::FixedDamage => {}
        }
    }

    fn end_persistent(&mut self, spec: &EffectSpec, ctx: &mut EffectContext<'_>) {
        let owner = self.owner;
        match spec.kind {
            EffectKind::StatusEffect => match self.status_type {
                Some(StatusType::Taunt) => ctx.out.push(Modifier::ClearForcedTarget {
                    owner,
                    if_target: Some(self.source),
                }),
                Some(StatusType::Silence) => ctx.out.push(Modifier::SetStatusFlag {
                    target: owner,
                    flag: StatusFlags::CANNOT_USE_SKILL,
                    value: false,
                }),
                _ => {}
            },
            EffectKind::Buff | EffectKind::Debuff => {
                if let Some(stat) = spec.stat {
                    let delta = if spec.kind == EffectKind::Buff {
                        -spec.value
                    } else {
                        spec.value
                    };
                    ctx.out.push(Modifier::ModifyStat {
                        target: owner,
                        stat,
                        delta,
                    });
                }
            }
            EffectKind::Shield => {
                let amount = std::mem::take(&mut self.applied_shield);
                ctx.out.push(Modifier::RemoveShield {
                    target: owner,
                    amount,
                });
            }
            EffectKind::Reflect => ctx.out.push(Modifier::AdjustReflect {
                target: owner,
                delta: -spec.ratio,
            }),
            EffectKind::SkillDisrupt => ctx.out.push(Modifier::SetStatusFlag {
                target: owner,
                flag: StatusFlags::CANNOT_USE_SKILL,
                value: false,
            }),
            EffectKind::Damage | EffectKind::Heal | EffectKind::LifeSteal | EffectKind::FixedDamage => {}
        }
    }
}
