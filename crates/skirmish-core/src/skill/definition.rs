//! Immutable skill templates.
//!
//! A [`SkillDefinition`] is authored offline (usually as JSON) and loaded
//! read-only. It declares one or more [`EffectSpec`]s; the first persistent
//! spec, if any, decides how a runtime instance is classified and how long it
//! lives.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::actor::StatKind;

// =============================================================================
// Skill Id
// =============================================================================

/// Unique identifier of a skill definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillId(String);

impl SkillId {
    /// Creates a new skill id.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the empty id.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SkillId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SkillId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Whether a skill is actively invoked or always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SkillCategory {
    /// Chosen as a command.
    #[default]
    Active,
    /// Granted at battle start.
    Passive,
}

/// Behavior declared by one effect spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Instant damage scaled by the source's attack and mitigated by defense.
    Damage,
    /// Instant healing.
    Heal,
    /// Timed ailment or condition tagged with a [`StatusType`].
    StatusEffect,
    /// Timed positive stat adjustment.
    Buff,
    /// Timed negative stat adjustment.
    Debuff,
    /// Timed damage absorption.
    Shield,
    /// Timed damage reflection.
    Reflect,
    /// Instant damage that heals the source.
    LifeSteal,
    /// Instant damage that ignores attack and defense.
    FixedDamage,
    /// Pushes the target's cooldowns back; locks skills while it lasts.
    SkillDisrupt,
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Fine-grained tag for status effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusType {
    /// Cannot act.
    Stun,
    /// Cannot act.
    Sleep,
    /// Cannot act.
    Freeze,
    /// Cannot use skills.
    Silence,
    /// Damage every turn.
    Poison,
    /// Damage every turn.
    Burn,
    /// Damage every turn.
    Bleed,
    /// Accuracy penalty; no engine-side behavior.
    Blind,
    /// Must attack the taunter.
    Taunt,
    /// Blocks incoming ailments.
    Immunity,
}

impl StatusType {
    /// Every status type, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Stun,
        Self::Sleep,
        Self::Freeze,
        Self::Silence,
        Self::Poison,
        Self::Burn,
        Self::Bleed,
        Self::Blind,
        Self::Taunt,
        Self::Immunity,
    ];

    /// True ailments are the targets of status dispels and are blocked by
    /// immunity.
    #[must_use]
    pub const fn is_ailment(self) -> bool {
        !matches!(self, Self::Immunity)
    }

    /// Prevents the actor from acting at all.
    #[must_use]
    pub const fn is_incapacitating(self) -> bool {
        matches!(self, Self::Stun | Self::Sleep | Self::Freeze)
    }

    /// Deals its value as damage each turn.
    #[must_use]
    pub const fn deals_damage_over_time(self) -> bool {
        matches!(self, Self::Poison | Self::Burn | Self::Bleed)
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Coarse classification used by buff and debuff dispels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum EffectGroup {
    /// Neither buff nor debuff.
    #[default]
    None,
    /// Beneficial.
    Buff,
    /// Harmful.
    Debuff,
}

/// Who a skill lands on when invoked as a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetScope {
    /// One opponent, subject to forced targeting.
    #[default]
    SingleEnemy,
    /// Every living opponent.
    AllEnemies,
    /// One ally (the caster if none is given).
    SingleAlly,
    /// Every living ally.
    AllAllies,
    /// The caster.
    Caster,
}

// =============================================================================
// Effect Spec
// =============================================================================

/// One declared behavior inside a skill definition.
///
/// Specs are built with the kind-specific constructors:
///
/// ```
/// use skirmish_core::skill::{EffectSpec, EffectKind, StatusType};
///
/// let poison = EffectSpec::status(StatusType::Poison, 3)
///     .with_value(4.0)
///     .with_max_stack(3);
/// assert_eq!(poison.kind, EffectKind::StatusEffect);
/// assert!(poison.is_persistent());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    /// Behavior tag.
    pub kind: EffectKind,
    /// Magnitude (damage, heal, stat delta, shield, turns of disruption).
    #[serde(default)]
    pub value: f32,
    /// Turns the effect lasts; ignored by instant kinds.
    #[serde(default)]
    pub duration: i32,
    /// Probability in `[0, 1]` that the effect lands.
    #[serde(default = "default_chance")]
    pub chance: f32,
    /// Stack cap for stackable skills; `<= 0` means the configured default.
    #[serde(default)]
    pub max_stack: i32,
    /// Status tag, required for [`EffectKind::StatusEffect`].
    #[serde(default)]
    pub status: Option<StatusType>,
    /// Stat selector, required for buffs and debuffs.
    #[serde(default)]
    pub stat: Option<StatKind>,
    /// Heal ratio for life steal, reflected fraction for reflect.
    #[serde(default)]
    pub ratio: f32,
}

fn default_chance() -> f32 {
    1.0
}

impl EffectSpec {
    /// Creates a spec of the given kind with every optional field empty.
    #[must_use]
    pub const fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            value: 0.0,
            duration: 0,
            chance: 1.0,
            max_stack: 0,
            status: None,
            stat: None,
            ratio: 0.0,
        }
    }

    /// Instant damage.
    #[must_use]
    pub const fn damage(value: f32) -> Self {
        Self::new(EffectKind::Damage).with_value(value)
    }

    /// Instant damage that ignores stats.
    #[must_use]
    pub const fn fixed_damage(value: f32) -> Self {
        Self::new(EffectKind::FixedDamage).with_value(value)
    }

    /// Instant healing.
    #[must_use]
    pub const fn heal(value: f32) -> Self {
        Self::new(EffectKind::Heal).with_value(value)
    }

    /// Damage that heals the source for `ratio` of the damage dealt.
    #[must_use]
    pub const fn life_steal(value: f32, ratio: f32) -> Self {
        let mut spec = Self::new(EffectKind::LifeSteal).with_value(value);
        spec.ratio = ratio;
        spec
    }

    /// Timed status effect.
    #[must_use]
    pub const fn status(status: StatusType, duration: i32) -> Self {
        let mut spec = Self::new(EffectKind::StatusEffect).with_duration(duration);
        spec.status = Some(status);
        spec
    }

    /// Timed stat increase.
    #[must_use]
    pub const fn buff(stat: StatKind, value: f32, duration: i32) -> Self {
        let mut spec = Self::new(EffectKind::Buff)
            .with_value(value)
            .with_duration(duration);
        spec.stat = Some(stat);
        spec
    }

    /// Timed stat decrease.
    #[must_use]
    pub const fn debuff(stat: StatKind, value: f32, duration: i32) -> Self {
        let mut spec = Self::new(EffectKind::Debuff)
            .with_value(value)
            .with_duration(duration);
        spec.stat = Some(stat);
        spec
    }

    /// Timed damage absorption.
    #[must_use]
    pub const fn shield(value: f32, duration: i32) -> Self {
        Self::new(EffectKind::Shield)
            .with_value(value)
            .with_duration(duration)
    }

    /// Timed damage reflection.
    #[must_use]
    pub const fn reflect(ratio: f32, duration: i32) -> Self {
        let mut spec = Self::new(EffectKind::Reflect).with_duration(duration);
        spec.ratio = ratio;
        spec
    }

    /// Pushes cooldowns back by `turns`; with a positive `duration` it also
    /// locks skills for that long.
    #[must_use]
    pub const fn skill_disrupt(turns: f32, duration: i32) -> Self {
        Self::new(EffectKind::SkillDisrupt)
            .with_value(turns)
            .with_duration(duration)
    }

    /// Sets the magnitude (builder pattern).
    #[must_use]
    pub const fn with_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    /// Sets the duration (builder pattern).
    #[must_use]
    pub const fn with_duration(mut self, duration: i32) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the landing chance (builder pattern).
    #[must_use]
    pub const fn with_chance(mut self, chance: f32) -> Self {
        self.chance = chance;
        self
    }

    /// Sets the stack cap (builder pattern).
    #[must_use]
    pub const fn with_max_stack(mut self, max_stack: i32) -> Self {
        self.max_stack = max_stack;
        self
    }

    /// True for kinds that leave a runtime instance behind.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        match self.kind {
            EffectKind::Damage
            | EffectKind::Heal
            | EffectKind::LifeSteal
            | EffectKind::FixedDamage => false,
            EffectKind::SkillDisrupt => self.duration > 0,
            EffectKind::StatusEffect
            | EffectKind::Buff
            | EffectKind::Debuff
            | EffectKind::Shield
            | EffectKind::Reflect => true,
        }
    }

    /// Dispel group this spec belongs to.
    #[must_use]
    pub const fn effect_group(&self) -> EffectGroup {
        match self.kind {
            EffectKind::Buff | EffectKind::Shield | EffectKind::Reflect => EffectGroup::Buff,
            EffectKind::Debuff => EffectGroup::Debuff,
            EffectKind::SkillDisrupt if self.duration > 0 => EffectGroup::Debuff,
            _ => EffectGroup::None,
        }
    }

    /// Status tag, present only for status effects.
    #[must_use]
    pub const fn status_type(&self) -> Option<StatusType> {
        match self.kind {
            EffectKind::StatusEffect => self.status,
            _ => None,
        }
    }
}

// =============================================================================
// Skill Definition
// =============================================================================

/// Immutable skill template.
///
/// ```
/// use skirmish_core::skill::{EffectSpec, SkillDefinition, StatusType};
///
/// let stun = SkillDefinition::new("stun_bash", "Stun Bash")
///     .with_effect(EffectSpec::damage(8.0))
///     .with_effect(EffectSpec::status(StatusType::Stun, 2))
///     .with_cooldown(3);
///
/// assert!(!stun.is_one_shot());
/// assert_eq!(stun.primary_effect().unwrap().status, Some(StatusType::Stun));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    /// Unique id.
    pub id: SkillId,
    /// Display name.
    pub name: String,
    /// Active or passive.
    #[serde(default)]
    pub category: SkillCategory,
    /// Declared effects, in order.
    pub effects: Vec<EffectSpec>,
    /// Cooldown in turns after use.
    #[serde(default)]
    pub cooldown: u32,
    /// Whether repeated applications stack instead of refreshing.
    #[serde(default)]
    pub stackable: bool,
    /// Who the skill lands on as a command.
    #[serde(default)]
    pub scope: TargetScope,
    /// Presentation key for the visual effect; opaque to the engine.
    #[serde(default)]
    pub effect_key: Option<String>,
    /// Presentation key for the sound; opaque to the engine.
    #[serde(default)]
    pub sound_key: Option<String>,
}

impl SkillDefinition {
    /// Creates an empty active, non-stackable definition.
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: SkillId::new(id),
            name: name.to_string(),
            category: SkillCategory::Active,
            effects: Vec::new(),
            cooldown: 0,
            stackable: false,
            scope: TargetScope::SingleEnemy,
            effect_key: None,
            sound_key: None,
        }
    }

    /// Appends an effect spec (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: EffectSpec) -> Self {
        self.effects.push(effect);
        self
    }

    /// Sets the cooldown (builder pattern).
    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the stackable flag (builder pattern).
    #[must_use]
    pub const fn stackable(mut self, stackable: bool) -> Self {
        self.stackable = stackable;
        self
    }

    /// Sets the target scope (builder pattern).
    #[must_use]
    pub const fn with_scope(mut self, scope: TargetScope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the category (builder pattern).
    #[must_use]
    pub const fn with_category(mut self, category: SkillCategory) -> Self {
        self.category = category;
        self
    }

    /// Sets the presentation effect key (builder pattern).
    #[must_use]
    pub fn with_effect_key(mut self, key: &str) -> Self {
        self.effect_key = Some(key.to_string());
        self
    }

    /// First declared effect spec.
    #[must_use]
    pub fn first_effect(&self) -> Option<&EffectSpec> {
        self.effects.first()
    }

    /// Index of the spec that governs an instance: the first persistent spec,
    /// or the first spec when every spec is instant.
    #[must_use]
    pub fn primary_index(&self) -> Option<usize> {
        if self.effects.is_empty() {
            return None;
        }
        Some(
            self.effects
                .iter()
                .position(EffectSpec::is_persistent)
                .unwrap_or(0),
        )
    }

    /// The governing effect spec.
    #[must_use]
    pub fn primary_effect(&self) -> Option<&EffectSpec> {
        self.primary_index().and_then(|i| self.effects.get(i))
    }

    /// True when no spec leaves an instance behind.
    #[must_use]
    pub fn is_one_shot(&self) -> bool {
        !self.effects.iter().any(EffectSpec::is_persistent)
    }
}
