//! Presentation hooks.
//!
//! The engine never renders anything. When a skill lands it asks an
//! [`EffectPlayer`] to play the skill's effect key on the target and moves on
//! without waiting for a result.

use crate::actor::ActorId;

/// Fire-and-forget visual effect playback.
pub trait EffectPlayer {
    /// Plays the named effect on `target`.
    fn play_effect(&mut self, name: &str, target: ActorId);
}

/// Discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEffectPlayer;

impl EffectPlayer for NullEffectPlayer {
    fn play_effect(&mut self, _name: &str, _target: ActorId) {}
}

/// Remembers every request. Useful in tests and replays.
#[derive(Debug, Clone, Default)]
pub struct RecordingEffectPlayer {
    played: Vec<(String, ActorId)>,
}

impl RecordingEffectPlayer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests seen so far, oldest first.
    #[must_use]
    pub fn played(&self) -> &[(String, ActorId)] {
        &self.played
    }
}

impl EffectPlayer for RecordingEffectPlayer {
    fn play_effect(&mut self, name: &str, target: ActorId) {
        tracing::trace!(effect = name, target = %target, "play effect");
        self.played.push((name.to_string(), target));
    }
}
