//! Battle phase state machine.
//!
//! A battle walks through a fixed set of phases. Legal moves are listed in a
//! static table; [`BattleStateMachine::transition_to`] rejects everything else
//! and leaves the machine untouched.
//!
//! ```text
//! None -> Initialize -> BattleStart -> TurnStart -> CharacterMove -> CommandSelect
//!                                          ^                          |        |
//!                                          |                  ActionExecute    |
//!                                          |                          |        |
//!                                       TurnEnd <- CharacterReturn <--+--------+
//!
//! BattleStart | TurnStart | TurnEnd -> BattleResult -> BattleEnd
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::actor::ActorId;
use crate::cancel::CancellationToken;
use crate::error::TransitionError;
use crate::event::{BattleEvent, EventSink};
use crate::skill::SkillId;

/// Phase of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum BattleState {
    /// Not started.
    #[default]
    None,
    /// Setting up actors.
    Initialize,
    /// Opening the battle.
    BattleStart,
    /// An actor's turn begins.
    TurnStart,
    /// The actor steps forward.
    CharacterMove,
    /// Waiting for a command.
    CommandSelect,
    /// The command resolves.
    ActionExecute,
    /// The actor steps back.
    CharacterReturn,
    /// The turn closes.
    TurnEnd,
    /// A side has won.
    BattleResult,
    /// Finished.
    BattleEnd,
}

impl BattleState {
    /// Phases reachable from `self` in one step.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::None => &[Self::Initialize],
            Self::Initialize => &[Self::BattleStart],
            Self::BattleStart => &[Self::TurnStart, Self::BattleResult],
            Self::TurnStart => &[Self::CharacterMove, Self::BattleResult],
            Self::CharacterMove => &[Self::CommandSelect],
            Self::CommandSelect => &[Self::ActionExecute, Self::CharacterReturn],
            Self::ActionExecute => &[Self::CharacterReturn],
            Self::CharacterReturn => &[Self::TurnEnd],
            Self::TurnEnd => &[Self::TurnStart, Self::BattleResult],
            Self::BattleResult => &[Self::BattleEnd],
            Self::BattleEnd => &[],
        }
    }

    /// True if `next` is reachable from `self` in one step.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

/// What the acting actor chose to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Use a skill, optionally on a chosen target.
    UseSkill {
        /// Skill to use.
        skill: SkillId,
        /// Preferred target; forced targets override it.
        target: Option<ActorId>,
    },
    /// Do nothing this turn.
    Skip,
}

/// Turn state carried through the phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnContext {
    /// Turns started since `BattleStart`.
    pub turn_number: u32,
    /// Acting actor.
    pub current_actor: Option<ActorId>,
    /// Resolved target.
    pub target: Option<ActorId>,
    /// Chosen command.
    pub command: Option<Command>,
}

/// Validates and executes phase changes.
#[derive(Debug)]
pub struct BattleStateMachine {
    current: BattleState,
    previous: BattleState,
    context: TurnContext,
    cancellation: CancellationToken,
}

impl Default for BattleStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleStateMachine {
    /// Creates a machine in [`BattleState::None`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: BattleState::None,
            previous: BattleState::None,
            context: TurnContext::default(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn current_state(&self) -> BattleState {
        self.current
    }

    /// Phase before the last successful transition.
    #[must_use]
    pub const fn previous_state(&self) -> BattleState {
        self.previous
    }

    /// Turn context.
    #[must_use]
    pub const fn context(&self) -> &TurnContext {
        &self.context
    }

    /// Moves to `next` if the table allows it.
    ///
    /// Entering `TurnStart` starts a new turn (turn number + 1, target and
    /// command cleared); entering `BattleStart` clears the whole context.
    ///
    /// # Errors
    ///
    /// [`TransitionError::NotAllowed`] if `next` is not reachable. Nothing
    /// changes and no event fires.
    pub fn transition_to(
        &mut self,
        next: BattleState,
        events: &mut dyn EventSink,
    ) -> Result<(), TransitionError> {
        let from = self.current;
        if !from.can_transition_to(next) {
            warn!(?from, to = ?next, "illegal battle state transition");
            return Err(TransitionError::NotAllowed { from, to: next });
        }

        self.previous = from;
        self.current = next;
        match next {
            BattleState::BattleStart => self.context = TurnContext::default(),
            BattleState::TurnStart => {
                self.context.turn_number += 1;
                self.context.target = None;
                self.context.command = None;
            }
            _ => {}
        }

        debug!(?from, to = ?next, turn = self.context.turn_number, "battle state changed");
        events.emit(BattleEvent::StateChanged { from, to: next });
        Ok(())
    }

    /// Records the acting actor.
    pub fn set_turn_info(&mut self, actor: ActorId) {
        self.context.current_actor = Some(actor);
    }

    /// Records the chosen command.
    pub fn set_command(&mut self, command: Command) {
        self.context.command = Some(command);
    }

    /// Records the resolved target.
    pub fn set_target(&mut self, target: Option<ActorId>) {
        self.context.target = target;
    }

    /// Token for waits belonging to the current battle.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Returns to `None`, cancelling every outstanding wait.
    pub fn reset(&mut self) {
        self.cancellation.cancel();
        self.cancellation = CancellationToken::new();
        self.current = BattleState::None;
        self.previous = BattleState::None;
        self.context = TurnContext::default();
        debug!("battle state machine reset");
    }
}
