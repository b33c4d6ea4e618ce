//! Dispel ordering.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::instance::InstanceId;

/// Which instances a dispel removes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispelPriority {
    /// Uniform shuffle driven by the battle RNG.
    Random,
    /// Most remaining turns first.
    Newest,
    /// Fewest remaining turns first.
    Oldest,
    /// Highest effect value first.
    Strongest,
    /// Lowest effect value first.
    Weakest,
}

/// What the ordering looks at for one instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispelCandidate {
    /// Instance id; ties are broken by the lower id.
    pub id: InstanceId,
    /// Remaining turns.
    pub remain_turns: i32,
    /// Current effect value.
    pub magnitude: f32,
}

/// Orders candidates for removal.
///
/// Deterministic priorities sort stably with ties going to the older instance.
/// `Random` shuffles from id order, so the result depends only on the RNG
/// state.
pub fn order_for_dispel<R: Rng>(
    mut candidates: Vec<DispelCandidate>,
    priority: DispelPriority,
    rng: &mut R,
) -> Vec<InstanceId> {
    candidates.sort_by_key(|c| c.id);
    match priority {
        DispelPriority::Random => candidates.shuffle(rng),
        DispelPriority::Newest => candidates.sort_by(|a, b| b.remain_turns.cmp(&a.remain_turns)),
        DispelPriority::Oldest => candidates.sort_by_key(|c| c.remain_turns),
        DispelPriority::Strongest => {
            candidates.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        }
        DispelPriority::Weakest => candidates.sort_by(|a, b| a.magnitude.total_cmp(&b.magnitude)),
    }
    candidates.into_iter().map(|c| c.id).collect()
}
