//! Target selection: forced targets, taunts and aggro.

mod aggro;
mod forced;

pub use aggro::{AggroResolver, FirstLivingAggro, LowestHealthAggro};
pub use forced::ForcedTarget;
