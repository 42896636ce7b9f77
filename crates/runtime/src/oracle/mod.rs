//! Oracle implementations owned by the runtime.
//!
//! Real hosts implement the `quest-core` oracle traits against a live game
//! client. The runtime ships [`SimWorld`], a deterministic in-process world
//! backing every oracle, for tests and the CLI demo.
mod sim;

pub use sim::{SimInteraction, SimLog, SimNpc, SimWorld};
