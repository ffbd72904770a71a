// Simulation systems that run inside a tick.

pub mod behavior;
pub mod collision;
pub mod sync;
