// Gameplay tuning, kept apart from runtime/server configuration.

pub mod asteroid;
pub mod missile;
pub mod ship;

pub use asteroid::AsteroidTuning;
pub use missile::MissileTuning;
pub use ship::ShipTuning;

/// All gameplay tuning the simulation reads during a tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tuning {
    pub ship: ShipTuning,
    pub asteroid: AsteroidTuning,
    pub missile: MissileTuning,
}
