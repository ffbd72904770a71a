/// Gameplay tuning for player-controlled ships.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).
#[derive(Debug, Clone, Copy)]
pub struct ShipTuning {
    /// Collision radius in world units.
    pub radius: f32,

    /// Health a freshly spawned ship starts with.
    pub max_health: f32,

    /// Rotation speed in radians per second while a rotate control is held.
    pub rotation_power: f32,

    /// Thrust in world units per second squared.
    pub engine_power: f32,

    /// Seconds between two missile launches.
    pub reload_seconds: f32,

    /// Engine particles emitted per second of thrust.
    pub engine_particles_per_second: f32,

    /// Damage both ships take when they ram each other.
    pub ram_damage: f32,

    /// Upper bound of the random initial drift, per axis.
    pub spawn_drift: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            radius: 5.0,
            max_health: 100.0,
            rotation_power: 5.0,
            engine_power: 70.0,
            reload_seconds: 0.3,
            engine_particles_per_second: 45.0,
            ram_damage: 10.0,
            spawn_drift: 10.0,
        }
    }
}
