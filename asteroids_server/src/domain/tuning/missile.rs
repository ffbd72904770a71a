/// Gameplay tuning for missiles.
#[derive(Debug, Clone, Copy)]
pub struct MissileTuning {
    /// Collision radius in world units.
    pub radius: f32,

    /// Launch speed relative to the firing ship.
    pub launch_speed: f32,

    /// Engine acceleration in world units per second squared.
    pub acceleration: f32,

    /// Damage dealt on impact.
    pub power: f32,

    /// Base fuel in seconds; a random bonus of up to `fuel_jitter` is added.
    pub fuel: f32,
    pub fuel_jitter: f32,

    /// The engine only burns while fuel is below this value.
    pub ignition_fuel: f32,

    /// The missile burns out once fuel drops below this value.
    pub burnout_fuel: f32,

    /// Engine particles emitted per second of thrust.
    pub engine_particles_per_second: f32,
}

impl Default for MissileTuning {
    fn default() -> Self {
        Self {
            radius: 2.0,
            launch_speed: 45.0,
            acceleration: 360.0,
            power: 10.0,
            fuel: 1.0,
            fuel_jitter: 0.1,
            ignition_fuel: 0.7,
            burnout_fuel: -0.5,
            engine_particles_per_second: 75.0,
        }
    }
}
