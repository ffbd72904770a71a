/// Gameplay tuning for asteroids and their fragments.
#[derive(Debug, Clone, Copy)]
pub struct AsteroidTuning {
    /// Radius lost per point of damage.
    pub shrink_per_damage: f32,

    /// Fragment radius relative to the parent radius.
    pub split_ratio: f32,

    /// Fragments smaller than this are not spawned.
    pub min_fragment_radius: f32,

    /// Minimum damage a ship takes when it hits an asteroid.
    pub min_ram_damage: f32,

    /// Damage an asteroid takes when a ship hits it.
    pub ram_self_damage: f32,

    /// Sizes of the asteroids seeded into a fresh world.
    pub initial_sizes: [f32; 4],
}

impl Default for AsteroidTuning {
    fn default() -> Self {
        Self {
            shrink_per_damage: 0.1,
            split_ratio: 0.6,
            min_fragment_radius: 2.0,
            min_ram_damage: 5.0,
            ram_self_damage: 0.5,
            initial_sizes: [30.0, 25.0, 20.0, 10.0],
        }
    }
}
