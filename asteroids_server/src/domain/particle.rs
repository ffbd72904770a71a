// Visual-only particles. They live for one tick on the server; clients animate them.

use super::vector::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Engine,
    Spark,
    Rock,
}

impl ParticleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticleKind::Engine => "engine",
            ParticleKind::Spark => "spark",
            ParticleKind::Rock => "rock",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub position: Vector2,
    pub velocity: Vector2,
    /// Seconds the client keeps the particle alive.
    pub ttl: f32,
}
