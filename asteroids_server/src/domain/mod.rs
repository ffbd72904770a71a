// Domain layer: core simulation types and rules.

pub mod entity;
pub mod particle;
pub mod player;
pub mod ports;
pub mod systems;
pub mod tuning;
pub mod vector;
pub mod world;

pub use entity::{Entity, EntityId, EntityKind, EntityType};
pub use particle::{Particle, ParticleKind};
pub use player::{Command, Controls, Player, PlayerId};
pub use ports::{ChannelError, Outbound, PlayerChannel};
pub use systems::sync::{EntitySnapshot, SyncSettings, Viewport, WorldFrame};
pub use vector::Vector2;
pub use world::World;
