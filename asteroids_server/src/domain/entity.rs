// Simulation entities: one shared kinematic record plus per-kind state.

use super::player::PlayerId;
use super::vector::Vector2;

/// Unique, monotonically increasing entity id. Never reused.
pub type EntityId = u64;

/// Closed set of entity kinds, used for collision dispatch and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Ship,
    Asteroid,
    Missile,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Ship => "ship",
            EntityType::Asteroid => "asteroid",
            EntityType::Missile => "missile",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ship {
    /// Non-owning link into the player registry.
    pub owner: PlayerId,
    /// Not clamped; may go negative.
    pub health: f32,
    /// Seconds until the next shot is allowed (ready when <= 0).
    pub reload: f32,
    /// Engine particle accumulator, in seconds of pending emission.
    pub engine_sparks: f32,
}

#[derive(Debug, Clone)]
pub struct Asteroid {
    pub health: f32,
}

#[derive(Debug, Clone)]
pub struct Missile {
    pub owner: PlayerId,
    /// Doubles as time-to-live once it goes negative.
    pub fuel: f32,
    pub power: f32,
    pub engine_sparks: f32,
}

#[derive(Debug, Clone)]
pub enum EntityKind {
    Ship(Ship),
    Asteroid(Asteroid),
    Missile(Missile),
}

#[derive(Debug, Clone)]
pub struct Entity {
    /// Assigned by the world when the entity is added; 0 until then.
    pub id: EntityId,
    pub position: Vector2,
    pub velocity: Vector2,
    pub radius: f32,
    /// Facing in radians. Asteroids keep 0.
    pub angle: f32,
    /// Must be described in the next outgoing sync packet.
    pub dirty: bool,
    /// Tombstone: queued for removal at the end of the current tick.
    pub(crate) removed: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(kind: EntityKind, position: Vector2, velocity: Vector2, radius: f32) -> Self {
        Self {
            id: 0,
            position,
            velocity,
            radius,
            angle: 0.0,
            // New entities are always announced.
            dirty: true,
            removed: false,
            kind,
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn entity_type(&self) -> EntityType {
        match self.kind {
            EntityKind::Ship(_) => EntityType::Ship,
            EntityKind::Asteroid(_) => EntityType::Asteroid,
            EntityKind::Missile(_) => EntityType::Missile,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Player that controls (ship) or fired (missile) this entity.
    pub fn owner(&self) -> Option<PlayerId> {
        match &self.kind {
            EntityKind::Ship(ship) => Some(ship.owner),
            EntityKind::Missile(missile) => Some(missile.owner),
            EntityKind::Asteroid(_) => None,
        }
    }

    pub fn as_ship(&self) -> Option<&Ship> {
        match &self.kind {
            EntityKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        match &mut self.kind {
            EntityKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_asteroid(&self) -> Option<&Asteroid> {
        match &self.kind {
            EntityKind::Asteroid(asteroid) => Some(asteroid),
            _ => None,
        }
    }

    pub fn as_missile(&self) -> Option<&Missile> {
        match &self.kind {
            EntityKind::Missile(missile) => Some(missile),
            _ => None,
        }
    }
}
