// Builds the per-tick world diff: dirty entities (capped), new particles, removals,
// and a viewport per player whose ship changed.

use std::collections::HashMap;

use crate::domain::entity::{Entity, EntityId, EntityType};
use crate::domain::particle::Particle;
use crate::domain::player::PlayerId;
use crate::domain::vector::Vector2;
use crate::domain::world::World;

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    /// Most entities described in one packet.
    pub max_objects_per_packet: usize,
    /// Visible area side relative to the world size.
    pub view_size_ratio: f32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_objects_per_packet: 10,
            view_size_ratio: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub entity_type: EntityType,
    pub position: Vector2,
    pub velocity: Vector2,
    pub angle: f32,
    pub radius: f32,
}

impl From<&Entity> for EntitySnapshot {
    fn from(e: &Entity) -> Self {
        Self {
            id: e.id,
            entity_type: e.entity_type(),
            position: e.position,
            velocity: e.velocity,
            angle: e.angle,
            radius: e.radius,
        }
    }
}

/// Part of the packet shared by every player in a tick.
#[derive(Debug, Clone)]
pub struct WorldFrame {
    pub timestamp_ms: u64,
    pub objects: Vec<EntitySnapshot>,
    pub new_particles: Vec<Particle>,
    pub removed: Vec<EntityId>,
}

/// What a player's camera follows: their own ship.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub position: Vector2,
    pub velocity: Vector2,
    pub world_size: f32,
    pub view_size: f32,
}

#[derive(Debug)]
pub struct SyncOutput {
    pub frame: WorldFrame,
    pub viewports: HashMap<PlayerId, Viewport>,
}

/// Collects this tick's diff and clears the dirty flag of every entity it describes.
///
/// Dirty entities beyond the cap stay dirty and go out in a later tick.
pub fn collect(
    world: &mut World,
    ships: impl IntoIterator<Item = (PlayerId, EntityId)>,
    timestamp_ms: u64,
    settings: SyncSettings,
) -> SyncOutput {
    world.flag_refresh();

    // Viewports follow the ship's dirty state before the objects pass clears it.
    let world_size = world.size();
    let viewports = ships
        .into_iter()
        .filter_map(|(player_id, ship_id)| {
            let ship = world.entity(ship_id).filter(|s| s.dirty && !s.is_removed())?;
            Some((
                player_id,
                Viewport {
                    position: ship.position,
                    velocity: ship.velocity,
                    world_size,
                    view_size: world_size * settings.view_size_ratio,
                },
            ))
        })
        .collect();

    let mut objects = Vec::new();
    for entity in world.entities_mut() {
        if !entity.dirty || entity.is_removed() {
            continue;
        }
        if objects.len() >= settings.max_objects_per_packet {
            break;
        }
        entity.dirty = false;
        objects.push(EntitySnapshot::from(&*entity));
    }

    SyncOutput {
        frame: WorldFrame {
            timestamp_ms,
            objects,
            new_particles: world.particles().to_vec(),
            removed: world.pending_removal().to_vec(),
        },
        viewports,
    }
}
