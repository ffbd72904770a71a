// Wire protocol DTOs and conversions for the WebSocket clients.

use crate::domain::{
    Command, EntityId, EntitySnapshot, Outbound, Particle, PlayerId, Viewport, WorldFrame,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keeps two decimals, truncating toward zero, to keep JSON floats short.
fn round2(value: f32) -> f32 {
    (value * 100.0).trunc() / 100.0
}

/// Velocities are per second, so whole units are precise enough.
fn whole(value: f32) -> i32 {
    value as i32
}

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ServerMessage {
    // Assigned identity, sent once after connect.
    Id { id: PlayerId },
    // Per-tick world diff.
    World(WorldDto),
}

impl From<Outbound> for ServerMessage {
    fn from(message: Outbound) -> Self {
        match message {
            Outbound::Identity { player_id } => ServerMessage::Id { id: player_id },
            Outbound::World { frame, viewport } => {
                ServerMessage::World(WorldDto::new(&frame, viewport.as_ref()))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldDto {
    pub timestamp: u64,
    pub objects: BTreeMap<EntityId, ObjectDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub new_particles: Vec<ParticleDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportDto>,
}

impl WorldDto {
    pub fn new(frame: &WorldFrame, viewport: Option<&Viewport>) -> Self {
        Self {
            timestamp: frame.timestamp_ms,
            objects: frame
                .objects
                .iter()
                .map(|o| (o.id, ObjectDto::from(o)))
                .collect(),
            new_particles: frame.new_particles.iter().map(ParticleDto::from).collect(),
            remove: frame.removed.clone(),
            viewport: viewport.map(ViewportDto::from),
        }
    }
}

/// Compact entity description; the id is the key in `objects`.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectDto {
    pub x: f32,
    pub y: f32,
    pub vx: i32,
    pub vy: i32,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub a: f32,
    pub r: f32,
}

impl From<&EntitySnapshot> for ObjectDto {
    fn from(o: &EntitySnapshot) -> Self {
        Self {
            x: round2(o.position.x),
            y: round2(o.position.y),
            vx: whole(o.velocity.x),
            vy: whole(o.velocity.y),
            kind: o.entity_type.as_str(),
            a: round2(o.angle),
            r: round2(o.radius),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleDto {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: i32,
    pub y: i32,
    pub vx: i32,
    pub vy: i32,
    pub ttl: f32,
}

impl From<&Particle> for ParticleDto {
    fn from(p: &Particle) -> Self {
        Self {
            kind: p.kind.as_str(),
            x: whole(p.position.x),
            y: whole(p.position.y),
            vx: whole(p.velocity.x),
            vy: whole(p.velocity.y),
            ttl: round2(p.ttl),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewportDto {
    pub x: f32,
    pub y: f32,
    pub vx: i32,
    pub vy: i32,
    pub world_size: f32,
    pub view_size: f32,
}

impl From<&Viewport> for ViewportDto {
    fn from(v: &Viewport) -> Self {
        Self {
            x: round2(v.position.x),
            y: round2(v.position.y),
            vx: whole(v.velocity.x),
            vy: whole(v.velocity.y),
            world_size: v.world_size,
            view_size: v.view_size,
        }
    }
}

/// A held control changing state: `{"command": "accelerate", "arg": true}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    pub command: CommandDto,
    pub arg: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandDto {
    Accelerate,
    RotateLeft,
    RotateRight,
    Shoot,
}

impl From<CommandDto> for Command {
    fn from(command: CommandDto) -> Self {
        match command {
            CommandDto::Accelerate => Command::Accelerate,
            CommandDto::RotateLeft => Command::RotateLeft,
            CommandDto::RotateRight => Command::RotateRight,
            CommandDto::Shoot => Command::Shoot,
        }
    }
}
