// Connected players: the ship they drive and the controls they currently hold.

use super::entity::EntityId;
use super::ports::PlayerChannel;

/// Index-assigned, stable for the session, never reused.
pub type PlayerId = u64;

/// Controls a client can hold down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Accelerate,
    RotateLeft,
    RotateRight,
    Shoot,
}

/// Held-down state of each control. Applied every tick until released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub accelerate: bool,
    pub shoot: bool,
}

impl Controls {
    pub fn set(&mut self, command: Command, active: bool) {
        match command {
            Command::Accelerate => self.accelerate = active,
            Command::RotateLeft => self.rotate_left = active,
            Command::RotateRight => self.rotate_right = active,
            Command::Shoot => self.shoot = active,
        }
    }
}

pub struct Player {
    pub id: PlayerId,
    /// Set once at connect; the ship's `owner` points back at `id`.
    pub ship: EntityId,
    pub controls: Controls,
    pub channel: Box<dyn PlayerChannel>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("ship", &self.ship)
            .field("controls", &self.controls)
            .finish_non_exhaustive()
    }
}
