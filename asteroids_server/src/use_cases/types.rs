// Use-case level inputs for the game loop.

use crate::domain::{Command, PlayerChannel, PlayerId};
use tokio::sync::oneshot;

pub enum GameEvent {
    /// A connection was accepted. The game spawns a ship and replies with the player id.
    Join {
        outbox: Box<dyn PlayerChannel>,
        reply: oneshot::Sender<PlayerId>,
    },
    Leave {
        player_id: PlayerId,
    },
    /// Sets or clears one held control.
    Command {
        player_id: PlayerId,
        command: Command,
        active: bool,
    },
}

impl std::fmt::Debug for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameEvent::Join { .. } => f.write_str("Join"),
            GameEvent::Leave { player_id } => {
                f.debug_struct("Leave").field("player_id", player_id).finish()
            }
            GameEvent::Command {
                player_id,
                command,
                active,
            } => f
                .debug_struct("Command")
                .field("player_id", player_id)
                .field("command", command)
                .field("active", active)
                .finish(),
        }
    }
}
