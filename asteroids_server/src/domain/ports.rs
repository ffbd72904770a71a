use std::sync::Arc;

use super::player::PlayerId;
use super::systems::sync::{Viewport, WorldFrame};

/// Messages the simulation hands to a player's outbound channel.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Sent once at connect so the client knows which ship it drives.
    Identity { player_id: PlayerId },
    /// Per-tick world diff. The frame is shared by all players of the tick.
    World {
        frame: Arc<WorldFrame>,
        viewport: Option<Viewport>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Receiver is behind; the message was dropped.
    Full,
    /// Receiver is gone.
    Closed,
}

// Port for delivering messages to one connected player without blocking the tick.
pub trait PlayerChannel: Send {
    fn send(&self, message: Outbound) -> Result<(), ChannelError>;
}
