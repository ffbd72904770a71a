use crate::use_cases::GameEvent;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    // Events flowing from the network into the game loop.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Per-player queue length for packets not yet written to the socket.
    pub outbox_capacity: usize,
}
