use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("GAME_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
// World packets queued per player before new ones are dropped.
pub const OUTBOX_CAPACITY: usize = 64;

pub const TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 30);
// Longer stalls are simulated as this much time, not the full gap.
pub const MAX_TICK_DT: Duration = Duration::from_millis(250);

pub const WORLD_SIZE: f32 = 500.0;
