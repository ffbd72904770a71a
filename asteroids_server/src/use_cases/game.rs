use super::types::GameEvent;
use crate::domain::systems::sync;
use crate::domain::{
    ChannelError, Command, Controls, Outbound, Player, PlayerChannel, PlayerId, SyncSettings,
    World,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Notify, mpsc};
use tracing::{debug, info, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

/// The world plus the registry of connected players.
pub struct Game {
    world: World,
    players: BTreeMap<PlayerId, Player>,
    next_player_id: PlayerId,
    sync: SyncSettings,
    dropped_packets: u64,
    last_drop_log: Instant,
}

impl Game {
    pub fn new(world: World, sync: SyncSettings) -> Self {
        Self {
            world,
            players: BTreeMap::new(),
            next_player_id: 1,
            sync,
            dropped_packets: 0,
            last_drop_log: Instant::now() - LOG_THROTTLE,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Registers a player, spawns their ship at a random position and sends their id.
    pub fn connect(&mut self, channel: Box<dyn PlayerChannel>) -> PlayerId {
        let player_id = self.next_player_id;
        self.next_player_id += 1;

        let position = self.world.random_position();
        let ship = self.world.spawn_ship(player_id, position);

        if let Err(e) = channel.send(Outbound::Identity { player_id }) {
            warn!(player_id, error = ?e, "failed to queue identity message");
        }

        self.players.insert(
            player_id,
            Player {
                id: player_id,
                ship,
                controls: Controls::default(),
                channel,
            },
        );
        info!(player_id, ship, "player joined");
        player_id
    }

    /// Drops the player and queues their ship for removal.
    pub fn disconnect(&mut self, player_id: PlayerId) -> bool {
        let Some(player) = self.players.remove(&player_id) else {
            return false;
        };
        self.world.remove_object(player.ship);
        info!(player_id, "player left");
        true
    }

    /// Updates a held control. Takes effect at the next tick's control phase.
    pub fn command(&mut self, player_id: PlayerId, command: Command, active: bool) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.controls.set(command, active);
        }
    }

    pub fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Join { outbox, reply } => {
                let player_id = self.connect(outbox);
                if reply.send(player_id).is_err() {
                    // The connection went away before it learned its id.
                    self.disconnect(player_id);
                }
            }
            GameEvent::Leave { player_id } => {
                self.disconnect(player_id);
            }
            GameEvent::Command {
                player_id,
                command,
                active,
            } => self.command(player_id, command, active),
        }
    }

    /// Runs one full tick: controls, behaviors, movement, collisions, sync, cleanup.
    pub fn tick(&mut self, dt: f32, timestamp_ms: u64) {
        for player in self.players.values() {
            self.world.apply_controls(player.ship, &player.controls, dt);
        }
        self.world.frame_entities(dt);
        self.world.move_objects(dt);
        self.world.resolve_collisions();

        self.broadcast(timestamp_ms);

        self.world.finish_tick();
    }

    fn broadcast(&mut self, timestamp_ms: u64) {
        let ships = self.players.values().map(|p| (p.id, p.ship));
        let sync::SyncOutput {
            frame,
            mut viewports,
        } = sync::collect(&mut self.world, ships, timestamp_ms, self.sync);
        let frame = Arc::new(frame);

        for player in self.players.values() {
            let message = Outbound::World {
                frame: Arc::clone(&frame),
                viewport: viewports.remove(&player.id),
            };
            match player.channel.send(message) {
                Ok(()) => {}
                Err(ChannelError::Full) => {
                    self.dropped_packets += 1;
                    if should_log(&mut self.last_drop_log) {
                        warn!(
                            player_id = player.id,
                            dropped = self.dropped_packets,
                            "outbox full; dropping world packet"
                        );
                    }
                }
                // The connection is closing; its Leave event is on the way.
                Err(ChannelError::Closed) => {}
            }
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub tick_interval: Duration,
    /// Longer gaps between ticks are clamped to this.
    pub max_tick_dt: Duration,
}

pub async fn world_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    mut game: Game,
    settings: LoopSettings,
    shutdown: Arc<Notify>,
) {
    info!(
        tick_ms = settings.tick_interval.as_millis() as u64,
        entities = game.world().entities().len(),
        "world task started"
    );
    let mut last_tick = Instant::now();

    loop {
        let started = Instant::now();

        // Events that arrived since the last tick apply before it runs.
        while let Ok(ev) = input_rx.try_recv() {
            game.handle_event(ev);
        }

        let mut elapsed = started - last_tick;
        last_tick = started;
        if elapsed > settings.max_tick_dt {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                "tick gap too long; clamping dt"
            );
            elapsed = settings.max_tick_dt;
        }

        game.tick(elapsed.as_secs_f32(), timestamp_ms());

        // Shorten the wait by the time this tick took.
        let delay = settings.tick_interval.saturating_sub(started.elapsed());
        tokio::select! {
            _ = shutdown.notified() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    debug!(players = game.player_count(), "world task stopped");
}
