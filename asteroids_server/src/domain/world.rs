// Authoritative entity store for one game.
//
// Live entities sit in a Vec whose indices stay stable for the whole tick: entities
// spawned mid-tick go to a side buffer, and removed entities are only tombstoned until
// `finish_tick` drops them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::entity::{Entity, EntityId};
use super::particle::{Particle, ParticleKind};
use super::player::{Controls, PlayerId};
use super::systems::{behavior, collision};
use super::tuning::Tuning;
use super::vector::{Vector2, wrap_position};

/// Per-tick side effects that behaviors and collisions produce.
///
/// Kept apart from the live entity list so an entity can be mutated while effects
/// are recorded.
pub struct TickContext {
    pub tuning: Tuning,
    rng: StdRng,
    next_id: EntityId,
    spawned: Vec<Entity>,
    pending_removal: Vec<EntityId>,
    particles: Vec<Particle>,
}

impl TickContext {
    fn new(tuning: Tuning, rng: StdRng) -> Self {
        Self {
            tuning,
            rng,
            next_id: 0,
            spawned: Vec::new(),
            pending_removal: Vec::new(),
            particles: Vec::new(),
        }
    }

    fn assign_id(&mut self, entity: &mut Entity) -> EntityId {
        self.next_id += 1;
        entity.id = self.next_id;
        entity.id
    }

    /// Queues an entity created during the tick. It joins the live list at tick end.
    pub fn add_object(&mut self, mut entity: Entity) -> EntityId {
        let id = self.assign_id(&mut entity);
        self.spawned.push(entity);
        id
    }

    /// Tombstones the entity. Removing twice is a no-op.
    pub fn remove(&mut self, entity: &mut Entity) {
        if entity.removed {
            return;
        }
        entity.removed = true;
        // Its id goes out in the removal list instead.
        entity.dirty = false;
        self.pending_removal.push(entity.id);
    }

    pub fn add_particle(&mut self, kind: ParticleKind, position: Vector2, velocity: Vector2, ttl: f32) {
        self.particles.push(Particle {
            kind,
            position,
            velocity,
            ttl,
        });
    }

    /// Uniform value in `[0, 1)`.
    pub fn random(&mut self) -> f32 {
        self.rng.r#gen::<f32>()
    }

    /// Uniform value spanning `range`, centred on zero.
    pub fn rand(&mut self, range: f32) -> f32 {
        (self.random() - 0.5) * range
    }

    pub fn rand_vector(&mut self, range: f32) -> Vector2 {
        Vector2::new(self.rand(range), self.rand(range))
    }
}

pub struct World {
    size: f32,
    entities: Vec<Entity>,
    ctx: TickContext,
    refresh_cursor: usize,
}

impl World {
    pub fn new(size: f32) -> Self {
        Self::with_rng(size, Tuning::default(), StdRng::from_entropy())
    }

    /// Deterministic world, used by tests.
    pub fn with_seed(size: f32, seed: u64) -> Self {
        Self::with_rng(size, Tuning::default(), StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(size: f32, tuning: Tuning, rng: StdRng) -> Self {
        Self {
            size,
            entities: Vec::new(),
            ctx: TickContext::new(tuning, rng),
            refresh_cursor: 0,
        }
    }

    /// Seeds the initial asteroid field at random positions.
    pub fn populate(&mut self) {
        let sizes = self.ctx.tuning.asteroid.initial_sizes;
        for size in sizes {
            let position = self.random_position();
            let asteroid = behavior::new_asteroid(&mut self.ctx, position, Vector2::ZERO, size);
            self.add_object(asteroid);
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn tuning(&self) -> &Tuning {
        &self.ctx.tuning
    }

    /// Inserts straight into the live list. Only callable between ticks, since the
    /// tick phases hold the entity list borrowed.
    pub fn add_object(&mut self, mut entity: Entity) -> EntityId {
        let id = self.ctx.assign_id(&mut entity);
        self.entities.push(entity);
        id
    }

    /// Spawns a ship for `owner` with random facing and drift.
    pub fn spawn_ship(&mut self, owner: PlayerId, position: Vector2) -> EntityId {
        let ship = behavior::new_ship(&mut self.ctx, owner, position);
        self.add_object(ship)
    }

    /// Queues a live entity for removal at the end of the tick.
    pub fn remove_object(&mut self, id: EntityId) -> bool {
        match self.entities.iter_mut().find(|e| e.id == id) {
            Some(entity) => {
                self.ctx.remove(entity);
                true
            }
            None => false,
        }
    }

    pub fn random_position(&mut self) -> Vector2 {
        let size = self.size;
        Vector2::new(self.ctx.random() * size, self.ctx.random() * size)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Entities created during the current tick, not yet live.
    pub fn spawned(&self) -> &[Entity] {
        &self.ctx.spawned
    }

    pub fn pending_removal(&self) -> &[EntityId] {
        &self.ctx.pending_removal
    }

    pub fn particles(&self) -> &[Particle] {
        &self.ctx.particles
    }

    /// Gives a live entity and the tick context together, for driving behaviors directly.
    pub fn with_entity<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut Entity, &mut TickContext) -> R,
    ) -> Option<R> {
        let entity = self.entities.iter_mut().find(|e| e.id == id)?;
        if entity.removed {
            return None;
        }
        Some(f(entity, &mut self.ctx))
    }

    /// Applies held controls to a ship, scaled by `dt`.
    pub fn apply_controls(&mut self, ship: EntityId, controls: &Controls, dt: f32) {
        self.with_entity(ship, |entity, ctx| {
            behavior::apply_controls(entity, controls, dt, ctx)
        });
    }

    /// Runs every live entity's per-tick behavior.
    pub fn frame_entities(&mut self, dt: f32) {
        for entity in self.entities.iter_mut().filter(|e| !e.removed) {
            behavior::frame(entity, dt, &mut self.ctx);
        }
    }

    /// Integrates position and wraps each axis into `[0, size)`.
    pub fn move_objects(&mut self, dt: f32) {
        for entity in &mut self.entities {
            let moved = entity.position + entity.velocity * dt;
            entity.position = wrap_position(moved, self.size);
        }
    }

    pub fn resolve_collisions(&mut self) {
        collision::resolve_collisions(&mut self.entities, &mut self.ctx, self.size);
    }

    /// Force-flags one live entity per call, round-robin, so every entity is resent
    /// periodically even when nothing changes.
    pub fn flag_refresh(&mut self) {
        if self.entities.is_empty() {
            return;
        }
        let index = self.refresh_cursor % self.entities.len();
        self.refresh_cursor = self.refresh_cursor.wrapping_add(1);
        let entity = &mut self.entities[index];
        if !entity.removed {
            entity.dirty = true;
        }
    }

    pub(crate) fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Drops tombstoned entities, merges this tick's spawns and clears particles.
    pub fn finish_tick(&mut self) {
        self.entities.retain(|e| !e.removed);
        self.ctx.pending_removal.clear();
        self.ctx.particles.clear();
        let spawned = std::mem::take(&mut self.ctx.spawned);
        self.entities.extend(spawned.into_iter().filter(|e| !e.removed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Asteroid, EntityKind};

    fn rock(position: Vector2, velocity: Vector2, size: f32) -> Entity {
        Entity::new(
            EntityKind::Asteroid(Asteroid { health: size }),
            position,
            velocity,
            size,
        )
    }

    #[test]
    fn when_objects_are_added_then_ids_increase_and_are_never_reused() {
        let mut world = World::with_seed(500.0, 1);
        let a = world.add_object(rock(Vector2::new(10.0, 10.0), Vector2::ZERO, 5.0));
        let b = world.add_object(rock(Vector2::new(50.0, 10.0), Vector2::ZERO, 5.0));
        assert!(b > a);

        world.remove_object(b);
        world.finish_tick();
        let c = world.add_object(rock(Vector2::new(90.0, 10.0), Vector2::ZERO, 5.0));
        assert!(c > b);
    }

    #[test]
    fn when_entity_crosses_right_edge_then_it_reappears_near_zero() {
        let mut world = World::with_seed(500.0, 1);
        let id = world.add_object(rock(Vector2::new(499.99, 250.0), Vector2::new(30.0, 0.0), 5.0));

        world.move_objects(1.0 / 30.0);

        let entity = world.entity(id).expect("entity should be live");
        assert!(entity.position.x >= 0.0 && entity.position.x < 2.0);
        assert_eq!(entity.position.y, 250.0);
    }

    #[test]
    fn when_entity_crosses_top_edge_then_it_wraps_to_bottom() {
        let mut world = World::with_seed(500.0, 1);
        let id = world.add_object(rock(Vector2::new(100.0, 0.5), Vector2::new(0.0, -30.0), 5.0));

        world.move_objects(0.1);

        let y = world.entity(id).map(|e| e.position.y).unwrap_or_default();
        assert!(y > 495.0 && y < 500.0);
    }

    #[test]
    fn when_object_is_removed_then_it_stays_live_until_tick_end() {
        let mut world = World::with_seed(500.0, 1);
        let id = world.add_object(rock(Vector2::new(10.0, 10.0), Vector2::ZERO, 5.0));

        assert!(world.remove_object(id));
        assert!(world.remove_object(id));
        assert_eq!(world.pending_removal(), &[id]);
        assert!(world.entity(id).is_some_and(Entity::is_removed));

        world.finish_tick();
        assert!(world.entity(id).is_none());
        assert!(world.pending_removal().is_empty());
    }

    #[test]
    fn when_tick_finishes_then_spawned_entities_become_live_and_particles_clear() {
        let mut world = World::with_seed(500.0, 1);
        let spawned = world.ctx.add_object(rock(Vector2::new(10.0, 10.0), Vector2::ZERO, 5.0));
        world
            .ctx
            .add_particle(ParticleKind::Rock, Vector2::ZERO, Vector2::ZERO, 1.0);

        assert!(world.entity(spawned).is_none());
        assert_eq!(world.spawned().len(), 1);

        world.finish_tick();

        assert!(world.entity(spawned).is_some_and(|e| e.dirty));
        assert!(world.spawned().is_empty());
        assert!(world.particles().is_empty());
    }

    #[test]
    fn when_refresh_runs_for_n_ticks_then_every_entity_is_flagged() {
        let mut world = World::with_seed(500.0, 1);
        for i in 0..7 {
            world.add_object(rock(Vector2::new(i as f32 * 60.0, 10.0), Vector2::ZERO, 5.0));
        }
        for entity in world.entities_mut() {
            entity.dirty = false;
        }

        let mut seen = std::collections::HashSet::new();
        for _ in 0..world.entities().len() {
            world.flag_refresh();
            for entity in world.entities_mut() {
                if entity.dirty {
                    seen.insert(entity.id);
                    entity.dirty = false;
                }
            }
        }

        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn when_world_is_populated_then_four_asteroids_exist_inside_bounds() {
        let mut world = World::with_seed(500.0, 7);
        world.populate();

        assert_eq!(world.entities().len(), 4);
        for entity in world.entities() {
            assert!(entity.as_asteroid().is_some());
            assert!(entity.position.x >= 0.0 && entity.position.x < 500.0);
            assert!(entity.position.y >= 0.0 && entity.position.y < 500.0);
        }
    }
}
