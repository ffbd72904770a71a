// Per-kind entity behavior: ship controls, missile flight, damage and destruction.

use std::f32::consts::{PI, TAU};

use tracing::debug;

use crate::domain::entity::{Asteroid, Entity, EntityKind, EntityType, Missile, Ship};
use crate::domain::particle::ParticleKind;
use crate::domain::player::{Controls, PlayerId};
use crate::domain::vector::Vector2;
use crate::domain::world::TickContext;

/// Number of emissions for a loop of the form `for i in 0.. while i < n`.
fn emission_count(n: f32) -> usize {
    if n > 0.0 { n.ceil() as usize } else { 0 }
}

pub fn new_ship(ctx: &mut TickContext, owner: PlayerId, position: Vector2) -> Entity {
    let tuning = ctx.tuning.ship;
    let velocity = ctx.rand_vector(tuning.spawn_drift);
    let angle = ctx.random() * TAU;
    Entity::new(
        EntityKind::Ship(Ship {
            owner,
            health: tuning.max_health,
            reload: 0.0,
            engine_sparks: 0.0,
        }),
        position,
        velocity,
        tuning.radius,
    )
    .with_angle(angle)
}

/// Asteroid of the given size, drifting off `velocity` by a size-scaled random amount.
pub fn new_asteroid(ctx: &mut TickContext, position: Vector2, velocity: Vector2, size: f32) -> Entity {
    let drift = ctx.rand_vector(100.0 / size);
    Entity::new(
        EntityKind::Asteroid(Asteroid { health: size }),
        position,
        velocity + drift,
        size,
    )
}

pub fn new_missile(
    ctx: &mut TickContext,
    owner: PlayerId,
    position: Vector2,
    velocity: Vector2,
    angle: f32,
) -> Entity {
    let tuning = ctx.tuning.missile;
    let fuel = tuning.fuel + ctx.random() * tuning.fuel_jitter;
    Entity::new(
        EntityKind::Missile(Missile {
            owner,
            fuel,
            power: tuning.power,
            engine_sparks: 0.0,
        }),
        position,
        velocity - Vector2::from_angle(angle) * tuning.launch_speed,
        tuning.radius,
    )
    .with_angle(angle)
}

/// Applies a player's held controls to their ship.
pub fn apply_controls(ship: &mut Entity, controls: &Controls, dt: f32, ctx: &mut TickContext) {
    if controls.rotate_left {
        rotate(ship, -1.0, dt, ctx);
    }
    if controls.rotate_right {
        rotate(ship, 1.0, dt, ctx);
    }
    if controls.accelerate {
        accelerate(ship, dt, ctx);
    }
    if controls.shoot {
        shoot(ship, ctx);
    }
}

/// Once-per-tick behavior for every live entity.
pub fn frame(entity: &mut Entity, dt: f32, ctx: &mut TickContext) {
    match entity.entity_type() {
        EntityType::Ship => {
            if let Some(ship) = entity.as_ship_mut() {
                if ship.reload > 0.0 {
                    ship.reload -= dt;
                }
            }
        }
        EntityType::Asteroid => {}
        EntityType::Missile => missile_frame(entity, dt, ctx),
    }
}

pub fn rotate(entity: &mut Entity, direction: f32, dt: f32, ctx: &TickContext) {
    if entity.as_ship().is_none() {
        return;
    }
    entity.angle += direction * dt * ctx.tuning.ship.rotation_power;
    entity.dirty = true;
}

pub fn accelerate(entity: &mut Entity, dt: f32, ctx: &mut TickContext) {
    let tuning = ctx.tuning.ship;
    let Entity {
        position,
        velocity,
        angle,
        dirty,
        kind: EntityKind::Ship(ship),
        ..
    } = entity
    else {
        return;
    };

    *dirty = true;

    // The engine points backwards, so thrust runs opposite to the facing.
    let thrust = Vector2::from_angle(*angle + PI) * tuning.engine_power;
    *velocity += thrust * dt;

    // Accumulate emission time so the particle rate holds across uneven ticks.
    ship.engine_sparks += dt;
    let interval = 1.0 / tuning.engine_particles_per_second;
    while ship.engine_sparks > 0.0 {
        let jitter = ctx.rand_vector(10.0);
        let ttl = 0.5 + ctx.random() * 3.0;
        ctx.add_particle(
            ParticleKind::Engine,
            *position,
            *velocity * 0.5 - thrust * (1.0 / 3.0) + jitter,
            ttl,
        );
        ship.engine_sparks -= interval;
    }
}

/// Fires a missile if the ship has reloaded. Returns the missile id.
pub fn shoot(entity: &mut Entity, ctx: &mut TickContext) -> Option<u64> {
    let reload_seconds = ctx.tuning.ship.reload_seconds;
    let (position, velocity, angle) = (entity.position, entity.velocity, entity.angle);
    let EntityKind::Ship(ship) = &mut entity.kind else {
        return None;
    };
    if ship.reload > 0.0 {
        return None;
    }
    ship.reload = reload_seconds;
    let owner = ship.owner;

    let missile = new_missile(ctx, owner, position, velocity, angle);
    Some(ctx.add_object(missile))
}

fn missile_frame(entity: &mut Entity, dt: f32, ctx: &mut TickContext) {
    let tuning = ctx.tuning.missile;
    let burned_out = {
        let Entity {
            position,
            velocity,
            angle,
            dirty,
            kind: EntityKind::Missile(missile),
            ..
        } = entity
        else {
            return;
        };

        let accel = Vector2::from_angle(*angle) * tuning.acceleration;

        missile.fuel -= dt;
        if missile.fuel > 0.0 {
            *dirty = true;
            if missile.fuel < tuning.ignition_fuel {
                *velocity -= accel * dt;
                missile.engine_sparks += dt;
            }
        }

        let interval = 1.0 / tuning.engine_particles_per_second;
        while missile.engine_sparks > 0.0 {
            let origin = *position + ctx.rand_vector(2.0);
            let exhaust = *velocity * 0.5 + accel + ctx.rand_vector(30.0);
            let ttl = 0.3 + ctx.random() * 0.5;
            ctx.add_particle(ParticleKind::Engine, origin, exhaust, ttl);
            missile.engine_sparks -= interval;
        }

        missile.fuel < tuning.burnout_fuel
    };

    if burned_out {
        let (position, velocity) = (entity.position, entity.velocity);
        let fast = velocity * 0.8 + ctx.rand_vector(50.0);
        let ttl = ctx.random() / 2.0;
        ctx.add_particle(ParticleKind::Spark, position, fast, ttl);
        let slow = velocity * 0.6 + ctx.rand_vector(30.0);
        let ttl = ctx.random() / 2.0;
        ctx.add_particle(ParticleKind::Spark, position, slow, ttl);
        ctx.remove(entity);
    }
}

/// Applies damage at `touchpoint`. Missiles are never hit; they only strike.
pub fn hit(entity: &mut Entity, points: f32, touchpoint: Vector2, ctx: &mut TickContext) {
    match entity.entity_type() {
        EntityType::Ship => hit_ship(entity, points, touchpoint, ctx),
        EntityType::Asteroid => hit_asteroid(entity, points, touchpoint, ctx),
        EntityType::Missile => {}
    }
}

fn hit_ship(entity: &mut Entity, points: f32, touchpoint: Vector2, ctx: &mut TickContext) {
    let (radius, velocity) = (entity.radius, entity.velocity);
    let Some(ship) = entity.as_ship_mut() else {
        return;
    };
    // Health is not checked against zero; ships keep flying when it goes negative.
    ship.health -= points;

    for _ in 0..emission_count(points / 2.0 + 2.0) {
        let origin = touchpoint + ctx.rand_vector(radius / 2.0);
        let spray = velocity * 0.25 + ctx.rand_vector(points);
        let ttl = 1.5 + ctx.random();
        ctx.add_particle(ParticleKind::Spark, origin, spray, ttl);
    }
}

fn hit_asteroid(entity: &mut Entity, points: f32, touchpoint: Vector2, ctx: &mut TickContext) {
    let tuning = ctx.tuning.asteroid;
    let radius_before = entity.radius;
    let EntityKind::Asteroid(asteroid) = &mut entity.kind else {
        return;
    };
    asteroid.health -= points;
    let destroyed = asteroid.health <= 0.0;

    // Bits of rock shot away from the impact.
    for _ in 0..emission_count(points) {
        let origin = touchpoint + ctx.rand_vector(radius_before / 2.0);
        let spray = entity.velocity * 0.25 + ctx.rand_vector(10.0);
        let ttl = 0.5 + ctx.random() * 5.0;
        ctx.add_particle(ParticleKind::Rock, origin, spray, ttl);
    }

    entity.radius -= points * tuning.shrink_per_damage;
    if !destroyed {
        return;
    }

    ctx.remove(entity);
    let fragment = radius_before * tuning.split_ratio;
    debug!(asteroid_id = entity.id, fragment, "asteroid destroyed");
    if fragment < tuning.min_fragment_radius {
        return;
    }

    let spread = 20.0 + 250.0 / fragment;
    for _ in 0..2 {
        let origin = entity.position + ctx.rand_vector(fragment);
        let velocity = entity.velocity + ctx.rand_vector(spread);
        let child = new_asteroid(ctx, origin, velocity, fragment);
        ctx.add_object(child);
    }

    for _ in 0..emission_count(3.0 + fragment) {
        let origin = entity.position + ctx.rand_vector(entity.radius);
        let spray = entity.velocity * 0.25 + ctx.rand_vector(10.0);
        let ttl = 0.5 + ctx.random() * 5.0;
        ctx.add_particle(ParticleKind::Rock, origin, spray, ttl);
    }
}
