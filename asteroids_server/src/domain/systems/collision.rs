// Pairwise circle collisions on the torus, with a per-kind rule table and a simple bounce.

use crate::domain::entity::{Entity, EntityType};
use crate::domain::vector::{Vector2, toroidal_delta, wrap_position};
use crate::domain::world::TickContext;

use super::behavior::hit;

/// Share of velocity kept through a bounce.
const RESTITUTION: f32 = 0.7;

/// Checks every pair of live entities once and resolves touching pairs.
///
/// Entities spawned while resolving go to the context's side buffer, so the slice
/// being scanned never grows mid-pass.
pub fn resolve_collisions(entities: &mut [Entity], ctx: &mut TickContext, world_size: f32) {
    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            let (head, tail) = entities.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);
            if a.is_removed() {
                break;
            }
            if b.is_removed() {
                continue;
            }

            // a - b along the shorter way around each axis.
            let delta = toroidal_delta(a.position, b.position, world_size);
            let dist_sq = delta.length_squared();
            let radii = a.radius + b.radius;
            if dist_sq > radii * radii {
                continue;
            }

            a.dirty = true;
            b.dirty = true;

            // Radius-weighted contact point, with b expressed in a's tile of the world.
            let b_local = a.position - delta;
            let touchpoint = (a.position * b.radius + b_local * a.radius) * (1.0 / radii);

            if collide(a, b, touchpoint, ctx) {
                bounce(a, b, delta, touchpoint);
                a.position = wrap_position(a.position, world_size);
                b.position = wrap_position(b.position, world_size);
            }
        }
    }
}

/// Rule table for a touching pair. Returns whether the pair should bounce.
pub fn collide(a: &mut Entity, b: &mut Entity, touchpoint: Vector2, ctx: &mut TickContext) -> bool {
    assert!(
        !a.is_removed() && !b.is_removed(),
        "collision resolved against a removed entity"
    );

    match (a.entity_type(), b.entity_type()) {
        (EntityType::Ship, EntityType::Ship) => {
            let damage = ctx.tuning.ship.ram_damage;
            hit(a, damage, touchpoint, ctx);
            hit(b, damage, touchpoint, ctx);
            true
        }
        (EntityType::Asteroid, EntityType::Asteroid) => true,
        (EntityType::Asteroid, EntityType::Ship) => ram_asteroid(a, b, touchpoint, ctx),
        (EntityType::Ship, EntityType::Asteroid) => ram_asteroid(b, a, touchpoint, ctx),
        (EntityType::Missile, EntityType::Missile) => {
            // Missiles from one player never take each other out.
            if a.owner() != b.owner() {
                ctx.remove(a);
                ctx.remove(b);
            }
            false
        }
        (EntityType::Missile, _) => strike(a, b, touchpoint, ctx),
        (_, EntityType::Missile) => strike(b, a, touchpoint, ctx),
    }
}

fn ram_asteroid(
    asteroid: &mut Entity,
    ship: &mut Entity,
    touchpoint: Vector2,
    ctx: &mut TickContext,
) -> bool {
    let tuning = ctx.tuning.asteroid;
    let health = asteroid.as_asteroid().map_or(0.0, |a| a.health);
    hit(ship, tuning.min_ram_damage.max(health), touchpoint, ctx);
    hit(asteroid, tuning.ram_self_damage, touchpoint, ctx);
    true
}

fn strike(missile: &mut Entity, target: &mut Entity, touchpoint: Vector2, ctx: &mut TickContext) -> bool {
    let Some((owner, power)) = missile.as_missile().map(|m| (m.owner, m.power)) else {
        return false;
    };
    // Missiles start inside the ship that fired them.
    if target.entity_type() == EntityType::Ship && target.owner() == Some(owner) {
        return false;
    }
    hit(target, power, touchpoint, ctx);
    ctx.remove(missile);
    false
}

/// 1D elastic exchange along the dominant axis, using radius as mass, then pushes both
/// circles out of the contact point along the collision normal.
fn bounce(a: &mut Entity, b: &mut Entity, delta: Vector2, touchpoint: Vector2) {
    let (ra, rb) = (a.radius, b.radius);
    let radii = ra + rb;
    let exchange = |va: f32, vb: f32| {
        let (va, vb) = (va * RESTITUTION, vb * RESTITUTION);
        (
            (va * (ra - rb) + 2.0 * rb * vb) / radii,
            (vb * (rb - ra) + 2.0 * ra * va) / radii,
        )
    };

    if delta.x.abs() > delta.y.abs() {
        (a.velocity.x, b.velocity.x) = exchange(a.velocity.x, b.velocity.x);
    } else {
        (a.velocity.y, b.velocity.y) = exchange(a.velocity.y, b.velocity.y);
    }

    // Coincident centres have no normal; leave them where they are.
    let normal = delta.normalize();
    if normal == Vector2::ZERO {
        return;
    }
    a.position = touchpoint + normal * ra;
    b.position = touchpoint - normal * rb;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Asteroid, EntityKind, Missile};
    use crate::domain::world::World;
    use assert_approx_eq::assert_approx_eq;

    const SIZE: f32 = 500.0;

    fn asteroid(x: f32, y: f32, size: f32, vx: f32) -> Entity {
        Entity::new(
            EntityKind::Asteroid(Asteroid { health: size }),
            Vector2::new(x, y),
            Vector2::new(vx, 0.0),
            size,
        )
    }

    fn missile(owner: u64, x: f32, y: f32) -> Entity {
        Entity::new(
            EntityKind::Missile(Missile {
                owner,
                fuel: 1.0,
                power: 10.0,
                engine_sparks: 0.0,
            }),
            Vector2::new(x, y),
            Vector2::ZERO,
            2.0,
        )
    }

    fn clean(world: &mut World) {
        for entity in world.entities_mut() {
            entity.dirty = false;
        }
    }

    #[test]
    fn when_entities_straddle_the_seam_then_they_collide_and_separate() {
        let mut world = World::with_seed(SIZE, 5);
        let left = world.add_object(asteroid(0.01, 100.0, 5.0, -10.0));
        let right = world.add_object(asteroid(SIZE - 0.01, 100.0, 5.0, 10.0));
        clean(&mut world);

        world.resolve_collisions();

        let (l, r) = (world.entity(left).expect("left"), world.entity(right).expect("right"));
        assert!(l.dirty && r.dirty);
        // Pushed apart so the circles just touch across the seam.
        let gap = toroidal_delta(l.position, r.position, SIZE).length();
        assert_approx_eq!(gap, 10.0, 1e-2);
        assert!(l.position.x >= 0.0 && l.position.x < SIZE);
        assert!(r.position.x >= 0.0 && r.position.x < SIZE);
        // Velocities exchanged along x, scaled by restitution.
        assert_approx_eq!(l.velocity.x, 7.0, 1e-4);
        assert_approx_eq!(r.velocity.x, -7.0, 1e-4);
    }

    #[test]
    fn when_entities_are_apart_then_nothing_changes() {
        let mut world = World::with_seed(SIZE, 5);
        let a = world.add_object(asteroid(100.0, 100.0, 5.0, 3.0));
        world.add_object(asteroid(200.0, 100.0, 5.0, -3.0));
        clean(&mut world);

        world.resolve_collisions();

        assert!(world.entities().iter().all(|e| !e.dirty));
        assert_eq!(world.entity(a).map(|e| e.velocity.x), Some(3.0));
    }

    #[test]
    fn when_missile_touches_its_owners_ship_then_nothing_happens() {
        let mut world = World::with_seed(SIZE, 5);
        let ship = world.spawn_ship(7, Vector2::new(100.0, 100.0));
        let shot = world.add_object(missile(7, 101.0, 100.0));

        world.resolve_collisions();

        assert!(world.pending_removal().is_empty());
        let health = world.entity(ship).and_then(|e| e.as_ship()).map(|s| s.health);
        assert_eq!(health, Some(100.0));
        assert!(world.entity(shot).is_some_and(|e| !e.is_removed()));
    }

    #[test]
    fn when_missile_hits_another_players_ship_then_ship_is_damaged_and_missile_removed() {
        let mut world = World::with_seed(SIZE, 5);
        let ship = world.spawn_ship(1, Vector2::new(100.0, 100.0));
        let shot = world.add_object(missile(2, 101.0, 100.0));
        let before = world.entity(ship).map(|e| e.velocity);

        world.resolve_collisions();

        assert_eq!(world.pending_removal(), &[shot]);
        let health = world.entity(ship).and_then(|e| e.as_ship()).map(|s| s.health);
        assert_eq!(health, Some(90.0));
        // Strikes never bounce.
        assert_eq!(world.entity(ship).map(|e| e.velocity), before);
    }

    #[test]
    fn when_missiles_from_same_owner_touch_then_both_survive() {
        let mut world = World::with_seed(SIZE, 5);
        world.add_object(missile(3, 100.0, 100.0));
        world.add_object(missile(3, 101.0, 100.0));

        world.resolve_collisions();

        assert!(world.pending_removal().is_empty());
    }

    #[test]
    fn when_missiles_from_different_owners_touch_then_both_are_destroyed() {
        let mut world = World::with_seed(SIZE, 5);
        let a = world.add_object(missile(3, 100.0, 100.0));
        let b = world.add_object(missile(4, 101.0, 100.0));

        world.resolve_collisions();

        assert_eq!(world.pending_removal(), &[a, b]);
        assert!(world.entities().iter().all(|e| !e.dirty));
    }

    #[test]
    fn when_missile_hits_asteroid_then_asteroid_takes_missile_power() {
        let mut world = World::with_seed(SIZE, 5);
        let rock = world.add_object(asteroid(100.0, 100.0, 25.0, 0.0));
        let shot = world.add_object(missile(1, 124.0, 100.0));

        world.resolve_collisions();

        assert_eq!(world.pending_removal(), &[shot]);
        let rock = world.entity(rock).expect("asteroid");
        assert_eq!(rock.as_asteroid().map(|a| a.health), Some(15.0));
        assert_approx_eq!(rock.radius, 24.0, 1e-4);
    }

    #[test]
    fn when_ship_rams_asteroid_then_ship_takes_asteroid_health_and_they_bounce() {
        let mut world = World::with_seed(SIZE, 5);
        let rock = world.add_object(asteroid(100.0, 100.0, 20.0, 0.0));
        let ship = world.spawn_ship(1, Vector2::new(100.0, 124.0));

        world.resolve_collisions();

        let health = world.entity(ship).and_then(|e| e.as_ship()).map(|s| s.health);
        assert_eq!(health, Some(80.0));
        let rock_health = world.entity(rock).and_then(|e| e.as_asteroid()).map(|a| a.health);
        assert_eq!(rock_health, Some(19.5));
        let gap = world
            .entity(rock)
            .zip(world.entity(ship))
            .map(|(r, s)| toroidal_delta(r.position, s.position, SIZE).length())
            .unwrap_or_default();
        // Separation uses the asteroid's radius after it shrank from the impact.
        assert_approx_eq!(gap, 24.95, 1e-2);
    }

    #[test]
    fn when_ships_ram_each_other_then_both_take_fixed_damage() {
        let mut world = World::with_seed(SIZE, 5);
        let a = world.spawn_ship(1, Vector2::new(100.0, 100.0));
        let b = world.spawn_ship(2, Vector2::new(104.0, 100.0));

        world.resolve_collisions();

        for id in [a, b] {
            let health = world.entity(id).and_then(|e| e.as_ship()).map(|s| s.health);
            assert_eq!(health, Some(90.0));
        }
    }

    #[test]
    fn when_destroyed_asteroid_splits_then_fragments_are_not_scanned_this_pass() {
        let mut world = World::with_seed(SIZE, 5);
        world.add_object(asteroid(100.0, 100.0, 10.0, 0.0));
        world.add_object(missile(1, 105.0, 100.0));
        world.add_object(missile(2, 95.0, 100.0));

        world.resolve_collisions();

        // First missile destroys the rock; the second finds it tombstoned.
        assert_eq!(world.pending_removal().len(), 2);
        assert_eq!(world.spawned().len(), 2);
        assert!(world.spawned().iter().all(|e| !e.is_removed()));
    }
}
