// 2D vector math and wrap-around helpers for the toroidal world.

use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Plain 2D vector. Positive x is right, positive y is down (canvas convention).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians).
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns the zero vector for zero-length input instead of NaNs.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f32) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

/// Wraps a single coordinate into `[0, size)`.
pub fn wrap_coord(value: f32, size: f32) -> f32 {
    let wrapped = value.rem_euclid(size);
    // rem_euclid can round up to `size` for tiny negative inputs.
    if wrapped >= size { 0.0 } else { wrapped }
}

pub fn wrap_position(p: Vector2, size: f32) -> Vector2 {
    Vector2::new(wrap_coord(p.x, size), wrap_coord(p.y, size))
}

/// Shortest signed distance `a - b` along one wrapped axis.
pub fn shortest_delta(a: f32, b: f32, size: f32) -> f32 {
    let d = a - b;
    let half = size / 2.0;
    if d > half {
        d - size
    } else if d < -half {
        d + size
    } else {
        d
    }
}

/// Per-axis shortest delta `a - b` on a square torus of side `size`.
pub fn toroidal_delta(a: Vector2, b: Vector2, size: f32) -> Vector2 {
    Vector2::new(
        shortest_delta(a.x, b.x, size),
        shortest_delta(a.y, b.y, size),
    )
}
