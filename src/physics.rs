//! Arcade physics for the ball
//!
//! One circular body in an axis-aligned playfield, no gravity. Edge contact
//! reflects the velocity and scales it by the body's bounce.

use glam::Vec2;

use crate::consts::*;

/// Axis-aligned world bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// The fixed playfield
    pub fn playfield() -> Self {
        Self::new(Vec2::ZERO, Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT))
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Whether a circle lies fully inside (with a little slack)
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        let eps = 1e-3;
        center.x - radius >= self.min.x - eps
            && center.x + radius <= self.max.x + eps
            && center.y - radius >= self.min.y - eps
            && center.y + radius <= self.max.y + eps
    }
}

/// Reflect velocity off a surface with the given normal
#[inline]
pub fn reflect(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}

/// A circular physics body
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Fraction of speed kept on edge contact
    pub bounce: f32,
    pub collide_world_bounds: bool,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            bounce: BALL_BOUNCE,
            collide_world_bounds: true,
        }
    }

    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }

    /// Advance by `dt` seconds. Returns true if an edge was hit.
    pub fn step(&mut self, dt: f32, bounds: &Bounds) -> bool {
        self.pos += self.vel * dt;
        if !self.collide_world_bounds {
            return false;
        }

        // Ball wider than the field: pin it to the centre of that axis
        let half = bounds.size() * 0.5;
        let r = Vec2::splat(self.radius).min(half);
        let lo = bounds.min + r;
        let hi = bounds.max - r;

        let mut hit = false;
        for (axis, normal) in [(0usize, Vec2::X), (1usize, Vec2::Y)] {
            if self.pos[axis] < lo[axis] {
                // Mirror the overshoot back inside
                self.pos[axis] = (2.0 * lo[axis] - self.pos[axis]).min(hi[axis]);
                if self.vel.dot(normal) < 0.0 {
                    self.vel = reflect(self.vel, normal);
                    self.vel[axis] *= self.bounce;
                }
                hit = true;
            } else if self.pos[axis] > hi[axis] {
                self.pos[axis] = (2.0 * hi[axis] - self.pos[axis]).max(lo[axis]);
                if self.vel.dot(-normal) < 0.0 {
                    self.vel = reflect(self.vel, -normal);
                    self.vel[axis] *= self.bounce;
                }
                hit = true;
            }
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_free_flight() {
        let bounds = Bounds::playfield();
        let mut body = Body::new(bounds.center(), 16.0);
        body.set_velocity(Vec2::new(100.0, -50.0));
        assert!(!body.step(0.5, &bounds));
        assert_eq!(body.pos, Vec2::new(450.0, 275.0));
    }

    #[test]
    fn test_bounce_off_right_edge() {
        let bounds = Bounds::playfield();
        let mut body = Body::new(Vec2::new(780.0, 300.0), 16.0);
        body.set_velocity(Vec2::new(100.0, 0.0));
        assert!(body.step(0.1, &bounds));
        // 790 overshoots the 784 limit by 6, mirrored to 778
        assert!((body.pos.x - 778.0).abs() < 1e-3);
        assert_eq!(body.vel, Vec2::new(-100.0, 0.0));
    }

    #[test]
    fn test_bounce_off_top_edge_keeps_tangent() {
        let bounds = Bounds::playfield();
        let mut body = Body::new(Vec2::new(400.0, 20.0), 16.0);
        body.set_velocity(Vec2::new(30.0, -100.0));
        assert!(body.step(0.1, &bounds));
        assert_eq!(body.vel, Vec2::new(30.0, 100.0));
    }

    #[test]
    fn test_inelastic_bounce() {
        let bounds = Bounds::playfield();
        let mut body = Body::new(Vec2::new(20.0, 300.0), 16.0);
        body.bounce = 0.5;
        body.set_velocity(Vec2::new(-100.0, 0.0));
        body.step(0.1, &bounds);
        assert_eq!(body.vel, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_stopped_body_stays_put() {
        let bounds = Bounds::playfield();
        let mut body = Body::new(bounds.center(), 16.0);
        body.set_velocity(Vec2::new(250.0, 250.0));
        body.stop();
        body.step(1.0, &bounds);
        assert_eq!(body.pos, bounds.center());
        assert!(!body.is_moving());
    }

    proptest! {
        #[test]
        fn prop_ball_stays_in_playfield(
            vx in -300i32..=300,
            vy in -300i32..=300,
            steps in 1usize..600,
        ) {
            let bounds = Bounds::playfield();
            let mut body = Body::new(bounds.center(), 16.0);
            body.set_velocity(Vec2::new(vx as f32, vy as f32));
            for _ in 0..steps {
                body.step(1.0 / 60.0, &bounds);
                prop_assert!(bounds.contains_circle(body.pos, body.radius));
            }
            // Elastic: speed preserved
            let speed = Vec2::new(vx as f32, vy as f32).length();
            prop_assert!((body.vel.length() - speed).abs() < 1e-2);
        }
    }
}
