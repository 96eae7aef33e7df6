use macroquad::prelude::*;

use crate::error::SimError;

/// Rectangular arena whose edges wrap on both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct World {
    pub width: f32,
    pub height: f32,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Build a world, rejecting dimensions that would make wrapping undefined.
    pub fn try_new(width: f32, height: f32) -> Result<Self, SimError> {
        let world = Self::new(width, height);
        world.validate()?;
        Ok(world)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(SimError::InvalidBounds {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Wrap position into `[0, width) x [0, height)`.
    pub fn wrap(&self, pos: Vec2) -> Vec2 {
        vec2(wrap_axis(pos.x, self.width), wrap_axis(pos.y, self.height))
    }

    /// Shortest displacement vector from `from` to `to`, accounting for wrapping.
    pub fn delta(&self, from: Vec2, to: Vec2) -> Vec2 {
        let d = to - from;
        vec2(
            d.x - self.width * (d.x / self.width).round(),
            d.y - self.height * (d.y / self.height).round(),
        )
    }

    /// Squared distance using shortest path.
    pub fn distance_sq(&self, a: Vec2, b: Vec2) -> f32 {
        self.delta(a, b).length_squared()
    }

    /// Distance using shortest path.
    pub fn distance(&self, a: Vec2, b: Vec2) -> f32 {
        self.delta(a, b).length()
    }

    /// Whether `pos` already lies inside the half-open arena rectangle.
    pub fn contains(&self, pos: Vec2) -> bool {
        (0.0..self.width).contains(&pos.x) && (0.0..self.height).contains(&pos.y)
    }
}

/// Straight-line squared distance, ignoring the seams.
pub fn planar_distance_sq(a: Vec2, b: Vec2) -> f32 {
    (b - a).length_squared()
}

fn wrap_axis(v: f32, dim: f32) -> f32 {
    let r = v.rem_euclid(dim);
    // rem_euclid of a tiny negative value can round up to `dim` itself.
    if r >= dim {
        0.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(1000.0, 500.0)
    }

    #[test]
    fn wrap_handles_negative_and_overflowing_coordinates() {
        let w = world();
        let samples = [
            vec2(-1.0, -1.0),
            vec2(1000.0, 500.0),
            vec2(2500.5, -1250.25),
            vec2(-1e-7, -1e-7),
            vec2(999.999, 499.999),
        ];
        for p in samples {
            let q = w.wrap(p);
            assert!(w.contains(q), "{p:?} wrapped to {q:?}");
        }
        assert_eq!(w.wrap(vec2(-1.0, 501.0)), vec2(999.0, 1.0));
    }

    #[test]
    fn delta_takes_the_short_way_across_the_seam() {
        let w = world();
        let d = w.delta(vec2(990.0, 10.0), vec2(10.0, 490.0));
        assert!((d.x - 20.0).abs() < 1e-3);
        assert!((d.y + 20.0).abs() < 1e-3);
        assert!((w.distance(vec2(990.0, 10.0), vec2(10.0, 490.0)) - 800f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn toroidal_distance_never_exceeds_planar() {
        let w = world();
        let points = [
            vec2(0.0, 0.0),
            vec2(999.0, 499.0),
            vec2(500.0, 250.0),
            vec2(250.0, 10.0),
            vec2(760.0, 480.0),
            vec2(1.0, 260.0),
        ];
        for a in points {
            for b in points {
                let toroidal = w.distance_sq(a, b);
                let planar = planar_distance_sq(a, b);
                assert!(toroidal <= planar + planar * 1e-5 + 1e-3, "{a:?} -> {b:?}");
            }
        }
        // Without a seam benefit the two agree.
        let (a, b) = (vec2(100.0, 100.0), vec2(130.0, 140.0));
        assert_eq!(w.distance_sq(a, b), planar_distance_sq(a, b));
    }

    #[test]
    fn zero_or_non_finite_dimensions_are_rejected() {
        assert!(World::try_new(0.0, 100.0).is_err());
        assert!(World::try_new(100.0, f32::NAN).is_err());
        assert!(World::try_new(-5.0, 100.0).is_err());
        assert!(World::try_new(100.0, 100.0).is_ok());
    }
}
