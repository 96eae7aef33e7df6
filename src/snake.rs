use macroquad::prelude::*;
use std::f32::consts::{PI, TAU};

use crate::config;
use crate::error::FaultKind;

/// Stable handle to a snake. Ids are never reused within one game.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SnakeId(pub u32);

impl std::fmt::Display for SnakeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "snake#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snake {
    pub id: SnakeId,
    /// Head first. Consecutive entries sit `SEGMENT_SPACING` apart after every move.
    pub segments: Vec<Vec2>,
    /// Heading in `(-PI, PI]`.
    pub angle: f32,
    pub speed: f32,
    /// Maximum angular rate in radians per second.
    pub turn_speed: f32,
    pub is_player: bool,
}

impl Snake {
    /// Create a straight snake of `length` segments trailing behind `head`.
    pub fn new(id: SnakeId, head: Vec2, angle: f32, length: usize, is_player: bool) -> Self {
        let back = -Vec2::from_angle(angle);
        let segments = (0..length.max(1))
            .map(|i| head + back * (i as f32 * config::SEGMENT_SPACING))
            .collect();
        Self {
            id,
            segments,
            angle: normalize_angle(angle),
            speed: config::SNAKE_BASE_SPEED,
            turn_speed: config::SNAKE_TURN_SPEED,
            is_player,
        }
    }

    pub fn head(&self) -> Option<Vec2> {
        self.segments.first().copied()
    }

    pub fn tail(&self) -> Option<Vec2> {
        self.segments.last().copied()
    }

    /// Why this snake cannot take part in a tick, if anything.
    pub fn fault(&self) -> Option<FaultKind> {
        if self.segments.is_empty() {
            return Some(FaultKind::NoSegments);
        }
        let finite_scalars =
            self.angle.is_finite() && self.speed.is_finite() && self.turn_speed.is_finite();
        if !finite_scalars || self.segments.iter().any(|s| !s.is_finite()) {
            return Some(FaultKind::NonFiniteState);
        }
        None
    }
}

pub fn get_snake_length(snake: &Snake) -> usize {
    snake.segments.len()
}

/// Map any angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let a = angle.rem_euclid(TAU);
    if a > PI {
        a - TAU
    } else {
        a
    }
}

/// Length-dependent speed scaling, monotonic and capped at `SPEED_GROWTH_CAP`.
pub fn growth_multiplier(length: usize) -> f32 {
    let extra = length.saturating_sub(config::INITIAL_LENGTH) as f32;
    (1.0 + extra * config::SPEED_GROWTH_PER_SEGMENT).min(config::SPEED_GROWTH_CAP)
}
