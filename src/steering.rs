use macroquad::prelude::*;
use std::collections::HashMap;

use crate::config;
use crate::pellets::Pellet;
use crate::simulation::GameState;
use crate::snake::{normalize_angle, Snake, SnakeId};
use crate::world::{planar_distance_sq, World};

/// Which body material a bot is afraid of.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AvoidanceMode {
    /// Only the head of every snake repels. Easier bots.
    #[default]
    HeadOnly,
    /// Every segment of other snakes repels, plus the bot's own body once it
    /// is further away along the chain than the danger radius.
    FullBody,
}

/// How a bot measures distance to pellets when seeking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PelletPerception {
    /// Straight-line distance: pellets across a seam are invisible.
    #[default]
    Planar,
    /// Shortest wrapped distance and bearing.
    Toroidal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SteeringConfig {
    pub avoidance: AvoidanceMode,
    pub perception: PelletPerception,
}

/// Desired headings for every non-player snake, with default steering.
pub fn compute_target_angles(state: &GameState) -> HashMap<SnakeId, f32> {
    compute_target_angles_with(state, &SteeringConfig::default())
}

pub fn compute_target_angles_with(
    state: &GameState,
    steering: &SteeringConfig,
) -> HashMap<SnakeId, f32> {
    state
        .snakes
        .values()
        .filter(|s| !s.is_player && s.fault().is_none())
        .map(|s| (s.id, bot_heading(s, state, steering)))
        .collect()
}

fn bot_heading(snake: &Snake, state: &GameState, steering: &SteeringConfig) -> f32 {
    let Some(head) = snake.head() else {
        return snake.angle;
    };
    let world = &state.world;

    let repulsion = avoidance_vector(snake, head, state, steering.avoidance);
    let desired = if repulsion.length() > config::AVOID_THRESHOLD {
        Some(repulsion.y.atan2(repulsion.x))
    } else {
        seek_bearing(head, &state.pellets, world, steering.perception)
    };

    match desired {
        Some(target) => blend_heading(snake.angle, target),
        None => snake.angle,
    }
}

/// Move `current` a fixed `AI_TURN_BLEND` fraction of the way to `desired`.
pub fn blend_heading(current: f32, desired: f32) -> f32 {
    normalize_angle(current + normalize_angle(desired - current) * config::AI_TURN_BLEND)
}

/// Fraction of a bot's heading error closed in one tick once the steering
/// blend and the movement turn-rate clamp are applied one after the other.
pub fn composed_turn_fraction(turn_speed: f32, dt: f32) -> f32 {
    config::AI_TURN_BLEND * (turn_speed * dt).clamp(0.0, 1.0)
}

/// Bearing from `head` to the nearest pellet inside `SEEK_RADIUS`.
pub fn seek_bearing(
    head: Vec2,
    pellets: &[Pellet],
    world: &World,
    perception: PelletPerception,
) -> Option<f32> {
    let seek_sq = config::SEEK_RADIUS * config::SEEK_RADIUS;
    let offset = |p: &Pellet| match perception {
        PelletPerception::Planar => p.pos - head,
        PelletPerception::Toroidal => world.delta(head, p.pos),
    };
    let dist_sq = |p: &Pellet| match perception {
        PelletPerception::Planar => planar_distance_sq(head, p.pos),
        PelletPerception::Toroidal => world.distance_sq(head, p.pos),
    };

    pellets
        .iter()
        .map(|p| (p, dist_sq(p)))
        .filter(|(_, d)| *d <= seek_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| {
            let to = offset(p);
            to.y.atan2(to.x)
        })
}

/// Sum of pushes away from nearby body material, each weighted by
/// `1 - distance / AVOID_RADIUS`.
pub fn avoidance_vector(snake: &Snake, head: Vec2, state: &GameState, mode: AvoidanceMode) -> Vec2 {
    let world = &state.world;
    let max_radius = config::AVOID_RADIUS;
    // Own segments closer than this along the chain always sit inside the
    // danger radius and carry no information.
    let own_skip = (max_radius / config::SEGMENT_SPACING).ceil() as usize + 1;

    let mut push = Vec2::ZERO;
    for other in state.snakes.values() {
        if other.fault().is_some() {
            continue;
        }
        let own = other.id == snake.id;
        let material: &[Vec2] = match mode {
            AvoidanceMode::HeadOnly if own => &[],
            AvoidanceMode::HeadOnly => &other.segments[..other.segments.len().min(1)],
            AvoidanceMode::FullBody if own => other.segments.get(own_skip..).unwrap_or(&[]),
            AvoidanceMode::FullBody => &other.segments,
        };
        for &seg in material {
            let away = world.delta(seg, head);
            let dist = away.length();
            if dist < max_radius && dist > 1e-4 {
                push += away / dist * (1.0 - dist / max_radius);
            }
        }
    }
    push
}
