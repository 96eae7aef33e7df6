use macroquad::prelude::*;

use crate::config;
use crate::snake::{growth_multiplier, normalize_angle, Snake};
use crate::world::World;

/// Below this distance a follow direction is treated as undefined.
const DEGENERATE_DIST: f32 = 1e-4;

/// Advance one snake by `dt` towards `target_angle`, returning the moved copy.
pub fn move_snake(snake: &Snake, dt: f32, target_angle: f32, world: &World) -> Snake {
    move_snake_boosted(snake, dt, target_angle, world, 1.0)
}

/// As [`move_snake`], with an extra factor on the effective speed.
pub fn move_snake_boosted(
    snake: &Snake,
    dt: f32,
    target_angle: f32,
    world: &World,
    speed_scale: f32,
) -> Snake {
    let angle = turn_towards(snake.angle, target_angle, snake.turn_speed, dt);
    let speed = snake.speed * growth_multiplier(snake.segments.len()) * speed_scale;

    let mut moved = snake.clone();
    moved.angle = angle;
    moved.segments = match snake.segments.first() {
        Some(&head) => {
            let new_head = world.wrap(head + Vec2::from_angle(angle) * speed * dt);
            follow_chain(&snake.segments, new_head, angle, world)
        }
        None => Vec::new(),
    };
    moved
}

/// Rotate `current` towards `target`, closing at most `turn_speed * dt` of the
/// error as a fraction, never overshooting.
pub fn turn_towards(current: f32, target: f32, turn_speed: f32, dt: f32) -> f32 {
    let fraction = (turn_speed * dt).clamp(0.0, 1.0);
    normalize_angle(current + normalize_angle(target - current) * fraction)
}

/// Rebuild the body behind `new_head`, each segment pulled to exactly
/// `SEGMENT_SPACING` from its already-placed predecessor.
pub fn follow_chain(old: &[Vec2], new_head: Vec2, heading: f32, world: &World) -> Vec<Vec2> {
    let forward = Vec2::from_angle(heading);
    let mut chain = Vec::with_capacity(old.len());
    chain.push(new_head);
    for &old_pos in old.iter().skip(1) {
        let prev = chain[chain.len() - 1];
        let to_prev = world.delta(old_pos, prev);
        let len = to_prev.length();
        let dir = if len > DEGENERATE_DIST {
            to_prev / len
        } else {
            forward
        };
        chain.push(world.wrap(prev - dir * config::SEGMENT_SPACING));
    }
    chain
}
