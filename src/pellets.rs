use macroquad::prelude::*;
use ::rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use crate::config;
use crate::snake::{Snake, SnakeId};
use crate::world::World;

/// Food item in the arena. `value` is the number of segments it grants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pellet {
    pub pos: Vec2,
    pub value: u32,
}

/// Result of one pickup pass over every snake.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collection {
    /// Segments owed to each snake that ate something.
    pub gains: BTreeMap<SnakeId, u32>,
    /// Indices into the scanned pellet slice, ascending.
    pub collected: Vec<usize>,
}

/// Find every pellet within pickup range of a head. Snakes are scanned in id
/// order and a pellet is credited to the first snake that reaches it.
pub fn collect_pellets(
    snakes: &BTreeMap<SnakeId, Snake>,
    skip: &BTreeSet<SnakeId>,
    pellets: &[Pellet],
    world: &World,
) -> Collection {
    let pickup_sq = config::PICKUP_RADIUS * config::PICKUP_RADIUS;
    let mut taken = vec![false; pellets.len()];
    let mut gains = BTreeMap::new();

    for (id, snake) in snakes {
        if skip.contains(id) {
            continue;
        }
        let Some(head) = snake.head() else { continue };
        let mut length_gain = 0u32;
        for (idx, pellet) in pellets.iter().enumerate() {
            if !taken[idx] && world.distance_sq(head, pellet.pos) <= pickup_sq {
                taken[idx] = true;
                length_gain += pellet.value;
            }
        }
        if length_gain > 0 {
            gains.insert(*id, length_gain);
        }
    }

    let collected = taken
        .iter()
        .enumerate()
        .filter_map(|(idx, &t)| t.then_some(idx))
        .collect();
    Collection { gains, collected }
}

/// Drop the given indices, highest first, so earlier removals never shift
/// later ones. Survivors keep their relative order.
pub fn remove_collected(pellets: &mut Vec<Pellet>, collected: &[usize]) {
    let mut indices = collected.to_vec();
    indices.sort_unstable();
    indices.dedup();
    for idx in indices.into_iter().rev() {
        if idx < pellets.len() {
            pellets.remove(idx);
        }
    }
}

/// Append `gain` copies of the tail. The next chain-follow spaces them out.
pub fn grow(snake: &mut Snake, gain: u32) {
    if let Some(tail) = snake.tail() {
        snake
            .segments
            .extend(std::iter::repeat(tail).take(gain as usize));
    }
}

/// Count the spawn timer down by `dt`. When it runs out, emit one pellet and
/// restart the interval. Returns the new countdown and the spawned pellet.
pub fn advance_spawn_timer(
    countdown: f32,
    dt: f32,
    world: &World,
    rng: &mut impl Rng,
) -> (f32, Option<Pellet>) {
    let remaining = countdown - dt;
    if remaining <= 0.0 {
        (config::PELLET_SPAWN_INTERVAL, Some(random_pellet(world, rng)))
    } else {
        (remaining, None)
    }
}

/// A standard-value pellet at a uniform position inside the padded interior.
pub fn random_pellet(world: &World, rng: &mut impl Rng) -> Pellet {
    Pellet {
        pos: vec2(
            rng.gen_range(padded_range(world.width)),
            rng.gen_range(padded_range(world.height)),
        ),
        value: config::PELLET_VALUE,
    }
}

/// `[SPAWN_PADDING, dim - SPAWN_PADDING)`, or the full axis when the arena is
/// too narrow to pad.
pub fn padded_range(dim: f32) -> Range<f32> {
    if dim > config::SPAWN_PADDING * 2.0 {
        config::SPAWN_PADDING..dim - config::SPAWN_PADDING
    } else {
        0.0..dim
    }
}

/// Scatter a dead body: `max(1, floor(len * DEATH_PELLET_FRACTION))` pellets
/// taken at an even stride along the segments.
pub fn death_pellets(segments: &[Vec2]) -> Vec<Pellet> {
    if segments.is_empty() {
        return Vec::new();
    }
    let len = segments.len();
    let count = ((len as f32 * config::DEATH_PELLET_FRACTION).floor() as usize).clamp(1, len);
    (0..count)
        .map(|i| Pellet {
            pos: segments[i * len / count],
            value: config::DEATH_PELLET_VALUE,
        })
        .collect()
}
