use macroquad::prelude::*;
use ::rand::seq::index;
use ::rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::f32::consts::PI;

use crate::collision;
use crate::config;
use crate::error::{FaultKind, SimError, SnakeFault};
use crate::movement;
use crate::pellets::{self, Pellet};
use crate::snake::{Snake, SnakeId};
use crate::world::World;

/// The whole simulated world. Each tick builds a new one from the last.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub snakes: BTreeMap<SnakeId, Snake>,
    pub pellets: Vec<Pellet>,
    pub world: World,
    /// Seconds until the spawn timer emits its next pellet.
    pub next_pellet_spawn: f32,
    /// Seeded source for every random placement, carried with the state.
    pub rng: ChaCha8Rng,
    pub tick_count: u64,
}

impl GameState {
    pub fn player(&self) -> Option<&Snake> {
        self.snakes.values().find(|s| s.is_player)
    }

    pub fn snake(&self, id: SnakeId) -> Option<&Snake> {
        self.snakes.get(&id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InitOptions {
    pub world: World,
    /// Total snakes placed, the player included.
    pub num_bots: usize,
    pub num_pellets: usize,
    /// Designate the first snake as the player.
    pub with_player: bool,
    pub seed: u64,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            world: World::new(config::WORLD_WIDTH, config::WORLD_HEIGHT),
            num_bots: config::DEFAULT_BOT_COUNT,
            num_pellets: config::DEFAULT_PELLET_COUNT,
            with_player: true,
            seed: 42,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOptions {
    pub player_speed_multiplier: f32,
}

impl Default for TickOptions {
    fn default() -> Self {
        Self {
            player_speed_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    pub state: GameState,
    pub dead_ids: BTreeSet<SnakeId>,
    /// Snakes that were isolated this tick instead of simulated.
    pub faults: Vec<SnakeFault>,
    pub collected: usize,
    pub spawned: usize,
    pub death_pellets: usize,
}

pub fn create_initial_state(options: &InitOptions) -> Result<GameState, SimError> {
    let world = options.world;
    world.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);

    let heads = spawn_heads(&world, options.num_bots, &mut rng)?;

    let mut snakes = BTreeMap::new();
    for (i, head) in heads.into_iter().enumerate() {
        let id = SnakeId(i as u32);
        let angle = rng.gen_range(-PI..PI);
        let is_player = options.with_player && i == 0;
        snakes.insert(id, Snake::new(id, head, angle, config::INITIAL_LENGTH, is_player));
    }

    let field = (0..options.num_pellets)
        .map(|_| pellets::random_pellet(&world, &mut rng))
        .collect();

    Ok(GameState {
        snakes,
        pellets: field,
        world,
        next_pellet_spawn: config::PELLET_SPAWN_INTERVAL,
        rng,
        tick_count: 0,
    })
}

/// Pick `count` distinct cells of a grid over the padded interior and return
/// their centres. A straight initial snake centred on one cell can never reach
/// a neighbour's. Only the chosen cells are materialised.
fn spawn_heads(
    world: &World,
    count: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<Vec2>, SimError> {
    let reach = (config::INITIAL_LENGTH - 1) as f32 * config::SEGMENT_SPACING;
    let cell = 2.0 * (reach + config::COLLISION_RADIUS);
    let inner_w = world.width - 2.0 * config::SPAWN_PADDING;
    let inner_h = world.height - 2.0 * config::SPAWN_PADDING;

    let axis_limit = count.max(config::SPAWN_AXIS_CELL_LIMIT) as f32;
    let cols = (inner_w / cell).floor().clamp(0.0, axis_limit) as usize;
    let rows = (inner_h / cell).floor().clamp(0.0, axis_limit) as usize;
    let capacity = cols.checked_mul(rows).ok_or(SimError::InvalidBounds {
        width: world.width,
        height: world.height,
    })?;
    if count > capacity {
        return Err(SimError::ArenaTooSmall {
            requested: count,
            capacity,
        });
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let (cell_w, cell_h) = (inner_w / cols as f32, inner_h / rows as f32);
    Ok(index::sample(rng, capacity, count)
        .into_iter()
        .map(|i| {
            let (c, r) = (i % cols, i / cols);
            vec2(
                config::SPAWN_PADDING + (c as f32 + 0.5) * cell_w,
                config::SPAWN_PADDING + (r as f32 + 0.5) * cell_h,
            )
        })
        .collect())
}

/// Advance the whole arena by `dt`.
///
/// Every snake moves first, then eats, then all heads are judged against the
/// same post-move bodies and the fatal ones are removed together. Snakes with
/// no entry in `targets` keep their heading. `state` itself is left untouched.
pub fn tick(
    state: &GameState,
    dt: f32,
    targets: &HashMap<SnakeId, f32>,
    options: &TickOptions,
) -> Result<TickOutcome, SimError> {
    if !dt.is_finite() {
        return Err(SimError::NonFiniteDt(dt));
    }
    if dt < 0.0 {
        return Err(SimError::NegativeDt(dt));
    }
    let boost = options.player_speed_multiplier;
    if !boost.is_finite() || boost < 0.0 {
        return Err(SimError::InvalidPlayerSpeed(boost));
    }
    state.world.validate()?;

    let world = state.world;
    let mut rng = state.rng.clone();
    let mut faults = Vec::new();
    let mut skip = BTreeSet::new();

    for (id, snake) in &state.snakes {
        if let Some(kind) = snake.fault() {
            tracing::warn!(snake = %id, ?kind, "skipping malformed snake");
            faults.push(SnakeFault { id: *id, kind });
            skip.insert(*id);
        }
    }

    // Move everyone before anyone is judged.
    let mut snakes: BTreeMap<SnakeId, Snake> = BTreeMap::new();
    for (id, snake) in &state.snakes {
        if skip.contains(id) {
            snakes.insert(*id, snake.clone());
            continue;
        }
        let target = match targets.get(id) {
            Some(&angle) if angle.is_finite() => angle,
            Some(_) => {
                tracing::warn!(snake = %id, "ignoring non-finite target angle");
                faults.push(SnakeFault {
                    id: *id,
                    kind: FaultKind::NonFiniteTarget,
                });
                snake.angle
            }
            None => snake.angle,
        };
        let scale = if snake.is_player { boost } else { 1.0 };
        let moved = movement::move_snake_boosted(snake, dt, target, &world, scale);
        if let Some(kind) = moved.fault() {
            tracing::warn!(snake = %id, ?kind, "movement overflowed, keeping previous position");
            faults.push(SnakeFault { id: *id, kind });
            skip.insert(*id);
            snakes.insert(*id, snake.clone());
            continue;
        }
        snakes.insert(*id, moved);
    }

    let mut field = state.pellets.clone();
    let collection = pellets::collect_pellets(&snakes, &skip, &field, &world);
    pellets::remove_collected(&mut field, &collection.collected);
    for (id, gain) in &collection.gains {
        if let Some(snake) = snakes.get_mut(id) {
            pellets::grow(snake, *gain);
        }
    }

    let dead_ids = collision::find_fatal(&snakes, &skip, &world);
    let drops = collision::remove_dead(&mut snakes, &dead_ids);
    let death_pellets = drops.len();
    field.extend(drops);

    let (next_pellet_spawn, spawned) =
        pellets::advance_spawn_timer(state.next_pellet_spawn, dt, &world, &mut rng);
    let spawned = match spawned {
        Some(pellet) => {
            tracing::debug!(x = pellet.pos.x, y = pellet.pos.y, "spawned pellet");
            field.push(pellet);
            1
        }
        None => 0,
    };

    Ok(TickOutcome {
        state: GameState {
            snakes,
            pellets: field,
            world,
            next_pellet_spawn,
            rng,
            tick_count: state.tick_count + 1,
        },
        dead_ids,
        faults,
        collected: collection.collected.len(),
        spawned,
        death_pellets,
    })
}
