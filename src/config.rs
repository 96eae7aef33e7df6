// All tunable simulation constants in one place.

// World
pub const WORLD_WIDTH: f32 = 2000.0;
pub const WORLD_HEIGHT: f32 = 2000.0;
/// Inward margin kept free by pellet spawns and initial snake placement.
pub const SPAWN_PADDING: f32 = 50.0;

// Snakes
pub const DEFAULT_BOT_COUNT: usize = 8;
pub const INITIAL_LENGTH: usize = 10;
pub const SEGMENT_SPACING: f32 = 8.0;
pub const HEAD_RADIUS: f32 = 8.0;
pub const BODY_RADIUS: f32 = 7.0;
pub const SNAKE_BASE_SPEED: f32 = 120.0;
pub const SNAKE_TURN_SPEED: f32 = 4.0;
pub const SPEED_GROWTH_PER_SEGMENT: f32 = 0.01;
pub const SPEED_GROWTH_CAP: f32 = 1.5;

// Pellets
pub const DEFAULT_PELLET_COUNT: usize = 200;
pub const PELLET_VALUE: u32 = 1;
pub const PELLET_RADIUS: f32 = 4.0;
pub const MAGNET_RADIUS: f32 = 10.0;
pub const PELLET_SPAWN_INTERVAL: f32 = 0.5;
pub const DEATH_PELLET_FRACTION: f32 = 0.5;
pub const DEATH_PELLET_VALUE: u32 = 1;

// Steering AI
pub const SEEK_RADIUS: f32 = 300.0;
pub const DANGER_RADIUS: f32 = 60.0;
pub const AVOID_THRESHOLD: f32 = 0.5;
pub const AI_TURN_BLEND: f32 = 0.15;

// Simulation
/// Spawn grid cells per axis are never more than this or the roster size.
pub const SPAWN_AXIS_CELL_LIMIT: usize = 1024;
pub const FIXED_DT: f32 = 1.0 / 60.0;

// Spatial hash
pub const SEGMENT_CELL_SIZE: f32 = 64.0;

/// Radius at which a pellet is collected by a head.
pub const PICKUP_RADIUS: f32 = HEAD_RADIUS + PELLET_RADIUS + MAGNET_RADIUS;
/// A head this close to foreign body material is fatal.
pub const COLLISION_RADIUS: f32 = HEAD_RADIUS + BODY_RADIUS;
/// Body material inside this radius repels a bot.
pub const AVOID_RADIUS: f32 = HEAD_RADIUS + BODY_RADIUS + DANGER_RADIUS;
