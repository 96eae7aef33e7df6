//! Simulation core for a wrapping-arena snake game: movement, pellets,
//! simultaneous collision resolution and bot steering. Rendering and input
//! live elsewhere and only read [`GameState`] or supply target angles.

pub mod collision;
pub mod config;
pub mod error;
pub mod movement;
pub mod pellets;
pub mod reporting;
pub mod simulation;
pub mod snake;
pub mod snapshot;
pub mod soak;
pub mod spatial_hash;
pub mod steering;
pub mod world;

pub use error::{FaultKind, SimError, SnakeFault};
pub use movement::move_snake;
pub use pellets::Pellet;
pub use simulation::{create_initial_state, tick, GameState, InitOptions, TickOptions, TickOutcome};
pub use snake::{get_snake_length, Snake, SnakeId};
pub use steering::{compute_target_angles, compute_target_angles_with, SteeringConfig};
pub use world::World;
