use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

use crate::simulation::GameState;

// Serde-friendly mirrors of the live types, for collaborators that only read.

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerdVec2 {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for SerdVec2 {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<SerdVec2> for Vec2 {
    fn from(v: SerdVec2) -> Self {
        vec2(v.x, v.y)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnakeSnapshot {
    pub id: u32,
    pub is_player: bool,
    pub angle: f32,
    pub length: usize,
    pub segments: Vec<SerdVec2>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PelletSnapshot {
    pub pos: SerdVec2,
    pub value: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub tick: u64,
    pub width: f32,
    pub height: f32,
    pub next_pellet_spawn: f32,
    pub snakes: Vec<SnakeSnapshot>,
    pub pellets: Vec<PelletSnapshot>,
}

impl From<&GameState> for StateSnapshot {
    fn from(state: &GameState) -> Self {
        Self {
            tick: state.tick_count,
            width: state.world.width,
            height: state.world.height,
            next_pellet_spawn: state.next_pellet_spawn,
            snakes: state
                .snakes
                .values()
                .map(|s| SnakeSnapshot {
                    id: s.id.0,
                    is_player: s.is_player,
                    angle: s.angle,
                    length: s.segments.len(),
                    segments: s.segments.iter().copied().map(SerdVec2::from).collect(),
                })
                .collect(),
            pellets: state
                .pellets
                .iter()
                .map(|p| PelletSnapshot {
                    pos: p.pos.into(),
                    value: p.value,
                })
                .collect(),
        }
    }
}
