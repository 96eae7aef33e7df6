use serde::Serialize;
use std::collections::HashMap;

use crate::config;
use crate::error::SimError;
use crate::reporting::{MetricAggregator, MetricSummary};
use crate::simulation::{self, GameState, InitOptions, TickOptions, TickOutcome};
use crate::snapshot::StateSnapshot;
use crate::steering::{self, AvoidanceMode, PelletPerception, SteeringConfig};
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SoakScenario {
    Baseline,
    Crowded,
    Seam,
}

impl SoakScenario {
    pub fn parse_cli(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "baseline" => Some(Self::Baseline),
            "crowded" | "crowd" => Some(Self::Crowded),
            "seam" | "wrap" | "wrap-probe" => Some(Self::Seam),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Crowded => "crowded",
            Self::Seam => "seam",
        }
    }

    /// Arena, roster and steering this scenario starts from.
    pub fn setup(self, seed: u64) -> (InitOptions, SteeringConfig, TickOptions) {
        let base = InitOptions {
            seed,
            ..InitOptions::default()
        };
        match self {
            Self::Baseline => (base, SteeringConfig::default(), TickOptions::default()),
            Self::Crowded => (
                InitOptions {
                    world: World::new(1000.0, 1000.0),
                    num_bots: 25,
                    num_pellets: 100,
                    ..base
                },
                SteeringConfig {
                    avoidance: AvoidanceMode::FullBody,
                    ..SteeringConfig::default()
                },
                TickOptions::default(),
            ),
            Self::Seam => (
                InitOptions {
                    world: World::new(600.0, 600.0),
                    num_bots: 4,
                    num_pellets: 40,
                    ..base
                },
                SteeringConfig {
                    perception: PelletPerception::Toroidal,
                    ..SteeringConfig::default()
                },
                TickOptions {
                    player_speed_multiplier: 1.5,
                },
            ),
        }
    }
}

/// Command-line overrides on top of a scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct SoakOptions {
    pub scenario: SoakScenario,
    pub ticks: u64,
    pub seed: u64,
    pub num_bots: Option<usize>,
    pub num_pellets: Option<usize>,
    pub avoidance: Option<AvoidanceMode>,
    pub perception: Option<PelletPerception>,
    pub include_snapshot: bool,
}

impl Default for SoakOptions {
    fn default() -> Self {
        Self {
            scenario: SoakScenario::Baseline,
            ticks: 3600,
            seed: 42,
            num_bots: None,
            num_pellets: None,
            avoidance: None,
            perception: None,
            include_snapshot: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SoakCheck {
    pub name: String,
    pub passed: bool,
    pub details: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SoakDeath {
    pub tick: u64,
    pub snake: u32,
    pub was_player: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SoakReport {
    pub scenario: String,
    pub seed: u64,
    pub ticks: u64,
    pub initial_snakes: usize,
    pub survivors: usize,
    pub overall_status: String,
    pub checks: Vec<SoakCheck>,
    pub deaths: Vec<SoakDeath>,
    pub pellet_count: MetricSummary,
    pub alive_count: MetricSummary,
    pub mean_length: MetricSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<StateSnapshot>,
}

/// Watches every tick of a run and tallies invariant violations.
#[derive(Default)]
pub struct SoakObserver {
    out_of_bounds_samples: u64,
    non_finite_samples: u64,
    spacing_violations: u64,
    conservation_violations: u64,
    roster_violations: u64,
    fault_reports: u64,
    deaths: Vec<SoakDeath>,
    pellet_count: MetricAggregator,
    alive_count: MetricAggregator,
    mean_length: MetricAggregator,
}

impl SoakObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, before: &GameState, outcome: &TickOutcome) {
        let after = &outcome.state;
        let world = &after.world;

        for snake in after.snakes.values() {
            for seg in &snake.segments {
                if !seg.is_finite() {
                    self.non_finite_samples += 1;
                } else if !world.contains(*seg) {
                    self.out_of_bounds_samples += 1;
                }
            }
            // Growth stacks fresh copies on the tail; they spread out next tick.
            let stacked = match snake.segments.last() {
                Some(tail) => snake.segments.iter().rev().take_while(|s| *s == tail).count() - 1,
                None => 0,
            };
            let settled = &snake.segments[..snake.segments.len() - stacked];
            for pair in settled.windows(2) {
                let gap = world.distance(pair[0], pair[1]);
                if (gap - config::SEGMENT_SPACING).abs() > 1e-2 {
                    self.spacing_violations += 1;
                }
            }
        }

        let expected = before.pellets.len() - outcome.collected
            + outcome.spawned
            + outcome.death_pellets;
        if after.pellets.len() != expected {
            self.conservation_violations += 1;
        }

        let roster_ok = after.snakes.len() + outcome.dead_ids.len() == before.snakes.len()
            && outcome.dead_ids.iter().all(|id| {
                before.snakes.contains_key(id) && !after.snakes.contains_key(id)
            });
        if !roster_ok {
            self.roster_violations += 1;
        }
        self.fault_reports += outcome.faults.len() as u64;

        for id in &outcome.dead_ids {
            let was_player = before.snake(*id).is_some_and(|s| s.is_player);
            tracing::info!(tick = after.tick_count, snake = %id, was_player, "death");
            self.deaths.push(SoakDeath {
                tick: after.tick_count,
                snake: id.0,
                was_player,
            });
        }

        self.pellet_count.push(after.pellets.len() as f64);
        self.alive_count.push(after.snakes.len() as f64);
        let total_len: usize = after.snakes.values().map(|s| s.segments.len()).sum();
        let mean = if after.snakes.is_empty() {
            0.0
        } else {
            total_len as f64 / after.snakes.len() as f64
        };
        self.mean_length.push(mean);
    }

    pub fn checks(&self) -> Vec<SoakCheck> {
        let check = |name: &str, count: u64| SoakCheck {
            name: name.to_string(),
            passed: count == 0,
            details: format!("violations={count}"),
        };
        vec![
            check("segments_within_world_bounds", self.out_of_bounds_samples),
            check("segment_positions_are_finite", self.non_finite_samples),
            check("segment_spacing_is_constant", self.spacing_violations),
            check("pellet_count_is_conserved", self.conservation_violations),
            check("roster_only_shrinks_by_deaths", self.roster_violations),
            check("no_malformed_snakes", self.fault_reports),
        ]
    }
}

/// Heading the scripted player follows: a slow weave.
fn scripted_player_heading(tick: u64) -> f32 {
    (tick as f32 * 0.01).sin() * std::f32::consts::PI
}

pub fn run_soak(options: &SoakOptions) -> Result<SoakReport, SimError> {
    let (mut init, mut steering_cfg, tick_opts) = options.scenario.setup(options.seed);
    if let Some(n) = options.num_bots {
        init.num_bots = n;
    }
    if let Some(n) = options.num_pellets {
        init.num_pellets = n;
    }
    if let Some(mode) = options.avoidance {
        steering_cfg.avoidance = mode;
    }
    if let Some(p) = options.perception {
        steering_cfg.perception = p;
    }

    let mut state = simulation::create_initial_state(&init)?;
    let initial_snakes = state.snakes.len();
    let mut observer = SoakObserver::new();
    tracing::info!(
        scenario = options.scenario.label(),
        snakes = initial_snakes,
        pellets = state.pellets.len(),
        "soak run starting"
    );

    for _ in 0..options.ticks {
        let mut targets: HashMap<_, _> =
            steering::compute_target_angles_with(&state, &steering_cfg);
        if let Some(player) = state.player() {
            targets.insert(player.id, scripted_player_heading(state.tick_count));
        }
        let outcome = simulation::tick(&state, config::FIXED_DT, &targets, &tick_opts)?;
        observer.observe(&state, &outcome);
        state = outcome.state;
    }

    let checks = observer.checks();
    let all_passed = checks.iter().all(|c| c.passed);
    Ok(SoakReport {
        scenario: options.scenario.label().to_string(),
        seed: options.seed,
        ticks: options.ticks,
        initial_snakes,
        survivors: state.snakes.len(),
        overall_status: if all_passed { "PASS" } else { "FAIL" }.to_string(),
        checks,
        deaths: observer.deaths,
        pellet_count: observer.pellet_count.summary(),
        alive_count: observer.alive_count.summary(),
        mean_length: observer.mean_length.summary(),
        final_state: options.include_snapshot.then(|| StateSnapshot::from(&state)),
    })
}
