use std::collections::{BTreeMap, BTreeSet};

use crate::config;
use crate::pellets::{self, Pellet};
use crate::snake::{Snake, SnakeId};
use crate::spatial_hash::SegmentGrid;
use crate::world::World;

/// Self-collision exemption: a head is only ever tested against bodies of
/// other snakes. Every contact check goes through this predicate.
pub fn contact_counts(head_owner: SnakeId, body_owner: SnakeId) -> bool {
    head_owner != body_owner
}

/// Whether `snake`'s head touches any segment of another snake in `all`.
pub fn head_hits_body(snake: &Snake, all: &BTreeMap<SnakeId, Snake>, world: &World) -> bool {
    let Some(head) = snake.head() else {
        return false;
    };
    let reach_sq = config::COLLISION_RADIUS * config::COLLISION_RADIUS;
    all.values()
        .filter(|other| contact_counts(snake.id, other.id))
        .flat_map(|other| other.segments.iter())
        .any(|&seg| world.distance_sq(head, seg) <= reach_sq)
}

/// Judge every snake against the same post-move positions and return the ids
/// of all fatal contacts. Order of evaluation cannot change the outcome.
pub fn find_fatal(
    snakes: &BTreeMap<SnakeId, Snake>,
    skip: &BTreeSet<SnakeId>,
    world: &World,
) -> BTreeSet<SnakeId> {
    let grid = SegmentGrid::build(world, config::SEGMENT_CELL_SIZE, snakes, skip);
    snakes
        .iter()
        .filter(|(id, _)| !skip.contains(*id))
        .filter_map(|(id, snake)| {
            let head = snake.head()?;
            grid.any_near(head, config::COLLISION_RADIUS, world, |seg| {
                contact_counts(*id, seg.owner)
            })
            .then_some(*id)
        })
        .collect()
}

/// Remove every fatal snake in one batch and scatter their bodies.
pub fn remove_dead(
    snakes: &mut BTreeMap<SnakeId, Snake>,
    fatal: &BTreeSet<SnakeId>,
) -> Vec<Pellet> {
    let mut drops = Vec::new();
    for id in fatal {
        if let Some(dead) = snakes.remove(id) {
            tracing::debug!(snake = %id, length = dead.segments.len(), "snake died");
            drops.extend(pellets::death_pellets(&dead.segments));
        }
    }
    drops
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::prelude::*;

    fn roster(snakes: Vec<Snake>) -> BTreeMap<SnakeId, Snake> {
        snakes.into_iter().map(|s| (s.id, s)).collect()
    }

    #[test]
    fn own_body_never_counts() {
        let world = World::new(500.0, 500.0);
        let mut coiled = Snake::new(SnakeId(0), vec2(100.0, 100.0), 0.0, 6, false);
        // Fold the tail right back onto the head.
        coiled.segments[5] = vec2(101.0, 100.0);
        let all = roster(vec![coiled.clone()]);
        assert!(!head_hits_body(&coiled, &all, &world));
        assert!(find_fatal(&all, &BTreeSet::new(), &world).is_empty());
    }

    #[test]
    fn head_into_another_body_is_fatal_for_the_attacker_only() {
        let world = World::new(500.0, 500.0);
        let wall = Snake::new(SnakeId(1), vec2(200.0, 100.0), 0.0, 20, false);
        let up = std::f32::consts::FRAC_PI_2;
        let attacker = Snake::new(SnakeId(2), vec2(150.0, 105.0), up, 5, false);
        let all = roster(vec![wall.clone(), attacker.clone()]);
        assert!(head_hits_body(&attacker, &all, &world));
        assert!(!head_hits_body(&wall, &all, &world));

        let fatal = find_fatal(&all, &BTreeSet::new(), &world);
        assert_eq!(fatal, [SnakeId(2)].into_iter().collect());
    }

    #[test]
    fn head_on_contact_kills_both() {
        let world = World::new(500.0, 500.0);
        let a = Snake::new(SnakeId(0), vec2(100.0, 100.0), 0.0, 4, false);
        let b = Snake::new(SnakeId(1), vec2(110.0, 100.0), std::f32::consts::PI, 4, false);
        let all = roster(vec![a, b]);
        let fatal = find_fatal(&all, &BTreeSet::new(), &world);
        assert_eq!(fatal.len(), 2);
    }

    #[test]
    fn grid_agrees_with_brute_force_across_the_seam() {
        let world = World::new(300.0, 300.0);
        let all = roster(vec![
            Snake::new(SnakeId(0), vec2(2.0, 150.0), 0.0, 8, false),
            Snake::new(SnakeId(1), vec2(290.0, 152.0), std::f32::consts::FRAC_PI_2, 8, false),
            Snake::new(SnakeId(2), vec2(150.0, 20.0), 1.0, 8, false),
        ]);
        let wrapped: BTreeMap<SnakeId, Snake> = all
            .iter()
            .map(|(id, s)| {
                let mut s = s.clone();
                s.segments = s.segments.iter().map(|p| world.wrap(*p)).collect();
                (*id, s)
            })
            .collect();
        let brute: BTreeSet<SnakeId> = wrapped
            .values()
            .filter(|s| head_hits_body(s, &wrapped, &world))
            .map(|s| s.id)
            .collect();
        let grid = find_fatal(&wrapped, &BTreeSet::new(), &world);
        assert_eq!(brute, grid);
        assert!(grid.contains(&SnakeId(0)));
        assert!(grid.contains(&SnakeId(1)));
        assert!(!grid.contains(&SnakeId(2)));
    }

    #[test]
    fn sparse_huge_arena_still_finds_contacts() {
        let world = World::new(80_000.0, 80_000.0);
        let all = roster(vec![
            Snake::new(SnakeId(0), vec2(40_000.0, 40_000.0), 0.0, 10, false),
            Snake::new(SnakeId(1), vec2(39_990.0, 40_010.0), -1.2, 4, false),
            Snake::new(SnakeId(2), vec2(5.0, 79_995.0), 0.0, 4, false),
        ]);
        let brute: BTreeSet<SnakeId> = all
            .values()
            .filter(|s| head_hits_body(s, &all, &world))
            .map(|s| s.id)
            .collect();
        let fatal = find_fatal(&all, &BTreeSet::new(), &world);
        assert_eq!(fatal, brute);
        assert!(fatal.contains(&SnakeId(1)));
        assert!(!fatal.contains(&SnakeId(2)));
    }

    #[test]
    fn removal_is_batched_and_drops_pellets() {
        let mut all = roster(vec![
            Snake::new(SnakeId(0), vec2(100.0, 100.0), 0.0, 10, false),
            Snake::new(SnakeId(1), vec2(300.0, 300.0), 0.0, 3, false),
            Snake::new(SnakeId(2), vec2(400.0, 100.0), 0.0, 3, false),
        ]);
        let fatal: BTreeSet<_> = [SnakeId(0), SnakeId(1)].into_iter().collect();
        let drops = remove_dead(&mut all, &fatal);
        assert_eq!(all.len(), 1);
        assert!(all.contains_key(&SnakeId(2)));
        assert_eq!(drops.len(), 5 + 1);
    }
}
