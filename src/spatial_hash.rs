use macroquad::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::snake::{Snake, SnakeId};
use crate::world::World;

/// One body segment as stored in the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentRef {
    pub owner: SnakeId,
    pub pos: Vec2,
}

/// Uniform bucket grid over every segment in the arena, wrapping on both axes.
///
/// Each axis has about `world / cell_size` cells, capped at `sqrt(segments)`,
/// so a sparse arena gets a few wide cells.
pub struct SegmentGrid {
    inv_cell_w: f32,
    inv_cell_h: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<SegmentRef>>,
}

impl SegmentGrid {
    pub fn new(world: &World, cell_size: f32, segments: usize) -> Self {
        let axis_limit = (segments as f32).sqrt().ceil().max(1.0);
        let cols = (world.width / cell_size).ceil().clamp(1.0, axis_limit) as usize;
        let rows = (world.height / cell_size).ceil().clamp(1.0, axis_limit) as usize;
        Self {
            inv_cell_w: cols as f32 / world.width,
            inv_cell_h: rows as f32 / world.height,
            cols,
            rows,
            cells: (0..cols * rows).map(|_| Vec::new()).collect(),
        }
    }

    /// Build a grid holding every segment of every snake not in `skip`.
    pub fn build(
        world: &World,
        cell_size: f32,
        snakes: &BTreeMap<SnakeId, Snake>,
        skip: &BTreeSet<SnakeId>,
    ) -> Self {
        let segments = snakes
            .iter()
            .filter(|(id, _)| !skip.contains(*id))
            .map(|(_, s)| s.segments.len())
            .sum();
        let mut grid = Self::new(world, cell_size, segments);
        grid.rebuild(world, snakes, skip);
        grid
    }

    /// Clear all cells and re-insert every segment.
    pub fn rebuild(
        &mut self,
        world: &World,
        snakes: &BTreeMap<SnakeId, Snake>,
        skip: &BTreeSet<SnakeId>,
    ) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (id, snake) in snakes {
            if skip.contains(id) {
                continue;
            }
            for &seg in &snake.segments {
                let pos = world.wrap(seg);
                let (cx, cy) = self.cell_of(pos);
                self.cells[cy * self.cols + cx].push(SegmentRef { owner: *id, pos });
            }
        }
    }

    fn cell_of(&self, pos: Vec2) -> (usize, usize) {
        let cx = ((pos.x * self.inv_cell_w) as usize).min(self.cols - 1);
        let cy = ((pos.y * self.inv_cell_h) as usize).min(self.rows - 1);
        (cx, cy)
    }

    /// Call `visit` for every stored segment within `radius` of `pos`
    /// (toroidal distance). Each segment is visited at most once.
    pub fn for_each_near(
        &self,
        pos: Vec2,
        radius: f32,
        world: &World,
        mut visit: impl FnMut(&SegmentRef, f32),
    ) {
        let radius_sq = radius * radius;
        let reach_x = (radius * self.inv_cell_w).ceil() as usize + 1;
        let reach_y = (radius * self.inv_cell_h).ceil() as usize + 1;
        let (cx, cy) = self.cell_of(world.wrap(pos));

        for gy in wrapped_span(cy, reach_y, self.rows) {
            for gx in wrapped_span(cx, reach_x, self.cols) {
                for seg in &self.cells[gy * self.cols + gx] {
                    let dist_sq = world.distance_sq(pos, seg.pos);
                    if dist_sq <= radius_sq {
                        visit(seg, dist_sq);
                    }
                }
            }
        }
    }

    /// Whether any segment matching `filter` lies within `radius` of `pos`.
    pub fn any_near(
        &self,
        pos: Vec2,
        radius: f32,
        world: &World,
        filter: impl Fn(&SegmentRef) -> bool,
    ) -> bool {
        let mut hit = false;
        self.for_each_near(pos, radius, world, |seg, _| {
            if !hit && filter(seg) {
                hit = true;
            }
        });
        hit
    }
}

/// Cell indices `center - reach ..= center + reach` wrapped into `0..len`,
/// without repeats when the span covers the whole axis.
fn wrapped_span(center: usize, reach: usize, len: usize) -> Vec<usize> {
    if reach * 2 + 1 >= len {
        return (0..len).collect();
    }
    (0..=reach * 2)
        .map(|k| (center + len + k - reach) % len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(snakes: Vec<Snake>) -> BTreeMap<SnakeId, Snake> {
        snakes.into_iter().map(|s| (s.id, s)).collect()
    }

    #[test]
    fn skipped_snakes_are_not_indexed() {
        let world = World::new(200.0, 200.0);
        let snakes = roster(vec![
            Snake::new(SnakeId(0), vec2(50.0, 50.0), 0.0, 1, false),
            Snake::new(SnakeId(1), vec2(55.0, 50.0), 0.0, 1, false),
        ]);
        let skip: BTreeSet<_> = [SnakeId(1)].into_iter().collect();
        let grid = SegmentGrid::build(&world, 32.0, &snakes, &skip);

        let mut found = Vec::new();
        grid.for_each_near(vec2(50.0, 50.0), 20.0, &world, |s, _| found.push(s.owner));
        assert_eq!(found, vec![SnakeId(0)]);
    }

    #[test]
    fn queries_reach_across_the_seam() {
        let world = World::new(640.0, 640.0);
        let snakes = roster(vec![Snake::new(SnakeId(2), vec2(636.0, 3.0), 0.0, 1, false)]);
        let grid = SegmentGrid::build(&world, 64.0, &snakes, &BTreeSet::new());
        assert!(grid.any_near(vec2(4.0, 636.0), 15.0, &world, |_| true));
        assert!(!grid.any_near(vec2(300.0, 300.0), 15.0, &world, |_| true));
    }

    #[test]
    fn tiny_grids_visit_each_segment_once() {
        let world = World::new(100.0, 100.0);
        let snakes = roster(vec![Snake::new(SnakeId(0), vec2(50.0, 50.0), 0.0, 6, false)]);
        let grid = SegmentGrid::build(&world, 64.0, &snakes, &BTreeSet::new());
        let mut count = 0;
        grid.for_each_near(vec2(50.0, 50.0), 200.0, &world, |_, _| count += 1);
        assert_eq!(count, 6);
    }

    #[test]
    fn grid_size_follows_segment_count_not_arena_area() {
        let world = World::new(60_000.0, 60_000.0);
        let snakes = roster(vec![
            Snake::new(SnakeId(0), vec2(30_000.0, 30_000.0), 0.0, 10, false),
            Snake::new(SnakeId(1), vec2(59_990.0, 5.0), 0.0, 10, false),
        ]);
        let grid = SegmentGrid::build(&world, 64.0, &snakes, &BTreeSet::new());
        assert!(grid.cols * grid.rows <= 25, "{}x{}", grid.cols, grid.rows);

        assert!(grid.any_near(vec2(30_001.0, 30_000.0), 15.0, &world, |_| true));
        assert!(grid.any_near(vec2(1.0, 59_998.0), 15.0, &world, |_| true));
        assert!(!grid.any_near(vec2(10_000.0, 10_000.0), 15.0, &world, |_| true));
    }

    #[test]
    fn dense_arenas_keep_the_requested_cell_size() {
        let world = World::new(640.0, 640.0);
        let snakes = roster(
            (0..10)
                .map(|i| {
                    let head = vec2(32.0, 20.0 + 60.0 * i as f32);
                    Snake::new(SnakeId(i), head, 0.0, 20, false)
                })
                .collect(),
        );
        let grid = SegmentGrid::build(&world, 64.0, &snakes, &BTreeSet::new());
        assert_eq!((grid.cols, grid.rows), (10, 10));
    }

    #[test]
    fn wrapped_span_wraps_both_ends() {
        assert_eq!(wrapped_span(0, 1, 10), vec![9, 0, 1]);
        assert_eq!(wrapped_span(9, 1, 10), vec![8, 9, 0]);
        assert_eq!(wrapped_span(3, 5, 10), (0..10).collect::<Vec<_>>());
    }
}
