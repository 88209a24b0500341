//! A* search over a walkability grid on the XY plane

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::{IVec2, Vec2, Vec3};
use rustc_hash::FxHashMap;

use crate::environment::PathSearch;
use crate::math::horizontal;

/// Walkability grid covering a rectangle of the ground plane
#[derive(Debug, Clone)]
pub struct NavGrid {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// World position of the grid's minimum corner
    pub origin: Vec2,
    /// Walkable cells (true = walkable), row-major
    cells: Vec<bool>,
}

impl NavGrid {
    /// Create a grid with every cell walkable
    #[must_use]
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin: Vec2::ZERO,
            cells: vec![true; width * height],
        }
    }

    /// Move the grid's minimum corner
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Set a cell's walkability. Out-of-range cells are ignored.
    pub fn set_walkable(&mut self, cell: IVec2, walkable: bool) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = walkable;
        }
    }

    /// Mark every cell whose center lies inside the given world rectangle
    pub fn block_rect(&mut self, min: Vec2, max: Vec2) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let center = self.cell_center(IVec2::new(x, y));
                if center.cmpge(min).all() && center.cmple(max).all() {
                    self.set_walkable(IVec2::new(x, y), false);
                }
            }
        }
    }

    /// Check if a cell is inside the grid and walkable
    #[must_use]
    pub fn is_walkable(&self, cell: IVec2) -> bool {
        self.index(cell).is_some_and(|i| self.cells[i])
    }

    /// Cell containing a world position
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> IVec2 {
        ((position - self.origin) / self.cell_size).floor().as_ivec2()
    }

    /// World position of a cell's center
    #[must_use]
    pub fn cell_center(&self, cell: IVec2) -> Vec2 {
        self.origin + (cell.as_vec2() + Vec2::splat(0.5)) * self.cell_size
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        let in_range = cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height;
        in_range.then(|| cell.y as usize * self.width + cell.x as usize)
    }

    fn neighbors(&self, cell: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y]
            .into_iter()
            .map(move |step| cell + step)
            .filter(|next| self.is_walkable(*next))
    }

    /// Cells from `start` to `goal` inclusive, or `None` if unreachable
    #[must_use]
    pub fn find_cells(&self, start: IVec2, goal: IVec2) -> Option<Vec<IVec2>> {
        if !self.is_walkable(start) || !self.is_walkable(goal) {
            return None;
        }

        let heuristic = |cell: IVec2| -> f32 {
            let d = (cell - goal).abs();
            (d.x + d.y) as f32
        };

        let mut open = BinaryHeap::new();
        let mut came_from: FxHashMap<IVec2, IVec2> = FxHashMap::default();
        let mut g_score: FxHashMap<IVec2, f32> = FxHashMap::default();

        g_score.insert(start, 0.0);
        open.push(Node {
            cell: start,
            f_cost: heuristic(start),
        });

        while let Some(Node { cell, .. }) = open.pop() {
            if cell == goal {
                let mut cells = vec![goal];
                let mut current = goal;
                while let Some(&previous) = came_from.get(&current) {
                    cells.push(previous);
                    current = previous;
                }
                cells.reverse();
                return Some(cells);
            }

            let g = g_score.get(&cell).copied().unwrap_or(f32::MAX);
            for next in self.neighbors(cell) {
                let tentative = g + 1.0;
                if tentative < g_score.get(&next).copied().unwrap_or(f32::MAX) {
                    came_from.insert(next, cell);
                    g_score.insert(next, tentative);
                    open.push(Node {
                        cell: next,
                        f_cost: tentative + heuristic(next),
                    });
                }
            }
        }

        None
    }
}

impl PathSearch for NavGrid {
    /// Waypoints at cell centers, at the start height, ending on the exact goal
    ///
    /// The start cell is omitted since the agent already stands in it.
    fn find_path(&self, start: Vec3, goal: Vec3) -> Option<Vec<Vec3>> {
        let cells = self.find_cells(self.cell_at(horizontal(start)), self.cell_at(horizontal(goal)))?;

        let mut waypoints: Vec<Vec3> = cells
            .iter()
            .skip(1)
            .map(|cell| self.cell_center(*cell).extend(start.z))
            .collect();

        match waypoints.last_mut() {
            Some(last) => *last = goal,
            None => waypoints.push(goal),
        }

        Some(waypoints)
    }
}

/// Open-set entry, ordered as a min-heap on `f_cost`
#[derive(Debug, Clone, Copy)]
struct Node {
    cell: IVec2,
    f_cost: f32,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other.f_cost.total_cmp(&self.f_cost)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_around_wall() {
        let mut grid = NavGrid::new(10, 10, 1.0);
        for y in 2..8 {
            grid.set_walkable(IVec2::new(5, y), false);
        }

        let goal = Vec3::new(8.5, 5.5, 0.0);
        let path = grid.find_path(Vec3::new(2.5, 5.5, 0.0), goal).unwrap();

        assert!(path.len() > 6); // Has to go around the wall
        assert_eq!(*path.last().unwrap(), goal);
        assert!(path.iter().all(|p| grid.is_walkable(grid.cell_at(horizontal(*p)))));
    }

    #[test]
    fn test_straight_line_skips_start() {
        let grid = NavGrid::new(10, 10, 1.0);
        let path = grid
            .find_path(Vec3::new(0.5, 0.5, 2.0), Vec3::new(3.2, 0.4, 2.0))
            .unwrap();

        assert_eq!(
            path,
            vec![
                Vec3::new(1.5, 0.5, 2.0),
                Vec3::new(2.5, 0.5, 2.0),
                Vec3::new(3.2, 0.4, 2.0),
            ]
        );
    }

    #[test]
    fn test_same_cell_goal() {
        let grid = NavGrid::new(4, 4, 1.0);
        let goal = Vec3::new(0.8, 0.8, 0.0);
        assert_eq!(grid.find_path(Vec3::new(0.2, 0.2, 0.0), goal), Some(vec![goal]));
    }

    #[test]
    fn test_no_path() {
        let mut grid = NavGrid::new(5, 5, 1.0);
        grid.set_walkable(IVec2::new(3, 2), false);
        grid.set_walkable(IVec2::new(3, 4), false);
        grid.set_walkable(IVec2::new(2, 3), false);
        grid.set_walkable(IVec2::new(4, 3), false);

        let path = grid.find_path(Vec3::new(0.5, 0.5, 0.0), Vec3::new(3.5, 3.5, 0.0));
        assert!(path.is_none());
    }

    #[test]
    fn test_outside_grid() {
        let grid = NavGrid::new(5, 5, 1.0).with_origin(Vec2::new(-2.5, -2.5));
        assert!(grid.find_path(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)).is_some());
        assert!(grid.find_path(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_block_rect() {
        let mut grid = NavGrid::new(10, 10, 1.0);
        grid.block_rect(Vec2::new(3.0, 3.0), Vec2::new(5.0, 5.0));

        assert!(!grid.is_walkable(IVec2::new(3, 3)));
        assert!(!grid.is_walkable(IVec2::new(4, 4)));
        assert!(grid.is_walkable(IVec2::new(5, 5)));
        assert!(grid.is_walkable(IVec2::new(2, 3)));
    }
}
