use std::collections::HashMap;

use glam::Vec2;
use log::debug;

use super::node::SpatialGridNode;
use crate::{
    core::types::Rect,
    error::{CollisionError, CollisionResult},
    utils::allocator::ObjectId,
};

/// Slack used when deriving the cell count so that `width / (width / n)`
/// rounds to `n` rather than `n + 1`.
const CELL_COUNT_EPSILON: f32 = 1e-4;

/// Uniform grid over a fixed world rectangle. Objects are bucketed by their
/// bounding box into every cell the box overlaps; boxes that reach outside
/// the world are clamped to the edge cells.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    bounds: Rect,
    cell_size: f32,
    columns: usize,
    rows: usize,
    nodes: Vec<SpatialGridNode>,
    membership: HashMap<ObjectId, Vec<usize>>,
}

impl SpatialGrid {
    /// Grid covering `(0, 0, width, height)` with `divisions` square cells along
    /// the longer axis.
    pub fn new(width: f32, height: f32, divisions: u32) -> CollisionResult<Self> {
        Self::with_bounds(Rect::new(0.0, 0.0, width, height), divisions)
    }

    pub fn with_bounds(bounds: Rect, divisions: u32) -> CollisionResult<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !bounds.is_finite() || !valid(bounds.width) || !valid(bounds.height) {
            return Err(CollisionError::InvalidGridSize {
                width: bounds.width,
                height: bounds.height,
            });
        }
        if divisions == 0 {
            return Err(CollisionError::InvalidDivisions(divisions));
        }

        let cell_size = bounds.width.max(bounds.height) / divisions as f32;
        let columns = cells_along(bounds.width, cell_size);
        let rows = cells_along(bounds.height, cell_size);

        let mut nodes = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for col in 0..columns {
                let cell = Rect::new(
                    bounds.x + col as f32 * cell_size,
                    bounds.y + row as f32 * cell_size,
                    cell_size,
                    cell_size,
                );
                nodes.push(SpatialGridNode::new(row * columns + col, cell));
            }
        }

        debug!(
            "spatial grid {}x{} cells of {:.2} over {:?}",
            columns, rows, cell_size, bounds
        );

        Ok(Self {
            bounds,
            cell_size,
            columns,
            rows,
            nodes,
            membership: HashMap::new(),
        })
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn nodes(&self) -> &[SpatialGridNode] {
        &self.nodes
    }

    pub fn node(&self, col: usize, row: usize) -> Option<&SpatialGridNode> {
        if col >= self.columns || row >= self.rows {
            return None;
        }
        self.nodes.get(row * self.columns + col)
    }

    /// Number of objects currently tracked by the grid.
    pub fn tracked_len(&self) -> usize {
        self.membership.len()
    }

    pub fn contains_object(&self, object: ObjectId) -> bool {
        self.membership.contains_key(&object)
    }

    /// `(col, row)` of every cell overlapped by `bounds`, clamped to the grid.
    pub fn cells_for(&self, bounds: &Rect) -> Vec<(usize, usize)> {
        self.cell_indices(bounds)
            .into_iter()
            .map(|index| self.coords(index))
            .collect()
    }

    /// `(col, row)` of every cell `object` currently occupies.
    pub fn cells_of(&self, object: ObjectId) -> Vec<(usize, usize)> {
        self.membership
            .get(&object)
            .map(|cells| cells.iter().map(|&index| self.coords(index)).collect())
            .unwrap_or_default()
    }

    /// Moves `object` into exactly the cells overlapped by `bounds`. Returns
    /// whether its membership changed.
    pub fn update_membership(&mut self, object: ObjectId, bounds: &Rect) -> bool {
        let new_cells = self.cell_indices(bounds);
        let old_cells = self.membership.remove(&object).unwrap_or_default();

        if old_cells == new_cells {
            self.membership.insert(object, new_cells);
            return false;
        }

        for &index in old_cells.iter().filter(|index| !new_cells.contains(index)) {
            self.nodes[index].remove_object(object);
        }
        for &index in new_cells.iter().filter(|index| !old_cells.contains(index)) {
            self.nodes[index].add_object(object);
        }

        self.membership.insert(object, new_cells);
        true
    }

    /// Removes `object` from every cell it occupies. Untracked objects are
    /// ignored.
    pub fn remove_object(&mut self, object: ObjectId) -> bool {
        match self.membership.remove(&object) {
            Some(cells) => {
                for index in cells {
                    self.nodes[index].remove_object(object);
                }
                true
            }
            None => false,
        }
    }

    /// Every other object sharing at least one cell with `object`, sorted and
    /// deduplicated. The result is a snapshot, so the grid may be mutated while
    /// it is iterated.
    pub fn potential_collisions(&self, object: ObjectId) -> Vec<ObjectId> {
        match self.membership.get(&object) {
            Some(cells) => self.collect(cells.iter().copied(), Some(object)),
            None => Vec::new(),
        }
    }

    /// Every object in the cells overlapped by `bounds`.
    pub fn query_rect(&self, bounds: &Rect) -> Vec<ObjectId> {
        self.collect(self.cell_indices(bounds).into_iter(), None)
    }

    /// Objects in the cell containing `point`; empty outside the grid.
    pub fn query_point(&self, point: Vec2) -> Vec<ObjectId> {
        match self.nodes.iter().position(|node| node.contains(point)) {
            Some(index) => self.collect(std::iter::once(index), None),
            None => Vec::new(),
        }
    }

    pub fn dirty_nodes(&self) -> impl Iterator<Item = &SpatialGridNode> + '_ {
        self.nodes.iter().filter(|node| node.is_dirty())
    }

    /// Maintenance pass: clears every dirty flag and returns how many were set.
    pub fn clear_dirty(&mut self) -> usize {
        let mut cleared = 0;
        for node in self.nodes.iter_mut().filter(|node| node.is_dirty()) {
            node.clear_dirty();
            cleared += 1;
        }
        if cleared > 0 {
            debug!("spatial grid: {cleared} cells changed membership");
        }
        cleared
    }

    fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.columns, index / self.columns)
    }

    fn cell_indices(&self, bounds: &Rect) -> Vec<usize> {
        let origin = self.bounds.min();
        let min = (bounds.min() - origin) / self.cell_size;
        let max = (bounds.max() - origin) / self.cell_size;

        // Rounding near a cell edge can put the estimate one cell off the
        // node rects, so settle both ends against the rects themselves.
        let (col_min, col_max) = settle(span(min.x, max.x, self.columns), self.columns, |col| {
            let cell = self.nodes[col].bounds();
            cell.x < bounds.x + bounds.width && cell.x + cell.width > bounds.x
        });
        let (row_min, row_max) = settle(span(min.y, max.y, self.rows), self.rows, |row| {
            let cell = self.nodes[row * self.columns].bounds();
            cell.y < bounds.y + bounds.height && cell.y + cell.height > bounds.y
        });

        let mut cells = Vec::with_capacity((col_max - col_min + 1) * (row_max - row_min + 1));
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                cells.push(row * self.columns + col);
            }
        }
        cells
    }

    fn collect(&self, cells: impl Iterator<Item = usize>, exclude: Option<ObjectId>) -> Vec<ObjectId> {
        let mut results: Vec<ObjectId> = Vec::new();
        for index in cells {
            results.extend(self.nodes[index].objects());
        }
        if let Some(exclude) = exclude {
            results.retain(|&object| object != exclude);
        }
        results.sort();
        results.dedup();
        results
    }
}

fn cells_along(extent: f32, cell_size: f32) -> usize {
    ((extent / cell_size) - CELL_COUNT_EPSILON).ceil().max(1.0) as usize
}

/// Inclusive cell range covered by `[lo, hi)` in cell units, clamped to
/// `0..count`. A zero-length span maps to the single cell containing it.
fn span(lo: f32, hi: f32, count: usize) -> (usize, usize) {
    let last = count as isize - 1;
    let first = lo.floor() as isize;
    let end = (hi.ceil() as isize - 1).max(first);
    (
        first.clamp(0, last) as usize,
        end.clamp(0, last) as usize,
    )
}

/// Widens or narrows an estimated span by one cell at each end so that it
/// covers exactly the cells `overlaps` accepts. Never shrinks below one cell.
fn settle(
    (mut first, mut last): (usize, usize),
    count: usize,
    overlaps: impl Fn(usize) -> bool,
) -> (usize, usize) {
    if first > 0 && overlaps(first - 1) {
        first -= 1;
    }
    if last + 1 < count && overlaps(last + 1) {
        last += 1;
    }
    if first < last && !overlaps(first) {
        first += 1;
    }
    if last > first && !overlaps(last) {
        last -= 1;
    }
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_divisions_and_empty_worlds_are_rejected() {
        assert_eq!(
            SpatialGrid::new(100.0, 100.0, 0).unwrap_err(),
            CollisionError::InvalidDivisions(0)
        );
        assert!(SpatialGrid::new(0.0, 100.0, 4).is_err());
        assert!(SpatialGrid::new(100.0, f32::INFINITY, 4).is_err());
    }

    #[test]
    fn rectangular_world_uses_square_cells() {
        let grid = SpatialGrid::new(800.0, 400.0, 8).unwrap();
        assert_eq!(grid.cell_size(), 100.0);
        assert_eq!((grid.columns(), grid.rows()), (8, 4));
        assert_eq!(grid.nodes().len(), 32);
        assert_eq!(grid.node(7, 3).map(|n| n.id()), Some(31));
        assert!(grid.node(8, 0).is_none());
    }

    #[test]
    fn span_clamps_out_of_range_boxes() {
        assert_eq!(span(-3.0, -2.5, 4), (0, 0));
        assert_eq!(span(5.0, 9.0, 4), (3, 3));
        assert_eq!(span(0.5, 2.5, 4), (0, 2));
        assert_eq!(span(1.0, 1.0, 4), (1, 1));
    }

    #[test]
    fn settle_moves_each_end_by_at_most_one_cell() {
        let covered = |lo: usize, hi: usize| move |i: usize| (lo..=hi).contains(&i);
        assert_eq!(settle((3, 4), 9, covered(2, 4)), (2, 4));
        assert_eq!(settle((3, 4), 9, covered(4, 5)), (4, 5));
        assert_eq!(settle((0, 0), 9, covered(9, 9)), (0, 0));
    }

    #[test]
    fn unchanged_membership_reports_no_change() {
        let mut grid = SpatialGrid::new(100.0, 100.0, 4).unwrap();
        let id = ObjectId::from_index(0);
        let bounds = Rect::new(1.0, 1.0, 2.0, 2.0);
        assert!(grid.update_membership(id, &bounds));
        grid.clear_dirty();
        assert!(!grid.update_membership(id, &Rect::new(2.0, 2.0, 2.0, 2.0)));
        assert_eq!(grid.dirty_nodes().count(), 0);
    }
}
