use glam::Vec2;

/// Occupancy table over the discrete cells `[0, width] x [0, height]`, one
/// optional boid id per cell. Cells are stored in a flat 1D vector, row-major.
///
/// The upper bound is inclusive because truncated positions take every value
/// in `0..=width` for positions inside `[0, width)` plus the boundary itself.
///
/// The grid carries no locking of its own, it is shared through
/// [`crate::world::World`] under a single readers-writer lock.
pub struct SpatialGrid {
    cells: Vec<Option<usize>>,
    cols: usize,
    rows: usize,
}

impl SpatialGrid {
    pub fn new(width: f32, height: f32) -> Self {
        let cols = width.floor() as usize + 1;
        let rows = height.floor() as usize + 1;

        SpatialGrid {
            cells: vec![None; cols * rows],
            cols,
            rows,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Discrete cell of a continuous position.
    ///
    /// Indices are clamped into the valid range first. The border term keeps
    /// positions inside the area in steady state, clamping here is what makes
    /// a transient overshoot harmless instead of an out-of-range access.
    pub fn cell_of(&self, position: Vec2) -> (usize, usize) {
        (
            position.x.clamp(0., (self.cols - 1) as f32) as usize,
            position.y.clamp(0., (self.rows - 1) as f32) as usize,
        )
    }

    pub fn occupant(&self, cell_x: usize, cell_y: usize) -> Option<usize> {
        self.cells[self.index(cell_x, cell_y)]
    }

    pub fn set(&mut self, cell_x: usize, cell_y: usize, id: usize) {
        let index = self.index(cell_x, cell_y);
        self.cells[index] = Some(id);
    }

    pub fn clear(&mut self, cell_x: usize, cell_y: usize) {
        let index = self.index(cell_x, cell_y);
        self.cells[index] = None;
    }

    /// Ids of all occupied cells within the axis-aligned box
    /// `[center - radius, center + radius]`, cropped to the grid.
    ///
    /// The box is cropped per axis before iterating, so the loop body never
    /// touches an out-of-range cell. Enumeration order is row-major, callers
    /// only ever fold the result into order-independent sums.
    pub fn occupied_within(&self, center: Vec2, radius: f32) -> Vec<usize> {
        let lower_x = (center.x - radius).max(0.) as usize;
        let lower_y = (center.y - radius).max(0.) as usize;
        let upper_x = (center.x + radius).min((self.cols - 1) as f32) as usize;
        let upper_y = (center.y + radius).min((self.rows - 1) as f32) as usize;

        let mut found = Vec::new();
        for cell_x in lower_x..=upper_x {
            for cell_y in lower_y..=upper_y {
                if let Some(id) = self.cells[self.index(cell_x, cell_y)] {
                    found.push(id);
                }
            }
        }

        found
    }

    /// How many cells currently carry `id`. An externally observable grid
    /// holds at most one cell per id.
    pub fn occurrences(&self, id: usize) -> usize {
        self.cells.iter().filter(|cell| **cell == Some(id)).count()
    }

    #[inline]
    fn index(&self, cell_x: usize, cell_y: usize) -> usize {
        cell_y * self.cols + cell_x
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use rstest::rstest;

    use super::SpatialGrid;

    #[test]
    fn has_inclusive_bounds() {
        let grid = SpatialGrid::new(640., 360.);

        assert_eq!(grid.cols(), 641);
        assert_eq!(grid.rows(), 361);
    }

    #[test]
    fn set_lookup_clear_roundtrip() {
        let mut grid = SpatialGrid::new(10., 10.);

        assert_eq!(grid.occupant(3, 4), None);
        grid.set(3, 4, 7);
        assert_eq!(grid.occupant(3, 4), Some(7));
        grid.clear(3, 4);
        assert_eq!(grid.occupant(3, 4), None);
    }

    #[rstest]
    #[case(Vec2::new(3.7, 4.2), (3, 4))]
    #[case(Vec2::new(0., 0.), (0, 0))]
    #[case(Vec2::new(10., 10.), (10, 10))]
    // transient overshoots clamp instead of indexing out of range
    #[case(Vec2::new(-1.5, 11.8), (0, 10))]
    fn cell_of_truncates_and_clamps(#[case] position: Vec2, #[case] expected: (usize, usize)) {
        let grid = SpatialGrid::new(10., 10.);

        assert_eq!(grid.cell_of(position), expected);
    }

    #[test]
    fn region_query_enumerates_exactly_the_inside_cells() {
        let mut grid = SpatialGrid::new(20., 20.);

        // inside the box [7, 13] x [7, 13] around (10, 10)
        grid.set(10, 10, 1);
        grid.set(7, 13, 2);
        grid.set(13, 7, 3);
        // outside
        grid.set(14, 10, 4);
        grid.set(10, 6, 5);
        grid.set(0, 0, 6);

        let mut found = grid.occupied_within(Vec2::new(10., 10.), 3.);
        found.sort();

        assert_eq!(found, vec![1, 2, 3]);
    }

    #[rstest]
    // box sticking out over the origin corner
    #[case(Vec2::new(1., 1.), 5.)]
    // box sticking out over the far corner
    #[case(Vec2::new(19., 19.), 5.)]
    // box larger than the whole grid
    #[case(Vec2::new(10., 10.), 50.)]
    fn region_query_crops_to_grid(#[case] center: Vec2, #[case] radius: f32) {
        let mut grid = SpatialGrid::new(20., 20.);
        grid.set(0, 0, 1);
        grid.set(20, 20, 2);

        // must not panic on out-of-range cells, and the full-grid box sees both
        let found = grid.occupied_within(center, radius);
        assert!(found.len() <= 2);
        if radius >= 50. {
            assert_eq!(found.len(), 2);
        }
    }

    #[test]
    fn zero_radius_query_sees_only_own_cell() {
        let mut grid = SpatialGrid::new(10., 10.);
        grid.set(5, 5, 1);
        grid.set(6, 5, 2);

        assert_eq!(grid.occupied_within(Vec2::new(5.4, 5.4), 0.), vec![1]);
    }

    #[test]
    fn occurrences_counts_cells_per_id() {
        let mut grid = SpatialGrid::new(10., 10.);
        grid.set(1, 1, 9);

        assert_eq!(grid.occurrences(9), 1);
        assert_eq!(grid.occurrences(8), 0);
    }
}
