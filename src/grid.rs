//! City grids.
//!
//! A city's bounding region is divided into `N x N` equal cells. Cell `(i, j)`
//! has `i` counting along x (longitude, west to east) and `j` along y
//! (latitude, south to north). Coordinates are bucketed with
//! `floor((coord - min) / cell_size)`, the same way everywhere, so a point on
//! a shared cell edge always lands in the cell to its east/north.

use crate::BoundingBox;

/// A named city bounding region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CityRegion {
    pub name: String,
    pub bounds: BoundingBox,
}

impl CityRegion {
    pub fn new(name: impl Into<String>, bounds: BoundingBox) -> Self {
        Self { name: name.into(), bounds }
    }

    /// Subdivide the region into `cells_per_side x cells_per_side` cells.
    pub fn grid(&self, cells_per_side: usize) -> CityGrid {
        CityGrid::new(self.bounds, cells_per_side)
    }
}

/// Integer coordinates of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub i: usize,
    pub j: usize,
}

impl GridCell {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

/// Raw bucket index, possibly outside the grid
type Bucket = (i64, i64);

/// A region split into square-indexed cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityGrid {
    pub bounds: BoundingBox,
    pub cells_per_side: usize,
}

impl CityGrid {
    pub fn new(bounds: BoundingBox, cells_per_side: usize) -> Self {
        Self { bounds, cells_per_side }
    }

    /// Total number of cells (`N * N`).
    pub fn cell_count(&self) -> usize {
        self.cells_per_side * self.cells_per_side
    }

    /// Cell width and height in degrees.
    pub fn cell_size(&self) -> (f64, f64) {
        let n = self.cells_per_side as f64;
        (self.bounds.width() / n, self.bounds.height() / n)
    }

    /// All cell coordinates, `i` major.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> {
        let n = self.cells_per_side;
        (0..n).flat_map(move |i| (0..n).map(move |j| GridCell::new(i, j)))
    }

    /// Bucket a point without range checking.
    ///
    /// Non-finite input maps to `(-1, -1)`, which is never inside the grid.
    pub fn bucket(&self, x: f64, y: f64) -> Bucket {
        let (w, h) = self.cell_size();
        let bi = ((x - self.bounds.min_x) / w).floor();
        let bj = ((y - self.bounds.min_y) / h).floor();
        if !bi.is_finite() || !bj.is_finite() {
            return (-1, -1);
        }
        (bi as i64, bj as i64)
    }

    /// Convert a raw bucket to a cell if it lies in `[0, N)` on both axes.
    pub fn to_cell(&self, bucket: Bucket) -> Option<GridCell> {
        let n = self.cells_per_side as i64;
        let (i, j) = bucket;
        if (0..n).contains(&i) && (0..n).contains(&j) {
            Some(GridCell::new(i as usize, j as usize))
        } else {
            None
        }
    }

    /// The cell containing a point, or `None` outside the grid.
    pub fn locate(&self, x: f64, y: f64) -> Option<GridCell> {
        self.to_cell(self.bucket(x, y))
    }

    /// Cells of the box corners `(left, bottom)`, `(left, top)`, `(right, bottom)`, `(right, top)`.
    ///
    /// A corner outside the grid is `None`.
    pub fn corner_cells(&self, bbox: &BoundingBox) -> [Option<GridCell>; 4] {
        bbox.corners().map(|(x, y)| self.locate(x, y))
    }

    /// Inclusive bucket range `((i_min, j_min), (i_max, j_max))` spanned by a box.
    pub fn bucket_range(&self, bbox: &BoundingBox) -> (Bucket, Bucket) {
        (
            self.bucket(bbox.min_x, bbox.min_y),
            self.bucket(bbox.max_x, bbox.max_y),
        )
    }

    /// Geographic bounds of a cell.
    pub fn cell_bounds(&self, cell: GridCell) -> BoundingBox {
        let (w, h) = self.cell_size();
        let min_x = self.bounds.min_x + cell.i as f64 * w;
        let min_y = self.bounds.min_y + cell.j as f64 * h;
        BoundingBox::new(min_x, min_y, min_x + w, min_y + h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid(n: usize) -> CityGrid {
        CityGrid::new(BoundingBox::new(0.0, 0.0, n as f64, n as f64), n)
    }

    #[test]
    fn test_cells_enumeration() {
        let grid = unit_grid(3);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], GridCell::new(0, 0));
        assert_eq!(cells[1], GridCell::new(0, 1));
        assert_eq!(cells[8], GridCell::new(2, 2));
    }

    #[test]
    fn test_locate() {
        let grid = unit_grid(2);
        assert_eq!(grid.locate(0.2, 0.2), Some(GridCell::new(0, 0)));
        assert_eq!(grid.locate(1.2, 0.8), Some(GridCell::new(1, 0)));
        assert_eq!(grid.locate(0.8, 1.2), Some(GridCell::new(0, 1)));
    }

    #[test]
    fn test_locate_edges() {
        let grid = unit_grid(2);
        // Shared edge belongs to the upper cell
        assert_eq!(grid.locate(1.0, 1.0), Some(GridCell::new(1, 1)));
        // Min edge is inside, max edge is outside
        assert_eq!(grid.locate(0.0, 0.0), Some(GridCell::new(0, 0)));
        assert_eq!(grid.locate(2.0, 0.5), None);
        assert_eq!(grid.locate(-0.01, 0.5), None);
    }

    #[test]
    fn test_negative_offset_uses_floor() {
        let grid = unit_grid(2);
        // Truncation would give 0 here
        assert_eq!(grid.bucket(-0.5, 0.5), (-1, 0));
    }

    #[test]
    fn test_non_finite_is_outside() {
        let grid = unit_grid(2);
        assert_eq!(grid.locate(f64::NAN, 0.5), None);
        assert_eq!(grid.locate(0.5, f64::INFINITY), None);
    }

    #[test]
    fn test_cell_bounds_roundtrip() {
        let grid = CityGrid::new(BoundingBox::new(-71.2, 42.2, -70.9, 42.5), 10);
        for cell in grid.cells() {
            let b = grid.cell_bounds(cell);
            let (cx, cy) = crate::geo_utils::centroid(&b);
            assert_eq!(grid.locate(cx, cy), Some(cell));
        }
    }

    #[test]
    fn test_corner_cells() {
        let grid = unit_grid(2);
        let corners = grid.corner_cells(&BoundingBox::new(0.8, 0.2, 1.2, 0.8));
        assert_eq!(
            corners,
            [
                Some(GridCell::new(0, 0)),
                Some(GridCell::new(0, 0)),
                Some(GridCell::new(1, 0)),
                Some(GridCell::new(1, 0)),
            ]
        );
    }
}
