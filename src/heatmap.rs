//! Per-cell sample density.
//!
//! Counts, for each cell of a city grid, how many samples' interior boxes
//! cover it. A sample is counted in every cell of the inclusive range spanned
//! by its interior box, clipped to the grid, so one sample can contribute to
//! several cells. Only occupied cells are returned.

use std::collections::HashMap;

use log::debug;

use crate::geo_utils::{centroid, interior};
use crate::grid::{CityGrid, CityRegion, GridCell};
use crate::Sample;

/// A single occupied cell of a density grid
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DensityCell {
    pub cell: GridCell,
    /// Cell center for rendering
    pub center_x: f64,
    pub center_y: f64,
    /// Samples covering this cell
    pub count: u32,
    /// `count / max_count`, 0.0-1.0 for color mapping
    pub intensity: f32,
}

/// Complete density result
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DensityGrid {
    pub city: String,
    pub cells_per_side: usize,
    /// Occupied cells only, in `(i, j)` order
    pub cells: Vec<DensityCell>,
    /// Highest count of any cell
    pub max_count: u32,
    /// Samples that covered at least one cell
    pub counted_samples: usize,
}

impl DensityGrid {
    /// Number of cells with at least one sample.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Count for a cell, 0 when unoccupied.
    pub fn count(&self, cell: GridCell) -> u32 {
        self.cells
            .binary_search_by(|c| c.cell.cmp(&cell))
            .map_or(0, |idx| self.cells[idx].count)
    }
}

/// Count builder keyed by cell
struct DensityBuilder {
    grid: CityGrid,
    counts: HashMap<GridCell, u32>,
    counted_samples: usize,
}

impl DensityBuilder {
    fn new(grid: CityGrid) -> Self {
        Self {
            grid,
            counts: HashMap::new(),
            counted_samples: 0,
        }
    }

    /// Add one sample to every grid cell its interior box spans
    fn add_sample(&mut self, sample: &Sample) {
        if !sample.bbox.is_finite() {
            return;
        }
        let inner = interior(&sample.bbox);
        let ((left, bottom), (right, top)) = self.grid.bucket_range(&inner);

        let last = self.grid.cells_per_side as i64 - 1;
        let (left, right) = (left.max(0), right.min(last));
        let (bottom, top) = (bottom.max(0), top.min(last));
        if left > right || bottom > top {
            return;
        }

        for i in left..=right {
            for j in bottom..=top {
                *self.counts.entry(GridCell::new(i as usize, j as usize)).or_insert(0) += 1;
            }
        }
        self.counted_samples += 1;
    }

    fn build(self, city: &str) -> DensityGrid {
        let max_count = self.counts.values().copied().max().unwrap_or(0);

        let mut cells: Vec<DensityCell> = self
            .counts
            .iter()
            .map(|(&cell, &count)| {
                let (center_x, center_y) = centroid(&self.grid.cell_bounds(cell));
                DensityCell {
                    cell,
                    center_x,
                    center_y,
                    count,
                    intensity: count as f32 / max_count as f32,
                }
            })
            .collect();
        cells.sort_by_key(|c| c.cell);

        DensityGrid {
            city: city.to_string(),
            cells_per_side: self.grid.cells_per_side,
            cells,
            max_count,
            counted_samples: self.counted_samples,
        }
    }
}

/// Build a sample density grid for a city
pub fn build_density_grid(city: &CityRegion, cells_per_side: usize, samples: &[Sample]) -> DensityGrid {
    let mut builder = DensityBuilder::new(city.grid(cells_per_side));
    for sample in samples {
        builder.add_sample(sample);
    }
    let grid = builder.build(&city.name);

    debug!(
        "{}: max {} samples per cell, {} cells occupied",
        city.name,
        grid.max_count,
        grid.occupied_cells()
    );

    grid
}

/// Query the density grid at a location
pub fn query_density_cell<'a>(
    density: &'a DensityGrid,
    city: &CityRegion,
    x: f64,
    y: f64,
) -> Option<&'a DensityCell> {
    let cell = city.grid(density.cells_per_side).locate(x, y)?;
    density.cells.iter().find(|c| c.cell == cell)
}
