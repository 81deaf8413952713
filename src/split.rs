//! Train/validation/test assignment by grid cell.
//!
//! The `N x N` cells of a grid are shuffled once and cut into three contiguous
//! runs: the first `floor(train_ratio * N²)` cells are train, the last
//! `floor(test_ratio * N²)` are test and the middle is validation. The same
//! [`PartitionMap`] is then applied to every city.
//!
//! A sample is assigned to a partition only when all four corners of its
//! interior box fall in cells of that partition. Anything else, including a
//! corner outside the city grid, leaves the sample unused so that no region
//! is shared between two splits.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::geo_utils::interior;
use crate::grid::{CityGrid, CityRegion, GridCell};
use crate::manifest::Manifest;
use crate::{BoundingBox, Sample};

/// Invalid partitioning or analysis configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid must have at least one cell per side")]
    EmptyGrid,
    #[error("{name} must be within [0, 1], got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },
    #[error("train_ratio + test_ratio must not exceed 1, got {0}")]
    RatioSum(f64),
    #[error("overlap threshold must be finite, got {0}")]
    InvalidThreshold(f64),
    #[error("grid of {0} cells per side exceeds the maximum of {max}", max = MAX_CELLS_PER_SIDE)]
    GridTooLarge(usize),
    #[error("partition map for {cells_per_side}x{cells_per_side} cells has {len} assignments")]
    AssignmentSize { cells_per_side: usize, len: usize },
}

/// Largest supported grid resolution.
pub const MAX_CELLS_PER_SIDE: usize = 4096;

/// One of the three dataset splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Partition {
    Train,
    Validation,
    Test,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Train, Partition::Validation, Partition::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Validation => "validation",
            Partition::Test => "test",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for grid partitioning.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SplitConfig {
    /// Grid resolution, cells per side. Default: 20
    pub cells_per_side: usize,
    /// Fraction of cells used for training. Default: 0.7
    pub train_ratio: f64,
    /// Fraction of cells used for testing. Default: 0.1
    pub test_ratio: f64,
    /// Shuffle seed. `None` draws from OS entropy. Default: None
    pub seed: Option<u64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            cells_per_side: 20,
            train_ratio: 0.7,
            test_ratio: 0.1,
            seed: None,
        }
    }
}

impl SplitConfig {
    /// Implicit validation ratio, `1 - train_ratio - test_ratio`.
    pub fn validation_ratio(&self) -> f64 {
        (1.0 - self.train_ratio - self.test_ratio).max(0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_grid_size(self.cells_per_side)?;
        for (name, value) in [("train_ratio", self.train_ratio), ("test_ratio", self.test_ratio)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RatioOutOfRange { name, value });
            }
        }
        let sum = self.train_ratio + self.test_ratio;
        // Allow for float noise in ratios like 0.7 + 0.3
        if sum > 1.0 + 1e-9 {
            return Err(ConfigError::RatioSum(sum));
        }
        Ok(())
    }
}

fn check_grid_size(cells_per_side: usize) -> Result<(), ConfigError> {
    if cells_per_side == 0 {
        return Err(ConfigError::EmptyGrid);
    }
    if cells_per_side > MAX_CELLS_PER_SIDE {
        return Err(ConfigError::GridTooLarge(cells_per_side));
    }
    Ok(())
}

/// Mapping from every grid cell to exactly one partition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPartitionMap"))]
pub struct PartitionMap {
    cells_per_side: usize,
    /// Indexed by `i * cells_per_side + j`
    assignment: Vec<Partition>,
}

/// Unchecked wire form of [`PartitionMap`]
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPartitionMap {
    cells_per_side: usize,
    assignment: Vec<Partition>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPartitionMap> for PartitionMap {
    type Error = ConfigError;

    fn try_from(raw: RawPartitionMap) -> Result<Self, Self::Error> {
        Self::from_assignment(raw.cells_per_side, raw.assignment)
    }
}

impl PartitionMap {
    /// Shuffle the grid cells and cut them into train/validation/test runs.
    ///
    /// With a fixed `seed` the result is identical across runs.
    ///
    /// # Example
    /// ```
    /// use gridsplit::{PartitionMap, SplitConfig};
    ///
    /// let config = SplitConfig { seed: Some(42), ..SplitConfig::default() };
    /// let a = PartitionMap::from_config(&config).unwrap();
    /// let b = PartitionMap::from_config(&config).unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn from_config(config: &SplitConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let n = config.cells_per_side;
        let mut cells: Vec<GridCell> = (0..n)
            .flat_map(|i| (0..n).map(move |j| GridCell::new(i, j)))
            .collect();

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        cells.shuffle(&mut rng);

        let total = cells.len();
        let train_count = ((config.train_ratio * total as f64).floor() as usize).min(total);
        let test_count = ((config.test_ratio * total as f64).floor() as usize).min(total - train_count);

        debug!(
            "Partitioning {} cells: {} train, {} validation, {} test",
            total,
            train_count,
            total - train_count - test_count,
            test_count
        );

        Ok(Self::from_shuffled(n, &cells, train_count, test_count))
    }

    /// Build a map from an already ordered cell list.
    ///
    /// `order` must contain every cell of the grid exactly once.
    ///
    /// # Panics
    ///
    /// Panics if a cell in `order` lies outside the `cells_per_side` grid.
    pub fn from_shuffled(
        cells_per_side: usize,
        order: &[GridCell],
        train_count: usize,
        test_count: usize,
    ) -> Self {
        let total = order.len();
        let test_start = total.saturating_sub(test_count).max(train_count);

        let mut assignment = vec![Partition::Validation; cells_per_side * cells_per_side];
        for (rank, cell) in order.iter().enumerate() {
            let partition = if rank < train_count {
                Partition::Train
            } else if rank >= test_start {
                Partition::Test
            } else {
                Partition::Validation
            };
            assignment[cell.i * cells_per_side + cell.j] = partition;
        }

        Self { cells_per_side, assignment }
    }

    /// Build a map from assignments indexed by `i * cells_per_side + j`.
    ///
    /// Fails unless the grid size is supported and there is exactly one
    /// assignment per cell.
    pub fn from_assignment(cells_per_side: usize, assignment: Vec<Partition>) -> Result<Self, ConfigError> {
        check_grid_size(cells_per_side)?;
        if assignment.len() != cells_per_side * cells_per_side {
            return Err(ConfigError::AssignmentSize {
                cells_per_side,
                len: assignment.len(),
            });
        }
        Ok(Self { cells_per_side, assignment })
    }

    /// Build a map by asking `f` for the partition of every cell.
    pub fn from_fn(cells_per_side: usize, mut f: impl FnMut(GridCell) -> Partition) -> Self {
        let assignment = (0..cells_per_side)
            .flat_map(|i| (0..cells_per_side).map(move |j| GridCell::new(i, j)))
            .map(&mut f)
            .collect();
        Self { cells_per_side, assignment }
    }

    pub fn cells_per_side(&self) -> usize {
        self.cells_per_side
    }

    /// Partition of a cell, `None` when the cell is outside the grid.
    pub fn get(&self, cell: GridCell) -> Option<Partition> {
        if cell.i >= self.cells_per_side || cell.j >= self.cells_per_side {
            return None;
        }
        self.assignment.get(cell.i * self.cells_per_side + cell.j).copied()
    }

    /// All cells of one partition, in `(i, j)` order.
    pub fn cells_in(&self, partition: Partition) -> Vec<GridCell> {
        self.iter()
            .filter(|(_, p)| *p == partition)
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Number of cells per partition.
    pub fn counts(&self) -> HashMap<Partition, usize> {
        let mut counts = HashMap::new();
        for p in &self.assignment {
            *counts.entry(*p).or_insert(0) += 1;
        }
        counts
    }

    /// Iterate over `(cell, partition)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (GridCell, Partition)> + '_ {
        let n = self.cells_per_side;
        self.assignment
            .iter()
            .enumerate()
            .map(move |(idx, p)| (GridCell::new(idx / n, idx % n), *p))
    }
}

/// Outcome of classifying one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleClass {
    Assigned(Partition),
    /// Corners span several partitions or leave the grid
    Unused,
}

/// Classify a sample's aerial box against a partitioned city grid.
///
/// The box is shrunk to its interior first. All four interior corners must map
/// to in-grid cells of the same partition.
pub fn classify_sample(grid: &CityGrid, partitions: &PartitionMap, bbox: &BoundingBox) -> SampleClass {
    let inner = interior(bbox);
    let mut found: Option<Partition> = None;

    for corner in grid.corner_cells(&inner) {
        let Some(partition) = corner.and_then(|cell| partitions.get(cell)) else {
            return SampleClass::Unused;
        };
        match found {
            None => found = Some(partition),
            Some(p) if p != partition => return SampleClass::Unused,
            Some(_) => {}
        }
    }

    found.map_or(SampleClass::Unused, SampleClass::Assigned)
}

/// Samples of one city divided into splits.
#[derive(Debug, Clone, Default)]
pub struct SplitResult {
    pub city: String,
    pub train: Vec<Sample>,
    pub validation: Vec<Sample>,
    pub test: Vec<Sample>,
    /// Samples dropped because they straddle partitions or leave the grid
    pub unused_count: usize,
    /// Manifest rows that could not be parsed into a sample
    pub unparseable_count: usize,
}

impl SplitResult {
    pub fn partition(&self, partition: Partition) -> &[Sample] {
        match partition {
            Partition::Train => &self.train,
            Partition::Validation => &self.validation,
            Partition::Test => &self.test,
        }
    }

    pub fn used_count(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    /// Fraction of classified samples that were dropped. 0 for an empty city.
    pub fn unused_fraction(&self) -> f64 {
        let total = self.used_count() + self.unused_count;
        if total == 0 {
            return 0.0;
        }
        self.unused_count as f64 / total as f64
    }

    pub fn unused_percentage(&self) -> f64 {
        self.unused_fraction() * 100.0
    }
}

/// Split a city's samples. Input order is preserved within each split.
pub fn split_samples(city: &CityRegion, partitions: &PartitionMap, samples: &[Sample]) -> SplitResult {
    let grid = city.grid(partitions.cells_per_side());
    let mut result = SplitResult {
        city: city.name.clone(),
        ..SplitResult::default()
    };

    for sample in samples {
        match classify_sample(&grid, partitions, &sample.bbox) {
            SampleClass::Assigned(Partition::Train) => result.train.push(sample.clone()),
            SampleClass::Assigned(Partition::Validation) => result.validation.push(sample.clone()),
            SampleClass::Assigned(Partition::Test) => result.test.push(sample.clone()),
            SampleClass::Unused => result.unused_count += 1,
        }
    }

    info!(
        "Unused percentage in {}: {:.2}% ({} train, {} validation, {} test)",
        city.name,
        result.unused_percentage(),
        result.train.len(),
        result.validation.len(),
        result.test.len()
    );

    result
}

/// Split a parsed manifest, carrying over its unparseable row count.
pub fn split_manifest(city: &CityRegion, partitions: &PartitionMap, manifest: &Manifest) -> SplitResult {
    let mut result = split_samples(city, partitions, &manifest.samples);
    result.unparseable_count = manifest.unparseable;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// N=2 over (0,0,2,2): diagonal cells train, anti-diagonal test
    fn checkerboard() -> (CityRegion, PartitionMap) {
        let city = CityRegion::new("Checkerboard", BoundingBox::new(0.0, 0.0, 2.0, 2.0));
        let partitions = PartitionMap::from_fn(2, |cell| {
            if cell.i == cell.j {
                Partition::Train
            } else {
                Partition::Test
            }
        });
        (city, partitions)
    }

    /// Aerial box whose interior box is exactly `inner`
    fn with_interior(inner: BoundingBox) -> BoundingBox {
        let dx = inner.width() / 2.0;
        let dy = inner.height() / 2.0;
        BoundingBox::new(inner.min_x - dx, inner.min_y - dy, inner.max_x + dx, inner.max_y + dy)
    }

    fn classify(inner: BoundingBox) -> SampleClass {
        let (city, partitions) = checkerboard();
        let grid = city.grid(2);
        classify_sample(&grid, &partitions, &with_interior(inner))
    }

    #[test]
    fn test_with_interior_helper() {
        let inner = BoundingBox::new(0.2, 0.2, 0.8, 0.8);
        let outer = with_interior(inner);
        let back = interior(&outer);
        assert!((back.min_x - 0.2).abs() < 1e-12);
        assert!((back.max_y - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_single_cell_sample_is_assigned() {
        assert_eq!(
            classify(BoundingBox::new(0.2, 0.2, 0.8, 0.8)),
            SampleClass::Assigned(Partition::Train)
        );
    }

    #[test]
    fn test_box_over_grid_center_touches_all_four_cells() {
        // Corners land in (0,0), (0,1), (1,0), (1,1), mixing train and test
        assert_eq!(classify(BoundingBox::new(0.8, 0.8, 1.2, 1.2)), SampleClass::Unused);
    }

    #[test]
    fn test_spanning_two_cells_of_same_partition() {
        let city = CityRegion::new("Column", BoundingBox::new(0.0, 0.0, 2.0, 2.0));
        let partitions = PartitionMap::from_fn(2, |cell| {
            if cell.i == 0 {
                Partition::Train
            } else {
                Partition::Test
            }
        });
        let grid = city.grid(2);
        // Corners in (0,0) and (0,1), both train
        let sample = with_interior(BoundingBox::new(0.2, 0.8, 0.8, 1.2));
        assert_eq!(
            classify_sample(&grid, &partitions, &sample),
            SampleClass::Assigned(Partition::Train)
        );
    }

    #[test]
    fn test_straddling_partitions_is_unused() {
        // (0,0) train and (1,0) test
        assert_eq!(classify(BoundingBox::new(0.8, 0.2, 1.2, 0.8)), SampleClass::Unused);
    }

    #[test]
    fn test_straddle_unused_even_if_mostly_one_side() {
        assert_eq!(classify(BoundingBox::new(0.1, 0.2, 1.01, 0.8)), SampleClass::Unused);
    }

    #[test]
    fn test_outside_grid_is_unused() {
        assert_eq!(classify(BoundingBox::new(1.5, 1.5, 2.5, 1.8)), SampleClass::Unused);
        assert_eq!(classify(BoundingBox::new(-0.5, 0.2, 0.5, 0.8)), SampleClass::Unused);
    }

    #[test]
    fn test_degenerate_sample_is_assigned() {
        let city = CityRegion::new("C", BoundingBox::new(0.0, 0.0, 2.0, 2.0));
        let (_, partitions) = checkerboard();
        let grid = city.grid(2);
        let point = BoundingBox::new(1.5, 0.5, 1.5, 0.5);
        assert_eq!(
            classify_sample(&grid, &partitions, &point),
            SampleClass::Assigned(Partition::Test)
        );
    }

    #[test]
    fn test_partitions_disjoint_and_exhaustive() {
        for n in [1, 2, 3, 10, 20] {
            for (train, test) in [(0.7, 0.1), (0.8, 0.2), (0.0, 0.0), (1.0, 0.0), (0.5, 0.5), (0.33, 0.33)] {
                let config = SplitConfig {
                    cells_per_side: n,
                    train_ratio: train,
                    test_ratio: test,
                    seed: Some(1),
                };
                let map = PartitionMap::from_config(&config).unwrap();

                let mut seen = HashSet::new();
                for p in Partition::ALL {
                    for cell in map.cells_in(p) {
                        assert!(seen.insert(cell), "cell {:?} in two partitions", cell);
                    }
                }
                let all: HashSet<_> = CityGrid::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), n)
                    .cells()
                    .collect();
                assert_eq!(seen, all);
            }
        }
    }

    #[test]
    fn test_partition_counts() {
        let config = SplitConfig {
            cells_per_side: 20,
            train_ratio: 0.7,
            test_ratio: 0.1,
            seed: Some(3),
        };
        let counts = PartitionMap::from_config(&config).unwrap().counts();
        assert_eq!(counts[&Partition::Train], 280);
        assert_eq!(counts[&Partition::Test], 40);
        assert_eq!(counts[&Partition::Validation], 80);
    }

    #[test]
    fn test_zero_test_ratio_leaves_no_test_cells() {
        let config = SplitConfig {
            cells_per_side: 5,
            train_ratio: 0.8,
            test_ratio: 0.0,
            seed: Some(9),
        };
        let map = PartitionMap::from_config(&config).unwrap();
        assert!(map.cells_in(Partition::Test).is_empty());
        assert_eq!(map.cells_in(Partition::Train).len(), 20);
        assert_eq!(map.cells_in(Partition::Validation).len(), 5);
    }

    #[test]
    fn test_from_shuffled_order() {
        let order = vec![
            GridCell::new(1, 1),
            GridCell::new(0, 0),
            GridCell::new(0, 1),
            GridCell::new(1, 0),
        ];
        let map = PartitionMap::from_shuffled(2, &order, 2, 1);
        assert_eq!(map.get(GridCell::new(1, 1)), Some(Partition::Train));
        assert_eq!(map.get(GridCell::new(0, 0)), Some(Partition::Train));
        assert_eq!(map.get(GridCell::new(0, 1)), Some(Partition::Validation));
        assert_eq!(map.get(GridCell::new(1, 0)), Some(Partition::Test));
        assert_eq!(map.get(GridCell::new(2, 0)), None);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let config = SplitConfig {
            cells_per_side: 10,
            seed: Some(1234),
            ..SplitConfig::default()
        };
        let a = PartitionMap::from_config(&config).unwrap();
        let b = PartitionMap::from_config(&config).unwrap();
        assert_eq!(a, b);

        let city = CityRegion::new("C", BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        let samples: Vec<Sample> = (0..50)
            .map(|k| {
                let x = (k as f64 * 0.0193) % 0.95;
                let y = (k as f64 * 0.0371) % 0.95;
                Sample::from_bbox(BoundingBox::new(x, y, x + 0.04, y + 0.04), vec![])
            })
            .collect();
        let ra = split_samples(&city, &a, &samples);
        let rb = split_samples(&city, &b, &samples);
        assert_eq!(ra.train, rb.train);
        assert_eq!(ra.validation, rb.validation);
        assert_eq!(ra.test, rb.test);
        assert_eq!(ra.unused_count, rb.unused_count);
    }

    #[test]
    fn test_different_seeds_differ() {
        let base = SplitConfig { cells_per_side: 10, ..SplitConfig::default() };
        let a = PartitionMap::from_config(&SplitConfig { seed: Some(1), ..base.clone() }).unwrap();
        let b = PartitionMap::from_config(&SplitConfig { seed: Some(2), ..base }).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_split_preserves_order_and_counts_unused() {
        let (city, partitions) = checkerboard();
        let samples = vec![
            Sample::from_bbox(with_interior(BoundingBox::new(0.2, 0.2, 0.4, 0.4)), vec![]),
            Sample::from_bbox(with_interior(BoundingBox::new(0.8, 0.2, 1.2, 0.8)), vec![]),
            Sample::from_bbox(with_interior(BoundingBox::new(1.2, 1.2, 1.4, 1.4)), vec![]),
            Sample::from_bbox(with_interior(BoundingBox::new(0.5, 0.5, 0.6, 0.6)), vec![]),
            Sample::from_bbox(with_interior(BoundingBox::new(1.2, 0.2, 1.4, 0.4)), vec![]),
        ];
        let result = split_samples(&city, &partitions, &samples);

        assert_eq!(result.train, vec![samples[0].clone(), samples[2].clone(), samples[3].clone()]);
        assert_eq!(result.test, vec![samples[4].clone()]);
        assert!(result.validation.is_empty());
        assert_eq!(result.unused_count, 1);
        assert!((result.unused_percentage() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_split() {
        let (city, partitions) = checkerboard();
        let result = split_samples(&city, &partitions, &[]);
        assert_eq!(result.used_count(), 0);
        assert_eq!(result.unused_fraction(), 0.0);
    }

    #[test]
    fn test_invalid_configs() {
        let zero = SplitConfig { cells_per_side: 0, ..SplitConfig::default() };
        assert_eq!(zero.validate(), Err(ConfigError::EmptyGrid));

        let negative = SplitConfig { train_ratio: -0.1, ..SplitConfig::default() };
        assert!(matches!(negative.validate(), Err(ConfigError::RatioOutOfRange { name: "train_ratio", .. })));

        let too_much = SplitConfig { train_ratio: 0.8, test_ratio: 0.3, ..SplitConfig::default() };
        assert!(matches!(too_much.validate(), Err(ConfigError::RatioSum(_))));
        assert!(PartitionMap::from_config(&too_much).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_json_fills_defaults() {
        let config: SplitConfig = serde_json::from_str(r#"{"cells_per_side": 8, "seed": 42}"#).unwrap();
        assert_eq!(config.cells_per_side, 8);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.train_ratio, 0.7);
        assert_eq!(config.test_ratio, 0.1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partition_map_json() {
        let (_, partitions) = checkerboard();
        let json = serde_json::to_string(&partitions).unwrap();
        assert!(json.contains("\"train\""));
        let back: PartitionMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, partitions);
    }

    #[test]
    fn test_grid_size_limit() {
        let huge = SplitConfig {
            cells_per_side: MAX_CELLS_PER_SIDE + 1,
            ..SplitConfig::default()
        };
        assert_eq!(huge.validate(), Err(ConfigError::GridTooLarge(MAX_CELLS_PER_SIDE + 1)));
        assert!(PartitionMap::from_config(&huge).is_err());

        let widest = SplitConfig {
            cells_per_side: MAX_CELLS_PER_SIDE,
            ..SplitConfig::default()
        };
        assert!(widest.validate().is_ok());

        let overflowing = SplitConfig {
            cells_per_side: usize::MAX,
            ..SplitConfig::default()
        };
        assert!(matches!(overflowing.validate(), Err(ConfigError::GridTooLarge(_))));
    }

    #[test]
    #[should_panic]
    fn test_from_shuffled_rejects_cell_outside_grid() {
        PartitionMap::from_shuffled(2, &[GridCell::new(0, 5)], 1, 0);
    }

    #[test]
    fn test_from_assignment_checks_size() {
        let map = PartitionMap::from_assignment(2, vec![Partition::Train; 4]).unwrap();
        assert_eq!(map.cells_in(Partition::Train).len(), 4);

        assert_eq!(
            PartitionMap::from_assignment(0, vec![Partition::Train]),
            Err(ConfigError::EmptyGrid)
        );
        assert_eq!(
            PartitionMap::from_assignment(2, vec![Partition::Test; 3]),
            Err(ConfigError::AssignmentSize { cells_per_side: 2, len: 3 })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partition_map_json_rejects_bad_shape() {
        let empty_grid = serde_json::from_str::<PartitionMap>(r#"{"cells_per_side":0,"assignment":["train"]}"#);
        assert!(empty_grid.is_err());

        let short = serde_json::from_str::<PartitionMap>(
            r#"{"cells_per_side":2,"assignment":["train","test","validation"]}"#,
        );
        assert!(short.is_err());

        let ok: PartitionMap =
            serde_json::from_str(r#"{"cells_per_side":1,"assignment":["test"]}"#).unwrap();
        assert_eq!(ok.cells_in(Partition::Test), vec![GridCell::new(0, 0)]);
    }

    #[test]
    fn test_validation_ratio() {
        let config = SplitConfig::default();
        assert!((config.validation_ratio() - 0.2).abs() < 1e-9);
    }
}
