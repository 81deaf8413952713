//! # Gridsplit
//!
//! Spatial train/validation/test partitioning and overlap metrics for paired
//! aerial/ground-level image datasets used in cross-view geo-localization.
//!
//! This library provides:
//! - Bounding box geometry (overlap, area, centroid, interior box)
//! - Grid-based partitioning of a city into train/validation/test cells, with
//!   a corner-consensus rule so no sample straddles two partitions
//! - Coverage, redundancy, distribution and diversity statistics
//! - Per-cell sample density grids
//! - Manifest (CSV) reading and writing
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel redundancy scoring with rayon
//! - **`serde`** - Serialize configs, partition maps and reports
//! - **`cli`** - Build the `gridsplit` command line tool
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use gridsplit::{BoundingBox, CityRegion, PartitionMap, Sample, SplitConfig, split_samples};
//!
//! let city = CityRegion::new("Example", BoundingBox::new(0.0, 0.0, 2.0, 2.0));
//! let config = SplitConfig { cells_per_side: 2, seed: Some(7), ..SplitConfig::default() };
//! let partitions = PartitionMap::from_config(&config).unwrap();
//!
//! let samples = vec![
//!     Sample::new("aerial_0.1_0.1_0.9_0.9.png", BoundingBox::new(0.1, 0.1, 0.9, 0.9), vec!["g1.jpg".into()]),
//! ];
//!
//! let result = split_samples(&city, &partitions, &samples);
//! assert_eq!(result.used_count() + result.unused_count, 1);
//! ```

// Bounding box geometry
pub mod geo_utils;

// Built-in research city regions
pub mod cities;

// City grid and cell bucketing
pub mod grid;
pub use grid::{CityGrid, CityRegion, GridCell};

// Train/validation/test assignment
pub mod split;
pub use split::{
    classify_sample, split_samples, ConfigError, Partition, PartitionMap, SampleClass,
    SplitConfig, SplitResult,
};

// Coverage, redundancy and distribution statistics
pub mod metrics;
pub use metrics::{AnalysisConfig, CityReport, DistanceStats, RedundancyEntry, SummaryStats};

// Per-cell sample density
pub mod heatmap;
pub use heatmap::{build_density_grid, DensityCell, DensityGrid};

// Manifest reading and writing
pub mod manifest;
pub use manifest::{Manifest, ManifestError, ManifestOptions};

// ============================================================================
// Core Types
// ============================================================================

/// An axis-aligned bounding box in geographic degrees.
///
/// `x` is longitude and `y` is latitude. Boxes are expected to satisfy
/// `min_x < max_x` and `min_y < max_y`, but nothing enforces it: malformed
/// boxes yield zero or negative areas from the geometry functions.
///
/// # Example
/// ```
/// use gridsplit::BoundingBox;
/// let bbox = BoundingBox::new(-71.06, 42.35, -71.05, 42.36);
/// assert!(bbox.is_well_formed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from `(min_x, min_y, max_x, max_y)`.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Width along the x (longitude) axis.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height along the y (latitude) axis.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check that no coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite() && self.min_y.is_finite() && self.max_x.is_finite() && self.max_y.is_finite()
    }

    /// Check that all coordinates are finite and min < max on both axes.
    pub fn is_well_formed(&self) -> bool {
        self.is_finite() && self.min_x < self.max_x && self.min_y < self.max_y
    }

    /// The four corners as `(left, bottom)`, `(left, top)`, `(right, bottom)`, `(right, top)`.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.min_x, self.max_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
        ]
    }
}

/// One aerial tile and the ground-level images collected inside it.
///
/// `record` holds the manifest row the sample was read from so that split
/// manifests can reproduce it byte for byte, including the original decimal
/// precision of the coordinates in the aerial file name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Aerial image name (the sample's identity)
    pub key: String,
    /// Aerial footprint
    pub bbox: BoundingBox,
    /// Ground-level image identifiers, possibly repeated
    pub ground_ids: Vec<String>,
    /// Raw manifest record
    pub record: Vec<String>,
}

impl Sample {
    /// Create a sample, deriving its manifest record from the key and ground ids.
    pub fn new(key: impl Into<String>, bbox: BoundingBox, ground_ids: Vec<String>) -> Self {
        let key = key.into();
        let mut record = Vec::with_capacity(ground_ids.len() + 1);
        record.push(key.clone());
        record.extend(ground_ids.iter().cloned());
        Self { key, bbox, ground_ids, record }
    }

    /// Create a sample whose key is the canonical `aerial_<min_x>_<min_y>_<max_x>_<max_y>.png` name.
    pub fn from_bbox(bbox: BoundingBox, ground_ids: Vec<String>) -> Self {
        Self::new(manifest::aerial_name(&bbox), bbox, ground_ids)
    }

    /// Rebuild `record` after `ground_ids` was edited in place.
    pub(crate) fn sync_record(&mut self) {
        self.record.truncate(1);
        self.record.extend(self.ground_ids.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_dimensions() {
        let b = BoundingBox::new(1.0, 2.0, 4.0, 3.0);
        assert_eq!(b.width(), 3.0);
        assert_eq!(b.height(), 1.0);
        assert!(b.is_well_formed());
    }

    #[test]
    fn test_bbox_malformed() {
        assert!(!BoundingBox::new(1.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!BoundingBox::new(0.0, 0.0, f64::NAN, 1.0).is_well_formed());
    }

    #[test]
    fn test_sample_record() {
        let s = Sample::new(
            "aerial_0_0_1_1.png",
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            vec!["a.jpg".to_string(), "b.jpg".to_string()],
        );
        assert_eq!(s.record, vec!["aerial_0_0_1_1.png", "a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_sync_record_after_edit() {
        let mut s = Sample::new(
            "k",
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            vec!["a.jpg".to_string(), "b.jpg".to_string()],
        );
        s.ground_ids.pop();
        s.sync_record();
        assert_eq!(s.record, vec!["k", "a.jpg"]);
    }
}
