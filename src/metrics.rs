//! Coverage and overlap statistics over a city's samples.
//!
//! These are dataset-quality measures and play no part in partitioning.
//! Every function returns zeroed defaults on empty input.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`coverage_area`] | Sum of aerial box areas (overlaps counted twice) |
//! | [`overlap_fraction`] | Share of one sample's area covered by another |
//! | [`ground_overlap_fraction`] | Share of one sample's ground images shared with another |
//! | [`redundancy_scores`] | Per-sample count of near-duplicate neighbours |
//! | [`redundancy_ranking`] | Samples sorted by redundancy, most redundant first |
//! | [`geographic_distribution`] | Area and centroid-distance statistics |
//! | [`ground_image_diversity`] | Unique / total ground images of a sample |
//! | [`density`] | Samples per unit of covered area |
//!
//! Pairwise passes are quadratic in the worst case. [`redundancy_scores`]
//! prunes candidates with an R-tree, but [`geographic_distribution`] visits
//! every pair and logs a warning above [`AnalysisConfig::max_pairwise_samples`].

use std::collections::HashSet;

use log::{debug, warn};
use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::{approx_area_m2, area, centroid_distance, overlap_area};
use crate::split::ConfigError;
use crate::{BoundingBox, Sample};

/// Configuration for the metric passes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    /// Overlap fraction above which two samples count as near-duplicates.
    /// Default: 0.8
    pub overlap_threshold: f64,
    /// Sample count above which all-pairs passes log a warning.
    /// Default: 5000
    pub max_pairwise_samples: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.8,
            max_pairwise_samples: 5_000,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.overlap_threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.overlap_threshold));
        }
        Ok(())
    }
}

// ============================================================================
// Coverage
// ============================================================================

/// Sum of every sample's aerial box area, in square degrees.
///
/// Overlapping regions are counted once per sample.
pub fn coverage_area(samples: &[Sample]) -> f64 {
    samples.iter().map(|s| area(&s.bbox)).sum()
}

/// Samples per square degree of [`coverage_area`]. 0 when nothing is covered.
pub fn density(samples: &[Sample]) -> f64 {
    let covered = coverage_area(samples);
    if covered > 0.0 {
        samples.len() as f64 / covered
    } else {
        0.0
    }
}

// ============================================================================
// Pairwise Overlap
// ============================================================================

/// Fraction of `s1`'s aerial area that `s2` covers.
///
/// Asymmetric. Returns 0 when `s1` has no positive area or either box has a
/// non-finite coordinate.
pub fn overlap_fraction(s1: &Sample, s2: &Sample) -> f64 {
    box_overlap_fraction(&s1.bbox, &s2.bbox)
}

fn box_overlap_fraction(a: &BoundingBox, b: &BoundingBox) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return 0.0;
    }
    let denom = area(a);
    if denom <= 0.0 {
        return 0.0;
    }
    overlap_area(a, b) / denom
}

/// Fraction of `s1`'s ground images that also appear in `s2`.
///
/// Asymmetric. Returns 0 when `s1` has no ground images.
pub fn ground_overlap_fraction(s1: &Sample, s2: &Sample) -> f64 {
    if s1.ground_ids.is_empty() {
        return 0.0;
    }
    let other: HashSet<&str> = s2.ground_ids.iter().map(|s| s.as_str()).collect();
    let shared = s1.ground_ids.iter().filter(|id| other.contains(id.as_str())).count();
    shared as f64 / s1.ground_ids.len() as f64
}

// ============================================================================
// Redundancy
// ============================================================================

/// Sample envelope stored in the R-tree.
struct SampleEnvelope {
    index: usize,
    bbox: BoundingBox,
}

impl RTreeObject for SampleEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.bbox.min_x, self.bbox.min_y], [self.bbox.max_x, self.bbox.max_y])
    }
}

fn build_tree(samples: &[Sample]) -> RTree<SampleEnvelope> {
    let envelopes: Vec<SampleEnvelope> = samples
        .iter()
        .enumerate()
        .filter(|(_, s)| s.bbox.is_finite())
        .map(|(index, s)| SampleEnvelope { index, bbox: s.bbox })
        .collect();
    RTree::bulk_load(envelopes)
}

/// Score one sample against a prebuilt tree.
fn score_with_tree(tree: &RTree<SampleEnvelope>, samples: &[Sample], index: usize, threshold: f64) -> usize {
    let bbox = &samples[index].bbox;
    if !bbox.is_finite() {
        return 0;
    }
    let query = AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]);
    tree.locate_in_envelope_intersecting(&query)
        .filter(|other| other.index != index)
        .filter(|other| box_overlap_fraction(bbox, &other.bbox) > threshold)
        .count()
}

fn score_brute_force(samples: &[Sample], index: usize, threshold: f64) -> usize {
    let sample = &samples[index];
    samples
        .iter()
        .enumerate()
        .filter(|(other, _)| *other != index)
        .filter(|(_, other)| overlap_fraction(sample, other) > threshold)
        .count()
}

/// Number of other samples whose overlap fraction with `samples[index]` exceeds `threshold`.
///
/// Lowering the threshold never lowers the score. `None` when `index` is out of range.
pub fn redundancy_score(samples: &[Sample], index: usize, threshold: f64) -> Option<usize> {
    if index >= samples.len() {
        return None;
    }
    Some(score_brute_force(samples, index, threshold))
}

/// [`redundancy_score`] for every sample, in input order.
///
/// Only boxes that intersect can have a positive overlap fraction, so for
/// non-negative thresholds candidates come from an R-tree query.
///
/// # Example
/// ```
/// use gridsplit::{BoundingBox, Sample, metrics};
///
/// let samples = vec![
///     Sample::from_bbox(BoundingBox::new(0.0, 0.0, 1.0, 1.0), vec![]),
///     Sample::from_bbox(BoundingBox::new(0.05, 0.0, 1.05, 1.0), vec![]),
///     Sample::from_bbox(BoundingBox::new(5.0, 5.0, 6.0, 6.0), vec![]),
/// ];
/// assert_eq!(metrics::redundancy_scores(&samples, 0.8), vec![1, 1, 0]);
/// ```
pub fn redundancy_scores(samples: &[Sample], threshold: f64) -> Vec<usize> {
    if threshold < 0.0 {
        return (0..samples.len())
            .map(|i| score_brute_force(samples, i, threshold))
            .collect();
    }

    let tree = build_tree(samples);
    (0..samples.len())
        .map(|i| score_with_tree(&tree, samples, i, threshold))
        .collect()
}

/// Parallel version of [`redundancy_scores`].
#[cfg(feature = "parallel")]
pub fn redundancy_scores_parallel(samples: &[Sample], threshold: f64) -> Vec<usize> {
    use rayon::prelude::*;

    if threshold < 0.0 {
        return (0..samples.len())
            .into_par_iter()
            .map(|i| score_brute_force(samples, i, threshold))
            .collect();
    }

    let tree = build_tree(samples);
    (0..samples.len())
        .into_par_iter()
        .map(|i| score_with_tree(&tree, samples, i, threshold))
        .collect()
}

/// One row of a redundancy ranking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RedundancyEntry {
    /// Position in the input
    pub index: usize,
    pub key: String,
    pub score: usize,
}

fn rank(samples: &[Sample], scores: Vec<usize>) -> Vec<RedundancyEntry> {
    let mut entries: Vec<RedundancyEntry> = scores
        .into_iter()
        .enumerate()
        .map(|(index, score)| RedundancyEntry {
            index,
            key: samples[index].key.clone(),
            score,
        })
        .collect();
    // Stable, so ties keep input order
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}

/// All samples ordered by redundancy score, most redundant first.
pub fn redundancy_ranking(samples: &[Sample], threshold: f64) -> Vec<RedundancyEntry> {
    #[cfg(feature = "parallel")]
    let scores = redundancy_scores_parallel(samples, threshold);
    #[cfg(not(feature = "parallel"))]
    let scores = redundancy_scores(samples, threshold);

    rank(samples, scores)
}

// ============================================================================
// Distribution
// ============================================================================

/// Mean, population standard deviation and range of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            count: values.len(),
            mean,
            std_dev: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Statistics over all pairwise centroid distances, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceStats {
    pub pairs: usize,
    pub mean: f64,
    pub std_dev: f64,
}

/// Area and spacing statistics of a sample set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeographicDistribution {
    pub area: SummaryStats,
    pub centroid_distance: DistanceStats,
}

/// Area statistics plus mean/std of centroid distance over every pair.
///
/// Visits all `n * (n - 1) / 2` pairs.
pub fn geographic_distribution(samples: &[Sample], config: &AnalysisConfig) -> GeographicDistribution {
    let areas: Vec<f64> = samples.iter().map(|s| area(&s.bbox)).collect();

    if samples.len() > config.max_pairwise_samples {
        warn!(
            "Computing centroid distances over {} samples ({} pairs), this is quadratic",
            samples.len(),
            samples.len() * (samples.len() - 1) / 2
        );
    }

    // Shifted by the first distance to keep the variance numerically stable
    let mut pairs = 0usize;
    let mut shift = None;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for (i, a) in samples.iter().enumerate() {
        for b in &samples[i + 1..] {
            let d = centroid_distance(&a.bbox, &b.bbox);
            let k = *shift.get_or_insert(d);
            sum += d - k;
            sum_sq += (d - k) * (d - k);
            pairs += 1;
        }
    }

    let centroid_distance = if pairs == 0 {
        DistanceStats::default()
    } else {
        let n = pairs as f64;
        let k = shift.unwrap_or(0.0);
        let variance = (sum_sq - sum * sum / n) / n;
        DistanceStats {
            pairs,
            mean: k + sum / n,
            std_dev: variance.max(0.0).sqrt(),
        }
    };

    GeographicDistribution {
        area: SummaryStats::from_values(&areas),
        centroid_distance,
    }
}

// ============================================================================
// Ground Images
// ============================================================================

/// Unique ground images over total ground images. 0 for a sample with none.
pub fn ground_image_diversity(sample: &Sample) -> f64 {
    if sample.ground_ids.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&String> = sample.ground_ids.iter().collect();
    unique.len() as f64 / sample.ground_ids.len() as f64
}

/// Mean [`ground_image_diversity`] over all samples. 0 for no samples.
pub fn mean_ground_image_diversity(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(ground_image_diversity).sum::<f64>() / samples.len() as f64
}

// ============================================================================
// City Report
// ============================================================================

/// All metrics for one city.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CityReport {
    pub city: String,
    pub sample_count: usize,
    pub ground_image_count: usize,
    /// Square degrees, overlaps counted twice
    pub coverage_area: f64,
    /// Approximate square meters, overlaps counted twice
    pub coverage_area_m2: f64,
    /// Samples per square degree
    pub density: f64,
    pub mean_ground_image_diversity: f64,
    pub distribution: GeographicDistribution,
    /// Samples with at least one near-duplicate
    pub redundant_samples: usize,
    pub max_redundancy: usize,
    /// Most redundant first
    pub redundancy: Vec<RedundancyEntry>,
}

impl CityReport {
    pub fn compute(city: &str, samples: &[Sample], config: &AnalysisConfig) -> Self {
        let redundancy = redundancy_ranking(samples, config.overlap_threshold);
        let redundant_samples = redundancy.iter().filter(|e| e.score > 0).count();
        let max_redundancy = redundancy.first().map_or(0, |e| e.score);

        debug!(
            "{}: {} samples, {} with near-duplicates above {}",
            city,
            samples.len(),
            redundant_samples,
            config.overlap_threshold
        );

        Self {
            city: city.to_string(),
            sample_count: samples.len(),
            ground_image_count: samples.iter().map(|s| s.ground_ids.len()).sum(),
            coverage_area: coverage_area(samples),
            coverage_area_m2: samples.iter().map(|s| approx_area_m2(&s.bbox)).sum(),
            density: density(samples),
            mean_ground_image_diversity: mean_ground_image_diversity(samples),
            distribution: geographic_distribution(samples, config),
            redundant_samples,
            max_redundancy,
            redundancy,
        }
    }
}
