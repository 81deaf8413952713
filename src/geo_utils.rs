//! # Geographic Utilities
//!
//! Bounding box geometry shared by the partitioner and the metric passes.
//!
//! All functions work on raw degree coordinates with no projection, so areas
//! are relative quantities. [`approx_area_m2`] is the one place where degrees
//! are scaled to meters.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`area`] | Area of a box in square degrees |
//! | [`overlap_area`] | Area of the intersection of two boxes |
//! | [`intersects`] | Check if two boxes share any area |
//! | [`centroid`] | Midpoint of a box |
//! | [`interior`] | Box shrunk by a quarter of its size on each side |
//! | [`centroid_distance`] | Planar distance between centroids in degrees |
//! | [`centroid_distance_m`] | Great-circle distance between centroids in meters |
//! | [`approx_area_m2`] | Approximate area in square meters |
//! | [`square_around`] | Square tile of a given side length centred on a point |
//!
//! ## Example
//!
//! ```rust
//! use gridsplit::{BoundingBox, geo_utils};
//!
//! let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
//! let b = BoundingBox::new(1.0, 1.0, 3.0, 3.0);
//!
//! assert_eq!(geo_utils::area(&a), 4.0);
//! assert_eq!(geo_utils::overlap_area(&a, &b), 1.0);
//! assert_eq!(geo_utils::interior(&a), BoundingBox::new(0.5, 0.5, 1.5, 1.5));
//! ```

use geo::{Distance, Euclidean, Haversine, Point};
use crate::BoundingBox;

/// Meters per degree of latitude used for area scaling.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Earth radius used when deriving aerial tiles from a centre point.
pub const EARTH_RADIUS_M: f64 = 6_378_000.0;

// =============================================================================
// Area Functions
// =============================================================================

/// Area of a box in square degrees.
///
/// Malformed boxes (min >= max on an axis) give zero or negative area.
#[inline]
pub fn area(a: &BoundingBox) -> f64 {
    (a.max_x - a.min_x) * (a.max_y - a.min_y)
}

/// Area of the intersection of two boxes, clamped to zero when they do not overlap.
///
/// Each axis contributes `max(0, min(max) - max(min))`, so boxes that only
/// touch along an edge have zero overlap.
///
/// # Example
///
/// ```rust
/// use gridsplit::{BoundingBox, geo_utils};
///
/// let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
/// let b = BoundingBox::new(5.0, 5.0, 6.0, 6.0);
/// assert_eq!(geo_utils::overlap_area(&a, &b), 0.0);
/// assert_eq!(geo_utils::overlap_area(&a, &a), geo_utils::area(&a));
/// ```
#[inline]
pub fn overlap_area(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let dx = (a.max_x.min(b.max_x) - a.min_x.max(b.min_x)).max(0.0);
    let dy = (a.max_y.min(b.max_y) - a.min_y.max(b.min_y)).max(0.0);
    dx * dy
}

/// Check if two boxes share a region of positive area.
#[inline]
pub fn intersects(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.min_x < b.max_x && b.min_x < a.max_x && a.min_y < b.max_y && b.min_y < a.max_y
}

/// Approximate area of a box in square meters.
///
/// Latitude degrees are scaled by [`METERS_PER_DEGREE`]; longitude degrees
/// additionally by `cos` of the centroid latitude. Good enough at city scale.
pub fn approx_area_m2(a: &BoundingBox) -> f64 {
    let (_, lat) = centroid(a);
    let width_m = a.width() * METERS_PER_DEGREE * lat.to_radians().cos();
    let height_m = a.height() * METERS_PER_DEGREE;
    width_m * height_m
}

// =============================================================================
// Center/Shape Functions
// =============================================================================

/// Midpoint of a box as `(x, y)`.
#[inline]
pub fn centroid(a: &BoundingBox) -> (f64, f64) {
    ((a.min_x + a.max_x) / 2.0, (a.min_y + a.max_y) / 2.0)
}

/// Shrink a box inward by a quarter of its width and height on each side.
///
/// Ground-level images of a sample are collected from the inner half of the
/// aerial tile, so this is the region partition assignment looks at.
pub fn interior(a: &BoundingBox) -> BoundingBox {
    let dx = a.width() / 4.0;
    let dy = a.height() / 4.0;
    BoundingBox::new(a.min_x + dx, a.min_y + dy, a.max_x - dx, a.max_y - dy)
}

/// Square tile with sides of `side_m` meters centred on `(latitude, longitude)`.
///
/// The longitude half-width is widened by `1 / cos(latitude)` so the tile is
/// square on the ground.
///
/// # Example
///
/// ```rust
/// use gridsplit::geo_utils;
///
/// let tile = geo_utils::square_around(42.36, -71.06, 125.0);
/// assert!(tile.is_well_formed());
/// assert!(tile.width() > tile.height());
/// ```
pub fn square_around(latitude: f64, longitude: f64, side_m: f64) -> BoundingBox {
    let lat_delta = (side_m / EARTH_RADIUS_M).to_degrees() / 2.0;
    let lng_delta = lat_delta / latitude.to_radians().cos();
    BoundingBox::new(
        longitude - lng_delta,
        latitude - lat_delta,
        longitude + lng_delta,
        latitude + lat_delta,
    )
}

// =============================================================================
// Distance Functions
// =============================================================================

/// Planar distance between the centroids of two boxes, in degrees.
#[inline]
pub fn centroid_distance(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let (ax, ay) = centroid(a);
    let (bx, by) = centroid(b);
    Euclidean::distance(Point::new(ax, ay), Point::new(bx, by))
}

/// Great-circle distance between the centroids of two boxes, in meters.
#[inline]
pub fn centroid_distance_m(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let (ax, ay) = centroid(a);
    let (bx, by) = centroid(b);
    Haversine::distance(Point::new(ax, ay), Point::new(bx, by))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_overlap_with_self_is_area() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            BoundingBox::new(-71.2205, 42.1954, -70.9005, 42.5154),
            BoundingBox::new(3.5, -2.0, 3.75, 10.0),
        ];
        for b in &boxes {
            assert!(approx_eq(overlap_area(b, b), area(b), 1e-12));
        }
    }

    #[test]
    fn test_overlap_disjoint() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(2.0, 2.0, 3.0, 3.0);
        assert_eq!(overlap_area(&a, &b), 0.0);
        assert_eq!(overlap_area(&b, &a), 0.0);
        // Overlapping on x only
        let c = BoundingBox::new(0.5, 5.0, 1.5, 6.0);
        assert_eq!(overlap_area(&a, &c), 0.0);
    }

    #[test]
    fn test_overlap_partial() {
        let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let b = BoundingBox::new(1.0, 1.5, 4.0, 4.0);
        assert!(approx_eq(overlap_area(&a, &b), 0.5, 1e-12));
        assert!(approx_eq(overlap_area(&b, &a), 0.5, 1e-12));
    }

    #[test]
    fn test_overlap_touching_edges() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(1.0, 0.0, 2.0, 1.0);
        assert_eq!(overlap_area(&a, &b), 0.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn test_malformed_area() {
        let flat = BoundingBox::new(1.0, 0.0, 1.0, 1.0);
        assert_eq!(area(&flat), 0.0);
        let inverted = BoundingBox::new(2.0, 0.0, 1.0, 1.0);
        assert!(area(&inverted) < 0.0);
        assert_eq!(overlap_area(&inverted, &inverted), 0.0);
    }

    #[test]
    fn test_centroid() {
        let b = BoundingBox::new(-1.0, 2.0, 3.0, 4.0);
        assert_eq!(centroid(&b), (1.0, 3.0));
    }

    #[test]
    fn test_interior() {
        let b = BoundingBox::new(0.0, 0.0, 4.0, 8.0);
        assert_eq!(interior(&b), BoundingBox::new(1.0, 2.0, 3.0, 6.0));
        assert_eq!(centroid(&interior(&b)), centroid(&b));
    }

    #[test]
    fn test_centroid_distance() {
        let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let b = BoundingBox::new(3.0, 4.0, 5.0, 6.0);
        assert!(approx_eq(centroid_distance(&a, &b), 5.0, 1e-12));
        assert_eq!(centroid_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_centroid_distance_m() {
        // One degree of latitude is roughly 111 km
        let a = BoundingBox::new(-0.1, -0.1, 0.1, 0.1);
        let b = BoundingBox::new(-0.1, 0.9, 0.1, 1.1);
        assert!(approx_eq(centroid_distance_m(&a, &b), 111_195.0, 1_000.0));
    }

    #[test]
    fn test_approx_area_m2_equator() {
        let b = BoundingBox::new(-0.005, -0.005, 0.005, 0.005);
        // ~1.11 km x 1.11 km
        assert!(approx_eq(approx_area_m2(&b), 1_232_100.0, 1_000.0));
    }

    #[test]
    fn test_approx_area_m2_shrinks_with_latitude() {
        let equator = BoundingBox::new(0.0, -0.01, 0.01, 0.0);
        let north = BoundingBox::new(0.0, 60.0, 0.01, 60.01);
        let ratio = approx_area_m2(&north) / approx_area_m2(&equator);
        assert!(approx_eq(ratio, 0.5, 0.01));
    }

    #[test]
    fn test_square_around_is_square_on_ground() {
        let tile = square_around(42.36, -71.06, 125.0);
        let (lng, lat) = centroid(&tile);
        assert!(approx_eq(lat, 42.36, 1e-9));
        assert!(approx_eq(lng, -71.06, 1e-9));

        let side = approx_area_m2(&tile).sqrt();
        assert!(approx_eq(side, 125.0, 2.0));
    }
}
