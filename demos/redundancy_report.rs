//! Example of scoring near-duplicate aerial tiles in parallel.
//!
//! Run with: cargo run --example redundancy_report --features parallel

use std::time::Instant;

use gridsplit::metrics::{redundancy_ranking, redundancy_scores, redundancy_scores_parallel};
use gridsplit::{geo_utils, AnalysisConfig, CityReport, Sample};

fn main() {
    println!("Redundancy Report Example\n");

    // Overlapping 200 m tiles every ~50 m along a street, plus a sparse block
    let mut samples = Vec::new();
    for k in 0..400 {
        let lat = 48.8566 + (k / 40) as f64 * 0.0018;
        let lng = 2.3522 + (k % 40) as f64 * 0.0007;
        let bbox = geo_utils::square_around(lat, lng, 200.0);
        samples.push(Sample::from_bbox(bbox, vec![format!("street_{}.jpg", k)]));
    }
    for k in 0..50 {
        let lat = 48.80 + k as f64 * 0.005;
        let bbox = geo_utils::square_around(lat, 2.30, 200.0);
        samples.push(Sample::from_bbox(bbox, vec![format!("sparse_{}.jpg", k)]));
    }
    println!("Created {} samples\n", samples.len());

    let config = AnalysisConfig::default();

    let start = Instant::now();
    let sequential = redundancy_scores(&samples, config.overlap_threshold);
    println!("Sequential scoring: {:?}", start.elapsed());

    let start = Instant::now();
    let parallel = redundancy_scores_parallel(&samples, config.overlap_threshold);
    println!("Parallel scoring:   {:?}\n", start.elapsed());
    assert_eq!(sequential, parallel);

    println!("Most redundant samples (overlap > {}):", config.overlap_threshold);
    for entry in redundancy_ranking(&samples, config.overlap_threshold).iter().take(5) {
        println!("  {:>3}  {}", entry.score, entry.key);
    }

    let report = CityReport::compute("Paris", &samples, &config);
    println!("\nCoverage: {:.6} deg², density {:.1}/deg²", report.coverage_area, report.density);
    println!(
        "Area: mean {:.3e} deg², std {:.3e}",
        report.distribution.area.mean, report.distribution.area.std_dev
    );
    println!(
        "Centroid distance: mean {:.4} deg over {} pairs",
        report.distribution.centroid_distance.mean, report.distribution.centroid_distance.pairs
    );
}
