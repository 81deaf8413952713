//! Basic example of splitting one city's samples into train/validation/test.
//!
//! Run with: cargo run --example basic_split

use gridsplit::{
    cities, classify_sample, geo_utils, split_samples, PartitionMap, Sample, SampleClass,
    SplitConfig,
};

fn main() {
    let boston = cities::lookup("Boston").expect("Boston is a built-in city");
    println!("City: {} {:?}\n", boston.name, boston.bounds);

    // 150 m aerial tiles on a coarse lattice across the city
    let mut samples = Vec::new();
    let (lat0, lng0) = (boston.bounds.min_y, boston.bounds.min_x);
    for row in 0..12 {
        for col in 0..12 {
            let lat = lat0 + 0.01 + row as f64 * 0.011;
            let lng = lng0 + 0.01 + col as f64 * 0.016;
            let bbox = geo_utils::square_around(lat, lng, 150.0);
            let ground = (0..(row + col) % 5).map(|k| format!("g_{}_{}_{}.jpg", row, col, k)).collect();
            samples.push(Sample::from_bbox(bbox, ground));
        }
    }

    let config = SplitConfig {
        cells_per_side: 10,
        seed: Some(42),
        ..SplitConfig::default()
    };
    let partitions = PartitionMap::from_config(&config).expect("default ratios are valid");

    println!(
        "Config: {}x{} grid, train={}, validation={:.1}, test={}\n",
        config.cells_per_side,
        config.cells_per_side,
        config.train_ratio,
        config.validation_ratio(),
        config.test_ratio
    );

    let result = split_samples(&boston, &partitions, &samples);
    println!("Train:      {}", result.train.len());
    println!("Validation: {}", result.validation.len());
    println!("Test:       {}", result.test.len());
    println!("Unused:     {} ({:.2}%)\n", result.unused_count, result.unused_percentage());

    let grid = boston.grid(config.cells_per_side);
    let first = &samples[0];
    match classify_sample(&grid, &partitions, &first.bbox) {
        SampleClass::Assigned(partition) => println!("{} -> {}", first.key, partition),
        SampleClass::Unused => println!("{} straddles a partition border", first.key),
    }
}
