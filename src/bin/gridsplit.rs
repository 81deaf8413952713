//! Command line front end over a dataset laid out as
//! `<dataset>/splits/<city>/samples.csv`.
//!
//! Usage: cargo run --release --features cli --bin gridsplit -- split --dataset dataset --seed 42

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use gridsplit::manifest::{write_split, DEFAULT_GROUND_IMAGE_LIMIT};
use gridsplit::split::split_manifest;
use gridsplit::{
    build_density_grid, cities, AnalysisConfig, BoundingBox, CityRegion, CityReport, Manifest, ManifestOptions,
    PartitionMap, SplitConfig,
};

#[derive(Parser, Debug)]
#[command(name = "gridsplit")]
#[command(about = "Spatial train/validation/test splits and overlap metrics for aerial/ground datasets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write train/validation/test manifests for every city
    Split(SplitArgs),
    /// Compute coverage, redundancy and distribution metrics
    Metrics(MetricsArgs),
    /// Count samples per grid cell
    Heatmap(HeatmapArgs),
    /// Drop missing ground images and cap ground images per sample
    Prune(PruneArgs),
}

#[derive(Args, Debug)]
struct DatasetArgs {
    /// Dataset root containing `splits/<city>/samples.csv`
    #[arg(short, long, default_value = "dataset")]
    dataset: PathBuf,

    /// Only process these cities (folder names)
    #[arg(long)]
    city: Vec<String>,

    /// Manifests have no header row
    #[arg(long)]
    no_header: bool,

    /// Region `min_x,min_y,max_x,max_y` for city folders not in the built-in list
    #[arg(long, value_parser = parse_bounds)]
    bounds: Option<BoundingBox>,
}

impl DatasetArgs {
    fn manifest_options(&self) -> ManifestOptions {
        ManifestOptions {
            has_header: !self.no_header,
            ..ManifestOptions::default()
        }
    }

    fn splits_dir(&self) -> PathBuf {
        self.dataset.join("splits")
    }

    /// City folders under `splits/` that resolve to a known region
    fn cities(&self) -> anyhow::Result<Vec<(PathBuf, CityRegion)>> {
        let splits = self.splits_dir();
        let mut found = Vec::new();
        for entry in fs::read_dir(&splits).with_context(|| format!("reading {}", splits.display()))? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let folder = entry.file_name().to_string_lossy().into_owned();
            if !self.city.is_empty() && !self.city.contains(&folder) {
                continue;
            }
            match cities::lookup(&folder) {
                Some(region) => found.push((entry.path(), region)),
                None => match self.bounds {
                    Some(bounds) => found.push((entry.path(), CityRegion::new(folder, bounds))),
                    None => warn!("Skipping {}: unknown city and no --bounds given", folder),
                },
            }
        }
        found.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(found)
    }
}

#[derive(Args, Debug)]
struct SplitArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// JSON split config; overrides the flags below
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid cells per side
    #[arg(short, long, default_value = "20")]
    grid: usize,

    /// Fraction of cells used for training
    #[arg(long, default_value = "0.7")]
    train: f64,

    /// Fraction of cells used for testing
    #[arg(long, default_value = "0.1")]
    test: f64,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Copy the input header row into train/validation/test files
    #[arg(long)]
    split_header: bool,
}

#[derive(Args, Debug)]
struct MetricsArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Overlap fraction above which samples count as near-duplicates
    #[arg(short, long, default_value = "0.8")]
    threshold: f64,

    /// Number of most redundant samples to print
    #[arg(long, default_value = "10")]
    top: usize,
}

#[derive(Args, Debug)]
struct HeatmapArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Grid cells per side
    #[arg(short, long, default_value = "100")]
    grid: usize,
}

#[derive(Args, Debug)]
struct PruneArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Maximum ground images kept per sample
    #[arg(long, default_value_t = DEFAULT_GROUND_IMAGE_LIMIT)]
    limit: usize,

    /// Random seed for choosing which ground images to drop
    #[arg(short, long, default_value = "42")]
    seed: u64,
}

fn parse_bounds(s: &str) -> Result<BoundingBox, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{:?}: {}", v, e)))
        .collect::<Result<_, _>>()?;
    let [min_x, min_y, max_x, max_y] = values[..] else {
        return Err(format!("expected 4 comma-separated values, got {}", values.len()));
    };
    let bbox = BoundingBox::new(min_x, min_y, max_x, max_y);
    if !bbox.is_well_formed() {
        return Err("bounds must be finite with min < max".to_string());
    }
    Ok(bbox)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Split(args) => run_split(&args),
        Command::Metrics(args) => run_metrics(&args),
        Command::Heatmap(args) => run_heatmap(&args),
        Command::Prune(args) => run_prune(&args),
    }
}

fn load_split_config(args: &SplitArgs) -> anyhow::Result<SplitConfig> {
    if let Some(path) = &args.config {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()));
    }
    Ok(SplitConfig {
        cells_per_side: args.grid,
        train_ratio: args.train,
        test_ratio: args.test,
        seed: args.seed,
    })
}

fn run_split(args: &SplitArgs) -> anyhow::Result<()> {
    let config = load_split_config(args)?;
    let partitions = PartitionMap::from_config(&config)?;
    let options = ManifestOptions {
        split_header: args.split_header,
        ..args.dataset.manifest_options()
    };

    let partition_path = args.dataset.splits_dir().join("partition.json");
    fs::write(&partition_path, serde_json::to_string_pretty(&partitions)?)
        .with_context(|| format!("writing {}", partition_path.display()))?;
    info!("Wrote cell partition to {}", partition_path.display());

    let cities = args.dataset.cities()?;
    if cities.is_empty() {
        bail!("no known cities under {}", args.dataset.splits_dir().display());
    }

    for (dir, region) in cities {
        let manifest = match read_city_manifest(&dir, &options)? {
            Some(m) => m,
            None => continue,
        };
        let result = split_manifest(&region, &partitions, &manifest);
        write_split(&dir, &result, manifest.header.as_deref(), &options)
            .with_context(|| format!("writing splits for {}", region.name))?;

        println!(
            "{}: {} train, {} validation, {} test, {:.2}% unused, {} unparseable",
            region.name,
            result.train.len(),
            result.validation.len(),
            result.test.len(),
            result.unused_percentage(),
            result.unparseable_count
        );
    }
    Ok(())
}

fn run_metrics(args: &MetricsArgs) -> anyhow::Result<()> {
    let config = AnalysisConfig {
        overlap_threshold: args.threshold,
        ..AnalysisConfig::default()
    };
    config.validate()?;
    let options = args.dataset.manifest_options();

    for (dir, region) in args.dataset.cities()? {
        let manifest = match read_city_manifest(&dir, &options)? {
            Some(m) => m,
            None => continue,
        };
        let report = CityReport::compute(&region.name, &manifest.samples, &config);

        let out = dir.join("metrics.json");
        fs::write(&out, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", out.display()))?;

        println!(
            "{}: {} samples, density {:.1}/deg², diversity {:.3}, {} redundant (max {})",
            region.name,
            report.sample_count,
            report.density,
            report.mean_ground_image_diversity,
            report.redundant_samples,
            report.max_redundancy
        );
        for entry in report.redundancy.iter().take(args.top).filter(|e| e.score > 0) {
            println!("  {:>4}  {}", entry.score, entry.key);
        }
    }
    Ok(())
}

fn run_heatmap(args: &HeatmapArgs) -> anyhow::Result<()> {
    if args.grid == 0 {
        bail!("--grid must be at least 1");
    }
    let options = args.dataset.manifest_options();

    for (dir, region) in args.dataset.cities()? {
        let manifest = match read_city_manifest(&dir, &options)? {
            Some(m) => m,
            None => continue,
        };
        let density = build_density_grid(&region, args.grid, &manifest.samples);

        let out = dir.join("cell_counts.csv");
        let mut wtr = csv::Writer::from_path(&out).with_context(|| format!("writing {}", out.display()))?;
        wtr.write_record(["i", "j", "center_x", "center_y", "count"])?;
        for cell in &density.cells {
            wtr.write_record(&[
                cell.cell.i.to_string(),
                cell.cell.j.to_string(),
                cell.center_x.to_string(),
                cell.center_y.to_string(),
                cell.count.to_string(),
            ])?;
        }
        wtr.flush()?;

        println!(
            "{}: max {} images per cell, {} cells with images",
            region.name,
            density.max_count,
            density.occupied_cells()
        );
    }
    Ok(())
}

fn run_prune(args: &PruneArgs) -> anyhow::Result<()> {
    let options = args.dataset.manifest_options();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for (dir, region) in args.dataset.cities()? {
        let mut manifest = match read_city_manifest(&dir, &options)? {
            Some(m) => m,
            None => continue,
        };

        let ground_dir = ground_dir_for(&args.dataset.dataset, &dir);
        let dropped_samples = if ground_dir.is_dir() {
            let on_disk = list_files(&ground_dir)?;
            manifest.retain_ground_images(&on_disk)
        } else {
            warn!("{}: no ground folder at {}, keeping all images", region.name, ground_dir.display());
            0
        };
        let dropped_images = manifest.limit_ground_images(args.limit, &mut rng);

        let path = dir.join("samples.csv");
        manifest
            .write_path(&path, &options)
            .with_context(|| format!("writing {}", path.display()))?;

        println!(
            "{}: dropped {} samples without images, {} images above limit {}",
            region.name, dropped_samples, dropped_images, args.limit
        );
    }
    Ok(())
}

/// `<dataset>/<city folder>/ground` for `<dataset>/splits/<city folder>`
fn ground_dir_for(dataset: &Path, city_dir: &Path) -> PathBuf {
    let folder = city_dir.file_name().unwrap_or_default();
    dataset.join(folder).join("ground")
}

fn list_files(dir: &Path) -> anyhow::Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        names.insert(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

fn read_city_manifest(dir: &Path, options: &ManifestOptions) -> anyhow::Result<Option<Manifest>> {
    let path = dir.join("samples.csv");
    if !path.exists() {
        warn!("Samples file not found at {}", path.display());
        return Ok(None);
    }
    let manifest = Manifest::read_path(&path, options).with_context(|| format!("reading {}", path.display()))?;
    Ok(Some(manifest))
}
