//! Sample manifests.
//!
//! A manifest is a CSV file with one sample per row. The first column is the
//! aerial image name, which encodes the tile's bounding box as
//! `aerial_<min_x>_<min_y>_<max_x>_<max_y>.png`; the remaining columns are the
//! ground-level image names. Rows are ragged.
//!
//! Rows whose aerial name cannot be parsed are skipped and counted rather than
//! failing the whole file. Split manifests are written by re-emitting the
//! original records, so coordinate text is never reformatted.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::{debug, info};
use rand::Rng;

use crate::split::{Partition, SplitResult};
use crate::{BoundingBox, Sample};

/// Ground images kept per sample by [`Manifest::limit_ground_images`] by default.
pub const DEFAULT_GROUND_IMAGE_LIMIT: usize = 25;

/// Errors from reading or writing manifests.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("aerial name {name:?} does not encode four coordinates")]
    BadAerialName { name: String },
    #[error("aerial name {name:?} has invalid coordinate {value:?}")]
    BadCoordinate { name: String, value: String },
}

/// How manifests are read and written.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManifestOptions {
    /// Treat the first row as a header. Default: true
    pub has_header: bool,
    /// Field delimiter. Default: b','
    pub delimiter: u8,
    /// Repeat the input header in train/validation/test files. Default: false
    pub split_header: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            split_header: false,
        }
    }
}

/// Canonical aerial image name for a box.
pub fn aerial_name(bbox: &BoundingBox) -> String {
    format!(
        "aerial_{}_{}_{}_{}.png",
        bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
    )
}

/// Parse the bounding box encoded in an aerial image name.
///
/// # Example
/// ```
/// use gridsplit::manifest::parse_aerial_name;
///
/// let bbox = parse_aerial_name("aerial_-71.06_42.35_-71.05_42.36.png").unwrap();
/// assert_eq!(bbox.min_x, -71.06);
/// assert_eq!(bbox.max_y, 42.36);
/// ```
pub fn parse_aerial_name(name: &str) -> Result<BoundingBox, ManifestError> {
    let stem = match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphabetic()) => stem,
        _ => name,
    };

    let parts: Vec<&str> = stem.split('_').skip(1).collect();
    if parts.len() != 4 {
        return Err(ManifestError::BadAerialName { name: name.to_string() });
    }

    let mut coords = [0.0_f64; 4];
    for (slot, part) in coords.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ManifestError::BadCoordinate {
                name: name.to_string(),
                value: part.to_string(),
            })?;
    }

    Ok(BoundingBox::new(coords[0], coords[1], coords[2], coords[3]))
}

/// Build a sample from a raw record.
fn sample_from_record(record: Vec<String>) -> Result<Sample, ManifestError> {
    let key = record
        .first()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| ManifestError::BadAerialName { name: String::new() })?;
    let bbox = parse_aerial_name(&key)?;
    let ground_ids = record
        .iter()
        .skip(1)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();

    Ok(Sample { key, bbox, ground_ids, record })
}

/// A parsed manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub header: Option<Vec<String>>,
    pub samples: Vec<Sample>,
    /// Rows skipped because they could not be parsed
    pub unparseable: usize,
}

impl Manifest {
    /// Read a manifest file.
    pub fn read_path(path: impl AsRef<Path>, options: &ManifestOptions) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let manifest = Self::from_reader(File::open(path)?, options)?;
        info!(
            "Loaded {} samples from {} ({} unparseable)",
            manifest.samples.len(),
            path.display(),
            manifest.unparseable
        );
        Ok(manifest)
    }

    /// Read a manifest from any reader.
    pub fn from_reader<R: Read>(reader: R, options: &ManifestOptions) -> Result<Self, ManifestError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(options.has_header)
            .delimiter(options.delimiter)
            .flexible(true)
            .from_reader(reader);

        let header = if options.has_header {
            Some(rdr.headers()?.iter().map(|s| s.to_string()).collect())
        } else {
            None
        };

        let mut manifest = Manifest { header, ..Manifest::default() };

        for (row, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    debug!("Skipping row {}: {}", row, err);
                    manifest.unparseable += 1;
                    continue;
                }
            };

            match sample_from_record(record.iter().map(|s| s.to_string()).collect()) {
                Ok(sample) => manifest.samples.push(sample),
                Err(err) => {
                    debug!("Skipping row {}: {}", row, err);
                    manifest.unparseable += 1;
                }
            }
        }

        Ok(manifest)
    }

    /// Drop ground images not in `keep`, then drop samples left without any.
    ///
    /// Returns the number of samples removed.
    pub fn retain_ground_images(&mut self, keep: &HashSet<String>) -> usize {
        for sample in &mut self.samples {
            let before = sample.ground_ids.len();
            sample.ground_ids.retain(|id| keep.contains(id));
            if sample.ground_ids.len() != before {
                sample.sync_record();
            }
        }
        let before = self.samples.len();
        self.samples.retain(|s| !s.ground_ids.is_empty());
        before - self.samples.len()
    }

    /// Randomly drop ground images from samples that have more than `max`.
    ///
    /// Surviving images keep their order. Returns the number of images removed.
    pub fn limit_ground_images<R: Rng + ?Sized>(&mut self, max: usize, rng: &mut R) -> usize {
        let mut removed = 0;
        for sample in &mut self.samples {
            let len = sample.ground_ids.len();
            if len <= max {
                continue;
            }
            let drop: HashSet<usize> = rand::seq::index::sample(rng, len, len - max).into_iter().collect();
            let mut idx = 0;
            sample.ground_ids.retain(|_| {
                let keep = !drop.contains(&idx);
                idx += 1;
                keep
            });
            sample.sync_record();
            removed += len - max;
        }
        removed
    }

    /// Write the manifest back out.
    pub fn write<W: Write>(&self, writer: W, options: &ManifestOptions) -> Result<(), ManifestError> {
        write_samples(writer, self.header.as_deref(), &self.samples, options)
    }

    /// Replace the file at `path` with this manifest.
    ///
    /// Writes to a temporary file in the same directory and renames it over
    /// `path`, so a failed write leaves the old file intact.
    pub fn write_path(&self, path: impl AsRef<Path>, options: &ManifestOptions) -> Result<(), ManifestError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        self.write(tmp.as_file_mut(), options)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!("Wrote {} samples to {}", self.samples.len(), path.display());
        Ok(())
    }
}

/// Write samples as manifest records, with an optional header row.
pub fn write_samples<W: Write>(
    writer: W,
    header: Option<&[String]>,
    samples: &[Sample],
    options: &ManifestOptions,
) -> Result<(), ManifestError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_writer(writer);

    if let Some(header) = header {
        wtr.write_record(header)?;
    }
    for sample in samples {
        wtr.write_record(&sample.record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `train.csv`, `validation.csv` and `test.csv` for a split into `dir`.
///
/// Split files hold sample rows only unless `options.split_header` is set.
pub fn write_split(
    dir: impl AsRef<Path>,
    result: &SplitResult,
    header: Option<&[String]>,
    options: &ManifestOptions,
) -> Result<(), ManifestError> {
    let dir = dir.as_ref();
    let header = header.filter(|_| options.split_header);
    for partition in Partition::ALL {
        let path = dir.join(format!("{}.csv", partition.as_str()));
        write_samples(File::create(&path)?, header, result.partition(partition), options)?;
        debug!("Wrote {} samples to {}", result.partition(partition).len(), path.display());
    }
    Ok(())
}
