use crate::clusterer::{HashBuckets, HashCluster};
use crate::detector::{self, Fingerprint, HashKind};
use crate::entropy;
use crate::offense::Offense;
use crate::validator::{Validator, Verdict};
use indicatif::ProgressBar;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Parameters that control one audit pass over a directory.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub base_dir: PathBuf,
    pub expected_mode: String,
    pub side_length: u32,
    pub check_entropy: bool,
    pub entropy_threshold: f64,
    pub check_hash: bool,
    pub hash: HashKind,
    pub soft_hash: bool,
    pub soft_hash_threshold: u32,
}

impl ScanConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            expected_mode: String::from("RGB"),
            side_length: 512,
            check_entropy: false,
            entropy_threshold: 3.0,
            check_hash: false,
            hash: HashKind::Dhash,
            soft_hash: false,
            soft_hash_threshold: 8,
        }
    }

    pub fn with_expected_mode(mut self, mode: String) -> Self {
        self.expected_mode = mode;
        self
    }

    pub fn with_side_length(mut self, side_length: u32) -> Self {
        self.side_length = side_length;
        self
    }

    pub fn with_entropy_check(mut self, enabled: bool, threshold: f64) -> Self {
        self.check_entropy = enabled;
        self.entropy_threshold = threshold;
        self
    }

    pub fn with_hash_check(mut self, enabled: bool, hash: HashKind) -> Self {
        self.check_hash = enabled;
        self.hash = hash;
        self
    }

    pub fn with_soft_hash(mut self, enabled: bool, threshold: u32) -> Self {
        self.soft_hash = enabled;
        self.soft_hash_threshold = threshold;
        self
    }
}

/// Everything the audit learned about one file. The record stays even if
/// the sweep later removes the file it describes.
#[derive(Debug, Clone, Default)]
pub struct FileRecord {
    pub offenses: Offense,
    pub entropy: Option<f64>,
    pub fingerprint: Option<Fingerprint>,
}

/// Aggregate state of one completed audit, read-only to reporting and
/// sweeping.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files_inspected: usize,
    pub records: FxHashMap<String, FileRecord>,
    pub clusters: Vec<HashCluster>,
}

impl ScanResult {
    /// Number of distinct files carrying at least one offense.
    pub fn offending_files(&self) -> usize {
        self.offenders().count()
    }

    pub fn offenders(&self) -> impl Iterator<Item = (&str, &FileRecord)> {
        self.records
            .iter()
            .filter(|(_, record)| !record.offenses.is_empty())
            .map(|(name, record)| (name.as_str(), record))
    }

    /// Clusters with at least two members.
    pub fn duplicate_clusters(&self) -> impl Iterator<Item = &HashCluster> {
        self.clusters.iter().filter(|cluster| cluster.files.len() > 1)
    }

    fn add_offense(&mut self, filename: &str, offense: Offense) {
        self.records
            .entry(filename.to_string())
            .or_default()
            .offenses |= offense;
    }
}

/// Lists the regular files directly inside `base_dir`, sorted by name.
///
/// The scan is flat by contract and the soft merge is order-dependent, so
/// a stable listing order keeps repeated runs identical.
pub fn list_files(base_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(base_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .collect();
    names.sort();
    names
}

pub fn count_files(base_dir: &Path) -> u64 {
    list_files(base_dir).len() as u64
}

/// Runs the inspecting pass and then the clustering pass, in that order,
/// and returns the aggregate result.
///
/// Per file the sequence is validation, then fingerprint collection, then
/// entropy. Structural failure short-circuits everything for that file; a
/// mode or size mismatch short-circuits the remaining checks as well.
/// Fingerprint and entropy each reopen the file, and a load failure at
/// either stage marks the record corrupt without stopping the scan.
pub fn inspect(config: &ScanConfig, progress_bar: &ProgressBar) -> ScanResult {
    let validator = Validator::new(config.expected_mode.clone(), config.side_length);
    let mut result = ScanResult::default();
    let mut buckets = HashBuckets::default();

    for filename in list_files(&config.base_dir) {
        result.files_inspected += 1;
        progress_bar.inc(1);
        progress_bar.set_message(format!("Inspecting: {}", filename));

        let full_path = config.base_dir.join(&filename);
        match validator.inspect(&full_path) {
            Verdict::Valid(_) => {}
            Verdict::Offending(offense) => {
                if offense.contains(Offense::CORRUPT) {
                    progress_bar.set_message(format!("Did not open or verify: {}", filename));
                }
                result.add_offense(&filename, offense);
                continue;
            }
        }

        if config.check_hash {
            match detector::fingerprint(&full_path, config.hash) {
                Ok(fingerprint) => {
                    buckets.insert(fingerprint, filename.clone());
                    result
                        .records
                        .entry(filename.clone())
                        .or_default()
                        .fingerprint = Some(fingerprint);
                }
                Err(_) => {
                    progress_bar.set_message(format!("Did not load for hashing: {}", filename));
                    result.add_offense(&filename, Offense::CORRUPT);
                }
            }
        }

        if config.check_entropy {
            match entropy::measure(&full_path) {
                Ok(score) => {
                    let record = result.records.entry(filename.clone()).or_default();
                    record.entropy = Some(score);
                    if score < config.entropy_threshold {
                        record.offenses |= Offense::ENTROPY;
                    }
                }
                Err(_) => {
                    progress_bar.set_message(format!("Did not load for entropy: {}", filename));
                    result.add_offense(&filename, Offense::CORRUPT);
                }
            }
        }

        // Clean files still get a record so the audit is complete.
        result.records.entry(filename).or_default();
    }

    let soft_threshold = config.soft_hash.then_some(config.soft_hash_threshold);
    result.clusters = buckets.into_clusters(soft_threshold);

    for cluster in &result.clusters {
        if cluster.files.len() < 2 {
            continue;
        }
        // The first member is the keeper; everyone after it offends.
        for filename in cluster.files.iter().skip(1) {
            result
                .records
                .entry(filename.clone())
                .or_default()
                .offenses |= Offense::DUPLICATE;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const SIDE: u32 = 64;

    fn config(base_dir: &Path) -> ScanConfig {
        ScanConfig::new(base_dir.to_path_buf()).with_side_length(SIDE)
    }

    fn write_flat(path: &Path, level: u8) {
        RgbImage::from_pixel(SIDE, SIDE, Rgb([level, level, level]))
            .save(path)
            .unwrap();
    }

    // Odd seeds ramp horizontally, even seeds vertically, so images with
    // different parity get distant fingerprints while equal seeds match.
    fn write_textured(path: &Path, seed: u32) {
        let image = RgbImage::from_fn(SIDE, SIDE, |x, y| {
            let value = if seed % 2 == 0 {
                (y * 4 + seed) % 256
            } else {
                (x * 4 + seed) % 256
            };
            Rgb([value as u8, value as u8, value as u8])
        });
        image.save(path).unwrap();
    }

    fn offenses(result: &ScanResult, filename: &str) -> Offense {
        result.records.get(filename).map(|r| r.offenses).unwrap_or_default()
    }

    #[test]
    fn clean_directory_has_no_offenders() {
        let dir = tempdir().unwrap();
        write_textured(&dir.path().join("a.png"), 1);
        write_textured(&dir.path().join("b.png"), 2);

        let config = config(dir.path())
            .with_entropy_check(true, 3.0)
            .with_hash_check(true, HashKind::Dhash);
        let result = inspect(&config, &ProgressBar::hidden());

        assert_eq!(result.files_inspected, 2);
        assert_eq!(result.offending_files(), 0);
        assert!(result.records["a.png"].entropy.is_some());
        assert!(result.records["a.png"].fingerprint.is_some());
    }

    #[test]
    fn corrupt_file_carries_exactly_corrupt() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();

        let config = config(dir.path())
            .with_entropy_check(true, 3.0)
            .with_hash_check(true, HashKind::Dhash);
        let result = inspect(&config, &ProgressBar::hidden());

        let record = &result.records["broken.png"];
        assert_eq!(record.offenses, Offense::CORRUPT);
        assert!(record.entropy.is_none());
        assert!(record.fingerprint.is_none());
    }

    #[test]
    fn mode_mismatch_skips_later_checks() {
        let dir = tempdir().unwrap();
        image::GrayImage::from_pixel(SIDE, SIDE, image::Luma([9]))
            .save(dir.path().join("gray.png"))
            .unwrap();

        let config = config(dir.path())
            .with_entropy_check(true, 3.0)
            .with_hash_check(true, HashKind::Dhash);
        let result = inspect(&config, &ProgressBar::hidden());

        let record = &result.records["gray.png"];
        assert_eq!(record.offenses, Offense::MODE);
        assert!(record.entropy.is_none());
        assert!(record.fingerprint.is_none());
    }

    #[test]
    fn size_mismatch_is_flagged_alone() {
        let dir = tempdir().unwrap();
        RgbImage::from_pixel(SIDE, SIDE / 2, Rgb([1, 2, 3]))
            .save(dir.path().join("short.png"))
            .unwrap();

        let result = inspect(&config(dir.path()), &ProgressBar::hidden());
        assert_eq!(offenses(&result, "short.png"), Offense::SIZE);
    }

    #[test]
    fn exact_duplicates_keep_the_first_member() {
        let dir = tempdir().unwrap();
        // a, b, c identical; d different. Name order drives insertion.
        write_textured(&dir.path().join("a.png"), 5);
        write_textured(&dir.path().join("b.png"), 5);
        write_textured(&dir.path().join("c.png"), 5);
        write_flat(&dir.path().join("d.png"), 128);

        let config = config(dir.path()).with_hash_check(true, HashKind::Dhash);
        let result = inspect(&config, &ProgressBar::hidden());

        assert!(offenses(&result, "a.png").is_empty());
        assert_eq!(offenses(&result, "b.png"), Offense::DUPLICATE);
        assert_eq!(offenses(&result, "c.png"), Offense::DUPLICATE);
        assert!(offenses(&result, "d.png").is_empty());

        let clusters: Vec<_> = result.duplicate_clusters().collect();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].files, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn entropy_threshold_is_strictly_below() {
        let dir = tempdir().unwrap();
        write_flat(&dir.path().join("flat.png"), 200);

        // Flat image scores 0.0: flagged below a positive threshold,
        // passes when the threshold equals the score.
        let flagging = config(dir.path()).with_entropy_check(true, 3.0);
        let result = inspect(&flagging, &ProgressBar::hidden());
        assert_eq!(offenses(&result, "flat.png"), Offense::ENTROPY);
        assert_eq!(result.records["flat.png"].entropy, Some(0.0));

        let boundary = config(dir.path()).with_entropy_check(true, 0.0);
        let result = inspect(&boundary, &ProgressBar::hidden());
        assert!(offenses(&result, "flat.png").is_empty());
    }

    #[test]
    fn entropy_and_duplicate_offenses_combine() {
        let dir = tempdir().unwrap();
        write_flat(&dir.path().join("a.png"), 60);
        write_flat(&dir.path().join("b.png"), 60);

        let config = config(dir.path())
            .with_entropy_check(true, 3.0)
            .with_hash_check(true, HashKind::Dhash);
        let result = inspect(&config, &ProgressBar::hidden());

        assert_eq!(offenses(&result, "a.png"), Offense::ENTROPY);
        assert_eq!(
            offenses(&result, "b.png"),
            Offense::ENTROPY | Offense::DUPLICATE
        );
        assert_eq!(result.offending_files(), 2);
    }

    #[test]
    fn rescanning_an_unmodified_directory_is_idempotent() {
        let dir = tempdir().unwrap();
        write_textured(&dir.path().join("a.png"), 3);
        write_textured(&dir.path().join("b.png"), 3);
        write_flat(&dir.path().join("c.png"), 10);
        fs::write(dir.path().join("junk.png"), b"junk").unwrap();

        let config = config(dir.path())
            .with_entropy_check(true, 3.0)
            .with_hash_check(true, HashKind::Dhash);
        let first = inspect(&config, &ProgressBar::hidden());
        let second = inspect(&config, &ProgressBar::hidden());

        assert_eq!(first.files_inspected, second.files_inspected);
        assert_eq!(first.records.len(), second.records.len());
        for (name, record) in &first.records {
            assert_eq!(record.offenses, second.records[name].offenses);
        }
    }
}
