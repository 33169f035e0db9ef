use crate::overseer::ScanResult;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct FileReport {
    filename: String,
    offenses: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entropy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
}

#[derive(Serialize)]
struct ClusterReport {
    fingerprint: String,
    files: Vec<String>,
}

#[derive(Serialize)]
struct AuditReport {
    files_inspected: usize,
    offending_files: usize,
    files: Vec<FileReport>,
    duplicate_clusters: Vec<ClusterReport>,
}

#[derive(Debug)]
pub enum ReportingError {
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    Serialization(serde_json::Error),
}

impl Display for ReportingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => write!(f, "io error for {}: {}", path.display(), source),
            Self::Serialization(error) => write!(f, "serialization error: {}", error),
        }
    }
}

impl Error for ReportingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialization(error) => Some(error),
        }
    }
}

/// Prints the offender tally and its share of the inspected files.
pub fn print_summary(result: &ScanResult) {
    let offending = result.offending_files();
    let total = result.files_inspected;
    let percentage = if total == 0 {
        0.0
    } else {
        offending as f64 / total as f64 * 100.0
    };
    println!(
        "{} offending files out of {} total, i.e. {:.1} %",
        offending, total, percentage
    );
}

/// Writes `entropy.txt`: one `<filename> <entropy>` line per measured
/// file, sorted by filename.
pub fn write_entropy_log(result: &ScanResult, aux_dir: &Path) -> Result<PathBuf, ReportingError> {
    let path = aux_dir.join("entropy.txt");
    let mut writer = create(&path)?;

    let mut measured: Vec<(&str, f64)> = result
        .records
        .iter()
        .filter_map(|(name, record)| record.entropy.map(|entropy| (name.as_str(), entropy)))
        .collect();
    measured.sort_by(|left, right| left.0.cmp(right.0));

    for (filename, entropy) in measured {
        writeln!(writer, "{} {}", filename, entropy).map_err(|source| ReportingError::Io {
            source,
            path: path.clone(),
        })?;
    }
    Ok(path)
}

/// Writes `hashes.txt`: one `<hash> <file> <file> ...` line per cluster
/// of two or more members, in cluster order.
pub fn write_hash_log(result: &ScanResult, aux_dir: &Path) -> Result<PathBuf, ReportingError> {
    let path = aux_dir.join("hashes.txt");
    let mut writer = create(&path)?;

    for cluster in result.duplicate_clusters() {
        writeln!(
            writer,
            "{:016x} {}",
            cluster.fingerprint,
            cluster.files.join(" ")
        )
        .map_err(|source| ReportingError::Io {
            source,
            path: path.clone(),
        })?;
    }
    Ok(path)
}

/// Writes the machine-readable audit summary.
pub fn write_json(result: &ScanResult, output_path: &Path) -> Result<(), ReportingError> {
    let mut files: Vec<FileReport> = result
        .records
        .iter()
        .map(|(name, record)| FileReport {
            filename: name.clone(),
            offenses: record.offenses.names(),
            entropy: record.entropy,
            fingerprint: record.fingerprint.map(|fp| format!("{:016x}", fp)),
        })
        .collect();
    files.sort_by(|left, right| left.filename.cmp(&right.filename));

    let report = AuditReport {
        files_inspected: result.files_inspected,
        offending_files: result.offending_files(),
        files,
        duplicate_clusters: result
            .duplicate_clusters()
            .map(|cluster| ClusterReport {
                fingerprint: format!("{:016x}", cluster.fingerprint),
                files: cluster.files.clone(),
            })
            .collect(),
    };

    let writer = create(output_path)?;
    serde_json::to_writer_pretty(writer, &report).map_err(ReportingError::Serialization)
}

fn create(path: &Path) -> Result<BufWriter<File>, ReportingError> {
    let file = File::create(path).map_err(|source| ReportingError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    Ok(BufWriter::new(file))
}
