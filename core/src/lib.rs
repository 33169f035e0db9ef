//! Core audit engine for culler.
//!
//! This crate inspects a flat directory of images against quality rules
//! (structural corruption, wrong color mode, wrong or non-square
//! dimensions, low entropy, near-duplication), aggregates the offenses
//! per file, and applies a configurable remedial action to offenders.
//! The CLI drives it through `inspect`, the reporting helpers, and
//! `sweep`; `ScanResult` is the hand-off between the phases.

pub mod clusterer;
pub mod detector;
pub mod entropy;
pub mod offense;
pub mod overseer;
pub mod progress;
pub mod reporting;
pub mod sweep;
pub mod thumbnails;
pub mod validator;

pub use clusterer::{HashBuckets, HashCluster};
pub use detector::{fingerprint, hamming_distance, Fingerprint, HashKind};
pub use entropy::shannon_entropy;
pub use offense::Offense;
pub use overseer::{count_files, inspect, list_files, FileRecord, ScanConfig, ScanResult};
pub use reporting::{
    print_summary, write_entropy_log, write_hash_log, write_json, ReportingError,
};
pub use sweep::{sweep, Action, SweepFailure, SweepStats};
pub use thumbnails::{ThumbnailError, ThumbnailWriter};
pub use validator::{ValidatedImage, Validator, Verdict};
