use crate::overseer::ScanResult;
use indicatif::ProgressBar;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Remedial action applied to every offending file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Report only; leave the file on disk.
    List,
    /// Delete the file.
    Remove,
}

impl Action {
    /// Resolves a configuration name. Unknown names are rejected so an
    /// unsupported action fails before any file is processed.
    pub fn parse(name: &str) -> Option<Action> {
        match name {
            "list" => Some(Action::List),
            "remove" => Some(Action::Remove),
            _ => None,
        }
    }

    pub fn apply(self, path: &Path) -> std::io::Result<()> {
        match self {
            Action::List => Ok(()),
            Action::Remove => fs::remove_file(path),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::List => write!(f, "list"),
            Action::Remove => write!(f, "remove"),
        }
    }
}

/// One file the action could not be applied to. The sweep records it and
/// moves on.
#[derive(Debug)]
pub struct SweepFailure {
    pub path: PathBuf,
    pub error: std::io::Error,
}

impl Display for SweepFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to sweep {}: {}", self.path.display(), self.error)
    }
}

#[derive(Debug, Default)]
pub struct SweepStats {
    pub swept: usize,
    pub failures: Vec<SweepFailure>,
}

/// Applies `action` exactly once per offending filename, however many
/// offenses the record carries. Failures never abort the remaining sweep.
pub fn sweep(
    result: &ScanResult,
    base_dir: &Path,
    action: Action,
    progress_bar: &ProgressBar,
) -> SweepStats {
    let mut offenders: Vec<&str> = result.offenders().map(|(name, _)| name).collect();
    offenders.sort_unstable();

    let mut stats = SweepStats::default();
    for filename in offenders {
        let full_path = base_dir.join(filename);
        progress_bar.inc(1);
        progress_bar.set_message(format!("Sweeping: {}", filename));
        match action.apply(&full_path) {
            Ok(()) => stats.swept += 1,
            Err(error) => stats.failures.push(SweepFailure {
                path: full_path,
                error,
            }),
        }
    }
    stats
}
