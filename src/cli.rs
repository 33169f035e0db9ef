use culler_core::{Action, HashKind};
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const USAGE: &str = "\
usage: culler <directory> [options]

options:
  --mode=MODE                expected color mode (default RGB)
  --action=list|remove       what to do with offending files (default list)
  --hash=dhash               perceptual hash algorithm (default dhash)
  --size=N                   expected square side length (default 512)
  --aux=DIR                  auxiliary report directory (default /tmp/checks)
  --no-aux                   disable auxiliary reports
  --entropy=X                entropy threshold (default 3.0)
  --check-entropy            flag files with entropy below the threshold
  --check-hash               flag duplicate files by perceptual hash
  --soft-hash                merge clusters within the soft threshold
  --soft-hash-threshold=N    hamming distance for soft merging (default 8)
  --thumbnail-size=N         thumbnail side length (default 256)
  --create-thumbnails        render low-entropy and duplicate thumbnails
  --help                     print this help";

/// Fully resolved configuration for one run. Every recognized option has
/// a default; unsupported action or hash names are rejected here, before
/// any file is touched.
#[derive(Debug, PartialEq)]
pub struct CliConfig {
    pub root: PathBuf,
    pub mode: String,
    pub action: Action,
    pub hash: HashKind,
    pub side_length: u32,
    pub aux_dir: Option<PathBuf>,
    pub entropy_threshold: f64,
    pub check_entropy: bool,
    pub check_hash: bool,
    pub soft_hash: bool,
    pub soft_hash_threshold: u32,
    pub thumbnail_size: u32,
    pub create_thumbnails: bool,
}

#[derive(Debug)]
pub enum CliError {
    Help,
    MissingRoot,
    InvalidFlag(String),
    InvalidValue { flag: &'static str, value: String },
    UnsupportedAction(String),
    UnsupportedHash(String),
}

impl CliConfig {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_iter(env::args().skip(1))
    }

    pub fn from_iter<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut root: Option<PathBuf> = None;
        let mut mode = String::from("RGB");
        let mut action = Action::List;
        let mut hash = HashKind::Dhash;
        let mut side_length: u32 = 512;
        let mut aux_dir: Option<PathBuf> = Some(PathBuf::from("/tmp/checks"));
        let mut entropy_threshold: f64 = 3.0;
        let mut check_entropy = false;
        let mut check_hash = false;
        let mut soft_hash = false;
        let mut soft_hash_threshold: u32 = 8;
        let mut thumbnail_size: u32 = 256;
        let mut create_thumbnails = false;

        for arg in args {
            if arg.starts_with("--") {
                if arg == "--help" {
                    return Err(CliError::Help);
                }
                if arg == "--no-aux" {
                    aux_dir = None;
                    continue;
                }
                if arg == "--check-entropy" {
                    check_entropy = true;
                    continue;
                }
                if arg == "--check-hash" {
                    check_hash = true;
                    continue;
                }
                if arg == "--soft-hash" {
                    soft_hash = true;
                    continue;
                }
                if arg == "--create-thumbnails" {
                    create_thumbnails = true;
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--mode=") {
                    mode = value.to_string();
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--action=") {
                    action =
                        Action::parse(value).ok_or_else(|| CliError::UnsupportedAction(value.to_string()))?;
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--hash=") {
                    hash = HashKind::parse(value)
                        .ok_or_else(|| CliError::UnsupportedHash(value.to_string()))?;
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--size=") {
                    side_length = parse_number(value, "--size")?;
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--aux=") {
                    aux_dir = Some(PathBuf::from(value));
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--entropy=") {
                    entropy_threshold = parse_number(value, "--entropy")?;
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--soft-hash-threshold=") {
                    soft_hash_threshold = parse_number(value, "--soft-hash-threshold")?;
                    continue;
                }
                if let Some(value) = arg.strip_prefix("--thumbnail-size=") {
                    thumbnail_size = parse_number(value, "--thumbnail-size")?;
                    continue;
                }
                return Err(CliError::InvalidFlag(arg));
            }

            if root.is_none() {
                root = Some(PathBuf::from(&arg));
                continue;
            }

            return Err(CliError::InvalidFlag(arg));
        }

        let root = root.ok_or(CliError::MissingRoot)?;

        Ok(Self {
            root,
            mode,
            action,
            hash,
            side_length,
            aux_dir,
            entropy_threshold,
            check_entropy,
            check_hash,
            soft_hash,
            soft_hash_threshold,
            thumbnail_size,
            create_thumbnails,
        })
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &'static str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Help => write!(f, "{}", USAGE),
            Self::MissingRoot => write!(f, "base directory argument is required"),
            Self::InvalidFlag(flag) => write!(f, "unrecognized argument: {}", flag),
            Self::InvalidValue { flag, value } => {
                write!(f, "invalid value for {}: {}", flag, value)
            }
            Self::UnsupportedAction(name) => write!(f, "unsupported action: {}", name),
            Self::UnsupportedHash(name) => write!(f, "unsupported hash algorithm: {}", name),
        }
    }
}

impl Error for CliError {}
