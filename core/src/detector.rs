use image::imageops::FilterType;
use image::{DynamicImage, ImageError};
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Pixel side of the downscale the difference hash is computed from.
const HASH_SIZE: u32 = 8;

/// Represents a 64-bit perceptual hash fingerprint.
pub type Fingerprint = u64;

/// Perceptual hash algorithms the detector can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    Dhash,
}

impl HashKind {
    /// Resolves a configuration name. Unknown names are rejected so an
    /// unsupported algorithm fails before any file is processed.
    pub fn parse(name: &str) -> Option<HashKind> {
        match name {
            "dhash" => Some(HashKind::Dhash),
            _ => None,
        }
    }
}

impl Display for HashKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HashKind::Dhash => write!(f, "dhash"),
        }
    }
}

/// Calculates the Hamming distance between `left` and `right`.
pub fn hamming_distance(left: Fingerprint, right: Fingerprint) -> u32 {
    (left ^ right).count_ones()
}

/// Loads the image at `path` and fingerprints its centered crop.
///
/// The file is opened with its own handle, independent of the structural
/// validation pass; a failure here stands on its own.
pub fn fingerprint(path: &Path, kind: HashKind) -> Result<Fingerprint, ImageError> {
    let image = image::open(path)?;
    let crop = center_crop(&image);
    Ok(match kind {
        HashKind::Dhash => dhash(&crop),
    })
}

/// Crops the central 50% of width and height. Hashing only the center
/// makes the fingerprint insensitive to border artifacts.
fn center_crop(image: &DynamicImage) -> DynamicImage {
    let width = image.width();
    let height = image.height();
    image.crop_imm(
        width / 4,
        height / 4,
        (width / 2).max(1),
        (height / 2).max(1),
    )
}

/// Difference hash: one bit per horizontally adjacent pixel pair of a
/// 9x8 luminance downscale, set when brightness increases left to right.
fn dhash(image: &DynamicImage) -> Fingerprint {
    let small = image
        .resize_exact(HASH_SIZE + 1, HASH_SIZE, FilterType::Triangle)
        .into_luma8();

    let mut fingerprint = 0u64;
    for y in 0..HASH_SIZE {
        for x in 0..HASH_SIZE {
            fingerprint <<= 1;
            if small.get_pixel(x, y)[0] < small.get_pixel(x + 1, y)[0] {
                fingerprint |= 1;
            }
        }
    }
    fingerprint
}
