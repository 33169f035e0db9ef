use image::{DynamicImage, ImageError};
use std::path::Path;

/// Shannon entropy of the 8-bit luminance distribution, in bits.
///
/// Zero for a flat image, up to 8.0 when all 256 levels are equally
/// likely. Low values indicate near-blank or low-detail content.
pub fn shannon_entropy(image: &DynamicImage) -> f64 {
    let pixels = image.to_luma8();

    let mut histogram = [0u64; 256];
    for pixel in pixels.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total = (pixels.width() as f64) * (pixels.height() as f64);
    let mut entropy = 0.0;
    for &count in histogram.iter() {
        if count > 0 {
            let p = count as f64 / total;
            entropy -= p * p.log2();
        }
    }
    entropy
}

/// Reopens the file at `path` and scores its information content.
///
/// This is a second, independent open: a file can validate structurally
/// and still fail here, which the caller records as corrupt.
pub fn measure(path: &Path) -> Result<f64, ImageError> {
    let image = image::open(path)?;
    Ok(shannon_entropy(&image))
}
