use crate::offense::Offense;
use image::{ColorType, ImageReader};
use std::path::Path;

/// Descriptor of a file that passed every structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    pub mode: String,
    pub width: u32,
    pub height: u32,
}

/// Outcome of the structural inspection of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid(ValidatedImage),
    Offending(Offense),
}

/// Runs the structural checks: openability, color mode, square dimensions.
///
/// Checks short-circuit: a file that fails to decode reports only CORRUPT,
/// a wrong-mode file is never measured for size, and neither reaches the
/// entropy or hash stages. See DESIGN.md for the note on this policy.
#[derive(Debug, Clone)]
pub struct Validator {
    expected_mode: String,
    side_length: u32,
}

impl Validator {
    pub fn new(expected_mode: String, side_length: u32) -> Self {
        Self {
            expected_mode,
            side_length,
        }
    }

    /// Inspects one file. Failures are captured as offenses, never
    /// propagated; the image handle does not outlive this call.
    pub fn inspect(&self, path: &Path) -> Verdict {
        let image = match ImageReader::open(path)
            .map_err(image::ImageError::IoError)
            .and_then(|reader| reader.with_guessed_format().map_err(image::ImageError::IoError))
            .and_then(|reader| reader.decode())
        {
            Ok(image) => image,
            Err(_) => return Verdict::Offending(Offense::CORRUPT),
        };

        let mode = mode_name(image.color());
        if mode != self.expected_mode {
            return Verdict::Offending(Offense::MODE);
        }

        let width = image.width();
        let height = image.height();
        if width != self.side_length || height != self.side_length || width != height {
            return Verdict::Offending(Offense::SIZE);
        }

        Verdict::Valid(ValidatedImage {
            mode: mode.to_string(),
            width,
            height,
        })
    }
}

/// Maps the codec's color type onto the conventional mode vocabulary.
fn mode_name(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "L16",
        ColorType::La16 => "LA16",
        ColorType::Rgb16 => "RGB16",
        ColorType::Rgba16 => "RGBA16",
        ColorType::Rgb32F => "RGB32F",
        ColorType::Rgba32F => "RGBA32F",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Rgb, RgbImage};
    use std::fs;
    use tempfile::tempdir;

    fn validator() -> Validator {
        Validator::new(String::from("RGB"), 64)
    }

    fn write_rgb(path: &std::path::Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([120, 40, 200]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn accepts_a_conforming_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("good.png");
        write_rgb(&path, 64, 64);

        match validator().inspect(&path) {
            Verdict::Valid(image) => {
                assert_eq!(image.mode, "RGB");
                assert_eq!((image.width, image.height), (64, 64));
            }
            Verdict::Offending(offense) => panic!("unexpected offense: {}", offense),
        }
    }

    #[test]
    fn flags_unreadable_files_as_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"\x89PNG\r\n but the rest is garbage").unwrap();

        assert_eq!(
            validator().inspect(&path),
            Verdict::Offending(Offense::CORRUPT)
        );
    }

    #[test]
    fn flags_missing_files_as_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.png");
        assert_eq!(
            validator().inspect(&path),
            Verdict::Offending(Offense::CORRUPT)
        );
    }

    #[test]
    fn flags_wrong_color_mode_before_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gray.png");
        // Wrong mode and wrong size; mode must win.
        GrayImage::from_pixel(10, 20, image::Luma([128]))
            .save(&path)
            .unwrap();

        assert_eq!(
            validator().inspect(&path),
            Verdict::Offending(Offense::MODE)
        );
    }

    #[test]
    fn flags_non_square_and_off_side_dimensions() {
        let dir = tempdir().unwrap();
        let wide = dir.path().join("wide.png");
        write_rgb(&wide, 64, 32);
        assert_eq!(
            validator().inspect(&wide),
            Verdict::Offending(Offense::SIZE)
        );

        let square_but_small = dir.path().join("small.png");
        write_rgb(&square_but_small, 32, 32);
        assert_eq!(
            validator().inspect(&square_but_small),
            Verdict::Offending(Offense::SIZE)
        );
    }
}
