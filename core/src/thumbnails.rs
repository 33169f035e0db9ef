use crate::clusterer::HashCluster;
use image::imageops::{self, FilterType};
use image::{ImageError, RgbImage};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Widest a duplicate contact sheet gets before wrapping to a new row.
const MAX_GRID_COLUMNS: usize = 16;

const LOW_ENTROPY_DIR: &str = "low-entropy";
const DUPLICATES_DIR: &str = "duplicates";

/// Renders inspection thumbnails under the aux directory: one square
/// thumbnail per low-entropy file and one contact sheet per duplicate
/// cluster.
#[derive(Debug, Clone)]
pub struct ThumbnailWriter {
    root: PathBuf,
    size: u32,
}

impl ThumbnailWriter {
    pub fn new(root: PathBuf, size: u32) -> Result<Self, ThumbnailError> {
        for subdirectory in [LOW_ENTROPY_DIR, DUPLICATES_DIR] {
            let path = root.join(subdirectory);
            fs::create_dir_all(&path).map_err(|source| ThumbnailError::Io { source, path })?;
        }
        Ok(Self {
            root,
            size: size.max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves a square thumbnail of a low-entropy file, named so that a
    /// directory listing sorts the blandest images first.
    pub fn write_low_entropy(
        &self,
        source: &Path,
        filename: &str,
        entropy: f64,
    ) -> Result<PathBuf, ThumbnailError> {
        let thumbnail = self.load_tile(source)?;
        let target = self
            .root
            .join(LOW_ENTROPY_DIR)
            .join(format!("{}-{}.jpg", entropy, filename));
        thumbnail.save(&target).map_err(|source| ThumbnailError::Image {
            source,
            path: target.clone(),
        })?;
        Ok(target)
    }

    /// Composes the cluster's members into one contact sheet, at most
    /// sixteen columns wide, members pasted in cluster order.
    pub fn write_cluster_grid(
        &self,
        base_dir: &Path,
        cluster: &HashCluster,
    ) -> Result<PathBuf, ThumbnailError> {
        let count = cluster.files.len();
        let columns = count.min(MAX_GRID_COLUMNS).max(1);
        let rows = count.div_ceil(columns);

        let mut grid = RgbImage::new((columns as u32) * self.size, (rows as u32) * self.size);
        for (position, filename) in cluster.files.iter().enumerate() {
            let tile = self.load_tile(&base_dir.join(filename))?;
            let x = (position % columns) as u32 * self.size;
            let y = (position / columns) as u32 * self.size;
            imageops::replace(&mut grid, &tile, x as i64, y as i64);
        }

        let target = self
            .root
            .join(DUPLICATES_DIR)
            .join(format!("{:016x}.jpg", cluster.fingerprint));
        grid.save(&target).map_err(|source| ThumbnailError::Image {
            source,
            path: target.clone(),
        })?;
        Ok(target)
    }

    fn load_tile(&self, path: &Path) -> Result<RgbImage, ThumbnailError> {
        let image = image::open(path).map_err(|source| ThumbnailError::Image {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(image
            .resize_exact(self.size, self.size, FilterType::Triangle)
            .into_rgb8())
    }
}

#[derive(Debug)]
pub enum ThumbnailError {
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    Image {
        source: ImageError,
        path: PathBuf,
    },
}

impl Display for ThumbnailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => write!(f, "io error for {}: {}", path.display(), source),
            Self::Image { source, path } => {
                write!(f, "image error for {}: {}", path.display(), source)
            }
        }
    }
}

impl Error for ThumbnailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Image { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_image(path: &Path, level: u8) {
        RgbImage::from_pixel(96, 96, Rgb([level, level, 40]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn creates_the_aux_subdirectories() {
        let aux = tempdir().unwrap();
        let writer = ThumbnailWriter::new(aux.path().to_path_buf(), 32).unwrap();
        assert!(writer.root().join("low-entropy").is_dir());
        assert!(writer.root().join("duplicates").is_dir());
    }

    #[test]
    fn low_entropy_thumbnail_is_square_and_named_by_score() {
        let images = tempdir().unwrap();
        let aux = tempdir().unwrap();
        let source = images.path().join("bland.png");
        write_image(&source, 30);

        let writer = ThumbnailWriter::new(aux.path().to_path_buf(), 32).unwrap();
        let target = writer.write_low_entropy(&source, "bland.png", 1.5).unwrap();

        assert!(target.ends_with("low-entropy/1.5-bland.png.jpg"));
        let thumbnail = image::open(&target).unwrap();
        assert_eq!((thumbnail.width(), thumbnail.height()), (32, 32));
    }

    #[test]
    fn cluster_grid_lays_members_out_in_rows() {
        let images = tempdir().unwrap();
        let aux = tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_image(&images.path().join(name), 200);
        }
        let cluster = HashCluster {
            fingerprint: 0xbeef,
            files: vec![
                String::from("a.png"),
                String::from("b.png"),
                String::from("c.png"),
            ],
        };

        let writer = ThumbnailWriter::new(aux.path().to_path_buf(), 32).unwrap();
        let target = writer.write_cluster_grid(images.path(), &cluster).unwrap();

        assert!(target.ends_with("duplicates/000000000000beef.jpg"));
        let grid = image::open(&target).unwrap();
        assert_eq!((grid.width(), grid.height()), (96, 32));
    }

    #[test]
    fn grid_wraps_after_sixteen_columns() {
        let images = tempdir().unwrap();
        let aux = tempdir().unwrap();
        let files: Vec<String> = (0..18)
            .map(|index| {
                let name = format!("{:02}.png", index);
                write_image(&images.path().join(&name), index as u8 * 10);
                name
            })
            .collect();
        let cluster = HashCluster {
            fingerprint: 1,
            files,
        };

        let writer = ThumbnailWriter::new(aux.path().to_path_buf(), 16).unwrap();
        let target = writer.write_cluster_grid(images.path(), &cluster).unwrap();

        let grid = image::open(&target).unwrap();
        // 18 members: 16 columns, 2 rows.
        assert_eq!((grid.width(), grid.height()), (256, 32));
    }
}
