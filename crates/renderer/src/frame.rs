//! Scoped per-unit frames.
//!
//! A `Frame` is the artifact set of one render unit: a working raster
//! cloned from the chunk's base map. Layers draw into it; it is dropped on
//! every exit path (including errors), so the next unit always starts from
//! the clean base while the base map itself is reused.

use std::path::Path;

use image::RgbaImage;

use chart_common::{ChartResult, SaveOptions};

use crate::png;

/// The transient drawable state of one unit.
pub struct Frame<'a> {
    base: &'a RgbaImage,
    pixels: RgbaImage,
}

impl<'a> Frame<'a> {
    /// Start a unit from the chunk's base map.
    pub fn new(base: &'a RgbaImage) -> Self {
        Self {
            base,
            pixels: base.clone(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Reset the working raster back to the base map.
    pub fn clear(&mut self) {
        self.pixels = self.base.clone();
    }

    /// Encode the current state as PNG.
    pub fn encode(&self, save: &SaveOptions) -> ChartResult<Vec<u8>> {
        let (width, height) = self.pixels.dimensions();
        if save.indexed {
            png::encode_auto(
                self.pixels.as_raw(),
                width as usize,
                height as usize,
                save.compression,
            )
        } else {
            png::encode_rgba(
                self.pixels.as_raw(),
                width as usize,
                height as usize,
                save.compression,
            )
        }
    }

    /// Encode and write to `path`, creating parent directories.
    pub fn save(&self, path: &Path, save: &SaveOptions) -> ChartResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = self.encode(save)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_frame_clear_restores_base() {
        let base = RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255]));
        let mut frame = Frame::new(&base);
        frame.image_mut().put_pixel(5, 5, Rgba([255, 0, 0, 255]));
        assert_eq!(frame.image().get_pixel(5, 5).0, [255, 0, 0, 255]);

        frame.clear();
        assert_eq!(frame.image().get_pixel(5, 5).0, [1, 2, 3, 255]);
        // Base is untouched throughout
        assert_eq!(base.get_pixel(5, 5).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_save_creates_directories() {
        let base = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        let frame = Frame::new(&base);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("de").join("tmax_006.png");
        frame.save(&path, &SaveOptions::default()).unwrap();
        assert!(path.is_file());
    }
}
