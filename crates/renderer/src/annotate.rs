//! Text annotations and logo overlay.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};

use chart_common::{ChartError, ChartResult};

/// Corner placement for annotations and the logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc {
    UpperLeft,
    UpperCenter,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// Margin between annotations and the canvas edge, in pixels.
const MARGIN: i32 = 6;

/// Load the annotation font from disk.
///
/// The font is part of the render-argument bundle: loaded once per run,
/// shared read-only by every worker.
pub fn load_font(path: &Path) -> ChartResult<Font<'static>> {
    let data = std::fs::read(path).map_err(|e| ChartError::FontError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Font::try_from_vec(data).ok_or_else(|| ChartError::FontError {
        path: path.display().to_string(),
        message: "not a usable TrueType font".to_string(),
    })
}

/// Pixel width of `text` at `scale`.
pub fn text_width(font: &Font, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Draw a text annotation at a corner of the canvas.
pub fn draw_annotation(
    canvas: &mut RgbaImage,
    text: &str,
    loc: Loc,
    font: &Font,
    size: f32,
    color: [u8; 4],
) {
    let scale = Scale::uniform(size);
    let width = text_width(font, scale, text) as i32;
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);

    let x = match loc {
        Loc::UpperLeft | Loc::LowerLeft => MARGIN,
        Loc::UpperCenter => (cw - width) / 2,
        Loc::UpperRight | Loc::LowerRight => cw - width - MARGIN,
    };
    let y = match loc {
        Loc::UpperLeft | Loc::UpperCenter | Loc::UpperRight => MARGIN,
        Loc::LowerLeft | Loc::LowerRight => ch - size as i32 - MARGIN,
    };

    draw_text_mut(canvas, Rgba(color), x, y, scale, font, text);
}

/// Draw a text annotation positioned against a sub-area of the canvas.
///
/// Lower placements anchor to `area_height` instead of the canvas bottom;
/// map charts use this to keep captions above the colorbar strip.
pub fn draw_annotation_within(
    canvas: &mut RgbaImage,
    area_height: u32,
    text: &str,
    loc: Loc,
    font: &Font,
    size: f32,
    color: [u8; 4],
) {
    let scale = Scale::uniform(size);
    let width = text_width(font, scale, text) as i32;
    let cw = canvas.width() as i32;
    let ah = area_height.min(canvas.height()) as i32;

    let x = match loc {
        Loc::UpperLeft | Loc::LowerLeft => MARGIN,
        Loc::UpperCenter => (cw - width) / 2,
        Loc::UpperRight | Loc::LowerRight => cw - width - MARGIN,
    };
    let y = match loc {
        Loc::UpperLeft | Loc::UpperCenter | Loc::UpperRight => MARGIN,
        Loc::LowerLeft | Loc::LowerRight => ah - size as i32 - MARGIN,
    };

    draw_text_mut(canvas, Rgba(color), x, y, scale, font, text);
}

/// Load a branding logo, if configured.
pub fn load_logo(path: &Path) -> ChartResult<RgbaImage> {
    let logo = image::open(path)
        .map_err(|e| ChartError::RenderError(format!("logo {}: {}", path.display(), e)))?;
    Ok(logo.to_rgba8())
}

/// Composite the logo into a corner of the canvas.
pub fn overlay_logo(canvas: &mut RgbaImage, logo: &RgbaImage, loc: Loc) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    let (lw, lh) = (logo.width() as i64, logo.height() as i64);

    let x = match loc {
        Loc::UpperLeft | Loc::LowerLeft => MARGIN as i64,
        Loc::UpperCenter => (cw - lw) / 2,
        Loc::UpperRight | Loc::LowerRight => cw - lw - MARGIN as i64,
    };
    let y = match loc {
        Loc::UpperLeft | Loc::UpperCenter | Loc::UpperRight => MARGIN as i64,
        Loc::LowerLeft | Loc::LowerRight => ch - lh - MARGIN as i64,
    };

    image::imageops::overlay(canvas, logo, x, y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::require_file_or_skip;

    const FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    #[test]
    fn test_load_font_missing() {
        assert!(matches!(
            load_font(Path::new("/nonexistent.ttf")),
            Err(ChartError::FontError { .. })
        ));
    }

    #[test]
    fn test_annotation_draws_pixels() {
        let font_path = require_file_or_skip!(FONT_PATH);
        let font = load_font(&font_path).unwrap();
        let mut canvas = RgbaImage::from_pixel(200, 60, Rgba([255, 255, 255, 255]));
        draw_annotation(
            &mut canvas,
            "Run: 15 Jan 2024 12:00 UTC",
            Loc::UpperLeft,
            &font,
            12.0,
            [0, 0, 0, 255],
        );
        let dark = canvas.pixels().filter(|p| p.0[0] < 128).count();
        assert!(dark > 0);
    }

    #[test]
    fn test_overlay_logo_corner() {
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let logo = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        overlay_logo(&mut canvas, &logo, Loc::LowerRight);
        assert_eq!(canvas.get_pixel(90, 90).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(10, 10).0, [255, 255, 255, 255]);
    }
}
