//! Gridpoint value labels.
//!
//! Draws rounded field values at a subsampled set of grid points, colored
//! through the active shading so the labels track the filled layer.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};

use crate::annotate::text_width;
use crate::shading::Shading;

/// Fallback label color where the value classifies outside the shading.
const FALLBACK: [u8; 4] = [90, 90, 90, 255];

/// Draw value labels at every `density`-th grid point. NaN points are
/// skipped. Returns the number of labels drawn.
#[allow(clippy::too_many_arguments)]
pub fn draw_values(
    canvas: &mut RgbaImage,
    xs: &[f32],
    ys: &[f32],
    nx: usize,
    ny: usize,
    values: &[f32],
    shading: &Shading,
    density: usize,
    font: &Font,
    size: f32,
) -> usize {
    let (width, height) = canvas.dimensions();
    let scale = Scale::uniform(size);
    let mut drawn = 0;

    for j in (0..ny).step_by(density) {
        for i in (0..nx).step_by(density) {
            let idx = j * nx + i;
            let value = values[idx];
            if value.is_nan() {
                continue;
            }

            let text = format!("{:.0}", value);
            let w = text_width(font, scale, &text);
            let x = xs[idx] - w / 2.0;
            let y = ys[idx] - size / 2.0;
            if x < 0.0 || y < 0.0 || x + w >= width as f32 || y + size >= height as f32 {
                continue;
            }

            let color = shading.classify(value).map(darken).unwrap_or(FALLBACK);
            draw_text_mut(canvas, Rgba(color), x as i32, y as i32, scale, font, &text);
            drawn += 1;
        }
    }

    drawn
}

/// Darken an interval color enough to stay readable over its own fill.
fn darken(c: [u8; 4]) -> [u8; 4] {
    [c[0] / 2, c[1] / 2, c[2] / 2, 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart_common::{LevelSchedule, PaletteRegistry};
    use crate::annotate::load_font;
    use crate::shading::Extend;
    use test_utils::require_file_or_skip;

    #[test]
    fn test_draw_values_density_and_nan() {
        let font_path = require_file_or_skip!("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
        let font = load_font(&font_path).unwrap();

        let registry = PaletteRegistry::builtin();
        let shading = Shading::new(
            registry.get("temp").unwrap(),
            LevelSchedule::arange(-25.0, 50.0, 1.0).unwrap(),
            Extend::Both,
        )
        .unwrap();

        let mut canvas = RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]));
        let nx = 6;
        let ny = 6;
        let xs: Vec<f32> = (0..36).map(|k| (k % nx) as f32 * 30.0 + 20.0).collect();
        let ys: Vec<f32> = (0..36).map(|k| (k / nx) as f32 * 30.0 + 20.0).collect();
        let mut values = vec![12.0; 36];
        values[0] = f32::NAN;

        // density 3 visits grid points (0,0), (3,0), (0,3), (3,3); one is NaN
        let drawn = draw_values(
            &mut canvas, &xs, &ys, nx, ny, &values, &shading, 3, &font, 11.0,
        );
        assert_eq!(drawn, 3);
    }
}
