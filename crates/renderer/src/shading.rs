//! Filled contour shading.
//!
//! A field is classified through a level schedule into discrete intervals and
//! each grid cell is painted with its interval color. Undefined (NaN) points
//! stay transparent, so a fully masked field produces an empty layer without
//! error.

use image::{Rgba, RgbaImage};

use chart_common::{ChartResult, LevelSchedule, Palette};

/// Out-of-range behavior, mirroring the contouring `extend` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extend {
    Neither,
    Min,
    Max,
    Both,
}

/// A resolved shading mapping: boundary levels plus per-interval colors.
#[derive(Debug, Clone)]
pub struct Shading {
    schedule: LevelSchedule,
    colors: Vec<[u8; 4]>,
    under: [u8; 4],
    over: [u8; 4],
    extend: Extend,
}

impl Shading {
    pub fn new(palette: &Palette, schedule: LevelSchedule, extend: Extend) -> ChartResult<Self> {
        palette.validate()?;
        let colors = palette.interval_colors(&schedule);
        Ok(Self {
            colors,
            under: palette.under_color(),
            over: palette.over_color(),
            schedule,
            extend,
        })
    }

    pub fn schedule(&self) -> &LevelSchedule {
        &self.schedule
    }

    pub fn interval_colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Color for a value, or None when the value is undefined or falls
    /// outside a non-extended end.
    pub fn classify(&self, value: f32) -> Option<[u8; 4]> {
        if value.is_nan() {
            return None;
        }
        if let Some(k) = self.schedule.interval_of(value) {
            return Some(self.colors[k]);
        }
        if value < self.schedule.first() {
            return match self.extend {
                Extend::Min | Extend::Both => Some(self.under),
                _ => None,
            };
        }
        match self.extend {
            Extend::Max | Extend::Both => Some(self.over),
            _ => None,
        }
    }
}

/// Paint a field onto the canvas as filled grid cells.
///
/// `xs`/`ys` are the projected pixel coordinates of every grid point
/// (row-major, `nx` by `ny`); each cell is filled over the pixel bounding box
/// of its four corners with the color of its north-west point. Returns the
/// number of cells painted, which is zero for a fully masked field.
pub fn shade_cells(
    canvas: &mut RgbaImage,
    xs: &[f32],
    ys: &[f32],
    nx: usize,
    ny: usize,
    values: &[f32],
    shading: &Shading,
) -> usize {
    let (width, height) = canvas.dimensions();
    let mut painted = 0;

    for j in 0..ny.saturating_sub(1) {
        for i in 0..nx.saturating_sub(1) {
            let idx = j * nx + i;
            let color = match shading.classify(values[idx]) {
                Some(c) => c,
                None => continue,
            };

            let corners = [idx, idx + 1, idx + nx, idx + nx + 1];
            let x0 = corners.iter().map(|&c| xs[c]).fold(f32::INFINITY, f32::min);
            let x1 = corners
                .iter()
                .map(|&c| xs[c])
                .fold(f32::NEG_INFINITY, f32::max);
            let y0 = corners.iter().map(|&c| ys[c]).fold(f32::INFINITY, f32::min);
            let y1 = corners
                .iter()
                .map(|&c| ys[c])
                .fold(f32::NEG_INFINITY, f32::max);

            if x1 < 0.0 || y1 < 0.0 || x0 >= width as f32 || y0 >= height as f32 {
                continue;
            }

            let px0 = x0.max(0.0) as u32;
            let py0 = y0.max(0.0) as u32;
            let px1 = (x1.ceil() as u32).min(width - 1);
            let py1 = (y1.ceil() as u32).min(height - 1);

            let pixel = Rgba(color);
            for py in py0..=py1 {
                for px in px0..=px1 {
                    canvas.put_pixel(px, py, pixel);
                }
            }
            painted += 1;
        }
    }

    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart_common::PaletteRegistry;

    fn shading(extend: Extend) -> Shading {
        let registry = PaletteRegistry::builtin();
        let palette = registry.get("temp").unwrap();
        let schedule = LevelSchedule::arange(-25.0, 50.0, 1.0).unwrap();
        Shading::new(palette, schedule, extend).unwrap()
    }

    #[test]
    fn test_classify_inside() {
        let s = shading(Extend::Neither);
        assert!(s.classify(0.0).is_some());
        assert!(s.classify(-25.0).is_some());
        assert!(s.classify(f32::NAN).is_none());
    }

    #[test]
    fn test_classify_extend_behavior() {
        let neither = shading(Extend::Neither);
        assert!(neither.classify(-30.0).is_none());
        assert!(neither.classify(60.0).is_none());

        let both = shading(Extend::Both);
        assert_eq!(both.classify(-30.0), Some(both.under));
        assert_eq!(both.classify(60.0), Some(both.over));

        let max = shading(Extend::Max);
        assert!(max.classify(-30.0).is_none());
        assert!(max.classify(60.0).is_some());
    }

    #[test]
    fn test_shade_cells_counts_and_degenerate() {
        let s = shading(Extend::Both);
        let mut canvas = RgbaImage::new(40, 40);

        // 3x3 grid spread over the canvas
        let xs: Vec<f32> = (0..9).map(|k| (k % 3) as f32 * 15.0).collect();
        let ys: Vec<f32> = (0..9).map(|k| (k / 3) as f32 * 15.0).collect();

        let values = vec![10.0; 9];
        let painted = shade_cells(&mut canvas, &xs, &ys, 3, 3, &values, &s);
        assert_eq!(painted, 4);
        assert_ne!(canvas.get_pixel(7, 7).0[3], 0);

        // A fully masked field paints nothing and does not fail
        let mut canvas = RgbaImage::new(40, 40);
        let masked = vec![f32::NAN; 9];
        let painted = shade_cells(&mut canvas, &xs, &ys, 3, 3, &masked, &s);
        assert_eq!(painted, 0);
        assert_eq!(canvas.get_pixel(7, 7).0[3], 0);
    }
}
