//! Hatch stipple over a threshold band.
//!
//! The raster replacement for hatched contour fills: grid cells whose value
//! falls inside `[low, high)` are stippled with a dot pattern. The pattern is
//! anchored to canvas coordinates so it stays continuous across cells.

use image::{Rgba, RgbaImage};

/// Dot spacing of the stipple pattern in pixels.
const STIPPLE_SPACING: u32 = 6;

/// Stipple every cell whose north-west point lies inside `[low, high)`.
/// Returns the number of stippled cells.
pub fn hatch_band(
    canvas: &mut RgbaImage,
    xs: &[f32],
    ys: &[f32],
    nx: usize,
    ny: usize,
    values: &[f32],
    low: f32,
    high: f32,
    color: [u8; 4],
) -> usize {
    let (width, height) = canvas.dimensions();
    let pixel = Rgba(color);
    let mut stippled = 0;

    for j in 0..ny.saturating_sub(1) {
        for i in 0..nx.saturating_sub(1) {
            let idx = j * nx + i;
            let v = values[idx];
            if v.is_nan() || v < low || v >= high {
                continue;
            }

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

            for py in py0..=py1 {
                for px in px0..=px1 {
                    if px % STIPPLE_SPACING == 0 && py % STIPPLE_SPACING == 0 {
                        canvas.put_pixel(px, py, pixel);
                    }
                }
            }
            stippled += 1;
        }
    }

    stippled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_is_closed_open() {
        let mut canvas = RgbaImage::new(30, 30);
        let xs: Vec<f32> = (0..4).map(|k| (k % 2) as f32 * 12.0).collect();
        let ys: Vec<f32> = (0..4).map(|k| (k / 2) as f32 * 12.0).collect();

        // One cell; the north-west value decides
        for (value, expect) in [(-100.0, 1), (-50.0, 0), (-150.0, 0), (f32::NAN, 0)] {
            let values = vec![value; 4];
            let n = hatch_band(
                &mut canvas,
                &xs,
                &ys,
                2,
                2,
                &values,
                -100.0,
                -50.0,
                [60, 60, 60, 255],
            );
            assert_eq!(n, expect, "value {}", value);
        }
    }

    #[test]
    fn test_stipple_is_sparse() {
        let mut canvas = RgbaImage::new(30, 30);
        let xs = vec![0.0, 24.0, 0.0, 24.0];
        let ys = vec![0.0, 0.0, 24.0, 24.0];
        let values = vec![0.5; 4];
        hatch_band(&mut canvas, &xs, &ys, 2, 2, &values, 0.0, 1.0, [0, 0, 0, 255]);

        let set: usize = canvas.pixels().filter(|p| p.0[3] != 0).count();
        assert!(set > 0);
        // Far fewer pixels than a filled cell
        assert!(set < 25 * 25 / 4, "stipple too dense: {}", set);
    }
}
