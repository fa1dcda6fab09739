//! Wind vector layers: arrows for map charts, barb glyphs for meteograms.

use std::f64::consts::PI;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;

/// Convert U and V wind components (m/s) to speed (m/s) and direction
/// (radians FROM which the wind blows, 0 = North, pi/2 = East).
pub fn uv_to_speed_direction(u: f32, v: f32) -> (f64, f64) {
    let u = u as f64;
    let v = v as f64;

    let speed = (u * u + v * v).sqrt();

    // Meteorological convention: 0 deg = wind from North, 90 = from East
    let mut direction = (-u).atan2(-v);
    if direction < 0.0 {
        direction += 2.0 * PI;
    }

    (speed, direction)
}

/// Draw wind arrows at every `stride`-th grid point.
///
/// Arrow length is proportional to speed; components with NaN are skipped.
/// Returns the number of arrows drawn.
pub fn draw_arrows(
    canvas: &mut RgbaImage,
    xs: &[f32],
    ys: &[f32],
    nx: usize,
    ny: usize,
    u: &[f32],
    v: &[f32],
    stride: usize,
    scale: f32,
    color: [u8; 4],
) -> usize {
    let (width, height) = canvas.dimensions();
    let pixel = Rgba(color);
    let mut drawn = 0;

    for j in (0..ny).step_by(stride) {
        for i in (0..nx).step_by(stride) {
            let idx = j * nx + i;
            let (du, dv) = (u[idx], v[idx]);
            if du.is_nan() || dv.is_nan() {
                continue;
            }

            let x0 = xs[idx];
            let y0 = ys[idx];
            if x0 < 0.0 || y0 < 0.0 || x0 >= width as f32 || y0 >= height as f32 {
                continue;
            }

            // Canvas y grows downward, v grows northward
            let x1 = x0 + du * scale;
            let y1 = y0 - dv * scale;
            draw_line_segment_mut(canvas, (x0, y0), (x1, y1), pixel);

            // Arrow head: two short segments rotated off the shaft
            let angle = ((y1 - y0) as f64).atan2((x1 - x0) as f64);
            let head = (6.0_f64).min(((du * du + dv * dv).sqrt() * scale) as f64 * 0.4);
            for side in [PI * 0.75, -PI * 0.75] {
                let hx = x1 + (head * (angle + side).cos()) as f32;
                let hy = y1 + (head * (angle + side).sin()) as f32;
                draw_line_segment_mut(canvas, (x1, y1), (hx, hy), pixel);
            }
            drawn += 1;
        }
    }

    drawn
}

/// A barb glyph as line segments in unit coordinates: the staff runs from
/// (0, 0) toward the direction the wind comes from, flags on the staff.
///
/// Segments are scaled so the staff has length 1; the caller maps them onto
/// its own coordinate system. Follows the 50/10/5 knot convention.
pub fn barb_segments(u: f32, v: f32) -> Vec<((f32, f32), (f32, f32))> {
    let (speed_ms, direction) = uv_to_speed_direction(u, v);
    let speed_kt = speed_ms * 1.943_844;

    // Round to the nearest 5 kt as barb charts do
    let mut remaining = ((speed_kt / 5.0).round() * 5.0) as i32;
    let mut segments = Vec::new();

    // Unit vector along the staff (toward where the wind comes from) and the
    // perpendicular the flags extend along
    let (sx, sy) = (direction.sin() as f32, direction.cos() as f32);
    let (px, py) = (-sy, sx);

    segments.push(((0.0, 0.0), (sx, sy)));
    if remaining < 5 {
        // Calm: staff only
        return segments;
    }

    let flag_len = 0.35;
    let step = 0.12;
    let mut pos = 1.0;

    while remaining >= 50 {
        // Pennant: triangle drawn as two segments
        let base = (sx * pos, sy * pos);
        let tip = (
            sx * (pos - step / 2.0) + px * flag_len,
            sy * (pos - step / 2.0) + py * flag_len,
        );
        let foot = (sx * (pos - step), sy * (pos - step));
        segments.push((base, tip));
        segments.push((tip, foot));
        pos -= step * 1.5;
        remaining -= 50;
    }
    while remaining >= 10 {
        let base = (sx * pos, sy * pos);
        let tip = (base.0 + px * flag_len, base.1 + py * flag_len);
        segments.push((base, tip));
        pos -= step;
        remaining -= 10;
    }
    if remaining >= 5 {
        let base = (sx * pos, sy * pos);
        let tip = (base.0 + px * flag_len / 2.0, base.1 + py * flag_len / 2.0);
        segments.push((base, tip));
    }

    segments
}
