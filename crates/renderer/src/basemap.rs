//! Base maps: background, graticule, frame.
//!
//! Built once per run at bundle time and reused by every unit. The original
//! toolchain pulled shaded-relief imagery from a tile service here; a batch
//! renderer with no network dependency draws a neutral background and a
//! labeled graticule instead.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use rusttype::{Font, Scale};

use projection::MapView;

const BACKGROUND: [u8; 4] = [234, 239, 243, 255];
const GRATICULE: [u8; 4] = [178, 186, 194, 255];
const FRAME: [u8; 4] = [60, 60, 60, 255];
const LABEL: [u8; 4] = [90, 96, 102, 255];

/// Sampling step along graticule lines in degrees. Curved projections need
/// the intermediate points; plate carrée just overdraws the same line.
const LINE_SAMPLING: f64 = 0.5;

/// Render the base map for a view.
pub fn build(view: &MapView, width: u32, height: u32, font: &Font) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(BACKGROUND));

    draw_graticule(&mut canvas, view, font);
    draw_frame(&mut canvas);

    canvas
}

fn draw_graticule(canvas: &mut RgbaImage, view: &MapView, font: &Font) {
    let (width, height) = canvas.dimensions();
    let step = view.graticule_step;
    let extent = view.extent;
    let scale = Scale::uniform(10.0);
    let pixel = Rgba(GRATICULE);

    // Meridians
    let mut lon = (extent.min_lon / step).ceil() * step;
    while lon <= extent.max_lon {
        let mut prev: Option<(f32, f32)> = None;
        let mut lat = extent.min_lat;
        while lat <= extent.max_lat {
            let p = view.to_pixels(lon, lat, width, height);
            if let Some(q) = prev {
                draw_line_segment_mut(canvas, q, p, pixel);
            }
            prev = Some(p);
            lat += LINE_SAMPLING;
        }
        // Label along the bottom edge
        let (x, _) = view.to_pixels(lon, extent.min_lat, width, height);
        if x > 12.0 && x < width as f32 - 24.0 {
            draw_text_mut(
                canvas,
                Rgba(LABEL),
                x as i32 + 2,
                height as i32 - 14,
                scale,
                font,
                &format_degrees(lon, 'E', 'W'),
            );
        }
        lon += step;
    }

    // Parallels
    let mut lat = (extent.min_lat / step).ceil() * step;
    while lat <= extent.max_lat {
        let mut prev: Option<(f32, f32)> = None;
        let mut lon = extent.min_lon;
        while lon <= extent.max_lon {
            let p = view.to_pixels(lon, lat, width, height);
            if let Some(q) = prev {
                draw_line_segment_mut(canvas, q, p, pixel);
            }
            prev = Some(p);
            lon += LINE_SAMPLING;
        }
        let (_, y) = view.to_pixels(extent.min_lon, lat, width, height);
        if y > 12.0 && y < height as f32 - 16.0 {
            draw_text_mut(
                canvas,
                Rgba(LABEL),
                3,
                y as i32 + 2,
                scale,
                font,
                &format_degrees(lat, 'N', 'S'),
            );
        }
        lat += step;
    }
}

fn draw_frame(canvas: &mut RgbaImage) {
    let (width, height) = canvas.dimensions();
    let pixel = Rgba(FRAME);
    for x in 0..width {
        canvas.put_pixel(x, 0, pixel);
        canvas.put_pixel(x, height - 1, pixel);
    }
    for y in 0..height {
        canvas.put_pixel(0, y, pixel);
        canvas.put_pixel(width - 1, y, pixel);
    }
}

fn format_degrees(value: f64, positive: char, negative: char) -> String {
    if value >= 0.0 {
        format!("{:.0}{}", value, positive)
    } else {
        format!("{:.0}{}", -value, negative)
    }
}
