//! Horizontal colorbar for the primary shading.
//!
//! Attached once per chunk, by the first unit, into the worker's base map -
//! the mapping is identical across units, so one bar serves every frame.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};

use crate::annotate::text_width;
use crate::shading::Shading;

/// Bar height in pixels.
const BAR_HEIGHT: u32 = 12;
/// Vertical space reserved below the bar for tick labels and the unit label.
const LABEL_SPACE: u32 = 26;
/// Approximate number of tick labels along the bar.
const TICK_TARGET: usize = 8;

/// Total height the colorbar strip occupies at the canvas bottom.
pub fn strip_height() -> u32 {
    BAR_HEIGHT + LABEL_SPACE
}

/// Draw a horizontal colorbar across the bottom of the canvas.
pub fn draw_horizontal(canvas: &mut RgbaImage, shading: &Shading, label: &str, font: &Font) {
    let (width, height) = canvas.dimensions();
    if height < strip_height() + 10 {
        return;
    }

    let margin = width / 10;
    let bar_w = width - 2 * margin;
    let bar_top = height - strip_height();

    let colors = shading.interval_colors();
    let n = colors.len().max(1);

    for dx in 0..bar_w {
        let k = (dx as usize * n) / bar_w as usize;
        let pixel = Rgba(colors[k.min(n - 1)]);
        for dy in 0..BAR_HEIGHT {
            canvas.put_pixel(margin + dx, bar_top + dy, pixel);
        }
    }

    // Frame around the bar
    let frame = Rgba([60, 60, 60, 255]);
    for dx in 0..bar_w {
        canvas.put_pixel(margin + dx, bar_top, frame);
        canvas.put_pixel(margin + dx, bar_top + BAR_HEIGHT - 1, frame);
    }
    for dy in 0..BAR_HEIGHT {
        canvas.put_pixel(margin, bar_top + dy, frame);
        canvas.put_pixel(margin + bar_w - 1, bar_top + dy, frame);
    }

    // Tick labels on a subset of boundaries
    let levels = shading.schedule().levels();
    let scale = Scale::uniform(10.0);
    let step = (levels.len() / TICK_TARGET).max(1);
    for (k, &level) in levels.iter().enumerate().step_by(step) {
        let x = margin as f32 + (k as f32 / (levels.len() - 1) as f32) * bar_w as f32;
        let text = if level.fract().abs() < 0.01 {
            format!("{:.0}", level)
        } else {
            format!("{:.1}", level)
        };
        let w = text_width(font, scale, &text);
        draw_text_mut(
            canvas,
            Rgba([30, 30, 30, 255]),
            (x - w / 2.0).max(0.0) as i32,
            (bar_top + BAR_HEIGHT + 2) as i32,
            scale,
            font,
            &text,
        );
    }

    // Unit label centered under the ticks
    let scale = Scale::uniform(11.0);
    let w = text_width(font, scale, label);
    draw_text_mut(
        canvas,
        Rgba([30, 30, 30, 255]),
        ((width as f32 - w) / 2.0) as i32,
        (bar_top + BAR_HEIGHT + 13) as i32,
        scale,
        font,
        label,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::load_font;
    use crate::shading::Extend;
    use chart_common::{LevelSchedule, PaletteRegistry};
    use test_utils::require_file_or_skip;

    #[test]
    fn test_draw_colorbar_fills_strip() {
        let font_path = require_file_or_skip!("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
        let font = load_font(&font_path).unwrap();

        let registry = PaletteRegistry::builtin();
        let shading = Shading::new(
            registry.get("cape_wxcharts").unwrap(),
            LevelSchedule::arange(250.0, 5000.0, 50.0).unwrap(),
            Extend::Max,
        )
        .unwrap();

        let mut canvas = RgbaImage::from_pixel(600, 400, Rgba([255, 255, 255, 255]));
        draw_horizontal(&mut canvas, &shading, "CAPE [J/kg]", &font);

        let bar_y = 400 - strip_height() + BAR_HEIGHT / 2;
        let colored = (0..600)
            .filter(|&x| {
                let p = canvas.get_pixel(x, bar_y).0;
                p != [255, 255, 255, 255]
            })
            .count();
        assert!(colored > 400, "colorbar not painted: {}", colored);
    }
}
