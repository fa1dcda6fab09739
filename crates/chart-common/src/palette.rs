//! Named palettes and boundary normalization.
//!
//! A palette is a gradient of color stops over data values. Shading resolves
//! a palette against a level schedule: one color per interval, sampled at the
//! interval midpoint, plus under/over colors for the extend behavior.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::levels::LevelSchedule;

/// Color representation accepted in palette definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// Hex string: "#RRGGBB" or "#RRGGBBAA"
    Hex(String),

    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Explicit RGBA
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    pub fn to_rgba(&self) -> [u8; 4] {
        match self {
            Color::Hex(s) => parse_hex_color(s),
            Color::Array(arr) => {
                let r = arr.first().copied().unwrap_or(0);
                let g = arr.get(1).copied().unwrap_or(0);
                let b = arr.get(2).copied().unwrap_or(0);
                let a = arr.get(3).copied().unwrap_or(255);
                [r, g, b, a]
            }
            Color::Rgba { r, g, b, a } => [*r, *g, *b, *a],
        }
    }
}

fn parse_hex_color(s: &str) -> [u8; 4] {
    let s = s.trim_start_matches('#');

    let byte = |range: std::ops::Range<usize>| -> u8 {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .unwrap_or(0)
    };

    match s.len() {
        6 => [byte(0..2), byte(2..4), byte(4..6), 255],
        8 => [byte(0..2), byte(2..4), byte(4..6), byte(6..8)],
        _ => [0, 0, 0, 255],
    }
}

fn lerp_rgba(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| -> u8 { (x as f32 * (1.0 - t) + y as f32 * t).round() as u8 };
    [
        mix(a[0], b[0]),
        mix(a[1], b[1]),
        mix(a[2], b[2]),
        mix(a[3], b[3]),
    ]
}

/// A color stop in a palette gradient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorStop {
    /// The data value at this stop
    pub value: f32,

    /// The color at this stop
    pub color: Color,
}

/// A gradient palette over data values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub stops: Vec<ColorStop>,
}

impl Palette {
    pub fn validate(&self) -> ChartResult<()> {
        if self.stops.len() < 2 {
            return Err(ChartError::ConfigError(
                "palette must have at least 2 color stops".to_string(),
            ));
        }
        for pair in self.stops.windows(2) {
            if pair[1].value <= pair[0].value {
                return Err(ChartError::ConfigError(
                    "palette stops must be in ascending value order".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Interpolated color for a value, clamped to the gradient ends.
    pub fn color_at(&self, value: f32) -> [u8; 4] {
        let first = &self.stops[0];
        let last = self.stops.last().unwrap();

        if value <= first.value {
            return first.color.to_rgba();
        }
        if value >= last.value {
            return last.color.to_rgba();
        }

        for pair in self.stops.windows(2) {
            if value <= pair[1].value {
                let t = (value - pair[0].value) / (pair[1].value - pair[0].value);
                return lerp_rgba(pair[0].color.to_rgba(), pair[1].color.to_rgba(), t);
            }
        }

        last.color.to_rgba()
    }

    /// One color per schedule interval, sampled at the interval midpoint.
    pub fn interval_colors(&self, schedule: &LevelSchedule) -> Vec<[u8; 4]> {
        schedule
            .levels()
            .windows(2)
            .map(|pair| self.color_at((pair[0] + pair[1]) / 2.0))
            .collect()
    }

    /// Color used below the first boundary when extending at the low end.
    pub fn under_color(&self) -> [u8; 4] {
        self.stops[0].color.to_rgba()
    }

    /// Color used at and above the last boundary when extending at the high end.
    pub fn over_color(&self) -> [u8; 4] {
        self.stops.last().unwrap().color.to_rgba()
    }
}

/// Registry of named palettes: the built-in set plus any JSON-defined extras.
#[derive(Debug, Clone)]
pub struct PaletteRegistry {
    palettes: HashMap<String, Palette>,
}

impl PaletteRegistry {
    /// The built-in palette set used by the chart commands.
    pub fn builtin() -> Self {
        let mut palettes = HashMap::new();
        palettes.insert("temp".to_string(), temp_palette());
        palettes.insert("cape_wxcharts".to_string(), cape_palette());
        palettes.insert("rain_acc_wxcharts".to_string(), rain_acc_palette());
        Self { palettes }
    }

    /// Merge palettes from a JSON file of `{name: {stops: [...]}}`.
    pub fn merge_json_file(&mut self, path: impl AsRef<Path>) -> ChartResult<()> {
        let content = std::fs::read_to_string(path)?;
        self.merge_json(&content)
    }

    pub fn merge_json(&mut self, json: &str) -> ChartResult<()> {
        let extra: HashMap<String, Palette> = serde_json::from_str(json)?;
        for (name, palette) in extra {
            palette.validate()?;
            self.palettes.insert(name, palette);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> ChartResult<&Palette> {
        self.palettes
            .get(name)
            .ok_or_else(|| ChartError::PaletteNotFound(name.to_string()))
    }
}

fn stops(entries: &[(f32, &str)]) -> Palette {
    Palette {
        stops: entries
            .iter()
            .map(|&(value, hex)| ColorStop {
                value,
                color: Color::Hex(hex.to_string()),
            })
            .collect(),
    }
}

/// Temperature palette in celsius, deep purple through dark red.
fn temp_palette() -> Palette {
    stops(&[
        (-50.0, "#19004c"),
        (-30.0, "#0000ff"),
        (0.0, "#00ffff"),
        (10.0, "#00ff00"),
        (20.0, "#ffff00"),
        (30.0, "#ffa500"),
        (40.0, "#ff0000"),
        (50.0, "#8b0000"),
    ])
}

/// CAPE palette in J/kg, muted blue through violet.
fn cape_palette() -> Palette {
    stops(&[
        (250.0, "#a5c8e1"),
        (500.0, "#6baed6"),
        (1000.0, "#41ab5d"),
        (1500.0, "#addd8e"),
        (2000.0, "#fee391"),
        (2500.0, "#fe9929"),
        (3000.0, "#ec7014"),
        (3500.0, "#e31a1c"),
        (4000.0, "#bd0026"),
        (4500.0, "#7a0177"),
        (5000.0, "#49006a"),
    ])
}

/// Accumulated-precipitation palette in mm, cyan through violet.
fn rain_acc_palette() -> Palette {
    stops(&[
        (1.0, "#c6dbef"),
        (5.0, "#9ecae1"),
        (10.0, "#6baed6"),
        (20.0, "#3182bd"),
        (35.0, "#08519c"),
        (50.0, "#41ab5d"),
        (75.0, "#78c679"),
        (100.0, "#fee391"),
        (150.0, "#fe9929"),
        (200.0, "#ec7014"),
        (350.0, "#e31a1c"),
        (500.0, "#bd0026"),
        (1000.0, "#7a0177"),
        (2000.0, "#49006a"),
    ])
}
