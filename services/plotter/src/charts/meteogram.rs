//! Per-city meteograms.
//!
//! Four stacked panels sharing the forecast time axis:
//! 1. temperature shading on (time x pressure) with wind barbs,
//! 2. 2 m temperature and dew point,
//! 3. 10 m gusts with mean-sea-level pressure on a secondary axis,
//! 4. accumulated rain/snow with instantaneous rates on a secondary axis.

use chrono::NaiveDateTime;
use plotters::coord::types::RangedDateTime;
use plotters::prelude::*;
use rayon::prelude::*;
use tracing::info;

use chart_common::{ChartError, ChartResult, Palette, RunConfig};
use forecast_data::{derive, PointSeries, ProfileSeries, RunCatalog, UnitTransform};
use renderer::vectors::barb_segments;

use crate::gazetteer;

const FIGURE_SIZE: (u32, u32) = (1000, 1200);
/// Hours between wind barb columns in panel 1.
const BARB_STEP_HOURS: u32 = 3;
/// Barb staff length in pixels.
const BARB_LEN_PX: f32 = 14.0;

/// Everything loaded once and shared by every city's renderer.
struct MeteogramData {
    surface: forecast_data::Dataset,
    precip: forecast_data::Dataset,
    /// (pressure hPa, dataset with t/u/v at that level), descending pressure
    levels: Vec<(f32, forecast_data::Dataset)>,
    temp_palette: Palette,
}

pub fn run(
    config: &RunConfig,
    catalog: &RunCatalog,
    cities: &[String],
    debug: bool,
) -> ChartResult<()> {
    let surface = catalog.load_fields(&["t_2m", "td_2m", "vmax_10m", "pmsl"], None)?;
    let precip = catalog.load_fields(&["rain_gsp", "snow_gsp"], None)?;

    let level_values = catalog.levels_for("t");
    if level_values.is_empty() {
        return Err(ChartError::MissingVariable("t".to_string()));
    }
    let mut levels = Vec::with_capacity(level_values.len());
    for &pa in &level_values {
        levels.push((
            pa as f32 / 100.0,
            catalog.load_fields(&["t", "u", "v"], Some(pa))?,
        ));
    }

    let registry = super::palette_registry(config)?;
    let data = MeteogramData {
        surface,
        precip,
        levels,
        temp_palette: registry.get("temp")?.clone(),
    };

    info!("pre-processing finished, launching meteograms");
    if debug {
        for city in cities {
            render_city(config, &data, city)?;
        }
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.processes)
            .build()
            .map_err(|e| ChartError::RenderError(format!("worker pool: {}", e)))?;
        pool.install(|| {
            cities
                .par_iter()
                .try_for_each(|city| render_city(config, &data, city))
        })?;
    }

    Ok(())
}

fn render_city(config: &RunConfig, data: &MeteogramData, city: &str) -> ChartResult<()> {
    info!(city, "producing meteogram");
    let (lon, lat) = gazetteer::coordinates(city)?;

    // Surface series in display units
    let mut t2m = data.surface.point_series("t_2m", lon, lat)?;
    t2m.convert(UnitTransform::KELVIN_TO_CELSIUS);
    let mut td2m = data.surface.point_series("td_2m", lon, lat)?;
    td2m.convert(UnitTransform::KELVIN_TO_CELSIUS);
    let mut gusts = data.surface.point_series("vmax_10m", lon, lat)?;
    gusts.convert(UnitTransform::MS_TO_KMH);
    let mut pmsl = data.surface.point_series("pmsl", lon, lat)?;
    pmsl.convert(UnitTransform::PA_TO_HPA);

    let rain_acc = data.precip.point_series("rain_gsp", lon, lat)?;
    let snow_acc = data.precip.point_series("snow_gsp", lon, lat)?;
    let rain_rate = derive::differentiate_hours(&rain_acc.times, &rain_acc.values);
    let snow_rate = derive::differentiate_hours(&snow_acc.times, &snow_acc.values);

    // Vertical profiles: values[time][level]
    let t_profile = extract_profile(&data.levels, "t", lon, lat)?;
    let u_profile = extract_profile(&data.levels, "u", lon, lat)?;
    let v_profile = extract_profile(&data.levels, "v", lon, lat)?;

    let path = config.meteogram_path(city);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let run_label = t2m.times[0].run_label();
    let position = format!("({:.1}N, {:.1}E)", lat, lon);

    draw_figure(
        &path,
        city,
        &run_label,
        &position,
        &data.temp_palette,
        &t2m,
        &td2m,
        &gusts,
        &pmsl,
        &rain_acc,
        &snow_acc,
        &rain_rate,
        &snow_rate,
        &t_profile,
        &u_profile,
        &v_profile,
    )
}

/// Build a per-city profile from the per-level datasets.
fn extract_profile(
    levels: &[(f32, forecast_data::Dataset)],
    variable: &str,
    lon: f64,
    lat: f64,
) -> ChartResult<ProfileSeries> {
    let mut per_level = Vec::with_capacity(levels.len());
    for (_, dataset) in levels {
        per_level.push(dataset.point_series(variable, lon, lat)?);
    }
    let times = per_level[0].times.clone();
    let values = (0..times.len())
        .map(|t| per_level.iter().map(|s| s.values[t]).collect())
        .collect();
    Ok(ProfileSeries {
        times,
        levels_hpa: levels.iter().map(|(hpa, _)| *hpa).collect(),
        values,
    })
}

fn plot_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::RenderError(format!("meteogram: {}", e))
}

/// Points of a series as (time, value), NaN dropped.
fn series_points(series: &PointSeries) -> Vec<(NaiveDateTime, f64)> {
    series
        .times
        .iter()
        .zip(&series.values)
        .filter(|(_, v)| !v.is_nan())
        .map(|(t, &v)| (t.valid_datetime().naive_utc(), v as f64))
        .collect()
}

fn padded_range(points: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in points {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if (max - min).abs() > 1e-6 {
        (max - min) * 0.1
    } else {
        1.0
    };
    (min - pad, max + pad)
}

fn rgb(c: [u8; 4]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

#[allow(clippy::too_many_arguments)]
fn draw_figure(
    path: &std::path::Path,
    city: &str,
    run_label: &str,
    position: &str,
    temp_palette: &Palette,
    t2m: &PointSeries,
    td2m: &PointSeries,
    gusts: &PointSeries,
    pmsl: &PointSeries,
    rain_acc: &PointSeries,
    snow_acc: &PointSeries,
    rain_rate: &[f32],
    snow_rate: &[f32],
    t_profile: &ProfileSeries,
    u_profile: &ProfileSeries,
    v_profile: &ProfileSeries,
) -> ChartResult<()> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let hourly: Vec<NaiveDateTime> = t2m
        .times
        .iter()
        .map(|t| t.valid_datetime().naive_utc())
        .collect();
    let t_first = *hourly.first().ok_or_else(|| {
        ChartError::DataReadError("meteogram needs at least one timestep".to_string())
    })?;
    let t_last = *hourly.last().unwrap();

    let (panel1_row, rest) = root.split_vertically(470);
    let (panel2, rest) = rest.split_vertically(220);
    let (panel3, panel4) = rest.split_vertically(220);
    let (panel1, cbar) = panel1_row.split_horizontally(920);

    // === Panel 1: temperature shading + wind barbs over pressure ===
    {
        // Pressure axis is inverted by plotting -p and relabeling
        let mut chart = ChartBuilder::on(&panel1)
            .margin(8)
            .y_label_area_size(55)
            .x_label_area_size(12)
            .build_cartesian_2d(
                RangedDateTime::from(t_first..t_last),
                -1000.0f64..-200.0f64,
            )
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_labels(0)
            .y_label_formatter(&|y: &f64| format!("{:.0}", -y))
            .y_desc("Pressure [hPa]")
            .light_line_style(WHITE.mix(0.0))
            .draw()
            .map_err(plot_err)?;

        // Cell rectangles between time/level midpoints
        let times = &t_profile.times;
        let levels = &t_profile.levels_hpa;
        let mut cells = Vec::new();
        for (ti, time) in times.iter().enumerate() {
            let dt = time.valid_datetime().naive_utc();
            let t_lo = if ti == 0 {
                dt
            } else {
                midpoint(times[ti - 1].valid_datetime().naive_utc(), dt)
            };
            let t_hi = if ti + 1 == times.len() {
                dt
            } else {
                midpoint(dt, times[ti + 1].valid_datetime().naive_utc())
            };
            for (li, &level) in levels.iter().enumerate() {
                let value = t_profile.values[ti][li];
                if value.is_nan() {
                    continue;
                }
                let p_hi = if li == 0 {
                    level
                } else {
                    (levels[li - 1] + level) / 2.0
                };
                let p_lo = if li + 1 == levels.len() {
                    level
                } else {
                    (level + levels[li + 1]) / 2.0
                };
                let celsius = UnitTransform::KELVIN_TO_CELSIUS.apply(value);
                let color = rgb(temp_palette.color_at(celsius));
                cells.push(Rectangle::new(
                    [
                        (t_lo, -(p_hi as f64)),
                        (t_hi, -(p_lo as f64)),
                    ],
                    color.filled(),
                ));
            }
        }
        chart.draw_series(cells).map_err(plot_err)?;

        // Wind barbs every few hours, drawn in pixel space
        let area = chart.plotting_area();
        for (ti, time) in u_profile.times.iter().enumerate() {
            if time.forecast_hour % BARB_STEP_HOURS != 0 {
                continue;
            }
            let dt = time.valid_datetime().naive_utc();
            for (li, &level) in u_profile.levels_hpa.iter().enumerate() {
                let u = u_profile.values[ti][li];
                let v = v_profile.values[ti][li];
                if u.is_nan() || v.is_nan() {
                    continue;
                }
                let (cx, cy) = area.map_coordinate(&(dt, -(level as f64)));
                let style = BLACK.mix(0.35).stroke_width(1);
                for ((x0, y0), (x1, y1)) in barb_segments(u, v) {
                    root.draw(&PathElement::new(
                        vec![
                            (cx + (x0 * BARB_LEN_PX) as i32, cy - (y0 * BARB_LEN_PX) as i32),
                            (cx + (x1 * BARB_LEN_PX) as i32, cy - (y1 * BARB_LEN_PX) as i32),
                        ],
                        style,
                    ))
                    .map_err(plot_err)?;
                }
            }
        }

        // Corner annotations
        let style = ("sans-serif", 14).into_font().color(&BLACK);
        root.draw(&Text::new(run_label.to_string(), (70, 10), style.clone()))
            .map_err(plot_err)?;
        root.draw(&Text::new(
            format!("T and winds @{}", position),
            (70, 28),
            ("sans-serif", 12).into_font().color(&BLACK.mix(0.7)),
        ))
        .map_err(plot_err)?;
        root.draw(&Text::new(
            city.to_string(),
            (450, 10),
            ("sans-serif", 18).into_font().color(&BLACK),
        ))
        .map_err(plot_err)?;
    }

    // === Panel 1 colorbar ===
    {
        let mut chart = ChartBuilder::on(&cbar)
            .margin(8)
            .y_label_area_size(34)
            .x_label_area_size(12)
            .build_cartesian_2d(0.0f64..1.0f64, -70.0f64..40.0f64)
            .map_err(plot_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .y_desc("Temperature [C]")
            .draw()
            .map_err(plot_err)?;
        let mut slices = Vec::new();
        let mut t = -70.0f64;
        while t < 40.0 {
            let color = rgb(temp_palette.color_at(t as f32));
            slices.push(Rectangle::new(
                [(0.0, t), (1.0, t + 2.5)],
                color.filled(),
            ));
            t += 2.5;
        }
        chart.draw_series(slices).map_err(plot_err)?;
    }

    // === Panel 2: 2 m temperature and dew point ===
    {
        let t2m_pts = series_points(t2m);
        let td_pts = series_points(td2m);
        let (y0, y1) = padded_range(t2m_pts.iter().chain(&td_pts).map(|p| p.1));

        let mut chart = ChartBuilder::on(&panel2)
            .margin(8)
            .y_label_area_size(55)
            .x_label_area_size(12)
            .build_cartesian_2d(RangedDateTime::from(t_first..t_last), y0..y1)
            .map_err(plot_err)?;
        chart
            .configure_mesh()
            .x_labels(0)
            .y_desc("2m T, Td [C]")
            .draw()
            .map_err(plot_err)?;

        let dark_cyan = RGBColor(0, 139, 139);
        chart
            .draw_series(LineSeries::new(t2m_pts, dark_cyan.stroke_width(2)))
            .map_err(plot_err)?
            .label("2m T")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], dark_cyan.stroke_width(2))
            });
        let cyan_light = RGBColor(0, 139, 139).mix(0.5);
        chart
            .draw_series(LineSeries::new(td_pts, cyan_light.stroke_width(2)))
            .map_err(plot_err)?
            .label("2m Td")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], cyan_light.stroke_width(2))
            });
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 11))
            .border_style(BLACK.mix(0.3))
            .draw()
            .map_err(plot_err)?;
    }

    // === Panel 3: gusts + MSLP on a secondary axis ===
    {
        let gust_pts = series_points(gusts);
        let pmsl_pts = series_points(pmsl);
        let (g0, g1) = padded_range(gust_pts.iter().map(|p| p.1));
        let (p0, p1) = padded_range(pmsl_pts.iter().map(|p| p.1));

        let mut chart = ChartBuilder::on(&panel3)
            .margin(8)
            .y_label_area_size(55)
            .right_y_label_area_size(55)
            .x_label_area_size(12)
            .build_cartesian_2d(RangedDateTime::from(t_first..t_last), g0..g1)
            .map_err(plot_err)?
            .set_secondary_coord(RangedDateTime::from(t_first..t_last), p0..p1);

        chart
            .configure_mesh()
            .x_labels(0)
            .y_desc("Wind gust [km/h]")
            .draw()
            .map_err(plot_err)?;
        chart
            .configure_secondary_axes()
            .y_desc("MSLP [hPa]")
            .draw()
            .map_err(plot_err)?;

        let coral = RGBColor(240, 128, 128);
        chart
            .draw_series(LineSeries::new(gust_pts, coral.stroke_width(2)))
            .map_err(plot_err)?
            .label("Gusts")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], coral.stroke_width(2))
            });
        let magenta = MAGENTA;
        chart
            .draw_secondary_series(LineSeries::new(pmsl_pts, magenta.stroke_width(2)))
            .map_err(plot_err)?
            .label("MSLP")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], magenta.stroke_width(2))
            });
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 11))
            .border_style(BLACK.mix(0.3))
            .draw()
            .map_err(plot_err)?;
    }

    // === Panel 4: precipitation accumulation + rate ===
    {
        let rain_pts = series_points(rain_acc);
        let snow_pts = series_points(snow_acc);
        let acc_max = rain_pts
            .iter()
            .chain(&snow_pts)
            .map(|p| p.1)
            .fold(1.0f64, f64::max);

        let rate_series = |series: &PointSeries, rates: &[f32]| -> Vec<(NaiveDateTime, f64)> {
            series
                .times
                .iter()
                .zip(rates)
                .filter(|(_, v)| !v.is_nan())
                .map(|(t, &v)| (t.valid_datetime().naive_utc(), v as f64))
                .collect()
        };
        let rain_rate_pts = rate_series(rain_acc, rain_rate);
        let snow_rate_pts = rate_series(snow_acc, snow_rate);
        let rate_max = rain_rate_pts
            .iter()
            .chain(&snow_rate_pts)
            .map(|p| p.1)
            .fold(0.5f64, f64::max);

        let mut chart = ChartBuilder::on(&panel4)
            .margin(8)
            .y_label_area_size(55)
            .right_y_label_area_size(55)
            .x_label_area_size(45)
            .build_cartesian_2d(RangedDateTime::from(t_first..t_last), 0.0..acc_max * 1.1)
            .map_err(plot_err)?
            .set_secondary_coord(
                RangedDateTime::from(t_first..t_last),
                0.0..rate_max * 1.1,
            );

        chart
            .configure_mesh()
            .y_desc("Accum. [mm]")
            .x_label_formatter(&|dt: &NaiveDateTime| dt.format("%d %b %HZ").to_string())
            .x_labels(8)
            .draw()
            .map_err(plot_err)?;
        chart
            .configure_secondary_axes()
            .y_desc("Inst. [mm/h]")
            .draw()
            .map_err(plot_err)?;

        let dodger = RGBColor(30, 144, 255);
        let orchid = RGBColor(218, 112, 214);
        chart
            .draw_series(AreaSeries::new(rain_pts, 0.0, dodger.mix(0.2)))
            .map_err(plot_err)?
            .label("Rain (acc.)")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], dodger.stroke_width(2))
            });
        chart
            .draw_series(AreaSeries::new(snow_pts, 0.0, orchid.mix(0.2)))
            .map_err(plot_err)?
            .label("Snow (acc.)")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], orchid.stroke_width(2))
            });
        chart
            .draw_secondary_series(LineSeries::new(rain_rate_pts, dodger.stroke_width(2)))
            .map_err(plot_err)?;
        chart
            .draw_secondary_series(LineSeries::new(snow_rate_pts, orchid.stroke_width(2)))
            .map_err(plot_err)?;
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font(("sans-serif", 11))
            .border_style(BLACK.mix(0.3))
            .draw()
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}

fn midpoint(a: NaiveDateTime, b: NaiveDateTime) -> NaiveDateTime {
    a + (b - a) / 2
}
