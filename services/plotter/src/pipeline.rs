//! The chunk/parallel dispatcher and the per-unit renderer.
//!
//! The time axis is partitioned into contiguous chunks; each chunk renders
//! sequentially inside one worker, in time order, because the colorbar is
//! attached by the first unit seen. Dispatch is fail-fast: the first chunk
//! error aborts the run.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use chart_common::{ChartError, ChartResult};
use forecast_data::{chunk_ranges, Dataset, TimeSlice};
use renderer::annotate::Loc;
use renderer::{annotate, colorbar, hatch, numbers, shading, vectors, Frame};

use crate::bundle::RenderBundle;

/// Execution mode of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Render the first two timesteps in-process
    Debug,
    /// Chunk the time axis over the worker pool
    Parallel,
}

/// Per-chunk render accounting, used by the pipeline contracts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChunkStats {
    /// Frames written
    pub frames: usize,
    /// Colorbar attachments (one per chunk, on the first unit)
    pub colorbar_attached: u32,
}

/// Run the per-unit renderer over the dataset.
pub fn dispatch(
    bundle: Arc<RenderBundle>,
    dataset: Arc<Dataset>,
    mode: DispatchMode,
) -> ChartResult<Vec<ChunkStats>> {
    match mode {
        DispatchMode::Debug => {
            let n = dataset.num_times().min(2);
            debug!(timesteps = n, "debug mode, sequential render");
            Ok(vec![render_chunk(&bundle, &dataset, 0..n)?])
        }
        DispatchMode::Parallel => {
            let chunks = chunk_ranges(dataset.num_times(), bundle.config.chunk_size);
            info!(
                chunks = chunks.len(),
                processes = bundle.config.processes,
                "launching plotting over worker pool"
            );
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(bundle.config.processes)
                .build()
                .map_err(|e| ChartError::RenderError(format!("worker pool: {}", e)))?;

            pool.install(|| {
                chunks
                    .into_par_iter()
                    .map(|range| render_chunk(&bundle, &dataset, range))
                    .collect::<ChartResult<Vec<_>>>()
            })
        }
    }
}

/// Render one chunk of timesteps, strictly in time order.
pub fn render_chunk(
    bundle: &RenderBundle,
    dataset: &Dataset,
    range: std::ops::Range<usize>,
) -> ChartResult<ChunkStats> {
    // Worker-local base map; the colorbar is merged into it by the first
    // unit so it appears on every later frame of the chunk.
    let mut base = bundle.base.clone();
    let mut stats = ChunkStats::default();

    for t in range {
        let slice = dataset.slice(t);

        if stats.colorbar_attached == 0 {
            colorbar::draw_horizontal(
                &mut base,
                &bundle.spec.shading,
                bundle.spec.colorbar_label,
                &bundle.font,
            );
            stats.colorbar_attached += 1;
        }

        let mut frame = Frame::new(&base);
        draw_unit(&mut frame, bundle, slice)?;

        let path = bundle.config.frame_path(
            bundle.view.name,
            bundle.spec.variable_name,
            &slice.time().cum_hour_label(),
        );
        frame.save(&path, &bundle.config.save)?;
        debug!(file = %path.display(), "frame written");
        stats.frames += 1;

        // frame dropped here: the unit's artifacts are released on every
        // exit path, the base map persists for the next unit
    }

    Ok(stats)
}

/// Draw all graphical and annotation layers of one unit.
fn draw_unit(frame: &mut Frame<'_>, bundle: &RenderBundle, slice: TimeSlice<'_>) -> ChartResult<()> {
    let spec = &bundle.spec;
    let canvas = frame.image_mut();

    let primary = slice.values(spec.primary)?;
    shading::shade_cells(
        canvas,
        &bundle.xs,
        &bundle.ys,
        bundle.nx,
        bundle.ny,
        primary,
        &spec.shading,
    );

    if let Some(h) = &spec.hatch {
        let values = slice.values(h.field)?;
        hatch::hatch_band(
            canvas,
            &bundle.xs,
            &bundle.ys,
            bundle.nx,
            bundle.ny,
            values,
            h.low,
            h.high,
            [70, 70, 70, 255],
        );
    }

    if let Some(v) = &spec.vectors {
        let u = slice.values(v.u)?;
        let w = slice.values(v.v)?;
        vectors::draw_arrows(
            canvas,
            &bundle.xs,
            &bundle.ys,
            bundle.nx,
            bundle.ny,
            u,
            w,
            v.stride,
            v.scale,
            [110, 110, 110, 220],
        );
    }

    if let Some(l) = &spec.value_labels {
        let values = slice.values(l.field)?;
        numbers::draw_values(
            canvas,
            &bundle.xs,
            &bundle.ys,
            bundle.nx,
            bundle.ny,
            values,
            &spec.shading,
            bundle.view.label_density,
            &bundle.font,
            l.size,
        );
    }

    let time = slice.time();
    let ink = [25, 25, 25, 255];
    annotate::draw_annotation(canvas, &time.forecast_label(), Loc::UpperRight, &bundle.font, 12.0, ink);
    annotate::draw_annotation(canvas, &time.run_label(), Loc::UpperLeft, &bundle.font, 12.0, ink);
    annotate::draw_annotation_within(
        canvas,
        bundle.map_height,
        spec.caption,
        Loc::LowerLeft,
        &bundle.font,
        11.0,
        ink,
    );

    if let Some(logo) = &bundle.logo {
        annotate::overlay_logo(canvas, logo, Loc::LowerRight);
    }

    Ok(())
}
