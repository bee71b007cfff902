use ndarray::{Array3, ArrayView3, Axis, Zip};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::consts::{NORM_TARGET, PARALLEL_FRAME_THRESHOLD};
use crate::error::{FuncprepError, Result};
use crate::stats::temporal_mean;
use crate::volume::{check_frame_count, check_same_grid, FrameStack, Mask, Volume};

/// Per-run finalized statistics feeding one session template.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub mean: Volume,
    pub tsnr: Volume,
    pub mask: Mask,
    pub noise: Mask,
}

/// Session-level template products aggregated across runs.
#[derive(Clone, Debug)]
pub struct TemplateOutput {
    /// Normalized mean template volume; zero outside the mask.
    pub template: Volume,
    /// Conjunction of the per-run masks: the common field of view.
    pub mask: Mask,
    /// Union of the per-run noise masks.
    pub noise: Mask,
    /// Across-run average of the per-run temporal means.
    pub mean: Volume,
    /// Across-run average of the per-run temporal SNR maps.
    pub tsnr: Volume,
}

/// Aggregate finalized runs of one session into a session template.
///
/// The combined mask keeps only voxels valid in every run; the combined
/// noise mask flags voxels noisy in any run. The template itself is the
/// temporal mean of the pooled jacobian-modulated frames, each frame
/// first rescaled so its in-mask mean equals [`NORM_TARGET`]. Every
/// output is zero outside the combined mask.
pub fn finalize_template(
    runs: &[RunSummary],
    frames: &FrameStack,
    jacobian: &FrameStack,
) -> Result<TemplateOutput> {
    let first = runs.first().ok_or(FuncprepError::EmptySequence)?;
    let grid = first.mask.grid();
    for run in runs {
        check_same_grid("run mean", &grid, &run.mean.grid())?;
        check_same_grid("run tsnr", &grid, &run.tsnr.grid())?;
        check_same_grid("run mask", &grid, &run.mask.grid())?;
        check_same_grid("run noise mask", &grid, &run.noise.grid())?;
    }
    check_same_grid("template frames", &grid, &frames.grid())?;
    check_same_grid("template jacobian", &grid, &jacobian.grid())?;
    check_frame_count("jacobian frames", frames.n_frames(), jacobian.n_frames())?;

    debug!(
        runs = runs.len(),
        frames = frames.n_frames(),
        "Finalizing session template"
    );

    // Conjunction: the common field of view across runs.
    let mut mask = first.mask.clone();
    for run in &runs[1..] {
        mask = mask.and(&run.mask)?;
    }

    // Union: a voxel noisy in any run is excluded downstream.
    let mut noise = first.noise.clone();
    for run in &runs[1..] {
        noise = noise.or(&run.noise)?;
    }

    let [x, y, z] = grid;
    let n_runs = runs.len() as f64;
    let mut mean_accum = Array3::<f64>::zeros((x, y, z));
    let mut tsnr_accum = Array3::<f64>::zeros((x, y, z));
    for run in runs {
        mean_accum += &run.mean.data;
        tsnr_accum += &run.tsnr.data;
    }
    mean_accum /= n_runs;
    tsnr_accum /= n_runs;
    zero_outside(&mut mean_accum, &mask);
    zero_outside(&mut tsnr_accum, &mask);

    // Pooled template frames: modulate, rescale each frame's in-mask
    // mean to the target, then average over frames.
    let mut data = &frames.data * &jacobian.data;
    let frame_means: Vec<f64> = if frames.n_frames() >= PARALLEL_FRAME_THRESHOLD {
        data.axis_iter(Axis(3))
            .into_par_iter()
            .map(|frame| in_mask_mean(&frame, &mask))
            .collect()
    } else {
        data.axis_iter(Axis(3))
            .map(|frame| in_mask_mean(&frame, &mask))
            .collect()
    };
    for (index, (mut frame, &frame_mean)) in data
        .axis_iter_mut(Axis(3))
        .zip(&frame_means)
        .enumerate()
    {
        if !frame_mean.is_finite() || frame_mean == 0.0 {
            return Err(FuncprepError::DegenerateIntensity {
                context: format!("template frame {index}"),
                mean: frame_mean,
            });
        }
        frame *= NORM_TARGET / frame_mean;
    }

    let mut template = temporal_mean(&data);
    zero_outside(&mut template, &mask);

    info!(mask_voxels = mask.count(), "Session template finalized");

    Ok(TemplateOutput {
        template: Volume::new(template, frames.affine.clone())?,
        mean: Volume::new(mean_accum, first.mean.affine.clone())?,
        tsnr: Volume::new(tsnr_accum, first.tsnr.affine.clone())?,
        mask,
        noise,
    })
}

fn zero_outside(data: &mut Array3<f64>, mask: &Mask) {
    Zip::from(data).and(&mask.data).for_each(|value, &keep| {
        if !keep {
            *value = 0.0;
        }
    });
}

/// Sequential in-frame reduction; NaN when the mask is empty.
fn in_mask_mean(frame: &ArrayView3<'_, f64>, mask: &Mask) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    Zip::from(frame).and(&mask.data).for_each(|&value, &keep| {
        if keep {
            sum += value;
            count += 1;
        }
    });
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
