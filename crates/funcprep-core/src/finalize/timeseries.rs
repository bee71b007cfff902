use ndarray::{Array3, Array4, Axis, Zip};
use tracing::debug;

use crate::consts::{NOISE_COV_RATIO, NORM_TARGET};
use crate::error::{FuncprepError, Result};
use crate::motion::MotionParameters;
use crate::stats::{detrend_linear, temporal_mean, temporal_snr, temporal_std};
use crate::volume::{check_frame_count, check_same_grid, FrameStack, Mask, Volume};

/// Finalized products of one run's time series.
#[derive(Clone, Debug)]
pub struct TimeseriesOutput {
    /// Modulated, normalized, detrended time series; zero outside the
    /// functional mask.
    pub func: FrameStack,
    /// The functional mask as a numeric 0/1 volume.
    pub mask: Volume,
    /// Temporal mean per in-mask voxel, zero elsewhere.
    pub mean: Volume,
    /// Temporal SNR per in-mask voxel, zero elsewhere.
    pub tsnr: Volume,
    /// In-mask voxels unlikely to carry signal.
    pub noise: Mask,
    /// Motion parameters re-emitted rotation-first.
    pub motion: MotionParameters,
}

/// Apply jacobian modulation, masking, intensity normalization, and
/// detrending to one run's unwarped time series.
///
/// The functional mask is the conjunction of the brain mask with the
/// acquisition field of view (voxels sampled in every frame). After
/// normalization the in-mask global mean equals [`NORM_TARGET`];
/// detrending removes each voxel's linear trend without changing its
/// temporal mean. Jacobian modulation uses channel 0 of the supplied
/// jacobian stack.
pub fn finalize_timeseries(
    frames: &FrameStack,
    jacobian: &FrameStack,
    seg: &Volume,
    brain_mask: &Mask,
    motion: &MotionParameters,
) -> Result<TimeseriesOutput> {
    let grid = frames.grid();
    check_same_grid("jacobian stack", &grid, &jacobian.grid())?;
    check_same_grid("segmentation", &grid, &seg.grid())?;
    check_same_grid("brain mask", &grid, &brain_mask.grid())?;
    check_frame_count("motion timepoints", frames.n_frames(), motion.n_timepoints())?;

    // Field of view: voxels sampled in every frame.
    let [x, y, z] = grid;
    let mut fov = Array3::from_elem((x, y, z), true);
    for frame in frames.data.axis_iter(Axis(3)) {
        Zip::from(&mut fov)
            .and(&frame)
            .for_each(|inside, &value| *inside &= value != 0.0);
    }
    let fov = Mask::new(fov, frames.affine.clone())?;
    let func_mask = fov.and(brain_mask)?;

    debug!(
        n_frames = frames.n_frames(),
        mask_voxels = func_mask.count(),
        "Finalizing timeseries"
    );

    // Jacobian modulation (channel 0), restricted to the mask.
    let jacobian0 = jacobian.data.index_axis(Axis(3), 0);
    let mut data = frames.data.clone();
    for mut frame in data.axis_iter_mut(Axis(3)) {
        Zip::from(&mut frame)
            .and(&jacobian0)
            .and(&func_mask.data)
            .for_each(|value, &jac, &keep| *value = if keep { *value * jac } else { 0.0 });
    }

    // Global intensity normalization. The reduction is sequential so the
    // scale is bit-stable across repeated executions.
    let mut sum = 0.0;
    let mut count = 0usize;
    Zip::from(data.lanes(Axis(3)))
        .and(&func_mask.data)
        .for_each(|lane, &keep| {
            if keep {
                sum += lane.sum();
                count += lane.len();
            }
        });
    let grand_mean = if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    };
    if !grand_mean.is_finite() || grand_mean == 0.0 {
        return Err(FuncprepError::DegenerateIntensity {
            context: "timeseries stack".into(),
            mean: grand_mean,
        });
    }
    data *= NORM_TARGET / grand_mean;

    detrend_linear(&mut data, &func_mask.data);

    let mean = temporal_mean(&data);
    let tsnr = temporal_snr(&data, &func_mask.data);
    let noise = noise_mask(&data, seg, &func_mask);

    Ok(TimeseriesOutput {
        mask: func_mask.to_volume(),
        mean: Volume::new(mean, frames.affine.clone())?,
        tsnr: Volume::new(tsnr, frames.affine.clone())?,
        noise,
        motion: motion.rotation_first(),
        func: FrameStack::new(data, frames.affine.clone())?,
    })
}

/// Flag in-mask voxels unlikely to carry signal: voxels outside the
/// labeled anatomy, plus voxels whose temporal coefficient of variation
/// is an outlier against the in-mask median.
fn noise_mask(data: &Array4<f64>, seg: &Volume, func_mask: &Mask) -> Mask {
    let mean = temporal_mean(data);
    let std = temporal_std(data);

    let mut cov = Array3::from_elem(mean.raw_dim(), f64::NAN);
    Zip::from(&mut cov)
        .and(&mean)
        .and(&std)
        .and(&func_mask.data)
        .for_each(|cov, &mean, &std, &keep| {
            if keep {
                *cov = std / mean;
            }
        });

    let mut in_mask: Vec<f64> = cov.iter().copied().filter(|c| c.is_finite()).collect();
    in_mask.sort_by(f64::total_cmp);
    let median = if in_mask.is_empty() {
        0.0
    } else {
        in_mask[in_mask.len() / 2]
    };
    let threshold = NOISE_COV_RATIO * median;

    let data = Zip::from(&cov)
        .and(&seg.data)
        .and(&func_mask.data)
        .map_collect(|&cov, &label, &keep| {
            keep && (label == 0.0 || !cov.is_finite() || cov <= 0.0 || cov > threshold)
        });
    Mask {
        data,
        affine: func_mask.affine.clone(),
    }
}
