use ndarray::{Array3, Array4, ArrayView1, ArrayViewMut1, Axis, Zip};

use crate::consts::PARALLEL_VOXEL_THRESHOLD;

/// Per-voxel mean over the temporal axis.
pub fn temporal_mean(data: &Array4<f64>) -> Array3<f64> {
    let n = data.len_of(Axis(3)) as f64;
    data.sum_axis(Axis(3)) / n
}

/// Per-voxel population standard deviation over the temporal axis.
pub fn temporal_std(data: &Array4<f64>) -> Array3<f64> {
    let (x, y, z, _) = data.dim();
    let mut out = Array3::zeros((x, y, z));
    let zip = Zip::from(&mut out).and(data.lanes(Axis(3)));
    if x * y * z >= PARALLEL_VOXEL_THRESHOLD {
        zip.par_for_each(|out, lane| *out = lane_std(lane));
    } else {
        zip.for_each(|out, lane| *out = lane_std(lane));
    }
    out
}

fn lane_std(lane: ArrayView1<'_, f64>) -> f64 {
    let n = lane.len() as f64;
    let mean = lane.sum() / n;
    let mut var = 0.0;
    for &value in lane {
        let dev = value - mean;
        var += dev * dev;
    }
    (var / n).sqrt()
}

/// Per-voxel temporal SNR (mean over std), restricted to `mask`.
///
/// A degenerate denominator is an expected condition in masked-out and
/// constant voxels; it produces zero, never NaN or infinity.
pub fn temporal_snr(data: &Array4<f64>, mask: &Array3<bool>) -> Array3<f64> {
    let mean = temporal_mean(data);
    let std = temporal_std(data);
    Zip::from(&mean)
        .and(&std)
        .and(mask)
        .map_collect(|&mean, &std, &keep| {
            let snr = mean / std;
            if keep && snr.is_finite() {
                snr
            } else {
                0.0
            }
        })
}

/// Remove each in-mask voxel's best-fit linear trend over time, keeping
/// its temporal mean.
///
/// Subtracting `slope * (t - t_mean)` removes exactly the fitted trend
/// while leaving the per-voxel mean untouched. Stacks shorter than two
/// frames have no trend to remove.
pub fn detrend_linear(data: &mut Array4<f64>, mask: &Array3<bool>) {
    let (x, y, z, n) = data.dim();
    if n < 2 {
        return;
    }
    let t_mean = (n as f64 - 1.0) / 2.0;
    let t_centered: Vec<f64> = (0..n).map(|t| t as f64 - t_mean).collect();
    let t_var: f64 = t_centered.iter().map(|&t| t * t).sum();

    let detrend = |mut lane: ArrayViewMut1<'_, f64>, &keep: &bool| {
        if !keep {
            return;
        }
        let mut cov = 0.0;
        for (value, &t) in lane.iter().zip(&t_centered) {
            cov += *value * t;
        }
        let slope = cov / t_var;
        for (value, &t) in lane.iter_mut().zip(&t_centered) {
            *value -= slope * t;
        }
    };

    let zip = Zip::from(data.lanes_mut(Axis(3))).and(mask);
    if x * y * z >= PARALLEL_VOXEL_THRESHOLD {
        zip.par_for_each(detrend);
    } else {
        zip.for_each(detrend);
    }
}
