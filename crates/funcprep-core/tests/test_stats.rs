mod common;

use approx::assert_abs_diff_eq;
use ndarray::{s, Array3, Array4};

use common::TestRng;
use funcprep_core::stats::{detrend_linear, temporal_mean, temporal_snr, temporal_std};

const SHAPE: (usize, usize, usize) = (3, 2, 2);

fn random_stack(seed: u64, n: usize) -> Array4<f64> {
    let mut rng = TestRng::new(seed);
    Array4::from_shape_simple_fn((SHAPE.0, SHAPE.1, SHAPE.2, n), || rng.uniform(-5.0, 5.0))
}

#[test]
fn test_temporal_mean_and_std_known_values() {
    let mut data = Array4::zeros((1, 1, 1, 4));
    data.slice_mut(s![0, 0, 0, ..])
        .assign(&ndarray::array![2.0, 4.0, 4.0, 6.0]);

    let mean = temporal_mean(&data);
    let std = temporal_std(&data);

    assert_abs_diff_eq!(mean[[0, 0, 0]], 4.0, epsilon = 1e-12);
    // Population standard deviation: sqrt(mean of squared deviations).
    assert_abs_diff_eq!(std[[0, 0, 0]], 2.0f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn test_tsnr_suppresses_degenerate_denominators() {
    let mut data = Array4::zeros((2, 1, 1, 5));
    // Constant voxel: zero temporal std.
    data.slice_mut(s![0, 0, 0, ..]).fill(7.0);
    // Varying voxel.
    data.slice_mut(s![1, 0, 0, ..])
        .assign(&ndarray::array![9.0, 11.0, 10.0, 9.0, 11.0]);

    let mask = Array3::from_elem((2, 1, 1), true);
    let tsnr = temporal_snr(&data, &mask);

    assert_eq!(tsnr[[0, 0, 0]], 0.0);
    assert!(tsnr[[1, 0, 0]].is_finite());
    assert!(tsnr[[1, 0, 0]] > 0.0);
}

#[test]
fn test_tsnr_zero_outside_mask() {
    let data = random_stack(71, 6);
    let mut mask = Array3::from_elem(SHAPE, true);
    mask[[0, 0, 0]] = false;

    let tsnr = temporal_snr(&data, &mask);
    assert_eq!(tsnr[[0, 0, 0]], 0.0);
}

#[test]
fn test_detrend_preserves_means() {
    let data = random_stack(72, 9);
    let mask = Array3::from_elem(SHAPE, true);

    let before = temporal_mean(&data);
    let mut detrended = data.clone();
    detrend_linear(&mut detrended, &mask);
    let after = temporal_mean(&detrended);

    assert_abs_diff_eq!(before, after, epsilon = 1e-10);
}

#[test]
fn test_detrend_removes_linear_ramp() {
    let n = 10;
    let mut data = Array4::zeros((1, 1, 1, n));
    for t in 0..n {
        data[[0, 0, 0, t]] = 3.0 - 0.5 * t as f64;
    }
    let mask = Array3::from_elem((1, 1, 1), true);

    detrend_linear(&mut data, &mask);

    let mean = data.sum() / n as f64;
    for t in 0..n {
        assert_abs_diff_eq!(data[[0, 0, 0, t]], mean, epsilon = 1e-12);
    }
}

#[test]
fn test_detrend_skips_masked_out_voxels() {
    let data = random_stack(73, 7);
    let mut mask = Array3::from_elem(SHAPE, false);
    mask[[1, 1, 1]] = true;

    let mut detrended = data.clone();
    detrend_linear(&mut detrended, &mask);

    assert_abs_diff_eq!(
        detrended.slice(s![0, 0, 0, ..]),
        data.slice(s![0, 0, 0, ..]),
        epsilon = 0.0
    );
}

#[test]
fn test_detrend_single_frame_is_noop() {
    let mut data = random_stack(74, 1);
    let expected = data.clone();
    let mask = Array3::from_elem(SHAPE, true);

    detrend_linear(&mut data, &mask);
    assert_abs_diff_eq!(data, expected, epsilon = 0.0);
}

#[test]
fn test_reductions_are_deterministic() {
    let data = random_stack(75, 8);
    let mask = Array3::from_elem(SHAPE, true);

    assert_abs_diff_eq!(temporal_mean(&data), temporal_mean(&data), epsilon = 0.0);
    assert_abs_diff_eq!(temporal_std(&data), temporal_std(&data), epsilon = 0.0);
    assert_abs_diff_eq!(
        temporal_snr(&data, &mask),
        temporal_snr(&data, &mask),
        epsilon = 0.0
    );
}
