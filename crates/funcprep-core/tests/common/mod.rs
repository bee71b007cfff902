#![allow(dead_code)]

use ndarray::{Array2, Array3, Array4};

use funcprep_core::volume::{FrameStack, Mask, Volume, WarpField};

/// Deterministic xorshift generator so fixtures are reproducible without
/// any global random state.
pub struct TestRng(u64);

impl TestRng {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform value in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    }

    /// Uniform integer in [0, n).
    pub fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// Identity orientation with isotropic 2 mm voxels.
pub fn test_affine() -> Array2<f64> {
    let mut affine = Array2::eye(4);
    for i in 0..3 {
        affine[[i, i]] = 2.0;
    }
    affine
}

/// A second, deliberately different affine for geometry-provenance tests.
pub fn oblique_affine() -> Array2<f64> {
    let mut affine = Array2::eye(4);
    affine[[0, 0]] = -2.0;
    affine[[1, 1]] = -2.0;
    affine[[1, 2]] = -1.0;
    affine[[2, 1]] = 1.0;
    affine[[0, 3]] = 10.0;
    affine[[1, 3]] = 10.0;
    affine[[2, 3]] = 5.0;
    affine
}

pub fn uniform_volume(
    rng: &mut TestRng,
    shape: (usize, usize, usize),
    lo: f64,
    hi: f64,
) -> Volume {
    let data = Array3::from_shape_simple_fn(shape, || rng.uniform(lo, hi));
    Volume::new(data, test_affine()).unwrap()
}

pub fn uniform_stack(
    rng: &mut TestRng,
    shape: (usize, usize, usize),
    n_frames: usize,
    lo: f64,
    hi: f64,
) -> FrameStack {
    let data =
        Array4::from_shape_simple_fn((shape.0, shape.1, shape.2, n_frames), || {
            rng.uniform(lo, hi)
        });
    FrameStack::new(data, test_affine()).unwrap()
}

pub fn uniform_warp(rng: &mut TestRng, shape: (usize, usize, usize), lo: f64, hi: f64) -> WarpField {
    let data =
        Array4::from_shape_simple_fn((shape.0, shape.1, shape.2, 3), || rng.uniform(lo, hi));
    WarpField::new(data, test_affine()).unwrap()
}

/// Random mask keeping roughly `keep_fraction` of the voxels.
pub fn random_mask(rng: &mut TestRng, shape: (usize, usize, usize), keep_fraction: f64) -> Mask {
    let data = Array3::from_shape_simple_fn(shape, || rng.uniform(0.0, 1.0) < keep_fraction);
    Mask::new(data, test_affine()).unwrap()
}
