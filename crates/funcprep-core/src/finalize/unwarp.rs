use ndarray::{Array3, Axis};
use tracing::debug;

use crate::consts::{AP_COMPONENT, WARP_MASK_THRESHOLD};
use crate::error::Result;
use crate::volume::{check_frame_count, check_same_grid, FrameStack, Mask, Volume, WarpField};

/// Phase-encoding polarity of one acquired frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEncoding {
    /// Anterior-to-posterior traversal of the phase axis.
    AnteriorPosterior,
    /// Posterior-to-anterior traversal.
    PosteriorAnterior,
}

impl PhaseEncoding {
    /// Axis code consumed by the external distortion estimator.
    pub fn axis_code(self) -> &'static str {
        match self {
            PhaseEncoding::AnteriorPosterior => "y",
            PhaseEncoding::PosteriorAnterior => "y-",
        }
    }
}

/// Products of distortion-correction finalization for one session.
#[derive(Clone, Debug)]
pub struct UnwarpOutput {
    /// Frame 0 of the raw stack, untouched.
    pub raw: Volume,
    /// Mean of the jacobian-modulated corrected frames.
    pub corrected: Volume,
    /// Warp field of the reference frame.
    pub warp: WarpField,
    /// Voxels whose anterior-posterior displacement stays inside the
    /// validity threshold.
    pub warp_mask: Mask,
    /// Per-frame jacobians stacked along a new trailing axis.
    pub jacobian: FrameStack,
    /// Acquisition polarity per frame, for downstream reporting only.
    pub phase_encoding: Vec<PhaseEncoding>,
}

/// Reduce per-frame distortion-correction products to reference-space
/// outputs.
///
/// The corrected volume is `sum(corrected_i * jacobian_i) / n_frames`: a
/// plain arithmetic mean of the modulated frames, not a weighted average
/// normalized by the jacobian sum. Output geometry comes from the
/// warp/jacobian inputs, which need not match the raw input's affine.
/// The arithmetic never branches on phase-encoding polarity; the labels
/// only travel through for reporting.
pub fn finalize_unwarping(
    raw: &FrameStack,
    corrected: &FrameStack,
    warps: &[WarpField],
    jacobians: &[Volume],
    phase_encoding: &[PhaseEncoding],
) -> Result<UnwarpOutput> {
    let n_frames = raw.n_frames();
    let grid = raw.grid();

    check_same_grid("corrected stack", &grid, &corrected.grid())?;
    check_frame_count("corrected frames", n_frames, corrected.n_frames())?;
    check_frame_count("warp fields", n_frames, warps.len())?;
    check_frame_count("jacobian frames", n_frames, jacobians.len())?;
    check_frame_count("phase-encoding labels", n_frames, phase_encoding.len())?;
    for warp in warps {
        check_same_grid("warp field", &grid, &warp.grid())?;
    }
    for jacobian in jacobians {
        check_same_grid("jacobian frame", &grid, &jacobian.grid())?;
    }

    debug!(n_frames, "Finalizing unwarp products");

    let raw_ref = raw.frame(0)?;

    let [x, y, z] = grid;
    let mut accum = Array3::<f64>::zeros((x, y, z));
    for (frame, jacobian) in corrected.data.axis_iter(Axis(3)).zip(jacobians) {
        accum += &(&frame * &jacobian.data);
    }
    accum /= n_frames as f64;
    let corrected_out = Volume::new(accum, jacobians[0].affine.clone())?;

    let warp = warps[0].clone();
    let mask_data = warp
        .component(AP_COMPONENT)
        .mapv(|displacement| displacement.abs() < WARP_MASK_THRESHOLD);
    let warp_mask = Mask::new(mask_data, warp.affine.clone())?;

    let jacobian = FrameStack::from_frames(jacobians)?;

    Ok(UnwarpOutput {
        raw: raw_ref,
        corrected: corrected_out,
        warp,
        warp_mask,
        jacobian,
        phase_encoding: phase_encoding.to_vec(),
    })
}
