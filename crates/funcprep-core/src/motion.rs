use ndarray::{s, Array2};

use crate::consts::MOTION_PARAM_COUNT;
use crate::error::{FuncprepError, Result};

/// Column convention of a motion-parameter table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionOrder {
    /// rot_x, rot_y, rot_z, trans_x, trans_y, trans_z
    RotationFirst,
    /// trans_x, trans_y, trans_z, rot_x, rot_y, rot_z
    TranslationFirst,
}

/// Column names of the finalized (rotation-first) convention.
pub const MOTION_COLUMNS: [&str; MOTION_PARAM_COUNT] =
    ["rot_x", "rot_y", "rot_z", "trans_x", "trans_y", "trans_z"];

/// Rigid-body realignment parameters, one 6-tuple per time point.
///
/// Values pass through finalization unchanged; only the column order is
/// normalized.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionParameters {
    params: Array2<f64>,
    order: MotionOrder,
}

impl MotionParameters {
    pub fn new(params: Array2<f64>, order: MotionOrder) -> Result<Self> {
        let found = params.ncols();
        if found != MOTION_PARAM_COUNT {
            return Err(FuncprepError::MotionColumns { found });
        }
        Ok(Self { params, order })
    }

    pub fn n_timepoints(&self) -> usize {
        self.params.nrows()
    }

    pub fn order(&self) -> MotionOrder {
        self.order
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.params
    }

    /// Re-emit with the rotation triplet first; values are bit-preserved
    /// apart from the column swap.
    pub fn rotation_first(&self) -> MotionParameters {
        match self.order {
            MotionOrder::RotationFirst => self.clone(),
            MotionOrder::TranslationFirst => {
                let mut params = Array2::zeros(self.params.raw_dim());
                params
                    .slice_mut(s![.., 0..3])
                    .assign(&self.params.slice(s![.., 3..6]));
                params
                    .slice_mut(s![.., 3..6])
                    .assign(&self.params.slice(s![.., 0..3]));
                MotionParameters {
                    params,
                    order: MotionOrder::RotationFirst,
                }
            }
        }
    }
}
