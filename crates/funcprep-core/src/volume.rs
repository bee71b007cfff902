use ndarray::{Array2, Array3, Array4, ArrayView3, Axis, Zip};

use crate::consts::WARP_COMPONENT_COUNT;
use crate::error::{FuncprepError, Result};

pub(crate) fn check_affine(affine: &Array2<f64>) -> Result<()> {
    let (rows, cols) = affine.dim();
    if rows != 4 || cols != 4 {
        return Err(FuncprepError::ShapeError { rows, cols });
    }
    Ok(())
}

pub(crate) fn check_same_grid(
    context: &'static str,
    expected: &[usize],
    found: &[usize],
) -> Result<()> {
    if expected != found {
        return Err(FuncprepError::GridMismatch {
            context,
            expected: expected.to_vec(),
            found: found.to_vec(),
        });
    }
    Ok(())
}

pub(crate) fn check_frame_count(
    what: &'static str,
    expected: usize,
    found: usize,
) -> Result<()> {
    if expected != found {
        return Err(FuncprepError::LengthMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

/// A 3-D scalar image with a 4x4 voxel-to-world affine.
///
/// Shape and affine together define the geometry. Derived volumes always
/// carry an explicit affine of their own; it is never assumed to match
/// the input's.
#[derive(Clone, Debug)]
pub struct Volume {
    pub data: Array3<f64>,
    pub affine: Array2<f64>,
}

impl Volume {
    pub fn new(data: Array3<f64>, affine: Array2<f64>) -> Result<Self> {
        check_affine(&affine)?;
        Ok(Self { data, affine })
    }

    pub fn grid(&self) -> [usize; 3] {
        let (x, y, z) = self.data.dim();
        [x, y, z]
    }
}

/// A boolean volume on the same grid as its companion data.
#[derive(Clone, Debug)]
pub struct Mask {
    pub data: Array3<bool>,
    pub affine: Array2<f64>,
}

impl Mask {
    pub fn new(data: Array3<bool>, affine: Array2<f64>) -> Result<Self> {
        check_affine(&affine)?;
        Ok(Self { data, affine })
    }

    pub fn grid(&self) -> [usize; 3] {
        let (x, y, z) = self.data.dim();
        [x, y, z]
    }

    /// Voxelwise conjunction with another mask on the same grid.
    pub fn and(&self, other: &Mask) -> Result<Mask> {
        check_same_grid("mask conjunction", &self.grid(), &other.grid())?;
        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|&a, &b| a && b);
        Ok(Mask {
            data,
            affine: self.affine.clone(),
        })
    }

    /// Voxelwise union with another mask on the same grid.
    pub fn or(&self, other: &Mask) -> Result<Mask> {
        check_same_grid("mask union", &self.grid(), &other.grid())?;
        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|&a, &b| a || b);
        Ok(Mask {
            data,
            affine: self.affine.clone(),
        })
    }

    /// Number of voxels inside the mask.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&inside| inside).count()
    }

    /// Cast to a numeric 0/1 volume at the same geometry.
    pub fn to_volume(&self) -> Volume {
        Volume {
            data: self.data.mapv(|inside| if inside { 1.0 } else { 0.0 }),
            affine: self.affine.clone(),
        }
    }
}

/// An ordered sequence of volumes sharing grid and affine, stacked along
/// a trailing temporal axis. Frame 0 is the reference frame.
#[derive(Clone, Debug)]
pub struct FrameStack {
    pub data: Array4<f64>,
    pub affine: Array2<f64>,
}

impl FrameStack {
    pub fn new(data: Array4<f64>, affine: Array2<f64>) -> Result<Self> {
        check_affine(&affine)?;
        if data.len_of(Axis(3)) == 0 {
            return Err(FuncprepError::EmptySequence);
        }
        Ok(Self { data, affine })
    }

    /// Stack per-frame volumes along a new trailing axis.
    ///
    /// All frames must share grid and affine.
    pub fn from_frames(frames: &[Volume]) -> Result<Self> {
        let first = frames.first().ok_or(FuncprepError::EmptySequence)?;
        for frame in &frames[1..] {
            check_same_grid("frame stack", &first.grid(), &frame.grid())?;
            if frame.affine != first.affine {
                return Err(FuncprepError::AffineMismatch);
            }
        }
        let [x, y, z] = first.grid();
        let mut data = Array4::zeros((x, y, z, frames.len()));
        for (index, frame) in frames.iter().enumerate() {
            data.index_axis_mut(Axis(3), index).assign(&frame.data);
        }
        Ok(Self {
            data,
            affine: first.affine.clone(),
        })
    }

    pub fn n_frames(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    pub fn grid(&self) -> [usize; 3] {
        let (x, y, z, _) = self.data.dim();
        [x, y, z]
    }

    /// Owned copy of one frame, carrying the stack affine.
    pub fn frame(&self, index: usize) -> Result<Volume> {
        let total = self.n_frames();
        if index >= total {
            return Err(FuncprepError::FrameIndexOutOfRange { index, total });
        }
        Ok(Volume {
            data: self.data.index_axis(Axis(3), index).to_owned(),
            affine: self.affine.clone(),
        })
    }
}

/// A voxelwise displacement field: one 3-vector per voxel, component 1 on
/// the anterior-posterior axis.
#[derive(Clone, Debug)]
pub struct WarpField {
    pub data: Array4<f64>,
    pub affine: Array2<f64>,
}

impl WarpField {
    pub fn new(data: Array4<f64>, affine: Array2<f64>) -> Result<Self> {
        check_affine(&affine)?;
        let found = data.len_of(Axis(3));
        if found != WARP_COMPONENT_COUNT {
            return Err(FuncprepError::LengthMismatch {
                what: "displacement components",
                expected: WARP_COMPONENT_COUNT,
                found,
            });
        }
        Ok(Self { data, affine })
    }

    pub fn grid(&self) -> [usize; 3] {
        let (x, y, z, _) = self.data.dim();
        [x, y, z]
    }

    /// View of one displacement component.
    pub fn component(&self, index: usize) -> ArrayView3<'_, f64> {
        self.data.index_axis(Axis(3), index)
    }
}
