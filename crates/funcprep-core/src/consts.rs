/// Global intensity-normalization target. Dimensionless arbitrary-unit
/// scale shared across the whole pipeline so downstream statistics are
/// comparable across runs, sessions, and subjects.
pub const NORM_TARGET: f64 = 10_000.0;

/// Warp validity threshold, in voxel units, on the absolute
/// anterior-posterior displacement of the reference frame.
pub const WARP_MASK_THRESHOLD: f64 = 4.0;

/// Index of the anterior-posterior component in a displacement vector.
pub const AP_COMPONENT: usize = 1;

/// Number of displacement components in a warp field.
pub const WARP_COMPONENT_COUNT: usize = 3;

/// Number of rigid-body motion parameters per time point.
pub const MOTION_PARAM_COUNT: usize = 6;

/// A func-mask voxel whose temporal coefficient of variation exceeds this
/// multiple of the in-mask median is flagged as noise.
pub const NOISE_COV_RATIO: f64 = 1.5;

/// Minimum voxel count (x*y*z) to use voxel-level Rayon parallelism.
pub const PARALLEL_VOXEL_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;
