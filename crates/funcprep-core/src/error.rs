use thiserror::Error;

#[derive(Error, Debug)]
pub enum FuncprepError {
    #[error("Transform must be 4x4, got {rows}x{cols}")]
    ShapeError { rows: usize, cols: usize },

    #[error("Grid mismatch in {context}: expected {expected:?}, got {found:?}")]
    GridMismatch {
        context: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Frames of one stack carry different affines")]
    AffineMismatch,

    #[error("Expected {expected} {what}, got {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Duplicate run {run:?} for {subject}/{session}/{experiment}")]
    DuplicateRun {
        subject: String,
        session: String,
        experiment: String,
        run: String,
    },

    #[error("Motion parameters must have 6 columns, got {found}")]
    MotionColumns { found: usize },

    #[error("Cannot normalize {context}: in-mask mean is {mean}")]
    DegenerateIntensity { context: String, mean: f64 },
}

pub type Result<T> = std::result::Result<T, FuncprepError>;
