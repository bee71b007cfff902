use ndarray::Array2;

use crate::error::Result;
use crate::volume::check_affine;

/// A validated 4x4 affine mapping coordinates between two named imaging
/// spaces.
#[derive(Clone, Debug, PartialEq)]
pub struct AffineTransform {
    matrix: Array2<f64>,
}

impl AffineTransform {
    pub fn new(matrix: Array2<f64>) -> Result<Self> {
        check_affine(&matrix)?;
        Ok(Self { matrix })
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn into_matrix(self) -> Array2<f64> {
        self.matrix
    }

    /// Composition in application order: apply `self` first, then `next`.
    ///
    /// Matrix form is the left product `next * self`.
    pub fn then(&self, next: &AffineTransform) -> AffineTransform {
        AffineTransform {
            matrix: next.matrix.dot(&self.matrix),
        }
    }
}

/// Reduce the chained registrations of one run to the two transforms the
/// resampling steps consume.
///
/// `ts2fm` applies time-series-to-reference first, then
/// reference-to-fieldmap; `fm2template` applies fieldmap-to-anatomical,
/// then anatomical-to-template. Pure numeric composition; no tolerance
/// checks, callers are responsible for transform validity.
pub fn combine_transforms(
    ts2sb: &Array2<f64>,
    sb2fm: &Array2<f64>,
    fm2anat: &Array2<f64>,
    anat2template: &Array2<f64>,
) -> Result<(Array2<f64>, Array2<f64>)> {
    for matrix in [ts2sb, sb2fm, fm2anat, anat2template] {
        check_affine(matrix)?;
    }
    Ok((sb2fm.dot(ts2sb), anat2template.dot(fm2anat)))
}
