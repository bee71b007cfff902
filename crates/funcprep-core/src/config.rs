use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hierarchy::{ScanHierarchy, ScanMap};

/// Project description the CLI loads from a TOML file.
///
/// The scan table mirrors the hierarchy nesting:
///
/// ```toml
/// default_experiment = "exp_alpha"
///
/// [scan.subj01.sess01]
/// exp_alpha = ["run01", "run02"]
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Experiment used when none is given on the command line.
    #[serde(default)]
    pub default_experiment: Option<String>,
    /// subject -> session -> experiment -> run identifiers.
    pub scan: ScanMap,
}

impl ProjectConfig {
    /// Validate the scan table into an immutable hierarchy.
    pub fn hierarchy(&self) -> Result<ScanHierarchy> {
        ScanHierarchy::new(self.scan.clone())
    }
}
