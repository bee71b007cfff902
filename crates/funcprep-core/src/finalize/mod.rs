mod template;
mod timeseries;
mod unwarp;

pub use template::{finalize_template, RunSummary, TemplateOutput};
pub use timeseries::{finalize_timeseries, TimeseriesOutput};
pub use unwarp::{finalize_unwarping, PhaseEncoding, UnwarpOutput};
