use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// Project TOML file
    pub project: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config = super::load_project(&args.project)?;
    let hierarchy = config.hierarchy()?;

    if let Some(ref experiment) = config.default_experiment {
        println!("Default experiment: {}", experiment);
    }

    for subject in hierarchy.subjects() {
        println!("{}", subject);
        for session in hierarchy.sessions(subject) {
            for experiment in hierarchy.experiments(subject, session) {
                let n_runs = hierarchy
                    .runs(subject, session, experiment)
                    .map_or(0, <[String]>::len);
                println!("  {}  {:<16} {} run(s)", session, experiment, n_runs);
            }
        }
    }
    Ok(())
}
