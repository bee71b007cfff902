use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use console::style;
use tracing::debug;

use funcprep_core::plan::generate_fanout;

#[derive(Args)]
pub struct PlanArgs {
    /// Project TOML file
    pub project: PathBuf,

    /// Experiment to enumerate (default: the project's default_experiment)
    #[arg(short, long)]
    pub experiment: Option<String>,

    /// Subjects to include, in order (default: every subject in the project)
    #[arg(short, long = "subject", value_name = "SUBJECT")]
    pub subjects: Vec<String>,

    /// Restrict to these sessions
    #[arg(long = "session", value_name = "SESSION")]
    pub sessions: Vec<String>,
}

pub fn run(args: &PlanArgs) -> Result<()> {
    let config = super::load_project(&args.project)?;
    let hierarchy = config.hierarchy()?;

    let experiment = match args.experiment.as_ref().or(config.default_experiment.as_ref()) {
        Some(name) => name.clone(),
        None => bail!("no experiment given and the project sets no default_experiment"),
    };

    let subjects: Vec<String> = if args.subjects.is_empty() {
        hierarchy.subjects().map(str::to_owned).collect()
    } else {
        args.subjects.clone()
    };
    let sessions = (!args.sessions.is_empty()).then_some(args.sessions.as_slice());

    debug!(experiment = %experiment, subjects = subjects.len(), "Planning fan-out");
    let fanout = generate_fanout(&hierarchy, &experiment, &subjects, sessions);

    if fanout.subjects.is_empty() {
        println!("No qualifying runs for {}", style(&experiment).bold());
        return Ok(());
    }

    println!("{} {}", style("Experiment:").bold(), experiment);
    for subject in &fanout.subjects {
        println!("{}", style(subject).bold());
        for key in &fanout.sessions[subject] {
            let runs = &fanout.runs[key];
            let run_ids: Vec<&str> = runs.iter().map(|run| run.run.as_str()).collect();
            println!("  {}  {}", key.session, run_ids.join(", "));
        }
    }
    Ok(())
}
