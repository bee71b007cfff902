use std::collections::BTreeMap;

use tracing::debug;

use crate::hierarchy::{RunKey, ScanHierarchy, SessionKey};

/// Ordered fan-out structures the task-graph executor schedules over.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FanOut {
    /// Requested subjects with at least one qualifying run, in the
    /// caller's order.
    pub subjects: Vec<String>,
    /// Subject -> qualifying sessions, lexicographic.
    pub sessions: BTreeMap<String, Vec<SessionKey>>,
    /// Session -> qualifying runs, sorted by run identifier.
    pub runs: BTreeMap<SessionKey, Vec<RunKey>>,
}

/// Enumerate the (subject, session, run) combinations of one experiment.
///
/// Subjects keep the caller-supplied order; sessions and runs iterate
/// lexicographically. A subject or session left with no qualifying runs
/// after filtering is dropped from every output rather than represented
/// as an empty list. Pure: identical inputs yield identical outputs.
pub fn generate_fanout(
    hierarchy: &ScanHierarchy,
    experiment: &str,
    subjects: &[String],
    sessions: Option<&[String]>,
) -> FanOut {
    let mut fanout = FanOut::default();

    for subject in subjects {
        let mut session_keys = Vec::new();
        for session in hierarchy.sessions(subject) {
            if let Some(wanted) = sessions {
                if !wanted.iter().any(|s| s == session) {
                    continue;
                }
            }
            let runs = match hierarchy.runs(subject, session, experiment) {
                Some(runs) if !runs.is_empty() => runs,
                _ => continue,
            };
            let key = SessionKey {
                subject: subject.clone(),
                session: session.to_owned(),
            };
            let run_keys = runs
                .iter()
                .map(|run| RunKey {
                    subject: subject.clone(),
                    session: session.to_owned(),
                    run: run.clone(),
                })
                .collect();
            fanout.runs.insert(key.clone(), run_keys);
            session_keys.push(key);
        }
        if !session_keys.is_empty() {
            fanout.sessions.insert(subject.clone(), session_keys);
            fanout.subjects.push(subject.clone());
        }
    }

    debug!(
        experiment,
        subjects = fanout.subjects.len(),
        sessions = fanout.runs.len(),
        "Fan-out generated"
    );
    fanout
}
