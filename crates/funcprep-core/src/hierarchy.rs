use std::collections::BTreeMap;

use crate::error::{FuncprepError, Result};

/// One scanning visit for a subject.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    pub subject: String,
    pub session: String,
}

/// One acquisition of an experiment within a session.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunKey {
    pub subject: String,
    pub session: String,
    pub run: String,
}

/// Nested scan description: subject -> session -> experiment -> runs.
pub type ScanMap = BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<String>>>>;

/// Which (experiment, run) combinations exist per subject and session.
///
/// Run lists are sorted at construction and checked for duplicates, so
/// iteration over every level is lexicographic regardless of how the
/// input mapping was ordered. Immutable once built; lifetime is one
/// pipeline invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanHierarchy {
    scans: ScanMap,
}

impl ScanHierarchy {
    pub fn new(mut scans: ScanMap) -> Result<Self> {
        for (subject, sessions) in scans.iter_mut() {
            for (session, experiments) in sessions.iter_mut() {
                for (experiment, runs) in experiments.iter_mut() {
                    runs.sort();
                    for pair in runs.windows(2) {
                        if pair[0] == pair[1] {
                            return Err(FuncprepError::DuplicateRun {
                                subject: subject.clone(),
                                session: session.clone(),
                                experiment: experiment.clone(),
                                run: pair[0].clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(Self { scans })
    }

    /// Subjects in lexicographic order.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.scans.keys().map(String::as_str)
    }

    /// Sessions of one subject in lexicographic order.
    pub fn sessions(&self, subject: &str) -> impl Iterator<Item = &str> {
        self.scans
            .get(subject)
            .into_iter()
            .flat_map(|sessions| sessions.keys())
            .map(String::as_str)
    }

    /// Experiments acquired in one session, in lexicographic order.
    pub fn experiments(&self, subject: &str, session: &str) -> impl Iterator<Item = &str> {
        self.scans
            .get(subject)
            .and_then(|sessions| sessions.get(session))
            .into_iter()
            .flat_map(|experiments| experiments.keys())
            .map(String::as_str)
    }

    /// Runs of one experiment in one session, sorted by identifier.
    pub fn runs(&self, subject: &str, session: &str, experiment: &str) -> Option<&[String]> {
        self.scans
            .get(subject)?
            .get(session)?
            .get(experiment)
            .map(Vec::as_slice)
    }
}
