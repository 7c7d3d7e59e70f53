use serde::{Deserialize, Serialize};

use crate::output_analysis::StatReport;

/// Entity counts for a run.  Until shutdown, `created` always equals
/// `departed + retired + in_system`; afterwards the discarded actors make
/// up the difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Population {
    pub created: usize,
    /// Left through a sink
    pub departed: usize,
    /// Finished their body without a sink
    pub retired: usize,
    /// Terminated at shutdown without being resumed
    pub discarded: usize,
    pub in_system: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReport {
    pub name: String,
    pub kind: String,
    pub status: String,
    pub statistics: Vec<StatReport>,
}

/// The end-of-run summary of a `Director`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub model: String,
    pub clock: f64,
    pub events_processed: usize,
    pub population: Population,
    pub components: Vec<ComponentReport>,
}

impl Report {
    pub fn component(&self, name: &str) -> Option<&ComponentReport> {
        self.components.iter().find(|component| component.name == name)
    }
}
