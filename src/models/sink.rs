use super::component::{ComponentCore, Identifiable, Position, Positioned, Reportable, StatTracked};
use crate::output_analysis::{StatReport, Statistic};

use procsim_derive::Component;

/// The sink removes actors from the model.  The primary statistic is the
/// total time each departing actor spent in the system.
#[derive(Debug, Clone, Component)]
pub struct Sink {
    core: ComponentCore,
    departures: usize,
}

impl Sink {
    pub fn new(name: &str, position: Position) -> Self {
        Self {
            core: ComponentCore::new(name, position, "time in system"),
            departures: 0,
        }
    }

    pub fn departures(&self) -> usize {
        self.departures
    }

    pub(crate) fn absorb(&mut self, time_in_system: f64) {
        self.departures += 1;
        self.core.tally(time_in_system);
    }
}

impl Reportable for Sink {
    fn status(&self) -> String {
        format!["{} departed", self.departures]
    }

    fn statistics(&self, _now: f64) -> Vec<StatReport> {
        vec![self.core.statistic().report()]
    }
}
