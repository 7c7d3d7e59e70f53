use super::component::{ComponentCore, Identifiable, Position, Positioned, Reportable, StatTracked};
use crate::input_modeling::{UniformRNG, Variate};
use crate::output_analysis::{StatReport, Statistic};
use crate::utils::errors::SimulationError;

use procsim_derive::Component;

/// The junction is a pass-through with latency.  An actor jumping through
/// the junction is delayed by a jump time drawn from the junction's
/// variate.  There is no capacity constraint, so any number of actors may
/// be in transit at once.
#[derive(Debug, Component)]
pub struct Junction {
    core: ComponentCore,
    jump_time: Box<dyn Variate>,
    in_transit: usize,
}

impl Junction {
    pub fn new(name: &str, jump_time: Box<dyn Variate>, position: Position) -> Self {
        Self {
            core: ComponentCore::new(name, position, "jump time"),
            jump_time,
            in_transit: 0,
        }
    }

    pub fn in_transit(&self) -> usize {
        self.in_transit
    }

    pub(crate) fn enter(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        let delay = self.jump_time.draw(uniform_rng)?;
        self.core.tally(delay);
        Ok(delay)
    }

    pub(crate) fn admit(&mut self) {
        self.in_transit += 1;
    }

    pub(crate) fn exit(&mut self) {
        self.in_transit = self.in_transit.saturating_sub(1);
    }

    pub(crate) fn clear(&mut self) {
        self.in_transit = 0;
    }
}

impl Reportable for Junction {
    fn status(&self) -> String {
        format!["{} in transit", self.in_transit]
    }

    fn statistics(&self, _now: f64) -> Vec<StatReport> {
        vec![self.core.statistic().report()]
    }
}
