use super::component::{ComponentCore, Identifiable, Position, Positioned, Reportable, StatTracked};
use super::QueueId;
use crate::input_modeling::{UniformRNG, Variate};
use crate::output_analysis::{StatReport, Statistic, TimeStatistic};
use crate::utils::errors::SimulationError;
use crate::utils::flaw;

use procsim_derive::Component;

/// The resource is a finite-capacity server.  An actor utilizing the
/// resource occupies one of its units for a service time drawn from the
/// resource's variate.  When every unit is busy, arriving actors wait in
/// the associated wait queue, and a release hands the freed unit directly
/// to the head of that queue.  The primary statistic is the service time.
#[derive(Debug, Component)]
pub struct Resource {
    core: ComponentCore,
    units: usize,
    busy: usize,
    queue: Option<QueueId>,
    service_time: Box<dyn Variate>,
    busy_units: TimeStatistic,
    served: usize,
}

impl Resource {
    pub fn new(
        name: &str,
        units: usize,
        service_time: Box<dyn Variate>,
        queue: Option<QueueId>,
        position: Position,
    ) -> Result<Self, SimulationError> {
        if units < 1 {
            return Err(flaw(SimulationError::InvalidCapacity {
                component: name.to_string(),
                capacity: units,
            }));
        }
        Ok(Self {
            core: ComponentCore::new(name, position, "service time"),
            units,
            busy: 0,
            queue,
            service_time,
            busy_units: TimeStatistic::new(&format!["{} busy units", name], 0.0),
            served: 0,
        })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn busy(&self) -> usize {
        self.busy
    }

    pub fn queue(&self) -> Option<QueueId> {
        self.queue
    }

    pub fn served(&self) -> usize {
        self.served
    }

    pub fn has_idle_unit(&self) -> bool {
        self.busy < self.units
    }

    /// Occupy one unit.
    pub(crate) fn seize(&mut self, now: f64) -> Result<(), SimulationError> {
        if !self.has_idle_unit() {
            return Err(flaw(SimulationError::InvalidModelState(format![
                "resource {} has no idle unit to seize",
                self.core.name()
            ])));
        }
        self.busy += 1;
        self.busy_units.accumulate(self.busy as f64, now);
        Ok(())
    }

    /// Free one unit.
    pub(crate) fn vacate(&mut self, now: f64) -> Result<(), SimulationError> {
        if self.busy == 0 {
            return Err(flaw(SimulationError::ResourceIdle {
                resource: self.core.name().to_string(),
            }));
        }
        self.busy -= 1;
        self.served += 1;
        self.busy_units.accumulate(self.busy as f64, now);
        Ok(())
    }

    pub(crate) fn draw_service_time(
        &mut self,
        uniform_rng: &mut UniformRNG,
    ) -> Result<f64, SimulationError> {
        let service_time = self.service_time.draw(uniform_rng)?;
        self.core.tally(service_time);
        Ok(service_time)
    }

    /// Mean fraction of units busy over [0, now].
    pub fn utilization(&self, now: f64) -> f64 {
        self.busy_units.mean(now) / self.units as f64
    }
}

impl Reportable for Resource {
    fn status(&self) -> String {
        format!["{} of {} units busy", self.busy, self.units]
    }

    fn statistics(&self, now: f64) -> Vec<StatReport> {
        vec![self.core.statistic().report(), self.busy_units.report(now)]
    }
}
