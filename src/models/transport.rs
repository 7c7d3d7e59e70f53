use super::component::{ComponentCore, Identifiable, Position, Positioned, Reportable, StatTracked};
use crate::input_modeling::{UniformRNG, Variate};
use crate::output_analysis::{StatReport, Statistic};
use crate::utils::errors::SimulationError;

use procsim_derive::Component;

/// The transport moves actors between two components, over a travel time
/// drawn from its variate.  The endpoints are kept as positions, so the
/// animator can draw the path and move tokens along it.  The primary
/// statistic is the travel time.
#[derive(Debug, Component)]
pub struct Transport {
    core: ComponentCore,
    travel_time: Box<dyn Variate>,
    from: Position,
    to: Position,
    in_transit: usize,
}

impl Transport {
    pub fn new(name: &str, travel_time: Box<dyn Variate>, from: Position, to: Position) -> Self {
        let (x1, y1) = from.center();
        let (x2, y2) = to.center();
        let position = Position::new(x1, y1, x2 - x1, y2 - y1);
        Self {
            core: ComponentCore::new(name, position, "travel time"),
            travel_time,
            from,
            to,
            in_transit: 0,
        }
    }

    pub fn from(&self) -> &Position {
        &self.from
    }

    pub fn to(&self) -> &Position {
        &self.to
    }

    pub fn in_transit(&self) -> usize {
        self.in_transit
    }

    /// Straight-line path from the center of the origin to the center of
    /// the destination: [x1, y1, x2, y2].
    pub fn path(&self) -> Vec<f64> {
        let (x1, y1) = self.from.center();
        let (x2, y2) = self.to.center();
        vec![x1, y1, x2, y2]
    }

    pub(crate) fn depart(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        let travel_time = self.travel_time.draw(uniform_rng)?;
        self.core.tally(travel_time);
        Ok(travel_time)
    }

    /// Count an actor whose trip has been scheduled.
    pub(crate) fn board(&mut self) {
        self.in_transit += 1;
    }

    pub(crate) fn arrive(&mut self) {
        self.in_transit = self.in_transit.saturating_sub(1);
    }

    pub(crate) fn clear(&mut self) {
        self.in_transit = 0;
    }
}

impl Reportable for Transport {
    fn status(&self) -> String {
        format!["{} in transit", self.in_transit]
    }

    fn statistics(&self, _now: f64) -> Vec<StatReport> {
        vec![self.core.statistic().report()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_modeling::variate::constant;

    #[test]
    fn path_joins_endpoint_centers() {
        let road = Transport::new(
            "road",
            constant(4.0),
            Position::new(0.0, 0.0, 2.0, 2.0),
            Position::new(10.0, 4.0, 2.0, 2.0),
        );
        assert_eq!(road.path(), vec![1.0, 1.0, 11.0, 5.0]);
        assert_eq!(road.position(), &Position::new(1.0, 1.0, 10.0, 4.0));
    }
}
