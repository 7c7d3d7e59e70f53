use std::fmt;

use super::component::{ComponentCore, Identifiable, Position, Positioned, Reportable, StatTracked};
use crate::input_modeling::{UniformRNG, Variate};
use crate::output_analysis::{StatReport, Statistic};
use crate::simulator::Script;
use crate::utils::errors::SimulationError;
use crate::utils::flaw;

use procsim_derive::Component;

/// Builds the body of each actor a source creates, given the actor's
/// serial number (starting at 1).
pub type ScriptFactory = Box<dyn FnMut(usize) -> Box<dyn Script>>;

/// The source creates actors.  It is driven by its own actor, which starts
/// at `start`, creates one actor per activation through the factory, and
/// holds for an inter-arrival draw between creations until `units` actors
/// exist.  The primary statistic is the inter-arrival time.
#[derive(Component)]
pub struct Source {
    core: ComponentCore,
    units: usize,
    made: usize,
    interarrival: Box<dyn Variate>,
    start: f64,
    factory: ScriptFactory,
}

impl Source {
    pub fn new(
        name: &str,
        units: usize,
        interarrival: Box<dyn Variate>,
        factory: ScriptFactory,
        start: f64,
        position: Position,
    ) -> Result<Self, SimulationError> {
        if !(start >= 0.0 && start.is_finite()) {
            return Err(flaw(SimulationError::InvalidStart {
                component: name.to_string(),
                start,
            }));
        }
        Ok(Self {
            core: ComponentCore::new(name, position, "inter-arrival time"),
            units,
            made: 0,
            interarrival,
            start,
            factory,
        })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn made(&self) -> usize {
        self.made
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn is_exhausted(&self) -> bool {
        self.made >= self.units
    }

    /// Build the next actor body, returning its serial number with it.
    pub(crate) fn make(&mut self) -> (usize, Box<dyn Script>) {
        self.made += 1;
        (self.made, (self.factory)(self.made))
    }

    pub(crate) fn draw_interarrival(
        &mut self,
        uniform_rng: &mut UniformRNG,
    ) -> Result<f64, SimulationError> {
        let interarrival = self.interarrival.draw(uniform_rng)?;
        self.core.tally(interarrival);
        Ok(interarrival)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("core", &self.core)
            .field("units", &self.units)
            .field("made", &self.made)
            .field("interarrival", &self.interarrival)
            .field("start", &self.start)
            .finish()
    }
}

impl Reportable for Source {
    fn status(&self) -> String {
        format!["made {} of {}", self.made, self.units]
    }

    fn statistics(&self, _now: f64) -> Vec<StatReport> {
        vec![self.core.statistic().report()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_modeling::variate::constant;
    use crate::simulator::{script_fn, Action, ActorContext};

    fn done(_: &mut ActorContext<'_>) -> Result<Action, SimulationError> {
        Ok(Action::Done)
    }

    fn source(start: f64) -> Result<Source, SimulationError> {
        Source::new(
            "entry",
            2,
            constant(1.0),
            Box::new(|_: usize| script_fn(done)),
            start,
            Position::default(),
        )
    }

    #[test]
    fn start_must_be_a_non_negative_time() {
        assert!(matches!(
            source(-1.0),
            Err(SimulationError::InvalidStart { .. })
        ));
        assert!(source(f64::NAN).is_err());
        assert!(source(f64::INFINITY).is_err());
        assert_eq!(source(0.0).unwrap().start(), 0.0);
    }

    #[test]
    fn make_numbers_actors_until_exhausted() {
        let mut entry = source(3.0).unwrap();
        assert_eq!(entry.make().0, 1);
        assert!(!entry.is_exhausted());
        assert_eq!(entry.make().0, 2);
        assert!(entry.is_exhausted());
    }
}
