use super::component::{ComponentCore, Identifiable, Position, Positioned, Reportable, StatTracked};
use super::QueueId;
use crate::input_modeling::{UniformRNG, Variate};
use crate::output_analysis::{StatReport, Statistic};
use crate::utils::errors::SimulationError;
use crate::utils::flaw;

use procsim_derive::Component;

/// Offset between the resumption times of actors released together.
pub const DEFAULT_STAGGER: f64 = 1.0e-9;

/// Default maximum number of actors released per opening.
pub const DEFAULT_CAP: usize = 10;

/// The gate is a timed barrier in front of a wait queue.  It alternates
/// between open and shut, holding each state for a duration drawn from
/// the on-time or off-time variate.  Actors passing a shut gate wait in its
/// queue; each time the gate opens, it releases at most `cap` of them.
/// The gate is driven by its own actor, which flips the gate `units` times
/// and then terminates.  The primary statistic is the duration of each
/// state actually used.
#[derive(Debug, Component)]
pub struct Gate {
    core: ComponentCore,
    queue: QueueId,
    units: usize,
    on_time: Box<dyn Variate>,
    off_time: Box<dyn Variate>,
    shut: bool,
    cap: usize,
    stagger: f64,
    openings: usize,
}

impl Gate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        queue: QueueId,
        units: usize,
        on_time: Box<dyn Variate>,
        off_time: Box<dyn Variate>,
        position: Position,
        shut: bool,
        cap: usize,
    ) -> Result<Self, SimulationError> {
        if cap < 1 {
            return Err(flaw(SimulationError::InvalidCapacity {
                component: name.to_string(),
                capacity: cap,
            }));
        }
        Ok(Self {
            core: ComponentCore::new(name, position, "state duration"),
            queue,
            units,
            on_time,
            off_time,
            shut,
            cap,
            stagger: DEFAULT_STAGGER,
            openings: 0,
        })
    }

    pub fn with_stagger(mut self, stagger: f64) -> Self {
        self.stagger = stagger.max(0.0);
        self
    }

    pub fn queue(&self) -> QueueId {
        self.queue
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn stagger(&self) -> f64 {
        self.stagger
    }

    pub fn is_shut(&self) -> bool {
        self.shut
    }

    pub fn openings(&self) -> usize {
        self.openings
    }

    /// Toggle between open and shut, returning whether the gate is now shut.
    pub(crate) fn flip(&mut self) -> bool {
        self.shut = !self.shut;
        if !self.shut {
            self.openings += 1;
        }
        self.shut
    }

    /// Draw how long the current state lasts.
    pub(crate) fn duration(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        let duration = if self.shut {
            self.off_time.draw(uniform_rng)?
        } else {
            self.on_time.draw(uniform_rng)?
        };
        self.core.tally(duration);
        Ok(duration)
    }

    pub fn color(&self) -> &'static str {
        if self.shut {
            "red"
        } else {
            "green"
        }
    }
}

impl Reportable for Gate {
    fn status(&self) -> String {
        if self.shut {
            String::from("Shut")
        } else {
            String::from("Open")
        }
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
    fn flip_alternates_and_draws_per_state() {
        let mut uniform_rng = UniformRNG::default();
        let mut gate = Gate::new(
            "light",
            QueueId(0),
            4,
            constant(3.0),
            constant(5.0),
            Position::default(),
            true,
            DEFAULT_CAP,
        )
        .unwrap();
        assert_eq!(gate.duration(&mut uniform_rng).unwrap(), 5.0);
        assert!(!gate.flip());
        assert_eq!(gate.color(), "green");
        assert_eq!(gate.duration(&mut uniform_rng).unwrap(), 3.0);
        assert!(gate.flip());
        assert_eq!(gate.openings(), 1);
        assert_eq!(gate.statistic().count(), 2);
    }
}
