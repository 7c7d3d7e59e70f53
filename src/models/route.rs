use serde::{Deserialize, Serialize};

use super::component::{ComponentCore, Identifiable, Position, Positioned, Reportable, StatTracked};
use super::TransportId;
use crate::input_modeling::{IndexRandomVariable, UniformRNG};
use crate::output_analysis::{StatReport, Statistic};
use crate::utils::errors::SimulationError;
use crate::utils::flaw;

use procsim_derive::Component;

/// How a route picks the lane for each actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaneChoice {
    /// Cycle through the lanes in order
    RoundRobin,
    /// Pick a lane uniformly at random
    Random,
    /// Pick a lane at random, in proportion to the weights
    Weighted { weights: Vec<u64> },
}

impl Default for LaneChoice {
    fn default() -> Self {
        LaneChoice::RoundRobin
    }
}

/// The route is a fixed set of parallel transports ("lanes") between the
/// same pair of components.  Each actor moving on the route travels one
/// lane, picked by the route's lane choice.  Random choices draw from the
/// model's generator, so a fixed seed reproduces the lane sequence.  The
/// primary statistic is the selected lane index.
#[derive(Debug, Component)]
pub struct Route {
    core: ComponentCore,
    lanes: Vec<TransportId>,
    choice: LaneChoice,
    next_lane: usize,
    selections: Vec<usize>,
}

impl Route {
    pub fn new(
        name: &str,
        lanes: Vec<TransportId>,
        choice: LaneChoice,
        position: Position,
    ) -> Result<Self, SimulationError> {
        if lanes.is_empty() {
            return Err(flaw(SimulationError::EmptyRoute(name.to_string())));
        }
        if let LaneChoice::Weighted { weights } = &choice {
            if weights.len() != lanes.len() {
                return Err(flaw(SimulationError::InvalidModelState(format![
                    "route {} has {} lanes but {} weights",
                    name,
                    lanes.len(),
                    weights.len()
                ])));
            }
        }
        let selections = vec![0; lanes.len()];
        Ok(Self {
            core: ComponentCore::new(name, position, "lane"),
            lanes,
            choice,
            next_lane: 0,
            selections,
        })
    }

    pub fn lanes(&self) -> &[TransportId] {
        &self.lanes
    }

    pub fn choice(&self) -> &LaneChoice {
        &self.choice
    }

    /// How many actors each lane has carried.
    pub fn selections(&self) -> &[usize] {
        &self.selections
    }

    /// Pick the lane for the next actor, returning its index and transport.
    pub(crate) fn select(
        &mut self,
        uniform_rng: &mut UniformRNG,
    ) -> Result<(usize, TransportId), SimulationError> {
        let index = match &self.choice {
            LaneChoice::RoundRobin => {
                let index = self.next_lane;
                self.next_lane = (self.next_lane + 1) % self.lanes.len();
                index
            }
            LaneChoice::Random => IndexRandomVariable::Uniform {
                min: 0,
                max: self.lanes.len(),
            }
            .random_variate(uniform_rng)?,
            LaneChoice::Weighted { weights } => IndexRandomVariable::WeightedIndex {
                weights: weights.clone(),
            }
            .random_variate(uniform_rng)?,
        };
        self.selections[index] += 1;
        self.core.tally(index as f64);
        Ok((index, self.lanes[index]))
    }
}

impl Reportable for Route {
    fn status(&self) -> String {
        format!["{} lanes, carried {:?}", self.lanes.len(), self.selections]
    }

    fn statistics(&self, _now: f64) -> Vec<StatReport> {
        vec![self.core.statistic().report()]
    }
}
