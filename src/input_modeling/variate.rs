use std::fmt;

use super::{ContinuousRandomVariable, UniformRNG};
use crate::utils::errors::SimulationError;

/// A `Variate` produces random numbers on demand.  Components hold their
/// own variates (service time, travel time, inter-arrival time), and draw
/// from them with the model's uniform random number generator.
pub trait Variate: fmt::Debug {
    fn draw(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError>;
}

impl Variate for ContinuousRandomVariable {
    fn draw(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        self.random_variate(uniform_rng)
    }
}

impl<V: Variate + ?Sized> Variate for Box<V> {
    fn draw(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        (**self).draw(uniform_rng)
    }
}

/// Deterministic times are a variate with a single value of probability 1.
pub fn constant(value: f64) -> Box<dyn Variate> {
    Box::new(ContinuousRandomVariable::Constant { value })
}
