//! Random variables underpin both stochastic and deterministic component
//! behaviors.  Deterministic operation is simply a random variable with a
//! single value of probability 1 (`Continuous::Constant`).  Common
//! distributions, with their common parameterizations, are wrapped in enums
//! `Continuous` (for times) and `Index` (for choosing among alternatives,
//! such as the lanes of a route).

use rand::distributions::Distribution;
use serde::{Deserialize, Serialize};
use rand_distr::{Beta, Exp, Gamma, LogNormal, Normal, Triangular, Uniform, Weibull};
use rand_distr::WeightedIndex;

use super::UniformRNG;
use crate::utils::errors::SimulationError;
use crate::utils::flaw;

/// rand panics on an empty or unbounded range, so the range is checked first.
fn uniform_range(min: f64, max: f64) -> Result<Uniform<f64>, SimulationError> {
    if min < max && (max - min).is_finite() {
        Ok(Uniform::new(min, max))
    } else {
        Err(SimulationError::UniformRangeError { min, max })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Continuous {
    Beta { alpha: f64, beta: f64 },
    Constant { value: f64 },
    Exp { lambda: f64 },
    Gamma { shape: f64, scale: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Normal { mean: f64, std_dev: f64 },
    Triangular { min: f64, max: f64, mode: f64 },
    Uniform { min: f64, max: f64 },
    Weibull { shape: f64, scale: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Index {
    /// Range is inclusive of min, exclusive of max: [min, max)
    Uniform {
        min: usize,
        max: usize,
    },
    WeightedIndex {
        weights: Vec<u64>,
    },
}

impl Continuous {
    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the model, and produces a f64 random variate.
    pub fn random_variate(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        match self {
            Continuous::Beta { alpha, beta } => {
                Ok(Beta::new(*alpha, *beta)?.sample(uniform_rng.rng()))
            }
            Continuous::Constant { value } => Ok(*value),
            Continuous::Exp { lambda } => Ok(Exp::new(*lambda)?.sample(uniform_rng.rng())),
            Continuous::Gamma { shape, scale } => {
                Ok(Gamma::new(*shape, *scale)?.sample(uniform_rng.rng()))
            }
            Continuous::LogNormal { mu, sigma } => {
                Ok(LogNormal::new(*mu, *sigma)?.sample(uniform_rng.rng()))
            }
            Continuous::Normal { mean, std_dev } => {
                Ok(Normal::new(*mean, *std_dev)?.sample(uniform_rng.rng()))
            }
            Continuous::Triangular { min, max, mode } => {
                Ok(Triangular::new(*min, *max, *mode)?.sample(uniform_rng.rng()))
            }
            Continuous::Uniform { min, max } => {
                Ok(uniform_range(*min, *max)?.sample(uniform_rng.rng()))
            }
            Continuous::Weibull { shape, scale } => {
                Ok(Weibull::new(*shape, *scale)?.sample(uniform_rng.rng()))
            }
        }
    }

    /// Check the parameters without drawing, so a bad model is refused
    /// when it is built rather than partway through a run.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let checked: Result<(), SimulationError> = match self {
            Continuous::Beta { alpha, beta } => Beta::new(*alpha, *beta).map(|_| ()).map_err(Into::into),
            Continuous::Constant { .. } => Ok(()),
            Continuous::Exp { lambda } => Exp::new(*lambda).map(|_| ()).map_err(Into::into),
            Continuous::Gamma { shape, scale } => {
                Gamma::new(*shape, *scale).map(|_| ()).map_err(Into::into)
            }
            Continuous::LogNormal { mu, sigma } => {
                LogNormal::new(*mu, *sigma).map(|_| ()).map_err(Into::into)
            }
            Continuous::Normal { mean, std_dev } => {
                Normal::new(*mean, *std_dev).map(|_| ()).map_err(Into::into)
            }
            Continuous::Triangular { min, max, mode } => {
                Triangular::new(*min, *max, *mode).map(|_| ()).map_err(Into::into)
            }
            Continuous::Uniform { min, max } => uniform_range(*min, *max).map(|_| ()),
            Continuous::Weibull { shape, scale } => {
                Weibull::new(*shape, *scale).map(|_| ()).map_err(Into::into)
            }
        };
        checked.map_err(flaw)
    }
}

impl Index {
    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the model, and produces a usize random variate.
    pub fn random_variate(
        &mut self,
        uniform_rng: &mut UniformRNG,
    ) -> Result<usize, SimulationError> {
        match self {
            Index::Uniform { min, max } => {
                if min >= max {
                    return Err(SimulationError::UniformRangeError {
                        min: *min as f64,
                        max: *max as f64,
                    });
                }
                Ok(Uniform::new(*min, *max).sample(uniform_rng.rng()))
            }
            Index::WeightedIndex { weights } => {
                Ok(WeightedIndex::new(weights.clone())?.sample(uniform_rng.rng()))
            }
        }
    }
}
