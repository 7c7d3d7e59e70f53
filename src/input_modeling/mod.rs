//! The input modeling module provides a foundation for configurable model
//! behaviors, whether that is deterministic or stochastic.  The module
//! includes a set of random variable distributions for component service,
//! travel and inter-arrival times, the `Variate` capability that components
//! draw from, and the seeded uniform random number generator behind them.

pub mod random_variable;
pub mod uniform_rng;
pub mod variate;

pub use random_variable::Continuous as ContinuousRandomVariable;
pub use random_variable::Index as IndexRandomVariable;
pub use uniform_rng::UniformRNG;
pub use variate::Variate;
