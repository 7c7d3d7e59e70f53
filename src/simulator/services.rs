use crate::input_modeling::UniformRNG;
use crate::utils::errors::SimulationError;
use crate::utils::flaw;

/// The `Director` provides a uniform random number generator and the
/// simulation clock to components and actor bodies during a run.
#[derive(Debug, Clone, Default)]
pub struct Services {
    uniform_rng: UniformRNG,
    global_time: f64,
}

impl Services {
    pub fn new(seed: u64) -> Self {
        Self {
            uniform_rng: UniformRNG::new(seed),
            global_time: 0.0,
        }
    }

    pub fn uniform_rng(&mut self) -> &mut UniformRNG {
        &mut self.uniform_rng
    }

    pub fn seed(&self) -> u64 {
        self.uniform_rng.seed()
    }

    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    /// Move the clock forward.  The clock never runs backwards.
    pub(crate) fn advance_to(&mut self, time: f64) -> Result<(), SimulationError> {
        if !(time >= self.global_time) {
            return Err(flaw(SimulationError::InvalidModelState(format![
                "clock cannot move from {} back to {}",
                self.global_time, time
            ])));
        }
        self.global_time = time;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_only_moves_forward() {
        let mut services = Services::new(3);
        services.advance_to(2.5).unwrap();
        assert!(services.advance_to(1.0).is_err());
        assert!(services.advance_to(f64::NAN).is_err());
        assert_eq!(services.global_time(), 2.5);
        assert_eq!(services.uniform_rng().seed(), 3);
    }
}
