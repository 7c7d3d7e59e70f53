//! The utilities module provides general capabilities, that may span the
//! input modeling, models, output analysis, and simulator modules.  The
//! utilities are centered around diagnostics and error reporting.

pub mod errors;

use errors::SimulationError;

/// Report a configuration flaw through the diagnostic channel, and hand the
/// error back for propagation.  Flaws are fatal to the run.
pub fn flaw(error: SimulationError) -> SimulationError {
    tracing::error!(flaw = %error, "model flaw");
    error
}

/// When the `console_error_panic_hook` feature is enabled, we can call the
/// `set_panic_hook` function at least once during initialization, and then
/// we will get better error messages if our code ever panics.
///
/// For more details see
/// <https://github.com/rustwasm/console_error_panic_hook#readme>
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flaw_returns_the_error() {
        let error = flaw(SimulationError::EmptyRoute(String::from("road")));
        assert!(matches!(error, SimulationError::EmptyRoute(ref name) if name == "road"));
        assert!(error.is_configuration_error());
    }
}
