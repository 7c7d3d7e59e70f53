use thiserror::Error;

/// `SimulationError` enumerates all possible errors returned by procsim
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents a component configured with fewer than one unit of capacity
    #[error("Component {component} was configured with capacity {capacity}, but at least 1 is required")]
    InvalidCapacity { component: String, capacity: usize },

    /// Represents a resource that had to queue an actor, but has no wait queue
    #[error("Resource {resource} is fully utilized and has no wait queue")]
    MissingQueue { resource: String },

    /// Represents a negative (or NaN) scheduling delay
    #[error("Actor {actor} was scheduled with invalid delay {delay}")]
    NegativeDelay { actor: String, delay: f64 },

    /// Represents an attempt to resume or reschedule the actor that holds the baton
    #[error("Actor {actor} is already active")]
    ActorAlreadyActive { actor: String },

    /// Represents an attempt to schedule an actor that is already on the event list
    #[error("Actor {actor} is already scheduled")]
    ActorAlreadyScheduled { actor: String },

    /// Represents an operation on an actor in the wrong lifecycle state
    #[error("Actor {actor} is {state}, which does not permit this operation")]
    InvalidActorState { actor: String, state: String },

    /// Represents an operation requested on an actor that does not exist
    #[error("A specified actor cannot be found in the model")]
    ActorNotFound,

    /// Represents a second component registered under an existing name
    #[error("A component named {0} is already registered")]
    DuplicateComponent(String),

    /// Represents an operation requested on a component that does not exist
    #[error("Component {0} cannot be found in the model")]
    ComponentNotFound(String),

    /// Represents a route configured without lanes
    #[error("Route {0} has no lanes")]
    EmptyRoute(String),

    /// Represents a source scheduled to start before time 0 (or at NaN)
    #[error("Source {component} was configured to start at {start}, but the start must be a non-negative time")]
    InvalidStart { component: String, start: f64 },

    /// Represents a uniform distribution over an empty or unbounded range
    #[error("Uniform distribution requires min < max over a finite range, but was given [{min}, {max})")]
    UniformRangeError { min: f64, max: f64 },

    /// Represents a release of a resource with no busy units
    #[error("Resource {resource} was released while idle")]
    ResourceIdle { resource: String },

    /// Represents a lifecycle command issued in the wrong phase of the run
    #[error("The model is {found}, but the operation requires it to be {expected}")]
    InvalidPhase {
        expected: &'static str,
        found: &'static str,
    },

    /// Represents an invalid model state
    #[error("An invalid model state was encountered: {0}")]
    InvalidModelState(String),

    /// Transparent serde_json errors
    #[error(transparent)]
    JSONError(#[from] serde_json::error::Error),

    /// Transparent serde_yaml errors
    #[error(transparent)]
    YAMLError(#[from] serde_yaml::Error),

    /// Transparent Beta distribution errors
    #[error(transparent)]
    BetaError(#[from] rand_distr::BetaError),

    /// Transparent Exponential distribution errors
    #[error(transparent)]
    ExpError(#[from] rand_distr::ExpError),

    /// Transparent Gamma distribution errors
    #[error(transparent)]
    GammaError(#[from] rand_distr::GammaError),

    /// Transparent Normal distribution errors
    #[error(transparent)]
    NormalError(#[from] rand_distr::NormalError),

    /// Transparent Triangular distribution errors
    #[error(transparent)]
    TriangularError(#[from] rand_distr::TriangularError),

    /// Transparent Weibull distribution errors
    #[error(transparent)]
    WeibullError(#[from] rand_distr::WeibullError),

    /// Transparent Weighted Index distribution errors
    #[error(transparent)]
    WeightedError(#[from] rand_distr::WeightedError),
}

impl SimulationError {
    /// Configuration errors are fatal to a run, and are reported through
    /// the flaw channel.  Everything else is an I/O or sampling failure.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SimulationError::InvalidCapacity { .. }
                | SimulationError::MissingQueue { .. }
                | SimulationError::NegativeDelay { .. }
                | SimulationError::ActorAlreadyActive { .. }
                | SimulationError::ActorAlreadyScheduled { .. }
                | SimulationError::DuplicateComponent(_)
                | SimulationError::ComponentNotFound(_)
                | SimulationError::EmptyRoute(_)
                | SimulationError::InvalidActorState { .. }
                | SimulationError::ActorNotFound
                | SimulationError::ResourceIdle { .. }
                | SimulationError::InvalidPhase { .. }
                | SimulationError::InvalidModelState(_)
                | SimulationError::InvalidStart { .. }
                | SimulationError::UniformRangeError { .. }
        )
    }
}

/// A wait queue at capacity refuses new actors.  This is an outcome for the
/// calling component to act on, not a fatal error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Wait queue is full, at capacity {capacity}")]
pub struct QueueFull {
    pub capacity: usize,
}
