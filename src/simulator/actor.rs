use std::fmt;

use serde::{Deserialize, Serialize};

use super::Director;
use crate::input_modeling::{UniformRNG, Variate};
use crate::models::{
    Gate, GateId, JunctionId, QueueId, Resource, ResourceId, RouteId, SinkId, SourceId,
    TransportId, WaitQueue,
};
use crate::utils::errors::SimulationError;

/// Handle of an actor created by a `Director`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub(crate) usize);

impl ActorId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorState {
    /// On the event list, waiting for its activation time
    Scheduled,
    /// Holding the baton; exactly one actor is active at any instant
    Active,
    /// Blocked in a wait queue, off the event list
    Waiting,
    Terminated,
}

impl ActorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorState::Scheduled => "Scheduled",
            ActorState::Active => "Active",
            ActorState::Waiting => "Waiting",
            ActorState::Terminated => "Terminated",
        }
    }
}

/// Entities flow through the model.  Drivers are internal actors that
/// run a source or a gate, and are excluded from population counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorKind {
    Entity,
    SourceDriver(SourceId),
    GateDriver(GateId),
}

/// The requests an actor body makes of the `Director`.  `Release`, a
/// `PassGate` on an open gate and any rejected enqueue re-enter the body
/// in the same activation; every other action suspends the actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Resume after the given delay
    Hold(f64),
    /// Occupy a unit of the resource for a drawn service time, waiting in
    /// its queue when every unit is busy
    Utilize(ResourceId),
    /// Free the unit held on the resource
    Release(ResourceId),
    /// Wait in the queue until another actor dequeues it
    WaitIn(QueueId),
    /// Proceed through an open gate, or wait for it to open
    PassGate(GateId),
    Jump(JunctionId),
    Move(TransportId),
    MoveOn(RouteId),
    /// Depart the model through the sink
    Leave(SinkId),
    /// End the body without departing through a sink
    Done,
}

/// The outcome of an actor's last request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Proceed,
    /// The queue was full, and the actor was not admitted
    Rejected(QueueId),
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome::Proceed
    }
}

/// Work the `Director` completes on an actor's behalf before its body
/// resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pending {
    /// Waiting in the resource's queue for a unit
    Utilize(ResourceId),
    /// Handed a unit while waiting; the service time is drawn on resumption
    Service(ResourceId),
    Arrival(TransportId),
    JunctionExit(JunctionId),
}

/// The body of an actor, written as a resumable state machine.  Each
/// activation calls `act` until it returns a suspending `Action`; the
/// body keeps whatever state it needs to pick up where it left off.
pub trait Script {
    fn act(&mut self, ctx: &mut ActorContext<'_>) -> Result<Action, SimulationError>;
}

impl<F> Script for F
where
    F: FnMut(&mut ActorContext<'_>) -> Result<Action, SimulationError>,
{
    fn act(&mut self, ctx: &mut ActorContext<'_>) -> Result<Action, SimulationError> {
        self(ctx)
    }
}

/// Box a closure as an actor body.
pub fn script_fn<F>(body: F) -> Box<dyn Script>
where
    F: FnMut(&mut ActorContext<'_>) -> Result<Action, SimulationError> + 'static,
{
    Box::new(body)
}

/// The scheduling capability of an actor.
pub trait Schedulable {
    fn activation(&self) -> f64;
    fn state(&self) -> ActorState;
    /// Place the actor on the event list at `time`.
    fn activate(&mut self, time: f64);
}

/// A logical process in the model.
pub struct SimActor {
    id: ActorId,
    name: String,
    kind: ActorKind,
    state: ActorState,
    birth: f64,
    activation: f64,
    pub(crate) script: Option<Box<dyn Script>>,
    pub(crate) pending: Option<Pending>,
    pub(crate) outcome: Outcome,
}

impl SimActor {
    pub(crate) fn new(
        id: ActorId,
        name: String,
        kind: ActorKind,
        script: Box<dyn Script>,
        birth: f64,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            state: ActorState::Waiting,
            birth,
            activation: birth,
            script: Some(script),
            pending: None,
            outcome: Outcome::Proceed,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn birth(&self) -> f64 {
        self.birth
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_entity(&self) -> bool {
        self.kind == ActorKind::Entity
    }

    pub(crate) fn set_state(&mut self, state: ActorState) {
        self.state = state;
    }

    pub(crate) fn terminate(&mut self) {
        self.state = ActorState::Terminated;
        self.script = None;
        self.pending = None;
    }
}

impl Schedulable for SimActor {
    fn activation(&self) -> f64 {
        self.activation
    }

    fn state(&self) -> ActorState {
        self.state
    }

    fn activate(&mut self, time: f64) {
        self.activation = time;
        self.state = ActorState::Scheduled;
    }
}

impl fmt::Debug for SimActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimActor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("birth", &self.birth)
            .field("activation", &self.activation)
            .field("pending", &self.pending)
            .field("outcome", &self.outcome)
            .finish()
    }
}

/// What an actor body sees of the model while it holds the baton.
pub struct ActorContext<'a> {
    director: &'a mut Director,
    actor: ActorId,
}

impl<'a> ActorContext<'a> {
    pub(crate) fn new(director: &'a mut Director, actor: ActorId) -> Self {
        Self { director, actor }
    }

    pub fn now(&self) -> f64 {
        self.director.clock()
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn name(&self) -> &str {
        self.director
            .actor(self.actor)
            .map(|actor| actor.name())
            .unwrap_or_default()
    }

    /// The outcome of the actor's previous request.
    pub fn outcome(&self) -> Outcome {
        self.director
            .actor(self.actor)
            .map(|actor| actor.outcome())
            .unwrap_or_default()
    }

    pub fn birth(&self) -> f64 {
        self.director
            .actor(self.actor)
            .map(|actor| actor.birth())
            .unwrap_or_default()
    }

    /// Draw from a variate with the model's random number generator.
    pub fn draw<V: Variate + ?Sized>(&mut self, variate: &mut V) -> Result<f64, SimulationError> {
        variate.draw(self.director.services.uniform_rng())
    }

    pub fn uniform_rng(&mut self) -> &mut UniformRNG {
        self.director.services.uniform_rng()
    }

    pub fn resource(&self, id: ResourceId) -> Result<&Resource, SimulationError> {
        self.director.resource(id)
    }

    pub fn queue(&self, id: QueueId) -> Result<&WaitQueue, SimulationError> {
        self.director.queue(id)
    }

    pub fn gate(&self, id: GateId) -> Result<&Gate, SimulationError> {
        self.director.gate(id)
    }

    /// Remove the head of the queue and schedule it for immediate
    /// resumption.
    pub fn dequeue(&mut self, queue: QueueId) -> Result<Option<ActorId>, SimulationError> {
        self.director.dequeue(queue)
    }

    pub fn record(&mut self, action: &str, subject: &str) {
        self.director.record(action, subject.to_string());
    }

    /// Request the run to stop once the current activation ends.
    pub fn stop(&mut self) {
        self.director.stop();
    }
}

/// Drives a source: one actor per activation, with an inter-arrival hold
/// in between.
#[derive(Debug)]
pub(crate) struct SourceDriver {
    pub(crate) source: SourceId,
}

impl Script for SourceDriver {
    fn act(&mut self, ctx: &mut ActorContext<'_>) -> Result<Action, SimulationError> {
        match ctx.director.emit(self.source)? {
            Some(interarrival) => Ok(Action::Hold(interarrival)),
            None => Ok(Action::Done),
        }
    }
}

/// Drives a gate: holds the initial state, then flips the gate `units`
/// times before terminating.
#[derive(Debug)]
pub(crate) struct GateDriver {
    pub(crate) gate: GateId,
    pub(crate) primed: bool,
    pub(crate) flips: usize,
}

impl Script for GateDriver {
    fn act(&mut self, ctx: &mut ActorContext<'_>) -> Result<Action, SimulationError> {
        if !self.primed {
            self.primed = true;
            return Ok(Action::Hold(ctx.director.gate_duration(self.gate)?));
        }
        if self.flips >= ctx.director.gate(self.gate)?.units() {
            return Ok(Action::Done);
        }
        self.flips += 1;
        Ok(Action::Hold(ctx.director.toggle_gate(self.gate)?))
    }
}
