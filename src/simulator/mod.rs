//! The simulator module provides the mechanics to run actors through the
//! model components, with process-interaction discrete event simulation.
//! The `Director` owns the clock, the event list, every component and every
//! actor.  It repeatedly pops the earliest event, advances the clock to the
//! event's time, and resumes the associated actor, which runs until it
//! issues a suspending `Action`.
//!
//! `Director` and `WebDirector` are used for Rust- and npm-based projects,
//! respectively.  The `Director` methods use the associated struct types
//! directly, while the `WebDirector` builds models from YAML or JSON and
//! returns JS/WASM-compatible values.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::input_modeling::uniform_rng::DEFAULT_SEED;
use crate::models::{
    ComponentId, Gate, GateId, Identifiable, Junction, JunctionId, ModelRecord, Position,
    Positioned, QueueId, Reportable, Resource, ResourceId, Route, RouteId, Sink, SinkId, Source,
    SourceId, Transport, TransportId, WaitQueue,
};
use crate::utils::errors::SimulationError;
use crate::utils::flaw;

pub mod actor;
pub mod animation;
pub mod config;
pub mod event;
pub mod itinerary;
pub mod report;
pub mod services;
pub mod web;

pub use self::actor::{
    script_fn, Action, ActorContext, ActorId, ActorKind, ActorState, Outcome, Schedulable,
    Script, SimActor,
};
pub use self::animation::{AnimationCommand, AnimationLog, Animator, CommandKind, Shape};
pub use self::config::{ComponentConfig, ModelConfig, StepConfig};
pub use self::event::{Event, EventList};
pub use self::itinerary::{Itinerary, Step};
pub use self::report::{ComponentReport, Population, Report};
pub use self::services::Services;
pub use self::web::WebDirector;

use self::actor::{GateDriver, Pending, SourceDriver};

/// The lifecycle of a run.  Components are added while `Building`; the
/// run proceeds while `Running`, until it is `Finished` or `Shutdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Building,
    Running,
    Finished,
    Shutdown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Building => "Building",
            Phase::Running => "Running",
            Phase::Finished => "Finished",
            Phase::Shutdown => "Shutdown",
        }
    }
}

/// A run finishes when the event list empties, or when any configured
/// limit is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopCondition {
    /// Events scheduled after this time are never processed
    pub time_limit: Option<f64>,
    pub max_events: Option<usize>,
    pub max_departures: Option<usize>,
}

/// Whether an actor keeps running after an action, or gives up the baton.
enum Flow {
    Continue,
    Yield,
}

fn slot<'a, T>(arena: &'a [T], index: usize, kind: &str) -> Result<&'a T, SimulationError> {
    arena
        .get(index)
        .ok_or_else(|| flaw(SimulationError::ComponentNotFound(format!["{} #{}", kind, index])))
}

fn slot_mut<'a, T>(
    arena: &'a mut [T],
    index: usize,
    kind: &str,
) -> Result<&'a mut T, SimulationError> {
    arena
        .get_mut(index)
        .ok_or_else(|| flaw(SimulationError::ComponentNotFound(format!["{} #{}", kind, index])))
}

fn summarize<C: Identifiable + Reportable>(
    component: &C,
    kind: &str,
    now: f64,
) -> ComponentReport {
    ComponentReport {
        name: component.name().to_string(),
        kind: kind.to_string(),
        status: component.status(),
        statistics: component.statistics(now),
    }
}

/// Apply `$body` to the component behind a `ComponentId`, whatever its
/// type, yielding `None` for an unknown id.
macro_rules! with_component {
    ($director:expr, $id:expr, |$component:ident| $body:expr) => {
        match $id {
            ComponentId::Resource(id) => $director.resources.get(id.0).map(|$component| $body),
            ComponentId::WaitQueue(id) => $director.queues.get(id.0).map(|$component| $body),
            ComponentId::Gate(id) => $director.gates.get(id.0).map(|$component| $body),
            ComponentId::Junction(id) => $director.junctions.get(id.0).map(|$component| $body),
            ComponentId::Source(id) => $director.sources.get(id.0).map(|$component| $body),
            ComponentId::Sink(id) => $director.sinks.get(id.0).map(|$component| $body),
            ComponentId::Transport(id) => $director.transports.get(id.0).map(|$component| $body),
            ComponentId::Route(id) => $director.routes.get(id.0).map(|$component| $body),
        }
    };
}

/// Resolve a component name to a typed id.
macro_rules! typed_lookup {
    ($method:ident, $variant:ident, $id:ident) => {
        pub fn $method(&self, name: &str) -> Result<$id, SimulationError> {
            match self.component(name)? {
                ComponentId::$variant(id) => Ok(id),
                other => Err(flaw(SimulationError::InvalidModelState(format![
                    "{} is a {}, not a {}",
                    name,
                    other.kind(),
                    stringify!($variant)
                ]))),
            }
        }
    };
}

/// The `Director` is the simulation context.  It holds everything needed
/// to run a model: components in typed arenas, the actors, the event list,
/// the clock and the random number generator.  Nothing is global, so any
/// number of directors may coexist.
pub struct Director {
    name: String,
    services: Services,
    phase: Phase,
    events: EventList,
    actors: Vec<SimActor>,
    current: Option<ActorId>,
    resources: Vec<Resource>,
    queues: Vec<WaitQueue>,
    gates: Vec<Gate>,
    junctions: Vec<Junction>,
    sources: Vec<Source>,
    sinks: Vec<Sink>,
    transports: Vec<Transport>,
    routes: Vec<Route>,
    names: HashMap<String, ComponentId>,
    order: Vec<ComponentId>,
    population: Population,
    stop_condition: StopCondition,
    stop_requested: bool,
    events_processed: usize,
    store_records: bool,
    records: Vec<ModelRecord>,
    animator: Option<Box<dyn Animator>>,
}

impl Default for Director {
    fn default() -> Self {
        Self::new("model", DEFAULT_SEED)
    }
}

impl fmt::Debug for Director {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Director")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("clock", &self.clock())
            .field("pending_events", &self.events.len())
            .field("actors", &self.actors.len())
            .field("components", &self.order.len())
            .field("population", &self.population())
            .finish()
    }
}

impl Director {
    pub fn new(name: &str, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            services: Services::new(seed),
            phase: Phase::Building,
            events: EventList::new(),
            actors: Vec::new(),
            current: None,
            resources: Vec::new(),
            queues: Vec::new(),
            gates: Vec::new(),
            junctions: Vec::new(),
            sources: Vec::new(),
            sinks: Vec::new(),
            transports: Vec::new(),
            routes: Vec::new(),
            names: HashMap::new(),
            order: Vec::new(),
            population: Population::default(),
            stop_condition: StopCondition::default(),
            stop_requested: false,
            events_processed: 0,
            store_records: false,
            records: Vec::new(),
            animator: None,
        }
    }

    pub fn with_stop_condition(mut self, stop_condition: StopCondition) -> Self {
        self.stop_condition = stop_condition;
        self
    }

    pub fn with_records(mut self, store_records: bool) -> Self {
        self.store_records = store_records;
        self
    }

    pub fn with_animator(mut self, animator: Box<dyn Animator>) -> Self {
        self.animator = Some(animator);
        self
    }

    pub fn set_animator(&mut self, animator: Box<dyn Animator>) {
        self.animator = Some(animator);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.services.seed()
    }

    /// An accessor method for the simulation clock.
    pub fn clock(&self) -> f64 {
        self.services.global_time()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn events_processed(&self) -> usize {
        self.events_processed
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn stop_condition(&self) -> &StopCondition {
        &self.stop_condition
    }

    pub fn records(&self) -> &[ModelRecord] {
        &self.records
    }

    pub fn actors(&self) -> &[SimActor] {
        &self.actors
    }

    pub fn actor(&self, id: ActorId) -> Result<&SimActor, SimulationError> {
        self.actors
            .get(id.0)
            .ok_or_else(|| flaw(SimulationError::ActorNotFound))
    }

    fn actor_mut(&mut self, id: ActorId) -> Result<&mut SimActor, SimulationError> {
        self.actors
            .get_mut(id.0)
            .ok_or_else(|| flaw(SimulationError::ActorNotFound))
    }

    fn actor_name(&self, id: ActorId) -> String {
        self.actors
            .get(id.0)
            .map(|actor| actor.name().to_string())
            .unwrap_or_default()
    }

    /// Entity counts, with `in_system` counted from the live actors.
    pub fn population(&self) -> Population {
        Population {
            in_system: self
                .actors
                .iter()
                .filter(|actor| actor.is_entity() && actor.state() != ActorState::Terminated)
                .count(),
            ..self.population
        }
    }

    pub fn resource(&self, id: ResourceId) -> Result<&Resource, SimulationError> {
        slot(&self.resources, id.0, "Resource")
    }

    pub fn queue(&self, id: QueueId) -> Result<&WaitQueue, SimulationError> {
        slot(&self.queues, id.0, "WaitQueue")
    }

    pub fn gate(&self, id: GateId) -> Result<&Gate, SimulationError> {
        slot(&self.gates, id.0, "Gate")
    }

    pub fn junction(&self, id: JunctionId) -> Result<&Junction, SimulationError> {
        slot(&self.junctions, id.0, "Junction")
    }

    pub fn source(&self, id: SourceId) -> Result<&Source, SimulationError> {
        slot(&self.sources, id.0, "Source")
    }

    pub fn sink(&self, id: SinkId) -> Result<&Sink, SimulationError> {
        slot(&self.sinks, id.0, "Sink")
    }

    pub fn transport(&self, id: TransportId) -> Result<&Transport, SimulationError> {
        slot(&self.transports, id.0, "Transport")
    }

    pub fn route(&self, id: RouteId) -> Result<&Route, SimulationError> {
        slot(&self.routes, id.0, "Route")
    }

    /// Resolve a component name to its id.
    pub fn component(&self, name: &str) -> Result<ComponentId, SimulationError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| flaw(SimulationError::ComponentNotFound(name.to_string())))
    }

    typed_lookup!(resource_id, Resource, ResourceId);
    typed_lookup!(queue_id, WaitQueue, QueueId);
    typed_lookup!(gate_id, Gate, GateId);
    typed_lookup!(junction_id, Junction, JunctionId);
    typed_lookup!(source_id, Source, SourceId);
    typed_lookup!(sink_id, Sink, SinkId);
    typed_lookup!(transport_id, Transport, TransportId);
    typed_lookup!(route_id, Route, RouteId);

    pub fn position_of(&self, id: ComponentId) -> Result<Position, SimulationError> {
        with_component!(self, id, |component| *component.position()).ok_or_else(|| {
            flaw(SimulationError::ComponentNotFound(format![
                "{} #{:?}",
                id.kind(),
                id
            ]))
        })
    }

    fn require_phase(&self, expected: Phase) -> Result<(), SimulationError> {
        if self.phase != expected {
            return Err(flaw(SimulationError::InvalidPhase {
                expected: expected.as_str(),
                found: self.phase.as_str(),
            }));
        }
        Ok(())
    }

    fn register(&mut self, name: &str, id: ComponentId) -> Result<(), SimulationError> {
        self.require_phase(Phase::Building)?;
        if self.names.contains_key(name) {
            return Err(flaw(SimulationError::DuplicateComponent(name.to_string())));
        }
        debug!(component = name, kind = id.kind(), "registered component");
        self.names.insert(name.to_string(), id);
        self.order.push(id);
        Ok(())
    }

    pub fn add_wait_queue(&mut self, queue: WaitQueue) -> Result<QueueId, SimulationError> {
        let id = QueueId(self.queues.len());
        self.register(queue.name(), ComponentId::WaitQueue(id))?;
        self.queues.push(queue);
        Ok(id)
    }

    pub fn add_resource(&mut self, resource: Resource) -> Result<ResourceId, SimulationError> {
        if let Some(queue) = resource.queue() {
            self.queue(queue)?;
        }
        let id = ResourceId(self.resources.len());
        self.register(resource.name(), ComponentId::Resource(id))?;
        self.resources.push(resource);
        Ok(id)
    }

    pub fn add_gate(&mut self, gate: Gate) -> Result<GateId, SimulationError> {
        self.queue(gate.queue())?;
        let id = GateId(self.gates.len());
        self.register(gate.name(), ComponentId::Gate(id))?;
        self.gates.push(gate);
        Ok(id)
    }

    pub fn add_junction(&mut self, junction: Junction) -> Result<JunctionId, SimulationError> {
        let id = JunctionId(self.junctions.len());
        self.register(junction.name(), ComponentId::Junction(id))?;
        self.junctions.push(junction);
        Ok(id)
    }

    pub fn add_source(&mut self, source: Source) -> Result<SourceId, SimulationError> {
        let id = SourceId(self.sources.len());
        self.register(source.name(), ComponentId::Source(id))?;
        self.sources.push(source);
        Ok(id)
    }

    pub fn add_sink(&mut self, sink: Sink) -> Result<SinkId, SimulationError> {
        let id = SinkId(self.sinks.len());
        self.register(sink.name(), ComponentId::Sink(id))?;
        self.sinks.push(sink);
        Ok(id)
    }

    pub fn add_transport(&mut self, transport: Transport) -> Result<TransportId, SimulationError> {
        let id = TransportId(self.transports.len());
        self.register(transport.name(), ComponentId::Transport(id))?;
        self.transports.push(transport);
        Ok(id)
    }

    pub fn add_route(&mut self, route: Route) -> Result<RouteId, SimulationError> {
        for lane in route.lanes() {
            self.transport(*lane)?;
        }
        let id = RouteId(self.routes.len());
        self.register(route.name(), ComponentId::Route(id))?;
        self.routes.push(route);
        Ok(id)
    }

    /// Create an entity actor running `script`, first resumed after
    /// `delay`.
    pub fn spawn(
        &mut self,
        name: &str,
        script: Box<dyn Script>,
        delay: f64,
    ) -> Result<ActorId, SimulationError> {
        if let Phase::Finished | Phase::Shutdown = self.phase {
            return Err(flaw(SimulationError::InvalidPhase {
                expected: "Building or Running",
                found: self.phase.as_str(),
            }));
        }
        let origin = self.name.clone();
        self.create_actor(name.to_string(), ActorKind::Entity, script, delay, origin, vec![0.0, 0.0])
    }

    fn create_actor(
        &mut self,
        name: String,
        kind: ActorKind,
        script: Box<dyn Script>,
        delay: f64,
        origin: String,
        at: Vec<f64>,
    ) -> Result<ActorId, SimulationError> {
        if !(delay >= 0.0) {
            return Err(flaw(SimulationError::NegativeDelay { actor: name, delay }));
        }
        let id = ActorId(self.actors.len());
        let birth = self.clock() + delay;
        self.actors
            .push(SimActor::new(id, name.clone(), kind, script, birth));
        if kind == ActorKind::Entity {
            self.population.created += 1;
            self.record("Arrival", format!["{} at {}", name, origin]);
            self.animate(AnimationCommand {
                time: self.clock(),
                kind: CommandKind::CreateToken,
                component: origin,
                actor: Some(name),
                color: String::from("yellow"),
                shape: Shape::Circle,
                at,
            });
        }
        self.schedule(id, delay)?;
        Ok(id)
    }

    /// Place an actor on the event list, to be resumed after `delay`.
    fn schedule(&mut self, id: ActorId, delay: f64) -> Result<(), SimulationError> {
        let current = self.current;
        let now = self.clock();
        let actor = self.actor_mut(id)?;
        if !(delay >= 0.0) {
            return Err(flaw(SimulationError::NegativeDelay {
                actor: actor.name().to_string(),
                delay,
            }));
        }
        match actor.state() {
            ActorState::Scheduled => {
                return Err(flaw(SimulationError::ActorAlreadyScheduled {
                    actor: actor.name().to_string(),
                }))
            }
            ActorState::Active if current != Some(id) => {
                return Err(flaw(SimulationError::ActorAlreadyActive {
                    actor: actor.name().to_string(),
                }))
            }
            ActorState::Terminated => {
                return Err(flaw(SimulationError::InvalidActorState {
                    actor: actor.name().to_string(),
                    state: String::from(ActorState::Terminated.as_str()),
                }))
            }
            _ => {}
        }
        actor.activate(now + delay);
        self.events.push(now + delay, id);
        Ok(())
    }

    /// Validate and prime the run: schedule the source and gate drivers,
    /// and animate every component.  A run that fails to prime is rolled
    /// back, and stays `Building`.
    pub fn start(&mut self) -> Result<(), SimulationError> {
        self.require_phase(Phase::Building)?;
        if let Some(source) = self.sources.iter().find(|source| !(source.start() >= 0.0)) {
            return Err(flaw(SimulationError::InvalidStart {
                component: source.name().to_string(),
                start: source.start(),
            }));
        }
        let actors = self.actors.len();
        if let Err(error) = self.prime() {
            self.events.retain(|event| event.actor.0 < actors);
            self.actors.truncate(actors);
            return Err(error);
        }
        self.phase = Phase::Running;
        info!(
            model = %self.name,
            seed = self.seed(),
            components = self.order.len(),
            "starting simulation"
        );
        for id in self.order.clone() {
            self.animate_node(id);
        }
        Ok(())
    }

    fn prime(&mut self) -> Result<(), SimulationError> {
        for index in 0..self.sources.len() {
            let source = &self.sources[index];
            let name = format!["{} driver", source.name()];
            let start = source.start();
            let origin = source.name().to_string();
            let driver = Box::new(SourceDriver {
                source: SourceId(index),
            });
            self.create_actor(
                name,
                ActorKind::SourceDriver(SourceId(index)),
                driver,
                start,
                origin,
                Vec::new(),
            )?;
        }
        for index in 0..self.gates.len() {
            let origin = self.gates[index].name().to_string();
            let name = format!["{} driver", origin];
            let driver = Box::new(GateDriver {
                gate: GateId(index),
                primed: false,
                flips: 0,
            });
            self.create_actor(
                name,
                ActorKind::GateDriver(GateId(index)),
                driver,
                0.0,
                origin,
                Vec::new(),
            )?;
        }
        Ok(())
    }

    /// Run the model from start to finish, returning the final report.
    pub fn simulate(&mut self) -> Result<Report, SimulationError> {
        self.start()?;
        self.wait_finished()?;
        Ok(self.report())
    }

    /// Step until the event list empties or the stop condition holds.
    pub fn wait_finished(&mut self) -> Result<(), SimulationError> {
        while self.step()? {}
        Ok(())
    }

    /// Request the run to stop before the next event.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    fn stop_condition_met(&self) -> bool {
        self.stop_requested
            || self
                .stop_condition
                .max_events
                .map_or(false, |max| self.events_processed >= max)
            || self
                .stop_condition
                .max_departures
                .map_or(false, |max| self.population.departed >= max)
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        let population = self.population();
        info!(
            model = %self.name,
            clock = self.clock(),
            events = self.events_processed,
            departed = population.departed,
            in_system = population.in_system,
            "simulation finished"
        );
    }

    /// The discrete event simulation step: pop the earliest event, advance
    /// the clock to it and resume its actor.  Returns whether an event was
    /// processed; `false` means the run is over.
    pub fn step(&mut self) -> Result<bool, SimulationError> {
        match self.phase {
            Phase::Running => {}
            Phase::Building => {
                return Err(flaw(SimulationError::InvalidPhase {
                    expected: Phase::Running.as_str(),
                    found: Phase::Building.as_str(),
                }))
            }
            Phase::Finished | Phase::Shutdown => return Ok(false),
        }
        if self.stop_condition_met() {
            self.finish();
            return Ok(false);
        }
        let time = match self.events.peek_time() {
            Some(time) => time,
            None => {
                self.finish();
                return Ok(false);
            }
        };
        if let Some(limit) = self.stop_condition.time_limit {
            if time > limit {
                if limit > self.clock() {
                    self.services.advance_to(limit)?;
                }
                self.finish();
                return Ok(false);
            }
        }
        let event = self.events.pop().ok_or_else(|| {
            flaw(SimulationError::InvalidModelState(String::from(
                "event list emptied during a step",
            )))
        })?;
        self.services.advance_to(event.time)?;
        self.events_processed += 1;
        debug!(time = event.time, actor = %self.actor_name(event.actor), "resuming actor");
        self.resume(event.actor)?;
        Ok(true)
    }

    /// Execute up to `n` steps, returning how many were processed.
    pub fn step_n(&mut self, n: usize) -> Result<usize, SimulationError> {
        let mut steps = 0;
        while steps < n && self.step()? {
            steps += 1;
        }
        Ok(steps)
    }

    /// Process every event up to and including time `until`, then advance
    /// the clock to `until`.  Returns how many events were processed.
    pub fn step_until(&mut self, until: f64) -> Result<usize, SimulationError> {
        if self.phase == Phase::Building {
            return Err(flaw(SimulationError::InvalidPhase {
                expected: Phase::Running.as_str(),
                found: Phase::Building.as_str(),
            }));
        }
        let mut steps = 0;
        while self.events.peek_time().map_or(false, |time| time <= until) {
            if !self.step()? {
                return Ok(steps);
            }
            steps += 1;
        }
        let limit = self.stop_condition.time_limit.unwrap_or(f64::INFINITY);
        if self.phase == Phase::Running && until > self.clock() && until <= limit {
            self.services.advance_to(until)?;
        }
        Ok(steps)
    }

    /// Discard every pending event and terminate every outstanding actor
    /// without resuming it.  Waiting actors are dropped from their queues.
    /// Returns the number of entity actors discarded.
    pub fn shutdown(&mut self) -> usize {
        if self.phase == Phase::Shutdown {
            return 0;
        }
        let now = self.clock();
        let pending_events = self.events.clear().len();
        self.queues.iter_mut().for_each(|queue| {
            queue.drain(now);
        });
        self.transports.iter_mut().for_each(Transport::clear);
        self.junctions.iter_mut().for_each(Junction::clear);
        let mut discarded = 0;
        self.actors
            .iter_mut()
            .filter(|actor| actor.state() != ActorState::Terminated)
            .for_each(|actor| {
                if actor.is_entity() {
                    discarded += 1;
                }
                actor.terminate();
            });
        self.population.discarded += discarded;
        self.current = None;
        self.phase = Phase::Shutdown;
        if discarded > 0 {
            warn!(discarded, pending_events, clock = now, "shutdown discarded outstanding actors");
        }
        info!(model = %self.name, clock = now, "simulation shut down");
        discarded
    }

    /// Clock, population and per-component statistics.
    pub fn report(&self) -> Report {
        let now = self.clock();
        Report {
            model: self.name.clone(),
            clock: now,
            events_processed: self.events_processed,
            population: self.population(),
            components: self
                .order
                .iter()
                .filter_map(|id| with_component!(self, *id, |component| summarize(component, id.kind(), now)))
                .collect(),
        }
    }

    pub(crate) fn record(&mut self, action: &str, subject: String) {
        debug!(time = self.clock(), action, subject = %subject, "record");
        if self.store_records {
            self.records.push(ModelRecord {
                time: self.clock(),
                action: action.to_string(),
                subject,
            });
        }
    }

    fn animate(&mut self, command: AnimationCommand) {
        if let Some(animator) = self.animator.as_mut() {
            animator.animate(command);
        }
    }

    fn animate_node(&mut self, id: ComponentId) {
        if self.animator.is_none() {
            return;
        }
        let time = self.clock();
        let command = match id {
            ComponentId::Transport(transport) => self.transports.get(transport.0).map(|transport| {
                AnimationCommand {
                    time,
                    kind: CommandKind::CreateEdge,
                    component: transport.name().to_string(),
                    actor: None,
                    color: String::from("gray"),
                    shape: Shape::Line,
                    at: transport.path(),
                }
            }),
            ComponentId::Gate(gate) => self.gates.get(gate.0).map(|gate| AnimationCommand {
                time,
                kind: CommandKind::CreateNode,
                component: gate.name().to_string(),
                actor: None,
                color: gate.color().to_string(),
                shape: Shape::Rectangle,
                at: gate.position().to_vec(),
            }),
            ComponentId::Junction(junction) => {
                self.junctions.get(junction.0).map(|junction| AnimationCommand {
                    time,
                    kind: CommandKind::CreateNode,
                    component: junction.name().to_string(),
                    actor: None,
                    color: String::from("blue"),
                    shape: Shape::Circle,
                    at: junction.position().to_vec(),
                })
            }
            // Routes are drawn through their lanes
            ComponentId::Route(_) => None,
            other => with_component!(self, other, |component| AnimationCommand {
                time,
                kind: CommandKind::CreateNode,
                component: component.name().to_string(),
                actor: None,
                color: String::from(match other {
                    ComponentId::Resource(_) => "orange",
                    ComponentId::Source(_) => "green",
                    ComponentId::Sink(_) => "black",
                    _ => "gray",
                }),
                shape: Shape::Rectangle,
                at: component.position().to_vec(),
            }),
        };
        if let Some(command) = command {
            self.animate(command);
        }
    }

    fn animate_token(&mut self, kind: CommandKind, component: String, actor: ActorId, at: Vec<f64>) {
        if self.animator.is_none() {
            return;
        }
        let command = AnimationCommand {
            time: self.clock(),
            kind,
            component,
            actor: Some(self.actor_name(actor)),
            color: String::from("yellow"),
            shape: Shape::Circle,
            at,
        };
        self.animate(command);
    }

    /// Hand the baton to an actor, and run it until it yields.
    fn resume(&mut self, id: ActorId) -> Result<(), SimulationError> {
        if let Some(current) = self.current {
            return Err(flaw(SimulationError::ActorAlreadyActive {
                actor: self.actor_name(current),
            }));
        }
        let actor = self.actor_mut(id)?;
        if actor.state() != ActorState::Scheduled {
            return Err(flaw(SimulationError::InvalidActorState {
                actor: actor.name().to_string(),
                state: actor.state().as_str().to_string(),
            }));
        }
        actor.set_state(ActorState::Active);
        self.current = Some(id);
        let result = self.run(id);
        self.current = None;
        result
    }

    fn run(&mut self, id: ActorId) -> Result<(), SimulationError> {
        let pending = self.actor_mut(id)?.pending.take();
        if let Some(pending) = pending {
            if let Flow::Yield = self.complete(id, pending)? {
                return Ok(());
            }
        }
        loop {
            let script = self.actor_mut(id)?.script.take();
            let mut script = match script {
                Some(script) => script,
                None => {
                    return Err(flaw(SimulationError::InvalidActorState {
                        actor: self.actor_name(id),
                        state: String::from("without a body"),
                    }))
                }
            };
            let action = script.act(&mut ActorContext::new(self, id));
            let actor = self.actor_mut(id)?;
            actor.script = Some(script);
            actor.outcome = Outcome::Proceed;
            if let Flow::Yield = self.perform(id, action?)? {
                return Ok(());
            }
        }
    }

    /// Finish the kernel work an actor was suspended in.
    fn complete(&mut self, id: ActorId, pending: Pending) -> Result<Flow, SimulationError> {
        match pending {
            Pending::Utilize(resource) => self.utilize(id, resource),
            Pending::Service(resource) => self.begin_service(id, resource),
            Pending::Arrival(transport) => {
                let transport = slot_mut(&mut self.transports, transport.0, "Transport")?;
                transport.arrive();
                let (x, y) = transport.to().center();
                let name = transport.name().to_string();
                self.record("Move End", format!["{} via {}", self.actor_name(id), name]);
                self.animate_token(CommandKind::MoveToken, name, id, vec![x, y]);
                Ok(Flow::Continue)
            }
            Pending::JunctionExit(junction) => {
                slot_mut(&mut self.junctions, junction.0, "Junction")?.exit();
                Ok(Flow::Continue)
            }
        }
    }

    fn perform(&mut self, id: ActorId, action: Action) -> Result<Flow, SimulationError> {
        match action {
            Action::Hold(delay) => {
                self.schedule(id, delay)?;
                Ok(Flow::Yield)
            }
            Action::Utilize(resource) => self.utilize(id, resource),
            Action::Release(resource) => self.release(resource),
            Action::WaitIn(queue) => self.enqueue(id, queue, None),
            Action::PassGate(gate) => {
                let gate = slot(&self.gates, gate.0, "Gate")?;
                if gate.is_shut() {
                    let queue = gate.queue();
                    self.enqueue(id, queue, None)
                } else {
                    Ok(Flow::Continue)
                }
            }
            Action::Jump(junction) => {
                let crossing = slot_mut(&mut self.junctions, junction.0, "Junction")?;
                let delay = crossing.enter(self.services.uniform_rng())?;
                let name = crossing.name().to_string();
                self.schedule(id, delay)?;
                slot_mut(&mut self.junctions, junction.0, "Junction")?.admit();
                self.actor_mut(id)?.pending = Some(Pending::JunctionExit(junction));
                self.record("Jump", format!["{} through {}", self.actor_name(id), name]);
                Ok(Flow::Yield)
            }
            Action::Move(transport) => self.move_along(id, transport),
            Action::MoveOn(route) => {
                let route = slot_mut(&mut self.routes, route.0, "Route")?;
                let (lane, transport) = route.select(self.services.uniform_rng())?;
                let name = route.name().to_string();
                self.record(
                    "Lane Selection",
                    format!["{} on {} lane {}", self.actor_name(id), name, lane],
                );
                self.move_along(id, transport)
            }
            Action::Leave(sink) => {
                let now = self.clock();
                let actor = self.actor(id)?;
                let birth = actor.birth();
                let is_entity = actor.is_entity();
                let sink = slot_mut(&mut self.sinks, sink.0, "Sink")?;
                sink.absorb(now - birth);
                let (x, y) = sink.position().center();
                let name = sink.name().to_string();
                if is_entity {
                    self.population.departed += 1;
                }
                self.record("Departure", format!["{} from {}", self.actor_name(id), name]);
                self.animate_token(CommandKind::DestroyToken, name, id, vec![x, y]);
                self.actor_mut(id)?.terminate();
                Ok(Flow::Yield)
            }
            Action::Done => {
                if self.actor(id)?.is_entity() {
                    self.population.retired += 1;
                    self.record("Retired", self.actor_name(id));
                }
                self.actor_mut(id)?.terminate();
                Ok(Flow::Yield)
            }
        }
    }

    fn utilize(&mut self, id: ActorId, resource: ResourceId) -> Result<Flow, SimulationError> {
        let now = self.clock();
        let server = slot_mut(&mut self.resources, resource.0, "Resource")?;
        if server.has_idle_unit() {
            server.seize(now)?;
            return self.begin_service(id, resource);
        }
        match server.queue() {
            Some(queue) => self.enqueue(id, queue, Some(Pending::Utilize(resource))),
            None => Err(flaw(SimulationError::MissingQueue {
                resource: server.name().to_string(),
            })),
        }
    }

    fn begin_service(&mut self, id: ActorId, resource: ResourceId) -> Result<Flow, SimulationError> {
        let server = slot_mut(&mut self.resources, resource.0, "Resource")?;
        let service_time = server.draw_service_time(self.services.uniform_rng())?;
        let name = server.name().to_string();
        self.record("Service Start", format!["{} at {}", self.actor_name(id), name]);
        self.schedule(id, service_time)?;
        Ok(Flow::Yield)
    }

    fn release(&mut self, resource: ResourceId) -> Result<Flow, SimulationError> {
        let now = self.clock();
        let server = slot_mut(&mut self.resources, resource.0, "Resource")?;
        server.vacate(now)?;
        let queue = server.queue();
        let name = server.name().to_string();
        self.record("Release", name);
        if let Some(queue) = queue {
            self.dequeue(queue)?;
        }
        Ok(Flow::Continue)
    }

    /// Block the actor in a queue, or hand it a rejection when the queue
    /// is full.
    fn enqueue(
        &mut self,
        id: ActorId,
        queue: QueueId,
        pending: Option<Pending>,
    ) -> Result<Flow, SimulationError> {
        let now = self.clock();
        let line = slot_mut(&mut self.queues, queue.0, "WaitQueue")?;
        let admitted = line.enqueue(id, now);
        let name = line.name().to_string();
        let subject = format!["{} in {}", self.actor_name(id), name];
        let actor = self.actor_mut(id)?;
        match admitted {
            Ok(()) => {
                actor.set_state(ActorState::Waiting);
                actor.pending = pending;
                self.record("Enqueue", subject);
                Ok(Flow::Yield)
            }
            Err(full) => {
                actor.outcome = Outcome::Rejected(queue);
                debug!(queue = %name, capacity = full.capacity, "queue rejected actor");
                self.record("Rejected", subject);
                Ok(Flow::Continue)
            }
        }
    }

    /// Reschedule a dequeued actor.  An actor waiting to utilize a resource
    /// is handed a unit here; callers make sure one is idle.
    fn wake(&mut self, id: ActorId, delay: f64) -> Result<(), SimulationError> {
        let now = self.clock();
        let pending = self.actor(id)?.pending;
        if let Some(Pending::Utilize(resource)) = pending {
            let server = slot_mut(&mut self.resources, resource.0, "Resource")?;
            if !server.has_idle_unit() {
                let name = server.name().to_string();
                return Err(flaw(SimulationError::InvalidModelState(format![
                    "{} was woken for {}, which has no idle unit",
                    self.actor_name(id),
                    name
                ])));
            }
            server.seize(now)?;
            self.actor_mut(id)?.pending = Some(Pending::Service(resource));
        }
        self.schedule(id, delay)
    }

    /// Whether the head of the queue is waiting for a unit of a resource
    /// that has none idle.  Such a head keeps its place.
    fn head_is_blocked(&self, queue: QueueId) -> Result<bool, SimulationError> {
        let head = match self.queue(queue)?.peek() {
            Some(head) => head,
            None => return Ok(false),
        };
        match self.actor(head)?.pending {
            Some(Pending::Utilize(resource)) => Ok(!self.resource(resource)?.has_idle_unit()),
            _ => Ok(false),
        }
    }

    /// Remove the head of a queue and schedule it for immediate
    /// resumption.  Returns `None` when the queue is empty, or when its
    /// head waits for a unit of a fully busy resource; that head stays
    /// first in line.
    pub fn dequeue(&mut self, queue: QueueId) -> Result<Option<ActorId>, SimulationError> {
        let now = self.clock();
        if self.head_is_blocked(queue)? {
            debug!(queue = queue.0, "head of queue is still blocked");
            return Ok(None);
        }
        let next = slot_mut(&mut self.queues, queue.0, "WaitQueue")?.dequeue(now);
        if let Some(actor) = next {
            self.wake(actor, 0.0)?;
        }
        Ok(next)
    }

    fn move_along(&mut self, id: ActorId, transport: TransportId) -> Result<Flow, SimulationError> {
        let carrier = slot_mut(&mut self.transports, transport.0, "Transport")?;
        let travel_time = carrier.depart(self.services.uniform_rng())?;
        let name = carrier.name().to_string();
        let at = carrier.path();
        self.schedule(id, travel_time)?;
        slot_mut(&mut self.transports, transport.0, "Transport")?.board();
        self.actor_mut(id)?.pending = Some(Pending::Arrival(transport));
        self.record("Move Start", format!["{} via {}", self.actor_name(id), name]);
        self.animate_token(CommandKind::MoveToken, name, id, at);
        Ok(Flow::Yield)
    }

    /// Create the source's next actor.  Returns the hold until the one
    /// after, or `None` once the source is exhausted.
    pub(crate) fn emit(&mut self, source: SourceId) -> Result<Option<f64>, SimulationError> {
        let origin = slot_mut(&mut self.sources, source.0, "Source")?;
        if origin.is_exhausted() {
            return Ok(None);
        }
        let (serial, script) = origin.make();
        let name = format!["{}-{}", origin.name(), serial];
        let (x, y) = origin.position().center();
        let component = origin.name().to_string();
        self.create_actor(name, ActorKind::Entity, script, 0.0, component, vec![x, y])?;
        let origin = slot_mut(&mut self.sources, source.0, "Source")?;
        if origin.is_exhausted() {
            return Ok(None);
        }
        Ok(Some(origin.draw_interarrival(self.services.uniform_rng())?))
    }

    /// Draw how long the gate stays in its current state.
    pub(crate) fn gate_duration(&mut self, gate: GateId) -> Result<f64, SimulationError> {
        slot_mut(&mut self.gates, gate.0, "Gate")?.duration(self.services.uniform_rng())
    }

    /// Flip the gate, release waiting actors if it opened, and return how
    /// long the new state lasts.
    pub(crate) fn toggle_gate(&mut self, gate: GateId) -> Result<f64, SimulationError> {
        let light = slot_mut(&mut self.gates, gate.0, "Gate")?;
        let shut = light.flip();
        let name = light.name().to_string();
        let color = light.color().to_string();
        let at = light.position().to_vec();
        self.record(if shut { "Gate Shut" } else { "Gate Open" }, name.clone());
        self.animate(AnimationCommand {
            time: self.clock(),
            kind: CommandKind::SetColor,
            component: name,
            actor: None,
            color,
            shape: Shape::Rectangle,
            at,
        });
        if !shut {
            self.release_gate(gate)?;
        }
        self.gate_duration(gate)
    }

    /// Release up to `cap` actors waiting at an open gate, staggered so
    /// they resume in queue order.
    fn release_gate(&mut self, gate: GateId) -> Result<(), SimulationError> {
        let now = self.clock();
        let light = slot(&self.gates, gate.0, "Gate")?;
        let (queue, cap, stagger) = (light.queue(), light.cap(), light.stagger());
        let name = light.name().to_string();
        for index in 0..cap {
            if self.head_is_blocked(queue)? {
                break;
            }
            let next = slot_mut(&mut self.queues, queue.0, "WaitQueue")?.dequeue(now);
            match next {
                Some(actor) => {
                    self.record("Gate Release", format!["{} at {}", self.actor_name(actor), name]);
                    self.wake(actor, index as f64 * stagger)?;
                }
                None => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_modeling::variate::constant;

    #[test]
    fn components_are_registered_once_and_only_while_building() {
        let mut director = Director::default();
        let line = director
            .add_wait_queue(WaitQueue::new("line", None, Default::default(), Position::default()).unwrap())
            .unwrap();
        assert!(matches!(
            director.add_sink(Sink::new("line", Position::default())),
            Err(SimulationError::DuplicateComponent(_))
        ));
        assert_eq!(director.component("line").unwrap(), ComponentId::WaitQueue(line));
        assert_eq!(director.queue_id("line").unwrap(), line);
        assert!(director.resource_id("line").is_err());
        assert!(matches!(
            director.component("missing"),
            Err(SimulationError::ComponentNotFound(_))
        ));
        director.start().unwrap();
        assert!(matches!(
            director.add_sink(Sink::new("exit", Position::default())),
            Err(SimulationError::InvalidPhase { .. })
        ));
        assert!(director.start().is_err());
    }

    fn done(_: &mut ActorContext<'_>) -> Result<Action, SimulationError> {
        Ok(Action::Done)
    }

    #[test]
    fn negative_and_nan_delays_are_flaws() {
        let mut director = Director::default();
        assert!(matches!(
            director.spawn("early", script_fn(done), -1.0),
            Err(SimulationError::NegativeDelay { .. })
        ));
        assert!(director.spawn("never", script_fn(done), f64::NAN).is_err());
        assert!(director.actors().is_empty());
    }

    #[test]
    fn held_actor_cannot_be_scheduled_twice() {
        let mut director = Director::default();
        let id = director
            .spawn("worker", script_fn(|_| Ok(Action::Hold(1.0))), 0.0)
            .unwrap();
        assert!(matches!(
            director.schedule(id, 2.0),
            Err(SimulationError::ActorAlreadyScheduled { .. })
        ));
    }

    #[test]
    fn resuming_while_another_actor_is_active_is_a_flaw() {
        let mut director = Director::default();
        let first = director.spawn("first", script_fn(done), 0.0).unwrap();
        director.current = Some(first);
        assert!(matches!(
            director.resume(first),
            Err(SimulationError::ActorAlreadyActive { .. })
        ));
    }

    #[test]
    fn step_requires_a_started_run() {
        let mut director = Director::default();
        assert!(matches!(director.step(), Err(SimulationError::InvalidPhase { .. })));
        director.start().unwrap();
        // Nothing scheduled, so the run is over immediately
        assert!(!director.step().unwrap());
        assert_eq!(director.phase(), Phase::Finished);
    }

    #[test]
    fn hold_advances_the_clock() {
        let mut director = Director::default().with_records(true);
        let mut holds = 0;
        director
            .spawn(
                "sleeper",
                script_fn(move |_| {
                    holds += 1;
                    Ok(if holds <= 3 { Action::Hold(2.5) } else { Action::Done })
                }),
                1.0,
            )
            .unwrap();
        let report = director.simulate().unwrap();
        assert_eq!(report.clock, 8.5);
        assert_eq!(report.events_processed, 4);
        assert_eq!(report.population.retired, 1);
        assert_eq!(director.records().last().map(|record| record.action.as_str()), Some("Retired"));
    }

    #[test]
    fn release_of_an_idle_resource_is_a_flaw() {
        let mut director = Director::default();
        let teller = director
            .add_resource(Resource::new("teller", 1, constant(1.0), None, Position::default()).unwrap())
            .unwrap();
        director
            .spawn("eager", script_fn(move |_| Ok(Action::Release(teller))), 0.0)
            .unwrap();
        director.start().unwrap();
        assert!(matches!(director.step(), Err(SimulationError::ResourceIdle { .. })));
    }
}
