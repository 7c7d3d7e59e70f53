//! Models can be described in YAML or JSON, and built into a `Director`.
//! Components refer to each other by name; names are resolved to ids when
//! the model is built, in dependency order, so the component list itself
//! may be in any order.

use serde::{Deserialize, Serialize};

use super::actor::Script;
use super::itinerary::{Itinerary, Step};
use super::{Director, StopCondition};
use crate::input_modeling::uniform_rng::DEFAULT_SEED;
use crate::input_modeling::{ContinuousRandomVariable, Variate};
use crate::models::gate::DEFAULT_CAP;
use crate::models::{
    Discipline, Gate, Junction, LaneChoice, Position, Resource, Route, Sink, Source, Transport,
    WaitQueue,
};
use crate::utils::errors::SimulationError;

fn default_name() -> String {
    String::from("model")
}

fn default_cap() -> usize {
    DEFAULT_CAP
}

fn variate(variable: &ContinuousRandomVariable) -> Result<Box<dyn Variate>, SimulationError> {
    variable.validate()?;
    Ok(Box::new(variable.clone()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub store_records: bool,
    /// Whether the host should attach an animator
    #[serde(default)]
    pub animate: bool,
    #[serde(default)]
    pub stop: StopCondition,
    pub components: Vec<ComponentConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ComponentConfig {
    WaitQueue(WaitQueueConfig),
    Resource(ResourceConfig),
    Gate(GateConfig),
    Junction(JunctionConfig),
    Source(SourceConfig),
    Sink(SinkConfig),
    Transport(TransportConfig),
    Route(RouteConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitQueueConfig {
    pub name: String,
    #[serde(default)]
    pub capacity: Option<usize>,
    #[serde(default)]
    pub discipline: Discipline,
    #[serde(default)]
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    pub name: String,
    pub units: usize,
    pub service_time: ContinuousRandomVariable,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    pub name: String,
    pub queue: String,
    pub units: usize,
    pub on_time: ContinuousRandomVariable,
    pub off_time: ContinuousRandomVariable,
    #[serde(default)]
    pub shut: bool,
    #[serde(default = "default_cap")]
    pub cap: usize,
    #[serde(default)]
    pub stagger: Option<f64>,
    #[serde(default)]
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JunctionConfig {
    pub name: String,
    pub jump_time: ContinuousRandomVariable,
    #[serde(default)]
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub name: String,
    pub units: usize,
    pub interarrival: ContinuousRandomVariable,
    #[serde(default)]
    pub start: f64,
    pub itinerary: Vec<StepConfig>,
    /// Where actors turned away by a full queue depart
    #[serde(default)]
    pub balk_to: Option<String>,
    #[serde(default)]
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkConfig {
    pub name: String,
    #[serde(default)]
    pub position: Position,
}

/// Transport endpoints are component names; the path runs between their
/// positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    pub name: String,
    pub travel_time: ContinuousRandomVariable,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    pub name: String,
    pub lanes: Vec<String>,
    #[serde(default)]
    pub choice: LaneChoice,
    #[serde(default)]
    pub position: Position,
}

/// An itinerary step, naming the component it acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepConfig {
    Hold(ContinuousRandomVariable),
    Utilize(String),
    Release(String),
    WaitIn(String),
    PassGate(String),
    Jump(String),
    Move(String),
    MoveOn(String),
    Leave(String),
}

impl ModelConfig {
    pub fn from_yaml(model: &str) -> Result<Self, SimulationError> {
        Ok(serde_yaml::from_str(model)?)
    }

    pub fn from_json(model: &str) -> Result<Self, SimulationError> {
        Ok(serde_json::from_str(model)?)
    }

    pub fn to_yaml(&self) -> Result<String, SimulationError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Register every component with a new `Director`, ready to start.
    pub fn build(&self) -> Result<Director, SimulationError> {
        let mut director = Director::new(&self.name, self.seed.unwrap_or(DEFAULT_SEED))
            .with_records(self.store_records)
            .with_stop_condition(self.stop);
        for component in &self.components {
            if let ComponentConfig::WaitQueue(queue) = component {
                director.add_wait_queue(WaitQueue::new(
                    &queue.name,
                    queue.capacity,
                    queue.discipline,
                    queue.position,
                )?)?;
            }
        }
        for component in &self.components {
            match component {
                ComponentConfig::Resource(resource) => {
                    let queue = match &resource.queue {
                        Some(queue) => Some(director.queue_id(queue)?),
                        None => None,
                    };
                    director.add_resource(Resource::new(
                        &resource.name,
                        resource.units,
                        variate(&resource.service_time)?,
                        queue,
                        resource.position,
                    )?)?;
                }
                ComponentConfig::Gate(gate) => {
                    let built = Gate::new(
                        &gate.name,
                        director.queue_id(&gate.queue)?,
                        gate.units,
                        variate(&gate.on_time)?,
                        variate(&gate.off_time)?,
                        gate.position,
                        gate.shut,
                        gate.cap,
                    )?;
                    director.add_gate(match gate.stagger {
                        Some(stagger) => built.with_stagger(stagger),
                        None => built,
                    })?;
                }
                ComponentConfig::Junction(junction) => {
                    director.add_junction(Junction::new(
                        &junction.name,
                        variate(&junction.jump_time)?,
                        junction.position,
                    ))?;
                }
                ComponentConfig::Sink(sink) => {
                    director.add_sink(Sink::new(&sink.name, sink.position))?;
                }
                _ => {}
            }
        }
        for component in &self.components {
            if let ComponentConfig::Transport(transport) = component {
                let from = director.position_of(director.component(&transport.from)?)?;
                let to = director.position_of(director.component(&transport.to)?)?;
                director.add_transport(Transport::new(
                    &transport.name,
                    variate(&transport.travel_time)?,
                    from,
                    to,
                ))?;
            }
        }
        for component in &self.components {
            if let ComponentConfig::Route(route) = component {
                let lanes = route
                    .lanes
                    .iter()
                    .map(|lane| director.transport_id(lane))
                    .collect::<Result<Vec<_>, _>>()?;
                director.add_route(Route::new(
                    &route.name,
                    lanes,
                    route.choice.clone(),
                    route.position,
                )?)?;
            }
        }
        for component in &self.components {
            if let ComponentConfig::Source(source) = component {
                let steps = source
                    .itinerary
                    .iter()
                    .map(|step| resolve_step(&director, step))
                    .collect::<Result<Vec<_>, _>>()?;
                let balk_to = match &source.balk_to {
                    Some(sink) => Some(director.sink_id(sink)?),
                    None => None,
                };
                let itinerary = Itinerary::new(steps, balk_to);
                director.add_source(Source::new(
                    &source.name,
                    source.units,
                    variate(&source.interarrival)?,
                    Box::new(move |_: usize| -> Box<dyn Script> { Box::new(itinerary.clone()) }),
                    source.start,
                    source.position,
                )?)?;
            }
        }
        Ok(director)
    }
}

fn resolve_step(director: &Director, step: &StepConfig) -> Result<Step, SimulationError> {
    Ok(match step {
        StepConfig::Hold(delay) => {
            delay.validate()?;
            Step::Hold(delay.clone())
        }
        StepConfig::Utilize(name) => Step::Utilize(director.resource_id(name)?),
        StepConfig::Release(name) => Step::Release(director.resource_id(name)?),
        StepConfig::WaitIn(name) => Step::WaitIn(director.queue_id(name)?),
        StepConfig::PassGate(name) => Step::PassGate(director.gate_id(name)?),
        StepConfig::Jump(name) => Step::Jump(director.junction_id(name)?),
        StepConfig::Move(name) => Step::Move(director.transport_id(name)?),
        StepConfig::MoveOn(name) => Step::MoveOn(director.route_id(name)?),
        StepConfig::Leave(name) => Step::Leave(director.sink_id(name)?),
    })
}
