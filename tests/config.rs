use procsim::models::ComponentId;
use procsim::simulator::{ModelConfig, Phase};
use procsim::utils::errors::SimulationError;
use tracing_subscriber::EnvFilter;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn bank_yaml() -> &'static str {
    r#"
name: "bank"
seed: 12
storeRecords: true
components:
  - type: "Source"
    name: "entry"
    units: 25
    interarrival:
      exp:
        lambda: 0.5
    itinerary:
      - utilize: "teller"
      - release: "teller"
      - moveOn: "hallway"
      - leave: "exit"
    balkTo: "exit"
    position:
      x: 0
      y: 0
  - type: "WaitQueue"
    name: "line"
    capacity: 5
    position:
      x: 10
      y: 0
  - type: "Resource"
    name: "teller"
    units: 2
    queue: "line"
    serviceTime:
      uniform:
        min: 1.0
        max: 3.0
    position:
      x: 20
      y: 0
      w: 4
      h: 4
  - type: "Transport"
    name: "east door"
    travelTime:
      constant:
        value: 1.5
    from: "teller"
    to: "exit"
  - type: "Transport"
    name: "west door"
    travelTime:
      constant:
        value: 2.5
    from: "teller"
    to: "exit"
  - type: "Route"
    name: "hallway"
    lanes: ["east door", "west door"]
    choice:
      weighted:
        weights: [3, 1]
  - type: "Sink"
    name: "exit"
    position:
      x: 40
      y: 0
"#
}

#[test]
#[wasm_bindgen_test]
fn yaml_model_builds_and_runs() {
    init_logging();
    let config = ModelConfig::from_yaml(bank_yaml()).unwrap();
    assert_eq!(config.components.len(), 7);
    let mut director = config.build().unwrap();
    assert_eq!(director.name(), "bank");
    assert_eq!(director.seed(), 12);
    assert!(matches!(director.component("hallway").unwrap(), ComponentId::Route(_)));
    let teller = director.resource_id("teller").unwrap();
    assert_eq!(director.resource(teller).unwrap().units(), 2);
    let east = director.transport_id("east door").unwrap();
    assert_eq!(director.transport(east).unwrap().path(), vec![22.0, 2.0, 40.0, 0.0]);

    let report = director.simulate().unwrap();
    assert_eq!(director.phase(), Phase::Finished);
    assert_eq!(report.population.created, 25);
    assert_eq!(report.population.departed, 25);
    assert_eq!(report.population.in_system, 0);
    let exit = director.sink_id("exit").unwrap();
    assert_eq!(director.sink(exit).unwrap().departures(), 25);
    let hallway = director.route_id("hallway").unwrap();
    let balked = director.queue(director.queue_id("line").unwrap()).unwrap().rejections();
    assert_eq!(
        director.route(hallway).unwrap().selections().iter().sum::<usize>(),
        25 - balked
    );
    assert!(!director.records().is_empty());
    assert!(report.component("teller").is_some());
}

#[test]
#[wasm_bindgen_test]
fn equal_seeds_reproduce_the_run() {
    init_logging();
    let run = || {
        let mut director = ModelConfig::from_yaml(bank_yaml()).unwrap().build().unwrap();
        let report = director.simulate().unwrap();
        (report.clock, director.records().len())
    };
    assert_eq!(run(), run());
}

#[test]
#[wasm_bindgen_test]
fn json_model_builds_and_honors_the_stop_condition() {
    init_logging();
    let model = r#"
{
    "name": "gatehouse",
    "stop": {
        "timeLimit": 30.0
    },
    "components": [
        {
            "type": "Gate",
            "name": "barrier",
            "queue": "approach",
            "units": 100,
            "onTime": {"constant": {"value": 4.0}},
            "offTime": {"constant": {"value": 6.0}},
            "shut": true,
            "cap": 2
        },
        {
            "type": "WaitQueue",
            "name": "approach",
            "discipline": "fifo"
        },
        {
            "type": "Junction",
            "name": "roundabout",
            "jumpTime": {"constant": {"value": 1.0}}
        },
        {
            "type": "Sink",
            "name": "town"
        },
        {
            "type": "Source",
            "name": "highway",
            "units": 100,
            "interarrival": {"constant": {"value": 1.0}},
            "itinerary": [
                {"passGate": "barrier"},
                {"jump": "roundabout"},
                {"hold": {"constant": {"value": 0.5}}},
                {"leave": "town"}
            ]
        }
    ]
}"#;
    let mut director = ModelConfig::from_json(model).unwrap().build().unwrap();
    let report = director.simulate().unwrap();
    assert_eq!(report.clock, 30.0);
    let gate = director.gate(director.gate_id("barrier").unwrap()).unwrap();
    assert_eq!(gate.cap(), 2);
    // Openings at 6 and 16 and 26
    assert_eq!(gate.openings(), 3);
    assert!(report.population.departed > 0);
    assert!(report.population.in_system > 0);
    let population = report.population;
    assert_eq!(
        population.created,
        population.departed + population.retired + population.in_system
    );
}

#[test]
#[wasm_bindgen_test]
fn unknown_component_names_are_flaws() {
    init_logging();
    let model = r#"
components:
  - type: "Resource"
    name: "teller"
    units: 1
    queue: "missing line"
    serviceTime:
      constant:
        value: 1.0
"#;
    let error = ModelConfig::from_yaml(model).unwrap().build().unwrap_err();
    assert!(matches!(error, SimulationError::ComponentNotFound(ref name) if name == "missing line"));
}

#[test]
#[wasm_bindgen_test]
fn duplicate_names_are_flaws() {
    init_logging();
    let model = r#"
components:
  - type: "Sink"
    name: "exit"
  - type: "WaitQueue"
    name: "exit"
"#;
    let error = ModelConfig::from_yaml(model).unwrap().build().unwrap_err();
    assert!(matches!(error, SimulationError::DuplicateComponent(_)));
}

#[test]
#[wasm_bindgen_test]
fn malformed_models_are_yaml_errors() {
    init_logging();
    let error = ModelConfig::from_yaml("components: 7").unwrap_err();
    assert!(matches!(error, SimulationError::YAMLError(_)));
    assert!(!error.is_configuration_error());
}

#[test]
#[wasm_bindgen_test]
fn config_round_trips_through_yaml() {
    init_logging();
    let config = ModelConfig::from_yaml(bank_yaml()).unwrap();
    let reparsed = ModelConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(reparsed.components.len(), config.components.len());
    assert_eq!(reparsed.seed, Some(12));
}

#[test]
#[wasm_bindgen_test]
fn empty_uniform_ranges_are_refused_at_build() {
    init_logging();
    let model = r#"
components:
  - type: "WaitQueue"
    name: "line"
  - type: "Resource"
    name: "teller"
    units: 1
    queue: "line"
    serviceTime:
      uniform:
        min: 5.0
        max: 5.0
"#;
    let error = ModelConfig::from_yaml(model).unwrap().build().unwrap_err();
    assert!(matches!(error, SimulationError::UniformRangeError { .. }));
    assert!(error.is_configuration_error());
}

#[test]
#[wasm_bindgen_test]
fn itinerary_holds_are_checked_at_build() {
    init_logging();
    let model = r#"
components:
  - type: "Sink"
    name: "exit"
  - type: "Source"
    name: "entry"
    units: 1
    interarrival:
      constant:
        value: 1.0
    itinerary:
      - hold:
          uniform:
            min: 8.0
            max: 2.0
      - leave: "exit"
"#;
    let error = ModelConfig::from_yaml(model).unwrap().build().unwrap_err();
    assert!(matches!(error, SimulationError::UniformRangeError { .. }));
}

#[test]
#[wasm_bindgen_test]
fn sources_cannot_start_before_time_zero() {
    init_logging();
    let model = r#"
components:
  - type: "Sink"
    name: "exit"
  - type: "Source"
    name: "early"
    units: 3
    start: -1.0
    interarrival:
      constant:
        value: 1.0
    itinerary:
      - leave: "exit"
"#;
    let error = ModelConfig::from_yaml(model).unwrap().build().unwrap_err();
    assert!(matches!(error, SimulationError::InvalidStart { ref component, .. } if component == "early"));
}
