use procsim::simulator::{AnimationCommand, CommandKind, Report, WebDirector};
use procsim::models::ModelRecord;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

fn ferry_yaml() -> &'static str {
    r#"
name: "ferry"
seed: 3
storeRecords: true
animate: true
components:
  - type: "WaitQueue"
    name: "pier"
    position:
      x: 0
      y: 0
  - type: "Resource"
    name: "ferry"
    units: 1
    queue: "pier"
    serviceTime:
      constant:
        value: 4.0
    position:
      x: 10
      y: 0
  - type: "Sink"
    name: "island"
    position:
      x: 20
      y: 0
  - type: "Source"
    name: "mainland"
    units: 5
    interarrival:
      constant:
        value: 1.0
    itinerary:
      - utilize: "ferry"
      - release: "ferry"
      - leave: "island"
"#
}

#[test]
#[wasm_bindgen_test]
fn yaml_model_simulates_to_completion() {
    let mut web = WebDirector::post_yaml(ferry_yaml()).unwrap();
    web.simulate().unwrap();
    // Crossings end at 4, 8, 12, 16 and 20
    assert_eq!(web.clock(), 20.0);
    assert_eq!(web.phase(), "Finished");
    let report: Report = serde_json::from_str(&web.report_json().unwrap()).unwrap();
    assert_eq!(report.model, "ferry");
    assert_eq!(report.population.departed, 5);
    let ferry = report.component("ferry").unwrap();
    assert_eq!(ferry.kind, "Resource");
    assert_eq!(ferry.statistics[0].count, 5);
    assert_eq!(ferry.statistics[0].mean, 4.0);
    // Busy for the whole run
    assert!((ferry.statistics[1].mean - 1.0).abs() < 1.0e-9);
}

#[test]
#[wasm_bindgen_test]
fn step_until_advances_the_clock() {
    let mut web = WebDirector::post_yaml(ferry_yaml()).unwrap();
    let steps = web.step_until(9.0).unwrap();
    assert!(steps > 0);
    assert_eq!(web.clock(), 9.0);
    assert_eq!(web.phase(), "Running");
    assert!(web.step().unwrap());
    assert!(web.step_n(1000).unwrap() > 0);
    assert!(!web.step().unwrap());
}

#[test]
#[wasm_bindgen_test]
fn records_and_animation_are_exported_as_json() {
    let mut web = WebDirector::post_yaml(ferry_yaml()).unwrap();
    web.simulate().unwrap();
    let records: Vec<ModelRecord> = serde_json::from_str(&web.records_json().unwrap()).unwrap();
    assert_eq!(
        records
            .iter()
            .filter(|record| record.action == "Departure")
            .count(),
        5
    );
    let commands: Vec<AnimationCommand> =
        serde_json::from_str(&web.animation_json().unwrap()).unwrap();
    assert_eq!(
        commands
            .iter()
            .filter(|command| command.kind == CommandKind::CreateNode)
            .count(),
        4
    );
    assert_eq!(
        commands
            .iter()
            .filter(|command| command.kind == CommandKind::DestroyToken)
            .count(),
        5
    );
}

#[test]
#[wasm_bindgen_test]
fn shutdown_mid_run_discards_waiting_passengers() {
    let mut web = WebDirector::post_json(
        &serde_json::to_string(&serde_yaml::from_str::<serde_json::Value>(ferry_yaml()).unwrap())
            .unwrap(),
    )
    .unwrap();
    web.step_until(4.5).unwrap();
    // The first passenger has crossed, the second is aboard, three wait
    let discarded = web.shutdown();
    assert_eq!(discarded, 4);
    assert_eq!(web.phase(), "Shutdown");
    assert!(!web.step().unwrap());
    let report: Report = serde_json::from_str(&web.report_json().unwrap()).unwrap();
    assert_eq!(report.population.departed, 1);
    assert_eq!(report.population.discarded, 4);
}
