//! Restarting from a snapshot reproduces the uninterrupted trajectory.

use hf_core::scaled_diff;
use hf_sim::{Snapshot, SolverInterface};

const MODEL: &str = r#"
name: stenosed vessel
simulation: { dt: 0.01, rho: 0.5 }
nodes: [in, mid]
blocks:
  - name: inflow
    kind:
      type: FlowReference
      flow: { t: [0.0, 0.5, 1.0], values: [0.0, 10.0, 0.0], periodic: true }
    outlets: [in]
  - name: vessel
    kind:
      type: BloodVessel
      resistance: 1.0
      capacitance: 0.01
      inductance: 0.005
      stenosis_coefficient: 0.1
    inlets: [in]
    outlets: [mid]
  - name: outlet
    kind:
      type: Windkessel
      proximal_resistance: 0.5
      capacitance: 1.0
      distal_resistance: 5.0
    inlets: [mid]
"#;

#[test]
fn restart_reproduces_trajectory() {
    let description = hf_project::from_yaml_str(MODEL).unwrap();
    let mut si = SolverInterface::new();
    si.init("full", &description).unwrap();
    si.init("first_half", &description).unwrap();
    si.init("second_half", &description).unwrap();

    assert!(si.step_to("full", 1.3).unwrap().is_reached());

    assert!(si.step_to("first_half", 0.6).unwrap().is_reached());
    let json = si.snapshot("first_half").unwrap().to_json().unwrap();
    si.remove("first_half").unwrap();

    si.restore("second_half", Snapshot::from_json(&json).unwrap())
        .unwrap();
    assert_eq!(si.get_solution("second_half").unwrap().t, 0.6);
    assert!(si.step_to("second_half", 1.3).unwrap().is_reached());

    let full = si.get_solution("full").unwrap();
    let restarted = si.get_solution("second_half").unwrap();
    assert_eq!(full.t, restarted.t);
    assert!(full.get("P_in").unwrap().abs() > 1.0);
    for ((name, a), (_, b)) in full.values.iter().zip(&restarted.values) {
        assert!(scaled_diff(*a, *b) <= 1e-8, "{name}: {a} vs {b}");
    }
}

#[test]
fn snapshot_json_carries_variable_names() {
    let description = hf_project::from_yaml_str(MODEL).unwrap();
    let mut si = SolverInterface::new();
    si.init("a", &description).unwrap();
    let json = si.snapshot("a").unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["variables"][0], "P_in");
    assert_eq!(value["variables"][4], "Pc:outlet");
    assert_eq!(value["state"]["y"].as_array().unwrap().len(), 5);
}
