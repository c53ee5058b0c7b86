//! The model files under `models/` load, compile and take a few steps.

use std::path::PathBuf;

use hf_sim::Instance;

fn models_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models")
}

#[test]
fn shipped_models_run() {
    let mut count = 0;
    for entry in std::fs::read_dir(models_dir()).unwrap() {
        let path = entry.unwrap().path();
        let description = hf_project::load(&path).unwrap();
        let mut instance = Instance::new(&description).unwrap();
        let target = 10.0 * description.simulation.dt;
        let advance = instance.step_to(target).unwrap();
        assert!(advance.is_reached(), "{}: {advance:?}", path.display());
        assert!(instance.state().is_finite(), "{}", path.display());
        count += 1;
    }
    assert!(count >= 4);
}

#[test]
fn bifurcation_conserves_flow_at_junction() {
    let description = hf_project::load(&models_dir().join("bifurcation.json")).unwrap();
    let mut instance = Instance::new(&description).unwrap();
    for k in 1..=40 {
        assert!(instance.step_to(k as f64 * 0.005).unwrap().is_reached());
        let s = instance.solution();
        let balance = s.get("Q_trunk").unwrap() - s.get("Q_left").unwrap() - s.get("Q_right").unwrap();
        assert!(balance.abs() < 1e-6, "t = {}: {balance}", s.t);
    }
}
