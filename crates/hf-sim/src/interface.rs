//! Named solver instances driven by an external caller.
//!
//! Each instance owns its model, integrator and committed state. Instances
//! are independent; [`SolverInterface::step_all_to`] advances all of them
//! in parallel.

use std::collections::HashMap;

use hf_components::Parameter;
use hf_project::ModelDescription;
use hf_solver::{GeneralizedAlpha, IntegratorConfig, Model, State, steady_initial};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::compile::{compile, initial_state, integrator_config};
use crate::error::{SimError, SimResult};
use crate::sim::{Advance, advance_to};

/// Restart data: the variable numbering plus the committed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub variables: Vec<String>,
    pub state: State,
}

impl Snapshot {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Named values of an instance at its current time.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub t: f64,
    pub values: Vec<(String, f64)>,
    pub derivatives: Vec<(String, f64)>,
    /// Discrete block states keyed `<state>:<block>`.
    pub discrete: Vec<(String, String)>,
}

impl Solution {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn discrete_state(&self, key: &str) -> Option<&str> {
        self.discrete
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug)]
pub struct Instance {
    model: Model,
    integrator: GeneralizedAlpha,
    state: State,
}

impl Instance {
    /// Compile `description`, set its initial conditions and, if requested,
    /// solve for a steady initial state.
    pub fn new(description: &ModelDescription) -> SimResult<Self> {
        let mut model = compile(description)?;
        let config = integrator_config(&description.simulation);
        let mut state = initial_state(&model, description)?;
        if description.simulation.steady_initial {
            let outcome = steady_initial(&mut model, &mut state, &config)?;
            if !outcome.is_converged() {
                return Err(SimError::compile("steady initialization did not converge"));
            }
        }
        Self::from_parts(model, config, state)
    }

    pub fn from_parts(model: Model, config: IntegratorConfig, state: State) -> SimResult<Self> {
        if state.len() != model.size() {
            return Err(SimError::InvalidArg {
                what: "state does not match model size",
            });
        }
        let integrator = GeneralizedAlpha::new(config)?;
        Ok(Self {
            model,
            integrator,
            state,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn integrator_mut(&mut self) -> &mut GeneralizedAlpha {
        &mut self.integrator
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Disjoint borrows for driving the instance with [`crate::run_sim`].
    pub fn parts_mut(&mut self) -> (&mut Model, &mut GeneralizedAlpha, &mut State) {
        (&mut self.model, &mut self.integrator, &mut self.state)
    }

    pub fn step_to(&mut self, t: f64) -> SimResult<Advance> {
        advance_to(&mut self.model, &mut self.integrator, &mut self.state, t)
    }

    pub fn solution(&self) -> Solution {
        let names = self.model.variable_names();
        Solution {
            t: self.state.t,
            values: names.iter().cloned().zip(self.state.y.iter().copied()).collect(),
            derivatives: names
                .iter()
                .cloned()
                .zip(self.state.ydot.iter().copied())
                .collect(),
            discrete: self.model.discrete_states(),
        }
    }

    pub fn set_state(&mut self, state: State) -> SimResult<()> {
        if state.len() != self.model.size() || state.ydot.len() != state.y.len() {
            return Err(SimError::snapshot(format!(
                "state has {} entries, model has {}",
                state.len(),
                self.model.size()
            )));
        }
        if !state.is_finite() {
            return Err(SimError::snapshot("state contains non-finite values"));
        }
        self.state = state;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            variables: self.model.variable_names().to_vec(),
            state: self.state.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) -> SimResult<()> {
        if snapshot.variables != self.model.variable_names() {
            return Err(SimError::snapshot("variables do not match the model"));
        }
        self.set_state(snapshot.state)
    }
}

/// Registry of named instances.
#[derive(Debug, Default)]
pub struct SolverInterface {
    instances: HashMap<String, Instance>,
}

impl SolverInterface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, id: impl Into<String>, description: &ModelDescription) -> SimResult<()> {
        let id = id.into();
        if self.instances.contains_key(&id) {
            return Err(SimError::DuplicateInstance { id });
        }
        let instance = Instance::new(description)?;
        tracing::info!(
            instance = %id,
            variables = instance.model.size(),
            "instance initialized"
        );
        self.instances.insert(id, instance);
        Ok(())
    }

    pub fn insert(&mut self, id: impl Into<String>, instance: Instance) -> SimResult<()> {
        let id = id.into();
        if self.instances.contains_key(&id) {
            return Err(SimError::DuplicateInstance { id });
        }
        self.instances.insert(id, instance);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> SimResult<Instance> {
        self.instances
            .remove(id)
            .ok_or_else(|| SimError::UnknownInstance { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.instances.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn instance(&self, id: &str) -> SimResult<&Instance> {
        self.instances
            .get(id)
            .ok_or_else(|| SimError::UnknownInstance { id: id.to_string() })
    }

    fn instance_mut(&mut self, id: &str) -> SimResult<&mut Instance> {
        self.instances
            .get_mut(id)
            .ok_or_else(|| SimError::UnknownInstance { id: id.to_string() })
    }

    /// Advance `id` to `t`. On failure the instance keeps its last committed
    /// state; retrying is up to the caller.
    pub fn step_to(&mut self, id: &str, t: f64) -> SimResult<Advance> {
        self.instance_mut(id)?.step_to(t)
    }

    pub fn get_solution(&self, id: &str) -> SimResult<Solution> {
        Ok(self.instance(id)?.solution())
    }

    /// Queue new parameters for `block`; they take effect at the next step.
    pub fn update_block_params(
        &mut self,
        id: &str,
        block: &str,
        params: Vec<Parameter>,
    ) -> SimResult<()> {
        self.instance_mut(id)?
            .model
            .queue_parameters(block, params)?;
        Ok(())
    }

    pub fn update_state(&mut self, id: &str, state: State) -> SimResult<()> {
        self.instance_mut(id)?.set_state(state)
    }

    pub fn snapshot(&self, id: &str) -> SimResult<Snapshot> {
        Ok(self.instance(id)?.snapshot())
    }

    pub fn restore(&mut self, id: &str, snapshot: Snapshot) -> SimResult<()> {
        self.instance_mut(id)?.restore(snapshot)
    }

    /// Advance every instance to `t` in parallel. Results are sorted by id.
    pub fn step_all_to(&mut self, t: f64) -> Vec<(String, SimResult<Advance>)> {
        let mut results: Vec<(String, SimResult<Advance>)> = self
            .instances
            .par_iter_mut()
            .map(|(id, instance)| (id.clone(), instance.step_to(t)))
            .collect();
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TUBE: &str = r#"
simulation: { dt: 0.01, steady_initial: true }
nodes: [in, out]
blocks:
  - name: inflow
    kind: { type: FlowReference, flow: 5.0 }
    outlets: [in]
  - name: vessel
    kind: { type: ResistiveVessel, resistance: 100.0 }
    inlets: [in]
    outlets: [out]
  - name: ground
    kind: { type: PressureReference, pressure: 0.0 }
    inlets: [out]
"#;

    fn interface() -> SolverInterface {
        let description = hf_project::from_yaml_str(TUBE).unwrap();
        let mut si = SolverInterface::new();
        si.init("tube", &description).unwrap();
        si
    }

    #[test]
    fn unknown_and_duplicate_ids() {
        let mut si = interface();
        let description = hf_project::from_yaml_str(TUBE).unwrap();
        assert!(matches!(
            si.init("tube", &description),
            Err(SimError::DuplicateInstance { .. })
        ));
        assert!(matches!(
            si.get_solution("other"),
            Err(SimError::UnknownInstance { .. })
        ));
        si.remove("tube").unwrap();
        assert!(!si.contains("tube"));
    }

    #[test]
    fn get_solution_is_idempotent() {
        let mut si = interface();
        si.step_to("tube", 0.05).unwrap();
        let a = si.get_solution("tube").unwrap();
        let b = si.get_solution("tube").unwrap();
        assert_eq!(a, b);
        assert!((a.get("P_in").unwrap() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn restore_rejects_foreign_snapshot() {
        let mut si = interface();
        let mut snapshot = si.snapshot("tube").unwrap();
        snapshot.variables.reverse();
        assert!(matches!(
            si.restore("tube", snapshot),
            Err(SimError::Snapshot { .. })
        ));
    }

    #[test]
    fn update_state_checks_length() {
        let mut si = interface();
        assert!(si.update_state("tube", State::zeros(3)).is_err());
        assert!(si.update_state("tube", State::zeros(4)).is_ok());
    }
}
