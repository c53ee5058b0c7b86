//! Stepping to a target time and running a simulation with recording.

use hf_project::SimulationDef;
use hf_solver::{GeneralizedAlpha, Model, State, StepOutcome};

use crate::error::{SimError, SimResult};

/// Outcome of advancing an instance to a target time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// The target was reached after `steps` converged steps.
    Reached { t: f64, steps: usize },
    /// A step from `t` did not converge; the state stays at `t`.
    Failed {
        t: f64,
        iterations: usize,
        residual_norm: f64,
    },
}

impl Advance {
    pub fn is_reached(&self) -> bool {
        matches!(self, Advance::Reached { .. })
    }
}

/// Advance `state` to `target` with the integrator's time step, shortening
/// the last step to land on `target`. A target at or before `state.t` does
/// nothing.
pub fn advance_to(
    model: &mut Model,
    integrator: &mut GeneralizedAlpha,
    state: &mut State,
    target: f64,
) -> SimResult<Advance> {
    if !target.is_finite() {
        return Err(SimError::InvalidArg {
            what: "target time must be finite",
        });
    }
    let dt = integrator.config().dt;
    let eps = 1e-9 * dt;
    let mut steps = 0;
    while state.t < target - eps {
        let remaining = target - state.t;
        let last = remaining <= dt + eps;
        let h = if last { remaining } else { dt };
        match integrator.step_with(model, state, h)? {
            StepOutcome::Converged { .. } => steps += 1,
            StepOutcome::Failed {
                iterations,
                residual_norm,
            } => {
                return Ok(Advance::Failed {
                    t: state.t,
                    iterations,
                    residual_norm,
                });
            }
        }
        if last {
            state.t = target;
        }
    }
    Ok(Advance::Reached { t: state.t, steps })
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Final simulation time
    pub t_end: f64,
    /// Record every N-th step (decimation)
    pub record_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t_end: 1.0,
            record_every: 1,
        }
    }
}

impl From<&SimulationDef> for SimOptions {
    fn from(sim: &SimulationDef) -> Self {
        Self {
            t_end: sim.t_end,
            record_every: sim.record_every,
        }
    }
}

/// Recorded trajectory of a run.
#[derive(Clone, Debug)]
pub struct SimRecord {
    pub variables: Vec<String>,
    pub t: Vec<f64>,
    pub y: Vec<Vec<f64>>,
    /// Discrete block states at each recorded time.
    pub discrete: Vec<Vec<(String, String)>>,
    /// Set when a step failed before `t_end`.
    pub failure: Option<Advance>,
}

impl SimRecord {
    /// Column of `name` over the recorded times.
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        let i = self.variables.iter().position(|v| v == name)?;
        Some(self.y.iter().map(|y| y[i]).collect())
    }

    fn push(&mut self, model: &Model, state: &State) {
        self.t.push(state.t);
        self.y.push(state.y.clone());
        self.discrete.push(model.discrete_states());
    }
}

/// Step from `state` to `opts.t_end`, recording the initial state, every
/// `record_every`-th step and the final state. A failed step ends the run
/// early and is reported in [`SimRecord::failure`].
pub fn run_sim(
    model: &mut Model,
    integrator: &mut GeneralizedAlpha,
    state: &mut State,
    opts: &SimOptions,
) -> SimResult<SimRecord> {
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }
    if !(opts.t_end >= state.t) {
        return Err(SimError::InvalidArg {
            what: "t_end must not precede the current time",
        });
    }

    let mut record = SimRecord {
        variables: model.variable_names().to_vec(),
        t: Vec::new(),
        y: Vec::new(),
        discrete: Vec::new(),
        failure: None,
    };
    record.push(model, state);

    let dt = integrator.config().dt;
    let t0 = state.t;
    let mut step = 0usize;
    let mut recorded = true;
    while state.t < opts.t_end - 1e-9 * dt {
        let target = (t0 + (step + 1) as f64 * dt).min(opts.t_end);
        let advance = advance_to(model, integrator, state, target)?;
        if !advance.is_reached() {
            tracing::warn!(t = state.t, "simulation stopped early");
            record.failure = Some(advance);
            break;
        }
        step += 1;
        recorded = step % opts.record_every == 0;
        if recorded {
            record.push(model, state);
        }
    }
    if !recorded {
        record.push(model, state);
    }
    tracing::info!(steps = step, t = state.t, "simulation finished");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hf_components::{Block, FlowReferenceBc, Parameter, WindkesselBc};
    use hf_graph::NetworkBuilder;
    use hf_solver::IntegratorConfig;

    fn windkessel() -> Model {
        let mut b = NetworkBuilder::new();
        let n = b.add_node("in");
        b.add_block("inflow", &[], &[n]);
        b.add_block("wk", &[n], &[]);
        let blocks: Vec<Box<dyn Block>> = vec![
            Box::new(FlowReferenceBc::new("inflow", Parameter::constant(1.0)).unwrap()),
            Box::new(WindkesselBc::rcr("wk", 1.0, 1.0, 1.0, 0.0).unwrap()),
        ];
        Model::new(b.build().unwrap(), blocks).unwrap()
    }

    fn integrator(dt: f64) -> GeneralizedAlpha {
        GeneralizedAlpha::new(IntegratorConfig {
            dt,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn last_step_lands_on_target() {
        let mut model = windkessel();
        let mut ga = integrator(0.3);
        let mut state = State::zeros(model.size());
        let advance = advance_to(&mut model, &mut ga, &mut state, 1.0).unwrap();
        assert_eq!(advance, Advance::Reached { t: 1.0, steps: 4 });
        assert_eq!(state.t, 1.0);
    }

    #[test]
    fn past_target_is_a_no_op() {
        let mut model = windkessel();
        let mut ga = integrator(0.1);
        let mut state = State::zeros(model.size());
        state.t = 2.0;
        let before = state.clone();
        let advance = advance_to(&mut model, &mut ga, &mut state, 1.0).unwrap();
        assert_eq!(advance, Advance::Reached { t: 2.0, steps: 0 });
        assert_eq!(state, before);
    }

    #[test]
    fn records_decimated_and_final_states() {
        let mut model = windkessel();
        let mut ga = integrator(0.1);
        let mut state = State::zeros(model.size());
        let opts = SimOptions {
            t_end: 0.55,
            record_every: 2,
        };
        let record = run_sim(&mut model, &mut ga, &mut state, &opts).unwrap();
        // t = 0, 0.2, 0.4, 0.55
        assert_eq!(record.t.len(), 4);
        assert_relative_eq!(record.t[1], 0.2, epsilon = 1e-12);
        assert_eq!(*record.t.last().unwrap(), 0.55);
        assert!(record.failure.is_none());
        assert_eq!(record.series("P_in").unwrap().len(), 4);
    }
}
