//! Build a solver model from a model description.

use std::collections::HashMap;

use hf_components::{
    Activation, ActivationShape, Block, BloodVessel, BloodVesselCrl, ClosedLoopCoronaryBc,
    ClosedLoopHeartPulmonary, ClosedLoopRcrBc, ComponentResult, CoronarySide, FlowReferenceBc,
    HeartActivation, Junction, LinearElastanceChamber, OpenLoopCoronaryBc, Parameter,
    PressureReferenceBc, ResistanceBc, ResistiveVessel, WindkesselBc,
};
use hf_graph::NetworkBuilder;
use hf_project::{
    ActivationDef, BlockDef, BlockKindDef, CoronarySideDef, ModelDescription, ParameterDef,
    SimulationDef, validate_description,
};
use hf_solver::{IntegratorConfig, Model, State};

use crate::error::{SimError, SimResult};

/// Validate `description` and build its model.
pub fn compile(description: &ModelDescription) -> SimResult<Model> {
    validate_description(description)?;

    let mut builder = NetworkBuilder::new();
    let mut nodes = HashMap::new();
    for name in &description.nodes {
        nodes.insert(name.as_str(), builder.add_node(name.clone()));
    }
    let lookup = |names: &[String]| {
        names
            .iter()
            .map(|n| {
                nodes
                    .get(n.as_str())
                    .copied()
                    .ok_or_else(|| SimError::compile(format!("unknown node {n}")))
            })
            .collect::<SimResult<Vec<_>>>()
    };

    let mut blocks = Vec::with_capacity(description.blocks.len());
    for def in &description.blocks {
        builder.add_block(def.name.clone(), &lookup(&def.inlets)?, &lookup(&def.outlets)?);
        blocks.push(build_block(def)?);
    }
    let network = builder.build()?;
    let model = Model::new(network, blocks)?;
    tracing::debug!(name = %description.name, size = model.size(), "model compiled");
    Ok(model)
}

/// Initial state at `t = 0` from the description's initial conditions.
pub fn initial_state(model: &Model, description: &ModelDescription) -> SimResult<State> {
    let mut state = State::zeros(model.size());
    for (name, value) in &description.initial_condition {
        let dof = model
            .dof_of(name)
            .ok_or_else(|| SimError::compile(format!("initial condition for unknown variable {name}")))?;
        state.y[dof] = *value;
    }
    Ok(state)
}

pub fn integrator_config(sim: &SimulationDef) -> IntegratorConfig {
    IntegratorConfig {
        dt: sim.dt,
        rho: sim.rho,
        atol: sim.atol,
        max_iter: sim.max_iter,
        damping: sim.damping,
    }
}

pub fn parameter(def: &ParameterDef) -> ComponentResult<Parameter> {
    match def {
        ParameterDef::Constant(v) => Ok(Parameter::constant(*v)),
        ParameterDef::Series { t, values, periodic } => {
            Parameter::series(t.clone(), values.clone(), *periodic)
        }
    }
}

pub fn activation(def: &ActivationDef) -> ComponentResult<Activation> {
    match *def {
        ActivationDef::HalfCosine {
            period,
            t_active,
            t_twitch,
        } => Activation::new(period, ActivationShape::HalfCosine { t_active, t_twitch }),
        ActivationDef::PiecewiseCosine {
            period,
            contract_start,
            relax_start,
            contract_duration,
            relax_duration,
        } => Activation::new(
            period,
            ActivationShape::PiecewiseCosine {
                contract_start,
                relax_start,
                contract_duration,
                relax_duration,
            },
        ),
        ActivationDef::TwoHill {
            period,
            t_shift,
            tau_1,
            tau_2,
            m1,
            m2,
        } => Activation::new(
            period,
            ActivationShape::TwoHill {
                t_shift,
                tau_1,
                tau_2,
                m1,
                m2,
            },
        ),
    }
}

fn build_block(def: &BlockDef) -> ComponentResult<Box<dyn Block>> {
    let name = def.name.clone();
    let mut params = def
        .kind
        .parameters()
        .into_iter()
        .map(|(_, p)| parameter(p))
        .collect::<ComponentResult<Vec<_>>>()?;

    let block: Box<dyn Block> = match &def.kind {
        BlockKindDef::ResistiveVessel { .. } => Box::new(ResistiveVessel::new(name, params)?),
        BlockKindDef::BloodVessel { .. } => Box::new(BloodVessel::new(name, params)?),
        BlockKindDef::BloodVesselCrl { .. } => Box::new(BloodVesselCrl::new(name, params)?),
        BlockKindDef::Junction => Box::new(Junction::new(name)?),
        BlockKindDef::FlowReference { .. } => {
            Box::new(FlowReferenceBc::new(name, params.remove(0))?)
        }
        BlockKindDef::PressureReference { .. } => {
            Box::new(PressureReferenceBc::new(name, params.remove(0))?)
        }
        BlockKindDef::Resistance { .. } => {
            let pd = params.remove(1);
            Box::new(ResistanceBc::new(name, params.remove(0), pd)?)
        }
        BlockKindDef::Windkessel { .. } => Box::new(WindkesselBc::new(name, params)?),
        BlockKindDef::OpenLoopCoronary { .. } => Box::new(OpenLoopCoronaryBc::new(name, params)?),
        BlockKindDef::ClosedLoopCoronary { side, .. } => {
            let side = match side {
                CoronarySideDef::Left => CoronarySide::Left,
                CoronarySideDef::Right => CoronarySide::Right,
            };
            Box::new(ClosedLoopCoronaryBc::new(name, side, params)?)
        }
        BlockKindDef::ClosedLoopRcr { .. } => Box::new(ClosedLoopRcrBc::new(name, params)?),
        BlockKindDef::ClosedLoopHeartPulmonary {
            parameters,
            atria,
            ventricles,
        } => {
            let values = parameters.values().into_iter().map(Parameter::constant).collect();
            let activation = HeartActivation {
                atria: activation(atria)?,
                ventricles: activation(ventricles)?,
            };
            Box::new(ClosedLoopHeartPulmonary::new(name, values, activation)?)
        }
        BlockKindDef::LinearElastanceChamber { activation: act, .. } => {
            Box::new(LinearElastanceChamber::new(name, params, activation(act)?)?)
        }
    };
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tube(resistance: f64) -> ModelDescription {
        hf_project::from_yaml_str(&format!(
            r#"
nodes: [in, out]
blocks:
  - name: inflow
    kind: {{ type: FlowReference, flow: 5.0 }}
    outlets: [in]
  - name: vessel
    kind: {{ type: ResistiveVessel, resistance: {resistance} }}
    inlets: [in]
    outlets: [out]
  - name: ground
    kind: {{ type: PressureReference, pressure: 0.0 }}
    inlets: [out]
initial_condition:
  P_in: 42.0
"#
        ))
        .unwrap()
    }

    #[test]
    fn compiles_variables_in_network_order() {
        let description = tube(100.0);
        let model = compile(&description).unwrap();
        assert_eq!(model.variable_names(), &["P_in", "Q_in", "P_out", "Q_out"]);

        let state = initial_state(&model, &description).unwrap();
        assert_eq!(state.y, vec![42.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn unknown_initial_variable_is_rejected() {
        let mut description = tube(100.0);
        description
            .initial_condition
            .insert("P_nowhere".to_string(), 1.0);
        let model = compile(&description).unwrap();
        assert!(matches!(
            initial_state(&model, &description),
            Err(SimError::Compile { .. })
        ));
    }

    #[test]
    fn time_series_on_constant_slot_is_rejected() {
        let mut description = tube(100.0);
        description.blocks[1].kind = BlockKindDef::ResistiveVessel {
            resistance: ParameterDef::Series {
                t: vec![0.0, 1.0],
                values: vec![1.0, 2.0],
                periodic: false,
            },
        };
        assert!(matches!(compile(&description), Err(SimError::Compile { .. })));
    }

    #[test]
    fn wrong_port_count_is_a_solver_configuration_error() {
        let mut description = tube(100.0);
        description.blocks[2].kind = BlockKindDef::ResistiveVessel {
            resistance: 1.0.into(),
        };
        assert!(matches!(
            compile(&description),
            Err(SimError::Solver(hf_solver::SolverError::Configuration { .. }))
        ));
    }

    #[test]
    fn two_hill_activation_is_normalized() {
        let act = activation(&ActivationDef::TwoHill {
            period: 1.0,
            t_shift: 0.0,
            tau_1: 0.1,
            tau_2: 0.3,
            m1: 1.3,
            m2: 27.4,
        })
        .unwrap();
        let peak = (0..1000)
            .map(|i| act.value(i as f64 * 1e-3))
            .fold(0.0_f64, f64::max);
        assert!(peak <= 1.0 + 1e-9 && peak > 0.99);
    }
}
