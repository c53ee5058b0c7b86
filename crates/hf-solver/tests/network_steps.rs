//! Integration tests stepping small networks through the solver.

use approx::assert_relative_eq;
use hf_components::{
    Block, BlockKind, BlockStamp, BloodVessel, FlowReferenceBc, Junction, ParamSet, Parameter,
    PressureReferenceBc, ResistanceBc, ResistiveVessel, WindkesselBc,
};
use hf_graph::NetworkBuilder;
use hf_solver::{
    GeneralizedAlpha, IntegratorConfig, Model, SolverError, State, StepOutcome, steady_initial,
};

fn run(model: &mut Model, state: &mut State, config: IntegratorConfig, steps: usize) {
    let mut ga = GeneralizedAlpha::new(config).unwrap();
    for _ in 0..steps {
        let outcome = ga.step(model, state).unwrap();
        assert!(outcome.is_converged(), "{outcome:?} at t = {}", state.t);
    }
}

fn single_vessel() -> Model {
    let mut b = NetworkBuilder::new();
    let n1 = b.add_node("in");
    let n2 = b.add_node("out");
    b.add_block("INFLOW", &[], &[n1]);
    b.add_block("vessel", &[n1], &[n2]);
    b.add_block("OUT", &[n2], &[]);
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(FlowReferenceBc::new("INFLOW", Parameter::constant(5.0)).unwrap()),
        Box::new(ResistiveVessel::with_resistance("vessel", 100.0).unwrap()),
        Box::new(PressureReferenceBc::new("OUT", Parameter::constant(0.0)).unwrap()),
    ];
    Model::new(b.build().unwrap(), blocks).unwrap()
}

#[test]
fn resistive_vessel_obeys_ohms_law() {
    let mut model = single_vessel();
    let mut state = State::zeros(model.size());
    run(&mut model, &mut state, IntegratorConfig::default(), 20);

    let p_in = state.y[model.dof_of("P_in").unwrap()];
    let q_out = state.y[model.dof_of("Q_out").unwrap()];
    assert_relative_eq!(p_in, 500.0, epsilon = 1e-6);
    assert_relative_eq!(q_out, 5.0, epsilon = 1e-6);
}

#[test]
fn steady_initial_is_exact_for_algebraic_networks() {
    let mut model = single_vessel();
    let mut state = State::zeros(model.size());
    let outcome = steady_initial(&mut model, &mut state, &IntegratorConfig::default()).unwrap();
    assert!(outcome.is_converged());
    assert_relative_eq!(state.y[0], 500.0, epsilon = 1e-9);
}

#[test]
fn junction_splits_flow_by_resistance() {
    let mut b = NetworkBuilder::new();
    let a = b.add_node("a");
    let n1 = b.add_node("b1");
    let n2 = b.add_node("b2");
    b.add_block("INFLOW", &[], &[a]);
    b.add_block("J", &[a], &[n1, n2]);
    b.add_block("OUT1", &[n1], &[]);
    b.add_block("OUT2", &[n2], &[]);
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(FlowReferenceBc::new("INFLOW", Parameter::constant(10.0)).unwrap()),
        Box::new(Junction::new("J").unwrap()),
        Box::new(
            ResistanceBc::new("OUT1", Parameter::constant(100.0), Parameter::constant(0.0))
                .unwrap(),
        ),
        Box::new(
            ResistanceBc::new("OUT2", Parameter::constant(200.0), Parameter::constant(0.0))
                .unwrap(),
        ),
    ];
    let mut model = Model::new(b.build().unwrap(), blocks).unwrap();
    let mut state = State::zeros(model.size());
    let config = IntegratorConfig::default();
    let mut ga = GeneralizedAlpha::new(config).unwrap();

    let (qa, q1, q2) = (
        model.dof_of("Q_a").unwrap(),
        model.dof_of("Q_b1").unwrap(),
        model.dof_of("Q_b2").unwrap(),
    );
    for _ in 0..30 {
        assert!(ga.step(&mut model, &mut state).unwrap().is_converged());
        let imbalance = state.y[qa] - state.y[q1] - state.y[q2];
        assert!(imbalance.abs() < config.atol, "imbalance {imbalance}");
    }
    assert_relative_eq!(state.y[q1], 20.0 / 3.0, epsilon = 1e-6);
    assert_relative_eq!(state.y[q2], 10.0 / 3.0, epsilon = 1e-6);
    assert_relative_eq!(state.y[q1] / state.y[q2], 2.0, epsilon = 1e-6);
}

#[test]
fn zero_resistance_short_is_singular() {
    let mut b = NetworkBuilder::new();
    let n1 = b.add_node("n1");
    let n2 = b.add_node("n2");
    b.add_block("P_HIGH", &[], &[n1]);
    b.add_block("short", &[n1], &[n2]);
    b.add_block("P_LOW", &[n2], &[]);
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(PressureReferenceBc::new("P_HIGH", Parameter::constant(10.0)).unwrap()),
        Box::new(ResistiveVessel::with_resistance("short", 0.0).unwrap()),
        Box::new(PressureReferenceBc::new("P_LOW", Parameter::constant(0.0)).unwrap()),
    ];
    let mut model = Model::new(b.build().unwrap(), blocks).unwrap();
    let mut state = State::zeros(model.size());
    let before = state.clone();
    let mut ga = GeneralizedAlpha::new(IntegratorConfig::default()).unwrap();

    let err = ga.step(&mut model, &mut state).unwrap_err();
    assert!(matches!(err, SolverError::Numerical { .. }), "{err}");
    assert_eq!(state, before);
}

#[test]
fn pattern_survives_reassembly() {
    let mut b = NetworkBuilder::new();
    let n1 = b.add_node("in");
    let n2 = b.add_node("out");
    b.add_block("INFLOW", &[], &[n1]);
    b.add_block("stenosis", &[n1], &[n2]);
    b.add_block("OUT", &[n2], &[]);
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(FlowReferenceBc::new("INFLOW", Parameter::constant(3.0)).unwrap()),
        Box::new(BloodVessel::rcl("stenosis", 10.0, 1e-3, 1e-2, 4.0).unwrap()),
        Box::new(WindkesselBc::rcr("OUT", 50.0, 1e-3, 500.0, 0.0).unwrap()),
    ];
    let mut model = Model::new(b.build().unwrap(), blocks).unwrap();
    let pattern = model.system().pattern().clone();

    let perturbed: Vec<f64> = (0..model.size()).map(|i| 1.0 + 0.37 * i as f64).collect();
    let rates = vec![0.5; model.size()];
    model.update_time(0.3).unwrap();
    model.update_solution(&perturbed, &rates);
    model.update_gradient(&perturbed, &rates);
    assert_eq!(model.system().pattern(), &pattern);
    assert_eq!(model.system().dropped_writes(), 0);

    let mut state = State::zeros(model.size());
    run(&mut model, &mut state, IntegratorConfig::default(), 5);
    assert_eq!(model.system().pattern(), &pattern);
}

#[test]
fn windkessel_charges_like_an_rc_circuit() {
    // Rp = 0, Rd = C = 1: Pc(t) = Q Rd (1 - exp(-t / (Rd C)))
    let mut b = NetworkBuilder::new();
    let n1 = b.add_node("in");
    b.add_block("INFLOW", &[], &[n1]);
    b.add_block("WK", &[n1], &[]);
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(FlowReferenceBc::new("INFLOW", Parameter::constant(1.0)).unwrap()),
        Box::new(WindkesselBc::rcr("WK", 0.0, 1.0, 1.0, 0.0).unwrap()),
    ];
    let mut model = Model::new(b.build().unwrap(), blocks).unwrap();
    let q = model.dof_of("Q_in").unwrap();
    let pc = model.dof_of("Pc:WK").unwrap();

    // consistent start: Q = 1, Pc = 0, dPc/dt = 1
    let mut state = State::zeros(model.size());
    state.y[q] = 1.0;
    state.ydot[pc] = 1.0;
    let config = IntegratorConfig {
        dt: 0.01,
        ..Default::default()
    };
    run(&mut model, &mut state, config, 100);

    assert_relative_eq!(state.t, 1.0, epsilon = 1e-9);
    assert_relative_eq!(state.y[pc], 1.0 - (-1.0f64).exp(), epsilon = 1e-3);
}

#[test]
fn windkessel_reaches_steady_pressure() {
    let mut b = NetworkBuilder::new();
    let n1 = b.add_node("in");
    b.add_block("INFLOW", &[], &[n1]);
    b.add_block("WK", &[n1], &[]);
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(FlowReferenceBc::new("INFLOW", Parameter::constant(2.0)).unwrap()),
        Box::new(WindkesselBc::rcr("WK", 100.0, 1e-4, 1000.0, 0.0).unwrap()),
    ];
    let mut model = Model::new(b.build().unwrap(), blocks).unwrap();
    let mut state = State::zeros(model.size());
    run(
        &mut model,
        &mut state,
        IntegratorConfig {
            dt: 0.01,
            ..Default::default()
        },
        200,
    );
    // P = (Rp + Rd) Q
    assert_relative_eq!(state.y[0], 2200.0, max_relative = 1e-6);
}

/// Writes one row too many.
#[derive(Debug)]
struct Overreaching {
    params: ParamSet,
}

impl Block for Overreaching {
    fn name(&self) -> &str {
        "vessel"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::ResistiveVessel
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        stamp.f(0, 0, 1.0);
        stamp.f(1, 1, 1.0);
        stamp.f(2, 0, 1.0);
    }
}

#[test]
fn malformed_block_is_rejected_at_construction() {
    let mut b = NetworkBuilder::new();
    let n1 = b.add_node("in");
    let n2 = b.add_node("out");
    b.add_block("INFLOW", &[], &[n1]);
    b.add_block("vessel", &[n1], &[n2]);
    b.add_block("OUT", &[n2], &[]);
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(FlowReferenceBc::new("INFLOW", Parameter::constant(5.0)).unwrap()),
        Box::new(Overreaching {
            params: ParamSet::new("vessel", &[], Vec::new()).unwrap(),
        }),
        Box::new(PressureReferenceBc::new("OUT", Parameter::constant(0.0)).unwrap()),
    ];
    let err = Model::new(b.build().unwrap(), blocks).unwrap_err();
    match err {
        SolverError::Configuration { what } => assert!(what.contains("outside"), "{what}"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn failed_step_leaves_state_untouched() {
    let mut b = NetworkBuilder::new();
    let n1 = b.add_node("in");
    let n2 = b.add_node("out");
    b.add_block("INFLOW", &[], &[n1]);
    b.add_block("stenosis", &[n1], &[n2]);
    b.add_block("OUT", &[n2], &[]);
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(FlowReferenceBc::new("INFLOW", Parameter::constant(50.0)).unwrap()),
        Box::new(BloodVessel::rcl("stenosis", 1.0, 0.0, 0.0, 100.0).unwrap()),
        Box::new(PressureReferenceBc::new("OUT", Parameter::constant(0.0)).unwrap()),
    ];
    let mut model = Model::new(b.build().unwrap(), blocks).unwrap();
    let mut state = State::zeros(model.size());
    let before = state.clone();
    let mut ga = GeneralizedAlpha::new(IntegratorConfig {
        max_iter: 1,
        atol: 1e-12,
        ..Default::default()
    })
    .unwrap();
    let outcome = ga.step(&mut model, &mut state).unwrap();
    assert!(matches!(outcome, StepOutcome::Failed { .. }));
    assert_eq!(state, before);
}
