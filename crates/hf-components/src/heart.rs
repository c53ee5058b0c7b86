//! Four-chamber heart with pulmonary circulation for closed-loop models.
//!
//! The block sits between the venous return (inlet, right atrium) and the
//! aorta (outlet). Chamber pressures follow a linear time-varying elastance
//! `P = (E_pass + E_act A(t)) (V - V0)`; atria and ventricles each have their
//! own activation. Valves are ideal diodes with an explicit open/closed state
//! chosen from the current Newton iterate.

use crate::activation::Activation;
use crate::common::ParamSet;
use crate::error::ComponentResult;
use crate::parameter::Parameter;
use crate::stamp::{BlockStamp, LocalState};
use crate::traits::{Block, BlockKind, ParamSpec};

// Local variables.
const P_IN: usize = 0;
const Q_IN: usize = 1;
const P_OUT: usize = 2;
const Q_OUT: usize = 3;
const V_RA: usize = 4;
const Q_RA: usize = 5;
const V_RV: usize = 6;
const P_RV: usize = 7;
const Q_RV: usize = 8;
const P_PUL: usize = 9;
const V_LA: usize = 10;
const Q_LA: usize = 11;
const V_LV: usize = 12;
const P_LV: usize = 13;

// Parameter slots.
const E_RA_ACT: usize = 0;
const E_RA_PASS: usize = 1;
const V0_RA: usize = 2;
const E_RV_ACT: usize = 3;
const E_RV_PASS: usize = 4;
const V0_RV: usize = 5;
const E_LA_ACT: usize = 6;
const E_LA_PASS: usize = 7;
const V0_LA: usize = 8;
const E_LV_ACT: usize = 9;
const E_LV_PASS: usize = 10;
const V0_LV: usize = 11;
const R_TV: usize = 12;
const L_TV: usize = 13;
const R_PV: usize = 14;
const L_PV: usize = 15;
const R_MV: usize = 16;
const L_MV: usize = 17;
const R_AV: usize = 18;
const C_PUL: usize = 19;
const R_PUL: usize = 20;

/// Ventricular activation above which the heart is considered in systole.
const SYSTOLE_THRESHOLD: f64 = 1e-3;

/// Forward flow that keeps a valve open. A closed valve pins its flow to
/// zero only up to roundoff.
const OPEN_FLOW: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveState {
    Open,
    Closed,
}

impl ValveState {
    fn from_iterate(dp: f64, q: f64) -> Self {
        if dp > 0.0 || q > OPEN_FLOW {
            ValveState::Open
        } else {
            ValveState::Closed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValveState::Open => "open",
            ValveState::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardiacPhase {
    Systole,
    Diastole,
}

impl CardiacPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            CardiacPhase::Systole => "systole",
            CardiacPhase::Diastole => "diastole",
        }
    }
}

/// Activation functions driving the chambers.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartActivation {
    pub atria: Activation,
    pub ventricles: Activation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Elastances {
    ra: f64,
    rv: f64,
    la: f64,
    lv: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Valves {
    pub tricuspid: ValveState,
    pub pulmonary: ValveState,
    pub mitral: ValveState,
    pub aortic: ValveState,
}

#[derive(Debug, Clone)]
pub struct ClosedLoopHeartPulmonary {
    name: String,
    params: ParamSet,
    activation: HeartActivation,
    elastance: Elastances,
    valves: Valves,
    phase: CardiacPhase,
}

impl ClosedLoopHeartPulmonary {
    pub const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::constant("E_ra_act"),
        ParamSpec::constant("E_ra_pass"),
        ParamSpec::constant("V0_ra"),
        ParamSpec::constant("E_rv_act"),
        ParamSpec::constant("E_rv_pass"),
        ParamSpec::constant("V0_rv"),
        ParamSpec::constant("E_la_act"),
        ParamSpec::constant("E_la_pass"),
        ParamSpec::constant("V0_la"),
        ParamSpec::constant("E_lv_act"),
        ParamSpec::constant("E_lv_pass"),
        ParamSpec::constant("V0_lv"),
        ParamSpec::constant("R_tv"),
        ParamSpec::constant("L_tv"),
        ParamSpec::constant("R_pv"),
        ParamSpec::constant("L_pv"),
        ParamSpec::constant("R_mv"),
        ParamSpec::constant("L_mv"),
        ParamSpec::constant("R_av"),
        ParamSpec::constant("C_pul"),
        ParamSpec::constant("R_pul"),
    ];

    const INTERNALS: &'static [&'static str] = &[
        "V_ra", "Q_ra", "V_rv", "P_rv", "Q_rv", "P_pul", "V_la", "Q_la", "V_lv", "P_lv",
    ];

    pub fn new(
        name: impl Into<String>,
        params: Vec<Parameter>,
        activation: HeartActivation,
    ) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, params)?;
        let mut heart = Self {
            name,
            params,
            activation,
            elastance: Elastances {
                ra: 0.0,
                rv: 0.0,
                la: 0.0,
                lv: 0.0,
            },
            valves: Valves {
                tricuspid: ValveState::Closed,
                pulmonary: ValveState::Closed,
                mitral: ValveState::Closed,
                aortic: ValveState::Closed,
            },
            phase: CardiacPhase::Diastole,
        };
        heart.elastance = heart.elastances_at(0.0);
        Ok(heart)
    }

    pub fn valves(&self) -> Valves {
        self.valves
    }

    pub fn phase(&self) -> CardiacPhase {
        self.phase
    }

    fn elastances_at(&self, t: f64) -> Elastances {
        let p = &self.params;
        let a = self.activation.atria.value(t);
        let v = self.activation.ventricles.value(t);
        Elastances {
            ra: p.value(E_RA_PASS) + p.value(E_RA_ACT) * a,
            rv: p.value(E_RV_PASS) + p.value(E_RV_ACT) * v,
            la: p.value(E_LA_PASS) + p.value(E_LA_ACT) * a,
            lv: p.value(E_LV_PASS) + p.value(E_LV_ACT) * v,
        }
    }

    fn p_la(&self, state: &LocalState<'_>) -> f64 {
        self.elastance.la * (state.y(V_LA) - self.params.value(V0_LA))
    }
}

// Closed valve: q = 0. Open valve: pressure terms are written by the caller.
fn stamp_valve(stamp: &mut BlockStamp<'_>, eq: usize, valve: ValveState, q: usize, r: f64, l: f64) {
    match valve {
        ValveState::Closed => stamp.f(eq, q, 1.0),
        ValveState::Open => {
            stamp.f(eq, q, -r);
            if l != 0.0 {
                stamp.e(eq, q, -l);
            }
        }
    }
}

impl Block for ClosedLoopHeartPulmonary {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::ClosedLoopHeartPulmonary
    }

    fn internal_variables(&self) -> &[&'static str] {
        Self::INTERNALS
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        let r_pul = self.params.value(R_PUL);

        // right atrium
        stamp.f(0, P_IN, 1.0);
        stamp.f(1, Q_IN, 1.0);
        stamp.f(1, Q_RA, -1.0);
        stamp.e(1, V_RA, -1.0);
        // right ventricle
        stamp.f(3, Q_RA, 1.0);
        stamp.f(3, Q_RV, -1.0);
        stamp.e(3, V_RV, -1.0);
        stamp.f(4, P_RV, 1.0);
        // pulmonary capacitor and left atrium
        stamp.e(6, P_PUL, self.params.value(C_PUL));
        stamp.f(6, Q_RV, -1.0);
        stamp.f(6, P_PUL, 1.0 / r_pul);
        stamp.f(7, P_PUL, 1.0 / r_pul);
        stamp.f(7, Q_LA, -1.0);
        stamp.e(7, V_LA, -1.0);
        // left ventricle
        stamp.f(9, Q_LA, 1.0);
        stamp.f(9, Q_OUT, -1.0);
        stamp.e(9, V_LV, -1.0);
        stamp.f(10, P_LV, 1.0);
    }

    fn update_time(&mut self, stamp: &mut BlockStamp<'_>, t: f64) {
        self.elastance = self.elastances_at(t);
        self.phase = if self.activation.ventricles.value(t) > SYSTOLE_THRESHOLD {
            CardiacPhase::Systole
        } else {
            CardiacPhase::Diastole
        };

        let p = &self.params;
        let e = self.elastance;
        let r_pul = p.value(R_PUL);

        stamp.f(0, V_RA, -e.ra);
        stamp.c(0, e.ra * p.value(V0_RA));
        stamp.f(4, V_RV, -e.rv);
        stamp.c(4, e.rv * p.value(V0_RV));
        stamp.f(6, V_LA, -e.la / r_pul);
        stamp.c(6, e.la * p.value(V0_LA) / r_pul);
        stamp.f(7, V_LA, -e.la / r_pul);
        stamp.c(7, e.la * p.value(V0_LA) / r_pul);
        stamp.f(10, V_LV, -e.lv);
        stamp.c(10, e.lv * p.value(V0_LV));
    }

    fn update_solution(&mut self, stamp: &mut BlockStamp<'_>, state: &LocalState<'_>) {
        let p_la = self.p_la(state);
        self.valves = Valves {
            tricuspid: ValveState::from_iterate(state.y(P_IN) - state.y(P_RV), state.y(Q_RA)),
            pulmonary: ValveState::from_iterate(state.y(P_RV) - state.y(P_PUL), state.y(Q_RV)),
            mitral: ValveState::from_iterate(p_la - state.y(P_LV), state.y(Q_LA)),
            aortic: ValveState::from_iterate(state.y(P_LV) - state.y(P_OUT), state.y(Q_OUT)),
        };
        let p = &self.params;
        let v = self.valves;

        stamp_valve(stamp, 2, v.tricuspid, Q_RA, p.value(R_TV), p.value(L_TV));
        if v.tricuspid == ValveState::Open {
            stamp.f(2, P_IN, 1.0);
            stamp.f(2, P_RV, -1.0);
        }

        stamp_valve(stamp, 5, v.pulmonary, Q_RV, p.value(R_PV), p.value(L_PV));
        if v.pulmonary == ValveState::Open {
            stamp.f(5, P_RV, 1.0);
            stamp.f(5, P_PUL, -1.0);
        }

        stamp_valve(stamp, 8, v.mitral, Q_LA, p.value(R_MV), p.value(L_MV));
        if v.mitral == ValveState::Open {
            let e_la = self.elastance.la;
            stamp.f(8, V_LA, e_la);
            stamp.c(8, -e_la * p.value(V0_LA));
            stamp.f(8, P_LV, -1.0);
        }

        stamp_valve(stamp, 11, v.aortic, Q_OUT, p.value(R_AV), 0.0);
        if v.aortic == ValveState::Open {
            stamp.f(11, P_LV, 1.0);
            stamp.f(11, P_OUT, -1.0);
        }
    }

    fn discrete_state(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("tricuspid_valve", self.valves.tricuspid.as_str()),
            ("pulmonary_valve", self.valves.pulmonary.as_str()),
            ("mitral_valve", self.valves.mitral.as_str()),
            ("aortic_valve", self.valves.aortic.as_str()),
            ("phase", self.phase.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stamp::{BlockDofs, DenseAssembly};

    fn heart() -> ClosedLoopHeartPulmonary {
        let values = [
            0.1, 0.2, 5.0, // ra
            0.5, 0.05, 10.0, // rv
            0.1, 0.2, 5.0, // la
            2.5, 0.05, 10.0, // lv
            0.01, 0.0, 0.01, 0.0, 0.01, 0.0, 0.01, // valves
            5.0, 0.1, // pulmonary
        ];
        let activation = HeartActivation {
            atria: Activation::half_cosine(1.0, 0.0, 0.2).unwrap(),
            ventricles: Activation::half_cosine(1.0, 0.2, 0.5).unwrap(),
        };
        ClosedLoopHeartPulmonary::new(
            "heart",
            values.into_iter().map(Parameter::constant).collect(),
            activation,
        )
        .unwrap()
    }

    fn dofs() -> BlockDofs {
        BlockDofs {
            vars: (0..14).collect(),
            eqs: (0..12).collect(),
            inlets: 1,
            outlets: 1,
            internals: 10,
        }
    }

    #[test]
    fn valves_follow_pressure_gradients() {
        let mut h = heart();
        let d = dofs();
        let mut sink = DenseAssembly::new(14);
        let mut y = [0.0; 14];
        y[P_LV] = 120.0;
        y[P_OUT] = 80.0;
        y[P_IN] = 5.0;
        y[P_RV] = 20.0;
        let ydot = [0.0; 14];
        let state = LocalState::new(&d, &y, &ydot);
        h.update_solution(&mut BlockStamp::new(&mut sink, &d), &state);
        assert_eq!(h.valves().aortic, ValveState::Open);
        assert_eq!(h.valves().tricuspid, ValveState::Closed);
        // closed valve pins its flow
        assert_eq!(sink.f_at(2, Q_RA), 1.0);
        assert_eq!(sink.f_at(11, Q_OUT), -0.01);
    }

    #[test]
    fn phase_tracks_ventricular_activation() {
        let mut h = heart();
        let d = dofs();
        let mut sink = DenseAssembly::new(14);
        h.update_time(&mut BlockStamp::new(&mut sink, &d), 0.4);
        assert_eq!(h.phase(), CardiacPhase::Systole);
        h.update_time(&mut BlockStamp::new(&mut sink, &d), 0.9);
        assert_eq!(h.phase(), CardiacPhase::Diastole);
        let states = h.discrete_state();
        assert!(states.contains(&("phase", "diastole")));
    }

    #[test]
    fn every_equation_is_written() {
        let mut h = heart();
        let d = dofs();
        let mut sink = DenseAssembly::new(14);
        let mut audit = crate::stamp::StampAudit::new(12);
        let y = [1.0; 14];
        let ydot = [0.0; 14];
        let state = LocalState::new(&d, &y, &ydot);
        {
            let mut stamp = BlockStamp::audited(&mut sink, &d, &mut audit);
            h.update_constant(&mut stamp);
            h.update_time(&mut stamp, 0.0);
            h.update_solution(&mut stamp, &state);
        }
        assert!(audit.missing_rows().is_empty());
        assert!(audit.violation.is_none());
    }
}
