//! Model description schema.
//!
//! Parameter names use snake_case. A parameter is either a plain number or a
//! time series `{ t: [...], values: [...], periodic: bool }`.

use std::collections::BTreeMap;

use hf_core::UnitSystem;
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub simulation: SimulationDef,
    #[serde(default)]
    pub units: UnitSystem,
    pub nodes: Vec<String>,
    pub blocks: Vec<BlockDef>,
    /// Initial values keyed by solver variable name (`P_<node>`,
    /// `<var>:<block>`); unlisted variables start at zero.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub initial_condition: BTreeMap<String, f64>,
}

fn default_version() -> u32 {
    LATEST_VERSION
}

/// Time stepping and recording settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDef {
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default = "default_rho")]
    pub rho: f64,
    #[serde(default = "default_atol")]
    pub atol: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Solve for a steady state before the first step.
    #[serde(default)]
    pub steady_initial: bool,
    #[serde(default = "default_t_end")]
    pub t_end: f64,
    /// Record every n-th converged step.
    #[serde(default = "default_record_every")]
    pub record_every: usize,
}

fn default_dt() -> f64 {
    1e-3
}

fn default_rho() -> f64 {
    0.1
}

fn default_atol() -> f64 {
    1e-8
}

fn default_max_iter() -> usize {
    30
}

fn default_damping() -> f64 {
    1.0
}

fn default_t_end() -> f64 {
    1.0
}

fn default_record_every() -> usize {
    1
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            rho: default_rho(),
            atol: default_atol(),
            max_iter: default_max_iter(),
            damping: default_damping(),
            steady_initial: false,
            t_end: default_t_end(),
            record_every: default_record_every(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    pub name: String,
    pub kind: BlockKindDef,
    #[serde(default)]
    pub inlets: Vec<String>,
    #[serde(default)]
    pub outlets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterDef {
    Constant(f64),
    Series {
        t: Vec<f64>,
        values: Vec<f64>,
        #[serde(default)]
        periodic: bool,
    },
}

impl Default for ParameterDef {
    fn default() -> Self {
        ParameterDef::Constant(0.0)
    }
}

impl From<f64> for ParameterDef {
    fn from(value: f64) -> Self {
        ParameterDef::Constant(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoronarySideDef {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActivationDef {
    HalfCosine {
        period: f64,
        t_active: f64,
        t_twitch: f64,
    },
    PiecewiseCosine {
        period: f64,
        contract_start: f64,
        relax_start: f64,
        contract_duration: f64,
        relax_duration: f64,
    },
    TwoHill {
        period: f64,
        t_shift: f64,
        tau_1: f64,
        tau_2: f64,
        m1: f64,
        m2: f64,
    },
}

/// Elastances, rest volumes and valve/pulmonary coefficients of the
/// closed-loop heart, in block parameter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartParamsDef {
    pub e_ra_act: f64,
    pub e_ra_pass: f64,
    pub v0_ra: f64,
    pub e_rv_act: f64,
    pub e_rv_pass: f64,
    pub v0_rv: f64,
    pub e_la_act: f64,
    pub e_la_pass: f64,
    pub v0_la: f64,
    pub e_lv_act: f64,
    pub e_lv_pass: f64,
    pub v0_lv: f64,
    pub r_tv: f64,
    #[serde(default)]
    pub l_tv: f64,
    pub r_pv: f64,
    #[serde(default)]
    pub l_pv: f64,
    pub r_mv: f64,
    #[serde(default)]
    pub l_mv: f64,
    pub r_av: f64,
    pub c_pul: f64,
    pub r_pul: f64,
}

impl HeartParamsDef {
    pub fn values(&self) -> [f64; 21] {
        [
            self.e_ra_act,
            self.e_ra_pass,
            self.v0_ra,
            self.e_rv_act,
            self.e_rv_pass,
            self.v0_rv,
            self.e_la_act,
            self.e_la_pass,
            self.v0_la,
            self.e_lv_act,
            self.e_lv_pass,
            self.v0_lv,
            self.r_tv,
            self.l_tv,
            self.r_pv,
            self.l_pv,
            self.r_mv,
            self.l_mv,
            self.r_av,
            self.c_pul,
            self.r_pul,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockKindDef {
    ResistiveVessel {
        resistance: ParameterDef,
    },
    BloodVessel {
        resistance: ParameterDef,
        #[serde(default)]
        capacitance: ParameterDef,
        #[serde(default)]
        inductance: ParameterDef,
        #[serde(default)]
        stenosis_coefficient: ParameterDef,
    },
    BloodVesselCrl {
        resistance: ParameterDef,
        #[serde(default)]
        capacitance: ParameterDef,
        #[serde(default)]
        inductance: ParameterDef,
        #[serde(default)]
        stenosis_coefficient: ParameterDef,
    },
    Junction,
    FlowReference {
        flow: ParameterDef,
    },
    PressureReference {
        pressure: ParameterDef,
    },
    Resistance {
        resistance: ParameterDef,
        #[serde(default)]
        distal_pressure: ParameterDef,
    },
    Windkessel {
        proximal_resistance: ParameterDef,
        capacitance: ParameterDef,
        distal_resistance: ParameterDef,
        #[serde(default)]
        distal_pressure: ParameterDef,
    },
    OpenLoopCoronary {
        arterial_resistance: ParameterDef,
        microvascular_resistance: ParameterDef,
        venous_resistance: ParameterDef,
        arterial_compliance: ParameterDef,
        intramyocardial_compliance: ParameterDef,
        #[serde(default)]
        intramyocardial_pressure: ParameterDef,
        #[serde(default)]
        venous_pressure: ParameterDef,
    },
    ClosedLoopCoronary {
        side: CoronarySideDef,
        arterial_resistance: ParameterDef,
        microvascular_resistance: ParameterDef,
        venous_resistance: ParameterDef,
        arterial_compliance: ParameterDef,
        intramyocardial_compliance: ParameterDef,
        #[serde(default = "default_im_scale")]
        im_scale: ParameterDef,
    },
    ClosedLoopRcr {
        proximal_resistance: ParameterDef,
        capacitance: ParameterDef,
        distal_resistance: ParameterDef,
    },
    ClosedLoopHeartPulmonary {
        parameters: HeartParamsDef,
        atria: ActivationDef,
        ventricles: ActivationDef,
    },
    LinearElastanceChamber {
        emax: ParameterDef,
        epass: ParameterDef,
        vrest: ParameterDef,
        activation: ActivationDef,
    },
}

fn default_im_scale() -> ParameterDef {
    ParameterDef::Constant(1.0)
}

impl BlockKindDef {
    /// Parameters in block declaration order, paired with their field names.
    pub fn parameters(&self) -> Vec<(&'static str, &ParameterDef)> {
        match self {
            BlockKindDef::ResistiveVessel { resistance } => vec![("resistance", resistance)],
            BlockKindDef::BloodVessel {
                resistance,
                capacitance,
                inductance,
                stenosis_coefficient,
            }
            | BlockKindDef::BloodVesselCrl {
                resistance,
                capacitance,
                inductance,
                stenosis_coefficient,
            } => vec![
                ("resistance", resistance),
                ("capacitance", capacitance),
                ("inductance", inductance),
                ("stenosis_coefficient", stenosis_coefficient),
            ],
            BlockKindDef::Junction => Vec::new(),
            BlockKindDef::FlowReference { flow } => vec![("flow", flow)],
            BlockKindDef::PressureReference { pressure } => vec![("pressure", pressure)],
            BlockKindDef::Resistance {
                resistance,
                distal_pressure,
            } => vec![("resistance", resistance), ("distal_pressure", distal_pressure)],
            BlockKindDef::Windkessel {
                proximal_resistance,
                capacitance,
                distal_resistance,
                distal_pressure,
            } => vec![
                ("proximal_resistance", proximal_resistance),
                ("capacitance", capacitance),
                ("distal_resistance", distal_resistance),
                ("distal_pressure", distal_pressure),
            ],
            BlockKindDef::OpenLoopCoronary {
                arterial_resistance,
                microvascular_resistance,
                venous_resistance,
                arterial_compliance,
                intramyocardial_compliance,
                intramyocardial_pressure,
                venous_pressure,
            } => vec![
                ("arterial_resistance", arterial_resistance),
                ("microvascular_resistance", microvascular_resistance),
                ("venous_resistance", venous_resistance),
                ("arterial_compliance", arterial_compliance),
                ("intramyocardial_compliance", intramyocardial_compliance),
                ("intramyocardial_pressure", intramyocardial_pressure),
                ("venous_pressure", venous_pressure),
            ],
            BlockKindDef::ClosedLoopCoronary {
                arterial_resistance,
                microvascular_resistance,
                venous_resistance,
                arterial_compliance,
                intramyocardial_compliance,
                im_scale,
                ..
            } => vec![
                ("arterial_resistance", arterial_resistance),
                ("microvascular_resistance", microvascular_resistance),
                ("venous_resistance", venous_resistance),
                ("arterial_compliance", arterial_compliance),
                ("intramyocardial_compliance", intramyocardial_compliance),
                ("im_scale", im_scale),
            ],
            BlockKindDef::ClosedLoopRcr {
                proximal_resistance,
                capacitance,
                distal_resistance,
            } => vec![
                ("proximal_resistance", proximal_resistance),
                ("capacitance", capacitance),
                ("distal_resistance", distal_resistance),
            ],
            BlockKindDef::ClosedLoopHeartPulmonary { .. } => Vec::new(),
            BlockKindDef::LinearElastanceChamber {
                emax, epass, vrest, ..
            } => vec![("emax", emax), ("epass", epass), ("vrest", vrest)],
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKindDef::ResistiveVessel { .. } => "ResistiveVessel",
            BlockKindDef::BloodVessel { .. } => "BloodVessel",
            BlockKindDef::BloodVesselCrl { .. } => "BloodVesselCrl",
            BlockKindDef::Junction => "Junction",
            BlockKindDef::FlowReference { .. } => "FlowReference",
            BlockKindDef::PressureReference { .. } => "PressureReference",
            BlockKindDef::Resistance { .. } => "Resistance",
            BlockKindDef::Windkessel { .. } => "Windkessel",
            BlockKindDef::OpenLoopCoronary { .. } => "OpenLoopCoronary",
            BlockKindDef::ClosedLoopCoronary { .. } => "ClosedLoopCoronary",
            BlockKindDef::ClosedLoopRcr { .. } => "ClosedLoopRcr",
            BlockKindDef::ClosedLoopHeartPulmonary { .. } => "ClosedLoopHeartPulmonary",
            BlockKindDef::LinearElastanceChamber { .. } => "LinearElastanceChamber",
        }
    }
}
