//! Core traits for block models.

use std::fmt;

use crate::common::ParamSet;
use crate::error::ComponentResult;
use crate::parameter::Parameter;
use crate::stamp::{BlockStamp, LocalState};

/// The closed set of block variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    ResistiveVessel,
    BloodVessel,
    BloodVesselCrl,
    Junction,
    FlowReference,
    PressureReference,
    Resistance,
    Windkessel,
    OpenLoopCoronary,
    ClosedLoopCoronary,
    ClosedLoopRcr,
    ClosedLoopHeartPulmonary,
    LinearElastanceChamber,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::ResistiveVessel => "resistive_vessel",
            BlockKind::BloodVessel => "blood_vessel",
            BlockKind::BloodVesselCrl => "blood_vessel_crl",
            BlockKind::Junction => "junction",
            BlockKind::FlowReference => "flow_reference",
            BlockKind::PressureReference => "pressure_reference",
            BlockKind::Resistance => "resistance",
            BlockKind::Windkessel => "windkessel",
            BlockKind::OpenLoopCoronary => "open_loop_coronary",
            BlockKind::ClosedLoopCoronary => "closed_loop_coronary",
            BlockKind::ClosedLoopRcr => "closed_loop_rcr",
            BlockKind::ClosedLoopHeartPulmonary => "closed_loop_heart_pulmonary",
            BlockKind::LinearElastanceChamber => "linear_elastance_chamber",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared parameter slot of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Whether a time series is accepted for this slot.
    pub time_varying: bool,
}

impl ParamSpec {
    pub const fn constant(name: &'static str) -> Self {
        Self {
            name,
            time_varying: false,
        }
    }

    pub const fn varying(name: &'static str) -> Self {
        Self {
            name,
            time_varying: true,
        }
    }
}

/// A variable owned by another block that this block reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coupling {
    /// Kind of the block owning the variable; exactly one such block must exist.
    pub kind: BlockKind,
    /// Internal variable name on that block.
    pub variable: &'static str,
}

/// A lumped element contributing equations to the global system.
///
/// Each node-end and each internal variable contributes one equation, so a
/// block owns `inlets + outlets + internal_variables().len()` rows.
///
/// All `update_*` hooks default to no-ops. Values written by
/// `update_constant` persist until parameters change; `update_time` is
/// re-run once per step and `update_solution`/`update_gradient` once per
/// Newton iteration.
pub trait Block: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn kind(&self) -> BlockKind;

    /// Whether the block can sit between this many inlet and outlet nodes.
    fn accepts_ports(&self, inlets: usize, outlets: usize) -> bool {
        inlets == 1 && outlets == 1
    }

    fn internal_variables(&self) -> &[&'static str] {
        &[]
    }

    fn coupled_variables(&self) -> Vec<Coupling> {
        Vec::new()
    }

    fn params(&self) -> &ParamSet;

    fn params_mut(&mut self) -> &mut ParamSet;

    /// Parameters in declared order.
    fn parameters(&self) -> &[Parameter] {
        self.params().values()
    }

    /// Replace all parameters in declared order.
    fn set_parameters(&mut self, values: Vec<Parameter>) -> ComponentResult<()> {
        self.params_mut().replace(values)
    }

    fn update_constant(&mut self, _stamp: &mut BlockStamp<'_>) {}

    fn update_time(&mut self, _stamp: &mut BlockStamp<'_>, _t: f64) {}

    fn update_solution(&mut self, _stamp: &mut BlockStamp<'_>, _state: &LocalState<'_>) {}

    fn update_gradient(&mut self, _stamp: &mut BlockStamp<'_>, _state: &LocalState<'_>) {}

    /// Named discrete states (valve positions, cardiac phase) for reporting.
    fn discrete_state(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }
}
