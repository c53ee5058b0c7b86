//! Vessel segments.
//!
//! Local variables for all vessels: `0 P_in, 1 Q_in, 2 P_out, 3 Q_out`.

use crate::common::{sign, ParamSet};
use crate::error::ComponentResult;
use crate::parameter::Parameter;
use crate::stamp::{BlockStamp, LocalState};
use crate::traits::{Block, BlockKind, ParamSpec};

const P_IN: usize = 0;
const Q_IN: usize = 1;
const P_OUT: usize = 2;
const Q_OUT: usize = 3;

/// Pure resistance: `P_in - P_out - R Q_in = 0`, `Q_in - Q_out = 0`.
#[derive(Debug, Clone)]
pub struct ResistiveVessel {
    name: String,
    params: ParamSet,
}

impl ResistiveVessel {
    pub const PARAMS: &'static [ParamSpec] = &[ParamSpec::constant("R")];

    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, params)?;
        Ok(Self { name, params })
    }

    pub fn with_resistance(name: impl Into<String>, r: f64) -> ComponentResult<Self> {
        Self::new(name, vec![Parameter::constant(r)])
    }
}

impl Block for ResistiveVessel {
    fn name(&self) -> &str {
        &self.name
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
        let r = self.params.value(0);
        stamp.f(0, P_IN, 1.0);
        stamp.f(0, Q_IN, -r);
        stamp.f(0, P_OUT, -1.0);
        stamp.f(1, Q_IN, 1.0);
        stamp.f(1, Q_OUT, -1.0);
    }
}

/// RCL segment with the capacitor downstream of the resistor and an optional
/// quadratic stenosis loss `S |Q_in| Q_in`.
///
/// ```text
/// P_in - P_out - (R + S|Q_in|) Q_in - L dQ_out/dt = 0
/// Q_in - Q_out - C dP_in/dt + C (R + 2 S|Q_in|) dQ_in/dt = 0
/// ```
#[derive(Debug, Clone)]
pub struct BloodVessel {
    name: String,
    params: ParamSet,
}

impl BloodVessel {
    pub const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::constant("R"),
        ParamSpec::constant("C"),
        ParamSpec::constant("L"),
        ParamSpec::constant("stenosis_coefficient"),
    ];

    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, params)?;
        Ok(Self { name, params })
    }

    pub fn rcl(name: impl Into<String>, r: f64, c: f64, l: f64, s: f64) -> ComponentResult<Self> {
        Self::new(name, [r, c, l, s].into_iter().map(Parameter::constant).collect())
    }
}

impl Block for BloodVessel {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::BloodVessel
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        let (r, c, l) = (self.params.value(0), self.params.value(1), self.params.value(2));
        stamp.e(0, Q_OUT, -l);
        stamp.e(1, P_IN, -c);
        stamp.e(1, Q_IN, c * r);
        stamp.f(0, P_IN, 1.0);
        stamp.f(0, Q_IN, -r);
        stamp.f(0, P_OUT, -1.0);
        stamp.f(1, Q_IN, 1.0);
        stamp.f(1, Q_OUT, -1.0);
    }

    fn update_solution(&mut self, stamp: &mut BlockStamp<'_>, state: &LocalState<'_>) {
        let (c, s) = (self.params.value(1), self.params.value(3));
        let q_abs = state.y(Q_IN).abs();
        stamp.f(0, Q_IN, -s * q_abs);
        stamp.e(1, Q_IN, 2.0 * c * s * q_abs);
    }

    fn update_gradient(&mut self, stamp: &mut BlockStamp<'_>, state: &LocalState<'_>) {
        let (c, s) = (self.params.value(1), self.params.value(3));
        let q_in = state.y(Q_IN);
        stamp.dc_dy(0, Q_IN, -s * q_in.abs());
        stamp.dc_dy(1, Q_IN, 2.0 * c * s * sign(q_in) * state.ydot(Q_IN));
    }
}

/// RCL segment with the capacitor at the inlet.
///
/// ```text
/// P_in - P_out - (R + S|Q_out|) Q_out - L dQ_out/dt = 0
/// Q_in - Q_out - C dP_in/dt = 0
/// ```
#[derive(Debug, Clone)]
pub struct BloodVesselCrl {
    name: String,
    params: ParamSet,
}

impl BloodVesselCrl {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), BloodVessel::PARAMS, params)?;
        Ok(Self { name, params })
    }

    pub fn crl(name: impl Into<String>, r: f64, c: f64, l: f64, s: f64) -> ComponentResult<Self> {
        Self::new(name, [r, c, l, s].into_iter().map(Parameter::constant).collect())
    }
}

impl Block for BloodVesselCrl {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::BloodVesselCrl
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        let (r, c, l) = (self.params.value(0), self.params.value(1), self.params.value(2));
        stamp.e(0, Q_OUT, -l);
        stamp.e(1, P_IN, -c);
        stamp.f(0, P_IN, 1.0);
        stamp.f(0, P_OUT, -1.0);
        stamp.f(0, Q_OUT, -r);
        stamp.f(1, Q_IN, 1.0);
        stamp.f(1, Q_OUT, -1.0);
    }

    fn update_solution(&mut self, stamp: &mut BlockStamp<'_>, state: &LocalState<'_>) {
        let s = self.params.value(3);
        stamp.f(0, Q_OUT, -s * state.y(Q_OUT).abs());
    }

    fn update_gradient(&mut self, stamp: &mut BlockStamp<'_>, state: &LocalState<'_>) {
        let s = self.params.value(3);
        stamp.dc_dy(0, Q_OUT, -s * state.y(Q_OUT).abs());
    }
}
