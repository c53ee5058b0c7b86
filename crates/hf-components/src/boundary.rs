//! Single-node boundary conditions.
//!
//! Local variables: `0 P, 1 Q` at the attached node, then internals.
//! Reference conditions may sit on either end of the network; the others
//! terminate an outlet.

use crate::common::ParamSet;
use crate::error::ComponentResult;
use crate::parameter::Parameter;
use crate::stamp::BlockStamp;
use crate::traits::{Block, BlockKind, ParamSpec};

const P: usize = 0;
const Q: usize = 1;

macro_rules! param_access {
    () => {
        fn params(&self) -> &ParamSet {
            &self.params
        }

        fn params_mut(&mut self) -> &mut ParamSet {
            &mut self.params
        }
    };
}

fn single_node(inlets: usize, outlets: usize) -> bool {
    inlets + outlets == 1
}

/// Prescribed flow: `Q - Q(t) = 0`.
#[derive(Debug, Clone)]
pub struct FlowReferenceBc {
    name: String,
    params: ParamSet,
}

impl FlowReferenceBc {
    pub const PARAMS: &'static [ParamSpec] = &[ParamSpec::varying("Q")];

    pub fn new(name: impl Into<String>, q: Parameter) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, vec![q])?;
        Ok(Self { name, params })
    }
}

impl Block for FlowReferenceBc {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::FlowReference
    }

    fn accepts_ports(&self, inlets: usize, outlets: usize) -> bool {
        single_node(inlets, outlets)
    }

    param_access!();

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        stamp.f(0, Q, 1.0);
    }

    fn update_time(&mut self, stamp: &mut BlockStamp<'_>, t: f64) {
        stamp.c(0, -self.params.at(0, t));
    }
}

/// Prescribed pressure: `P - P(t) = 0`.
#[derive(Debug, Clone)]
pub struct PressureReferenceBc {
    name: String,
    params: ParamSet,
}

impl PressureReferenceBc {
    pub const PARAMS: &'static [ParamSpec] = &[ParamSpec::varying("P")];

    pub fn new(name: impl Into<String>, p: Parameter) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, vec![p])?;
        Ok(Self { name, params })
    }
}

impl Block for PressureReferenceBc {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::PressureReference
    }

    fn accepts_ports(&self, inlets: usize, outlets: usize) -> bool {
        single_node(inlets, outlets)
    }

    param_access!();

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        stamp.f(0, P, 1.0);
    }

    fn update_time(&mut self, stamp: &mut BlockStamp<'_>, t: f64) {
        stamp.c(0, -self.params.at(0, t));
    }
}

/// Terminal resistance to a distal pressure: `P - Pd - R Q = 0`.
#[derive(Debug, Clone)]
pub struct ResistanceBc {
    name: String,
    params: ParamSet,
}

impl ResistanceBc {
    pub const PARAMS: &'static [ParamSpec] = &[ParamSpec::varying("R"), ParamSpec::varying("Pd")];

    pub fn new(name: impl Into<String>, r: Parameter, pd: Parameter) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, vec![r, pd])?;
        Ok(Self { name, params })
    }
}

impl Block for ResistanceBc {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Resistance
    }

    fn accepts_ports(&self, inlets: usize, outlets: usize) -> bool {
        inlets == 1 && outlets == 0
    }

    param_access!();

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        stamp.f(0, P, 1.0);
    }

    fn update_time(&mut self, stamp: &mut BlockStamp<'_>, t: f64) {
        stamp.f(0, Q, -self.params.at(0, t));
        stamp.c(0, -self.params.at(1, t));
    }
}

/// Three-element windkessel (RCR) outlet with internal capacitor pressure `Pc`.
///
/// ```text
/// P - Pc - Rp Q = 0
/// Rd Q - Pc + Pd - Rd C dPc/dt = 0
/// ```
#[derive(Debug, Clone)]
pub struct WindkesselBc {
    name: String,
    params: ParamSet,
}

impl WindkesselBc {
    pub const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::constant("Rp"),
        ParamSpec::constant("C"),
        ParamSpec::constant("Rd"),
        ParamSpec::varying("Pd"),
    ];
    const PC: usize = 2;

    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, params)?;
        Ok(Self { name, params })
    }

    pub fn rcr(name: impl Into<String>, rp: f64, c: f64, rd: f64, pd: f64) -> ComponentResult<Self> {
        Self::new(name, [rp, c, rd, pd].into_iter().map(Parameter::constant).collect())
    }
}

impl Block for WindkesselBc {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Windkessel
    }

    fn accepts_ports(&self, inlets: usize, outlets: usize) -> bool {
        inlets == 1 && outlets == 0
    }

    fn internal_variables(&self) -> &[&'static str] {
        &["Pc"]
    }

    param_access!();

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        let (rp, c, rd) = (self.params.value(0), self.params.value(1), self.params.value(2));
        stamp.f(0, P, 1.0);
        stamp.f(0, Self::PC, -1.0);
        stamp.f(0, Q, -rp);
        stamp.f(1, Q, rd);
        stamp.f(1, Self::PC, -1.0);
        stamp.e(1, Self::PC, -rd * c);
    }

    fn update_time(&mut self, stamp: &mut BlockStamp<'_>, t: f64) {
        stamp.c(1, self.params.at(3, t));
    }
}

/// Open-loop coronary outlet with arterial (`Pa`) and intramyocardial (`Pm`)
/// compartments driven by an intramyocardial pressure `Pim(t)`.
///
/// ```text
/// P - Pa - Ra Q = 0
/// Ram Q - Ram Ca dPa/dt - Pa + Pm = 0
/// Rv (Pa - Pm) - Ram Rv Cim (dPm/dt - dPim/dt) - Ram (Pm - Pv) = 0
/// ```
#[derive(Debug, Clone)]
pub struct OpenLoopCoronaryBc {
    name: String,
    params: ParamSet,
}

impl OpenLoopCoronaryBc {
    pub const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::constant("Ra"),
        ParamSpec::constant("Ram"),
        ParamSpec::constant("Rv"),
        ParamSpec::constant("Ca"),
        ParamSpec::constant("Cim"),
        ParamSpec::varying("Pim"),
        ParamSpec::varying("Pv"),
    ];
    const PA: usize = 2;
    const PM: usize = 3;

    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, params)?;
        Ok(Self { name, params })
    }
}

impl Block for OpenLoopCoronaryBc {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::OpenLoopCoronary
    }

    fn accepts_ports(&self, inlets: usize, outlets: usize) -> bool {
        inlets == 1 && outlets == 0
    }

    fn internal_variables(&self) -> &[&'static str] {
        &["Pa", "Pm"]
    }

    param_access!();

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        let p = &self.params;
        let (ra, ram, rv, ca, cim) = (p.value(0), p.value(1), p.value(2), p.value(3), p.value(4));
        stamp.f(0, P, 1.0);
        stamp.f(0, Self::PA, -1.0);
        stamp.f(0, Q, -ra);

        stamp.f(1, Q, ram);
        stamp.f(1, Self::PA, -1.0);
        stamp.f(1, Self::PM, 1.0);
        stamp.e(1, Self::PA, -ram * ca);

        stamp.f(2, Self::PA, rv);
        stamp.f(2, Self::PM, -rv - ram);
        stamp.e(2, Self::PM, -ram * rv * cim);
    }

    fn update_time(&mut self, stamp: &mut BlockStamp<'_>, t: f64) {
        let p = &self.params;
        let (ram, rv, cim) = (p.value(1), p.value(2), p.value(4));
        let dpim = p.get(5).derivative(t);
        let pv = p.at(6, t);
        stamp.c(2, ram * rv * cim * dpim + ram * pv);
    }
}
