//! Closed-loop coronary bed coupled to a ventricle of the heart block.

use crate::common::ParamSet;
use crate::error::ComponentResult;
use crate::parameter::Parameter;
use crate::stamp::BlockStamp;
use crate::traits::{Block, BlockKind, Coupling, ParamSpec};

/// Which ventricle drives the intramyocardial pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoronarySide {
    Left,
    Right,
}

/// Coronary bed between an arterial inlet and a venous outlet.
///
/// Local variables: `0 P_in, 1 Q_in, 2 P_out, 3 Q_out, 4 Pa, 5 Pm, 6 P_v`
/// where `P_v` is the coupled ventricular pressure.
///
/// ```text
/// P_in - Pa - Ra Q_in = 0
/// Ram Q_in - Ram Ca dPa/dt - Pa + Pm = 0
/// Rv (Pa - Pm) - Ram Rv Cim (dPm/dt - im dP_v/dt) - Ram (Pm - P_out) = 0
/// Rv Q_out - Pm + P_out = 0
/// ```
#[derive(Debug, Clone)]
pub struct ClosedLoopCoronaryBc {
    name: String,
    side: CoronarySide,
    params: ParamSet,
}

impl ClosedLoopCoronaryBc {
    pub const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::constant("Ra"),
        ParamSpec::constant("Ram"),
        ParamSpec::constant("Rv"),
        ParamSpec::constant("Ca"),
        ParamSpec::constant("Cim"),
        ParamSpec::constant("im_scale"),
    ];

    pub fn new(
        name: impl Into<String>,
        side: CoronarySide,
        params: Vec<Parameter>,
    ) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, params)?;
        Ok(Self { name, side, params })
    }

    pub fn side(&self) -> CoronarySide {
        self.side
    }
}

const P_IN: usize = 0;
const Q_IN: usize = 1;
const P_OUT: usize = 2;
const Q_OUT: usize = 3;
const PA: usize = 4;
const PM: usize = 5;
const P_V: usize = 6;

impl Block for ClosedLoopCoronaryBc {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::ClosedLoopCoronary
    }

    fn internal_variables(&self) -> &[&'static str] {
        &["Pa", "Pm"]
    }

    fn coupled_variables(&self) -> Vec<Coupling> {
        let variable = match self.side {
            CoronarySide::Left => "P_lv",
            CoronarySide::Right => "P_rv",
        };
        vec![Coupling {
            kind: BlockKind::ClosedLoopHeartPulmonary,
            variable,
        }]
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        let p = &self.params;
        let (ra, ram, rv, ca, cim, im) =
            (p.value(0), p.value(1), p.value(2), p.value(3), p.value(4), p.value(5));

        stamp.f(0, P_IN, 1.0);
        stamp.f(0, PA, -1.0);
        stamp.f(0, Q_IN, -ra);

        stamp.f(1, Q_IN, ram);
        stamp.f(1, PA, -1.0);
        stamp.f(1, PM, 1.0);
        stamp.e(1, PA, -ram * ca);

        stamp.f(2, PA, rv);
        stamp.f(2, PM, -rv - ram);
        stamp.f(2, P_OUT, ram);
        stamp.e(2, PM, -ram * rv * cim);
        stamp.e(2, P_V, ram * rv * cim * im);

        stamp.f(3, Q_OUT, rv);
        stamp.f(3, PM, -1.0);
        stamp.f(3, P_OUT, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stamp::{BlockDofs, DenseAssembly};
    use approx::assert_relative_eq;

    #[test]
    fn couples_to_matching_ventricle() {
        let params = vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
            .into_iter()
            .map(Parameter::constant)
            .collect::<Vec<_>>();
        let left = ClosedLoopCoronaryBc::new("l", CoronarySide::Left, params.clone()).unwrap();
        let right = ClosedLoopCoronaryBc::new("r", CoronarySide::Right, params).unwrap();
        assert_eq!(left.coupled_variables()[0].variable, "P_lv");
        assert_eq!(right.coupled_variables()[0].variable, "P_rv");
    }

    #[test]
    fn steady_flow_through_bed() {
        let (ra, ram, rv) = (1.0, 2.0, 3.0);
        let params = vec![ra, ram, rv, 0.1, 0.2, 1.0]
            .into_iter()
            .map(Parameter::constant)
            .collect::<Vec<_>>();
        let mut bc = ClosedLoopCoronaryBc::new("cor", CoronarySide::Left, params).unwrap();
        let dofs = BlockDofs {
            vars: (0..7).collect(),
            eqs: (0..4).collect(),
            inlets: 1,
            outlets: 1,
            internals: 2,
        };
        let mut sink = DenseAssembly::new(7);
        bc.update_constant(&mut BlockStamp::new(&mut sink, &dofs));

        // Series resistances at steady state; P_out = 0, Q = 1.
        let q = 1.0;
        let pm = rv * q;
        let pa = pm + ram * q;
        let p_in = pa + ra * q;
        let y = [p_in, q, 0.0, q, pa, pm, 50.0];
        for r in sink.residual(&y, &[0.0; 7]) {
            assert_relative_eq!(r, 0.0, epsilon = 1e-12);
        }
    }
}
