//! Windkessel placed inside a closed loop, draining into a venous node.

use crate::common::ParamSet;
use crate::error::ComponentResult;
use crate::parameter::Parameter;
use crate::stamp::BlockStamp;
use crate::traits::{Block, BlockKind, ParamSpec};

const P_IN: usize = 0;
const Q_IN: usize = 1;
const P_OUT: usize = 2;
const Q_OUT: usize = 3;
const PC: usize = 4;

/// RCR element between an arterial inlet and a venous outlet.
///
/// ```text
/// P_in - Pc - Rp Q_in = 0
/// Q_in - Q_out - C dPc/dt = 0
/// Pc - P_out - Rd Q_out = 0
/// ```
#[derive(Debug, Clone)]
pub struct ClosedLoopRcrBc {
    name: String,
    params: ParamSet,
}

impl ClosedLoopRcrBc {
    pub const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::constant("Rp"),
        ParamSpec::constant("C"),
        ParamSpec::constant("Rd"),
    ];

    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, params)?;
        Ok(Self { name, params })
    }

    pub fn rcr(name: impl Into<String>, rp: f64, c: f64, rd: f64) -> ComponentResult<Self> {
        Self::new(name, [rp, c, rd].into_iter().map(Parameter::constant).collect())
    }
}

impl Block for ClosedLoopRcrBc {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::ClosedLoopRcr
    }

    fn internal_variables(&self) -> &[&'static str] {
        &["Pc"]
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        let (rp, c, rd) = (self.params.value(0), self.params.value(1), self.params.value(2));

        stamp.f(0, P_IN, 1.0);
        stamp.f(0, PC, -1.0);
        stamp.f(0, Q_IN, -rp);

        stamp.f(1, Q_IN, 1.0);
        stamp.f(1, Q_OUT, -1.0);
        stamp.e(1, PC, -c);

        stamp.f(2, PC, 1.0);
        stamp.f(2, P_OUT, -1.0);
        stamp.f(2, Q_OUT, -rd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stamp::{BlockDofs, DenseAssembly};
    use approx::assert_relative_eq;

    fn assembled(rp: f64, c: f64, rd: f64) -> DenseAssembly {
        let mut bc = ClosedLoopRcrBc::rcr("rcr", rp, c, rd).unwrap();
        let dofs = BlockDofs {
            vars: (0..5).collect(),
            eqs: (0..3).collect(),
            inlets: 1,
            outlets: 1,
            internals: 1,
        };
        let mut sink = DenseAssembly::new(5);
        bc.update_constant(&mut BlockStamp::new(&mut sink, &dofs));
        sink
    }

    #[test]
    fn steady_state_is_series_resistance() {
        let sink = assembled(1.0, 0.5, 4.0);
        let q = 2.0;
        let y = [5.0 * q + 3.0, q, 3.0, q, 4.0 * q + 3.0];
        for r in sink.residual(&y, &[0.0; 5]) {
            assert_relative_eq!(r, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn capacitor_absorbs_flow_difference() {
        let sink = assembled(1.0, 0.5, 4.0);
        // Q_in - Q_out = C dPc/dt
        let r = sink.residual(&[0.0, 3.0, 0.0, 1.0, 0.0], &[0.0, 0.0, 0.0, 0.0, 4.0]);
        assert_relative_eq!(r[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(sink.e_at(1, PC), -0.5);
    }
}
