//! Mass-conserving junction with a shared pressure.

use crate::common::ParamSet;
use crate::error::ComponentResult;
use crate::stamp::{BlockDofs, BlockStamp};
use crate::traits::{Block, BlockKind};

/// Joins any number of inlet and outlet nodes.
///
/// Equation 0 is `sum(Q_in) - sum(Q_out) = 0`; equation `k` for `k >= 1` ties
/// the pressure of node-end `k` to node-end 0.
#[derive(Debug, Clone)]
pub struct Junction {
    name: String,
    params: ParamSet,
}

impl Junction {
    pub fn new(name: impl Into<String>) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), &[], Vec::new())?;
        Ok(Self { name, params })
    }
}

impl Block for Junction {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Junction
    }

    fn accepts_ports(&self, inlets: usize, outlets: usize) -> bool {
        inlets >= 1 && outlets >= 1
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        let inlets = stamp.dofs().inlets;
        let ports = stamp.dofs().ports();
        for k in 0..ports {
            let dir = if k < inlets { 1.0 } else { -1.0 };
            stamp.f(0, BlockDofs::q(k), dir);
        }
        for k in 1..ports {
            stamp.f(k, BlockDofs::p(0), 1.0);
            stamp.f(k, BlockDofs::p(k), -1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stamp::DenseAssembly;
    use approx::assert_relative_eq;

    #[test]
    fn conserves_flow_and_equalizes_pressure() {
        let dofs = BlockDofs {
            vars: (0..6).collect(),
            eqs: vec![0, 1, 2],
            inlets: 1,
            outlets: 2,
            internals: 0,
        };
        let mut j = Junction::new("j").unwrap();
        let mut sink = DenseAssembly::new(6);
        j.update_constant(&mut BlockStamp::new(&mut sink, &dofs));

        let y = [7.0, 10.0, 7.0, 6.0, 7.0, 4.0];
        for r in sink.residual(&y, &[0.0; 6]) {
            assert_relative_eq!(r, 0.0);
        }
        let leaky = [7.0, 10.0, 7.0, 6.0, 7.0, 3.0];
        assert_relative_eq!(sink.residual(&leaky, &[0.0; 6])[0], 1.0);
    }

    #[test]
    fn needs_both_sides() {
        let j = Junction::new("j").unwrap();
        assert!(j.accepts_ports(2, 1));
        assert!(!j.accepts_ports(0, 2));
    }
}
