//! Time-varying elastance chamber.

use crate::activation::Activation;
use crate::common::ParamSet;
use crate::error::ComponentResult;
use crate::parameter::Parameter;
use crate::stamp::BlockStamp;
use crate::traits::{Block, BlockKind, ParamSpec};

const P_IN: usize = 0;
const Q_IN: usize = 1;
const P_OUT: usize = 2;
const Q_OUT: usize = 3;
const VC: usize = 4;

/// Chamber with elastance `E(t) = Epass + Emax A(t)` and volume `Vc`.
///
/// ```text
/// P_in - E(t) (Vc - Vrest) = 0
/// P_in - P_out = 0
/// Q_in - Q_out - dVc/dt = 0
/// ```
#[derive(Debug, Clone)]
pub struct LinearElastanceChamber {
    name: String,
    params: ParamSet,
    activation: Activation,
}

impl LinearElastanceChamber {
    pub const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::constant("Emax"),
        ParamSpec::constant("Epass"),
        ParamSpec::constant("Vrest"),
    ];

    pub fn new(
        name: impl Into<String>,
        params: Vec<Parameter>,
        activation: Activation,
    ) -> ComponentResult<Self> {
        let name = name.into();
        let params = ParamSet::new(name.clone(), Self::PARAMS, params)?;
        Ok(Self {
            name,
            params,
            activation,
        })
    }

    pub fn elastance(&self, t: f64) -> f64 {
        self.params.value(1) + self.params.value(0) * self.activation.value(t)
    }
}

impl Block for LinearElastanceChamber {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BlockKind {
        BlockKind::LinearElastanceChamber
    }

    fn internal_variables(&self) -> &[&'static str] {
        &["Vc"]
    }

    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn update_constant(&mut self, stamp: &mut BlockStamp<'_>) {
        stamp.f(0, P_IN, 1.0);
        stamp.f(1, P_IN, 1.0);
        stamp.f(1, P_OUT, -1.0);
        stamp.f(2, Q_IN, 1.0);
        stamp.f(2, Q_OUT, -1.0);
        stamp.e(2, VC, -1.0);
    }

    fn update_time(&mut self, stamp: &mut BlockStamp<'_>, t: f64) {
        let e = self.elastance(t);
        stamp.f(0, VC, -e);
        stamp.c(0, e * self.params.value(2));
    }
}
