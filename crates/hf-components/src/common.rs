//! Common utilities shared by block implementations.

use crate::error::{ComponentError, ComponentResult};
use crate::parameter::Parameter;
use crate::traits::ParamSpec;

/// Ordered parameters of one block, checked against its declared slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    owner: String,
    specs: &'static [ParamSpec],
    values: Vec<Parameter>,
}

impl ParamSet {
    pub fn new(
        owner: impl Into<String>,
        specs: &'static [ParamSpec],
        values: Vec<Parameter>,
    ) -> ComponentResult<Self> {
        let owner = owner.into();
        check(&owner, specs, &values)?;
        Ok(Self {
            owner,
            specs,
            values,
        })
    }

    pub fn specs(&self) -> &'static [ParamSpec] {
        self.specs
    }

    pub fn values(&self) -> &[Parameter] {
        &self.values
    }

    pub fn get(&self, i: usize) -> &Parameter {
        &self.values[i]
    }

    /// Value of slot `i` at time `t`.
    pub fn at(&self, i: usize, t: f64) -> f64 {
        self.values[i].value(t)
    }

    /// Value of a slot that is constant by declaration.
    pub fn value(&self, i: usize) -> f64 {
        self.values[i].value(0.0)
    }

    pub fn replace(&mut self, values: Vec<Parameter>) -> ComponentResult<()> {
        check(&self.owner, self.specs, &values)?;
        self.values = values;
        Ok(())
    }
}

fn check(owner: &str, specs: &[ParamSpec], values: &[Parameter]) -> ComponentResult<()> {
    if values.len() != specs.len() {
        return Err(ComponentError::config(
            owner,
            format!(
                "expected {} parameters ({}), got {}",
                specs.len(),
                specs.iter().map(|s| s.name).collect::<Vec<_>>().join(", "),
                values.len()
            ),
        ));
    }
    for (spec, value) in specs.iter().zip(values) {
        if !spec.time_varying && !value.is_constant() {
            return Err(ComponentError::config(
                owner,
                format!("parameter {} must be constant", spec.name),
            ));
        }
    }
    Ok(())
}

/// Sign with `signum(0) = 0`.
pub fn sign(x: f64) -> f64 {
    hf_core::numeric::signum0(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[ParamSpec] = &[ParamSpec::constant("R"), ParamSpec::varying("Pd")];

    #[test]
    fn accepts_matching_parameters() {
        let set = ParamSet::new(
            "bc",
            SPECS,
            vec![
                Parameter::constant(2.0),
                Parameter::time_series(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(set.value(0), 2.0);
        assert_eq!(set.at(1, 0.5), 0.5);
    }

    #[test]
    fn rejects_wrong_count() {
        let err = ParamSet::new("bc", SPECS, vec![Parameter::constant(1.0)]).unwrap_err();
        assert!(err.to_string().contains("expected 2 parameters"));
    }

    #[test]
    fn rejects_series_in_constant_slot() {
        let series = Parameter::time_series(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        let err = ParamSet::new("bc", SPECS, vec![series, Parameter::constant(0.0)]).unwrap_err();
        assert!(err.to_string().contains("R must be constant"));
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
    }
}
