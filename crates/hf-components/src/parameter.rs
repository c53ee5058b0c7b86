//! Block parameters: constants and piecewise-linear time series.

use std::sync::Arc;

use crate::error::{ComponentError, ComponentResult};

/// Storage for a parameter's samples.
///
/// Series samples are reference counted so that several blocks (or several
/// network instances) can alias one interpolation table without copying it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    Constant(f64),
    Series {
        times: Arc<[f64]>,
        values: Arc<[f64]>,
        periodic: bool,
    },
}

/// A scalar block input that may vary in time.
///
/// Time series are interpolated linearly between bracketing samples. Outside
/// the sampled range the boundary value is held, unless the series is
/// periodic, in which case time wraps with period `t_last - t_first`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    kind: ParameterKind,
}

impl Parameter {
    pub fn constant(value: f64) -> Self {
        Self {
            kind: ParameterKind::Constant(value),
        }
    }

    /// Non-periodic time series; values are held outside `[t_first, t_last]`.
    pub fn time_series(times: Vec<f64>, values: Vec<f64>) -> ComponentResult<Self> {
        Self::series(times, values, false)
    }

    /// Periodic time series with period `t_last - t_first`.
    pub fn periodic(times: Vec<f64>, values: Vec<f64>) -> ComponentResult<Self> {
        Self::series(times, values, true)
    }

    pub fn series(times: Vec<f64>, values: Vec<f64>, periodic: bool) -> ComponentResult<Self> {
        let (times, values) = check_samples(times, values, periodic)?;
        Ok(Self {
            kind: ParameterKind::Series {
                times,
                values,
                periodic,
            },
        })
    }

    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, ParameterKind::Constant(_))
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self.kind, ParameterKind::Series { periodic: true, .. })
    }

    /// True when the parameter carries a time series rather than a scalar.
    pub fn is_array(&self) -> bool {
        !self.is_constant()
    }

    /// Value at simulation time `t`.
    pub fn value(&self, t: f64) -> f64 {
        match &self.kind {
            ParameterKind::Constant(v) => *v,
            ParameterKind::Series {
                times,
                values,
                periodic,
            } => match bracket(times, t, *periodic) {
                Bracket::Held(i) => values[i],
                Bracket::Segment { lo, frac } => values[lo] + frac * (values[lo + 1] - values[lo]),
            },
        }
    }

    /// Time derivative at `t`: the secant slope of the bracketing segment.
    pub fn derivative(&self, t: f64) -> f64 {
        match &self.kind {
            ParameterKind::Constant(_) => 0.0,
            ParameterKind::Series {
                times,
                values,
                periodic,
            } => match bracket(times, t, *periodic) {
                Bracket::Held(_) => 0.0,
                Bracket::Segment { lo, .. } => {
                    (values[lo + 1] - values[lo]) / (times[lo + 1] - times[lo])
                }
            },
        }
    }

    /// Replace the samples, keeping the periodic flag. A constant parameter
    /// becomes a non-periodic series (or stays constant for one sample).
    pub fn update(&mut self, times: Vec<f64>, values: Vec<f64>) -> ComponentResult<()> {
        let periodic = self.is_periodic();
        if times.len() == 1 && values.len() == 1 && !periodic {
            self.kind = ParameterKind::Constant(values[0]);
            return Ok(());
        }
        let (times, values) = check_samples(times, values, periodic)?;
        self.kind = ParameterKind::Series {
            times,
            values,
            periodic,
        };
        Ok(())
    }

    /// Replace the value of a constant parameter.
    pub fn set_constant(&mut self, value: f64) {
        self.kind = ParameterKind::Constant(value);
    }
}

impl From<f64> for Parameter {
    fn from(value: f64) -> Self {
        Parameter::constant(value)
    }
}

enum Bracket {
    Held(usize),
    Segment { lo: usize, frac: f64 },
}

fn bracket(times: &[f64], t: f64, periodic: bool) -> Bracket {
    let n = times.len();
    if n == 1 {
        return Bracket::Held(0);
    }
    let t_first = times[0];
    let t_last = times[n - 1];
    let t = if periodic {
        t_first + (t - t_first).rem_euclid(t_last - t_first)
    } else {
        t
    };
    if t < t_first {
        return Bracket::Held(0);
    }
    if t >= t_last {
        // rem_euclid can round up to exactly the period
        return if periodic {
            Bracket::Held(0)
        } else {
            Bracket::Held(n - 1)
        };
    }
    // first sample strictly after t; t < t_last so hi is in 1..n
    let hi = times.partition_point(|&x| x <= t);
    let lo = hi - 1;
    Bracket::Segment {
        lo,
        frac: (t - times[lo]) / (times[hi] - times[lo]),
    }
}

fn check_samples(
    times: Vec<f64>,
    values: Vec<f64>,
    periodic: bool,
) -> ComponentResult<(Arc<[f64]>, Arc<[f64]>)> {
    if times.is_empty() || values.is_empty() {
        return Err(ComponentError::config(
            "parameter",
            "time series has no samples",
        ));
    }
    if times.len() != values.len() {
        return Err(ComponentError::config(
            "parameter",
            format!(
                "{} sample times but {} values",
                times.len(),
                values.len()
            ),
        ));
    }
    if times.iter().chain(values.iter()).any(|v| !v.is_finite()) {
        return Err(ComponentError::config(
            "parameter",
            "time series contains non-finite samples",
        ));
    }
    if times.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ComponentError::config(
            "parameter",
            "sample times must be strictly increasing",
        ));
    }
    if periodic && times.len() < 2 {
        return Err(ComponentError::config(
            "parameter",
            "periodic series needs at least two samples",
        ));
    }
    Ok((times.into(), values.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn constant_is_time_invariant() {
        let p = Parameter::constant(3.5);
        assert!(p.is_constant());
        assert!(!p.is_array());
        assert_eq!(p.value(0.0), 3.5);
        assert_eq!(p.value(1e6), 3.5);
        assert_eq!(p.derivative(2.0), 0.0);
    }

    #[test]
    fn interpolates_between_samples() {
        let p = Parameter::time_series(vec![0.0, 1.0, 3.0], vec![0.0, 10.0, 30.0]).unwrap();
        assert_relative_eq!(p.value(0.5), 5.0);
        assert_relative_eq!(p.value(2.0), 20.0);
        assert_relative_eq!(p.derivative(0.5), 10.0);
        assert_relative_eq!(p.derivative(2.0), 10.0);
    }

    #[test]
    fn holds_boundary_values_outside_range() {
        let p = Parameter::time_series(vec![1.0, 2.0], vec![4.0, 8.0]).unwrap();
        assert_eq!(p.value(0.0), 4.0);
        assert_eq!(p.value(5.0), 8.0);
        assert_eq!(p.derivative(0.0), 0.0);
        assert_eq!(p.derivative(5.0), 0.0);
    }

    #[test]
    fn periodic_wraps_time() {
        let p = Parameter::periodic(vec![0.0, 0.5, 1.0], vec![0.0, 1.0, 0.0]).unwrap();
        assert!(p.is_periodic());
        assert_relative_eq!(p.value(0.25), 0.5);
        assert_relative_eq!(p.value(1.25), 0.5);
        assert_relative_eq!(p.value(-0.75), 0.5);
        assert_relative_eq!(p.derivative(1.75), -2.0);
    }

    #[test]
    fn zero_samples_is_configuration_error() {
        let err = Parameter::time_series(vec![], vec![]).unwrap_err();
        assert!(matches!(err, ComponentError::Configuration { .. }));
    }

    #[test]
    fn rejects_unsorted_or_mismatched_samples() {
        assert!(Parameter::time_series(vec![0.0, 0.0], vec![1.0, 2.0]).is_err());
        assert!(Parameter::time_series(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(Parameter::periodic(vec![0.0], vec![1.0]).is_err());
    }

    #[test]
    fn update_replaces_samples() {
        let mut p = Parameter::time_series(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        p.update(vec![0.0, 1.0], vec![5.0, 7.0]).unwrap();
        assert_relative_eq!(p.value(0.5), 6.0);
        assert!(p.update(vec![], vec![]).is_err());

        p.update(vec![0.0], vec![2.0]).unwrap();
        assert!(p.is_constant());
        assert_eq!(p.value(9.0), 2.0);
    }

    #[test]
    fn aliased_tables_share_storage() {
        let p = Parameter::time_series(vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
        let q = p.clone();
        match (p.kind(), q.kind()) {
            (ParameterKind::Series { values: a, .. }, ParameterKind::Series { values: b, .. }) => {
                assert!(Arc::ptr_eq(a, b))
            }
            _ => panic!("expected series"),
        }
    }

    proptest! {
        #[test]
        fn interpolant_stays_within_sample_range(t in -5.0f64..5.0) {
            let p = Parameter::periodic(vec![0.0, 0.3, 1.0], vec![2.0, -1.0, 2.0]).unwrap();
            let v = p.value(t);
            prop_assert!((-1.0..=2.0).contains(&v));
        }
    }
}
