//! Float helpers used by the blocks and the solver.

use crate::HfError;

pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HfError::NonFinite { what, value: v })
    }
}

/// Check every entry of a slice, reporting the first non-finite one.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), HfError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(HfError::NonFinite { what, value }),
        None => Ok(()),
    }
}

/// Infinity norm; 0 for an empty slice.
pub fn max_abs(values: &[Real]) -> Real {
    values.iter().fold(0.0, |acc: Real, v| acc.max(v.abs()))
}

/// `|a - b| / (1 + max(|a|, |b|))`, usable across pressures in the hundreds and
/// flows near zero.
pub fn scaled_diff(a: Real, b: Real) -> Real {
    (a - b).abs() / (1.0 + a.abs().max(b.abs()))
}

/// Sign function returning 0 at 0.
pub fn signum0(v: Real) -> Real {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
