//! Cardiac activation functions.
//!
//! An activation maps simulation time to a value in `[0, 1]` that blends a
//! chamber's passive and active elastance. All shapes repeat with the cardiac
//! period.

use std::f64::consts::PI;

use crate::error::{ComponentError, ComponentResult};

/// Sampling step used to find the peak of the two-hill waveform.
const NORMALIZATION_DT: f64 = 1e-5;

/// Upper bound on peak-search samples; longer periods use a coarser step.
const MAX_NORMALIZATION_SAMPLES: usize = 1_000_000;

/// Activation waveform shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationShape {
    /// Single raised cosine twitch of length `t_twitch` starting at `t_active`.
    HalfCosine { t_active: f64, t_twitch: f64 },
    /// Contraction half-wave followed by an independent relaxation half-wave.
    PiecewiseCosine {
        contract_start: f64,
        relax_start: f64,
        contract_duration: f64,
        relax_duration: f64,
    },
    /// Product of a rising and a falling Hill function, normalized to peak 1.
    TwoHill {
        t_shift: f64,
        tau_1: f64,
        tau_2: f64,
        m1: f64,
        m2: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    period: f64,
    shape: ActivationShape,
    scale: f64,
}

impl Activation {
    pub fn new(period: f64, shape: ActivationShape) -> ComponentResult<Self> {
        if !(period > 0.0) || !period.is_finite() {
            return Err(ComponentError::config(
                "activation",
                format!("cardiac period must be positive (got {period})"),
            ));
        }
        let scale = match &shape {
            ActivationShape::HalfCosine { t_twitch, .. } => {
                if !(*t_twitch > 0.0) {
                    return Err(ComponentError::config(
                        "activation",
                        "t_twitch must be positive",
                    ));
                }
                1.0
            }
            ActivationShape::PiecewiseCosine {
                contract_duration,
                relax_duration,
                ..
            } => {
                if !(*contract_duration > 0.0) || !(*relax_duration > 0.0) {
                    return Err(ComponentError::config(
                        "activation",
                        "contraction and relaxation durations must be positive",
                    ));
                }
                1.0
            }
            ActivationShape::TwoHill {
                tau_1,
                tau_2,
                m1,
                m2,
                ..
            } => two_hill_scale(period, *tau_1, *tau_2, *m1, *m2)?,
        };
        Ok(Self {
            period,
            shape,
            scale,
        })
    }

    pub fn half_cosine(period: f64, t_active: f64, t_twitch: f64) -> ComponentResult<Self> {
        Self::new(period, ActivationShape::HalfCosine { t_active, t_twitch })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn shape(&self) -> &ActivationShape {
        &self.shape
    }

    /// Activation at simulation time `t`.
    pub fn value(&self, t: f64) -> f64 {
        let period = self.period;
        match self.shape {
            ActivationShape::HalfCosine { t_active, t_twitch } => {
                let t_contract = (t.rem_euclid(period) - t_active).max(0.0);
                if t_contract <= t_twitch {
                    0.5 * (1.0 - (2.0 * PI * t_contract / t_twitch).cos())
                } else {
                    0.0
                }
            }
            ActivationShape::PiecewiseCosine {
                contract_start,
                relax_start,
                contract_duration,
                relax_duration,
            } => {
                // `%` keeps the sign of `t - start`, so nothing fires before
                // the first contraction or relaxation starts.
                let tc = (t - contract_start) % period;
                if (0.0..contract_duration).contains(&tc) {
                    return 0.5 * (1.0 - (PI * tc / contract_duration).cos());
                }
                let tr = (t - relax_start) % period;
                if (0.0..relax_duration).contains(&tr) {
                    0.5 * (1.0 + (PI * tr / relax_duration).cos())
                } else {
                    0.0
                }
            }
            ActivationShape::TwoHill {
                t_shift,
                tau_1,
                tau_2,
                m1,
                m2,
            } => self.scale * two_hill((t - t_shift).rem_euclid(period), tau_1, tau_2, m1, m2),
        }
    }
}

fn two_hill(t: f64, tau_1: f64, tau_2: f64, m1: f64, m2: f64) -> f64 {
    let g1 = (t / tau_1).powf(m1);
    let g2 = (t / tau_2).powf(m2);
    (g1 / (1.0 + g1)) * (1.0 / (1.0 + g2))
}

fn two_hill_scale(period: f64, tau_1: f64, tau_2: f64, m1: f64, m2: f64) -> ComponentResult<f64> {
    let dt = NORMALIZATION_DT.max(period / MAX_NORMALIZATION_SAMPLES as f64);
    let steps = ((period / dt).ceil() as usize).min(MAX_NORMALIZATION_SAMPLES);
    let max = (0..steps)
        .map(|i| two_hill(i as f64 * dt, tau_1, tau_2, m1, m2))
        .fold(0.0_f64, f64::max);
    if !(max > 0.0) || !max.is_finite() {
        return Err(ComponentError::config(
            "activation",
            format!("two-hill peak must be positive and finite (got {max}); check tau_1, tau_2, m1, m2"),
        ));
    }
    Ok(1.0 / max)
}
