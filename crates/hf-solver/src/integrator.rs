//! Generalized-alpha time integration with a Newton corrector.

use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};
use crate::model::Model;
use crate::state::State;

/// Integrator configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorConfig {
    /// Time step
    pub dt: f64,
    /// Spectral radius at infinity, in `[0, 1]`
    pub rho: f64,
    /// Absolute tolerance on the residual max-norm
    pub atol: f64,
    /// Maximum Newton iterations per step
    pub max_iter: usize,
    /// Fraction of the Newton update applied each iteration
    pub damping: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            rho: 0.1,
            atol: 1e-8,
            max_iter: 30,
            damping: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorStatus {
    Initialized,
    Stepping,
    Converged,
    Failed,
}

/// Result of one attempted step. Non-convergence is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Converged { iterations: usize, residual_norm: f64 },
    Failed { iterations: usize, residual_norm: f64 },
}

impl StepOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, StepOutcome::Converged { .. })
    }
}

#[derive(Debug, Clone)]
pub struct GeneralizedAlpha {
    config: IntegratorConfig,
    alpha_m: f64,
    alpha_f: f64,
    gamma: f64,
    status: IntegratorStatus,
}

impl GeneralizedAlpha {
    pub fn new(config: IntegratorConfig) -> SolverResult<Self> {
        if !(config.dt > 0.0) || !config.dt.is_finite() {
            return Err(SolverError::config(format!("time step must be positive (got {})", config.dt)));
        }
        if !(0.0..=1.0).contains(&config.rho) {
            return Err(SolverError::config(format!("rho must lie in [0, 1] (got {})", config.rho)));
        }
        if !(config.atol > 0.0) {
            return Err(SolverError::config("absolute tolerance must be positive"));
        }
        if config.max_iter == 0 {
            return Err(SolverError::config("max_iter must be at least 1"));
        }
        if !(config.damping > 0.0 && config.damping <= 1.0) {
            return Err(SolverError::config("damping must lie in (0, 1]"));
        }
        let rho = config.rho;
        let alpha_m = 0.5 * (3.0 - rho) / (1.0 + rho);
        let alpha_f = 1.0 / (1.0 + rho);
        let gamma = 0.5 + alpha_m - alpha_f;
        Ok(Self {
            config,
            alpha_m,
            alpha_f,
            gamma,
            status: IntegratorStatus::Initialized,
        })
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    pub fn status(&self) -> IntegratorStatus {
        self.status
    }

    /// `(α_m, α_f, γ)`.
    pub fn coefficients(&self) -> (f64, f64, f64) {
        (self.alpha_m, self.alpha_f, self.gamma)
    }

    /// Advance `state` by the configured time step.
    pub fn step(&mut self, model: &mut Model, state: &mut State) -> SolverResult<StepOutcome> {
        self.step_with(model, state, self.config.dt)
    }

    /// Advance `state` by `dt`. On failure or error `state` is left untouched.
    pub fn step_with(
        &mut self,
        model: &mut Model,
        state: &mut State,
        dt: f64,
    ) -> SolverResult<StepOutcome> {
        if state.len() != model.size() {
            return Err(SolverError::config(format!(
                "state has {} entries, model has {}",
                state.len(),
                model.size()
            )));
        }
        if !(dt > 0.0) {
            return Err(SolverError::config(format!("time step must be positive (got {dt})")));
        }
        self.status = IntegratorStatus::Stepping;
        let (am, af, gamma) = (self.alpha_m, self.alpha_f, self.gamma);
        let e_coeff = am / (af * gamma * dt);

        let y_n = DVector::from_column_slice(&state.y);
        let ydot_n = DVector::from_column_slice(&state.ydot);

        // Predictor: constant y, consistent ẏ.
        let ydot_pred = &ydot_n * (1.0 - 1.0 / gamma);
        let mut y_af = y_n.clone();
        let mut ydot_am = &ydot_n + (&ydot_pred - &ydot_n) * am;

        model.update_time(state.t + af * dt)?;

        let mut residual_norm = f64::INFINITY;
        for iteration in 0..=self.config.max_iter {
            model.update_solution(y_af.as_slice(), ydot_am.as_slice());
            model.update_gradient(y_af.as_slice(), ydot_am.as_slice());
            let residual = model.residual(y_af.as_slice(), ydot_am.as_slice());
            residual_norm = residual.amax();
            tracing::debug!(iteration, residual_norm, "newton");
            if !residual_norm.is_finite() {
                self.status = IntegratorStatus::Failed;
                return Err(SolverError::numerical(format!(
                    "non-finite residual at t = {}",
                    state.t + dt
                )));
            }
            if residual_norm < self.config.atol {
                state.y = (&y_n + (&y_af - &y_n) / af).as_slice().to_vec();
                state.ydot = (&ydot_n + (&ydot_am - &ydot_n) / am).as_slice().to_vec();
                state.t += dt;
                self.status = IntegratorStatus::Converged;
                return Ok(StepOutcome::Converged {
                    iterations: iteration,
                    residual_norm,
                });
            }
            if iteration == self.config.max_iter {
                break;
            }
            let dx = match model.solve(e_coeff, &residual) {
                Ok(dx) => dx,
                Err(e) => {
                    self.status = IntegratorStatus::Failed;
                    return Err(e);
                }
            };
            y_af += &dx * self.config.damping;
            ydot_am += &dx * (self.config.damping * e_coeff);
        }

        tracing::warn!(
            t = state.t,
            dt,
            residual_norm,
            max_iter = self.config.max_iter,
            "step did not converge"
        );
        self.status = IntegratorStatus::Failed;
        Ok(StepOutcome::Failed {
            iterations: self.config.max_iter,
            residual_norm,
        })
    }
}

/// Solve `F y + c = 0` (time derivatives held at zero) from `state.y` to get
/// consistent initial conditions at `state.t`.
pub fn steady_initial(
    model: &mut Model,
    state: &mut State,
    config: &IntegratorConfig,
) -> SolverResult<StepOutcome> {
    if state.len() != model.size() {
        return Err(SolverError::config("state does not match model size"));
    }
    let zeros = vec![0.0; model.size()];
    let mut y = DVector::from_column_slice(&state.y);
    model.update_time(state.t)?;

    let mut residual_norm = f64::INFINITY;
    for iteration in 0..=config.max_iter {
        model.update_solution(y.as_slice(), &zeros);
        model.update_gradient(y.as_slice(), &zeros);
        let residual = model.residual(y.as_slice(), &zeros);
        residual_norm = residual.amax();
        tracing::debug!(iteration, residual_norm, "steady newton");
        if !residual_norm.is_finite() {
            return Err(SolverError::numerical("non-finite residual in steady solve"));
        }
        if residual_norm < config.atol {
            state.y = y.as_slice().to_vec();
            state.ydot = zeros;
            return Ok(StepOutcome::Converged {
                iterations: iteration,
                residual_norm,
            });
        }
        if iteration == config.max_iter {
            break;
        }
        let dx = model.solve(0.0, &residual)?;
        y += &dx * config.damping;
    }
    tracing::warn!(residual_norm, "steady initialization did not converge");
    Ok(StepOutcome::Failed {
        iterations: config.max_iter,
        residual_norm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn coefficients_follow_rho() {
        let ga = GeneralizedAlpha::new(IntegratorConfig {
            rho: 0.5,
            ..Default::default()
        })
        .unwrap();
        let (am, af, gamma) = ga.coefficients();
        assert_relative_eq!(am, 0.5 * 2.5 / 1.5);
        assert_relative_eq!(af, 1.0 / 1.5);
        assert_relative_eq!(gamma, 0.5 + am - af);
        assert_eq!(ga.status(), IntegratorStatus::Initialized);
    }

    #[test]
    fn rejects_bad_configuration() {
        for config in [
            IntegratorConfig { dt: 0.0, ..Default::default() },
            IntegratorConfig { rho: 1.5, ..Default::default() },
            IntegratorConfig { max_iter: 0, ..Default::default() },
            IntegratorConfig { damping: 0.0, ..Default::default() },
        ] {
            assert!(GeneralizedAlpha::new(config).is_err());
        }
    }
}
