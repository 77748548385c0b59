//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the core implementation of the Levenberg-Marquardt algorithm
//! for nonlinear least-squares optimization. Steps solve the Marquardt-scaled normal
//! equations `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr`, so the damping acts per parameter on
//! the scale of its own sensitivity.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use std::fmt;

use crate::error::{KineticsError, Result};
use crate::problem::Problem;
use crate::utils::finite_difference;

use super::config::{DecompositionMethod, LmConfig};

/// Floor for diagonal scaling entries of parameters with no sensitivity.
const DIAG_FLOOR: f64 = 1e-12;

/// Relative singular value cutoff for the SVD solver.
const SVD_EPS: f64 = 1e-14;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Whether the optimization succeeded
    pub success: bool,

    /// A message describing the result
    pub message: String,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// Outcome of one pass through the iteration loop.
enum IterationStatus {
    /// Continue iteration
    Continue,

    /// Converged successfully
    Converged(String),

    /// Failed to converge
    Failed(String),
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self {
            config: LmConfig::default(),
        }
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for relative cost reduction.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for relative change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for the scaled gradient.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the factor by which to increase lambda.
    pub fn with_lambda_up_factor(mut self, factor: f64) -> Self {
        self.config.lambda_up_factor = factor;
        self
    }

    /// Set the factor by which to decrease lambda.
    pub fn with_lambda_down_factor(mut self, factor: f64) -> Self {
        self.config.lambda_down_factor = factor;
        self
    }

    /// Set the relative step used by finite-difference Jacobians.
    pub fn with_jacobian_epsilon(mut self, epsilon: f64) -> Self {
        self.config.jacobian_epsilon = epsilon;
        self
    }

    /// Set the method used for solving the linear system.
    pub fn with_decomposition_method(mut self, method: DecompositionMethod) -> Self {
        self.config.decomposition_method = method;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// Trial points whose evaluation fails (for example an ODE integration that
    /// diverges) are treated as rejected steps: the damping grows and a shorter
    /// step is tried. A Jacobian that cannot be evaluated ends the run unconverged
    /// at the last accepted point. Only residuals that fail at the starting point
    /// are returned as an error.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    pub fn minimize<P: Problem>(&self, problem: &P, initial_params: Array1<f64>) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(KineticsError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let mut params = initial_params;
        let mut residuals = problem.eval(&params)?;
        let mut cost = sum_of_squares(&residuals);
        let mut func_evals = 1;
        if !cost.is_finite() {
            return Err(KineticsError::InvalidInput(
                "non-finite residuals at the starting point".to_string(),
            ));
        }

        let mut lambda = self.config.initial_lambda;
        let mut iterations = 0;
        let mut jacobian = match self.jacobian(problem, &params, &residuals, &mut func_evals) {
            Ok(jacobian) => jacobian,
            Err(e) => {
                log::debug!("LM: Jacobian unavailable at the starting point: {}", e);
                return Ok(LmResult {
                    params,
                    residuals,
                    cost,
                    iterations,
                    func_evals,
                    success: false,
                    message: format!("Jacobian evaluation failed: {}", e),
                });
            }
        };

        let status = loop {
            if iterations >= self.config.max_iterations {
                break IterationStatus::Failed(format!(
                    "Maximum iterations ({}) reached",
                    self.config.max_iterations
                ));
            }
            iterations += 1;

            let jt = jacobian.t();
            let jtj = jt.dot(&jacobian);
            let gradient = jt.dot(&residuals);

            if cost == 0.0 {
                break IterationStatus::Converged("Residuals vanished".to_string());
            }

            let gradient_norm = scaled_gradient_norm(&jtj, &gradient, cost.sqrt());
            if gradient_norm <= self.config.gtol {
                break IterationStatus::Converged(format!(
                    "Gradient convergence: |g| = {:.2e} <= {:.2e}",
                    gradient_norm, self.config.gtol
                ));
            }

            let step = match self.solve_step(&jtj, &gradient, lambda) {
                Some(step) => step,
                None => {
                    lambda *= self.config.lambda_up_factor;
                    if lambda > self.config.max_lambda {
                        break IterationStatus::Failed(
                            "Failed to calculate step, and lambda reached maximum".to_string(),
                        );
                    }
                    continue;
                }
            };

            let step_norm = euclidean_norm(&step);
            let small_step =
                step_norm <= self.config.xtol * (euclidean_norm(&params) + self.config.xtol);
            let trial = &params + &step;

            func_evals += 1;
            let accepted = match problem.eval(&trial) {
                Ok(trial_residuals) => {
                    let trial_cost = sum_of_squares(&trial_residuals);
                    if trial_cost.is_finite() && trial_cost < cost {
                        Some((trial_residuals, trial_cost))
                    } else {
                        None
                    }
                }
                Err(e) => {
                    log::debug!("LM iteration {}: trial point rejected: {}", iterations, e);
                    None
                }
            };

            let status = match accepted {
                Some((trial_residuals, trial_cost)) => {
                    let reduction = (cost - trial_cost) / cost;
                    log::debug!(
                        "LM iteration {}: cost {:.6e} -> {:.6e} (lambda {:.1e})",
                        iterations,
                        cost,
                        trial_cost,
                        lambda
                    );

                    params = trial;
                    residuals = trial_residuals;
                    cost = trial_cost;
                    lambda = (lambda * self.config.lambda_down_factor).max(self.config.min_lambda);

                    if reduction <= self.config.ftol {
                        IterationStatus::Converged(format!(
                            "Cost convergence: |df|/|f| = {:.2e} <= {:.2e}",
                            reduction, self.config.ftol
                        ))
                    } else if small_step {
                        IterationStatus::Converged(format!(
                            "Parameter convergence: |dx| = {:.2e}",
                            step_norm
                        ))
                    } else {
                        match self.jacobian(problem, &params, &residuals, &mut func_evals) {
                            Ok(next) => {
                                jacobian = next;
                                IterationStatus::Continue
                            }
                            Err(e) => IterationStatus::Failed(format!("Jacobian evaluation failed: {}", e)),
                        }
                    }
                }
                None if small_step => IterationStatus::Converged(format!(
                    "Parameter convergence: no improvement within |dx| = {:.2e}",
                    step_norm
                )),
                None => {
                    lambda *= self.config.lambda_up_factor;
                    if lambda > self.config.max_lambda {
                        IterationStatus::Failed(
                            "Failed to decrease cost, and lambda reached maximum".to_string(),
                        )
                    } else {
                        IterationStatus::Continue
                    }
                }
            };

            match status {
                IterationStatus::Continue => (),
                done => break done,
            }
        };

        let (success, message) = match status {
            IterationStatus::Converged(message) => (true, message),
            IterationStatus::Failed(message) => (false, message),
            IterationStatus::Continue => (false, "Optimization interrupted".to_string()),
        };

        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            success,
            message,
        })
    }

    fn jacobian<P: Problem>(
        &self,
        problem: &P,
        params: &Array1<f64>,
        residuals: &Array1<f64>,
        func_evals: &mut usize,
    ) -> Result<Array2<f64>> {
        if problem.has_custom_jacobian() {
            return problem.jacobian(params);
        }
        *func_evals += params.len();
        finite_difference::jacobian_at(problem, params, residuals, Some(self.config.jacobian_epsilon))
    }

    /// Solve `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr`, or `None` if the system is singular.
    fn solve_step(&self, jtj: &Array2<f64>, gradient: &Array1<f64>, lambda: f64) -> Option<Array1<f64>> {
        let n = gradient.len();
        let a = DMatrix::from_fn(n, n, |i, j| {
            let value = jtj[[i, j]];
            if i == j {
                value + lambda * value.max(DIAG_FLOOR)
            } else {
                value
            }
        });
        let b = DVector::from_fn(n, |i, _| -gradient[i]);

        let solution = match self.config.decomposition_method {
            DecompositionMethod::Cholesky => a.cholesky().map(|c| c.solve(&b)),
            DecompositionMethod::SVD => solve_svd(a, &b),
            DecompositionMethod::Auto => match a.clone().cholesky() {
                Some(c) => Some(c.solve(&b)),
                None => solve_svd(a, &b),
            },
        }?;

        if solution.iter().all(|v| v.is_finite()) {
            Some(solution.iter().copied().collect())
        } else {
            None
        }
    }
}

fn solve_svd(a: DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    a.svd(true, true).solve(b, SVD_EPS).ok()
}

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

fn euclidean_norm(values: &Array1<f64>) -> f64 {
    sum_of_squares(values).sqrt()
}

/// Largest cosine between the residual vector and a Jacobian column.
fn scaled_gradient_norm(jtj: &Array2<f64>, gradient: &Array1<f64>, residual_norm: f64) -> f64 {
    gradient
        .iter()
        .enumerate()
        .map(|(j, g)| {
            let column_norm = jtj[[j, j]].sqrt();
            if column_norm > 0.0 {
                g.abs() / (column_norm * residual_norm)
            } else {
                0.0
            }
        })
        .fold(0.0, f64::max)
}
