//! Damped Newton iteration for two equations in two unknowns.
//!
//! Used to invert flux-surface parametrisations (a, θ) → (R, Z). The
//! Jacobian is formed by central differences; each step is halved until
//! the residual decreases.

/// Central-difference step relative to the variable scale.
const FD_STEP: f64 = 1e-7;

/// Maximum number of step halvings per iteration.
const MAX_BACKTRACK: usize = 12;

/// Determinant below which the Jacobian is treated as singular.
const SINGULAR_DET: f64 = 1e-300;

#[derive(Debug, Clone, Copy)]
pub struct NewtonOptions {
    pub tolerance: f64,
    pub max_iter: usize,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        NewtonOptions {
            tolerance: 1e-10,
            max_iter: 50,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewtonResult {
    pub x: [f64; 2],
    /// Value of the map at `x`.
    pub value: [f64; 2],
    /// Euclidean distance |f(x) - target|.
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Solve 2×2 `m · d = rhs` by Cramer's rule.
pub fn solve_2x2(m: [[f64; 2]; 2], rhs: [f64; 2]) -> Option<[f64; 2]> {
    let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
    if det.abs() < SINGULAR_DET || !det.is_finite() {
        return None;
    }
    Some([
        (rhs[0] * m[1][1] - m[0][1] * rhs[1]) / det,
        (m[0][0] * rhs[1] - rhs[0] * m[1][0]) / det,
    ])
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

/// Central-difference Jacobian `J[i][j] = ∂f_i/∂x_j`.
pub fn jacobian_fd<F>(f: &F, x: [f64; 2]) -> [[f64; 2]; 2]
where
    F: Fn(f64, f64) -> (f64, f64),
{
    let mut jac = [[0.0; 2]; 2];
    for j in 0..2 {
        let h = FD_STEP * x[j].abs().max(1.0);
        let mut xp = x;
        let mut xm = x;
        xp[j] += h;
        xm[j] -= h;
        let fp = f(xp[0], xp[1]);
        let fm = f(xm[0], xm[1]);
        jac[0][j] = (fp.0 - fm.0) / (2.0 * h);
        jac[1][j] = (fp.1 - fm.1) / (2.0 * h);
    }
    jac
}

/// Find `x` with `f(x) = target`, starting at `initial`. `project` maps an
/// iterate back into the admissible domain after each step.
pub fn solve_2d<F, P>(
    f: F,
    target: [f64; 2],
    initial: [f64; 2],
    project: P,
    opts: NewtonOptions,
) -> NewtonResult
where
    F: Fn(f64, f64) -> (f64, f64),
    P: Fn([f64; 2]) -> [f64; 2],
{
    let eval = |x: [f64; 2]| {
        let v = f(x[0], x[1]);
        [v.0, v.1]
    };

    let mut x = project(initial);
    let mut value = eval(x);
    let mut residual = distance(value, target);
    let mut iterations = 0;

    for iter in 0..opts.max_iter {
        iterations = iter;
        if residual <= opts.tolerance {
            return NewtonResult {
                x,
                value,
                residual,
                iterations: iter,
                converged: true,
            };
        }

        let jac = jacobian_fd(&f, x);
        let rhs = [target[0] - value[0], target[1] - value[1]];
        let Some(dx) = solve_2x2(jac, rhs) else {
            break;
        };

        let mut lambda = 1.0;
        let mut accepted = false;
        for _ in 0..MAX_BACKTRACK {
            let trial = project([x[0] + lambda * dx[0], x[1] + lambda * dx[1]]);
            let trial_value = eval(trial);
            let trial_residual = distance(trial_value, target);
            if trial_residual < residual {
                x = trial;
                value = trial_value;
                residual = trial_residual;
                accepted = true;
                break;
            }
            lambda *= 0.5;
        }
        if !accepted {
            break;
        }
        iterations = iter + 1;
    }

    NewtonResult {
        x,
        value,
        residual,
        iterations,
        converged: residual <= opts.tolerance,
    }
}
