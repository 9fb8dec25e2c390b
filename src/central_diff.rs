//! Numerical derivative by central difference, used to check analytic derivatives.
//! See https://en.wikipedia.org/wiki/Finite_difference

/// Settings for [`central_difference`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CentralDifference {
    /// Index of the argument to derive with respect to
    pub arg: usize,
    /// Half width of the perturbation
    pub epsilon: f64,
}

impl Default for CentralDifference {
    fn default() -> Self {
        Self {
            arg: 0,
            epsilon: 1e-6,
        }
    }
}

impl CentralDifference {
    pub fn arg(self, arg: usize) -> Self {
        Self { arg, ..self }
    }

    pub fn epsilon(self, epsilon: f64) -> Self {
        Self { epsilon, ..self }
    }

    pub fn derive(&self, f: impl Fn(&[f64]) -> f64, vals: &[f64]) -> f64 {
        central_difference(f, vals, self.arg, self.epsilon)
    }
}

/// Computes an approximation to the derivative of `f` with respect to one argument.
///
/// `f'_arg(x) ≈ (f(.., x_arg + ε, ..) - f(.., x_arg - ε, ..)) / 2ε`
///
/// The error is proportional to `epsilon²` for smooth `f`.
///
/// # Panics
///
/// If `arg` is not a valid index into `vals`.
pub fn central_difference(
    f: impl Fn(&[f64]) -> f64,
    vals: &[f64],
    arg: usize,
    epsilon: f64,
) -> f64 {
    let mut vals1 = vals.to_vec();
    let mut vals2 = vals.to_vec();
    vals1[arg] += epsilon;
    vals2[arg] -= epsilon;
    (f(&vals1) - f(&vals2)) / (2. * epsilon)
}
