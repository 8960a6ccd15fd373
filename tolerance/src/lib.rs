/// Scaled local error of one component for embedded Runge-Kutta pairs.
///
/// `x` is the accepted (higher order) solution, `x_prev` the state at the start
/// of the step and `x_tilde` the embedded estimate. The difference is scaled by
/// `abs_tol + rel_tol * max(|x|, |x_prev|)`, so a value <= 1.0 is within tolerance.
pub fn compute_error(x: f64, x_prev: f64, x_tilde: f64, rel_tol: f64, abs_tol: f64) -> f64 {
    let scale = abs_tol + rel_tol * x.abs().max(x_prev.abs());
    (x - x_tilde).abs() / scale
}

/// Root mean square of already scaled component errors.
pub fn rms(errors: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = errors.len();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = errors.map(|e| e * e).sum();
    (sum / n as f64).sqrt()
}
