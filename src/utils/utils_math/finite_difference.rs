use nalgebra::DVector;
use rayon::prelude::*;

pub struct FiniteDifferenceUtils;
impl FiniteDifferenceUtils {
    /// Forward difference gradient of a scalar function over the given columns; every other entry is
    /// zero.  Columns are perturbed in parallel, so the function must be safe to call from several
    /// threads at once.
    pub fn partial_gradient<F>(f: F, x: &[f64], columns: &[usize], step: f64) -> Vec<f64>
        where F: Fn(&[f64]) -> f64 + Sync {
        let f0 = f(x);

        let partials: Vec<(usize, f64)> = columns.par_iter().map(|&i| {
            let mut x_h = x.to_vec();
            x_h[i] += step;
            (i, (f(&x_h) - f0) / step)
        }).collect();

        let mut out = vec![0.0; x.len()];
        for (i, d) in partials { out[i] = d; }
        out
    }

    /// Computes J(x)^T d for a vector valued function without materializing J, by differencing the
    /// scalar function x -> d . f(x).  Only the given columns of J are computed.
    pub fn jacobian_transpose_product<F>(f: F, x: &[f64], d: &[f64], columns: &[usize], step: f64) -> Vec<f64>
        where F: Fn(&[f64]) -> DVector<f64> + Sync {
        let d = DVector::from_column_slice(d);
        return Self::partial_gradient(|u: &[f64]| f(u).dot(&d), x, columns, step);
    }

    /// Backward difference of two consecutive samples, e.g. an acceleration from two velocities.
    pub fn backward_difference(current: &DVector<f64>, previous: &DVector<f64>, step_time: f64) -> DVector<f64> {
        (current - previous) / step_time
    }
}
