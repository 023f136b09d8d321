use nalgebra::DVector;

pub struct SimpleInterpolationUtils;
impl SimpleInterpolationUtils {
    /// Point at fraction `u` (0 = start, 1 = end) on the segment between two vectors.
    pub fn linear_interpolation_at(start_point: &DVector<f64>, end_point: &DVector<f64>, u: f64) -> DVector<f64> {
        start_point + u * (end_point - start_point)
    }
}

/// Sample times `range_start, range_start + step_size, ...` up to and including `range_stop`.
/// The last sample is always exactly `range_stop`.
pub fn get_range(range_start: f64, range_stop: f64, step_size: f64) -> Vec<f64> {
    let mut out_range = Vec::new();
    out_range.push(range_start);
    if step_size <= 0.0 || range_stop <= range_start { return out_range; }

    let mut i = 1;
    loop {
        let t = range_start + i as f64 * step_size;
        // samples closer than a small fraction of the step to the end are absorbed by it
        if t >= range_stop - 1e-9 * step_size { break; }
        out_range.push(t);
        i += 1;
    }

    out_range.push(range_stop);

    out_range
}
