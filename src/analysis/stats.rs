/// Arithmetic mean. Empty input yields `0` instead of `NaN`.
pub fn mean<T>(values: &[T]) -> f64
where
    T: Copy + Into<f64>,
{
    if values.is_empty() {
        return 0.;
    }
    let sum: f64 = values.iter().map(|v| (*v).into()).sum();
    sum / values.len() as f64
}

/// Mean of integer seconds. `i64` has no `Into<f64>`, so the values are converted first.
pub fn mean_seconds(values: &[i64]) -> f64 {
    mean(&values.iter().map(|v| *v as f64).collect::<Vec<_>>())
}
