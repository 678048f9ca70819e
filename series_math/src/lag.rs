//! Positional lags

/// Shift a series forward by `periods` positions.
///
/// `lag(x, k)[i] == x[i - k]` for `i >= k`; the first `k` positions are `None`.
pub fn lag(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    let mut shifted = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i < periods {
            shifted.push(None);
        } else {
            shifted.push(values[i - periods]);
        }
    }
    shifted
}
