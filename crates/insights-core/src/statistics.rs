//! Small numeric helpers shared by the aggregator and the view builder.

// ── Mean ──────────────────────────────────────────────────────────────────────

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// ── Percent change ────────────────────────────────────────────────────────────

/// `(current - previous) / |previous| * 100`.
///
/// Returns `None` when `previous` is zero.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}

// ── Pearson ───────────────────────────────────────────────────────────────────

/// Pearson product-moment correlation of two equal-length samples.
///
/// Returns `None` when the lengths differ, fewer than two pairs exist,
/// either side has zero variance, or a value is not finite. The result is
/// clamped to `[-1, 1]`.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    // r is scale-invariant; unit-peak samples keep the squared sums finite.
    let x = to_unit_peak(x)?;
    let y = to_unit_peak(y)?;
    let mean_x = mean(&x)?;
    let mean_y = mean(&y)?;

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;

    for (xi, yi) in x.iter().zip(&y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    if sum_sq_x == 0.0 || sum_sq_y == 0.0 {
        return None;
    }

    let r = numerator / (sum_sq_x.sqrt() * sum_sq_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Divide every value by the largest magnitude in the slice.
fn to_unit_peak(values: &[f64]) -> Option<Vec<f64>> {
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let peak = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if peak == 0.0 {
        return Some(values.to_vec());
    }
    Some(values.iter().map(|v| v / peak).collect())
}

/// `true` when every value equals the first (or the slice is empty).
pub fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}
