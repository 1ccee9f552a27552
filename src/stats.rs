//! Elementary statistics over paired numeric series.
//!
//! Every function is pure: it borrows its input, allocates its own result and
//! reports degenerate input as a [`StatsError`] instead of NaN or infinity.

use crate::error::{Series, StatsError};
use crate::types::{HourlyRecord, Metric};

/// Ordinary least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    x_min: f64,
    x_max: f64,
}

impl LinearFit {
    /// Predicted `y` at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// End points of the fitted line over the sampled `x` range.
    ///
    /// Enough to draw a two-point trend overlay; callers needing the full
    /// fitted curve should call [`LinearFit::predict`] per point.
    pub fn endpoints(&self) -> [(f64, f64); 2] {
        [
            (self.x_min, self.predict(self.x_min)),
            (self.x_max, self.predict(self.x_max)),
        ]
    }
}

/// Pearson correlation coefficient and its square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub r: f64,
    pub r2: f64,
}

impl Correlation {
    fn from_r(r: f64) -> Self {
        Self { r, r2: r * r }
    }
}

/// Arithmetic mean of `values`.
pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    check_finite(values)?;

    let mut mean = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (idx, &val) in values.iter().enumerate() {
        // dividing both terms first keeps the update finite near f64::MAX
        let n_vals = (idx + 1) as f64;
        mean += val / n_vals - mean / n_vals;
        min = min.min(val);
        max = max.max(val);
    }

    // rounding can step outside the sample range by an ulp
    Ok(mean.clamp(min, max))
}

/// Fit a straight line to the pairs `(x[i], y[i])` with the closed-form normal equations.
///
/// The sums are accumulated over `x / x_scale` and `y / y_scale`, with power-of-two
/// scales, so they neither overflow nor underflow; the fit is scaled back afterwards.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit, StatsError> {
    check_pairs(x, y)?;

    let (x_min, x_max) = min_max(x);
    if x_min == x_max {
        return Err(StatsError::DegenerateInput);
    }

    let x_scale = pow2_scale(x);
    let y_scale = pow2_scale(y);

    let n = x.len() as f64;
    let mut x_sum = 0.0;
    let mut x2_sum = 0.0;
    let mut y_sum = 0.0;
    let mut xy_sum = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let xi = xi / x_scale;
        let yi = yi / y_scale;
        x_sum += xi;
        x2_sum += xi * xi;
        y_sum += yi;
        xy_sum += xi * yi;
    }

    let denom = n * x2_sum - x_sum * x_sum;
    if denom == 0.0 {
        return Err(StatsError::DegenerateInput);
    }

    let slope = (n * xy_sum - x_sum * y_sum) / denom;
    let intercept = (y_sum - slope * x_sum) / n;

    let fit = LinearFit {
        slope: slope * (y_scale / x_scale),
        intercept: intercept * y_scale,
        x_min,
        x_max,
    };

    let [(_, y0), (_, y1)] = fit.endpoints();
    if [fit.slope, fit.intercept, y0, y1].iter().any(|val| !val.is_finite()) {
        return Err(StatsError::Overflow);
    }

    Ok(fit)
}

/// Pearson correlation between `x` and `y`.
///
/// `r2` is always derived from `r`, so the two never disagree.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Result<Correlation, StatsError> {
    check_pairs(x, y)?;

    for (series, vals) in [(Series::X, x), (Series::Y, y)] {
        let (min, max) = min_max(vals);
        if min == max {
            return Err(StatsError::ZeroVariance { series });
        }
    }

    // r does not depend on the scale of either series
    let x_scale = pow2_scale(x);
    let y_scale = pow2_scale(y);
    let x: Vec<_> = x.iter().map(|&xi| xi / x_scale).collect();
    let y: Vec<_> = y.iter().map(|&yi| yi / y_scale).collect();

    let x_mean = mean(&x)?;
    let y_mean = mean(&y)?;

    let mut cov_sum = 0.0;
    let mut x_diff_2_sum = 0.0;
    let mut y_diff_2_sum = 0.0;
    for (&xi, &yi) in x.iter().zip(&y) {
        let x_diff = xi - x_mean;
        let y_diff = yi - y_mean;
        cov_sum += x_diff * y_diff;
        x_diff_2_sum += x_diff * x_diff;
        y_diff_2_sum += y_diff * y_diff;
    }

    if x_diff_2_sum == 0.0 {
        return Err(StatsError::ZeroVariance { series: Series::X });
    }
    if y_diff_2_sum == 0.0 {
        return Err(StatsError::ZeroVariance { series: Series::Y });
    }

    let r = cov_sum / (x_diff_2_sum * y_diff_2_sum).sqrt();
    if !r.is_finite() {
        return Err(StatsError::Overflow);
    }

    Ok(Correlation::from_r(r.clamp(-1.0, 1.0)))
}

/// Mean of one metric over an hourly series.
///
/// The series is expected to be filtered to a single route and day type already.
pub fn hourly_average(series: &[HourlyRecord], metric: Metric) -> Result<f64, StatsError> {
    let vals: Vec<_> = series.iter().map(|rec| metric.value(rec)).collect();
    mean(&vals)
}

fn check_pairs(x: &[f64], y: &[f64]) -> Result<(), StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(StatsError::InsufficientData { len: x.len() });
    }
    check_finite(x)?;
    check_finite(y)
}

fn check_finite(vals: &[f64]) -> Result<(), StatsError> {
    if vals.iter().any(|val| !val.is_finite()) {
        return Err(StatsError::NonFiniteInput);
    }
    Ok(())
}

/// Power of two close to the largest magnitude in `vals`.
///
/// Dividing by a power of two is exact, so scaled sums keep the precision of
/// the unscaled ones.
fn pow2_scale(vals: &[f64]) -> f64 {
    let max_abs = vals.iter().fold(0.0_f64, |acc, val| acc.max(val.abs()));
    if max_abs == 0.0 {
        return 1.0;
    }
    let exp = (max_abs.log2().floor() as i32).clamp(-1000, 1000);
    f64::from_bits(((exp + 1023) as u64) << 52)
}

fn min_max(vals: &[f64]) -> (f64, f64) {
    vals.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &val| {
            (min.min(val), max.max(val))
        })
}
