//! Descriptive statistics over timing samples.
//!
//! All helpers return `None` for inputs where the statistic is undefined
//! instead of producing `NaN`.

use serde::Serialize;

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Standard deviation dividing by `n`.
pub fn population_std_dev(samples: &[f64]) -> Option<f64> {
    let avg = mean(samples)?;
    let variance =
        samples.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / samples.len() as f64;
    Some(variance.sqrt())
}

/// Standard deviation dividing by `n - 1`; undefined below two samples.
pub fn sample_std_dev(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let avg = mean(samples)?;
    let variance =
        samples.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Linearly interpolated quantile of an ascending slice, `q` in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let low = *sorted.get(lower)?;
    let high = *sorted.get(upper)?;
    Some(low + (high - low) * (position - lower as f64))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl Describe {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            count: sorted.len(),
            mean: mean(&sorted)?,
            std: sample_std_dev(&sorted),
            min: *sorted.first()?,
            p25: quantile(&sorted, 0.25)?,
            p50: quantile(&sorted, 0.5)?,
            p75: quantile(&sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }
}
