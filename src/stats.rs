//! Summary statistics over per-patient outcome sequences.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{ModelError, Result};

/// Distribution statistics for one outcome sequence.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStat {
    pub name: String,
    pub n: usize,
    pub mean: f64,
    /// Sample variance (n − 1 denominator); zero for a single observation.
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    #[serde(skip)]
    sorted: Vec<f64>,
}

impl SummaryStat {
    /// `None` for an empty sequence.
    pub fn new(name: impl Into<String>, data: &[f64]) -> Option<Self> {
        let mut sorted = data.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let mean = mean(&sorted);
        let variance = sample_variance(&sorted, mean);
        Some(SummaryStat {
            name: name.into(),
            n: sorted.len(),
            mean,
            variance,
            std_dev: variance.sqrt(),
            min,
            max,
            sorted,
        })
    }

    pub fn from_counts(name: impl Into<String>, data: &[u32]) -> Option<Self> {
        let values: Vec<f64> = data.iter().map(|&x| f64::from(x)).collect();
        Self::new(name, &values)
    }

    pub fn std_err(&self) -> f64 {
        self.std_dev / (self.n as f64).sqrt()
    }

    /// Linear-interpolated percentile, `q` in `[0, 1]`.
    pub fn percentile(&self, q: f64) -> f64 {
        interpolate_sorted(&self.sorted, q)
    }

    /// Student-t confidence interval for the mean at level `1 − alpha`.
    /// Collapses to the mean for a single observation.
    pub fn t_confidence_interval(&self, alpha: f64) -> Result<(f64, f64)> {
        check_alpha(alpha)?;
        if self.n < 2 {
            return Ok((self.mean, self.mean));
        }
        let half = t_quantile(alpha, (self.n - 1) as f64) * self.std_err();
        Ok((self.mean - half, self.mean + half))
    }

    /// Central `1 − alpha` interval of the observations themselves.
    pub fn percentile_interval(&self, alpha: f64) -> Result<(f64, f64)> {
        check_alpha(alpha)?;
        Ok((self.percentile(alpha / 2.0), self.percentile(1.0 - alpha / 2.0)))
    }
}

/// Difference of means between two independent samples, `x − y_ref`.
#[derive(Debug, Clone, Serialize)]
pub struct DifferenceStat {
    pub name: String,
    pub mean: f64,
    pub std_err: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub dof: f64,
}

impl DifferenceStat {
    /// `None` when either sample is empty.
    pub fn independent(name: impl Into<String>, x: &[f64], y_ref: &[f64]) -> Option<Self> {
        let sx = SummaryStat::new("x", x)?;
        let sy = SummaryStat::new("y", y_ref)?;
        let vx = sx.variance / sx.n as f64;
        let vy = sy.variance / sy.n as f64;
        let se2 = vx + vy;

        let mut dof_den = 0.0;
        if sx.n > 1 {
            dof_den += vx.powi(2) / (sx.n - 1) as f64;
        }
        if sy.n > 1 {
            dof_den += vy.powi(2) / (sy.n - 1) as f64;
        }
        let dof = if dof_den > 0.0 { se2.powi(2) / dof_den } else { f64::INFINITY };

        Some(DifferenceStat {
            name: name.into(),
            mean: sx.mean - sy.mean,
            std_err: se2.sqrt(),
            dof,
        })
    }

    pub fn t_confidence_interval(&self, alpha: f64) -> Result<(f64, f64)> {
        check_alpha(alpha)?;
        if self.std_err == 0.0 {
            return Ok((self.mean, self.mean));
        }
        let half = t_quantile(alpha, self.dof) * self.std_err;
        Ok((self.mean - half, self.mean + half))
    }
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// `n − 1` denominator; zero below two observations.
fn sample_variance(data: &[f64], mean: f64) -> f64 {
    match data.len() {
        0 | 1 => 0.0,
        n => data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64,
    }
}

/// Value at rank `q · (n − 1)` of a non-empty ascending slice, interpolating
/// between neighbouring ranks.
fn interpolate_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    let weight = rank - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * weight
}

fn check_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidAlpha(alpha))
    }
}

/// Two-sided critical value `t_{1 − alpha/2, dof}`.
fn t_quantile(alpha: f64, dof: f64) -> f64 {
    let p = 1.0 - alpha / 2.0;
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(t) if dof.is_finite() => t.inverse_cdf(p),
        // Infinite or degenerate dof: normal limit.
        _ => normal_quantile(p),
    }
}

fn normal_quantile(p: f64) -> f64 {
    use statrs::distribution::Normal;
    Normal::new(0.0, 1.0).map(|n| n.inverse_cdf(p)).unwrap_or(f64::NAN)
}
