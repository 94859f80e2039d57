//! Empirical growth-order classification of timing samples.
//!
//! Every family is fitted with a single scale coefficient `c` so that
//! `duration ≈ c × f(size)`; the family whose predictions have the smallest
//! mean absolute error wins. Durations are taken in microseconds and
//! logarithms are base 10.

use crate::domain::model::TimingSample;
use crate::utils::error::{OptimizerError, Result};
use serde::Serialize;
use std::fmt;

/// Error recorded for a family whose shape function overflowed.
pub const OVERFLOW_ERROR: f64 = f64::MAX;

/// Fewest valid samples a classification needs.
pub const MIN_SAMPLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GrowthFamily {
    #[serde(rename = "O(1)")]
    Constant,
    #[serde(rename = "O(log n)")]
    Logarithmic,
    #[serde(rename = "O(n)")]
    Linear,
    #[serde(rename = "O(n log n)")]
    Linearithmic,
    #[serde(rename = "O(n^2)")]
    Quadratic,
    #[serde(rename = "O(n^2 log n)")]
    QuadraticLog,
    #[serde(rename = "O(n^3)")]
    Cubic,
    #[serde(rename = "O(2^n)")]
    Exponential,
}

impl GrowthFamily {
    /// Evaluation order; ties on error go to the earlier family.
    pub const ALL: [GrowthFamily; 8] = [
        GrowthFamily::Constant,
        GrowthFamily::Logarithmic,
        GrowthFamily::Linear,
        GrowthFamily::Linearithmic,
        GrowthFamily::Quadratic,
        GrowthFamily::QuadraticLog,
        GrowthFamily::Cubic,
        GrowthFamily::Exponential,
    ];

    pub fn notation(self) -> &'static str {
        match self {
            GrowthFamily::Constant => "O(1)",
            GrowthFamily::Logarithmic => "O(log n)",
            GrowthFamily::Linear => "O(n)",
            GrowthFamily::Linearithmic => "O(n log n)",
            GrowthFamily::Quadratic => "O(n^2)",
            GrowthFamily::QuadraticLog => "O(n^2 log n)",
            GrowthFamily::Cubic => "O(n^3)",
            GrowthFamily::Exponential => "O(2^n)",
        }
    }

    /// The family's shape function `f(n)`. May return infinity for
    /// [`GrowthFamily::Exponential`] once `n` passes 1023.
    pub fn shape(self, n: usize) -> f64 {
        let n = n as f64;
        match self {
            GrowthFamily::Constant => 1.0,
            GrowthFamily::Logarithmic => n.log10(),
            GrowthFamily::Linear => n,
            GrowthFamily::Linearithmic => n * n.log10(),
            GrowthFamily::Quadratic => n * n,
            GrowthFamily::QuadraticLog => n * n * n.log10(),
            GrowthFamily::Cubic => n * n * n,
            GrowthFamily::Exponential => n.exp2(),
        }
    }

    /// Fast-growing families take their coefficient from the two largest
    /// samples only, where small-size noise no longer dominates.
    pub fn fits_tail(self) -> bool {
        matches!(self, GrowthFamily::Cubic | GrowthFamily::Exponential)
    }
}

impl fmt::Display for GrowthFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FamilyFit {
    pub family: GrowthFamily,
    pub coefficient: f64,
    pub mean_absolute_error: f64,
    /// The shape function overflowed; `mean_absolute_error` holds
    /// [`OVERFLOW_ERROR`].
    pub overflowed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub best: GrowthFamily,
    /// One entry per family, in [`GrowthFamily::ALL`] order.
    pub fits: Vec<FamilyFit>,
    pub samples_used: usize,
    pub discarded: usize,
}

impl Classification {
    pub fn fit_for(&self, family: GrowthFamily) -> Option<&FamilyFit> {
        self.fits.iter().find(|fit| fit.family == family)
    }
}

/// Fits every growth family to the samples and picks the least-error one.
///
/// Samples with a size below 2 or a non-positive duration are dropped with a
/// warning. Fewer than [`MIN_SAMPLES`] survivors is an
/// [`OptimizerError::InsufficientData`] error.
pub fn classify(samples: &[TimingSample]) -> Result<Classification> {
    let mut points: Vec<(usize, f64)> = Vec::with_capacity(samples.len());
    let mut discarded = 0;

    for sample in samples {
        let duration = sample.duration_us();
        if sample.size < 2 || duration <= 0.0 {
            tracing::warn!(
                "Discarding timing sample (size {}, {:.3}µs)",
                sample.size,
                duration
            );
            discarded += 1;
            continue;
        }
        points.push((sample.size, duration));
    }

    if points.len() < MIN_SAMPLES {
        return Err(OptimizerError::InsufficientData {
            valid: points.len(),
            required: MIN_SAMPLES,
        });
    }

    // 尾部拟合依赖按规模排序
    points.sort_by_key(|&(size, _)| size);

    let fits: Vec<FamilyFit> = GrowthFamily::ALL
        .iter()
        .map(|&family| fit_family(family, &points))
        .collect();

    let best = fits
        .iter()
        .fold(None::<&FamilyFit>, |best, fit| match best {
            Some(current) if current.mean_absolute_error <= fit.mean_absolute_error => {
                Some(current)
            }
            _ => Some(fit),
        })
        .map(|fit| fit.family)
        .unwrap_or(GrowthFamily::Constant);

    tracing::debug!("Growth fits: {:?}", fits);

    Ok(Classification {
        best,
        fits,
        samples_used: points.len(),
        discarded,
    })
}

fn fit_family(family: GrowthFamily, points: &[(usize, f64)]) -> FamilyFit {
    let shapes: Vec<f64> = points.iter().map(|&(size, _)| family.shape(size)).collect();

    if shapes.iter().any(|shape| !shape.is_finite() || *shape <= 0.0) {
        tracing::debug!("{} shape overflowed, excluding family", family);
        return overflowed(family);
    }

    let ratios: Vec<f64> = points
        .iter()
        .zip(&shapes)
        .map(|(&(_, duration), shape)| duration / shape)
        .collect();

    let fitted = if family.fits_tail() {
        &ratios[ratios.len() - 2..]
    } else {
        &ratios[..]
    };
    let coefficient = fitted.iter().sum::<f64>() / fitted.len() as f64;

    let total_error: f64 = points
        .iter()
        .zip(&shapes)
        .map(|(&(_, duration), shape)| (coefficient * shape - duration).abs())
        .sum();
    let mean_absolute_error = total_error / points.len() as f64;

    if !coefficient.is_finite() || !mean_absolute_error.is_finite() {
        return overflowed(family);
    }

    FamilyFit {
        family,
        coefficient,
        mean_absolute_error,
        overflowed: false,
    }
}

fn overflowed(family: GrowthFamily) -> FamilyFit {
    FamilyFit {
        family,
        coefficient: 0.0,
        mean_absolute_error: OVERFLOW_ERROR,
        overflowed: true,
    }
}

/// Number of non-empty subsets of `n` items, `2^n - 1`, or `None` when it
/// does not fit in a `u128`.
pub fn subset_count(n: usize) -> Option<u128> {
    let exponent = u32::try_from(n).ok()?;
    1u128.checked_shl(exponent).map(|total| total - 1).or_else(|| {
        // 2^128 - 1 仍可表示
        (n == 128).then_some(u128::MAX)
    })
}
