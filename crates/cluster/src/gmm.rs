// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Diagonal-covariance Gaussian mixture with BIC model selection.
//!
//! Initialisation is deterministic (evenly spaced points become the
//! initial means), so a fixed input always yields the same assignment.

const MAX_EM_ITERATIONS: usize = 100;
const CONVERGENCE_TOL: f64 = 1e-6;
const VARIANCE_FLOOR: f64 = 1e-6;
const WEIGHT_FLOOR: f64 = 1e-10;

/// A fitted mixture: per-point component assignments and the model's BIC.
#[derive(Debug, Clone)]
pub(crate) struct MixtureFit {
    /// Highest-probability component per point.
    pub assignments: Vec<usize>,
    /// Number of components fitted.
    pub components: usize,
    /// Bayesian information criterion (lower is better).
    pub bic: f64,
}

/// Fit mixtures for every candidate component count in `1..=max_k` and
/// return the assignment of the BIC-minimal model.
pub(crate) fn select_components(points: &[Vec<f64>], max_k: usize) -> Vec<usize> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }

    let mut best: Option<MixtureFit> = None;
    for k in 1..=max_k.min(n) {
        let fit = fit_mixture(points, k);
        let better = match &best {
            None => true,
            Some(current) => fit.bic < current.bic,
        };
        if better {
            best = Some(fit);
        }
    }

    best.map(|fit| fit.assignments).unwrap_or_default()
}

/// Run EM for a fixed component count.
pub(crate) fn fit_mixture(points: &[Vec<f64>], k: usize) -> MixtureFit {
    let n = points.len();
    let d = points[0].len();

    // Evenly spaced points seed the means; the global per-dimension
    // variance seeds every component's covariance.
    let mut means: Vec<Vec<f64>> = (0..k)
        .map(|i| points[(i * n) / k].clone())
        .collect();
    let global_var = global_variance(points);
    let mut variances: Vec<Vec<f64>> = vec![global_var; k];
    let mut weights: Vec<f64> = vec![1.0 / k as f64; k];

    let mut responsibilities = vec![vec![0.0; k]; n];
    let mut log_likelihood = f64::NEG_INFINITY;

    for _ in 0..MAX_EM_ITERATIONS {
        // E step.
        let mut new_ll = 0.0;
        for (i, point) in points.iter().enumerate() {
            let log_probs: Vec<f64> = (0..k)
                .map(|j| weights[j].ln() + log_gaussian(point, &means[j], &variances[j]))
                .collect();
            let log_norm = log_sum_exp(&log_probs);
            new_ll += log_norm;
            for j in 0..k {
                responsibilities[i][j] = (log_probs[j] - log_norm).exp();
            }
        }

        // M step.
        for j in 0..k {
            let total: f64 = responsibilities.iter().map(|r| r[j]).sum();
            weights[j] = (total / n as f64).max(WEIGHT_FLOOR);

            if total > 0.0 {
                for dim in 0..d {
                    let mean: f64 = points
                        .iter()
                        .zip(responsibilities.iter())
                        .map(|(p, r)| r[j] * p[dim])
                        .sum::<f64>()
                        / total;
                    let var: f64 = points
                        .iter()
                        .zip(responsibilities.iter())
                        .map(|(p, r)| r[j] * (p[dim] - mean).powi(2))
                        .sum::<f64>()
                        / total;
                    means[j][dim] = mean;
                    variances[j][dim] = var.max(VARIANCE_FLOOR);
                }
            }
        }

        if (new_ll - log_likelihood).abs() < CONVERGENCE_TOL {
            log_likelihood = new_ll;
            break;
        }
        log_likelihood = new_ll;
    }

    let assignments = responsibilities
        .iter()
        .map(|r| {
            r.iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(j, _)| j)
                .unwrap_or(0)
        })
        .collect();

    // Free parameters: k means and k diagonal covariances of dimension d,
    // plus k - 1 independent weights.
    let params = (2 * k * d + k - 1) as f64;
    let bic = -2.0 * log_likelihood + params * (n as f64).ln();

    MixtureFit {
        assignments,
        components: k,
        bic,
    }
}

fn global_variance(points: &[Vec<f64>]) -> Vec<f64> {
    let n = points.len() as f64;
    let d = points[0].len();

    let mut mean = vec![0.0; d];
    for point in points {
        for (m, v) in mean.iter_mut().zip(point.iter()) {
            *m += v / n;
        }
    }

    let mut var = vec![0.0; d];
    for point in points {
        for dim in 0..d {
            var[dim] += (point[dim] - mean[dim]).powi(2) / n;
        }
    }
    for v in &mut var {
        *v = v.max(VARIANCE_FLOOR);
    }
    var
}

fn log_gaussian(point: &[f64], mean: &[f64], variance: &[f64]) -> f64 {
    const LN_2PI: f64 = 1.837_877_066_409_345_5;
    point
        .iter()
        .zip(mean.iter())
        .zip(variance.iter())
        .map(|((x, m), v)| -0.5 * (LN_2PI + v.ln() + (x - m).powi(2) / v))
        .sum()
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    // A degenerate blob of repeated points: splitting it never improves
    // the likelihood, so the BIC comparisons below are exact.
    fn blob(center: f64, count: usize) -> Vec<Vec<f64>> {
        (0..count).map(|_| vec![center, -center]).collect()
    }

    #[test]
    fn test_single_component() {
        let points = blob(0.0, 20);
        let fit = fit_mixture(&points, 1);
        assert_eq!(fit.components, 1);
        assert!(fit.assignments.iter().all(|&a| a == 0));
    }

    #[test]
    fn test_two_separated_blobs() {
        let mut points = blob(0.0, 25);
        points.extend(blob(10.0, 25));

        let assignments = select_components(&points, 5);
        assert_eq!(assignments.len(), 50);

        // Both blobs are internally homogeneous and mutually distinct.
        let first = assignments[0];
        let second = assignments[25];
        assert_ne!(first, second);
        assert!(assignments[..25].iter().all(|&a| a == first));
        assert!(assignments[25..].iter().all(|&a| a == second));
    }

    #[test]
    fn test_bic_prefers_fewer_components_for_one_blob() {
        let points = blob(1.0, 30);
        let one = fit_mixture(&points, 1);
        let three = fit_mixture(&points, 3);
        assert!(one.bic < three.bic);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let mut points = blob(0.0, 15);
        points.extend(blob(6.0, 15));

        let a = select_components(&points, 5);
        let b = select_components(&points, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_log_sum_exp_stability() {
        let values = vec![-1000.0, -1000.5];
        let result = log_sum_exp(&values);
        assert!(result.is_finite());
        assert!(result > -1000.1 && result < -999.0);
    }
}
