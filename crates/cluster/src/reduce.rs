// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Seeded random-projection dimensionality reduction.
//!
//! Projects embeddings onto a Gaussian random matrix before mixture
//! fitting. The matrix is generated from a fixed seed, so the reduction
//! (and everything downstream of it) is reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reduce `points` to `target_dim` dimensions.
///
/// Inputs already at or below the target dimension are passed through
/// unchanged (converted to `f64`).
pub fn reduce_dimensions(points: &[Vec<f32>], target_dim: usize, seed: u64) -> Vec<Vec<f64>> {
    if points.is_empty() {
        return Vec::new();
    }

    let source_dim = points[0].len();
    if source_dim <= target_dim {
        return points
            .iter()
            .map(|p| p.iter().map(|&v| v as f64).collect())
            .collect();
    }

    let matrix = projection_matrix(target_dim, source_dim, seed);
    points
        .iter()
        .map(|point| {
            matrix
                .iter()
                .map(|row| {
                    row.iter()
                        .zip(point.iter())
                        .map(|(r, &v)| r * v as f64)
                        .sum()
                })
                .collect()
        })
        .collect()
}

/// A `rows x cols` matrix of N(0, 1/rows) entries from a seeded generator.
fn projection_matrix(rows: usize, cols: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let scale = 1.0 / (rows as f64).sqrt();
    (0..rows)
        .map(|_| (0..cols).map(|_| standard_normal(&mut rng) * scale).collect())
        .collect()
}

/// One standard normal sample via the Box-Muller transform.
fn standard_normal(rng: &mut StdRng) -> f64 {
    // Shift into (0, 1] so the logarithm stays finite.
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_below_target() {
        let points = vec![vec![1.0_f32, 2.0], vec![3.0, 4.0]];
        let reduced = reduce_dimensions(&points, 10, 42);

        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced[0], vec![1.0, 2.0]);
    }

    #[test]
    fn test_reduces_to_target_dimension() {
        let points: Vec<Vec<f32>> = (0..5).map(|i| vec![i as f32; 64]).collect();
        let reduced = reduce_dimensions(&points, 10, 42);

        assert_eq!(reduced.len(), 5);
        for p in &reduced {
            assert_eq!(p.len(), 10);
        }
    }

    #[test]
    fn test_projection_is_deterministic() {
        let points: Vec<Vec<f32>> = (0..8).map(|i| vec![(i * 3) as f32; 32]).collect();

        let a = reduce_dimensions(&points, 6, 7);
        let b = reduce_dimensions(&points, 6, 7);
        assert_eq!(a, b);

        let c = reduce_dimensions(&points, 6, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn test_projection_is_linear() {
        // The zero vector must map to the zero vector.
        let points = vec![vec![0.0_f32; 32]];
        let reduced = reduce_dimensions(&points, 4, 42);
        assert!(reduced[0].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(reduce_dimensions(&[], 10, 42).is_empty());
    }
}
