//! Consensus scoring — variance-penalized mean confidence.
//!
//! Rewards agreement between agents, penalizes divergence, but caps the
//! penalty so a single outlier cannot zero out an otherwise confident group.

use serde::{Deserialize, Serialize};

/// Scores agreement across an ordered set of agent confidences.
///
/// `score = clamp(mean(confidence) − penalty, 0, 1)` where
/// `penalty = min(variance_weight × population_variance, penalty_cap)`.
///
/// Pure and stateless: the same input always yields the same output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusCalculator {
    /// Multiplier applied to the population variance.
    pub variance_weight: f64,
    /// Upper bound on the divergence penalty.
    pub penalty_cap: f64,
}

impl ConsensusCalculator {
    pub fn new(variance_weight: f64, penalty_cap: f64) -> Self {
        Self {
            variance_weight,
            penalty_cap,
        }
    }

    /// Compute the consensus score for the given confidences.
    ///
    /// Inputs are clamped to [0, 1] before scoring. An empty slice scores
    /// 0.0; a single value passes through unchanged (variance is zero).
    pub fn score(&self, confidences: &[f64]) -> f64 {
        if confidences.is_empty() {
            return 0.0;
        }

        let clamped: Vec<f64> = confidences.iter().map(|c| c.clamp(0.0, 1.0)).collect();
        let n = clamped.len() as f64;
        let mean = clamped.iter().sum::<f64>() / n;
        let variance = clamped.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
        let penalty = (self.variance_weight * variance).min(self.penalty_cap);

        (mean - penalty).clamp(0.0, 1.0)
    }
}

impl Default for ConsensusCalculator {
    fn default() -> Self {
        Self {
            variance_weight: 2.0,
            penalty_cap: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scores_zero() {
        let calc = ConsensusCalculator::default();
        assert_eq!(calc.score(&[]), 0.0);
    }

    #[test]
    fn test_single_value_passes_through() {
        let calc = ConsensusCalculator::default();
        assert_eq!(calc.score(&[0.73]), 0.73);
        assert_eq!(calc.score(&[0.0]), 0.0);
        assert_eq!(calc.score(&[1.0]), 1.0);
    }

    #[test]
    fn test_agreeing_group_near_mean() {
        let calc = ConsensusCalculator::default();
        let score = calc.score(&[0.85, 0.78, 0.80]);
        // mean 0.81, population variance ~0.000867, penalty ~0.00173
        assert!((score - 0.8083).abs() < 1e-3, "score: {score}");
    }

    #[test]
    fn test_divergent_group_hits_penalty_cap() {
        let calc = ConsensusCalculator::default();
        // mean 0.5, variance 0.25 → raw penalty 0.5, capped at 0.2
        let score = calc.score(&[1.0, 0.0]);
        assert!((score - 0.3).abs() < 1e-9, "score: {score}");
    }

    #[test]
    fn test_penalty_never_exceeds_cap() {
        let calc = ConsensusCalculator::default();
        for confidences in [
            vec![0.0, 1.0, 0.0, 1.0],
            vec![0.1, 0.9],
            vec![0.2, 0.8, 0.5],
        ] {
            let n = confidences.len() as f64;
            let mean = confidences.iter().sum::<f64>() / n;
            let score = calc.score(&confidences);
            assert!(mean - score <= calc.penalty_cap + 1e-9);
        }
    }

    #[test]
    fn test_score_stays_in_unit_interval() {
        let calc = ConsensusCalculator::default();
        for confidences in [
            vec![0.0, 0.0, 0.0],
            vec![1.0, 1.0, 1.0],
            vec![0.05, 0.95],
            vec![0.5; 10],
        ] {
            let score = calc.score(&confidences);
            assert!((0.0..=1.0).contains(&score), "score: {score}");
        }
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        let calc = ConsensusCalculator::default();
        // 1.7 clamps to 1.0, -0.3 clamps to 0.0 — same as [1.0, 0.0]
        assert_eq!(calc.score(&[1.7, -0.3]), calc.score(&[1.0, 0.0]));
        assert_eq!(calc.score(&[2.5]), 1.0);
    }

    #[test]
    fn test_scoring_is_pure() {
        let calc = ConsensusCalculator::default();
        let confidences = [0.91, 0.84, 0.88, 0.79];
        assert_eq!(calc.score(&confidences), calc.score(&confidences));
    }

    #[test]
    fn test_custom_weights() {
        let calc = ConsensusCalculator::new(0.0, 0.2);
        // No variance weight → plain mean
        let score = calc.score(&[0.6, 0.8]);
        assert!((score - 0.7).abs() < 1e-9);
    }
}
