pub mod config;
pub mod frequency;
pub mod patterns;
pub mod recommend;

pub use config::AnalysisConfig;
pub use frequency::{FrequencyAnalyzer, FrequencyStat, TrendAnalysis};
pub use patterns::{Pattern, PatternAnalyzer, PatternKind, PatternSummary};
pub use recommend::{Recommendation, RecommendationEngine, Strategy};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("au moins {needed} tirages sont nécessaires pour l'analyse, {got} disponibles")]
    InsufficientData { needed: usize, got: usize },
}

/// Écart type d'échantillon (n-1). Zéro en dessous de deux valeurs.
pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_std_dev() {
        assert_eq!(sample_std_dev(&[]), 0.0);
        assert_eq!(sample_std_dev(&[4.0]), 0.0);
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.138).abs() < 0.001);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
    }
}
