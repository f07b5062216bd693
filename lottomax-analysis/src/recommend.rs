use std::fmt;

use tracing::info;

use lottomax_db::models::{DrawRecord, MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_DRAW};

use crate::config::AnalysisConfig;
use crate::frequency::FrequencyAnalyzer;
use crate::patterns::PatternAnalyzer;
use crate::AnalysisError;

/// Fenêtre de retard utilisée par la stratégie froide, en jours.
const COLD_OVERDUE_DAYS: i64 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Hot,
    Cold,
    Balanced,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Hot => write!(f, "numéros chauds"),
            Strategy::Cold => write!(f, "numéros froids"),
            Strategy::Balanced => write!(f, "équilibrée"),
        }
    }
}

/// Une grille recommandée : 7 numéros distincts triés, un indice de
/// confiance dans [0,1] et une justification lisible. Les recommandations
/// n'ont aucune valeur prédictive pour un tirage équitable ; elles ne font
/// que refléter l'historique.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub strategy: Strategy,
    pub numbers: [u8; NUMBERS_PER_DRAW],
    pub confidence: f64,
    pub rationale: String,
}

/// Génération déterministe de grilles à partir des analyses de fréquences
/// et de motifs.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: AnalysisConfig,
    frequency: FrequencyAnalyzer,
    patterns: PatternAnalyzer,
}

impl RecommendationEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            frequency: FrequencyAnalyzer::new(config.clone()),
            patterns: PatternAnalyzer::new(config.clone()),
            config,
        }
    }

    pub fn recommend(
        &self,
        draws: &[DrawRecord],
        strategy: Strategy,
    ) -> Result<Recommendation, AnalysisError> {
        info!(draws = draws.len(), %strategy, "génération d'une recommandation");

        let numbers = match strategy {
            Strategy::Hot => self.hot_picks(draws)?,
            Strategy::Cold => self.cold_picks(draws)?,
            Strategy::Balanced => self.balanced_picks(draws)?,
        };

        let confidence = confidence(draws.len(), &numbers, strategy);
        let rationale = self.rationale(draws, &numbers, strategy)?;

        Ok(Recommendation {
            strategy,
            numbers,
            confidence,
            rationale,
        })
    }

    /// Stratégie chaude : les numéros chauds d'abord, complétés par les plus
    /// fréquents.
    fn hot_picks(&self, draws: &[DrawRecord]) -> Result<[u8; NUMBERS_PER_DRAW], AnalysisError> {
        let hot = self.frequency.hot_numbers(draws)?;

        let mut picks: Vec<u8> = hot.into_iter().take(NUMBERS_PER_DRAW).collect();
        fill_from(&mut picks, self.by_frequency_desc(draws)?);
        Ok(to_grid(picks))
    }

    /// Stratégie froide : les numéros en retard d'abord, puis les froids,
    /// puis les moins fréquents.
    fn cold_picks(&self, draws: &[DrawRecord]) -> Result<[u8; NUMBERS_PER_DRAW], AnalysisError> {
        // Le gabarit d'échantillon s'applique aussi ici, via les fréquences.
        let frequency = self.frequency.number_frequency(draws)?;

        let overdue = self.frequency.overdue_numbers(draws, COLD_OVERDUE_DAYS);
        let cold = self.frequency.cold_numbers(draws)?;

        let mut picks: Vec<u8> = Vec::with_capacity(NUMBERS_PER_DRAW);
        fill_from(&mut picks, overdue.into_iter().map(|(n, _)| n));
        fill_from(&mut picks, cold.into_iter());

        let mut by_freq_asc: Vec<(u8, u32)> = frequency.into_iter().collect();
        by_freq_asc.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        fill_from(&mut picks, by_freq_asc.into_iter().map(|(n, _)| n));

        Ok(to_grid(picks))
    }

    /// Stratégie équilibrée : jusqu'à 3 chauds et 2 en retard, le reste
    /// choisi pour viser la répartition pair/impair la plus courante avec
    /// des numéros de fréquence moyenne.
    fn balanced_picks(&self, draws: &[DrawRecord]) -> Result<[u8; NUMBERS_PER_DRAW], AnalysisError> {
        let frequency = self.frequency.number_frequency(draws)?;
        let hot = self.frequency.hot_numbers(draws)?;
        let overdue = self.frequency.overdue_numbers(draws, self.config.overdue_days);
        let odd_even = self.patterns.odd_even_distribution(draws);

        let mut picks: Vec<u8> = hot.into_iter().take(3).collect();
        let before = picks.len();
        for (n, _) in overdue {
            if picks.len() >= before + 2 {
                break;
            }
            if !picks.contains(&n) {
                picks.push(n);
            }
        }

        // Répartition pair/impair visée : la plus courante de l'historique.
        let target_odd = odd_even
            .most_common_pattern
            .0
            .split('-')
            .next()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(4);

        let avg = frequency.values().map(|&c| f64::from(c)).sum::<f64>() / frequency.len() as f64;
        let mut by_mid_frequency: Vec<u8> = (MIN_NUMBER..=MAX_NUMBER).collect();
        by_mid_frequency.sort_by(|a, b| {
            let da = (f64::from(frequency[a]) - avg).abs();
            let db = (f64::from(frequency[b]) - avg).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(b))
        });

        let current_odd = picks.iter().filter(|&&n| n % 2 == 1).count();
        let needed_odd = target_odd.saturating_sub(current_odd);
        fill_from_limited(
            &mut picks,
            by_mid_frequency.iter().copied().filter(|n| n % 2 == 1),
            needed_odd,
        );
        fill_from(&mut picks, by_mid_frequency.into_iter());

        Ok(to_grid(picks))
    }

    fn by_frequency_desc(
        &self,
        draws: &[DrawRecord],
    ) -> Result<impl Iterator<Item = u8>, AnalysisError> {
        let frequency = self.frequency.number_frequency(draws)?;
        let mut by_freq: Vec<(u8, u32)> = frequency.into_iter().collect();
        by_freq.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(by_freq.into_iter().map(|(n, _)| n))
    }

    fn rationale(
        &self,
        draws: &[DrawRecord],
        numbers: &[u8; NUMBERS_PER_DRAW],
        strategy: Strategy,
    ) -> Result<String, AnalysisError> {
        let frequency = self.frequency.number_frequency(draws)?;

        let mut parts = Vec::new();
        match strategy {
            Strategy::Hot => {
                parts.push(format!(
                    "Stratégie chaude fondée sur {} tirages historiques : numéros les plus fréquents en tête.",
                    draws.len()
                ));
            }
            Strategy::Cold => {
                parts.push(format!(
                    "Stratégie froide fondée sur {} tirages historiques : numéros en retard ou peu fréquents.",
                    draws.len()
                ));
            }
            Strategy::Balanced => {
                parts.push(format!(
                    "Stratégie équilibrée combinant fréquences, retards et motifs sur {} tirages.",
                    draws.len()
                ));
            }
        }

        let picked_avg = numbers.iter().map(|n| f64::from(frequency[n])).sum::<f64>()
            / numbers.len() as f64;
        let overall_avg =
            frequency.values().map(|&c| f64::from(c)).sum::<f64>() / frequency.len() as f64;
        if picked_avg > overall_avg * 1.1 {
            parts.push("Les numéros retenus sortent plus souvent que la moyenne.".to_string());
        } else if picked_avg < overall_avg * 0.9 {
            parts.push("Les numéros retenus sortent moins souvent que la moyenne.".to_string());
        } else {
            parts.push("Les numéros retenus ont une fréquence proche de la moyenne.".to_string());
        }

        let odd = numbers.iter().filter(|&&n| n % 2 == 1).count();
        parts.push(format!(
            "Répartition pair/impair : {}-{}.",
            odd,
            NUMBERS_PER_DRAW - odd
        ));

        Ok(parts.join(" "))
    }
}

/// Complète `picks` jusqu'à 7 numéros distincts.
fn fill_from(picks: &mut Vec<u8>, candidates: impl Iterator<Item = u8>) {
    for n in candidates {
        if picks.len() >= NUMBERS_PER_DRAW {
            break;
        }
        if !picks.contains(&n) {
            picks.push(n);
        }
    }
}

/// Ajoute au plus `limit` candidats, sans dépasser 7 numéros.
fn fill_from_limited(picks: &mut Vec<u8>, candidates: impl Iterator<Item = u8>, limit: usize) {
    let mut added = 0;
    for n in candidates {
        if added >= limit || picks.len() >= NUMBERS_PER_DRAW {
            break;
        }
        if !picks.contains(&n) {
            picks.push(n);
            added += 1;
        }
    }
}

fn to_grid(mut picks: Vec<u8>) -> [u8; NUMBERS_PER_DRAW] {
    debug_assert_eq!(picks.len(), NUMBERS_PER_DRAW);
    picks.sort_unstable();
    let mut grid = [0u8; NUMBERS_PER_DRAW];
    grid.copy_from_slice(&picks);
    grid
}

/// Confiance = base 0,7 × qualité des données (optimale à 200 tirages) ×
/// facteur de stratégie × équilibre pair/impair, bornée à [0,1 ; 1].
fn confidence(total_draws: usize, numbers: &[u8; NUMBERS_PER_DRAW], strategy: Strategy) -> f64 {
    let base = 0.7;
    let data_quality = (total_draws as f64 / 200.0).min(1.0);
    let strategy_factor = match strategy {
        Strategy::Hot => 0.8,
        Strategy::Cold => 0.6,
        Strategy::Balanced => 0.9,
    };

    let odd = numbers.iter().filter(|&&n| n % 2 == 1).count() as f64;
    let balance = 1.0 - (3.5 - odd).abs() / 3.5;

    (base * data_quality * strategy_factor * balance).clamp(0.1, 1.0)
}
