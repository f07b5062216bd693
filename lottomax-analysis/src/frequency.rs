use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use lottomax_db::models::{DrawRecord, MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_DRAW};

use crate::config::AnalysisConfig;
use crate::{mean, sample_std_dev, AnalysisError};

/// Statistiques de fréquence d'un numéro sur la fenêtre analysée.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyStat {
    pub number: u8,
    pub count: u32,
    /// Part de ce numéro parmi tous les numéros tirés, en pourcentage.
    pub percentage: f64,
    /// `None` si le numéro n'est jamais sorti dans la fenêtre.
    pub last_seen: Option<NaiveDate>,
    /// Écart moyen entre deux sorties, en nombre de tirages.
    /// `None` en dessous de deux sorties : pas de donnée d'écart.
    pub average_gap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverallStats {
    pub expected_frequency: f64,
    pub mean_frequency: f64,
    pub std_deviation: f64,
    pub min_frequency: u32,
    pub max_frequency: u32,
}

/// Résultat agrégé de `FrequencyAnalyzer::analyze_trends`.
#[derive(Debug, Clone)]
pub struct TrendAnalysis {
    pub total_draws: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub overall: OverallStats,
    pub hot_numbers: Vec<u8>,
    pub cold_numbers: Vec<u8>,
    pub frequency: BTreeMap<u8, u32>,
    pub number_statistics: BTreeMap<u8, FrequencyStat>,
    /// Fréquences par mois : "AAAA-MM" -> numéro -> occurrences.
    pub monthly_trends: BTreeMap<String, BTreeMap<u8, u32>>,
}

/// Analyse de fréquences sur une collection de tirages. Sans état : chaque
/// appel est une fonction pure de son entrée et de la configuration.
#[derive(Debug, Clone, Default)]
pub struct FrequencyAnalyzer {
    config: AnalysisConfig,
}

impl FrequencyAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    fn check_sample(&self, draws: &[DrawRecord]) -> Result<(), AnalysisError> {
        if draws.len() < self.config.min_draws {
            return Err(AnalysisError::InsufficientData {
                needed: self.config.min_draws,
                got: draws.len(),
            });
        }
        Ok(())
    }

    /// Occurrences de chaque numéro 1-50 sur l'ensemble des tirages. Tous les
    /// numéros sont présents dans le résultat, même à zéro.
    pub fn number_frequency(
        &self,
        draws: &[DrawRecord],
    ) -> Result<BTreeMap<u8, u32>, AnalysisError> {
        self.check_sample(draws)?;
        info!(draws = draws.len(), "calcul des fréquences");
        Ok(frequency_map(draws))
    }

    /// Fréquence attendue d'un numéro sous l'hypothèse uniforme :
    /// `(tirages * 7) / 50`.
    pub fn expected_frequency(&self, draws: &[DrawRecord]) -> f64 {
        (draws.len() * NUMBERS_PER_DRAW) as f64 / f64::from(MAX_NUMBER - MIN_NUMBER + 1)
    }

    /// Numéros sortis plus souvent que `expected * hot_threshold`, triés par
    /// fréquence décroissante.
    pub fn hot_numbers(&self, draws: &[DrawRecord]) -> Result<Vec<u8>, AnalysisError> {
        self.hot_numbers_with_threshold(draws, self.config.hot_threshold)
    }

    pub fn hot_numbers_with_threshold(
        &self,
        draws: &[DrawRecord],
        threshold: f64,
    ) -> Result<Vec<u8>, AnalysisError> {
        let frequency = self.number_frequency(draws)?;
        let expected = self.expected_frequency(draws);

        let mut hot: Vec<(u8, u32)> = frequency
            .into_iter()
            .filter(|&(_, count)| f64::from(count) > expected * threshold)
            .collect();
        hot.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        debug!(count = hot.len(), threshold, "numéros chauds identifiés");
        Ok(hot.into_iter().map(|(n, _)| n).collect())
    }

    /// Numéros sortis moins souvent que `expected * cold_threshold`, triés par
    /// fréquence croissante.
    pub fn cold_numbers(&self, draws: &[DrawRecord]) -> Result<Vec<u8>, AnalysisError> {
        self.cold_numbers_with_threshold(draws, self.config.cold_threshold)
    }

    pub fn cold_numbers_with_threshold(
        &self,
        draws: &[DrawRecord],
        threshold: f64,
    ) -> Result<Vec<u8>, AnalysisError> {
        let frequency = self.number_frequency(draws)?;
        let expected = self.expected_frequency(draws);

        let mut cold: Vec<(u8, u32)> = frequency
            .into_iter()
            .filter(|&(_, count)| f64::from(count) < expected * threshold)
            .collect();
        cold.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

        debug!(count = cold.len(), threshold, "numéros froids identifiés");
        Ok(cold.into_iter().map(|(n, _)| n).collect())
    }

    /// Numéros en retard : couples (numéro, jours depuis la dernière sortie),
    /// relatifs à la date du tirage le plus récent, triés par retard
    /// décroissant. Un numéro jamais sorti reçoit toute l'étendue de la
    /// fenêtre. Entrée vide : résultat vide.
    pub fn overdue_numbers(&self, draws: &[DrawRecord], threshold_days: i64) -> Vec<(u8, i64)> {
        if draws.is_empty() {
            return Vec::new();
        }

        let sorted = sort_by_date(draws);
        let earliest = sorted.first().map(|d| d.date()).unwrap_or_default();
        let latest = sorted.last().map(|d| d.date()).unwrap_or_default();

        let mut overdue = Vec::new();
        for number in MIN_NUMBER..=MAX_NUMBER {
            let last_seen = sorted.iter().rev().find(|d| d.contains(number));
            match last_seen {
                Some(draw) => {
                    let days = (latest - draw.date()).num_days();
                    if days >= threshold_days {
                        overdue.push((number, days));
                    }
                }
                None => overdue.push((number, (latest - earliest).num_days())),
            }
        }

        overdue.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        overdue
    }

    /// Statistiques détaillées par numéro. Pas de seuil minimal : une entrée
    /// vide donne une carte vide.
    pub fn frequency_statistics(&self, draws: &[DrawRecord]) -> BTreeMap<u8, FrequencyStat> {
        if draws.is_empty() {
            return BTreeMap::new();
        }

        let sorted = sort_by_date(draws);
        let counts = count_occurrences(&sorted);
        let total_numbers = (sorted.len() * NUMBERS_PER_DRAW) as f64;

        let mut stats = BTreeMap::new();
        for number in MIN_NUMBER..=MAX_NUMBER {
            let count = counts[usize::from(number) - 1];
            let last_seen = sorted.iter().rev().find(|d| d.contains(number)).map(|d| d.date());
            let gaps = appearance_gaps(number, &sorted);
            let average_gap = if gaps.is_empty() {
                None
            } else {
                Some(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64)
            };

            stats.insert(
                number,
                FrequencyStat {
                    number,
                    count,
                    percentage: f64::from(count) / total_numbers * 100.0,
                    last_seen,
                    average_gap,
                },
            );
        }

        stats
    }

    /// Analyse agrégée : étendue de dates, statistiques globales, listes
    /// chaud/froid, fréquences, statistiques par numéro et ventilation
    /// mensuelle.
    pub fn analyze_trends(&self, draws: &[DrawRecord]) -> Result<TrendAnalysis, AnalysisError> {
        self.check_sample(draws)?;
        info!(draws = draws.len(), "analyse des tendances de fréquence");

        let sorted = sort_by_date(draws);
        let frequency = frequency_map(&sorted);
        let counts: Vec<f64> = frequency.values().map(|&c| f64::from(c)).collect();

        let overall = OverallStats {
            expected_frequency: self.expected_frequency(&sorted),
            mean_frequency: mean(&counts),
            std_deviation: sample_std_dev(&counts),
            min_frequency: frequency.values().copied().min().unwrap_or(0),
            max_frequency: frequency.values().copied().max().unwrap_or(0),
        };

        let trends = TrendAnalysis {
            total_draws: sorted.len(),
            start_date: sorted.first().map(|d| d.date()).unwrap_or_default(),
            end_date: sorted.last().map(|d| d.date()).unwrap_or_default(),
            overall,
            hot_numbers: self.hot_numbers(&sorted)?,
            cold_numbers: self.cold_numbers(&sorted)?,
            number_statistics: self.frequency_statistics(&sorted),
            monthly_trends: monthly_trends(&sorted),
            frequency,
        };

        info!("analyse des tendances terminée");
        Ok(trends)
    }
}

/// Copie triée par date croissante, identifiant en départage.
pub(crate) fn sort_by_date(draws: &[DrawRecord]) -> Vec<DrawRecord> {
    let mut sorted = draws.to_vec();
    sorted.sort_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.draw_id().cmp(b.draw_id())));
    sorted
}

fn count_occurrences(draws: &[DrawRecord]) -> [u32; 50] {
    let mut counts = [0u32; 50];
    for draw in draws {
        for &n in draw.numbers() {
            counts[usize::from(n) - 1] += 1;
        }
    }
    counts
}

fn frequency_map(draws: &[DrawRecord]) -> BTreeMap<u8, u32> {
    let counts = count_occurrences(draws);
    (MIN_NUMBER..=MAX_NUMBER)
        .map(|n| (n, counts[usize::from(n) - 1]))
        .collect()
}

/// Écarts, en indices de tirage, entre sorties consécutives d'un numéro.
fn appearance_gaps(number: u8, sorted: &[DrawRecord]) -> Vec<i64> {
    let appearances: Vec<i64> = sorted
        .iter()
        .enumerate()
        .filter(|(_, d)| d.contains(number))
        .map(|(i, _)| i as i64)
        .collect();

    appearances.windows(2).map(|w| w[1] - w[0]).collect()
}

fn monthly_trends(sorted: &[DrawRecord]) -> BTreeMap<String, BTreeMap<u8, u32>> {
    let mut monthly: BTreeMap<String, BTreeMap<u8, u32>> = BTreeMap::new();
    for draw in sorted {
        let month = draw.date().format("%Y-%m").to_string();
        let entry = monthly.entry(month).or_default();
        for &n in draw.numbers() {
            *entry.entry(n).or_insert(0) += 1;
        }
    }
    monthly
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(min_draws: usize) -> FrequencyAnalyzer {
        FrequencyAnalyzer::new(AnalysisConfig {
            min_draws,
            ..AnalysisConfig::default()
        })
    }

    fn draw(id: &str, date: &str, numbers: [u8; 7]) -> DrawRecord {
        let bonus = (1..=50).find(|b| !numbers.contains(b)).unwrap();
        DrawRecord::new(date.parse().unwrap(), &numbers, bonus, 0.0, id).unwrap()
    }

    fn sample_draws() -> Vec<DrawRecord> {
        vec![
            draw("001", "2024-01-01", [1, 2, 3, 15, 25, 35, 45]),
            draw("002", "2024-01-08", [5, 12, 13, 14, 15, 30, 40]),
            draw("003", "2024-01-15", [10, 20, 30, 40, 47, 48, 49]),
            draw("004", "2024-02-05", [1, 2, 3, 15, 25, 35, 45]),
        ]
    }

    #[test]
    fn test_insufficient_data() {
        let analyzer = FrequencyAnalyzer::default();
        let err = analyzer.number_frequency(&sample_draws()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { needed: 50, got: 4 }
        ));
        assert!(analyzer.analyze_trends(&sample_draws()).is_err());
    }

    #[test]
    fn test_frequency_sums_to_seven_per_draw() {
        let draws = sample_draws();
        let frequency = analyzer(2).number_frequency(&draws).unwrap();

        assert_eq!(frequency.len(), 50);
        let total: u32 = frequency.values().sum();
        assert_eq!(total as usize, 7 * draws.len());
        assert_eq!(frequency[&15], 3);
        assert_eq!(frequency[&50], 0);
    }

    #[test]
    fn test_expected_frequency() {
        let analyzer = analyzer(2);
        let expected = analyzer.expected_frequency(&sample_draws());
        assert!((expected - 4.0 * 7.0 / 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_hot_and_cold_disjoint_and_sorted() {
        let analyzer = analyzer(2);
        let draws = sample_draws();

        let hot = analyzer.hot_numbers(&draws).unwrap();
        let cold = analyzer.cold_numbers(&draws).unwrap();

        assert!(hot.iter().all(|n| !cold.contains(n)));

        let frequency = analyzer.number_frequency(&draws).unwrap();
        let hot_counts: Vec<u32> = hot.iter().map(|n| frequency[n]).collect();
        assert!(hot_counts.windows(2).all(|w| w[0] >= w[1]));
        let cold_counts: Vec<u32> = cold.iter().map(|n| frequency[n]).collect();
        assert!(cold_counts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_overdue_numbers() {
        let analyzer = analyzer(2);
        let draws = sample_draws();

        let overdue = analyzer.overdue_numbers(&draws, 30);

        // 50 n'est jamais sorti : retard = toute la fenêtre (35 jours).
        let never_seen = overdue.iter().find(|&&(n, _)| n == 50).unwrap();
        assert_eq!(never_seen.1, 35);
        // 15 est sorti dans le dernier tirage : pas en retard.
        assert!(overdue.iter().all(|&(n, _)| n != 15));
        // Tri par retard décroissant.
        assert!(overdue.windows(2).all(|w| w[0].1 >= w[1].1));

        assert!(analyzer.overdue_numbers(&[], 30).is_empty());
    }

    #[test]
    fn test_frequency_statistics_gap_sentinel() {
        let analyzer = analyzer(2);
        let stats = analyzer.frequency_statistics(&sample_draws());

        // 15 sort aux indices 0, 1 et 3 : écarts (1, 2), moyenne 1,5.
        let s15 = &stats[&15];
        assert_eq!(s15.count, 3);
        assert_eq!(s15.average_gap, Some(1.5));
        assert_eq!(s15.last_seen, Some("2024-02-05".parse().unwrap()));

        // 5 ne sort qu'une fois : pas de donnée d'écart.
        let s5 = &stats[&5];
        assert_eq!(s5.count, 1);
        assert_eq!(s5.average_gap, None);

        // 50 ne sort jamais.
        let s50 = &stats[&50];
        assert_eq!(s50.count, 0);
        assert_eq!(s50.last_seen, None);
        assert_eq!(s50.average_gap, None);

        let total_pct: f64 = stats.values().map(|s| s.percentage).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);

        assert!(analyzer.frequency_statistics(&[]).is_empty());
    }

    #[test]
    fn test_analyze_trends() {
        let analyzer = analyzer(2);
        let trends = analyzer.analyze_trends(&sample_draws()).unwrap();

        assert_eq!(trends.total_draws, 4);
        assert_eq!(trends.start_date, "2024-01-01".parse().unwrap());
        assert_eq!(trends.end_date, "2024-02-05".parse().unwrap());
        assert_eq!(trends.overall.max_frequency, 3);
        assert_eq!(trends.overall.min_frequency, 0);
        assert!((trends.overall.expected_frequency - 0.56).abs() < 1e-12);

        // Ventilation mensuelle : 3 tirages en janvier, 1 en février.
        let january = &trends.monthly_trends["2024-01"];
        let january_total: u32 = january.values().sum();
        assert_eq!(january_total, 21);
        let february = &trends.monthly_trends["2024-02"];
        let february_total: u32 = february.values().sum();
        assert_eq!(february_total, 7);
    }
}
