use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use lottomax_db::models::{DrawRecord, NUMBERS_PER_DRAW};

use crate::config::{AnalysisConfig, NUMBER_RANGES};
use crate::frequency::sort_by_date;
use crate::{mean, sample_std_dev, AnalysisError};

/// Nombre maximal d'exemples conservés par motif.
const MAX_EXAMPLES: usize = 5;
/// Nombre maximal d'exemples retenus pour un même tirage.
const MAX_EXAMPLES_PER_DRAW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Consecutive,
    OddEven,
    Range,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Consecutive => write!(f, "consecutive"),
            PatternKind::OddEven => write!(f, "odd_even"),
            PatternKind::Range => write!(f, "range"),
        }
    }
}

/// Un motif structurel observé, avec sa fréquence d'occurrence et un score
/// de saillance dans [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub description: String,
    pub frequency: u32,
    pub significance: f64,
    pub examples: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OddEvenAnalysis {
    pub average_odd: f64,
    pub average_even: f64,
    pub odd_std_deviation: f64,
    pub even_std_deviation: f64,
    /// Répartition la plus courante ("4-3" par exemple) et son nombre
    /// d'occurrences.
    pub most_common_pattern: (String, u32),
    pub pattern_distribution: BTreeMap<String, u32>,
    /// Part de chaque répartition, en pourcentage des tirages ; la somme
    /// fait 100 à la tolérance flottante près.
    pub pattern_percentages: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeStat {
    pub label: &'static str,
    pub total: u32,
    pub percentage: f64,
    pub average_per_draw: f64,
    pub max_per_draw: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeAnalysis {
    pub buckets: Vec<RangeStat>,
    /// Score d'équilibre 0-100 : 100 pour une répartition parfaitement
    /// uniforme entre les cinq tranches, proche de 0 si une tranche domine.
    pub balance_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SumAnalysis {
    pub average: f64,
    pub min: u32,
    pub max: u32,
    pub std_deviation: f64,
    pub distribution: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapAnalysis {
    pub average: f64,
    pub min: u8,
    pub max: u8,
    pub std_deviation: f64,
    pub distribution: BTreeMap<u8, u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepeatAnalysis {
    pub average_repeats: f64,
    pub max_repeats: u32,
    pub distribution: BTreeMap<u32, u32>,
}

/// Résultat agrégé de `PatternAnalyzer::pattern_summary`.
#[derive(Debug, Clone)]
pub struct PatternSummary {
    pub total_draws: usize,
    pub consecutive_patterns: Vec<Pattern>,
    pub odd_even: OddEvenAnalysis,
    pub ranges: RangeAnalysis,
    pub sums: SumAnalysis,
    pub gaps: GapAnalysis,
    pub repeats: RepeatAnalysis,
    /// Indicateur composite 0-100 purement heuristique, sans signification
    /// statistique : il ne sert qu'à classer des fenêtres entre elles.
    pub pattern_score: f64,
}

/// Analyse des propriétés structurelles des tirages (suites, parité,
/// tranches, sommes, écarts, répétitions). Sans état.
#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer {
    config: AnalysisConfig,
}

impl PatternAnalyzer {
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

    /// Suites de numéros consécutifs : un motif par longueur de suite
    /// observée (2 à 7), avec jusqu'à 5 exemples concrets.
    pub fn consecutive_patterns(
        &self,
        draws: &[DrawRecord],
    ) -> Result<Vec<Pattern>, AnalysisError> {
        self.check_sample(draws)?;
        info!(draws = draws.len(), "détection des suites consécutives");

        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        let mut examples: BTreeMap<usize, Vec<Vec<u8>>> = BTreeMap::new();

        for draw in draws {
            for (i, run) in consecutive_runs(draw.numbers()).into_iter().enumerate() {
                *counts.entry(run.len()).or_insert(0) += 1;
                let kept = examples.entry(run.len()).or_default();
                if i < MAX_EXAMPLES_PER_DRAW && kept.len() < MAX_EXAMPLES {
                    kept.push(run);
                }
            }
        }

        let patterns = counts
            .into_iter()
            .map(|(length, frequency)| Pattern {
                kind: PatternKind::Consecutive,
                description: format!("{} numéros consécutifs", length),
                frequency,
                significance: consecutive_significance(frequency, draws.len(), length),
                examples: examples.remove(&length).unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        debug!(patterns = patterns.len(), "suites consécutives détectées");
        Ok(patterns)
    }

    /// Répartition pair/impair des tirages. Entrée vide : résultat vide.
    pub fn odd_even_distribution(&self, draws: &[DrawRecord]) -> OddEvenAnalysis {
        if draws.is_empty() {
            return OddEvenAnalysis::default();
        }

        let odd_counts: Vec<f64> = draws.iter().map(|d| d.odd_count() as f64).collect();
        let even_counts: Vec<f64> = odd_counts
            .iter()
            .map(|odd| NUMBERS_PER_DRAW as f64 - odd)
            .collect();

        let mut distribution: BTreeMap<String, u32> = BTreeMap::new();
        for draw in draws {
            let odd = draw.odd_count();
            let label = format!("{}-{}", odd, NUMBERS_PER_DRAW - odd);
            *distribution.entry(label).or_insert(0) += 1;
        }

        let total = draws.len() as f64;
        let percentages = distribution
            .iter()
            .map(|(label, &count)| (label.clone(), f64::from(count) / total * 100.0))
            .collect();

        let most_common = distribution
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(label, &count)| (label.clone(), count))
            .unwrap_or_default();

        OddEvenAnalysis {
            average_odd: mean(&odd_counts),
            average_even: mean(&even_counts),
            odd_std_deviation: sample_std_dev(&odd_counts),
            even_std_deviation: sample_std_dev(&even_counts),
            most_common_pattern: most_common,
            pattern_distribution: distribution,
            pattern_percentages: percentages,
        }
    }

    /// Répartition des numéros sur les cinq tranches de dix, avec score
    /// d'équilibre. Entrée vide : résultat vide.
    pub fn range_distribution(&self, draws: &[DrawRecord]) -> RangeAnalysis {
        if draws.is_empty() {
            return RangeAnalysis::default();
        }

        let mut totals = [0u32; NUMBER_RANGES.len()];
        let mut per_draw: Vec<[u32; NUMBER_RANGES.len()]> = Vec::with_capacity(draws.len());

        for draw in draws {
            let mut counts = [0u32; NUMBER_RANGES.len()];
            for &n in draw.numbers() {
                if let Some(idx) = NUMBER_RANGES.iter().position(|r| r.contains(n)) {
                    counts[idx] += 1;
                    totals[idx] += 1;
                }
            }
            per_draw.push(counts);
        }

        let total_numbers = (draws.len() * NUMBERS_PER_DRAW) as f64;
        let buckets = NUMBER_RANGES
            .iter()
            .enumerate()
            .map(|(idx, range)| {
                let in_bucket: Vec<f64> =
                    per_draw.iter().map(|c| f64::from(c[idx])).collect();
                RangeStat {
                    label: range.label,
                    total: totals[idx],
                    percentage: f64::from(totals[idx]) / total_numbers * 100.0,
                    average_per_draw: mean(&in_bucket),
                    max_per_draw: per_draw.iter().map(|c| c[idx]).max().unwrap_or(0),
                }
            })
            .collect();

        RangeAnalysis {
            buckets,
            balance_score: balance_score(&totals),
        }
    }

    /// Somme des 7 numéros de chaque tirage.
    pub fn sum_analysis(&self, draws: &[DrawRecord]) -> SumAnalysis {
        if draws.is_empty() {
            return SumAnalysis::default();
        }

        let sums: Vec<u32> = draws.iter().map(DrawRecord::sum).collect();
        let as_f64: Vec<f64> = sums.iter().map(|&s| f64::from(s)).collect();

        let mut distribution = BTreeMap::new();
        for &s in &sums {
            *distribution.entry(s).or_insert(0) += 1;
        }

        SumAnalysis {
            average: mean(&as_f64),
            min: sums.iter().copied().min().unwrap_or(0),
            max: sums.iter().copied().max().unwrap_or(0),
            std_deviation: sample_std_dev(&as_f64),
            distribution,
        }
    }

    /// Écarts entre numéros adjacents au sein de chaque tirage trié.
    pub fn gap_analysis(&self, draws: &[DrawRecord]) -> GapAnalysis {
        let mut gaps: Vec<u8> = Vec::new();
        for draw in draws {
            for pair in draw.numbers().windows(2) {
                gaps.push(pair[1] - pair[0]);
            }
        }

        if gaps.is_empty() {
            return GapAnalysis::default();
        }

        let as_f64: Vec<f64> = gaps.iter().map(|&g| f64::from(g)).collect();
        let mut distribution = BTreeMap::new();
        for &g in &gaps {
            *distribution.entry(g).or_insert(0) += 1;
        }

        GapAnalysis {
            average: mean(&as_f64),
            min: gaps.iter().copied().min().unwrap_or(0),
            max: gaps.iter().copied().max().unwrap_or(0),
            std_deviation: sample_std_dev(&as_f64),
            distribution,
        }
    }

    /// Numéros repris d'un tirage au suivant, en ordre chronologique.
    /// Moins de deux tirages : résultat explicitement vide, pas une erreur.
    pub fn repeat_analysis(&self, draws: &[DrawRecord]) -> RepeatAnalysis {
        if draws.len() < 2 {
            return RepeatAnalysis::default();
        }

        let sorted = sort_by_date(draws);
        let repeats: Vec<u32> = sorted
            .windows(2)
            .map(|pair| {
                pair[1]
                    .numbers()
                    .iter()
                    .filter(|n| pair[0].contains(**n))
                    .count() as u32
            })
            .collect();

        let as_f64: Vec<f64> = repeats.iter().map(|&r| f64::from(r)).collect();
        let mut distribution = BTreeMap::new();
        for &r in &repeats {
            *distribution.entry(r).or_insert(0) += 1;
        }

        RepeatAnalysis {
            average_repeats: mean(&as_f64),
            max_repeats: repeats.iter().copied().max().unwrap_or(0),
            distribution,
        }
    }

    /// Synthèse de tous les motifs, avec le score composite.
    pub fn pattern_summary(&self, draws: &[DrawRecord]) -> Result<PatternSummary, AnalysisError> {
        self.check_sample(draws)?;
        info!(draws = draws.len(), "synthèse des motifs");

        let consecutive_patterns = self.consecutive_patterns(draws)?;
        let odd_even = self.odd_even_distribution(draws);
        let ranges = self.range_distribution(draws);

        let pattern_score = composite_score(
            consecutive_patterns.len(),
            odd_even.most_common_pattern.1,
            draws.len(),
            ranges.balance_score,
        );

        Ok(PatternSummary {
            total_draws: draws.len(),
            consecutive_patterns,
            odd_even,
            ranges,
            sums: self.sum_analysis(draws),
            gaps: self.gap_analysis(draws),
            repeats: self.repeat_analysis(draws),
            pattern_score,
        })
    }
}

/// Suites maximales strictement croissantes de 1 en 1, longueur >= 2,
/// dans un tirage déjà trié.
fn consecutive_runs(numbers: &[u8; NUMBERS_PER_DRAW]) -> Vec<Vec<u8>> {
    let mut runs = Vec::new();
    let mut start = 0;

    for i in 1..=numbers.len() {
        let extends = i < numbers.len() && numbers[i] == numbers[i - 1] + 1;
        if !extends {
            if i - start >= 2 {
                runs.push(numbers[start..i].to_vec());
            }
            start = i;
        }
    }

    runs
}

/// Taux de base attendu d'une suite de longueur donnée, par tirage.
fn consecutive_base_rate(length: usize) -> f64 {
    match length {
        2 => 0.3,
        3 => 0.1,
        4 => 0.03,
        5 => 0.01,
        _ => 0.001,
    }
}

fn consecutive_significance(count: u32, total_draws: usize, length: usize) -> f64 {
    let expected = total_draws as f64 * consecutive_base_rate(length);
    if expected == 0.0 {
        return if count > 0 { 1.0 } else { 0.0 };
    }
    (f64::from(count) / expected).min(1.0)
}

/// Score d'équilibre 0-100 : variance de population des totaux par tranche
/// rapportée au carré de l'attendu uniforme.
fn balance_score(totals: &[u32]) -> f64 {
    let total: u32 = totals.iter().sum();
    if total == 0 || totals.is_empty() {
        return 0.0;
    }

    let expected = f64::from(total) / totals.len() as f64;
    let variance = totals
        .iter()
        .map(|&c| (f64::from(c) - expected).powi(2))
        .sum::<f64>()
        / totals.len() as f64;

    (100.0 - variance / expected.powi(2) * 100.0).max(0.0)
}

fn composite_score(
    pattern_kinds: usize,
    modal_count: u32,
    total_draws: usize,
    balance: f64,
) -> f64 {
    let modal_share = f64::from(modal_count) / total_draws.max(1) as f64 * 100.0;
    (pattern_kinds as f64 * 10.0 + modal_share + balance).min(100.0)
}
