/// Paramètres d'analyse. Les valeurs par défaut reprennent la politique de
/// l'outil : en dessous de `min_draws` tirages, les analyses agrégées sont
/// refusées.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Taille minimale d'échantillon pour les analyses agrégées.
    pub min_draws: usize,
    /// Un numéro est « chaud » si sa fréquence dépasse `expected * hot_threshold`.
    pub hot_threshold: f64,
    /// Un numéro est « froid » si sa fréquence est sous `expected * cold_threshold`.
    pub cold_threshold: f64,
    /// Fenêtre de retard par défaut, en jours.
    pub overdue_days: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_draws: 50,
            hot_threshold: 0.7,
            cold_threshold: 0.3,
            overdue_days: 30,
        }
    }
}

/// Une tranche de dix numéros utilisée par l'analyse de répartition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRange {
    pub label: &'static str,
    pub min: u8,
    pub max: u8,
}

impl NumberRange {
    pub fn contains(&self, number: u8) -> bool {
        (self.min..=self.max).contains(&number)
    }
}

/// Les cinq tranches fixes de l'analyse de répartition.
pub const NUMBER_RANGES: [NumberRange; 5] = [
    NumberRange { label: "1-10", min: 1, max: 10 },
    NumberRange { label: "11-20", min: 11, max: 20 },
    NumberRange { label: "21-30", min: 21, max: 30 },
    NumberRange { label: "31-40", min: 31, max: 40 },
    NumberRange { label: "41-50", min: 41, max: 50 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.min_draws, 50);
        assert!((config.hot_threshold - 0.7).abs() < 1e-12);
        assert!((config.cold_threshold - 0.3).abs() < 1e-12);
        assert_eq!(config.overdue_days, 30);
    }

    #[test]
    fn test_ranges_cover_all_numbers() {
        for n in 1..=50u8 {
            let buckets = NUMBER_RANGES.iter().filter(|r| r.contains(n)).count();
            assert_eq!(buckets, 1, "le numéro {} doit tomber dans exactement une tranche", n);
        }
    }
}
