use chrono::NaiveDate;
use thiserror::Error;

/// Bornes du jeu Lotto Max : 7 numéros distincts entre 1 et 50, plus un bonus.
pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 50;
pub const NUMBERS_PER_DRAW: usize = 7;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("7 numéros attendus, {0} reçus")]
    WrongNumberCount(usize),

    #[error("numéro {0} hors limites (1-50)")]
    NumberOutOfRange(u8),

    #[error("numéro en double : {0}")]
    DuplicateNumber(u8),

    #[error("numéro bonus {0} hors limites (1-50)")]
    BonusOutOfRange(u8),

    #[error("le bonus {0} figure déjà parmi les 7 numéros")]
    BonusAmongNumbers(u8),

    #[error("le montant du gros lot ne peut pas être négatif ({0})")]
    NegativeJackpot(f64),

    #[error("l'identifiant du tirage ne peut pas être vide")]
    EmptyDrawId,
}

/// Un tirage Lotto Max historique. Immuable après construction ; les numéros
/// sont triés par ordre croissant à la création.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    date: NaiveDate,
    numbers: [u8; NUMBERS_PER_DRAW],
    bonus: u8,
    jackpot_amount: f64,
    draw_id: String,
}

impl DrawRecord {
    pub fn new(
        date: NaiveDate,
        numbers: &[u8],
        bonus: u8,
        jackpot_amount: f64,
        draw_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if numbers.len() != NUMBERS_PER_DRAW {
            return Err(ValidationError::WrongNumberCount(numbers.len()));
        }

        let mut sorted = [0u8; NUMBERS_PER_DRAW];
        sorted.copy_from_slice(numbers);
        sorted.sort_unstable();

        for &n in &sorted {
            if !(MIN_NUMBER..=MAX_NUMBER).contains(&n) {
                return Err(ValidationError::NumberOutOfRange(n));
            }
        }
        for pair in sorted.windows(2) {
            if pair[0] == pair[1] {
                return Err(ValidationError::DuplicateNumber(pair[0]));
            }
        }

        if !(MIN_NUMBER..=MAX_NUMBER).contains(&bonus) {
            return Err(ValidationError::BonusOutOfRange(bonus));
        }
        if sorted.contains(&bonus) {
            return Err(ValidationError::BonusAmongNumbers(bonus));
        }

        if jackpot_amount < 0.0 {
            return Err(ValidationError::NegativeJackpot(jackpot_amount));
        }

        let draw_id = draw_id.into();
        if draw_id.is_empty() {
            return Err(ValidationError::EmptyDrawId);
        }

        Ok(Self {
            date,
            numbers: sorted,
            bonus,
            jackpot_amount,
            draw_id,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Les 7 numéros, triés par ordre croissant.
    pub fn numbers(&self) -> &[u8; NUMBERS_PER_DRAW] {
        &self.numbers
    }

    pub fn bonus(&self) -> u8 {
        self.bonus
    }

    pub fn jackpot_amount(&self) -> f64 {
        self.jackpot_amount
    }

    pub fn draw_id(&self) -> &str {
        &self.draw_id
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }

    pub fn odd_count(&self) -> usize {
        self.numbers.iter().filter(|&&n| n % 2 == 1).count()
    }

    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| u32::from(n)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_sorts_numbers() {
        let draw = DrawRecord::new(
            date("2024-01-05"),
            &[45, 1, 25, 3, 35, 15, 2],
            50,
            70_000_000.0,
            "2024-01-05",
        )
        .unwrap();
        assert_eq!(draw.numbers(), &[1, 2, 3, 15, 25, 35, 45]);
    }

    #[test]
    fn test_new_wrong_count() {
        let err = DrawRecord::new(date("2024-01-05"), &[1, 2, 3], 8, 0.0, "x").unwrap_err();
        assert!(matches!(err, ValidationError::WrongNumberCount(3)));
    }

    #[test]
    fn test_new_number_out_of_range() {
        assert!(DrawRecord::new(date("2024-01-05"), &[0, 2, 3, 4, 5, 6, 7], 8, 0.0, "x").is_err());
        assert!(DrawRecord::new(date("2024-01-05"), &[1, 2, 3, 4, 5, 6, 51], 8, 0.0, "x").is_err());
    }

    #[test]
    fn test_new_duplicate_number() {
        let err =
            DrawRecord::new(date("2024-01-05"), &[1, 1, 3, 4, 5, 6, 7], 8, 0.0, "x").unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateNumber(1)));
    }

    #[test]
    fn test_new_bonus_out_of_range() {
        assert!(DrawRecord::new(date("2024-01-05"), &[1, 2, 3, 4, 5, 6, 7], 0, 0.0, "x").is_err());
        assert!(DrawRecord::new(date("2024-01-05"), &[1, 2, 3, 4, 5, 6, 7], 51, 0.0, "x").is_err());
    }

    #[test]
    fn test_new_bonus_among_numbers() {
        let err =
            DrawRecord::new(date("2024-01-05"), &[1, 2, 3, 4, 5, 6, 7], 4, 0.0, "x").unwrap_err();
        assert!(matches!(err, ValidationError::BonusAmongNumbers(4)));
    }

    #[test]
    fn test_new_negative_jackpot() {
        assert!(DrawRecord::new(date("2024-01-05"), &[1, 2, 3, 4, 5, 6, 7], 8, -1.0, "x").is_err());
    }

    #[test]
    fn test_new_empty_draw_id() {
        let err =
            DrawRecord::new(date("2024-01-05"), &[1, 2, 3, 4, 5, 6, 7], 8, 0.0, "").unwrap_err();
        assert!(matches!(err, ValidationError::EmptyDrawId));
    }

    #[test]
    fn test_helpers() {
        let draw = DrawRecord::new(
            date("2024-01-05"),
            &[1, 2, 3, 4, 5, 6, 7],
            8,
            0.0,
            "2024-01-05",
        )
        .unwrap();
        assert!(draw.contains(3));
        assert!(!draw.contains(8));
        assert_eq!(draw.odd_count(), 4);
        assert_eq!(draw.sum(), 28);
    }
}
