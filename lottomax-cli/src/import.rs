use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use lottomax_db::db::DrawStore;
use lottomax_db::models::DrawRecord;

/// Format attendu : en-tête puis une ligne par tirage,
/// `draw_id,date,number_1,...,number_7,bonus,jackpot`.
fn parse_record(record: &csv::StringRecord) -> Result<DrawRecord> {
    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .map(str::trim)
            .with_context(|| format!("champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("impossible de parser '{}' (index {})", s, idx))
    };

    let draw_id = get(0)?.to_string();

    let raw_date = get(1)?;
    let date: NaiveDate = raw_date
        .parse()
        .with_context(|| format!("date invalide : '{}'", raw_date))?;

    let mut numbers = [0u8; 7];
    for (i, slot) in numbers.iter_mut().enumerate() {
        *slot = get_u8(2 + i)?;
    }
    let bonus = get_u8(9)?;

    let jackpot_str = get(10).unwrap_or("");
    let jackpot: f64 = if jackpot_str.is_empty() {
        0.0
    } else {
        jackpot_str
            .parse()
            .with_context(|| format!("montant invalide : '{}'", jackpot_str))?
    };

    Ok(DrawRecord::new(date, &numbers, bonus, jackpot, draw_id)?)
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(store: &DrawStore, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("impossible d'ouvrir {:?}", path))?;

    let mut batch = Vec::new();
    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record) {
                Ok(draw) => batch.push(draw),
                Err(e) => {
                    eprintln!("Erreur parsing ligne {} : {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                eprintln!("Erreur lecture ligne {} : {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    if !batch.is_empty() {
        result.inserted = store.save(&batch)?;
        // Le magasin ne rapporte qu'un total : tout ce qui n'a pas été
        // inséré a été ignoré (doublon ou échec individuel journalisé).
        result.skipped = batch.len() as u32 - result.inserted;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("tirages.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    const HEADER: &str =
        "draw_id,date,number_1,number_2,number_3,number_4,number_5,number_6,number_7,bonus,jackpot\n";

    #[test]
    fn test_import_csv() {
        let dir = tempfile::tempdir().unwrap();
        let store = DrawStore::open(dir.path().join("test.db")).unwrap();
        let csv_path = write_csv(
            &dir,
            &format!(
                "{HEADER}\
                 2024-01-05,2024-01-05,1,2,3,15,25,35,45,50,70000000\n\
                 2024-01-09,2024-01-09,5,12,13,14,15,30,40,2,20000000\n"
            ),
        );

        let result = import_csv(&store, &csv_path).unwrap();
        assert_eq!(result.total_records, 2);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.errors, 0);
        assert_eq!(store.count().unwrap(), 2);

        let draw = store.get_by_id("2024-01-05").unwrap().unwrap();
        assert_eq!(draw.numbers(), &[1, 2, 3, 15, 25, 35, 45]);
        assert_eq!(draw.bonus(), 50);
    }

    #[test]
    fn test_import_csv_skips_duplicates_and_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = DrawStore::open(dir.path().join("test.db")).unwrap();
        let csv_path = write_csv(
            &dir,
            &format!(
                "{HEADER}\
                 2024-01-05,2024-01-05,1,2,3,15,25,35,45,50,70000000\n\
                 2024-01-05,2024-01-05,1,2,3,15,25,35,45,50,70000000\n\
                 2024-01-09,pas-une-date,5,12,13,14,15,30,40,2,0\n\
                 2024-01-12,2024-01-12,1,1,3,15,25,35,45,50,0\n"
            ),
        );

        let result = import_csv(&store, &csv_path).unwrap();
        assert_eq!(result.total_records, 4);
        assert_eq!(result.inserted, 1);
        assert_eq!(result.skipped, 1); // doublon
        assert_eq!(result.errors, 2); // date invalide + numéro en double
        assert_eq!(store.count().unwrap(), 1);
    }
}
