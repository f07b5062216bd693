use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{Connection, Row};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{DrawRecord, ValidationError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    draw_date      DATE NOT NULL,
    number_1       INTEGER NOT NULL,
    number_2       INTEGER NOT NULL,
    number_3       INTEGER NOT NULL,
    number_4       INTEGER NOT NULL,
    number_5       INTEGER NOT NULL,
    number_6       INTEGER NOT NULL,
    number_7       INTEGER NOT NULL,
    bonus_number   INTEGER NOT NULL,
    jackpot_amount REAL NOT NULL,
    draw_id        TEXT UNIQUE NOT NULL,
    created_at     TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_draw_date ON draws(draw_date);
CREATE INDEX IF NOT EXISTS idx_jackpot ON draws(jackpot_amount);
CREATE INDEX IF NOT EXISTS idx_draw_id ON draws(draw_id);
";

const SELECT_COLUMNS: &str = "draw_date, number_1, number_2, number_3, number_4, \
     number_5, number_6, number_7, bonus_number, jackpot_amount, draw_id";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("base indisponible ({path:?}) : {source}")]
    Unavailable {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("impossible de créer le répertoire {path:?} : {source}")]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("impossible d'enregistrer une liste de tirages vide")]
    EmptyBatch,

    #[error("ligne corrompue pour le tirage {draw_id} : {source}")]
    Corrupted {
        draw_id: String,
        source: ValidationError,
    },

    #[error("erreur SQLite : {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Chemin par défaut de la base : ./data/lottomax.db
pub fn default_db_path() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lottomax.db");
    path
}

/// Stockage SQLite des tirages, indexé par `draw_id`. Une connexion est
/// ouverte par opération et fermée aussitôt ; aucun pool, aucune
/// coordination entre processus.
pub struct DrawStore {
    path: PathBuf,
}

impl DrawStore {
    /// Ouvre la base, crée le répertoire parent et applique le schéma.
    /// Tout échec d'initialisation est fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| {
                StorageError::DirectoryCreation {
                    path: parent.to_path_buf(),
                    source,
                }
            })?;
        }

        let store = Self { path };
        let conn = store.connect()?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %store.path.display(), "base initialisée");
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        Connection::open(&self.path).map_err(|source| StorageError::Unavailable {
            path: self.path.clone(),
            source,
        })
    }

    /// Enregistre un lot de tirages et retourne le nombre de lignes
    /// réellement insérées. Un doublon sur `draw_id` est ignoré en silence ;
    /// toute autre erreur par tirage est journalisée puis le lot continue.
    pub fn save(&self, draws: &[DrawRecord]) -> Result<u32, StorageError> {
        if draws.is_empty() {
            return Err(StorageError::EmptyBatch);
        }

        let conn = self.connect()?;
        let tx = conn.unchecked_transaction()?;

        let mut saved = 0u32;
        for draw in draws {
            match insert_draw(&tx, draw) {
                Ok(()) => saved += 1,
                Err(e) if is_unique_violation(&e) => {
                    debug!(draw_id = draw.draw_id(), "tirage déjà présent, ignoré");
                }
                Err(e) => {
                    warn!(draw_id = draw.draw_id(), error = %e, "échec de l'insertion, tirage ignoré");
                }
            }
        }

        tx.commit()?;
        info!(saved, total = draws.len(), "enregistrement terminé");
        Ok(saved)
    }

    /// Charge les tirages, bornes de dates incluses, du plus récent au plus
    /// ancien.
    pub fn load(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<DrawRecord>, StorageError> {
        let mut query = format!("SELECT {SELECT_COLUMNS} FROM draws");
        let mut conditions = Vec::new();
        let mut params: Vec<NaiveDate> = Vec::new();

        if let Some(start) = start_date {
            conditions.push(format!("draw_date >= ?{}", params.len() + 1));
            params.push(start);
        }
        if let Some(end) = end_date {
            conditions.push(format!("draw_date <= ?{}", params.len() + 1));
            params.push(end);
        }
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY draw_date DESC, draw_id DESC");

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            row_to_parts,
        )?;

        let mut draws = Vec::new();
        for row in rows {
            draws.push(parts_to_draw(row?)?);
        }

        debug!(count = draws.len(), "tirages chargés");
        Ok(draws)
    }

    pub fn get_by_id(&self, draw_id: &str) -> Result<Option<DrawRecord>, StorageError> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM draws WHERE draw_id = ?1"))?;
        let mut rows = stmt.query_map([draw_id], row_to_parts)?;

        match rows.next() {
            Some(row) => Ok(Some(parts_to_draw(row?)?)),
            None => Ok(None),
        }
    }

    /// Le tirage le plus récent, s'il existe.
    pub fn get_latest(&self) -> Result<Option<DrawRecord>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM draws ORDER BY draw_date DESC, draw_id DESC LIMIT 1"
        ))?;
        let mut rows = stmt.query_map([], row_to_parts)?;

        match rows.next() {
            Some(row) => Ok(Some(parts_to_draw(row?)?)),
            None => Ok(None),
        }
    }

    pub fn count(&self) -> Result<u32, StorageError> {
        let conn = self.connect()?;
        let count = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Supprime un tirage ; retourne `true` si une ligne a été effacée.
    pub fn delete(&self, draw_id: &str) -> Result<bool, StorageError> {
        let conn = self.connect()?;
        let deleted = conn.execute("DELETE FROM draws WHERE draw_id = ?1", [draw_id])?;
        if deleted > 0 {
            info!(draw_id, "tirage supprimé");
        } else {
            warn!(draw_id, "tirage introuvable, rien à supprimer");
        }
        Ok(deleted > 0)
    }
}

fn insert_draw(conn: &Connection, draw: &DrawRecord) -> Result<(), rusqlite::Error> {
    let n = draw.numbers();
    conn.execute(
        "INSERT INTO draws (draw_date, number_1, number_2, number_3, number_4, \
         number_5, number_6, number_7, bonus_number, jackpot_amount, draw_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            draw.date(),
            n[0],
            n[1],
            n[2],
            n[3],
            n[4],
            n[5],
            n[6],
            draw.bonus(),
            draw.jackpot_amount(),
            draw.draw_id(),
        ],
    )?;
    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

type RowParts = (NaiveDate, [u8; 7], u8, f64, String);

fn row_to_parts(row: &Row<'_>) -> Result<RowParts, rusqlite::Error> {
    let date: NaiveDate = row.get(0)?;
    let numbers = [
        row.get::<_, u8>(1)?,
        row.get::<_, u8>(2)?,
        row.get::<_, u8>(3)?,
        row.get::<_, u8>(4)?,
        row.get::<_, u8>(5)?,
        row.get::<_, u8>(6)?,
        row.get::<_, u8>(7)?,
    ];
    let bonus: u8 = row.get(8)?;
    let jackpot: f64 = row.get(9)?;
    let draw_id: String = row.get(10)?;
    Ok((date, numbers, bonus, jackpot, draw_id))
}

/// Revalide chaque ligne lue : une ligne corrompue échoue bruyamment au lieu
/// de propager des données invalides.
fn parts_to_draw(parts: RowParts) -> Result<DrawRecord, StorageError> {
    let (date, numbers, bonus, jackpot, draw_id) = parts;
    DrawRecord::new(date, &numbers, bonus, jackpot, draw_id.clone())
        .map_err(|source| StorageError::Corrupted { draw_id, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, DrawStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DrawStore::open(dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn test_draw(id: &str, date: &str) -> DrawRecord {
        DrawRecord::new(
            date.parse().unwrap(),
            &[1, 2, 3, 15, 25, 35, 45],
            50,
            70_000_000.0,
            id,
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_count() {
        let (_dir, store) = test_store();
        assert_eq!(store.count().unwrap(), 0);

        let saved = store
            .save(&[test_draw("001", "2024-01-01"), test_draw("002", "2024-01-05")])
            .unwrap();
        assert_eq!(saved, 2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_save_empty_batch() {
        let (_dir, store) = test_store();
        assert!(matches!(store.save(&[]), Err(StorageError::EmptyBatch)));
    }

    #[test]
    fn test_save_duplicate_ignored() {
        let (_dir, store) = test_store();

        let saved = store.save(&[test_draw("001", "2024-01-01")]).unwrap();
        assert_eq!(saved, 1);
        let saved = store.save(&[test_draw("001", "2024-01-01")]).unwrap();
        assert_eq!(saved, 0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_round_trip() {
        let (_dir, store) = test_store();
        let draw = DrawRecord::new(
            "2024-03-12".parse().unwrap(),
            &[44, 3, 18, 27, 9, 33, 50],
            12,
            55_000_000.0,
            "2024-03-12",
        )
        .unwrap();
        store.save(std::slice::from_ref(&draw)).unwrap();

        let loaded = store.get_by_id("2024-03-12").unwrap().unwrap();
        assert_eq!(loaded.numbers(), &[3, 9, 18, 27, 33, 44, 50]);
        assert_eq!(loaded.bonus(), 12);
        assert_eq!(loaded.jackpot_amount(), 55_000_000.0);
        assert_eq!(loaded.draw_id(), "2024-03-12");
        assert_eq!(loaded, draw);
    }

    #[test]
    fn test_get_by_id_absent() {
        let (_dir, store) = test_store();
        assert!(store.get_by_id("inconnu").unwrap().is_none());
    }

    #[test]
    fn test_load_descending_order() {
        let (_dir, store) = test_store();
        store
            .save(&[
                test_draw("001", "2024-01-01"),
                test_draw("002", "2024-01-05"),
                test_draw("003", "2024-01-03"),
            ])
            .unwrap();

        let draws = store.load(None, None).unwrap();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].draw_id(), "002");
        assert_eq!(draws[1].draw_id(), "003");
        assert_eq!(draws[2].draw_id(), "001");
    }

    #[test]
    fn test_load_date_range_inclusive() {
        let (_dir, store) = test_store();
        store
            .save(&[
                test_draw("001", "2024-01-01"),
                test_draw("002", "2024-01-05"),
                test_draw("003", "2024-01-10"),
            ])
            .unwrap();

        let draws = store
            .load(
                Some("2024-01-01".parse().unwrap()),
                Some("2024-01-05".parse().unwrap()),
            )
            .unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].draw_id(), "002");
        assert_eq!(draws[1].draw_id(), "001");

        let draws = store.load(Some("2024-01-06".parse().unwrap()), None).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].draw_id(), "003");
    }

    #[test]
    fn test_get_latest() {
        let (_dir, store) = test_store();
        assert!(store.get_latest().unwrap().is_none());

        store
            .save(&[
                test_draw("001", "2024-01-01"),
                test_draw("003", "2024-01-10"),
                test_draw("002", "2024-01-05"),
            ])
            .unwrap();
        let latest = store.get_latest().unwrap().unwrap();
        assert_eq!(latest.draw_id(), "003");
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = test_store();
        store.save(&[test_draw("001", "2024-01-01")]).unwrap();

        assert!(store.delete("001").unwrap());
        assert!(!store.delete("001").unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_corrupted_row_fails_loudly() {
        let (_dir, store) = test_store();
        store.save(&[test_draw("001", "2024-01-01")]).unwrap();

        // Corruption simulée : un numéro hors limites écrit directement.
        let conn = Connection::open(&store.path).unwrap();
        conn.execute("UPDATE draws SET number_3 = 99 WHERE draw_id = '001'", [])
            .unwrap();

        match store.get_by_id("001") {
            Err(StorageError::Corrupted { draw_id, .. }) => assert_eq!(draw_id, "001"),
            other => panic!("erreur Corrupted attendue, obtenu {:?}", other.map(|_| ())),
        }
    }
}
