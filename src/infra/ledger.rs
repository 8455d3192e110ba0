#[cfg(test)]
use chrono::TimeZone;
use chrono::{DateTime, Utc};
#[cfg(test)]
use rusqlite::OptionalExtension;
use rusqlite::{params, Connection, TransactionBehavior};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::domain::models::EpisodeIdentity;
use crate::error::LedgerError;

pub type RecordId = i64;

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub id: RecordId,
    pub name: String,
    pub season: u32,
    pub episode: u32,
    pub is_hd: bool,
    pub handled_at: DateTime<Utc>,
}

/// Durable per-series record of every episode already handed off.
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LedgerError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let init = |path: &Path| -> rusqlite::Result<Connection> {
            let conn = Connection::open(path)?;
            // Overlapping runs wait on each other's write lock instead of failing.
            conn.busy_timeout(Duration::from_secs(10))?;
            init_schema(&conn)?;
            Ok(conn)
        };

        let conn = init(path).map_err(|source| LedgerError::Init {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Opened ledger at {}", path.display());
        Ok(Self { conn })
    }

    /// Register a series. Safe to call on every run.
    pub fn ensure_table(&self, series_name: &str) -> Result<(), LedgerError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO series (name, registered_at) VALUES (?1, ?2)",
                params![series_name, Utc::now().timestamp()],
            )
            .map_err(LedgerError::Write)?;
        Ok(())
    }

    /// Exact, case-sensitive title lookup within one series.
    pub fn has_seen(&self, series_name: &str, raw_title: &str) -> Result<bool, LedgerError> {
        title_exists(&self.conn, series_name, raw_title).map_err(LedgerError::Read)
    }

    /// Append a record for the episode unless the title is already present,
    /// checking and inserting in one transaction that commits before returning.
    /// Returns `None` when another record already holds the title.
    pub fn claim(
        &mut self,
        series_name: &str,
        identity: &EpisodeIdentity,
        handled_at: DateTime<Utc>,
    ) -> Result<Option<RecordId>, LedgerError> {
        // IMMEDIATE takes the write lock up front so two runs cannot both
        // observe the title as unseen.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(LedgerError::Write)?;

        if title_exists(&tx, series_name, &identity.raw_title).map_err(LedgerError::Read)? {
            return Ok(None);
        }

        let id = insert_record(&tx, series_name, identity, handled_at).map_err(LedgerError::Write)?;
        tx.commit().map_err(LedgerError::Write)?;
        Ok(Some(id))
    }
}

#[cfg(test)]
impl Ledger {
    /// Unconditional append in its own transaction.
    pub fn record(
        &mut self,
        series_name: &str,
        identity: &EpisodeIdentity,
        handled_at: DateTime<Utc>,
    ) -> Result<RecordId, LedgerError> {
        let tx = self.conn.transaction().map_err(LedgerError::Write)?;
        let id = insert_record(&tx, series_name, identity, handled_at).map_err(LedgerError::Write)?;
        tx.commit().map_err(LedgerError::Write)?;
        Ok(id)
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()
            .and_then(|conn| init_schema(&conn).map(|_| conn))
            .map_err(|source| LedgerError::Init {
                path: ":memory:".into(),
                source,
            })?;
        Ok(Self { conn })
    }

    /// All records of a series, oldest first.
    pub fn records(&self, series_name: &str) -> Result<Vec<LedgerRecord>, LedgerError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, season, episode, is_hd, handled_at
                 FROM episodes WHERE series_name = ?1 ORDER BY id",
            )
            .map_err(LedgerError::Read)?;

        let rows = stmt
            .query_map(params![series_name], |row| {
                let handled_at: i64 = row.get(5)?;
                Ok(LedgerRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    season: row.get(2)?,
                    episode: row.get(3)?,
                    is_hd: row.get(4)?,
                    handled_at: Utc
                        .timestamp_opt(handled_at, 0)
                        .single()
                        .unwrap_or_default(),
                })
            })
            .map_err(LedgerError::Read)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(LedgerError::Read)
    }

    pub fn execute_batch(&self, sql: &str) -> rusqlite::Result<()> {
        self.conn.execute_batch(sql)
    }

    pub fn is_registered(&self, series_name: &str) -> Result<bool, LedgerError> {
        self.conn
            .query_row(
                "SELECT 1 FROM series WHERE name = ?1",
                params![series_name],
                |_| Ok(()),
            )
            .optional()
            .map(|row| row.is_some())
            .map_err(LedgerError::Read)
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS series (
            name TEXT PRIMARY KEY,
            registered_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS episodes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            series_name TEXT NOT NULL,
            name TEXT NOT NULL,
            season INTEGER NOT NULL,
            episode INTEGER NOT NULL,
            is_hd INTEGER NOT NULL,
            handled_at INTEGER NOT NULL,
            UNIQUE (series_name, name)
        );
        "#,
    )
}

fn title_exists(conn: &Connection, series_name: &str, raw_title: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM episodes WHERE series_name = ?1 AND name = ?2)",
        params![series_name, raw_title],
        |row| row.get(0),
    )
}

fn insert_record(
    conn: &Connection,
    series_name: &str,
    identity: &EpisodeIdentity,
    handled_at: DateTime<Utc>,
) -> rusqlite::Result<RecordId> {
    conn.execute(
        "INSERT INTO episodes (series_name, name, season, episode, is_hd, handled_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            series_name,
            identity.raw_title,
            identity.season,
            identity.episode_number,
            identity.is_hd,
            handled_at.timestamp(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::title;
    use tempfile::TempDir;

    #[test]
    fn test_unrecorded_title_is_not_seen() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.ensure_table("Show A").unwrap();
        assert!(!ledger.has_seen("Show A", "Show A 1x01 [720p]").unwrap());
    }

    #[test]
    fn test_record_then_has_seen() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        ledger.ensure_table("Show A").unwrap();
        let id = title::parse("Show A 1x01 [720p]");

        let record_id = ledger.record("Show A", &id, Utc::now()).unwrap();
        assert!(record_id > 0);
        assert!(ledger.has_seen("Show A", "Show A 1x01 [720p]").unwrap());
    }

    #[test]
    fn test_lookup_is_exact_and_scoped_to_series() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        let id = title::parse("Show A 1x01 [720p]");
        ledger.record("Show A", &id, Utc::now()).unwrap();

        assert!(!ledger.has_seen("Show A", "show a 1x01 [720p]").unwrap());
        assert!(!ledger.has_seen("Show A", "Show A 1x01 [720p] ").unwrap());
        assert!(!ledger.has_seen("Show B", "Show A 1x01 [720p]").unwrap());
    }

    #[test]
    fn test_ensure_table_is_idempotent() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger.ensure_table("Show A").unwrap();
        ledger.ensure_table("Show A").unwrap();
        assert!(ledger.is_registered("Show A").unwrap());
        assert!(!ledger.is_registered("Show B").unwrap());
    }

    #[test]
    fn test_series_name_is_plain_data() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        let name = r#"Bobby"; DROP TABLE episodes; --"#;
        ledger.ensure_table(name).unwrap();
        ledger
            .record(name, &title::parse("Bobby 1x01"), Utc::now())
            .unwrap();
        assert!(ledger.has_seen(name, "Bobby 1x01").unwrap());
    }

    #[test]
    fn test_claim_records_once() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        let id = title::parse("Spartacus 2x05 [HDTV]");

        let first = ledger.claim("Spartacus", &id, Utc::now()).unwrap();
        let second = ledger.claim("Spartacus", &id, Utc::now()).unwrap();

        assert!(first.is_some());
        assert_eq!(second, None);
        assert_eq!(ledger.records("Spartacus").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_record_is_write_error() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        let id = title::parse("Show A 1x01");
        ledger.record("Show A", &id, Utc::now()).unwrap();

        let err = ledger.record("Show A", &id, Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::Write(_)));
    }

    #[test]
    fn test_records_keep_parsed_fields() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        let handled_at = Utc.timestamp_opt(1_350_000_000, 0).unwrap();
        ledger
            .record("Spartacus", &title::parse("Spartacus 2x05 720p"), handled_at)
            .unwrap();
        ledger
            .record("Spartacus", &title::parse("Spartacus special"), handled_at)
            .unwrap();

        let records = ledger.records("Spartacus").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Spartacus 2x05 720p");
        assert_eq!((records[0].season, records[0].episode), (2, 5));
        assert!(records[0].is_hd);
        assert_eq!(records[0].handled_at, handled_at);
        assert_eq!((records[1].season, records[1].episode), (1337, 1337));
        assert!(records[1].id > records[0].id);
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("tvshows.db");

        {
            let mut ledger = Ledger::open(&db_path).unwrap();
            ledger.ensure_table("Show A").unwrap();
            ledger
                .claim("Show A", &title::parse("Show A 1x01 [720p]"), Utc::now())
                .unwrap();
        }

        let ledger = Ledger::open(&db_path).unwrap();
        assert!(ledger.has_seen("Show A", "Show A 1x01 [720p]").unwrap());
    }

    #[test]
    fn test_two_handles_never_double_claim() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tvshows.db");
        let mut first = Ledger::open(&db_path).unwrap();
        let mut second = Ledger::open(&db_path).unwrap();
        let id = title::parse("Show A 1x02");

        assert!(first.claim("Show A", &id, Utc::now()).unwrap().is_some());
        assert!(second.claim("Show A", &id, Utc::now()).unwrap().is_none());
    }

    #[test]
    fn test_open_fails_on_directory_path() {
        let temp_dir = TempDir::new().unwrap();
        let err = Ledger::open(temp_dir.path()).err().unwrap();
        assert!(matches!(err, LedgerError::Init { .. }));
    }
}
