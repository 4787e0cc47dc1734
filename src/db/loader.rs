use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info};

use crate::{
    Error, Res,
    db::schema::{CREATE_TABLES, LOAD_ORDER, Record, SCHEMA_VERSION},
    etl::records::Batch,
};

/// Rows written to and skipped in one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoad {
    pub table: &'static str,
    pub inserted: usize,
    /// Rows whose natural key was already stored.
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub tables: Vec<TableLoad>,
}

impl LoadReport {
    pub fn inserted(&self, table: &str) -> usize {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map_or(0, |t| t.inserted)
    }

    pub fn total_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }
}

/// The listening history database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (and if needed creates) the database file with all tables.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Res<Self> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let is_new_db = !path.exists();
        let conn = Connection::open(path)?;
        if is_new_db {
            info!("Creating new history database at {:?}", path);
        }
        Self::init(conn)
    }

    pub fn open_in_memory() -> Res<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Res<Self> {
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        conn.execute_batch(CREATE_TABLES)?;
        conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        Ok(Self { conn })
    }

    /// Inserts `records` into their table in one transaction.
    ///
    /// A row whose natural key is already stored is discarded and the stored
    /// row wins. Any other failure rolls the whole batch of this table back.
    /// Returns the number of rows actually inserted.
    pub fn upsert<R: Record>(&mut self, records: &[R]) -> Res<usize> {
        let table = R::TABLE;
        let load_err = |source| Error::Load {
            table: table.name,
            source,
        };

        let tx = self.conn.transaction().map_err(load_err)?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(&table.insert_sql()).map_err(load_err)?;
            for record in records {
                inserted += stmt
                    .execute(params_from_iter(record.values()))
                    .map_err(load_err)?;
            }
        }
        tx.commit().map_err(load_err)?;

        let skipped = records.len() - inserted;
        if skipped > 0 {
            debug!(table = table.name, skipped, "Rows already stored, left untouched");
        }
        Ok(inserted)
    }

    /// Loads a batch table by table, parents first.
    ///
    /// Every table is committed on its own. When a table fails, the tables
    /// committed before it stay committed and the run stops.
    pub fn load(&mut self, batch: &Batch) -> Res<LoadReport> {
        let tables = vec![
            self.load_table(&batch.albums)?,
            self.load_table(&batch.artists)?,
            self.load_table(&batch.genres)?,
            self.load_table(&batch.tracks)?,
            self.load_table(&batch.play_events)?,
            self.load_table(&batch.artist_genres)?,
        ];
        Ok(LoadReport { tables })
    }

    fn load_table<R: Record>(&mut self, records: &[R]) -> Res<TableLoad> {
        let inserted = self.upsert(records)?;
        Ok(TableLoad {
            table: R::TABLE.name,
            inserted,
            skipped: records.len() - inserted,
        })
    }

    pub fn count(&self, table: &str) -> Res<i64> {
        if !LOAD_ORDER.iter().any(|t| t.name == table) {
            return Err(Error::Config(format!("unknown table {}", table)));
        }
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
