//! SQLite registry of known browser installations.
//!
//! One row per installation: display name, browser type tag, executable
//! path, user-data root. An empty database is seeded from the default
//! install locations of the supported browsers.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::browser_paths::{browser_data_path, browser_exec_path, SUPPORTED_BROWSERS};

#[derive(Debug, Clone)]
pub struct BrowserEntry {
    pub name: String,
    /// Browser type tag, e.g. "chrome", "brave".
    pub kind: String,
    pub exec_path: String,
    pub data_path: String,
}

pub struct Registry {
    conn: Connection,
}

impl Registry {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("failed to open registry [{}]", db_path.display()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS userdata (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE,
                type TEXT,
                exec_path TEXT,
                data_path TEXT
            )",
            [],
        )?;

        let registry = Registry { conn };
        // empty table means first launch, populate with what the machine has
        if registry.select_all()?.is_empty() {
            registry.seed()?;
        }
        Ok(registry)
    }

    /// Drop every row and re-detect the installed browsers.
    pub fn reset(&self) -> Result<()> {
        self.conn.execute("DELETE FROM userdata", [])?;
        self.seed()
    }

    fn seed(&self) -> Result<()> {
        for browser in SUPPORTED_BROWSERS {
            let Some(data_path) = browser_data_path(browser) else {
                continue;
            };
            let exec_path = browser_exec_path(browser).unwrap_or_default();

            let name = format!("{}{}", browser[..1].to_ascii_uppercase(), &browser[1..]);

            self.insert_one(
                &name,
                browser,
                &exec_path.to_string_lossy(),
                &data_path.to_string_lossy(),
            )?;
        }
        Ok(())
    }

    pub fn select_all(&self) -> Result<Vec<BrowserEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type, exec_path, data_path FROM userdata ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(BrowserEntry {
                name: row.get(0)?,
                kind: row.get(1)?,
                exec_path: row.get(2)?,
                data_path: row.get(3)?,
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    pub fn find(&self, name: &str) -> Result<Option<BrowserEntry>> {
        Ok(self
            .select_all()?
            .into_iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name)))
    }

    pub fn insert_one(&self, name: &str, kind: &str, exec_path: &str, data_path: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO userdata (name, type, exec_path, data_path) VALUES (?1, ?2, ?3, ?4)",
                params![name, kind, exec_path, data_path],
            )
            .with_context(|| format!("failed to register browser [{name}]"))?;
        Ok(())
    }

    pub fn delete_one(&self, name: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM userdata WHERE name = ?1", params![name])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, Registry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::open(&dir.path().join("userdata.db")).unwrap();
        (dir, registry)
    }

    #[test]
    fn insert_select_delete_round_trip() {
        let (_dir, registry) = open_temp();
        registry
            .insert_one("Testbrowser", "chromium", "/usr/bin/tb", "/data/tb")
            .unwrap();

        let entry = registry.find("testbrowser").unwrap().unwrap();
        assert_eq!(entry.kind, "chromium");
        assert_eq!(entry.data_path, "/data/tb");

        registry.delete_one("Testbrowser").unwrap();
        assert!(registry.find("Testbrowser").unwrap().is_none());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let (_dir, registry) = open_temp();
        registry
            .insert_one("Dup", "chrome", "", "/data/a")
            .unwrap();
        assert!(registry.insert_one("Dup", "chrome", "", "/data/b").is_err());
    }
}
