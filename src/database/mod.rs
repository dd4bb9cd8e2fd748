pub mod schema;

use crate::error::AppError;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Default location of the database file
pub fn get_database_path() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        PathBuf::from("/data/local/tmp/decluttr").join("decluttr.db")
    }

    #[cfg(not(target_os = "android"))]
    {
        PathBuf::from("./data/decluttr.db")
    }
}

/// Opens (creating if needed) the database at `db_path` with the full schema
pub fn init_database(db_path: &Path) -> Result<Connection, AppError> {
    // Make sure the directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(db_path)?;
    schema::init_schema(&conn)?;

    Ok(conn)
}

/// In-memory database with the full schema
pub fn init_memory_database() -> Result<Connection, AppError> {
    let conn = Connection::open_in_memory()?;
    schema::init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("decluttr.db");

        init_database(&path).unwrap();
        assert!(path.exists());
    }
}
