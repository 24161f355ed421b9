use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Ensures that database.json exists at the specified path. If it does not
/// exist or holds invalid JSON, it is initialized with an empty
/// transactions array.
///
/// `database_path` may be the file itself or a directory containing it.
/// Returns the resolved path to database.json.
pub fn ensure_database_exists<P: AsRef<Path>>(database_path: P) -> Result<PathBuf> {
    let path = database_path.as_ref();

    // Resolve to database.json if a directory was provided
    let db_path = if path.is_dir()
        || (!path.exists() && !path.to_string_lossy().ends_with(".json"))
    {
        path.join("database.json")
    } else {
        path.to_path_buf()
    };

    let needs_initialization = match fs::read_to_string(&db_path) {
        Ok(contents) => serde_json::from_str::<Value>(&contents).is_err(),
        Err(_) => true,
    };

    if needs_initialization {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create directory {:?}", parent))?;
            }
        }
        let empty = json!({ "transactions": [] });
        fs::write(&db_path, serde_json::to_string_pretty(&empty)?)
            .with_context(|| format!("Cannot initialize database at {:?}", db_path))?;
    }

    Ok(db_path)
}

/// Reads database.json, initializing it first if needed.
pub fn read_database<P: AsRef<Path>>(database_path: P) -> Result<Value> {
    let db_path = ensure_database_exists(database_path)?;
    let contents = fs::read_to_string(&db_path)
        .with_context(|| format!("Cannot read database at {:?}", db_path))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("database.json at {:?} is not valid JSON", db_path))
}

/// Writes the database back as pretty-printed JSON. Returns the resolved
/// path that was written.
pub fn write_database<P: AsRef<Path>>(database_path: P, database: &Value) -> Result<PathBuf> {
    let path = database_path.as_ref();
    let db_path = if path.is_dir() {
        path.join("database.json")
    } else {
        path.to_path_buf()
    };
    fs::write(&db_path, serde_json::to_string_pretty(database)?)
        .with_context(|| format!("Cannot write database at {:?}", db_path))?;
    Ok(db_path)
}
