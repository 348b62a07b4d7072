//! JSON file helpers shared by the state, output and input files.

use crate::error::{CliError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Read `path` as JSON, or `None` if it does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(CliError::file(path))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Write `value` to `path` as pretty JSON.
///
/// The file is written next to `path` first and renamed into place, so an
/// interrupted run never leaves a half-written checkpoint.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(CliError::file(parent))?;
    }

    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = Path::new(&staging);

    fs::write(staging, contents).map_err(CliError::file(staging))?;
    fs::rename(staging, path).map_err(CliError::file(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<Value> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_creates_parents_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        write_json(&path, &json!({"phase": "extracting"})).unwrap();

        let value: Value = read_json(&path).unwrap().unwrap();
        assert_eq!(value["phase"], "extracting");
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let result: Result<Option<Value>> = read_json(&path);
        assert!(matches!(result, Err(CliError::Serialization(_))));
    }
}
