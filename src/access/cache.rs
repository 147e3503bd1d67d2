use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{Error, record::Record};

/// The cache file name used when no other is configured.
pub const DEFAULT_CACHE_FILE_NAME: &str = "expense-tracker-records-v1.json";

/// The last known list of records, kept in a JSON file.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    /// A cache stored at `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the cache is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached records.
    ///
    /// A missing, unreadable or corrupt file gives an empty list.
    pub fn load(&self) -> Vec<Record> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No record cache at {}", self.path.display());
                return Vec::new();
            }
            Err(error) => {
                tracing::warn!("Could not read record cache {}: {error}", self.path.display());
                return Vec::new();
            }
        };

        match serde_json::from_str(&text) {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!("Ignoring corrupt record cache {}: {error}", self.path.display());
                Vec::new()
            }
        }
    }

    /// Replace the cached records with `records`.
    ///
    /// # Errors
    /// Returns [Error::JSONSerializationError] if the records cannot be
    /// serialized or [Error::Cache] if the file cannot be written.
    pub fn save(&self, records: &[Record]) -> Result<(), Error> {
        let json = serde_json::to_string(records)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        fs::write(&self.path, json).map_err(|error| {
            Error::Cache(format!(
                "could not write {}: {error}",
                self.path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::{
        Error,
        access::{DEFAULT_CACHE_FILE_NAME, LocalCache},
        aggregation::test_utils::record,
    };

    fn temp_cache() -> (TempDir, LocalCache) {
        let dir = tempfile::tempdir().expect("could not create temp dir");
        let cache = LocalCache::new(dir.path().join(DEFAULT_CACHE_FILE_NAME));

        (dir, cache)
    }

    #[test]
    fn missing_file_loads_empty() {
        let (_dir, cache) = temp_cache();

        assert!(cache.load().is_empty());
    }

    #[test]
    fn saved_records_load_back() {
        let (_dir, cache) = temp_cache();
        let records = vec![
            record(-1, "2024-03-02", "12.5", Some("Food")),
            record(7, "not a date", "oops", None),
        ];

        cache.save(&records).expect("could not save cache");

        assert_eq!(cache.load(), records);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let (_dir, cache) = temp_cache();
        fs::write(cache.path(), "{ not json").unwrap();

        assert!(cache.load().is_empty());
    }

    #[test]
    fn unwritable_path_is_cache_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path().join("missing").join("records.json"));

        let result = cache.save(&[]);

        assert!(matches!(result, Err(Error::Cache(_))));
    }
}
