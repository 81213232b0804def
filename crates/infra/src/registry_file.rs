use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use sheetbill_companies::{CompanyMap, PersistenceError, RegistryStore};

/// File-backed registry store: one pretty-printed JSON object keyed by company key.
///
/// Writes go to a temporary file in the same directory which then replaces the
/// target, so a crash mid-write never leaves a truncated registry behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<Option<CompanyMap>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "registry file not found");
                return Ok(None);
            }
            Err(e) => return Err(io_error(&self.path, e)),
        };

        let companies: CompanyMap = serde_json::from_str(&raw)
            .map_err(|e| PersistenceError::Corrupt(format!("{}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), companies = companies.len(), "registry loaded");
        Ok(Some(companies))
    }

    fn save(&self, companies: &CompanyMap) -> Result<(), PersistenceError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

        let mut body = serde_json::to_vec_pretty(companies)
            .map_err(|e| PersistenceError::Io(format!("serialize registry: {e}")))?;
        body.push(b'\n');

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
        tmp.write_all(&body).map_err(|e| io_error(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| io_error(&self.path, e.error))?;

        debug!(path = %self.path.display(), companies = companies.len(), "registry saved");
        Ok(())
    }
}

fn io_error(path: &Path, err: std::io::Error) -> PersistenceError {
    PersistenceError::Io(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetbill_companies::{default_companies, CompanyRegistry};

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("companies.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_creates_directories_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("companies.json");
        let store = JsonFileStore::new(&path);

        store.save(&default_companies()).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"latestInvoiceNumber\": 586"));
        assert!(raw.contains("\"googleSheetsValue\": \"Velir\""));

        let loaded = store.load().unwrap().unwrap();
        let keys: Vec<_> = loaded.keys().cloned().collect();
        assert_eq!(keys, vec!["Velir", "Daily Kos", "McGowan", "travcoding"]);
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_reseed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(PersistenceError::Corrupt(_))));
        assert!(CompanyRegistry::open(store).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn registry_counters_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.json");

        let registry = CompanyRegistry::open(JsonFileStore::new(&path)).unwrap();
        assert_eq!(registry.increment_invoice_number("Velir").unwrap(), 587);
        assert_eq!(registry.increment_invoice_number("Velir").unwrap(), 588);
        assert_eq!(registry.increment_invoice_number("McGowan").unwrap(), 12);
        drop(registry);

        let reopened = CompanyRegistry::open(JsonFileStore::new(&path)).unwrap();
        assert_eq!(reopened.get_by_key("Velir").unwrap().latest_invoice_number, 588);
        assert_eq!(reopened.get_by_key("McGowan").unwrap().latest_invoice_number, 12);
        assert_eq!(reopened.get_by_key("Daily Kos").unwrap().latest_invoice_number, 14);
        assert_eq!(reopened.get_by_sheet_identifier("travcoding").unwrap().key, "travcoding");
    }

    #[test]
    fn no_temp_files_are_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("companies.json"));
        store.save(&default_companies()).unwrap();
        store.save(&default_companies()).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
