use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    errors::RegisterError,
    register::ShareRegister,
    utils::{ensure_dir, parse_backup_timestamp, sanitize_note, write_atomic, PathResolver},
};

use super::{Result, StorageBackend};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const DEFAULT_RETENTION: usize = 5;

/// File-based backend: one JSON document per register, timestamped
/// backups per register, and a small state file remembering the last
/// opened register.
#[derive(Clone)]
pub struct JsonStorage {
    registers_dir: PathBuf,
    backups_dir: PathBuf,
    state_file: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let base = PathResolver::resolve_base(root);
        ensure_dir(&base)?;
        let registers_dir = PathResolver::register_dir_in(&base);
        let backups_dir = PathResolver::backup_dir_in(&base);
        ensure_dir(&registers_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            registers_dir,
            backups_dir,
            state_file: PathResolver::state_file_in(&base),
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn register_path(&self, name: &str) -> PathBuf {
        self.registers_dir
            .join(format!("{}.json", canonical_name(name)))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    /// Names of all stored registers, sorted.
    pub fn list_registers(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.registers_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn last_register(&self) -> Result<Option<String>> {
        let state = self.read_state()?;
        Ok(state.last_register)
    }

    pub fn record_last_register(&self, name: Option<&str>) -> Result<()> {
        let mut state = self.read_state()?;
        state.last_register = name.map(canonical_name);
        let data = serde_json::to_string_pretty(&state)?;
        write_atomic(&self.state_file, &data)?;
        Ok(())
    }

    fn read_state(&self) -> Result<StoreState> {
        if self.state_file.exists() {
            let data = fs::read_to_string(&self.state_file)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(StoreState::default())
        }
    }

    fn write_backup_file(
        &self,
        register: &ShareRegister,
        name: &str,
        note: Option<&str>,
    ) -> Result<()> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        let path = dir.join(format!("{}.{}", file_stem, BACKUP_EXTENSION));
        let json = serde_json::to_string_pretty(register)?;
        write_atomic(&path, &json)?;
        self.prune_backups(name)?;
        Ok(())
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(name, entry);
            let _ = fs::remove_file(path);
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, register: &ShareRegister, name: &str) -> Result<()> {
        let path = self.register_path(name);
        let json = serde_json::to_string_pretty(register)?;
        write_atomic(&path, &json)?;
        tracing::debug!(name, "register saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<ShareRegister> {
        let path = self.register_path(name);
        if !path.exists() {
            return Err(RegisterError::Storage(format!(
                "register `{}` not found",
                name
            )));
        }
        tracing::debug!(name, "loading register");
        load_register_from_path(&path)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|stem| stem.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            entries.push(file_name);
        }
        entries.sort_by(|a, b| parse_backup_timestamp(b).cmp(&parse_backup_timestamp(a)));
        Ok(entries)
    }

    fn backup(&self, register: &ShareRegister, name: &str, note: Option<&str>) -> Result<()> {
        self.write_backup_file(register, name, note)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<ShareRegister> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(RegisterError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let target = self.register_path(name);
        fs::copy(&backup_path, &target)?;
        load_register_from_path(&target)
    }
}

pub fn save_register_to_path(register: &ShareRegister, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(register)?;
    write_atomic(path, &json)
}

pub fn load_register_from_path(path: &Path) -> Result<ShareRegister> {
    let data = fs::read_to_string(path)?;
    let register: ShareRegister = serde_json::from_str(&data)?;
    Ok(register)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    last_register: Option<String>,
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "aktiebok".into()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage =
            JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).expect("json storage");
        (storage, temp)
    }

    fn sample_register() -> ShareRegister {
        ShareRegister::new("Testbolaget AB", "556000-0000", 25_000.0)
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        let register = sample_register();
        storage.save(&register, "Testbolaget AB").expect("save");
        let loaded = storage.load("Testbolaget AB").expect("load");
        assert_eq!(loaded.company_name, "Testbolaget AB");
        assert_eq!(loaded.share_capital, 25_000.0);
    }

    #[test]
    fn loading_missing_register_is_an_error() {
        let (storage, _guard) = storage_with_temp_dir();
        assert!(storage.load("saknas").is_err());
    }

    #[test]
    fn backup_writes_timestamped_files() {
        let (storage, _guard) = storage_with_temp_dir();
        let register = sample_register();
        storage.save(&register, "bolaget").expect("save");
        storage
            .backup(&register, "bolaget", Some("årsstämma"))
            .expect("create backup");
        let backups = storage.list_backups("bolaget").expect("list backups");
        assert!(
            !backups.is_empty(),
            "expected at least one backup file to be created"
        );
    }

    #[test]
    fn last_register_state_roundtrips() {
        let (storage, _guard) = storage_with_temp_dir();
        assert_eq!(storage.last_register().unwrap(), None);
        storage.record_last_register(Some("Testbolaget AB")).unwrap();
        assert_eq!(
            storage.last_register().unwrap().as_deref(),
            Some("testbolaget_ab")
        );
    }
}
