pub mod json_backend;

use std::path::Path;

use crate::{errors::RegisterError, register::ShareRegister};

pub type Result<T> = std::result::Result<T, RegisterError>;

/// Abstraction over persistence backends capable of storing share
/// registers and their backups.
pub trait StorageBackend: Send + Sync {
    fn save(&self, register: &ShareRegister, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<ShareRegister>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, register: &ShareRegister, name: &str, note: Option<&str>) -> Result<()>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<ShareRegister>;

    /// Ad-hoc file operations; default implementations forward to the
    /// free functions so every backend supports export/import.
    fn save_to_path(&self, register: &ShareRegister, path: &Path) -> Result<()> {
        json_backend::save_register_to_path(register, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<ShareRegister> {
        json_backend::load_register_from_path(path)
    }
}

pub use json_backend::JsonStorage;
