use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::errors::{RegisterError, Result};

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("aktiebok_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Resolves application directories, honoring overrides for tests and
/// scripted runs.
pub struct PathResolver;

impl PathResolver {
    /// Base data dir: explicit override, `$AKTIEBOK_HOME`, the platform
    /// data dir, or `.aktiebok` in the working directory as a last resort.
    pub fn resolve_base(overridden: Option<PathBuf>) -> PathBuf {
        if let Some(base) = overridden {
            return base;
        }
        if let Some(home) = std::env::var_os("AKTIEBOK_HOME") {
            return PathBuf::from(home);
        }
        dirs::data_dir()
            .map(|dir| dir.join("aktiebok"))
            .unwrap_or_else(|| PathBuf::from(".aktiebok"))
    }

    pub fn register_dir_in(base: &Path) -> PathBuf {
        base.join("registers")
    }

    pub fn backup_dir_in(base: &Path) -> PathBuf {
        base.join("backups")
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join("config")
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join("config.json")
    }

    pub fn config_backup_dir_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join("backups")
    }

    pub fn state_file_in(base: &Path) -> PathBuf {
        base.join("state.json")
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|err| {
        RegisterError::Storage(format!("could not create `{}`: {}", path.display(), err))
    })
}

/// Writes `data` to a temp file next to `path`, then renames it into
/// place so readers never observe a half-written document.
pub fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Reduces a free-text backup note to a safe file-name label.
pub fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_whitespace() || matches!(ch, '-' | '.') {
            if !sanitized.is_empty() && !last_dash {
                sanitized.push('-');
                last_dash = true;
            }
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Parses the `<stem>_YYYYMMDD_HHMM.json` timestamp out of a backup file
/// name; names that do not follow the pattern sort last.
pub fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(".json")?;
    let segments: Vec<&str> = trimmed.split('_').collect();
    if segments.len() < 2 {
        return None;
    }
    let time_part = segments.last()?;
    let date_part = segments.get(segments.len() - 2)?;
    if !is_digits(date_part, 8) || !is_digits(time_part, 4) {
        return None;
    }
    let raw = format!("{}{}", date_part, time_part);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

/// Formats SEK amounts: whole numbers without decimals, otherwise two.
pub fn format_amount(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_note_strips_punctuation() {
        assert_eq!(
            sanitize_note(Some("  Årsstämma 2025! ")).as_deref(),
            Some("rsstmma-2025")
        );
        assert_eq!(sanitize_note(Some("???")), None);
        assert_eq!(sanitize_note(None), None);
    }

    #[test]
    fn backup_timestamps_parse_and_reject_garbage() {
        assert!(parse_backup_timestamp("bolaget_20250301_1200.json").is_some());
        assert!(parse_backup_timestamp("bolaget.json").is_none());
        assert!(parse_backup_timestamp("bolaget_2025_12.json").is_none());
    }

    #[test]
    fn amounts_format_like_the_ui() {
        assert_eq!(format_amount(5000.0), "5000");
        assert_eq!(format_amount(12.5), "12.50");
    }
}
