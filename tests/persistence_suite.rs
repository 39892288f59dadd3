use std::fs;
use std::path::Path;

use aktiebok_core::register::{ShareClass, ShareRegister, Shareholder};
use aktiebok_core::storage::{JsonStorage, StorageBackend};
use tempfile::tempdir;

mod common;

fn sample_register() -> ShareRegister {
    let mut register = ShareRegister::new("Pålitligt AB", "556444-4444", 50_000.0);
    register.add_shareholder(Shareholder::new(
        "Anna Alm",
        "19800101-1234",
        500,
        ShareClass::B,
        1,
        500,
    ));
    register
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => String::from("tmp"),
    };
    tmp.set_extension(ext);
    tmp
}

#[test]
fn atomic_save_failure_preserves_original_file() {
    let temp = tempdir().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(2)).unwrap();

    let mut register = sample_register();
    storage.save(&register, "pålitligt").expect("initial save");
    let path = storage.register_path("pålitligt");
    let original = fs::read_to_string(&path).expect("read original file");

    // A directory squatting on the temp file name forces File::create to fail.
    let tmp_path = tmp_path_for(&path);
    fs::create_dir_all(&tmp_path).unwrap();

    register.add_shareholder(Shareholder::new(
        "Bertil Berg",
        "19750505-5678",
        100,
        ShareClass::B,
        501,
        600,
    ));
    let result = storage.save(&register, "pålitligt");
    assert!(
        result.is_err(),
        "expected save to fail when the temp path is a directory"
    );

    let current = fs::read_to_string(&path).expect("read after failure");
    assert_eq!(original, current, "failed save must not touch the file");
}

#[test]
fn roundtrip_preserves_holders_and_journal() {
    let (storage, _config) = common::setup_test_env();
    let register = sample_register();
    storage.save(&register, "Pålitligt AB").expect("save");

    let loaded = storage.load("Pålitligt AB").expect("load");
    assert_eq!(loaded.company_name, "Pålitligt AB");
    assert_eq!(loaded.shareholders.len(), 1);
    assert_eq!(loaded.shareholders[0].share_number_to, 500);
    assert_eq!(loaded.schema_version, register.schema_version);
}

#[test]
fn backups_prune_to_the_retention_limit() {
    let temp = tempdir().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(2)).unwrap();
    let register = sample_register();
    storage.save(&register, "bolaget").expect("save");

    for note in ["första", "andra", "tredje"] {
        storage
            .backup(&register, "bolaget", Some(note))
            .expect("backup");
    }

    let backups = storage.list_backups("bolaget").expect("list");
    assert_eq!(backups.len(), 2, "retention of 2 keeps two backups");
}

#[test]
fn restore_brings_back_the_backed_up_state() {
    let temp = tempdir().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).unwrap();

    let register = sample_register();
    storage.save(&register, "bolaget").expect("save");
    storage
        .backup(&register, "bolaget", Some("before change"))
        .expect("backup");

    let mut changed = register.clone();
    changed.shareholders[0].shares = 1;
    storage.save(&changed, "bolaget").expect("save change");
    assert_eq!(storage.load("bolaget").unwrap().shareholders[0].shares, 1);

    let backups = storage.list_backups("bolaget").expect("list");
    let restored = storage
        .restore("bolaget", &backups[0])
        .expect("restore newest backup");
    assert_eq!(restored.shareholders[0].shares, 500);
}

#[test]
fn registers_are_listed_by_canonical_name() {
    let (storage, _config) = common::setup_test_env();
    storage
        .save(&sample_register(), "Pålitligt AB")
        .expect("save");
    let names = storage.list_registers().expect("list");
    assert_eq!(names, vec!["p_litligt_ab".to_string()]);
}
