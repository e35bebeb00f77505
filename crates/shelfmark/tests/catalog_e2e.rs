//! End-to-end tests for the catalog
//!
//! These drive the public API against a real directory tree: create, save,
//! reload, reconcile with the filesystem, query and guess.

use serde_json::{json, Value};
use shelfmark::catalog::{CATALOG_DIR, MODEL_FILE};
use shelfmark::{
    Catalog, CatalogOptions, GuessOptions, IdChange, ListEdit, OpenMode, Schema, SelectBy,
    ShelfError,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn model() -> Value {
    json!({
        "General": {
            "Name": "Clips",
            "Description": "Catalog used by the end-to-end tests",
            "Types": ["mp4", "mkv"],
            "Separators": [".", "-", "_", "+"],
            "SecondaryDBs": ["Studio", "Tags"]
        },
        "ID": {"Type": "Item", "default": "-1", "itemType": "int", "plugin": "", "hide": ""},
        "Path": {"Type": "Item", "default": "emptyPath", "itemType": "str", "plugin": "", "hide": ""},
        "Name": {"Type": "Item", "default": "emptyName", "itemType": "str", "plugin": "", "hide": ""},
        "Added": {"Type": "Item", "default": "emptyAdded", "itemType": "datetime", "plugin": "", "hide": ""},
        "Size": {"Type": "Item", "default": "0", "itemType": "float", "plugin": "osData:size", "hide": ""},
        "Studio": {"Type": "Item", "default": "emptyStudio", "itemType": "str", "plugin": "", "hide": ""},
        "Opened": {"Type": "ListItem", "default": ["emptyOpened"], "itemType": "datetime", "plugin": "", "hide": ""},
        "Changed": {"Type": "ListItem", "default": ["emptyChanged"], "itemType": "datetime", "plugin": "", "hide": ""},
        "Tags": {"Type": "ListItem", "default": ["emptyTags"], "itemType": "str", "plugin": "", "hide": ""}
    })
}

/// Create a test environment with a temp catalog root
struct TestEnv {
    /// Temp directory (cleaned up on drop)
    _temp: TempDir,
    /// Directory indexed by the catalog
    pub root: PathBuf,
    /// Schema file, kept outside the root
    pub model_path: PathBuf,
}

impl TestEnv {
    /// Catalogued files get the IDs
    /// 0 Acme/Red_Hat.mp4, 1 Acme/blue-sky.mp4, 2 Zeta/green.mkv
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path().join("library");
        let model_path = temp.path().join("model.json");
        fs::create_dir_all(&root).expect("Failed to create root");
        fs::write(&model_path, model().to_string()).expect("Failed to write model");

        let env = Self {
            _temp: temp,
            root,
            model_path,
        };
        env.write_file("Acme/Red_Hat.mp4", "");
        env.write_file("Acme/blue-sky.mp4", "");
        env.write_file("Zeta/green.mkv", "");
        env.write_file("readme.txt", "not a clip");
        env.write_file(".trash/old.mp4", "");
        env
    }

    fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    fn move_file(&self, from: &str, to: &str) {
        let target = self.root.join(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).ok();
        }
        fs::rename(self.root.join(from), target).expect("Failed to move file");
    }

    fn remove_file(&self, relative: &str) {
        fs::remove_file(self.root.join(relative)).expect("Failed to remove file");
    }

    fn create(&self) -> Catalog {
        let schema = Schema::from_path(&self.model_path).unwrap();
        Catalog::create(&self.root, schema, CatalogOptions::default()).unwrap()
    }

    fn load(&self) -> Catalog {
        Catalog::load(&self.root, CatalogOptions::default()).unwrap()
    }
}

fn backups(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("mainDB.") && name.ends_with(".backup"))
        .collect()
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ============================================================================
// Create / save / load
// ============================================================================

#[test]
fn test_create_indexes_matching_files_only() {
    let env = TestEnv::new();
    let catalog = env.create();

    let paths: Vec<&str> = catalog.records().iter().map(|r| r.path()).collect();
    assert_eq!(
        paths,
        vec!["Acme/Red_Hat.mp4", "Acme/blue-sky.mp4", "Zeta/green.mkv"]
    );
    assert_eq!(catalog.ids(), vec!["0", "1", "2"]);
    assert_eq!(catalog.max_id(), 2);

    let record = catalog.get("2").unwrap();
    assert_eq!(record.name(), "green");
    assert_eq!(record.single("Size").unwrap(), "0.00");
    assert_eq!(record.list("Tags").unwrap(), &["emptyTags"]);
    assert!(env.root.join(CATALOG_DIR).join(MODEL_FILE).exists());
}

#[test]
fn test_create_twice_fails() {
    let env = TestEnv::new();
    let _catalog = env.create();
    let schema = Schema::from_path(&env.model_path).unwrap();
    assert!(matches!(
        Catalog::create(&env.root, schema, CatalogOptions::default()),
        Err(ShelfError::AlreadyInitialized(_))
    ));
}

#[test]
fn test_edits_survive_save_and_load() {
    let env = TestEnv::new();
    let mut catalog = env.create();
    catalog.modify_single("0", "Studio", "Acme").unwrap();
    catalog
        .modify_list("1", "Tags", ListEdit::Append("Sky".into()))
        .unwrap();
    assert!(!catalog.is_saved().unwrap());
    assert!(catalog.save().unwrap());
    assert!(catalog.is_saved().unwrap());

    let loaded = env.load();
    assert!(loaded.same_records(&catalog));
    assert_eq!(loaded.get("0").unwrap().single("Studio").unwrap(), "Acme");
    assert_eq!(loaded.get("1").unwrap().list("Tags").unwrap(), &["Sky"]);
    assert_eq!(loaded.count("1", "Changed").unwrap(), 1);
    assert_eq!(loaded.count("2", "Changed").unwrap(), 0);
}

#[test]
fn test_snapshot_format() {
    let env = TestEnv::new();
    let catalog = env.create();
    catalog.save().unwrap();

    let content = fs::read_to_string(catalog.snapshot_path()).unwrap();
    assert!(content.contains("\n    \"Acme/Red_Hat.mp4\": {"));
    let snapshot: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        snapshot["Acme/blue-sky.mp4"]["ID"],
        json!({"type": "Single", "value": "1"})
    );
    assert_eq!(
        snapshot["Zeta/green.mkv"]["Tags"],
        json!({"type": "List", "value": ["emptyTags"]})
    );
}

#[test]
fn test_second_save_keeps_a_backup() {
    let env = TestEnv::new();
    let catalog = env.create();
    let dir = catalog.catalog_dir();

    catalog.save().unwrap();
    assert!(backups(&dir).is_empty());
    catalog.save().unwrap();
    assert_eq!(backups(&dir).len(), 1);
}

#[test]
fn test_dummy_catalog_never_writes() {
    let env = TestEnv::new();
    let schema = Schema::from_path(&env.model_path).unwrap();
    let options = CatalogOptions {
        dummy: true,
        ..CatalogOptions::default()
    };
    let catalog = Catalog::create(&env.root, schema, options).unwrap();
    assert_eq!(catalog.len(), 3);
    assert!(!catalog.save().unwrap());
    assert!(!env.root.join(CATALOG_DIR).exists());
}

#[test]
fn test_open_or_create() {
    let env = TestEnv::new();
    assert!(matches!(
        Catalog::open_or_create(&env.root, None, CatalogOptions::default()),
        Err(ShelfError::NotInitialized(_))
    ));

    let (catalog, mode) =
        Catalog::open_or_create(&env.root, Some(&env.model_path), CatalogOptions::default())
            .unwrap();
    assert_eq!(mode, OpenMode::Created);
    catalog.save().unwrap();

    let (reopened, mode) =
        Catalog::open_or_create(&env.root, None, CatalogOptions::default()).unwrap();
    assert_eq!(mode, OpenMode::Loaded);
    assert!(reopened.same_records(&catalog));
}

#[test]
fn test_load_with_wider_schema_fills_defaults() {
    let env = TestEnv::new();
    env.create().save().unwrap();

    let mut wider = model();
    wider["Rating"] =
        json!({"Type": "Item", "default": "0", "itemType": "int", "plugin": "", "hide": ""});
    let schema = Schema::parse(wider).unwrap();
    let catalog = Catalog::load_with_schema(&env.root, schema, CatalogOptions::default()).unwrap();
    assert!(catalog
        .records()
        .iter()
        .all(|r| r.single("Rating").unwrap() == "0"));
}

// ============================================================================
// Reconciliation
// ============================================================================

#[test]
fn test_sync_after_filesystem_changes() {
    let env = TestEnv::new();
    let mut catalog = env.create();
    catalog.modify_single("2", "Studio", "Zeta").unwrap();
    catalog.save().unwrap();

    env.move_file("Zeta/green.mkv", "Archive/green.mkv");
    env.remove_file("Acme/Red_Hat.mp4");
    env.write_file("Acme/purple.mp4", "");

    let mut catalog = env.load();
    let moved = catalog.check_changed_paths().unwrap();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].id, "2");
    assert_eq!(moved[0].new_path, "Archive/green.mkv");

    assert_eq!(catalog.missing_files().unwrap(), vec!["Acme/Red_Hat.mp4"]);
    let changes = catalog.check_missing_files(true).unwrap();
    assert_eq!(
        changes,
        vec![IdChange {
            from: "2".into(),
            to: "0".into()
        }]
    );
    let moved_record = catalog.get(SelectBy::Path("Archive/green.mkv".into())).unwrap();
    assert_eq!(moved_record.id(), "0");
    assert_eq!(moved_record.single("Studio").unwrap(), "Zeta");

    let added = catalog.find_new_files().unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].path, "Acme/purple.mp4");
    assert_eq!(added[0].id, "2");
    assert_eq!(catalog.max_id(), 2);
    assert_eq!(catalog.used_ids().into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);

    catalog.save().unwrap();
    assert!(env.load().same_records(&catalog));
}

#[test]
fn test_backup_sync_keeps_ids_then_resets() {
    let env = TestEnv::new();
    let catalog = env.create();
    catalog.save().unwrap();
    env.remove_file("Acme/Red_Hat.mp4");

    let mut catalog = env.load();
    assert!(catalog.check_missing_files(false).unwrap().is_empty());
    assert_eq!(catalog.ids(), vec!["1", "2"]);
    catalog.reset_ids().unwrap();
    assert_eq!(catalog.ids(), vec!["0", "1"]);
    assert_eq!(catalog.max_id(), 1);
}

#[test]
fn test_new_files_after_reloading_catalog_with_gaps() {
    let env = TestEnv::new();
    let mut catalog = env.create();
    env.remove_file("Acme/blue-sky.mp4");
    assert!(catalog.check_missing_files(false).unwrap().is_empty());
    catalog.save().unwrap();

    let mut catalog = env.load();
    assert_eq!(catalog.ids(), vec!["0", "2"]);
    assert_eq!(catalog.max_id(), 2);

    env.write_file("Zeta/orange.mp4", "");
    env.write_file("Zeta/teal.mp4", "");
    let added = catalog.find_new_files().unwrap();
    let assigned: BTreeSet<String> = added.into_iter().map(|f| f.id).collect();
    assert_eq!(assigned, set(&["1", "3"]));
    assert_eq!(catalog.used_ids().into_iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(catalog.get("2").unwrap().path(), "Zeta/green.mkv");
    assert_eq!(catalog.max_id(), 3);

    catalog.save().unwrap();
    let reloaded = env.load();
    assert_eq!(reloaded.max_id(), 3);
    assert!(reloaded.same_records(&catalog));
}

// ============================================================================
// Query / guess / random
// ============================================================================

fn tagged_catalog(env: &TestEnv) -> Catalog {
    let mut catalog = env.create();
    for (id, studio, tags) in [
        ("0", "Acme", &["Red", "Hat Trick"][..]),
        ("1", "Acme", &["Blue"][..]),
        ("2", "Zeta", &["Green", "Red"][..]),
    ] {
        catalog.modify_single(id, "Studio", studio).unwrap();
        for tag in tags {
            catalog
                .modify_list(id, "Tags", ListEdit::Append(tag.to_string()))
                .unwrap();
        }
    }
    catalog
}

#[test]
fn test_query_with_vetoes() {
    let env = TestEnv::new();
    let catalog = tagged_catalog(&env);
    let fields = ["Studio", "Tags"];
    assert_eq!(catalog.query_ids(&fields, &["Red"]).unwrap(), vec!["0", "2"]);
    assert_eq!(
        catalog.query_ids(&fields, &["Red", "!Zeta"]).unwrap(),
        vec!["0"]
    );
    assert_eq!(catalog.query_ids(&fields, &["!Acme"]).unwrap(), vec!["2"]);
    assert_eq!(catalog.query_ids(&fields, &["Trick"]).unwrap(), vec!["0"]);
}

#[test]
fn test_guess_from_new_path() {
    let env = TestEnv::new();
    let mut catalog = tagged_catalog(&env);
    let guesses = catalog
        .guess_fields("Zeta/Blue_Hat_Trick.mp4", GuessOptions::default())
        .unwrap();
    assert_eq!(guesses["Studio"], set(&["Zeta"]));
    assert_eq!(guesses["Tags"], set(&["Blue", "Hat Trick"]));
}

#[test]
fn test_random_pick_from_query() {
    let env = TestEnv::new();
    let mut catalog = tagged_catalog(&env);
    let candidates = catalog.query_ids(&["Studio"], &["Acme"]).unwrap();
    for _ in 0..10 {
        let id = catalog
            .random_record(&candidates, true, Default::default())
            .unwrap();
        assert!(id == "0" || id == "1");
    }

    catalog.mark_opened("1").unwrap();
    assert_eq!(catalog.count("1", "Opened").unwrap(), 1);
    assert_eq!(catalog.sorted_ids("Opened", true).unwrap()[0], "1");
}
