//! Shared fixtures for catalog unit tests.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::db::{Catalog, CatalogOptions};
use super::model::Schema;
use super::types::{ListEdit, ADDED_FIELD};

/// Schema with the mandatory fields plus `SingleItem`, `Rating` and
/// `ListItem`; `SingleItem` and `ListItem` are guessable.
pub fn model_json() -> Value {
    json!({
        "General": {
            "Name": "TestModel",
            "Description": "Model used by the catalog tests",
            "Types": ["mp4"],
            "Separators": [".", "-", "_", "+"],
            "SecondaryDBs": ["SingleItem", "ListItem"]
        },
        "ID": {"Type": "Item", "default": "-1", "itemType": "int", "plugin": "", "hide": ""},
        "Path": {"Type": "Item", "default": "emptyPath", "itemType": "str", "plugin": "", "hide": ""},
        "Name": {"Type": "Item", "default": "emptyName", "itemType": "str", "plugin": "", "hide": ""},
        "Added": {"Type": "Item", "default": "emptyAdded", "itemType": "datetime", "plugin": "", "hide": ""},
        "SingleItem": {"Type": "Item", "default": "emptySingleItem", "itemType": "str", "plugin": "", "hide": ""},
        "Rating": {"Type": "Item", "default": "0", "itemType": "int", "plugin": "", "hide": ""},
        "Opened": {"Type": "ListItem", "default": ["emptyOpened"], "itemType": "datetime", "plugin": "", "hide": ""},
        "Changed": {"Type": "ListItem", "default": ["emptyChanged"], "itemType": "datetime", "plugin": "", "hide": ""},
        "ListItem": {"Type": "ListItem", "default": ["emptyListItem"], "itemType": "str", "plugin": "", "hide": ""}
    })
}

pub fn test_schema() -> Schema {
    Schema::parse(model_json()).unwrap()
}

/// Temporary catalog root.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Root with six `.mp4` files and two files that do not match.
    ///
    /// Discovery order gives the IDs:
    /// 0 folder1/folder1file1, 1 folder1/folder1file2,
    /// 2 folder2/folder2file1, 3 folder2/folder2file2,
    /// 4 folder2/folder3/folder3file1, 5 rootFile1
    pub fn with_fixture_files() -> Self {
        let env = Self::new();
        for path in [
            "rootFile1.mp4",
            "rootFile1",
            "notes.txt",
            "folder1/folder1file1.mp4",
            "folder1/folder1file2.mp4",
            "folder2/folder2file1.mp4",
            "folder2/folder2file2.mp4",
            "folder2/folder3/folder3file1.mp4",
        ] {
            env.write_file(path, "");
        }
        env
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn remove_file(&self, relative: &str) {
        fs::remove_file(self.dir.path().join(relative)).unwrap();
    }

    pub fn move_file(&self, from: &str, to: &str) {
        let target = self.dir.path().join(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::rename(self.dir.path().join(from), target).unwrap();
    }

    /// Write the fixture schema outside the scanned tree.
    pub fn write_model(&self) -> PathBuf {
        let path = self.dir.path().join(".model.json");
        fs::write(&path, model_json().to_string()).unwrap();
        path
    }
}

/// Fresh catalog over the fixture files with every field at its default.
pub fn fixture_catalog(env: &TestEnv) -> Catalog {
    Catalog::create(env.root(), test_schema(), CatalogOptions::default()).unwrap()
}

/// Fixture catalog with values set:
///
/// | ID | SingleItem | Rating | ListItem                | Added             |
/// |----|------------|--------|-------------------------|-------------------|
/// | 0  | Xi         | 0      | Blue, Triple Orange     | 01.06.20|12:00:00 |
/// | 1  | Tau        | 2      | Red                     | 01.03.20|12:00:00 |
/// | 2  | Omega      | 4      | Double Orange           | 01.05.20|12:00:00 |
/// | 3  | Ny         | 5      | Lavender, Eta           | 01.05.20|12:00:00 |
/// | 4  | Beta       | 3      | Lavender                | 01.02.20|12:00:00 |
/// | 5  | Alpha      | 1      | (default)               | 01.04.20|12:00:00 |
pub fn populated_catalog(env: &TestEnv) -> Catalog {
    let mut catalog = fixture_catalog(env);
    let rows: [(&str, &str, &str, &[&str], &str); 6] = [
        ("0", "Xi", "0", &["Blue", "Triple Orange"], "01.06.20|12:00:00"),
        ("1", "Tau", "2", &["Red"], "01.03.20|12:00:00"),
        ("2", "Omega", "4", &["Double Orange"], "01.05.20|12:00:00"),
        ("3", "Ny", "5", &["Lavender", "Eta"], "01.05.20|12:00:00"),
        ("4", "Beta", "3", &["Lavender"], "01.02.20|12:00:00"),
        ("5", "Alpha", "1", &[], "01.04.20|12:00:00"),
    ];
    for (id, single, rating, list, added) in rows {
        catalog.modify_single(id, "SingleItem", single).unwrap();
        catalog.modify_single(id, "Rating", rating).unwrap();
        catalog.modify_single(id, ADDED_FIELD, added).unwrap();
        for value in list {
            catalog
                .modify_list(id, "ListItem", ListEdit::Append(value.to_string()))
                .unwrap();
        }
    }
    catalog
}
