//! The catalog: records of one root directory, their index and persistence.

use chrono::Local;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::cache::ValueCache;
use super::entry::{FieldValue, Record};
use super::error::{Result, ShelfError};
use super::history::{RecentIds, DEFAULT_HISTORY_LEN};
use super::model::Schema;
use super::plugin::{MetadataPlugin, OsDataPlugin};
use super::scanner::{self, DiscoveredFile};
use super::timefmt::{self, TimeFormat};
use super::to_pretty_json;
use super::types::{
    FieldKind, ListEdit, OpenMode, SelectBy, ADDED_FIELD, CHANGED_FIELD, ID_FIELD, NAME_FIELD,
    OPENED_FIELD, PATH_FIELD,
};

/// Name of the catalog directory under the root.
pub const CATALOG_DIR: &str = ".shelfmark";
/// Schema copy inside the catalog directory.
pub const MODEL_FILE: &str = "model.json";
/// Record snapshot inside the catalog directory.
pub const SNAPSHOT_FILE: &str = "mainDB.json";

/// Per-instance catalog settings.
#[derive(Clone)]
pub struct CatalogOptions {
    /// Read-only throwaway instance: no marker checks, no writes.
    pub dummy: bool,
    /// Size of the recently-executed FIFO.
    pub history_len: usize,
    /// Source of values for fields with a plugin descriptor.
    pub plugin: Arc<dyn MetadataPlugin>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            dummy: false,
            history_len: DEFAULT_HISTORY_LEN,
            plugin: Arc::new(OsDataPlugin),
        }
    }
}

impl fmt::Debug for CatalogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogOptions")
            .field("dummy", &self.dummy)
            .field("history_len", &self.history_len)
            .finish_non_exhaustive()
    }
}

/// In-memory catalog of one root directory.
pub struct Catalog {
    pub(crate) root: PathBuf,
    pub(crate) schema: Schema,
    pub(crate) records: Vec<Record>,
    id_index: HashMap<String, usize>,
    pub(crate) max_id: i64,
    cache: ValueCache,
    pub(crate) recent: RecentIds,
    dummy: bool,
    plugin: Arc<dyn MetadataPlugin>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("root", &self.root)
            .field("schema", &self.schema.name())
            .field("records", &self.records.len())
            .field("max_id", &self.max_id)
            .field("dummy", &self.dummy)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    fn empty(root: &Path, schema: Schema, options: &CatalogOptions) -> Self {
        let cache = ValueCache::new(schema.all_fields());
        Self {
            root: root.to_path_buf(),
            schema,
            records: Vec::new(),
            id_index: HashMap::new(),
            max_id: -1,
            cache,
            recent: RecentIds::new(options.history_len),
            dummy: options.dummy,
            plugin: Arc::clone(&options.plugin),
        }
    }

    /// Create a new catalog at `root` and index every matching file.
    ///
    /// Fails if a catalog already exists there, unless `options.dummy`.
    pub fn create(root: &Path, schema: Schema, options: CatalogOptions) -> Result<Self> {
        let mut catalog = Self::empty(root, schema, &options);
        let dir = catalog.catalog_dir();

        if catalog.dummy {
            warn!(root = %root.display(), "Creating catalog as dummy, saving is disabled");
        } else {
            if dir.exists() {
                return Err(ShelfError::AlreadyInitialized(root.display().to_string()));
            }
            info!(root = %root.display(), "Creating catalog directory");
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(MODEL_FILE), to_pretty_json(catalog.schema.document())?)?;
        }

        let files = scanner::scan(root, &catalog.schema)?;
        for (id, file) in files.iter().enumerate() {
            debug!(path = %file.relative, id, "Adding file");
            let record = catalog.build_record(file, id as u64)?;
            catalog.insert_record(record);
        }
        catalog.max_id = catalog.records.len() as i64 - 1;
        catalog.prime_cache();

        info!(records = catalog.records.len(), "Catalog created");
        Ok(catalog)
    }

    /// Load the catalog saved at `root` using its stored schema.
    pub fn load(root: &Path, options: CatalogOptions) -> Result<Self> {
        let dir = root.join(CATALOG_DIR);
        if !dir.exists() && !options.dummy {
            return Err(ShelfError::NotInitialized(root.display().to_string()));
        }
        let schema = Schema::from_path(&dir.join(MODEL_FILE))?;
        Self::load_with_schema(root, schema, options)
    }

    /// Load the catalog saved at `root`, interpreting it with `schema`.
    pub fn load_with_schema(root: &Path, schema: Schema, options: CatalogOptions) -> Result<Self> {
        let mut catalog = Self::empty(root, schema, &options);
        if catalog.dummy {
            debug!(root = %root.display(), "Loading catalog as dummy");
        } else if !catalog.catalog_dir().exists() {
            return Err(ShelfError::NotInitialized(root.display().to_string()));
        }

        let snapshot_path = catalog.snapshot_path();
        if !snapshot_path.exists() {
            return Err(ShelfError::NotInitialized(format!(
                "{} (no {} saved)",
                root.display(),
                SNAPSHOT_FILE
            )));
        }
        let content = fs::read_to_string(&snapshot_path)?;
        let snapshot: IndexMap<String, Record> = serde_json::from_str(&content)?;

        for (path, mut record) in snapshot {
            catalog.conform_to_schema(&path, &mut record)?;
            catalog.insert_record(record);
        }
        // Saved IDs may have gaps, so the highest one can exceed len - 1.
        let highest = catalog
            .records
            .iter()
            .filter_map(|r| r.id_number())
            .max()
            .unwrap_or(-1);
        catalog.max_id = highest.max(catalog.records.len() as i64 - 1);
        catalog.prime_cache();

        info!(
            root = %root.display(),
            records = catalog.records.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Load the catalog at `root` if one exists, otherwise create it from
    /// the schema at `schema_path`.
    pub fn open_or_create(
        root: &Path,
        schema_path: Option<&Path>,
        options: CatalogOptions,
    ) -> Result<(Self, OpenMode)> {
        if root.join(CATALOG_DIR).exists() {
            return Ok((Self::load(root, options)?, OpenMode::Loaded));
        }
        let schema_path = schema_path.ok_or_else(|| {
            ShelfError::NotInitialized(format!(
                "{} (a schema is required to create a catalog)",
                root.display()
            ))
        })?;
        let schema = Schema::from_path(schema_path)?;
        Ok((Self::create(root, schema, options)?, OpenMode::Created))
    }

    /// Drop snapshot fields the schema does not know and fill in missing ones.
    fn conform_to_schema(&self, key: &str, record: &mut Record) -> Result<()> {
        let unknown: Vec<String> = record
            .field_names()
            .filter(|name| !self.schema.has_field(name))
            .map(str::to_string)
            .collect();
        for name in unknown {
            warn!(
                field = %name,
                path = %key,
                "Field in snapshot is not part of the schema and is ignored; it will be lost on next save"
            );
            record.drop_field(&name);
        }

        for field in self.schema.all_fields() {
            let def = self.schema.field(field)?;
            match record.get(field) {
                Ok(value) if value.kind() != def.kind => {
                    return Err(ShelfError::Config(format!(
                        "field '{}' of '{}' is stored as {} but the schema declares {}",
                        field,
                        key,
                        value.kind().as_str(),
                        def.kind.as_str()
                    )));
                }
                Ok(FieldValue::List(values)) if values.is_empty() => {
                    record.list_mut(field)?.push(def.default.clone());
                }
                Ok(_) => {}
                Err(_) => {
                    debug!(field, path = %key, "Filling missing field with default");
                    let value = if field == PATH_FIELD {
                        key.to_string()
                    } else {
                        def.default.clone()
                    };
                    record.add_field(field, default_value(def.kind, value))?;
                }
            }
        }
        Ok(())
    }

    /// Build a record for a discovered file.
    pub(crate) fn build_record(&self, file: &DiscoveredFile, id: u64) -> Result<Record> {
        let mut fields = Vec::new();
        for field in self.schema.all_fields() {
            let def = self.schema.field(field)?;
            let value = match field {
                ID_FIELD => FieldValue::Single(id.to_string()),
                PATH_FIELD => FieldValue::Single(file.relative.clone()),
                NAME_FIELD => FieldValue::Single(file.name.clone()),
                ADDED_FIELD => FieldValue::Single(timefmt::now(TimeFormat::Full)),
                _ => default_value(def.kind, def.default.clone()),
            };
            fields.push((field.to_string(), value));
        }
        let mut record = Record::new(fields)?;

        let descriptors = self.schema.plugin_descriptors();
        if !descriptors.is_empty() {
            let full_path = self.root.join(&file.relative);
            let values = self.plugin.plugin_values(&full_path, &descriptors)?;
            for (descriptor, value) in values {
                let Some(field) = self.schema.field_for_plugin(&descriptor) else {
                    warn!(descriptor = %descriptor, "Plugin returned a value nobody asked for");
                    continue;
                };
                match self.schema.field_kind(field)? {
                    FieldKind::Single => record.set_single(field, value)?,
                    FieldKind::List => *record.list_mut(field)? = vec![value],
                }
            }
        }
        Ok(record)
    }

    /// Append a record and index it.
    pub(crate) fn insert_record(&mut self, record: Record) {
        let id = record.id().to_string();
        if self.id_index.contains_key(&id) {
            warn!(id = %id, path = %record.path(), "Duplicate ID in catalog");
        }
        self.id_index.insert(id, self.records.len());
        self.records.push(record);
        self.cache.invalidate_all();
    }

    pub(crate) fn rebuild_index(&mut self) {
        self.id_index = self
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.id().to_string(), idx))
            .collect();
    }

    fn prime_cache(&mut self) {
        let fields: Vec<String> = self.schema.all_fields().map(str::to_string).collect();
        for field in fields {
            let values = self.collect_values(&field);
            self.cache.store(&field, values);
        }
    }

    fn collect_values(&self, field: &str) -> BTreeSet<String> {
        self.records
            .iter()
            .filter_map(|record| record.get(field).ok())
            .flat_map(|value| value.values().iter().cloned())
            .collect()
    }

    // ---- persistence ----

    pub fn catalog_dir(&self) -> PathBuf {
        self.root.join(CATALOG_DIR)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.catalog_dir().join(SNAPSHOT_FILE)
    }

    /// Backup file written when saving on `date_label` (`YY-MM-DD`).
    pub fn backup_path(&self, date_label: &str) -> PathBuf {
        self.catalog_dir()
            .join(format!("mainDB.{}.backup", date_label))
    }

    /// Write the snapshot, backing up the previous one first.
    ///
    /// Returns `Ok(false)` without writing for dummy catalogs.
    pub fn save(&self) -> Result<bool> {
        if self.dummy {
            error!(root = %self.root.display(), "Catalog is a dummy, saving is disabled");
            return Ok(false);
        }

        let snapshot_path = self.snapshot_path();
        if snapshot_path.exists() {
            let backup = self.backup_path(&timefmt::backup_date(Local::now().date_naive()));
            debug!(backup = %backup.display(), "Backing up snapshot");
            fs::copy(&snapshot_path, &backup)?;
        }

        let snapshot: IndexMap<&str, &Record> = self
            .records
            .iter()
            .map(|record| (record.path(), record))
            .collect();
        fs::write(&snapshot_path, to_pretty_json(&snapshot)?)?;
        info!(
            path = %snapshot_path.display(),
            records = self.records.len(),
            "Catalog saved"
        );
        Ok(true)
    }

    /// Whether the in-memory records equal the saved snapshot.
    pub fn is_saved(&self) -> Result<bool> {
        if !self.snapshot_path().exists() {
            info!("No snapshot saved yet");
            return Ok(false);
        }
        let options = CatalogOptions {
            dummy: true,
            history_len: 0,
            plugin: Arc::clone(&self.plugin),
        };
        let saved = Self::load_with_schema(&self.root, self.schema.clone(), options)?;
        Ok(self.same_records(&saved))
    }

    /// Order-independent comparison of the records of two catalogs.
    pub fn same_records(&self, other: &Catalog) -> bool {
        self.records.len() == other.records.len()
            && self.records.iter().all(|r| other.records.contains(r))
            && other.records.iter().all(|r| self.records.contains(r))
    }

    // ---- lookup ----

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest assigned ID, `-1` for an empty catalog.
    pub fn max_id(&self) -> i64 {
        self.max_id
    }

    pub fn is_dummy(&self) -> bool {
        self.dummy
    }

    /// IDs in record order.
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id().to_string()).collect()
    }

    /// Records whose `field` holds `value` (list fields: contain it).
    pub fn records_by_field(&self, field: &str, value: &str) -> Result<Vec<&Record>> {
        self.schema.field(field)?;
        Ok(self
            .records
            .iter()
            .filter(|record| {
                record
                    .get(field)
                    .map(|held| held.contains(value))
                    .unwrap_or(false)
            })
            .collect())
    }

    pub fn get_by_id(&self, id: &str) -> Result<&Record> {
        self.id_index
            .get(id)
            .and_then(|idx| self.records.get(*idx))
            .ok_or_else(|| ShelfError::RecordNotFound(format!("ID={}", id)))
    }

    pub fn get(&self, selector: impl Into<SelectBy>) -> Result<&Record> {
        let idx = self.resolve(&selector.into())?;
        Ok(&self.records[idx])
    }

    /// Index of the record addressed by `selector`.
    pub(crate) fn resolve(&self, selector: &SelectBy) -> Result<usize> {
        let found = match selector {
            SelectBy::Id(id) => self.id_index.get(id.as_str()).copied(),
            SelectBy::Name(value) | SelectBy::Path(value) => {
                let field = selector.field();
                self.records
                    .iter()
                    .position(|r| r.single(field).map(|v| v == value).unwrap_or(false))
            }
        };
        found.ok_or_else(|| ShelfError::RecordNotFound(selector.to_string()))
    }

    /// Every value `field` holds across the catalog, refreshed if stale.
    pub fn all_values(&mut self, field: &str) -> Result<&BTreeSet<String>> {
        self.schema.field(field)?;
        if !self.cache.is_fresh(field) {
            debug!(field, "Refreshing value cache");
            let values = self.collect_values(field);
            self.cache.store(field, values);
        }
        self.cache
            .get(field)
            .ok_or_else(|| ShelfError::UnknownField(field.to_string()))
    }

    /// Whether the cached values of `field` are current.
    pub fn is_cached(&self, field: &str) -> bool {
        self.cache.is_fresh(field)
    }

    // ---- mutation ----

    pub fn remove(&mut self, selector: impl Into<SelectBy>) -> Result<Record> {
        let idx = self.resolve(&selector.into())?;
        let record = self.records.remove(idx);
        self.rebuild_index();
        self.cache.invalidate_all();
        debug!(id = %record.id(), path = %record.path(), "Removed record");
        Ok(record)
    }

    /// Replace the value of a single field.
    ///
    /// Appends a timestamp to `Changed` unless the edited field is the one
    /// used to select the record.
    pub fn modify_single(
        &mut self,
        selector: impl Into<SelectBy>,
        field: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        let selector = selector.into();
        if self.schema.field_kind(field)? != FieldKind::Single {
            return Err(ShelfError::WrongFieldKind {
                field: field.to_string(),
                expected: FieldKind::Single.as_str(),
            });
        }
        let idx = self.resolve(&selector)?;
        let value = value.into();

        if field == ID_FIELD || field == PATH_FIELD {
            if let Some(other) = self
                .records
                .iter()
                .position(|r| r.single(field).map(|v| v == value).unwrap_or(false))
            {
                if other != idx {
                    return Err(ShelfError::InvalidArgument(format!(
                        "{} '{}' is already used by another record",
                        field, value
                    )));
                }
            }
        }

        self.set_single_at(idx, field, value)?;
        if field != selector.field() {
            self.touch_changed(idx)?;
        }
        Ok(())
    }

    /// Set a single field without recording a change.
    pub(crate) fn set_single_at(&mut self, idx: usize, field: &str, value: String) -> Result<()> {
        self.records[idx].set_single(field, value)?;
        if field == ID_FIELD {
            self.rebuild_index();
        }
        self.cache.invalidate(field);
        Ok(())
    }

    /// Edit a list field. The field never ends up empty: the first real
    /// value replaces the default and removing the last value restores it.
    pub fn modify_list(
        &mut self,
        selector: impl Into<SelectBy>,
        field: &str,
        edit: ListEdit,
    ) -> Result<()> {
        if self.schema.field_kind(field)? != FieldKind::List {
            return Err(ShelfError::WrongFieldKind {
                field: field.to_string(),
                expected: FieldKind::List.as_str(),
            });
        }
        let idx = self.resolve(&selector.into())?;
        let default = self.schema.default_value(field)?.to_string();

        match edit {
            ListEdit::Append(value) => append_value(&mut self.records[idx], field, &default, value)?,
            ListEdit::Replace { old, new } => {
                let record = &mut self.records[idx];
                record.remove_value(field, &old)?;
                record.add_value(field, new)?;
            }
            ListEdit::Remove(old) => {
                let record = &mut self.records[idx];
                record.remove_value(field, &old)?;
                let values = record.list_mut(field)?;
                if values.is_empty() {
                    values.push(default);
                }
            }
        }
        self.cache.invalidate(field);

        if field != CHANGED_FIELD && field != OPENED_FIELD {
            self.touch_changed(idx)?;
        }
        Ok(())
    }

    fn touch_changed(&mut self, idx: usize) -> Result<()> {
        let default = self.schema.default_value(CHANGED_FIELD)?.to_string();
        append_value(
            &mut self.records[idx],
            CHANGED_FIELD,
            &default,
            timefmt::now(TimeFormat::Full),
        )?;
        self.cache.invalidate(CHANGED_FIELD);
        Ok(())
    }

    /// Number of real values in a list field (0 when only the default).
    pub fn count(&self, selector: impl Into<SelectBy>, field: &str) -> Result<usize> {
        if self.schema.field_kind(field)? != FieldKind::List {
            return Err(ShelfError::WrongFieldKind {
                field: field.to_string(),
                expected: FieldKind::List.as_str(),
            });
        }
        let idx = self.resolve(&selector.into())?;
        let values = self.records[idx].list(field)?;
        let default = self.schema.default_value(field)?;
        if is_only_default(values, default) {
            Ok(0)
        } else {
            Ok(values.len())
        }
    }

    /// Append the current time to `Opened`.
    pub fn mark_opened(&mut self, selector: impl Into<SelectBy>) -> Result<()> {
        self.modify_list(
            selector,
            OPENED_FIELD,
            ListEdit::Append(timefmt::now(TimeFormat::Full)),
        )
    }

    /// Remember that `id` was just executed.
    pub fn record_executed(&mut self, id: impl Into<String>) {
        self.recent.push(id);
    }

    pub fn recent_ids(&self) -> &RecentIds {
        &self.recent
    }
}

fn default_value(kind: FieldKind, default: String) -> FieldValue {
    match kind {
        FieldKind::Single => FieldValue::Single(default),
        FieldKind::List => FieldValue::List(vec![default]),
    }
}

pub(crate) fn is_only_default(values: &[String], default: &str) -> bool {
    values.len() == 1 && values[0] == default
}

fn append_value(record: &mut Record, field: &str, default: &str, value: String) -> Result<()> {
    let values = record.list_mut(field)?;
    if is_only_default(values, default) {
        *values = vec![value];
    } else if !values.contains(&value) {
        values.push(value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{fixture_catalog, populated_catalog, test_schema, TestEnv};

    #[test]
    fn test_fresh_scan() {
        let env = TestEnv::new();
        env.write_file("a.mp4", "");
        env.write_file("sub/b.mp4", "");
        env.write_file("sub/deeper/c.mp4", "");
        env.write_file("notes.txt", "");
        env.write_file("noext", "");

        let catalog = Catalog::create(env.root(), test_schema(), CatalogOptions::default()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.max_id(), 2);
        let mut ids = catalog.ids();
        ids.sort();
        assert_eq!(ids, vec!["0", "1", "2"]);

        let rec = catalog.get(SelectBy::Path("sub/b.mp4".into())).unwrap();
        assert_eq!(rec.name(), "b");
        assert!(timefmt::is_timestamp(rec.single(ADDED_FIELD).unwrap()));
        assert_eq!(rec.list(OPENED_FIELD).unwrap(), &["emptyOpened"]);
        assert_eq!(rec.list(CHANGED_FIELD).unwrap(), &["emptyChanged"]);
        assert!(env.root().join(CATALOG_DIR).join(MODEL_FILE).exists());
    }

    #[test]
    fn test_create_refuses_existing_catalog() {
        let env = TestEnv::with_fixture_files();
        Catalog::create(env.root(), test_schema(), CatalogOptions::default()).unwrap();
        assert!(matches!(
            Catalog::create(env.root(), test_schema(), CatalogOptions::default()),
            Err(ShelfError::AlreadyInitialized(_))
        ));

        let dummy = CatalogOptions {
            dummy: true,
            ..CatalogOptions::default()
        };
        let catalog = Catalog::create(env.root(), test_schema(), dummy).unwrap();
        assert_eq!(catalog.len(), 6);
        assert!(!catalog.save().unwrap());
    }

    #[test]
    fn test_load_requires_catalog() {
        let env = TestEnv::with_fixture_files();
        assert!(matches!(
            Catalog::load(env.root(), CatalogOptions::default()),
            Err(ShelfError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let env = TestEnv::with_fixture_files();
        let catalog = populated_catalog(&env);
        assert!(!catalog.is_saved().unwrap());
        assert!(catalog.save().unwrap());
        assert!(catalog.is_saved().unwrap());

        let loaded = Catalog::load(env.root(), CatalogOptions::default()).unwrap();
        assert!(catalog.same_records(&loaded));
        assert_eq!(loaded.max_id(), 5);
        assert_eq!(loaded.get("3").unwrap().path(), "folder2/folder2file2.mp4");
    }

    #[test]
    fn test_unsaved_change_is_detected() {
        let env = TestEnv::with_fixture_files();
        let mut catalog = fixture_catalog(&env);
        catalog.save().unwrap();
        catalog.modify_single("1", "SingleItem", "Gamma").unwrap();
        assert!(!catalog.is_saved().unwrap());
    }

    #[test]
    fn test_second_save_writes_dated_backup() {
        let env = TestEnv::with_fixture_files();
        let catalog = fixture_catalog(&env);
        catalog.save().unwrap();
        catalog.save().unwrap();
        let label = timefmt::backup_date(Local::now().date_naive());
        assert!(catalog.backup_path(&label).exists());
    }

    #[test]
    fn test_load_drops_unknown_fields() {
        let env = TestEnv::with_fixture_files();
        let catalog = fixture_catalog(&env);
        catalog.save().unwrap();

        let path = catalog.snapshot_path();
        let mut snapshot: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        snapshot["rootFile1.mp4"]["Legacy"] = serde_json::json!({"type": "Single", "value": "x"});
        fs::write(&path, snapshot.to_string()).unwrap();

        let loaded = Catalog::load(env.root(), CatalogOptions::default()).unwrap();
        let rec = loaded.get(SelectBy::Path("rootFile1.mp4".into())).unwrap();
        assert!(!rec.has_field("Legacy"));
        assert!(catalog.same_records(&loaded));
    }

    #[test]
    fn test_open_or_create() {
        let env = TestEnv::with_fixture_files();
        assert!(matches!(
            Catalog::open_or_create(env.root(), None, CatalogOptions::default()),
            Err(ShelfError::NotInitialized(_))
        ));

        let model = env.write_model();
        let (catalog, mode) =
            Catalog::open_or_create(env.root(), Some(&model), CatalogOptions::default()).unwrap();
        assert_eq!(mode, OpenMode::Created);
        catalog.save().unwrap();

        let (_, mode) = Catalog::open_or_create(env.root(), None, CatalogOptions::default()).unwrap();
        assert_eq!(mode, OpenMode::Loaded);
    }

    #[test]
    fn test_lookup_by_selector() {
        let env = TestEnv::with_fixture_files();
        let catalog = fixture_catalog(&env);
        assert_eq!(catalog.get(5u64).unwrap().name(), "rootFile1");
        assert_eq!(
            catalog.get(SelectBy::Name("folder1file2".into())).unwrap().id(),
            "1"
        );
        assert!(matches!(catalog.get("17"), Err(ShelfError::RecordNotFound(_))));
        assert!(matches!(
            catalog.get(SelectBy::Path("missing.mp4".into())),
            Err(ShelfError::RecordNotFound(_))
        ));
        assert!(matches!(
            catalog.records_by_field("Nope", "x"),
            Err(ShelfError::UnknownField(_))
        ));
    }

    #[test]
    fn test_cache_reflects_mutation() {
        let env = TestEnv::with_fixture_files();
        let mut catalog = populated_catalog(&env);
        assert!(catalog.all_values("SingleItem").unwrap().contains("Xi"));
        assert!(catalog.is_cached("SingleItem"));

        catalog.modify_single("0", "SingleItem", "Psi").unwrap();
        assert!(!catalog.is_cached("SingleItem"));
        let values = catalog.all_values("SingleItem").unwrap();
        assert!(values.contains("Psi") && !values.contains("Xi"));

        catalog
            .modify_list("4", "ListItem", ListEdit::Append("Magenta".into()))
            .unwrap();
        assert!(catalog.all_values("ListItem").unwrap().contains("Magenta"));
        assert!(matches!(
            catalog.all_values("Nope"),
            Err(ShelfError::UnknownField(_))
        ));
    }

    #[test]
    fn test_modify_single_records_change() {
        let env = TestEnv::with_fixture_files();
        let mut catalog = fixture_catalog(&env);
        catalog.modify_single("2", "SingleItem", "Kappa").unwrap();
        let rec = catalog.get("2").unwrap();
        assert_eq!(rec.single("SingleItem").unwrap(), "Kappa");
        let changed = rec.list(CHANGED_FIELD).unwrap();
        assert_eq!(changed.len(), 1);
        assert!(timefmt::is_timestamp(&changed[0]));

        assert!(matches!(
            catalog.modify_single("2", "ListItem", "x"),
            Err(ShelfError::WrongFieldKind { .. })
        ));
        assert!(matches!(
            catalog.modify_single("2", "Nope", "x"),
            Err(ShelfError::UnknownField(_))
        ));
    }

    #[test]
    fn test_selector_self_edit_skips_change() {
        let env = TestEnv::with_fixture_files();
        let mut catalog = fixture_catalog(&env);
        catalog
            .modify_single(SelectBy::Name("rootFile1".into()), NAME_FIELD, "renamed")
            .unwrap();
        let rec = catalog.get(SelectBy::Name("renamed".into())).unwrap();
        assert_eq!(rec.list(CHANGED_FIELD).unwrap(), &["emptyChanged"]);

        catalog.modify_single("5", ID_FIELD, "9").unwrap();
        assert_eq!(catalog.get("9").unwrap().name(), "renamed");
        assert!(catalog.get("5").is_err());

        assert!(matches!(
            catalog.modify_single("9", ID_FIELD, "0"),
            Err(ShelfError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_list_field_never_empty() {
        let env = TestEnv::with_fixture_files();
        let mut catalog = fixture_catalog(&env);
        assert_eq!(catalog.count("1", "ListItem").unwrap(), 0);

        catalog
            .modify_list("1", "ListItem", ListEdit::Append("Red".into()))
            .unwrap();
        assert_eq!(catalog.get("1").unwrap().list("ListItem").unwrap(), &["Red"]);
        catalog
            .modify_list("1", "ListItem", ListEdit::Append("Red".into()))
            .unwrap();
        catalog
            .modify_list("1", "ListItem", ListEdit::Append("Blue".into()))
            .unwrap();
        assert_eq!(catalog.count("1", "ListItem").unwrap(), 2);

        catalog
            .modify_list(
                "1",
                "ListItem",
                ListEdit::Replace {
                    old: "Red".into(),
                    new: "Green".into(),
                },
            )
            .unwrap();
        assert_eq!(
            catalog.get("1").unwrap().list("ListItem").unwrap(),
            &["Blue", "Green"]
        );

        catalog
            .modify_list("1", "ListItem", ListEdit::Remove("Blue".into()))
            .unwrap();
        catalog
            .modify_list("1", "ListItem", ListEdit::Remove("Green".into()))
            .unwrap();
        assert_eq!(
            catalog.get("1").unwrap().list("ListItem").unwrap(),
            &["emptyListItem"]
        );
        assert_eq!(catalog.count("1", "ListItem").unwrap(), 0);

        assert!(matches!(
            catalog.modify_list("1", "ListItem", ListEdit::Remove("Blue".into())),
            Err(ShelfError::ValueNotPresent { .. })
        ));
        assert!(matches!(
            catalog.modify_list("1", "SingleItem", ListEdit::Append("x".into())),
            Err(ShelfError::WrongFieldKind { .. })
        ));
        assert!(matches!(
            catalog.count("1", "SingleItem"),
            Err(ShelfError::WrongFieldKind { .. })
        ));
    }

    #[test]
    fn test_mark_opened_leaves_changed_alone() {
        let env = TestEnv::with_fixture_files();
        let mut catalog = fixture_catalog(&env);
        catalog.mark_opened(3u64).unwrap();
        let rec = catalog.get("3").unwrap();
        assert_eq!(rec.list(OPENED_FIELD).unwrap().len(), 1);
        assert!(timefmt::is_timestamp(&rec.list(OPENED_FIELD).unwrap()[0]));
        assert_eq!(rec.list(CHANGED_FIELD).unwrap(), &["emptyChanged"]);
        assert_eq!(catalog.count("3", OPENED_FIELD).unwrap(), 1);
    }

    #[test]
    fn test_remove_record() {
        let env = TestEnv::with_fixture_files();
        let mut catalog = fixture_catalog(&env);
        let removed = catalog.remove(SelectBy::Path("rootFile1.mp4".into())).unwrap();
        assert_eq!(removed.id(), "5");
        assert_eq!(catalog.len(), 5);
        assert!(catalog.get("5").is_err());
        assert_eq!(catalog.get("4").unwrap().name(), "folder3file1");
        assert!(!catalog.all_values(NAME_FIELD).unwrap().contains("rootFile1"));
    }

    #[test]
    fn test_plugin_values_fill_fields() {
        let env = TestEnv::new();
        env.write_file("clip.mp4", "0123456789");
        let mut model = crate::catalog::testing::model_json();
        model["SingleItem"]["plugin"] = serde_json::Value::from("osData:size");
        let schema = Schema::parse(model).unwrap();
        let catalog = Catalog::create(env.root(), schema, CatalogOptions::default()).unwrap();
        assert_eq!(
            catalog.get("0").unwrap().single("SingleItem").unwrap(),
            "0.00"
        );
    }

    #[test]
    fn test_recent_ids_are_bounded() {
        let env = TestEnv::with_fixture_files();
        let schema = test_schema();
        let options = CatalogOptions {
            history_len: 2,
            ..CatalogOptions::default()
        };
        let mut catalog = Catalog::create(env.root(), schema, options).unwrap();
        catalog.record_executed("1");
        catalog.record_executed("2");
        catalog.record_executed("3");
        assert_eq!(catalog.recent_ids().iter().collect::<Vec<_>>(), vec!["2", "3"]);
    }
}
