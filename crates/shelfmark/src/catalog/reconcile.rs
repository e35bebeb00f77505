//! Keeping the catalog in step with the filesystem.
//!
//! New files fill ID gaps below the record count before extending the ID
//! range. Missing files are removed and, when renumbering, the record with
//! the highest ID moves into the freed slot.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, info};

use super::db::Catalog;
use super::error::Result;
use super::scanner;
use super::types::{IdChange, MovedFile, NewFile, SelectBy, ID_FIELD, PATH_FIELD};

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl Catalog {
    /// Relative paths of every matching file currently on disk.
    fn paths_on_disk(&self) -> Result<Vec<String>> {
        Ok(scanner::scan(&self.root, &self.schema)?
            .into_iter()
            .map(|file| file.relative)
            .collect())
    }

    /// Add a record for every matching file on disk that is not catalogued.
    pub fn find_new_files(&mut self) -> Result<Vec<NewFile>> {
        let files = scanner::scan(&self.root, &self.schema)?;
        let known: HashSet<String> = self.records.iter().map(|r| r.path().to_string()).collect();
        debug!(
            on_disk = files.len(),
            catalogued = known.len(),
            "Looking for new files"
        );

        let mut used: HashSet<i64> = self.records.iter().filter_map(|r| r.id_number()).collect();
        let mut gaps: VecDeque<i64> = (0..self.records.len() as i64)
            .filter(|id| !used.contains(id))
            .collect();

        let mut added = Vec::new();
        for file in files.iter().filter(|f| !known.contains(&f.relative)) {
            let id = match gaps.pop_front() {
                Some(id) => id,
                None => loop {
                    self.max_id += 1;
                    if !used.contains(&self.max_id) {
                        break self.max_id;
                    }
                },
            };
            used.insert(id);
            let record = self.build_record(file, id as u64)?;
            self.insert_record(record);
            info!(path = %file.relative, id, "Added new file");
            added.push(NewFile {
                path: file.relative.clone(),
                id: id.to_string(),
            });
        }
        self.max_id = self.max_id.max(self.records.len() as i64 - 1);
        Ok(added)
    }

    /// Update `Path` of records whose file moved.
    ///
    /// An unknown file on disk is treated as a move when exactly one record
    /// has the same file name.
    pub fn check_changed_paths(&mut self) -> Result<Vec<MovedFile>> {
        let on_disk = self.paths_on_disk()?;
        let known: HashSet<String> = self.records.iter().map(|r| r.path().to_string()).collect();

        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in self.records.iter().enumerate() {
            by_name
                .entry(file_name(record.path()).to_string())
                .or_default()
                .push(idx);
        }

        let mut moved = Vec::new();
        let mut updated = HashSet::new();
        for new_path in on_disk.into_iter().filter(|p| !known.contains(p)) {
            let Some([idx]) = by_name.get(file_name(&new_path)).map(Vec::as_slice) else {
                continue;
            };
            let idx = *idx;
            if !updated.insert(idx) {
                continue;
            }
            let old_path = self.records[idx].path().to_string();
            let id = self.records[idx].id().to_string();
            self.set_single_at(idx, PATH_FIELD, new_path.clone())?;
            info!(id = %id, old = %old_path, new = %new_path, "Updated path of moved file");
            moved.push(MovedFile {
                id,
                old_path,
                new_path,
            });
        }
        Ok(moved)
    }

    /// Relative paths of records whose file no longer exists.
    pub fn missing_files(&self) -> Result<Vec<String>> {
        let on_disk: HashSet<String> = self.paths_on_disk()?.into_iter().collect();
        Ok(self
            .records
            .iter()
            .map(|r| r.path())
            .filter(|path| !on_disk.contains(*path))
            .map(str::to_string)
            .collect())
    }

    /// Remove records whose file is gone.
    ///
    /// With `renumber`, the record holding the highest ID takes over each
    /// freed ID so the ID range stays dense. Returns the reassignments.
    pub fn check_missing_files(&mut self, renumber: bool) -> Result<Vec<IdChange>> {
        let missing = self.missing_files()?;
        debug!(missing = missing.len(), "Reconciling missing files");

        let mut changes = Vec::new();
        for path in missing {
            let removed = self.remove(SelectBy::Path(path.clone()))?;
            info!(id = %removed.id(), path = %path, "Removed missing file");
            if !renumber {
                continue;
            }
            let Some(freed) = removed.id_number() else {
                continue;
            };

            let highest = self
                .records
                .iter()
                .enumerate()
                .filter_map(|(idx, r)| r.id_number().map(|id| (id, idx)))
                .max();
            if let Some((top, idx)) = highest {
                if top > freed {
                    self.set_single_at(idx, ID_FIELD, freed.to_string())?;
                    info!(from = top, to = freed, "Moved ID into freed slot");
                    changes.push(IdChange {
                        from: top.to_string(),
                        to: freed.to_string(),
                    });
                }
            }
            self.max_id = self
                .records
                .iter()
                .filter_map(|r| r.id_number())
                .max()
                .unwrap_or(-1);
        }
        Ok(changes)
    }

    /// Renumber every record from 0 in record order.
    pub fn reset_ids(&mut self) -> Result<()> {
        for idx in 0..self.records.len() {
            let old = self.records[idx].id().to_string();
            let new = idx.to_string();
            if old != new {
                debug!(old = %old, new = %new, "Resetting ID");
                self.records[idx].set_single(ID_FIELD, new)?;
            }
        }
        self.rebuild_index();
        self.max_id = self.records.len() as i64 - 1;
        Ok(())
    }

    /// IDs currently in use, numerically ordered.
    pub fn used_ids(&self) -> BTreeSet<i64> {
        self.records.iter().filter_map(|r| r.id_number()).collect()
    }
}
